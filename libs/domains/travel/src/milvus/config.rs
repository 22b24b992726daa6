use core_config::{env_or_default, env_parse_or_default};

use crate::error::{VectorError, VectorResult};
use crate::index::{CollectionSchema, IndexKind, MetricType, SearchOptions};

/// Milvus connection and collection configuration.
///
/// Read once at startup; static for the life of the process.
#[derive(Debug, Clone)]
pub struct MilvusConfig {
    pub url: String,
    pub token: Option<String>,
    pub collection: String,
    pub dimension: usize,
    pub shards: u32,
    pub index_kind: IndexKind,
    pub metric: MetricType,
    pub nlist: u32,
    pub nprobe: u32,
    pub replicas: u32,
    pub timeout_secs: u64,
    pub load_timeout_secs: u64,
}

impl MilvusConfig {
    pub fn new(url: String) -> Self {
        Self {
            url,
            ..Self::default()
        }
    }

    pub fn with_token(mut self, token: String) -> Self {
        self.token = Some(token);
        self
    }

    pub fn with_collection(mut self, collection: String, dimension: usize) -> Self {
        self.collection = collection;
        self.dimension = dimension;
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn from_env() -> VectorResult<Self> {
        let defaults = Self::default();

        let config = Self {
            url: env_or_default("MILVUS_URL", &defaults.url),
            token: std::env::var("MILVUS_TOKEN")
                .ok()
                .filter(|t| !t.trim().is_empty()),
            collection: env_or_default("MILVUS_COLLECTION", &defaults.collection),
            dimension: env_parse_or_default("MILVUS_DIMENSION", defaults.dimension)?,
            shards: env_parse_or_default("MILVUS_SHARDS", defaults.shards)?,
            index_kind: env_parse_or_default("MILVUS_INDEX_TYPE", defaults.index_kind)?,
            metric: env_parse_or_default("MILVUS_METRIC", defaults.metric)?,
            nlist: env_parse_or_default("MILVUS_NLIST", defaults.nlist)?,
            nprobe: env_parse_or_default("MILVUS_NPROBE", defaults.nprobe)?,
            replicas: env_parse_or_default("MILVUS_REPLICAS", defaults.replicas)?,
            timeout_secs: env_parse_or_default("MILVUS_TIMEOUT_SECS", defaults.timeout_secs)?,
            load_timeout_secs: env_parse_or_default(
                "MILVUS_LOAD_TIMEOUT_SECS",
                defaults.load_timeout_secs,
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> VectorResult<()> {
        let positive = [
            ("MILVUS_DIMENSION", self.dimension as u64),
            ("MILVUS_SHARDS", self.shards as u64),
            ("MILVUS_NLIST", self.nlist as u64),
            ("MILVUS_NPROBE", self.nprobe as u64),
            ("MILVUS_REPLICAS", self.replicas as u64),
        ];
        if let Some((key, _)) = positive.iter().find(|(_, value)| *value == 0) {
            return Err(VectorError::Config(format!("{} must be greater than 0", key)));
        }
        if self.collection.trim().is_empty() {
            return Err(VectorError::Config(
                "MILVUS_COLLECTION must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn schema(&self) -> CollectionSchema {
        CollectionSchema::new(&self.collection, self.dimension)
            .with_shards(self.shards)
            .with_index(self.index_kind, self.nlist)
            .with_metric(self.metric)
            .with_replicas(self.replicas)
    }

    pub fn search_options(&self, top_k: usize) -> SearchOptions {
        SearchOptions {
            top_k,
            metric: self.metric,
            nprobe: self.nprobe,
        }
    }
}

impl Default for MilvusConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:19530".to_string(),
            token: None,
            collection: "travel_data".to_string(),
            dimension: 1536,
            shards: 2,
            index_kind: IndexKind::IvfFlat,
            metric: MetricType::L2,
            nlist: 1024,
            nprobe: 10,
            replicas: 1,
            timeout_secs: 30,
            load_timeout_secs: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEYS: [&str; 12] = [
        "MILVUS_URL",
        "MILVUS_TOKEN",
        "MILVUS_COLLECTION",
        "MILVUS_DIMENSION",
        "MILVUS_SHARDS",
        "MILVUS_INDEX_TYPE",
        "MILVUS_METRIC",
        "MILVUS_NLIST",
        "MILVUS_NPROBE",
        "MILVUS_REPLICAS",
        "MILVUS_TIMEOUT_SECS",
        "MILVUS_LOAD_TIMEOUT_SECS",
    ];

    #[test]
    fn test_defaults_when_unset() {
        temp_env::with_vars_unset(KEYS, || {
            let config = MilvusConfig::from_env().unwrap();
            assert_eq!(config.url, "http://localhost:19530");
            assert_eq!(config.collection, "travel_data");
            assert_eq!(config.dimension, 1536);
            assert_eq!(config.index_kind, IndexKind::IvfFlat);
            assert_eq!(config.metric, MetricType::L2);
            assert!(config.token.is_none());

            let schema = config.schema();
            assert_eq!(schema.shards, 2);
            assert_eq!(schema.nlist, 1024);
            assert_eq!(schema.replicas, 1);
            assert_eq!(config.search_options(3).nprobe, 10);
        });
    }

    #[test]
    fn test_overrides() {
        temp_env::with_vars(
            [
                ("MILVUS_URL", Some("http://milvus:19530")),
                ("MILVUS_TOKEN", Some("root:Milvus")),
                ("MILVUS_DIMENSION", Some("768")),
                ("MILVUS_METRIC", Some("cosine")),
                ("MILVUS_NPROBE", Some("32")),
            ],
            || {
                let config = MilvusConfig::from_env().unwrap();
                assert_eq!(config.url, "http://milvus:19530");
                assert_eq!(config.token.as_deref(), Some("root:Milvus"));
                assert_eq!(config.dimension, 768);
                assert_eq!(config.metric, MetricType::Cosine);
                assert_eq!(config.nprobe, 32);
            },
        );
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        temp_env::with_var("MILVUS_DIMENSION", Some("lots"), || {
            assert!(matches!(
                MilvusConfig::from_env(),
                Err(VectorError::Config(_))
            ));
        });
        temp_env::with_var("MILVUS_REPLICAS", Some("0"), || {
            let err = MilvusConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("MILVUS_REPLICAS"));
        });
        temp_env::with_var("MILVUS_INDEX_TYPE", Some("HNSW"), || {
            assert!(MilvusConfig::from_env().is_err());
        });
    }
}
