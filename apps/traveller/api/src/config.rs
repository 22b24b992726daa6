use core_config::{AppInfo, FromEnv, app_info, env_parse_or_default, server::ServerConfig};
use domain_travel::{MilvusConfig, OpenAIConfig};
use eyre::WrapErr;
use std::fmt;
use std::str::FromStr;

// Re-export Environment for use in other modules
pub use core_config::Environment;

/// Which vector index implementation serves the collection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VectorBackend {
    #[default]
    Milvus,
    /// Process-local exact index; data is lost on restart
    Memory,
}

impl FromStr for VectorBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "milvus" => Ok(VectorBackend::Milvus),
            "memory" => Ok(VectorBackend::Memory),
            other => Err(format!(
                "unknown vector backend '{}', expected milvus or memory",
                other
            )),
        }
    }
}

impl fmt::Display for VectorBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VectorBackend::Milvus => f.write_str("milvus"),
            VectorBackend::Memory => f.write_str("memory"),
        }
    }
}

/// Application-specific configuration
/// Composes shared config components from the `config` library
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub server: ServerConfig,
    pub environment: Environment,
    pub backend: VectorBackend,
    pub milvus: MilvusConfig,
    pub openai: OpenAIConfig,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?; // Uses defaults: HOST=0.0.0.0, PORT=8080
        let backend = env_parse_or_default("VECTOR_BACKEND", VectorBackend::default())?;
        // Collection settings apply to the in-memory backend too (dimension, metric)
        let milvus = MilvusConfig::from_env().wrap_err("Invalid Milvus configuration")?;
        let openai = OpenAIConfig::from_env().wrap_err("Invalid OpenAI configuration")?;

        Ok(Self {
            app: app_info!(),
            server,
            environment,
            backend,
            milvus,
            openai,
        })
    }
}
