use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::models::TravelRecord;

/// Authoritative id → record mapping. The vector index only holds ids.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Insert or overwrite by id.
    async fn put(&self, record: TravelRecord);

    /// A miss is a normal outcome.
    async fn get(&self, id: &str) -> Option<TravelRecord>;

    async fn len(&self) -> usize;
}

/// Process-local store; contents do not survive a restart.
#[derive(Default)]
pub struct InMemoryContentStore {
    records: RwLock<HashMap<String, TravelRecord>>,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn put(&self, record: TravelRecord) {
        let mut records = self.records.write().await;
        records.insert(record.id.clone(), record);
    }

    async fn get(&self, id: &str) -> Option<TravelRecord> {
        let records = self.records.read().await;
        records.get(id).cloned()
    }

    async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn record(id: &str, destination: &str) -> TravelRecord {
        TravelRecord {
            id: id.to_string(),
            destination: destination.to_string(),
            description: String::new(),
            kind: "City".to_string(),
            best_time_to_visit: "Any".to_string(),
            avg_cost_per_day: Some(100),
            popular_attractions: vec![],
        }
    }

    #[tokio::test]
    async fn test_put_get_overwrite() {
        let store = InMemoryContentStore::new();
        assert!(store.get("paris").await.is_none());

        store.put(record("paris", "Paris")).await;
        store.put(record("paris", "Paris, France")).await;

        assert_eq!(store.len().await, 1);
        assert_eq!(
            store.get("paris").await.unwrap().destination,
            "Paris, France"
        );
    }

    #[tokio::test]
    async fn test_concurrent_writers() {
        let store = Arc::new(InMemoryContentStore::new());
        let tasks: Vec<_> = (0..32)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store.put(record(&format!("id-{}", i), "x")).await;
                    store.get(&format!("id-{}", i)).await
                })
            })
            .collect();

        for task in tasks {
            assert!(task.await.unwrap().is_some());
        }
        assert_eq!(store.len().await, 32);
    }
}
