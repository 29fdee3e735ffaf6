// Volatile in-process store

use super::{dedup_ids, validate_name, TestCaseStore};
use crate::error::{StoreError, StoreResult};
use crate::types::{NewTestCase, TestCase, TestCaseUpdate};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
struct Inner {
    seq: i64,
    items: BTreeMap<i64, TestCase>,
}

/// Thread-safe in-memory store; contents are lost when the process exits
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TestCaseStore for MemoryStore {
    async fn list(&self) -> StoreResult<Vec<TestCase>> {
        let inner = self.inner.lock();
        Ok(inner.items.values().cloned().collect())
    }

    async fn create(&self, payload: NewTestCase) -> StoreResult<TestCase> {
        let name = validate_name(&payload.name)?;

        let mut inner = self.inner.lock();
        inner.seq += 1;
        let item = TestCase {
            id: inner.seq,
            name,
            steps: payload.steps,
            created_at: Utc::now(),
        };
        inner.items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn update(&self, id: i64, payload: TestCaseUpdate) -> StoreResult<TestCase> {
        let mut inner = self.inner.lock();
        let current = inner.items.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if let Some(name) = payload.name {
            current.name = validate_name(&name)?;
        }
        if let Some(steps) = payload.steps {
            current.steps = steps;
        }
        Ok(current.clone())
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        let mut inner = self.inner.lock();
        inner
            .items
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }

    async fn get_many(&self, ids: &[i64]) -> StoreResult<Vec<TestCase>> {
        let inner = self.inner.lock();
        Ok(dedup_ids(ids)
            .into_iter()
            .filter_map(|id| inner.items.get(&id).cloned())
            .collect())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::contract_tests;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_memory_store_contract() {
        contract_tests::run_all(&MemoryStore::new()).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_get_distinct_ids() {
        let store = Arc::new(MemoryStore::new());
        let mut handles = Vec::new();
        for i in 0..50 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .create(NewTestCase { name: format!("case {}", i), steps: vec![] })
                    .await
                    .unwrap()
                    .id
            }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        ids.sort_unstable();
        assert_eq!(ids, (1..=50).collect::<Vec<_>>());
    }
}
