//! Test case storage - the contract both backends satisfy
//!
//! Every operation is one critical section against the backing collection.
//! Identifiers come from the store, start at 1, and are never handed out twice
//! even after the record is deleted.

pub mod memory;
pub mod sqlite;


use crate::error::{StoreError, StoreResult};
use crate::types::{NewTestCase, TestCase, TestCaseUpdate};
use async_trait::async_trait;
use std::collections::HashSet;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

#[async_trait]
pub trait TestCaseStore: Send + Sync {
    /// All records in id order
    async fn list(&self) -> StoreResult<Vec<TestCase>>;

    async fn create(&self, payload: NewTestCase) -> StoreResult<TestCase>;

    /// Replace the supplied fields of an existing record
    async fn update(&self, id: i64, payload: TestCaseUpdate) -> StoreResult<TestCase>;

    async fn delete(&self, id: i64) -> StoreResult<()>;

    /// Records for the ids that exist, in request order, each at most once
    async fn get_many(&self, ids: &[i64]) -> StoreResult<Vec<TestCase>>;

    fn backend_name(&self) -> &'static str;
}

/// Trim a test case name, rejecting blank input
pub fn validate_name(name: &str) -> StoreResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(StoreError::Validation("Name cannot be empty".to_string()));
    }
    Ok(trimmed.to_string())
}

/// Drop repeated ids, keeping the first occurrence
pub(crate) fn dedup_ids(ids: &[i64]) -> Vec<i64> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name_trims() {
        assert_eq!(validate_name("  Login Test ").unwrap(), "Login Test");
        assert_eq!(validate_name("x").unwrap(), "x");
    }

    #[test]
    fn test_validate_name_rejects_blank() {
        assert!(matches!(validate_name(""), Err(StoreError::Validation(_))));
        assert!(matches!(validate_name(" \t\n "), Err(StoreError::Validation(_))));
    }

    #[test]
    fn test_dedup_ids_keeps_first_position() {
        assert_eq!(dedup_ids(&[3, 1, 3, 2, 1]), vec![3, 1, 2]);
        assert!(dedup_ids(&[]).is_empty());
    }
}
