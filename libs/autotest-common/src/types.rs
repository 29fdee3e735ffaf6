use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named test case with an ordered list of steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub id: i64,
    pub name: String,
    pub steps: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a test case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTestCase {
    pub name: String,
    #[serde(default)]
    pub steps: Vec<String>,
}

/// Partial update - absent fields keep their stored value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestCaseUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub steps: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRequest {
    pub ids: Vec<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Pass,
    Fail,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Pass => write!(f, "pass"),
            RunStatus::Fail => write!(f, "fail"),
        }
    }
}

/// Simulated outcome for one test case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub id: i64,
    pub name: String,
    pub status: RunStatus,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResponse {
    pub results: Vec<RunResult>,
}
