// HTTP route handlers for the test case API

use autotest_common::types::{
    NewTestCase, RunRequest, RunResponse, RunStatus, TestCase, TestCaseUpdate,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::ApiResult;
use crate::AppState;

/// GET /health - Liveness check
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

/// GET /tests - List every test case
pub async fn list_tests(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<TestCase>>> {
    let tests = state.store.list().await?;
    debug!(count = tests.len(), "Listed test cases");
    Ok(Json(tests))
}

/// POST /tests - Create a test case
pub async fn create_test(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewTestCase>,
) -> ApiResult<Json<TestCase>> {
    let created = state.store.create(payload).await?;
    info!(
        test_id = created.id,
        name = %created.name,
        steps = created.steps.len(),
        "Test case created"
    );
    Ok(Json(created))
}

/// PUT /tests/{id} - Replace the supplied fields of a test case
pub async fn update_test(
    State(state): State<Arc<AppState>>,
    Path(test_id): Path<i64>,
    Json(payload): Json<TestCaseUpdate>,
) -> ApiResult<Json<TestCase>> {
    let updated = state.store.update(test_id, payload).await?;
    info!(test_id = test_id, "Test case updated");
    Ok(Json(updated))
}

/// DELETE /tests/{id} - Remove a test case
pub async fn delete_test(
    State(state): State<Arc<AppState>>,
    Path(test_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    state.store.delete(test_id).await?;
    info!(test_id = test_id, "Test case deleted");
    Ok(Json(serde_json::json!({ "status": "deleted" })))
}

/// POST /tests/run - Simulate running the requested test cases.
/// Unknown ids are skipped, so there may be fewer results than ids.
pub async fn run_tests(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RunRequest>,
) -> ApiResult<Json<RunResponse>> {
    let tests = state.store.get_many(&payload.ids).await?;
    info!(requested = payload.ids.len(), found = tests.len(), "Run started");

    let results = state.simulator.run(&tests).await;

    let passed = results
        .iter()
        .filter(|r| r.status == RunStatus::Pass)
        .count();
    info!(
        total = results.len(),
        passed = passed,
        failed = results.len() - passed,
        "Run completed"
    );

    Ok(Json(RunResponse { results }))
}
