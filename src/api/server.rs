use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use taalmap_backend::task::QueueStats;

use crate::api::ApiResponse;
use crate::state::AppState;

/// GET /api/health - 健康检查
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "build_time": env!("BUILD_TIME"),
    }))
}

/// GET /api/tasks/stats - 导入队列计数
pub async fn task_stats(State(state): State<Arc<AppState>>) -> Json<ApiResponse<QueueStats>> {
    Json(ApiResponse::success(state.queue().stats()))
}
