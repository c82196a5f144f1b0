use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use taalmap_backend::ingest::IngestFailure;
use taalmap_backend::models::{Topic, TopicSummary};
use taalmap_backend::topic::GroupInfo;

use super::caller::Auth;
use super::{api_error, ApiResponse, HandlerResult};
use crate::state::AppState;

const FILE_FIELD: &str = "file";

/// POST /api/topics - 上传文章或词典文件（管理员）
pub async fn upload_topic(
    State(state): State<Arc<AppState>>,
    auth: Auth,
    mut multipart: Multipart,
) -> Response {
    if let Err(e) = auth.require_admin() {
        return e.into_response();
    }

    let mut upload: Option<(String, Vec<u8>)> = None;
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return api_error(e.status(), &e.body_text()).into_response(),
        };
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("unknown").to_string();
        match field.bytes().await {
            Ok(bytes) => upload = Some((file_name, bytes.to_vec())),
            Err(e) => return api_error(e.status(), &e.body_text()).into_response(),
        }
    }

    let (file_name, bytes) = match upload {
        Some(upload) => upload,
        None => return api_error(StatusCode::BAD_REQUEST, "missing file field").into_response(),
    };
    if bytes.len() > state.max_upload_bytes {
        return api_error(StatusCode::PAYLOAD_TOO_LARGE, "Request Entity Too Large").into_response();
    }

    match state.ingest.ingest(bytes, &file_name).await {
        Ok(summary) => Json(ApiResponse::<TopicSummary>::success(summary)).into_response(),
        Err(e) => {
            let message = e.to_string();
            let failure = IngestFailure { file_name, message: message.clone() };
            let status = StatusCode::BAD_REQUEST;
            (status, Json(ApiResponse::failure(status, &message, failure))).into_response()
        }
    }
}

/// DELETE /api/topics/admin/:filename - 删除主题（管理员）
pub async fn remove_topic(
    State(state): State<Arc<AppState>>,
    auth: Auth,
    Path(file_name): Path<String>,
) -> HandlerResult<()> {
    auth.require_admin()?;
    state.ingest.remove_topic(&file_name).await?;
    Ok(Json(ApiResponse::success(())))
}

/// GET /api/topics/public - 出版物目录
pub async fn get_collection(State(state): State<Arc<AppState>>, Auth(caller): Auth) -> HandlerResult<Vec<Topic>> {
    let topics = state.topics.collection(&caller).await?;
    Ok(Json(ApiResponse::success(topics)))
}

/// GET /api/topics/public/:pub - 出版物章节
pub async fn get_publication(
    State(state): State<Arc<AppState>>,
    Auth(caller): Auth,
    Path(publication): Path<String>,
) -> HandlerResult<Vec<Topic>> {
    let topics = state.topics.publication(&publication, &caller).await?;
    Ok(Json(ApiResponse::success(topics)))
}

/// GET /api/topics/app
pub async fn get_app_topics(State(state): State<Arc<AppState>>, Auth(caller): Auth) -> HandlerResult<Vec<Topic>> {
    let topics = state.topics.app_topics(&caller).await?;
    Ok(Json(ApiResponse::success(topics)))
}

/// GET /api/topics/admin - 全部主题（管理员）
pub async fn get_admin_topics(State(state): State<Arc<AppState>>, auth: Auth) -> HandlerResult<Vec<Topic>> {
    auth.require_admin()?;
    let topics = state.topics.admin_topics().await?;
    Ok(Json(ApiResponse::success(topics)))
}

/// GET /api/topics/groups - 分组信息（管理员）
pub async fn get_group_info(State(state): State<Arc<AppState>>, auth: Auth) -> HandlerResult<Vec<GroupInfo>> {
    auth.require_admin()?;
    let groups = state.topics.group_info().await?;
    Ok(Json(ApiResponse::success(groups)))
}
