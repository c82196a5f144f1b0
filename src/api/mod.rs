pub mod article;
pub mod caller;
pub mod search;
pub mod server;
pub mod topics;

use axum::{http::StatusCode, Json};
use serde::Serialize;

use taalmap_backend::error::{IngestError, StoreError};

#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: 200,
            message: "success".to_string(),
            data: Some(data),
        }
    }

    pub fn error(message: &str) -> Self {
        Self {
            code: 400,
            message: message.to_string(),
            data: None,
        }
    }

    /// Error envelope with a status code and a payload / 带数据的错误响应
    pub fn failure(status: StatusCode, message: &str, data: T) -> Self {
        Self {
            code: status.as_u16() as i32,
            message: message.to_string(),
            data: Some(data),
        }
    }
}

pub type ApiError = (StatusCode, Json<ApiResponse<()>>);

/// HTTP status for an ingestion/lookup error / 错误状态码映射
pub fn status_of(e: &IngestError) -> StatusCode {
    match e {
        IngestError::NotFound(_) => StatusCode::NOT_FOUND,
        IngestError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        IngestError::Storage(_) | IngestError::QueueClosed | IngestError::JobPanicked(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        IngestError::MalformedHeader(_)
        | IngestError::InvalidFilename(_)
        | IngestError::UnsupportedFileType(_)
        | IngestError::Validation(_) => StatusCode::BAD_REQUEST,
    }
}

pub fn api_error(status: StatusCode, message: &str) -> ApiError {
    let mut body = ApiResponse::error(message);
    body.code = status.as_u16() as i32;
    (status, Json(body))
}

impl From<IngestError> for ApiResponseError {
    fn from(e: IngestError) -> Self {
        ApiResponseError(api_error(status_of(&e), &e.to_string()))
    }
}

impl From<StoreError> for ApiResponseError {
    fn from(e: StoreError) -> Self {
        tracing::error!("storage error: {}", e);
        ApiResponseError(api_error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()))
    }
}

/// `?`-friendly wrapper around [`ApiError`]
pub struct ApiResponseError(pub ApiError);

impl axum::response::IntoResponse for ApiResponseError {
    fn into_response(self) -> axum::response::Response {
        self.0.into_response()
    }
}

pub type HandlerResult<T> = Result<Json<ApiResponse<T>>, ApiResponseError>;
