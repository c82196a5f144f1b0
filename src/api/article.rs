use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use taalmap_backend::article::{HashTagGroup, HashTagItem};
use taalmap_backend::models::Topic;

use super::caller::Auth;
use super::{ApiResponse, ApiResponseError, HandlerResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PhraseQuery {
    pub q: Option<String>,
}

/// GET /api/article/get/:filename/:hash?q= - 获取文章
///
/// The hash segment only busts client caches; the response may be cached
/// for a year.
pub async fn get_article(
    State(state): State<Arc<AppState>>,
    Auth(caller): Auth,
    Path((file_name, _hash)): Path<(String, String)>,
    Query(query): Query<PhraseQuery>,
) -> Result<Response, ApiResponseError> {
    let article = state
        .articles
        .get_article(&file_name, query.q.as_deref(), &caller)
        .await?;

    let mut response = Json(ApiResponse::success(article)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("private, max-age=31536000"),
    );
    Ok(response)
}

/// GET /api/article/search?q= - 文章搜索
pub async fn search_articles(
    State(state): State<Arc<AppState>>,
    Auth(caller): Auth,
    Query(query): Query<PhraseQuery>,
) -> HandlerResult<Vec<Topic>> {
    let phrase = query.q.unwrap_or_default();
    let topics = state.articles.search_articles(&phrase, &caller).await?;
    Ok(Json(ApiResponse::success(topics)))
}

/// GET /api/article/hashtag/search?q= - 标签搜索
pub async fn search_hashtags(
    State(state): State<Arc<AppState>>,
    Auth(caller): Auth,
    Query(query): Query<PhraseQuery>,
) -> HandlerResult<Vec<HashTagItem>> {
    let name = query.q.unwrap_or_default();
    let items = state.articles.search_hashtags(&name, &caller).await?;
    Ok(Json(ApiResponse::success(items)))
}

/// GET /api/article/hashtag/all - 所有标签
pub async fn all_hashtags(State(state): State<Arc<AppState>>, Auth(caller): Auth) -> HandlerResult<Vec<HashTagGroup>> {
    let groups = state.articles.all_hashtags(&caller).await?;
    Ok(Json(ApiResponse::success(groups)))
}
