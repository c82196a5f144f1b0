use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use taalmap_backend::dict::DictSearchResult;
use taalmap_backend::models::AutoCompleteItem;

use super::caller::Auth;
use super::{ApiResponse, HandlerResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DictSearchQuery {
    pub lang: Option<String>,
}

/// Split the comma separated fallback chain / 拆分候选词
fn fallback_words(words: &str) -> Vec<String> {
    words
        .split(',')
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// GET /api/search/autocomplete/:text - 前缀补全
pub async fn autocomplete(
    State(state): State<Arc<AppState>>,
    Path(text): Path<String>,
) -> HandlerResult<Vec<AutoCompleteItem>> {
    let items = state.search.autocomplete(&text).await?;
    Ok(Json(ApiResponse::success(items)))
}

/// GET /api/search/dict/:words/:attr/:chunk?lang= - 词典检索
pub async fn dict_search(
    State(state): State<Arc<AppState>>,
    Auth(caller): Auth,
    Path((words, attr, chunk)): Path<(String, String, i64)>,
    Query(query): Query<DictSearchQuery>,
) -> HandlerResult<DictSearchResult> {
    let words = fallback_words(&words);
    let groups = caller.dictionary_groups();
    let result = state
        .search
        .dict_search(&words, &attr, chunk, query.lang.as_deref(), groups.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(result)))
}
