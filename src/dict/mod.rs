//! Dictionary ingestion, lookup and autocomplete / 词典模块

pub mod cache;
pub mod loader;
pub mod rebuild;
pub mod search;

pub use cache::AutoCompleteCache;
pub use loader::{DictData, DictUpload};
pub use rebuild::{rebuild_word_index, RebuildFn, RebuildScheduler};
pub use search::{DictSearchResult, SearchEngine};
