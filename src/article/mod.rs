//! Article ingestion and queries / 文章模块

pub mod hashtag;
pub mod header;
pub mod loader;
pub mod outline;
pub mod service;

pub use header::{format_header, parse_header, remove_header};
pub use loader::{ArticleUpload, INDEX_CHAPTER};
pub use outline::{parse_outline, Outline};
pub use service::{ArticleService, HashTagGroup, HashTagItem};
