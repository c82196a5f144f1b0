//! Markdown rendering and search-phrase highlighting / Markdown 渲染与高亮

pub mod highlight;
pub mod render;

pub use highlight::highlight;
pub use render::{markup_fragments, render};
