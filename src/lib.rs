pub mod article;
pub mod config;
pub mod db;
pub mod dict;
pub mod error;
pub mod events;
pub mod ingest;
pub mod markdown;
pub mod models;
pub mod store;
pub mod task;
pub mod topic;
pub mod utils;
