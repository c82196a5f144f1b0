use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod state;

use state::AppState;
use taalmap_backend::config;
use taalmap_backend::db;
use taalmap_backend::store::SqliteStore;

/// Room for multipart boundaries and headers on top of the file itself
const MULTIPART_SLACK: usize = 64 * 1024;

/// All HTTP routes / 路由表
fn build_router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/api/health", get(api::server::health_check))
        .route("/api/tasks/stats", get(api::server::task_stats))
        // 主题
        .route("/api/topics", post(api::topics::upload_topic))
        .route("/api/topics/admin", get(api::topics::get_admin_topics))
        .route("/api/topics/admin/:filename", delete(api::topics::remove_topic))
        .route("/api/topics/public", get(api::topics::get_collection))
        .route("/api/topics/public/:pub", get(api::topics::get_publication))
        .route("/api/topics/app", get(api::topics::get_app_topics))
        .route("/api/topics/groups", get(api::topics::get_group_info))
        // 文章
        .route("/api/article/get/:filename/:hash", get(api::article::get_article))
        .route("/api/article/search", get(api::article::search_articles))
        .route("/api/article/hashtag/search", get(api::article::search_hashtags))
        .route("/api/article/hashtag/all", get(api::article::all_hashtags))
        // 词典
        .route("/api/search/autocomplete/:text", get(api::search::autocomplete))
        .route("/api/search/dict/:words/:attr/:chunk", get(api::search::dict_search))
        .layer(DefaultBodyLimit::max(max_upload_bytes + MULTIPART_SLACK))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taalmap_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration / 加载配置
    config::init_config().map_err(anyhow::Error::msg)?;
    let app_config = config::config();
    tracing::info!("Server will listen on {}:{}", app_config.server.host, app_config.server.port);

    // Create data directory if not exists / 创建数据目录
    let data_dir = app_config.get_data_dir();
    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
        tracing::info!("Created data directory: {:?}", data_dir);
    }

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| app_config.get_database_url());

    let pool = db::connect(&database_url, app_config.database.max_connections).await?;
    db::run_migrations(&pool).await?;

    let store = Arc::new(SqliteStore::new(pool));
    let state = Arc::new(AppState::new(store, &app_config));

    let app = build_router(state.clone(), app_config.ingest.max_upload_bytes);

    let bind_addr = app_config.get_bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("Server running at http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
