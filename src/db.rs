use anyhow::Result;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

/// Open the SQLite pool in WAL mode / 打开数据库连接池（WAL模式）
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    // 启用WAL模式，提高并发性能
    sqlx::query("PRAGMA journal_mode=WAL").execute(&pool).await?;

    // 设置busy_timeout，避免锁超时
    sqlx::query("PRAGMA busy_timeout=5000").execute(&pool).await?;

    sqlx::query("PRAGMA synchronous=NORMAL").execute(&pool).await?;

    Ok(pool)
}

/// Single-connection in-memory database with the schema applied
pub async fn connect_in_memory() -> Result<SqlitePool> {
    let pool = connect("sqlite::memory:", 1).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}

/// Run database migrations / 运行数据库迁移
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS topics (
            id TEXT PRIMARY KEY,
            type TEXT NOT NULL,
            file_name TEXT NOT NULL UNIQUE,
            publication TEXT,
            chapter TEXT,
            part TEXT,
            foreign_lang TEXT,
            base_lang TEXT,
            group_name TEXT NOT NULL,
            sort_index INTEGER NOT NULL DEFAULT 0,
            title TEXT,
            subtitle TEXT,
            author TEXT,
            copyright TEXT,
            publisher TEXT,
            pub_date TEXT,
            isbn TEXT,
            categories TEXT,
            hash TEXT,
            last_modified INTEGER
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS articles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            topic_id TEXT NOT NULL,
            file_name TEXT NOT NULL,
            group_name TEXT NOT NULL,
            title TEXT NOT NULL,
            md_text TEXT NOT NULL,
            html_text TEXT NOT NULL,
            index_text TEXT NOT NULL,
            hash_tags TEXT NOT NULL DEFAULT '[]'
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS hashtags (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            subtitle TEXT NOT NULL,
            group_name TEXT NOT NULL,
            topic_id TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS lemmas (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            word TEXT NOT NULL,
            lang TEXT NOT NULL,
            base_word TEXT NOT NULL,
            base_lang TEXT NOT NULL,
            word_order INTEGER NOT NULL,
            homonym INTEGER NOT NULL,
            attr TEXT NOT NULL,
            text TEXT NOT NULL,
            group_name TEXT NOT NULL,
            topic_id TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Derived autocomplete projection, rebuilt wholesale
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS words (
            word TEXT NOT NULL,
            lang TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_articles_file_name ON articles(file_name)",
        "CREATE INDEX IF NOT EXISTS idx_articles_topic ON articles(topic_id)",
        "CREATE INDEX IF NOT EXISTS idx_hashtags_name ON hashtags(name)",
        "CREATE INDEX IF NOT EXISTS idx_hashtags_topic ON hashtags(topic_id)",
        "CREATE INDEX IF NOT EXISTS idx_lemmas_word_order ON lemmas(word, word_order)",
        "CREATE INDEX IF NOT EXISTS idx_lemmas_topic ON lemmas(topic_id)",
        "CREATE INDEX IF NOT EXISTS idx_words_word ON words(word)",
    ];
    for sql in indexes {
        sqlx::query(sql).execute(pool).await?;
    }

    tracing::debug!("Database schema ready");
    Ok(())
}
