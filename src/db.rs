use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

const CREATE_FEEDBACK_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS feedback (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        customer_id TEXT,
        name TEXT,
        age_group TEXT,
        gender TEXT,
        location TEXT,
        tenure_months INTEGER,
        service_type TEXT,
        text TEXT NOT NULL,
        sentiment TEXT NOT NULL,
        confidence REAL NOT NULL,
        intensity REAL NOT NULL,
        keywords TEXT NOT NULL DEFAULT '[]',
        urgency BOOLEAN NOT NULL DEFAULT 0,
        emotion TEXT,
        created_at TEXT NOT NULL
    )
"#;

pub struct Database {
    pub pool: SqlitePool,
}

impl Database {
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // Every connection to `:memory:` opens a separate database, so keep
        // exactly one alive for the pool's lifetime
        let pool = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(10)
        }
        .connect_with(options)
        .await?;

        sqlx::query(CREATE_FEEDBACK_TABLE).execute(&pool).await?;
        tracing::debug!("Feedback table ready");

        Ok(Self { pool })
    }
}
