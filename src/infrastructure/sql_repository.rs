// SQLite repository implementation
use crate::application::telemetry_repository::{AdminRepository, TelemetryRepository};
use crate::domain::admin::Admin;
use crate::domain::telemetry::TelemetryRecord;
use crate::infrastructure::config::DatabaseSettings;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

static MIGRATOR: Migrator = sqlx::migrate!(); // defaults to "./migrations"

const RECORD_COLUMNS: &str = "ID, UID, PvVolt, PvCur, BatVoltage, BatCurrent, LoadVoltage, \
                              LoadCurrent, PVKWh, Temperature, RecordTime";

pub async fn connect_to_db(settings: &DatabaseSettings) -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(settings.acquire_timeout())
        .idle_timeout(settings.idle_timeout())
        .connect(&settings.url)
        .await
        .with_context(|| format!("Failed to connect to {}", settings.url))?;

    MIGRATOR.run(&pool).await.context("Failed to run migrations")?;
    Ok(pool)
}

#[derive(Debug, Clone)]
pub struct SqlRepository {
    pool: SqlitePool,
}

impl SqlRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TelemetryRepository for SqlRepository {
    async fn find_by_uid(&self, uid: &str) -> Result<Vec<TelemetryRecord>> {
        let query =
            format!("SELECT {RECORD_COLUMNS} FROM solar_chargers WHERE UID = ? ORDER BY ID");

        sqlx::query_as::<_, TelemetryRecord>(&query)
            .bind(uid)
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("Failed to load history for {uid}"))
    }

    async fn find_page(
        &self,
        uid: &str,
        after_id: Option<i64>,
        limit: u32,
    ) -> Result<Vec<TelemetryRecord>> {
        let query = format!(
            "SELECT {RECORD_COLUMNS} FROM solar_chargers \
             WHERE UID = ? AND ID > ? ORDER BY ID LIMIT ?"
        );

        sqlx::query_as::<_, TelemetryRecord>(&query)
            .bind(uid)
            .bind(after_id.unwrap_or(i64::MIN))
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("Failed to load history page for {uid}"))
    }
}

#[async_trait]
impl AdminRepository for SqlRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<Admin>> {
        sqlx::query_as::<_, Admin>("SELECT id, username FROM admins WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to look up admin")
    }
}
