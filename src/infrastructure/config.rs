use crate::domain::chart::ChartOptions;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
    pub view: ViewSettings,
    #[serde(default)]
    pub chart: ChartOptions,
    pub stream: StreamSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub http_addr: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_ms: u64,
    pub idle_timeout_ms: u64,
}

impl DatabaseSettings {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthSettings {
    pub secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ViewSettings {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StreamSettings {
    pub page_size: u32,
}

/// Defaults, then `config/app.toml` if present, then `SOLAR_*` environment
/// variables (`SOLAR_DATABASE__URL`, `SOLAR_AUTH__SECRET`, ...).
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = base_builder()?
        .add_source(config::File::with_name("config/app").required(false))
        .add_source(
            config::Environment::with_prefix("SOLAR")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

fn base_builder() -> anyhow::Result<config::ConfigBuilder<config::builder::DefaultState>> {
    Ok(config::Config::builder()
        .set_default("server.http_addr", "0.0.0.0:8080")?
        .set_default("database.url", "sqlite://solar_telemetry.db?mode=rwc")?
        .set_default("database.max_connections", 5)?
        .set_default("database.min_connections", 0)?
        .set_default("database.acquire_timeout_ms", 30_000)?
        .set_default("database.idle_timeout_ms", 10_000)?
        .set_default("auth.secret", "")?
        .set_default("view.base_url", "http://127.0.0.1:8080")?
        .set_default("stream.page_size", 500)?)
}
