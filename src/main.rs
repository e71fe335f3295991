// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use chrono::Local;
use tracing_subscriber::EnvFilter;

use crate::application::auth_service::AuthService;
use crate::application::device_service::DeviceService;
use crate::application::export_service::ExportService;
use crate::application::graph_service::GraphService;
use crate::application::telemetry_view::{TelemetryView, ViewNotifier};
use crate::domain::chart::ChartOutcome;
use crate::domain::window::WindowSelection;
use crate::infrastructure::config::{load_app_config, AppConfig};
use crate::infrastructure::http_source::HttpTelemetrySource;
use crate::infrastructure::jwt_verifier::JwtVerifier;
use crate::infrastructure::sql_repository::{connect_to_db, SqlRepository};
use crate::presentation::app_state::AppState;
use crate::presentation::router::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = load_app_config()?;
    let args: Vec<String> = env::args().skip(1).collect();

    match args.first().map(String::as_str).unwrap_or("serve") {
        "serve" => serve(config).await,
        "view" => {
            let uid = args.get(1).map(String::as_str);
            let window = args.get(2).map(String::as_str);
            view(config, uid, window).await
        }
        other => anyhow::bail!(
            "Unknown command {other:?}; expected `serve` or `view <uid> [window]`"
        ),
    }
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    if config.auth.secret.is_empty() {
        tracing::warn!("auth.secret is empty; every admin token will be rejected");
    }

    // Create repository (infrastructure layer)
    let pool = connect_to_db(&config.database).await?;
    let repository = Arc::new(SqlRepository::new(pool));
    let verifier = Arc::new(JwtVerifier::new(&config.auth.secret));

    // Create services (application layer)
    let state = Arc::new(AppState {
        device_service: DeviceService::new(repository.clone()),
        graph_service: GraphService::new(repository.clone(), config.chart.clone()),
        export_service: ExportService::new(repository.clone(), config.stream.page_size),
        auth_service: AuthService::new(verifier, repository),
    });

    // Build router (presentation layer)
    let router = build_router(state);

    let addr: SocketAddr = config
        .server
        .http_addr
        .parse()
        .with_context(|| format!("Invalid server.http_addr {}", config.server.http_addr))?;
    tracing::info!("Starting solar-telemetry service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}

/// Notices go to stderr.
struct TerminalNotifier;

impl ViewNotifier for TerminalNotifier {
    fn notice(&self, message: &str) {
        eprintln!("{message}");
    }

    fn navigate_back(&self) {
        tracing::info!("Leaving view");
    }
}

async fn view(config: AppConfig, uid: Option<&str>, window: Option<&str>) -> anyhow::Result<()> {
    let source = Arc::new(HttpTelemetrySource::new(config.view.base_url.clone()));
    let mut view = TelemetryView::new(source, Arc::new(TerminalNotifier), config.chart.clone());

    view.open(uid, Local::now().naive_local()).await?;

    if let Some(window) = window {
        view.select(window.parse::<WindowSelection>()?);
        if view.can_apply() {
            view.apply(Local::now().naive_local())?;
        }
    }

    let Some(snapshot) = view.snapshot() else {
        return Ok(());
    };

    println!(
        "{} Device Data ({}): {} of {} records",
        view.device().unwrap_or_default(),
        snapshot.selection,
        snapshot.records.len(),
        view.history().len()
    );
    if !snapshot.has_data() {
        println!("No data available for this device");
        return Ok(());
    }

    println!(
        "{:>5}  {:<12} {:>9} {:>9} {:>9} {:>9} {:>9} {:>7}  Recorded Time",
        "S.No", "UID", "PvVolt", "PvCur", "BatVolt", "BatCur", "PVKWh", "Temp"
    );
    let cell = |v: Option<f64>| v.map(|v| format!("{v:.2}")).unwrap_or_default();
    for (index, record) in snapshot.records.iter().enumerate() {
        println!(
            "{:>5}  {:<12} {:>9} {:>9} {:>9} {:>9} {:>9} {:>7}  {}",
            index + 1,
            record.uid,
            cell(record.pv_voltage),
            cell(record.pv_current),
            cell(record.battery_voltage),
            cell(record.battery_current),
            cell(record.energy_kwh),
            cell(record.temperature),
            record.record_time.format("%d/%m/%Y %H:%M:%S")
        );
    }

    if let ChartOutcome::Chart(chart) = &snapshot.chart {
        println!();
        println!(
            "{}: {} points, {} to {}",
            chart.title,
            chart.times.len(),
            chart.times.first().map(String::as_str).unwrap_or_default(),
            chart.times.last().map(String::as_str).unwrap_or_default()
        );
        for series in &chart.series {
            let latest = series.values.last().copied().unwrap_or_default();
            println!("  {:<16} latest {:.2}", series.name, latest);
        }
    }

    Ok(())
}
