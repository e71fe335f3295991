// Graph service - Use case for building a device's filtered chart server-side
use crate::application::telemetry_repository::TelemetryRepository;
use crate::domain::chart::ChartOptions;
use crate::domain::snapshot::TelemetrySnapshot;
use crate::domain::window::{TimeWindow, WindowError, WindowSelection};
use chrono::NaiveDateTime;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error(transparent)]
    Window(#[from] WindowError),
    #[error(transparent)]
    Repository(#[from] anyhow::Error),
}

#[derive(Clone)]
pub struct GraphService {
    repository: Arc<dyn TelemetryRepository>,
    chart_options: ChartOptions,
}

impl GraphService {
    pub fn new(repository: Arc<dyn TelemetryRepository>, chart_options: ChartOptions) -> Self {
        Self {
            repository,
            chart_options,
        }
    }

    pub async fn graph(
        &self,
        uid: &str,
        selection: &WindowSelection,
        now: NaiveDateTime,
    ) -> Result<TelemetrySnapshot, GraphError> {
        // Reject a bad window before touching the store.
        TimeWindow::resolve(selection, now)?;

        let history = self.repository.find_by_uid(uid).await?;
        Ok(TelemetrySnapshot::build(
            uid,
            selection,
            &history,
            now,
            &self.chart_options,
        )?)
    }
}
