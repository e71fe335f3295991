// Telemetry view - Holds one device's history and derives filtered snapshots from it
use crate::domain::chart::ChartOptions;
use crate::domain::snapshot::TelemetrySnapshot;
use crate::domain::telemetry::TelemetryRecord;
use crate::domain::window::{WindowError, WindowSelection};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use std::sync::Arc;
use thiserror::Error;

pub const MISSING_DEVICE_NOTICE: &str = "No device UID provided";
pub const FETCH_FAILED_NOTICE: &str = "Failed to load device data";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Network(String),
    #[error("unexpected HTTP status {0}")]
    Status(u16),
    #[error("malformed payload: {0}")]
    Malformed(String),
}

/// Where a view gets a device's full history from.
#[async_trait]
pub trait TelemetrySource: Send + Sync {
    async fn fetch_history(&self, uid: &str) -> Result<Vec<TelemetryRecord>, FetchError>;
}

/// User-facing side effects of the view.
pub trait ViewNotifier: Send + Sync {
    fn notice(&self, message: &str);
    fn navigate_back(&self);
}

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("No device UID provided")]
    MissingDeviceIdentifier,
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    InvalidWindowSelection(#[from] WindowError),
    #[error("no history loaded")]
    ApplyUnavailable,
    #[error("response for {0} arrived after the device changed")]
    Superseded(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Idle,
    Loading,
    Loaded,
    Filtering,
    Error,
}

/// Identifies one fetch so late completions for an older device can be dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    uid: String,
}

impl LoadTicket {
    pub fn uid(&self) -> &str {
        &self.uid
    }
}

pub struct TelemetryView {
    source: Arc<dyn TelemetrySource>,
    notifier: Arc<dyn ViewNotifier>,
    chart_options: ChartOptions,
    state: ViewState,
    generation: u64,
    device: Option<String>,
    history: Vec<TelemetryRecord>,
    selection: WindowSelection,
    snapshot: Option<TelemetrySnapshot>,
}

impl TelemetryView {
    pub fn new(
        source: Arc<dyn TelemetrySource>,
        notifier: Arc<dyn ViewNotifier>,
        chart_options: ChartOptions,
    ) -> Self {
        Self {
            source,
            notifier,
            chart_options,
            state: ViewState::Idle,
            generation: 0,
            device: None,
            history: Vec::new(),
            selection: WindowSelection::Today,
            snapshot: None,
        }
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn device(&self) -> Option<&str> {
        self.device.as_deref()
    }

    pub fn history(&self) -> &[TelemetryRecord] {
        &self.history
    }

    pub fn snapshot(&self) -> Option<&TelemetrySnapshot> {
        self.snapshot.as_ref()
    }

    /// Apply is offered only once a non-empty history is loaded.
    pub fn can_apply(&self) -> bool {
        self.state == ViewState::Loaded && !self.history.is_empty()
    }

    /// Fetch the history of `uid` and show today's readings.
    pub async fn open(&mut self, uid: Option<&str>, now: NaiveDateTime) -> Result<(), ViewError> {
        let ticket = self.begin_load(uid)?;
        let result = self.source.fetch_history(ticket.uid()).await;
        self.finish_load(ticket, result, now)
    }

    /// Start loading `uid`, superseding any fetch still in flight.
    pub fn begin_load(&mut self, uid: Option<&str>) -> Result<LoadTicket, ViewError> {
        self.generation += 1;
        self.history.clear();
        self.snapshot = None;

        let Some(uid) = uid.map(str::trim).filter(|u| !u.is_empty()) else {
            self.state = ViewState::Error;
            self.device = None;
            self.notifier.notice(MISSING_DEVICE_NOTICE);
            self.notifier.navigate_back();
            return Err(ViewError::MissingDeviceIdentifier);
        };

        self.state = ViewState::Loading;
        self.device = Some(uid.to_string());

        tracing::debug!("Loading history for {} (generation {})", uid, self.generation);
        Ok(LoadTicket {
            generation: self.generation,
            uid: uid.to_string(),
        })
    }

    /// Complete the fetch identified by `ticket`.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<TelemetryRecord>, FetchError>,
        now: NaiveDateTime,
    ) -> Result<(), ViewError> {
        if ticket.generation != self.generation {
            tracing::warn!("Discarding stale history response for {}", ticket.uid);
            return Err(ViewError::Superseded(ticket.uid));
        }

        match result {
            Ok(history) => {
                tracing::info!("Loaded {} records for {}", history.len(), ticket.uid);
                self.history = history;
                self.state = ViewState::Loaded;
                self.selection = WindowSelection::Today;
                self.refresh(now)?;
                Ok(())
            }
            Err(e) => {
                tracing::error!("Error fetching device data for {}: {}", ticket.uid, e);
                self.state = ViewState::Error;
                self.history.clear();
                self.snapshot = None;
                self.notifier.notice(FETCH_FAILED_NOTICE);
                Err(e.into())
            }
        }
    }

    /// Replace the current selection. Nothing is re-filtered until [`apply`](Self::apply).
    pub fn select(&mut self, selection: WindowSelection) {
        self.selection = selection;
    }

    /// Set the range start, switching to an explicit range if another kind was active.
    pub fn set_range_start(&mut self, date: Option<NaiveDate>) {
        let end = match self.selection {
            WindowSelection::Range { end, .. } => end,
            _ => None,
        };
        self.selection = WindowSelection::Range { start: date, end };
    }

    /// Set the range end, switching to an explicit range if another kind was active.
    pub fn set_range_end(&mut self, date: Option<NaiveDate>) {
        let start = match self.selection {
            WindowSelection::Range { start, .. } => start,
            _ => None,
        };
        self.selection = WindowSelection::Range { start, end: date };
    }

    /// Re-filter the loaded history with the current selection.
    ///
    /// An invalid selection leaves the previous snapshot in place.
    pub fn apply(&mut self, now: NaiveDateTime) -> Result<&TelemetrySnapshot, ViewError> {
        if !self.can_apply() {
            return Err(ViewError::ApplyUnavailable);
        }
        self.refresh(now)?;
        self.snapshot.as_ref().ok_or(ViewError::ApplyUnavailable)
    }

    fn refresh(&mut self, now: NaiveDateTime) -> Result<(), ViewError> {
        let device = self.device.as_deref().unwrap_or_default();

        self.state = ViewState::Filtering;
        let built = TelemetrySnapshot::build(
            device,
            &self.selection,
            &self.history,
            now,
            &self.chart_options,
        );
        self.state = ViewState::Loaded;

        match built {
            Ok(snapshot) => {
                self.snapshot = Some(snapshot);
                Ok(())
            }
            Err(e) => {
                self.notifier.notice(&e.to_string());
                Err(e.into())
            }
        }
    }
}
