// Filtered view of a device history, ready for table and chart rendering
use super::aggregation::{bucket, BucketedPoint};
use super::chart::{to_chart_series, ChartOptions, ChartOutcome};
use super::telemetry::TelemetryRecord;
use super::window::{filter, TimeWindow, WindowError, WindowSelection};
use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetrySnapshot {
    pub device: String,
    pub selection: String,
    pub records: Vec<TelemetryRecord>,
    pub points: Vec<BucketedPoint>,
    pub chart: ChartOutcome,
}

impl TelemetrySnapshot {
    /// Resolve `selection` against `now`, then filter, bucket and chart `history`.
    pub fn build(
        device: &str,
        selection: &WindowSelection,
        history: &[TelemetryRecord],
        now: NaiveDateTime,
        options: &ChartOptions,
    ) -> Result<Self, WindowError> {
        let window = TimeWindow::resolve(selection, now)?;
        let records = filter(history, &window);
        let points = bucket(&records);
        let chart = to_chart_series(&points, options);

        tracing::debug!(
            "Window {} kept {} of {} records for {}",
            window,
            records.len(),
            history.len(),
            device
        );

        Ok(Self {
            device: device.to_string(),
            selection: selection.label(now.date()),
            records,
            points,
            chart,
        })
    }

    pub fn has_data(&self) -> bool {
        !self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::telemetry::fixtures::{at, record};

    #[test]
    fn test_build_today_snapshot() {
        let history = vec![
            record(1, "2024-01-03T08:00:00", 11.0),
            record(2, "2024-01-02T08:00:00", 22.0),
        ];

        let snapshot = TelemetrySnapshot::build(
            "SC-001",
            &WindowSelection::Today,
            &history,
            at("2024-01-03T12:00:00"),
            &ChartOptions::default(),
        )
        .unwrap();

        assert_eq!(snapshot.selection, "2024-01-03");
        assert_eq!(snapshot.records.len(), 1);
        assert_eq!(snapshot.points.len(), 1);
        assert_ne!(snapshot.chart, ChartOutcome::NoData);
    }

    #[test]
    fn test_build_without_matches_reports_no_data() {
        let history = vec![record(1, "2023-06-01T08:00:00", 11.0)];

        let snapshot = TelemetrySnapshot::build(
            "SC-001",
            &WindowSelection::Today,
            &history,
            at("2024-01-03T12:00:00"),
            &ChartOptions::default(),
        )
        .unwrap();

        assert!(!snapshot.has_data());
        assert_eq!(snapshot.chart, ChartOutcome::NoData);
    }
}
