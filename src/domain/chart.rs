// Chart domain model
use crate::domain::aggregation::BucketedPoint;
use crate::domain::telemetry::Channel;
use serde::{Deserialize, Serialize};

pub const CHART_TITLE: &str = "Solar Charger Data";
pub const STACK_GROUP: &str = "Total";
const AXIS_TIME_FORMAT: &str = "%b %d %H:%M";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    /// Shown in the legend on first render.
    pub selected: bool,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub times: Vec<String>,
    pub series: Vec<ChartSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "chart", rename_all = "snake_case")]
pub enum ChartOutcome {
    NoData,
    Chart(ChartSpec),
}

/// Display policy for assembled charts.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChartOptions {
    #[serde(default = "default_stacked")]
    pub stacked: bool,
    #[serde(default = "default_visible")]
    pub visible: Vec<Channel>,
}

fn default_stacked() -> bool {
    true
}

fn default_visible() -> Vec<Channel> {
    vec![Channel::PvVoltage]
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            stacked: default_stacked(),
            visible: default_visible(),
        }
    }
}

/// One series per channel, index-aligned with a shared time axis.
pub fn to_chart_series(points: &[BucketedPoint], options: &ChartOptions) -> ChartOutcome {
    if points.is_empty() {
        return ChartOutcome::NoData;
    }

    let times = points
        .iter()
        .map(|p| p.timestamp.format(AXIS_TIME_FORMAT).to_string())
        .collect();

    let series = Channel::ALL
        .iter()
        .map(|&channel| ChartSeries {
            id: channel.id().to_string(),
            name: channel.display_name().to_string(),
            stack: options.stacked.then(|| STACK_GROUP.to_string()),
            selected: options.visible.contains(&channel),
            values: points.iter().map(|p| p.values.get(channel)).collect(),
        })
        .collect();

    ChartOutcome::Chart(ChartSpec {
        title: CHART_TITLE.to_string(),
        times,
        series,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregation::bucket;
    use crate::domain::telemetry::fixtures::record;

    #[test]
    fn test_empty_points_signal_no_data() {
        assert_eq!(to_chart_series(&[], &ChartOptions::default()), ChartOutcome::NoData);
    }

    #[test]
    fn test_series_are_index_aligned_with_times() {
        let points = bucket(&[
            record(1, "2024-03-05T14:07:00", 1.0),
            record(2, "2024-03-05T14:08:30", 2.0),
            record(3, "2024-03-05T14:09:00", 3.0),
        ]);

        let ChartOutcome::Chart(chart) = to_chart_series(&points, &ChartOptions::default()) else {
            panic!("expected a chart");
        };

        assert_eq!(chart.title, "Solar Charger Data");
        assert_eq!(chart.times, vec!["Mar 05 14:07", "Mar 05 14:08", "Mar 05 14:09"]);
        assert_eq!(chart.series.len(), Channel::ALL.len());
        for series in &chart.series {
            assert_eq!(series.values.len(), points.len());
        }
        assert_eq!(chart.series[0].name, "PV Voltage");
        assert_eq!(chart.series[0].values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_stacking_and_legend_selection() {
        let points = bucket(&[record(1, "2024-03-05T14:07:00", 1.0)]);

        let ChartOutcome::Chart(stacked) = to_chart_series(&points, &ChartOptions::default()) else {
            panic!("expected a chart");
        };
        assert!(stacked.series.iter().all(|s| s.stack.as_deref() == Some("Total")));
        let selected: Vec<&str> = stacked
            .series
            .iter()
            .filter(|s| s.selected)
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(selected, vec!["pv_voltage"]);

        let options = ChartOptions {
            stacked: false,
            visible: vec![Channel::Temperature, Channel::LoadCurrent],
        };
        let ChartOutcome::Chart(flat) = to_chart_series(&points, &options) else {
            panic!("expected a chart");
        };
        assert!(flat.series.iter().all(|s| s.stack.is_none()));
        assert_eq!(flat.series.iter().filter(|s| s.selected).count(), 2);
    }

    #[test]
    fn test_outcome_serializes_with_kind_tag() {
        let json = serde_json::to_value(ChartOutcome::NoData).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "no_data" }));
    }
}
