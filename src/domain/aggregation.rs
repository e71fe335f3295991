// Per-second bucketing of raw telemetry rows
use crate::domain::telemetry::{Channel, ChannelValues, TelemetryRecord};
use chrono::{NaiveDateTime, Timelike};
use serde::Serialize;
use std::collections::HashMap;

pub const BUCKET_KEY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One chart row: the last value seen per channel among records sharing a
/// second-resolution timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketedPoint {
    pub time: String,
    #[serde(skip)]
    pub timestamp: NaiveDateTime,
    pub values: ChannelValues,
}

/// Bucket records by second, ascending by timestamp.
///
/// Records that land in the same bucket overwrite every channel in input
/// order, so the last one wins. This is a deduplication, not an average.
pub fn bucket(records: &[TelemetryRecord]) -> Vec<BucketedPoint> {
    let mut buckets: HashMap<String, BucketedPoint> = HashMap::new();

    for record in records {
        let timestamp = truncate_to_second(record.record_time);
        let key = timestamp.format(BUCKET_KEY_FORMAT).to_string();

        let point = buckets.entry(key.clone()).or_insert_with(|| BucketedPoint {
            time: key,
            timestamp,
            values: ChannelValues::default(),
        });

        for channel in Channel::ALL {
            point.values.set(channel, record.channel(channel));
        }
    }

    let mut points: Vec<BucketedPoint> = buckets.into_values().collect();
    points.sort_by_key(|p| p.timestamp);

    tracing::debug!("Bucketed {} records into {} points", records.len(), points.len());
    points
}

fn truncate_to_second(time: NaiveDateTime) -> NaiveDateTime {
    time.with_nanosecond(0).unwrap_or(time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::telemetry::fixtures::{at, record};
    use crate::domain::window::{filter, RollingDays, TimeWindow, WindowSelection};

    fn full_record(id: i64, time: &str, base: f64) -> TelemetryRecord {
        TelemetryRecord {
            pv_current: Some(base + 1.0),
            battery_voltage: Some(base + 2.0),
            battery_current: Some(base + 3.0),
            load_voltage: Some(base + 4.0),
            load_current: Some(base + 5.0),
            energy_kwh: Some(base + 6.0),
            temperature: Some(base + 7.0),
            ..record(id, time, base)
        }
    }

    #[test]
    fn test_duplicate_timestamps_last_write_wins_on_every_channel() {
        let records = vec![
            full_record(1, "2024-01-01T10:00:00", 10.0),
            full_record(2, "2024-01-01T10:00:00.400", 100.0),
        ];

        let points = bucket(&records);

        assert_eq!(points.len(), 1);
        for channel in Channel::ALL {
            assert_eq!(points[0].values.get(channel), records[1].channel(channel));
        }
    }

    #[test]
    fn test_missing_channels_read_as_zero() {
        let points = bucket(&[record(1, "2024-01-01T10:00:00", 12.5)]);

        assert_eq!(points[0].values.get(Channel::PvVoltage), 12.5);
        assert_eq!(points[0].values.get(Channel::Temperature), 0.0);
    }

    #[test]
    fn test_points_sorted_ascending_regardless_of_input_order() {
        let records = vec![
            record(1, "2024-01-02T08:00:00", 3.0),
            record(2, "2024-01-01T23:00:00", 2.0),
            record(3, "2024-01-01T07:00:00", 1.0),
        ];

        let times: Vec<String> = bucket(&records).into_iter().map(|p| p.time).collect();
        assert_eq!(
            times,
            vec!["2024-01-01 07:00:00", "2024-01-01 23:00:00", "2024-01-02 08:00:00"]
        );
    }

    #[test]
    fn test_bucketing_unique_seconds_is_stable() {
        let records = vec![
            full_record(1, "2024-01-01T10:00:00", 1.0),
            full_record(2, "2024-01-01T10:00:01", 2.0),
        ];
        let points = bucket(&records);

        // Expand the points back into one record per bucket and bucket again.
        let expanded: Vec<TelemetryRecord> = points
            .iter()
            .enumerate()
            .map(|(i, p)| TelemetryRecord {
                pv_voltage: Some(p.values.get(Channel::PvVoltage)),
                pv_current: Some(p.values.get(Channel::PvCurrent)),
                battery_voltage: Some(p.values.get(Channel::BatteryVoltage)),
                load_voltage: Some(p.values.get(Channel::LoadVoltage)),
                load_current: Some(p.values.get(Channel::LoadCurrent)),
                energy_kwh: Some(p.values.get(Channel::EnergyKwh)),
                temperature: Some(p.values.get(Channel::Temperature)),
                ..record(i as i64, &p.time, 0.0)
            })
            .collect();

        assert_eq!(bucket(&expanded), points);
    }

    #[test]
    fn test_last_seven_days_scenario() {
        let history = vec![
            record(1, "2024-01-01T10:00:00", 10.0),
            record(2, "2024-01-01T10:00:00", 20.0),
            record(3, "2024-01-02T10:00:00", 5.0),
        ];
        let window = TimeWindow::resolve(
            &WindowSelection::LastDays(RollingDays::Seven),
            at("2024-01-03T09:00:00"),
        )
        .unwrap();

        let filtered = filter(&history, &window);
        assert_eq!(filtered.len(), 3);

        let points = bucket(&filtered);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].values.get(Channel::PvVoltage), 20.0);
        assert_eq!(points[1].values.get(Channel::PvVoltage), 5.0);
    }
}
