// Telemetry data domain models
use chrono::{DateTime, Local, NaiveDateTime};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One solar charger reading as stored and served over the wire.
///
/// Field names on the wire follow the device table's column names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TelemetryRecord {
    #[serde(rename = "ID")]
    #[sqlx(rename = "ID")]
    pub id: i64,
    #[serde(rename = "UID")]
    #[sqlx(rename = "UID")]
    pub uid: String,
    #[serde(rename = "PvVolt", default, deserialize_with = "deserialize_reading")]
    #[sqlx(rename = "PvVolt")]
    pub pv_voltage: Option<f64>,
    #[serde(rename = "PvCur", default, deserialize_with = "deserialize_reading")]
    #[sqlx(rename = "PvCur")]
    pub pv_current: Option<f64>,
    #[serde(rename = "BatVoltage", default, deserialize_with = "deserialize_reading")]
    #[sqlx(rename = "BatVoltage")]
    pub battery_voltage: Option<f64>,
    #[serde(rename = "BatCurrent", default, deserialize_with = "deserialize_reading")]
    #[sqlx(rename = "BatCurrent")]
    pub battery_current: Option<f64>,
    #[serde(rename = "LoadVoltage", default, deserialize_with = "deserialize_reading")]
    #[sqlx(rename = "LoadVoltage")]
    pub load_voltage: Option<f64>,
    #[serde(rename = "LoadCurrent", default, deserialize_with = "deserialize_reading")]
    #[sqlx(rename = "LoadCurrent")]
    pub load_current: Option<f64>,
    #[serde(rename = "PVKWh", default, deserialize_with = "deserialize_reading")]
    #[sqlx(rename = "PVKWh")]
    pub energy_kwh: Option<f64>,
    #[serde(rename = "Temperature", default, deserialize_with = "deserialize_reading")]
    #[sqlx(rename = "Temperature")]
    pub temperature: Option<f64>,
    #[serde(rename = "RecordTime", deserialize_with = "deserialize_record_time")]
    #[sqlx(rename = "RecordTime")]
    pub record_time: NaiveDateTime,
}

impl TelemetryRecord {
    /// Value of a chart channel, with missing readings read as zero.
    pub fn channel(&self, channel: Channel) -> f64 {
        let value = match channel {
            Channel::PvVoltage => self.pv_voltage,
            Channel::PvCurrent => self.pv_current,
            Channel::BatteryVoltage => self.battery_voltage,
            Channel::LoadVoltage => self.load_voltage,
            Channel::LoadCurrent => self.load_current,
            Channel::EnergyKwh => self.energy_kwh,
            Channel::Temperature => self.temperature,
        };
        value.filter(|v| v.is_finite()).unwrap_or(0.0)
    }
}

/// The numeric channels plotted for a solar charger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    PvVoltage,
    PvCurrent,
    BatteryVoltage,
    LoadVoltage,
    LoadCurrent,
    EnergyKwh,
    Temperature,
}

impl Channel {
    /// Chart order.
    pub const ALL: [Channel; 7] = [
        Channel::PvVoltage,
        Channel::PvCurrent,
        Channel::BatteryVoltage,
        Channel::LoadVoltage,
        Channel::LoadCurrent,
        Channel::EnergyKwh,
        Channel::Temperature,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Channel::PvVoltage => "pv_voltage",
            Channel::PvCurrent => "pv_current",
            Channel::BatteryVoltage => "battery_voltage",
            Channel::LoadVoltage => "load_voltage",
            Channel::LoadCurrent => "load_current",
            Channel::EnergyKwh => "energy_kwh",
            Channel::Temperature => "temperature",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Channel::PvVoltage => "PV Voltage",
            Channel::PvCurrent => "PV Current",
            Channel::BatteryVoltage => "Battery Voltage",
            Channel::LoadVoltage => "Load Voltage",
            Channel::LoadCurrent => "Load Current",
            Channel::EnergyKwh => "PV KWh",
            Channel::Temperature => "Temperature",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Per-channel values of one bucketed row, indexed by [`Channel`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChannelValues([f64; 7]);

impl ChannelValues {
    pub fn get(&self, channel: Channel) -> f64 {
        self.0[channel.index()]
    }

    pub fn set(&mut self, channel: Channel, value: f64) {
        self.0[channel.index()] = value;
    }
}

impl Serialize for ChannelValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Channel::ALL.len()))?;
        for channel in Channel::ALL {
            map.serialize_entry(channel.id(), &self.get(channel))?;
        }
        map.end()
    }
}

const RECORD_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a record timestamp.
///
/// RFC 3339 values carry an offset and are converted to local wall-clock
/// time; naive values are taken as already local.
pub fn parse_record_time(value: &str) -> Option<NaiveDateTime> {
    if let Ok(time) = DateTime::parse_from_rfc3339(value) {
        return Some(time.with_timezone(&Local).naive_local());
    }
    RECORD_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

fn deserialize_record_time<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_record_time(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid RecordTime: {raw}")))
}

/// Readings arrive as numbers, numeric strings (DECIMAL columns) or null.
fn deserialize_reading<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Reading {
        Number(f64),
        Text(String),
    }

    match Option::<Reading>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Reading::Number(value)) => Ok(Some(value)),
        Some(Reading::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(Reading::Text(text)) => text
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid reading: {text}"))),
    }
}
