// HTTP telemetry source backed by the device-data endpoint
use crate::application::telemetry_view::{FetchError, TelemetrySource};
use crate::domain::telemetry::TelemetryRecord;
use async_trait::async_trait;
use serde::Deserialize;

/// `{ "status": 200, "data": [...] }`
#[derive(Debug, Deserialize)]
struct Envelope {
    status: u16,
    data: Option<Vec<TelemetryRecord>>,
}

#[derive(Debug, Clone)]
pub struct HttpTelemetrySource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTelemetrySource {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn history_url(&self, uid: &str) -> String {
        format!(
            "{}/getSolarChargerByUID/{}",
            self.base_url,
            urlencoding::encode(uid)
        )
    }
}

/// Validate a device-data response body.
fn parse_envelope(body: &[u8]) -> Result<Vec<TelemetryRecord>, FetchError> {
    let envelope: Envelope =
        serde_json::from_slice(body).map_err(|e| FetchError::Malformed(e.to_string()))?;

    if envelope.status != 200 {
        return Err(FetchError::Malformed(format!(
            "envelope status {}",
            envelope.status
        )));
    }
    envelope
        .data
        .ok_or_else(|| FetchError::Malformed("missing data".to_string()))
}

#[async_trait]
impl TelemetrySource for HttpTelemetrySource {
    async fn fetch_history(&self, uid: &str) -> Result<Vec<TelemetryRecord>, FetchError> {
        let url = self.history_url(uid);
        tracing::debug!("Fetching device history from {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        parse_envelope(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_url_encodes_uid() {
        let source = HttpTelemetrySource::new("http://localhost:8080/".to_string());
        assert_eq!(
            source.history_url("SC 001/a"),
            "http://localhost:8080/getSolarChargerByUID/SC%20001%2Fa"
        );
    }

    #[test]
    fn test_parse_envelope() {
        let body = br#"{"status":200,"data":[
            {"ID":1,"UID":"SC-001","PvVolt":12.0,"RecordTime":"2024-01-01T10:00:00"}
        ]}"#;
        let records = parse_envelope(body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].pv_voltage, Some(12.0));
    }

    #[test]
    fn test_parse_envelope_rejects_bad_shapes() {
        let cases: [&[u8]; 4] = [
            br#"{"status":500,"data":[]}"#,
            br#"{"status":200}"#,
            br#"{"status":200,"data":[{"ID":"x"}]}"#,
            b"<html>",
        ];
        for body in cases {
            assert!(matches!(parse_envelope(body), Err(FetchError::Malformed(_))));
        }
    }
}
