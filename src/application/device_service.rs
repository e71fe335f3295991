// Device service - Use case for reading a device's telemetry history
use crate::application::telemetry_repository::TelemetryRepository;
use crate::domain::telemetry::TelemetryRecord;
use std::sync::Arc;

#[derive(Clone)]
pub struct DeviceService {
    repository: Arc<dyn TelemetryRepository>,
}

impl DeviceService {
    pub fn new(repository: Arc<dyn TelemetryRepository>) -> Self {
        Self { repository }
    }

    pub async fn history(&self, uid: &str) -> anyhow::Result<Vec<TelemetryRecord>> {
        let records = self.repository.find_by_uid(uid).await?;
        tracing::info!("Loaded {} records for device {}", records.len(), uid);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::telemetry_repository::fakes::InMemoryRepository;
    use crate::domain::telemetry::fixtures::record;

    #[tokio::test]
    async fn test_history_returns_only_the_device_records() {
        let mut other = record(2, "2024-01-01T10:00:00", 1.0);
        other.uid = "SC-002".to_string();
        let repository = Arc::new(InMemoryRepository::with_records(vec![
            record(1, "2024-01-01T10:00:00", 1.0),
            other,
        ]));

        let history = DeviceService::new(repository).history("SC-001").await.unwrap();

        assert_eq!(history.len(), 1);
        assert_eq!(history[0].uid, "SC-001");
    }
}
