// Repository traits for telemetry and admin data access
use crate::domain::admin::Admin;
use crate::domain::telemetry::TelemetryRecord;
use async_trait::async_trait;

#[async_trait]
pub trait TelemetryRepository: Send + Sync {
    /// Full history of a device, in store order
    async fn find_by_uid(&self, uid: &str) -> anyhow::Result<Vec<TelemetryRecord>>;

    /// One page of a device's history ordered by id, starting after `after_id`
    async fn find_page(
        &self,
        uid: &str,
        after_id: Option<i64>,
        limit: u32,
    ) -> anyhow::Result<Vec<TelemetryRecord>>;
}

#[async_trait]
pub trait AdminRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<Admin>>;
}

#[cfg(test)]
pub(crate) mod fakes {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Store backed by a fixed list of records and admins.
    #[derive(Default)]
    pub struct InMemoryRepository {
        pub records: Vec<TelemetryRecord>,
        pub admins: Vec<Admin>,
        pub fail: bool,
        pub calls: AtomicUsize,
    }

    impl InMemoryRepository {
        pub fn with_records(records: Vec<TelemetryRecord>) -> Self {
            Self {
                records,
                ..Default::default()
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn check(&self) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("store unavailable");
            }
            Ok(())
        }
    }

    #[async_trait]
    impl TelemetryRepository for InMemoryRepository {
        async fn find_by_uid(&self, uid: &str) -> anyhow::Result<Vec<TelemetryRecord>> {
            self.check()?;
            Ok(self.records.iter().filter(|r| r.uid == uid).cloned().collect())
        }

        async fn find_page(
            &self,
            uid: &str,
            after_id: Option<i64>,
            limit: u32,
        ) -> anyhow::Result<Vec<TelemetryRecord>> {
            self.check()?;
            let mut page: Vec<TelemetryRecord> = self
                .records
                .iter()
                .filter(|r| r.uid == uid && after_id.is_none_or(|after| r.id > after))
                .cloned()
                .collect();
            page.sort_by_key(|r| r.id);
            page.truncate(limit as usize);
            Ok(page)
        }
    }

    #[async_trait]
    impl AdminRepository for InMemoryRepository {
        async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<Admin>> {
            self.check()?;
            Ok(self.admins.iter().find(|a| a.username == username).cloned())
        }
    }
}
