// Export service - Pages a device history out of the store without holding it all
use crate::application::telemetry_repository::TelemetryRepository;
use crate::domain::telemetry::TelemetryRecord;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

const CHANNEL_CAPACITY: usize = 100;

#[derive(Clone)]
pub struct ExportService {
    repository: Arc<dyn TelemetryRepository>,
    page_size: u32,
}

impl ExportService {
    pub fn new(repository: Arc<dyn TelemetryRepository>, page_size: u32) -> Self {
        Self {
            repository,
            page_size: page_size.max(1),
        }
    }

    /// Stream every record of `uid` in id order.
    ///
    /// A store error is sent as the last item. Dropping the receiver stops
    /// the paging task at the next send.
    pub fn stream_history(&self, uid: &str) -> mpsc::Receiver<anyhow::Result<TelemetryRecord>> {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let repository = self.repository.clone();
        let page_size = self.page_size;
        let uid = uid.to_string();

        tokio::spawn(async move {
            let start_time = Instant::now();
            let mut after_id = None;
            let mut sent = 0usize;

            loop {
                let page = match repository.find_page(&uid, after_id, page_size).await {
                    Ok(page) => page,
                    Err(e) => {
                        tracing::error!("Export of {} failed after {} records: {:#}", uid, sent, e);
                        let _ = tx.send(Err(e)).await;
                        return;
                    }
                };

                let full_page = page.len() == page_size as usize;
                after_id = page.last().map(|r| r.id).or(after_id);

                for record in page {
                    if tx.send(Ok(record)).await.is_err() {
                        tracing::debug!("Export of {} cancelled by client", uid);
                        return;
                    }
                    sent += 1;
                }

                if !full_page {
                    break;
                }
            }

            tracing::info!(
                "Exported {} records for {} in {}ms",
                sent,
                uid,
                start_time.elapsed().as_millis()
            );
        });

        rx
    }
}
