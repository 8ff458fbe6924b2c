use std::future::Future;
use std::time::Duration;

use admin_logging::{admin_info, admin_warn};

use crate::{AdminApi, ApiError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BulkPolicy {
    /// Pause between two submissions. Zero submits back to back.
    pub delay: Duration,
}

/// Outcome of a bulk submission. Items that succeeded stay applied.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BulkReport {
    pub succeeded: usize,
    pub failures: Vec<(String, ApiError)>,
}

impl BulkReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn attempted(&self) -> usize {
        self.succeeded + self.failed()
    }
}

/// Runs one operation per item, strictly one at a time, in input order.
///
/// A failed item is recorded and the queue moves on; nothing is retried or rolled back.
#[derive(Debug, Clone, Default)]
pub struct SequentialQueue {
    policy: BulkPolicy,
}

impl SequentialQueue {
    pub fn new(policy: BulkPolicy) -> Self {
        Self { policy }
    }

    pub async fn run<F, Fut>(&self, items: Vec<String>, mut op: F) -> BulkReport
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Result<(), ApiError>>,
    {
        let mut report = BulkReport::default();
        let total = items.len();

        for (index, item) in items.into_iter().enumerate() {
            if index > 0 && !self.policy.delay.is_zero() {
                tokio::time::sleep(self.policy.delay).await;
            }
            match op(item.clone()).await {
                Ok(()) => report.succeeded += 1,
                Err(err) => {
                    admin_warn!("Bulk item {}/{} failed ({}): {}", index + 1, total, item, err);
                    report.failures.push((item, err));
                }
            }
        }

        admin_info!(
            "Bulk run finished: {} succeeded, {} failed",
            report.succeeded,
            report.failed()
        );
        report
    }

    pub async fn add_links(&self, api: &dyn AdminApi, broker: &str, links: Vec<String>) -> BulkReport {
        self.run(links, move |link| async move {
            api.add_link(broker, &link).await.map(|_| ())
        })
        .await
    }
}
