//! Best-effort notification fan-out.
//!
//! One helper for the "for each recipient, attempt; collect failures;
//! never abort the loop" pattern used by submission and the lifecycle
//! manager.

use tracing::warn;
use virke_commerce::quote::Notification;
use virke_commerce::UserId;
use virke_store::NotificationStore;

/// Outcome of a fan-out pass.
#[derive(Debug, Default)]
pub struct FanoutReport {
    /// Recipients successfully notified.
    pub delivered: usize,
    /// Recipients whose notification failed. Failures are logged, not
    /// propagated.
    pub failed: Vec<UserId>,
}

impl FanoutReport {
    /// Whether every recipient was notified.
    pub fn all_delivered(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Send one notification per recipient, continuing past failures.
pub async fn notify_each<F>(
    store: &dyn NotificationStore,
    recipients: &[UserId],
    build: F,
) -> FanoutReport
where
    F: Fn(&UserId) -> Notification,
{
    let mut report = FanoutReport::default();
    for recipient in recipients {
        match store.insert(build(recipient)).await {
            Ok(()) => report.delivered += 1,
            Err(e) => {
                warn!(
                    recipient = recipient.as_str(),
                    error = %e,
                    "notification delivery failed"
                );
                report.failed.push(recipient.clone());
            }
        }
    }
    report
}
