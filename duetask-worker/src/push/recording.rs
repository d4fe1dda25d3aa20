/// In-memory push delivery
///
/// Records every message instead of sending it and logs it at `info`. Used
/// when no VAPID key is configured (`PUSH_MODE=log`) and by tests, which can
/// make specific endpoints fail or add latency.

use std::{
    collections::HashSet,
    sync::{Mutex, MutexGuard},
    time::Duration,
};

use async_trait::async_trait;
use duetask_shared::models::subscription::PushSubscription;

use super::{DeliveryError, DeliveryResult, PushDelivery};

/// One recorded delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPush {
    pub endpoint: String,
    pub message: String,
}

/// Push delivery that records instead of sending
#[derive(Debug, Default)]
pub struct RecordingDelivery {
    delivered: Mutex<Vec<RecordedPush>>,
    failing: Mutex<HashSet<String>>,
    delay: Option<Duration>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl RecordingDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleeps this long before each delivery
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Makes deliveries to `endpoint` fail with a 500 rejection
    pub fn fail_endpoint(&self, endpoint: impl Into<String>) {
        lock(&self.failing).insert(endpoint.into());
    }

    /// Successful deliveries, oldest first
    pub fn delivered(&self) -> Vec<RecordedPush> {
        lock(&self.delivered).clone()
    }
}

#[async_trait]
impl PushDelivery for RecordingDelivery {
    fn name(&self) -> &str {
        "recording"
    }

    async fn deliver(&self, subscription: &PushSubscription, message: &str) -> DeliveryResult<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if lock(&self.failing).contains(&subscription.endpoint) {
            return Err(DeliveryError::Rejected { status: 500 });
        }

        tracing::info!(endpoint = %subscription.endpoint, text = message, "Push message recorded");
        lock(&self.delivered).push(RecordedPush {
            endpoint: subscription.endpoint.clone(),
            message: message.to_string(),
        });
        Ok(())
    }
}
