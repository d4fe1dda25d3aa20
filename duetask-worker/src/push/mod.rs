/// Push delivery to browser endpoints
///
/// The scheduler hands each due notification to a [`PushDelivery`]
/// implementation. Delivery is a single attempt: any error is reported back
/// and never retried.
///
/// # Implementations
///
/// - [`WebPushDelivery`]: VAPID-signed, aes128gcm-encrypted Web Push over HTTPS
/// - [`RecordingDelivery`]: in-memory, logs and records every message
///
/// # Example
///
/// ```
/// use duetask_shared::models::subscription::PushSubscription;
/// use duetask_worker::push::{PushDelivery, RecordingDelivery};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let delivery = RecordingDelivery::new();
/// let sub = PushSubscription::new("https://push.example.net/1", "key", "auth");
///
/// delivery.deliver(&sub, "Hey Ada! Pay bills due tomorrow! Take action!").await?;
/// assert_eq!(delivery.delivered().len(), 1);
/// # Ok(())
/// # }
/// ```

pub mod recording;
pub mod web_push;

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use duetask_shared::models::subscription::PushSubscription;

use crate::config::{PushConfig, PushMode};

pub use recording::RecordingDelivery;
pub use web_push::WebPushDelivery;

/// Raw P-256 scalar `0x0101..01`, base64url; a well-formed VAPID key for tests
#[cfg(test)]
pub(crate) const TEST_VAPID_KEY: &str = "AQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQE";

/// Push delivery error types
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// Endpoint or keys cannot be used to build a message
    #[error("Invalid subscription: {0}")]
    InvalidSubscription(String),

    /// VAPID signing failed
    #[error("Failed to sign push message: {0}")]
    Signing(String),

    /// Push service could not be reached
    #[error("Transport error: {0}")]
    Transport(String),

    /// Push service answered with a non-success status
    #[error("Push service rejected message with status {status}")]
    Rejected { status: u16 },

    /// Subscription no longer exists at the push service (404/410)
    #[error("Subscription expired (status {status})")]
    Expired { status: u16 },

    /// Delivery did not finish in time
    #[error("Delivery timed out after {0:?}")]
    Timeout(Duration),
}

/// Delivery result type alias
pub type DeliveryResult<T> = Result<T, DeliveryError>;

/// Sends one message to one browser subscription
#[async_trait]
pub trait PushDelivery: Send + Sync {
    /// Implementation name, for logs
    fn name(&self) -> &str;

    /// Delivers `message` to the browser behind `subscription`
    async fn deliver(&self, subscription: &PushSubscription, message: &str) -> DeliveryResult<()>;
}

/// Builds the delivery implementation selected by configuration
///
/// # Errors
///
/// Returns an error if `PUSH_MODE=webpush` and no VAPID key is configured
pub fn from_config(config: &PushConfig) -> anyhow::Result<Arc<dyn PushDelivery>> {
    match config.mode {
        PushMode::WebPush => {
            let key = config.vapid_private_key.as_deref().ok_or_else(|| {
                anyhow::anyhow!("VAPID_PRIVATE_KEY is required when PUSH_MODE=webpush")
            })?;
            let delivery = WebPushDelivery::new(key, &config.vapid_subject, config.timeout())?;
            Ok(Arc::new(delivery))
        }
        PushMode::Log => Ok(Arc::new(RecordingDelivery::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(mode: PushMode, key: Option<&str>) -> PushConfig {
        PushConfig {
            mode,
            vapid_private_key: key.map(str::to_string),
            vapid_subject: "mailto:admin@localhost".to_string(),
            timeout_secs: 10,
        }
    }

    #[test]
    fn test_log_mode_needs_no_key() {
        let delivery = from_config(&config(PushMode::Log, None)).unwrap();
        assert_eq!(delivery.name(), "recording");
    }

    #[test]
    fn test_webpush_mode_requires_key() {
        let err = from_config(&config(PushMode::WebPush, None)).err().unwrap();
        assert!(err.to_string().contains("VAPID_PRIVATE_KEY"));

        let delivery = from_config(&config(
            PushMode::WebPush,
            Some(TEST_VAPID_KEY),
        ))
        .unwrap();
        assert_eq!(delivery.name(), "webpush");

        assert!(from_config(&config(PushMode::WebPush, Some("a-key"))).is_err());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            DeliveryError::Rejected { status: 400 }.to_string(),
            "Push service rejected message with status 400"
        );
        assert_eq!(
            DeliveryError::Expired { status: 410 }.to_string(),
            "Subscription expired (status 410)"
        );
    }
}
