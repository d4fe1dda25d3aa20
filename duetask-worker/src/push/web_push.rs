/// Web Push delivery (RFC 8030 transport, RFC 8291 encryption, RFC 8292 VAPID)
///
/// The `web-push` crate builds the encrypted body and the VAPID
/// `Authorization` header; the request itself goes out through `reqwest` so
/// the whole workspace shares one HTTP client stack.
///
/// # Status Handling
///
/// | Push service answer | Result                       |
/// |---------------------|------------------------------|
/// | 2xx                 | `Ok(())`                     |
/// | 404, 410            | `DeliveryError::Expired`     |
/// | anything else       | `DeliveryError::Rejected`    |

use std::time::Duration;

use async_trait::async_trait;
use duetask_shared::models::subscription::PushSubscription;
use reqwest::{
    header::{CONTENT_ENCODING, CONTENT_TYPE},
    StatusCode,
};
use web_push::{
    ContentEncoding, SubscriptionInfo, VapidSignatureBuilder, WebPushMessage,
    WebPushMessageBuilder, URL_SAFE_NO_PAD,
};

use super::{DeliveryError, DeliveryResult, PushDelivery};

/// How long the push service should hold an undelivered message (1 day)
const DEFAULT_TTL_SECS: u32 = 24 * 60 * 60;

/// Web Push delivery with VAPID authentication
pub struct WebPushDelivery {
    client: reqwest::Client,

    /// Base64url-encoded raw P-256 private key
    vapid_private_key: String,

    /// VAPID `sub` claim, a `mailto:` or `https:` contact
    vapid_subject: String,

    ttl: u32,
}

impl WebPushDelivery {
    /// Creates a delivery client
    ///
    /// `timeout` bounds each request end to end. The VAPID key is decoded
    /// here so a malformed key fails at startup, not at the first scan.
    pub fn new(
        vapid_private_key: impl Into<String>,
        vapid_subject: impl Into<String>,
        timeout: Duration,
    ) -> DeliveryResult<Self> {
        let vapid_private_key = vapid_private_key.into();
        VapidSignatureBuilder::from_base64_no_sub(&vapid_private_key, URL_SAFE_NO_PAD)
            .map_err(|e| DeliveryError::Signing(format!("Invalid VAPID private key: {}", e)))?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DeliveryError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            vapid_private_key,
            vapid_subject: vapid_subject.into(),
            ttl: DEFAULT_TTL_SECS,
        })
    }

    /// Encrypts and signs `message` for one subscription
    pub fn build_message(
        &self,
        subscription: &PushSubscription,
        message: &str,
    ) -> DeliveryResult<WebPushMessage> {
        let info = SubscriptionInfo::new(
            subscription.endpoint.clone(),
            subscription.keys.p256dh.clone(),
            subscription.keys.auth.clone(),
        );

        let mut signature =
            VapidSignatureBuilder::from_base64(&self.vapid_private_key, URL_SAFE_NO_PAD, &info)
                .map_err(|e| DeliveryError::Signing(e.to_string()))?;
        signature.add_claim("sub", self.vapid_subject.as_str());
        let signature = signature
            .build()
            .map_err(|e| DeliveryError::Signing(e.to_string()))?;

        let mut builder = WebPushMessageBuilder::new(&info);
        builder.set_ttl(self.ttl);
        builder.set_payload(ContentEncoding::Aes128Gcm, message.as_bytes());
        builder.set_vapid_signature(signature);

        builder
            .build()
            .map_err(|e| DeliveryError::InvalidSubscription(e.to_string()))
    }

    async fn send(&self, message: WebPushMessage) -> DeliveryResult<()> {
        let mut request = self
            .client
            .post(message.endpoint.to_string())
            .header("TTL", message.ttl.to_string());

        if let Some(payload) = message.payload {
            request = request
                .header(CONTENT_ENCODING, payload.content_encoding.to_str())
                .header(CONTENT_TYPE, "application/octet-stream");
            for (name, value) in payload.crypto_headers {
                request = request.header(name, value);
            }
            request = request.body(payload.content);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                DeliveryError::Transport(format!("Request timed out: {}", e))
            } else {
                DeliveryError::Transport(e.to_string())
            }
        })?;

        classify_status(response.status())
    }
}

fn classify_status(status: StatusCode) -> DeliveryResult<()> {
    if status.is_success() {
        return Ok(());
    }

    match status {
        StatusCode::NOT_FOUND | StatusCode::GONE => Err(DeliveryError::Expired {
            status: status.as_u16(),
        }),
        _ => Err(DeliveryError::Rejected {
            status: status.as_u16(),
        }),
    }
}

#[async_trait]
impl PushDelivery for WebPushDelivery {
    fn name(&self) -> &str {
        "webpush"
    }

    async fn deliver(&self, subscription: &PushSubscription, message: &str) -> DeliveryResult<()> {
        let built = self.build_message(subscription, message)?;
        self.send(built).await?;

        tracing::debug!(endpoint = %subscription.endpoint, "Push message accepted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::push::TEST_VAPID_KEY;

    fn subscription() -> PushSubscription {
        PushSubscription::new("https://push.example.net/send/abc", "not-a-key", "not-auth")
    }

    #[test]
    fn test_classify_status() {
        assert!(classify_status(StatusCode::CREATED).is_ok());
        assert!(classify_status(StatusCode::OK).is_ok());
        assert!(matches!(
            classify_status(StatusCode::GONE),
            Err(DeliveryError::Expired { status: 410 })
        ));
        assert!(matches!(
            classify_status(StatusCode::NOT_FOUND),
            Err(DeliveryError::Expired { status: 404 })
        ));
        assert!(matches!(
            classify_status(StatusCode::TOO_MANY_REQUESTS),
            Err(DeliveryError::Rejected { status: 429 })
        ));
    }

    #[test]
    fn test_malformed_vapid_key_is_rejected_at_construction() {
        for key in ["%%%", "", "c2hvcnQ"] {
            assert!(matches!(
                WebPushDelivery::new(key, "mailto:admin@localhost", Duration::from_secs(1)),
                Err(DeliveryError::Signing(_))
            ));
        }
    }

    #[test]
    fn test_valid_key_with_unusable_subscription_keys() {
        let delivery =
            WebPushDelivery::new(TEST_VAPID_KEY, "mailto:admin@localhost", Duration::from_secs(1))
                .unwrap();

        assert!(matches!(
            delivery.build_message(&subscription(), "hi"),
            Err(DeliveryError::InvalidSubscription(_))
        ));
    }

    #[tokio::test]
    async fn test_deliver_reports_build_failure() {
        let delivery =
            WebPushDelivery::new(TEST_VAPID_KEY, "mailto:admin@localhost", Duration::from_secs(1))
                .unwrap();

        let result = delivery.deliver(&subscription(), "hi").await;
        assert!(result.is_err());
    }
}
