/// Browser push subscription
///
/// A subscription is what a browser's `PushManager.subscribe()` hands back:
/// the push-service endpoint plus two opaque keys used to encrypt payloads
/// for that browser. It is stored on the user row as three nullable columns
/// that are either all set or all NULL.
///
/// The JSON shape accepted from the browser is the standard descriptor:
///
/// ```json
/// {
///   "endpoint": "https://push.example.net/abc",
///   "keys": { "p256dh": "BNc...", "auth": "tBH..." }
/// }
/// ```

use serde::{Deserialize, Serialize};

/// Push subscription keys as sent by the browser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    /// Client public key (P-256 ECDH, base64url)
    pub p256dh: String,

    /// Client authentication secret (base64url)
    pub auth: String,
}

/// A registered push endpoint with its encryption keys
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushSubscription {
    /// Push service URL
    pub endpoint: String,

    /// Encryption keys
    pub keys: SubscriptionKeys,
}

/// Longest endpoint URL accepted
pub const MAX_ENDPOINT_LEN: usize = 2048;

/// Longest encoded key accepted
pub const MAX_KEY_LEN: usize = 256;

/// Error returned when a subscription descriptor is unusable
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubscriptionError {
    #[error("Subscription endpoint must be an https URL")]
    InvalidEndpoint,

    #[error("Subscription key '{0}' is empty")]
    MissingKey(&'static str),

    #[error("Subscription {0} exceeds {1} characters")]
    TooLong(&'static str, usize),
}

impl PushSubscription {
    pub fn new(
        endpoint: impl Into<String>,
        p256dh: impl Into<String>,
        auth: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            keys: SubscriptionKeys {
                p256dh: p256dh.into(),
                auth: auth.into(),
            },
        }
    }

    /// Rebuilds a subscription from the three nullable user columns
    ///
    /// Returns `None` unless all three are present.
    pub fn from_columns(
        endpoint: Option<String>,
        p256dh: Option<String>,
        auth: Option<String>,
    ) -> Option<Self> {
        match (endpoint, p256dh, auth) {
            (Some(endpoint), Some(p256dh), Some(auth)) => Some(Self::new(endpoint, p256dh, auth)),
            _ => None,
        }
    }

    /// Checks the descriptor is something a push service could accept
    pub fn validate(&self) -> Result<(), SubscriptionError> {
        let endpoint = self.endpoint.trim();
        if !endpoint.starts_with("https://") || endpoint.len() <= "https://".len() {
            return Err(SubscriptionError::InvalidEndpoint);
        }
        if endpoint.len() > MAX_ENDPOINT_LEN {
            return Err(SubscriptionError::TooLong("endpoint", MAX_ENDPOINT_LEN));
        }
        for (name, key) in [("p256dh", &self.keys.p256dh), ("auth", &self.keys.auth)] {
            if key.trim().is_empty() {
                return Err(SubscriptionError::MissingKey(name));
            }
            if key.len() > MAX_KEY_LEN {
                return Err(SubscriptionError::TooLong(name, MAX_KEY_LEN));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_browser_descriptor() {
        let json = r#"{
            "endpoint": "https://push.example.net/send/abc",
            "expirationTime": null,
            "keys": { "p256dh": "BNcRdreALRFX", "auth": "tBHItJI5svbpez7K" }
        }"#;

        let sub: PushSubscription = serde_json::from_str(json).unwrap();
        assert_eq!(sub.endpoint, "https://push.example.net/send/abc");
        assert_eq!(sub.keys.p256dh, "BNcRdreALRFX");
        assert_eq!(sub.keys.auth, "tBHItJI5svbpez7K");
        assert!(sub.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_plain_http_and_empty_keys() {
        let sub = PushSubscription::new("http://push.example.net/x", "k", "a");
        assert_eq!(sub.validate(), Err(SubscriptionError::InvalidEndpoint));

        let sub = PushSubscription::new("https://", "k", "a");
        assert_eq!(sub.validate(), Err(SubscriptionError::InvalidEndpoint));

        let sub = PushSubscription::new("https://push.example.net/x", " ", "a");
        assert_eq!(sub.validate(), Err(SubscriptionError::MissingKey("p256dh")));

        let sub = PushSubscription::new("https://push.example.net/x", "k", "");
        assert_eq!(sub.validate(), Err(SubscriptionError::MissingKey("auth")));
    }

    #[test]
    fn test_validate_bounds_lengths() {
        let base = "https://push.example.net/";
        let longest = format!("{}{}", base, "a".repeat(MAX_ENDPOINT_LEN - base.len()));
        assert!(PushSubscription::new(longest.clone(), "k", "a").validate().is_ok());

        let sub = PushSubscription::new(format!("{}a", longest), "k", "a");
        assert_eq!(sub.validate(), Err(SubscriptionError::TooLong("endpoint", MAX_ENDPOINT_LEN)));

        let sub = PushSubscription::new(base, "k".repeat(MAX_KEY_LEN + 1), "a");
        assert_eq!(sub.validate(), Err(SubscriptionError::TooLong("p256dh", MAX_KEY_LEN)));

        let sub = PushSubscription::new(base, "k", "a".repeat(MAX_KEY_LEN + 1));
        assert_eq!(sub.validate(), Err(SubscriptionError::TooLong("auth", MAX_KEY_LEN)));
    }

    #[test]
    fn test_from_columns_requires_all_three() {
        assert!(PushSubscription::from_columns(None, None, None).is_none());
        assert!(PushSubscription::from_columns(
            Some("https://p/x".to_string()),
            Some("k".to_string()),
            None
        )
        .is_none());

        let sub = PushSubscription::from_columns(
            Some("https://p/x".to_string()),
            Some("k".to_string()),
            Some("a".to_string()),
        )
        .unwrap();
        assert_eq!(sub, PushSubscription::new("https://p/x", "k", "a"));
    }
}
