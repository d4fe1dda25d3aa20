/// Signed session and pending-subscription tokens
///
/// Both the logged-in session and a not-yet-linked push subscription live in
/// browser cookies as HS256-signed tokens. Signing with the server's session
/// secret means the browser can hold the value but cannot forge or alter it,
/// and nothing about either lives in process memory between requests.
///
/// # Token Kinds
///
/// - **Session**: identifies the logged-in user (7 days)
/// - **Pending subscription**: a push registration captured before sign-up or
///   login, carried back to the same browser (1 hour)
///
/// Every token carries `kind`, and validation rejects a token of the wrong
/// kind, so a subscription cookie can never be replayed as a session.
///
/// # Example
///
/// ```
/// use duetask_shared::auth::session::{create_session_token, validate_session_token, SessionClaims};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "a-session-secret-of-at-least-32-bytes";
/// let token = create_session_token(&SessionClaims::new(42, "Ada"), secret)?;
///
/// let claims = validate_session_token(&token, secret)?;
/// assert_eq!(claims.sub, 42);
/// assert_eq!(claims.name, "Ada");
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::models::subscription::PushSubscription;

const ISSUER: &str = "duetask";

/// Error type for session token operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Failed to sign token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Signature, issuer or structure check failed
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token is valid but of another kind
    #[error("Expected a {expected} token")]
    WrongKind { expected: &'static str },
}

/// Token kind identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Session,
    PendingSubscription,
}

impl TokenKind {
    /// Default lifetime of a token of this kind
    pub fn default_expiration(&self) -> Duration {
        match self {
            TokenKind::Session => Duration::days(7),
            TokenKind::PendingSubscription => Duration::hours(1),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Session => "session",
            TokenKind::PendingSubscription => "pending_subscription",
        }
    }
}

/// Claims of a logged-in session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject - user ID
    pub sub: i64,

    /// Display name, for greeting without a database round trip
    pub name: String,

    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub nbf: i64,
    pub kind: TokenKind,
}

impl SessionClaims {
    /// Creates session claims with the default 7 day lifetime
    pub fn new(user_id: i64, name: impl Into<String>) -> Self {
        Self::with_expiration(user_id, name, TokenKind::Session.default_expiration())
    }

    pub fn with_expiration(user_id: i64, name: impl Into<String>, expires_in: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            name: name.into(),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
            nbf: now.timestamp(),
            kind: TokenKind::Session,
        }
    }
}

/// Claims wrapping a push subscription that is not yet linked to a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingSubscriptionClaims {
    pub subscription: PushSubscription,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub nbf: i64,
    pub kind: TokenKind,
}

impl PendingSubscriptionClaims {
    pub fn new(subscription: PushSubscription) -> Self {
        Self::with_expiration(subscription, TokenKind::PendingSubscription.default_expiration())
    }

    pub fn with_expiration(subscription: PushSubscription, expires_in: Duration) -> Self {
        let now = Utc::now();
        Self {
            subscription,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
            nbf: now.timestamp(),
            kind: TokenKind::PendingSubscription,
        }
    }
}

fn sign<T: Serialize>(claims: &T, secret: &str) -> Result<String, SessionError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| SessionError::CreateError(format!("Token encoding failed: {}", e)))
}

fn verify<T: DeserializeOwned>(token: &str, secret: &str) -> Result<T, SessionError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<T>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionError::Expired,
        _ => SessionError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

/// Signs session claims into a cookie value
pub fn create_session_token(claims: &SessionClaims, secret: &str) -> Result<String, SessionError> {
    sign(claims, secret)
}

/// Validates a session cookie value
///
/// # Errors
///
/// - `SessionError::Expired` when the session is past its lifetime
/// - `SessionError::WrongKind` for a pending-subscription token
/// - `SessionError::ValidationError` for a bad signature, issuer or shape
pub fn validate_session_token(token: &str, secret: &str) -> Result<SessionClaims, SessionError> {
    let claims: SessionClaims = verify(token, secret)?;
    if claims.kind != TokenKind::Session {
        return Err(SessionError::WrongKind {
            expected: TokenKind::Session.as_str(),
        });
    }
    Ok(claims)
}

/// Signs a pending push subscription into a cookie value
pub fn create_pending_subscription_token(
    subscription: &PushSubscription,
    secret: &str,
) -> Result<String, SessionError> {
    sign(&PendingSubscriptionClaims::new(subscription.clone()), secret)
}

/// Validates a pending-subscription cookie value and returns the subscription
pub fn validate_pending_subscription_token(
    token: &str,
    secret: &str,
) -> Result<PushSubscription, SessionError> {
    let claims: PendingSubscriptionClaims = verify(token, secret)?;
    if claims.kind != TokenKind::PendingSubscription {
        return Err(SessionError::WrongKind {
            expected: TokenKind::PendingSubscription.as_str(),
        });
    }
    Ok(claims.subscription)
}
