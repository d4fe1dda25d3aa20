/// Configuration management for the API server
///
/// This module loads configuration from environment variables and provides
/// a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `SESSION_SECRET`: Secret for signing session cookies (required, 32+ chars)
/// - `COOKIE_SECURE`: Mark cookies `Secure` (default: false, implied by `PRODUCTION`)
/// - `PRODUCTION`: Enables `Secure` cookies and HSTS (default: false)
/// - `STATIC_DIR`: Directory served under `/static` (default: duetask-api/static)
/// - `VAPID_PUBLIC_KEY`: Application server key handed to browsers (optional)
/// - `SCHEDULER_ENABLED`: Run the notification scheduler in-process (default: true)
/// - `NOTIFY_AT`, `PUSH_MODE`, `VAPID_PRIVATE_KEY`, `VAPID_SUBJECT`,
///   `PUSH_TIMEOUT_SECS`: Scheduler settings, read only when it is enabled
///
/// # Example
///
/// ```no_run
/// use duetask_api::config::Config;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}:{}", config.api.host, config.api.port);
/// # Ok(())
/// # }
/// ```

use std::{env, fmt, path::PathBuf};

use duetask_shared::{auth::password::PasswordParams, db::pool::DatabaseConfig};
use duetask_worker::config::{database_from_lookup, PushConfig, ScheduleConfig};

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Session signing configuration
    pub session: SessionConfig,

    /// In-process scheduler, `None` when disabled
    pub scheduler: Option<SchedulerConfig>,

    /// Argon2id work factor for new passwords
    pub password: PasswordParams,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Production mode: HSTS and `Secure` cookies
    pub production: bool,

    /// Whether cookies carry the `Secure` attribute
    pub cookie_secure: bool,

    /// Directory served under `/static`
    pub static_dir: PathBuf,

    /// VAPID public key rendered into pages for `PushManager.subscribe()`
    pub vapid_public_key: Option<String>,
}

/// Session configuration
#[derive(Clone)]
pub struct SessionConfig {
    /// Secret key for signing session and pending-subscription cookies
    ///
    /// IMPORTANT: This must be kept secret and should be at least 32 bytes.
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Scheduler settings for the in-process notification job
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub schedule: ScheduleConfig,
    pub push: PushConfig,
}

fn parse_bool(raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("Expected a boolean, got '{}'", other),
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing
    /// - Environment variables have invalid values
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let lookup = |key: &str| env::var(key).ok();
        Self::from_lookup(&lookup)
    }

    /// Loads configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let host = lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = lookup("API_PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse::<u16>()?;

        let production = lookup("PRODUCTION")
            .map(|v| parse_bool(&v))
            .transpose()?
            .unwrap_or(false);
        let cookie_secure = lookup("COOKIE_SECURE")
            .map(|v| parse_bool(&v))
            .transpose()?
            .unwrap_or(false)
            || production;

        let static_dir = lookup("STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("duetask-api/static"));

        let vapid_public_key = lookup("VAPID_PUBLIC_KEY").filter(|k| !k.trim().is_empty());

        let database = database_from_lookup(lookup)?;

        let secret = lookup("SESSION_SECRET")
            .ok_or_else(|| anyhow::anyhow!("SESSION_SECRET environment variable is required"))?;
        if secret.len() < 32 {
            anyhow::bail!("SESSION_SECRET must be at least 32 characters long");
        }

        let scheduler_enabled = lookup("SCHEDULER_ENABLED")
            .map(|v| parse_bool(&v))
            .transpose()?
            .unwrap_or(true);
        let scheduler = if scheduler_enabled {
            Some(SchedulerConfig {
                schedule: ScheduleConfig::from_lookup(lookup)?,
                push: PushConfig::from_lookup(lookup)?,
            })
        } else {
            None
        };

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                production,
                cookie_secure,
                static_dir,
                vapid_public_key,
            },
            database,
            session: SessionConfig { secret },
            scheduler,
            password: PasswordParams::default(),
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}
