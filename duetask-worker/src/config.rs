/// Configuration for the notification worker
///
/// Loaded from environment variables; a `.env` file is read first when present.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `PUSH_MODE`: `webpush` or `log` (default: webpush)
/// - `VAPID_PRIVATE_KEY`: Base64url VAPID private key (required for webpush)
/// - `VAPID_SUBJECT`: VAPID contact claim (default: mailto:admin@localhost)
/// - `PUSH_TIMEOUT_SECS`: Per-delivery timeout (default: 10)
/// - `NOTIFY_AT`: Daily local scan time, `HH:MM` (default: 22:00)
///
/// # Example
///
/// ```no_run
/// use duetask_worker::config::WorkerConfig;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = WorkerConfig::from_env()?;
/// println!("Scanning daily at {}", config.scheduler.notify_at);
/// # Ok(())
/// # }
/// ```

use std::{env, str::FromStr, time::Duration};

use chrono::NaiveTime;
use duetask_shared::db::pool::DatabaseConfig;

/// Default daily scan time
pub const DEFAULT_NOTIFY_AT: &str = "22:00";

/// Default per-delivery timeout
pub const DEFAULT_PUSH_TIMEOUT_SECS: u64 = 10;

/// Push transport selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushMode {
    /// Real Web Push with VAPID
    WebPush,

    /// Log and record messages without sending
    Log,
}

impl FromStr for PushMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "webpush" | "web-push" => Ok(PushMode::WebPush),
            "log" => Ok(PushMode::Log),
            other => anyhow::bail!("Unknown PUSH_MODE '{}', expected 'webpush' or 'log'", other),
        }
    }
}

/// Push delivery configuration
#[derive(Debug, Clone)]
pub struct PushConfig {
    pub mode: PushMode,

    /// Never logged
    pub vapid_private_key: Option<String>,

    pub vapid_subject: String,
    pub timeout_secs: u64,
}

impl PushConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mode = match lookup("PUSH_MODE") {
            Some(raw) => raw.parse()?,
            None => PushMode::WebPush,
        };

        let vapid_private_key = lookup("VAPID_PRIVATE_KEY").filter(|k| !k.trim().is_empty());
        if mode == PushMode::WebPush && vapid_private_key.is_none() {
            anyhow::bail!("VAPID_PRIVATE_KEY environment variable is required when PUSH_MODE=webpush");
        }

        let vapid_subject =
            lookup("VAPID_SUBJECT").unwrap_or_else(|| "mailto:admin@localhost".to_string());

        let timeout_secs = match lookup("PUSH_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>()?,
            None => DEFAULT_PUSH_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            anyhow::bail!("PUSH_TIMEOUT_SECS must be greater than zero");
        }

        Ok(Self {
            mode,
            vapid_private_key,
            vapid_subject,
            timeout_secs,
        })
    }
}

/// Daily scan schedule
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    /// Local wall-clock time of the daily scan
    pub notify_at: NaiveTime,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            notify_at: NaiveTime::from_hms_opt(22, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

impl ScheduleConfig {
    pub fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let raw = lookup("NOTIFY_AT").unwrap_or_else(|| DEFAULT_NOTIFY_AT.to_string());
        Ok(Self {
            notify_at: parse_notify_at(&raw)?,
        })
    }
}

/// Parses `HH:MM` (or `HH:MM:SS`)
pub fn parse_notify_at(raw: &str) -> anyhow::Result<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| anyhow::anyhow!("NOTIFY_AT must be HH:MM, got '{}'", raw))
}

/// Complete worker configuration
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub database: DatabaseConfig,
    pub push: PushConfig,
    pub scheduler: ScheduleConfig,
}

impl WorkerConfig {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value is invalid
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let lookup = |key: &str| env::var(key).ok();
        Self::from_lookup(&lookup)
    }

    pub fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        Ok(Self {
            database: database_from_lookup(lookup)?,
            push: PushConfig::from_lookup(lookup)?,
            scheduler: ScheduleConfig::from_lookup(lookup)?,
        })
    }
}

/// Reads `DATABASE_URL` and `DATABASE_MAX_CONNECTIONS`
pub fn database_from_lookup(
    lookup: &impl Fn(&str) -> Option<String>,
) -> anyhow::Result<DatabaseConfig> {
    let url = lookup("DATABASE_URL")
        .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

    let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
        Some(raw) => raw.parse::<u32>()?,
        None => 10,
    };

    Ok(DatabaseConfig {
        url,
        max_connections,
        ..Default::default()
    })
}
