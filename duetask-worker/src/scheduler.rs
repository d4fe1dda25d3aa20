/// Daily due-tomorrow notification scheduler
///
/// Once per day, at a configured local wall-clock time, the scheduler looks up
/// every to-do due tomorrow that has its alert on and is not completed, and
/// pushes one message to each owner's browser.
///
/// # Lifecycle
///
/// ```text
/// NotificationScheduler::start()
///   └─> SchedulerHandle
///         ├─ Idle     waiting for the next NOTIFY_AT
///         ├─ Running  executing a scan
///         └─ stop()   cancels the wait, lets a running scan finish, joins
/// ```
///
/// Scans run one at a time on a single task; a slow scan delays the next
/// wait instead of overlapping it.
///
/// # Failure Handling
///
/// Each delivery is bounded by the configured timeout. A failed or timed-out
/// delivery is recorded in the [`ScanReport`] and the scan moves on to the
/// next to-do; nothing is retried.
///
/// # Example
///
/// ```no_run
/// use std::{sync::Arc, time::Duration};
/// use duetask_worker::push::RecordingDelivery;
/// use duetask_worker::scheduler::{NotificationScheduler, SchedulerSettings};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) {
/// let scheduler = NotificationScheduler::new(
///     pool,
///     Arc::new(RecordingDelivery::new()),
///     SchedulerSettings::default(),
/// );
///
/// let handle = scheduler.start();
/// // ... serve requests ...
/// handle.stop().await;
/// # }
/// ```

use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use chrono::{DateTime, Days, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use duetask_shared::models::{subscription::PushSubscription, todo::{DueTodo, Todo}};
use sqlx::PgPool;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::{PushConfig, ScheduleConfig, DEFAULT_PUSH_TIMEOUT_SECS};
use crate::push::{DeliveryError, PushDelivery};

/// Scheduler settings
#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    /// Local wall-clock time of the daily scan
    pub notify_at: NaiveTime,

    /// Upper bound on a single delivery
    pub delivery_timeout: Duration,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            notify_at: ScheduleConfig::default().notify_at,
            delivery_timeout: Duration::from_secs(DEFAULT_PUSH_TIMEOUT_SECS),
        }
    }
}

impl SchedulerSettings {
    pub fn from_config(schedule: &ScheduleConfig, push: &PushConfig) -> Self {
        Self {
            notify_at: schedule.notify_at,
            delivery_timeout: push.timeout(),
        }
    }
}

/// A to-do due tomorrow, with what is needed to notify its owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueNotification {
    pub todo_id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub title: String,

    /// `None` when the owner never registered for push
    pub subscription: Option<PushSubscription>,
}

impl From<DueTodo> for DueNotification {
    fn from(due: DueTodo) -> Self {
        let subscription = due.subscription();
        Self {
            todo_id: due.todo_id,
            user_id: due.user_id,
            user_name: due.user_name,
            title: due.title,
            subscription,
        }
    }
}

/// Notification text for one to-do
pub fn format_message(user_name: &str, title: &str) -> String {
    format!("Hey {}! {} due tomorrow! Take action!", user_name, title)
}

/// What happened to one to-do during a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    Failed(String),

    /// Owner has no push subscription
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoOutcome {
    pub todo_id: i64,
    pub user_id: i64,
    pub outcome: DeliveryOutcome,
}

/// Result of one scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    /// The due date that was scanned for
    pub due_date: NaiveDate,

    /// One entry per matching to-do, in to-do id order
    pub outcomes: Vec<TodoOutcome>,
}

impl ScanReport {
    /// IDs of every to-do the scan matched, whatever happened to its delivery
    pub fn todo_ids(&self) -> Vec<i64> {
        self.outcomes.iter().map(|o| o.todo_id).collect()
    }

    pub fn delivered(&self) -> usize {
        self.count(|o| matches!(o, DeliveryOutcome::Delivered))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, DeliveryOutcome::Failed(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, DeliveryOutcome::Skipped))
    }

    fn count(&self, pred: impl Fn(&DeliveryOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.outcome)).count()
    }
}

/// Delivers one message per due to-do, sequentially
///
/// Never fails as a whole: each to-do gets its own outcome.
pub async fn deliver_all(
    delivery: &dyn PushDelivery,
    due_date: NaiveDate,
    due: Vec<DueNotification>,
    timeout: Duration,
) -> ScanReport {
    let mut outcomes = Vec::with_capacity(due.len());

    for notification in due {
        let outcome = match &notification.subscription {
            None => {
                debug!(
                    todo_id = notification.todo_id,
                    user_id = notification.user_id,
                    "Owner has no push subscription, skipping"
                );
                DeliveryOutcome::Skipped
            }
            Some(subscription) => {
                let message = format_message(&notification.user_name, &notification.title);
                let result = tokio::time::timeout(timeout, delivery.deliver(subscription, &message))
                    .await
                    .unwrap_or(Err(DeliveryError::Timeout(timeout)));

                match result {
                    Ok(()) => {
                        info!(
                            todo_id = notification.todo_id,
                            user_id = notification.user_id,
                            "Due-tomorrow notification delivered"
                        );
                        DeliveryOutcome::Delivered
                    }
                    Err(e) => {
                        warn!(
                            todo_id = notification.todo_id,
                            user_id = notification.user_id,
                            endpoint = %subscription.endpoint,
                            error = %e,
                            "Due-tomorrow notification failed"
                        );
                        DeliveryOutcome::Failed(e.to_string())
                    }
                }
            }
        };

        outcomes.push(TodoOutcome {
            todo_id: notification.todo_id,
            user_id: notification.user_id,
            outcome,
        });
    }

    ScanReport { due_date, outcomes }
}

/// First occurrence of `at` strictly after `now`
pub fn next_run_after(now: NaiveDateTime, at: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(at);
    if today > now {
        today
    } else {
        now.date()
            .checked_add_days(Days::new(1))
            .map(|d| d.and_time(at))
            .unwrap_or(NaiveDateTime::MAX)
    }
}

/// Instant at which the wall-clock time `next` occurs
///
/// `resolve` maps a wall-clock time onto the local zone. When clocks fall
/// back the earlier of the two instants is used; when `next` falls in a
/// spring-forward gap the scan runs at the first wall-clock time after the
/// gap, searched in 15-minute steps for up to three hours.
pub fn resolve_run_time<Tz, F>(next: NaiveDateTime, resolve: F) -> Option<DateTime<Tz>>
where
    Tz: TimeZone,
    F: Fn(&NaiveDateTime) -> LocalResult<DateTime<Tz>>,
{
    (0..=12)
        .filter_map(|step| next.checked_add_signed(chrono::Duration::minutes(15 * step)))
        .find_map(|candidate| resolve(&candidate).earliest())
}

/// Scheduler state as seen from outside
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Waiting for the next scan time
    Idle,

    /// Executing a scan
    Running,
}

impl fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulerState::Idle => write!(f, "idle"),
            SchedulerState::Running => write!(f, "running"),
        }
    }
}

/// Daily notification job
#[derive(Clone)]
pub struct NotificationScheduler {
    db: PgPool,
    delivery: Arc<dyn PushDelivery>,
    settings: SchedulerSettings,
}

impl NotificationScheduler {
    pub fn new(db: PgPool, delivery: Arc<dyn PushDelivery>, settings: SchedulerSettings) -> Self {
        Self {
            db,
            delivery,
            settings,
        }
    }

    /// Runs one scan for to-dos due the day after `today`
    ///
    /// # Errors
    ///
    /// Returns an error only if the query fails; delivery failures are in the report
    pub async fn scan_once(&self, today: NaiveDate) -> Result<ScanReport, sqlx::Error> {
        let tomorrow = today
            .checked_add_days(Days::new(1))
            .ok_or(sqlx::Error::Protocol(format!("No day after {}", today)))?;

        let due: Vec<DueNotification> = Todo::due_for_alert(&self.db, tomorrow)
            .await?
            .into_iter()
            .map(DueNotification::from)
            .collect();

        debug!(due_date = %tomorrow, count = due.len(), "Found to-dos due tomorrow");

        let report = deliver_all(
            self.delivery.as_ref(),
            tomorrow,
            due,
            self.settings.delivery_timeout,
        )
        .await;

        info!(
            due_date = %tomorrow,
            delivery = self.delivery.name(),
            matched = report.outcomes.len(),
            delivered = report.delivered(),
            failed = report.failed(),
            skipped = report.skipped(),
            "Notification scan complete"
        );

        Ok(report)
    }

    /// Spawns the daily loop and returns its handle
    pub fn start(self) -> SchedulerHandle {
        let shutdown = CancellationToken::new();
        let running = Arc::new(AtomicBool::new(false));

        info!(
            notify_at = %self.settings.notify_at,
            delivery = self.delivery.name(),
            "Notification scheduler starting"
        );

        let join = tokio::spawn(run_loop(self, shutdown.clone(), running.clone()));

        SchedulerHandle {
            shutdown,
            running,
            join,
        }
    }
}

async fn run_loop(scheduler: NotificationScheduler, shutdown: CancellationToken, running: Arc<AtomicBool>) {
    loop {
        let now = Local::now();
        let next = next_run_after(now.naive_local(), scheduler.settings.notify_at);
        let wait = match resolve_run_time(next, |t| Local.from_local_datetime(t)) {
            Some(at) => (at - now).to_std().unwrap_or(Duration::ZERO),
            None => (next - now.naive_local()).to_std().unwrap_or(Duration::ZERO),
        };

        debug!(next_run = %next, "Next notification scan scheduled");

        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(wait) => {}
        }

        running.store(true, Ordering::SeqCst);
        let today = Local::now().date_naive();
        if let Err(e) = scheduler.scan_once(today).await {
            error!(error = %e, "Notification scan failed");
        }
        running.store(false, Ordering::SeqCst);
    }

    info!("Notification scheduler stopped");
}

/// Handle to a started scheduler
pub struct SchedulerHandle {
    shutdown: CancellationToken,
    running: Arc<AtomicBool>,
    join: JoinHandle<()>,
}

impl SchedulerHandle {
    pub fn state(&self) -> SchedulerState {
        if self.running.load(Ordering::SeqCst) {
            SchedulerState::Running
        } else {
            SchedulerState::Idle
        }
    }

    /// Whether the loop task has exited
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Stops the scheduler and waits for it to exit
    ///
    /// A scan in progress finishes first.
    pub async fn stop(self) {
        self.shutdown.cancel();
        if let Err(e) = self.join.await {
            error!(error = %e, "Notification scheduler task ended abnormally");
        }
    }
}
