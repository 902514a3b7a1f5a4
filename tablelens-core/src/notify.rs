//! Notification service.
//!
//! Callers that want to surface transient messages (an assessment failed, a
//! report was saved) receive a [`Notifier`] explicitly instead of reaching
//! for a process-wide singleton. [`NotificationService`] publishes events on
//! a broadcast channel; each timed notification owns one timer task that is
//! aborted when the notification is dismissed or the service is dropped.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Default display time for non-error notifications.
pub const DEFAULT_DURATION: Duration = Duration::from_secs(4);

/// Default display time for error notifications.
pub const ERROR_DURATION: Duration = Duration::from_secs(6);

const EVENT_CAPACITY: usize = 64;

/// Identifier of a shown notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NotificationId(pub u64);

impl std::fmt::Display for NotificationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Operation succeeded
    Success,
    /// Operation failed
    Error,
    /// Something needs attention
    Warning,
    /// Neutral information
    Info,
}

impl NotificationKind {
    /// Display time used when the caller does not pick one.
    pub fn default_duration(self) -> Duration {
        match self {
            Self::Error => ERROR_DURATION,
            _ => DEFAULT_DURATION,
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        };
        f.write_str(label)
    }
}

/// A shown notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Identifier for dismissal
    pub id: NotificationId,
    /// Severity
    pub kind: NotificationKind,
    /// Message text
    pub message: String,
    /// Display time; `None` is sticky
    pub duration: Option<Duration>,
}

/// Why a notification went away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DismissReason {
    /// Its duration elapsed
    Expired,
    /// [`Notifier::dismiss`] was called
    Manual,
    /// The service was dropped
    Shutdown,
}

/// Event published to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    /// A notification appeared
    Shown(Notification),
    /// A notification went away
    Dismissed {
        /// Which notification
        id: NotificationId,
        /// Why
        reason: DismissReason,
    },
}

/// Sink for user-facing notifications.
pub trait Notifier: Send + Sync {
    /// Shows a notification.
    ///
    /// `duration` of `None` uses the kind's default; `Some(Duration::ZERO)`
    /// makes it sticky until dismissed.
    fn notify(
        &self,
        kind: NotificationKind,
        message: String,
        duration: Option<Duration>,
    ) -> NotificationId;

    /// Dismisses a notification. Returns false if it was already gone.
    fn dismiss(&self, id: NotificationId) -> bool;

    /// Shows a success notification with the default duration.
    fn success(&self, message: &str) -> NotificationId {
        self.notify(NotificationKind::Success, message.to_string(), None)
    }

    /// Shows an error notification with the default duration.
    fn error(&self, message: &str) -> NotificationId {
        self.notify(NotificationKind::Error, message.to_string(), None)
    }

    /// Shows a warning notification with the default duration.
    fn warning(&self, message: &str) -> NotificationId {
        self.notify(NotificationKind::Warning, message.to_string(), None)
    }

    /// Shows an info notification with the default duration.
    fn info(&self, message: &str) -> NotificationId {
        self.notify(NotificationKind::Info, message.to_string(), None)
    }
}

struct Inner {
    events: broadcast::Sender<NotificationEvent>,
    next_id: AtomicU64,
    // Sticky notifications have no timer
    active: Mutex<HashMap<NotificationId, Option<JoinHandle<()>>>>,
}

impl Inner {
    fn active(&self) -> MutexGuard<'_, HashMap<NotificationId, Option<JoinHandle<()>>>> {
        self.active.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn publish(&self, event: NotificationEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn expire(&self, id: NotificationId) {
        if self.active().remove(&id).is_some() {
            debug!("Notification {} expired", id);
            self.publish(NotificationEvent::Dismissed {
                id,
                reason: DismissReason::Expired,
            });
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let active = std::mem::take(
            self.active
                .get_mut()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        );
        for (id, timer) in active {
            if let Some(timer) = timer {
                timer.abort();
            }
            let _ = self.events.send(NotificationEvent::Dismissed {
                id,
                reason: DismissReason::Shutdown,
            });
        }
    }
}

/// Broadcast-backed [`Notifier`].
///
/// Cloning shares the same notifications. Timers need a Tokio runtime; when
/// none is running, timed notifications become sticky.
#[derive(Clone)]
pub struct NotificationService {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for NotificationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationService")
            .field("active", &self.active_count())
            .finish()
    }
}

impl Default for NotificationService {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationService {
    /// Creates a service with no subscribers.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                events,
                next_id: AtomicU64::new(1),
                active: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Subscribes to future events.
    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.inner.events.subscribe()
    }

    /// Number of notifications currently shown.
    pub fn active_count(&self) -> usize {
        self.inner.active().len()
    }

    fn spawn_timer(weak: Weak<Inner>, id: NotificationId, after: Duration) -> Option<JoinHandle<()>> {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => Some(handle.spawn(async move {
                tokio::time::sleep(after).await;
                if let Some(inner) = weak.upgrade() {
                    inner.expire(id);
                }
            })),
            Err(_) => {
                warn!("No async runtime; notification {} will stay until dismissed", id);
                None
            }
        }
    }
}

impl Notifier for NotificationService {
    fn notify(
        &self,
        kind: NotificationKind,
        message: String,
        duration: Option<Duration>,
    ) -> NotificationId {
        let id = NotificationId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let duration = duration.unwrap_or_else(|| kind.default_duration());
        let duration = (!duration.is_zero()).then_some(duration);

        {
            // Held across spawn so the timer cannot expire an unregistered id
            let mut active = self.inner.active();
            let timer = duration
                .and_then(|after| Self::spawn_timer(Arc::downgrade(&self.inner), id, after));
            active.insert(id, timer);
        }

        self.inner.publish(NotificationEvent::Shown(Notification {
            id,
            kind,
            message,
            duration,
        }));
        id
    }

    fn dismiss(&self, id: NotificationId) -> bool {
        let Some(timer) = self.inner.active().remove(&id) else {
            return false;
        };
        if let Some(timer) = timer {
            timer.abort();
        }
        self.inner.publish(NotificationEvent::Dismissed {
            id,
            reason: DismissReason::Manual,
        });
        true
    }
}
