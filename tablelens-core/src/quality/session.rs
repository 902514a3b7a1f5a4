//! Assessment session with last-request-wins publication.
//!
//! A session owns the assessor state machine
//! `Idle -> Running -> Succeeded | Failed -> Idle` and publishes it on a
//! `watch` channel. Requesting a new table supersedes whatever is in flight:
//! the previous task is aborted, and a generation check at publication time
//! keeps a superseded outcome from ever becoming visible, whichever
//! resolves first.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::notify::Notifier;

use super::assessor::QualityAssessor;
use super::models::QualityReport;

/// Observable state of an [`AssessmentSession`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum AssessmentState {
    /// Nothing requested, or reset
    Idle,
    /// An assessment is in flight
    Running {
        /// Table being assessed
        table: String,
    },
    /// The latest request produced a report
    Succeeded {
        /// The report
        report: QualityReport,
        /// Completion time
        finished_at: DateTime<Utc>,
    },
    /// The latest request failed
    Failed {
        /// Table that failed
        table: String,
        /// Upstream error text, verbatim
        message: String,
        /// Completion time
        finished_at: DateTime<Utc>,
    },
}

impl AssessmentState {
    /// Returns true for `Succeeded` and `Failed`.
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Succeeded { .. } | Self::Failed { .. })
    }

    /// Table this state refers to, if any.
    pub fn table(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Running { table } | Self::Failed { table, .. } => Some(table),
            Self::Succeeded { report, .. } => Some(&report.table_name),
        }
    }
}

/// Runs assessments one table at a time, surfacing only the latest.
///
/// Must be used from within a Tokio runtime.
pub struct AssessmentSession {
    assessor: QualityAssessor,
    notifier: Option<Arc<dyn Notifier>>,
    state: Arc<watch::Sender<AssessmentState>>,
    generation: Arc<AtomicU64>,
    in_flight: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for AssessmentSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssessmentSession")
            .field("assessor", &self.assessor)
            .field("state", &*self.state.borrow())
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .finish()
    }
}

impl AssessmentSession {
    /// Creates an idle session.
    pub fn new(assessor: QualityAssessor) -> Self {
        let (state, _) = watch::channel(AssessmentState::Idle);
        Self {
            assessor,
            notifier: None,
            state: Arc::new(state),
            generation: Arc::new(AtomicU64::new(0)),
            in_flight: Mutex::new(None),
        }
    }

    /// Builder method to report failures through a notifier.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<AssessmentState> {
        self.state.subscribe()
    }

    /// Current state.
    pub fn state(&self) -> AssessmentState {
        self.state.borrow().clone()
    }

    /// Starts assessing `table`, superseding any in-flight assessment.
    ///
    /// The state becomes `Running { table }` before this returns. Concurrent
    /// callers are serialized, so the published table always belongs to the
    /// current generation.
    pub fn request(&self, table: impl Into<String>) {
        let table = table.into();
        let mut in_flight = self.lock_in_flight();
        let generation = self.supersede(&mut in_flight);
        self.state.send_replace(AssessmentState::Running {
            table: table.clone(),
        });
        debug!("Assessment requested for '{}' (generation {})", table, generation);

        let assessor = self.assessor.clone();
        let notifier = self.notifier.clone();
        let state = Arc::clone(&self.state);
        let current = Arc::clone(&self.generation);

        *in_flight = Some(tokio::spawn(async move {
            let outcome = assessor.assess(&table).await;
            let finished_at = Utc::now();
            let failure = outcome.as_ref().err().map(ToString::to_string);
            let next = match outcome {
                Ok(report) => AssessmentState::Succeeded {
                    report,
                    finished_at,
                },
                Err(e) => AssessmentState::Failed {
                    table: table.clone(),
                    message: e.to_string(),
                    finished_at,
                },
            };

            let published = state.send_if_modified(|slot| {
                if current.load(Ordering::SeqCst) != generation {
                    return false;
                }
                *slot = next;
                true
            });

            if !published {
                debug!("Discarded superseded outcome for '{}'", table);
                return;
            }
            info!("Assessment for '{}' finished", table);
            if let (Some(message), Some(notifier)) = (failure, notifier) {
                notifier.error(&message);
            }
        }));
    }

    /// Cancels in-flight work and returns to `Idle`.
    pub fn reset(&self) {
        let mut in_flight = self.lock_in_flight();
        self.supersede(&mut in_flight);
        self.state.send_replace(AssessmentState::Idle);
    }

    fn lock_in_flight(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.in_flight.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Bumps the generation and aborts the in-flight task. Callers hold the
    /// `in_flight` lock.
    fn supersede(&self, in_flight: &mut Option<JoinHandle<()>>) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(previous) = in_flight.take() {
            previous.abort();
        }
        generation
    }
}

impl Drop for AssessmentSession {
    fn drop(&mut self) {
        let slot = self.in_flight.get_mut().unwrap_or_else(|p| p.into_inner());
        if let Some(handle) = slot.take() {
            handle.abort();
        }
    }
}
