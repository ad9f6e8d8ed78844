//! Periodic autosave of dirty documents.
//!
//! The sweep task holds only a weak reference to its session and stops on
//! its own once the session is gone. Cancelling lets an in-flight save
//! finish but starts no further saves.

use std::sync::{Arc, Weak};
use std::time::Duration;

use lexdraft_core::document::DocumentId;
use lexdraft_core::error::LexdraftError;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;

use crate::session::{EditingSession, SessionNotice};

/// Result of one autosave sweep.
#[derive(Debug, Default)]
pub struct AutosaveReport {
    /// Identities after the save (a draft reports its new permanent id).
    pub saved: Vec<DocumentId>,
    /// Documents that were clean or closed by the time their turn came.
    pub skipped: Vec<DocumentId>,
    pub failed: Vec<(DocumentId, LexdraftError)>,
}

impl AutosaveReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AutosaveScheduler {
    interval: Duration,
}

impl AutosaveScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Spawns the sweep loop. The first sweep runs one interval from now;
    /// ticks missed while a sweep is running are delayed, not bursted.
    pub fn spawn(&self, session: &Arc<EditingSession>) -> AutosaveHandle {
        let token = CancellationToken::new();
        let session = Arc::downgrade(session);
        let period = self.interval;
        let task = tokio::spawn(run(session, period, token.clone()));
        tracing::info!(target: "autosave", "Scheduler started ({:?} interval)", period);

        AutosaveHandle {
            token,
            task: Some(task),
        }
    }

    /// Saves every document that is dirty at the start of the sweep, one at a
    /// time, stopping early if `cancel` fires between documents.
    pub async fn sweep(session: &EditingSession, cancel: &CancellationToken) -> AutosaveReport {
        let mut report = AutosaveReport::default();
        let dirty = session.dirty_ids().await;
        tracing::debug!(target: "autosave", "Tick - {} dirty document(s)", dirty.len());

        for id in dirty {
            if cancel.is_cancelled() {
                tracing::debug!(target: "autosave", "Sweep cancelled before {}", id);
                break;
            }
            match session.save_if_dirty(&id).await {
                Ok(Some(saved)) => report.saved.push(saved),
                Ok(None) => report.skipped.push(id),
                Err(e) if e.is_not_open() => report.skipped.push(id),
                Err(e) => {
                    tracing::warn!(target: "autosave", "Autosave of {} failed: {}", id, e);
                    session.notify(SessionNotice::AutosaveFailed {
                        id: id.clone(),
                        error: e.to_string(),
                    });
                    report.failed.push((id, e));
                }
            }
        }

        if !report.saved.is_empty() || !report.failed.is_empty() {
            tracing::info!(
                target: "autosave",
                "Sweep done: {} saved, {} skipped, {} failed",
                report.saved.len(),
                report.skipped.len(),
                report.failed.len()
            );
        }
        report
    }
}

async fn run(session: Weak<EditingSession>, period: Duration, token: CancellationToken) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = ticker.tick() => {}
        }
        let Some(session) = session.upgrade() else {
            tracing::debug!(target: "autosave", "Session dropped, stopping scheduler");
            break;
        };
        AutosaveScheduler::sweep(&session, &token).await;
    }
    tracing::info!(target: "autosave", "Scheduler stopped");
}

/// Owner of a running sweep loop. Dropping it cancels the loop.
#[derive(Debug)]
pub struct AutosaveHandle {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl AutosaveHandle {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancels and waits for the loop to exit.
    pub async fn shutdown(mut self) {
        self.token.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(target: "autosave", "Scheduler task ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for AutosaveHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
