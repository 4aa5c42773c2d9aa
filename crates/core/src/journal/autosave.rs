//! Debounced draft saving.
//!
//! At most one autosave task is pending per entry. Each edit cancels it and
//! schedules a new one; a manual save cancels it, or waits for it if it is
//! already committing, and holds the [`SaveGate`] so no autosave can start
//! while the manual commit is outstanding.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use storebooks_shared::types::EntryId;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::gateway::CommitError;
use super::submit::{EntrySnapshot, EntrySubmitter, SubmitError};
use super::validation::Violation;

/// Single-slot lock preventing two concurrent commits of the same entry.
#[derive(Debug, Clone, Default)]
pub struct SaveGate {
    busy: Arc<AtomicBool>,
}

impl SaveGate {
    /// Creates an open gate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the gate; `None` if a save is already in flight.
    #[must_use]
    pub fn try_acquire(&self) -> Option<SaveGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SaveGuard {
                busy: Arc::clone(&self.busy),
            })
    }

    /// Returns true while a save holds the gate.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Releases the [`SaveGate`] on drop.
#[derive(Debug)]
pub struct SaveGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for SaveGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// How a scheduled autosave ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoSaveOutcome {
    /// Cancelled before the debounce elapsed.
    Cancelled,
    /// Another save held the gate.
    Suppressed,
    /// Draft written.
    Saved(EntryId),
    /// Nothing worth saving yet.
    Skipped(Vec<Violation>),
    /// Gateway rejected the draft.
    Failed(CommitError),
}

impl From<Result<EntryId, SubmitError>> for AutoSaveOutcome {
    fn from(result: Result<EntryId, SubmitError>) -> Self {
        match result {
            Ok(entry_id) => Self::Saved(entry_id),
            Err(SubmitError::SaveInFlight) => Self::Suppressed,
            Err(SubmitError::Invalid(violations)) => Self::Skipped(violations),
            Err(SubmitError::Commit(err)) => Self::Failed(err),
        }
    }
}

struct PendingSave {
    token: CancellationToken,
    handle: JoinHandle<AutoSaveOutcome>,
}

/// Owner of the single pending autosave task of an entry.
pub struct AutoSaveScheduler {
    submitter: Arc<EntrySubmitter>,
    debounce: Duration,
    pending: Option<PendingSave>,
}

impl AutoSaveScheduler {
    /// Creates a scheduler saving drafts `debounce` after the last edit.
    #[must_use]
    pub fn new(submitter: Arc<EntrySubmitter>, debounce: Duration) -> Self {
        Self {
            submitter,
            debounce,
            pending: None,
        }
    }

    /// Cancels any pending autosave and schedules one for `snapshot`.
    pub fn schedule(&mut self, snapshot: EntrySnapshot) {
        self.cancel();

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let submitter = Arc::clone(&self.submitter);
        let debounce = self.debounce;
        let revision = snapshot.revision;

        let handle = tokio::spawn(async move {
            tokio::select! {
                biased;
                () = cancelled.cancelled() => AutoSaveOutcome::Cancelled,
                () = tokio::time::sleep(debounce) => {
                    let outcome = AutoSaveOutcome::from(submitter.save_draft(snapshot).await);
                    match &outcome {
                        AutoSaveOutcome::Failed(err) => warn!(revision, error = %err, "Autosave failed"),
                        AutoSaveOutcome::Suppressed => debug!(revision, "Autosave suppressed by save in flight"),
                        _ => {}
                    }
                    outcome
                }
            }
        });

        debug!(revision, delay_secs = debounce.as_secs(), "Autosave scheduled");
        self.pending = Some(PendingSave { token, handle });
    }

    /// Cancels the pending autosave if it has not started committing.
    ///
    /// A commit already under way runs to completion in the background.
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.token.cancel();
        }
    }

    /// Cancels the pending autosave, or waits for it if it is already committing.
    pub async fn cancel_or_wait(&mut self) -> Option<AutoSaveOutcome> {
        let pending = self.pending.take()?;
        pending.token.cancel();
        Some(Self::join(pending.handle).await)
    }

    /// Waits for the pending autosave to finish.
    pub async fn wait(&mut self) -> Option<AutoSaveOutcome> {
        let pending = self.pending.take()?;
        Some(Self::join(pending.handle).await)
    }

    /// Returns true if an autosave task is scheduled and not yet finished.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|pending| !pending.handle.is_finished())
    }

    async fn join(handle: JoinHandle<AutoSaveOutcome>) -> AutoSaveOutcome {
        match handle.await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(error = %err, "Autosave task did not complete");
                AutoSaveOutcome::Cancelled
            }
        }
    }
}

impl Drop for AutoSaveScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}
