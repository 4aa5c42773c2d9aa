//! Manual and draft save orchestration.

use std::sync::Arc;

use storebooks_shared::types::{CommitKey, EntryId};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use super::autosave::SaveGate;
use super::collector::CollectedLine;
use super::composer::{CommitPayload, EntryComposer};
use super::gateway::{CommitError, PersistenceGateway, Reconciler, Requester};
use super::types::{EntryHeader, EntryStatus};
use super::validation::{BalanceValidator, ValidationMode, Violation};
use crate::catalog::ReferenceData;

/// Frozen copy of the editor state handed to a save.
#[derive(Debug, Clone)]
pub struct EntrySnapshot {
    /// Header fields.
    pub header: EntryHeader,
    /// Collected lines.
    pub lines: Vec<CollectedLine>,
    /// Reference listings the lines are validated against.
    pub reference: Arc<ReferenceData>,
    /// Idempotency key of the editing session.
    pub commit_key: CommitKey,
    /// Editor revision the snapshot was taken at.
    pub revision: u64,
}

/// What happened to the post-commit reconciliation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconciliationStatus {
    /// No line carried a counterparty cash location.
    NotRequired,
    /// Location attached.
    Applied,
    /// Reconciler ran but did not attach the location.
    NotApplied,
    /// Reconciler failed; the entry itself is committed.
    Failed(String),
}

impl ReconciliationStatus {
    /// Returns true if the user should see a warning.
    #[must_use]
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::NotApplied | Self::Failed(_))
    }
}

/// Result of a successful manual save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    /// Committed entry.
    pub entry_id: EntryId,
    /// Status written.
    pub status: EntryStatus,
    /// Outcome of the reconciliation step.
    pub reconciliation: ReconciliationStatus,
}

/// Errors from a save attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// Lines failed validation; the gateway was not called.
    #[error("Entry has {} validation error(s)", .0.len())]
    Invalid(Vec<Violation>),

    /// Another save of the same entry is still outstanding.
    #[error("A save is already in progress")]
    SaveInFlight,

    /// The gateway rejected the commit.
    #[error(transparent)]
    Commit(#[from] CommitError),
}

impl SubmitError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Invalid(_) => "VALIDATION_ERROR",
            Self::SaveInFlight => "SAVE_IN_FLIGHT",
            Self::Commit(err) => err.error_code(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Invalid(_) => 422,
            Self::SaveInFlight => 409,
            Self::Commit(err) => err.http_status_code(),
        }
    }
}

/// Runs validation, composition, commit and reconciliation for one entry.
pub struct EntrySubmitter {
    gateway: Arc<dyn PersistenceGateway>,
    reconciler: Arc<dyn Reconciler>,
    validator: BalanceValidator,
    gate: SaveGate,
    requester: Requester,
}

impl EntrySubmitter {
    /// Creates a submitter acting as `requester`.
    #[must_use]
    pub fn new(
        gateway: Arc<dyn PersistenceGateway>,
        reconciler: Arc<dyn Reconciler>,
        validator: BalanceValidator,
        requester: Requester,
    ) -> Self {
        Self {
            gateway,
            reconciler,
            validator,
            gate: SaveGate::new(),
            requester,
        }
    }

    /// Gate shared by every save of this entry.
    #[must_use]
    pub fn gate(&self) -> &SaveGate {
        &self.gate
    }

    /// Manual save: strict validation, posted status, then reconciliation.
    ///
    /// Nothing reaches the gateway if any violation is found.
    #[instrument(skip(self, snapshot), fields(revision = snapshot.revision))]
    pub async fn submit(&self, snapshot: EntrySnapshot) -> Result<SubmitOutcome, SubmitError> {
        let _guard = self.gate.try_acquire().ok_or(SubmitError::SaveInFlight)?;

        let payload = self.compose(snapshot, ValidationMode::Strict)?;
        let entry_id = self.gateway.commit(&self.requester, &payload).await?;
        info!(entry_id = %entry_id, base_amount = %payload.base_amount, "Journal entry posted");

        let reconciliation = self.reconcile(&payload, entry_id).await;

        Ok(SubmitOutcome {
            entry_id,
            status: payload.status,
            reconciliation,
        })
    }

    /// Draft save: relaxed validation, draft status, no reconciliation.
    #[instrument(skip(self, snapshot), fields(revision = snapshot.revision))]
    pub async fn save_draft(&self, snapshot: EntrySnapshot) -> Result<EntryId, SubmitError> {
        let _guard = self.gate.try_acquire().ok_or(SubmitError::SaveInFlight)?;

        let payload = self.compose(snapshot, ValidationMode::Relaxed)?;
        let entry_id = self.gateway.commit(&self.requester, &payload).await?;
        debug!(entry_id = %entry_id, "Draft saved");

        Ok(entry_id)
    }

    fn compose(
        &self,
        snapshot: EntrySnapshot,
        mode: ValidationMode,
    ) -> Result<CommitPayload, SubmitError> {
        let validated = self
            .validator
            .validate_for_commit(&snapshot.header, snapshot.lines, &snapshot.reference, mode)
            .map_err(SubmitError::Invalid)?;

        Ok(EntryComposer::compose(
            &snapshot.header,
            validated,
            snapshot.commit_key,
        ))
    }

    async fn reconcile(&self, payload: &CommitPayload, entry_id: EntryId) -> ReconciliationStatus {
        let Some(request) = payload.reconciliation_request(entry_id) else {
            return ReconciliationStatus::NotRequired;
        };

        match self
            .reconciler
            .attach_counterparty_cash_location(&self.requester, &request)
            .await
        {
            Ok(true) => ReconciliationStatus::Applied,
            Ok(false) => {
                warn!(entry_id = %entry_id, "Counterparty cash location was not attached");
                ReconciliationStatus::NotApplied
            }
            Err(err) => {
                warn!(
                    entry_id = %entry_id,
                    error = %err,
                    "Reconciliation failed; entry stays committed"
                );
                ReconciliationStatus::Failed(err.to_string())
            }
        }
    }
}
