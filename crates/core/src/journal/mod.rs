//! Journal entry composition, validation and commit.
//!
//! - `types` - Header, extension details and entry status
//! - `line` - Per-line state machine and editor affordances
//! - `collector` - Turns editor lines into collected lines, synthesizing default details
//! - `rules` - Completeness rules owned by each extension type
//! - `validation` - Strict and relaxed validation of a whole entry
//! - `composer` - Canonical commit payload assembly
//! - `gateway` - Persistence and reconciliation contracts
//! - `submit` - Manual and draft save orchestration
//! - `autosave` - Debounced draft saving and the save gate
//! - `editor` - In-memory editing of one entry
//! - `session` - Editor, autosave and manual save wired together

pub mod autosave;
pub mod collector;
pub mod composer;
pub mod editor;
pub mod gateway;
pub mod line;
pub mod rules;
pub mod session;
pub mod submit;
pub mod types;
pub mod validation;

#[cfg(test)]
mod composer_props;
#[cfg(test)]
mod validation_props;

pub use autosave::{AutoSaveOutcome, AutoSaveScheduler, SaveGate, SaveGuard};
pub use collector::{CollectedLine, DetailsCollector, Unresolved};
pub use composer::{
    CommitPayload, EntryComposer, PayloadLine, PrimaryReferences, ReconciliationRequest,
};
pub use editor::EntryEditor;
pub use gateway::{
    CommitError, CommitErrorBody, CommitErrorKind, CommitResponse, PersistenceGateway,
    ReconcileError, ReconcileResponse, Reconciler, Requester,
};
pub use line::{
    JournalLineDraft, LineAffordances, LineError, LineState, LineStateKind, PickerState,
    Transition,
};
pub use rules::{ExtensionRules, RuleContext};
pub use session::EntrySession;
pub use submit::{
    EntrySnapshot, EntrySubmitter, ReconciliationStatus, SubmitError, SubmitOutcome,
};
pub use types::{
    CashDetail, DebtCategory, DebtDetail, DebtDirection, DebtTerms, DepreciationMethod,
    DetailOrigin, EntryHeader, EntryStatus, FixedAssetDetail, InternalLink, LineExtension,
};
pub use validation::{
    BalanceValidator, Rule, Totals, ValidatedLines, ValidationMode, ValidationReport, Violation,
};

#[cfg(test)]
pub use gateway::{MockPersistenceGateway, MockReconciler};
