//! One editing session: editor, autosave and manual save wired together.

use std::sync::Arc;
use std::time::Duration;

use storebooks_shared::JournalConfig;
use storebooks_shared::types::{EntryId, StoreId};
use tracing::{debug, info};

use super::autosave::{AutoSaveOutcome, AutoSaveScheduler};
use super::editor::EntryEditor;
use super::submit::{EntrySubmitter, SubmitError, SubmitOutcome};
use super::types::EntryHeader;
use super::validation::ValidationReport;
use crate::catalog::{LookupError, SessionLookups};

/// Editing session of a single entry.
///
/// Edits reschedule the autosave until the entry has been posted.
pub struct EntrySession {
    editor: EntryEditor,
    lookups: SessionLookups,
    submitter: Arc<EntrySubmitter>,
    autosave: AutoSaveScheduler,
    posted: Option<EntryId>,
}

impl EntrySession {
    /// Loads the catalog and reference listings and opens a fresh entry.
    ///
    /// # Errors
    ///
    /// Returns the lookup error if a listing cannot be fetched.
    pub async fn open(
        lookups: SessionLookups,
        header: EntryHeader,
        submitter: Arc<EntrySubmitter>,
        config: &JournalConfig,
    ) -> Result<Self, LookupError> {
        let catalog = lookups.catalog().await?;
        let reference = lookups.reference_data(header.store_id).await?;
        let editor = EntryEditor::new(header, catalog, reference, config);
        let autosave = AutoSaveScheduler::new(
            Arc::clone(&submitter),
            Duration::from_secs(config.autosave_debounce_secs),
        );

        debug!(commit_key = %editor.commit_key(), "Entry session opened");
        Ok(Self {
            editor,
            lookups,
            submitter,
            autosave,
            posted: None,
        })
    }

    /// Current editor state.
    #[must_use]
    pub fn editor(&self) -> &EntryEditor {
        &self.editor
    }

    /// Entry ID once a manual save has succeeded.
    #[must_use]
    pub fn posted(&self) -> Option<EntryId> {
        self.posted
    }

    /// Applies `f` to the editor, rescheduling the autosave if anything changed.
    pub fn edit<T>(&mut self, f: impl FnOnce(&mut EntryEditor) -> T) -> T {
        let before = self.editor.revision();
        let result = f(&mut self.editor);
        if self.editor.revision() != before {
            self.schedule_autosave();
        }
        result
    }

    /// Switches the entry to `store_id`, fetching that store's cash locations.
    ///
    /// # Errors
    ///
    /// Returns the lookup error; the editor is left unchanged.
    pub async fn change_store(
        &mut self,
        store_id: Option<StoreId>,
    ) -> Result<&ValidationReport, LookupError> {
        let reference = self.lookups.reference_data(store_id).await?;
        self.editor.set_store(store_id, reference);
        self.schedule_autosave();
        Ok(self.editor.report())
    }

    /// Posts the entry.
    ///
    /// A pending autosave is cancelled, or awaited if it already started
    /// committing, so the manual save always writes last.
    ///
    /// # Errors
    ///
    /// Returns the submit error; the session stays open for correction.
    pub async fn save(&mut self) -> Result<SubmitOutcome, SubmitError> {
        if let Some(outcome) = self.autosave.cancel_or_wait().await {
            debug!(?outcome, "Pending autosave settled before manual save");
        }

        let outcome = self.submitter.submit(self.editor.snapshot()).await?;
        info!(entry_id = %outcome.entry_id, "Entry session posted");
        self.posted = Some(outcome.entry_id);
        Ok(outcome)
    }

    /// Waits for the pending autosave, if any.
    pub async fn wait_autosave(&mut self) -> Option<AutoSaveOutcome> {
        self.autosave.wait().await
    }

    fn schedule_autosave(&mut self) {
        if self.posted.is_none() {
            self.autosave.schedule(self.editor.snapshot());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::catalog::{
        Account, AccountType, CashLocation, CategoryTag, LocationType, MockLookupSource,
    };
    use crate::journal::gateway::{MockPersistenceGateway, MockReconciler, Requester};
    use crate::journal::types::EntryStatus;
    use crate::journal::validation::BalanceValidator;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use storebooks_shared::types::{
        AccountId, CashLocationId, CommitKey, CompanyId, StoreId, UserId,
    };

    #[derive(Clone, Copy)]
    struct Fixture {
        requester: Requester,
        store: StoreId,
        cash: AccountId,
        sales: AccountId,
        till: CashLocationId,
    }

    fn fixture() -> Fixture {
        Fixture {
            requester: Requester {
                user_id: UserId::new(),
                company_id: CompanyId::new(),
            },
            store: StoreId::new(),
            cash: AccountId::new(),
            sales: AccountId::new(),
            till: CashLocationId::new(),
        }
    }

    fn source(f: Fixture) -> MockLookupSource {
        let mut source = MockLookupSource::new();
        source.expect_accounts().returning(move |_| {
            Ok(vec![
                Account {
                    id: f.cash,
                    name: "Cash".to_string(),
                    account_type: AccountType::Asset,
                    category_tag: Some(CategoryTag::Cash),
                },
                Account {
                    id: f.sales,
                    name: "Sales Revenue".to_string(),
                    account_type: AccountType::Income,
                    category_tag: None,
                },
            ])
        });
        source
            .expect_cash_locations()
            .returning(move |company_id, store_id| {
                Ok(vec![CashLocation {
                    id: f.till,
                    company_id,
                    store_id,
                    name: "Front till".to_string(),
                    location_type: LocationType::Cash,
                }])
            });
        source.expect_counterparties().returning(|_| Ok(vec![]));
        source
    }

    async fn open(f: Fixture, gateway: MockPersistenceGateway) -> EntrySession {
        let submitter = Arc::new(EntrySubmitter::new(
            Arc::new(gateway),
            Arc::new(MockReconciler::new()),
            BalanceValidator::default(),
            f.requester,
        ));
        let lookups = SessionLookups::new(Arc::new(source(f)), f.requester.company_id);
        let header = EntryHeader {
            company_id: f.requester.company_id,
            store_id: Some(f.store),
            entry_date: NaiveDate::from_ymd_opt(2026, 10, 2).unwrap(),
            description: "Morning sales".to_string(),
            created_by: f.requester.user_id,
        };
        EntrySession::open(lookups, header, submitter, &JournalConfig::default())
            .await
            .unwrap()
    }

    fn fill_cash_sale(session: &mut EntrySession, f: Fixture) {
        session.edit(|e| {
            e.select_account(0, Some(f.cash)).unwrap();
            e.set_amounts(0, dec!(100), dec!(0)).unwrap();
            e.set_cash_location(0, Some(f.till)).unwrap();
            e.select_account(1, Some(f.sales)).unwrap();
            e.set_amounts(1, dec!(0), dec!(100)).unwrap();
        });
    }

    type Calls = Arc<Mutex<Vec<(CommitKey, EntryStatus)>>>;

    fn recording_gateway(entry_id: EntryId, calls: &Calls) -> MockPersistenceGateway {
        let calls = Arc::clone(calls);
        let mut gateway = MockPersistenceGateway::new();
        gateway.expect_commit().returning(move |_, payload| {
            calls
                .lock()
                .unwrap()
                .push((payload.idempotency_key, payload.status));
            Ok(entry_id)
        });
        gateway
    }

    #[tokio::test(start_paused = true)]
    async fn test_autosave_then_manual_save_reuse_key() {
        let entry_id = EntryId::new();
        let calls = Calls::default();
        let f = fixture();
        let mut session = open(f, recording_gateway(entry_id, &calls)).await;

        fill_cash_sale(&mut session, f);
        tokio::time::advance(Duration::from_secs(31)).await;
        assert_eq!(
            session.wait_autosave().await,
            Some(AutoSaveOutcome::Saved(entry_id))
        );

        let outcome = session.save().await.unwrap();

        assert_eq!(outcome.entry_id, entry_id);
        assert_eq!(session.posted(), Some(entry_id));
        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, calls[1].0);
        assert_eq!(calls[0].1, EntryStatus::Draft);
        assert_eq!(calls[1].1, EntryStatus::Posted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_save_cancels_pending_autosave() {
        let calls = Calls::default();
        let f = fixture();
        let mut session = open(f, recording_gateway(EntryId::new(), &calls)).await;

        fill_cash_sale(&mut session, f);
        tokio::time::advance(Duration::from_secs(5)).await;
        session.save().await.unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, EntryStatus::Posted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_autosave_after_post() {
        let calls = Calls::default();
        let f = fixture();
        let mut session = open(f, recording_gateway(EntryId::new(), &calls)).await;
        fill_cash_sale(&mut session, f);
        session.save().await.unwrap();

        session.edit(|e| {
            e.set_description("Late memo");
        });

        assert_eq!(session.wait_autosave().await, None);
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_edit_does_not_schedule() {
        let mut gateway = MockPersistenceGateway::new();
        gateway.expect_commit().times(0);
        let mut session = open(fixture(), gateway).await;

        let result = session.edit(|e| e.remove_line(7).map(|_| ()));

        assert!(result.is_err());
        assert_eq!(session.wait_autosave().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_change_store_clears_locations() {
        let calls = Calls::default();
        let f = fixture();
        let mut session = open(f, recording_gateway(EntryId::new(), &calls)).await;
        fill_cash_sale(&mut session, f);
        assert!(session.editor().report().is_valid());

        let other = StoreId::new();
        let valid = session
            .change_store(Some(other))
            .await
            .unwrap()
            .is_valid();

        assert!(!valid);
        assert_eq!(session.editor().header().store_id, Some(other));
        assert!(session.editor().collect()[0].extension.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_manual_save_keeps_session_open() {
        let mut gateway = MockPersistenceGateway::new();
        gateway.expect_commit().times(0);
        let f = fixture();
        let mut session = open(f, gateway).await;
        session.edit(|e| {
            e.select_account(0, Some(f.cash)).unwrap();
            e.set_amounts(0, dec!(100), dec!(0)).unwrap();
        });

        let err = session.save().await.unwrap_err();

        assert!(matches!(err, SubmitError::Invalid(_)));
        assert_eq!(session.posted(), None);
        assert_eq!(f.requester.company_id, session.editor().header().company_id);
    }
}
