//! Journal repository: atomic entry commit and post-commit reconciliation.
//!
//! A commit re-validates the payload against the stored catalog, then writes
//! header, lines and line extensions in one database transaction. The
//! idempotency key decides between insert, draft replacement and replay.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveValue::NotSet, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr,
    EntityTrait, QueryFilter, Set, SqlErr, TransactionTrait,
};
use storebooks_core::catalog::AccountCatalog;
use storebooks_core::journal::{
    BalanceValidator, CommitError, CommitPayload, LineExtension, PersistenceGateway,
    ReconcileError, ReconciliationRequest, Reconciler, Requester, ValidationMode,
};
use storebooks_shared::types::EntryId;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::catalog::CatalogRepository;
use crate::entities::{
    journal_entries, journal_line_cash, journal_line_debts, journal_line_fixed_assets,
    journal_lines,
    sea_orm_active_enums::EntryStatus,
};

/// What an already-used idempotency key means for an incoming payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyResolution {
    /// Entry already posted with this key; return it unchanged.
    Replay(EntryId),
    /// Draft stored under this key; overwrite it in place.
    ReplaceDraft(EntryId),
}

fn resolve_existing(
    entry: &journal_entries::Model,
    payload: &CommitPayload,
) -> Result<KeyResolution, CommitError> {
    let entry_id = EntryId::from_uuid(entry.id);

    if entry.company_id != payload.company_id.into_inner() {
        return Err(CommitError::Conflict(format!(
            "Idempotency key {} is used by another company",
            payload.idempotency_key
        )));
    }

    match (entry.status, payload.status) {
        (EntryStatus::Draft, _) => Ok(KeyResolution::ReplaceDraft(entry_id)),
        (EntryStatus::Posted, storebooks_core::journal::EntryStatus::Posted) => {
            Ok(KeyResolution::Replay(entry_id))
        }
        (EntryStatus::Posted, storebooks_core::journal::EntryStatus::Draft) => Err(
            CommitError::Conflict(format!("Entry {entry_id} is already posted")),
        ),
    }
}

fn commit_error(err: DbErr) -> CommitError {
    if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
        return CommitError::Conflict(detail);
    }
    match &err {
        DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => CommitError::Transport(err.to_string()),
        _ => CommitError::Storage(err.to_string()),
    }
}

fn reconcile_error(err: DbErr) -> ReconcileError {
    match &err {
        DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => ReconcileError::Transport(err.to_string()),
        _ => ReconcileError::Storage(err.to_string()),
    }
}

/// Journal repository implementing the commit and reconciliation contracts.
#[derive(Debug, Clone)]
pub struct JournalRepository {
    db: DatabaseConnection,
    catalog: CatalogRepository,
    validator: BalanceValidator,
}

impl JournalRepository {
    /// Creates a new journal repository validating with `validator`.
    #[must_use]
    pub fn new(db: DatabaseConnection, validator: BalanceValidator) -> Self {
        Self {
            catalog: CatalogRepository::new(db.clone()),
            db,
            validator,
        }
    }

    /// Runs the same validation the editor ran, against stored accounts and listings.
    async fn revalidate(&self, payload: &CommitPayload) -> Result<(), CommitError> {
        let accounts = self
            .catalog
            .list_accounts(payload.company_id)
            .await
            .map_err(commit_error)?;
        let reference = self
            .catalog
            .reference_data(payload.company_id, payload.store_id)
            .await
            .map_err(commit_error)?;

        let catalog = AccountCatalog::new(accounts);
        let lines = payload
            .reread(&catalog)
            .map_err(|violations| CommitError::from_violations(&violations))?;

        let mode = ValidationMode::for_status(payload.status);
        let validated = self
            .validator
            .validate_for_commit(&payload.header(), lines, &reference, mode)
            .map_err(|violations| {
                debug!(count = violations.len(), "Server-side validation failed");
                CommitError::from_violations(&violations)
            })?;

        let expected = validated.totals().base_amount();
        if payload.base_amount != expected {
            return Err(CommitError::Validation {
                line_index: None,
                rule: None,
                message: format!(
                    "Base amount {} does not match line totals {expected}",
                    payload.base_amount
                ),
            });
        }

        Ok(())
    }

    async fn insert_header(
        txn: &DatabaseTransaction,
        entry_id: EntryId,
        payload: &CommitPayload,
    ) -> Result<(), CommitError> {
        journal_entries::Entity::insert(header_model(entry_id, payload))
            .exec_without_returning(txn)
            .await
            .map_err(commit_error)?;
        Ok(())
    }

    /// Overwrites a stored draft's header and drops its lines; extensions cascade.
    async fn replace_draft(
        txn: &DatabaseTransaction,
        entry_id: EntryId,
        payload: &CommitPayload,
    ) -> Result<(), CommitError> {
        let mut header = header_model(entry_id, payload);
        header.id = NotSet;
        header.idempotency_key = NotSet;
        header.created_by = NotSet;
        header.created_at = NotSet;
        header.counterparty_cash_location_id = NotSet;

        journal_entries::Entity::update_many()
            .set(header)
            .filter(journal_entries::Column::Id.eq(entry_id.into_inner()))
            .exec(txn)
            .await
            .map_err(commit_error)?;

        let removed = journal_lines::Entity::delete_many()
            .filter(journal_lines::Column::JournalEntryId.eq(entry_id.into_inner()))
            .exec(txn)
            .await
            .map_err(commit_error)?;
        debug!(entry_id = %entry_id, removed = removed.rows_affected, "Draft lines replaced");

        Ok(())
    }

    /// Inserts every line and its extension sub-record.
    async fn insert_lines(
        txn: &DatabaseTransaction,
        entry_id: EntryId,
        payload: &CommitPayload,
    ) -> Result<(), CommitError> {
        let rows = LineRows::build(entry_id, payload)?;

        if !rows.lines.is_empty() {
            journal_lines::Entity::insert_many(rows.lines)
                .exec_without_returning(txn)
                .await
                .map_err(commit_error)?;
        }
        if !rows.cash.is_empty() {
            journal_line_cash::Entity::insert_many(rows.cash)
                .exec_without_returning(txn)
                .await
                .map_err(commit_error)?;
        }
        if !rows.debts.is_empty() {
            journal_line_debts::Entity::insert_many(rows.debts)
                .exec_without_returning(txn)
                .await
                .map_err(commit_error)?;
        }
        if !rows.fixed_assets.is_empty() {
            journal_line_fixed_assets::Entity::insert_many(rows.fixed_assets)
                .exec_without_returning(txn)
                .await
                .map_err(commit_error)?;
        }

        Ok(())
    }
}

fn header_model(entry_id: EntryId, payload: &CommitPayload) -> journal_entries::ActiveModel {
    let now: DateTimeWithTimeZone = Utc::now().into();
    journal_entries::ActiveModel {
        id: Set(entry_id.into_inner()),
        company_id: Set(payload.company_id.into_inner()),
        store_id: Set(payload.store_id.map(Into::into)),
        entry_date: Set(payload.entry_date),
        description: Set(payload.description.clone()),
        counterparty_id: Set(payload.counterparty_id.map(Into::into)),
        cash_location_id: Set(payload.cash_location_id.map(Into::into)),
        counterparty_cash_location_id: Set(None),
        base_amount: Set(payload.base_amount),
        status: Set(payload.status.into()),
        idempotency_key: Set(payload.idempotency_key.into_inner()),
        created_by: Set(payload.created_by.into_inner()),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

/// Rows of one payload, grouped per table.
#[derive(Default)]
struct LineRows {
    lines: Vec<journal_lines::ActiveModel>,
    cash: Vec<journal_line_cash::ActiveModel>,
    debts: Vec<journal_line_debts::ActiveModel>,
    fixed_assets: Vec<journal_line_fixed_assets::ActiveModel>,
}

impl LineRows {
    fn build(entry_id: EntryId, payload: &CommitPayload) -> Result<Self, CommitError> {
        let now: DateTimeWithTimeZone = Utc::now().into();
        let mut rows = Self::default();

        for (index, line) in payload.lines.iter().enumerate() {
            let line_id = Uuid::now_v7();
            let line_no = i32::try_from(index + 1)
                .map_err(|_| CommitError::Storage(format!("Too many lines: {index}")))?;

            rows.lines.push(journal_lines::ActiveModel {
                id: Set(line_id),
                journal_entry_id: Set(entry_id.into_inner()),
                line_no: Set(line_no),
                account_id: Set(line.account_id.into_inner()),
                description: Set(line.description.clone()),
                debit: Set(line.debit),
                credit: Set(line.credit),
                created_at: Set(now),
            });

            match line.extension() {
                Some(LineExtension::Cash(detail)) => {
                    rows.cash.push(journal_line_cash::ActiveModel {
                        journal_line_id: Set(line_id),
                        cash_location_id: Set(detail.cash_location_id.into_inner()),
                    });
                }
                Some(LineExtension::Debt(detail)) => {
                    rows.debts.push(journal_line_debts::ActiveModel {
                        journal_line_id: Set(line_id),
                        direction: Set(detail.direction.into()),
                        category: Set(detail.category.into()),
                        issue_date: Set(detail.issue_date),
                        due_date: Set(detail.due_date),
                        interest_rate: Set(detail.interest_rate),
                        interest_account_id: Set(detail.interest_account_id.map(Into::into)),
                        interest_due_day: Set(detail.interest_due_day.map(i16::from)),
                        counterparty_id: Set(detail.counterparty_id.into_inner()),
                        linked_store_id: Set(detail.linked_store_id.map(Into::into)),
                        counterparty_cash_location_id: Set(detail
                            .counterparty_cash_location_id
                            .map(Into::into)),
                    });
                }
                Some(LineExtension::FixedAsset(detail)) => {
                    let useful_life_years = i32::try_from(detail.useful_life_years).map_err(|_| {
                        CommitError::Storage(format!(
                            "Useful life out of range: {}",
                            detail.useful_life_years
                        ))
                    })?;
                    rows.fixed_assets.push(journal_line_fixed_assets::ActiveModel {
                        journal_line_id: Set(line_id),
                        asset_name: Set(detail.asset_name),
                        acquisition_date: Set(detail.acquisition_date),
                        acquisition_cost: Set(detail.acquisition_cost),
                        useful_life_years: Set(useful_life_years),
                        salvage_value: Set(detail.salvage_value),
                        depreciation_method: Set(detail.depreciation_method.into()),
                    });
                }
                None => {}
            }
        }

        Ok(rows)
    }
}

#[async_trait]
impl PersistenceGateway for JournalRepository {
    #[instrument(
        skip(self, requester, payload),
        fields(
            company_id = %payload.company_id,
            idempotency_key = %payload.idempotency_key,
            status = payload.status.as_str()
        )
    )]
    async fn commit(
        &self,
        requester: &Requester,
        payload: &CommitPayload,
    ) -> Result<EntryId, CommitError> {
        if requester.company_id != payload.company_id {
            warn!(requester = %requester.company_id, "Commit rejected for foreign company");
            return Err(CommitError::Authorization {
                requester: requester.company_id,
                declared: payload.company_id,
            });
        }

        self.revalidate(payload).await?;

        let txn = self.db.begin().await.map_err(commit_error)?;

        let existing = journal_entries::Entity::find()
            .filter(journal_entries::Column::IdempotencyKey.eq(payload.idempotency_key.into_inner()))
            .one(&txn)
            .await
            .map_err(commit_error)?;

        let entry_id = match existing {
            None => {
                let entry_id = EntryId::new();
                Self::insert_header(&txn, entry_id, payload).await?;
                entry_id
            }
            Some(entry) => match resolve_existing(&entry, payload)? {
                KeyResolution::Replay(entry_id) => {
                    txn.rollback().await.map_err(commit_error)?;
                    info!(entry_id = %entry_id, "Posted entry replayed");
                    return Ok(entry_id);
                }
                KeyResolution::ReplaceDraft(entry_id) => {
                    Self::replace_draft(&txn, entry_id, payload).await?;
                    entry_id
                }
            },
        };

        Self::insert_lines(&txn, entry_id, payload).await?;
        txn.commit().await.map_err(commit_error)?;

        info!(entry_id = %entry_id, lines = payload.lines.len(), "Journal entry committed");
        Ok(entry_id)
    }
}

#[async_trait]
impl Reconciler for JournalRepository {
    #[instrument(skip(self, requester), fields(entry_id = %request.entry_id))]
    async fn attach_counterparty_cash_location(
        &self,
        requester: &Requester,
        request: &ReconciliationRequest,
    ) -> Result<bool, ReconcileError> {
        let entry = journal_entries::Entity::find_by_id(request.entry_id.into_inner())
            .one(&self.db)
            .await
            .map_err(reconcile_error)?;

        let Some(entry) = entry else {
            warn!("Reconciliation target not found");
            return Ok(false);
        };

        if entry.company_id != requester.company_id.into_inner() {
            return Err(ReconcileError::Authorization(request.entry_id));
        }

        let result = journal_entries::Entity::update_many()
            .col_expr(
                journal_entries::Column::CounterpartyCashLocationId,
                Expr::value(request.counterparty_cash_location_id.into_inner()),
            )
            .col_expr(journal_entries::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(journal_entries::Column::Id.eq(entry.id))
            .exec(&self.db)
            .await
            .map_err(reconcile_error)?;

        Ok(result.rows_affected > 0)
    }
}
