//! Canonical commit payload assembly.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use storebooks_shared::types::{
    AccountId, CashLocationId, CommitKey, CompanyId, CounterpartyId, EntryId, StoreId, UserId,
};

use super::collector::CollectedLine;
use super::types::{
    CashDetail, DebtDetail, EntryHeader, EntryStatus, FixedAssetDetail, LineExtension,
};
use super::validation::{Rule, ValidatedLines, Violation};
use crate::catalog::{AccountCatalog, CategoryTag};

/// One line of a commit payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadLine {
    /// Account of the line.
    pub account_id: AccountId,
    /// Line memo.
    pub description: String,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Debt detail of a receivable/payable line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debt: Option<DebtDetail>,
    /// Fixed asset detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix_asset: Option<FixedAssetDetail>,
    /// Cash detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cash: Option<CashDetail>,
}

impl PayloadLine {
    fn from_collected(line: CollectedLine) -> Self {
        let mut payload = Self {
            account_id: line.account_id,
            description: line.description,
            debit: line.debit,
            credit: line.credit,
            debt: None,
            fix_asset: None,
            cash: None,
        };
        match line.extension {
            Some(LineExtension::Cash(detail)) => payload.cash = Some(detail),
            Some(LineExtension::Debt(detail)) => payload.debt = Some(detail),
            Some(LineExtension::FixedAsset(detail)) => payload.fix_asset = Some(detail),
            None => {}
        }
        payload
    }

    /// Number of extension fields set; a well-formed line has at most one.
    #[must_use]
    pub fn extension_count(&self) -> usize {
        usize::from(self.debt.is_some())
            + usize::from(self.fix_asset.is_some())
            + usize::from(self.cash.is_some())
    }

    /// The line's extension, if exactly one is set.
    #[must_use]
    pub fn extension(&self) -> Option<LineExtension> {
        if self.extension_count() != 1 {
            return None;
        }
        self.cash
            .map(LineExtension::Cash)
            .or_else(|| self.debt.clone().map(LineExtension::Debt))
            .or_else(|| self.fix_asset.clone().map(LineExtension::FixedAsset))
    }
}

/// Counterparty and cash location recorded on the entry header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PrimaryReferences {
    /// Counterparty of the first line that has one.
    pub counterparty_id: Option<CounterpartyId>,
    /// Cash location of the first line that has one.
    pub cash_location_id: Option<CashLocationId>,
}

impl PrimaryReferences {
    /// Takes each reference from the first line carrying it.
    ///
    /// Later lines with different references are not checked against it.
    #[must_use]
    pub fn first_line_wins(lines: &[CollectedLine]) -> Self {
        let extensions = || lines.iter().filter_map(|l| l.extension.as_ref());
        Self {
            counterparty_id: extensions()
                .find_map(LineExtension::as_debt)
                .map(|d| d.counterparty_id),
            cash_location_id: extensions()
                .find_map(LineExtension::as_cash)
                .map(|c| c.cash_location_id),
        }
    }
}

/// Input of the non-transactional step that follows a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationRequest {
    /// Committed entry.
    pub entry_id: EntryId,
    /// Counterparty cash location to attach.
    pub counterparty_cash_location_id: CashLocationId,
}

/// Everything the gateway needs to persist one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitPayload {
    /// Company the entry belongs to.
    pub company_id: CompanyId,
    /// Author.
    pub created_by: UserId,
    /// Accounting date.
    pub entry_date: NaiveDate,
    /// Memo.
    pub description: String,
    /// Store.
    #[serde(default)]
    pub store_id: Option<StoreId>,
    /// Primary counterparty.
    #[serde(default)]
    pub counterparty_id: Option<CounterpartyId>,
    /// Primary cash location.
    #[serde(default)]
    pub cash_location_id: Option<CashLocationId>,
    /// `max(total debit, total credit)`.
    pub base_amount: Decimal,
    /// Draft or posted.
    pub status: EntryStatus,
    /// Editing-session key the gateway deduplicates on.
    pub idempotency_key: CommitKey,
    /// Lines in editor order.
    pub lines: Vec<PayloadLine>,
}

impl CommitPayload {
    /// Header fields of the payload.
    #[must_use]
    pub fn header(&self) -> EntryHeader {
        EntryHeader {
            company_id: self.company_id,
            store_id: self.store_id,
            entry_date: self.entry_date,
            description: self.description.clone(),
            created_by: self.created_by,
        }
    }

    /// Counterparty cash location to attach after commit, from the first debt line carrying one.
    #[must_use]
    pub fn pending_reconciliation(&self) -> Option<CashLocationId> {
        self.lines
            .iter()
            .filter_map(|l| l.debt.as_ref())
            .find_map(|d| d.counterparty_cash_location_id)
    }

    /// Reconciliation request for the committed `entry_id`, if one is pending.
    #[must_use]
    pub fn reconciliation_request(&self, entry_id: EntryId) -> Option<ReconciliationRequest> {
        self.pending_reconciliation()
            .map(|counterparty_cash_location_id| ReconciliationRequest {
                entry_id,
                counterparty_cash_location_id,
            })
    }

    /// Reads the payload back into collected lines, resolving categories through `catalog`.
    ///
    /// Extension origins are not part of the payload and come back as `None`.
    pub fn reread(&self, catalog: &AccountCatalog) -> Result<Vec<CollectedLine>, Vec<Violation>> {
        let mut lines = Vec::with_capacity(self.lines.len());
        let mut violations = Vec::new();

        for (position, line) in self.lines.iter().enumerate() {
            let Some(account) = catalog.get(line.account_id) else {
                violations.push(Violation::line(position, Rule::AccountUnknown));
                continue;
            };

            let category = account.category_tag;
            let extension = line.extension();
            let matches_category = match (&extension, category) {
                (None, _) => line.extension_count() == 0,
                (Some(LineExtension::Cash(_)), Some(CategoryTag::Cash))
                | (Some(LineExtension::FixedAsset(_)), Some(CategoryTag::FixedAsset)) => true,
                (Some(LineExtension::Debt(_)), Some(tag)) => tag.is_debt(),
                (Some(_), _) => false,
            };
            if !matches_category {
                violations.push(Violation::line(position, Rule::ExtensionMismatch));
                continue;
            }

            lines.push(CollectedLine {
                position,
                account_id: line.account_id,
                category,
                description: line.description.clone(),
                debit: line.debit,
                credit: line.credit,
                extension,
                origin: None,
                unresolved: None,
            });
        }

        if violations.is_empty() {
            Ok(lines)
        } else {
            Err(violations)
        }
    }
}

/// Assembles commit payloads from validated lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntryComposer;

impl EntryComposer {
    /// Builds the payload; status follows the mode the lines were validated in.
    #[must_use]
    pub fn compose(
        header: &EntryHeader,
        validated: ValidatedLines,
        key: CommitKey,
    ) -> CommitPayload {
        let status = validated.mode().status();
        let totals = validated.totals();
        let primary = PrimaryReferences::first_line_wins(validated.lines());

        CommitPayload {
            company_id: header.company_id,
            created_by: header.created_by,
            entry_date: header.entry_date,
            description: header.description.clone(),
            store_id: header.store_id,
            counterparty_id: primary.counterparty_id,
            cash_location_id: primary.cash_location_id,
            base_amount: totals.base_amount(),
            status,
            idempotency_key: key,
            lines: validated
                .into_lines()
                .into_iter()
                .map(PayloadLine::from_collected)
                .collect(),
        }
    }
}
