//! In-memory editing of one journal entry.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use storebooks_shared::JournalConfig;
use storebooks_shared::types::{
    AccountId, CashLocationId, CommitKey, CounterpartyId, StoreId, parse_amount,
};
use tracing::debug;

use super::collector::{CollectedLine, DetailsCollector};
use super::line::{JournalLineDraft, LineAffordances, LineError};
use super::submit::EntrySnapshot;
use super::types::{DebtTerms, EntryHeader, FixedAssetDetail, InternalLink};
use super::validation::{BalanceValidator, ValidationMode, ValidationReport};
use crate::catalog::{AccountCatalog, ReferenceData};

/// Lines a new entry opens with.
const INITIAL_LINES: usize = 2;

/// Owns the header and lines of an entry under edit.
///
/// Every successful mutation bumps the revision and re-runs strict validation.
#[derive(Debug, Clone)]
pub struct EntryEditor {
    header: EntryHeader,
    lines: Vec<JournalLineDraft>,
    catalog: Arc<AccountCatalog>,
    reference: Arc<ReferenceData>,
    collector: DetailsCollector,
    validator: BalanceValidator,
    commit_key: CommitKey,
    revision: u64,
    report: ValidationReport,
}

impl EntryEditor {
    /// Opens a new entry with two blank lines and a fresh commit key.
    #[must_use]
    pub fn new(
        header: EntryHeader,
        catalog: Arc<AccountCatalog>,
        reference: ReferenceData,
        config: &JournalConfig,
    ) -> Self {
        let collector = DetailsCollector::new(config.default_due_days);
        let validator = BalanceValidator::new(config.balance_tolerance);
        let lines = vec![JournalLineDraft::new(); INITIAL_LINES];
        let reference = Arc::new(reference);
        let report = validator.validate(
            &header,
            &collector.collect(&header, &lines),
            &reference,
            ValidationMode::Strict,
        );

        Self {
            header,
            lines,
            catalog,
            reference,
            collector,
            validator,
            commit_key: CommitKey::new(),
            revision: 0,
            report,
        }
    }

    /// Header fields.
    #[must_use]
    pub fn header(&self) -> &EntryHeader {
        &self.header
    }

    /// Lines in editor order.
    #[must_use]
    pub fn lines(&self) -> &[JournalLineDraft] {
        &self.lines
    }

    /// Result of the last validation run.
    #[must_use]
    pub fn report(&self) -> &ValidationReport {
        &self.report
    }

    /// Number of successful edits so far.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Idempotency key shared by every save of this entry.
    #[must_use]
    pub fn commit_key(&self) -> CommitKey {
        self.commit_key
    }

    /// Account catalog the editor resolves selections against.
    #[must_use]
    pub fn catalog(&self) -> &AccountCatalog {
        &self.catalog
    }

    /// Reference listings for the chosen store.
    #[must_use]
    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    /// Pickers and actions offered by the line at `index`.
    pub fn affordances(&self, index: usize) -> Result<LineAffordances, LineError> {
        let line = self
            .lines
            .get(index)
            .ok_or(LineError::LineOutOfRange(index))?;
        Ok(line.state().affordances(self.header.store_id.is_some()))
    }

    /// Appends a blank line.
    pub fn add_line(&mut self) -> &ValidationReport {
        self.lines.push(JournalLineDraft::new());
        self.touch()
    }

    /// Removes the line at `index`; later lines move up.
    pub fn remove_line(&mut self, index: usize) -> Result<&ValidationReport, LineError> {
        if index >= self.lines.len() {
            return Err(LineError::LineOutOfRange(index));
        }
        self.lines.remove(index);
        Ok(self.touch())
    }

    /// Selects an account on the line at `index`, or clears it with `None`.
    pub fn select_account(
        &mut self,
        index: usize,
        account_id: Option<AccountId>,
    ) -> Result<&ValidationReport, LineError> {
        let account = match account_id {
            Some(id) => Some(
                self.catalog
                    .get(id)
                    .cloned()
                    .ok_or(LineError::UnknownAccount(id))?,
            ),
            None => None,
        };

        let transition = self.line_mut(index)?.select_account(account.as_ref());
        debug!(
            line = index + 1,
            from = %transition.from,
            to = %transition.to,
            discarded_extension = transition.discarded_extension,
            "Line state changed"
        );
        Ok(self.touch())
    }

    /// Sets debit and credit of the line at `index`.
    pub fn set_amounts(
        &mut self,
        index: usize,
        debit: Decimal,
        credit: Decimal,
    ) -> Result<&ValidationReport, LineError> {
        self.line_mut(index)?.set_amounts(debit, credit)?;
        Ok(self.touch())
    }

    /// Parses and sets amounts typed into the debit and credit fields.
    pub fn set_amounts_text(
        &mut self,
        index: usize,
        debit: &str,
        credit: &str,
    ) -> Result<&ValidationReport, LineError> {
        let debit = parse_amount(debit)?;
        let credit = parse_amount(credit)?;
        self.set_amounts(index, debit, credit)
    }

    /// Sets the memo of the line at `index`.
    pub fn set_line_description(
        &mut self,
        index: usize,
        description: impl Into<String>,
    ) -> Result<&ValidationReport, LineError> {
        self.line_mut(index)?.description = description.into();
        Ok(self.touch())
    }

    /// Changes the store, replacing the reference listings.
    ///
    /// Cash locations are store-scoped, so every selected location is cleared.
    pub fn set_store(&mut self, store_id: Option<StoreId>, reference: ReferenceData) -> &ValidationReport {
        let cleared = self
            .lines
            .iter_mut()
            .map(JournalLineDraft::reset_cash_location)
            .filter(|&cleared| cleared)
            .count();
        if cleared > 0 {
            debug!(cleared, "Cleared cash locations after store change");
        }

        self.header.store_id = store_id;
        self.reference = Arc::new(reference);
        self.touch()
    }

    /// Changes the entry date.
    pub fn set_entry_date(&mut self, entry_date: NaiveDate) -> &ValidationReport {
        self.header.entry_date = entry_date;
        self.touch()
    }

    /// Changes the entry memo.
    pub fn set_description(&mut self, description: impl Into<String>) -> &ValidationReport {
        self.header.description = description.into();
        self.touch()
    }

    /// Picks the cash location of a cash line.
    pub fn set_cash_location(
        &mut self,
        index: usize,
        location: Option<CashLocationId>,
    ) -> Result<&ValidationReport, LineError> {
        if location.is_some() && self.header.store_id.is_none() {
            return Err(LineError::StoreNotChosen);
        }
        self.line_mut(index)?.set_cash_location(location)?;
        Ok(self.touch())
    }

    /// Picks the counterparty of a receivable/payable line.
    pub fn set_counterparty(
        &mut self,
        index: usize,
        counterparty_id: Option<CounterpartyId>,
    ) -> Result<&ValidationReport, LineError> {
        let counterparty = match counterparty_id {
            Some(id) => Some(
                self.reference
                    .counterparty(id)
                    .cloned()
                    .ok_or(LineError::UnknownCounterparty(id))?,
            ),
            None => None,
        };
        self.line_mut(index)?.set_counterparty(counterparty)?;
        Ok(self.touch())
    }

    /// Sets the linked store and cash location of an internal counterparty.
    pub fn set_internal_link(
        &mut self,
        index: usize,
        link: InternalLink,
    ) -> Result<&ValidationReport, LineError> {
        self.line_mut(index)?.set_internal_link(link)?;
        Ok(self.touch())
    }

    /// Applies the debt details editor.
    pub fn edit_debt_detail(
        &mut self,
        index: usize,
        terms: DebtTerms,
    ) -> Result<&ValidationReport, LineError> {
        self.line_mut(index)?.edit_debt_detail(terms)?;
        Ok(self.touch())
    }

    /// Discards edited debt terms.
    pub fn clear_debt_detail(&mut self, index: usize) -> Result<&ValidationReport, LineError> {
        self.line_mut(index)?.clear_debt_detail()?;
        Ok(self.touch())
    }

    /// Applies the asset details editor.
    pub fn edit_fixed_asset(
        &mut self,
        index: usize,
        detail: FixedAssetDetail,
    ) -> Result<&ValidationReport, LineError> {
        self.line_mut(index)?.edit_fixed_asset(detail)?;
        Ok(self.touch())
    }

    /// Collects every line that has an account.
    #[must_use]
    pub fn collect(&self) -> Vec<CollectedLine> {
        self.collector.collect(&self.header, &self.lines)
    }

    /// Freezes the current state for a save.
    #[must_use]
    pub fn snapshot(&self) -> EntrySnapshot {
        EntrySnapshot {
            header: self.header.clone(),
            lines: self.collect(),
            reference: Arc::clone(&self.reference),
            commit_key: self.commit_key,
            revision: self.revision,
        }
    }

    fn line_mut(&mut self, index: usize) -> Result<&mut JournalLineDraft, LineError> {
        self.lines
            .get_mut(index)
            .ok_or(LineError::LineOutOfRange(index))
    }

    fn touch(&mut self) -> &ValidationReport {
        self.revision += 1;
        self.report = self.validator.validate(
            &self.header,
            &self.collect(),
            &self.reference,
            ValidationMode::Strict,
        );
        &self.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Account, AccountType, CashLocation, CategoryTag, Counterparty, LocationType};
    use crate::journal::line::{LineStateKind, PickerState};
    use crate::journal::types::{DebtCategory, DebtDirection, DetailOrigin};
    use crate::journal::validation::Rule;
    use rust_decimal_macros::dec;
    use storebooks_shared::types::{CompanyId, UserId};

    struct Books {
        catalog: Arc<AccountCatalog>,
        cash: AccountId,
        sales: AccountId,
        receivable: AccountId,
        equipment: AccountId,
        store: StoreId,
        till: CashLocation,
        customer: Counterparty,
    }

    fn books() -> Books {
        let company_id = CompanyId::new();
        let store = StoreId::new();
        let account = |name: &str, account_type, tag| Account {
            id: AccountId::new(),
            name: name.to_string(),
            account_type,
            category_tag: tag,
        };
        let accounts = vec![
            account("Cash", AccountType::Asset, Some(CategoryTag::Cash)),
            account("Sales Revenue", AccountType::Income, None),
            account("Receivables", AccountType::Asset, Some(CategoryTag::Receivable)),
            account("Equipment", AccountType::Asset, Some(CategoryTag::FixedAsset)),
        ];
        Books {
            cash: accounts[0].id,
            sales: accounts[1].id,
            receivable: accounts[2].id,
            equipment: accounts[3].id,
            catalog: Arc::new(AccountCatalog::new(accounts)),
            store,
            till: CashLocation {
                id: CashLocationId::new(),
                company_id,
                store_id: Some(store),
                name: "Front till".to_string(),
                location_type: LocationType::Cash,
            },
            customer: Counterparty {
                id: CounterpartyId::new(),
                company_id,
                name: "Corner Cafe".to_string(),
                is_internal: false,
                linked_company_id: None,
            },
        }
    }

    fn reference(b: &Books) -> ReferenceData {
        ReferenceData::new(vec![b.till.clone()], vec![b.customer.clone()])
    }

    fn editor(b: &Books) -> EntryEditor {
        let mut editor = EntryEditor::new(
            EntryHeader {
                company_id: b.till.company_id,
                store_id: None,
                entry_date: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
                description: "Counter sale".to_string(),
                created_by: UserId::new(),
            },
            Arc::clone(&b.catalog),
            ReferenceData::default(),
            &JournalConfig::default(),
        );
        editor.set_store(Some(b.store), reference(b));
        editor
    }

    fn rules(report: &ValidationReport) -> Vec<Rule> {
        report.violations.iter().map(|v| v.rule).collect()
    }

    #[test]
    fn test_new_entry_has_two_blank_lines() {
        let b = books();
        let editor = editor(&b);

        assert_eq!(editor.lines().len(), 2);
        assert!(editor.collect().is_empty());
        assert_eq!(rules(editor.report()), vec![Rule::MinimumLines]);
    }

    #[test]
    fn test_cash_sale_with_location_is_valid() {
        let b = books();
        let mut editor = editor(&b);

        editor.select_account(0, Some(b.cash)).unwrap();
        editor.set_amounts_text(0, "100.00", "").unwrap();
        editor.set_cash_location(0, Some(b.till.id)).unwrap();
        editor.select_account(1, Some(b.sales)).unwrap();
        let report = editor.set_amounts_text(1, "", "100.00").unwrap();

        assert!(report.is_valid(), "{:?}", report.violations);
        assert_eq!(report.totals.base_amount(), dec!(100));
    }

    #[test]
    fn test_cash_sale_without_location_flags_line_one() {
        let b = books();
        let mut editor = editor(&b);

        editor.select_account(0, Some(b.cash)).unwrap();
        editor.set_amounts(0, dec!(100.00), dec!(0)).unwrap();
        editor.select_account(1, Some(b.sales)).unwrap();
        let report = editor.set_amounts(1, dec!(0), dec!(100.00)).unwrap();

        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].rule, Rule::LocationRequired);
        assert_eq!(report.violations[0].message, "Line 1: location required");
    }

    #[test]
    fn test_unbalanced_by_one_cent() {
        let b = books();
        let mut editor = editor(&b);

        editor.select_account(0, Some(b.cash)).unwrap();
        editor.set_amounts(0, dec!(100.00), dec!(0)).unwrap();
        editor.set_cash_location(0, Some(b.till.id)).unwrap();
        editor.select_account(1, Some(b.sales)).unwrap();
        let report = editor.set_amounts(1, dec!(0), dec!(99.99)).unwrap();

        assert_eq!(rules(report), vec![Rule::Unbalanced]);
        assert_eq!(report.violations[0].difference, Some(dec!(0.01)));
    }

    #[test]
    fn test_receivable_due_date_order() {
        let b = books();
        let mut editor = editor(&b);
        let date = editor.header().entry_date;

        editor.select_account(0, Some(b.receivable)).unwrap();
        editor.set_amounts(0, dec!(80), dec!(0)).unwrap();
        editor.set_counterparty(0, Some(b.customer.id)).unwrap();
        editor
            .edit_debt_detail(
                0,
                DebtTerms {
                    due_date: date,
                    ..DebtTerms::default_for(date, 30)
                },
            )
            .unwrap();
        editor.select_account(1, Some(b.sales)).unwrap();
        let report = editor.set_amounts(1, dec!(0), dec!(80)).unwrap();

        assert_eq!(rules(report), vec![Rule::DueDateOrder]);
        assert_eq!(
            report.violations[0].message,
            "Line 1: due date must follow issue date"
        );
    }

    #[test]
    fn test_receivable_without_counterparty_is_flagged() {
        let b = books();
        let mut editor = editor(&b);

        editor.select_account(0, Some(b.receivable)).unwrap();
        editor.set_amounts(0, dec!(100), dec!(0)).unwrap();
        editor.select_account(1, Some(b.sales)).unwrap();
        let report = editor.set_amounts(1, dec!(0), dec!(100)).unwrap();

        assert_eq!(rules(report), vec![Rule::CounterpartyRequired]);
        assert_eq!(report.violations[0].line_index, Some(0));
        assert!(editor.collect()[0].extension.is_none());
    }

    #[test]
    fn test_default_debt_detail_on_collect() {
        let b = books();
        let mut editor = editor(&b);

        editor.select_account(0, Some(b.receivable)).unwrap();
        editor.set_counterparty(0, Some(b.customer.id)).unwrap();

        let collected = editor.collect();
        let detail = collected[0]
            .extension
            .as_ref()
            .and_then(|e| e.as_debt())
            .unwrap();
        assert_eq!(collected[0].origin, Some(DetailOrigin::DefaultFallback));
        assert_eq!(detail.direction, DebtDirection::Receivable);
        assert_eq!(detail.category, DebtCategory::Trade);
    }

    #[test]
    fn test_location_picker_needs_store() {
        let b = books();
        let mut editor = EntryEditor::new(
            EntryHeader {
                company_id: CompanyId::new(),
                store_id: None,
                entry_date: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
                description: String::new(),
                created_by: UserId::new(),
            },
            Arc::clone(&b.catalog),
            ReferenceData::default(),
            &JournalConfig::default(),
        );
        editor.select_account(0, Some(b.cash)).unwrap();

        assert_eq!(
            editor.affordances(0).unwrap().location_picker,
            PickerState::Disabled
        );
        assert_eq!(
            editor.set_cash_location(0, Some(b.till.id)).unwrap_err(),
            LineError::StoreNotChosen
        );

        editor.set_store(Some(b.store), reference(&b));
        assert_eq!(
            editor.affordances(0).unwrap().location_picker,
            PickerState::Enabled
        );
    }

    #[test]
    fn test_store_change_clears_locations() {
        let b = books();
        let mut editor = editor(&b);
        editor.select_account(0, Some(b.cash)).unwrap();
        editor.set_amounts(0, dec!(10), dec!(0)).unwrap();
        editor.set_cash_location(0, Some(b.till.id)).unwrap();

        editor.set_store(Some(StoreId::new()), ReferenceData::default());

        assert!(editor.collect()[0].extension.is_none());
        assert!(rules(editor.report()).contains(&Rule::LocationRequired));
    }

    #[test]
    fn test_account_change_discards_extension() {
        let b = books();
        let mut editor = editor(&b);
        editor.select_account(0, Some(b.cash)).unwrap();
        editor.set_cash_location(0, Some(b.till.id)).unwrap();

        editor.select_account(0, Some(b.equipment)).unwrap();

        assert_eq!(editor.lines()[0].state().kind(), LineStateKind::FixedAsset);
        assert!(editor.collect()[0].extension.is_none());
        assert!(editor.affordances(0).unwrap().asset_details);
    }

    #[test]
    fn test_revision_and_errors() {
        let b = books();
        let mut editor = editor(&b);
        let start = editor.revision();

        editor.add_line();
        assert_eq!(editor.lines().len(), 3);
        editor.remove_line(2).unwrap();
        assert_eq!(editor.revision(), start + 2);

        assert_eq!(
            editor.remove_line(9).unwrap_err(),
            LineError::LineOutOfRange(9)
        );
        let unknown = AccountId::new();
        assert_eq!(
            editor.select_account(0, Some(unknown)).unwrap_err(),
            LineError::UnknownAccount(unknown)
        );
        assert!(matches!(
            editor.set_amounts_text(0, "abc", ""),
            Err(LineError::Amount(_))
        ));
        assert_eq!(editor.revision(), start + 2);
    }

    #[test]
    fn test_validation_is_deterministic() {
        let b = books();
        let mut editor = editor(&b);
        editor.select_account(0, Some(b.cash)).unwrap();
        editor.set_amounts(0, dec!(5), dec!(5)).unwrap();

        let first = editor.report().clone();
        editor.set_description("Counter sale");

        assert_eq!(editor.report(), &first);
    }

    #[test]
    fn test_snapshot_carries_session_key() {
        let b = books();
        let mut editor = editor(&b);
        editor.select_account(0, Some(b.sales)).unwrap();

        let first = editor.snapshot();
        editor.set_line_description(0, "Coffee beans").unwrap();
        let second = editor.snapshot();

        assert_eq!(first.commit_key, second.commit_key);
        assert!(second.revision > first.revision);
        assert_eq!(second.lines[0].description, "Coffee beans");
    }
}
