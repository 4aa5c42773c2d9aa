//! Gathers each line's base fields and its active extension.

use rust_decimal::Decimal;
use storebooks_shared::types::AccountId;

use super::line::{JournalLineDraft, LineState};
use super::types::{
    CashDetail, DebtDetail, DebtTerms, DetailOrigin, EntryHeader, InternalLink, LineExtension,
};
use crate::catalog::CategoryTag;

/// Extension data the user started but could not be collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unresolved {
    /// Debt terms were edited but no counterparty was chosen.
    CounterpartyMissing,
}

/// A line ready for validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedLine {
    /// Position of the line in the editor (0-based).
    pub position: usize,
    /// Account of the line.
    pub account_id: AccountId,
    /// Category tag of the account.
    pub category: Option<CategoryTag>,
    /// Line memo.
    pub description: String,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Active extension.
    pub extension: Option<LineExtension>,
    /// Origin of `extension`.
    pub origin: Option<DetailOrigin>,
    /// Extension data that could not become an extension.
    pub unresolved: Option<Unresolved>,
}

/// Reads editor lines into [`CollectedLine`]s.
#[derive(Debug, Clone, Copy)]
pub struct DetailsCollector {
    default_due_days: u32,
}

impl DetailsCollector {
    /// Creates a collector synthesizing debt terms due `default_due_days` after the entry date.
    #[must_use]
    pub fn new(default_due_days: u32) -> Self {
        Self { default_due_days }
    }

    /// Collects every line that has an account, keeping editor positions.
    #[must_use]
    pub fn collect(&self, header: &EntryHeader, lines: &[JournalLineDraft]) -> Vec<CollectedLine> {
        lines
            .iter()
            .enumerate()
            .filter_map(|(position, line)| self.collect_line(header, position, line))
            .collect()
    }

    /// Collects one line; `None` if it has no account.
    #[must_use]
    pub fn collect_line(
        &self,
        header: &EntryHeader,
        position: usize,
        line: &JournalLineDraft,
    ) -> Option<CollectedLine> {
        let account_id = line.account_id?;

        let mut extension = None;
        let mut origin = None;
        let mut unresolved = None;

        match line.state() {
            LineState::NoAccount | LineState::Generic => {}
            LineState::Cash { location } => {
                extension = location.map(|id| {
                    LineExtension::Cash(CashDetail {
                        cash_location_id: id,
                    })
                });
                origin = extension.as_ref().map(|_| DetailOrigin::UserEdited);
            }
            LineState::Debt {
                counterparty,
                link,
                terms,
            } => match (counterparty, terms) {
                (Some(counterparty), terms) => {
                    let (terms, detail_origin) = match terms {
                        Some(terms) => (terms.clone(), DetailOrigin::UserEdited),
                        None => (
                            DebtTerms::default_for(header.entry_date, self.default_due_days),
                            DetailOrigin::DefaultFallback,
                        ),
                    };
                    let link = if counterparty.is_internal {
                        *link
                    } else {
                        InternalLink::default()
                    };
                    extension = Some(LineExtension::Debt(DebtDetail::new(
                        terms,
                        counterparty.id,
                        link,
                    )));
                    origin = Some(detail_origin);
                }
                (None, Some(_)) => unresolved = Some(Unresolved::CounterpartyMissing),
                (None, None) => {}
            },
            LineState::FixedAsset { detail } => {
                extension = detail.clone().map(LineExtension::FixedAsset);
                origin = extension.as_ref().map(|_| DetailOrigin::UserEdited);
            }
        }

        Some(CollectedLine {
            position,
            account_id,
            category: line.category,
            description: line.description.clone(),
            debit: line.debit,
            credit: line.credit,
            extension,
            origin,
            unresolved,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Account, AccountType, Counterparty};
    use crate::journal::types::{DebtCategory, DebtDirection};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use storebooks_shared::types::{CashLocationId, CompanyId, CounterpartyId, StoreId, UserId};

    fn header() -> EntryHeader {
        EntryHeader {
            company_id: CompanyId::new(),
            store_id: Some(StoreId::new()),
            entry_date: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            description: "Sale".to_string(),
            created_by: UserId::new(),
        }
    }

    fn line_with(tag: Option<CategoryTag>) -> JournalLineDraft {
        let mut line = JournalLineDraft::new();
        line.select_account(Some(&Account {
            id: AccountId::new(),
            name: "Account".to_string(),
            account_type: AccountType::Asset,
            category_tag: tag,
        }));
        line
    }

    fn counterparty(is_internal: bool) -> Counterparty {
        Counterparty {
            id: CounterpartyId::new(),
            company_id: CompanyId::new(),
            name: "Branch".to_string(),
            is_internal,
            linked_company_id: None,
        }
    }

    #[test]
    fn test_lines_without_account_are_skipped() {
        let mut cash = line_with(None);
        cash.set_amounts(dec!(100), dec!(0)).unwrap();
        let lines = vec![JournalLineDraft::new(), cash];

        let collected = DetailsCollector::new(30).collect(&header(), &lines);

        assert_eq!(collected.len(), 1);
        assert_eq!(collected[0].position, 1);
        assert_eq!(collected[0].debit, dec!(100));
    }

    #[test]
    fn test_cash_location_collected() {
        let mut line = line_with(Some(CategoryTag::Cash));
        let location = CashLocationId::new();
        line.set_cash_location(Some(location)).unwrap();

        let collected = DetailsCollector::new(30)
            .collect_line(&header(), 0, &line)
            .unwrap();

        assert_eq!(
            collected.extension,
            Some(LineExtension::Cash(CashDetail {
                cash_location_id: location
            }))
        );
        assert_eq!(collected.origin, Some(DetailOrigin::UserEdited));
    }

    #[test]
    fn test_default_debt_detail_synthesized() {
        let mut line = line_with(Some(CategoryTag::Payable));
        let party = counterparty(false);
        line.set_counterparty(Some(party.clone())).unwrap();

        let collected = DetailsCollector::new(45)
            .collect_line(&header(), 0, &line)
            .unwrap();
        let detail = collected.extension.as_ref().and_then(LineExtension::as_debt).unwrap();

        assert_eq!(collected.origin, Some(DetailOrigin::DefaultFallback));
        assert_eq!(detail.direction, DebtDirection::Receivable);
        assert_eq!(detail.category, DebtCategory::Trade);
        assert_eq!(detail.issue_date, NaiveDate::from_ymd_opt(2026, 4, 1).unwrap());
        assert_eq!(detail.due_date, NaiveDate::from_ymd_opt(2026, 5, 16).unwrap());
        assert_eq!(detail.counterparty_id, party.id);
    }

    #[test]
    fn test_internal_link_copied() {
        let mut line = line_with(Some(CategoryTag::Receivable));
        line.set_counterparty(Some(counterparty(true))).unwrap();
        let link = InternalLink {
            linked_store_id: Some(StoreId::new()),
            counterparty_cash_location_id: Some(CashLocationId::new()),
        };
        line.set_internal_link(link).unwrap();

        let collected = DetailsCollector::new(30)
            .collect_line(&header(), 0, &line)
            .unwrap();
        let detail = collected.extension.as_ref().and_then(LineExtension::as_debt).unwrap();

        assert_eq!(detail.linked_store_id, link.linked_store_id);
        assert_eq!(
            detail.counterparty_cash_location_id,
            link.counterparty_cash_location_id
        );
    }

    #[test]
    fn test_terms_without_counterparty_unresolved() {
        let mut line = line_with(Some(CategoryTag::Receivable));
        line.edit_debt_detail(DebtTerms::default_for(
            NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            30,
        ))
        .unwrap();

        let collected = DetailsCollector::new(30)
            .collect_line(&header(), 0, &line)
            .unwrap();

        assert_eq!(collected.extension, None);
        assert_eq!(collected.unresolved, Some(Unresolved::CounterpartyMissing));
    }
}
