//! Domain types for journal entries and their line extensions.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use storebooks_shared::types::{AccountId, CashLocationId, CompanyId, CounterpartyId, StoreId, UserId};

/// Header fields shared by every line of an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryHeader {
    /// Company the entry is booked for.
    pub company_id: CompanyId,
    /// Store the entry belongs to; cash locations are scoped to it.
    pub store_id: Option<StoreId>,
    /// Accounting date.
    pub entry_date: NaiveDate,
    /// Free-text memo.
    pub description: String,
    /// Author of the entry.
    pub created_by: UserId,
}

/// Lifecycle status written with an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Autosaved work in progress; not subject to balance checks.
    Draft,
    /// Manually saved, fully validated entry.
    Posted,
}

impl EntryStatus {
    /// Database/wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Posted => "posted",
        }
    }
}

/// Cash location selected on a cash line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashDetail {
    /// Till, vault or similar place holding the cash.
    pub cash_location_id: CashLocationId,
}

/// Whether the debt is owed to or by the company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebtDirection {
    /// The counterparty owes the company.
    Receivable,
    /// The company owes the counterparty.
    Payable,
}

/// Nature of the debt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebtCategory {
    /// Ordinary trade credit.
    Trade,
    /// Loan.
    Loan,
    /// Anything else.
    Other,
}

/// The user-editable part of a debt detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtTerms {
    /// Receivable or payable.
    pub direction: DebtDirection,
    /// Trade, loan or other.
    pub category: DebtCategory,
    /// Date the debt arises.
    pub issue_date: NaiveDate,
    /// Date the debt falls due; must be after `issue_date`.
    pub due_date: NaiveDate,
    /// Annual interest rate in percent, 0 to 100.
    pub interest_rate: Decimal,
    /// Account interest is booked to.
    pub interest_account_id: Option<AccountId>,
    /// Day of month interest is due, 1 to 31.
    pub interest_due_day: Option<u8>,
}

impl DebtTerms {
    /// Terms used when a counterparty is chosen but the details were never edited:
    /// interest-free trade receivable due `due_days` after the entry date.
    #[must_use]
    pub fn default_for(entry_date: NaiveDate, due_days: u32) -> Self {
        Self {
            direction: DebtDirection::Receivable,
            category: DebtCategory::Trade,
            issue_date: entry_date,
            due_date: entry_date
                .checked_add_days(Days::new(u64::from(due_days)))
                .unwrap_or(entry_date),
            interest_rate: Decimal::ZERO,
            interest_account_id: None,
            interest_due_day: None,
        }
    }
}

/// Debt detail as committed with a receivable or payable line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtDetail {
    /// Receivable or payable.
    pub direction: DebtDirection,
    /// Trade, loan or other.
    pub category: DebtCategory,
    /// Date the debt arises.
    pub issue_date: NaiveDate,
    /// Date the debt falls due.
    pub due_date: NaiveDate,
    /// Annual interest rate in percent.
    pub interest_rate: Decimal,
    /// Account interest is booked to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest_account_id: Option<AccountId>,
    /// Day of month interest is due.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest_due_day: Option<u8>,
    /// Other party of the debt.
    pub counterparty_id: CounterpartyId,
    /// For internal counterparties, the store on the other side.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_store_id: Option<StoreId>,
    /// For internal counterparties, the cash location on the other side.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counterparty_cash_location_id: Option<CashLocationId>,
}

impl DebtDetail {
    /// Assembles a detail from edited terms and the chosen counterparty.
    #[must_use]
    pub fn new(terms: DebtTerms, counterparty_id: CounterpartyId, link: InternalLink) -> Self {
        Self {
            direction: terms.direction,
            category: terms.category,
            issue_date: terms.issue_date,
            due_date: terms.due_date,
            interest_rate: terms.interest_rate,
            interest_account_id: terms.interest_account_id,
            interest_due_day: terms.interest_due_day,
            counterparty_id,
            linked_store_id: link.linked_store_id,
            counterparty_cash_location_id: link.counterparty_cash_location_id,
        }
    }

    /// The editable terms of this detail.
    #[must_use]
    pub fn terms(&self) -> DebtTerms {
        DebtTerms {
            direction: self.direction,
            category: self.category,
            issue_date: self.issue_date,
            due_date: self.due_date,
            interest_rate: self.interest_rate,
            interest_account_id: self.interest_account_id,
            interest_due_day: self.interest_due_day,
        }
    }
}

/// Store and cash location on the other side of an internal counterparty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternalLink {
    /// Store of the counterparty.
    pub linked_store_id: Option<StoreId>,
    /// Cash location of the counterparty; attached after commit.
    pub counterparty_cash_location_id: Option<CashLocationId>,
}

/// Depreciation schedule of a fixed asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepreciationMethod {
    /// Equal charge per year.
    StraightLine,
    /// Fixed rate on the remaining book value.
    DecliningBalance,
    /// Twice the straight-line rate on the remaining book value.
    DoubleDeclining,
}

/// Acquisition terms of a fixed-asset line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedAssetDetail {
    /// Asset name.
    pub asset_name: String,
    /// Acquisition date.
    pub acquisition_date: NaiveDate,
    /// Acquisition cost; must be positive.
    pub acquisition_cost: Decimal,
    /// Useful life; at least one year.
    pub useful_life_years: u32,
    /// Residual value; between zero and the cost.
    pub salvage_value: Decimal,
    /// Depreciation method.
    pub depreciation_method: DepreciationMethod,
}

/// The at-most-one extension a line carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineExtension {
    /// Cash line detail.
    Cash(CashDetail),
    /// Receivable or payable detail.
    Debt(DebtDetail),
    /// Fixed asset detail.
    FixedAsset(FixedAssetDetail),
}

impl LineExtension {
    /// Returns the cash detail, if any.
    #[must_use]
    pub fn as_cash(&self) -> Option<&CashDetail> {
        match self {
            Self::Cash(detail) => Some(detail),
            _ => None,
        }
    }

    /// Returns the debt detail, if any.
    #[must_use]
    pub fn as_debt(&self) -> Option<&DebtDetail> {
        match self {
            Self::Debt(detail) => Some(detail),
            _ => None,
        }
    }

    /// Returns the fixed asset detail, if any.
    #[must_use]
    pub fn as_fixed_asset(&self) -> Option<&FixedAssetDetail> {
        match self {
            Self::FixedAsset(detail) => Some(detail),
            _ => None,
        }
    }
}

/// Where a collected extension came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailOrigin {
    /// Entered by the user.
    UserEdited,
    /// Synthesized because the user never opened the details editor.
    DefaultFallback,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_default_terms() {
        let terms = DebtTerms::default_for(date(2026, 1, 15), 30);
        assert_eq!(terms.direction, DebtDirection::Receivable);
        assert_eq!(terms.category, DebtCategory::Trade);
        assert_eq!(terms.issue_date, date(2026, 1, 15));
        assert_eq!(terms.due_date, date(2026, 2, 14));
        assert_eq!(terms.interest_rate, Decimal::ZERO);
    }

    #[test]
    fn test_debt_detail_keeps_terms() {
        let terms = DebtTerms {
            direction: DebtDirection::Payable,
            category: DebtCategory::Loan,
            issue_date: date(2026, 3, 1),
            due_date: date(2027, 3, 1),
            interest_rate: dec!(7.5),
            interest_account_id: Some(AccountId::new()),
            interest_due_day: Some(15),
        };
        let link = InternalLink {
            linked_store_id: Some(StoreId::new()),
            counterparty_cash_location_id: Some(CashLocationId::new()),
        };
        let detail = DebtDetail::new(terms.clone(), CounterpartyId::new(), link);

        assert_eq!(detail.terms(), terms);
        assert_eq!(detail.linked_store_id, link.linked_store_id);
        assert_eq!(
            detail.counterparty_cash_location_id,
            link.counterparty_cash_location_id
        );
    }

    #[test]
    fn test_debt_detail_omits_empty_optionals() {
        let detail = DebtDetail::new(
            DebtTerms::default_for(date(2026, 1, 1), 30),
            CounterpartyId::new(),
            InternalLink::default(),
        );
        let json = serde_json::to_value(&detail).unwrap();

        assert!(json.get("linked_store_id").is_none());
        assert!(json.get("interest_due_day").is_none());
        assert_eq!(json["interest_rate"], "0");
        assert_eq!(json["direction"], "receivable");
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(
            serde_json::to_string(&DepreciationMethod::DoubleDeclining).unwrap(),
            "\"double_declining\""
        );
        assert_eq!(serde_json::to_string(&EntryStatus::Posted).unwrap(), "\"posted\"");
        assert_eq!(EntryStatus::Draft.as_str(), "draft");
    }

    #[test]
    fn test_extension_accessors() {
        let cash = LineExtension::Cash(CashDetail {
            cash_location_id: CashLocationId::new(),
        });
        assert!(cash.as_cash().is_some());
        assert!(cash.as_debt().is_none());
        assert!(cash.as_fixed_asset().is_none());
    }
}
