//! Property-based tests for BalanceValidator.
//!
//! - Balance: an entry is reported unbalanced exactly when |debits - credits| >= 0.01
//! - Determinism: the same input always yields the same report
//! - Drafts: relaxed mode only asks for one non-zero amount

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use storebooks_shared::types::{AccountId, CompanyId, UserId};

use super::collector::CollectedLine;
use super::types::EntryHeader;
use super::validation::{BalanceValidator, Rule, ValidationMode};
use crate::catalog::ReferenceData;

/// Strategy to generate amounts from 0.01 to 10,000.00.
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate one side of a generic line.
fn side() -> impl Strategy<Value = (bool, Decimal)> {
    (any::<bool>(), positive_amount())
}

fn header() -> EntryHeader {
    EntryHeader {
        company_id: CompanyId::new(),
        store_id: None,
        entry_date: NaiveDate::from_ymd_opt(2026, 3, 9).unwrap(),
        description: "Generated".to_string(),
        created_by: UserId::new(),
    }
}

/// Helper to create a line without extension.
fn generic(position: usize, is_debit: bool, amount: Decimal) -> CollectedLine {
    let (debit, credit) = if is_debit {
        (amount, Decimal::ZERO)
    } else {
        (Decimal::ZERO, amount)
    };
    CollectedLine {
        position,
        account_id: AccountId::new(),
        category: None,
        description: String::new(),
        debit,
        credit,
        extension: None,
        origin: None,
        unresolved: None,
    }
}

fn lines_of(sides: &[(bool, Decimal)]) -> Vec<CollectedLine> {
    sides
        .iter()
        .enumerate()
        .map(|(i, (is_debit, amount))| generic(i, *is_debit, *amount))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_unbalanced_iff_difference_reaches_tolerance(sides in prop::collection::vec(side(), 2..8)) {
        let lines = lines_of(&sides);
        let report = BalanceValidator::default().validate(
            &header(),
            &lines,
            &ReferenceData::default(),
            ValidationMode::Strict,
        );

        let debit: Decimal = lines.iter().map(|l| l.debit).sum();
        let credit: Decimal = lines.iter().map(|l| l.credit).sum();
        let unbalanced = report.violations.iter().find(|v| v.rule == Rule::Unbalanced);

        prop_assert_eq!(unbalanced.is_some(), (debit - credit).abs() >= Decimal::new(1, 2));
        if let Some(violation) = unbalanced {
            prop_assert_eq!(violation.difference, Some((debit - credit).abs()));
            prop_assert!(violation.line_index.is_none());
        }
    }

    #[test]
    fn prop_mirrored_lines_always_balance(amounts in prop::collection::vec(positive_amount(), 1..6)) {
        let mut sides: Vec<(bool, Decimal)> = amounts.iter().map(|a| (true, *a)).collect();
        sides.extend(amounts.iter().map(|a| (false, *a)));
        let lines = lines_of(&sides);

        let report = BalanceValidator::default().validate(
            &header(),
            &lines,
            &ReferenceData::default(),
            ValidationMode::Strict,
        );

        prop_assert!(report.is_valid(), "{:?}", report.violations);
        prop_assert_eq!(report.totals.difference(), Decimal::ZERO);
    }

    #[test]
    fn prop_validation_is_deterministic(sides in prop::collection::vec(side(), 0..8)) {
        let header = header();
        let lines = lines_of(&sides);
        let reference = ReferenceData::default();
        let validator = BalanceValidator::default();

        let first = validator.validate(&header, &lines, &reference, ValidationMode::Strict);
        let second = validator.validate(&header, &lines, &reference, ValidationMode::Strict);

        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_relaxed_accepts_any_amount(sides in prop::collection::vec(side(), 1..8)) {
        let lines = lines_of(&sides);
        let report = BalanceValidator::default().validate(
            &header(),
            &lines,
            &ReferenceData::default(),
            ValidationMode::Relaxed,
        );

        prop_assert!(report.is_valid());
    }
}
