//! Property-based tests for EntryComposer.
//!
//! - Base amount: the payload carries the larger of the two totals
//! - Rereading: the server-side reread recovers every line unchanged
//! - Status: strict lines compose to posted, relaxed lines to draft

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use storebooks_shared::types::{AccountId, CommitKey, CompanyId, UserId};

use super::collector::CollectedLine;
use super::composer::EntryComposer;
use super::types::{EntryHeader, EntryStatus};
use super::validation::{BalanceValidator, ValidationMode};
use crate::catalog::{Account, AccountCatalog, AccountType, ReferenceData};

/// Strategy to generate amounts from 0.01 to 10,000.00.
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn header() -> EntryHeader {
    EntryHeader {
        company_id: CompanyId::new(),
        store_id: None,
        entry_date: NaiveDate::from_ymd_opt(2026, 6, 30).unwrap(),
        description: "Generated".to_string(),
        created_by: UserId::new(),
    }
}

/// Builds mirrored debit/credit lines over a fresh catalog.
fn books(amounts: &[Decimal]) -> (AccountCatalog, Vec<CollectedLine>) {
    let mut accounts = Vec::new();
    let mut lines = Vec::new();
    let sides = amounts
        .iter()
        .map(|a| (*a, Decimal::ZERO))
        .chain(amounts.iter().map(|a| (Decimal::ZERO, *a)));

    for (position, (debit, credit)) in sides.enumerate() {
        let account = Account {
            id: AccountId::new(),
            name: format!("Account {position}"),
            account_type: AccountType::Asset,
            category_tag: None,
        };
        lines.push(CollectedLine {
            position,
            account_id: account.id,
            category: None,
            description: format!("Line {position}"),
            debit,
            credit,
            extension: None,
            origin: None,
            unresolved: None,
        });
        accounts.push(account);
    }

    (AccountCatalog::new(accounts), lines)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_base_amount_is_larger_total(amounts in prop::collection::vec(positive_amount(), 1..6)) {
        let header = header();
        let (_, lines) = books(&amounts);
        let expected: Decimal = amounts.iter().copied().sum();

        let validated = BalanceValidator::default()
            .validate_for_commit(&header, lines, &ReferenceData::default(), ValidationMode::Strict)
            .unwrap();
        let payload = EntryComposer::compose(&header, validated, CommitKey::new());

        prop_assert_eq!(payload.base_amount, expected);
        prop_assert_eq!(payload.status, EntryStatus::Posted);
        prop_assert!(payload.lines.iter().all(|l| l.extension_count() == 0));
    }

    #[test]
    fn prop_reread_recovers_lines(amounts in prop::collection::vec(positive_amount(), 1..6)) {
        let header = header();
        let (catalog, lines) = books(&amounts);

        let validated = BalanceValidator::default()
            .validate_for_commit(&header, lines.clone(), &ReferenceData::default(), ValidationMode::Strict)
            .unwrap();
        let payload = EntryComposer::compose(&header, validated, CommitKey::new());
        let reread = payload.reread(&catalog).unwrap();

        prop_assert_eq!(reread, lines);
        prop_assert_eq!(payload.header(), header);
    }

    #[test]
    fn prop_relaxed_composes_draft(amount in positive_amount()) {
        let header = header();
        let (_, mut lines) = books(&[amount]);
        lines.truncate(1);

        let validated = BalanceValidator::default()
            .validate_for_commit(&header, lines, &ReferenceData::default(), ValidationMode::Relaxed)
            .unwrap();
        let payload = EntryComposer::compose(&header, validated, CommitKey::new());

        prop_assert_eq!(payload.status, EntryStatus::Draft);
        prop_assert_eq!(payload.base_amount, amount);
    }
}
