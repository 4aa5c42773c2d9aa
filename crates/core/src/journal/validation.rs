//! Cross-line invariant checking.
//!
//! Strict mode (manual save) enforces:
//! - At least 2 lines
//! - Debits equal credits within the balance tolerance
//! - Exactly one positive amount per line
//! - Category-specific completeness of every extension
//!
//! Relaxed mode (autosave) only requires one line with an account and an amount.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use storebooks_shared::types::{BALANCE_TOLERANCE, within_tolerance};

use super::collector::{CollectedLine, Unresolved};
use super::rules::{ExtensionRules, RuleContext};
use super::types::{EntryHeader, EntryStatus, LineExtension};
use crate::catalog::{CategoryTag, ReferenceData};

/// How much of the invariant set to enforce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Every invariant; used for posting.
    Strict,
    /// Only non-emptiness; used for drafts.
    Relaxed,
}

impl ValidationMode {
    /// Status an entry validated in this mode is written with.
    #[must_use]
    pub fn status(self) -> EntryStatus {
        match self {
            Self::Strict => EntryStatus::Posted,
            Self::Relaxed => EntryStatus::Draft,
        }
    }

    /// Mode a payload of `status` is revalidated in.
    #[must_use]
    pub fn for_status(status: EntryStatus) -> Self {
        match status {
            EntryStatus::Posted => Self::Strict,
            EntryStatus::Draft => Self::Relaxed,
        }
    }
}

/// Identifier of a violated rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// Fewer than two lines.
    MinimumLines,
    /// Debits and credits differ.
    Unbalanced,
    /// Line has zero or two positive amounts.
    SingleAmount,
    /// Cash line without a location.
    LocationRequired,
    /// Location unknown, of the wrong type, or from another store.
    LocationInvalid,
    /// Debt terms without a counterparty.
    CounterpartyRequired,
    /// Counterparty not in the reference listing.
    CounterpartyUnknown,
    /// Due date not after issue date.
    DueDateOrder,
    /// Interest rate outside 0 to 100.
    InterestRateRange,
    /// Interest due day outside 1 to 31.
    InterestDueDayRange,
    /// Internal counterparty without linked store or cash location.
    InternalLinkRequired,
    /// Blank asset name.
    AssetNameRequired,
    /// Acquisition cost not positive.
    AcquisitionCostPositive,
    /// Useful life below one year.
    UsefulLifeMinimum,
    /// Salvage value negative or above cost.
    SalvageRange,
    /// Draft has nothing worth saving.
    DraftEmpty,
    /// Account not in the catalog.
    AccountUnknown,
    /// Extension does not match the account's category.
    ExtensionMismatch,
}

impl Rule {
    /// Stable identifier used on the wire.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::MinimumLines => "minimum_lines",
            Self::Unbalanced => "unbalanced",
            Self::SingleAmount => "single_amount",
            Self::LocationRequired => "location_required",
            Self::LocationInvalid => "location_invalid",
            Self::CounterpartyRequired => "counterparty_required",
            Self::CounterpartyUnknown => "counterparty_unknown",
            Self::DueDateOrder => "due_date_order",
            Self::InterestRateRange => "interest_rate_range",
            Self::InterestDueDayRange => "interest_due_day_range",
            Self::InternalLinkRequired => "internal_link_required",
            Self::AssetNameRequired => "asset_name_required",
            Self::AcquisitionCostPositive => "acquisition_cost_positive",
            Self::UsefulLifeMinimum => "useful_life_minimum",
            Self::SalvageRange => "salvage_range",
            Self::DraftEmpty => "draft_empty",
            Self::AccountUnknown => "account_unknown",
            Self::ExtensionMismatch => "extension_mismatch",
        }
    }

    /// Human description shown to the user.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::MinimumLines => "an entry needs at least two lines",
            Self::Unbalanced => "debits and credits must balance",
            Self::SingleAmount => "enter either a debit or a credit",
            Self::LocationRequired => "location required",
            Self::LocationInvalid => "location must be a cash or vault location of the chosen store",
            Self::CounterpartyRequired => "counterparty required",
            Self::CounterpartyUnknown => "counterparty not found",
            Self::DueDateOrder => "due date must follow issue date",
            Self::InterestRateRange => "interest rate must be between 0 and 100",
            Self::InterestDueDayRange => "interest due day must be between 1 and 31",
            Self::InternalLinkRequired => {
                "internal counterparty requires a linked store and cash location"
            }
            Self::AssetNameRequired => "asset name required",
            Self::AcquisitionCostPositive => "acquisition cost must be positive",
            Self::UsefulLifeMinimum => "useful life must be at least one year",
            Self::SalvageRange => "salvage value must be between 0 and the acquisition cost",
            Self::DraftEmpty => "at least one line needs an account and an amount",
            Self::AccountUnknown => "account not found",
            Self::ExtensionMismatch => "details do not match the account category",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A single failed invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Editor position of the offending line (0-based); `None` for entry-level rules.
    pub line_index: Option<usize>,
    /// Violated rule.
    pub rule: Rule,
    /// Message for the user, with a 1-based line number.
    pub message: String,
    /// `|debit - credit|` for balance violations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difference: Option<Decimal>,
}

impl Violation {
    /// Violation of `rule` on the line at `line_index`.
    #[must_use]
    pub fn line(line_index: usize, rule: Rule) -> Self {
        Self {
            line_index: Some(line_index),
            rule,
            message: format!("Line {}: {}", line_index + 1, rule.description()),
            difference: None,
        }
    }

    /// Entry-level violation of `rule`.
    #[must_use]
    pub fn entry(rule: Rule) -> Self {
        Self {
            line_index: None,
            rule,
            message: capitalize(rule.description()),
            difference: None,
        }
    }

    /// Balance violation carrying the difference.
    #[must_use]
    pub fn unbalanced(totals: Totals) -> Self {
        let difference = totals.difference();
        Self {
            line_index: None,
            rule: Rule::Unbalanced,
            message: format!(
                "Entry is not balanced. Debit: {}, Credit: {}, difference: {difference}",
                totals.debit, totals.credit
            ),
            difference: Some(difference),
        }
    }

    /// Line number as displayed to the user (1-based).
    #[must_use]
    pub fn line_number(&self) -> Option<usize> {
        self.line_index.map(|i| i + 1)
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Debit and credit sums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Totals {
    /// Sum of debits.
    pub debit: Decimal,
    /// Sum of credits.
    pub credit: Decimal,
}

impl Totals {
    /// Sums the amounts of `lines`.
    #[must_use]
    pub fn of(lines: &[CollectedLine]) -> Self {
        lines.iter().fold(Self::default(), |acc, line| Self {
            debit: acc.debit + line.debit,
            credit: acc.credit + line.credit,
        })
    }

    /// `|debit - credit|`.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        (self.debit - self.credit).abs()
    }

    /// Larger of the two sums.
    #[must_use]
    pub fn base_amount(&self) -> Decimal {
        self.debit.max(self.credit)
    }

    /// Returns true if the sums differ by less than `tolerance`.
    #[must_use]
    pub fn is_balanced(&self, tolerance: Decimal) -> bool {
        within_tolerance(self.debit, self.credit, tolerance)
    }
}

/// Outcome of one validation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// Mode the run used.
    pub mode: ValidationMode,
    /// Violations in line order, entry-level ones last.
    pub violations: Vec<Violation>,
    /// Debit and credit sums.
    pub totals: Totals,
}

impl ValidationReport {
    /// Returns true if nothing was violated.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Violations attached to the line at `line_index`.
    pub fn for_line(&self, line_index: usize) -> impl Iterator<Item = &Violation> {
        self.violations
            .iter()
            .filter(move |v| v.line_index == Some(line_index))
    }
}

/// Lines that passed validation; the only input [`super::EntryComposer`] accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedLines {
    mode: ValidationMode,
    lines: Vec<CollectedLine>,
    totals: Totals,
}

impl ValidatedLines {
    /// Mode the lines passed.
    #[must_use]
    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    /// The lines, in editor order.
    #[must_use]
    pub fn lines(&self) -> &[CollectedLine] {
        &self.lines
    }

    /// Debit and credit sums.
    #[must_use]
    pub fn totals(&self) -> Totals {
        self.totals
    }

    /// Consumes the token, returning the lines.
    #[must_use]
    pub fn into_lines(self) -> Vec<CollectedLine> {
        self.lines
    }
}

/// Checks journal lines against the double-entry invariants.
#[derive(Debug, Clone, Copy)]
pub struct BalanceValidator {
    tolerance: Decimal,
}

impl Default for BalanceValidator {
    fn default() -> Self {
        Self::new(BALANCE_TOLERANCE)
    }
}

impl BalanceValidator {
    /// Creates a validator treating differences below `tolerance` as balanced.
    #[must_use]
    pub fn new(tolerance: Decimal) -> Self {
        Self { tolerance }
    }

    /// Runs every check for `mode`, returning all violations found.
    #[must_use]
    pub fn validate(
        &self,
        header: &EntryHeader,
        lines: &[CollectedLine],
        reference: &ReferenceData,
        mode: ValidationMode,
    ) -> ValidationReport {
        let totals = Totals::of(lines);
        let violations = match mode {
            ValidationMode::Strict => self.strict(header, lines, reference, totals),
            ValidationMode::Relaxed => Self::relaxed(lines),
        };

        ValidationReport {
            mode,
            violations,
            totals,
        }
    }

    /// Validates and, on success, hands out the token needed to compose a payload.
    pub fn validate_for_commit(
        &self,
        header: &EntryHeader,
        lines: Vec<CollectedLine>,
        reference: &ReferenceData,
        mode: ValidationMode,
    ) -> Result<ValidatedLines, Vec<Violation>> {
        let report = self.validate(header, &lines, reference, mode);
        if report.is_valid() {
            Ok(ValidatedLines {
                mode,
                lines,
                totals: report.totals,
            })
        } else {
            Err(report.violations)
        }
    }

    fn strict(
        &self,
        header: &EntryHeader,
        lines: &[CollectedLine],
        reference: &ReferenceData,
        totals: Totals,
    ) -> Vec<Violation> {
        let mut violations = Vec::new();

        for line in lines {
            let debit_positive = line.debit > Decimal::ZERO;
            let credit_positive = line.credit > Decimal::ZERO;
            let negative = line.debit < Decimal::ZERO || line.credit < Decimal::ZERO;
            if debit_positive == credit_positive || negative {
                violations.push(Violation::line(line.position, Rule::SingleAmount));
            }

            if line.category == Some(CategoryTag::Cash) && line.extension.is_none() {
                violations.push(Violation::line(line.position, Rule::LocationRequired));
            }

            let debt_detail_missing = line.category.is_some_and(CategoryTag::is_debt)
                && !matches!(line.extension, Some(LineExtension::Debt(_)));
            if debt_detail_missing || line.unresolved == Some(Unresolved::CounterpartyMissing) {
                violations.push(Violation::line(line.position, Rule::CounterpartyRequired));
            }

            if let Some(extension) = &line.extension {
                let ctx = RuleContext {
                    line_index: line.position,
                    header,
                    reference,
                };
                extension.check(&ctx, &mut violations);
            }
        }

        if lines.len() < 2 {
            violations.push(Violation::entry(Rule::MinimumLines));
        }

        if !totals.is_balanced(self.tolerance) {
            violations.push(Violation::unbalanced(totals));
        }

        violations
    }

    fn relaxed(lines: &[CollectedLine]) -> Vec<Violation> {
        let has_content = lines
            .iter()
            .any(|line| line.debit > Decimal::ZERO || line.credit > Decimal::ZERO);

        if has_content {
            Vec::new()
        } else {
            vec![Violation::entry(Rule::DraftEmpty)]
        }
    }
}
