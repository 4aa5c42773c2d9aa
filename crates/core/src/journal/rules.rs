//! Per-extension completeness rules.

use rust_decimal::Decimal;

use super::types::{CashDetail, DebtDetail, EntryHeader, FixedAssetDetail, LineExtension};
use super::validation::{Rule, Violation};
use crate::catalog::ReferenceData;

/// Everything a rule may look at besides the extension itself.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    /// Editor position of the line being checked.
    pub line_index: usize,
    /// Entry header.
    pub header: &'a EntryHeader,
    /// Reference listings for the entry's store.
    pub reference: &'a ReferenceData,
}

impl RuleContext<'_> {
    fn violation(&self, rule: Rule) -> Violation {
        Violation::line(self.line_index, rule)
    }
}

/// Completeness checks owned by an extension type.
pub trait ExtensionRules {
    /// Appends every violation of this extension to `out`.
    fn check(&self, ctx: &RuleContext<'_>, out: &mut Vec<Violation>);
}

impl ExtensionRules for CashDetail {
    fn check(&self, ctx: &RuleContext<'_>, out: &mut Vec<Violation>) {
        let valid = ctx
            .reference
            .cash_location(self.cash_location_id)
            .is_some_and(|location| {
                location.location_type.holds_physical_cash()
                    && ctx.header.store_id.is_some()
                    && location.store_id == ctx.header.store_id
            });

        if !valid {
            out.push(ctx.violation(Rule::LocationInvalid));
        }
    }
}

impl ExtensionRules for DebtDetail {
    fn check(&self, ctx: &RuleContext<'_>, out: &mut Vec<Violation>) {
        if self.due_date <= self.issue_date {
            out.push(ctx.violation(Rule::DueDateOrder));
        }

        if self.interest_rate < Decimal::ZERO || self.interest_rate > Decimal::ONE_HUNDRED {
            out.push(ctx.violation(Rule::InterestRateRange));
        }

        if self
            .interest_due_day
            .is_some_and(|day| !(1..=31).contains(&day))
        {
            out.push(ctx.violation(Rule::InterestDueDayRange));
        }

        match ctx.reference.counterparty(self.counterparty_id) {
            None => out.push(ctx.violation(Rule::CounterpartyUnknown)),
            Some(counterparty) if counterparty.is_internal => {
                if self.linked_store_id.is_none() || self.counterparty_cash_location_id.is_none() {
                    out.push(ctx.violation(Rule::InternalLinkRequired));
                }
            }
            Some(_) => {}
        }
    }
}

impl ExtensionRules for FixedAssetDetail {
    fn check(&self, ctx: &RuleContext<'_>, out: &mut Vec<Violation>) {
        if self.asset_name.trim().is_empty() {
            out.push(ctx.violation(Rule::AssetNameRequired));
        }

        if self.acquisition_cost <= Decimal::ZERO {
            out.push(ctx.violation(Rule::AcquisitionCostPositive));
        }

        if self.useful_life_years < 1 {
            out.push(ctx.violation(Rule::UsefulLifeMinimum));
        }

        if self.salvage_value < Decimal::ZERO || self.salvage_value > self.acquisition_cost {
            out.push(ctx.violation(Rule::SalvageRange));
        }
    }
}

impl ExtensionRules for LineExtension {
    fn check(&self, ctx: &RuleContext<'_>, out: &mut Vec<Violation>) {
        match self {
            Self::Cash(detail) => detail.check(ctx, out),
            Self::Debt(detail) => detail.check(ctx, out),
            Self::FixedAsset(detail) => detail.check(ctx, out),
        }
    }
}
