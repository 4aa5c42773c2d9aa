//! Per-line state machine driven by the selected account's category tag.

use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;
use storebooks_shared::types::{AccountId, AmountParseError, CashLocationId, CounterpartyId};
use thiserror::Error;

use super::types::{DebtTerms, FixedAssetDetail, InternalLink};
use crate::catalog::{Account, CategoryTag, Counterparty};

/// State of one journal line.
///
/// Each variant owns the extension data it can carry; leaving a variant drops it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LineState {
    /// No account selected yet.
    #[default]
    NoAccount,
    /// Account without a category tag.
    Generic,
    /// Cash account; needs a location.
    Cash {
        /// Selected cash location.
        location: Option<CashLocationId>,
    },
    /// Receivable or payable account.
    Debt {
        /// Selected counterparty.
        counterparty: Option<Counterparty>,
        /// Other side of an internal counterparty.
        link: InternalLink,
        /// Terms entered through the debt details editor.
        terms: Option<DebtTerms>,
    },
    /// Fixed asset account.
    FixedAsset {
        /// Terms entered through the asset details editor.
        detail: Option<FixedAssetDetail>,
    },
}

/// Discriminant of [`LineState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStateKind {
    /// No account.
    NoAccount,
    /// Untagged account.
    Generic,
    /// Cash account.
    Cash,
    /// Receivable or payable account.
    Debt,
    /// Fixed asset account.
    FixedAsset,
}

impl fmt::Display for LineStateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NoAccount => "no account",
            Self::Generic => "generic",
            Self::Cash => "cash",
            Self::Debt => "receivable/payable",
            Self::FixedAsset => "fixed asset",
        };
        f.write_str(name)
    }
}

/// Whether a picker is offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PickerState {
    /// Not shown for this line.
    Hidden,
    /// Shown but not usable yet.
    Disabled,
    /// Usable.
    Enabled,
}

/// Pickers and actions a line offers in its current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineAffordances {
    /// Cash location picker; disabled until a store is chosen.
    pub location_picker: PickerState,
    /// Counterparty picker.
    pub counterparty_picker: PickerState,
    /// Linked store and counterparty cash location pickers.
    pub internal_link_pickers: PickerState,
    /// "Debt details" action.
    pub debt_details: bool,
    /// "Asset details" action.
    pub asset_details: bool,
}

impl LineAffordances {
    const NONE: Self = Self {
        location_picker: PickerState::Hidden,
        counterparty_picker: PickerState::Hidden,
        internal_link_pickers: PickerState::Hidden,
        debt_details: false,
        asset_details: false,
    };
}

impl LineState {
    /// Fresh state for a newly selected account.
    #[must_use]
    pub fn for_account(account: Option<&Account>) -> Self {
        match account.map(|a| a.category_tag) {
            None => Self::NoAccount,
            Some(None) => Self::Generic,
            Some(Some(CategoryTag::Cash)) => Self::Cash { location: None },
            Some(Some(CategoryTag::Payable | CategoryTag::Receivable)) => Self::Debt {
                counterparty: None,
                link: InternalLink::default(),
                terms: None,
            },
            Some(Some(CategoryTag::FixedAsset)) => Self::FixedAsset { detail: None },
        }
    }

    /// Discriminant of this state.
    #[must_use]
    pub fn kind(&self) -> LineStateKind {
        match self {
            Self::NoAccount => LineStateKind::NoAccount,
            Self::Generic => LineStateKind::Generic,
            Self::Cash { .. } => LineStateKind::Cash,
            Self::Debt { .. } => LineStateKind::Debt,
            Self::FixedAsset { .. } => LineStateKind::FixedAsset,
        }
    }

    /// Returns true if the state holds any user-entered extension data.
    #[must_use]
    pub fn has_extension_data(&self) -> bool {
        match self {
            Self::NoAccount | Self::Generic => false,
            Self::Cash { location } => location.is_some(),
            Self::Debt {
                counterparty,
                link,
                terms,
            } => counterparty.is_some() || terms.is_some() || *link != InternalLink::default(),
            Self::FixedAsset { detail } => detail.is_some(),
        }
    }

    /// Pickers and actions offered in this state.
    #[must_use]
    pub fn affordances(&self, store_chosen: bool) -> LineAffordances {
        match self {
            Self::NoAccount | Self::Generic => LineAffordances::NONE,
            Self::Cash { .. } => LineAffordances {
                location_picker: if store_chosen {
                    PickerState::Enabled
                } else {
                    PickerState::Disabled
                },
                ..LineAffordances::NONE
            },
            Self::Debt { counterparty, .. } => LineAffordances {
                counterparty_picker: PickerState::Enabled,
                internal_link_pickers: match counterparty {
                    Some(c) if c.is_internal => PickerState::Enabled,
                    _ => PickerState::Hidden,
                },
                debt_details: true,
                ..LineAffordances::NONE
            },
            Self::FixedAsset { .. } => LineAffordances {
                asset_details: true,
                ..LineAffordances::NONE
            },
        }
    }
}

/// Result of an account selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// State before the selection.
    pub from: LineStateKind,
    /// State after the selection.
    pub to: LineStateKind,
    /// True if extension data was dropped.
    pub discarded_extension: bool,
}

/// Errors from editing a line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    /// The edit needs a different line state.
    #[error("Line is {actual}, expected {expected}")]
    WrongState {
        /// State the edit applies to.
        expected: LineStateKind,
        /// Current state.
        actual: LineStateKind,
    },

    /// Cash locations are store-scoped.
    #[error("Choose a store before picking a cash location")]
    StoreNotChosen,

    /// No line at this position.
    #[error("No line at position {0}")]
    LineOutOfRange(usize),

    /// Account is not in the catalog.
    #[error("Account not found: {0}")]
    UnknownAccount(AccountId),

    /// Counterparty is not in the reference listing.
    #[error("Counterparty not found: {0}")]
    UnknownCounterparty(CounterpartyId),

    /// Internal link set on an external counterparty.
    #[error("Counterparty is not internal")]
    CounterpartyNotInternal,

    /// Invalid amount text.
    #[error(transparent)]
    Amount(#[from] AmountParseError),
}

impl LineError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::WrongState { .. } => "LINE_WRONG_STATE",
            Self::StoreNotChosen => "STORE_NOT_CHOSEN",
            Self::LineOutOfRange(_) => "LINE_OUT_OF_RANGE",
            Self::UnknownAccount(_) => "ACCOUNT_NOT_FOUND",
            Self::UnknownCounterparty(_) => "COUNTERPARTY_NOT_FOUND",
            Self::CounterpartyNotInternal => "COUNTERPARTY_NOT_INTERNAL",
            Self::Amount(_) => "INVALID_AMOUNT",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::UnknownAccount(_) | Self::UnknownCounterparty(_) | Self::LineOutOfRange(_) => 404,
            Self::WrongState { .. }
            | Self::StoreNotChosen
            | Self::CounterpartyNotInternal
            | Self::Amount(_) => 400,
        }
    }
}

/// A line as it exists in the editor before commit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JournalLineDraft {
    /// Selected account.
    pub account_id: Option<AccountId>,
    /// Category tag of the selected account.
    pub category: Option<CategoryTag>,
    /// Line memo.
    pub description: String,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    state: LineState,
}

impl JournalLineDraft {
    /// Creates an empty line.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &LineState {
        &self.state
    }

    /// Selects an account, entering the state its tag calls for.
    ///
    /// The previous extension is always discarded, even if the new account has the same tag.
    pub fn select_account(&mut self, account: Option<&Account>) -> Transition {
        let from = self.state.kind();
        let discarded_extension = self.state.has_extension_data();

        self.account_id = account.map(|a| a.id);
        self.category = account.and_then(|a| a.category_tag);
        self.state = LineState::for_account(account);

        Transition {
            from,
            to: self.state.kind(),
            discarded_extension,
        }
    }

    /// Returns the line to `NoAccount`.
    pub fn clear_account(&mut self) -> Transition {
        self.select_account(None)
    }

    /// Sets both amounts.
    pub fn set_amounts(&mut self, debit: Decimal, credit: Decimal) -> Result<(), LineError> {
        for value in [debit, credit] {
            if value.is_sign_negative() && !value.is_zero() {
                return Err(AmountParseError::Negative(value).into());
            }
        }
        self.debit = debit;
        self.credit = credit;
        Ok(())
    }

    /// Sets or clears the cash location.
    pub fn set_cash_location(&mut self, id: Option<CashLocationId>) -> Result<(), LineError> {
        match &mut self.state {
            LineState::Cash { location } => {
                *location = id;
                Ok(())
            }
            other => Err(wrong_state(LineStateKind::Cash, other)),
        }
    }

    /// Clears a cash location, if the line has one.
    pub(crate) fn reset_cash_location(&mut self) -> bool {
        match &mut self.state {
            LineState::Cash { location } => location.take().is_some(),
            _ => false,
        }
    }

    /// Sets or clears the counterparty. An external counterparty drops any internal link.
    pub fn set_counterparty(&mut self, selected: Option<Counterparty>) -> Result<(), LineError> {
        match &mut self.state {
            LineState::Debt {
                counterparty, link, ..
            } => {
                if !selected.as_ref().is_some_and(|c| c.is_internal) {
                    *link = InternalLink::default();
                }
                *counterparty = selected;
                Ok(())
            }
            other => Err(wrong_state(LineStateKind::Debt, other)),
        }
    }

    /// Sets the linked store and counterparty cash location of an internal counterparty.
    pub fn set_internal_link(&mut self, new_link: InternalLink) -> Result<(), LineError> {
        match &mut self.state {
            LineState::Debt {
                counterparty, link, ..
            } => {
                if !counterparty.as_ref().is_some_and(|c| c.is_internal) {
                    return Err(LineError::CounterpartyNotInternal);
                }
                *link = new_link;
                Ok(())
            }
            other => Err(wrong_state(LineStateKind::Debt, other)),
        }
    }

    /// Stores the terms from the debt details editor.
    pub fn edit_debt_detail(&mut self, edited: DebtTerms) -> Result<(), LineError> {
        match &mut self.state {
            LineState::Debt { terms, .. } => {
                *terms = Some(edited);
                Ok(())
            }
            other => Err(wrong_state(LineStateKind::Debt, other)),
        }
    }

    /// Drops edited debt terms, falling back to defaults on collection.
    pub fn clear_debt_detail(&mut self) -> Result<(), LineError> {
        match &mut self.state {
            LineState::Debt { terms, .. } => {
                *terms = None;
                Ok(())
            }
            other => Err(wrong_state(LineStateKind::Debt, other)),
        }
    }

    /// Stores the terms from the asset details editor.
    pub fn edit_fixed_asset(&mut self, edited: FixedAssetDetail) -> Result<(), LineError> {
        match &mut self.state {
            LineState::FixedAsset { detail } => {
                *detail = Some(edited);
                Ok(())
            }
            other => Err(wrong_state(LineStateKind::FixedAsset, other)),
        }
    }
}

fn wrong_state(expected: LineStateKind, actual: &LineState) -> LineError {
    LineError::WrongState {
        expected,
        actual: actual.kind(),
    }
}
