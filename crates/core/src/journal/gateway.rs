//! Persistence seams: the atomic commit and the best-effort reconciliation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use storebooks_shared::types::{CompanyId, EntryId, UserId};
use thiserror::Error;

use super::composer::{CommitPayload, ReconciliationRequest};
use super::validation::{Rule, Violation};

/// Identity of the caller as established by the authentication layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requester {
    /// Authenticated user.
    pub user_id: UserId,
    /// Company the user acts for.
    pub company_id: CompanyId,
}

/// Coarse category of a [`CommitError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitErrorKind {
    /// Rejected before any write.
    Validation,
    /// Requester may not write for the declared company.
    Authorization,
    /// Idempotency key already used incompatibly.
    Conflict,
    /// Server unreachable.
    Transport,
    /// Any other storage failure.
    Storage,
}

/// Errors from [`PersistenceGateway::commit`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitError {
    /// Payload failed validation; nothing was written.
    #[error("{message}")]
    Validation {
        /// Editor position of the first offending line.
        line_index: Option<usize>,
        /// First violated rule.
        rule: Option<Rule>,
        /// Every violation message, joined.
        message: String,
    },

    /// Requester's company differs from the entry's.
    #[error("Company {requester} may not write entries for company {declared}")]
    Authorization {
        /// Company of the requester.
        requester: CompanyId,
        /// Company declared in the payload.
        declared: CompanyId,
    },

    /// Idempotency key already names an entry that cannot be replaced.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Network or server unavailable; safe to retry manually.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Any other storage failure.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl CommitError {
    /// Folds validation findings into one error, keeping the first rule and line.
    #[must_use]
    pub fn from_violations(violations: &[Violation]) -> Self {
        let first = violations.first();
        Self::Validation {
            line_index: first.and_then(|v| v.line_index),
            rule: first.map(|v| v.rule),
            message: violations
                .iter()
                .map(|v| v.message.as_str())
                .collect::<Vec<_>>()
                .join("; "),
        }
    }

    /// Coarse category.
    #[must_use]
    pub fn kind(&self) -> CommitErrorKind {
        match self {
            Self::Validation { .. } => CommitErrorKind::Validation,
            Self::Authorization { .. } => CommitErrorKind::Authorization,
            Self::Conflict(_) => CommitErrorKind::Conflict,
            Self::Transport(_) => CommitErrorKind::Transport,
            Self::Storage(_) => CommitErrorKind::Storage,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Authorization { .. } => "FORBIDDEN",
            Self::Conflict(_) => "CONFLICT",
            Self::Transport(_) => "SERVICE_UNAVAILABLE",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } => 422,
            Self::Authorization { .. } => 403,
            Self::Conflict(_) => 409,
            Self::Transport(_) => 503,
            Self::Storage(_) => 500,
        }
    }

    /// Returns true if the same request may succeed later.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Wire form of a [`CommitError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitErrorBody {
    /// Error category.
    pub kind: CommitErrorKind,
    /// Human-readable message.
    pub message: String,
    /// Offending line, for validation errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_index: Option<usize>,
    /// Violated rule, for validation errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<Rule>,
}

impl From<&CommitError> for CommitErrorBody {
    fn from(err: &CommitError) -> Self {
        let (line_index, rule) = match err {
            CommitError::Validation {
                line_index, rule, ..
            } => (*line_index, *rule),
            _ => (None, None),
        };
        let message = match err {
            CommitError::Validation { message, .. }
            | CommitError::Conflict(message)
            | CommitError::Transport(message)
            | CommitError::Storage(message) => message.clone(),
            CommitError::Authorization { .. } => err.to_string(),
        };
        Self {
            kind: err.kind(),
            message,
            line_index,
            rule,
        }
    }
}

impl CommitErrorBody {
    /// Rebuilds the error on the receiving side.
    ///
    /// Authorization details are not on the wire, so `requester` and `declared`
    /// come from the caller.
    #[must_use]
    pub fn into_error(self, requester: CompanyId, declared: CompanyId) -> CommitError {
        match self.kind {
            CommitErrorKind::Validation => CommitError::Validation {
                line_index: self.line_index,
                rule: self.rule,
                message: self.message,
            },
            CommitErrorKind::Authorization => CommitError::Authorization {
                requester,
                declared,
            },
            CommitErrorKind::Conflict => CommitError::Conflict(self.message),
            CommitErrorKind::Transport => CommitError::Transport(self.message),
            CommitErrorKind::Storage => CommitError::Storage(self.message),
        }
    }
}

/// Successful commit response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitResponse {
    /// Identifier assigned to the entry.
    pub entry_id: EntryId,
}

/// Reconciliation response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileResponse {
    /// True if the location was attached.
    pub applied: bool,
    /// Failure description, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Errors from [`Reconciler::attach_counterparty_cash_location`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    /// Requester may not touch the entry.
    #[error("Not allowed to reconcile entry {0}")]
    Authorization(EntryId),

    /// Network or server unavailable.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Any other storage failure.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl ReconcileError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Authorization(_) => "FORBIDDEN",
            Self::Transport(_) => "SERVICE_UNAVAILABLE",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Authorization(_) => 403,
            Self::Transport(_) => 503,
            Self::Storage(_) => 500,
        }
    }
}

/// Atomic write of a whole entry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Writes header, lines and extensions in one transaction, returning the entry ID.
    async fn commit(
        &self,
        requester: &Requester,
        payload: &CommitPayload,
    ) -> Result<EntryId, CommitError>;
}

/// Non-transactional attachment of a counterparty cash location to a committed entry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Reconciler: Send + Sync {
    /// Returns whether the location was attached.
    async fn attach_counterparty_cash_location(
        &self,
        requester: &Requester,
        request: &ReconciliationRequest,
    ) -> Result<bool, ReconcileError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_violations_keeps_first() {
        let violations = vec![
            Violation::line(0, Rule::LocationRequired),
            Violation::line(1, Rule::SingleAmount),
        ];

        let err = CommitError::from_violations(&violations);

        assert_eq!(
            err,
            CommitError::Validation {
                line_index: Some(0),
                rule: Some(Rule::LocationRequired),
                message: "Line 1: location required; Line 2: enter either a debit or a credit"
                    .to_string(),
            }
        );
        assert_eq!(err.http_status_code(), 422);
    }

    #[test]
    fn test_status_mapping() {
        let company = CompanyId::new();
        assert_eq!(
            CommitError::Authorization {
                requester: company,
                declared: CompanyId::new()
            }
            .http_status_code(),
            403
        );
        assert_eq!(CommitError::Conflict(String::new()).http_status_code(), 409);
        assert_eq!(CommitError::Transport(String::new()).http_status_code(), 503);
        assert_eq!(CommitError::Storage(String::new()).http_status_code(), 500);
        assert!(CommitError::Transport(String::new()).is_retryable());
        assert!(!CommitError::Storage(String::new()).is_retryable());
    }

    #[test]
    fn test_error_body_wire_shape() {
        let err = CommitError::from_violations(&[Violation::line(2, Rule::DueDateOrder)]);
        let body = CommitErrorBody::from(&err);
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["kind"], "validation");
        assert_eq!(json["rule"], "due_date_order");
        assert_eq!(json["line_index"], 2);
        assert_eq!(json["message"], "Line 3: due date must follow issue date");

        let transport = CommitErrorBody::from(&CommitError::Transport("down".to_string()));
        let json = serde_json::to_value(&transport).unwrap();
        assert!(json.get("rule").is_none());
        assert_eq!(json["message"], "down");
    }

    #[test]
    fn test_error_body_round_trip_to_error() {
        let company = CompanyId::new();
        let err = CommitError::from_violations(&[Violation::line(0, Rule::LocationRequired)]);

        let back = CommitErrorBody::from(&err).into_error(company, company);

        assert_eq!(back, err);
    }
}
