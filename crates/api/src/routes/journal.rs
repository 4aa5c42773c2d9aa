//! Journal entry commit and reconciliation routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use storebooks_core::journal::{
    CommitError, CommitPayload, CommitResponse, ReconcileResponse, ReconciliationRequest,
};
use storebooks_shared::AppError;
use storebooks_shared::types::{CompanyId, EntryId};
use tracing::{info, warn};

use crate::error::{ApiError, CommitFailure, ReconcileFailure};
use crate::{AppState, middleware::AuthRequester};

/// Creates the journal routes (requires the identity middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/companies/{company_id}/journal-entries",
            post(commit_entry),
        )
        .route(
            "/companies/{company_id}/journal-entries/{entry_id}/reconcile",
            post(reconcile_entry),
        )
}

/// Rejects requests addressed to a company other than the requester's.
pub(crate) fn ensure_company(auth: &AuthRequester, company_id: CompanyId) -> Result<(), ApiError> {
    if auth.company_id() == company_id {
        Ok(())
    } else {
        Err(ApiError(AppError::Forbidden(format!(
            "Requester does not act for company {company_id}"
        ))))
    }
}

/// POST `/companies/{company_id}/journal-entries` - Commit an entry atomically.
async fn commit_entry(
    State(state): State<AppState>,
    auth: AuthRequester,
    Path(company_id): Path<CompanyId>,
    Json(payload): Json<CommitPayload>,
) -> Response {
    if auth.company_id() != company_id {
        return CommitFailure(CommitError::Authorization {
            requester: auth.company_id(),
            declared: company_id,
        })
        .into_response();
    }

    match state.gateway.commit(auth.requester(), &payload).await {
        Ok(entry_id) => {
            info!(
                entry_id = %entry_id,
                status = payload.status.as_str(),
                "Journal entry committed via API"
            );
            (StatusCode::CREATED, Json(CommitResponse { entry_id })).into_response()
        }
        Err(err) => {
            warn!(error = %err, "Journal entry commit rejected");
            CommitFailure(err).into_response()
        }
    }
}

/// POST `/companies/{company_id}/journal-entries/{entry_id}/reconcile` - Attach
/// the counterparty cash location to a committed entry.
async fn reconcile_entry(
    State(state): State<AppState>,
    auth: AuthRequester,
    Path((company_id, entry_id)): Path<(CompanyId, EntryId)>,
    Json(request): Json<ReconciliationRequest>,
) -> Response {
    if let Err(err) = ensure_company(&auth, company_id) {
        return err.into_response();
    }
    if request.entry_id != entry_id {
        return ApiError(AppError::BadRequest(format!(
            "Body names entry {} but path names {entry_id}",
            request.entry_id
        )))
        .into_response();
    }

    match state
        .reconciler
        .attach_counterparty_cash_location(auth.requester(), &request)
        .await
    {
        Ok(applied) => Json(ReconcileResponse {
            applied,
            error: None,
        })
        .into_response(),
        Err(err) => {
            warn!(entry_id = %entry_id, error = %err, "Reconciliation failed");
            ReconcileFailure(err).into_response()
        }
    }
}
