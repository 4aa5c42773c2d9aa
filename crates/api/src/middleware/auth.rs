//! Requester identity middleware for protected routes.
//!
//! Authentication itself happens upstream; the gateway in front of this
//! service forwards the authenticated user and company as headers.

use axum::{
    Json,
    extract::{FromRequestParts, Request},
    http::{HeaderMap, StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use storebooks_core::journal::Requester;
use storebooks_shared::types::{CompanyId, UserId};

/// Header carrying the authenticated user ID.
pub const USER_ID_HEADER: &str = "x-user-id";
/// Header carrying the company the user acts for.
pub const COMPANY_ID_HEADER: &str = "x-company-id";

fn header_value<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers
        .get(name)
        .and_then(|h| h.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

/// Reads the requester from the identity headers.
fn requester_from_headers(headers: &HeaderMap) -> Option<Requester> {
    Some(Requester {
        user_id: header_value::<UserId>(headers, USER_ID_HEADER)?,
        company_id: header_value::<CompanyId>(headers, COMPANY_ID_HEADER)?,
    })
}

fn unauthorized() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "UNAUTHORIZED",
            "message": "x-user-id and x-company-id headers with valid UUIDs are required"
        })),
    )
}

/// Identity middleware that rejects requests without a well-formed requester.
///
/// The parsed [`Requester`] is stored in request extensions for handlers.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let Some(requester) = requester_from_headers(request.headers()) else {
        tracing::debug!(path = %request.uri().path(), "Request without requester identity");
        return unauthorized().into_response();
    };

    request.extensions_mut().insert(requester);
    next.run(request).await
}

/// Extractor for the authenticated requester.
#[derive(Debug, Clone, Copy)]
pub struct AuthRequester(pub Requester);

impl AuthRequester {
    /// Returns the requester's company.
    #[must_use]
    pub fn company_id(&self) -> CompanyId {
        self.0.company_id
    }

    /// Returns the requester.
    #[must_use]
    pub fn requester(&self) -> &Requester {
        &self.0
    }
}

impl<S> FromRequestParts<S> for AuthRequester
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Requester>()
            .copied()
            .or_else(|| requester_from_headers(&parts.headers))
            .map(AuthRequester)
            .ok_or_else(unauthorized)
    }
}
