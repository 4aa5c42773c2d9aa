use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use storebooks_core::catalog::{
    Account, CashLocation, Counterparty, LookupError, LookupSource, Store,
};
use storebooks_core::journal::{
    CommitError, CommitErrorBody, CommitPayload, CommitResponse, PersistenceGateway,
    ReconcileError, ReconcileResponse, ReconciliationRequest, Reconciler, Requester,
};
use storebooks_shared::ClientConfig;
use storebooks_shared::types::{CompanyId, EntryId, StoreId};
use thiserror::Error;
use tracing::{debug, instrument, warn};

const USER_ID_HEADER: &str = "x-user-id";
const COMPANY_ID_HEADER: &str = "x-company-id";

/// Errors building a [`RemoteGateway`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

#[derive(Deserialize)]
struct AccountsResponse {
    accounts: Vec<Account>,
}

#[derive(Deserialize)]
struct StoresResponse {
    stores: Vec<Store>,
}

#[derive(Deserialize)]
struct CashLocationsResponse {
    cash_locations: Vec<CashLocation>,
}

#[derive(Deserialize)]
struct CounterpartiesResponse {
    counterparties: Vec<Counterparty>,
}

/// Gateway, reconciler and lookup source backed by the HTTP API.
///
/// Lookups are issued as `requester`; commits and reconciliations use the
/// requester passed to each call.
#[derive(Debug, Clone)]
pub struct RemoteGateway {
    http: Client,
    base_url: String,
    requester: Requester,
}

impl RemoteGateway {
    /// Creates a gateway for `config.base_url` acting as `requester`.
    pub fn new(config: &ClientConfig, requester: Requester) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            requester,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn identify(builder: RequestBuilder, requester: &Requester) -> RequestBuilder {
        builder
            .header(USER_ID_HEADER, requester.user_id.to_string())
            .header(COMPANY_ID_HEADER, requester.company_id.to_string())
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T, LookupError> {
        let response = Self::identify(self.http.get(self.url(path)), &self.requester)
            .send()
            .await
            .map_err(|err| LookupError::Unavailable(err.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(LookupError::Rejected(error_text(response).await));
        }
        if !status.is_success() {
            return Err(LookupError::Unavailable(error_text(response).await));
        }

        response
            .json::<T>()
            .await
            .map_err(|err| LookupError::Unavailable(err.to_string()))
    }
}

/// Reads the `message` of an error body, falling back to the status line.
async fn error_text(response: Response) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: Option<String>,
        error: Option<String>,
    }

    let status = response.status();
    match response.json::<ErrorBody>().await {
        Ok(ErrorBody {
            message: Some(message),
            ..
        }) => message,
        Ok(ErrorBody {
            error: Some(error), ..
        }) => error,
        _ => format!("HTTP {status}"),
    }
}

fn transport_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT
    )
}

#[async_trait]
impl PersistenceGateway for RemoteGateway {
    #[instrument(skip(self, requester, payload), fields(idempotency_key = %payload.idempotency_key))]
    async fn commit(
        &self,
        requester: &Requester,
        payload: &CommitPayload,
    ) -> Result<EntryId, CommitError> {
        let url = self.url(&format!(
            "/companies/{}/journal-entries",
            requester.company_id
        ));
        let response = Self::identify(self.http.post(url), requester)
            .json(payload)
            .send()
            .await
            .map_err(|err| {
                warn!(error = %err, "Commit request did not reach the server");
                CommitError::Transport(err.to_string())
            })?;

        let status = response.status();
        if status.is_success() {
            let body = response
                .json::<CommitResponse>()
                .await
                .map_err(|err| CommitError::Storage(format!("Malformed commit response: {err}")))?;
            debug!(entry_id = %body.entry_id, "Commit accepted");
            return Ok(body.entry_id);
        }

        let text = response.text().await.unwrap_or_default();
        if let Ok(body) = serde_json::from_str::<CommitErrorBody>(&text) {
            return Err(body.into_error(requester.company_id, payload.company_id));
        }

        Err(if transport_status(status) {
            CommitError::Transport(format!("HTTP {status}"))
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            CommitError::Authorization {
                requester: requester.company_id,
                declared: payload.company_id,
            }
        } else {
            CommitError::Storage(format!("HTTP {status}: {text}"))
        })
    }
}

#[async_trait]
impl Reconciler for RemoteGateway {
    #[instrument(skip(self, requester), fields(entry_id = %request.entry_id))]
    async fn attach_counterparty_cash_location(
        &self,
        requester: &Requester,
        request: &ReconciliationRequest,
    ) -> Result<bool, ReconcileError> {
        let url = self.url(&format!(
            "/companies/{}/journal-entries/{}/reconcile",
            requester.company_id, request.entry_id
        ));
        let response = Self::identify(self.http.post(url), requester)
            .json(request)
            .send()
            .await
            .map_err(|err| ReconcileError::Transport(err.to_string()))?;

        let status = response.status();
        if status == StatusCode::FORBIDDEN || status == StatusCode::UNAUTHORIZED {
            return Err(ReconcileError::Authorization(request.entry_id));
        }
        if transport_status(status) {
            return Err(ReconcileError::Transport(format!("HTTP {status}")));
        }

        let body = response
            .json::<ReconcileResponse>()
            .await
            .map_err(|err| ReconcileError::Storage(format!("Malformed reconcile response: {err}")))?;

        match body.error {
            Some(error) if !status.is_success() => Err(ReconcileError::Storage(error)),
            _ => Ok(body.applied),
        }
    }
}

#[async_trait]
impl LookupSource for RemoteGateway {
    async fn accounts(&self, company_id: CompanyId) -> Result<Vec<Account>, LookupError> {
        let body: AccountsResponse = self
            .fetch(&format!("/companies/{company_id}/accounts"))
            .await?;
        Ok(body.accounts)
    }

    async fn stores(&self, company_id: CompanyId) -> Result<Vec<Store>, LookupError> {
        let body: StoresResponse = self.fetch(&format!("/companies/{company_id}/stores")).await?;
        Ok(body.stores)
    }

    async fn cash_locations(
        &self,
        company_id: CompanyId,
        store_id: Option<StoreId>,
    ) -> Result<Vec<CashLocation>, LookupError> {
        let path = match store_id {
            Some(store_id) => format!("/companies/{company_id}/stores/{store_id}/cash-locations"),
            None => format!("/companies/{company_id}/cash-locations"),
        };
        let body: CashLocationsResponse = self.fetch(&path).await?;
        Ok(body.cash_locations)
    }

    async fn counterparties(
        &self,
        company_id: CompanyId,
    ) -> Result<Vec<Counterparty>, LookupError> {
        let body: CounterpartiesResponse = self
            .fetch(&format!("/companies/{company_id}/counterparties"))
            .await?;
        Ok(body.counterparties)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use storebooks_core::journal::{EntryStatus, PayloadLine, Rule};
    use storebooks_shared::types::{AccountId, CashLocationId, CommitKey, UserId};

    fn requester() -> Requester {
        Requester {
            user_id: UserId::new(),
            company_id: CompanyId::new(),
        }
    }

    fn gateway(base_url: String, requester: Requester) -> RemoteGateway {
        let config = ClientConfig {
            base_url,
            timeout_secs: 5,
        };
        RemoteGateway::new(&config, requester).unwrap()
    }

    fn payload(requester: &Requester) -> CommitPayload {
        let line = |debit, credit| PayloadLine {
            account_id: AccountId::new(),
            description: String::new(),
            debit,
            credit,
            debt: None,
            fix_asset: None,
            cash: None,
        };
        CommitPayload {
            company_id: requester.company_id,
            created_by: requester.user_id,
            entry_date: NaiveDate::from_ymd_opt(2026, 10, 5).unwrap(),
            description: "Cash sale".to_string(),
            store_id: None,
            counterparty_id: None,
            cash_location_id: None,
            base_amount: dec!(100),
            status: EntryStatus::Posted,
            idempotency_key: CommitKey::new(),
            lines: vec![line(dec!(100), dec!(0)), line(dec!(0), dec!(100))],
        }
    }

    #[tokio::test]
    async fn test_commit_sends_identity_and_returns_id() {
        let mut server = mockito::Server::new_async().await;
        let requester = requester();
        let entry_id = EntryId::new();
        let mock = server
            .mock(
                "POST",
                format!("/companies/{}/journal-entries", requester.company_id).as_str(),
            )
            .match_header(USER_ID_HEADER, requester.user_id.to_string().as_str())
            .match_header(COMPANY_ID_HEADER, requester.company_id.to_string().as_str())
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(json!({ "entry_id": entry_id }).to_string())
            .create_async()
            .await;

        let result = gateway(server.url(), requester)
            .commit(&requester, &payload(&requester))
            .await;

        mock.assert_async().await;
        assert_eq!(result, Ok(entry_id));
    }

    #[tokio::test]
    async fn test_commit_validation_body_is_rebuilt() {
        let mut server = mockito::Server::new_async().await;
        let requester = requester();
        server
            .mock(
                "POST",
                format!("/companies/{}/journal-entries", requester.company_id).as_str(),
            )
            .with_status(422)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "kind": "validation",
                    "message": "Line 1: location required",
                    "line_index": 0,
                    "rule": "location_required"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let err = gateway(server.url(), requester)
            .commit(&requester, &payload(&requester))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            CommitError::Validation {
                line_index: Some(0),
                rule: Some(Rule::LocationRequired),
                message: "Line 1: location required".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_commit_gateway_outage_is_transport() {
        let mut server = mockito::Server::new_async().await;
        let requester = requester();
        server
            .mock(
                "POST",
                format!("/companies/{}/journal-entries", requester.company_id).as_str(),
            )
            .with_status(502)
            .with_body("bad gateway")
            .create_async()
            .await;

        let err = gateway(server.url(), requester)
            .commit(&requester, &payload(&requester))
            .await
            .unwrap_err();

        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_commit_unreachable_server_is_transport() {
        let requester = requester();

        let err = gateway("http://127.0.0.1:1".to_string(), requester)
            .commit(&requester, &payload(&requester))
            .await
            .unwrap_err();

        assert!(matches!(err, CommitError::Transport(_)));
    }

    #[tokio::test]
    async fn test_reconcile_forbidden() {
        let mut server = mockito::Server::new_async().await;
        let requester = requester();
        let request = ReconciliationRequest {
            entry_id: EntryId::new(),
            counterparty_cash_location_id: CashLocationId::new(),
        };
        server
            .mock(
                "POST",
                format!(
                    "/companies/{}/journal-entries/{}/reconcile",
                    requester.company_id, request.entry_id
                )
                .as_str(),
            )
            .with_status(403)
            .with_header("content-type", "application/json")
            .with_body(json!({ "applied": false, "error": "nope" }).to_string())
            .create_async()
            .await;

        let err = gateway(server.url(), requester)
            .attach_counterparty_cash_location(&requester, &request)
            .await
            .unwrap_err();

        assert_eq!(err, ReconcileError::Authorization(request.entry_id));
    }

    #[tokio::test]
    async fn test_reconcile_applied() {
        let mut server = mockito::Server::new_async().await;
        let requester = requester();
        let request = ReconciliationRequest {
            entry_id: EntryId::new(),
            counterparty_cash_location_id: CashLocationId::new(),
        };
        server
            .mock(
                "POST",
                format!(
                    "/companies/{}/journal-entries/{}/reconcile",
                    requester.company_id, request.entry_id
                )
                .as_str(),
            )
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "applied": true }).to_string())
            .create_async()
            .await;

        let applied = gateway(server.url(), requester)
            .attach_counterparty_cash_location(&requester, &request)
            .await
            .unwrap();

        assert!(applied);
    }

    #[tokio::test]
    async fn test_store_cash_locations_path() {
        let mut server = mockito::Server::new_async().await;
        let requester = requester();
        let store = StoreId::new();
        let mock = server
            .mock(
                "GET",
                format!(
                    "/companies/{}/stores/{store}/cash-locations",
                    requester.company_id
                )
                .as_str(),
            )
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "cash_locations": [] }).to_string())
            .create_async()
            .await;

        let locations = gateway(server.url(), requester)
            .cash_locations(requester.company_id, Some(store))
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(locations.is_empty());
    }

    #[tokio::test]
    async fn test_lookup_rejected_on_forbidden() {
        let mut server = mockito::Server::new_async().await;
        let requester = requester();
        server
            .mock("GET", format!("/companies/{}/accounts", requester.company_id).as_str())
            .with_status(403)
            .with_header("content-type", "application/json")
            .with_body(json!({ "error": "FORBIDDEN", "message": "Access denied" }).to_string())
            .create_async()
            .await;

        let err = gateway(server.url(), requester)
            .accounts(requester.company_id)
            .await
            .unwrap_err();

        assert!(matches!(err, LookupError::Rejected(message) if message == "Access denied"));
    }
}
