//! HTTP client for the pmdash backend REST surface.

use crate::error::{ApiError, ApiResult};
use pmdash_core::{Credential, Market, MarketId, NewMarket};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, Response};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Request body for `POST /auth/nonce`.
#[derive(Debug, Serialize)]
struct NonceRequest<'a> {
    address: &'a str,
}

/// Request body for `POST /auth/verify`.
#[derive(Debug, Serialize)]
struct VerifyRequest<'a> {
    address: &'a str,
    signature: &'a str,
}

/// One-time challenge returned by `POST /auth/nonce`.
#[derive(Debug, Clone, Deserialize)]
pub struct NonceChallenge {
    pub address: String,
    pub nonce: String,
    /// Full text the wallet must sign.
    pub message: String,
}

/// Verified session returned by `POST /auth/verify`.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifiedSession {
    pub token: String,
    pub address: String,
}

/// Latest persisted tick returned by `GET /pnl/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct LatestPnl {
    pub market_id: MarketId,
    pub pnl: Decimal,
    pub inventory: Decimal,
}

/// Client for the backend REST API.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Arguments
    /// * `base_url` - Backend origin (e.g., "http://localhost:8000").
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| ApiError::HttpClient(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: normalize_origin(base_url.into()),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `GET /health` liveness probe.
    pub async fn health(&self) -> ApiResult<()> {
        let response = self
            .client
            .get(self.url("/health"))
            .send()
            .await
            .map_err(transport_err)?;
        check(response).await?;
        Ok(())
    }

    /// `GET /markets` - the authoritative roster.
    pub async fn list_markets(&self) -> ApiResult<Vec<Market>> {
        debug!(url = %self.base_url, "Fetching market roster");

        let response = self
            .client
            .get(self.url("/markets"))
            .send()
            .await
            .map_err(transport_err)?;
        let response = check(response).await?;

        let markets: Vec<Market> = response
            .json()
            .await
            .map_err(|e| ApiError::HttpClient(format!("Failed to parse roster: {e}")))?;

        debug!(count = markets.len(), "Fetched market roster");
        Ok(markets)
    }

    /// `POST /markets` - create a market.
    pub async fn create_market(
        &self,
        req: &NewMarket,
        credential: Option<&Credential>,
    ) -> ApiResult<Market> {
        info!(name = %req.name, external_id = %req.external_id, "Creating market");

        let builder = self.client.post(self.url("/markets")).json(req);
        let response = with_auth(builder, credential)
            .send()
            .await
            .map_err(transport_err)?;
        let response = check(response).await?;

        response
            .json()
            .await
            .map_err(|e| ApiError::HttpClient(format!("Failed to parse created market: {e}")))
    }

    /// `POST /markets/{id}/start`.
    pub async fn start_market(
        &self,
        id: MarketId,
        credential: Option<&Credential>,
    ) -> ApiResult<()> {
        info!(market_id = %id, "Issuing start command");

        let builder = self.client.post(self.url(&format!("/markets/{id}/start")));
        let response = with_auth(builder, credential)
            .send()
            .await
            .map_err(transport_err)?;
        check(response).await?;
        Ok(())
    }

    /// `POST /markets/{id}/stop`.
    pub async fn stop_market(
        &self,
        id: MarketId,
        credential: Option<&Credential>,
    ) -> ApiResult<()> {
        info!(market_id = %id, "Issuing stop command");

        let builder = self.client.post(self.url(&format!("/markets/{id}/stop")));
        let response = with_auth(builder, credential)
            .send()
            .await
            .map_err(transport_err)?;
        check(response).await?;
        Ok(())
    }

    /// `POST /auth/nonce` - request a one-time signing challenge.
    pub async fn request_nonce(&self, address: &str) -> ApiResult<NonceChallenge> {
        debug!(%address, "Requesting auth nonce");

        let response = self
            .client
            .post(self.url("/auth/nonce"))
            .json(&NonceRequest { address })
            .send()
            .await
            .map_err(transport_err)?;
        let response = check(response).await?;

        response
            .json()
            .await
            .map_err(|e| ApiError::HttpClient(format!("Failed to parse nonce response: {e}")))
    }

    /// `POST /auth/verify` - submit the wallet signature.
    pub async fn verify_signature(
        &self,
        address: &str,
        signature: &str,
    ) -> ApiResult<VerifiedSession> {
        debug!(%address, "Verifying wallet signature");

        let response = self
            .client
            .post(self.url("/auth/verify"))
            .json(&VerifyRequest { address, signature })
            .send()
            .await
            .map_err(transport_err)?;
        let response = check(response).await?;

        response
            .json()
            .await
            .map_err(|e| ApiError::HttpClient(format!("Failed to parse verify response: {e}")))
    }

    /// `GET /pnl/{id}` - latest persisted tick for a market.
    pub async fn latest_pnl(&self, id: MarketId) -> ApiResult<LatestPnl> {
        let response = self
            .client
            .get(self.url(&format!("/pnl/{id}")))
            .send()
            .await
            .map_err(transport_err)?;
        let response = check(response).await?;

        response
            .json()
            .await
            .map_err(|e| ApiError::HttpClient(format!("Failed to parse pnl response: {e}")))
    }
}

/// Attach the bearer credential when present. A missing credential sends
/// the request unauthenticated; authorization is the server's concern.
fn with_auth(builder: RequestBuilder, credential: Option<&Credential>) -> RequestBuilder {
    match credential {
        Some(cred) => builder.header(AUTHORIZATION, cred.header_value()),
        None => builder,
    }
}

/// Surface non-success statuses with the body text verbatim.
async fn check(response: Response) -> ApiResult<Response> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

fn transport_err(e: reqwest::Error) -> ApiError {
    ApiError::HttpClient(format!("HTTP request failed: {e}"))
}

fn normalize_origin(mut origin: String) -> String {
    while origin.ends_with('/') {
        origin.pop();
    }
    origin
}
