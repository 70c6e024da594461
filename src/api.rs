use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use crate::TONAPI_BASE;
use crate::types::{Account, AccountEvents, NftItems, ParsedAddress, SaleData};

/// Bounded timeout applied to every indexing-API request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Indexing-API failure classes.
///
/// `Unauthorized` is surfaced separately so the poller can abort on a bad
/// credential instead of silently retrying forever; everything else is
/// treated as transient by the callers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("tonapi rejected credentials (status {0})")]
    Unauthorized(StatusCode),
    #[error("tonapi returned status {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("tonapi request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Read-only view of on-chain state, abstracting the indexing API.
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Account info including capability markers.
    async fn account(&self, address: &str) -> Result<Account, ApiError>;

    /// Most recent events observed for an account.
    async fn recent_events(&self, address: &str, limit: u32) -> Result<AccountEvents, ApiError>;

    /// Decoded `get_sale_data` method result of a sale contract.
    async fn sale_data(&self, address: &str) -> Result<SaleData, ApiError>;

    /// Bulk NFT metadata lookup.
    async fn nfts_bulk(&self, addresses: &[String]) -> Result<NftItems, ApiError>;

    /// NFTs currently held by an account.
    async fn account_nfts(&self, address: &str) -> Result<NftItems, ApiError>;

    /// Canonical address forms for an address in any notation.
    async fn parse_address(&self, address: &str) -> Result<ParsedAddress, ApiError>;
}

/// tonapi.io v2 client. Cheap to clone; the underlying connection pool is shared.
#[derive(Clone)]
pub struct TonApi {
    http: reqwest::Client,
    base: String,
    api_key: String,
}

impl TonApi {
    pub fn new(api_key: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_base(TONAPI_BASE, api_key)
    }

    pub fn with_base(base: impl Into<String>, api_key: impl Into<String>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base: base.into(),
            api_key: api_key.into(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        debug!("GET {path}");
        let resp = self
            .http
            .get(format!("{}/{path}", self.base))
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        Self::decode(resp).await
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, ApiError> {
        debug!("POST {path}");
        let resp = self
            .http
            .post(format!("{}/{path}", self.base))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;
        Self::decode(resp).await
    }

    async fn decode<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ApiError::Unauthorized(status));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }
        Ok(resp.json::<T>().await?)
    }
}

#[async_trait]
impl MarketData for TonApi {
    async fn account(&self, address: &str) -> Result<Account, ApiError> {
        self.get_json(&format!("accounts/{address}")).await
    }

    async fn recent_events(&self, address: &str, limit: u32) -> Result<AccountEvents, ApiError> {
        self.get_json(&format!(
            "accounts/{address}/events?initiator=false&subject_only=false&limit={limit}"
        ))
        .await
    }

    async fn sale_data(&self, address: &str) -> Result<SaleData, ApiError> {
        self.get_json(&format!(
            "blockchain/accounts/{address}/methods/get_sale_data"
        ))
        .await
    }

    async fn nfts_bulk(&self, addresses: &[String]) -> Result<NftItems, ApiError> {
        self.post_json("nfts/_bulk", &json!({ "account_ids": addresses }))
            .await
    }

    async fn account_nfts(&self, address: &str) -> Result<NftItems, ApiError> {
        self.get_json(&format!("accounts/{address}/nfts")).await
    }

    async fn parse_address(&self, address: &str) -> Result<ParsedAddress, ApiError> {
        self.get_json(&format!("address/{address}/parse")).await
    }
}
