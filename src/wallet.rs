use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::Config;

/// Custody wallet contract version used for signing.
pub const WALLET_VERSION: &str = "v4r2";

/// Signer requests can wait on seqno propagation; allow more headroom than
/// the read-only API calls get.
const SIGNER_TIMEOUT: Duration = Duration::from_secs(60);

/// Narrow interface over wallet key custody, signing, and broadcasting.
///
/// Both operations return the submitted-transaction identifier on success.
/// Implementations must not resubmit internally: at-most-once accounting is
/// layered on top via the ledgers.
#[async_trait]
pub trait WalletClient: Send + Sync {
    /// Send `amount_ton` TON to `to` (bounceable user-friendly form).
    async fn transfer_ton(&self, to: &str, amount_ton: f64) -> Result<String>;

    /// Send the NFT at `nft_address` to `to`.
    async fn transfer_nft(&self, to: &str, nft_address: &str) -> Result<String>;
}

#[derive(Serialize)]
struct SignRequest<'a> {
    wallet: &'a str,
    version: &'a str,
    mnemonic: &'a [String],
    to: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    amount_ton: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    nft_address: Option<&'a str>,
}

#[derive(Deserialize)]
struct SignResponse {
    tx_id: String,
}

/// Wallet client backed by a local signer sidecar.
///
/// The sidecar holds the seqno/boc machinery; this crate only hands it the
/// custody mnemonic, wallet version, and the transfer parameters, and gets a
/// transaction identifier back.
pub struct HttpWallet {
    http: reqwest::Client,
    base: String,
    custody_address: String,
    mnemonic: Vec<String>,
}

impl HttpWallet {
    pub fn new(
        base: impl Into<String>,
        custody_address: impl Into<String>,
        mnemonic: Vec<String>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(SIGNER_TIMEOUT)
            .build()
            .context("failed to build signer http client")?;
        Ok(Self {
            http,
            base: base.into(),
            custody_address: custody_address.into(),
            mnemonic,
        })
    }

    async fn submit(&self, path: &str, req: &SignRequest<'_>) -> Result<String> {
        let resp = self
            .http
            .post(format!("{}/{path}", self.base))
            .json(req)
            .send()
            .await
            .context("signer request failed")?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("signer returned status {status}: {body}");
        }
        let parsed: SignResponse = resp.json().await.context("malformed signer response")?;
        Ok(parsed.tx_id)
    }
}

#[async_trait]
impl WalletClient for HttpWallet {
    async fn transfer_ton(&self, to: &str, amount_ton: f64) -> Result<String> {
        self.submit(
            "transfer/ton",
            &SignRequest {
                wallet: &self.custody_address,
                version: WALLET_VERSION,
                mnemonic: &self.mnemonic,
                to,
                amount_ton: Some(amount_ton),
                nft_address: None,
            },
        )
        .await
    }

    async fn transfer_nft(&self, to: &str, nft_address: &str) -> Result<String> {
        self.submit(
            "transfer/nft",
            &SignRequest {
                wallet: &self.custody_address,
                version: WALLET_VERSION,
                mnemonic: &self.mnemonic,
                to,
                amount_ton: None,
                nft_address: Some(nft_address),
            },
        )
        .await
    }
}

/// Wallet for the selected run mode: the signer sidecar when live, the
/// simulation wallet otherwise.
pub fn for_mode(cfg: &Config, live: bool) -> Result<Arc<dyn WalletClient>> {
    if live {
        let url = cfg
            .wallet_url
            .as_deref()
            .context("wallet_url must be configured for live mode")?;
        Ok(Arc::new(HttpWallet::new(
            url,
            cfg.custody_address.clone(),
            cfg.seed.clone(),
        )?))
    } else {
        Ok(Arc::new(DryRunWallet::default()))
    }
}

/// Simulation wallet: logs the transfer and fabricates a transaction id.
#[derive(Default)]
pub struct DryRunWallet {
    counter: AtomicU64,
}

impl DryRunWallet {
    fn next_id(&self, kind: &str) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("dry-run-{kind}-{n}")
    }
}

#[async_trait]
impl WalletClient for DryRunWallet {
    async fn transfer_ton(&self, to: &str, amount_ton: f64) -> Result<String> {
        info!("[dry-run] would send {amount_ton} TON to {to}");
        Ok(self.next_id("ton"))
    }

    async fn transfer_nft(&self, to: &str, nft_address: &str) -> Result<String> {
        info!("[dry-run] would send NFT {nft_address} to {to}");
        Ok(self.next_id("nft"))
    }
}
