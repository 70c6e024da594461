use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::api::MarketData;
use crate::ledger::Ledger;
use crate::wallet::WalletClient;

/// Result of one full sweep over the custody wallet's holdings.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct SweepSummary {
    /// NFT addresses transferred and recorded this sweep.
    pub transferred: Vec<String>,
    /// Already present in the transfer ledger.
    pub skipped: usize,
    /// Attempted but failed; left unrecorded for a later sweep.
    pub failed: usize,
}

/// Moves every NFT held by the custody wallet to the destination address,
/// each exactly once, tracked in its own ledger.
///
/// Holdings are re-derived live on every sweep; nothing about them is
/// persisted besides the ledger. The sweep lock serializes overlapping
/// invocations so check-then-append stays atomic per NFT.
pub struct TransferStage {
    market: Arc<dyn MarketData>,
    wallet: Arc<dyn WalletClient>,
    ledger: Ledger,
    custody_address: String,
    destination_address: String,
    sweep_lock: Mutex<()>,
}

impl TransferStage {
    pub fn new(
        market: Arc<dyn MarketData>,
        wallet: Arc<dyn WalletClient>,
        ledger: Ledger,
        custody_address: impl Into<String>,
        destination_address: impl Into<String>,
    ) -> Self {
        Self {
            market,
            wallet,
            ledger,
            custody_address: custody_address.into(),
            destination_address: destination_address.into(),
            sweep_lock: Mutex::new(()),
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// One full pass over current holdings.
    pub async fn sweep(&self) -> Result<SweepSummary> {
        let _guard = self.sweep_lock.lock().await;

        let destination = self
            .market
            .parse_address(&self.destination_address)
            .await
            .context("failed to resolve destination address")?
            .bounceable
            .b64url;

        let held = self
            .market
            .account_nfts(&self.custody_address)
            .await
            .context("failed to enumerate custody NFTs")?;

        let mut summary = SweepSummary::default();
        for item in &held.nft_items {
            let nft = match self.market.parse_address(&item.address).await {
                Ok(parsed) => parsed.bounceable.b64url,
                Err(e) => {
                    warn!("address parse for NFT {} failed: {e}", item.address);
                    summary.failed += 1;
                    continue;
                }
            };

            if self.ledger.contains(&nft).await {
                summary.skipped += 1;
                continue;
            }

            match self.wallet.transfer_nft(&destination, &nft).await {
                Ok(tx_id) => {
                    self.ledger.record(&nft).await?;
                    info!("NFT {nft} sent to {destination} | tx {tx_id}");
                    summary.transferred.push(nft);
                }
                Err(e) => {
                    warn!("transfer of NFT {nft} failed: {e:#}");
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{MockMarket, MockWallet};

    fn stage_with(
        market: Arc<MockMarket>,
        wallet: Arc<MockWallet>,
        dir: &tempfile::TempDir,
    ) -> TransferStage {
        let ledger = Ledger::open(dir.path().join("sent.txt")).unwrap();
        TransferStage::new(market, wallet, ledger, "EQCUSTODY", "EQDEST")
    }

    #[tokio::test]
    async fn sweeps_only_unrecorded_nfts() {
        let dir = tempfile::tempdir().unwrap();
        let market = Arc::new(MockMarket::default());
        market.set_held_nfts(&["0:x", "0:y"]);
        let wallet = Arc::new(MockWallet::default());
        let stage = stage_with(market, wallet.clone(), &dir);

        // X was handled on an earlier sweep.
        stage.ledger().record("0:x").await.unwrap();

        let summary = stage.sweep().await.unwrap();
        assert_eq!(summary.transferred, vec!["0:y".to_string()]);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 0);

        let transfers = wallet.nft_transfers();
        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0], ("EQDEST".to_string(), "0:y".to_string()));
        assert!(stage.ledger().contains("0:y").await);
    }

    #[tokio::test]
    async fn empty_wallet_is_a_clean_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let market = Arc::new(MockMarket::default());
        let wallet = Arc::new(MockWallet::default());
        let stage = stage_with(market, wallet.clone(), &dir);

        let summary = stage.sweep().await.unwrap();
        assert_eq!(summary, SweepSummary::default());
        assert!(wallet.nft_transfers().is_empty());
    }

    #[tokio::test]
    async fn failed_transfer_stays_retryable() {
        let dir = tempfile::tempdir().unwrap();
        let market = Arc::new(MockMarket::default());
        market.set_held_nfts(&["0:x"]);
        let wallet = Arc::new(MockWallet::failing());
        let stage = stage_with(market, wallet, &dir);

        let summary = stage.sweep().await.unwrap();
        assert!(summary.transferred.is_empty());
        assert_eq!(summary.failed, 1);
        assert!(!stage.ledger().contains("0:x").await);

        // Retry on a later sweep succeeds once the wallet recovers.
    }

    #[tokio::test]
    async fn repeated_sweep_transfers_nothing_new() {
        let dir = tempfile::tempdir().unwrap();
        let market = Arc::new(MockMarket::default());
        market.set_held_nfts(&["0:x"]);
        let wallet = Arc::new(MockWallet::default());
        let stage = stage_with(market, wallet.clone(), &dir);

        stage.sweep().await.unwrap();
        let second = stage.sweep().await.unwrap();
        assert!(second.transferred.is_empty());
        assert_eq!(second.skipped, 1);
        assert_eq!(wallet.nft_transfers().len(), 1);
    }
}
