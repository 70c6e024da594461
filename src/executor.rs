use anyhow::Result;
use tracing::{info, warn};

use crate::api::{ApiError, MarketData};
use crate::ledger::Ledger;
use crate::types::SaleListing;
use crate::wallet::WalletClient;
use crate::{NANOTON, SALE_INTERFACE};

/// Fee margin added on top of the asking price, in nanotons (1 TON).
pub const FEE_NANO: i64 = NANOTON;

/// Outcome of one purchase attempt. Only `Submitted` writes to the ledger.
#[derive(Debug, Clone, PartialEq)]
pub enum PurchaseOutcome {
    /// The sale contract is already in the purchase ledger; no side effect.
    AlreadyHandled,
    /// The account does not declare the sale-contract interface.
    NotSaleContract,
    /// The transfer was submitted and the listing recorded.
    Submitted { tx_id: String, total_ton: f64 },
    /// The attempt failed; the listing stays unrecorded and retryable.
    Failed(String),
}

/// Transfer amount in TON for a listing price: price plus the fixed fee margin.
pub fn total_with_fee_ton(price_nano: i64) -> f64 {
    (price_nano + FEE_NANO) as f64 / NANOTON as f64
}

/// Attempt to buy one listing, at most once per sale-contract address.
///
/// The ledger is written only after the wallet confirms submission, so a
/// failed attempt stays eligible for retry on a later cycle. Credential
/// failures propagate; every other API failure is a reported non-fatal
/// outcome.
pub async fn execute_purchase<M, W>(
    market: &M,
    wallet: &W,
    ledger: &Ledger,
    listing: &SaleListing,
) -> Result<PurchaseOutcome>
where
    M: MarketData + ?Sized,
    W: WalletClient + ?Sized,
{
    if ledger.contains(&listing.sale_contract).await {
        info!("sale contract {} already handled", listing.sale_contract);
        return Ok(PurchaseOutcome::AlreadyHandled);
    }

    let account = match market.account(&listing.sale_contract).await {
        Ok(account) => account,
        Err(e @ ApiError::Unauthorized(_)) => return Err(e.into()),
        Err(e) => {
            warn!("account lookup for {} failed: {e}", listing.sale_contract);
            return Ok(PurchaseOutcome::Failed(format!("account lookup: {e}")));
        }
    };
    let is_sale = account
        .interfaces
        .as_deref()
        .is_some_and(|ifaces| ifaces.iter().any(|i| i == SALE_INTERFACE));
    if !is_sale {
        warn!(
            "{} is not a sale contract (interfaces: {:?})",
            listing.sale_contract, account.interfaces
        );
        return Ok(PurchaseOutcome::NotSaleContract);
    }

    let bounceable = match market.parse_address(&listing.sale_contract).await {
        Ok(parsed) => parsed.bounceable.b64url,
        Err(e @ ApiError::Unauthorized(_)) => return Err(e.into()),
        Err(e) => {
            warn!("address parse for {} failed: {e}", listing.sale_contract);
            return Ok(PurchaseOutcome::Failed(format!("address parse: {e}")));
        }
    };

    let total_ton = total_with_fee_ton(listing.price_nano);
    match wallet.transfer_ton(&bounceable, total_ton).await {
        Ok(tx_id) => {
            ledger.record(&listing.sale_contract).await?;
            info!(
                "bought {} for {total_ton} TON (nft {}) | tx {tx_id}",
                bounceable, listing.nft_address
            );
            Ok(PurchaseOutcome::Submitted { tx_id, total_ton })
        }
        Err(e) => {
            warn!("purchase of {} failed: {e:#}", listing.sale_contract);
            Ok(PurchaseOutcome::Failed(format!("{e:#}")))
        }
    }
}
