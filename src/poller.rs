use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crate::api::{ApiError, MarketData};
use crate::config::Config;
use crate::ledger::Ledger;
use crate::price::{PriceSource, ceiling_nano};
use crate::transfer::TransferStage;
use crate::wallet::WalletClient;
use crate::{MARKETPLACE_OBSERVER, decoder, executor, filter, reporter};

/// What one polling iteration amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The computed ceiling went negative; the loop must exit cleanly.
    FloorExhausted,
    /// The event batch was processed.
    Processed { candidates: usize, purchased: usize },
}

/// An error is fatal to the loop only when the API credential is rejected;
/// everything else is retried on the next cycle.
pub fn is_fatal(err: &anyhow::Error) -> bool {
    matches!(err.downcast_ref::<ApiError>(), Some(ApiError::Unauthorized(_)))
}

/// One polling iteration: ceiling, events, decode, filter, purchase, and a
/// fire-and-forget transfer sweep when the custody wallet holds anything.
///
/// Per-item failures are contained to the item; only credential rejection
/// propagates past the caller's warn-and-continue handling.
pub async fn poll_cycle<W, P>(
    market: &Arc<dyn MarketData>,
    wallet: &W,
    price: &P,
    purchase_ledger: &Ledger,
    transfer: &Arc<TransferStage>,
    cfg: &Config,
) -> Result<CycleOutcome>
where
    W: WalletClient + ?Sized,
    P: PriceSource + ?Sized,
{
    let floor_ton = price.floor_price_ton().await?;
    let ceiling = ceiling_nano(floor_ton, cfg.floor_gap, cfg.floor_scale);
    if ceiling < 0 {
        info!("ceiling negative (floor {floor_ton} TON, gap {}), stopping", cfg.floor_gap);
        return Ok(CycleOutcome::FloorExhausted);
    }

    let batch = market
        .recent_events(MARKETPLACE_OBSERVER, cfg.event_limit)
        .await?;

    let mut candidates = 0usize;
    let mut purchased = 0usize;

    for event in &batch.events {
        for action in &event.actions {
            let listing = match decoder::decode_action(market.as_ref(), action).await {
                Ok(Some(listing)) => listing,
                Ok(None) => continue,
                Err(e @ ApiError::Unauthorized(_)) => return Err(e.into()),
                Err(e) => {
                    warn!("decode failed in event {}: {e}", event.event_id);
                    continue;
                }
            };
            candidates += 1;

            let eligible = match filter::is_eligible(
                market.as_ref(),
                &listing,
                ceiling,
                &cfg.collection_id,
            )
            .await
            {
                Ok(eligible) => eligible,
                Err(e @ ApiError::Unauthorized(_)) => return Err(e.into()),
                Err(e) => {
                    warn!("eligibility check for {} failed: {e}", listing.sale_contract);
                    continue;
                }
            };
            if !eligible {
                continue;
            }

            match executor::execute_purchase(market.as_ref(), wallet, purchase_ledger, &listing)
                .await
            {
                Ok(executor::PurchaseOutcome::Submitted { tx_id, total_ton }) => {
                    reporter::report_purchase(&listing, &tx_id, total_ton);
                    purchased += 1;
                }
                Ok(_) => {}
                Err(e) if is_fatal(&e) => return Err(e),
                Err(e) => warn!("purchase of {} errored: {e:#}", listing.sale_contract),
            }
        }
    }

    trigger_sweep_if_holding(market, transfer, cfg).await;

    Ok(CycleOutcome::Processed { candidates, purchased })
}

/// Spawn a transfer sweep when the custody wallet currently holds NFTs.
/// Fire-and-forget: the sweep carries its own lock and ledger guarantees.
async fn trigger_sweep_if_holding(
    market: &Arc<dyn MarketData>,
    transfer: &Arc<TransferStage>,
    cfg: &Config,
) {
    let held = match market.account_nfts(&cfg.custody_address).await {
        Ok(held) => held,
        Err(e) => {
            warn!("custody NFT check failed: {e}");
            return;
        }
    };
    if held.nft_items.is_empty() {
        return;
    }

    info!("custody wallet holds {} NFT(s), sweeping", held.nft_items.len());
    let stage = Arc::clone(transfer);
    tokio::spawn(async move {
        match stage.sweep().await {
            Ok(summary) => {
                if !summary.transferred.is_empty() || summary.failed > 0 {
                    reporter::report_sweep(&summary);
                }
            }
            Err(e) => warn!("transfer sweep failed: {e:#}"),
        }
    });
}
