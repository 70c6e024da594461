use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use ton_floor_sniper::api::{MarketData, TonApi};
use ton_floor_sniper::config::{Config, FloorSource};
use ton_floor_sniper::ledger::Ledger;
use ton_floor_sniper::poller::{self, CycleOutcome};
use ton_floor_sniper::price::{FixedFloor, GetGemsFloor, PriceSource};
use ton_floor_sniper::transfer::TransferStage;
use ton_floor_sniper::wallet;

#[derive(Parser)]
#[command(name = "sniper", about = "TON NFT below-floor listing sniper")]
struct Args {
    /// Run in simulation mode (no transactions submitted)
    #[arg(long, conflicts_with = "live")]
    dry_run: bool,

    /// Run in live mode (submits real purchases and transfers)
    #[arg(long, conflicts_with = "dry_run")]
    live: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if !args.dry_run && !args.live {
        anyhow::bail!("Must specify either --dry-run or --live");
    }

    dotenvy::dotenv().ok();
    let cfg = Config::from_env()?;

    let mode = if args.live { "live" } else { "dry-run" };
    info!(
        "Starting sniper ({mode}) — collection={} gap={} scale={} poll={}s",
        cfg.collection_id, cfg.floor_gap, cfg.floor_scale, cfg.poll_interval_secs,
    );

    let market: Arc<dyn MarketData> = Arc::new(TonApi::new(cfg.api_key.clone())?);
    let wallet = wallet::for_mode(&cfg, args.live)?;

    let price: Box<dyn PriceSource> = match cfg.floor_source {
        FloorSource::Fixed => Box::new(FixedFloor(cfg.fixed_floor_ton)),
        FloorSource::GetGems => Box::new(GetGemsFloor::new(cfg.collection_id.clone())?),
    };

    // Dry-run submissions are fabricated; keeping them out of the durable
    // ledgers means a later live run still acts on those listings.
    let (purchase_ledger, transfer_ledger) = if args.live {
        (
            Ledger::open(&cfg.purchase_ledger_path).context("failed to open purchase ledger")?,
            Ledger::open(&cfg.transfer_ledger_path).context("failed to open transfer ledger")?,
        )
    } else {
        info!("Dry-run: using in-memory ledgers");
        (Ledger::ephemeral(), Ledger::ephemeral())
    };
    info!(
        "Ledgers: {} purchased, {} transferred",
        purchase_ledger.len().await,
        transfer_ledger.len().await,
    );

    let transfer = Arc::new(TransferStage::new(
        Arc::clone(&market),
        Arc::clone(&wallet),
        transfer_ledger,
        cfg.custody_address.clone(),
        cfg.destination_address.clone(),
    ));

    info!(
        "Entering polling loop (interval: {}s). Press Ctrl+C to stop.",
        cfg.poll_interval_secs
    );
    let poll_duration = Duration::from_secs(cfg.poll_interval_secs);

    loop {
        match poller::poll_cycle(
            &market,
            wallet.as_ref(),
            price.as_ref(),
            &purchase_ledger,
            &transfer,
            &cfg,
        )
        .await
        {
            Ok(CycleOutcome::FloorExhausted) => {
                info!("Price ceiling exhausted, exiting");
                break;
            }
            Ok(CycleOutcome::Processed { candidates, purchased }) => {
                if candidates > 0 {
                    info!("Cycle done: {candidates} candidate(s), {purchased} purchased");
                }
            }
            Err(e) if poller::is_fatal(&e) => {
                return Err(e.context("indexing API rejected credentials"));
            }
            Err(e) => {
                warn!("Poll cycle error: {e:#}");
            }
        }

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
            _ = tokio::time::sleep(poll_duration) => {}
        }
    }

    Ok(())
}
