use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use ton_floor_sniper::api::{MarketData, TonApi};
use ton_floor_sniper::config::Config;
use ton_floor_sniper::ledger::Ledger;
use ton_floor_sniper::reporter;
use ton_floor_sniper::transfer::TransferStage;
use ton_floor_sniper::wallet;

/// One-shot sweep: move every custody-held NFT to the destination address,
/// then exit.
#[derive(Parser)]
#[command(name = "transfer_nfts", about = "Sweep custody NFTs to the holding address")]
struct Args {
    /// Run in simulation mode (no transactions submitted)
    #[arg(long, conflicts_with = "live")]
    dry_run: bool,

    /// Run in live mode (submits real transfers)
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

    let market: Arc<dyn MarketData> = Arc::new(TonApi::new(cfg.api_key.clone())?);
    let wallet = wallet::for_mode(&cfg, args.live)?;
    // Simulated sweeps must not mark NFTs as sent in the durable ledger.
    let ledger = if args.live {
        Ledger::open(&cfg.transfer_ledger_path).context("failed to open transfer ledger")?
    } else {
        info!("Dry-run: using in-memory ledger");
        Ledger::ephemeral()
    };

    let stage = TransferStage::new(
        market,
        wallet,
        ledger,
        cfg.custody_address.clone(),
        cfg.destination_address.clone(),
    );

    let summary = stage.sweep().await?;
    info!(
        "Sweep done: {} transferred, {} skipped, {} failed",
        summary.transferred.len(),
        summary.skipped,
        summary.failed,
    );
    reporter::report_sweep(&summary);

    Ok(())
}
