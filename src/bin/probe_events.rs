use anyhow::Result;
use tracing::info;

use ton_floor_sniper::MARKETPLACE_OBSERVER;
use ton_floor_sniper::api::{MarketData, TonApi};
use ton_floor_sniper::config::Config;
use ton_floor_sniper::decoder;

/// Fetch one batch of observer events and print the decoded sale candidates
/// as JSON lines, without filtering or purchasing anything.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    dotenvy::dotenv().ok();
    let cfg = Config::from_env()?;
    let api = TonApi::new(cfg.api_key.clone())?;

    let batch = api.recent_events(MARKETPLACE_OBSERVER, cfg.event_limit).await?;
    info!("Fetched {} event(s)", batch.events.len());

    let mut candidates = 0usize;
    for event in &batch.events {
        for action in &event.actions {
            if let Some(listing) = decoder::decode_action(&api, action).await? {
                println!("{}", serde_json::to_string(&listing)?);
                candidates += 1;
            }
        }
    }
    info!("{candidates} sale candidate(s) decoded");

    Ok(())
}
