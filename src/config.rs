use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Which floor-price source the poller consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloorSource {
    /// Fixed substitute value (`fixed_floor_ton`). The default.
    Fixed,
    /// GetGems GraphQL collection stats.
    GetGems,
}

/// Process-wide configuration, environment-sourced and immutable after load.
///
/// Loaded once at startup and passed down by reference; no component does
/// ambient env lookups.
#[derive(Debug, Clone)]
pub struct Config {
    /// Gap subtracted from the floor price before computing the ceiling, in TON.
    pub floor_gap: f64,
    /// Target NFT collection address.
    pub collection_id: String,
    /// tonapi.io bearer token.
    pub api_key: String,
    /// Custody wallet mnemonic words.
    pub seed: Vec<String>,
    /// Custody wallet address (issues purchases, temporarily holds NFTs).
    pub custody_address: String,
    /// Final holding address NFTs are swept to.
    pub destination_address: String,
    /// Bounded delay between polling iterations.
    pub poll_interval_secs: u64,
    /// How many recent observer events to fetch per cycle.
    pub event_limit: u32,
    /// Scale factor applied to the gap-adjusted floor when computing the ceiling.
    pub floor_scale: f64,
    /// Substitute floor price in TON used by `FloorSource::Fixed`.
    pub fixed_floor_ton: f64,
    pub floor_source: FloorSource,
    /// Signer sidecar base URL; required for live purchases/transfers.
    pub wallet_url: Option<String>,
    pub purchase_ledger_path: PathBuf,
    pub transfer_ledger_path: PathBuf,
}

impl Config {
    /// Gather config from the environment (after an optional `.env` load).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&|key| env::var(key).ok())
    }

    fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self> {
        let floor_gap = require(lookup, "floor_gap")?
            .parse::<f64>()
            .context("floor_gap must be a decimal number of TON")?;
        let collection_id = require(lookup, "collection_id")?;
        let api_key = require(lookup, "api_key")?;
        let seed: Vec<String> = serde_json::from_str(&require(lookup, "seed")?)
            .context("seed must be a JSON array of mnemonic words")?;
        let custody_address = require(lookup, "address")?;
        let destination_address = require(lookup, "destination_address")?;

        let poll_interval_secs = optional_parsed(lookup, "poll_interval_secs", 5u64)?;
        let event_limit = optional_parsed(lookup, "event_limit", 10u32)?;
        let floor_scale = optional_parsed(lookup, "floor_scale", 10.0f64)?;
        let fixed_floor_ton = optional_parsed(lookup, "fixed_floor_ton", 0.6f64)?;

        let floor_source = match lookup("floor_source").as_deref() {
            None | Some("fixed") => FloorSource::Fixed,
            Some("getgems") => FloorSource::GetGems,
            Some(other) => anyhow::bail!("unknown floor_source {other:?} (fixed|getgems)"),
        };

        let wallet_url = lookup("wallet_url");

        let purchase_ledger_path = lookup("purchase_ledger")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("nft_list.txt"));
        let transfer_ledger_path = lookup("transfer_ledger")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("sent_nfts.txt"));

        Ok(Self {
            floor_gap,
            collection_id,
            api_key,
            seed,
            custody_address,
            destination_address,
            poll_interval_secs,
            event_limit,
            floor_scale,
            fixed_floor_ton,
            floor_source,
            wallet_url,
            purchase_ledger_path,
            transfer_ledger_path,
        })
    }
}

fn require(lookup: &dyn Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    lookup(key).with_context(|| format!("missing required env var {key}"))
}

fn optional_parsed<T: std::str::FromStr>(
    lookup: &dyn Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("invalid value for env var {key}")),
        None => Ok(default),
    }
}
