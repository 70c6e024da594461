use serde::Serialize;

use crate::transfer::SweepSummary;
use crate::types::SaleListing;

/// A submitted purchase, for operator visibility.
#[derive(Debug, Serialize)]
pub struct PurchaseReport<'a> {
    pub timestamp: String,
    pub kind: &'static str,
    pub sale_contract: &'a str,
    pub nft_address: &'a str,
    pub price_nano: i64,
    pub total_ton: f64,
    pub tx_id: &'a str,
}

impl<'a> PurchaseReport<'a> {
    pub fn new(listing: &'a SaleListing, tx_id: &'a str, total_ton: f64) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            kind: "purchase",
            sale_contract: &listing.sale_contract,
            nft_address: &listing.nft_address,
            price_nano: listing.price_nano,
            total_ton,
            tx_id,
        }
    }
}

/// A completed transfer sweep.
#[derive(Debug, Serialize)]
pub struct SweepReport<'a> {
    pub timestamp: String,
    pub kind: &'static str,
    #[serde(flatten)]
    pub summary: &'a SweepSummary,
}

impl<'a> SweepReport<'a> {
    pub fn new(summary: &'a SweepSummary) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            kind: "sweep",
            summary,
        }
    }
}

/// Emit a purchase report as a single JSON line to stdout.
pub fn report_purchase(listing: &SaleListing, tx_id: &str, total_ton: f64) {
    if let Ok(json) = serde_json::to_string(&PurchaseReport::new(listing, tx_id, total_ton)) {
        println!("{json}");
    }
}

/// Emit a sweep report as a single JSON line to stdout.
pub fn report_sweep(summary: &SweepSummary) {
    if let Ok(json) = serde_json::to_string(&SweepReport::new(summary)) {
        println!("{json}");
    }
}
