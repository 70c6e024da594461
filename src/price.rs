use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::{GETGEMS_GRAPHQL_URL, NANOTON};

/// Bounded timeout for oracle queries; a hung oracle must not stall the
/// polling loop.
const ORACLE_TIMEOUT: Duration = Duration::from_secs(15);

/// Floor-price query mirroring the GetGems collection-stats schema.
const FLOOR_QUERY: &str = r#"
query CollectionFloor($address: String!) {
  alphaNftCollectionStats(address: $address) {
    floorPrice
  }
}
"#;

/// Source of the collection floor price, in TON.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn floor_price_ton(&self) -> anyhow::Result<f64>;
}

/// Fixed substitute floor price. The default source: live discovery stays
/// behind this seam until the oracle integration is trusted.
pub struct FixedFloor(pub f64);

#[async_trait]
impl PriceSource for FixedFloor {
    async fn floor_price_ton(&self) -> anyhow::Result<f64> {
        Ok(self.0)
    }
}

/// GetGems GraphQL floor-price oracle.
pub struct GetGemsFloor {
    http: reqwest::Client,
    url: String,
    collection: String,
}

impl GetGemsFloor {
    pub fn new(collection: impl Into<String>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(ORACLE_TIMEOUT).build()?;
        Ok(Self {
            http,
            url: GETGEMS_GRAPHQL_URL.to_string(),
            collection: collection.into(),
        })
    }
}

#[async_trait]
impl PriceSource for GetGemsFloor {
    async fn floor_price_ton(&self) -> anyhow::Result<f64> {
        let body = json!({
            "query": FLOOR_QUERY,
            "variables": { "address": self.collection },
        });
        let resp: serde_json::Value = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let floor = resp["data"]["alphaNftCollectionStats"]["floorPrice"]
            .as_f64()
            .ok_or_else(|| anyhow::anyhow!("floorPrice missing from oracle response"))?;
        debug!("oracle floor price: {floor} TON");
        Ok(floor)
    }
}

/// Purchase price ceiling in nanotons.
///
/// `(floor - gap) * 1e9 * scale`; the scale factor compensates for the
/// reference listing size the operator targets. A negative result means the
/// gap has consumed the whole floor and the poller should stop.
pub fn ceiling_nano(floor_ton: f64, floor_gap: f64, scale: f64) -> i64 {
    ((floor_ton - floor_gap) * NANOTON as f64 * scale) as i64
}
