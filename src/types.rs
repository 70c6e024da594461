use serde::{Deserialize, Serialize};

/// A decoded, not-yet-acted-upon sale opportunity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaleListing {
    /// Address of the sale contract holding the listing.
    pub sale_contract: String,
    /// Address of the NFT item being sold.
    pub nft_address: String,
    /// Full asking price in nanotons. Actionable only when positive.
    pub price_nano: i64,
    /// Marketplace operation code that produced this candidate.
    pub operation: String,
}

/// Response of `accounts/{addr}/events`.
///
/// A missing `events` field decodes to an empty batch; the poller treats
/// that as a transient/empty read, not an error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountEvents {
    #[serde(default)]
    pub events: Vec<AccountEvent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountEvent {
    #[serde(default)]
    pub event_id: String,
    #[serde(default)]
    pub actions: Vec<Action>,
}

/// One action inside an event envelope. Only `SmartContractExec` actions
/// carry a payload we care about; everything else is skipped.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Action {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(rename = "SmartContractExec", default)]
    pub smart_contract_exec: Option<SmartContractExec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmartContractExec {
    pub contract: AccountRef,
    #[serde(default)]
    pub operation: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountRef {
    pub address: String,
}

/// Result of the `get_sale_data` get-method call on a sale contract.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaleData {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub decoded: Option<DecodedSale>,
}

/// Decoded sale parameters. tonapi returns `full_price` as a decimal string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DecodedSale {
    #[serde(default)]
    pub full_price: Option<String>,
    #[serde(default)]
    pub nft: Option<String>,
}

/// Account state from `accounts/{addr}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Account {
    #[serde(default)]
    pub address: String,
    /// Capability markers; a sale contract declares `nft_sale_v2` here.
    #[serde(default)]
    pub interfaces: Option<Vec<String>>,
}

/// NFT item list, shared by `nfts/_bulk` and `accounts/{addr}/nfts`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NftItems {
    #[serde(default)]
    pub nft_items: Vec<NftItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NftItem {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub collection: Option<CollectionRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollectionRef {
    #[serde(default)]
    pub address: String,
}

/// Canonical address forms from `address/{addr}/parse`.
#[derive(Debug, Clone, Deserialize)]
pub struct ParsedAddress {
    pub bounceable: AddressForm,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddressForm {
    pub b64url: String,
}
