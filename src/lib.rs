pub mod api;
pub mod config;
pub mod decoder;
pub mod executor;
pub mod filter;
pub mod ledger;
pub mod poller;
pub mod price;
pub mod reporter;
pub mod transfer;
pub mod types;
pub mod wallet;

#[cfg(test)]
pub mod testutil;

/// tonapi.io v2 REST base URL (bearer token required)
pub const TONAPI_BASE: &str = "https://tonapi.io/v2";

/// GetGems GraphQL endpoint (floor-price oracle, public)
pub const GETGEMS_GRAPHQL_URL: &str = "https://api.getgems.io/graphql";

/// Marketplace observer account whose event feed carries sale-contract deploys
pub const MARKETPLACE_OBSERVER: &str = "EQAIFunALREOeQ99syMbO6sSzM_Fa1RsPD5TBoS0qVeKQ-AR";

/// Operation code emitted when a sale contract is (probably) created
pub const OP_SALE_CREATED: &str = "0x00000001";

/// Account interface marker identifying a v2 sale contract
pub const SALE_INTERFACE: &str = "nft_sale_v2";

/// Nanotons per TON
pub const NANOTON: i64 = 1_000_000_000;
