//! Shared in-memory fakes for the external collaborators.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::api::{ApiError, MarketData};
use crate::config::{Config, FloorSource};
use crate::types::{
    Account, AccountEvents, AccountRef, Action, AddressForm, CollectionRef, DecodedSale, NftItem,
    NftItems, ParsedAddress, SaleData, SaleListing, SmartContractExec,
};
use crate::wallet::WalletClient;

/// Scriptable `MarketData` implementation backed by in-memory maps.
///
/// Unknown accounts answer 404; unknown sale contracts answer a get-method
/// error, matching how tonapi behaves for non-contract addresses. Address
/// parsing is the identity.
#[derive(Default)]
pub struct MockMarket {
    events: Mutex<AccountEvents>,
    accounts: Mutex<HashMap<String, Account>>,
    sales: Mutex<HashMap<String, SaleData>>,
    collections: Mutex<HashMap<String, String>>,
    held_nfts: Mutex<Vec<String>>,
    events_calls: AtomicUsize,
    account_calls: AtomicUsize,
    sale_data_calls: AtomicUsize,
    bulk_calls: AtomicUsize,
}

impl MockMarket {
    pub fn set_events(&self, events: AccountEvents) {
        *self.events.lock().unwrap() = events;
    }

    pub fn set_account(&self, address: &str, account: Account) {
        self.accounts.lock().unwrap().insert(address.to_string(), account);
    }

    pub fn set_sale_data(&self, address: &str, sale: SaleData) {
        self.sales.lock().unwrap().insert(address.to_string(), sale);
    }

    /// Register a well-formed `get_sale_data` result.
    pub fn set_sale(&self, address: &str, full_price: &str, nft: &str) {
        self.set_sale_data(
            address,
            SaleData {
                error: None,
                decoded: Some(DecodedSale {
                    full_price: Some(full_price.to_string()),
                    nft: Some(nft.to_string()),
                }),
            },
        );
    }

    pub fn set_nft_collection(&self, nft_address: &str, collection: &str) {
        self.collections
            .lock()
            .unwrap()
            .insert(nft_address.to_string(), collection.to_string());
    }

    pub fn set_held_nfts(&self, addresses: &[&str]) {
        *self.held_nfts.lock().unwrap() = addresses.iter().map(|a| a.to_string()).collect();
    }

    pub fn events_calls(&self) -> usize {
        self.events_calls.load(Ordering::Relaxed)
    }

    pub fn account_calls(&self) -> usize {
        self.account_calls.load(Ordering::Relaxed)
    }

    pub fn sale_data_calls(&self) -> usize {
        self.sale_data_calls.load(Ordering::Relaxed)
    }

    pub fn bulk_calls(&self) -> usize {
        self.bulk_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl MarketData for MockMarket {
    async fn account(&self, address: &str) -> Result<Account, ApiError> {
        self.account_calls.fetch_add(1, Ordering::Relaxed);
        self.accounts
            .lock()
            .unwrap()
            .get(address)
            .cloned()
            .ok_or_else(|| ApiError::Status {
                status: StatusCode::NOT_FOUND,
                body: format!("account {address} not found"),
            })
    }

    async fn recent_events(&self, _address: &str, _limit: u32) -> Result<AccountEvents, ApiError> {
        self.events_calls.fetch_add(1, Ordering::Relaxed);
        Ok(self.events.lock().unwrap().clone())
    }

    async fn sale_data(&self, address: &str) -> Result<SaleData, ApiError> {
        self.sale_data_calls.fetch_add(1, Ordering::Relaxed);
        Ok(self
            .sales
            .lock()
            .unwrap()
            .get(address)
            .cloned()
            .unwrap_or_else(|| SaleData {
                error: Some("method get_sale_data not found".into()),
                decoded: None,
            }))
    }

    async fn nfts_bulk(&self, addresses: &[String]) -> Result<NftItems, ApiError> {
        self.bulk_calls.fetch_add(1, Ordering::Relaxed);
        let collections = self.collections.lock().unwrap();
        let nft_items = addresses
            .iter()
            .filter_map(|addr| {
                collections.get(addr).map(|collection| NftItem {
                    address: addr.clone(),
                    collection: Some(CollectionRef {
                        address: collection.clone(),
                    }),
                })
            })
            .collect();
        Ok(NftItems { nft_items })
    }

    async fn account_nfts(&self, _address: &str) -> Result<NftItems, ApiError> {
        let nft_items = self
            .held_nfts
            .lock()
            .unwrap()
            .iter()
            .map(|addr| NftItem {
                address: addr.clone(),
                collection: None,
            })
            .collect();
        Ok(NftItems { nft_items })
    }

    async fn parse_address(&self, address: &str) -> Result<ParsedAddress, ApiError> {
        Ok(ParsedAddress {
            bounceable: AddressForm {
                b64url: address.to_string(),
            },
        })
    }
}

/// Recording wallet fake; optionally fails every call.
#[derive(Default)]
pub struct MockWallet {
    fail: bool,
    ton: Mutex<Vec<(String, f64)>>,
    nft: Mutex<Vec<(String, String)>>,
}

impl MockWallet {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn ton_transfers(&self) -> Vec<(String, f64)> {
        self.ton.lock().unwrap().clone()
    }

    pub fn nft_transfers(&self) -> Vec<(String, String)> {
        self.nft.lock().unwrap().clone()
    }
}

#[async_trait]
impl WalletClient for MockWallet {
    async fn transfer_ton(&self, to: &str, amount_ton: f64) -> anyhow::Result<String> {
        if self.fail {
            anyhow::bail!("seqno fetch failed");
        }
        self.ton.lock().unwrap().push((to.to_string(), amount_ton));
        Ok(format!("mock-ton-{}", self.ton.lock().unwrap().len()))
    }

    async fn transfer_nft(&self, to: &str, nft_address: &str) -> anyhow::Result<String> {
        if self.fail {
            anyhow::bail!("seqno fetch failed");
        }
        self.nft
            .lock()
            .unwrap()
            .push((to.to_string(), nft_address.to_string()));
        Ok(format!("mock-nft-{}", self.nft.lock().unwrap().len()))
    }
}

pub fn plain_action(kind: &str) -> Action {
    Action {
        kind: Some(kind.to_string()),
        smart_contract_exec: None,
    }
}

pub fn exec_action(contract: &str, operation: &str) -> Action {
    Action {
        kind: Some("SmartContractExec".to_string()),
        smart_contract_exec: Some(SmartContractExec {
            contract: AccountRef {
                address: contract.to_string(),
            },
            operation: operation.to_string(),
        }),
    }
}

pub fn listing(sale_contract: &str, nft_address: &str, price_nano: i64) -> SaleListing {
    SaleListing {
        sale_contract: sale_contract.to_string(),
        nft_address: nft_address.to_string(),
        price_nano,
        operation: crate::OP_SALE_CREATED.to_string(),
    }
}

pub fn sale_account(address: &str) -> Account {
    Account {
        address: address.to_string(),
        interfaces: Some(vec![crate::SALE_INTERFACE.to_string()]),
    }
}

pub fn test_config() -> Config {
    Config {
        floor_gap: 0.1,
        collection_id: "EQCOLLECTION".to_string(),
        api_key: "test-key".to_string(),
        seed: vec!["abandon".to_string(); 24],
        custody_address: "EQCUSTODY".to_string(),
        destination_address: "EQDEST".to_string(),
        poll_interval_secs: 1,
        event_limit: 10,
        floor_scale: 10.0,
        fixed_floor_ton: 0.6,
        floor_source: FloorSource::Fixed,
        wallet_url: None,
        purchase_ledger_path: "bought.txt".into(),
        transfer_ledger_path: "sent.txt".into(),
    }
}
