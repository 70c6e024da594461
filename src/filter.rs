use crate::api::{ApiError, MarketData};
use crate::types::SaleListing;

/// Price rule: present, positive, and at or under the ceiling.
pub fn price_eligible(price_nano: i64, ceiling_nano: i64) -> bool {
    price_nano > 0 && price_nano <= ceiling_nano
}

/// TON addresses compare case-insensitively in friendly notation.
pub fn same_collection(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Full eligibility check for a decoded listing.
///
/// The collection membership lookup goes through bulk NFT metadata; a
/// missing item or collection field means not eligible, never an error.
pub async fn is_eligible<M: MarketData + ?Sized>(
    market: &M,
    listing: &SaleListing,
    ceiling_nano: i64,
    collection_id: &str,
) -> Result<bool, ApiError> {
    if !price_eligible(listing.price_nano, ceiling_nano) {
        return Ok(false);
    }

    let items = market.nfts_bulk(&[listing.nft_address.clone()]).await?;
    let Some(item) = items.nft_items.first() else {
        return Ok(false);
    };
    let Some(collection) = &item.collection else {
        return Ok(false);
    };
    Ok(same_collection(&collection.address, collection_id))
}
