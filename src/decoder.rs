use tracing::debug;

use crate::OP_SALE_CREATED;
use crate::api::{ApiError, MarketData};
use crate::types::{Action, SaleListing};

/// Decode one event action into a purchase candidate.
///
/// Returns `Ok(None)` for everything that is not a recognizable sale
/// creation: wrong action type, wrong operation code, a sale-data query that
/// reports an error, or missing/malformed price and NFT fields. Only
/// transport-level failures propagate.
pub async fn decode_action<M: MarketData + ?Sized>(
    market: &M,
    action: &Action,
) -> Result<Option<SaleListing>, ApiError> {
    if action.kind.as_deref() != Some("SmartContractExec") {
        return Ok(None);
    }
    let Some(exec) = &action.smart_contract_exec else {
        return Ok(None);
    };
    if exec.operation != OP_SALE_CREATED {
        return Ok(None);
    }

    let sale_contract = exec.contract.address.clone();
    let sale = market.sale_data(&sale_contract).await?;

    if let Some(err) = sale.error {
        debug!("get_sale_data on {sale_contract} failed: {err}");
        return Ok(None);
    }
    let Some(decoded) = sale.decoded else {
        return Ok(None);
    };
    let Some(price_nano) = decoded.full_price.as_deref().and_then(|p| p.parse::<i64>().ok())
    else {
        debug!("unparsable full_price on {sale_contract}");
        return Ok(None);
    };
    let Some(nft_address) = decoded.nft else {
        return Ok(None);
    };

    Ok(Some(SaleListing {
        sale_contract,
        nft_address,
        price_nano,
        operation: exec.operation.clone(),
    }))
}
