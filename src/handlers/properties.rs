use axum::extract::State;
use axum::response::Json;

use crate::error::AppResult;
use crate::ledger::LedgerReader;
use crate::models::PropertyValuation;
use crate::state::AppState;

/// Every property with its appreciation since acquisition, rounded for
/// display. Properties without a price or value have no appreciation.
pub async fn valuations(State(state): State<AppState>) -> AppResult<Json<Vec<PropertyValuation>>> {
    let ledger = state.ledger().read_ledger()?;
    let dp = state.config.display_decimals;

    let valuations = ledger
        .properties()
        .iter()
        .map(|p| {
            let mut valuation = PropertyValuation::from(p);
            valuation.appreciation = valuation.appreciation.map(|a| a.rounded(dp));
            valuation
        })
        .collect();

    Ok(Json(valuations))
}
