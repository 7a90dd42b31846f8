use crate::config::MarketConfig;
use crate::error::AppError;
use serde_json::Value;

/// Top coins by market cap from the upstream markets endpoint, passed
/// through as returned.
pub async fn get_market_prices(
    client: &reqwest::Client,
    config: &MarketConfig,
) -> Result<Vec<Value>, AppError> {
    let prices = client
        .get(&config.url)
        .query(&[
            ("vs_currency", config.vs_currency.clone()),
            ("order", "market_cap_desc".to_string()),
            ("per_page", config.per_page.to_string()),
        ])
        .send()
        .await?
        .error_for_status()?
        .json::<Vec<Value>>()
        .await?;

    log::debug!("Fetched {} market entries", prices.len());
    Ok(prices)
}
