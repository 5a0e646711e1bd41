//! CoinGecko market data client

use crate::{
    config::DashboardConfig,
    constants::{COINGECKO_MARKETS_ENDPOINT, COINGECKO_MARKET_CHART_ENDPOINT},
    error::ProviderError,
    provider::MarketDataClient,
    types::{CurrencyCode, PricePoint, SnapshotEntry},
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

/// One row of the `/coins/markets` response
///
/// Numeric fields are optional on the wire because CoinGecko sends `null` for
/// coins without recent trades; such rows are rejected as malformed.
#[derive(Debug, Deserialize)]
struct CoinGeckoMarket {
    id: String,
    name: String,
    current_price: Option<f64>,
    price_change_percentage_24h: Option<f64>,
}

/// `/coins/{id}/market_chart` response
#[derive(Debug, Deserialize)]
struct CoinGeckoMarketChart {
    prices: Vec<(f64, f64)>,
}

/// CoinGecko market data client
pub struct CoinGeckoClient {
    client: Client,
    base_url: String,
}

impl CoinGeckoClient {
    /// Creates a new CoinGecko client from the dashboard configuration
    pub fn new(config: &DashboardConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(ProviderError::Network)?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn markets_url(&self) -> String {
        format!("{}{}", self.base_url, COINGECKO_MARKETS_ENDPOINT)
    }

    fn market_chart_url(&self, asset_id: &str) -> String {
        format!(
            "{}{}",
            self.base_url,
            COINGECKO_MARKET_CHART_ENDPOINT.replace("{id}", asset_id)
        )
    }

    /// Sends a GET request and returns the body of a successful response
    async fn get_text(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<String, ProviderError> {
        tracing::debug!(url, ?query, "Requesting CoinGecko");

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(ProviderError::Network)?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(ProviderError::RateLimitExceeded);
        }

        if !status.is_success() {
            return Err(ProviderError::api(
                status.as_u16(),
                response.text().await.unwrap_or_default(),
            ));
        }

        response.text().await.map_err(ProviderError::Network)
    }
}

/// Parses a `/coins/markets` body into snapshot rows ordered like `asset_ids`
fn parse_markets(body: &str, asset_ids: &[String]) -> Result<Vec<SnapshotEntry>, ProviderError> {
    let markets: Vec<CoinGeckoMarket> = serde_json::from_str(body).map_err(|e| {
        ProviderError::malformed(format!("Failed to parse CoinGecko markets response: {}", e))
    })?;

    let mut entries = Vec::with_capacity(markets.len());
    for id in asset_ids {
        let Some(market) = markets.iter().find(|m| &m.id == id) else {
            tracing::debug!(asset_id = %id, "Asset missing from CoinGecko markets response");
            continue;
        };

        let current_price = market.current_price.ok_or_else(|| {
            ProviderError::malformed(format!("current_price missing for {}", market.id))
        })?;
        let change_24h_percent = market.price_change_percentage_24h.ok_or_else(|| {
            ProviderError::malformed(format!(
                "price_change_percentage_24h missing for {}",
                market.id
            ))
        })?;

        entries.push(SnapshotEntry {
            asset_id: market.id.clone(),
            name: market.name.clone(),
            current_price,
            change_24h_percent,
        });
    }

    Ok(entries)
}

/// Parses a `/coins/{id}/market_chart` body into price points
fn parse_market_chart(body: &str) -> Result<Vec<PricePoint>, ProviderError> {
    let chart: CoinGeckoMarketChart = serde_json::from_str(body).map_err(|e| {
        ProviderError::malformed(format!(
            "Failed to parse CoinGecko market_chart response: {}",
            e
        ))
    })?;

    Ok(chart
        .prices
        .into_iter()
        .map(|(timestamp, price)| PricePoint::new(timestamp as i64, price))
        .collect())
}

#[async_trait]
impl MarketDataClient for CoinGeckoClient {
    async fn fetch_snapshot(
        &self,
        asset_ids: &[String],
        currency: CurrencyCode,
    ) -> Result<Vec<SnapshotEntry>, ProviderError> {
        if asset_ids.is_empty() {
            return Ok(Vec::new());
        }

        let query = [
            ("vs_currency", currency.api_code().to_string()),
            ("ids", asset_ids.join(",")),
        ];
        let body = self.get_text(&self.markets_url(), &query).await?;
        let entries = parse_markets(&body, asset_ids)?;

        tracing::debug!(
            count = entries.len(),
            currency = currency.code(),
            "Fetched snapshot from CoinGecko"
        );

        Ok(entries)
    }

    async fn fetch_history(
        &self,
        asset_id: &str,
        currency: CurrencyCode,
        days: u32,
    ) -> Result<Vec<PricePoint>, ProviderError> {
        if days == 0 {
            return Err(ProviderError::InvalidRequest(
                "history window must be at least one day".to_string(),
            ));
        }

        let query = [
            ("vs_currency", currency.api_code().to_string()),
            ("days", days.to_string()),
        ];
        let body = self
            .get_text(&self.market_chart_url(asset_id), &query)
            .await?;
        let points = parse_market_chart(&body)?;

        tracing::debug!(
            asset_id,
            count = points.len(),
            currency = currency.code(),
            "Fetched price history from CoinGecko"
        );

        Ok(points)
    }

    fn provider_name(&self) -> &'static str {
        "coingecko"
    }
}
