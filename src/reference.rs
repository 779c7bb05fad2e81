use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ReferenceConfig;
use crate::error::{TrustError, TrustResult};
use crate::http::{HttpReply, HttpTransport};

/// One reference quote
#[derive(Debug, Clone, PartialEq)]
pub struct ReferencePrice {
    /// Upper-cased request symbol (e.g. "BITCOIN")
    pub symbol: String,
    /// Provider display name, or the symbol as requested
    pub name: String,
    pub price: f64,
}

/// Source of trusted prices used to cross-check an endpoint's numbers.
///
/// An empty `Ok` and an `Err` are both soft failures to the accuracy check.
#[async_trait]
pub trait ReferencePriceSource: Send + Sync {
    async fn fetch_reference_prices(
        &self,
        symbols: &[String],
        quote_currency: &str,
    ) -> TrustResult<Vec<ReferencePrice>>;
}

/// Free public price APIs: CoinGecko `simple/price` first, CoinCap
/// `assets/{id}` per symbol when the primary yields nothing.
pub struct PublicPriceSource {
    transport: Arc<dyn HttpTransport>,
    config: ReferenceConfig,
}

impl PublicPriceSource {
    pub fn new(transport: Arc<dyn HttpTransport>, config: &ReferenceConfig) -> Self {
        Self {
            transport,
            config: config.clone(),
        }
    }

    async fn get_json(&self, url: &str) -> TrustResult<Value> {
        let timeout = Duration::from_millis(self.config.timeout_ms);
        let reply = tokio::time::timeout(timeout, self.transport.get(url))
            .await
            .map_err(|_| TrustError::Reference(format!("timed out after {}ms: {}", self.config.timeout_ms, url)))??;

        let HttpReply { status, body } = reply;
        if !(200..300).contains(&status) {
            return Err(TrustError::Reference(format!("HTTP {} from {}", status, url)));
        }
        let body = body.ok_or_else(|| TrustError::Reference(format!("unreadable body from {}", url)))?;
        serde_json::from_str(&body)
            .map_err(|e| TrustError::Reference(format!("invalid JSON from {}: {}", url, e)))
    }

    async fn fetch_primary(&self, symbols: &[String], quote: &str) -> TrustResult<Vec<ReferencePrice>> {
        let ids = symbols
            .iter()
            .map(|s| s.to_lowercase())
            .collect::<Vec<_>>()
            .join(",");
        let url = url::Url::parse_with_params(
            &format!("{}/simple/price", self.config.primary_url.trim_end_matches('/')),
            &[("ids", ids.as_str()), ("vs_currencies", quote)],
        )
        .map_err(|e| TrustError::Reference(format!("bad primary URL: {}", e)))?;

        let data = self.get_json(url.as_str()).await?;

        let mut prices = Vec::new();
        for symbol in symbols {
            let price = data
                .get(symbol.to_lowercase())
                .and_then(|entry| entry.get(quote))
                .and_then(Value::as_f64);
            if let Some(price) = price {
                prices.push(ReferencePrice {
                    symbol: symbol.to_uppercase(),
                    name: symbol.clone(),
                    price,
                });
            }
        }
        Ok(prices)
    }

    /// CoinCap only quotes USD
    async fn fetch_fallback(&self, symbols: &[String]) -> Vec<ReferencePrice> {
        let base = self.config.fallback_url.trim_end_matches('/');
        let mut prices = Vec::new();

        for symbol in symbols {
            let url = format!("{}/assets/{}", base, symbol.to_lowercase());
            let data = match self.get_json(&url).await {
                Ok(data) => data,
                Err(e) => {
                    warn!("Fallback price fetch failed for {}: {}", symbol, e);
                    continue;
                }
            };

            let Some(asset) = data.get("data").filter(|d| d.is_object()) else {
                continue;
            };
            let price = asset
                .get("priceUsd")
                .and_then(|p| p.as_str().and_then(|s| s.parse::<f64>().ok()).or_else(|| p.as_f64()));
            if let Some(price) = price {
                prices.push(ReferencePrice {
                    symbol: symbol.to_uppercase(),
                    name: asset
                        .get("name")
                        .and_then(Value::as_str)
                        .unwrap_or(symbol.as_str())
                        .to_string(),
                    price,
                });
            }
        }
        prices
    }
}

#[async_trait]
impl ReferencePriceSource for PublicPriceSource {
    async fn fetch_reference_prices(
        &self,
        symbols: &[String],
        quote_currency: &str,
    ) -> TrustResult<Vec<ReferencePrice>> {
        if symbols.is_empty() {
            return Ok(Vec::new());
        }
        let quote = quote_currency.to_lowercase();

        let primary = self.fetch_primary(symbols, &quote).await;
        let primary_err = match primary {
            Ok(prices) if !prices.is_empty() => {
                debug!("Reference prices from primary: {} of {}", prices.len(), symbols.len());
                return Ok(prices);
            }
            Ok(_) => None,
            Err(e) => {
                warn!("Primary reference source failed: {}", e);
                Some(e)
            }
        };

        if quote != "usd" {
            debug!("No fallback for quote currency {}", quote);
            return match primary_err {
                Some(e) => Err(e),
                None => Ok(Vec::new()),
            };
        }

        let prices = self.fetch_fallback(symbols).await;
        debug!("Reference prices from fallback: {} of {}", prices.len(), symbols.len());
        match primary_err {
            Some(e) if prices.is_empty() => Err(e),
            _ => Ok(prices),
        }
    }
}
