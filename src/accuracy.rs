use std::time::Duration;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::{AccuracyConfig, Config};
use crate::reference::{ReferencePrice, ReferencePriceSource};
use crate::score::deviation_score;
use crate::verify::types::ResponseBody;

/// How a price cross-check ended. Only `Compared` is a real measurement;
/// the rest map to configured baseline heuristics.
#[derive(Debug, Clone, PartialEq)]
pub enum AccuracyCheck {
    Compared { avg_deviation: f64, matched: usize },
    /// The reference lookup failed, timed out or came back empty
    ReferenceUnavailable,
    /// No usable price list in the endpoint's body
    NoPriceData,
    /// Both sides had prices but no asset lined up
    NoMatches,
}

impl AccuracyCheck {
    pub fn score(&self, fallbacks: &AccuracyConfig) -> f64 {
        match self {
            AccuracyCheck::Compared { avg_deviation, .. } => deviation_score(*avg_deviation),
            AccuracyCheck::ReferenceUnavailable => fallbacks.reference_unavailable,
            AccuracyCheck::NoPriceData => fallbacks.no_price_data,
            AccuracyCheck::NoMatches => fallbacks.no_matches,
        }
    }
}

/// Cross-validate the endpoint's reported prices against the reference source.
///
/// Never fails: reference errors and shape mismatches degrade to a
/// heuristic result instead of propagating. The whole reference lookup runs
/// under one `reference.timeout_ms` deadline, however many provider calls
/// the source makes behind it.
pub async fn cross_validate(
    source: &dyn ReferencePriceSource,
    body: Option<&ResponseBody>,
    payload: &Map<String, Value>,
    config: &Config,
) -> AccuracyCheck {
    let comparison = &config.comparison;
    let symbols = payload_symbols(payload).unwrap_or_else(|| comparison.default_symbols.clone());
    let quote = payload_quote(payload).unwrap_or_else(|| comparison.default_quote.clone());

    let deadline = Duration::from_millis(config.reference.timeout_ms);
    let reference = match tokio::time::timeout(deadline, source.fetch_reference_prices(&symbols, &quote)).await {
        Ok(Ok(prices)) if !prices.is_empty() => prices,
        Ok(Ok(_)) => {
            warn!("Reference source returned no prices, accuracy falls back");
            return AccuracyCheck::ReferenceUnavailable;
        }
        Ok(Err(e)) => {
            warn!("Reference prices unavailable, accuracy falls back: {}", e);
            return AccuracyCheck::ReferenceUnavailable;
        }
        Err(_) => {
            warn!(
                "Reference lookup exceeded {}ms, accuracy falls back",
                config.reference.timeout_ms
            );
            return AccuracyCheck::ReferenceUnavailable;
        }
    };

    let Some(reported) = body.and_then(ResponseBody::as_json).and_then(extract_price_list) else {
        debug!("Endpoint body carries no price list");
        return AccuracyCheck::NoPriceData;
    };
    if reported.is_empty() {
        debug!("Endpoint price list is empty");
        return AccuracyCheck::NoPriceData;
    }

    match average_deviation(reported, &reference) {
        Some((avg_deviation, matched)) => {
            debug!("Matched {} assets, average deviation {:.4}", matched, avg_deviation);
            AccuracyCheck::Compared { avg_deviation, matched }
        }
        None => AccuracyCheck::NoMatches,
    }
}

/// Bare array, or `{ "data": [...] }`
pub fn extract_price_list(body: &Value) -> Option<&[Value]> {
    match body {
        Value::Array(items) => Some(items.as_slice()),
        Value::Object(obj) => obj.get("data").and_then(Value::as_array).map(Vec::as_slice),
        _ => None,
    }
}

/// Mean relative deviation over matched assets, with the match count.
/// `None` when nothing matched.
pub fn average_deviation(reported: &[Value], reference: &[ReferencePrice]) -> Option<(f64, usize)> {
    let mut total = 0.0;
    let mut matched = 0usize;

    for entry in reported {
        let keys = entry_keys(entry);
        if keys.is_empty() {
            continue;
        }
        let Some(reported_price) = entry.get("price").and_then(positive_number) else {
            continue;
        };
        let found = reference.iter().find(|r| {
            r.price > 0.0
                && keys
                    .iter()
                    .any(|k| r.symbol.to_lowercase() == *k || r.name.to_lowercase() == *k)
        });
        if let Some(r) = found {
            total += (reported_price - r.price).abs() / r.price;
            matched += 1;
        }
    }

    (matched > 0).then(|| (total / matched as f64, matched))
}

fn entry_keys(entry: &Value) -> Vec<String> {
    ["symbol", "name"]
        .iter()
        .filter_map(|field| entry.get(*field).and_then(Value::as_str))
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn positive_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    (n.is_finite() && n > 0.0).then_some(n)
}

fn payload_symbols(payload: &Map<String, Value>) -> Option<Vec<String>> {
    let symbols: Vec<String> = payload
        .get("symbols")?
        .as_array()?
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect();
    (!symbols.is_empty()).then_some(symbols)
}

fn payload_quote(payload: &Map<String, Value>) -> Option<String> {
    ["vsCurrency", "vs_currency", "quoteCurrency"]
        .iter()
        .find_map(|key| payload.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}
