use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub probe: ProbeConfig,
    #[serde(default)]
    pub reference: ReferenceConfig,
    #[serde(default)]
    pub comparison: ComparisonConfig,
    #[serde(default)]
    pub accuracy: AccuracyConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProbeConfig {
    /// Hard bound on the single probe request
    #[serde(default = "default_probe_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReferenceConfig {
    /// CoinGecko-compatible API root (`/simple/price`)
    #[serde(default = "default_primary_url")]
    pub primary_url: String,
    /// CoinCap-compatible API root (`/assets/{id}`), used when the primary has nothing
    #[serde(default = "default_fallback_url")]
    pub fallback_url: String,
    /// Bound on each provider call
    #[serde(default = "default_reference_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ComparisonConfig {
    /// Endpoint types whose output is cross-validated against reference prices
    #[serde(default = "default_price_types")]
    pub price_types: Vec<String>,
    /// Identifiers a caller may list in `comparison_sources` to opt in
    #[serde(default = "default_source_ids")]
    pub source_ids: Vec<String>,
    /// Symbols used when the test payload carries none
    #[serde(default = "default_symbols")]
    pub default_symbols: Vec<String>,
    #[serde(default = "default_quote")]
    pub default_quote: String,
}

/// Baseline heuristics for the accuracy score. None of these has a derivation
/// beyond "partial confidence"; tune freely.
#[derive(Debug, Deserialize, Clone)]
pub struct AccuracyConfig {
    /// Score when no cross-validation is configured
    #[serde(default = "default_baseline")]
    pub baseline: f64,
    /// Reference source failed outright
    #[serde(default = "default_reference_unavailable")]
    pub reference_unavailable: f64,
    /// Endpoint body (or reference) had no usable price list
    #[serde(default = "default_no_price_data")]
    pub no_price_data: f64,
    /// Price lists present but no symbol matched
    #[serde(default = "default_no_matches")]
    pub no_matches: f64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_probe_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            primary_url: default_primary_url(),
            fallback_url: default_fallback_url(),
            timeout_ms: default_reference_timeout_ms(),
        }
    }
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            price_types: default_price_types(),
            source_ids: default_source_ids(),
            default_symbols: default_symbols(),
            default_quote: default_quote(),
        }
    }
}

impl Default for AccuracyConfig {
    fn default() -> Self {
        Self {
            baseline: default_baseline(),
            reference_unavailable: default_reference_unavailable(),
            no_price_data: default_no_price_data(),
            no_matches: default_no_matches(),
        }
    }
}

// Default value functions
fn default_probe_timeout_ms() -> u64 { 10_000 }
fn default_user_agent() -> String { format!("trustscope/{}", env!("CARGO_PKG_VERSION")) }
fn default_primary_url() -> String { "https://api.coingecko.com/api/v3".to_string() }
fn default_fallback_url() -> String { "https://api.coincap.io/v2".to_string() }
fn default_reference_timeout_ms() -> u64 { 10_000 }
fn default_price_types() -> Vec<String> { vec!["price".to_string(), "crypto-price".to_string()] }
fn default_source_ids() -> Vec<String> { vec!["reference".to_string(), "pulseapi".to_string()] }
fn default_symbols() -> Vec<String> { vec!["bitcoin".to_string()] }
fn default_quote() -> String { "usd".to_string() }
fn default_baseline() -> f64 { 85.0 }
fn default_reference_unavailable() -> f64 { 70.0 }
fn default_no_price_data() -> f64 { 60.0 }
fn default_no_matches() -> f64 { 55.0 }

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path, e))?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config '{}': {}", path, e))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        if config.probe.timeout_ms == 0 {
            return Err(anyhow::anyhow!("probe.timeout_ms must be greater than zero"));
        }
        Ok(config)
    }

    /// Whether a request's type/source combination opts into price cross-validation
    pub fn wants_cross_validation(&self, endpoint_type: Option<&str>, sources: &[String]) -> bool {
        let Some(ty) = endpoint_type else {
            return false;
        };
        let typed = self.comparison.price_types.iter().any(|t| t.eq_ignore_ascii_case(ty));
        typed
            && sources
                .iter()
                .any(|s| self.comparison.source_ids.iter().any(|id| id.eq_ignore_ascii_case(s)))
    }
}
