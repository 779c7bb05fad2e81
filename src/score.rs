//! Score curves
//!
//! Every sub-score maps a raw measurement onto 0-100 through a five-band
//! piecewise-linear curve. Fast/accurate endpoints are rewarded steeply, while
//! slow/inaccurate ones still decay gradually instead of collapsing to zero.
//!
//! All functions here are pure; the async cross-validation that feeds
//! `deviation_score` lives in `accuracy`.

/// Latency in milliseconds → score.
///
/// ```text
///   < 200ms        95 + (200 - L) / 40              (capped at 100)
///   [200, 500)     85 + ((500 - L) / 300) * 10
///   [500, 1000)    70 + ((1000 - L) / 500) * 15
///   [1000, 3000)   50 + ((3000 - L) / 2000) * 20
///   >= 3000        max(0, 50 - ((L - 3000) / 2000) * 10)
/// ```
pub fn latency_score(latency_ms: u64) -> f64 {
    let l = latency_ms as f64;
    let score = match latency_ms {
        0..=199 => 95.0 + (200.0 - l) / 40.0,
        200..=499 => 85.0 + ((500.0 - l) / 300.0) * 10.0,
        500..=999 => 70.0 + ((1000.0 - l) / 500.0) * 15.0,
        1000..=2999 => 50.0 + ((3000.0 - l) / 2000.0) * 20.0,
        _ => 50.0 - ((l - 3000.0) / 2000.0) * 10.0,
    };
    score.clamp(0.0, 100.0)
}

/// HTTP outcome → score. 50 is the neutral "unknown" middle (1xx/3xx, or no status).
pub fn reliability_score(status_code: u16, succeeded: bool) -> f64 {
    match status_code {
        200 if succeeded => 100.0,
        s if succeeded && s < 300 => 95.0,
        429 => 60.0,
        400..=499 => 30.0,
        s if s >= 500 => 10.0,
        _ => 50.0,
    }
}

/// Average relative price deviation (0.02 == 2%) → score.
///
/// Same band shape as the latency curve: <1%, 1-3%, 3-5%, 5-10%, >=10%.
pub fn deviation_score(avg_deviation: f64) -> f64 {
    let d = avg_deviation.abs();
    let score = if d < 0.01 {
        95.0 + (0.01 - d) * 500.0
    } else if d < 0.03 {
        85.0 + ((0.03 - d) / 0.02) * 10.0
    } else if d < 0.05 {
        70.0 + ((0.05 - d) / 0.02) * 15.0
    } else if d < 0.1 {
        50.0 + ((0.1 - d) / 0.05) * 20.0
    } else {
        50.0 - ((d - 0.1) / 0.1) * 50.0
    };
    if score.is_nan() {
        return 0.0;
    }
    score.clamp(0.0, 100.0)
}
