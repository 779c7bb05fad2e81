use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::trust::{Grade, Recommendation};
use crate::verify::types::{ResponseBody, VerificationRequest, VerificationResult};

/// Caller-facing verification report
#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    pub endpoint: String,
    pub verification: ScoreSummary,
    pub details: ProbeDetails,
    /// Display badge, emoji included
    pub badge: String,
    pub badge_label: &'static str,
    pub verified_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreSummary {
    pub accuracy_score: f64,
    pub latency_score: f64,
    pub reliability_score: f64,
    pub overall_trust_score: f64,
    pub grade: Grade,
    pub recommendation: Recommendation,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProbeDetails {
    pub endpoint_returned: Option<ResponseBody>,
    pub latency_ms: u64,
    pub status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VerificationReport {
    pub fn from_result(request: &VerificationRequest, result: &VerificationResult) -> Self {
        Self::at(request, result, Utc::now())
    }

    pub fn at(request: &VerificationRequest, result: &VerificationResult, verified_at: DateTime<Utc>) -> Self {
        let breakdown = result.breakdown();
        let probe = result.probe();
        Self {
            endpoint: request.endpoint_url().to_string(),
            verification: ScoreSummary {
                accuracy_score: breakdown.accuracy(),
                latency_score: breakdown.latency(),
                reliability_score: breakdown.reliability(),
                overall_trust_score: result.overall_score(),
                grade: result.grade(),
                recommendation: result.recommendation(),
            },
            details: ProbeDetails {
                endpoint_returned: probe.body.clone(),
                latency_ms: probe.latency_ms,
                status_code: probe.status_code,
                error: probe.error.clone(),
            },
            badge: result.badge().title().to_string(),
            badge_label: result.badge().label(),
            verified_at: verified_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trust;
    use crate::verify::types::ProbeOutcome;
    use chrono::TimeZone;
    use serde_json::{json, Map};

    #[test]
    fn test_failed_report_shape() {
        let request = VerificationRequest::new("https://down.test/invoke", Map::new()).unwrap();
        let result = trust::failed(ProbeOutcome::unreachable(10_000, "endpoint timed out after 10000ms"));
        let at = Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap();

        let report = serde_json::to_value(VerificationReport::at(&request, &result, at)).unwrap();
        assert_eq!(
            report,
            json!({
                "endpoint": "https://down.test/invoke",
                "verification": {
                    "accuracy_score": 0.0,
                    "latency_score": 0.0,
                    "reliability_score": 0.0,
                    "overall_trust_score": 0.0,
                    "grade": "F",
                    "recommendation": "AVOID"
                },
                "details": {
                    "endpoint_returned": null,
                    "latency_ms": 10000,
                    "status_code": 0,
                    "error": "endpoint timed out after 10000ms"
                },
                "badge": "❌ Failed Verification",
                "badge_label": "failed verification",
                "verified_at": "2026-10-16T09:30:00.000Z"
            })
        );
    }
}
