use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{TrustError, TrustResult};
use crate::http::HttpReply;
use crate::trust::{Badge, Grade, Recommendation};

/// A single verification job: where to probe and what to send.
///
/// Validated on construction and read-only afterwards. Deserializes from
/// either snake_case field names or the `test_query` wire name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RequestDraft")]
pub struct VerificationRequest {
    endpoint_url: String,
    test_payload: Map<String, Value>,
    endpoint_type: Option<String>,
    comparison_sources: Vec<String>,
}

#[derive(Deserialize)]
struct RequestDraft {
    #[serde(alias = "endpointUrl")]
    endpoint_url: String,
    #[serde(default, alias = "test_query", alias = "testPayload")]
    test_payload: Map<String, Value>,
    #[serde(default, alias = "endpointType")]
    endpoint_type: Option<String>,
    #[serde(default, alias = "comparisonSources")]
    comparison_sources: Vec<String>,
}

impl TryFrom<RequestDraft> for VerificationRequest {
    type Error = TrustError;

    fn try_from(draft: RequestDraft) -> TrustResult<Self> {
        Ok(VerificationRequest::new(draft.endpoint_url, draft.test_payload)?
            .with_endpoint_type_opt(draft.endpoint_type)
            .with_comparison_sources(draft.comparison_sources))
    }
}

impl VerificationRequest {
    pub fn new(endpoint_url: impl Into<String>, test_payload: Map<String, Value>) -> TrustResult<Self> {
        let endpoint_url = endpoint_url.into().trim().to_string();
        if endpoint_url.is_empty() {
            return Err(TrustError::InvalidRequest("endpoint_url must not be empty".into()));
        }

        let parsed = url::Url::parse(&endpoint_url)
            .map_err(|e| TrustError::InvalidUrl(format!("{}: {}", endpoint_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(TrustError::InvalidUrl(format!(
                "{}: unsupported scheme '{}'",
                endpoint_url,
                parsed.scheme()
            )));
        }

        Ok(Self {
            endpoint_url,
            test_payload,
            endpoint_type: None,
            comparison_sources: Vec::new(),
        })
    }

    pub fn with_endpoint_type(self, endpoint_type: impl Into<String>) -> Self {
        self.with_endpoint_type_opt(Some(endpoint_type.into()))
    }

    fn with_endpoint_type_opt(mut self, endpoint_type: Option<String>) -> Self {
        self.endpoint_type = endpoint_type
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        self
    }

    pub fn with_comparison_sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for source in sources {
            let source = source.into();
            if !self.comparison_sources.contains(&source) {
                self.comparison_sources.push(source);
            }
        }
        self
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    pub fn test_payload(&self) -> &Map<String, Value> {
        &self.test_payload
    }

    pub fn endpoint_type(&self) -> Option<&str> {
        self.endpoint_type.as_deref()
    }

    pub fn comparison_sources(&self) -> &[String] {
        &self.comparison_sources
    }
}

/// Response body as received: JSON when it parses, raw text otherwise
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

impl ResponseBody {
    pub fn parse(raw: String) -> Self {
        match serde_json::from_str(&raw) {
            Ok(value) => ResponseBody::Json(value),
            Err(_) => ResponseBody::Text(raw),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseBody::Json(v) => Some(v),
            ResponseBody::Text(_) => None,
        }
    }
}

/// Tagged view of how a probe ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStatus {
    Success,
    /// A response arrived but was non-2xx or had no readable body
    Failure,
    /// No response at all (network error or timeout)
    Unreachable,
}

/// Raw measurements from one probe. Built only through `from_reply` and
/// `unreachable`, so `error` is set exactly when the probe did not succeed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeOutcome {
    pub(crate) latency_ms: u64,
    /// 0 if the request never completed
    pub(crate) status_code: u16,
    pub(crate) succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) body: Option<ResponseBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) error: Option<String>,
}

impl ProbeOutcome {
    pub fn from_reply(latency_ms: u64, reply: HttpReply) -> Self {
        let status_code = reply.status;
        let body = reply.body.map(ResponseBody::parse);
        let succeeded = (200..300).contains(&status_code) && body.is_some();

        let error = if succeeded {
            None
        } else if body.is_none() {
            Some(format!("endpoint returned HTTP {} with an unreadable body", status_code))
        } else {
            Some(format!("endpoint returned HTTP {}", status_code))
        };

        Self {
            latency_ms,
            status_code,
            succeeded,
            body,
            error,
        }
    }

    pub fn unreachable(latency_ms: u64, error: impl Into<String>) -> Self {
        Self {
            latency_ms,
            status_code: 0,
            succeeded: false,
            body: None,
            error: Some(error.into()),
        }
    }

    pub fn latency_ms(&self) -> u64 {
        self.latency_ms
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn succeeded(&self) -> bool {
        self.succeeded
    }

    pub fn body(&self) -> Option<&ResponseBody> {
        self.body.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn status(&self) -> ProbeStatus {
        if self.succeeded {
            ProbeStatus::Success
        } else if self.status_code == 0 {
            ProbeStatus::Unreachable
        } else {
            ProbeStatus::Failure
        }
    }

    pub fn is_unreachable(&self) -> bool {
        self.status() == ProbeStatus::Unreachable
    }
}

/// Sub-scores, each clamped to [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    accuracy: f64,
    latency: f64,
    reliability: f64,
}

impl ScoreBreakdown {
    pub fn new(accuracy: f64, latency: f64, reliability: f64) -> Self {
        Self {
            accuracy: clamp_score(accuracy),
            latency: clamp_score(latency),
            reliability: clamp_score(reliability),
        }
    }

    pub fn zeroed() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    pub fn latency(&self) -> f64 {
        self.latency
    }

    pub fn reliability(&self) -> f64 {
        self.reliability
    }
}

pub(crate) fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        return 0.0;
    }
    score.clamp(0.0, 100.0)
}

/// Final verdict for one verification. Only built by the trust composer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationResult {
    pub(crate) breakdown: ScoreBreakdown,
    pub(crate) overall_score: f64,
    pub(crate) grade: Grade,
    pub(crate) recommendation: Recommendation,
    pub(crate) badge: Badge,
    pub(crate) probe: ProbeOutcome,
}

impl VerificationResult {
    pub fn breakdown(&self) -> &ScoreBreakdown {
        &self.breakdown
    }

    pub fn overall_score(&self) -> f64 {
        self.overall_score
    }

    pub fn grade(&self) -> Grade {
        self.grade
    }

    pub fn recommendation(&self) -> Recommendation {
        self.recommendation
    }

    pub fn badge(&self) -> Badge {
        self.badge
    }

    pub fn probe(&self) -> &ProbeOutcome {
        &self.probe
    }
}
