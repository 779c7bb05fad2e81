//! trustscope - endpoint trust verification
//!
//! Probes an HTTP data endpoint once, scores its latency, reliability and
//! (for price endpoints) accuracy against a reference price source, and
//! reduces the three into a TrustScore with a grade, recommendation and badge.

pub mod accuracy;
pub mod config;
pub mod error;
pub mod http;
pub mod probe;
pub mod reference;
pub mod report;
pub mod score;
pub mod trust;
pub mod verify;

pub use config::Config;
pub use error::{TrustError, TrustResult};
pub use report::VerificationReport;
pub use trust::{Badge, Grade, Recommendation};
pub use verify::engine::TrustVerifier;
pub use verify::types::{
    ProbeOutcome, ProbeStatus, ResponseBody, ScoreBreakdown, VerificationRequest, VerificationResult,
};
