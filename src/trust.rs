/// Trust Composer
///
/// Folds the three sub-scores into one weighted TrustScore and maps it to a
/// letter grade, a recommendation and a badge.
///
/// - accuracy 40%
/// - latency 30%
/// - reliability 30%
///
/// Grade and recommendation depend on the overall score alone. An unreachable
/// endpoint never reaches the weighting: it is zeroed and marked failed.

use std::fmt;

use serde::Serialize;

use crate::verify::types::{clamp_score, ProbeOutcome, ScoreBreakdown, VerificationResult};

pub const ACCURACY_WEIGHT: f64 = 0.4;
pub const LATENCY_WEIGHT: f64 = 0.3;
pub const RELIABILITY_WEIGHT: f64 = 0.3;

/// Letter grade, ordered F < D < C- < … < A+
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Grade {
    F,
    D,
    #[serde(rename = "C-")]
    CMinus,
    C,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "B-")]
    BMinus,
    B,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "A-")]
    AMinus,
    A,
    #[serde(rename = "A+")]
    APlus,
}

impl Grade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::F => "F",
            Grade::D => "D",
            Grade::CMinus => "C-",
            Grade::C => "C",
            Grade::CPlus => "C+",
            Grade::BMinus => "B-",
            Grade::B => "B",
            Grade::BPlus => "B+",
            Grade::AMinus => "A-",
            Grade::A => "A",
            Grade::APlus => "A+",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Recommendation {
    Trusted,
    Caution,
    Avoid,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Trusted => "TRUSTED",
            Recommendation::Caution => "CAUTION",
            Recommendation::Avoid => "AVOID",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Badge {
    Platinum,
    Gold,
    Silver,
    Bronze,
    Basic,
    Caution,
    #[serde(rename = "not recommended")]
    NotRecommended,
    #[serde(rename = "failed verification")]
    FailedVerification,
}

impl Badge {
    pub fn label(&self) -> &'static str {
        match self {
            Badge::Platinum => "platinum",
            Badge::Gold => "gold",
            Badge::Silver => "silver",
            Badge::Bronze => "bronze",
            Badge::Basic => "basic",
            Badge::Caution => "caution",
            Badge::NotRecommended => "not recommended",
            Badge::FailedVerification => "failed verification",
        }
    }

    /// Display form, emoji included
    pub fn title(&self) -> &'static str {
        match self {
            Badge::Platinum => "🏆 Platinum Verified",
            Badge::Gold => "🥇 Gold Verified",
            Badge::Silver => "🥈 Silver Verified",
            Badge::Bronze => "🥉 Bronze Verified",
            Badge::Basic => "✅ Basic Verified",
            Badge::Caution => "⚠️ Use With Caution",
            Badge::NotRecommended => "❌ Not Recommended",
            Badge::FailedVerification => "❌ Failed Verification",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Weighted combination, clamped to [0, 100] and rounded to one decimal
pub fn overall_score(breakdown: &ScoreBreakdown) -> f64 {
    let raw = breakdown.accuracy() * ACCURACY_WEIGHT
        + breakdown.latency() * LATENCY_WEIGHT
        + breakdown.reliability() * RELIABILITY_WEIGHT;
    (clamp_score(raw) * 10.0).round() / 10.0
}

/// Format a trust score as a letter grade
pub fn score_to_grade(score: f64) -> Grade {
    match score {
        s if s >= 95.0 => Grade::APlus,
        s if s >= 90.0 => Grade::A,
        s if s >= 85.0 => Grade::AMinus,
        s if s >= 80.0 => Grade::BPlus,
        s if s >= 75.0 => Grade::B,
        s if s >= 70.0 => Grade::BMinus,
        s if s >= 65.0 => Grade::CPlus,
        s if s >= 60.0 => Grade::C,
        s if s >= 55.0 => Grade::CMinus,
        s if s >= 50.0 => Grade::D,
        _ => Grade::F,
    }
}

pub fn score_to_recommendation(score: f64) -> Recommendation {
    match score {
        s if s >= 80.0 => Recommendation::Trusted,
        s if s >= 60.0 => Recommendation::Caution,
        _ => Recommendation::Avoid,
    }
}

/// Highest threshold wins
pub fn score_to_badge(score: f64) -> Badge {
    match score {
        s if s >= 98.0 => Badge::Platinum,
        s if s >= 95.0 => Badge::Gold,
        s if s >= 90.0 => Badge::Silver,
        s if s >= 80.0 => Badge::Bronze,
        s if s >= 70.0 => Badge::Basic,
        s if s >= 60.0 => Badge::Caution,
        _ => Badge::NotRecommended,
    }
}

/// Build the final result for a probe. Unreachable probes are zeroed and
/// marked failed regardless of the breakdown passed in.
pub fn compose(breakdown: ScoreBreakdown, probe: ProbeOutcome) -> VerificationResult {
    if probe.is_unreachable() {
        return failed(probe);
    }

    let overall = overall_score(&breakdown);
    VerificationResult {
        breakdown,
        overall_score: overall,
        grade: score_to_grade(overall),
        recommendation: score_to_recommendation(overall),
        badge: score_to_badge(overall),
        probe,
    }
}

pub fn failed(probe: ProbeOutcome) -> VerificationResult {
    VerificationResult {
        breakdown: ScoreBreakdown::zeroed(),
        overall_score: 0.0,
        grade: Grade::F,
        recommendation: Recommendation::Avoid,
        badge: Badge::FailedVerification,
        probe,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpReply;

    fn ok_probe() -> ProbeOutcome {
        ProbeOutcome::from_reply(150, HttpReply { status: 200, body: Some("{}".into()) })
    }

    #[test]
    fn test_overall_matches_formula_and_bounds() {
        let steps = [0.0, 12.5, 33.3, 50.0, 64.9, 85.0, 96.25, 100.0];
        for a in steps {
            for l in steps {
                for r in steps {
                    let score = overall_score(&ScoreBreakdown::new(a, l, r));
                    let expected = ((a * 0.4 + l * 0.3 + r * 0.3) * 10.0).round() / 10.0;
                    assert_eq!(score, expected, "a={} l={} r={}", a, l, r);
                    assert!((0.0..=100.0).contains(&score));
                }
            }
        }
    }

    #[test]
    fn test_grade_thresholds() {
        let table = [
            (100.0, "A+"), (95.0, "A+"), (94.9, "A"), (90.0, "A"), (85.0, "A-"),
            (80.0, "B+"), (75.0, "B"), (70.0, "B-"), (65.0, "C+"), (60.0, "C"),
            (55.0, "C-"), (50.0, "D"), (49.9, "F"), (0.0, "F"),
        ];
        for (score, grade) in table {
            assert_eq!(score_to_grade(score).as_str(), grade, "score {}", score);
        }
        assert!(Grade::APlus > Grade::A && Grade::D > Grade::F);
    }

    #[test]
    fn test_recommendation_thresholds() {
        assert_eq!(score_to_recommendation(80.0), Recommendation::Trusted);
        assert_eq!(score_to_recommendation(79.9), Recommendation::Caution);
        assert_eq!(score_to_recommendation(60.0), Recommendation::Caution);
        assert_eq!(score_to_recommendation(59.9), Recommendation::Avoid);
    }

    #[test]
    fn test_badge_thresholds() {
        assert_eq!(score_to_badge(98.0), Badge::Platinum);
        assert_eq!(score_to_badge(97.9), Badge::Gold);
        assert_eq!(score_to_badge(90.0), Badge::Silver);
        assert_eq!(score_to_badge(80.0), Badge::Bronze);
        assert_eq!(score_to_badge(70.0), Badge::Basic);
        assert_eq!(score_to_badge(60.0), Badge::Caution);
        assert_eq!(score_to_badge(10.0).label(), "not recommended");
    }

    #[test]
    fn test_grade_depends_only_on_overall() {
        // Same overall score from very different distributions
        let x = compose(ScoreBreakdown::new(100.0, 50.0, 50.0), ok_probe());
        let y = compose(ScoreBreakdown::new(25.0, 100.0, 100.0), ok_probe());
        assert_eq!(x.overall_score(), 70.0);
        assert_eq!(y.overall_score(), 70.0);
        assert_eq!(x.grade(), y.grade());
        assert_eq!(x.recommendation(), y.recommendation());
    }

    #[test]
    fn test_unreachable_override() {
        let probe = ProbeOutcome::unreachable(10_000, "endpoint timed out after 10000ms");
        let result = compose(ScoreBreakdown::new(85.0, 30.0, 50.0), probe);
        assert_eq!(result.overall_score(), 0.0);
        assert_eq!(result.breakdown(), &ScoreBreakdown::zeroed());
        assert_eq!(result.grade(), Grade::F);
        assert_eq!(result.recommendation(), Recommendation::Avoid);
        assert_eq!(result.badge(), Badge::FailedVerification);
    }

    #[test]
    fn test_serialized_labels() {
        assert_eq!(serde_json::to_value(Grade::AMinus).unwrap(), "A-");
        assert_eq!(serde_json::to_value(Recommendation::Trusted).unwrap(), "TRUSTED");
        assert_eq!(serde_json::to_value(Badge::NotRecommended).unwrap(), "not recommended");
        assert_eq!(serde_json::to_value(Badge::FailedVerification).unwrap(), "failed verification");
    }
}
