use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest and highest value a domain score may take.
pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 100.0;

/// Risk classification shared by every domain. `Extreme` is only produced by
/// tables that define a `high` threshold (EMF).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Extreme,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskLevel::Low => "Low",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::High => "High",
            RiskLevel::Extreme => "Extreme",
        };
        f.write_str(label)
    }
}

/// Score cutoffs for classifying a 0-100 value (higher is safer).
///
/// `value >= low` is Low, `value >= moderate` is Moderate. When `high` is set,
/// `value >= high` is High and anything below is Extreme; otherwise everything
/// below `moderate` is High.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LevelThresholds {
    pub low: f64,
    pub moderate: f64,
    #[serde(default)]
    pub high: Option<f64>,
}

impl LevelThresholds {
    pub fn classify(&self, value: f64) -> RiskLevel {
        if value >= self.low {
            RiskLevel::Low
        } else if value >= self.moderate {
            RiskLevel::Moderate
        } else {
            match self.high {
                Some(high) if value < high => RiskLevel::Extreme,
                _ => RiskLevel::High,
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorContribution {
    pub label: String,       // e.g. "Cell tower", "Violent crime", "Flood"
    pub description: String, // e.g. "150m away, exposure 15.0"
    pub before: f64,         // Running value before this factor
    pub after: f64,          // Running value after this factor
}

/// Ordered record of how a raw score was built up from its base.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub base_score: f64,
    pub factors: Vec<FactorContribution>,
}

impl ScoreBreakdown {
    pub fn new(base_score: f64) -> Self {
        Self {
            base_score,
            factors: Vec::new(),
        }
    }

    /// Current running value: the last factor's result, or the base.
    pub fn current(&self) -> f64 {
        self.factors
            .last()
            .map(|f| f.after)
            .unwrap_or(self.base_score)
    }

    /// Record a factor that moves the running value by `delta`.
    pub fn add(&mut self, label: impl Into<String>, description: impl Into<String>, delta: f64) {
        let before = self.current();
        self.factors.push(FactorContribution {
            label: label.into(),
            description: description.into(),
            before,
            after: before + delta,
        });
    }

    /// Record a factor that scales the running value by `factor`.
    pub fn multiply(&mut self, label: impl Into<String>, description: impl Into<String>, factor: f64) {
        let before = self.current();
        self.factors.push(FactorContribution {
            label: label.into(),
            description: description.into(),
            before,
            after: before * factor,
        });
    }
}

/// A finished, bounded domain score.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainScore {
    pub value: f64,
    pub level: RiskLevel,
    pub breakdown: ScoreBreakdown,
}

/// Round and clamp a raw value into [0, 100]. NaN collapses to 0.
pub fn bound_score(raw: f64) -> f64 {
    if raw.is_nan() {
        return SCORE_MIN;
    }
    raw.round().clamp(SCORE_MIN, SCORE_MAX)
}

/// Drop the fraction and clamp into [0, 100]. NaN collapses to 0.
pub fn truncate_score(raw: f64) -> f64 {
    if raw.is_nan() {
        return SCORE_MIN;
    }
    raw.trunc().clamp(SCORE_MIN, SCORE_MAX)
}

/// Common capability set of the domain scorers.
///
/// Implementors build an unbounded breakdown in `compute_raw_risk`; `score`
/// bounds it exactly once and classifies the bounded value.
pub trait Scorer {
    type Input: ?Sized;

    fn compute_raw_risk(&self, input: &Self::Input) -> ScoreBreakdown;

    fn classify(&self, value: f64) -> RiskLevel;

    /// Map the raw total onto the 0-100 scale. Rounds unless overridden.
    fn bound(&self, raw: f64) -> f64 {
        bound_score(raw)
    }

    fn score(&self, input: &Self::Input) -> DomainScore {
        let breakdown = self.compute_raw_risk(input);
        let value = self.bound(breakdown.current());
        DomainScore {
            value,
            level: self.classify(value),
            breakdown,
        }
    }
}
