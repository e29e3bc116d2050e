use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::config::CompositeWeights;
use super::engine::{bound_score, DomainScore};
use super::grade::{Grade, GENERAL};
use super::recommend::Recommendations;

/// Overall scores strictly below this need a human expert.
pub const PROFESSIONAL_REVIEW_THRESHOLD: f64 = 60.0;

const COMPOSITE_BASELINE: &[&str] = &[
    "Commission an independent inspection before closing",
    "Re-run this assessment if the property or its surroundings change",
];

/// Assessment domains, in composite reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Domain {
    Emf,
    Crime,
    Climate,
    Esoteric,
}

impl Domain {
    pub const ALL: [Domain; 4] = [Domain::Emf, Domain::Crime, Domain::Climate, Domain::Esoteric];
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Domain::Emf => "EMF",
            Domain::Crime => "Crime & Safety",
            Domain::Climate => "Climate",
            Domain::Esoteric => "Feng Shui & Vastu",
        };
        f.write_str(label)
    }
}

/// One domain's contribution to a composite.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentResult {
    pub score: DomainScore,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeAssessment {
    pub overall: f64,
    pub grade: Grade,
    pub components: BTreeMap<Domain, DomainScore>,
    pub recommendations: Vec<String>,
    pub professional_review_needed: bool,
}

pub fn needs_professional_review(overall: f64) -> bool {
    overall < PROFESSIONAL_REVIEW_THRESHOLD
}

/// Weighted sum of `(weight, score)` pairs, renormalized over the weights
/// present. Returns 0 when the weights sum to zero.
pub fn weighted_overall(parts: &[(f64, f64)]) -> f64 {
    let total_weight: f64 = parts.iter().map(|(w, _)| w).sum();
    if total_weight <= 0.0 {
        return 0.0;
    }
    let sum: f64 = parts.iter().map(|(w, s)| w * s).sum();
    sum / total_weight
}

/// Combine domain scores into one overall assessment.
///
/// `overall = round(sum(weight_i * score_i))` over the domains present.
/// Weights are validated to sum to 1.0 at startup; when a weighted domain is
/// absent the remaining weights are renormalized.
pub fn aggregate(
    components: BTreeMap<Domain, ComponentResult>,
    weights: &CompositeWeights,
) -> CompositeAssessment {
    let parts: Vec<(f64, f64)> = components
        .iter()
        .map(|(domain, component)| (weights.weight(*domain), component.score.value))
        .collect();
    let overall = bound_score(weighted_overall(&parts));

    let mut recommendations = Recommendations::new();
    let mut scores = BTreeMap::new();
    for (domain, component) in components {
        recommendations.extend(component.recommendations);
        scores.insert(domain, component.score);
    }

    CompositeAssessment {
        overall,
        grade: GENERAL.grade(overall),
        components: scores,
        recommendations: recommendations.finish(COMPOSITE_BASELINE),
        professional_review_needed: needs_professional_review(overall),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::engine::{RiskLevel, ScoreBreakdown};
    use proptest::prelude::*;

    fn component(value: f64, rec: &str) -> ComponentResult {
        ComponentResult {
            score: DomainScore {
                value,
                level: RiskLevel::Low,
                breakdown: ScoreBreakdown::new(value),
            },
            recommendations: vec![rec.to_string()],
        }
    }

    fn two_domain_weights() -> CompositeWeights {
        CompositeWeights {
            emf: 0.6,
            crime: 0.4,
            climate: 0.0,
            esoteric: 0.0,
        }
    }

    #[test]
    fn test_weighted_aggregate() {
        let mut components = BTreeMap::new();
        components.insert(Domain::Emf, component(80.0, "emf"));
        components.insert(Domain::Crime, component(50.0, "crime"));

        let result = aggregate(components, &two_domain_weights());
        // round(0.6 * 80 + 0.4 * 50) = 68
        assert_eq!(result.overall, 68.0);
        assert_eq!(result.grade.label, "C");
        assert!(!result.professional_review_needed);
    }

    #[test]
    fn test_review_gate_boundary() {
        assert!(!needs_professional_review(60.0));
        assert!(needs_professional_review(59.0));
    }

    #[test]
    fn test_recommendations_follow_domain_order() {
        let mut components = BTreeMap::new();
        components.insert(Domain::Crime, component(50.0, "crime"));
        components.insert(Domain::Emf, component(80.0, "emf"));

        let result = aggregate(components, &two_domain_weights());
        assert_eq!(result.recommendations[0], "emf");
        assert_eq!(result.recommendations[1], "crime");
        assert_eq!(result.recommendations.len(), 2 + COMPOSITE_BASELINE.len());
    }

    #[test]
    fn test_missing_domain_renormalizes() {
        let mut components = BTreeMap::new();
        components.insert(Domain::Emf, component(70.0, "emf"));
        components.insert(Domain::Climate, component(40.0, "climate"));

        let result = aggregate(components, &CompositeWeights::default());
        // (0.30 * 70 + 0.25 * 40) / 0.55 = 56.36
        assert_eq!(result.overall, 56.0);
        assert!(result.professional_review_needed);
    }

    #[test]
    fn test_empty_components_score_zero() {
        let result = aggregate(BTreeMap::new(), &CompositeWeights::default());
        assert_eq!(result.overall, 0.0);
        assert!(result.professional_review_needed);
        assert!(!result.recommendations.is_empty());
    }

    proptest! {
        #[test]
        fn prop_aggregate_stays_within_components(
            values in proptest::array::uniform4(proptest::option::of(0.0f64..=100.0)),
        ) {
            let scores: BTreeMap<Domain, f64> = Domain::ALL
                .iter()
                .zip(values)
                .filter_map(|(domain, value)| value.map(|v| (*domain, v)))
                .collect();
            prop_assume!(scores.len() >= 2);
            let components: BTreeMap<Domain, ComponentResult> = scores
                .iter()
                .map(|(domain, value)| (*domain, component(*value, "advice")))
                .collect();
            let weights = CompositeWeights::default();
            let first = aggregate(components.clone(), &weights);

            let lowest = scores.values().copied().fold(f64::INFINITY, f64::min);
            let highest = scores.values().copied().fold(f64::NEG_INFINITY, f64::max);
            prop_assert!((0.0..=100.0).contains(&first.overall));
            prop_assert!(first.overall >= lowest.round() && first.overall <= highest.round());
            prop_assert_eq!(first.professional_review_needed, first.overall < 60.0);
            prop_assert!(!first.recommendations.is_empty());

            let second = aggregate(components, &weights);
            prop_assert_eq!(
                serde_json::to_string(&first).unwrap(),
                serde_json::to_string(&second).unwrap()
            );
        }
    }
}
