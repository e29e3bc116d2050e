use serde::{Deserialize, Serialize};

use super::feng_shui::{assess_feng_shui, FengShuiAssessment, FengShuiRequest};
use super::vastu::{assess_vastu, VastuAssessment, VastuRequest};
use crate::error::FieldViolation;
use crate::request::{field, Validate};
use crate::scoring::engine::{DomainScore, RiskLevel, ScoreBreakdown, Scorer};
use crate::scoring::grade::ESOTERIC;
use crate::scoring::{ComponentResult, EsotericConfig, Recommendations};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EsotericRequest {
    #[serde(default)]
    pub feng_shui: Option<FengShuiRequest>,
    #[serde(default)]
    pub vastu: Option<VastuRequest>,
}

impl Validate for EsotericRequest {
    fn validate(&self, prefix: &str, out: &mut Vec<FieldViolation>) {
        if self.feng_shui.is_none() && self.vastu.is_none() {
            out.push(FieldViolation::new(
                if prefix.is_empty() { "fengShui" } else { prefix },
                "at least one of fengShui or vastu is required",
            ));
        }
        if let Some(feng_shui) = &self.feng_shui {
            feng_shui.validate(&field(prefix, "fengShui"), out);
        }
        if let Some(vastu) = &self.vastu {
            vastu.validate(&field(prefix, "vastu"), out);
        }
    }
}

/// Sub-scores feeding the combined esoteric score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EsotericParts {
    pub vastu: Option<f64>,
    pub feng_shui: Option<f64>,
}

pub struct EsotericScorer<'a> {
    pub config: &'a EsotericConfig,
}

impl Scorer for EsotericScorer<'_> {
    type Input = EsotericParts;

    /// Weighted blend of whichever sub-scores are present, weights renormalized.
    fn compute_raw_risk(&self, parts: &EsotericParts) -> ScoreBreakdown {
        let present: Vec<(&str, f64, f64)> = [
            ("Vastu", self.config.vastu_weight, parts.vastu),
            ("Feng Shui", self.config.feng_shui_weight, parts.feng_shui),
        ]
        .into_iter()
        .filter_map(|(label, weight, score)| score.map(|s| (label, weight, s)))
        .collect();

        let total_weight: f64 = present.iter().map(|(_, w, _)| w).sum();

        let mut breakdown = ScoreBreakdown::new(0.0);
        for (label, weight, score) in &present {
            let share = if total_weight > 0.0 { weight / total_weight } else { 0.0 };
            breakdown.add(*label, format!("{} x {:.2}", score, share), score * share);
        }
        breakdown
    }

    fn classify(&self, value: f64) -> RiskLevel {
        self.config.levels.classify(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EsotericAssessment {
    pub esoteric_score: f64,
    pub grade: &'static str,
    pub level: RiskLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feng_shui: Option<FengShuiAssessment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vastu: Option<VastuAssessment>,
    pub recommendations: Vec<String>,
    #[serde(skip)]
    pub breakdown: ScoreBreakdown,
}

impl EsotericAssessment {
    pub fn into_component(self) -> ComponentResult {
        ComponentResult {
            score: DomainScore {
                value: self.esoteric_score,
                level: self.level,
                breakdown: self.breakdown,
            },
            recommendations: self.recommendations,
        }
    }
}

const ESOTERIC_BASELINE: &[&str] =
    &["Treat design-tradition findings as cultural guidance, not structural advice"];

/// Combined Vastu and Feng Shui compatibility. `current_year` is used for
/// annual afflictions when the Feng Shui request names no year.
pub fn assess_esoteric(
    request: &EsotericRequest,
    config: &EsotericConfig,
    current_year: i32,
) -> EsotericAssessment {
    let feng_shui = request
        .feng_shui
        .as_ref()
        .map(|r| assess_feng_shui(r, current_year, &config.levels));
    let vastu = request.vastu.as_ref().map(|r| assess_vastu(r, config));

    let parts = EsotericParts {
        vastu: vastu.as_ref().map(|v| v.vastu_score),
        feng_shui: feng_shui.as_ref().map(|f| f.feng_shui_score),
    };
    let scored = EsotericScorer { config }.score(&parts);

    let mut recs = Recommendations::new();
    if let Some(v) = &vastu {
        recs.extend(v.recommendations.iter().cloned());
    }
    if let Some(f) = &feng_shui {
        recs.extend(f.recommendations.iter().cloned());
    }

    EsotericAssessment {
        esoteric_score: scored.value,
        grade: ESOTERIC.grade(scored.value).label,
        level: scored.level,
        feng_shui,
        vastu,
        recommendations: recs.finish(ESOTERIC_BASELINE),
        breakdown: scored.breakdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::compass::Direction;
    use crate::domains::feng_shui::ElementQuantities;
    use crate::request::{parse_request, RequestFormat};
    use pretty_assertions::assert_eq;

    fn feng_shui() -> FengShuiRequest {
        FengShuiRequest {
            facing: Direction::South,
            elements: ElementQuantities::default(),
            year: Some(2026),
        }
    }

    fn vastu() -> VastuRequest {
        VastuRequest {
            entrance: Direction::South,
            rooms: Vec::new(),
            beam_above_bed: false,
            center_occupancy: Some(0.5),
        }
    }

    #[test]
    fn test_equal_weight_blend() {
        let request = EsotericRequest {
            feng_shui: Some(feng_shui()),
            vastu: Some(vastu()),
        };
        let result = assess_esoteric(&request, &EsotericConfig::default(), 2026);
        // Vastu 100 - 20 = 80, Feng Shui 40
        assert_eq!(result.vastu.as_ref().map(|v| v.vastu_score), Some(80.0));
        assert_eq!(result.esoteric_score, 60.0);
        assert_eq!(result.level, RiskLevel::Moderate);
        assert_eq!(result.grade, "C");
        assert_eq!(result.recommendations.last().map(String::as_str), ESOTERIC_BASELINE.last().copied());
    }

    #[test]
    fn test_single_part_stands_alone() {
        let request = EsotericRequest {
            feng_shui: None,
            vastu: Some(vastu()),
        };
        let result = assess_esoteric(&request, &EsotericConfig::default(), 2026);
        assert_eq!(result.esoteric_score, 80.0);
        assert_eq!(result.level, RiskLevel::Low);
        assert!(result.feng_shui.is_none());
    }

    #[test]
    fn test_custom_weights() {
        let config = EsotericConfig {
            vastu_weight: 0.8,
            feng_shui_weight: 0.2,
            ..EsotericConfig::default()
        };
        let request = EsotericRequest {
            feng_shui: Some(feng_shui()),
            vastu: Some(vastu()),
        };
        // 0.8 x 80 + 0.2 x 40 = 72
        assert_eq!(assess_esoteric(&request, &config, 2026).esoteric_score, 72.0);
    }

    #[test]
    fn test_empty_request_rejected() {
        let result: crate::error::Result<EsotericRequest> = parse_request("{}", RequestFormat::Json);
        assert!(result.is_err());
    }

    #[test]
    fn test_component_carries_breakdown() {
        let request = EsotericRequest {
            feng_shui: Some(feng_shui()),
            vastu: Some(vastu()),
        };
        let component = assess_esoteric(&request, &EsotericConfig::default(), 2026).into_component();
        assert_eq!(component.score.value, 60.0);
        assert_eq!(component.score.breakdown.factors.len(), 2);
    }
}
