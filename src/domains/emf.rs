use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::FieldViolation;
use crate::request::{check_non_negative, field, indexed, Validate};
use crate::scoring::composite::{needs_professional_review, ComponentResult};
use crate::scoring::engine::{DomainScore, RiskLevel, ScoreBreakdown, Scorer};
use crate::scoring::grade::{Grade, GENERAL};
use crate::scoring::normalize::{inverse_distance_decay, linear_contribution};
use crate::scoring::{EmfConfig, Recommendations};

/// EMF emitters outside the property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ExternalKind {
    CellTower,
    PowerLine,
    Transformer,
    Substation,
    SmallCell5g,
    BroadcastTower,
    #[serde(other)]
    Unknown,
}

impl ExternalKind {
    pub fn label(&self) -> &'static str {
        match self {
            ExternalKind::CellTower => "Cell tower",
            ExternalKind::PowerLine => "Power line",
            ExternalKind::Transformer => "Transformer",
            ExternalKind::Substation => "Substation",
            ExternalKind::SmallCell5g => "5G small cell",
            ExternalKind::BroadcastTower => "Broadcast tower",
            ExternalKind::Unknown => "Unknown source",
        }
    }
}

/// EMF emitters inside the property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum InternalKind {
    WifiRouter,
    SmartMeter,
    ElectricBlanket,
    BedroomElectronics,
    Microwave,
    CordlessPhone,
    BabyMonitor,
    #[serde(other)]
    Unknown,
}

impl InternalKind {
    pub fn label(&self) -> &'static str {
        match self {
            InternalKind::WifiRouter => "Wi-Fi router",
            InternalKind::SmartMeter => "Smart meter",
            InternalKind::ElectricBlanket => "Electric blanket",
            InternalKind::BedroomElectronics => "Bedroom electronics",
            InternalKind::Microwave => "Microwave",
            InternalKind::CordlessPhone => "Cordless phone base",
            InternalKind::BabyMonitor => "Baby monitor",
            InternalKind::Unknown => "Unknown device",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalSource {
    #[serde(rename = "type")]
    pub kind: ExternalKind,
    /// Meters from the property
    pub distance: f64,
    #[serde(default)]
    pub location_context: Option<String>,
}

fn default_quantity() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalSource {
    #[serde(rename = "type")]
    pub kind: InternalKind,
    #[serde(default = "default_quantity")]
    pub quantity: f64,
    #[serde(default)]
    pub location_context: Option<String>,
}

impl InternalSource {
    pub fn in_sleep_space(&self) -> bool {
        self.location_context
            .as_deref()
            .map(is_sleep_space)
            .unwrap_or(false)
    }
}

/// Rooms where occupants sleep: any context naming a bedroom or nursery.
pub fn is_sleep_space(context: &str) -> bool {
    let context = context.to_ascii_lowercase();
    context.contains("bedroom") || context.contains("nursery")
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmfRequest {
    #[serde(default)]
    pub nearby_sources: Vec<ExternalSource>,
    #[serde(default)]
    pub internal_sources: Vec<InternalSource>,
}

impl Validate for EmfRequest {
    fn validate(&self, prefix: &str, out: &mut Vec<FieldViolation>) {
        for (i, source) in self.nearby_sources.iter().enumerate() {
            let path = indexed(prefix, "nearbySources", i);
            check_non_negative(out, field(&path, "distance"), source.distance);
        }
        for (i, source) in self.internal_sources.iter().enumerate() {
            let path = indexed(prefix, "internalSources", i);
            check_non_negative(out, field(&path, "quantity"), source.quantity);
        }
    }
}

/// Exposure of one external source after distance decay and type intensity.
/// `None` for unknown source types.
pub fn external_exposure(source: &ExternalSource, config: &EmfConfig) -> Option<f64> {
    let intensity = config.intensity.for_kind(source.kind)?;
    Some(inverse_distance_decay(source.distance, &config.decay) * intensity)
}

pub struct ExternalRiskScorer<'a> {
    pub config: &'a EmfConfig,
}

impl Scorer for ExternalRiskScorer<'_> {
    type Input = [ExternalSource];

    fn compute_raw_risk(&self, sources: &[ExternalSource]) -> ScoreBreakdown {
        let mut breakdown = ScoreBreakdown::new(100.0);
        for source in sources {
            match external_exposure(source, self.config) {
                Some(exposure) => breakdown.add(
                    source.kind.label(),
                    format!("{}m away, exposure {:.1}", source.distance, exposure),
                    -exposure,
                ),
                None => trace!(distance = source.distance, "skipping unknown external source"),
            }
        }
        breakdown
    }

    fn classify(&self, value: f64) -> RiskLevel {
        self.config.levels.classify(value)
    }
}

pub struct InternalRiskScorer<'a> {
    pub config: &'a EmfConfig,
}

impl InternalRiskScorer<'_> {
    fn contribution(&self, source: &InternalSource) -> Option<f64> {
        let weight = self.config.unit_weights.for_kind(source.kind)?;
        let multiplier = if source.in_sleep_space() {
            self.config.sleep_space_multiplier
        } else {
            1.0
        };
        Some(linear_contribution(weight, source.quantity, multiplier))
    }
}

impl Scorer for InternalRiskScorer<'_> {
    type Input = [InternalSource];

    fn compute_raw_risk(&self, sources: &[InternalSource]) -> ScoreBreakdown {
        let mut breakdown = ScoreBreakdown::new(100.0);
        for source in sources {
            match self.contribution(source) {
                Some(points) => {
                    let place = source.location_context.as_deref().unwrap_or("unspecified room");
                    breakdown.add(
                        source.kind.label(),
                        format!("{} x{} in {}, {:.1} points", source.kind.label(), source.quantity, place, points),
                        -points,
                    )
                }
                None => trace!("skipping unknown internal source"),
            }
        }
        breakdown
    }

    fn classify(&self, value: f64) -> RiskLevel {
        self.config.levels.classify(value)
    }
}

/// Property-wide EMF score: weighted external and internal sub-scores.
pub struct EmfScorer<'a> {
    pub config: &'a EmfConfig,
}

impl EmfScorer<'_> {
    fn sub_scores(&self, request: &EmfRequest) -> (DomainScore, DomainScore) {
        let external = ExternalRiskScorer { config: self.config }.score(&request.nearby_sources);
        let internal = InternalRiskScorer { config: self.config }.score(&request.internal_sources);
        (external, internal)
    }
}

impl Scorer for EmfScorer<'_> {
    type Input = EmfRequest;

    fn compute_raw_risk(&self, request: &EmfRequest) -> ScoreBreakdown {
        let (external, internal) = self.sub_scores(request);
        let mut breakdown = ScoreBreakdown::new(0.0);
        breakdown.add(
            "External",
            format!("{} x {}", external.value, self.config.external_weight),
            external.value * self.config.external_weight,
        );
        breakdown.add(
            "Internal",
            format!("{} x {}", internal.value, self.config.internal_weight),
            internal.value * self.config.internal_weight,
        );
        breakdown
    }

    fn classify(&self, value: f64) -> RiskLevel {
        self.config.levels.classify(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubRisk {
    pub score: f64,
    pub level: RiskLevel,
    pub source_count: usize,
    pub breakdown: ScoreBreakdown,
}

impl SubRisk {
    fn new(score: DomainScore, source_count: usize) -> Self {
        Self {
            score: score.value,
            level: score.level,
            source_count,
            breakdown: score.breakdown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmfAssessment {
    pub emf_score: f64,
    pub grade: Grade,
    pub level: RiskLevel,
    pub external_risk: SubRisk,
    pub internal_risk: SubRisk,
    pub hotspots: Vec<String>,
    pub recommendations: Vec<String>,
    pub professional_assessment_needed: bool,
}

impl EmfAssessment {
    pub fn into_component(self) -> ComponentResult {
        let mut breakdown = ScoreBreakdown::new(0.0);
        breakdown.add("External", "external sub-score", self.external_risk.score);
        breakdown.add("Internal", "internal sub-score", self.internal_risk.score);
        ComponentResult {
            score: DomainScore {
                value: self.emf_score,
                level: self.level,
                breakdown,
            },
            recommendations: self.recommendations,
        }
    }
}

const EXTERNAL_ADVICE: &[&str] = &[
    "Apply EMF shielding paint or window film on walls facing external sources",
    "Place bedrooms on the side of the home farthest from external sources",
];

const INTERNAL_ADVICE: &[&str] = &["Reduce the number of always-on wireless devices"];

const EMF_BASELINE: &[&str] = &[
    "Keep devices in airplane mode when not in use",
    "Use wired Ethernet connections where practical",
    "Keep phones and tablets at arm's length during use",
];

fn hotspots(request: &EmfRequest, config: &EmfConfig) -> Vec<String> {
    let mut spots = Vec::new();
    for source in &request.nearby_sources {
        if let Some(exposure) = external_exposure(source, config) {
            if exposure >= config.hotspot_exposure {
                spots.push(format!(
                    "{} at {}m (exposure {:.0})",
                    source.kind.label(),
                    source.distance,
                    exposure
                ));
            }
        }
    }
    for source in &request.internal_sources {
        if source.kind != InternalKind::Unknown && source.in_sleep_space() {
            let place = source.location_context.as_deref().unwrap_or("bedroom");
            spots.push(format!("{} in {}", source.kind.label(), place));
        }
    }
    spots
}

fn recommendations(
    request: &EmfRequest,
    external: &SubRisk,
    internal: &SubRisk,
    config: &EmfConfig,
) -> Vec<String> {
    let mut recs = Recommendations::new();
    let hot_external = |kind: ExternalKind| {
        request.nearby_sources.iter().any(|s| {
            s.kind == kind
                && external_exposure(s, config)
                    .map(|e| e >= config.hotspot_exposure)
                    .unwrap_or(false)
        })
    };
    let has_internal = |kind: InternalKind| request.internal_sources.iter().any(|s| s.kind == kind);

    recs.extend_if(external.level >= RiskLevel::High, EXTERNAL_ADVICE);
    recs.push_if(
        hot_external(ExternalKind::PowerLine) || hot_external(ExternalKind::Substation),
        "Have a professional measure magnetic fields from nearby power infrastructure",
    );
    recs.push_if(
        hot_external(ExternalKind::CellTower)
            || hot_external(ExternalKind::SmallCell5g)
            || hot_external(ExternalKind::BroadcastTower),
        "Measure RF levels near windows facing nearby antennas",
    );
    recs.extend_if(internal.level >= RiskLevel::High, INTERNAL_ADVICE);
    recs.push_if(
        request.internal_sources.iter().any(|s| s.kind != InternalKind::Unknown && s.in_sleep_space()),
        "Move wireless devices and electronics out of sleeping areas",
    );
    recs.push_if(
        has_internal(InternalKind::WifiRouter),
        "Put the Wi-Fi router on a timer that switches it off overnight",
    );
    recs.push_if(
        has_internal(InternalKind::ElectricBlanket),
        "Replace electric blankets with non-electric alternatives, or unplug before sleeping",
    );
    recs.push_if(
        has_internal(InternalKind::SmartMeter),
        "Ask the utility about relocating or shielding the smart meter",
    );
    recs.finish(EMF_BASELINE)
}

/// Full EMF assessment of a property.
pub fn assess_emf(request: &EmfRequest, config: &EmfConfig) -> EmfAssessment {
    let scorer = EmfScorer { config };
    let (external, internal) = scorer.sub_scores(request);
    let emf = scorer.score(request);

    let external_risk = SubRisk::new(external, request.nearby_sources.len());
    let internal_risk = SubRisk::new(internal, request.internal_sources.len());
    let recommendations = recommendations(request, &external_risk, &internal_risk, config);
    debug!(
        score = emf.value,
        external = external_risk.score,
        internal = internal_risk.score,
        "emf assessment complete"
    );

    EmfAssessment {
        emf_score: emf.value,
        grade: GENERAL.grade(emf.value),
        level: emf.level,
        hotspots: hotspots(request, config),
        external_risk,
        internal_risk,
        recommendations,
        professional_assessment_needed: needs_professional_review(emf.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{parse_request, RequestFormat};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn external(kind: ExternalKind, distance: f64) -> ExternalSource {
        ExternalSource {
            kind,
            distance,
            location_context: None,
        }
    }

    fn internal(kind: InternalKind, quantity: f64, place: Option<&str>) -> InternalSource {
        InternalSource {
            kind,
            quantity,
            location_context: place.map(str::to_string),
        }
    }

    #[test]
    fn test_empty_external_is_perfect() {
        let config = EmfConfig::default();
        let result = ExternalRiskScorer { config: &config }.score(&[]);
        assert_eq!(result.value, 100.0);
        assert_eq!(result.level, RiskLevel::Low);
    }

    #[test]
    fn test_empty_request_is_perfect() {
        let config = EmfConfig::default();
        let result = assess_emf(&EmfRequest::default(), &config);
        assert_eq!(result.emf_score, 100.0);
        assert_eq!(result.grade.label, "A+");
        assert!(result.hotspots.is_empty());
        assert!(!result.professional_assessment_needed);
        assert_eq!(result.recommendations, EMF_BASELINE);
    }

    #[test]
    fn test_external_decay_compounds() {
        let config = EmfConfig::default();
        let result = ExternalRiskScorer { config: &config }
            .score(&[external(ExternalKind::CellTower, 150.0)]);
        // 100 - (100 x 0.5 x 0.3 x 1.0)
        assert_eq!(result.value, 85.0);
    }

    #[test]
    fn test_close_substation_saturates_at_zero() {
        let config = EmfConfig::default();
        let result = ExternalRiskScorer { config: &config }
            .score(&[external(ExternalKind::Substation, 10.0)]);
        assert_eq!(result.value, 0.0);
        assert_eq!(result.level, RiskLevel::Extreme);
        assert_eq!(result.breakdown.current(), -50.0);
    }

    #[test]
    fn test_sleep_space_doubles_internal_weight() {
        let config = EmfConfig::default();
        let scorer = InternalRiskScorer { config: &config };
        let hallway = scorer.score(&[internal(InternalKind::WifiRouter, 1.0, Some("hallway"))]);
        let bedroom = scorer.score(&[internal(InternalKind::WifiRouter, 1.0, Some("Master Bedroom"))]);
        assert_eq!(hallway.value, 90.0);
        assert_eq!(bedroom.value, 80.0);
    }

    #[test]
    fn test_unknown_sources_are_ignored() {
        let config = EmfConfig::default();
        let yaml = r#"
nearbySources:
  - type: cellTower
    distance: 150
  - type: alienBeacon
    distance: 1
internalSources:
  - type: toaster
    quantity: 4
"#;
        let request: EmfRequest = parse_request(yaml, RequestFormat::Yaml).unwrap();
        assert_eq!(request.nearby_sources[1].kind, ExternalKind::Unknown);

        let with_unknown = assess_emf(&request, &config);
        let mut clean = request.clone();
        clean.nearby_sources.truncate(1);
        clean.internal_sources.clear();
        let without = assess_emf(&clean, &config);
        assert_eq!(with_unknown.emf_score, without.emf_score);
    }

    #[test]
    fn test_weighted_emf_score_and_hotspots() {
        let config = EmfConfig::default();
        let request = EmfRequest {
            nearby_sources: vec![external(ExternalKind::PowerLine, 40.0)],
            internal_sources: vec![
                internal(InternalKind::WifiRouter, 1.0, Some("bedroom")),
                internal(InternalKind::SmartMeter, 1.0, None),
            ],
        };
        let result = assess_emf(&request, &config);
        // external: 100 - 120 -> 0; internal: 100 - 20 - 15 = 65
        assert_eq!(result.external_risk.score, 0.0);
        assert_eq!(result.internal_risk.score, 65.0);
        // round(0.6 x 0 + 0.4 x 65) = 26
        assert_eq!(result.emf_score, 26.0);
        assert_eq!(result.level, RiskLevel::Extreme);
        assert_eq!(result.grade.label, "D");
        assert!(result.professional_assessment_needed);
        assert_eq!(
            result.hotspots,
            vec!["Power line at 40m (exposure 120)", "Wi-Fi router in bedroom"]
        );
        assert_eq!(result.recommendations[0], EXTERNAL_ADVICE[0]);
        assert_eq!(
            result.recommendations.last().map(String::as_str),
            EMF_BASELINE.last().copied()
        );
    }

    #[test]
    fn test_negative_distance_rejected_at_boundary() {
        let json = r#"{"nearbySources": [{"type": "cellTower", "distance": -3}]}"#;
        let result: crate::error::Result<EmfRequest> = parse_request(json, RequestFormat::Json);
        assert!(result.is_err());
    }

    #[test]
    fn test_assessment_is_idempotent() {
        let config = EmfConfig::default();
        let request = EmfRequest {
            nearby_sources: vec![external(ExternalKind::CellTower, 80.0)],
            internal_sources: vec![internal(InternalKind::ElectricBlanket, 1.0, Some("bedroom"))],
        };
        let a = serde_json::to_string(&assess_emf(&request, &config)).unwrap();
        let b = serde_json::to_string(&assess_emf(&request, &config)).unwrap();
        assert_eq!(a, b);
    }

    proptest! {
        #[test]
        fn prop_emf_score_is_bounded(
            distances in proptest::collection::vec(0.0f64..5000.0, 0..8),
            quantities in proptest::collection::vec(0.0f64..10.0, 0..8),
        ) {
            let config = EmfConfig::default();
            let request = EmfRequest {
                nearby_sources: distances.iter().map(|d| external(ExternalKind::PowerLine, *d)).collect(),
                internal_sources: quantities.iter().map(|q| internal(InternalKind::WifiRouter, *q, Some("bedroom"))).collect(),
            };
            let result = assess_emf(&request, &config);
            prop_assert!((0.0..=100.0).contains(&result.emf_score));
            prop_assert!((0.0..=100.0).contains(&result.external_risk.score));
            prop_assert!((0.0..=100.0).contains(&result.internal_risk.score));
            prop_assert!(!result.recommendations.is_empty());
        }
    }
}
