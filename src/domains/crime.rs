use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::data_source::DataSource;
use crate::error::{DataSourceError, FieldViolation};
use crate::request::{check_non_negative, check_positive, field, indexed, Validate};
use crate::scoring::composite::ComponentResult;
use crate::scoring::engine::{DomainScore, RiskLevel, ScoreBreakdown, Scorer};
use crate::scoring::grade::CRIME_SAFETY;
use crate::scoring::normalize::rate_per_thousand;
use crate::scoring::{CrimeConfig, Recommendations};

/// Largest heatmap grid a request may ask for.
pub const MAX_HEATMAP_RESOLUTION: usize = 50;
pub const DEFAULT_HEATMAP_RESOLUTION: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CrimeCategory {
    ViolentCrimeCategory,
    PropertyCrimeCategory,
    OtherCrimeCategory,
    #[serde(other)]
    Unknown,
}

impl CrimeCategory {
    pub fn label(&self) -> &'static str {
        match self {
            CrimeCategory::ViolentCrimeCategory => "Violent crime",
            CrimeCategory::PropertyCrimeCategory => "Property crime",
            CrimeCategory::OtherCrimeCategory => "Other crime",
            CrimeCategory::Unknown => "Unknown",
        }
    }
}

fn default_quantity() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrimeIncident {
    #[serde(rename = "type")]
    pub category: CrimeCategory,
    #[serde(default = "default_quantity")]
    pub quantity: f64,
    #[serde(default)]
    pub location_context: Option<String>,
}

impl CrimeIncident {
    pub fn is_residential(&self) -> bool {
        self.location_context
            .as_deref()
            .map(|c| c.to_ascii_lowercase().contains("residential"))
            .unwrap_or(false)
    }
}

/// Incidents and resident count for an area.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrimeReport {
    pub incidents: Vec<CrimeIncident>,
    pub population: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrimeRequest {
    pub location: String,
    /// Search radius in miles
    pub radius: f64,
    /// Recorded incidents; fetched from the data source when absent
    #[serde(default)]
    pub incidents: Option<Vec<CrimeIncident>>,
    #[serde(default)]
    pub population: Option<f64>,
}

impl Validate for CrimeRequest {
    fn validate(&self, prefix: &str, out: &mut Vec<FieldViolation>) {
        if self.location.trim().is_empty() {
            out.push(FieldViolation::new(field(prefix, "location"), "must not be empty"));
        }
        check_positive(out, field(prefix, "radius"), self.radius);
        if let Some(population) = self.population {
            check_non_negative(out, field(prefix, "population"), population);
        }
        if let Some(incidents) = &self.incidents {
            if self.population.is_none() {
                out.push(FieldViolation::new(
                    field(prefix, "population"),
                    "is required when incidents are supplied",
                ));
            }
            for (i, incident) in incidents.iter().enumerate() {
                let path = indexed(prefix, "incidents", i);
                check_non_negative(out, field(&path, "quantity"), incident.quantity);
            }
        }
    }
}

pub struct CrimeScorer<'a> {
    pub config: &'a CrimeConfig,
}

impl CrimeScorer<'_> {
    fn weight(&self, category: CrimeCategory) -> Option<f64> {
        match category {
            CrimeCategory::ViolentCrimeCategory => Some(self.config.violent_weight),
            CrimeCategory::PropertyCrimeCategory => Some(self.config.property_weight),
            CrimeCategory::OtherCrimeCategory => Some(self.config.other_weight),
            CrimeCategory::Unknown => None,
        }
    }
}

impl Scorer for CrimeScorer<'_> {
    type Input = CrimeReport;

    fn compute_raw_risk(&self, report: &CrimeReport) -> ScoreBreakdown {
        let mut breakdown = ScoreBreakdown::new(100.0);
        for incident in &report.incidents {
            let Some(weight) = self.weight(incident.category) else {
                trace!("skipping unknown crime category");
                continue;
            };
            let rate = rate_per_thousand(incident.quantity, report.population);
            let (multiplier, place) = if incident.is_residential() {
                (self.config.residential_multiplier, "residential")
            } else {
                (1.0, "non-residential")
            };
            let points = weight * rate * multiplier;
            breakdown.add(
                incident.category.label(),
                format!("{} incidents ({}), {:.2} per 1,000", incident.quantity, place, rate),
                -points,
            );
        }
        breakdown
    }

    fn classify(&self, value: f64) -> RiskLevel {
        self.config.levels.classify(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCounts {
    pub violent: f64,
    pub property: f64,
    pub other: f64,
}

impl CategoryCounts {
    fn tally(incidents: &[CrimeIncident]) -> Self {
        let mut counts = Self::default();
        for incident in incidents {
            match incident.category {
                CrimeCategory::ViolentCrimeCategory => counts.violent += incident.quantity,
                CrimeCategory::PropertyCrimeCategory => counts.property += incident.quantity,
                CrimeCategory::OtherCrimeCategory => counts.other += incident.quantity,
                CrimeCategory::Unknown => {}
            }
        }
        counts
    }

    pub fn total(&self) -> f64 {
        self.violent + self.property + self.other
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyScore {
    pub score: f64,
    pub grade: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrimeAssessment {
    pub location: String,
    pub radius: f64,
    pub total_crimes: f64,
    pub crime_rate: f64,
    pub breakdown: CategoryCounts,
    pub safety_score: SafetyScore,
    pub compared_to_national: String,
    pub level: RiskLevel,
    pub recommendations: Vec<String>,
    pub simulated: bool,
    #[serde(skip)]
    pub score_breakdown: ScoreBreakdown,
}

impl CrimeAssessment {
    pub fn into_component(self) -> ComponentResult {
        ComponentResult {
            score: DomainScore {
                value: self.safety_score.score,
                level: self.level,
                breakdown: self.score_breakdown,
            },
            recommendations: self.recommendations,
        }
    }
}

/// Describe a rate relative to the national one, in whole percent.
pub fn compared_to_national(rate: f64, national_rate: f64) -> String {
    let percent = ((rate - national_rate) / national_rate * 100.0).round();
    if percent < 0.0 {
        format!("{}% below national average", -percent)
    } else if percent > 0.0 {
        format!("{}% above national average", percent)
    } else {
        "At national average".to_string()
    }
}

const CRIME_BASELINE: &[&str] = &[
    "Review local crime statistics periodically",
    "Get to know your neighbors",
];

const HIGH_CRIME_ADVICE: &[&str] = &[
    "Visit the area at different times of day before committing",
    "Ask local police about recent incident trends",
];

fn recommendations(
    report: &CrimeReport,
    counts: &CategoryCounts,
    level: RiskLevel,
) -> Vec<String> {
    let mut recs = Recommendations::new();
    recs.extend_if(level == RiskLevel::High, HIGH_CRIME_ADVICE);
    recs.push_if(
        counts.violent > 0.0 && level >= RiskLevel::Moderate,
        "Install a monitored security system",
    );
    recs.push_if(
        counts.property > 0.0,
        "Fit deadbolts, window locks and motion-sensor lighting",
    );
    recs.push_if(
        report
            .incidents
            .iter()
            .any(|i| i.category != CrimeCategory::Unknown && i.is_residential()),
        "Join or start a neighborhood watch group",
    );
    recs.finish(CRIME_BASELINE)
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Score a crime report that is already in hand.
pub fn assess_report(
    location: &str,
    radius: f64,
    report: &CrimeReport,
    simulated: bool,
    config: &CrimeConfig,
) -> CrimeAssessment {
    let scored = CrimeScorer { config }.score(report);
    let counts = CategoryCounts::tally(&report.incidents);
    let total = counts.total();
    let crime_rate = round_to(rate_per_thousand(total, report.population), 1);
    let grade = CRIME_SAFETY.grade(scored.value);
    debug!(
        location,
        score = scored.value,
        rate = crime_rate,
        simulated,
        "crime assessment complete"
    );

    CrimeAssessment {
        location: location.to_string(),
        radius,
        total_crimes: total,
        crime_rate,
        compared_to_national: compared_to_national(crime_rate, config.national_rate),
        recommendations: recommendations(report, &counts, scored.level),
        breakdown: counts,
        safety_score: SafetyScore {
            score: scored.value,
            grade: grade.label,
            description: grade.description,
        },
        level: scored.level,
        simulated,
        score_breakdown: scored.breakdown,
    }
}

/// Assess neighborhood safety, fetching incidents from `source` when the
/// request does not carry them. Supplied incidents without a population are
/// kept and rated against a population of zero.
pub fn assess_crime(
    request: &CrimeRequest,
    config: &CrimeConfig,
    source: &mut dyn DataSource,
) -> Result<CrimeAssessment, DataSourceError> {
    match (&request.incidents, request.population) {
        (Some(incidents), Some(population)) => {
            let report = CrimeReport {
                incidents: incidents.clone(),
                population,
            };
            Ok(assess_report(&request.location, request.radius, &report, false, config))
        }
        (Some(incidents), None) => {
            warn!(location = %request.location, "incidents supplied without population");
            let report = CrimeReport {
                incidents: incidents.clone(),
                population: 0.0,
            };
            Ok(assess_report(&request.location, request.radius, &report, false, config))
        }
        (None, _) => {
            let report = source.crime_report(&request.location, request.radius)?;
            Ok(assess_report(
                &request.location,
                request.radius,
                &report,
                source.is_simulated(),
                config,
            ))
        }
    }
}

fn default_resolution() -> usize {
    DEFAULT_HEATMAP_RESOLUTION
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapRequest {
    pub location: String,
    pub radius: f64,
    #[serde(default = "default_resolution")]
    pub resolution: usize,
}

impl Validate for HeatmapRequest {
    fn validate(&self, prefix: &str, out: &mut Vec<FieldViolation>) {
        if self.location.trim().is_empty() {
            out.push(FieldViolation::new(field(prefix, "location"), "must not be empty"));
        }
        check_positive(out, field(prefix, "radius"), self.radius);
        if !(1..=MAX_HEATMAP_RESOLUTION).contains(&self.resolution) {
            out.push(FieldViolation::new(
                field(prefix, "resolution"),
                format!("must be between 1 and {}", MAX_HEATMAP_RESOLUTION),
            ));
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapCell {
    pub row: usize,
    pub col: usize,
    pub intensity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapAssessment {
    pub location: String,
    pub radius: f64,
    pub resolution: usize,
    /// Row-major intensities in [0, 1]
    pub grid: Vec<Vec<f64>>,
    pub hotspots: Vec<HeatmapCell>,
    pub simulated: bool,
}

pub fn assess_heatmap(
    request: &HeatmapRequest,
    config: &CrimeConfig,
    source: &mut dyn DataSource,
) -> Result<HeatmapAssessment, DataSourceError> {
    let raw = source.crime_heatmap(&request.location, request.radius, request.resolution)?;
    let grid: Vec<Vec<f64>> = raw
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|v| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) })
                .collect()
        })
        .collect();

    let hotspots = grid
        .iter()
        .enumerate()
        .flat_map(|(row, cells)| {
            cells.iter().enumerate().filter_map(move |(col, &intensity)| {
                (intensity >= config.heatmap_hotspot).then_some(HeatmapCell { row, col, intensity })
            })
        })
        .collect::<Vec<_>>();
    debug!(
        location = %request.location,
        hotspots = hotspots.len(),
        "heatmap built"
    );

    Ok(HeatmapAssessment {
        location: request.location.clone(),
        radius: request.radius,
        resolution: request.resolution,
        grid,
        hotspots,
        simulated: source.is_simulated(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::{LiveDataSource, SyntheticDataSource};
    use crate::request::{parse_request, RequestFormat};
    use crate::error::RiskError;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn incident(category: CrimeCategory, quantity: f64, place: Option<&str>) -> CrimeIncident {
        CrimeIncident {
            category,
            quantity,
            location_context: place.map(str::to_string),
        }
    }

    fn request(incidents: Vec<CrimeIncident>, population: f64) -> CrimeRequest {
        CrimeRequest {
            location: "Springfield".to_string(),
            radius: 1.0,
            incidents: Some(incidents),
            population: Some(population),
        }
    }

    #[test]
    fn test_no_incidents_is_perfectly_safe() {
        let config = CrimeConfig::default();
        let mut source = LiveDataSource;
        let result = assess_crime(&request(vec![], 10_000.0), &config, &mut source).unwrap();
        assert_eq!(result.safety_score.score, 100.0);
        assert_eq!(result.safety_score.grade, "A");
        assert_eq!(result.safety_score.description, "Very Safe");
        assert_eq!(result.level, RiskLevel::Low);
        assert_eq!(result.compared_to_national, "100% below national average");
        assert!(!result.simulated);
        assert_eq!(result.recommendations, CRIME_BASELINE);
    }

    #[test]
    fn test_weighted_rates_and_residential_multiplier() {
        let config = CrimeConfig::default();
        let mut source = LiveDataSource;
        let req = request(
            vec![
                // 5 per 1,000 x 4.0 = 20
                incident(CrimeCategory::ViolentCrimeCategory, 50.0, None),
                // 10 per 1,000 x 1.5 x 1.5 = 22.5
                incident(CrimeCategory::PropertyCrimeCategory, 100.0, Some("Residential")),
            ],
            10_000.0,
        );
        let result = assess_crime(&req, &config, &mut source).unwrap();
        // round(100 - 42.5) = 58
        assert_eq!(result.safety_score.score, 58.0);
        assert_eq!(result.safety_score.grade, "C");
        assert_eq!(result.level, RiskLevel::Moderate);
        assert_eq!(result.total_crimes, 150.0);
        assert_eq!(result.crime_rate, 15.0);
        assert_eq!(result.breakdown.violent, 50.0);
        assert_eq!(result.breakdown.property, 100.0);
        assert_eq!(result.compared_to_national, "37% below national average");
        assert_eq!(
            result.recommendations[..3],
            [
                "Install a monitored security system",
                "Fit deadbolts, window locks and motion-sensor lighting",
                "Join or start a neighborhood watch group",
            ]
        );
    }

    #[test]
    fn test_unknown_category_is_ignored() {
        let config = CrimeConfig::default();
        let mut source = LiveDataSource;
        let with_unknown = request(
            vec![
                incident(CrimeCategory::OtherCrimeCategory, 20.0, None),
                incident(CrimeCategory::Unknown, 500.0, Some("residential")),
            ],
            1_000.0,
        );
        let without = request(vec![incident(CrimeCategory::OtherCrimeCategory, 20.0, None)], 1_000.0);
        let a = assess_crime(&with_unknown, &config, &mut source).unwrap();
        let b = assess_crime(&without, &config, &mut source).unwrap();
        assert_eq!(a.safety_score, b.safety_score);
        assert_eq!(a.total_crimes, 20.0);
    }

    #[test]
    fn test_high_crime_area() {
        let config = CrimeConfig::default();
        let mut source = LiveDataSource;
        let req = request(vec![incident(CrimeCategory::ViolentCrimeCategory, 300.0, None)], 10_000.0);
        let result = assess_crime(&req, &config, &mut source).unwrap();
        // 30 per 1,000 x 4 = 120 points
        assert_eq!(result.safety_score.score, 0.0);
        assert_eq!(result.safety_score.grade, "F");
        assert_eq!(result.level, RiskLevel::High);
        assert_eq!(result.compared_to_national, "27% above national average");
        assert_eq!(result.recommendations[0], HIGH_CRIME_ADVICE[0]);
    }

    #[test]
    fn test_zero_population_yields_zero_rate() {
        let config = CrimeConfig::default();
        let mut source = LiveDataSource;
        let req = request(vec![incident(CrimeCategory::ViolentCrimeCategory, 5.0, None)], 0.0);
        let result = assess_crime(&req, &config, &mut source).unwrap();
        assert_eq!(result.crime_rate, 0.0);
        assert_eq!(result.safety_score.score, 100.0);
    }

    #[test]
    fn test_compared_to_national() {
        assert_eq!(compared_to_national(23.7, 23.7), "At national average");
        assert_eq!(compared_to_national(11.85, 23.7), "50% below national average");
        assert_eq!(compared_to_national(47.4, 23.7), "100% above national average");
    }

    #[test]
    fn test_missing_incidents_use_data_source() {
        let config = CrimeConfig::default();
        let req = CrimeRequest {
            location: "Springfield".to_string(),
            radius: 2.0,
            incidents: None,
            population: None,
        };

        let mut live = LiveDataSource;
        assert!(matches!(
            assess_crime(&req, &config, &mut live),
            Err(DataSourceError::NotConfigured { .. })
        ));

        let a = assess_crime(&req, &config, &mut SyntheticDataSource::new(7)).unwrap();
        let b = assess_crime(&req, &config, &mut SyntheticDataSource::new(7)).unwrap();
        assert!(a.simulated);
        assert_eq!(a, b);
        assert!((0.0..=100.0).contains(&a.safety_score.score));
    }

    #[test]
    fn test_supplied_incidents_kept_without_population() {
        let config = CrimeConfig::default();
        let req = CrimeRequest {
            population: None,
            ..request(vec![incident(CrimeCategory::PropertyCrimeCategory, 4.0, None)], 0.0)
        };
        let result = assess_crime(&req, &config, &mut SyntheticDataSource::new(7)).unwrap();
        assert_eq!(result.total_crimes, 4.0);
        assert_eq!(result.crime_rate, 0.0);
        assert!(!result.simulated);
        // Never reaches the data source
        assert!(assess_crime(&req, &config, &mut LiveDataSource).is_ok());
    }

    #[test]
    fn test_incidents_without_population_rejected() {
        let yaml = r#"
location: Springfield
radius: 1
incidents:
  - type: violentCrimeCategory
    quantity: 3
"#;
        let result: crate::error::Result<CrimeRequest> = parse_request(yaml, RequestFormat::Yaml);
        match result {
            Err(RiskError::Validation { violations }) => {
                assert_eq!(violations[0].field, "population");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_heatmap_hotspots() {
        let config = CrimeConfig::default();
        let req = HeatmapRequest {
            location: "Springfield".to_string(),
            radius: 1.0,
            resolution: 6,
        };
        let result = assess_heatmap(&req, &config, &mut SyntheticDataSource::new(42)).unwrap();
        assert_eq!(result.grid.len(), 6);
        assert!(result.grid.iter().all(|row| row.len() == 6));
        assert!(result
            .grid
            .iter()
            .flatten()
            .all(|v| (0.0..=1.0).contains(v)));
        for cell in &result.hotspots {
            assert!(cell.intensity >= 0.7);
            assert_eq!(result.grid[cell.row][cell.col], cell.intensity);
        }
        assert!(result.simulated);
    }

    #[test]
    fn test_heatmap_resolution_bounds() {
        let json = r#"{"location": "Springfield", "radius": 1, "resolution": 0}"#;
        let result: crate::error::Result<HeatmapRequest> = parse_request(json, RequestFormat::Json);
        assert!(result.is_err());
        let json = r#"{"location": "Springfield", "radius": 1}"#;
        let req: HeatmapRequest = parse_request(json, RequestFormat::Json).unwrap();
        assert_eq!(req.resolution, DEFAULT_HEATMAP_RESOLUTION);
    }

    fn any_incident() -> impl Strategy<Value = CrimeIncident> {
        let categories = vec![
            CrimeCategory::ViolentCrimeCategory,
            CrimeCategory::PropertyCrimeCategory,
            CrimeCategory::OtherCrimeCategory,
            CrimeCategory::Unknown,
        ];
        (
            proptest::sample::select(categories),
            0.0f64..500.0,
            proptest::option::of(proptest::sample::select(vec!["residential", "commercial"])),
        )
            .prop_map(|(category, quantity, place)| incident(category, quantity, place))
    }

    proptest! {
        #[test]
        fn prop_crime_score_is_bounded(
            incidents in proptest::collection::vec(any_incident(), 0..12),
            population in prop_oneof![Just(0.0f64), 1.0f64..1_000_000.0],
        ) {
            let config = CrimeConfig::default();
            let req = request(incidents, population);
            let first = assess_crime(&req, &config, &mut LiveDataSource).unwrap();
            prop_assert!((0.0..=100.0).contains(&first.safety_score.score));
            prop_assert!(first.crime_rate >= 0.0);
            prop_assert!(!first.recommendations.is_empty());

            let second = assess_crime(&req, &config, &mut LiveDataSource).unwrap();
            prop_assert_eq!(
                serde_json::to_string(&first).unwrap(),
                serde_json::to_string(&second).unwrap()
            );
        }
    }
}
