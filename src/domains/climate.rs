//! Climate-change risk: five rule-based hazards projected under an SSP
//! emissions scenario, plus region, investment, insurance and adaptation
//! summaries.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::data_source::DataSource;
use crate::error::{DataSourceError, FieldViolation};
use crate::request::{check_non_negative, check_unit_interval, field, Validate};
use crate::scoring::composite::ComponentResult;
use crate::scoring::engine::{bound_score, DomainScore, RiskLevel, ScoreBreakdown, Scorer};
use crate::scoring::grade::{CLIMATE, CLIMATE_INSURANCE, CLIMATE_INVESTMENT};
use crate::scoring::{ClimateConfig, Recommendations};

/// Years with published projections, in ascending order.
pub const PROJECTION_YEARS: [u16; 4] = [2030, 2050, 2070, 2100];

const BASE_PREMIUM: f64 = 50_000.0;

/// IPCC shared socioeconomic pathways.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Scenario {
    #[serde(rename = "SSP1-1.9")]
    Ssp119,
    #[serde(rename = "SSP1-2.6")]
    Ssp126,
    #[serde(rename = "SSP2-4.5")]
    Ssp245,
    #[serde(rename = "SSP3-7.0")]
    Ssp370,
    #[serde(rename = "SSP5-8.5")]
    Ssp585,
}

impl Scenario {
    pub fn code(&self) -> &'static str {
        match self {
            Scenario::Ssp119 => "SSP1-1.9",
            Scenario::Ssp126 => "SSP1-2.6",
            Scenario::Ssp245 => "SSP2-4.5",
            Scenario::Ssp370 => "SSP3-7.0",
            Scenario::Ssp585 => "SSP5-8.5",
        }
    }

    pub fn pathway(&self) -> &'static str {
        match self {
            Scenario::Ssp119 | Scenario::Ssp126 => "Sustainability",
            Scenario::Ssp245 => "Middle Road",
            Scenario::Ssp370 => "Regional Rivalry",
            Scenario::Ssp585 => "Fossil Development",
        }
    }

    /// Warming in °C over the pre-industrial baseline, per projection year.
    fn temperature_table(&self) -> [f64; 4] {
        match self {
            Scenario::Ssp119 => [0.5, 1.0, 1.2, 1.4],
            Scenario::Ssp126 => [0.6, 1.2, 1.5, 1.8],
            Scenario::Ssp245 => [0.7, 1.5, 2.1, 2.7],
            Scenario::Ssp370 => [0.8, 1.8, 2.8, 3.6],
            Scenario::Ssp585 => [0.9, 2.2, 3.4, 4.4],
        }
    }

    /// Global mean sea-level rise in millimeters, per projection year.
    fn sea_level_table(&self) -> [f64; 4] {
        match self {
            Scenario::Ssp119 => [100.0, 200.0, 300.0, 400.0],
            Scenario::Ssp126 => [110.0, 240.0, 380.0, 520.0],
            Scenario::Ssp245 => [120.0, 280.0, 450.0, 660.0],
            Scenario::Ssp370 => [130.0, 320.0, 550.0, 830.0],
            Scenario::Ssp585 => [140.0, 360.0, 650.0, 1010.0],
        }
    }

    /// Projected warming for `year`; years outside the table assume 2°C.
    pub fn temp_increase(&self, year: u16) -> f64 {
        projection_index(year)
            .map(|i| self.temperature_table()[i])
            .unwrap_or(2.0)
    }

    /// Projected sea-level rise for `year`; years outside the table assume 500mm.
    pub fn sea_level_rise_mm(&self, year: u16) -> f64 {
        projection_index(year)
            .map(|i| self.sea_level_table()[i])
            .unwrap_or(500.0)
    }
}

fn projection_index(year: u16) -> Option<usize> {
    PROJECTION_YEARS.iter().position(|y| *y == year)
}

/// FEMA flood insurance rate map zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FemaZone {
    A,
    Ae,
    Ah,
    Ao,
    V,
    Ve,
    X,
    B,
    C,
    #[serde(other)]
    Unknown,
}

impl FemaZone {
    /// Flood risk before any site adjustment.
    pub fn base_risk(&self) -> f64 {
        match self {
            FemaZone::A => 80.0,
            FemaZone::Ae => 75.0,
            FemaZone::Ah => 70.0,
            FemaZone::Ao => 65.0,
            FemaZone::V => 90.0,
            FemaZone::Ve => 85.0,
            FemaZone::X => 20.0,
            FemaZone::B => 30.0,
            FemaZone::C => 15.0,
            FemaZone::Unknown => 50.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Region {
    CoastalWest,
    CoastalEast,
    Himalayan,
    SouthernPlateau,
    Desert,
    NorthernPlains,
}

impl Region {
    pub fn classify(site: &Site) -> Region {
        if site.distance_to_coast < 50.0 {
            if site.longitude < 77.0 {
                Region::CoastalWest
            } else {
                Region::CoastalEast
            }
        } else if site.elevation > 1500.0 {
            Region::Himalayan
        } else if site.latitude < 20.0 && site.elevation > 300.0 {
            Region::SouthernPlateau
        } else if site.rainfall < 400.0 {
            Region::Desert
        } else {
            Region::NorthernPlains
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Region::CoastalWest => "Coastal (west)",
            Region::CoastalEast => "Coastal (east)",
            Region::Himalayan => "Himalayan",
            Region::SouthernPlateau => "Southern plateau",
            Region::Desert => "Desert",
            Region::NorthernPlains => "Northern plains",
        };
        f.write_str(label)
    }
}

/// Site observations needed by the hazard rules.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClimateObservations {
    pub fema_zone: FemaZone,
    pub fires_last_10_years: u32,
    /// NDVI, -1 to 1
    pub vegetation_index: f64,
    /// Degrees
    pub terrain_slope: f64,
    pub hurricanes_last_20_years: u32,
    pub major_hurricanes: u32,
    /// Current days per year above 35°C
    pub extreme_heat_days: f64,
    /// Current yearly drought probability
    pub drought_probability: f64,
    /// Meters to the nearest river or lake
    pub water_body_distance: f64,
}

/// Fixed location attributes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
    pub distance_to_coast: f64,
    pub rainfall: f64,
}

fn default_elevation() -> f64 {
    100.0
}

fn default_distance_to_coast() -> f64 {
    100.0
}

fn default_rainfall() -> f64 {
    800.0
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClimateRequest {
    pub latitude: f64,
    pub longitude: f64,
    /// Meters above sea level
    #[serde(default = "default_elevation")]
    pub elevation: f64,
    /// Kilometers
    #[serde(default = "default_distance_to_coast")]
    pub distance_to_coast: f64,
    /// Millimeters per year
    #[serde(default = "default_rainfall")]
    pub rainfall: f64,

    #[serde(default)]
    pub fema_zone: Option<FemaZone>,
    #[serde(default)]
    pub fires_last_10_years: Option<u32>,
    #[serde(default)]
    pub vegetation_index: Option<f64>,
    #[serde(default)]
    pub terrain_slope: Option<f64>,
    #[serde(default)]
    pub hurricanes_last_20_years: Option<u32>,
    #[serde(default)]
    pub major_hurricanes: Option<u32>,
    #[serde(default)]
    pub extreme_heat_days: Option<f64>,
    #[serde(default)]
    pub drought_probability: Option<f64>,
    #[serde(default)]
    pub water_body_distance: Option<f64>,

    #[serde(default)]
    pub solar_panels: bool,
    #[serde(default)]
    pub rainwater_harvesting: bool,
    #[serde(default)]
    pub elevated_construction: bool,

    #[serde(default)]
    pub scenario: Option<Scenario>,
    #[serde(default)]
    pub horizon: Option<u16>,
}

impl ClimateRequest {
    pub fn site(&self) -> Site {
        Site {
            latitude: self.latitude,
            longitude: self.longitude,
            elevation: self.elevation,
            distance_to_coast: self.distance_to_coast,
            rainfall: self.rainfall,
        }
    }

    /// Observations taken entirely from the request, when every one was supplied.
    pub fn supplied_observations(&self) -> Option<ClimateObservations> {
        Some(ClimateObservations {
            fema_zone: self.fema_zone?,
            fires_last_10_years: self.fires_last_10_years?,
            vegetation_index: self.vegetation_index?,
            terrain_slope: self.terrain_slope?,
            hurricanes_last_20_years: self.hurricanes_last_20_years?,
            major_hurricanes: self.major_hurricanes?,
            extreme_heat_days: self.extreme_heat_days?,
            drought_probability: self.drought_probability?,
            water_body_distance: self.water_body_distance?,
        })
    }

    /// Supplied observations win; the rest come from `fallback`.
    pub fn observations_over(&self, fallback: ClimateObservations) -> ClimateObservations {
        ClimateObservations {
            fema_zone: self.fema_zone.unwrap_or(fallback.fema_zone),
            fires_last_10_years: self.fires_last_10_years.unwrap_or(fallback.fires_last_10_years),
            vegetation_index: self.vegetation_index.unwrap_or(fallback.vegetation_index),
            terrain_slope: self.terrain_slope.unwrap_or(fallback.terrain_slope),
            hurricanes_last_20_years: self
                .hurricanes_last_20_years
                .unwrap_or(fallback.hurricanes_last_20_years),
            major_hurricanes: self.major_hurricanes.unwrap_or(fallback.major_hurricanes),
            extreme_heat_days: self.extreme_heat_days.unwrap_or(fallback.extreme_heat_days),
            drought_probability: self.drought_probability.unwrap_or(fallback.drought_probability),
            water_body_distance: self.water_body_distance.unwrap_or(fallback.water_body_distance),
        }
    }
}

impl Validate for ClimateRequest {
    fn validate(&self, prefix: &str, out: &mut Vec<FieldViolation>) {
        if !(-90.0..=90.0).contains(&self.latitude) {
            out.push(FieldViolation::new(field(prefix, "latitude"), "must be between -90 and 90"));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            out.push(FieldViolation::new(
                field(prefix, "longitude"),
                "must be between -180 and 180",
            ));
        }
        if !self.elevation.is_finite() {
            out.push(FieldViolation::new(field(prefix, "elevation"), "must be a finite number"));
        }
        check_non_negative(out, field(prefix, "distanceToCoast"), self.distance_to_coast);
        check_non_negative(out, field(prefix, "rainfall"), self.rainfall);
        if let Some(ndvi) = self.vegetation_index {
            if !(-1.0..=1.0).contains(&ndvi) {
                out.push(FieldViolation::new(
                    field(prefix, "vegetationIndex"),
                    "must be between -1 and 1",
                ));
            }
        }
        if let Some(slope) = self.terrain_slope {
            check_non_negative(out, field(prefix, "terrainSlope"), slope);
        }
        if let Some(days) = self.extreme_heat_days {
            if !(0.0..=366.0).contains(&days) {
                out.push(FieldViolation::new(
                    field(prefix, "extremeHeatDays"),
                    "must be between 0 and 366",
                ));
            }
        }
        if let Some(p) = self.drought_probability {
            check_unit_interval(out, field(prefix, "droughtProbability"), p);
        }
        if let Some(distance) = self.water_body_distance {
            check_non_negative(out, field(prefix, "waterBodyDistance"), distance);
        }
        if let Some(horizon) = self.horizon {
            if !PROJECTION_YEARS.contains(&horizon) {
                out.push(FieldViolation::new(
                    field(prefix, "horizon"),
                    format!("must be one of {:?}", PROJECTION_YEARS),
                ));
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Hazard {
    Flood,
    Wildfire,
    Hurricane,
    ExtremeHeat,
    Drought,
}

impl fmt::Display for Hazard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Hazard::Flood => "Flood",
            Hazard::Wildfire => "Wildfire",
            Hazard::Hurricane => "Hurricane",
            Hazard::ExtremeHeat => "Extreme heat",
            Hazard::Drought => "Drought",
        };
        f.write_str(label)
    }
}

/// Everything the hazard rules read, fully resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ClimateInputs {
    pub site: Site,
    pub observations: ClimateObservations,
    pub scenario: Scenario,
    pub year: u16,
}

impl ClimateInputs {
    fn at_year(&self, year: u16) -> Self {
        Self {
            year,
            ..self.clone()
        }
    }

    fn temp_increase(&self) -> f64 {
        self.scenario.temp_increase(self.year)
    }

    /// Local sea-level rise in centimeters; sites over 100km inland see none.
    fn sea_level_rise_cm(&self) -> f64 {
        if self.site.distance_to_coast > 100.0 {
            0.0
        } else {
            self.scenario.sea_level_rise_mm(self.year) / 10.0
        }
    }

    fn projected_drought_probability(&self) -> f64 {
        (self.observations.drought_probability * (1.0 + self.temp_increase() * 0.15)).min(1.0)
    }

    fn projected_heat_days(&self) -> f64 {
        self.observations.extreme_heat_days * (1.0 + self.temp_increase() * 0.5).powi(2)
    }
}

pub fn flood_risk(inputs: &ClimateInputs) -> ScoreBreakdown {
    let obs = &inputs.observations;
    let mut risk = ScoreBreakdown::new(obs.fema_zone.base_risk());

    let elevation = inputs.site.elevation;
    if elevation < 10.0 {
        risk.add("Elevation", format!("{}m, very low-lying", elevation), 20.0);
    } else if elevation < 50.0 {
        risk.add("Elevation", format!("{}m, low-lying", elevation), 10.0);
    } else if elevation > 500.0 {
        risk.add("Elevation", format!("{}m, upland", elevation), -20.0);
    }

    let rise = inputs.sea_level_rise_cm();
    if rise > 100.0 {
        risk.add("Sea-level rise", format!("{:.0}cm by {}", rise, inputs.year), 30.0);
    } else if rise > 50.0 {
        risk.add("Sea-level rise", format!("{:.0}cm by {}", rise, inputs.year), 15.0);
    }

    let water = obs.water_body_distance;
    if water < 1000.0 {
        risk.add("Water proximity", format!("{}m to nearest water body", water), 15.0);
    } else if water < 5000.0 {
        risk.add("Water proximity", format!("{}m to nearest water body", water), 5.0);
    }
    risk
}

pub fn wildfire_risk(inputs: &ClimateInputs) -> ScoreBreakdown {
    let obs = &inputs.observations;
    let mut risk = ScoreBreakdown::new(30.0);

    let fires = obs.fires_last_10_years;
    if fires >= 3 {
        risk.add("Fire history", format!("{} fires in 10 years", fires), 30.0);
    } else if fires >= 1 {
        risk.add("Fire history", format!("{} fires in 10 years", fires), 15.0);
    }

    let ndvi = obs.vegetation_index;
    if ndvi > 0.6 {
        risk.add("Vegetation", format!("dense fuel (NDVI {})", ndvi), 20.0);
    } else if ndvi > 0.4 {
        risk.add("Vegetation", format!("moderate fuel (NDVI {})", ndvi), 10.0);
    }

    let warming = inputs.temp_increase();
    let warming_points = if warming > 3.0 {
        25.0
    } else if warming > 2.0 {
        15.0
    } else if warming > 1.0 {
        10.0
    } else {
        0.0
    };
    if warming_points > 0.0 {
        risk.add("Warming", format!("+{}°C", warming), warming_points);
    }

    let fire_season_days = 180.0 + warming * 20.0;
    if fire_season_days > 240.0 {
        risk.add("Fire season", format!("{:.0} days", fire_season_days), 15.0);
    }

    let drought = inputs.projected_drought_probability();
    let drought_points = (drought * 20.0).floor();
    if drought_points > 0.0 {
        risk.add("Drought", format!("{:.0}% probability", drought * 100.0), drought_points);
    }

    if obs.terrain_slope > 30.0 {
        risk.add("Slope", format!("{}° terrain", obs.terrain_slope), 10.0);
    }
    risk
}

pub fn hurricane_risk(inputs: &ClimateInputs) -> ScoreBreakdown {
    let obs = &inputs.observations;
    let coast = inputs.site.distance_to_coast;
    if coast > 200.0 {
        return ScoreBreakdown::new(5.0);
    }
    let mut risk = ScoreBreakdown::new(40.0);

    let storms = obs.hurricanes_last_20_years;
    let storm_points = if storms >= 5 {
        30.0
    } else if storms >= 2 {
        20.0
    } else if storms >= 1 {
        10.0
    } else {
        0.0
    };
    if storm_points > 0.0 {
        risk.add("Storm history", format!("{} storms in 20 years", storms), storm_points);
    }
    if obs.major_hurricanes > 0 {
        risk.add(
            "Major storms",
            format!("{} category 4/5", obs.major_hurricanes),
            15.0,
        );
    }

    let ocean_warming = inputs.temp_increase();
    if ocean_warming > 2.0 {
        risk.add("Ocean warming", format!("+{}°C", ocean_warming), 20.0);
    } else if ocean_warming > 1.0 {
        risk.add("Ocean warming", format!("+{}°C", ocean_warming), 10.0);
    }

    if coast < 10.0 && inputs.site.elevation < 5.0 {
        risk.add(
            "Storm surge",
            format!("{}km from coast, {}m elevation", coast, inputs.site.elevation),
            25.0,
        );
    }
    risk
}

pub fn heat_risk(inputs: &ClimateInputs) -> ScoreBreakdown {
    let days = inputs.projected_heat_days();
    let mut risk = ScoreBreakdown::new(0.0);
    risk.add(
        "Heat days",
        format!("{:.0} days above 35°C by {}", days, inputs.year),
        (days / 3.65).min(100.0),
    );
    risk
}

pub fn drought_risk(inputs: &ClimateInputs) -> ScoreBreakdown {
    let probability = inputs.projected_drought_probability();
    let mut risk = ScoreBreakdown::new(0.0);
    risk.add(
        "Drought probability",
        format!("{:.0}% by {}", probability * 100.0, inputs.year),
        probability * 100.0,
    );
    risk
}

/// Raw, unclamped hazard risks in reporting order.
pub fn hazard_risks(inputs: &ClimateInputs) -> [(Hazard, ScoreBreakdown); 5] {
    [
        (Hazard::Flood, flood_risk(inputs)),
        (Hazard::Wildfire, wildfire_risk(inputs)),
        (Hazard::Hurricane, hurricane_risk(inputs)),
        (Hazard::ExtremeHeat, heat_risk(inputs)),
        (Hazard::Drought, drought_risk(inputs)),
    ]
}

/// Climate score: 100 minus the unweighted mean of the hazard risks.
pub struct ClimateScorer<'a> {
    pub config: &'a ClimateConfig,
}

impl Scorer for ClimateScorer<'_> {
    type Input = ClimateInputs;

    fn compute_raw_risk(&self, inputs: &ClimateInputs) -> ScoreBreakdown {
        let hazards = hazard_risks(inputs);
        let share = 1.0 / hazards.len() as f64;
        let mut breakdown = ScoreBreakdown::new(100.0);
        for (hazard, risk) in &hazards {
            let value = risk.current();
            breakdown.add(
                hazard.to_string(),
                format!("risk {:.1} x {:.2}", value, share),
                -value * share,
            );
        }
        breakdown
    }

    fn classify(&self, value: f64) -> RiskLevel {
        self.config.levels.classify(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HazardAssessment {
    pub hazard: Hazard,
    pub risk: f64,
    pub level: RiskLevel,
    pub factors: ScoreBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionPoint {
    pub year: u16,
    pub temperature_increase: f64,
    pub sea_level_rise_mm: f64,
    pub overall_risk: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Priority {
    High,
    Medium,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdaptationMeasure {
    pub id: String,
    pub category: &'static str,
    pub description: &'static str,
    pub effectiveness: Priority,
    pub implementation_cost: f64,
    pub annual_savings: f64,
    pub payback_years: f64,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub grade: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClimateAssessment {
    pub climate_score: f64,
    pub overall_risk: f64,
    pub grade: &'static str,
    pub level: RiskLevel,
    pub scenario: Scenario,
    pub pathway: &'static str,
    pub horizon: u16,
    pub region: Region,
    pub temperature_increase: f64,
    pub sea_level_rise_mm: f64,
    pub hazards: Vec<HazardAssessment>,
    pub timeline: Vec<ProjectionPoint>,
    pub investment_rating: Rating,
    pub insurance_class: &'static str,
    pub resilience_score: f64,
    pub adaptation_measures: Vec<AdaptationMeasure>,
    pub estimated_climate_premium: f64,
    pub recommendations: Vec<String>,
    pub simulated: bool,
    #[serde(skip)]
    pub breakdown: ScoreBreakdown,
}

impl ClimateAssessment {
    pub fn into_component(self) -> ComponentResult {
        ComponentResult {
            score: DomainScore {
                value: self.climate_score,
                level: self.level,
                breakdown: self.breakdown,
            },
            recommendations: self.recommendations,
        }
    }
}

struct MeasureTemplate {
    category: &'static str,
    description: &'static str,
    effectiveness: Priority,
    implementation_cost: f64,
    annual_savings: f64,
    priority: Priority,
}

const FLOOD_PROTECTION: MeasureTemplate = MeasureTemplate {
    category: "Flood Protection",
    description: "Install flood barriers and a sump pump system",
    effectiveness: Priority::High,
    implementation_cost: 150_000.0,
    annual_savings: 30_000.0,
    priority: Priority::High,
};

const HEAT_RESILIENCE: MeasureTemplate = MeasureTemplate {
    category: "Heat Resilience",
    description: "Solar panels with a cool roof coating",
    effectiveness: Priority::High,
    implementation_cost: 500_000.0,
    annual_savings: 80_000.0,
    priority: Priority::High,
};

const WATER_SECURITY: MeasureTemplate = MeasureTemplate {
    category: "Water Security",
    description: "Rainwater harvesting with greywater recycling",
    effectiveness: Priority::Medium,
    implementation_cost: 200_000.0,
    annual_savings: 40_000.0,
    priority: Priority::High,
};

const STORM_HARDENING: MeasureTemplate = MeasureTemplate {
    category: "Storm Hardening",
    description: "Impact-resistant windows, storm shutters and hurricane roof straps",
    effectiveness: Priority::High,
    implementation_cost: 250_000.0,
    annual_savings: 40_000.0,
    priority: Priority::High,
};

const GENERAL_RESILIENCE: MeasureTemplate = MeasureTemplate {
    category: "General Resilience",
    description: "Energy-efficient HVAC with backup power",
    effectiveness: Priority::Medium,
    implementation_cost: 300_000.0,
    annual_savings: 50_000.0,
    priority: Priority::Medium,
};

fn adaptation_measures(
    hazards: &[HazardAssessment],
    request: &ClimateRequest,
    warming: f64,
) -> Vec<AdaptationMeasure> {
    let level_of = |hazard: Hazard| {
        hazards
            .iter()
            .find(|h| h.hazard == hazard)
            .map(|h| h.level)
            .unwrap_or(RiskLevel::Low)
    };

    let mut templates = Vec::new();
    if level_of(Hazard::Flood) >= RiskLevel::Moderate && !request.elevated_construction {
        templates.push(&FLOOD_PROTECTION);
    }
    let heat_exposed = level_of(Hazard::ExtremeHeat) >= RiskLevel::Moderate || warming >= 1.5;
    if heat_exposed && !request.solar_panels {
        templates.push(&HEAT_RESILIENCE);
    }
    if level_of(Hazard::Drought) >= RiskLevel::Moderate && !request.rainwater_harvesting {
        templates.push(&WATER_SECURITY);
    }
    if level_of(Hazard::Hurricane) >= RiskLevel::High {
        templates.push(&STORM_HARDENING);
    }
    templates.push(&GENERAL_RESILIENCE);

    let mut measures: Vec<AdaptationMeasure> = templates
        .into_iter()
        .enumerate()
        .map(|(i, t)| AdaptationMeasure {
            id: format!("ADAPT-{:03}", i + 1),
            category: t.category,
            description: t.description,
            effectiveness: t.effectiveness,
            implementation_cost: t.implementation_cost,
            annual_savings: t.annual_savings,
            payback_years: (t.implementation_cost / t.annual_savings * 100.0).round() / 100.0,
            priority: t.priority,
        })
        .collect();
    measures.sort_by_key(|m| m.priority);
    measures
}

/// Base 50, plus existing protective features and 5 per high-priority
/// measure available, capped at 100.
fn resilience_score(request: &ClimateRequest, measures: &[AdaptationMeasure]) -> f64 {
    let mut score = 50.0;
    if request.solar_panels {
        score += 10.0;
    }
    if request.rainwater_harvesting {
        score += 10.0;
    }
    if request.elevated_construction {
        score += 15.0;
    }
    let high_priority = measures.iter().filter(|m| m.priority == Priority::High).count();
    score += 5.0 * high_priority as f64;
    score.min(100.0)
}

/// Annual insurance adjustment: up to 50% loading from overall risk plus
/// 10% per high-risk hazard.
fn climate_premium(overall_risk: f64, hazards: &[HazardAssessment]) -> f64 {
    let high = hazards.iter().filter(|h| h.level >= RiskLevel::High).count();
    let loading = overall_risk / 100.0 * 0.5 + 0.1 * high as f64;
    (BASE_PREMIUM * loading).round()
}

const CLIMATE_BASELINE: &[&str] = &[
    "Review climate and flood coverage at every insurance renewal",
    "Keep an emergency kit and a household evacuation plan",
];

fn recommendations(hazards: &[HazardAssessment], request: &ClimateRequest) -> Vec<String> {
    let mut recs = Recommendations::new();
    for hazard in hazards {
        let elevated = hazard.level >= RiskLevel::Moderate;
        let severe = hazard.level >= RiskLevel::High;
        match hazard.hazard {
            Hazard::Flood => {
                recs.extend_if(
                    elevated,
                    &[
                        "Raise electrical panels and utilities above the expected flood level",
                        "Install a sump pump and backflow valves",
                    ],
                );
                recs.push_if(severe, "Carry flood insurance even outside a mandatory zone");
            }
            Hazard::Wildfire => {
                recs.push_if(elevated, "Clear vegetation to keep defensible space around the home");
                recs.push_if(severe, "Use ember-resistant vents and a Class A roof");
            }
            Hazard::Hurricane => {
                recs.extend_if(
                    elevated,
                    &[
                        "Install impact-resistant windows or storm shutters",
                        "Secure the roof with hurricane straps",
                    ],
                );
            }
            Hazard::ExtremeHeat => {
                recs.extend_if(
                    elevated,
                    &[
                        "Use white or reflective roofing",
                        "Improve insulation and cross-ventilation",
                    ],
                );
            }
            Hazard::Drought => {
                recs.push_if(
                    elevated && !request.rainwater_harvesting,
                    "Install rainwater harvesting",
                );
                recs.push_if(elevated, "Fit water-efficient fixtures");
            }
        }
    }
    recs.finish(CLIMATE_BASELINE)
}

fn assess_hazards(inputs: &ClimateInputs, config: &ClimateConfig) -> Vec<HazardAssessment> {
    hazard_risks(inputs)
        .into_iter()
        .map(|(hazard, factors)| {
            let risk = bound_score(factors.current());
            HazardAssessment {
                hazard,
                risk,
                level: config.levels.classify(100.0 - risk),
                factors,
            }
        })
        .collect()
}

/// Score already-resolved inputs.
pub fn assess_inputs(
    request: &ClimateRequest,
    inputs: &ClimateInputs,
    simulated: bool,
    config: &ClimateConfig,
) -> ClimateAssessment {
    let scorer = ClimateScorer { config };
    let scored = scorer.score(inputs);
    let overall_risk = 100.0 - scored.value;
    let hazards = assess_hazards(inputs, config);

    let timeline = PROJECTION_YEARS
        .iter()
        .map(|&year| {
            let projected = inputs.at_year(year);
            ProjectionPoint {
                year,
                temperature_increase: inputs.scenario.temp_increase(year),
                sea_level_rise_mm: inputs.scenario.sea_level_rise_mm(year),
                overall_risk: 100.0 - scorer.score(&projected).value,
            }
        })
        .collect();

    let warming = inputs.temp_increase();
    let measures = adaptation_measures(&hazards, request, warming);
    let investment = CLIMATE_INVESTMENT.grade(scored.value);
    debug!(
        score = scored.value,
        scenario = inputs.scenario.code(),
        year = inputs.year,
        simulated,
        "climate assessment complete"
    );

    ClimateAssessment {
        climate_score: scored.value,
        overall_risk,
        grade: CLIMATE.grade(scored.value).label,
        level: scored.level,
        scenario: inputs.scenario,
        pathway: inputs.scenario.pathway(),
        horizon: inputs.year,
        region: Region::classify(&inputs.site),
        temperature_increase: warming,
        sea_level_rise_mm: inputs.scenario.sea_level_rise_mm(inputs.year),
        timeline,
        investment_rating: Rating {
            grade: investment.label,
            description: investment.description,
        },
        insurance_class: CLIMATE_INSURANCE.grade(scored.value).label,
        resilience_score: resilience_score(request, &measures),
        estimated_climate_premium: climate_premium(overall_risk, &hazards),
        recommendations: recommendations(&hazards, request),
        adaptation_measures: measures,
        hazards,
        simulated,
        breakdown: scored.breakdown,
    }
}

/// Assess climate risk, filling unobserved site conditions from `source`.
pub fn assess_climate(
    request: &ClimateRequest,
    config: &ClimateConfig,
    source: &mut dyn DataSource,
) -> Result<ClimateAssessment, DataSourceError> {
    let site = request.site();
    let (observations, simulated) = match request.supplied_observations() {
        Some(observations) => (observations, false),
        None => {
            let fetched = source.climate_observations(site.latitude, site.longitude)?;
            (request.observations_over(fetched), source.is_simulated())
        }
    };

    let inputs = ClimateInputs {
        site,
        observations,
        scenario: request.scenario.unwrap_or(config.scenario),
        year: request.horizon.unwrap_or(config.horizon),
    };
    Ok(assess_inputs(request, &inputs, simulated, config))
}
