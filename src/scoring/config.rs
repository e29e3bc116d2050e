use serde::{Deserialize, Serialize};

use super::composite::Domain;
use super::engine::LevelThresholds;
use crate::domains::climate::Scenario;
use crate::domains::emf::{ExternalKind, InternalKind};

/// Scoring tables for every domain.
///
/// Built once at startup (defaults, optionally overridden from the config
/// file), validated, then shared by reference with every scorer. Every field
/// may be omitted; omitted fields keep their defaults.
///
/// Example YAML:
/// ```yaml
/// scoring:
///   emf:
///     decay:
///       - { range: ">50", effect: "x0.5" }
///       - { range: ">100", effect: "x0.3" }
///     sleep_space_multiplier: 2
///   composite:
///     emf: 0.4
///     crime: 0.4
///     climate: 0.2
///     esoteric: 0
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringConfig {
    pub emf: EmfConfig,
    pub crime: CrimeConfig,
    pub climate: ClimateConfig,
    pub esoteric: EsotericConfig,
    pub composite: CompositeWeights,
}

/// Distance breakpoint for external EMF decay.
///
/// Range format: "<N", "<=N", ">N", ">=N", "N-M". Effect: "xN" or "+N".
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DecayBucket {
    pub range: String,
    pub effect: String,
}

impl DecayBucket {
    fn new(range: &str, effect: &str) -> Self {
        Self {
            range: range.to_string(),
            effect: effect.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EmfConfig {
    /// Compounding discounts applied to an external source's exposure,
    /// in increasing-distance order (meters)
    pub decay: Vec<DecayBucket>,
    pub intensity: ExternalIntensity,
    pub unit_weights: InternalWeights,
    /// Multiplier for internal sources located where people sleep
    pub sleep_space_multiplier: f64,
    pub external_weight: f64,
    pub internal_weight: f64,
    /// Decayed exposure at or above which an external source is a hotspot
    pub hotspot_exposure: f64,
    pub levels: LevelThresholds,
}

impl Default for EmfConfig {
    fn default() -> Self {
        Self {
            decay: vec![
                DecayBucket::new(">50", "x0.5"),
                DecayBucket::new(">100", "x0.3"),
                DecayBucket::new(">300", "x0.1"),
                DecayBucket::new(">1000", "x0.05"),
            ],
            intensity: ExternalIntensity::default(),
            unit_weights: InternalWeights::default(),
            sleep_space_multiplier: 2.0,
            external_weight: 0.6,
            internal_weight: 0.4,
            hotspot_exposure: 50.0,
            levels: LevelThresholds {
                low: 80.0,
                moderate: 60.0,
                high: Some(40.0),
            },
        }
    }
}

/// Relative strength of each external source type.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ExternalIntensity {
    pub cell_tower: f64,
    pub power_line: f64,
    pub transformer: f64,
    pub substation: f64,
    pub small_cell_5g: f64,
    pub broadcast_tower: f64,
}

impl Default for ExternalIntensity {
    fn default() -> Self {
        Self {
            cell_tower: 1.0,
            power_line: 1.2,
            transformer: 0.8,
            substation: 1.5,
            small_cell_5g: 0.9,
            broadcast_tower: 1.3,
        }
    }
}

impl ExternalIntensity {
    pub fn for_kind(&self, kind: ExternalKind) -> Option<f64> {
        match kind {
            ExternalKind::CellTower => Some(self.cell_tower),
            ExternalKind::PowerLine => Some(self.power_line),
            ExternalKind::Transformer => Some(self.transformer),
            ExternalKind::Substation => Some(self.substation),
            ExternalKind::SmallCell5g => Some(self.small_cell_5g),
            ExternalKind::BroadcastTower => Some(self.broadcast_tower),
            ExternalKind::Unknown => None,
        }
    }

    pub(crate) fn entries(&self) -> [(&'static str, f64); 6] {
        [
            ("cell_tower", self.cell_tower),
            ("power_line", self.power_line),
            ("transformer", self.transformer),
            ("substation", self.substation),
            ("small_cell_5g", self.small_cell_5g),
            ("broadcast_tower", self.broadcast_tower),
        ]
    }
}

/// Per-unit risk points of each internal source type.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct InternalWeights {
    pub wifi_router: f64,
    pub smart_meter: f64,
    pub electric_blanket: f64,
    pub bedroom_electronics: f64,
    pub microwave: f64,
    pub cordless_phone: f64,
    pub baby_monitor: f64,
}

impl Default for InternalWeights {
    fn default() -> Self {
        Self {
            wifi_router: 10.0,
            smart_meter: 15.0,
            electric_blanket: 20.0,
            bedroom_electronics: 5.0,
            microwave: 8.0,
            cordless_phone: 8.0,
            baby_monitor: 10.0,
        }
    }
}

impl InternalWeights {
    pub fn for_kind(&self, kind: InternalKind) -> Option<f64> {
        match kind {
            InternalKind::WifiRouter => Some(self.wifi_router),
            InternalKind::SmartMeter => Some(self.smart_meter),
            InternalKind::ElectricBlanket => Some(self.electric_blanket),
            InternalKind::BedroomElectronics => Some(self.bedroom_electronics),
            InternalKind::Microwave => Some(self.microwave),
            InternalKind::CordlessPhone => Some(self.cordless_phone),
            InternalKind::BabyMonitor => Some(self.baby_monitor),
            InternalKind::Unknown => None,
        }
    }

    pub(crate) fn entries(&self) -> [(&'static str, f64); 7] {
        [
            ("wifi_router", self.wifi_router),
            ("smart_meter", self.smart_meter),
            ("electric_blanket", self.electric_blanket),
            ("bedroom_electronics", self.bedroom_electronics),
            ("microwave", self.microwave),
            ("cordless_phone", self.cordless_phone),
            ("baby_monitor", self.baby_monitor),
        ]
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CrimeConfig {
    /// Risk points per incident per 1,000 residents, by category
    pub violent_weight: f64,
    pub property_weight: f64,
    pub other_weight: f64,
    /// Multiplier for incidents recorded in residential locations
    pub residential_multiplier: f64,
    /// National combined crime rate per 1,000 residents
    pub national_rate: f64,
    /// Heatmap cell intensity at or above which a cell is a hotspot
    pub heatmap_hotspot: f64,
    pub levels: LevelThresholds,
}

impl Default for CrimeConfig {
    fn default() -> Self {
        Self {
            violent_weight: 4.0,
            property_weight: 1.5,
            other_weight: 0.5,
            residential_multiplier: 1.5,
            national_rate: 23.7,
            heatmap_hotspot: 0.7,
            levels: LevelThresholds {
                low: 65.0,
                moderate: 45.0,
                high: None,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ClimateConfig {
    /// Emissions pathway used when a request does not name one
    pub scenario: Scenario,
    /// Projection year used when a request does not name one
    pub horizon: u16,
    pub levels: LevelThresholds,
}

impl Default for ClimateConfig {
    fn default() -> Self {
        Self {
            scenario: Scenario::Ssp245,
            horizon: 2050,
            levels: LevelThresholds {
                low: 70.0,
                moderate: 40.0,
                high: None,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EsotericConfig {
    pub vastu_weight: f64,
    pub feng_shui_weight: f64,
    /// Vastu score before any rule is applied
    pub vastu_baseline: f64,
    pub levels: LevelThresholds,
}

impl Default for EsotericConfig {
    fn default() -> Self {
        Self {
            vastu_weight: 0.5,
            feng_shui_weight: 0.5,
            vastu_baseline: 100.0,
            levels: LevelThresholds {
                low: 70.0,
                moderate: 50.0,
                high: None,
            },
        }
    }
}

/// Cross-domain weights for the composite assessment. Must sum to 1.0.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CompositeWeights {
    pub emf: f64,
    pub crime: f64,
    pub climate: f64,
    pub esoteric: f64,
}

impl Default for CompositeWeights {
    fn default() -> Self {
        Self {
            emf: 0.30,
            crime: 0.30,
            climate: 0.25,
            esoteric: 0.15,
        }
    }
}

impl CompositeWeights {
    pub fn weight(&self, domain: Domain) -> f64 {
        match domain {
            Domain::Emf => self.emf,
            Domain::Crime => self.crime,
            Domain::Climate => self.climate,
            Domain::Esoteric => self.esoteric,
        }
    }

    pub fn sum(&self) -> f64 {
        Domain::ALL.iter().map(|d| self.weight(*d)).sum()
    }
}
