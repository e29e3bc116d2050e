//! External data seam. Scorers never fetch anything themselves; when a request
//! leaves out observations the caller's `DataSource` supplies them.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::domains::climate::{ClimateObservations, FemaZone};
use crate::domains::crime::{CrimeCategory, CrimeIncident, CrimeReport};
use crate::error::DataSourceError;

/// Seed used when neither the command line nor the config names one.
pub const DEFAULT_SEED: u64 = 0x5EED;

pub trait DataSource {
    /// Results from this source are made up and must be labeled as such.
    fn is_simulated(&self) -> bool;

    fn crime_report(&mut self, location: &str, radius: f64) -> Result<CrimeReport, DataSourceError>;

    /// `resolution` rows of `resolution` intensities, nominally in [0, 1].
    fn crime_heatmap(
        &mut self,
        location: &str,
        radius: f64,
        resolution: usize,
    ) -> Result<Vec<Vec<f64>>, DataSourceError>;

    fn climate_observations(
        &mut self,
        latitude: f64,
        longitude: f64,
    ) -> Result<ClimateObservations, DataSourceError>;
}

/// Placeholder for real crime and climate feeds. Every lookup fails until an
/// integration is configured, so requests must carry their own data.
#[derive(Debug, Default, Clone, Copy)]
pub struct LiveDataSource;

impl DataSource for LiveDataSource {
    fn is_simulated(&self) -> bool {
        false
    }

    fn crime_report(&mut self, _location: &str, _radius: f64) -> Result<CrimeReport, DataSourceError> {
        Err(DataSourceError::NotConfigured { what: "crime reports" })
    }

    fn crime_heatmap(
        &mut self,
        _location: &str,
        _radius: f64,
        _resolution: usize,
    ) -> Result<Vec<Vec<f64>>, DataSourceError> {
        Err(DataSourceError::NotConfigured { what: "crime heatmaps" })
    }

    fn climate_observations(
        &mut self,
        _latitude: f64,
        _longitude: f64,
    ) -> Result<ClimateObservations, DataSourceError> {
        Err(DataSourceError::NotConfigured {
            what: "climate observations",
        })
    }
}

/// Demo data from a seeded generator. The same seed and call sequence always
/// produce the same values.
#[derive(Debug, Clone)]
pub struct SyntheticDataSource {
    rng: StdRng,
}

impl SyntheticDataSource {
    pub fn new(seed: u64) -> Self {
        debug!(seed, "using synthetic data source");
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn context(&mut self) -> Option<String> {
        let context = if self.rng.gen_bool(0.5) {
            "residential"
        } else {
            "commercial"
        };
        Some(context.to_string())
    }
}

impl Default for SyntheticDataSource {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

const FEMA_ZONES: [FemaZone; 9] = [
    FemaZone::A,
    FemaZone::Ae,
    FemaZone::Ah,
    FemaZone::Ao,
    FemaZone::V,
    FemaZone::Ve,
    FemaZone::X,
    FemaZone::B,
    FemaZone::C,
];

impl DataSource for SyntheticDataSource {
    fn is_simulated(&self) -> bool {
        true
    }

    fn crime_report(&mut self, location: &str, radius: f64) -> Result<CrimeReport, DataSourceError> {
        let population = (self.rng.gen_range(2_000.0..50_000.0) * radius.max(0.25)).round();
        let per_thousand = population / 1000.0;

        let mut incidents = Vec::new();
        for (category, max_rate) in [
            (CrimeCategory::ViolentCrimeCategory, 6.0),
            (CrimeCategory::PropertyCrimeCategory, 25.0),
            (CrimeCategory::OtherCrimeCategory, 10.0),
        ] {
            // Split each category across residential and commercial areas
            for _ in 0..2 {
                let rate: f64 = self.rng.gen_range(0.0..max_rate / 2.0);
                incidents.push(CrimeIncident {
                    category,
                    quantity: (rate * per_thousand).round(),
                    location_context: self.context(),
                });
            }
        }
        debug!(location, population, incidents = incidents.len(), "generated crime report");
        Ok(CrimeReport {
            incidents,
            population,
        })
    }

    fn crime_heatmap(
        &mut self,
        location: &str,
        _radius: f64,
        resolution: usize,
    ) -> Result<Vec<Vec<f64>>, DataSourceError> {
        debug!(location, resolution, "generated crime heatmap");
        Ok((0..resolution)
            .map(|_| {
                (0..resolution)
                    .map(|_| (self.rng.gen_range(0.0..1.0f64) * 100.0).round() / 100.0)
                    .collect()
            })
            .collect())
    }

    fn climate_observations(
        &mut self,
        latitude: f64,
        longitude: f64,
    ) -> Result<ClimateObservations, DataSourceError> {
        let observations = ClimateObservations {
            fema_zone: FEMA_ZONES[self.rng.gen_range(0..FEMA_ZONES.len())],
            fires_last_10_years: self.rng.gen_range(0..5),
            vegetation_index: (self.rng.gen_range(0.1..0.8f64) * 100.0).round() / 100.0,
            terrain_slope: self.rng.gen_range(0.0..35.0f64).round(),
            hurricanes_last_20_years: self.rng.gen_range(0..8),
            major_hurricanes: self.rng.gen_range(0..3),
            extreme_heat_days: self.rng.gen_range(5.0..60.0f64).round(),
            drought_probability: (self.rng.gen_range(0.05..0.5f64) * 100.0).round() / 100.0,
            water_body_distance: self.rng.gen_range(100.0..10_000.0f64).round(),
        };
        debug!(latitude, longitude, "generated climate observations");
        Ok(observations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_same_seed_same_data() {
        let mut a = SyntheticDataSource::new(11);
        let mut b = SyntheticDataSource::new(11);
        assert_eq!(a.crime_report("x", 1.0).unwrap(), b.crime_report("x", 1.0).unwrap());
        assert_eq!(
            a.climate_observations(10.0, 20.0).unwrap(),
            b.climate_observations(10.0, 20.0).unwrap()
        );
        assert_eq!(a.crime_heatmap("x", 1.0, 4).unwrap(), b.crime_heatmap("x", 1.0, 4).unwrap());
    }

    #[test]
    fn test_different_seeds_differ() {
        let mut a = SyntheticDataSource::new(1);
        let mut b = SyntheticDataSource::new(2);
        assert_ne!(
            a.crime_heatmap("x", 1.0, 8).unwrap(),
            b.crime_heatmap("x", 1.0, 8).unwrap()
        );
    }

    #[test]
    fn test_synthetic_values_are_plausible() {
        let mut source = SyntheticDataSource::default();
        let report = source.crime_report("x", 1.0).unwrap();
        assert!(report.population >= 2_000.0);
        assert_eq!(report.incidents.len(), 6);
        assert!(report.incidents.iter().all(|i| i.quantity >= 0.0));

        let obs = source.climate_observations(0.0, 0.0).unwrap();
        assert!((0.0..=1.0).contains(&obs.drought_probability));
        assert!((-1.0..=1.0).contains(&obs.vegetation_index));
        assert!(obs.major_hurricanes < 3);
        assert!(source.is_simulated());
    }

    #[test]
    fn test_live_source_is_not_configured() {
        let mut source = LiveDataSource;
        assert!(!source.is_simulated());
        let err = source.crime_report("x", 1.0).unwrap_err();
        assert!(err.to_string().contains("crime reports"));
        assert!(source.climate_observations(0.0, 0.0).is_err());
    }
}
