//! Composite assessment: run every domain a request names and aggregate them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::data_source::DataSource;
use crate::domains::climate::{assess_climate, ClimateRequest};
use crate::domains::crime::{assess_crime, CrimeRequest};
use crate::domains::emf::{assess_emf, EmfRequest};
use crate::domains::esoteric::{assess_esoteric, EsotericRequest};
use crate::error::{DataSourceError, FieldViolation};
use crate::request::{field, Validate};
use crate::scoring::{aggregate, CompositeAssessment, Domain, ScoringConfig};

/// Fewest domains a composite may be built from.
pub const MIN_COMPOSITE_DOMAINS: usize = 2;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeRequest {
    #[serde(default)]
    pub emf: Option<EmfRequest>,
    #[serde(default)]
    pub crime: Option<CrimeRequest>,
    #[serde(default)]
    pub climate: Option<ClimateRequest>,
    #[serde(default)]
    pub esoteric: Option<EsotericRequest>,
}

impl CompositeRequest {
    pub fn domains(&self) -> Vec<Domain> {
        let present = [
            (Domain::Emf, self.emf.is_some()),
            (Domain::Crime, self.crime.is_some()),
            (Domain::Climate, self.climate.is_some()),
            (Domain::Esoteric, self.esoteric.is_some()),
        ];
        present.iter().filter(|(_, p)| *p).map(|(d, _)| *d).collect()
    }
}

impl Validate for CompositeRequest {
    fn validate(&self, prefix: &str, out: &mut Vec<FieldViolation>) {
        if self.domains().len() < MIN_COMPOSITE_DOMAINS {
            out.push(FieldViolation::new(
                if prefix.is_empty() { "domains" } else { prefix },
                format!(
                    "at least {} of emf, crime, climate, esoteric are required",
                    MIN_COMPOSITE_DOMAINS
                ),
            ));
        }
        if let Some(emf) = &self.emf {
            emf.validate(&field(prefix, "emf"), out);
        }
        if let Some(crime) = &self.crime {
            crime.validate(&field(prefix, "crime"), out);
        }
        if let Some(climate) = &self.climate {
            climate.validate(&field(prefix, "climate"), out);
        }
        if let Some(esoteric) = &self.esoteric {
            esoteric.validate(&field(prefix, "esoteric"), out);
        }
    }
}

/// Score each requested domain and combine them with the configured weights.
pub fn assess_composite(
    request: &CompositeRequest,
    config: &ScoringConfig,
    source: &mut dyn DataSource,
    current_year: i32,
) -> Result<CompositeAssessment, DataSourceError> {
    let mut components = BTreeMap::new();

    if let Some(emf) = &request.emf {
        components.insert(Domain::Emf, assess_emf(emf, &config.emf).into_component());
    }
    if let Some(crime) = &request.crime {
        let assessment = assess_crime(crime, &config.crime, source)?;
        components.insert(Domain::Crime, assessment.into_component());
    }
    if let Some(climate) = &request.climate {
        let assessment = assess_climate(climate, &config.climate, source)?;
        components.insert(Domain::Climate, assessment.into_component());
    }
    if let Some(esoteric) = &request.esoteric {
        let assessment = assess_esoteric(esoteric, &config.esoteric, current_year);
        components.insert(Domain::Esoteric, assessment.into_component());
    }

    debug!(domains = components.len(), "aggregating composite");
    let assessment = aggregate(components, &config.composite);
    info!(
        overall = assessment.overall,
        review = assessment.professional_review_needed,
        "composite assessment complete"
    );
    Ok(assessment)
}
