use super::config::{CompositeWeights, ScoringConfig};
use super::engine::LevelThresholds;
use super::factors::{Effect, RangeOp};
use crate::domains::climate::PROJECTION_YEARS;

/// Allowed drift when checking that a weight set sums to 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Validate scoring configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_scoring(config: &ScoringConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    // EMF decay table: parseable, multiplicative discounts, increasing thresholds
    let mut last_threshold: Option<f64> = None;
    for (i, bucket) in config.emf.decay.iter().enumerate() {
        match RangeOp::parse(&bucket.range) {
            Ok(range) => {
                let threshold = range.threshold();
                if let Some(last) = last_threshold {
                    if threshold <= last {
                        errors.push(format!(
                            "scoring.emf.decay[{}].range: threshold {} must be greater than the previous bucket's {}",
                            i, threshold, last
                        ));
                    }
                }
                last_threshold = Some(threshold);
            }
            Err(e) => errors.push(format!(
                "scoring.emf.decay[{}].range: invalid '{}' - {}",
                i, bucket.range, e
            )),
        }
        match Effect::parse(&bucket.effect) {
            Ok(Effect::Multiply(n)) if (0.0..=1.0).contains(&n) => {}
            Ok(_) => errors.push(format!(
                "scoring.emf.decay[{}].effect: '{}' must be a discount between x0 and x1",
                i, bucket.effect
            )),
            Err(e) => errors.push(format!(
                "scoring.emf.decay[{}].effect: invalid '{}' - {}",
                i, bucket.effect, e
            )),
        }
    }

    for (name, value) in config.emf.intensity.entries() {
        check_non_negative(&mut errors, &format!("scoring.emf.intensity.{}", name), value);
    }
    for (name, value) in config.emf.unit_weights.entries() {
        check_non_negative(&mut errors, &format!("scoring.emf.unit_weights.{}", name), value);
    }
    check_non_negative(
        &mut errors,
        "scoring.emf.sleep_space_multiplier",
        config.emf.sleep_space_multiplier,
    );
    check_non_negative(&mut errors, "scoring.emf.hotspot_exposure", config.emf.hotspot_exposure);
    check_weight_pair(
        &mut errors,
        "scoring.emf",
        ("external_weight", config.emf.external_weight),
        ("internal_weight", config.emf.internal_weight),
    );
    check_levels(&mut errors, "scoring.emf.levels", &config.emf.levels);

    // Crime
    check_non_negative(&mut errors, "scoring.crime.violent_weight", config.crime.violent_weight);
    check_non_negative(&mut errors, "scoring.crime.property_weight", config.crime.property_weight);
    check_non_negative(&mut errors, "scoring.crime.other_weight", config.crime.other_weight);
    check_non_negative(
        &mut errors,
        "scoring.crime.residential_multiplier",
        config.crime.residential_multiplier,
    );
    if !(config.crime.national_rate.is_finite() && config.crime.national_rate > 0.0) {
        errors.push("scoring.crime.national_rate: must be positive".to_string());
    }
    if !(0.0..=1.0).contains(&config.crime.heatmap_hotspot) {
        errors.push("scoring.crime.heatmap_hotspot: must be between 0 and 1".to_string());
    }
    check_levels(&mut errors, "scoring.crime.levels", &config.crime.levels);

    // Climate
    if !PROJECTION_YEARS.contains(&config.climate.horizon) {
        errors.push(format!(
            "scoring.climate.horizon: {} is not a projection year (expected one of {:?})",
            config.climate.horizon, PROJECTION_YEARS
        ));
    }
    check_levels(&mut errors, "scoring.climate.levels", &config.climate.levels);

    // Esoteric
    check_weight_pair(
        &mut errors,
        "scoring.esoteric",
        ("vastu_weight", config.esoteric.vastu_weight),
        ("feng_shui_weight", config.esoteric.feng_shui_weight),
    );
    if !(0.0..=100.0).contains(&config.esoteric.vastu_baseline) {
        errors.push("scoring.esoteric.vastu_baseline: must be between 0 and 100".to_string());
    }
    check_levels(&mut errors, "scoring.esoteric.levels", &config.esoteric.levels);

    check_composite(&mut errors, &config.composite);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_non_negative(errors: &mut Vec<String>, field: &str, value: f64) {
    if !(value.is_finite() && value >= 0.0) {
        errors.push(format!("{}: must be a non-negative number", field));
    }
}

fn check_weight_pair(errors: &mut Vec<String>, prefix: &str, a: (&str, f64), b: (&str, f64)) {
    check_non_negative(errors, &format!("{}.{}", prefix, a.0), a.1);
    check_non_negative(errors, &format!("{}.{}", prefix, b.0), b.1);
    let sum = a.1 + b.1;
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        errors.push(format!(
            "{}: {} + {} must sum to 1.0 (got {})",
            prefix, a.0, b.0, sum
        ));
    }
}

fn check_levels(errors: &mut Vec<String>, field: &str, levels: &LevelThresholds) {
    let ordered = match levels.high {
        Some(high) => levels.low > levels.moderate && levels.moderate > high,
        None => levels.low > levels.moderate,
    };
    if !ordered {
        errors.push(format!(
            "{}: thresholds must be strictly descending (low > moderate > high)",
            field
        ));
    }
}

fn check_composite(errors: &mut Vec<String>, weights: &CompositeWeights) {
    for domain in super::composite::Domain::ALL {
        let weight = weights.weight(domain);
        if !(weight.is_finite() && weight >= 0.0) {
            errors.push(format!(
                "scoring.composite.{:?}: must be a non-negative number",
                domain
            )
            .to_lowercase());
        }
    }
    let sum = weights.sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        errors.push(format!("scoring.composite: weights must sum to 1.0 (got {})", sum));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::config::DecayBucket;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_scoring(&ScoringConfig::default()).is_ok());
    }

    #[test]
    fn test_invalid_decay_range() {
        let mut config = ScoringConfig::default();
        config.emf.decay[0].range = "invalid".to_string();
        let errors = validate_scoring(&config).unwrap_err();
        assert!(errors[0].contains("scoring.emf.decay[0].range"));
    }

    #[test]
    fn test_decay_must_be_a_discount() {
        let mut config = ScoringConfig::default();
        config.emf.decay[1].effect = "x2".to_string();
        let errors = validate_scoring(&config).unwrap_err();
        assert!(errors[0].contains("scoring.emf.decay[1].effect"));
    }

    #[test]
    fn test_decay_thresholds_must_increase() {
        let mut config = ScoringConfig::default();
        config.emf.decay = vec![
            DecayBucket {
                range: ">100".to_string(),
                effect: "x0.3".to_string(),
            },
            DecayBucket {
                range: ">50".to_string(),
                effect: "x0.5".to_string(),
            },
        ];
        let errors = validate_scoring(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("must be greater"));
    }

    #[test]
    fn test_composite_weights_must_sum_to_one() {
        let mut config = ScoringConfig::default();
        config.composite.esoteric = 0.5;
        let errors = validate_scoring(&config).unwrap_err();
        assert!(errors[0].starts_with("scoring.composite"));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ScoringConfig::default();
        config.emf.external_weight = 0.9; // Error 1: pair no longer sums to 1
        config.crime.national_rate = 0.0; // Error 2
        config.climate.horizon = 2040; // Error 3
        let errors = validate_scoring(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_negative_weight_reported() {
        let mut config = ScoringConfig::default();
        config.composite.emf = -0.1;
        config.composite.crime = 0.7;
        let errors = validate_scoring(&config).unwrap_err();
        assert_eq!(errors, vec!["scoring.composite.emf: must be a non-negative number"]);
    }

    #[test]
    fn test_levels_must_descend() {
        let mut config = ScoringConfig::default();
        config.crime.levels.moderate = 90.0;
        let errors = validate_scoring(&config).unwrap_err();
        assert!(errors[0].contains("scoring.crime.levels"));
    }
}
