use super::config::DecayBucket;
use super::factors::{Effect, RangeOp};

/// Contribution of an external source before any distance discount.
pub const DECAY_BASE: f64 = 100.0;

/// Inverse-distance decay.
///
/// Starts at `DECAY_BASE` and applies every bucket whose range the distance
/// falls in, in table order. Discounts compound: a source 150m away under the
/// default table ends at 100 x 0.5 x 0.3 = 15. Buckets that fail to parse are
/// skipped; the table is validated at startup.
pub fn inverse_distance_decay(distance: f64, buckets: &[DecayBucket]) -> f64 {
    let mut value = DECAY_BASE;
    for bucket in buckets {
        if let (Ok(range), Ok(effect)) = (RangeOp::parse(&bucket.range), Effect::parse(&bucket.effect)) {
            if range.matches(distance) {
                value = effect.apply(value);
            }
        }
    }
    value
}

/// Linear contribution: per-unit weight x quantity x context multiplier.
pub fn linear_contribution(unit_weight: f64, quantity: f64, multiplier: f64) -> f64 {
    unit_weight * quantity * multiplier
}

/// Events per 1,000 residents. Zero population yields zero.
pub fn rate_per_thousand(count: f64, population: f64) -> f64 {
    if population > 0.0 {
        count / population * 1000.0
    } else {
        0.0
    }
}
