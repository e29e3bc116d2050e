use anyhow::{bail, Result};

/// Threshold expression used by breakpoint tables.
///
/// Format: "<N", "<=N", ">N", ">=N", "N-M" (inclusive range) or a bare "N".
#[derive(Debug, Clone, PartialEq)]
pub enum RangeOp {
    LessThan(f64),
    LessEqual(f64),
    GreaterThan(f64),
    GreaterEqual(f64),
    Equal(f64),
    Between(f64, f64), // Inclusive range: N-M
}

impl RangeOp {
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let range = if let Some(val) = s.strip_prefix(">=") {
            RangeOp::GreaterEqual(parse_number(val)?)
        } else if let Some(val) = s.strip_prefix("<=") {
            RangeOp::LessEqual(parse_number(val)?)
        } else if let Some(val) = s.strip_prefix('>') {
            RangeOp::GreaterThan(parse_number(val)?)
        } else if let Some(val) = s.strip_prefix('<') {
            RangeOp::LessThan(parse_number(val)?)
        } else if s.contains('-') && !s.starts_with('-') {
            // Range format: "100-500"
            let parts: Vec<&str> = s.split('-').collect();
            if parts.len() != 2 {
                bail!("Invalid range format: {}", s)
            }
            let low = parse_number(parts[0])?;
            let high = parse_number(parts[1])?;
            if low > high {
                bail!("Range lower bound exceeds upper bound: {}", s)
            }
            RangeOp::Between(low, high)
        } else {
            RangeOp::Equal(parse_number(s)?)
        };
        Ok(range)
    }

    pub fn matches(&self, value: f64) -> bool {
        match self {
            RangeOp::LessThan(n) => value < *n,
            RangeOp::LessEqual(n) => value <= *n,
            RangeOp::GreaterThan(n) => value > *n,
            RangeOp::GreaterEqual(n) => value >= *n,
            RangeOp::Equal(n) => value == *n,
            RangeOp::Between(low, high) => value >= *low && value <= *high,
        }
    }

    /// The boundary value the expression is anchored on (lower bound for ranges).
    pub fn threshold(&self) -> f64 {
        match self {
            RangeOp::LessThan(n)
            | RangeOp::LessEqual(n)
            | RangeOp::GreaterThan(n)
            | RangeOp::GreaterEqual(n)
            | RangeOp::Equal(n) => *n,
            RangeOp::Between(low, _) => *low,
        }
    }
}

fn parse_number(s: &str) -> Result<f64> {
    let value: f64 = s.trim().parse()?;
    if !value.is_finite() {
        bail!("Number must be finite: {}", s.trim())
    }
    Ok(value)
}

/// Score adjustment applied when a breakpoint matches.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Add(f64),
    Multiply(f64),
}

impl Effect {
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(val) = s.strip_prefix('+') {
            Ok(Effect::Add(parse_number(val)?))
        } else if let Some(val) = s.strip_prefix('x') {
            Ok(Effect::Multiply(parse_number(val)?))
        } else {
            bail!("Effect must start with + or x: {}", s)
        }
    }

    pub fn apply(&self, value: f64) -> f64 {
        match self {
            Effect::Add(n) => value + n,
            Effect::Multiply(n) => value * n,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_range_less_than() {
        let range = RangeOp::parse("<100").unwrap();
        assert!(range.matches(50.0));
        assert!(!range.matches(100.0));
        assert!(!range.matches(150.0));
    }

    #[test]
    fn test_parse_range_greater_than_is_strict() {
        let range = RangeOp::parse(">50").unwrap();
        assert!(!range.matches(50.0));
        assert!(range.matches(50.5));
    }

    #[test]
    fn test_parse_range_greater_equal() {
        let range = RangeOp::parse(">=100").unwrap();
        assert!(!range.matches(99.9));
        assert!(range.matches(100.0));
    }

    #[test]
    fn test_parse_range_between() {
        let range = RangeOp::parse("100-500").unwrap();
        assert!(!range.matches(50.0));
        assert!(range.matches(100.0));
        assert!(range.matches(500.0));
        assert!(!range.matches(500.1));
        assert_eq!(range.threshold(), 100.0);
    }

    #[test]
    fn test_parse_range_decimal_and_negative_equal() {
        assert_eq!(RangeOp::parse("0.5").unwrap(), RangeOp::Equal(0.5));
        assert_eq!(RangeOp::parse("-3").unwrap(), RangeOp::Equal(-3.0));
    }

    #[test]
    fn test_parse_range_rejects_garbage() {
        assert!(RangeOp::parse("abc").is_err());
        assert!(RangeOp::parse("500-100").is_err());
        assert!(RangeOp::parse(">inf").is_err());
    }

    #[test]
    fn test_parse_effect_multiply() {
        let effect = Effect::parse("x0.5").unwrap();
        assert_eq!(effect.apply(100.0), 50.0);
    }

    #[test]
    fn test_parse_effect_negative_add() {
        let effect = Effect::parse("+-5").unwrap();
        assert_eq!(effect.apply(100.0), 95.0);
    }

    #[test]
    fn test_parse_effect_requires_operator() {
        assert!(Effect::parse("0.5").is_err());
        assert!(Effect::parse("*2").is_err());
    }
}
