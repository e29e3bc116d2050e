use serde::Serialize;

/// A letter grade plus the human-readable label that goes with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Grade {
    pub label: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct Tier {
    pub min: f64,
    pub grade: Grade,
}

/// Ordered breakpoint table. Tiers are evaluated top-down and the first tier
/// whose `min` the score reaches wins; scores below every tier get `fallback`.
#[derive(Debug, Clone, Copy)]
pub struct GradeTable {
    pub tiers: &'static [Tier],
    pub fallback: Grade,
}

const fn tier(min: f64, label: &'static str, description: &'static str) -> Tier {
    Tier {
        min,
        grade: Grade { label, description },
    }
}

const fn grade(label: &'static str, description: &'static str) -> Grade {
    Grade { label, description }
}

/// General-purpose scale shared by EMF and composite assessments.
pub const GENERAL: GradeTable = GradeTable {
    tiers: &[
        tier(90.0, "A+", "Excellent"),
        tier(80.0, "A", "Very Good"),
        tier(70.0, "B", "Good"),
        tier(60.0, "C", "Fair"),
    ],
    fallback: grade("D", "Poor"),
};

/// Neighborhood safety scale.
pub const CRIME_SAFETY: GradeTable = GradeTable {
    tiers: &[
        tier(80.0, "A", "Very Safe"),
        tier(65.0, "B", "Safe"),
        tier(50.0, "C", "Moderate"),
        tier(35.0, "D", "Use Caution"),
    ],
    fallback: grade("F", "High Crime"),
};

/// Bedroom checklist scale; the label carries its explanation.
pub const BEDROOM: GradeTable = GradeTable {
    tiers: &[
        tier(90.0, "A+ (Excellent - Low EMF)", "Excellent"),
        tier(80.0, "A (Very Good)", "Very Good"),
        tier(70.0, "B (Good)", "Good"),
        tier(60.0, "C (Fair - Improvements Recommended)", "Fair"),
    ],
    fallback: grade("D (High EMF - Address Required)", "Poor"),
};

/// Climate scale, applied to the climate score (100 - overall risk).
pub const CLIMATE: GradeTable = GradeTable {
    tiers: &[
        tier(80.0, "Excellent (Very Low Risk)", "Very Low Risk"),
        tier(60.0, "Good (Low Risk)", "Low Risk"),
        tier(40.0, "Moderate Risk", "Moderate Risk"),
        tier(20.0, "High Risk", "High Risk"),
    ],
    fallback: grade("Severe Risk", "Severe Risk"),
};

/// Investment rating, applied to the climate score.
pub const CLIMATE_INVESTMENT: GradeTable = GradeTable {
    tiers: &[
        tier(75.0, "A", "Excellent (Low climate risk)"),
        tier(60.0, "B", "Good (Moderate risk, manageable)"),
        tier(40.0, "C", "Fair (Significant risk, mitigation needed)"),
        tier(20.0, "D", "Poor (High risk, major mitigation required)"),
    ],
    fallback: grade("F", "Avoid (Extreme risk, not recommended)"),
};

/// Insurance classification, applied to the climate score.
pub const CLIMATE_INSURANCE: GradeTable = GradeTable {
    tiers: &[
        tier(70.0, "Standard", "Standard coverage"),
        tier(50.0, "Preferred (with mitigation)", "Coverage conditional on mitigation"),
        tier(30.0, "Substandard (premium loading)", "Premium loading applies"),
    ],
    fallback: grade(
        "High Risk (specialized coverage needed)",
        "Specialized coverage needed",
    ),
};

/// Vastu and Feng Shui compatibility scale.
pub const ESOTERIC: GradeTable = GradeTable {
    tiers: &[
        tier(90.0, "A+", "Highly Auspicious"),
        tier(80.0, "A", "Auspicious"),
        tier(70.0, "B", "Favorable"),
        tier(60.0, "C", "Acceptable"),
        tier(50.0, "D", "Needs Remedies"),
    ],
    fallback: grade("F", "Significant Defects"),
};

impl GradeTable {
    pub fn grade(&self, score: f64) -> Grade {
        self.tiers
            .iter()
            .find(|t| score >= t.min)
            .map(|t| t.grade)
            .unwrap_or(self.fallback)
    }

    /// Position of the matching tier; 0 is the best grade, `tiers.len()` the fallback.
    pub fn rank(&self, score: f64) -> usize {
        self.tiers
            .iter()
            .position(|t| score >= t.min)
            .unwrap_or(self.tiers.len())
    }
}
