pub mod composite;
pub mod config;
pub mod engine;
pub mod factors;
pub mod grade;
pub mod normalize;
pub mod recommend;
pub mod validation;

pub use composite::{aggregate, ComponentResult, CompositeAssessment, Domain};
pub use config::*;
pub use engine::{DomainScore, LevelThresholds, RiskLevel, ScoreBreakdown, Scorer};
pub use factors::{Effect, RangeOp};
pub use grade::{Grade, GradeTable};
pub use recommend::Recommendations;
pub use validation::validate_scoring;
