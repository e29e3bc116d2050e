use serde::{Deserialize, Serialize};
use tracing::debug;

use super::compass::Direction;
use crate::error::FieldViolation;
use crate::request::{check_unit_interval, field, Validate};
use crate::scoring::engine::{RiskLevel, ScoreBreakdown, Scorer};
use crate::scoring::grade::ESOTERIC;
use crate::scoring::{EsotericConfig, Recommendations};

/// Share of the center that may be occupied before it counts as blocked.
const OPEN_CENTER_LIMIT: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomKind {
    Kitchen,
    Bedroom,
    Bathroom,
    LivingRoom,
    PoojaRoom,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    #[serde(rename = "type")]
    pub kind: RoomKind,
    pub location: Direction,
    #[serde(default)]
    pub is_master: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VastuRequest {
    pub entrance: Direction,
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub beam_above_bed: bool,
    /// Occupied fraction of the central zone; the rule is skipped when absent
    #[serde(default)]
    pub center_occupancy: Option<f64>,
}

impl VastuRequest {
    fn first(&self, kind: RoomKind) -> Option<&Room> {
        self.rooms.iter().find(|r| r.kind == kind)
    }

    fn has(&self, kind: RoomKind) -> bool {
        self.first(kind).is_some()
    }
}

impl Validate for VastuRequest {
    fn validate(&self, prefix: &str, out: &mut Vec<FieldViolation>) {
        if let Some(occupancy) = self.center_occupancy {
            check_unit_interval(out, field(prefix, "centerOccupancy"), occupancy);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleKind {
    /// Adds its impact when satisfied, offsetting deductions up to the cap
    Ideal,
    /// Subtracts its impact when triggered
    Defect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    Critical,
    Moderate,
    Minor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RemedyKind {
    Structural,
    Placement,
    Symbolic,
    Energetic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VastuRemedy {
    #[serde(rename = "type")]
    pub kind: RemedyKind,
    pub description: &'static str,
    pub cost_estimate: u32,
    /// Percent
    pub effectiveness: u8,
}

const fn remedy(
    kind: RemedyKind,
    description: &'static str,
    cost_estimate: u32,
    effectiveness: u8,
) -> VastuRemedy {
    VastuRemedy {
        kind,
        description,
        cost_estimate,
        effectiveness,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Check {
    NotApplicable,
    Satisfied(String),
    Violated(String),
}

#[derive(Debug)]
pub struct Rule {
    pub id: &'static str,
    pub name: &'static str,
    pub category: &'static str,
    pub kind: RuleKind,
    pub severity: Severity,
    pub impact: f64,
    pub principle: &'static str,
    /// Ordered most effective first
    pub remedies: &'static [VastuRemedy],
    check: fn(&VastuRequest) -> Check,
}

fn check_entrance_ideal(req: &VastuRequest) -> Check {
    let description = format!("Entrance is in {} direction", req.entrance);
    match req.entrance {
        Direction::East | Direction::North => Check::Satisfied(description),
        _ => Check::Violated(description),
    }
}

fn check_entrance_avoid(req: &VastuRequest) -> Check {
    match req.entrance {
        Direction::South | Direction::Southwest => Check::Violated(format!(
            "Entrance is in {} direction (not recommended)",
            req.entrance
        )),
        _ => Check::Satisfied(format!("Entrance is in {} direction", req.entrance)),
    }
}

fn check_kitchen_southeast(req: &VastuRequest) -> Check {
    match req.first(RoomKind::Kitchen) {
        None => Check::NotApplicable,
        Some(k) if k.location == Direction::Southeast => {
            Check::Satisfied("Kitchen is in Southeast".to_string())
        }
        Some(k) => Check::Violated(format!("Kitchen is in {} (expected: Southeast)", k.location)),
    }
}

fn check_kitchen_northeast(req: &VastuRequest) -> Check {
    match req.first(RoomKind::Kitchen) {
        None => Check::NotApplicable,
        Some(k) if k.location == Direction::Northeast => {
            Check::Violated("Kitchen in Northeast - critical Vastu defect".to_string())
        }
        Some(k) => Check::Satisfied(format!("Kitchen is in {}", k.location)),
    }
}

fn check_master_bedroom(req: &VastuRequest) -> Check {
    let master = req
        .rooms
        .iter()
        .find(|r| r.kind == RoomKind::Bedroom && r.is_master);
    match master {
        None => Check::NotApplicable,
        Some(b) if b.location == Direction::Southwest => {
            Check::Satisfied("Master bedroom in Southwest".to_string())
        }
        Some(b) => Check::Violated(format!("Master bedroom in {}", b.location)),
    }
}

fn check_beam(req: &VastuRequest) -> Check {
    if !req.has(RoomKind::Bedroom) {
        Check::NotApplicable
    } else if req.beam_above_bed {
        Check::Violated("Overhead beam detected above bed".to_string())
    } else {
        Check::Satisfied("No beam above bed".to_string())
    }
}

fn check_bathroom_northeast(req: &VastuRequest) -> Check {
    if !req.has(RoomKind::Bathroom) {
        return Check::NotApplicable;
    }
    let in_northeast = req
        .rooms
        .iter()
        .any(|r| r.kind == RoomKind::Bathroom && r.location == Direction::Northeast);
    if in_northeast {
        Check::Violated("Bathroom in Northeast".to_string())
    } else {
        Check::Satisfied("No bathroom in Northeast".to_string())
    }
}

fn check_center(req: &VastuRequest) -> Check {
    match req.center_occupancy {
        None => Check::NotApplicable,
        Some(occupancy) => {
            let percent = (occupancy * 100.0).round();
            if occupancy < OPEN_CENTER_LIMIT {
                Check::Satisfied(format!("Center open ({}% occupied)", percent))
            } else {
                Check::Violated(format!("Center cluttered ({}% occupied)", percent))
            }
        }
    }
}

pub static RULES: [Rule; 8] = [
    Rule {
        id: "ENTRANCE_001",
        name: "East or North Entrance",
        category: "entrance",
        kind: RuleKind::Ideal,
        severity: Severity::Critical,
        impact: 15.0,
        principle: "East is ruled by Indra and North by Kubera; both draw prosperity in",
        remedies: &[],
        check: check_entrance_ideal,
    },
    Rule {
        id: "ENTRANCE_002",
        name: "South or Southwest Entrance - Avoid",
        category: "entrance",
        kind: RuleKind::Defect,
        severity: Severity::Critical,
        impact: 20.0,
        principle: "The southwest is ruled by Nirriti and invites obstacles",
        remedies: &[
            remedy(RemedyKind::Structural, "Relocate entrance to East or North", 25_000, 100),
            remedy(
                RemedyKind::Placement,
                "Place a Ganesha idol outside the entrance and hang a sacred toran",
                500,
                60,
            ),
            remedy(
                RemedyKind::Symbolic,
                "Install a Vastu pyramid and paint the door in protective colors",
                200,
                40,
            ),
        ],
        check: check_entrance_avoid,
    },
    Rule {
        id: "KITCHEN_001",
        name: "Southeast Kitchen - Agni Direction",
        category: "kitchen",
        kind: RuleKind::Ideal,
        severity: Severity::Critical,
        impact: 15.0,
        principle: "The southeast is ruled by Agni, the fire deity",
        remedies: &[],
        check: check_kitchen_southeast,
    },
    Rule {
        id: "KITCHEN_002",
        name: "Northeast Kitchen - Strictly Avoid",
        category: "kitchen",
        kind: RuleKind::Defect,
        severity: Severity::Critical,
        impact: 30.0,
        principle: "The northeast is the most sacred zone and must not hold fire",
        remedies: &[
            remedy(RemedyKind::Structural, "Relocate kitchen to Southeast", 50_000, 100),
            remedy(
                RemedyKind::Energetic,
                "Perform Vastu Shanti puja and place a water feature in the northeast",
                1_000,
                30,
            ),
        ],
        check: check_kitchen_northeast,
    },
    Rule {
        id: "BEDROOM_001",
        name: "Southwest Master Bedroom - Stability",
        category: "bedroom",
        kind: RuleKind::Ideal,
        severity: Severity::Moderate,
        impact: 10.0,
        principle: "The southwest grounds the household and strengthens relationships",
        remedies: &[],
        check: check_master_bedroom,
    },
    Rule {
        id: "BEDROOM_002",
        name: "Overhead Beam Above Bed",
        category: "bedroom",
        kind: RuleKind::Defect,
        severity: Severity::Minor,
        impact: 5.0,
        principle: "A beam over the sleeper presses down on rest and health",
        remedies: &[
            remedy(RemedyKind::Structural, "Install a false ceiling to hide the beam", 1_500, 100),
            remedy(RemedyKind::Placement, "Move the bed out from under the beam", 0, 80),
            remedy(RemedyKind::Symbolic, "Hang a fabric canopy above the bed", 200, 60),
        ],
        check: check_beam,
    },
    Rule {
        id: "BATHROOM_001",
        name: "Northeast Bathroom - Critical Defect",
        category: "bathroom",
        kind: RuleKind::Defect,
        severity: Severity::Critical,
        impact: 25.0,
        principle: "The northeast is the sacred water zone and a bathroom pollutes it",
        remedies: &[
            remedy(RemedyKind::Structural, "Relocate bathroom to West or Northwest", 40_000, 100),
            remedy(
                RemedyKind::Energetic,
                "Keep the door closed and install a Vastu yantra",
                100,
                20,
            ),
        ],
        check: check_bathroom_northeast,
    },
    Rule {
        id: "CENTER_001",
        name: "Open Brahmasthan - Energy Flow",
        category: "center",
        kind: RuleKind::Ideal,
        severity: Severity::Critical,
        impact: 15.0,
        principle: "The center must stay open for energy to circulate",
        remedies: &[],
        check: check_center,
    },
];

/// A rule together with its verdict for one request.
#[derive(Debug, Clone)]
pub struct RuleOutcome {
    pub rule: &'static Rule,
    pub check: Check,
}

impl RuleOutcome {
    /// Signed change this outcome makes to the score.
    pub fn score_impact(&self) -> f64 {
        match (self.rule.kind, &self.check) {
            (RuleKind::Ideal, Check::Satisfied(_)) => self.rule.impact,
            (RuleKind::Defect, Check::Violated(_)) => -self.rule.impact,
            _ => 0.0,
        }
    }
}

/// Evaluate every rule in table order, skipping those that do not apply.
pub fn evaluate(request: &VastuRequest) -> Vec<RuleOutcome> {
    RULES
        .iter()
        .map(|rule| RuleOutcome {
            rule,
            check: (rule.check)(request),
        })
        .filter(|o| o.check != Check::NotApplicable)
        .collect()
}

pub struct VastuScorer<'a> {
    pub config: &'a EsotericConfig,
}

impl Scorer for VastuScorer<'_> {
    type Input = [RuleOutcome];

    fn compute_raw_risk(&self, outcomes: &[RuleOutcome]) -> ScoreBreakdown {
        let mut breakdown = ScoreBreakdown::new(self.config.vastu_baseline);
        for outcome in outcomes {
            let delta = outcome.score_impact();
            if delta != 0.0 {
                breakdown.add(outcome.rule.name, outcome.rule.id, delta);
            }
        }
        breakdown
    }

    fn classify(&self, value: f64) -> RiskLevel {
        self.config.levels.classify(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Strength {
    pub rule: &'static str,
    pub description: String,
    pub score_impact: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub rule: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub description: String,
    pub principle: &'static str,
    pub remedies: &'static [VastuRemedy],
    pub score_impact: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VastuAssessment {
    pub vastu_score: f64,
    pub grade: &'static str,
    pub grade_description: &'static str,
    pub level: RiskLevel,
    pub entrance: Direction,
    pub rules_checked: usize,
    pub strengths: Vec<Strength>,
    pub issues: Vec<Issue>,
    pub recommendations: Vec<String>,
    #[serde(skip)]
    pub breakdown: ScoreBreakdown,
}

const VASTU_BASELINE: &[&str] = &[
    "Keep the Brahmasthan (center) open and uncluttered",
    "Keep the northeast corner clean, light and free of heavy furniture",
];

fn recommendations(issues: &[Issue]) -> Vec<String> {
    let mut recs = Recommendations::new();
    for issue in issues {
        let Some(best) = issue.remedies.first() else {
            continue;
        };
        recs.push(format!(
            "{}: {} (est. cost {}, {}% effective)",
            issue.rule, best.description, best.cost_estimate, best.effectiveness
        ));
        let cheapest = issue.remedies.iter().skip(1).min_by_key(|r| r.cost_estimate);
        if let Some(alt) = cheapest {
            recs.push(format!(
                "Lower-cost alternative: {} (est. cost {}, {}% effective)",
                alt.description, alt.cost_estimate, alt.effectiveness
            ));
        }
    }
    recs.finish(VASTU_BASELINE)
}

/// Apply the Vastu rule table to a floor plan.
pub fn assess_vastu(request: &VastuRequest, config: &EsotericConfig) -> VastuAssessment {
    let outcomes = evaluate(request);
    let scored = VastuScorer { config }.score(outcomes.as_slice());

    let mut strengths = Vec::new();
    let mut issues = Vec::new();
    for outcome in &outcomes {
        match &outcome.check {
            Check::Satisfied(description) if outcome.rule.kind == RuleKind::Ideal => {
                strengths.push(Strength {
                    rule: outcome.rule.name,
                    description: description.clone(),
                    score_impact: outcome.score_impact(),
                });
            }
            Check::Violated(description) if outcome.rule.kind == RuleKind::Defect => {
                issues.push(Issue {
                    rule: outcome.rule.name,
                    category: outcome.rule.category,
                    severity: outcome.rule.severity,
                    description: description.clone(),
                    principle: outcome.rule.principle,
                    remedies: outcome.rule.remedies,
                    score_impact: outcome.score_impact(),
                });
            }
            _ => {}
        }
    }
    debug!(
        entrance = %request.entrance,
        rules = outcomes.len(),
        issues = issues.len(),
        score = scored.value,
        "vastu assessment complete"
    );

    let grade = ESOTERIC.grade(scored.value);
    VastuAssessment {
        vastu_score: scored.value,
        grade: grade.label,
        grade_description: grade.description,
        level: scored.level,
        entrance: request.entrance,
        rules_checked: outcomes.len(),
        strengths,
        recommendations: recommendations(&issues),
        issues,
        breakdown: scored.breakdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RiskError;
    use crate::request::{parse_request, RequestFormat};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn room(kind: RoomKind, location: Direction, is_master: bool) -> Room {
        Room {
            kind,
            location,
            is_master,
        }
    }

    #[test]
    fn test_ideal_layout_is_capped() {
        let request = VastuRequest {
            entrance: Direction::East,
            rooms: vec![
                room(RoomKind::Kitchen, Direction::Southeast, false),
                room(RoomKind::Bedroom, Direction::Southwest, true),
                room(RoomKind::Bathroom, Direction::West, false),
            ],
            beam_above_bed: false,
            center_occupancy: Some(0.1),
        };
        let result = assess_vastu(&request, &EsotericConfig::default());
        // 100 + 15 + 15 + 10 + 15, capped
        assert_eq!(result.vastu_score, 100.0);
        assert_eq!(result.grade, "A+");
        assert_eq!(result.level, RiskLevel::Low);
        assert!(result.issues.is_empty());
        assert_eq!(result.strengths.len(), 4);
        assert_eq!(result.rules_checked, 8);
        assert_eq!(result.recommendations, VASTU_BASELINE.to_vec());
    }

    #[test]
    fn test_every_defect_triggered() {
        let request = VastuRequest {
            entrance: Direction::Southwest,
            rooms: vec![
                room(RoomKind::Kitchen, Direction::Northeast, false),
                room(RoomKind::Bedroom, Direction::West, true),
                room(RoomKind::Bathroom, Direction::Northeast, false),
            ],
            beam_above_bed: true,
            center_occupancy: Some(0.5),
        };
        let result = assess_vastu(&request, &EsotericConfig::default());
        // 100 - 20 - 30 - 5 - 25 = 20
        assert_eq!(result.vastu_score, 20.0);
        assert_eq!(result.grade, "F");
        assert_eq!(result.level, RiskLevel::High);
        assert!(result.strengths.is_empty());
        assert_eq!(result.issues.len(), 4);

        let impacts: Vec<f64> = result.issues.iter().map(|i| i.score_impact).collect();
        assert_eq!(impacts, vec![-20.0, -30.0, -5.0, -25.0]);
        assert_eq!(
            result.issues[0].description,
            "Entrance is in Southwest direction (not recommended)"
        );
        assert_eq!(
            result.recommendations[0],
            "South or Southwest Entrance - Avoid: Relocate entrance to East or North (est. cost 25000, 100% effective)"
        );
        assert!(result.recommendations[1].starts_with("Lower-cost alternative: Install a Vastu pyramid"));
    }

    #[test]
    fn test_rules_without_rooms_are_skipped() {
        let request = VastuRequest {
            entrance: Direction::West,
            rooms: Vec::new(),
            beam_above_bed: true,
            center_occupancy: None,
        };
        let result = assess_vastu(&request, &EsotericConfig::default());
        assert_eq!(result.rules_checked, 2);
        assert_eq!(result.vastu_score, 100.0);
        assert_eq!(result.grade, "A+");
        assert_eq!(result.level, RiskLevel::Low);
        assert!(result.issues.is_empty());
        assert_eq!(result.recommendations, VASTU_BASELINE.to_vec());
    }

    #[test]
    fn test_layout_without_defects_is_perfect() {
        let request = VastuRequest {
            entrance: Direction::West,
            rooms: vec![room(RoomKind::LivingRoom, Direction::North, false)],
            beam_above_bed: false,
            center_occupancy: None,
        };
        let result = assess_vastu(&request, &EsotericConfig::default());
        assert_eq!(result.vastu_score, 100.0);
        assert_eq!(result.grade, "A+");
        assert_eq!(result.grade_description, "Highly Auspicious");
        assert_eq!(result.level, RiskLevel::Low);
        assert!(result.issues.is_empty());
    }

    #[test]
    fn test_ideals_offset_deductions() {
        let request = VastuRequest {
            entrance: Direction::South,
            rooms: vec![room(RoomKind::Kitchen, Direction::Southeast, false)],
            beam_above_bed: false,
            center_occupancy: Some(0.1),
        };
        let result = assess_vastu(&request, &EsotericConfig::default());
        // 100 - 20 + 15 + 15, capped
        assert_eq!(result.vastu_score, 100.0);
        assert_eq!(result.issues.len(), 1);

        let request = VastuRequest {
            center_occupancy: Some(0.6),
            ..request
        };
        // 100 - 20 + 15
        assert_eq!(assess_vastu(&request, &EsotericConfig::default()).vastu_score, 95.0);
    }

    #[test]
    fn test_baseline_follows_config() {
        let config = EsotericConfig {
            vastu_baseline: 60.0,
            ..EsotericConfig::default()
        };
        let request = VastuRequest {
            entrance: Direction::North,
            rooms: Vec::new(),
            beam_above_bed: false,
            center_occupancy: None,
        };
        assert_eq!(assess_vastu(&request, &config).vastu_score, 75.0);
    }

    #[test]
    fn test_parse_request_document() {
        let yaml = "\
entrance: ne
rooms:
  - type: kitchen
    location: southeast
  - type: garage
    location: west
  - type: bathroom
    location: northeast
centerOccupancy: 0.6
";
        let request: VastuRequest = parse_request(yaml, RequestFormat::Yaml).unwrap();
        assert_eq!(request.rooms[1].kind, RoomKind::Unknown);
        let result = assess_vastu(&request, &EsotericConfig::default());
        // 100 - 25 (bathroom) + 15 (kitchen)
        assert_eq!(result.vastu_score, 90.0);
        assert_eq!(result.grade, "A+");
    }

    #[test]
    fn test_center_occupancy_out_of_range() {
        let result: crate::error::Result<VastuRequest> =
            parse_request(r#"{"entrance": "east", "centerOccupancy": 1.5}"#, RequestFormat::Json);
        match result {
            Err(RiskError::Validation { violations }) => {
                assert_eq!(violations[0].field, "centerOccupancy");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    fn any_room() -> impl Strategy<Value = Room> {
        let kinds = vec![
            RoomKind::Kitchen,
            RoomKind::Bedroom,
            RoomKind::Bathroom,
            RoomKind::LivingRoom,
            RoomKind::PoojaRoom,
            RoomKind::Unknown,
        ];
        (
            proptest::sample::select(kinds),
            proptest::sample::select(Direction::ALL.to_vec()),
            any::<bool>(),
        )
            .prop_map(|(kind, location, is_master)| room(kind, location, is_master))
    }

    proptest! {
        #[test]
        fn prop_vastu_score_is_bounded(
            entrance in proptest::sample::select(Direction::ALL.to_vec()),
            rooms in proptest::collection::vec(any_room(), 0..10),
            beam_above_bed in any::<bool>(),
            center_occupancy in proptest::option::of(0.0f64..=1.0),
        ) {
            let config = EsotericConfig::default();
            let request = VastuRequest {
                entrance,
                rooms,
                beam_above_bed,
                center_occupancy,
            };
            let first = assess_vastu(&request, &config);
            prop_assert!((0.0..=100.0).contains(&first.vastu_score));
            prop_assert!(!first.recommendations.is_empty());
            if first.issues.is_empty() {
                prop_assert_eq!(first.vastu_score, 100.0);
            }

            let second = assess_vastu(&request, &config);
            prop_assert_eq!(
                serde_json::to_string(&first).unwrap(),
                serde_json::to_string(&second).unwrap()
            );
        }
    }
}
