use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use super::compass::Direction;
use crate::error::FieldViolation;
use crate::request::{check_non_negative, field, Validate};
use crate::scoring::engine::{
    bound_score, truncate_score, LevelThresholds, RiskLevel, ScoreBreakdown, Scorer,
};
use crate::scoring::grade::ESOTERIC;
use crate::scoring::Recommendations;

/// Ideal share of each element, in percent.
const IDEAL_ELEMENT_SHARE: f64 = 20.0;
const AFFLICTION_PENALTY: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Element {
    Wood,
    Fire,
    Earth,
    Metal,
    Water,
}

impl Element {
    /// Productive cycle: the element this one feeds.
    pub fn produces(self) -> Element {
        match self {
            Element::Wood => Element::Fire,
            Element::Fire => Element::Earth,
            Element::Earth => Element::Metal,
            Element::Metal => Element::Water,
            Element::Water => Element::Wood,
        }
    }

    /// Destructive cycle: the element this one overcomes.
    pub fn destroys(self) -> Element {
        match self {
            Element::Wood => Element::Earth,
            Element::Fire => Element::Metal,
            Element::Earth => Element::Water,
            Element::Metal => Element::Wood,
            Element::Water => Element::Fire,
        }
    }

    pub fn colors(self) -> &'static [&'static str] {
        match self {
            Element::Wood => &["green", "brown", "teal"],
            Element::Fire => &["red", "orange", "pink", "purple"],
            Element::Earth => &["yellow", "beige", "tan", "terracotta"],
            Element::Metal => &["white", "gray", "silver", "gold"],
            Element::Water => &["black", "blue", "navy"],
        }
    }

    pub fn objects(self) -> &'static [&'static str] {
        match self {
            Element::Wood => &["Plants", "Wooden furniture", "Bamboo", "Paper art"],
            Element::Fire => &["Candles", "Lamps", "Fireplace", "Sun symbols"],
            Element::Earth => &["Crystals", "Ceramics", "Stones", "Square shapes"],
            Element::Metal => &["Metal sculptures", "Wind chimes", "Coins", "Clocks"],
            Element::Water => &["Fountains", "Aquariums", "Mirrors", "Glass"],
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Element::Wood => "Wood",
            Element::Fire => "Fire",
            Element::Earth => "Earth",
            Element::Metal => "Metal",
            Element::Water => "Water",
        };
        f.write_str(label)
    }
}

/// Life aspect governed by each sector of the bagua map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BaguaArea {
    Career,
    Knowledge,
    Family,
    Wealth,
    Fame,
    Relationships,
    Children,
    HelpfulPeople,
}

fn sector_element(direction: Direction) -> Element {
    match direction {
        Direction::North => Element::Water,
        Direction::Northeast | Direction::Southwest => Element::Earth,
        Direction::East | Direction::Southeast => Element::Wood,
        Direction::South => Element::Fire,
        Direction::West | Direction::Northwest => Element::Metal,
    }
}

fn sector_bagua(direction: Direction) -> BaguaArea {
    match direction {
        Direction::North => BaguaArea::Career,
        Direction::Northeast => BaguaArea::Knowledge,
        Direction::East => BaguaArea::Family,
        Direction::Southeast => BaguaArea::Wealth,
        Direction::South => BaguaArea::Fame,
        Direction::Southwest => BaguaArea::Relationships,
        Direction::West => BaguaArea::Children,
        Direction::Northwest => BaguaArea::HelpfulPeople,
    }
}

/// Lo Shu square number of each direction.
fn lo_shu(direction: Direction) -> u8 {
    match direction {
        Direction::North => 1,
        Direction::Northeast => 8,
        Direction::East => 3,
        Direction::Southeast => 4,
        Direction::South => 9,
        Direction::Southwest => 2,
        Direction::West => 7,
        Direction::Northwest => 6,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StarNature {
    #[serde(rename = "Most Auspicious")]
    MostAuspicious,
    Auspicious,
    Inauspicious,
    #[serde(rename = "Highly Inauspicious")]
    HighlyInauspicious,
}

impl StarNature {
    fn base_score(self) -> f64 {
        match self {
            StarNature::MostAuspicious => 95.0,
            StarNature::Auspicious => 80.0,
            StarNature::Inauspicious => 40.0,
            StarNature::HighlyInauspicious => 20.0,
        }
    }
}

pub struct FlyingStar {
    pub number: u8,
    pub element: Element,
    pub nature: StarNature,
    pub affects: &'static str,
    pub remedies: &'static [&'static str],
}

const FLYING_STARS: [FlyingStar; 9] = [
    FlyingStar {
        number: 1,
        element: Element::Water,
        nature: StarNature::Auspicious,
        affects: "Career, wisdom",
        remedies: &["Enhance with metal", "Water features"],
    },
    FlyingStar {
        number: 2,
        element: Element::Earth,
        nature: StarNature::Inauspicious,
        affects: "Illness",
        remedies: &["Metal wind chimes", "Wu Lou gourd"],
    },
    FlyingStar {
        number: 3,
        element: Element::Wood,
        nature: StarNature::Inauspicious,
        affects: "Arguments, litigation",
        remedies: &["Red objects", "Fire element"],
    },
    FlyingStar {
        number: 4,
        element: Element::Wood,
        nature: StarNature::Auspicious,
        affects: "Romance, education",
        remedies: &["Water features", "Fresh flowers"],
    },
    FlyingStar {
        number: 5,
        element: Element::Earth,
        nature: StarNature::HighlyInauspicious,
        affects: "Misfortune",
        remedies: &["Metal cure", "Salt water cure", "6-rod wind chime"],
    },
    FlyingStar {
        number: 6,
        element: Element::Metal,
        nature: StarNature::Auspicious,
        affects: "Authority, heaven luck",
        remedies: &["Earth crystals", "Ceramics"],
    },
    FlyingStar {
        number: 7,
        element: Element::Metal,
        nature: StarNature::Inauspicious,
        affects: "Violence, theft",
        remedies: &["Water feature", "Blue objects"],
    },
    FlyingStar {
        number: 8,
        element: Element::Earth,
        nature: StarNature::MostAuspicious,
        affects: "Wealth, prosperity",
        remedies: &["Fire element", "Red and purple"],
    },
    FlyingStar {
        number: 9,
        element: Element::Fire,
        nature: StarNature::Auspicious,
        affects: "Future prosperity",
        remedies: &["Wood element", "Plants"],
    },
];

/// Star visiting `sector` for a home facing `facing`.
pub fn sector_star(sector: Direction, facing: Direction) -> &'static FlyingStar {
    let number = (lo_shu(facing) + lo_shu(sector) - 2) % 9 + 1;
    &FLYING_STARS[usize::from(number - 1)]
}

/// Relative amount of each element present in the home.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ElementQuantities {
    pub wood: f64,
    pub fire: f64,
    pub earth: f64,
    pub metal: f64,
    pub water: f64,
}

impl Default for ElementQuantities {
    fn default() -> Self {
        Self {
            wood: 20.0,
            fire: 15.0,
            earth: 25.0,
            metal: 20.0,
            water: 20.0,
        }
    }
}

impl ElementQuantities {
    fn entries(&self) -> [(Element, f64); 5] {
        [
            (Element::Wood, self.wood),
            (Element::Fire, self.fire),
            (Element::Earth, self.earth),
            (Element::Metal, self.metal),
            (Element::Water, self.water),
        ]
    }

    fn total(&self) -> f64 {
        self.entries().iter().map(|(_, v)| v).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FengShuiRequest {
    /// Direction the front door faces
    pub facing: Direction,
    #[serde(default)]
    pub elements: ElementQuantities,
    /// Year for annual afflictions; the current year when absent
    #[serde(default)]
    pub year: Option<i32>,
}

impl Validate for FengShuiRequest {
    fn validate(&self, prefix: &str, out: &mut Vec<FieldViolation>) {
        let path = field(prefix, "elements");
        for (element, value) in self.elements.entries() {
            check_non_negative(out, field(&path, &element.to_string().to_lowercase()), value);
        }
        if !(self.elements.total() > 0.0) {
            out.push(FieldViolation::new(path, "at least one element must be present"));
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorAnalysis {
    pub direction: Direction,
    pub element: Element,
    pub bagua_area: BaguaArea,
    pub star: u8,
    pub star_nature: StarNature,
    pub affects: &'static str,
    pub score: f64,
    pub colors: &'static [&'static str],
    pub objects: &'static [&'static str],
    #[serde(skip)]
    pub remedies: &'static [&'static str],
}

fn analyze_sector(direction: Direction, facing: Direction) -> SectorAnalysis {
    let element = sector_element(direction);
    let star = sector_star(direction, facing);
    let mut score = star.nature.base_score();
    if element.produces() == star.element {
        score += 10.0;
    } else if element.destroys() == star.element {
        score -= 10.0;
    }

    SectorAnalysis {
        direction,
        element,
        bagua_area: sector_bagua(direction),
        star: star.number,
        star_nature: star.nature,
        affects: star.affects,
        score: score.clamp(0.0, 100.0),
        colors: element.colors(),
        objects: element.objects(),
        remedies: star.remedies,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    High,
    Highest,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Affliction {
    pub name: &'static str,
    pub position: &'static str,
    pub severity: Severity,
    pub avoid: &'static [&'static str],
    pub remedies: &'static [&'static str],
}

const TAI_SUI_CYCLE: [&str; 12] = [
    "North",
    "North-Northeast",
    "East-Northeast",
    "East",
    "East-Southeast",
    "South-Southeast",
    "South",
    "South-Southwest",
    "West-Southwest",
    "West",
    "West-Northwest",
    "North-Northwest",
];

const FIVE_YELLOW_CYCLE: [&str; 9] = [
    "Center",
    "Northwest",
    "West",
    "Northeast",
    "South",
    "North",
    "Southwest",
    "East",
    "Southeast",
];

const THREE_KILLINGS_CYCLE: [&str; 4] = ["South", "East", "North", "West"];

const FIVE_YELLOW: &str = "5 Yellow (Wu Wang)";

/// Tai Sui, 5 Yellow and 3 Killings positions for `year`.
pub fn annual_afflictions(year: i32) -> [Affliction; 3] {
    let cycle = |offset: i32, len: usize| (year - offset).rem_euclid(len as i32) as usize;
    [
        Affliction {
            name: "Tai Sui (Grand Duke)",
            position: TAI_SUI_CYCLE[cycle(4, TAI_SUI_CYCLE.len())],
            severity: Severity::High,
            avoid: &["Major renovations", "Disturbing this sector"],
            remedies: &["Pi Yao facing Tai Sui", "Avoid sitting facing this direction"],
        },
        Affliction {
            name: FIVE_YELLOW,
            position: FIVE_YELLOW_CYCLE[cycle(2004, FIVE_YELLOW_CYCLE.len())],
            severity: Severity::Highest,
            avoid: &["Renovations", "Noise", "Ground breaking"],
            remedies: &["6-rod metal wind chime", "Salt water cure", "Wu Lou"],
        },
        Affliction {
            name: "3 Killings (San Sha)",
            position: THREE_KILLINGS_CYCLE[cycle(0, THREE_KILLINGS_CYCLE.len())],
            severity: Severity::High,
            avoid: &["Sitting with back to this direction"],
            remedies: &["3 celestial guardians", "Face this direction"],
        },
    ]
}

/// Everything the overall score is built from.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub sectors: Vec<SectorAnalysis>,
    /// Percent share per element
    pub element_balance: Vec<(Element, f64)>,
    pub afflictions: Vec<Affliction>,
}

impl Chart {
    pub fn cast(request: &FengShuiRequest, year: i32) -> Self {
        let total = request.elements.total();
        let element_balance = request
            .elements
            .entries()
            .iter()
            .map(|(e, v)| (*e, if total > 0.0 { v / total * 100.0 } else { 0.0 }))
            .collect();
        Self {
            sectors: Direction::ALL
                .iter()
                .map(|d| analyze_sector(*d, request.facing))
                .collect(),
            element_balance,
            afflictions: annual_afflictions(year).to_vec(),
        }
    }

    pub fn sector_average(&self) -> f64 {
        self.sectors.iter().map(|s| s.score).sum::<f64>() / self.sectors.len() as f64
    }

    /// 100 minus the total deviation from an even 20% split, floored at 0.
    pub fn balance_score(&self) -> f64 {
        let deviation: f64 = self
            .element_balance
            .iter()
            .map(|(_, share)| (share - IDEAL_ELEMENT_SHARE).abs())
            .sum();
        (100.0 - deviation).max(0.0)
    }
}

pub struct FengShuiScorer<'a> {
    pub levels: &'a LevelThresholds,
}

impl Scorer for FengShuiScorer<'_> {
    type Input = Chart;

    fn compute_raw_risk(&self, chart: &Chart) -> ScoreBreakdown {
        let mut breakdown = ScoreBreakdown::new(0.0);
        let average = chart.sector_average();
        breakdown.add("Sectors", format!("average {:.1} x 0.5", average), average * 0.5);
        let balance = chart.balance_score();
        breakdown.add("Element balance", format!("{:.1} x 0.3", balance), balance * 0.3);
        breakdown.add(
            "Annual afflictions",
            format!("{} x -{}", chart.afflictions.len(), AFFLICTION_PENALTY),
            -AFFLICTION_PENALTY * chart.afflictions.len() as f64,
        );
        breakdown
    }

    fn classify(&self, value: f64) -> RiskLevel {
        self.levels.classify(value)
    }

    /// Whole points only; 59.6 stays a 59.
    fn bound(&self, raw: f64) -> f64 {
        truncate_score(raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RemedyPriority {
    Critical,
    High,
    Medium,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Remedy {
    pub location: String,
    pub issue: String,
    pub remedies: &'static [&'static str],
    pub priority: RemedyPriority,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Enhancement {
    pub location: Direction,
    pub bagua_area: BaguaArea,
    pub current_score: f64,
    pub enhance_with: Vec<&'static str>,
    pub colors: Vec<&'static str>,
    pub benefit: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavorableRoom {
    pub room: &'static str,
    pub direction: Direction,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementShare {
    pub element: Element,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FengShuiAssessment {
    pub feng_shui_score: f64,
    pub grade: &'static str,
    pub level: RiskLevel,
    pub facing: Direction,
    pub year: i32,
    pub sectors: Vec<SectorAnalysis>,
    pub element_balance: Vec<ElementShare>,
    pub balance_score: f64,
    pub annual_afflictions: Vec<Affliction>,
    pub remedies: Vec<Remedy>,
    pub enhancements: Vec<Enhancement>,
    pub favorable_rooms: Vec<FavorableRoom>,
    pub wealth_sectors: Vec<Direction>,
    pub health_concerns: Vec<String>,
    pub recommendations: Vec<String>,
    #[serde(skip)]
    pub breakdown: ScoreBreakdown,
}

fn remedies(chart: &Chart) -> Vec<Remedy> {
    let sectors = chart.sectors.iter().filter(|s| s.score < 50.0).map(|s| Remedy {
        location: s.direction.to_string(),
        issue: s.affects.to_string(),
        remedies: s.remedies,
        priority: if s.score < 30.0 {
            RemedyPriority::High
        } else {
            RemedyPriority::Medium
        },
    });
    let afflictions = chart.afflictions.iter().map(|a| Remedy {
        location: a.position.to_string(),
        issue: a.name.to_string(),
        remedies: a.remedies,
        priority: if a.severity == Severity::Highest {
            RemedyPriority::Critical
        } else {
            RemedyPriority::High
        },
    });
    sectors.chain(afflictions).collect()
}

fn enhancements(chart: &Chart) -> Vec<Enhancement> {
    let mut list: Vec<Enhancement> = chart
        .sectors
        .iter()
        .filter(|s| s.score >= 70.0)
        .map(|s| Enhancement {
            location: s.direction,
            bagua_area: s.bagua_area,
            current_score: s.score,
            enhance_with: s.objects.iter().take(3).copied().collect(),
            colors: s.colors.iter().take(2).copied().collect(),
            benefit: s.affects,
        })
        .collect();
    list.sort_by(|a, b| b.current_score.total_cmp(&a.current_score));
    list
}

const ROOM_PREFERENCES: [(&str, &[BaguaArea]); 5] = [
    ("bedroom", &[BaguaArea::Relationships]),
    ("office", &[BaguaArea::Career, BaguaArea::Wealth]),
    ("kitchen", &[BaguaArea::Family]),
    ("livingRoom", &[BaguaArea::Fame, BaguaArea::Family]),
    ("meditation", &[BaguaArea::Knowledge, BaguaArea::HelpfulPeople]),
];

fn favorable_rooms(chart: &Chart) -> Vec<FavorableRoom> {
    ROOM_PREFERENCES
        .iter()
        .filter_map(|&(room, areas)| {
            let mut best: Option<&SectorAnalysis> = None;
            for sector in chart.sectors.iter().filter(|s| areas.contains(&s.bagua_area)) {
                if sector.score > best.map(|b| b.score).unwrap_or(0.0) {
                    best = Some(sector);
                }
            }
            best.map(|s| FavorableRoom {
                room,
                direction: s.direction,
            })
        })
        .collect()
}

fn wealth_sectors(chart: &Chart) -> Vec<Direction> {
    chart
        .sectors
        .iter()
        .filter(|s| (s.bagua_area == BaguaArea::Wealth && s.score >= 60.0) || s.star == 8)
        .map(|s| s.direction)
        .collect()
}

fn health_concerns(chart: &Chart) -> Vec<String> {
    let illness = chart
        .sectors
        .iter()
        .filter(|s| s.star == 2)
        .map(|s| format!("Illness star 2 in {} - use metal cure", s.direction));
    let five_yellow = chart
        .afflictions
        .iter()
        .filter(|a| a.name == FIVE_YELLOW)
        .map(|a| format!("5 Yellow in {} - major health risk", a.position));
    illness.chain(five_yellow).collect()
}

const FENG_SHUI_BASELINE: &[&str] = &[
    "Keep the main entrance clear and well lit",
    "Clear clutter so energy can circulate",
];

fn recommendations(remedies: &[Remedy], chart: &Chart) -> Vec<String> {
    let mut recs = Recommendations::new();
    for remedy in remedies {
        recs.push(format!(
            "{} ({}): {}",
            remedy.location,
            remedy.issue,
            remedy.remedies.join(", ")
        ));
    }
    for share in &chart.element_balance {
        recs.push_if(
            share.1 < 10.0,
            format!("Add {} element items to restore balance", share.0),
        );
    }
    recs.finish(FENG_SHUI_BASELINE)
}

/// Flying-star, element balance and annual affliction reading of a home.
pub fn assess_feng_shui(
    request: &FengShuiRequest,
    current_year: i32,
    levels: &LevelThresholds,
) -> FengShuiAssessment {
    let year = request.year.unwrap_or(current_year);
    let chart = Chart::cast(request, year);
    let scored = FengShuiScorer { levels }.score(&chart);
    let remedies = remedies(&chart);
    debug!(facing = %request.facing, year, score = scored.value, "feng shui assessment complete");

    FengShuiAssessment {
        feng_shui_score: scored.value,
        grade: ESOTERIC.grade(scored.value).label,
        level: scored.level,
        facing: request.facing,
        year,
        element_balance: chart
            .element_balance
            .iter()
            .map(|(element, percent)| ElementShare {
                element: *element,
                percent: (percent * 10.0).round() / 10.0,
            })
            .collect(),
        balance_score: bound_score(chart.balance_score()),
        enhancements: enhancements(&chart),
        favorable_rooms: favorable_rooms(&chart),
        wealth_sectors: wealth_sectors(&chart),
        health_concerns: health_concerns(&chart),
        recommendations: recommendations(&remedies, &chart),
        remedies,
        annual_afflictions: chart.afflictions,
        sectors: chart.sectors,
        breakdown: scored.breakdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::EsotericConfig;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn south_facing() -> FengShuiRequest {
        FengShuiRequest {
            facing: Direction::South,
            elements: ElementQuantities::default(),
            year: Some(2026),
        }
    }

    #[test]
    fn test_flying_star_numbers() {
        assert_eq!(sector_star(Direction::North, Direction::South).number, 9);
        assert_eq!(sector_star(Direction::South, Direction::South).number, 8);
        assert_eq!(sector_star(Direction::Southwest, Direction::South).number, 1);
        assert_eq!(sector_star(Direction::North, Direction::North).number, 1);
    }

    #[test]
    fn test_sector_scores_follow_element_cycles() {
        let chart = Chart::cast(&south_facing(), 2026);
        let scores: Vec<f64> = chart.sectors.iter().map(|s| s.score).collect();
        // N, NE, E, SE, S, SW, W, NW
        assert_eq!(scores, vec![70.0, 50.0, 30.0, 40.0, 100.0, 70.0, 80.0, 20.0]);
        assert_eq!(chart.sector_average(), 57.5);
        assert_eq!(chart.balance_score(), 90.0);
    }

    #[test]
    fn test_annual_afflictions() {
        let afflictions = annual_afflictions(2026);
        assert_eq!(afflictions[0].position, "South");
        assert_eq!(afflictions[1].position, "South");
        assert_eq!(afflictions[2].position, "North");
        // Years before the cycle origin wrap instead of panicking
        assert_eq!(annual_afflictions(2000)[1].position, "Southwest");
    }

    #[test]
    fn test_overall_score() {
        let levels = EsotericConfig::default().levels;
        let result = assess_feng_shui(&south_facing(), 1999, &levels);
        // 0.5 x 57.5 + 0.3 x 90 - 15 = 40.75, fraction dropped
        assert_eq!(result.feng_shui_score, 40.0);
        assert_eq!(result.grade, "F");
        assert_eq!(result.level, RiskLevel::High);
        assert_eq!(result.year, 2026);
    }

    #[test]
    fn test_derived_lists() {
        let levels = EsotericConfig::default().levels;
        let result = assess_feng_shui(&south_facing(), 2026, &levels);

        let remedy_locations: Vec<&str> = result.remedies.iter().map(|r| r.location.as_str()).collect();
        assert_eq!(
            remedy_locations,
            vec!["East", "Southeast", "Northwest", "South", "South", "North"]
        );
        assert_eq!(result.remedies[2].priority, RemedyPriority::High);
        assert_eq!(result.remedies[4].priority, RemedyPriority::Critical);

        let enhanced: Vec<Direction> = result.enhancements.iter().map(|e| e.location).collect();
        assert_eq!(
            enhanced,
            vec![Direction::South, Direction::West, Direction::North, Direction::Southwest]
        );
        assert_eq!(result.enhancements[0].enhance_with.len(), 3);
        assert_eq!(result.wealth_sectors, vec![Direction::South]);
        assert_eq!(
            result.health_concerns,
            vec![
                "Illness star 2 in East - use metal cure",
                "5 Yellow in South - major health risk",
            ]
        );

        let rooms: Vec<(&str, Direction)> =
            result.favorable_rooms.iter().map(|r| (r.room, r.direction)).collect();
        assert_eq!(
            rooms,
            vec![
                ("bedroom", Direction::Southwest),
                ("office", Direction::North),
                ("kitchen", Direction::East),
                ("livingRoom", Direction::South),
                ("meditation", Direction::Northeast),
            ]
        );
        assert_eq!(
            result.recommendations.last().map(String::as_str),
            FENG_SHUI_BASELINE.last().copied()
        );
    }

    #[test]
    fn test_element_shortage_recommended() {
        let levels = EsotericConfig::default().levels;
        let request = FengShuiRequest {
            elements: ElementQuantities {
                wood: 40.0,
                fire: 0.0,
                earth: 30.0,
                metal: 20.0,
                water: 10.0,
            },
            ..south_facing()
        };
        let result = assess_feng_shui(&request, 2026, &levels);
        assert!(result
            .recommendations
            .contains(&"Add Fire element items to restore balance".to_string()));
        // Deviation 20 + 20 + 10 + 0 + 10 = 60
        assert_eq!(result.balance_score, 40.0);
    }

    #[test]
    fn test_empty_elements_rejected() {
        let yaml = "facing: north\nelements: { wood: 0, fire: 0, earth: 0, metal: 0, water: 0 }\n";
        let result: crate::error::Result<FengShuiRequest> =
            crate::request::parse_request(yaml, crate::request::RequestFormat::Yaml);
        assert!(result.is_err());
    }

    proptest! {
        #[test]
        fn prop_feng_shui_score_is_bounded(
            facing in proptest::sample::select(Direction::ALL.to_vec()),
            quantities in proptest::array::uniform5(0.0f64..100.0),
            year in -3000i32..3000,
        ) {
            prop_assume!(quantities.iter().sum::<f64>() > 0.0);
            let levels = EsotericConfig::default().levels;
            let request = FengShuiRequest {
                facing,
                elements: ElementQuantities {
                    wood: quantities[0],
                    fire: quantities[1],
                    earth: quantities[2],
                    metal: quantities[3],
                    water: quantities[4],
                },
                year: Some(year),
            };
            let first = assess_feng_shui(&request, 2026, &levels);
            prop_assert!((0.0..=100.0).contains(&first.feng_shui_score));
            prop_assert_eq!(first.feng_shui_score, first.feng_shui_score.trunc());
            prop_assert!((0.0..=100.0).contains(&first.balance_score));
            prop_assert!(!first.recommendations.is_empty());

            let second = assess_feng_shui(&request, 2026, &levels);
            prop_assert_eq!(
                serde_json::to_string(&first).unwrap(),
                serde_json::to_string(&second).unwrap()
            );
        }
    }
}
