use owo_colors::OwoColorize;
use serde::Serialize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::domains::bedroom::BedroomAssessment;
use crate::domains::climate::ClimateAssessment;
use crate::domains::crime::{CrimeAssessment, HeatmapAssessment};
use crate::domains::emf::EmfAssessment;
use crate::domains::esoteric::EsotericAssessment;
use crate::domains::feng_shui::FengShuiAssessment;
use crate::domains::vastu::VastuAssessment;
use crate::scoring::{CompositeAssessment, RiskLevel};

/// Fallback wrap width when stdout is not a terminal.
const DEFAULT_WIDTH: usize = 80;
/// Never wrap narrower than this, however small the terminal.
const MIN_WIDTH: usize = 40;

/// Any finished assessment. Serializes as the bare assessment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Report {
    Emf(EmfAssessment),
    Crime(CrimeAssessment),
    Heatmap(HeatmapAssessment),
    Climate(ClimateAssessment),
    FengShui(FengShuiAssessment),
    Vastu(VastuAssessment),
    Esoteric(EsotericAssessment),
    Bedroom(BedroomAssessment),
    Composite(CompositeAssessment),
}

impl Report {
    pub fn kind(&self) -> &'static str {
        match self {
            Report::Emf(_) => "emf",
            Report::Crime(_) => "crime",
            Report::Heatmap(_) => "heatmap",
            Report::Climate(_) => "climate",
            Report::FengShui(_) => "fengShui",
            Report::Vastu(_) => "vastu",
            Report::Esoteric(_) => "esoteric",
            Report::Bedroom(_) => "bedroom",
            Report::Composite(_) => "composite",
        }
    }
}

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes
pub fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Greedy word wrap. Continuation lines are indented by `indent` spaces.
pub fn wrap(text: &str, width: usize, indent: usize) -> String {
    let width = width.max(indent + 10);
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let limit = if lines.is_empty() { width } else { width - indent };
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > limit {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines.join(&format!("\n{}", " ".repeat(indent)))
}

fn level_label(level: RiskLevel, use_colors: bool) -> String {
    let label = format!("{} risk", level);
    if !use_colors {
        return label;
    }
    match level {
        RiskLevel::Low => label.green().to_string(),
        RiskLevel::Moderate => label.yellow().to_string(),
        RiskLevel::High => label.red().to_string(),
        RiskLevel::Extreme => label.red().bold().to_string(),
    }
}

fn heading(text: &str, use_colors: bool) -> String {
    if use_colors {
        text.bold().to_string()
    } else {
        text.to_string()
    }
}

fn headline(title: &str, score: f64, grade: &str, level: RiskLevel, use_colors: bool) -> String {
    let score = format!("{:.0}/100", score);
    if use_colors {
        format!(
            "{}: {} ({})  {}",
            title.bold(),
            score.bold(),
            grade.cyan(),
            level_label(level, true)
        )
    } else {
        format!("{}: {} ({})  {}", title, score, grade, level_label(level, false))
    }
}

fn bullets<S: AsRef<str>>(title: &str, items: &[S], width: usize, use_colors: bool) -> Option<String> {
    if items.is_empty() {
        return None;
    }
    let mut out = vec![heading(title, use_colors)];
    out.extend(
        items
            .iter()
            .map(|item| format!("  - {}", wrap(item.as_ref(), width - 4, 4))),
    );
    Some(out.join("\n"))
}

fn simulated_note(simulated: bool, use_colors: bool) -> Option<String> {
    if !simulated {
        return None;
    }
    let note = "Note: based on simulated data";
    Some(if use_colors {
        note.dimmed().to_string()
    } else {
        note.to_string()
    })
}

/// Render a report for the terminal. `width` of `None` means not a terminal.
pub fn format_report(report: &Report, use_colors: bool, width: Option<usize>) -> String {
    let width = width.unwrap_or(DEFAULT_WIDTH).max(MIN_WIDTH);
    let sections: Vec<Option<String>> = match report {
        Report::Emf(a) => format_emf(a, use_colors, width),
        Report::Crime(a) => format_crime(a, use_colors, width),
        Report::Heatmap(a) => format_heatmap(a, use_colors),
        Report::Climate(a) => format_climate(a, use_colors, width),
        Report::FengShui(a) => format_feng_shui(a, use_colors, width),
        Report::Vastu(a) => format_vastu(a, use_colors, width),
        Report::Esoteric(a) => format_esoteric(a, use_colors, width),
        Report::Bedroom(a) => format_bedroom(a, use_colors, width),
        Report::Composite(a) => format_composite(a, use_colors, width),
    };
    sections.into_iter().flatten().collect::<Vec<_>>().join("\n\n")
}

/// Pretty-printed JSON of the bare assessment.
pub fn format_json(report: &Report) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

fn format_emf(a: &EmfAssessment, use_colors: bool, width: usize) -> Vec<Option<String>> {
    let title = format!("EMF exposure - {}", a.grade.description);
    let subs = format!(
        "  External: {:.0}/100 from {} source(s)  {}\n  Internal: {:.0}/100 from {} source(s)  {}",
        a.external_risk.score,
        a.external_risk.source_count,
        level_label(a.external_risk.level, use_colors),
        a.internal_risk.score,
        a.internal_risk.source_count,
        level_label(a.internal_risk.level, use_colors),
    );
    let review = a
        .professional_assessment_needed
        .then(|| "A professional EMF survey is recommended.".to_string());
    vec![
        Some(format!(
            "{}\n{}",
            headline(&title, a.emf_score, a.grade.label, a.level, use_colors),
            subs
        )),
        bullets("Hotspots", &a.hotspots, width, use_colors),
        review,
        bullets("Recommendations", &a.recommendations, width, use_colors),
    ]
}

fn format_crime(a: &CrimeAssessment, use_colors: bool, width: usize) -> Vec<Option<String>> {
    let title = format!("Safety in {} ({} mi)", a.location, a.radius);
    let stats = format!(
        "  Crime rate: {:.1} per 1,000 residents, {}\n  Incidents: {:.0} ({:.0} violent, {:.0} property, {:.0} other)\n  {}",
        a.crime_rate,
        a.compared_to_national,
        a.total_crimes,
        a.breakdown.violent,
        a.breakdown.property,
        a.breakdown.other,
        a.safety_score.description,
    );
    vec![
        Some(format!(
            "{}\n{}",
            headline(&title, a.safety_score.score, a.safety_score.grade, a.level, use_colors),
            stats
        )),
        bullets("Recommendations", &a.recommendations, width, use_colors),
        simulated_note(a.simulated, use_colors),
    ]
}

fn heat_char(intensity: f64) -> char {
    if intensity < 0.25 {
        '.'
    } else if intensity < 0.5 {
        ':'
    } else if intensity < 0.75 {
        '+'
    } else {
        '#'
    }
}

fn format_heatmap(a: &HeatmapAssessment, use_colors: bool) -> Vec<Option<String>> {
    let grid = a
        .grid
        .iter()
        .map(|row| {
            let line: String = row.iter().map(|v| heat_char(*v)).flat_map(|c| [c, ' ']).collect();
            format!("  {}", line.trim_end())
        })
        .collect::<Vec<_>>()
        .join("\n");
    let hotspots: Vec<String> = a
        .hotspots
        .iter()
        .map(|c| format!("row {}, column {} (intensity {:.2})", c.row, c.col, c.intensity))
        .collect();
    vec![
        Some(format!(
            "{}\n{}",
            heading(
                &format!("Crime heatmap for {} ({} mi, {}x{})", a.location, a.radius, a.resolution, a.resolution),
                use_colors
            ),
            grid
        )),
        bullets("Hotspots", &hotspots, DEFAULT_WIDTH, use_colors),
        simulated_note(a.simulated, use_colors),
    ]
}

fn format_climate(a: &ClimateAssessment, use_colors: bool, width: usize) -> Vec<Option<String>> {
    let summary = format!(
        "  Scenario: {} by {}, region {}\n  Warming: +{:.1}C, sea level +{:.0} mm\n  Investment rating: {} ({}), insurance class: {}\n  Resilience: {:.0}/100, estimated climate premium: {:.0}/yr",
        a.pathway,
        a.horizon,
        a.region,
        a.temperature_increase,
        a.sea_level_rise_mm,
        a.investment_rating.grade,
        a.investment_rating.description,
        a.insurance_class,
        a.resilience_score,
        a.estimated_climate_premium,
    );
    let hazards: Vec<String> = a
        .hazards
        .iter()
        .map(|h| format!("{}: risk {:.0}, {}", h.hazard, h.risk, level_label(h.level, use_colors)))
        .collect();
    let timeline: Vec<String> = a
        .timeline
        .iter()
        .map(|p| format!("{}: risk {:.0} (+{:.1}C)", p.year, p.overall_risk, p.temperature_increase))
        .collect();
    let measures: Vec<String> = a
        .adaptation_measures
        .iter()
        .map(|m| {
            format!(
                "{} - cost {:.0}, saves {:.0}/yr, payback {:.1} yr",
                m.description, m.implementation_cost, m.annual_savings, m.payback_years
            )
        })
        .collect();
    vec![
        Some(format!(
            "{}\n{}",
            headline("Climate resilience", a.climate_score, a.grade, a.level, use_colors),
            summary
        )),
        bullets("Hazards", &hazards, width, use_colors),
        bullets("Projected risk", &timeline, width, use_colors),
        bullets("Adaptation measures", &measures, width, use_colors),
        bullets("Recommendations", &a.recommendations, width, use_colors),
        simulated_note(a.simulated, use_colors),
    ]
}

fn format_feng_shui(a: &FengShuiAssessment, use_colors: bool, width: usize) -> Vec<Option<String>> {
    let sectors: Vec<String> = a
        .sectors
        .iter()
        .map(|s| format!("{}: star {} ({}), {:.0}", s.direction, s.star, s.affects, s.score))
        .collect();
    let afflictions: Vec<String> = a
        .annual_afflictions
        .iter()
        .map(|x| format!("{} in {}", x.name, x.position))
        .collect();
    let rooms: Vec<String> = a
        .favorable_rooms
        .iter()
        .map(|r| format!("{}: {}", r.room, r.direction))
        .collect();
    vec![
        Some(format!(
            "{}\n  Facing {}, year {}, element balance {:.0}/100",
            headline("Feng Shui", a.feng_shui_score, a.grade, a.level, use_colors),
            a.facing,
            a.year,
            a.balance_score
        )),
        bullets("Sectors", &sectors, width, use_colors),
        bullets(&format!("Afflictions {}", a.year), &afflictions, width, use_colors),
        bullets("Favorable rooms", &rooms, width, use_colors),
        bullets("Health concerns", &a.health_concerns, width, use_colors),
        bullets("Recommendations", &a.recommendations, width, use_colors),
    ]
}

fn format_vastu(a: &VastuAssessment, use_colors: bool, width: usize) -> Vec<Option<String>> {
    let strengths: Vec<String> = a
        .strengths
        .iter()
        .map(|s| format!("{} (+{:.0})", s.description, s.score_impact))
        .collect();
    let issues: Vec<String> = a
        .issues
        .iter()
        .map(|i| {
            if i.score_impact < 0.0 {
                format!("{} ({:.0})", i.description, i.score_impact)
            } else {
                i.description.clone()
            }
        })
        .collect();
    vec![
        Some(format!(
            "{}\n  {}, {} rule(s) checked",
            headline("Vastu", a.vastu_score, a.grade, a.level, use_colors),
            a.grade_description,
            a.rules_checked
        )),
        bullets("Strengths", &strengths, width, use_colors),
        bullets("Issues", &issues, width, use_colors),
        bullets("Recommendations", &a.recommendations, width, use_colors),
    ]
}

fn format_esoteric(a: &EsotericAssessment, use_colors: bool, width: usize) -> Vec<Option<String>> {
    let mut parts = Vec::new();
    if let Some(v) = &a.vastu {
        parts.push(format!("Vastu: {:.0} ({})", v.vastu_score, v.grade));
    }
    if let Some(f) = &a.feng_shui {
        parts.push(format!("Feng Shui: {:.0} ({})", f.feng_shui_score, f.grade));
    }
    vec![
        Some(format!(
            "{}\n  {}",
            headline("Design compatibility", a.esoteric_score, a.grade, a.level, use_colors),
            parts.join(", ")
        )),
        bullets("Recommendations", &a.recommendations, width, use_colors),
    ]
}

fn format_bedroom(a: &BedroomAssessment, use_colors: bool, width: usize) -> Vec<Option<String>> {
    let title = heading("Bedroom EMF check", use_colors);
    vec![
        Some(format!(
            "{}: {:.0}/100 ({})\n  {} issue(s), sleep impact: {}",
            title, a.bedroom_emf_score, a.grade, a.issues_found, a.sleep_quality_impact
        )),
        bullets("Issues", &a.issues, width, use_colors),
        bullets("Solutions", &a.solutions, width, use_colors),
    ]
}

fn format_composite(a: &CompositeAssessment, use_colors: bool, width: usize) -> Vec<Option<String>> {
    let title = heading("Overall property score", use_colors);
    let components = a
        .components
        .iter()
        .map(|(domain, score)| {
            format!(
                "  {:<18} {:>3.0}  {}",
                domain.to_string(),
                score.value,
                level_label(score.level, use_colors)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    let review = if a.professional_review_needed {
        let text = "Professional review recommended (overall below 60)";
        if use_colors {
            text.red().bold().to_string()
        } else {
            text.to_string()
        }
    } else {
        "No professional review required".to_string()
    };
    vec![
        Some(format!(
            "{}: {:.0}/100 ({} - {})\n{}\n  {}",
            title, a.overall, a.grade.label, a.grade.description, components, review
        )),
        bullets("Recommendations", &a.recommendations, width, use_colors),
    ]
}
