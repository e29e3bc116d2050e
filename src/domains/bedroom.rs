use serde::{Deserialize, Serialize};

use crate::error::FieldViolation;
use crate::request::Validate;
use crate::scoring::engine::bound_score;
use crate::scoring::grade::BEDROOM;
use crate::scoring::Recommendations;

/// Yes/no answers from a walk-through of the main bedroom.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BedroomChecklist {
    pub phone_on_nightstand: bool,
    pub wifi_router_in_bedroom: bool,
    pub electric_blanket: bool,
    pub electric_alarm_clock_near_bed: bool,
    pub tv_in_bedroom: bool,
    pub charging_devices_near_bed: bool,
    pub smart_meter_on_bedroom_wall: bool,
}

impl Validate for BedroomChecklist {
    fn validate(&self, _prefix: &str, _out: &mut Vec<FieldViolation>) {}
}

struct Check {
    deduction: f64,
    issue: &'static str,
    solution: &'static str,
}

const CHECKS: [Check; 7] = [
    Check {
        deduction: 15.0,
        issue: "Phone on nightstand",
        solution: "Charge your phone outside the bedroom or at least 6 feet from the bed",
    },
    Check {
        deduction: 20.0,
        issue: "Wi-Fi router in bedroom",
        solution: "Move the Wi-Fi router out of the bedroom or switch it off at night",
    },
    Check {
        deduction: 25.0,
        issue: "Electric blanket in use",
        solution: "Warm the bed beforehand and unplug the electric blanket before sleeping",
    },
    Check {
        deduction: 10.0,
        issue: "Electric alarm clock near bed",
        solution: "Replace the plug-in alarm clock with a battery-powered one",
    },
    Check {
        deduction: 15.0,
        issue: "TV in bedroom",
        solution: "Unplug the TV at night or move it to another room",
    },
    Check {
        deduction: 5.0,
        issue: "Devices charging near bed",
        solution: "Move chargers and charging devices away from the bed",
    },
    Check {
        deduction: 20.0,
        issue: "Smart meter on bedroom wall",
        solution: "Move the bed to another wall or ask the utility about shielding the meter",
    },
];

const BEDROOM_BASELINE: &[&str] = &[
    "Keep the sleeping area free of electronics where possible",
    "Switch devices to airplane mode overnight",
];

impl BedroomChecklist {
    fn flags(&self) -> [bool; 7] {
        [
            self.phone_on_nightstand,
            self.wifi_router_in_bedroom,
            self.electric_blanket,
            self.electric_alarm_clock_near_bed,
            self.tv_in_bedroom,
            self.charging_devices_near_bed,
            self.smart_meter_on_bedroom_wall,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BedroomAssessment {
    #[serde(rename = "bedroomEMFScore")]
    pub bedroom_emf_score: f64,
    pub grade: &'static str,
    pub issues_found: usize,
    pub issues: Vec<String>,
    pub solutions: Vec<String>,
    pub sleep_quality_impact: &'static str,
}

pub fn sleep_quality_impact(score: f64) -> &'static str {
    if score >= 80.0 {
        "Minimal impact"
    } else if score >= 60.0 {
        "Possible mild impact"
    } else {
        "Likely affecting sleep"
    }
}

pub fn assess_bedroom(checklist: &BedroomChecklist) -> BedroomAssessment {
    let mut score = 100.0;
    let mut issues = Vec::new();
    let mut solutions = Recommendations::new();
    for (check, present) in CHECKS.iter().zip(checklist.flags()) {
        if present {
            score -= check.deduction;
            issues.push(check.issue.to_string());
            solutions.push(check.solution);
        }
    }
    let score = bound_score(score);

    BedroomAssessment {
        bedroom_emf_score: score,
        grade: BEDROOM.grade(score).label,
        issues_found: issues.len(),
        issues,
        solutions: solutions.finish(BEDROOM_BASELINE),
        sleep_quality_impact: sleep_quality_impact(score),
    }
}
