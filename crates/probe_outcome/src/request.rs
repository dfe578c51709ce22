//! Request summary and prompt construction.

use probe_core::{FlightProfile, LandingMethod, MissionConfig, PartCategory};
use serde::Serialize;
use std::fmt::Write as _;

/// Coarse quality band of the launch-timing score, spelled out for the
/// service so it can weigh the launch against part reliability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LaunchQuality {
    Perfect,
    Good,
    Average,
    Poor,
}

impl LaunchQuality {
    pub fn from_score(score: u32) -> Self {
        if score > 90 {
            LaunchQuality::Perfect
        } else if score > 70 {
            LaunchQuality::Good
        } else if score < 30 {
            LaunchQuality::Poor
        } else {
            LaunchQuality::Average
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LaunchQuality::Perfect => "Perfect (Critical Success)",
            LaunchQuality::Good => "Good",
            LaunchQuality::Average => "Average",
            LaunchQuality::Poor => "Poor (Potential issues)",
        }
    }
}

/// The facts the service sees about one selected part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartFacts {
    pub name: String,
    pub reliability_pct: u32,
    pub mass_kg: u32,
}

/// One slot of the craft: a selected part, or an explicit none marker.
/// An unfilled slot is unreachable through the wizard's gate; the summary
/// still spells it out rather than crashing on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartSummary {
    pub category: PartCategory,
    pub part: Option<PartFacts>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutcomeRequest {
    pub parts: Vec<PartSummary>,
    pub flight_profile: FlightProfile,
    pub landing_method: LandingMethod,
    pub launch_score: u32,
    pub launch_quality: LaunchQuality,
}

impl OutcomeRequest {
    pub fn from_config(config: &MissionConfig, launch_score: u32) -> Self {
        let parts = PartCategory::ALL
            .iter()
            .map(|category| PartSummary {
                category: *category,
                part: config.part(*category).map(|part| PartFacts {
                    name: part.name.clone(),
                    reliability_pct: part.reliability_pct,
                    mass_kg: part.mass_kg,
                }),
            })
            .collect();
        OutcomeRequest {
            parts,
            flight_profile: config.flight_profile,
            landing_method: config.landing_method,
            launch_score,
            launch_quality: LaunchQuality::from_score(launch_score),
        }
    }
}

/// Render the request as the service prompt. The wording is not a contract;
/// the field set and the simulation rules are.
pub fn build_prompt(request: &OutcomeRequest) -> String {
    let mut parts_list = String::new();
    for summary in &request.parts {
        match &summary.part {
            Some(facts) => {
                let _ = writeln!(
                    parts_list,
                    "{}: {} (Rel:{}%, Mass:{}kg)",
                    summary.category, facts.name, facts.reliability_pct, facts.mass_kg,
                );
            }
            None => {
                let _ = writeln!(parts_list, "{}: NONE", summary.category);
            }
        }
    }

    format!(
        "You are the mission engine of an educational space game for children \
(ages 10-14). Simulate a sample-return mission to Phobos, the moon of Mars, \
from the player's probe design and flight plan.

Target: Phobos (moon of Mars). Goal: collect samples and return to Earth.

PROBE DESIGN:
{parts_list}
FLIGHT PLAN:
Route: {route}
Landing: {landing}

LAUNCH PHASE RESULT:
Timing score: {score}/100 ({quality})
* A perfect launch saves fuel and guarantees the intended trajectory.
* A poor launch can cause minor damage or fuel waste and raises failure risk.

SIMULATION RULES:
1. Any missing part (propulsion, power, communication, sampler, computer) \
fails the mission at launch.
2. Weigh the power balance: does the source cover the propulsion and computer \
draw? Solar output drops at Mars distance; an RTG is steadier but weaker.
3. Weigh propulsion against mass: a heavy probe on a weak engine may fail to \
decelerate on a fast route.
4. Derive success probability from part reliability and the launch score; a \
perfect launch can offset slightly lower reliability.
5. Weigh the landing: touch-and-go is safer but collects less; a full landing \
is riskier but collects more.
6. The sampler's capacity caps the grams retrieved.

OUTPUT: answer with a single JSON object, nothing else, using exactly these \
keys: success (bool), score (0-100 int), sampleRetrieved (grams, int), \
scientificValue (0-100 int), missionLog (array of 5-7 objects with 'en' and \
'ja' strings), failureReason (object with 'en'/'ja'; only when success is \
false), feedback (object with 'en'/'ja').
Every text field carries both languages: 'en' in a concise mission-log tone, \
'ja' in a friendly, encouraging tone for children. The feedback explains why \
the design succeeded or failed in real engineering terms and, on failure, \
gives a hint for the next attempt.",
        route = request.flight_profile.label(),
        landing = request.landing_method.label(),
        score = request.launch_score,
        quality = request.launch_quality.label(),
    )
}
