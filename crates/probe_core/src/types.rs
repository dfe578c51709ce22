//! Type definitions for `probe_core`.
//!
//! All public types, structs, enums, and ID newtypes used by the game core.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ID newtypes
// ---------------------------------------------------------------------------

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(PartId);
string_id!(EventId);

// ---------------------------------------------------------------------------
// Core enums
// ---------------------------------------------------------------------------

/// The five equipment slots every probe configuration must fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartCategory {
    Propulsion,
    Power,
    Communication,
    Sampler,
    Computer,
}

impl PartCategory {
    /// Slot order shown to the player, left to right.
    pub const ALL: [PartCategory; 5] = [
        PartCategory::Propulsion,
        PartCategory::Power,
        PartCategory::Communication,
        PartCategory::Sampler,
        PartCategory::Computer,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PartCategory::Propulsion => "Propulsion",
            PartCategory::Power => "Power",
            PartCategory::Communication => "Communication",
            PartCategory::Sampler => "Sampler",
            PartCategory::Computer => "Flight Computer",
        }
    }

    pub fn label_ja(self) -> &'static str {
        match self {
            PartCategory::Propulsion => "推進系",
            PartCategory::Power => "電源系",
            PartCategory::Communication => "通信系",
            PartCategory::Sampler => "採取装置",
            PartCategory::Computer => "制御コンピュータ",
        }
    }
}

impl std::fmt::Display for PartCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Interplanetary transfer route chosen on the Plan step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlightProfile {
    Hohmann,
    FastTransit,
    GravityAssist,
}

impl FlightProfile {
    pub fn label(self) -> &'static str {
        match self {
            FlightProfile::Hohmann => "Hohmann transfer (fuel-efficient)",
            FlightProfile::FastTransit => "Fast transit (fuel-heavy)",
            FlightProfile::GravityAssist => "Earth gravity assist (ultra-efficient)",
        }
    }

    pub fn label_ja(self) -> &'static str {
        match self {
            FlightProfile::Hohmann => "ホーマン遷移軌道 (省エネ)",
            FlightProfile::FastTransit => "高速遷移軌道 (短時間)",
            FlightProfile::GravityAssist => "地球スイングバイ (超省エネ)",
        }
    }
}

/// Sample-collection technique chosen on the Plan step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LandingMethod {
    TouchAndGo,
    FullLanding,
    HoverDrop,
}

impl LandingMethod {
    pub fn label(self) -> &'static str {
        match self {
            LandingMethod::TouchAndGo => "Touch-and-go (land and leave)",
            LandingMethod::FullLanding => "Full landing (anchored stay)",
            LandingMethod::HoverDrop => "Hover drop (no contact)",
        }
    }

    pub fn label_ja(self) -> &'static str {
        match self {
            LandingMethod::TouchAndGo => "タッチ＆ゴー (着地即離脱)",
            LandingMethod::FullLanding => "完全着陸 (滞在型)",
            LandingMethod::HoverDrop => "ホバリング投下 (非接触)",
        }
    }
}

/// Top-level wizard step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStep {
    Intro,
    Design,
    Plan,
    Simulate,
}

/// Sub-phase of the Simulate step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimPhase {
    Game,
    Loading,
    Result,
}

// ---------------------------------------------------------------------------
// Parts and catalog content
// ---------------------------------------------------------------------------

/// Every user-facing outcome string carries both languages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BilingualText {
    pub en: String,
    pub ja: String,
}

impl BilingualText {
    pub fn new(en: &str, ja: &str) -> Self {
        BilingualText {
            en: en.to_string(),
            ja: ja.to_string(),
        }
    }
}

/// A generated catalog entry. Immutable once generated; a new catalog draw
/// mints fresh parts rather than mutating existing ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    pub id: PartId,
    /// References the `PartTemplate` this part was generated from.
    pub template_id: String,
    pub name: String,
    pub category: PartCategory,
    pub description: BilingualText,
    pub icon: String,
    pub mass_kg: u32,
    pub cost_m_usd: u32,
    pub reliability_pct: u32,
    pub power_draw_w: Option<u32>,
    pub power_output_w: Option<u32>,
    pub thrust_n: Option<u32>,
    pub data_rate_mbps: Option<u32>,
    pub sample_capacity_g: Option<u32>,
    /// Rare lightened variant: cost up, mass down, starred name.
    pub special: bool,
}

/// Base template a catalog part is jittered from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartTemplate {
    pub id: String,
    pub name: String,
    pub category: PartCategory,
    pub description: BilingualText,
    pub icon: String,
    pub mass_kg: u32,
    pub cost_m_usd: u32,
    pub reliability_pct: u32,
    pub power_draw_w: Option<u32>,
    pub power_output_w: Option<u32>,
    pub thrust_n: Option<u32>,
    pub data_rate_mbps: Option<u32>,
    pub sample_capacity_g: Option<u32>,
}

/// One row of the sample-reward table. Lookup picks the first tier whose
/// `max_score` is at or above the mission score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardTier {
    pub max_score: u32,
    pub name: BilingualText,
    pub icon: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameContent {
    pub content_version: String,
    pub templates: Vec<PartTemplate>,
    pub name_suffixes: Vec<String>,
    pub reward_tiers: Vec<RewardTier>,
    pub constants: Constants,
}

/// Tuning knobs loaded from `content/constants.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constants {
    /// Sweep cursor advance per animation frame, in bar units.
    pub sweep_step: f32,
    pub sweep_target_pos: f32,
    pub sweep_tolerance: f32,
    /// Milliseconds between sweep animation frames.
    pub sweep_frame_ms: u64,
    /// How long the score banner stays up before the outcome request fires.
    pub score_banner_ms: u64,
    /// Cadence of the mission-log reveal on the Result screen.
    pub log_reveal_interval_ms: u64,
    pub special_part_chance: f64,
    pub special_cost_factor: f32,
    pub special_mass_factor: f32,
    pub mass_jitter_pct: u32,
    pub cost_jitter_pct: u32,
    pub reliability_jitter_pct: u32,
    pub reliability_floor_pct: u32,
    pub power_draw_jitter_pct: u32,
    pub power_output_jitter_pct: u32,
    pub thrust_jitter_pct: u32,
    pub data_rate_jitter_pct: u32,
    pub sample_capacity_jitter_pct: u32,
}

// ---------------------------------------------------------------------------
// Mission configuration
// ---------------------------------------------------------------------------

/// The player's craft: one optional part per slot plus the flight plan.
/// Complete iff every slot is filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionConfig {
    pub propulsion: Option<Part>,
    pub power: Option<Part>,
    pub communication: Option<Part>,
    pub sampler: Option<Part>,
    pub computer: Option<Part>,
    pub flight_profile: FlightProfile,
    pub landing_method: LandingMethod,
}

impl Default for MissionConfig {
    fn default() -> Self {
        MissionConfig {
            propulsion: None,
            power: None,
            communication: None,
            sampler: None,
            computer: None,
            flight_profile: FlightProfile::Hohmann,
            landing_method: LandingMethod::TouchAndGo,
        }
    }
}

impl MissionConfig {
    pub fn part(&self, category: PartCategory) -> Option<&Part> {
        match category {
            PartCategory::Propulsion => self.propulsion.as_ref(),
            PartCategory::Power => self.power.as_ref(),
            PartCategory::Communication => self.communication.as_ref(),
            PartCategory::Sampler => self.sampler.as_ref(),
            PartCategory::Computer => self.computer.as_ref(),
        }
    }

    /// Installs `part` into the slot its category names.
    pub fn set_part(&mut self, part: Part) {
        let slot = match part.category {
            PartCategory::Propulsion => &mut self.propulsion,
            PartCategory::Power => &mut self.power,
            PartCategory::Communication => &mut self.communication,
            PartCategory::Sampler => &mut self.sampler,
            PartCategory::Computer => &mut self.computer,
        };
        *slot = Some(part);
    }

    pub fn is_complete(&self) -> bool {
        PartCategory::ALL
            .iter()
            .all(|category| self.part(*category).is_some())
    }

    pub fn missing_categories(&self) -> Vec<PartCategory> {
        PartCategory::ALL
            .iter()
            .copied()
            .filter(|category| self.part(*category).is_none())
            .collect()
    }

    pub fn selected_parts(&self) -> Vec<&Part> {
        PartCategory::ALL
            .iter()
            .filter_map(|category| self.part(*category))
            .collect()
    }

    pub fn totals(&self) -> ConfigTotals {
        let parts = self.selected_parts();
        ConfigTotals {
            mass_kg: parts.iter().map(|p| p.mass_kg).sum(),
            cost_m_usd: parts.iter().map(|p| p.cost_m_usd).sum(),
            power_draw_w: parts.iter().filter_map(|p| p.power_draw_w).sum(),
            power_output_w: parts.iter().filter_map(|p| p.power_output_w).sum(),
        }
    }
}

/// Aggregate stats over the currently selected parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigTotals {
    pub mass_kg: u32,
    pub cost_m_usd: u32,
    pub power_draw_w: u32,
    pub power_output_w: u32,
}

// ---------------------------------------------------------------------------
// Mission outcome
// ---------------------------------------------------------------------------

/// Structured result of a simulated mission, produced by the outcome service.
/// Field names follow the external wire contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionOutcome {
    pub success: bool,
    pub score: u32,
    /// Grams of sample brought home. 0 when the mission failed before collection.
    pub sample_retrieved: u32,
    pub scientific_value: u32,
    pub mission_log: Vec<BilingualText>,
    /// Present iff `success` is false.
    #[serde(default)]
    pub failure_reason: Option<BilingualText>,
    pub feedback: BilingualText,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Counters {
    pub next_event_id: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub id: EventId,
    /// Session epoch the event belongs to; bumped on every restart.
    pub epoch: u64,
    pub event: Event,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    StepChanged {
        step: GameStep,
    },
    SimPhaseChanged {
        phase: SimPhase,
    },
    CatalogGenerated {
        parts: usize,
    },
    PartEquipped {
        category: PartCategory,
        part_id: PartId,
        name: String,
    },
    TransitionRefused {
        missing: Vec<PartCategory>,
    },
    PlanChanged {
        flight_profile: FlightProfile,
        landing_method: LandingMethod,
    },
    SweepStopped {
        position: f32,
        score: u32,
        band: crate::SweepBand,
    },
    LoadingStarted {
        launch_score: u32,
    },
    OutcomeReceived {
        success: bool,
        score: u32,
    },
    LogRevealed {
        index: usize,
        entry: BilingualText,
    },
    RevealFinished {
        reward: RewardTier,
    },
    ConfigSaveFailed {
        reason: String,
    },
}
