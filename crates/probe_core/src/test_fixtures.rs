//! Shared test fixtures for probe_core and downstream crates.
//!
//! `base_content()` provides a deterministic `GameContent` (zero jitter, no
//! special parts) so catalog draws vary only in their minted ids.
//! `jittered_content()` enables production-like jitter for randomization
//! tests.

use crate::{
    BilingualText, Constants, GameContent, MissionOutcome, PartCategory, PartTemplate, RewardTier,
    Session,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn template(
    id: &str,
    name: &str,
    category: PartCategory,
    mass_kg: u32,
    cost_m_usd: u32,
    reliability_pct: u32,
) -> PartTemplate {
    PartTemplate {
        id: id.to_string(),
        name: name.to_string(),
        category,
        description: BilingualText::new("A dependable test part.", "テスト用のたよれるパーツ。"),
        icon: "🔧".to_string(),
        mass_kg,
        cost_m_usd,
        reliability_pct,
        power_draw_w: None,
        power_output_w: None,
        thrust_n: None,
        data_rate_mbps: None,
        sample_capacity_g: None,
    }
}

/// One template per category, zero jitter, never special. A catalog draw is
/// fully deterministic apart from the minted part ids.
pub fn base_content() -> GameContent {
    let mut chem = template("prop_chem", "Chemical Thruster", PartCategory::Propulsion, 50, 10, 98);
    chem.thrust_n = Some(500);
    chem.power_draw_w = Some(10);
    let mut solar = template("pwr_solar", "Deployable Solar Array", PartCategory::Power, 15, 5, 95);
    solar.power_output_w = Some(100);
    let mut xband = template("comm_xband", "X-band Antenna", PartCategory::Communication, 10, 8, 97);
    xband.data_rate_mbps = Some(10);
    xband.power_draw_w = Some(20);
    let mut horn = template("samp_horn", "Sampler Horn", PartCategory::Sampler, 15, 12, 94);
    horn.sample_capacity_g = Some(100);
    horn.power_draw_w = Some(10);
    let mut cpu = template("comp_rad", "Rad-hardened CPU", PartCategory::Computer, 5, 20, 99);
    cpu.power_draw_w = Some(15);

    GameContent {
        content_version: "test".to_string(),
        templates: vec![chem, solar, xband, horn, cpu],
        name_suffixes: vec!["Mk-I".to_string()],
        reward_tiers: vec![
            RewardTier {
                max_score: 30,
                name: BilingualText::new("Mystery Dust", "謎の砂 (ハズレ)"),
                icon: "🌫️".to_string(),
            },
            RewardTier {
                max_score: 60,
                name: BilingualText::new("Phobos Sand", "フォボスの砂"),
                icon: "🏜️".to_string(),
            },
            RewardTier {
                max_score: 85,
                name: BilingualText::new("Precious Pebble", "貴重な小石"),
                icon: "🪨".to_string(),
            },
            RewardTier {
                max_score: 101,
                name: BilingualText::new("Unknown Crystal", "未知の結晶"),
                icon: "💎".to_string(),
            },
        ],
        constants: Constants {
            sweep_step: 1.5,
            sweep_target_pos: 75.0,
            sweep_tolerance: 15.0,
            sweep_frame_ms: 16,
            score_banner_ms: 2000,
            log_reveal_interval_ms: 1500,
            special_part_chance: 0.0,
            special_cost_factor: 1.5,
            special_mass_factor: 0.8,
            mass_jitter_pct: 0,
            cost_jitter_pct: 0,
            reliability_jitter_pct: 0,
            reliability_floor_pct: 70,
            power_draw_jitter_pct: 0,
            power_output_jitter_pct: 0,
            thrust_jitter_pct: 0,
            data_rate_jitter_pct: 0,
            sample_capacity_jitter_pct: 0,
        },
    }
}

/// `base_content` with production-like jitter and special-part odds.
pub fn jittered_content() -> GameContent {
    let mut content = base_content();
    content.name_suffixes = vec![
        "Mk-I".to_string(),
        "Mk-II".to_string(),
        "Type-R".to_string(),
        "Neo".to_string(),
    ];
    content.constants.special_part_chance = 0.2;
    content.constants.mass_jitter_pct = 15;
    content.constants.cost_jitter_pct = 20;
    content.constants.reliability_jitter_pct = 5;
    content.constants.power_draw_jitter_pct = 10;
    content.constants.power_output_jitter_pct = 15;
    content.constants.thrust_jitter_pct = 15;
    content.constants.data_rate_jitter_pct = 20;
    content.constants.sample_capacity_jitter_pct = 20;
    content
}

/// Fresh session at the Intro step with no saved configuration.
pub fn base_session(content: &GameContent) -> Session {
    Session::new(content, 42, None)
}

/// A plausible successful outcome with a three-entry log.
pub fn sample_outcome() -> MissionOutcome {
    MissionOutcome {
        success: true,
        score: 88,
        sample_retrieved: 95,
        scientific_value: 80,
        mission_log: vec![
            BilingualText::new("Launch nominal.", "打ち上げ成功です。"),
            BilingualText::new("Orbit insertion confirmed.", "軌道投入を確認しました。"),
            BilingualText::new("Samples secured for return.", "サンプルを回収しました。"),
        ],
        failure_reason: None,
        feedback: BilingualText::new(
            "The solar array balanced the power budget nicely.",
            "ソーラーパネルが電力バランスをうまく保ちました。",
        ),
    }
}

/// Deterministic RNG seeded with 42.
pub fn make_rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(42)
}
