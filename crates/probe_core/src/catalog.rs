//! Catalog generation: jitters the base templates into a fresh part draw.
//!
//! Bounded jitter only — the category partition and relative character of
//! each template survive every draw.

use crate::id::mint_part_id;
use crate::{Constants, GameContent, Part, PartTemplate};
use rand::Rng;

/// One randomized catalog: every template jittered once, in template order.
pub fn generate_catalog(content: &GameContent, rng: &mut impl Rng) -> Vec<Part> {
    content
        .templates
        .iter()
        .map(|template| randomize_part(template, content, rng))
        .collect()
}

/// Vary `value` by up to ±`percent`, rounded, never below 1.
fn vary(value: u32, percent: u32, rng: &mut impl Rng) -> u32 {
    if percent == 0 {
        return value.max(1);
    }
    let span = percent as f32 / 100.0;
    let factor = 1.0 + rng.gen_range(-span..=span);
    (((value as f32) * factor).round() as u32).max(1)
}

fn vary_opt(value: Option<u32>, percent: u32, rng: &mut impl Rng) -> Option<u32> {
    value.map(|v| vary(v, percent, rng))
}

fn scaled(value: u32, factor: f32) -> u32 {
    (((value as f32) * factor).round() as u32).max(1)
}

fn randomize_part(template: &PartTemplate, content: &GameContent, rng: &mut impl Rng) -> Part {
    let c: &Constants = &content.constants;
    let suffix = &content.name_suffixes[rng.gen_range(0..content.name_suffixes.len())];
    let special = rng.gen_bool(c.special_part_chance);
    let id = mint_part_id(&template.id, rng);

    let mut name = format!("{} {}", template.name, suffix);
    let mut mass_kg = vary(template.mass_kg, c.mass_jitter_pct, rng);
    let mut cost_m_usd = vary(template.cost_m_usd, c.cost_jitter_pct, rng);
    let reliability_pct = vary(template.reliability_pct, c.reliability_jitter_pct, rng)
        .clamp(c.reliability_floor_pct, 100);

    if special {
        name = format!("★ {name}");
        cost_m_usd = scaled(cost_m_usd, c.special_cost_factor);
        mass_kg = scaled(mass_kg, c.special_mass_factor);
    }

    Part {
        id,
        template_id: template.id.clone(),
        name,
        category: template.category,
        description: template.description.clone(),
        icon: template.icon.clone(),
        mass_kg,
        cost_m_usd,
        reliability_pct,
        power_draw_w: vary_opt(template.power_draw_w, c.power_draw_jitter_pct, rng),
        power_output_w: vary_opt(template.power_output_w, c.power_output_jitter_pct, rng),
        thrust_n: vary_opt(template.thrust_n, c.thrust_jitter_pct, rng),
        data_rate_mbps: vary_opt(template.data_rate_mbps, c.data_rate_jitter_pct, rng),
        sample_capacity_g: vary_opt(template.sample_capacity_g, c.sample_capacity_jitter_pct, rng),
        special,
    }
}
