//! Content loading and draft persistence shared between probe_cli and probe_daemon.

use anyhow::{Context, Result};
use probe_core::{
    ConfigStore, Constants, GameContent, MissionConfig, PartCategory, PartTemplate, RewardTier,
    StoreError,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Deserialize)]
struct PartsFile {
    content_version: String,
    name_suffixes: Vec<String>,
    templates: Vec<PartTemplate>,
}

#[derive(Deserialize)]
struct RewardTiersFile {
    tiers: Vec<RewardTier>,
}

/// Validates loaded content, panicking on any authoring error.
///
/// Catches mistakes like: a category with no templates (the wizard could
/// never complete), a non-ascending reward table, or a reliability value the
/// jitter clamp cannot honor.
pub fn validate_content(content: &GameContent) {
    assert!(
        !content.name_suffixes.is_empty(),
        "name_suffixes must not be empty",
    );

    for category in PartCategory::ALL {
        assert!(
            content.templates.iter().any(|t| t.category == category),
            "no part template covers the {category} category",
        );
    }

    let mut seen = std::collections::HashSet::new();
    for template in &content.templates {
        assert!(
            seen.insert(template.id.as_str()),
            "duplicate template id '{}'",
            template.id,
        );
        assert!(
            (1..=100).contains(&template.reliability_pct),
            "template '{}' reliability {} out of range [1, 100]",
            template.id,
            template.reliability_pct,
        );
    }

    assert!(
        !content.reward_tiers.is_empty(),
        "reward tier table must not be empty",
    );
    for pair in content.reward_tiers.windows(2) {
        assert!(
            pair[0].max_score < pair[1].max_score,
            "reward tiers must ascend: {} before {}",
            pair[0].max_score,
            pair[1].max_score,
        );
    }

    let c = &content.constants;
    assert!(c.sweep_step > 0.0, "sweep_step must be > 0");
    assert!(
        (0.0..=100.0).contains(&c.sweep_target_pos),
        "sweep_target_pos {} out of range [0, 100]",
        c.sweep_target_pos,
    );
    assert!(c.sweep_tolerance > 0.0, "sweep_tolerance must be > 0");
    assert!(c.sweep_frame_ms > 0, "sweep_frame_ms must be > 0");
    assert!(
        c.log_reveal_interval_ms > 0,
        "log_reveal_interval_ms must be > 0",
    );
    assert!(
        (0.0..=1.0).contains(&c.special_part_chance),
        "special_part_chance {} out of range [0, 1]",
        c.special_part_chance,
    );
    assert!(
        c.reliability_floor_pct <= 100,
        "reliability_floor_pct {} above 100",
        c.reliability_floor_pct,
    );
}

pub fn load_content(content_dir: &str) -> Result<GameContent> {
    let dir = Path::new(content_dir);
    let constants: Constants = serde_json::from_str(
        &std::fs::read_to_string(dir.join("constants.json")).context("reading constants.json")?,
    )
    .context("parsing constants.json")?;
    let parts_file: PartsFile = serde_json::from_str(
        &std::fs::read_to_string(dir.join("parts.json")).context("reading parts.json")?,
    )
    .context("parsing parts.json")?;
    let tiers_file: RewardTiersFile = serde_json::from_str(
        &std::fs::read_to_string(dir.join("reward_tiers.json"))
            .context("reading reward_tiers.json")?,
    )
    .context("parsing reward_tiers.json")?;
    let content = GameContent {
        content_version: parts_file.content_version,
        templates: parts_file.templates,
        name_suffixes: parts_file.name_suffixes,
        reward_tiers: tiers_file.tiers,
        constants,
    };
    validate_content(&content);
    Ok(content)
}

/// File-backed `ConfigStore`: the whole draft configuration as one JSON
/// document. Read once at startup; anything unreadable counts as no save.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for JsonFileStore {
    fn load(&self) -> Option<MissionConfig> {
        let text = std::fs::read_to_string(&self.path).ok()?;
        serde_json::from_str(&text).ok()
    }

    fn save(&mut self, config: &MissionConfig) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(config)
            .map_err(|err| StoreError::Serialize(err.to_string()))?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use probe_core::test_fixtures::{base_content, make_rng};
    use probe_core::generate_catalog;

    #[test]
    fn test_valid_content_passes_validation() {
        let content = base_content();
        validate_content(&content); // should not panic
    }

    #[test]
    #[should_panic(expected = "no part template covers")]
    fn test_missing_category_panics() {
        let mut content = base_content();
        content.templates.retain(|t| t.category != PartCategory::Sampler);
        validate_content(&content);
    }

    #[test]
    #[should_panic(expected = "duplicate template id")]
    fn test_duplicate_template_id_panics() {
        let mut content = base_content();
        let duplicate = content.templates[0].clone();
        content.templates.push(duplicate);
        validate_content(&content);
    }

    #[test]
    #[should_panic(expected = "reward tiers must ascend")]
    fn test_unordered_reward_tiers_panic() {
        let mut content = base_content();
        content.reward_tiers.swap(0, 1);
        validate_content(&content);
    }

    #[test]
    #[should_panic(expected = "name_suffixes must not be empty")]
    fn test_empty_suffix_pool_panics() {
        let mut content = base_content();
        content.name_suffixes.clear();
        validate_content(&content);
    }

    #[test]
    #[should_panic(expected = "out of range [1, 100]")]
    fn test_reliability_out_of_range_panics() {
        let mut content = base_content();
        content.templates[0].reliability_pct = 140;
        validate_content(&content);
    }

    #[test]
    fn test_store_round_trips_a_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mission_config.json");
        let mut store = JsonFileStore::new(&path);

        let content = base_content();
        let mut rng = make_rng();
        let mut config = MissionConfig::default();
        for part in generate_catalog(&content, &mut rng) {
            config.set_part(part);
        }

        store.save(&config).unwrap();
        assert_eq!(store.load(), Some(config));
    }

    #[test]
    fn test_missing_save_file_is_no_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("absent.json"));
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_malformed_save_file_is_no_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mission_config.json");
        std::fs::write(&path, "{ not json").unwrap();
        let store = JsonFileStore::new(&path);
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_save_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saves/nested/mission_config.json");
        let mut store = JsonFileStore::new(&path);

        let config = MissionConfig {
            flight_profile: probe_core::FlightProfile::GravityAssist,
            ..MissionConfig::default()
        };
        store.save(&config).unwrap();

        let restored = store.load().unwrap();
        assert_eq!(restored.flight_profile, probe_core::FlightProfile::GravityAssist);
    }
}
