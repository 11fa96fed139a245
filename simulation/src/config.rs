//! Session configuration and the two built-in game variants

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::SimError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameVariant {
    /// Fixed 10+10 batch, everything wanders once a second
    #[default]
    Classic,
    /// Stationary defenders, fast attackers, periodic defender spawns
    Paced,
}

impl GameVariant {
    pub fn key(&self) -> &'static str {
        match self {
            GameVariant::Classic => "classic",
            GameVariant::Paced => "paced",
        }
    }
}

/// All tunables of a session. Intervals are in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub variant: GameVariant,
    pub arena_width: u32,
    pub arena_height: u32,
    pub actor_width: u32,
    pub actor_height: u32,
    pub min_separation: u32,
    /// `None` = attack actors stand still
    pub attack_move_ms: Option<u64>,
    /// `None` = defense actors stand still
    pub defense_move_ms: Option<u64>,
    pub attack_interval_ms: u64,
    /// `None` = no spawn coordinator
    pub spawn_interval_ms: Option<u64>,
    pub pacing_threshold: u32,
    pub initial_attackers: u32,
    pub initial_defenders: u32,
    pub base_damage: i32,
    pub starting_health: i32,
    pub placement_retry_cap: u32,
}

/// Partial config as it appears on disk. Absent fields come from the variant preset.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    variant: GameVariant,
    arena_width: Option<u32>,
    arena_height: Option<u32>,
    actor_width: Option<u32>,
    actor_height: Option<u32>,
    min_separation: Option<u32>,
    #[serde(default, deserialize_with = "explicit_null")]
    attack_move_ms: Option<Option<u64>>,
    #[serde(default, deserialize_with = "explicit_null")]
    defense_move_ms: Option<Option<u64>>,
    attack_interval_ms: Option<u64>,
    #[serde(default, deserialize_with = "explicit_null")]
    spawn_interval_ms: Option<Option<u64>>,
    pacing_threshold: Option<u32>,
    initial_attackers: Option<u32>,
    initial_defenders: Option<u32>,
    base_damage: Option<i32>,
    starting_health: Option<i32>,
    placement_retry_cap: Option<u32>,
}

/// Keeps an explicit `null` distinct from an absent field
fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl SessionConfig {
    /// Built-in settings for a variant
    pub fn preset(variant: GameVariant) -> Self {
        match variant {
            GameVariant::Classic => Self {
                variant,
                arena_width: 500,
                arena_height: 500,
                actor_width: 50,
                actor_height: 50,
                min_separation: 50,
                attack_move_ms: Some(1000),
                defense_move_ms: Some(1000),
                attack_interval_ms: 5000,
                spawn_interval_ms: None,
                pacing_threshold: 10,
                initial_attackers: 10,
                initial_defenders: 10,
                base_damage: 2,
                starting_health: 100,
                placement_retry_cap: 256,
            },
            GameVariant::Paced => Self {
                variant,
                arena_width: 500,
                arena_height: 500,
                actor_width: 80,
                actor_height: 30,
                min_separation: 50,
                attack_move_ms: Some(500),
                defense_move_ms: None,
                attack_interval_ms: 5000,
                spawn_interval_ms: Some(500),
                pacing_threshold: 10,
                initial_attackers: 10,
                initial_defenders: 10,
                base_damage: 2,
                starting_health: 100,
                placement_retry_cap: 256,
            },
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, SimError> {
        let file: ConfigFile = serde_json::from_str(json)?;
        let base = Self::preset(file.variant);

        let config = Self {
            variant: file.variant,
            arena_width: file.arena_width.unwrap_or(base.arena_width),
            arena_height: file.arena_height.unwrap_or(base.arena_height),
            actor_width: file.actor_width.unwrap_or(base.actor_width),
            actor_height: file.actor_height.unwrap_or(base.actor_height),
            min_separation: file.min_separation.unwrap_or(base.min_separation),
            attack_move_ms: file.attack_move_ms.unwrap_or(base.attack_move_ms),
            defense_move_ms: file.defense_move_ms.unwrap_or(base.defense_move_ms),
            attack_interval_ms: file.attack_interval_ms.unwrap_or(base.attack_interval_ms),
            spawn_interval_ms: file.spawn_interval_ms.unwrap_or(base.spawn_interval_ms),
            pacing_threshold: file.pacing_threshold.unwrap_or(base.pacing_threshold),
            initial_attackers: file.initial_attackers.unwrap_or(base.initial_attackers),
            initial_defenders: file.initial_defenders.unwrap_or(base.initial_defenders),
            base_damage: file.base_damage.unwrap_or(base.base_damage),
            starting_health: file.starting_health.unwrap_or(base.starting_health),
            placement_retry_cap: file.placement_retry_cap.unwrap_or(base.placement_retry_cap),
        };
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SimError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if self.arena_width == 0 || self.arena_height == 0 {
            return Err(SimError::InvalidConfig("arena dimensions must be positive".into()));
        }
        if self.actor_width == 0 || self.actor_height == 0 {
            return Err(SimError::InvalidConfig("actor dimensions must be positive".into()));
        }
        if self.actor_width > self.arena_width || self.actor_height > self.arena_height {
            return Err(SimError::ArenaTooSmall {
                width: self.arena_width,
                height: self.arena_height,
                actor_width: self.actor_width,
                actor_height: self.actor_height,
            });
        }
        if self.min_separation == 0 {
            return Err(SimError::InvalidConfig("min_separation must be positive".into()));
        }
        if self.placement_retry_cap == 0 {
            return Err(SimError::InvalidConfig("placement_retry_cap must be positive".into()));
        }
        if self.starting_health <= 0 {
            return Err(SimError::InvalidConfig("starting_health must be positive".into()));
        }
        if self.base_damage < 0 {
            return Err(SimError::InvalidConfig("base_damage cannot be negative".into()));
        }

        let intervals = [
            ("attack_move_ms", self.attack_move_ms),
            ("defense_move_ms", self.defense_move_ms),
            ("attack_interval_ms", Some(self.attack_interval_ms)),
            ("spawn_interval_ms", self.spawn_interval_ms),
        ];
        for (name, interval) in intervals {
            if interval == Some(0) {
                return Err(SimError::InvalidConfig(format!("{} must be positive", name)));
            }
        }

        Ok(())
    }

    pub fn attack_move_interval(&self) -> Option<Duration> {
        self.attack_move_ms.map(Duration::from_millis)
    }

    pub fn defense_move_interval(&self) -> Option<Duration> {
        self.defense_move_ms.map(Duration::from_millis)
    }

    pub fn attack_interval(&self) -> Duration {
        Duration::from_millis(self.attack_interval_ms)
    }

    pub fn spawn_interval(&self) -> Option<Duration> {
        self.spawn_interval_ms.map(Duration::from_millis)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::preset(GameVariant::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_presets_are_valid() {
        for variant in [GameVariant::Classic, GameVariant::Paced] {
            let config = SessionConfig::preset(variant);
            assert!(config.validate().is_ok(), "{} preset should validate", variant.key());
        }
    }

    #[test]
    fn test_paced_preset_has_spawner_and_static_defenders() {
        let config = SessionConfig::preset(GameVariant::Paced);
        assert_eq!(config.spawn_interval(), Some(Duration::from_millis(500)));
        assert_eq!(config.defense_move_interval(), None);
        assert_eq!(config.attack_move_interval(), Some(Duration::from_millis(500)));

        let classic = SessionConfig::preset(GameVariant::Classic);
        assert_eq!(classic.spawn_interval(), None);
        assert_eq!(classic.defense_move_interval(), Some(Duration::from_millis(1000)));
    }

    #[test]
    fn test_partial_json_falls_back_to_preset() {
        let config = SessionConfig::from_json_str(
            r#"{ "variant": "paced", "base_damage": 3, "defense_move_ms": 700 }"#,
        )
        .unwrap();

        assert_eq!(config.variant, GameVariant::Paced);
        assert_eq!(config.base_damage, 3);
        assert_eq!(config.defense_move_ms, Some(700));
        assert_eq!(config.actor_width, 80);
        assert_eq!(config.spawn_interval_ms, Some(500));
    }

    #[test]
    fn test_null_interval_disables_movement() {
        let config = SessionConfig::from_json_str(r#"{ "attack_move_ms": null }"#).unwrap();
        assert_eq!(config.attack_move_ms, None);
        assert_eq!(config.defense_move_ms, Some(1000));
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = SessionConfig::from_json_str(r#"{ "min_separation": 0 }"#).unwrap_err();
        assert!(matches!(err, SimError::InvalidConfig(_)));

        let err = SessionConfig::from_json_str(r#"{ "actor_width": 900 }"#).unwrap_err();
        assert!(matches!(err, SimError::ArenaTooSmall { .. }));

        let err = SessionConfig::from_json_str(r#"{ "spawn_interval_ms": 0 }"#).unwrap_err();
        assert!(matches!(err, SimError::InvalidConfig(_)));

        let err = SessionConfig::from_json_str(r#"{ "colour": "red" }"#).unwrap_err();
        assert!(matches!(err, SimError::ConfigParse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "variant": "classic", "starting_health": 40 }}"#).unwrap();

        let config = SessionConfig::load(file.path()).unwrap();
        assert_eq!(config.starting_health, 40);
        assert_eq!(config.arena_width, 500);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SessionConfig::load(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, SimError::ConfigIo { .. }));
    }
}
