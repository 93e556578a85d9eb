/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use log::{debug, warn};
use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    pub speed: SpeedConfig,
    pub sim: SimConfig,
    pub level_file: Option<PathBuf>,
    pub log_level: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpeedConfig {
    pub tick_rate_ms: u64,
}

/// Tuning for the environment objects the simulation updates each tick.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct SimConfig {
    pub floor: FloorConfig,
    pub loose_floor: LooseFloorConfig,
    pub door: DoorConfig,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FloorConfig {
    pub press_depth: i32,     // pixels a pressed plate sinks
    pub release_ticks: u32,   // ticks a released plate stays down
}

#[derive(Clone, Debug, PartialEq)]
pub struct LooseFloorConfig {
    pub shake_ticks: u32,
    pub fall_speed_max: i32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DoorConfig {
    pub open_step: i32,
    pub close_step: i32,
    pub fast_close_step: i32,
    pub open_wait: u32,       // ticks an opened door waits before closing
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    floor: TomlFloor,
    #[serde(default)]
    loose_floor: TomlLooseFloor,
    #[serde(default)]
    door: TomlDoor,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlFloor {
    #[serde(default = "default_press_depth")]
    press_depth: i32,
    #[serde(default = "default_release_ticks")]
    release_ticks: u32,
}

#[derive(Deserialize, Debug)]
struct TomlLooseFloor {
    #[serde(default = "default_shake_ticks")]
    shake_ticks: u32,
    #[serde(default = "default_fall_speed_max")]
    fall_speed_max: i32,
}

#[derive(Deserialize, Debug)]
struct TomlDoor {
    #[serde(default = "default_open_step")]
    open_step: i32,
    #[serde(default = "default_close_step")]
    close_step: i32,
    #[serde(default = "default_fast_close_step")]
    fast_close_step: i32,
    #[serde(default = "default_open_wait")]
    open_wait: u32,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default)]
    level_file: Option<String>,
    #[serde(default = "default_log_level")]
    log_level: String,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 80 }
fn default_press_depth() -> i32 { 2 }
fn default_release_ticks() -> u32 { 3 }
fn default_shake_ticks() -> u32 { 6 }
fn default_fall_speed_max() -> i32 { 29 }
fn default_open_step() -> i32 { 1 }
fn default_close_step() -> i32 { 1 }
fn default_fast_close_step() -> i32 { 10 }
fn default_open_wait() -> u32 { 40 }
fn default_log_level() -> String { "info".into() }

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed { tick_rate_ms: default_tick_rate() }
    }
}

impl Default for TomlFloor {
    fn default() -> Self {
        TomlFloor {
            press_depth: default_press_depth(),
            release_ticks: default_release_ticks(),
        }
    }
}

impl Default for TomlLooseFloor {
    fn default() -> Self {
        TomlLooseFloor {
            shake_ticks: default_shake_ticks(),
            fall_speed_max: default_fall_speed_max(),
        }
    }
}

impl Default for TomlDoor {
    fn default() -> Self {
        TomlDoor {
            open_step: default_open_step(),
            close_step: default_close_step(),
            fast_close_step: default_fast_close_step(),
            open_wait: default_open_wait(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral { level_file: None, log_level: default_log_level() }
    }
}

impl Default for FloorConfig {
    fn default() -> Self {
        TomlFloor::default().into()
    }
}

impl Default for LooseFloorConfig {
    fn default() -> Self {
        TomlLooseFloor::default().into()
    }
}

impl Default for DoorConfig {
    fn default() -> Self {
        TomlDoor::default().into()
    }
}

impl From<TomlFloor> for FloorConfig {
    fn from(t: TomlFloor) -> Self {
        FloorConfig {
            press_depth: t.press_depth.max(0),
            release_ticks: t.release_ticks,
        }
    }
}

impl From<TomlLooseFloor> for LooseFloorConfig {
    fn from(t: TomlLooseFloor) -> Self {
        LooseFloorConfig {
            shake_ticks: t.shake_ticks,
            fall_speed_max: t.fall_speed_max.max(1),
        }
    }
}

impl From<TomlDoor> for DoorConfig {
    fn from(t: TomlDoor) -> Self {
        DoorConfig {
            open_step: t.open_step.max(1),
            close_step: t.close_step.max(1),
            fast_close_step: t.fast_close_step.max(1),
            open_wait: t.open_wait,
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);

        // Relative level paths resolve against the first directory holding them.
        let level_file = toml_cfg.general.level_file.as_deref().map(|name| {
            let path = PathBuf::from(name);
            if path.is_absolute() {
                return path;
            }
            search_dirs
                .iter()
                .map(|d| d.join(name))
                .find(|p| p.is_file())
                .unwrap_or(path)
        });

        Self::from_toml(toml_cfg, level_file)
    }

    /// Parse a config document held in memory.
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        let toml_cfg = toml::from_str::<TomlConfig>(text)?;
        let level_file = toml_cfg.general.level_file.as_ref().map(PathBuf::from);
        Ok(Self::from_toml(toml_cfg, level_file))
    }

    fn from_toml(toml_cfg: TomlConfig, level_file: Option<PathBuf>) -> Self {
        GameConfig {
            speed: SpeedConfig {
                tick_rate_ms: toml_cfg.speed.tick_rate_ms.max(10),
            },
            sim: SimConfig {
                floor: toml_cfg.floor.into(),
                loose_floor: toml_cfg.loose_floor.into(),
                door: toml_cfg.door.into(),
            },
            level_file,
            log_level: toml_cfg.general.log_level,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::from_toml(TomlConfig::default(), None)
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => {
                        debug!("loaded {}", path.display());
                        return cfg;
                    }
                    Err(e) => {
                        warn!("config.toml parse error: {e}; using default settings");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    warn!("could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let cfg = GameConfig::parse("").unwrap();
        assert_eq!(cfg, GameConfig::default());
        assert_eq!(cfg.speed.tick_rate_ms, 80);
        assert_eq!(cfg.sim.floor.press_depth, 2);
        assert_eq!(cfg.sim.door.fast_close_step, 10);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = GameConfig::parse(
            "[door]\nopen_wait = 5\n[general]\nlevel_file = \"palace.txt\"\n",
        )
        .unwrap();
        assert_eq!(cfg.sim.door.open_wait, 5);
        assert_eq!(cfg.sim.door.open_step, 1);
        assert_eq!(cfg.level_file, Some(PathBuf::from("palace.txt")));
        assert_eq!(cfg.log_level, "info");
    }

    #[test]
    fn nonsense_steps_are_clamped() {
        let cfg = GameConfig::parse("[door]\nclose_step = 0\n").unwrap();
        assert_eq!(cfg.sim.door.close_step, 1);
    }

    #[test]
    fn bad_document_is_an_error() {
        assert!(GameConfig::parse("[speed]\ntick_rate_ms = \"fast\"\n").is_err());
    }
}
