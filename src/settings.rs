//! Match settings
//!
//! Every constant the simulation consumes: clock lengths, turbo economy,
//! streak tuning, and the court/hoop geometry. Loaded once, validated, then
//! treated as immutable by the match.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Environment variable pointing at a settings file
pub const CONFIG_ENV_VAR: &str = "HANGTIME_CONFIG";
/// Default settings file location (relative to the working directory)
pub const DEFAULT_CONFIG_PATH: &str = "config/hangtime.toml";

/// Trapezoidal court geometry (near edge wide, far edge narrow)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourtSettings {
    /// Depth coordinate of the near (bottom) edge
    pub near_depth: f32,
    /// Depth coordinate of the far (top) edge
    pub far_depth: f32,
    /// Left edge of the near side
    pub near_left: f32,
    /// Right edge of the near side
    pub near_right: f32,
    /// Far width as a fraction of near width, also the far visual scale
    pub perspective_scale: f32,
}

impl Default for CourtSettings {
    fn default() -> Self {
        Self {
            near_depth: 520.0,
            far_depth: 180.0,
            near_left: 80.0,
            near_right: 720.0,
            perspective_scale: 0.6,
        }
    }
}

impl CourtSettings {
    pub fn center_x(&self) -> f32 {
        (self.near_left + self.near_right) / 2.0
    }

    pub fn center_depth(&self) -> f32 {
        (self.near_depth + self.far_depth) / 2.0
    }
}

/// A single hoop: base position, and the rim point shots fly to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoopSettings {
    pub x: f32,
    pub depth: f32,
    pub rim_depth: f32,
    pub scale: f32,
}

/// Axis-aligned detection rectangle (x, depth, width, height)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneSettings {
    pub x: f32,
    pub depth: f32,
    pub width: f32,
    pub height: f32,
}

/// Rectangular basket detection zones for both hoops
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoopZoneSettings {
    pub near: ZoneSettings,
    pub far: ZoneSettings,
}

/// Match settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Clock ===
    /// Quarter length (seconds)
    pub quarter_length_secs: u32,
    /// Shot clock length (seconds)
    pub shot_clock_secs: u32,

    // === Turbo ===
    pub turbo_max: f32,
    /// Regenerated per tick when not spent
    pub turbo_regen_rate: f32,
    /// Sprint drain per second of turbo movement
    pub turbo_depletion_rate: f32,
    /// One-off cost of a dunk
    pub dunk_turbo_cost: f32,

    // === Streaks ===
    /// Consecutive makes needed to catch fire
    pub on_fire_threshold: u32,
    /// How long the fire lasts (seconds)
    pub on_fire_duration_secs: f32,

    // === Geometry ===
    pub court: CourtSettings,
    pub near_hoop: HoopSettings,
    pub far_hoop: HoopSettings,
    /// Detection zones; `None` falls back to distance-tolerance detection
    pub hoop_zones: Option<HoopZoneSettings>,
}

impl Default for Settings {
    fn default() -> Self {
        let court = CourtSettings::default();
        let center_x = court.center_x();
        let near_hoop = HoopSettings {
            x: center_x,
            depth: court.near_depth + 20.0,
            rim_depth: court.near_depth - 40.0,
            scale: 1.2,
        };
        let far_hoop = HoopSettings {
            x: center_x,
            depth: court.far_depth - 30.0,
            rim_depth: court.far_depth - 20.0,
            scale: 0.7,
        };
        let hoop_zones = HoopZoneSettings {
            far: ZoneSettings {
                x: far_hoop.x - 30.0,
                depth: far_hoop.depth - 40.0,
                width: 60.0,
                height: 60.0,
            },
            near: ZoneSettings {
                x: near_hoop.x - 35.0,
                depth: near_hoop.rim_depth - 30.0,
                width: 70.0,
                height: 70.0,
            },
        };

        Self {
            quarter_length_secs: 120,
            shot_clock_secs: 24,

            turbo_max: 100.0,
            turbo_regen_rate: 0.5,
            turbo_depletion_rate: 2.0,
            dunk_turbo_cost: 20.0,

            on_fire_threshold: 3,
            on_fire_duration_secs: 15.0,

            court,
            near_hoop,
            far_hoop,
            hoop_zones: Some(hoop_zones),
        }
    }
}

impl Settings {
    /// Load settings from `HANGTIME_CONFIG`, then `config/hangtime.toml`,
    /// falling back to defaults.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            match Self::from_path(&path) {
                Ok(settings) => return settings,
                Err(e) => log::warn!("Ignoring {} ({}): {}", CONFIG_ENV_VAR, path, e),
            }
        }
        if Path::new(DEFAULT_CONFIG_PATH).exists() {
            match Self::from_path(DEFAULT_CONFIG_PATH) {
                Ok(settings) => return settings,
                Err(e) => log::warn!("Ignoring {}: {}", DEFAULT_CONFIG_PATH, e),
            }
        }
        log::info!("Using default settings");
        Self::default()
    }

    /// Load and validate settings from a `.toml` or `.json` file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let settings = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&contents)?,
            Some("json") => Self::from_json_str(&contents)?,
            _ => {
                return Err(SettingsError::UnsupportedFormat {
                    path: path.display().to_string(),
                });
            }
        };
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(contents)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_json_str(contents: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(contents)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the simulation cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.quarter_length_secs == 0 {
            return Err(SettingsError::invalid("quarter_length_secs", "must be positive"));
        }
        if self.shot_clock_secs == 0 {
            return Err(SettingsError::invalid("shot_clock_secs", "must be positive"));
        }
        if !(self.turbo_max > 0.0) {
            return Err(SettingsError::invalid("turbo_max", "must be positive"));
        }
        if self.turbo_regen_rate < 0.0 || self.turbo_depletion_rate < 0.0 {
            return Err(SettingsError::invalid(
                "turbo_regen_rate",
                "turbo rates must not be negative",
            ));
        }
        if self.dunk_turbo_cost < 0.0 || self.dunk_turbo_cost > self.turbo_max {
            return Err(SettingsError::invalid(
                "dunk_turbo_cost",
                format!("must be within 0..={}", self.turbo_max),
            ));
        }
        if self.on_fire_threshold == 0 {
            return Err(SettingsError::invalid("on_fire_threshold", "must be at least 1"));
        }
        if !(self.on_fire_duration_secs > 0.0) {
            return Err(SettingsError::invalid("on_fire_duration_secs", "must be positive"));
        }

        let court = &self.court;
        if !(court.far_depth < court.near_depth) {
            return Err(SettingsError::invalid(
                "court.far_depth",
                format!(
                    "far depth {} must be less than near depth {}",
                    court.far_depth, court.near_depth
                ),
            ));
        }
        if !(court.near_left < court.near_right) {
            return Err(SettingsError::invalid(
                "court.near_left",
                "near left edge must be left of the near right edge",
            ));
        }
        if !(court.perspective_scale > 0.0 && court.perspective_scale <= 1.0) {
            return Err(SettingsError::invalid(
                "court.perspective_scale",
                "must be within (0, 1]",
            ));
        }

        if let Some(zones) = &self.hoop_zones {
            for (field, zone) in [("hoop_zones.near", &zones.near), ("hoop_zones.far", &zones.far)] {
                if !(zone.width > 0.0 && zone.height > 0.0) {
                    return Err(SettingsError::invalid(field, "zone must have a positive size"));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_default_geometry() {
        let settings = Settings::default();
        assert_eq!(settings.court.center_x(), 400.0);
        assert_eq!(settings.court.center_depth(), 350.0);
        assert_eq!(settings.far_hoop.depth, 150.0);
        assert_eq!(settings.far_hoop.rim_depth, 160.0);
        assert_eq!(settings.near_hoop.depth, 540.0);
        assert_eq!(settings.near_hoop.rim_depth, 480.0);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings = Settings::from_toml_str(
            r#"
            quarter_length_secs = 60
            on_fire_threshold = 2

            [court]
            perspective_scale = 0.5
            "#,
        )
        .unwrap();
        assert_eq!(settings.quarter_length_secs, 60);
        assert_eq!(settings.on_fire_threshold, 2);
        assert_eq!(settings.court.perspective_scale, 0.5);
        assert_eq!(settings.court.near_depth, 520.0);
        assert_eq!(settings.shot_clock_secs, 24);
        assert!(settings.hoop_zones.is_some());
    }

    #[test]
    fn test_shipped_config_matches_defaults() {
        let settings = Settings::from_toml_str(include_str!("../config/hangtime.toml")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_json_round_trip() {
        let json = serde_json::to_string(&Settings::default()).unwrap();
        let settings = Settings::from_json_str(&json).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_rejects_inverted_court() {
        let mut settings = Settings::default();
        settings.court.far_depth = 600.0;
        let err = settings.validate().unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { field: "court.far_depth", .. }));
    }

    #[test]
    fn test_rejects_zero_threshold_from_toml() {
        let err = Settings::from_toml_str("on_fire_threshold = 0").unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { field: "on_fire_threshold", .. }));
    }

    #[test]
    fn test_rejects_bad_perspective() {
        let mut settings = Settings::default();
        settings.court.perspective_scale = 1.5;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = Settings::from_toml_str("quarter_length_secs = \"soon\"").unwrap_err();
        assert!(matches!(err, SettingsError::Toml(_)));
    }

    #[test]
    fn test_unsupported_extension() {
        let path = std::env::temp_dir().join("hangtime_settings_test.yaml");
        std::fs::write(&path, "quarter_length_secs: 10").unwrap();
        let err = Settings::from_path(&path).unwrap_err();
        assert!(matches!(err, SettingsError::UnsupportedFormat { .. }));
        let _ = std::fs::remove_file(&path);
    }
}
