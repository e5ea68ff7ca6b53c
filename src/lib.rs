//! Hangtime - a two-on-two arcade basketball simulation
//!
//! Core modules:
//! - `sim`: Frame-driven simulation (court geometry, ball, players, AI, match clock)
//! - `settings`: Data-driven match configuration
//! - `error`: Configuration loading errors

pub mod error;
pub mod settings;
pub mod sim;

pub use error::SettingsError;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (one tick per rendered frame at 60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Quarters per match
    pub const QUARTERS: u8 = 4;

    /// Player defaults
    pub const PLAYER_BASE_SPEED: f32 = 150.0;
    pub const PLAYER_SPEED_PER_STAT: f32 = 20.0;
    pub const TURBO_SPEED_MULTIPLIER: f32 = 1.5;
    /// Turbo drain is expressed per second; a tick spends this fraction of it
    pub const TURBO_DRAIN_FRAME: f32 = 0.016;
    pub const JUMP_GRAVITY: f32 = 0.5;
    pub const SHOT_JUMP_VELOCITY: f32 = 8.0;
    pub const DUNK_JUMP_VELOCITY: f32 = 12.0;
    pub const SHOT_RELEASE_DELAY_MS: u64 = 350;
    pub const DUNK_DURATION_MS: f32 = 600.0;
    /// Dunk ends this far in front of the hoop base (depth units)
    pub const DUNK_APPROACH_OFFSET: f32 = 30.0;

    /// Ball defaults
    pub const BALL_HOLD_OFFSET_X: f32 = 20.0;
    pub const BALL_HOLD_HEIGHT: f32 = 50.0;
    pub const MAX_BOUNCES: u32 = 3;

    /// Steal / pickup ranges (court units)
    pub const STEAL_RANGE: f32 = 60.0;
    pub const STEAL_CHANCE_SCALE: f32 = 0.4;
    pub const PICKUP_RANGE: f32 = 40.0;

    /// Draw-order bases (higher draws on top)
    pub const PLAYER_BASE_DEPTH: f32 = 10.0;
    pub const BALL_BASE_DEPTH: f32 = 15.0;
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Quadratic ease-in-out over [0, 1]
#[inline]
pub fn ease_in_out_quad(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

/// Cubic ease-out over [0, 1] (fast start, soft landing)
#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}
