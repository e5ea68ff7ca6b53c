//! Player entity: movement, turbo, shooting/dunking motion and streaks
//!
//! Ball ownership is not stored here. The ball's `Held` target is the single
//! source of truth, and the match state checks it before calling the action
//! methods below.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::court::Court;
use super::hoop::Side;
use crate::consts::*;
use crate::ease_out_cubic;

/// Stable player identifier (index into the match roster)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub usize);

/// Who drives the player's movement intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Controller {
    Human,
    Ai,
}

/// Ratings, each 0..=10
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub speed: u8,
    pub three_point: u8,
    pub dunk: u8,
    pub defense: u8,
    pub steal: u8,
    pub block: u8,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            speed: 5,
            three_point: 5,
            dunk: 5,
            defense: 5,
            steal: 5,
            block: 5,
        }
    }
}

impl PlayerStats {
    pub const MAX: u8 = 10;

    /// Clamp every rating into 0..=10
    pub fn clamped(self) -> Self {
        Self {
            speed: self.speed.min(Self::MAX),
            three_point: self.three_point.min(Self::MAX),
            dunk: self.dunk.min(Self::MAX),
            defense: self.defense.min(Self::MAX),
            steal: self.steal.min(Self::MAX),
            block: self.block.min(Self::MAX),
        }
    }
}

/// An in-progress dunk: position is driven straight to the hoop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DunkMotion {
    pub from: Vec2,
    pub to: Vec2,
    pub elapsed_ms: f32,
}

impl DunkMotion {
    pub fn progress(&self) -> f32 {
        (self.elapsed_ms / DUNK_DURATION_MS).clamp(0.0, 1.0)
    }

    pub fn position(&self) -> Vec2 {
        self.from.lerp(self.to, ease_out_cubic(self.progress()))
    }
}

/// A player on the court
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub controller: Controller,
    pub side: Side,
    pub stats: PlayerStats,
    /// Floor position (x, depth)
    pub pos: Vec2,
    /// Velocity this tick (units/s)
    pub vel: Vec2,
    /// Facing left flips the held-ball offset
    pub facing_left: bool,

    pub turbo: f32,
    pub turbo_max: f32,
    /// Set when turbo was spent this tick (suppresses regen)
    #[serde(default)]
    turbo_spent: bool,

    pub consecutive_scores: u32,
    pub on_fire: bool,
    /// Bumped on every ignition so a stale extinguish timer can be ignored
    pub fire_generation: u32,

    pub jump_height: f32,
    pub jump_velocity: f32,
    pub airborne: bool,
    /// Shot lock: suppresses movement until landing
    pub shooting: bool,
    pub dunk: Option<DunkMotion>,
}

impl Player {
    pub fn new(id: PlayerId, side: Side, controller: Controller, pos: Vec2, turbo_max: f32) -> Self {
        Self {
            id,
            controller,
            side,
            stats: PlayerStats::default(),
            pos,
            vel: Vec2::ZERO,
            facing_left: false,
            turbo: turbo_max,
            turbo_max,
            turbo_spent: false,
            consecutive_scores: 0,
            on_fire: false,
            fire_generation: 0,
            jump_height: 0.0,
            jump_velocity: 0.0,
            airborne: false,
            shooting: false,
            dunk: None,
        }
    }

    pub fn with_stats(mut self, stats: PlayerStats) -> Self {
        self.stats = stats.clamped();
        self
    }

    pub fn is_human(&self) -> bool {
        self.controller == Controller::Human
    }

    pub fn is_dunking(&self) -> bool {
        self.dunk.is_some()
    }

    /// Free to start a shot or dunk
    pub fn can_act(&self) -> bool {
        !self.shooting && !self.is_dunking()
    }

    /// Base movement speed from the speed rating
    pub fn move_speed(&self) -> f32 {
        PLAYER_BASE_SPEED + self.stats.speed as f32 * PLAYER_SPEED_PER_STAT
    }

    /// Apply a movement intent (roughly unit length; turbo may scale it up).
    /// Ignored while shooting or dunking.
    pub fn move_intent(&mut self, direction: Vec2) {
        if !self.can_act() {
            return;
        }
        self.vel = direction * self.move_speed();
        if direction.x < 0.0 {
            self.facing_left = true;
        } else if direction.x > 0.0 {
            self.facing_left = false;
        }
    }

    /// Spend turbo if enough is available. Never partially deducts.
    pub fn use_turbo(&mut self, amount: f32) -> bool {
        if self.turbo >= amount {
            self.turbo -= amount;
            self.turbo_spent = true;
            true
        } else {
            false
        }
    }

    /// Regenerate unless turbo was spent this tick; clears the spent flag
    pub fn regen_turbo(&mut self, rate: f32) {
        if !self.turbo_spent && self.turbo < self.turbo_max {
            self.turbo = (self.turbo + rate).min(self.turbo_max);
        }
        self.turbo_spent = false;
    }

    /// Integrate velocity and keep the player on the floor
    pub fn integrate(&mut self, dt: f32, court: &Court) {
        if self.is_dunking() {
            return;
        }
        self.pos += self.vel * dt;
        self.constrain(court);
    }

    /// Clamp against the court at the current depth; a clamped axis loses
    /// its velocity (no bounce).
    pub fn constrain(&mut self, court: &Court) {
        if self.pos.y < court.far_depth {
            self.pos.y = court.far_depth;
            self.vel.y = 0.0;
        }
        if self.pos.y > court.near_depth {
            self.pos.y = court.near_depth;
            self.vel.y = 0.0;
        }

        let (left, right) = court.bounds_at(self.pos.y);
        if self.pos.x < left {
            self.pos.x = left;
            self.vel.x = 0.0;
        }
        if self.pos.x > right {
            self.pos.x = right;
            self.vel.x = 0.0;
        }
    }

    /// Enter the shot lock and jump. The caller checks ball possession.
    pub fn begin_shot(&mut self) -> bool {
        if !self.can_act() {
            return false;
        }
        self.shooting = true;
        self.vel = Vec2::ZERO;
        self.jump(SHOT_JUMP_VELOCITY);
        true
    }

    /// Start a dunk toward `target`. The caller checks possession and turbo.
    pub fn begin_dunk(&mut self, target: Vec2) -> bool {
        if !self.can_act() {
            return false;
        }
        self.shooting = true;
        self.vel = Vec2::ZERO;
        self.jump(DUNK_JUMP_VELOCITY);
        self.dunk = Some(DunkMotion {
            from: self.pos,
            to: target,
            elapsed_ms: 0.0,
        });
        true
    }

    fn jump(&mut self, velocity: f32) {
        self.airborne = true;
        self.jump_velocity = velocity;
    }

    /// Advance the dunk approach. Returns true on the tick it completes.
    pub fn advance_dunk(&mut self, dt_ms: f32) -> bool {
        let Some(motion) = self.dunk.as_mut() else {
            return false;
        };
        motion.elapsed_ms += dt_ms;
        self.pos = motion.position();
        if motion.progress() >= 1.0 {
            self.dunk = None;
            return true;
        }
        false
    }

    /// Per-tick jump integration; landing clears the shot lock
    pub fn update_jump(&mut self) {
        if !self.airborne {
            return;
        }
        self.jump_height += self.jump_velocity;
        self.jump_velocity -= JUMP_GRAVITY;

        if self.jump_height <= 0.0 {
            self.jump_height = 0.0;
            self.jump_velocity = 0.0;
            self.airborne = false;
            self.shooting = false;
        }
    }

    /// Count a make. Returns true if this make ignited the fire.
    pub fn score_basket(&mut self, threshold: u32) -> bool {
        self.consecutive_scores += 1;
        if self.consecutive_scores >= threshold && !self.on_fire {
            self.on_fire = true;
            self.fire_generation = self.fire_generation.wrapping_add(1);
            return true;
        }
        false
    }

    /// Count a miss. Returns true if this put out an active fire.
    pub fn miss_basket(&mut self) -> bool {
        self.consecutive_scores = 0;
        if self.on_fire {
            self.on_fire = false;
            return true;
        }
        false
    }

    /// Timed extinguish; ignored if the fire it belonged to is already gone
    pub fn extinguish_fire(&mut self, generation: u32) -> bool {
        if self.on_fire && self.fire_generation == generation {
            self.on_fire = false;
            return true;
        }
        false
    }

    pub fn visual_scale(&self, court: &Court) -> f32 {
        court.visual_scale(self.pos.y)
    }

    pub fn draw_depth(&self, court: &Court) -> f32 {
        court.draw_depth(PLAYER_BASE_DEPTH, self.pos.y, self.jump_height)
    }

    /// Sprite anchor on screen: lifted by the jump
    pub fn screen_position(&self) -> Vec2 {
        Vec2::new(self.pos.x, self.pos.y - self.jump_height)
    }
}
