//! AI decision engine
//!
//! One agent per computer-controlled player. Each agent re-plans on its own
//! randomized timer and steers toward its current target every tick.
//! Role follows live possession and is refreshed every tick, independent of
//! the decision timer.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::ball::Ball;
use super::court::Court;
use super::hoop::{Hoops, Side};
use super::player::{Player, PlayerId};
use crate::consts::PICKUP_RANGE;

/// Decision timer bounds (ms)
pub const DECISION_INTERVAL_MIN_MS: u32 = 500;
pub const DECISION_INTERVAL_MAX_MS: u32 = 1500;
/// Holding the ball this close (depth) to the attacked hoop allows a shot
pub const SHOT_RANGE: f32 = 100.0;
/// A shot is taken when a uniform roll beats this
pub const SHOT_ROLL_THRESHOLD: f32 = 0.3;
/// Steering stops inside this distance of the target
pub const ARRIVE_DISTANCE: f32 = 20.0;
/// Delay before an AI shot's possession follow-up (ms)
pub const SHOT_FOLLOW_UP_MS: u64 = 1500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Offense,
    Defense,
}

impl Role {
    pub fn for_side(side: Side, possession: Side) -> Self {
        if side == possession {
            Role::Offense
        } else {
            Role::Defense
        }
    }
}

/// Outcome of a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiDecision {
    /// Take a shot now
    Shoot,
    /// New target chosen
    Reposition,
}

/// Read-only view of the match an agent plans against
#[derive(Clone, Copy)]
pub struct AiContext<'a> {
    pub court: &'a Court,
    pub hoops: &'a Hoops,
    pub ball: &'a Ball,
    pub players: &'a [Player],
}

impl AiContext<'_> {
    fn holder(&self) -> Option<&Player> {
        let id = self.ball.holder()?;
        self.players.iter().find(|p| p.id == id)
    }
}

/// Planner state for one player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiAgent {
    pub player: PlayerId,
    pub target: Vec2,
    /// Counts down to the next decision
    pub decision_timer_ms: f32,
    pub role: Role,
}

impl AiAgent {
    /// Starts on its player's spot with a decision due immediately
    pub fn new(player: &Player) -> Self {
        Self {
            player: player.id,
            target: player.pos,
            decision_timer_ms: 0.0,
            role: Role::Offense,
        }
    }

    pub fn update_role(&mut self, side: Side, possession: Side) {
        self.role = Role::for_side(side, possession);
    }

    /// Count down; when the timer expires, re-roll it and report a decision
    /// is due.
    pub fn tick_timer<R: Rng + ?Sized>(&mut self, dt_ms: f32, rng: &mut R) -> bool {
        self.decision_timer_ms -= dt_ms;
        if self.decision_timer_ms > 0.0 {
            return false;
        }
        self.decision_timer_ms =
            rng.random_range(DECISION_INTERVAL_MIN_MS..=DECISION_INTERVAL_MAX_MS) as f32;
        true
    }

    /// Pick a new target (or decide to shoot) for `me`
    pub fn decide<R: Rng + ?Sized>(
        &mut self,
        me: &Player,
        ctx: &AiContext<'_>,
        rng: &mut R,
    ) -> AiDecision {
        let decision = match self.role {
            Role::Offense => self.decide_offense(me, ctx, rng),
            Role::Defense => {
                self.decide_defense(me, ctx, rng);
                AiDecision::Reposition
            }
        };
        self.target.y = ctx.court.clamp_depth(self.target.y);
        decision
    }

    fn decide_offense<R: Rng + ?Sized>(
        &mut self,
        me: &Player,
        ctx: &AiContext<'_>,
        rng: &mut R,
    ) -> AiDecision {
        if ctx.ball.holder() == Some(me.id) {
            let hoop = ctx.hoops.get(me.side.attacking());
            if (me.pos.y - hoop.pos.y).abs() < SHOT_RANGE
                && rng.random::<f32>() > SHOT_ROLL_THRESHOLD
            {
                return AiDecision::Shoot;
            }
            // Set up in front of the attacked hoop
            self.target = Vec2::new(
                hoop.pos.x + jitter(rng, 80),
                hoop.pos.y - me.side.depth_direction() * 80.0,
            );
        } else if ctx.ball.is_loose() {
            self.target = ctx.ball.pos;
        } else {
            let spacing = match me.side {
                Side::Home => -60.0,
                Side::Away => 60.0,
            };
            let center = ctx.court.center();
            self.target = Vec2::new(
                center.x + spacing + jitter(rng, 30),
                center.y + jitter(rng, 40),
            );
        }
        AiDecision::Reposition
    }

    fn decide_defense<R: Rng + ?Sized>(&mut self, me: &Player, ctx: &AiContext<'_>, rng: &mut R) {
        match ctx.holder().filter(|holder| holder.side != me.side) {
            Some(holder) => {
                // Man-to-man pressure
                self.target = Vec2::new(
                    holder.pos.x + jitter(rng, 30),
                    holder.pos.y + jitter(rng, 20),
                );
            }
            None if ctx.ball.is_loose() => self.target = ctx.ball.pos,
            None => {
                let hoop = ctx.hoops.get(me.side.defending());
                self.target = Vec2::new(
                    hoop.pos.x + jitter(rng, 50),
                    hoop.pos.y + me.side.depth_direction() * 60.0,
                );
            }
        }
    }

    /// Unit direction toward the target, or zero once close enough
    pub fn steer(&self, me: &Player) -> Vec2 {
        let delta = self.target - me.pos;
        if delta.length() > ARRIVE_DISTANCE {
            delta.normalize_or_zero()
        } else {
            Vec2::ZERO
        }
    }

    /// Whether `me` is close enough to scoop up a loose ball
    pub fn can_pick_up(&self, me: &Player, ball: &Ball) -> bool {
        ball.is_loose() && me.pos.distance(ball.pos) < PICKUP_RANGE
    }
}

/// Uniform integer offset in [-bound, bound]
fn jitter<R: Rng + ?Sized>(rng: &mut R, bound: i32) -> f32 {
    rng.random_range(-bound..=bound) as f32
}
