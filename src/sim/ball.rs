//! Ball simulation: held / in-flight / loose
//!
//! Flights (shots and passes) share one shape:
//! - progress `t` advances by a per-flight speed each tick
//! - horizontal position eases in-out, depth interpolates linearly
//! - height is the parabola `4 * arc * t * (1 - t)`
//!
//! Finished shots are tested against the hoops and reported through a
//! [`ScoringSink`]; the ball then drops loose and bounces to rest.

use glam::{Vec2, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::court::Court;
use super::hoop::{BasketCheck, Hoops, Side};
use super::player::{Player, PlayerId};
use crate::consts::*;
use crate::ease_in_out_quad;

/// Shot arc height bounds
pub const SHOT_ARC_MIN: f32 = 80.0;
pub const SHOT_ARC_MAX: f32 = 200.0;
pub const SHOT_ARC_PER_UNIT: f32 = 0.4;
/// Shot speed = base + k / (distance + c)
pub const SHOT_SPEED_BASE: f32 = 0.015;
pub const SHOT_SPEED_K: f32 = 1.5;
pub const SHOT_SPEED_C: f32 = 100.0;
/// Passes are flatter and faster
pub const PASS_ARC_MAX: f32 = 40.0;
pub const PASS_ARC_PER_UNIT: f32 = 0.15;
pub const PASS_SPEED: f32 = 0.04;
/// Visual spin per flight tick
pub const FLIGHT_SPIN: f32 = 0.15;

/// Loose-ball tuning
pub const LOOSE_GRAVITY: f32 = 0.3;
pub const BOUNCE_RESTITUTION: f32 = 0.6;
pub const BOUNCE_FLOOR_DAMPING: f32 = 0.7;
pub const WALL_RESTITUTION: f32 = 0.5;
/// Loose velocities are in units per reference frame; this maps them to seconds
pub const LOOSE_DRIFT_SCALE: f32 = 0.016 * 60.0 * 60.0;

/// Who has the ball / what it is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallMode {
    /// Carried; position derives from the holder
    Held(PlayerId),
    /// Shot toward a rim
    InFlightShot,
    /// Pass toward a receiver
    InFlightPass { receiver: PlayerId },
    /// On the floor, bouncing or at rest
    Loose,
}

/// Parameters of the current (or last) flight
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    pub start: Vec2,
    pub target: Vec2,
    /// 0..1
    pub progress: f32,
    /// Progress added per tick
    pub speed: f32,
    pub arc_height: f32,
    /// Who released it (shots only)
    pub shooter: Option<PlayerId>,
}

impl Default for Flight {
    fn default() -> Self {
        Self {
            start: Vec2::ZERO,
            target: Vec2::ZERO,
            progress: 0.0,
            speed: 0.0,
            arc_height: 0.0,
            shooter: None,
        }
    }
}

impl Flight {
    fn shot(start: Vec2, target: Vec2, shooter: Option<PlayerId>) -> Self {
        let distance = start.distance(target);
        Self {
            start,
            target,
            progress: 0.0,
            speed: shot_speed(distance),
            arc_height: (distance * SHOT_ARC_PER_UNIT).clamp(SHOT_ARC_MIN, SHOT_ARC_MAX),
            shooter,
        }
    }

    fn pass(start: Vec2, target: Vec2) -> Self {
        let distance = start.distance(target);
        Self {
            start,
            target,
            progress: 0.0,
            speed: PASS_SPEED,
            arc_height: (distance * PASS_ARC_PER_UNIT).min(PASS_ARC_MAX),
            shooter: None,
        }
    }

    /// Floor position at progress `t`
    pub fn position_at(&self, t: f32) -> Vec2 {
        let eased = ease_in_out_quad(t);
        Vec2::new(
            self.start.x + (self.target.x - self.start.x) * eased,
            self.start.y + (self.target.y - self.start.y) * t,
        )
    }
}

/// Normalized progress per tick for a shot of the given length
pub fn shot_speed(distance: f32) -> f32 {
    SHOT_SPEED_BASE + SHOT_SPEED_K / (distance + SHOT_SPEED_C)
}

/// Parabolic flight height: zero at both ends, `arc_height` at t = 0.5
#[inline]
pub fn arc_height_at(t: f32, arc_height: f32) -> f32 {
    4.0 * arc_height * t * (1.0 - t)
}

/// Receives shot outcomes from the ball
pub trait ScoringSink {
    /// A shot went in: credit `side` with `points`
    fn add_score(&mut self, side: Side, points: u8);

    /// Presentation hook for a made basket
    fn score_effect(&mut self, _at: Vec2, _shooter: Option<PlayerId>) {}

    /// Presentation hook for a miss (rim sparks, streak reset)
    fn miss_effect(&mut self, _at: Vec2, _shooter: Option<PlayerId>) {}
}

/// What a ball update produced besides scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallUpdate {
    Idle,
    /// A pass reached its target; hand the ball to `receiver`
    PassArrived { receiver: PlayerId },
    /// A shot finished (made or missed) and the ball is loose
    ShotResolved(BasketCheck),
}

/// The match ball
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub mode: BallMode,
    /// Floor position (x, depth)
    pub pos: Vec2,
    /// Height above the court
    pub height: f32,
    pub rotation: f32,
    pub flight: Flight,
    pub bounce_count: u32,
    /// Loose-mode velocity (x, depth, vertical)
    pub vel: Vec3,
}

impl Ball {
    /// A ball resting at `pos`
    pub fn new(pos: Vec2) -> Self {
        Self {
            mode: BallMode::Loose,
            pos,
            height: 0.0,
            rotation: 0.0,
            flight: Flight::default(),
            bounce_count: MAX_BOUNCES,
            vel: Vec3::ZERO,
        }
    }

    pub fn holder(&self) -> Option<PlayerId> {
        match self.mode {
            BallMode::Held(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_held(&self) -> bool {
        matches!(self.mode, BallMode::Held(_))
    }

    /// Not held and not flying
    pub fn is_loose(&self) -> bool {
        self.mode == BallMode::Loose
    }

    /// Loose and no longer moving
    pub fn is_at_rest(&self) -> bool {
        self.is_loose() && self.vel == Vec3::ZERO && self.height <= 0.0
    }

    /// Hand the ball to `holder` from any state (pickup, steal, catch)
    pub fn set_holder(&mut self, holder: PlayerId) {
        self.mode = BallMode::Held(holder);
        self.bounce_count = 0;
        self.height = 0.0;
        self.vel = Vec3::ZERO;
    }

    /// Shoot from the holder toward `target`. No-op without a holder.
    pub fn release(&mut self, target: Vec2) -> bool {
        let Some(shooter) = self.holder() else {
            return false;
        };
        self.flight = Flight::shot(self.pos, target, Some(shooter));
        self.mode = BallMode::InFlightShot;
        self.bounce_count = 0;
        self.vel = Vec3::ZERO;
        true
    }

    /// Throw to `receiver` standing at `target`. No-op without a holder.
    pub fn pass_to(&mut self, target: Vec2, receiver: PlayerId) -> bool {
        if !self.is_held() {
            return false;
        }
        self.flight = Flight::pass(self.pos, target);
        self.mode = BallMode::InFlightPass { receiver };
        self.vel = Vec3::ZERO;
        true
    }

    /// Knock the ball loose from its holder. No-op without a holder.
    pub fn drop_loose<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if !self.is_held() {
            return false;
        }
        self.mode = BallMode::Loose;
        self.bounce_count = 0;
        self.vel = Vec3::new(
            rng.random_range(-30..=30) as f32,
            rng.random_range(-20..=20) as f32,
            2.0,
        );
        true
    }

    /// Re-derive the held position from the holder: offset to the facing
    /// side and lifted above the holder's jump.
    pub fn follow(&mut self, holder: &Player) {
        if self.holder() != Some(holder.id) {
            return;
        }
        let offset_x = if holder.facing_left {
            -BALL_HOLD_OFFSET_X
        } else {
            BALL_HOLD_OFFSET_X
        };
        self.pos = Vec2::new(holder.pos.x + offset_x, holder.pos.y);
        self.height = BALL_HOLD_HEIGHT + holder.jump_height;
    }

    /// Advance flight or loose physics by one tick. Held balls are moved by
    /// [`Ball::follow`] instead.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        court: &Court,
        hoops: &Hoops,
        rng: &mut R,
        sink: &mut dyn ScoringSink,
    ) -> BallUpdate {
        match self.mode {
            BallMode::Held(_) => BallUpdate::Idle,
            BallMode::InFlightShot | BallMode::InFlightPass { .. } => {
                self.update_flight(court, hoops, rng, sink)
            }
            BallMode::Loose => {
                self.update_loose(dt, court);
                BallUpdate::Idle
            }
        }
    }

    fn update_flight<R: Rng + ?Sized>(
        &mut self,
        court: &Court,
        hoops: &Hoops,
        rng: &mut R,
        sink: &mut dyn ScoringSink,
    ) -> BallUpdate {
        self.flight.progress += self.flight.speed;

        if self.flight.progress >= 1.0 {
            self.flight.progress = 1.0;
            self.pos = self.flight.target;
            self.height = 0.0;

            return match self.mode {
                BallMode::InFlightPass { receiver } => {
                    // Rests at the catch point until the receiver is handed it
                    self.mode = BallMode::Loose;
                    self.bounce_count = MAX_BOUNCES;
                    self.vel = Vec3::ZERO;
                    BallUpdate::PassArrived { receiver }
                }
                _ => BallUpdate::ShotResolved(self.check_basket(court, hoops, rng, sink)),
            };
        }

        let t = self.flight.progress;
        self.pos = self.flight.position_at(t);
        self.height = arc_height_at(t, self.flight.arc_height);
        self.rotation += FLIGHT_SPIN;
        BallUpdate::Idle
    }

    fn check_basket<R: Rng + ?Sized>(
        &mut self,
        court: &Court,
        hoops: &Hoops,
        rng: &mut R,
        sink: &mut dyn ScoringSink,
    ) -> BasketCheck {
        let aimed_at = hoops.end_for_depth(court, self.flight.target.y);
        let check = hoops.detect(self.pos, aimed_at);

        match check.scoring_side() {
            Some(side) => {
                let points =
                    hoops.points_for_shot(court, self.flight.start.y, self.flight.target.y);
                sink.add_score(side, points);
                sink.score_effect(self.pos, self.flight.shooter);
            }
            None => sink.miss_effect(self.pos, self.flight.shooter),
        }

        self.start_loose_bounce(rng);
        check
    }

    /// Kick off the post-shot bounce off the rim
    fn start_loose_bounce<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.mode = BallMode::Loose;
        self.bounce_count = 0;
        self.height = 20.0;
        self.vel = Vec3::new(
            rng.random_range(-50..=50) as f32,
            rng.random_range(-30..=30) as f32,
            3.0,
        );
    }

    fn update_loose(&mut self, dt: f32, court: &Court) {
        if self.is_at_rest() {
            return;
        }

        let drift = dt * LOOSE_DRIFT_SCALE;
        self.pos.x += self.vel.x * drift;
        self.pos.y += self.vel.y * drift;

        self.height += self.vel.z;
        self.vel.z -= LOOSE_GRAVITY;

        if self.height <= 0.0 {
            self.height = 0.0;
            self.bounce_count += 1;

            if self.bounce_count < MAX_BOUNCES {
                self.vel.z = self.vel.z.abs() * BOUNCE_RESTITUTION;
                self.vel.x *= BOUNCE_FLOOR_DAMPING;
                self.vel.y *= BOUNCE_FLOOR_DAMPING;
            } else {
                self.vel = Vec3::ZERO;
            }
        }

        self.constrain(court);
        self.rotation += self.vel.x * 0.01;
    }

    /// Keep the loose ball on the floor, reflecting off the edges
    fn constrain(&mut self, court: &Court) {
        if self.pos.y < court.far_depth {
            self.pos.y = court.far_depth;
            self.vel.y = self.vel.y.abs() * WALL_RESTITUTION;
        }
        if self.pos.y > court.near_depth {
            self.pos.y = court.near_depth;
            self.vel.y = -self.vel.y.abs() * WALL_RESTITUTION;
        }

        let (left, right) = court.bounds_at(self.pos.y);
        if self.pos.x < left {
            self.pos.x = left;
            self.vel.x = self.vel.x.abs() * WALL_RESTITUTION;
        }
        if self.pos.x > right {
            self.pos.x = right;
            self.vel.x = -self.vel.x.abs() * WALL_RESTITUTION;
        }
    }

    pub fn visual_scale(&self, court: &Court) -> f32 {
        court.visual_scale(self.pos.y) * 0.8
    }

    pub fn draw_depth(&self, court: &Court) -> f32 {
        court.draw_depth(BALL_BASE_DEPTH, self.pos.y, self.height)
    }

    /// Sprite position on screen: floor point lifted by height
    pub fn screen_position(&self) -> Vec2 {
        Vec2::new(self.pos.x, self.pos.y - self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::hoop::HoopEnd;
    use crate::sim::player::Controller;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[derive(Default)]
    struct RecordingSink {
        scores: Vec<(Side, u8)>,
        misses: usize,
    }

    impl ScoringSink for RecordingSink {
        fn add_score(&mut self, side: Side, points: u8) {
            self.scores.push((side, points));
        }

        fn miss_effect(&mut self, _at: Vec2, _shooter: Option<PlayerId>) {
            self.misses += 1;
        }
    }

    fn player(id: usize, pos: Vec2) -> Player {
        Player::new(PlayerId(id), Side::Home, Controller::Ai, pos, 100.0)
    }

    fn run_until_resolved(ball: &mut Ball, sink: &mut RecordingSink) -> BallUpdate {
        let court = Court::default();
        let hoops = Hoops::default();
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..1000 {
            let update = ball.update(SIM_DT, &court, &hoops, &mut rng, sink);
            if update != BallUpdate::Idle {
                return update;
            }
        }
        panic!("flight never finished");
    }

    #[test]
    fn test_held_ball_follows_holder() {
        let holder = player(0, Vec2::new(300.0, 400.0));
        let mut ball = Ball::new(Vec2::new(400.0, 350.0));
        ball.set_holder(holder.id);
        ball.follow(&holder);
        assert_eq!(ball.pos, Vec2::new(320.0, 400.0));
        assert_eq!(ball.height, BALL_HOLD_HEIGHT);

        let mut jumper = holder.clone();
        jumper.facing_left = true;
        jumper.jump_height = 12.0;
        ball.follow(&jumper);
        assert_eq!(ball.pos, Vec2::new(280.0, 400.0));
        assert_eq!(ball.height, BALL_HOLD_HEIGHT + 12.0);
    }

    #[test]
    fn test_steal_moves_ball_instantly() {
        let a = player(0, Vec2::new(300.0, 400.0));
        let b = player(1, Vec2::new(500.0, 250.0));
        let mut ball = Ball::new(Vec2::ZERO);
        ball.set_holder(a.id);
        ball.follow(&a);

        ball.set_holder(b.id);
        ball.follow(&b);
        assert_eq!(ball.pos, Vec2::new(520.0, 250.0));
        // The old holder no longer drives it
        ball.follow(&a);
        assert_eq!(ball.pos, Vec2::new(520.0, 250.0));
    }

    #[test]
    fn test_arc_height_endpoints_and_peak() {
        assert_eq!(arc_height_at(0.0, 120.0), 0.0);
        assert_eq!(arc_height_at(1.0, 120.0), 0.0);
        assert_eq!(arc_height_at(0.5, 120.0), 120.0);
    }

    #[test]
    fn test_actions_without_holder_are_noops() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut ball = Ball::new(Vec2::new(400.0, 350.0));
        assert!(!ball.release(Vec2::new(400.0, 160.0)));
        assert!(!ball.pass_to(Vec2::new(300.0, 300.0), PlayerId(1)));
        assert!(!ball.drop_loose(&mut rng));
        assert_eq!(ball.mode, BallMode::Loose);
        assert!(ball.is_at_rest());
    }

    #[test]
    fn test_shot_parameters_scale_with_distance() {
        let short = Flight::shot(Vec2::new(400.0, 200.0), Vec2::new(400.0, 160.0), None);
        let long = Flight::shot(Vec2::new(400.0, 500.0), Vec2::new(400.0, 160.0), None);
        assert_eq!(short.arc_height, SHOT_ARC_MIN);
        assert_eq!(long.arc_height, 136.0);
        assert!(long.speed < short.speed);

        let huge = Flight::shot(Vec2::new(0.0, 0.0), Vec2::new(1000.0, 0.0), None);
        assert_eq!(huge.arc_height, SHOT_ARC_MAX);
    }

    #[test]
    fn test_made_shot_scores_once_and_goes_loose() {
        let shooter = player(0, Vec2::new(380.0, 350.0));
        let mut ball = Ball::new(Vec2::ZERO);
        ball.set_holder(shooter.id);
        ball.follow(&shooter);
        assert!(ball.release(Hoops::default().far.rim));
        assert_eq!(ball.mode, BallMode::InFlightShot);

        let mut sink = RecordingSink::default();
        let update = run_until_resolved(&mut ball, &mut sink);
        assert_eq!(
            update,
            BallUpdate::ShotResolved(BasketCheck::Made { hoop: HoopEnd::Far })
        );
        assert_eq!(sink.scores, vec![(Side::Home, 3)]);
        assert_eq!(sink.misses, 0);
        assert_eq!(ball.mode, BallMode::Loose);
        assert_eq!(ball.height, 20.0);
    }

    #[test]
    fn test_missed_shot_reports_miss() {
        let shooter = player(0, Vec2::new(380.0, 350.0));
        let mut ball = Ball::new(Vec2::ZERO);
        ball.set_holder(shooter.id);
        ball.follow(&shooter);
        assert!(ball.release(Vec2::new(250.0, 200.0)));

        let mut sink = RecordingSink::default();
        let update = run_until_resolved(&mut ball, &mut sink);
        assert_eq!(update, BallUpdate::ShotResolved(BasketCheck::Missed));
        assert!(sink.scores.is_empty());
        assert_eq!(sink.misses, 1);
        assert!(ball.is_loose());
    }

    #[test]
    fn test_pass_arrives_at_receiver() {
        let passer = player(0, Vec2::new(300.0, 400.0));
        let mut ball = Ball::new(Vec2::ZERO);
        ball.set_holder(passer.id);
        ball.follow(&passer);
        let target = Vec2::new(250.0, 440.0);
        assert!(ball.pass_to(target, PlayerId(1)));
        assert!(ball.flight.arc_height <= PASS_ARC_MAX);

        let mut sink = RecordingSink::default();
        let update = run_until_resolved(&mut ball, &mut sink);
        assert_eq!(update, BallUpdate::PassArrived { receiver: PlayerId(1) });
        assert_eq!(ball.pos, target);
        assert!(sink.scores.is_empty());
        assert_eq!(sink.misses, 0);
    }

    #[test]
    fn test_loose_ball_comes_to_rest() {
        let court = Court::default();
        let hoops = Hoops::default();
        let mut rng = Pcg32::seed_from_u64(3);
        let mut sink = RecordingSink::default();
        let holder = player(0, court.center());
        let mut ball = Ball::new(Vec2::ZERO);
        ball.set_holder(holder.id);
        ball.follow(&holder);
        assert!(ball.drop_loose(&mut rng));

        for _ in 0..2000 {
            ball.update(SIM_DT, &court, &hoops, &mut rng, &mut sink);
            assert!(court.contains(ball.pos));
            if ball.is_at_rest() {
                break;
            }
        }
        assert!(ball.is_at_rest());
        assert_eq!(ball.bounce_count, MAX_BOUNCES);
    }

    #[test]
    fn test_loose_ball_reflects_off_edge() {
        let court = Court::default();
        let mut ball = Ball::new(Vec2::new(715.0, 520.0));
        ball.mode = BallMode::Loose;
        ball.bounce_count = 0;
        ball.height = 10.0;
        ball.vel = Vec3::new(40.0, 0.0, 1.0);
        ball.update_loose(SIM_DT, &court);
        assert_eq!(ball.pos.x, court.right_bound(court.near_depth));
        assert_eq!(ball.vel.x, -20.0);
    }

    proptest! {
        #[test]
        fn arc_height_bounded(t in 0.0f32..=1.0, arc in 0.0f32..=200.0) {
            let h = arc_height_at(t, arc);
            prop_assert!(h >= 0.0);
            prop_assert!(h <= arc + 1e-3);
        }
    }
}
