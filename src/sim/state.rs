//! Match state and gameplay operations
//!
//! `MatchState` is the single simulation context: it owns the roster, ball,
//! clock, score, possession, deferred tasks and the seeded RNG. Gameplay
//! operations return `bool` (acted / declined) and never fail.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::ai::{AiAgent, SHOT_FOLLOW_UP_MS};
use super::ball::{Ball, ScoringSink};
use super::clock::{ClockEvent, MatchClock};
use super::court::Court;
use super::hoop::{Hoops, Side};
use super::player::{Controller, Player, PlayerId, PlayerStats};
use super::schedule::{ScheduledTask, Scheduler};
use crate::consts::*;
use crate::settings::Settings;

/// Who controls the roster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchMode {
    /// Player 0 is human, the rest are AI
    SinglePlayer,
    /// All four players are AI; a full clocked match with no human
    Attract,
}

/// Points per side
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    pub home: u32,
    pub away: u32,
}

impl Scoreboard {
    pub fn add(&mut self, side: Side, points: u8) {
        match side {
            Side::Home => self.home += points as u32,
            Side::Away => self.away += points as u32,
        }
    }
}

/// Events for the presentation layer (score flash, rim sparks, fire tint)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    Scored { side: Side, points: u8 },
    Missed { shooter: Option<PlayerId> },
    ShotClockViolation,
    QuarterEnded { quarter: u8 },
    QuarterStarted { quarter: u8 },
    GameOver { home: u32, away: u32 },
    PossessionChanged { side: Side },
    Steal { thief: PlayerId, victim: PlayerId },
    PassCompleted { receiver: PlayerId },
    OnFire { player: PlayerId },
    FireExtinguished { player: PlayerId },
}

/// Complete match state (deterministic for a seed and input sequence)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchState {
    pub seed: u64,
    pub mode: MatchMode,
    pub settings: Settings,
    pub court: Court,
    pub hoops: Hoops,
    /// Indexed by `PlayerId`
    pub players: Vec<Player>,
    pub ball: Ball,
    /// One per AI-controlled player
    pub agents: Vec<AiAgent>,
    pub clock: MatchClock,
    pub score: Scoreboard,
    /// Side currently in control (drives AI roles)
    pub possession: Side,
    /// Whole-simulation pause (host toggled)
    pub paused: bool,
    pub time_ticks: u64,
    pub elapsed_ms: f64,
    pub(crate) scheduler: Scheduler,
    pub(crate) rng: Pcg32,
    #[serde(skip)]
    pub(crate) events: Vec<GameEvent>,
}

impl MatchState {
    /// New match with every player on default ratings
    pub fn new(settings: Settings, mode: MatchMode, seed: u64) -> Self {
        Self::with_roster(settings, mode, seed, [PlayerStats::default(); 4])
    }

    /// New match with per-player ratings, in roster order (home, home, away, away)
    pub fn with_roster(
        settings: Settings,
        mode: MatchMode,
        seed: u64,
        stats: [PlayerStats; 4],
    ) -> Self {
        let court = Court::from_settings(&settings.court);
        let hoops = Hoops::from_settings(&settings);
        let center = court.center();
        let start_depth = center.y + 50.0;

        let roster = [
            (Side::Home, Vec2::new(center.x - 80.0, start_depth)),
            (Side::Home, Vec2::new(center.x - 150.0, start_depth + 40.0)),
            (Side::Away, Vec2::new(center.x + 80.0, start_depth)),
            (Side::Away, Vec2::new(center.x + 150.0, start_depth + 40.0)),
        ];
        let players: Vec<Player> = roster
            .iter()
            .zip(stats)
            .enumerate()
            .map(|(i, (&(side, pos), stats))| {
                let controller = match mode {
                    MatchMode::SinglePlayer if i == 0 => Controller::Human,
                    _ => Controller::Ai,
                };
                Player::new(PlayerId(i), side, controller, pos, settings.turbo_max)
                    .with_stats(stats)
            })
            .collect();
        let agents = players
            .iter()
            .filter(|p| !p.is_human())
            .map(AiAgent::new)
            .collect();

        let mut state = Self {
            seed,
            mode,
            clock: MatchClock::from_settings(&settings),
            settings,
            ball: Ball::new(center),
            court,
            hoops,
            players,
            agents,
            score: Scoreboard::default(),
            possession: Side::Home,
            paused: false,
            time_ticks: 0,
            elapsed_ms: 0.0,
            scheduler: Scheduler::new(),
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
        };
        state.give_ball(PlayerId(0));
        log::info!("New {:?} match (seed {})", mode, seed);
        state
    }

    /// Match time in whole milliseconds (scheduler clock)
    pub fn now_ms(&self) -> u64 {
        self.elapsed_ms as u64
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id.0)
    }

    /// The human-controlled player, if any
    pub fn human(&self) -> Option<PlayerId> {
        self.players.iter().find(|p| p.is_human()).map(|p| p.id)
    }

    /// First roster player on `side` other than `id`
    pub fn teammate_of(&self, id: PlayerId) -> Option<PlayerId> {
        let side = self.player(id)?.side;
        self.players
            .iter()
            .find(|p| p.side == side && p.id != id)
            .map(|p| p.id)
    }

    pub fn is_game_over(&self) -> bool {
        self.clock.is_game_over()
    }

    /// Take the queued presentation events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// The ball's `Held` target is the only record of who has it
    pub fn has_ball(&self, id: PlayerId) -> bool {
        self.ball.holder() == Some(id)
    }

    /// Hand the ball to `id` from any state (pickup, steal, catch, inbound)
    pub fn give_ball(&mut self, id: PlayerId) -> bool {
        let Some(player) = self.players.get(id.0) else {
            return false;
        };
        let side = player.side;
        self.ball.set_holder(id);
        self.ball.follow(player);
        self.set_possession(side);
        true
    }

    fn set_possession(&mut self, side: Side) {
        if self.possession != side {
            self.possession = side;
            log::debug!("Possession: {}", side.as_str());
            self.emit(GameEvent::PossessionChanged { side });
        }
    }

    /// Jump shot: enter the shot lock now, release toward the attacked rim
    /// after the wind-up.
    pub fn shoot(&mut self, id: PlayerId) -> bool {
        if !self.has_ball(id) {
            return false;
        }
        let Some(player) = self.players.get_mut(id.0) else {
            return false;
        };
        if !player.begin_shot() {
            return false;
        }
        let now = self.now_ms();
        self.scheduler.schedule(
            now,
            SHOT_RELEASE_DELAY_MS,
            ScheduledTask::ReleaseShot { shooter: id },
        );
        true
    }

    /// Dunk: drive to the attacked hoop and release at the rim on arrival.
    /// Turbo is spent by the caller.
    pub fn dunk(&mut self, id: PlayerId) -> bool {
        if !self.has_ball(id) {
            return false;
        }
        let Some(player) = self.players.get_mut(id.0) else {
            return false;
        };
        let hoop = self.hoops.get(player.side.attacking());
        let target = Vec2::new(
            hoop.pos.x,
            self.court.clamp_depth(hoop.pos.y + DUNK_APPROACH_OFFSET),
        );
        player.begin_dunk(target)
    }

    /// Throw to a teammate's current position
    pub fn pass(&mut self, from: PlayerId, to: PlayerId) -> bool {
        if from == to || !self.has_ball(from) {
            return false;
        }
        let (Some(passer), Some(receiver)) = (self.player(from), self.player(to)) else {
            return false;
        };
        if passer.side != receiver.side || !passer.can_act() {
            return false;
        }
        let target = receiver.pos;
        self.ball.pass_to(target, to)
    }

    /// Strip attempt against the first opposing holder in range
    pub fn steal(&mut self, thief: PlayerId) -> bool {
        if self.has_ball(thief) {
            return false;
        }
        let Some(me) = self.player(thief) else {
            return false;
        };
        let Some(victim) = self
            .ball
            .holder()
            .and_then(|id| self.player(id))
            .filter(|holder| holder.side != me.side)
        else {
            return false;
        };
        if me.pos.distance(victim.pos) >= STEAL_RANGE {
            return false;
        }

        let victim = victim.id;
        let chance = me.stats.steal as f32 / PlayerStats::MAX as f32 * STEAL_CHANCE_SCALE;
        if self.rng.random::<f32>() >= chance {
            log::debug!("Steal by {:?} failed", thief);
            return false;
        }

        self.give_ball(thief);
        log::info!("{:?} stole the ball from {:?}", thief, victim);
        self.emit(GameEvent::Steal { thief, victim });
        true
    }

    /// Knock the ball loose from its holder
    pub fn drop_ball(&mut self) -> bool {
        self.ball.drop_loose(&mut self.rng)
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        if self.paused {
            self.clock.pause();
        } else {
            self.clock.resume();
        }
    }

    pub(crate) fn on_clock_event(&mut self, event: ClockEvent) {
        match event {
            ClockEvent::ShotClockViolation => {
                log::info!("Shot clock violation ({})", self.possession.as_str());
                self.emit(GameEvent::ShotClockViolation);
            }
            ClockEvent::QuarterEnded { quarter } => {
                log::info!(
                    "End of Q{}: {} - {}",
                    quarter,
                    self.score.home,
                    self.score.away
                );
                self.emit(GameEvent::QuarterEnded { quarter });
            }
            ClockEvent::QuarterStarted { quarter } => {
                log::info!("Q{} started", quarter);
                self.emit(GameEvent::QuarterStarted { quarter });
            }
            ClockEvent::GameOver => {
                let Scoreboard { home, away } = self.score;
                log::info!("Game over: {} - {}", home, away);
                self.emit(GameEvent::GameOver { home, away });
            }
        }
    }

    /// Run every scheduled task that has come due
    pub(crate) fn run_due_tasks(&mut self) {
        let now = self.now_ms();
        while let Some(task) = self.scheduler.pop_due(now) {
            self.run_task(task);
        }
    }

    fn run_task(&mut self, task: ScheduledTask) {
        match task {
            ScheduledTask::ReleaseShot { shooter } => {
                if !self.has_ball(shooter) {
                    log::debug!("Stale shot release for {:?}", shooter);
                    return;
                }
                self.release_at_rim(shooter);
            }
            ScheduledTask::ExtinguishFire { player, generation } => {
                let Some(p) = self.players.get_mut(player.0) else {
                    return;
                };
                if p.extinguish_fire(generation) {
                    self.emit(GameEvent::FireExtinguished { player });
                } else {
                    log::debug!("Stale fire timer for {:?}", player);
                }
            }
            ScheduledTask::AiShotFollowUp { shooter } => {
                if !self.ball.is_loose() {
                    log::debug!("Shot by {:?} already recovered", shooter);
                    return;
                }
                // Inbound to the first player of the other side
                let side = self.possession.opponent();
                let receiver = self.players.iter().find(|p| p.side == side).map(|p| p.id);
                if let Some(receiver) = receiver {
                    self.give_ball(receiver);
                }
            }
        }
    }

    /// Let go of the ball toward the holder's attacked rim
    pub(crate) fn release_at_rim(&mut self, shooter: PlayerId) -> bool {
        let Some(player) = self.players.get(shooter.0) else {
            return false;
        };
        self.ball.follow(player);
        let rim = self.hoops.get(player.side.attacking()).rim;
        self.ball.release(rim)
    }

    /// AI-initiated shot: also queue the possession follow-up
    pub(crate) fn ai_shoot(&mut self, id: PlayerId) -> bool {
        if !self.shoot(id) {
            return false;
        }
        let now = self.now_ms();
        self.scheduler.schedule(
            now,
            SHOT_FOLLOW_UP_MS,
            ScheduledTask::AiShotFollowUp { shooter: id },
        );
        true
    }

    /// Re-derive the held ball from its holder
    pub(crate) fn sync_ball(&mut self) {
        if let Some(player) = self.ball.holder().and_then(|id| self.players.get(id.0)) {
            self.ball.follow(player);
        }
    }
}

/// Routes ball outcomes into the match: score, shot clock, streaks, events
pub(crate) struct MatchSink<'a> {
    pub score: &'a mut Scoreboard,
    pub clock: &'a mut MatchClock,
    pub players: &'a mut [Player],
    pub scheduler: &'a mut Scheduler,
    pub events: &'a mut Vec<GameEvent>,
    pub now_ms: u64,
    pub fire_threshold: u32,
    pub fire_duration_ms: u64,
}

impl ScoringSink for MatchSink<'_> {
    fn add_score(&mut self, side: Side, points: u8) {
        self.score.add(side, points);
        self.clock.reset_shot_clock();
        log::info!(
            "{} scores {} ({} - {})",
            side.as_str(),
            points,
            self.score.home,
            self.score.away
        );
        self.events.push(GameEvent::Scored { side, points });
    }

    fn score_effect(&mut self, _at: Vec2, shooter: Option<PlayerId>) {
        let Some(player) = shooter.and_then(|id| self.players.get_mut(id.0)) else {
            return;
        };
        if player.score_basket(self.fire_threshold) {
            log::info!("{:?} is on fire", player.id);
            self.events.push(GameEvent::OnFire { player: player.id });
            self.scheduler.schedule(
                self.now_ms,
                self.fire_duration_ms,
                ScheduledTask::ExtinguishFire {
                    player: player.id,
                    generation: player.fire_generation,
                },
            );
        }
    }

    fn miss_effect(&mut self, _at: Vec2, shooter: Option<PlayerId>) {
        self.events.push(GameEvent::Missed { shooter });
        let Some(player) = shooter.and_then(|id| self.players.get_mut(id.0)) else {
            return;
        };
        if player.miss_basket() {
            self.events.push(GameEvent::FireExtinguished { player: player.id });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::ball::BallMode;

    fn attract(seed: u64) -> MatchState {
        MatchState::new(Settings::default(), MatchMode::Attract, seed)
    }

    #[test]
    fn test_new_match_roster() {
        let state = MatchState::new(Settings::default(), MatchMode::SinglePlayer, 1);
        assert_eq!(state.players.len(), 4);
        assert_eq!(state.agents.len(), 3);
        assert_eq!(state.human(), Some(PlayerId(0)));
        assert_eq!(state.players[0].pos, Vec2::new(320.0, 400.0));
        assert_eq!(state.players[3].pos, Vec2::new(550.0, 440.0));
        assert_eq!(state.players[2].side, Side::Away);
        assert!(state.has_ball(PlayerId(0)));
        assert_eq!(state.possession, Side::Home);
        assert_eq!(state.ball.pos, Vec2::new(340.0, 400.0));

        let demo = attract(1);
        assert_eq!(demo.agents.len(), 4);
        assert_eq!(demo.human(), None);
    }

    #[test]
    fn test_roster_ratings_are_applied() {
        let fast = PlayerStats {
            speed: 10,
            ..PlayerStats::default()
        };
        let thief = PlayerStats {
            steal: 42,
            ..PlayerStats::default()
        };
        let state = MatchState::with_roster(
            Settings::default(),
            MatchMode::Attract,
            1,
            [fast, PlayerStats::default(), thief, PlayerStats::default()],
        );
        assert_eq!(state.players[0].stats.speed, 10);
        assert_eq!(state.players[1].stats, PlayerStats::default());
        // Ratings are clamped to the 0..=10 scale
        assert_eq!(state.players[2].stats.steal, PlayerStats::MAX);
    }

    #[test]
    fn test_shot_clock_violation_keeps_ball() {
        let mut state = attract(15);
        state.clock.shot_clock = 1;
        for event in state.clock.tick_second() {
            state.on_clock_event(event);
        }
        assert_eq!(state.drain_events(), vec![GameEvent::ShotClockViolation]);
        assert!(state.has_ball(PlayerId(0)));
        assert_eq!(state.possession, Side::Home);
        assert_eq!(state.clock.shot_clock, state.settings.shot_clock_secs);
    }

    #[test]
    fn test_has_ball_is_exclusive() {
        let mut state = attract(2);
        state.give_ball(PlayerId(3));
        let holders: Vec<_> = state
            .players
            .iter()
            .filter(|p| state.has_ball(p.id))
            .map(|p| p.id)
            .collect();
        assert_eq!(holders, vec![PlayerId(3)]);
        assert_eq!(state.possession, Side::Away);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::PossessionChanged { side: Side::Away }]
        );
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_actions_without_ball_decline() {
        let mut state = attract(3);
        assert!(!state.shoot(PlayerId(1)));
        assert!(!state.dunk(PlayerId(2)));
        assert!(!state.pass(PlayerId(1), PlayerId(0)));
        assert!(!state.players[1].shooting);
        assert!(state.scheduler.is_empty());
    }

    #[test]
    fn test_shoot_schedules_release() {
        let mut state = attract(4);
        assert!(state.shoot(PlayerId(0)));
        assert!(state.players[0].shooting);
        assert!(!state.shoot(PlayerId(0)));
        assert_eq!(state.scheduler.next_due(), Some(SHOT_RELEASE_DELAY_MS));

        state.elapsed_ms = SHOT_RELEASE_DELAY_MS as f64;
        state.run_due_tasks();
        assert_eq!(state.ball.mode, BallMode::InFlightShot);
        assert_eq!(state.ball.flight.target, state.hoops.far.rim);
        assert_eq!(state.ball.flight.shooter, Some(PlayerId(0)));
    }

    #[test]
    fn test_stale_release_is_ignored() {
        let mut state = attract(5);
        assert!(state.shoot(PlayerId(0)));
        // Ball changes hands before the wind-up finishes
        state.give_ball(PlayerId(2));
        state.elapsed_ms = 1000.0;
        state.run_due_tasks();
        assert!(state.has_ball(PlayerId(2)));
        assert!(state.ball.is_held());
    }

    #[test]
    fn test_pass_only_to_teammate() {
        let mut state = attract(6);
        assert!(!state.pass(PlayerId(0), PlayerId(2)));
        assert!(!state.pass(PlayerId(0), PlayerId(0)));
        assert_eq!(state.teammate_of(PlayerId(0)), Some(PlayerId(1)));
        assert!(state.pass(PlayerId(0), PlayerId(1)));
        assert_eq!(
            state.ball.mode,
            BallMode::InFlightPass {
                receiver: PlayerId(1)
            }
        );
    }

    #[test]
    fn test_steal_requires_range_and_opponent() {
        let mut state = attract(7);
        // Teammates cannot strip each other
        assert!(!state.steal(PlayerId(1)));
        // Holder already owns it
        assert!(!state.steal(PlayerId(0)));
        // Out of range: p2 is 160 away
        assert!(!state.steal(PlayerId(2)));
        assert!(state.has_ball(PlayerId(0)));
    }

    #[test]
    fn test_steal_succeeds_with_max_rating_sometimes() {
        let mut successes = 0;
        for seed in 0..200 {
            let mut state = attract(seed);
            state.players[2].pos = state.players[0].pos + Vec2::new(30.0, 0.0);
            state.players[2].stats.steal = 10;
            if state.steal(PlayerId(2)) {
                successes += 1;
                assert!(state.has_ball(PlayerId(2)));
                assert_eq!(state.possession, Side::Away);
                let events = state.drain_events();
                assert!(events.contains(&GameEvent::Steal {
                    thief: PlayerId(2),
                    victim: PlayerId(0)
                }));
            } else {
                assert!(state.has_ball(PlayerId(0)));
            }
        }
        // 40% chance at a rating of 10
        assert!(successes > 40 && successes < 130, "successes = {successes}");
    }

    #[test]
    fn test_zero_steal_rating_never_steals() {
        let mut state = attract(8);
        state.players[2].pos = state.players[0].pos + Vec2::new(10.0, 0.0);
        state.players[2].stats.steal = 0;
        for _ in 0..50 {
            assert!(!state.steal(PlayerId(2)));
        }
    }

    #[test]
    fn test_drop_ball_keeps_possession() {
        let mut state = attract(9);
        assert!(state.drop_ball());
        assert!(state.ball.is_loose());
        assert_eq!(state.possession, Side::Home);
        assert!(!state.drop_ball());
    }

    #[test]
    fn test_dunk_targets_attacked_hoop() {
        let mut state = attract(10);
        assert!(state.dunk(PlayerId(0)));
        let motion = state.players[0].dunk.expect("dunking");
        assert_eq!(motion.to, Vec2::new(400.0, 180.0));

        state.give_ball(PlayerId(2));
        assert!(state.dunk(PlayerId(2)));
        let motion = state.players[2].dunk.expect("dunking");
        // 540 + 30 clamps to the near edge
        assert_eq!(motion.to, Vec2::new(400.0, 520.0));
    }

    #[test]
    fn test_stale_fire_timer_ignored() {
        let mut state = attract(11);
        let id = PlayerId(0);
        state.players[0].consecutive_scores = 2;
        assert!(state.players[0].score_basket(3));
        let stale = state.players[0].fire_generation;
        state.players[0].miss_basket();
        state.players[0].consecutive_scores = 2;
        assert!(state.players[0].score_basket(3));

        state.run_task(ScheduledTask::ExtinguishFire {
            player: id,
            generation: stale,
        });
        assert!(state.players[0].on_fire);

        let current = state.players[0].fire_generation;
        state.run_task(ScheduledTask::ExtinguishFire {
            player: id,
            generation: current,
        });
        assert!(!state.players[0].on_fire);
        assert!(state
            .drain_events()
            .contains(&GameEvent::FireExtinguished { player: id }));
    }

    #[test]
    fn test_ai_follow_up_inbounds_loose_ball() {
        let mut state = attract(12);
        state.drop_ball();
        state.run_task(ScheduledTask::AiShotFollowUp {
            shooter: PlayerId(0),
        });
        assert!(state.has_ball(PlayerId(2)));
        assert_eq!(state.possession, Side::Away);
    }

    #[test]
    fn test_ai_follow_up_skips_recovered_ball() {
        let mut state = attract(13);
        state.run_task(ScheduledTask::AiShotFollowUp {
            shooter: PlayerId(0),
        });
        assert!(state.has_ball(PlayerId(0)));
        assert_eq!(state.possession, Side::Home);
    }

    #[test]
    fn test_sink_streak_ignites_and_schedules_extinguish() {
        let mut state = attract(14);
        let MatchState {
            score,
            clock,
            players,
            scheduler,
            events,
            ..
        } = &mut state;
        let mut sink = MatchSink {
            score,
            clock,
            players,
            scheduler,
            events,
            now_ms: 0,
            fire_threshold: 3,
            fire_duration_ms: 15_000,
        };
        for _ in 0..3 {
            sink.add_score(Side::Home, 2);
            sink.score_effect(Vec2::ZERO, Some(PlayerId(0)));
        }
        assert_eq!(state.score.home, 6);
        assert!(state.players[0].on_fire);
        assert_eq!(state.scheduler.next_due(), Some(15_000));
        assert!(state.events.contains(&GameEvent::OnFire { player: PlayerId(0) }));
    }
}
