//! Fixed timestep simulation tick
//!
//! Advances a match by one step. Ordering matters: the clock and deferred
//! tasks run before anything reads possession, and the held ball is
//! re-derived last so it never trails its holder. Once quarter time runs
//! out only the clock advances until the next quarter starts.

use glam::Vec2;

use super::ai::{AiContext, AiDecision};
use super::ball::BallUpdate;
use super::state::{GameEvent, MatchSink, MatchState};
use crate::consts::*;

/// Human input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Movement intent (clamped to unit length)
    pub movement: Vec2,
    /// Sprint; combined with shoot, dunk
    pub turbo: bool,
    pub shoot: bool,
    /// Pass to the teammate
    pub pass: bool,
    pub steal: bool,
    /// Pause toggle
    pub pause: bool,
}

/// Advance the match by one fixed timestep
pub fn tick(state: &mut MatchState, input: &TickInput, dt: f32) {
    if input.pause {
        state.toggle_pause();
    }
    if state.paused || state.is_game_over() {
        return;
    }

    state.time_ticks += 1;
    state.elapsed_ms += dt as f64 * 1000.0;

    for event in state.clock.advance(dt) {
        state.on_clock_event(event);
    }
    // Nothing moves or scores between the buzzer and the next quarter
    if !state.clock.is_live() {
        return;
    }

    state.run_due_tasks();
    apply_human_input(state, input);
    update_ball(state, dt);
    update_ai(state, dt);
    update_players(state, dt);
    state.sync_ball();
}

fn apply_human_input(state: &mut MatchState, input: &TickInput) {
    let Some(id) = state.human() else {
        return;
    };
    let sprint_cost = state.settings.turbo_depletion_rate * TURBO_DRAIN_FRAME;
    let dunk_cost = state.settings.dunk_turbo_cost;

    let mut direction = input.movement.clamp_length_max(1.0);
    let player = &mut state.players[id.0];
    if input.turbo && direction != Vec2::ZERO && player.use_turbo(sprint_cost) {
        direction *= TURBO_SPEED_MULTIPLIER;
    }
    player.move_intent(direction);

    if input.shoot && state.has_ball(id) && state.players[id.0].can_act() {
        if input.turbo && state.players[id.0].use_turbo(dunk_cost) {
            state.dunk(id);
        } else {
            state.shoot(id);
        }
    }

    if input.pass {
        if let Some(mate) = state.teammate_of(id) {
            state.pass(id, mate);
        }
    }

    if input.steal {
        state.steal(id);
    }

    if state.ball.is_loose() && state.players[id.0].pos.distance(state.ball.pos) < PICKUP_RANGE {
        state.give_ball(id);
    }
}

fn update_ball(state: &mut MatchState, dt: f32) {
    let now_ms = state.now_ms();
    let fire_threshold = state.settings.on_fire_threshold;
    let fire_duration_ms = (state.settings.on_fire_duration_secs * 1000.0) as u64;

    let MatchState {
        ball,
        court,
        hoops,
        rng,
        score,
        clock,
        players,
        scheduler,
        events,
        ..
    } = state;
    let mut sink = MatchSink {
        score,
        clock,
        players,
        scheduler,
        events,
        now_ms,
        fire_threshold,
        fire_duration_ms,
    };

    if let BallUpdate::PassArrived { receiver } = ball.update(dt, court, hoops, rng, &mut sink) {
        // Caught wherever the receiver is now
        if state.give_ball(receiver) {
            state.emit(GameEvent::PassCompleted { receiver });
        }
    }
}

fn update_ai(state: &mut MatchState, dt: f32) {
    let dt_ms = dt * 1000.0;
    let mut agents = std::mem::take(&mut state.agents);

    for agent in agents.iter_mut() {
        let id = agent.player;
        let Some(side) = state.player(id).map(|p| p.side) else {
            continue;
        };
        // Live possession: an earlier agent may have just picked up the ball
        agent.update_role(side, state.possession);

        if agent.tick_timer(dt_ms, &mut state.rng) {
            let ctx = AiContext {
                court: &state.court,
                hoops: &state.hoops,
                ball: &state.ball,
                players: &state.players,
            };
            let decision = agent.decide(&state.players[id.0], &ctx, &mut state.rng);
            if decision == AiDecision::Shoot {
                state.ai_shoot(id);
            }
        }

        let me = &state.players[id.0];
        let direction = agent.steer(me);
        let pick_up = agent.can_pick_up(me, &state.ball);
        state.players[id.0].move_intent(direction);
        if pick_up {
            state.give_ball(id);
        }
    }

    state.agents = agents;
}

fn update_players(state: &mut MatchState, dt: f32) {
    let dt_ms = dt * 1000.0;
    let regen = state.settings.turbo_regen_rate;
    let mut dunks_done = Vec::new();

    for player in state.players.iter_mut() {
        player.regen_turbo(regen);
        player.integrate(dt, &state.court);
        if player.advance_dunk(dt_ms) {
            dunks_done.push(player.id);
        }
        player.update_jump();
    }

    for id in dunks_done {
        if state.has_ball(id) {
            state.release_at_rim(id);
        }
    }
}
