//! Hangtime entry point
//!
//! Runs a headless attract-mode match at the fixed timestep and logs what
//! happens. Usage: `hangtime [settings.toml|settings.json] [seed]`

use std::process::ExitCode;

use hangtime::Settings;
use hangtime::consts::*;
use hangtime::sim::{GameEvent, MatchMode, MatchState, TickInput, tick};

/// Host frame length the runner pretends to render at
const FRAME_DT: f32 = 1.0 / 60.0;

/// Fixed-step driver: frame time in, whole simulation ticks out
struct Runner {
    state: MatchState,
    accumulator: f32,
    input: TickInput,
}

impl Runner {
    fn new(state: MatchState) -> Self {
        Self {
            state,
            accumulator: 0.0,
            input: TickInput::default(),
        }
    }

    /// Run simulation ticks
    fn update(&mut self, dt: f32) {
        let dt = dt.min(0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(&mut self.state, &self.input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // One-shot inputs
            self.input.pause = false;
        }

        for event in self.state.drain_events() {
            log_event(&event);
        }
    }
}

fn log_event(event: &GameEvent) {
    match event {
        GameEvent::Scored { .. } | GameEvent::GameOver { .. } => log::debug!("{:?}", event),
        GameEvent::OnFire { player } => log::info!("{:?} heating up", player),
        GameEvent::Steal { thief, victim } => log::info!("{:?} picked {:?}'s pocket", thief, victim),
        _ => log::trace!("{:?}", event),
    }
}

fn parse_args() -> Result<(Settings, u64), String> {
    let mut args = std::env::args().skip(1);

    let settings = match args.next() {
        Some(path) => Settings::from_path(&path).map_err(|e| format!("{}: {}", path, e))?,
        None => Settings::load(),
    };
    let seed = match args.next() {
        Some(raw) => raw
            .parse::<u64>()
            .map_err(|e| format!("invalid seed {:?}: {}", raw, e))?,
        None => 0x4841_4e47,
    };

    Ok((settings, seed))
}

fn main() -> ExitCode {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();
    log::info!("Hangtime (headless attract) starting...");

    let (settings, seed) = match parse_args() {
        Ok(parsed) => parsed,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("usage: hangtime [settings.toml|settings.json] [seed]");
            return ExitCode::FAILURE;
        }
    };

    let mut runner = Runner::new(MatchState::new(settings, MatchMode::Attract, seed));
    while !runner.state.is_game_over() {
        runner.update(FRAME_DT);
    }

    let state = &runner.state;
    println!(
        "Final: home {} - away {} ({} ticks, seed {})",
        state.score.home, state.score.away, state.time_ticks, state.seed
    );
    ExitCode::SUCCESS
}
