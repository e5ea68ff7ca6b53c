//! Quarter and shot clocks
//!
//! Both clocks count whole seconds. Frame time accumulates until a full
//! second has passed, then one clock tick runs.

use serde::{Deserialize, Serialize};

use crate::consts::QUARTERS;
use crate::settings::Settings;

/// Clock phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClockPhase {
    /// Counting down
    Running,
    /// Frozen by the host; resumes to Running
    Paused,
    /// Quarter time hit zero; the next clock tick starts the next quarter
    /// (or ends the game after the last one)
    QuarterOver,
    /// Terminal
    GameOver,
}

/// Something the clock wants the match to react to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClockEvent {
    ShotClockViolation,
    QuarterEnded { quarter: u8 },
    QuarterStarted { quarter: u8 },
    GameOver,
}

/// Match clock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchClock {
    pub phase: ClockPhase,
    /// 1..=QUARTERS
    pub quarter: u8,
    /// Seconds left in the quarter
    pub quarter_time: u32,
    /// Seconds left on the shot clock
    pub shot_clock: u32,
    quarter_length: u32,
    shot_clock_length: u32,
    /// Seconds accumulated toward the next clock tick
    accumulator: f32,
}

impl MatchClock {
    pub fn new(quarter_length: u32, shot_clock_length: u32) -> Self {
        Self {
            phase: ClockPhase::Running,
            quarter: 1,
            quarter_time: quarter_length,
            shot_clock: shot_clock_length,
            quarter_length,
            shot_clock_length,
            accumulator: 0.0,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.quarter_length_secs, settings.shot_clock_secs)
    }

    pub fn is_running(&self) -> bool {
        self.phase == ClockPhase::Running
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == ClockPhase::GameOver
    }

    /// Whether play is on: false during the break after a quarter and once
    /// the game is over
    pub fn is_live(&self) -> bool {
        matches!(self.phase, ClockPhase::Running | ClockPhase::Paused)
    }

    /// Advance by frame time, running one clock tick per whole second.
    /// Paused clocks do not accumulate.
    pub fn advance(&mut self, dt: f32) -> Vec<ClockEvent> {
        let mut events = Vec::new();
        if matches!(self.phase, ClockPhase::Paused | ClockPhase::GameOver) {
            return events;
        }

        self.accumulator += dt;
        while self.accumulator >= 1.0 {
            self.accumulator -= 1.0;
            events.extend(self.tick_second());
        }
        events
    }

    /// One clock tick (one second of game time)
    pub fn tick_second(&mut self) -> Vec<ClockEvent> {
        let mut events = Vec::new();

        match self.phase {
            ClockPhase::Running => {
                self.quarter_time = self.quarter_time.saturating_sub(1);
                self.shot_clock = self.shot_clock.saturating_sub(1);

                // Violation resets the shot clock only; possession is unchanged
                if self.shot_clock == 0 {
                    self.reset_shot_clock();
                    events.push(ClockEvent::ShotClockViolation);
                }

                if self.quarter_time == 0 {
                    self.phase = ClockPhase::QuarterOver;
                    events.push(ClockEvent::QuarterEnded {
                        quarter: self.quarter,
                    });
                }
            }
            ClockPhase::QuarterOver => {
                if self.quarter >= QUARTERS {
                    self.phase = ClockPhase::GameOver;
                    self.accumulator = 0.0;
                    events.push(ClockEvent::GameOver);
                } else {
                    self.quarter += 1;
                    self.quarter_time = self.quarter_length;
                    self.reset_shot_clock();
                    self.phase = ClockPhase::Running;
                    events.push(ClockEvent::QuarterStarted {
                        quarter: self.quarter,
                    });
                }
            }
            ClockPhase::Paused | ClockPhase::GameOver => {}
        }

        events
    }

    pub fn reset_shot_clock(&mut self) {
        self.shot_clock = self.shot_clock_length;
    }

    /// Freeze decrementing. Only a running clock can pause.
    pub fn pause(&mut self) -> bool {
        if self.phase != ClockPhase::Running {
            return false;
        }
        self.phase = ClockPhase::Paused;
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.phase != ClockPhase::Paused {
            return false;
        }
        self.phase = ClockPhase::Running;
        true
    }

    /// "M:SS" for the quarter clock
    pub fn format_quarter_time(&self) -> String {
        format!("{}:{:02}", self.quarter_time / 60, self.quarter_time % 60)
    }
}
