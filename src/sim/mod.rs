//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only (owned by `MatchState`)
//! - Stable iteration order (roster order)
//! - No rendering or platform dependencies

pub mod ai;
pub mod ball;
pub mod clock;
pub mod court;
pub mod hoop;
pub mod player;
pub mod schedule;
pub mod state;
pub mod tick;

pub use ai::{AiAgent, AiContext, AiDecision, Role};
pub use ball::{Ball, BallMode, BallUpdate, Flight, ScoringSink, arc_height_at};
pub use clock::{ClockEvent, ClockPhase, MatchClock};
pub use court::Court;
pub use hoop::{BasketCheck, Hoop, HoopEnd, HoopZones, Hoops, Side, Zone};
pub use player::{Controller, DunkMotion, Player, PlayerId, PlayerStats};
pub use schedule::{ScheduledTask, Scheduler};
pub use state::{GameEvent, MatchMode, MatchState, Scoreboard};
pub use tick::{TickInput, tick};
