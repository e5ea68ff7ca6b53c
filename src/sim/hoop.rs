//! Hoops and basket detection
//!
//! Two fixed targets. Home (team 0) attacks the far hoop, Away (team 1)
//! attacks the near hoop. A finished shot is tested against rectangular
//! detection zones when they are configured, otherwise against a fixed
//! distance tolerance around each rim.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::court::Court;
use crate::settings::{HoopSettings, Settings, ZoneSettings};

/// Half-size of the square used by distance-tolerance detection
pub const LEGACY_TOLERANCE: f32 = 40.0;
/// Shots from farther than this fraction of court depth score 3
pub const THREE_POINT_DEPTH_FRACTION: f32 = 0.4;

/// Team side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Team 0
    Home,
    /// Team 1
    Away,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }

    /// The hoop this side shoots at
    pub fn attacking(self) -> HoopEnd {
        match self {
            Side::Home => HoopEnd::Far,
            Side::Away => HoopEnd::Near,
        }
    }

    /// The hoop this side protects
    pub fn defending(self) -> HoopEnd {
        self.attacking().other()
    }

    /// Sign of "forward" along depth (Home attacks toward smaller depth)
    pub fn depth_direction(self) -> f32 {
        match self {
            Side::Home => -1.0,
            Side::Away => 1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Home => "home",
            Side::Away => "away",
        }
    }
}

/// Which end of the court a hoop sits at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HoopEnd {
    Near,
    Far,
}

impl HoopEnd {
    pub fn other(self) -> HoopEnd {
        match self {
            HoopEnd::Near => HoopEnd::Far,
            HoopEnd::Far => HoopEnd::Near,
        }
    }

    /// The side credited for a basket through this hoop
    pub fn attacked_by(self) -> Side {
        match self {
            HoopEnd::Far => Side::Home,
            HoopEnd::Near => Side::Away,
        }
    }
}

/// Axis-aligned rectangle on the court floor (x, depth)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub min: Vec2,
    pub max: Vec2,
}

impl Zone {
    pub fn new(x: f32, depth: f32, width: f32, height: f32) -> Self {
        Self {
            min: Vec2::new(x, depth),
            max: Vec2::new(x + width, depth + height),
        }
    }

    pub fn from_settings(settings: &ZoneSettings) -> Self {
        Self::new(settings.x, settings.depth, settings.width, settings.height)
    }

    /// Edges are inclusive; a degenerate zone contains nothing
    pub fn contains(&self, point: Vec2) -> bool {
        if self.max.x <= self.min.x || self.max.y <= self.min.y {
            return false;
        }
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }
}

/// A single hoop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hoop {
    /// Base position (x, depth)
    pub pos: Vec2,
    /// Where shot arcs terminate
    pub rim: Vec2,
    /// Presentation scale
    pub scale: f32,
}

impl Hoop {
    pub fn from_settings(settings: &HoopSettings) -> Self {
        Self {
            pos: Vec2::new(settings.x, settings.depth),
            rim: Vec2::new(settings.x, settings.rim_depth),
            scale: settings.scale,
        }
    }
}

/// Detection zones for both hoops
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoopZones {
    pub near: Zone,
    pub far: Zone,
}

impl HoopZones {
    pub fn get(&self, end: HoopEnd) -> &Zone {
        match end {
            HoopEnd::Near => &self.near,
            HoopEnd::Far => &self.far,
        }
    }
}

/// Result of testing a finished shot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BasketCheck {
    /// Went through `hoop`; credit `hoop.attacked_by()`
    Made { hoop: HoopEnd },
    Missed,
}

impl BasketCheck {
    pub fn scoring_side(&self) -> Option<Side> {
        match self {
            BasketCheck::Made { hoop } => Some(hoop.attacked_by()),
            BasketCheck::Missed => None,
        }
    }
}

/// Both hoops plus the optional zone configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hoops {
    pub near: Hoop,
    pub far: Hoop,
    pub zones: Option<HoopZones>,
}

impl Default for Hoops {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl Hoops {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            near: Hoop::from_settings(&settings.near_hoop),
            far: Hoop::from_settings(&settings.far_hoop),
            zones: settings.hoop_zones.as_ref().map(|zones| HoopZones {
                near: Zone::from_settings(&zones.near),
                far: Zone::from_settings(&zones.far),
            }),
        }
    }

    pub fn get(&self, end: HoopEnd) -> &Hoop {
        match end {
            HoopEnd::Near => &self.near,
            HoopEnd::Far => &self.far,
        }
    }

    /// The hoop a flight ending at `depth` was aimed at
    pub fn end_for_depth(&self, court: &Court, depth: f32) -> HoopEnd {
        if depth < court.mid_depth() {
            HoopEnd::Far
        } else {
            HoopEnd::Near
        }
    }

    /// Test where a shot came down. Zones take precedence whenever they are
    /// configured; the distance tolerance is only the fallback.
    ///
    /// `aimed_at` breaks ties when a point lies in both hoops' regions.
    pub fn detect(&self, point: Vec2, aimed_at: HoopEnd) -> BasketCheck {
        match &self.zones {
            Some(zones) => Self::first_hit(aimed_at, |end| zones.get(end).contains(point)),
            None => Self::first_hit(aimed_at, |end| self.within_tolerance(end, point)),
        }
    }

    /// Square of half-size `LEGACY_TOLERANCE` centered on the rim point, not
    /// on the hoop base: the near rim sits 60 units in front of its base, so
    /// a base-centered square would never contain a finished shot.
    fn within_tolerance(&self, end: HoopEnd, point: Vec2) -> bool {
        let rim = self.get(end).rim;
        (point.x - rim.x).abs() < LEGACY_TOLERANCE && (point.y - rim.y).abs() < LEGACY_TOLERANCE
    }

    fn first_hit(aimed_at: HoopEnd, hit: impl Fn(HoopEnd) -> bool) -> BasketCheck {
        for end in [aimed_at, aimed_at.other()] {
            if hit(end) {
                return BasketCheck::Made { hoop: end };
            }
        }
        BasketCheck::Missed
    }

    /// 3 points when the shot started farther than 40% of the court depth
    /// from the target hoop, else 2. Exactly 40% scores 2.
    pub fn points_for_shot(&self, court: &Court, start_depth: f32, target_depth: f32) -> u8 {
        let hoop = self.get(self.end_for_depth(court, target_depth));
        let distance = (start_depth - hoop.pos.y).abs();
        if distance > court.depth_span() * THREE_POINT_DEPTH_FRACTION {
            3
        } else {
            2
        }
    }
}
