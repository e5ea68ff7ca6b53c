//! Perspective court geometry
//!
//! The playable floor is a trapezoid parameterized by depth:
//! - near edge (largest depth): full width, visual scale 1.0
//! - far edge (smallest depth): width and scale shrink by the perspective factor
//!
//! Half-width interpolates linearly between the two edges around a fixed
//! horizontal center.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::lerp;
use crate::settings::CourtSettings;

/// The playable trapezoid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Court {
    /// Fixed horizontal center line
    pub center_x: f32,
    pub near_depth: f32,
    pub far_depth: f32,
    pub near_half_width: f32,
    pub far_half_width: f32,
    /// Visual scale at the far edge (near edge is 1.0)
    pub far_scale: f32,
}

impl Default for Court {
    fn default() -> Self {
        Self::from_settings(&CourtSettings::default())
    }
}

impl Court {
    pub fn from_settings(settings: &CourtSettings) -> Self {
        let near_half_width = (settings.near_right - settings.near_left) / 2.0;
        Self {
            center_x: settings.center_x(),
            near_depth: settings.near_depth,
            far_depth: settings.far_depth,
            near_half_width,
            far_half_width: near_half_width * settings.perspective_scale,
            far_scale: settings.perspective_scale,
        }
    }

    /// Interpolation factor: 0 at the far edge, 1 at the near edge.
    /// Not clamped; callers clamp depth first when they need to.
    #[inline]
    pub fn depth_factor(&self, depth: f32) -> f32 {
        (depth - self.far_depth) / (self.near_depth - self.far_depth)
    }

    /// Total near-to-far extent
    #[inline]
    pub fn depth_span(&self) -> f32 {
        self.near_depth - self.far_depth
    }

    /// Depth halfway between the two edges
    #[inline]
    pub fn mid_depth(&self) -> f32 {
        self.far_depth + self.depth_span() / 2.0
    }

    /// Center court
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.center_x, self.mid_depth())
    }

    pub fn half_width_at(&self, depth: f32) -> f32 {
        lerp(self.far_half_width, self.near_half_width, self.depth_factor(depth))
    }

    pub fn left_bound(&self, depth: f32) -> f32 {
        self.center_x - self.half_width_at(depth)
    }

    pub fn right_bound(&self, depth: f32) -> f32 {
        self.center_x + self.half_width_at(depth)
    }

    /// (left, right) horizontal bounds at a depth
    pub fn bounds_at(&self, depth: f32) -> (f32, f32) {
        (self.left_bound(depth), self.right_bound(depth))
    }

    pub fn clamp_depth(&self, depth: f32) -> f32 {
        depth.clamp(self.far_depth, self.near_depth)
    }

    /// "Closer looks bigger": far scale at the far edge, 1.0 at the near edge
    pub fn visual_scale(&self, depth: f32) -> f32 {
        self.far_scale + (1.0 - self.far_scale) * self.depth_factor(depth)
    }

    /// Draw order for an entity at `depth`, lifted by its height above the floor
    #[inline]
    pub fn draw_depth(&self, base: f32, depth: f32, height: f32) -> f32 {
        base + depth + height
    }

    /// Check if a floor point lies inside the trapezoid
    pub fn contains(&self, point: Vec2) -> bool {
        if point.y < self.far_depth || point.y > self.near_depth {
            return false;
        }
        let (left, right) = self.bounds_at(point.y);
        point.x >= left && point.x <= right
    }
}
