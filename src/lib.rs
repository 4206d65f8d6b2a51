//! Horde Survival - simulation core for an arena-survival game
//!
//! Core modules:
//! - `sim`: Simulation (entities, weapons, spawning, collisions, upgrades)
//! - `settings`: Data-driven tables loaded once at construction
//! - `error`: Failures reported by rejected commands and bad configuration
//!
//! Rendering, audio, input polling and the frame loop live outside this crate.
//! They drive [`sim::World::tick`] and read [`sim::World::snapshot`] /
//! [`sim::World::drain_events`].

pub mod error;
pub mod settings;
pub mod sim;

pub use error::SimError;
pub use settings::Settings;
pub use sim::{TickInput, World};

use glam::Vec2;

/// Simulation configuration constants
pub mod consts {
    /// Largest step a single tick may take (seconds); longer frames are clamped
    pub const MAX_DT: f32 = 0.1;

    /// Avatar defaults
    pub const AVATAR_RADIUS: f32 = 18.0;
    pub const AVATAR_MAX_HEALTH: f32 = 100.0;
    pub const AVATAR_SPEED: f32 = 200.0;
    /// Invincibility window after taking a hit (seconds)
    pub const AVATAR_INVINCIBILITY: f32 = 0.5;
    /// Duration of the white hit flash (seconds)
    pub const HIT_FLASH: f32 = 0.1;
    /// Radius inside which pickups start homing in
    pub const MAGNET_RADIUS: f32 = 60.0;
    /// Collection radius is the avatar radius plus this margin
    pub const COLLECT_MARGIN: f32 = 5.0;

    /// XP curve: threshold(level) = floor(BASE * GROWTH^(level - 1))
    pub const XP_BASE_THRESHOLD: u32 = 10;
    pub const XP_GROWTH: f32 = 1.15;

    /// Projectile defaults
    pub const PROJECTILE_LIFETIME: f32 = 3.0;

    /// Pickup attraction and scatter
    pub const PICKUP_ATTRACT_SPEED: f32 = 400.0;
    pub const PICKUP_ATTRACT_ACCEL: f32 = 800.0;
    pub const PICKUP_SCATTER_TIME: f32 = 0.25;
    pub const PICKUP_SCATTER_DAMPING: f32 = 0.92;

    /// Weapon level cap
    pub const MAX_WEAPON_LEVEL: u32 = 8;

    /// Number of upgrade offers presented per level-up
    pub const OFFER_COUNT: usize = 3;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Unit vector pointing along `theta`
#[inline]
pub fn from_angle(theta: f32) -> Vec2 {
    polar_to_cartesian(1.0, theta)
}

/// Angle of a vector in radians (atan2); zero vector gives 0
#[inline]
pub fn angle_of(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}

/// Unit vector from `from` toward `to`, or zero when the points coincide
#[inline]
pub fn direction_to(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_direction_to_same_point_is_zero() {
        let p = Vec2::new(3.0, -4.0);
        assert_eq!(direction_to(p, p), Vec2::ZERO);
        assert_eq!(Vec2::ZERO.normalize_or_zero(), Vec2::ZERO);
    }

    #[test]
    fn test_from_angle_and_back() {
        let v = from_angle(FRAC_PI_2);
        assert!(v.x.abs() < 1e-6);
        assert!((v.y - 1.0).abs() < 1e-6);
        assert!((angle_of(v) - FRAC_PI_2).abs() < 1e-6);
        assert_eq!(angle_of(Vec2::ZERO), 0.0);
    }

    #[test]
    fn test_normalize_angle_wraps() {
        assert!((normalize_angle(5.0 * FRAC_PI_2) - FRAC_PI_2).abs() < 1e-5);
        assert!((normalize_angle(-3.0 * PI / 2.0) - FRAC_PI_2).abs() < 1e-5);
    }

    proptest! {
        #[test]
        fn direction_to_is_unit_or_zero(
            ax in -1000.0f32..1000.0, ay in -1000.0f32..1000.0,
            bx in -1000.0f32..1000.0, by in -1000.0f32..1000.0,
        ) {
            let d = direction_to(Vec2::new(ax, ay), Vec2::new(bx, by));
            let len = d.length();
            prop_assert!(len == 0.0 || (len - 1.0).abs() < 1e-3);
        }

        #[test]
        fn normalize_angle_in_range(theta in -100.0f32..100.0) {
            let n = normalize_angle(theta);
            prop_assert!(n >= -PI - 1e-4 && n < PI + 1e-4);
        }
    }
}
