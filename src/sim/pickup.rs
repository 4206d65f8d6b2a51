//! Experience pickups dropped by defeated adversaries

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::entity::{Body, EntityId, Simulated};
use crate::consts::*;
use crate::{direction_to, from_angle};

#[derive(Debug, Clone)]
pub struct Pickup {
    pub id: EntityId,
    pub body: Body,
    pub value: u32,
    /// Once set the pickup homes in on the avatar until collected
    pub attracted: bool,
    pub attract_speed: f32,
    /// Short burst outward on drop, decays each update
    pub scatter_vel: Vec2,
    pub scatter_time: f32,
}

impl Pickup {
    pub fn new<R: Rng + ?Sized>(id: EntityId, pos: Vec2, value: u32, rng: &mut R) -> Self {
        let radius = 5.0 + (value as f32 * 2.0).min(8.0);
        let angle = rng.random_range(0.0..TAU);
        let magnitude = rng.random_range(80.0..120.0);
        Self {
            id,
            body: Body::new(pos, radius),
            value,
            attracted: false,
            attract_speed: PICKUP_ATTRACT_SPEED,
            scatter_vel: from_angle(angle) * magnitude,
            scatter_time: PICKUP_SCATTER_TIME,
        }
    }

    /// Scatter, then magnetic attraction toward the avatar
    pub fn update(&mut self, dt: f32, target: Vec2, magnet_radius: f32) {
        if self.scatter_time > 0.0 {
            self.scatter_time -= dt;
            self.body.pos += self.scatter_vel * dt;
            self.scatter_vel *= PICKUP_SCATTER_DAMPING;
            return;
        }

        if self.body.pos.distance(target) < magnet_radius {
            self.attracted = true;
        }

        if self.attracted {
            self.body.vel = direction_to(self.body.pos, target) * self.attract_speed;
            self.attract_speed += PICKUP_ATTRACT_ACCEL * dt;
        } else {
            self.body.vel = Vec2::ZERO;
        }
        self.body.integrate(dt);
    }
}

impl Simulated for Pickup {
    fn body(&self) -> &Body {
        &self.body
    }
    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn settled(pos: Vec2) -> Pickup {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut p = Pickup::new(1, pos, 1, &mut rng);
        p.scatter_time = 0.0;
        p
    }

    #[test]
    fn test_radius_grows_with_value() {
        let mut rng = Pcg32::seed_from_u64(3);
        assert_eq!(Pickup::new(1, Vec2::ZERO, 1, &mut rng).body.radius, 7.0);
        assert_eq!(Pickup::new(2, Vec2::ZERO, 10, &mut rng).body.radius, 13.0);
    }

    #[test]
    fn test_scatter_moves_then_stops() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut p = Pickup::new(1, Vec2::ZERO, 1, &mut rng);
        let speed = p.scatter_vel.length();
        assert!((80.0..120.0).contains(&speed));
        p.update(0.1, Vec2::new(1000.0, 0.0), 60.0);
        assert!(p.body.pos.length() > 0.0);
        assert!(p.scatter_vel.length() < speed);

        for _ in 0..5 {
            p.update(0.1, Vec2::new(1000.0, 0.0), 60.0);
        }
        let rest = p.body.pos;
        p.update(0.1, Vec2::new(1000.0, 0.0), 60.0);
        assert_eq!(p.body.pos, rest);
        assert!(!p.attracted);
    }

    #[test]
    fn test_attraction_accelerates() {
        let mut p = settled(Vec2::new(50.0, 0.0));
        p.update(0.01, Vec2::ZERO, 60.0);
        assert!(p.attracted);
        assert!(p.body.vel.x < 0.0);
        let first = p.attract_speed;
        p.update(0.01, Vec2::ZERO, 60.0);
        assert!(p.attract_speed > first);
    }

    #[test]
    fn test_attraction_latches_outside_radius() {
        let mut p = settled(Vec2::new(50.0, 0.0));
        p.update(0.001, Vec2::ZERO, 60.0);
        assert!(p.attracted);
        p.update(0.001, Vec2::new(500.0, 0.0), 60.0);
        assert!(p.attracted);
        assert!(p.body.vel.x > 0.0);
    }
}
