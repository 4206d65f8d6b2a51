//! Projectiles fired by ranged weapons

use glam::Vec2;

use super::entity::{Body, EntityId, HIT_SET_CAPACITY, HitSet, Simulated};
use super::weapon::WeaponId;
use crate::consts::PROJECTILE_LIFETIME;

#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: EntityId,
    pub body: Body,
    pub damage: f32,
    pub speed: f32,
    pub lifetime: f32,
    pub elapsed: f32,
    /// Extra adversaries this projectile may damage after its first hit
    pub piercing: u32,
    pub hit_count: u32,
    pub hits: HitSet,
    /// Weapon that fired this projectile
    pub source: WeaponId,
}

impl Projectile {
    /// Create a projectile heading along `direction` (normalized here).
    ///
    /// The id is assigned by the world when the projectile is added.
    pub fn new(
        pos: Vec2,
        direction: Vec2,
        speed: f32,
        damage: f32,
        radius: f32,
        piercing: u32,
        source: WeaponId,
    ) -> Self {
        let mut body = Body::new(pos, radius);
        body.vel = direction.normalize_or_zero() * speed;
        Self {
            id: 0,
            body,
            damage,
            speed,
            lifetime: PROJECTILE_LIFETIME,
            elapsed: 0.0,
            // The hit set must be able to hold every hit before expiry
            piercing: piercing.min(HIT_SET_CAPACITY as u32 - 1),
            hit_count: 0,
            hits: HitSet::default(),
            source,
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.elapsed += dt;
        if self.elapsed >= self.lifetime {
            self.deactivate();
            return;
        }
        self.body.integrate(dt);
    }

    /// Register contact with an adversary.
    ///
    /// Returns true if damage should be applied (first contact with this
    /// adversary). Deactivates once the hit count exceeds the piercing budget.
    pub fn on_hit(&mut self, target: EntityId) -> bool {
        if !self.hits.insert(target) {
            return false;
        }
        self.hit_count += 1;
        if self.hit_count > self.piercing {
            self.deactivate();
        }
        true
    }
}

impl Simulated for Projectile {
    fn body(&self) -> &Body {
        &self.body
    }
    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}
