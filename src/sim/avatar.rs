//! The player-controlled avatar

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Body, Simulated};
use super::weapon::{Weapon, WeaponId};
use crate::consts::*;

/// Upgradeable stat record. Multipliers start at 1.0, flat values at 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub max_health: f32,
    pub damage: f32,
    pub speed: f32,
    pub attack_speed: f32,
    pub projectile_speed: f32,
    pub projectile_size: f32,
    pub pickup_radius: f32,
    pub xp_gain: f32,
    /// Flat reduction applied to every incoming hit
    pub armor: f32,
    /// Health regenerated per second
    pub regen: f32,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            max_health: 1.0,
            damage: 1.0,
            speed: 1.0,
            attack_speed: 1.0,
            projectile_speed: 1.0,
            projectile_size: 1.0,
            pickup_radius: 1.0,
            xp_gain: 1.0,
            armor: 0.0,
            regen: 0.0,
        }
    }
}

/// Result of a contact hit on the avatar
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitOutcome {
    /// Invincible (or already dead): nothing changed
    Ignored,
    /// Took this much damage and survived
    Hurt(f32),
    /// Took this much damage and died
    Died(f32),
}

/// XP needed to advance from `level` to `level + 1`
pub fn xp_threshold(level: u32) -> u32 {
    let growth = (XP_GROWTH as f64).powi(level.saturating_sub(1) as i32);
    (XP_BASE_THRESHOLD as f64 * growth).floor() as u32
}

#[derive(Debug, Clone)]
pub struct Avatar {
    pub body: Body,
    pub health: f32,
    /// Base max health before the stat multiplier
    pub max_health: f32,
    /// Base movement speed before the stat multiplier
    pub speed: f32,
    pub stats: Stats,
    pub xp: u32,
    pub level: u32,
    pub xp_to_next_level: u32,
    /// Seconds of damage immunity remaining
    pub invincibility: f32,
    /// Seconds of hit flash remaining (presentation only)
    pub flash: f32,
    /// Base magnet radius for pickups
    pub pickup_radius: f32,
    pub weapons: Vec<Weapon>,
}

impl Avatar {
    pub fn new(pos: Vec2) -> Self {
        Self {
            body: Body::new(pos, AVATAR_RADIUS),
            health: AVATAR_MAX_HEALTH,
            max_health: AVATAR_MAX_HEALTH,
            speed: AVATAR_SPEED,
            stats: Stats::default(),
            xp: 0,
            level: 1,
            xp_to_next_level: xp_threshold(1),
            invincibility: 0.0,
            flash: 0.0,
            pickup_radius: MAGNET_RADIUS,
            weapons: Vec::new(),
        }
    }

    #[inline]
    pub fn pos(&self) -> Vec2 {
        self.body.pos
    }

    pub fn effective_speed(&self) -> f32 {
        self.speed * self.stats.speed
    }

    pub fn effective_max_health(&self) -> f32 {
        (self.max_health * self.stats.max_health).floor()
    }

    pub fn effective_pickup_radius(&self) -> f32 {
        self.pickup_radius * self.stats.pickup_radius
    }

    /// Radius inside which a pickup is collected on contact
    pub fn collect_radius(&self) -> f32 {
        self.body.radius + COLLECT_MARGIN
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    pub fn weapon(&self, id: WeaponId) -> Option<&Weapon> {
        self.weapons.iter().find(|w| w.id == id)
    }

    pub fn weapon_mut(&mut self, id: WeaponId) -> Option<&mut Weapon> {
        self.weapons.iter_mut().find(|w| w.id == id)
    }

    /// Apply contact damage. Gated entirely by the invincibility timer.
    pub fn take_damage(&mut self, amount: f32) -> HitOutcome {
        if self.invincibility > 0.0 || self.is_dead() {
            return HitOutcome::Ignored;
        }

        let reduced = (amount - self.stats.armor).max(1.0);
        self.health -= reduced;
        self.invincibility = AVATAR_INVINCIBILITY;
        self.flash = HIT_FLASH;

        if self.health <= 0.0 {
            self.health = 0.0;
            HitOutcome::Died(reduced)
        } else {
            HitOutcome::Hurt(reduced)
        }
    }

    pub fn heal(&mut self, amount: f32) {
        self.health = (self.health + amount).min(self.effective_max_health());
    }

    /// Grant XP scaled by the xp-gain multiplier (floored).
    ///
    /// Returns `(xp actually gained, levels gained)`. Every threshold the gain
    /// crosses counts as a separate level.
    pub fn gain_xp(&mut self, amount: u32) -> (u32, u32) {
        let adjusted = (amount as f32 * self.stats.xp_gain).floor().max(0.0) as u32;
        self.xp += adjusted;

        let mut levels = 0;
        while self.xp >= self.xp_to_next_level {
            self.xp -= self.xp_to_next_level;
            self.level += 1;
            self.xp_to_next_level = xp_threshold(self.level);
            levels += 1;
        }
        (adjusted, levels)
    }

    /// Movement from input, timer decay, regeneration, integration
    pub fn update(&mut self, dt: f32, input: Vec2) {
        self.body.vel = input.normalize_or_zero() * self.effective_speed();

        if self.invincibility > 0.0 {
            self.invincibility -= dt;
        }
        if self.flash > 0.0 {
            self.flash -= dt;
        }
        if self.stats.regen > 0.0 {
            self.heal(self.stats.regen * dt);
        }

        self.body.integrate(dt);
    }
}

impl Simulated for Avatar {
    fn body(&self) -> &Body {
        &self.body
    }
    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}
