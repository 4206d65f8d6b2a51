//! Autonomous weapons
//!
//! Every weapon shares one contract: tick the cooldown down, and when it runs
//! out acquire the nearest adversary (area weapons skip targeting), fire, and
//! reset the cooldown to `1 / attack_speed`.
//!
//! Effective stats are `(base + Σ level bonuses) × avatar multiplier`. The
//! bonus sum is cached whenever the level changes.

use std::f32::consts::TAU;
use std::fmt;
use std::str::FromStr;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::adversary::Adversary;
use super::avatar::Stats;
use super::collision::{Hit, Kill};
use super::entity::EntityId;
use super::projectile::Projectile;
use crate::consts::MAX_WEAPON_LEVEL;
use crate::error::SimError;
use crate::{direction_to, polar_to_cartesian};

/// Per-adversary cooldown between two orb hits (seconds)
pub const ORB_HIT_COOLDOWN: f32 = 0.4;
/// Aura knockback strength; displacement per pulse is this × one 60 Hz frame
pub const AURA_KNOCKBACK: f32 = 80.0;
/// Aura knockback unlocks at this level
pub const AURA_KNOCKBACK_LEVEL: u32 = 6;
/// Visual pulse length after an aura tick (seconds)
pub const AURA_PULSE_TIME: f32 = 0.2;

/// Number of bonus rows (levels 2..=8)
pub const BONUS_ROWS: usize = MAX_WEAPON_LEVEL as usize - 1;

/// Weapon identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponId {
    MagicMissile,
    AuraField,
    SpinningOrb,
}

impl WeaponId {
    pub const ALL: [WeaponId; 3] = [
        WeaponId::MagicMissile,
        WeaponId::AuraField,
        WeaponId::SpinningOrb,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WeaponId::MagicMissile => "magic_missile",
            WeaponId::AuraField => "aura_field",
            WeaponId::SpinningOrb => "spinning_orb",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            WeaponId::MagicMissile => "Magic Missile",
            WeaponId::AuraField => "Aura Field",
            WeaponId::SpinningOrb => "Spinning Orb",
        }
    }

    /// Level 1 stats
    pub fn base_stats(&self) -> WeaponStats {
        match self {
            WeaponId::MagicMissile => WeaponStats {
                damage: 10.0,
                attack_speed: 1.0,
                projectile_speed: 450.0,
                projectile_size: 7.0,
                projectile_count: 1.0,
                ..Default::default()
            },
            WeaponId::AuraField => WeaponStats {
                damage: 8.0,
                attack_speed: 2.0,
                projectile_size: 80.0,
                ..Default::default()
            },
            WeaponId::SpinningOrb => WeaponStats {
                damage: 18.0,
                projectile_size: 12.0,
                projectile_count: 2.0,
                orbit_radius: 90.0,
                orbit_speed: 2.0,
                ..Default::default()
            },
        }
    }

    /// Bonus rows; row `i` applies once the weapon reaches level `i + 2`
    pub fn level_bonuses(&self) -> [WeaponStats; BONUS_ROWS] {
        let b = WeaponStats::default();
        match self {
            WeaponId::MagicMissile => [
                WeaponStats { damage: 5.0, ..b },
                WeaponStats { projectile_count: 1.0, ..b },
                WeaponStats { attack_speed: 0.3, ..b },
                WeaponStats { piercing: 1.0, ..b },
                WeaponStats { projectile_count: 1.0, ..b },
                WeaponStats { damage: 10.0, ..b },
                WeaponStats { projectile_count: 1.0, piercing: 1.0, ..b },
            ],
            WeaponId::AuraField => [
                WeaponStats { projectile_size: 20.0, ..b },
                WeaponStats { damage: 4.0, ..b },
                WeaponStats { projectile_size: 25.0, ..b },
                WeaponStats { damage: 6.0, ..b },
                WeaponStats { projectile_size: 30.0, ..b },
                WeaponStats { damage: 8.0, ..b },
                WeaponStats { projectile_size: 40.0, damage: 10.0, ..b },
            ],
            WeaponId::SpinningOrb => [
                WeaponStats { projectile_count: 1.0, ..b },
                WeaponStats { damage: 8.0, ..b },
                WeaponStats { projectile_count: 1.0, ..b },
                WeaponStats { orbit_radius: 25.0, ..b },
                WeaponStats { damage: 12.0, ..b },
                WeaponStats { projectile_count: 1.0, ..b },
                WeaponStats { projectile_count: 1.0, orbit_speed: 0.5, ..b },
            ],
        }
    }
}

impl fmt::Display for WeaponId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeaponId {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WeaponId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| SimError::UnknownWeapon(s.to_string()))
    }
}

/// Weapon stat block. Used for base stats, bonus rows and cached sums.
/// A zero field in a bonus row means the row does not touch that stat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WeaponStats {
    pub damage: f32,
    pub attack_speed: f32,
    pub projectile_speed: f32,
    pub projectile_size: f32,
    pub piercing: f32,
    pub projectile_count: f32,
    pub orbit_radius: f32,
    /// Revolutions per second
    pub orbit_speed: f32,
}

impl std::ops::Add for WeaponStats {
    type Output = WeaponStats;

    fn add(self, o: WeaponStats) -> WeaponStats {
        WeaponStats {
            damage: self.damage + o.damage,
            attack_speed: self.attack_speed + o.attack_speed,
            projectile_speed: self.projectile_speed + o.projectile_speed,
            projectile_size: self.projectile_size + o.projectile_size,
            piercing: self.piercing + o.piercing,
            projectile_count: self.projectile_count + o.projectile_count,
            orbit_radius: self.orbit_radius + o.orbit_radius,
            orbit_speed: self.orbit_speed + o.orbit_speed,
        }
    }
}

/// Kind-specific weapon state
#[derive(Debug, Clone, PartialEq)]
pub enum WeaponKind {
    /// Ranged auto-target
    Missile,
    /// Untargeted pulse around the avatar
    Aura { pulse_time: f32 },
    /// Bodies revolving around the avatar
    Orbit {
        angle: f32,
        /// Adversaries recently hit and the time until they can be hit again
        hit_cooldowns: Vec<(EntityId, f32)>,
    },
}

/// Everything a weapon produced during one update
#[derive(Debug, Default)]
pub struct WeaponOutput {
    pub projectiles: Vec<Projectile>,
    pub hits: Vec<Hit>,
    pub kills: Vec<Kill>,
    /// Weapons that fired, with the number of projectiles they emitted
    pub fired: Vec<(WeaponId, usize)>,
}

#[derive(Debug, Clone)]
pub struct Weapon {
    pub id: WeaponId,
    level: u32,
    pub cooldown: f32,
    base: WeaponStats,
    bonuses: [WeaponStats; BONUS_ROWS],
    /// Sum of the bonus rows unlocked at the current level
    bonus: WeaponStats,
    pub kind: WeaponKind,
}

impl Weapon {
    pub fn new(id: WeaponId) -> Self {
        let kind = match id {
            WeaponId::MagicMissile => WeaponKind::Missile,
            WeaponId::AuraField => WeaponKind::Aura { pulse_time: 0.0 },
            WeaponId::SpinningOrb => WeaponKind::Orbit {
                angle: 0.0,
                hit_cooldowns: Vec::new(),
            },
        };
        Self::with_tables(id, id.base_stats(), id.level_bonuses(), kind)
    }

    fn with_tables(
        id: WeaponId,
        base: WeaponStats,
        bonuses: [WeaponStats; BONUS_ROWS],
        kind: WeaponKind,
    ) -> Self {
        Self {
            id,
            level: 1,
            cooldown: 0.0,
            base,
            bonuses,
            bonus: WeaponStats::default(),
            kind,
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn is_max_level(&self) -> bool {
        self.level >= MAX_WEAPON_LEVEL
    }

    /// Advance one level. Past the cap this is a no-op reporting failure.
    pub fn level_up(&mut self) -> Result<u32, SimError> {
        if self.is_max_level() {
            return Err(SimError::WeaponMaxLevel);
        }
        self.level += 1;
        self.bonus = self.bonuses[..(self.level - 1) as usize]
            .iter()
            .fold(WeaponStats::default(), |acc, row| acc + *row);
        Ok(self.level)
    }

    /// Whether this weapon fires on cooldown even with no adversary around
    pub fn fires_without_target(&self) -> bool {
        matches!(self.kind, WeaponKind::Aura { .. })
    }

    // --- effective stats ---

    pub fn damage(&self, stats: &Stats) -> f32 {
        (self.base.damage + self.bonus.damage) * stats.damage
    }

    pub fn attack_speed(&self, stats: &Stats) -> f32 {
        (self.base.attack_speed + self.bonus.attack_speed) * stats.attack_speed
    }

    pub fn projectile_speed(&self, stats: &Stats) -> f32 {
        (self.base.projectile_speed + self.bonus.projectile_speed) * stats.projectile_speed
    }

    /// Projectile radius, aura radius or orb radius depending on the weapon
    pub fn projectile_size(&self, stats: &Stats) -> f32 {
        (self.base.projectile_size + self.bonus.projectile_size) * stats.projectile_size
    }

    pub fn piercing(&self) -> u32 {
        (self.base.piercing + self.bonus.piercing).max(0.0) as u32
    }

    pub fn projectile_count(&self) -> usize {
        (self.base.projectile_count + self.bonus.projectile_count).max(0.0) as usize
    }

    pub fn orbit_radius(&self) -> f32 {
        self.base.orbit_radius + self.bonus.orbit_radius
    }

    /// Angular velocity in radians per second
    pub fn orbit_speed(&self) -> f32 {
        (self.base.orbit_speed + self.bonus.orbit_speed) * TAU
    }

    fn reset_cooldown(&mut self, stats: &Stats) {
        self.cooldown = 1.0 / self.attack_speed(stats).max(f32::EPSILON);
    }

    /// Orb centers around `owner` (empty for other weapons)
    pub fn orb_positions(&self, owner: Vec2) -> Vec<Vec2> {
        let WeaponKind::Orbit { angle, .. } = &self.kind else {
            return Vec::new();
        };
        let count = self.projectile_count();
        let radius = self.orbit_radius();
        (0..count)
            .map(|i| owner + polar_to_cartesian(radius, angle + (i as f32 / count as f32) * TAU))
            .collect()
    }

    /// Advance one tick
    pub fn update(
        &mut self,
        dt: f32,
        owner: Vec2,
        stats: &Stats,
        adversaries: &mut [Adversary],
        out: &mut WeaponOutput,
    ) {
        if let WeaponKind::Orbit { .. } = self.kind {
            self.update_orbit(dt, owner, stats, adversaries, out);
            return;
        }
        if let WeaponKind::Aura { pulse_time } = &mut self.kind {
            if *pulse_time > 0.0 {
                *pulse_time -= dt;
            }
        }

        self.cooldown -= dt;
        if self.cooldown > 0.0 {
            return;
        }

        let has_target = nearest_active(owner, adversaries).is_some();
        if !has_target && !self.fires_without_target() {
            return;
        }

        let emitted = match self.kind {
            WeaponKind::Missile => self.fire_missiles(owner, stats, adversaries, out),
            WeaponKind::Aura { .. } => {
                self.pulse_aura(owner, stats, adversaries, out);
                0
            }
            WeaponKind::Orbit { .. } => 0,
        };
        out.fired.push((self.id, emitted));
        self.reset_cooldown(stats);
    }

    /// One projectile per target, cycling through the nearest adversaries
    fn fire_missiles(
        &self,
        owner: Vec2,
        stats: &Stats,
        adversaries: &[Adversary],
        out: &mut WeaponOutput,
    ) -> usize {
        let count = self.projectile_count();
        let targets = nearest_active_n(owner, adversaries, count);
        if targets.is_empty() {
            return 0;
        }

        let damage = self.damage(stats);
        let speed = self.projectile_speed(stats);
        let size = self.projectile_size(stats);
        let piercing = self.piercing();

        for i in 0..count {
            let target = targets[i % targets.len()];
            out.projectiles.push(Projectile::new(
                owner,
                direction_to(owner, target),
                speed,
                damage,
                size,
                piercing,
                self.id,
            ));
        }
        count
    }

    /// Damage everything inside the aura; knock back at high level
    fn pulse_aura(
        &mut self,
        owner: Vec2,
        stats: &Stats,
        adversaries: &mut [Adversary],
        out: &mut WeaponOutput,
    ) {
        let radius = self.projectile_size(stats);
        let damage = self.damage(stats) / self.attack_speed(stats).max(f32::EPSILON);
        let knockback = self.level >= AURA_KNOCKBACK_LEVEL;

        for adv in adversaries.iter_mut() {
            if !adv.body.active {
                continue;
            }
            if owner.distance(adv.body.pos) >= radius + adv.body.radius {
                continue;
            }
            strike(adv, damage, self.id, out);
            if knockback && adv.body.active {
                let push = direction_to(owner, adv.body.pos);
                adv.body.pos += push * AURA_KNOCKBACK * 0.016;
            }
        }

        if let WeaponKind::Aura { pulse_time } = &mut self.kind {
            *pulse_time = AURA_PULSE_TIME;
        }
    }

    fn update_orbit(
        &mut self,
        dt: f32,
        owner: Vec2,
        stats: &Stats,
        adversaries: &mut [Adversary],
        out: &mut WeaponOutput,
    ) {
        let orbit_speed = self.orbit_speed();
        if let WeaponKind::Orbit {
            angle,
            hit_cooldowns,
        } = &mut self.kind
        {
            *angle += orbit_speed * dt;
            for (_, remaining) in hit_cooldowns.iter_mut() {
                *remaining -= dt;
            }
            hit_cooldowns.retain(|(_, remaining)| *remaining > 0.0);
        }

        let orbs = self.orb_positions(owner);
        let orb_radius = self.projectile_size(stats);
        let damage = self.damage(stats);
        let id = self.id;
        let WeaponKind::Orbit { hit_cooldowns, .. } = &mut self.kind else {
            return;
        };

        for adv in adversaries.iter_mut() {
            if !adv.body.active || hit_cooldowns.iter().any(|(hit, _)| *hit == adv.id) {
                continue;
            }
            let touching = orbs
                .iter()
                .any(|orb| orb.distance(adv.body.pos) < orb_radius + adv.body.radius);
            if touching {
                hit_cooldowns.push((adv.id, ORB_HIT_COOLDOWN));
                strike(adv, damage, id, out);
            }
        }
    }
}

/// Apply weapon damage directly and record hit/kill
fn strike(adv: &mut Adversary, damage: f32, source: WeaponId, out: &mut WeaponOutput) {
    let died = adv.take_damage(damage);
    out.hits.push(Hit {
        target: adv.id,
        amount: damage,
        pos: adv.body.pos,
        source,
    });
    if died {
        out.kills.push(Kill::of(adv, source));
    }
}

/// Nearest active adversary by Euclidean distance
pub fn nearest_active(from: Vec2, adversaries: &[Adversary]) -> Option<&Adversary> {
    adversaries
        .iter()
        .filter(|a| a.body.active)
        .min_by(|a, b| {
            from.distance_squared(a.body.pos)
                .total_cmp(&from.distance_squared(b.body.pos))
        })
}

/// Positions of up to `n` distinct active adversaries, nearest first
pub fn nearest_active_n(from: Vec2, adversaries: &[Adversary], n: usize) -> Vec<Vec2> {
    let mut candidates: Vec<(f32, Vec2)> = adversaries
        .iter()
        .filter(|a| a.body.active)
        .map(|a| (from.distance_squared(a.body.pos), a.body.pos))
        .collect();
    candidates.sort_by(|a, b| a.0.total_cmp(&b.0));
    candidates.into_iter().take(n).map(|(_, pos)| pos).collect()
}
