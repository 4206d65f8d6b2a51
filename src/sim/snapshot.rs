//! Read-only views for rendering and UI collaborators
//!
//! Everything is copied out of the world so the caller can hold a snapshot
//! across ticks.

use glam::Vec2;
use serde::Serialize;

use super::adversary::ChargePhase;
use super::avatar::Stats;
use super::difficulty::Coefficients;
use super::entity::EntityId;
use super::state::{GamePhase, RunStats, World};
use super::upgrade::Offer;
use super::weapon::{WeaponId, WeaponKind};

#[derive(Debug, Clone, Serialize)]
pub struct WeaponView {
    pub id: WeaponId,
    pub level: u32,
    pub cooldown: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct AvatarView {
    pub pos: Vec2,
    pub radius: f32,
    pub health: f32,
    pub max_health: f32,
    pub level: u32,
    pub xp: u32,
    pub xp_to_next_level: u32,
    pub invincible: bool,
    pub flash: bool,
    pub pickup_radius: f32,
    pub stats: Stats,
    pub weapons: Vec<WeaponView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdversaryView {
    pub id: EntityId,
    pub kind: String,
    pub pos: Vec2,
    pub radius: f32,
    pub health_fraction: f32,
    pub flash: bool,
    /// Set for chargers, so the renderer can telegraph the wind-up
    pub charge_phase: Option<ChargePhase>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectileView {
    pub id: EntityId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct PickupView {
    pub id: EntityId,
    pub pos: Vec2,
    pub radius: f32,
    pub value: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuraView {
    pub radius: f32,
    /// Seconds left on the pulse highlight
    pub pulse: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrbView {
    pub pos: Vec2,
    pub radius: f32,
}

/// Copy of everything a frame needs to draw
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub elapsed: f32,
    pub coefficients: Coefficients,
    pub stats: RunStats,
    pub avatar: AvatarView,
    pub adversaries: Vec<AdversaryView>,
    pub projectiles: Vec<ProjectileView>,
    pub pickups: Vec<PickupView>,
    pub auras: Vec<AuraView>,
    pub orbs: Vec<OrbView>,
    pub offers: Vec<Offer>,
}

impl World {
    pub fn snapshot(&self) -> Snapshot {
        let avatar = &self.avatar;
        let stats = &avatar.stats;
        let center = avatar.pos();

        let mut auras = Vec::new();
        let mut orbs = Vec::new();
        for weapon in &avatar.weapons {
            match &weapon.kind {
                WeaponKind::Aura { pulse_time } => auras.push(AuraView {
                    radius: weapon.projectile_size(stats),
                    pulse: pulse_time.max(0.0),
                }),
                WeaponKind::Orbit { .. } => {
                    let radius = weapon.projectile_size(stats);
                    orbs.extend(
                        weapon
                            .orb_positions(center)
                            .into_iter()
                            .map(|pos| OrbView { pos, radius }),
                    );
                }
                WeaponKind::Missile => {}
            }
        }

        Snapshot {
            phase: self.phase,
            elapsed: self.elapsed,
            coefficients: self.difficulty.current(),
            stats: self.stats,
            avatar: AvatarView {
                pos: center,
                radius: avatar.body.radius,
                health: avatar.health,
                max_health: avatar.effective_max_health(),
                level: avatar.level,
                xp: avatar.xp,
                xp_to_next_level: avatar.xp_to_next_level,
                invincible: avatar.invincibility > 0.0,
                flash: avatar.flash > 0.0,
                pickup_radius: avatar.effective_pickup_radius(),
                stats: *stats,
                weapons: avatar
                    .weapons
                    .iter()
                    .map(|w| WeaponView {
                        id: w.id,
                        level: w.level(),
                        cooldown: w.cooldown.max(0.0),
                    })
                    .collect(),
            },
            adversaries: self
                .adversaries
                .iter()
                .filter(|a| a.body.active)
                .map(|a| AdversaryView {
                    id: a.id,
                    kind: a.kind.clone(),
                    pos: a.body.pos,
                    radius: a.body.radius,
                    health_fraction: (a.health / a.max_health).clamp(0.0, 1.0),
                    flash: a.flash > 0.0,
                    charge_phase: a.charge_phase(),
                })
                .collect(),
            projectiles: self
                .projectiles
                .iter()
                .filter(|p| p.body.active)
                .map(|p| ProjectileView {
                    id: p.id,
                    pos: p.body.pos,
                    vel: p.body.vel,
                    radius: p.body.radius,
                })
                .collect(),
            pickups: self
                .pickups
                .iter()
                .filter(|p| p.body.active)
                .map(|p| PickupView {
                    id: p.id,
                    pos: p.body.pos,
                    radius: p.body.radius,
                    value: p.value,
                })
                .collect(),
            auras,
            orbs,
            offers: self.progression.current_offers(avatar),
        }
    }
}
