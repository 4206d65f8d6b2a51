//! Collision resolution
//!
//! Three ordered passes per tick: projectiles against adversaries, adversaries
//! against the avatar, pickups against the avatar. Each pass re-checks the
//! `active` flag on entry to its inner loop, so an entity deactivated earlier
//! in the same pass is never touched again.

use glam::Vec2;

use super::adversary::Adversary;
use super::avatar::{Avatar, HitOutcome};
use super::entity::EntityId;
use super::pickup::Pickup;
use super::projectile::Projectile;
use super::weapon::WeaponId;

/// Damage dealt to an adversary
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub target: EntityId,
    pub amount: f32,
    pub pos: Vec2,
    pub source: WeaponId,
}

/// An adversary killed this tick
#[derive(Debug, Clone, PartialEq)]
pub struct Kill {
    pub id: EntityId,
    pub kind: String,
    pub pos: Vec2,
    pub xp_value: u32,
    pub source: WeaponId,
}

impl Kill {
    pub fn of(adv: &Adversary, source: WeaponId) -> Self {
        Self {
            id: adv.id,
            kind: adv.kind.clone(),
            pos: adv.body.pos,
            xp_value: adv.xp_value,
            source,
        }
    }
}

/// Contact damage landed on the avatar
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub attacker: EntityId,
    pub damage: f32,
    pub died: bool,
}

/// A pickup absorbed by the avatar
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collection {
    pub pickup: EntityId,
    /// XP after the gain multiplier
    pub xp: u32,
    pub levels: u32,
}

/// Pass 1: projectiles against adversaries
pub fn projectiles_vs_adversaries(
    projectiles: &mut [Projectile],
    adversaries: &mut [Adversary],
    hits: &mut Vec<Hit>,
    kills: &mut Vec<Kill>,
) {
    for proj in projectiles.iter_mut() {
        for adv in adversaries.iter_mut() {
            if !proj.body.active {
                break;
            }
            if !adv.body.active || !proj.body.overlaps(&adv.body) {
                continue;
            }
            if !proj.on_hit(adv.id) {
                continue;
            }

            let died = adv.take_damage(proj.damage);
            hits.push(Hit {
                target: adv.id,
                amount: proj.damage,
                pos: adv.body.pos,
                source: proj.source,
            });
            if died {
                kills.push(Kill::of(adv, proj.source));
            }
        }
    }
}

/// Pass 2: adversaries against the avatar.
///
/// The invincibility window admits at most one landed hit per pass.
pub fn adversaries_vs_avatar(adversaries: &[Adversary], avatar: &mut Avatar) -> Option<Contact> {
    if avatar.is_dead() {
        return None;
    }
    for adv in adversaries {
        if !adv.body.active || !adv.body.overlaps(&avatar.body) {
            continue;
        }
        match avatar.take_damage(adv.damage) {
            HitOutcome::Ignored => continue,
            HitOutcome::Hurt(damage) => {
                return Some(Contact {
                    attacker: adv.id,
                    damage,
                    died: false,
                });
            }
            HitOutcome::Died(damage) => {
                return Some(Contact {
                    attacker: adv.id,
                    damage,
                    died: true,
                });
            }
        }
    }
    None
}

/// Pass 3: pickups inside the collection radius are absorbed
pub fn pickups_vs_avatar(pickups: &mut [Pickup], avatar: &mut Avatar) -> Vec<Collection> {
    let reach = avatar.collect_radius();
    let mut collected = Vec::new();
    for pickup in pickups.iter_mut() {
        if !pickup.body.active {
            continue;
        }
        if pickup.body.pos.distance(avatar.pos()) >= reach {
            continue;
        }
        pickup.body.active = false;
        let (xp, levels) = avatar.gain_xp(pickup.value);
        collected.push(Collection {
            pickup: pickup.id,
            xp,
            levels,
        });
    }
    collected
}
