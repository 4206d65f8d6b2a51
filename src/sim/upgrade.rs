//! Level-up progression
//!
//! On each level-up the world asks for a handful of offers drawn from the
//! eligible upgrades, then commits exactly one of them. Stat upgrades stack up
//! to a cap; weapon upgrades unlock a weapon or level an owned one.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::avatar::Avatar;
use super::weapon::{Weapon, WeaponId};
use crate::error::SimError;

/// Stat change applied by one stack of a stat upgrade
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stat", rename_all = "snake_case")]
pub enum StatEffect {
    /// Raise the max-health multiplier and heal a flat amount
    MaxHealth { bonus: f32, heal: f32 },
    Speed { bonus: f32 },
    Damage { bonus: f32 },
    AttackSpeed { bonus: f32 },
    Armor { amount: f32 },
    PickupRadius { bonus: f32 },
    Regen { per_second: f32 },
    XpGain { bonus: f32 },
}

impl StatEffect {
    pub fn apply(&self, avatar: &mut Avatar) {
        let stats = &mut avatar.stats;
        match *self {
            StatEffect::MaxHealth { bonus, heal } => {
                stats.max_health += bonus;
                avatar.heal(heal);
            }
            StatEffect::Speed { bonus } => stats.speed += bonus,
            StatEffect::Damage { bonus } => stats.damage += bonus,
            StatEffect::AttackSpeed { bonus } => stats.attack_speed += bonus,
            StatEffect::Armor { amount } => stats.armor += amount,
            StatEffect::PickupRadius { bonus } => stats.pickup_radius += bonus,
            StatEffect::Regen { per_second } => stats.regen += per_second,
            StatEffect::XpGain { bonus } => stats.xp_gain += bonus,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UpgradeKind {
    Stat { effect: StatEffect, max_stacks: u32 },
    /// Unlock if unowned, otherwise level up
    Weapon { weapon: WeaponId },
}

/// One row of the upgrade table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeDef {
    pub id: String,
    pub name: String,
    pub description: String,
    pub kind: UpgradeKind,
}

/// An offer as presented to the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Current weapon level (0 if unowned) or current stack count
    pub level: u32,
    pub is_weapon: bool,
}

/// What a committed selection did
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    Stat { id: String, stacks: u32 },
    WeaponUnlocked(WeaponId),
    WeaponLeveled { weapon: WeaponId, level: u32 },
}

#[derive(Debug, Clone)]
pub struct Progression {
    defs: Vec<UpgradeDef>,
    /// Stacks taken per definition (parallel to `defs`)
    stacks: Vec<u32>,
    /// Indices into `defs` for the open offer set
    offers: Vec<usize>,
}

impl Progression {
    pub fn new(defs: Vec<UpgradeDef>) -> Self {
        let stacks = vec![0; defs.len()];
        Self {
            defs,
            stacks,
            offers: Vec::new(),
        }
    }

    pub fn defs(&self) -> &[UpgradeDef] {
        &self.defs
    }

    /// Stacks taken of the upgrade with this id
    pub fn stacks(&self, id: &str) -> u32 {
        self.defs
            .iter()
            .position(|d| d.id == id)
            .map_or(0, |i| self.stacks[i])
    }

    pub fn has_offers(&self) -> bool {
        !self.offers.is_empty()
    }

    pub fn current_offers(&self, avatar: &Avatar) -> Vec<Offer> {
        self.offers.iter().map(|&i| self.offer(i, avatar)).collect()
    }

    fn is_eligible(&self, index: usize, avatar: &Avatar) -> bool {
        match self.defs[index].kind {
            UpgradeKind::Stat { max_stacks, .. } => self.stacks[index] < max_stacks,
            UpgradeKind::Weapon { weapon } => {
                avatar.weapon(weapon).is_none_or(|w| !w.is_max_level())
            }
        }
    }

    fn offer(&self, index: usize, avatar: &Avatar) -> Offer {
        let def = &self.defs[index];
        match def.kind {
            UpgradeKind::Stat { max_stacks, .. } => {
                let stacks = self.stacks[index];
                let name = if stacks > 0 {
                    format!("{} ({}/{})", def.name, stacks + 1, max_stacks)
                } else {
                    def.name.clone()
                };
                Offer {
                    id: def.id.clone(),
                    name,
                    description: def.description.clone(),
                    level: stacks,
                    is_weapon: false,
                }
            }
            UpgradeKind::Weapon { weapon } => {
                let level = avatar.weapon(weapon).map_or(0, |w| w.level());
                let description = if level > 0 {
                    format!("Level up {} (Lv {} → {})", def.name, level, level + 1)
                } else {
                    def.description.clone()
                };
                Offer {
                    id: def.id.clone(),
                    name: def.name.clone(),
                    description,
                    level,
                    is_weapon: true,
                }
            }
        }
    }

    /// Replace the offer set with up to `n` eligible upgrades in random order
    pub fn generate_choices<R: Rng + ?Sized>(
        &mut self,
        n: usize,
        avatar: &Avatar,
        rng: &mut R,
    ) -> Vec<Offer> {
        let mut eligible: Vec<usize> = (0..self.defs.len())
            .filter(|&i| self.is_eligible(i, avatar))
            .collect();
        eligible.shuffle(rng);
        eligible.truncate(n);
        self.offers = eligible;
        self.current_offers(avatar)
    }

    /// Commit the offer at `index`. Clears the offer set on success; on error
    /// nothing changes.
    pub fn apply_upgrade(&mut self, index: usize, avatar: &mut Avatar) -> Result<Applied, SimError> {
        if self.offers.is_empty() {
            return Err(SimError::NotAwaitingSelection);
        }
        let Some(&def_index) = self.offers.get(index) else {
            return Err(SimError::InvalidSelection {
                index,
                offered: self.offers.len(),
            });
        };

        let applied = match self.defs[def_index].kind {
            UpgradeKind::Stat { effect, max_stacks } => {
                if self.stacks[def_index] >= max_stacks {
                    return Err(SimError::InvalidSelection {
                        index,
                        offered: self.offers.len(),
                    });
                }
                effect.apply(avatar);
                self.stacks[def_index] += 1;
                Applied::Stat {
                    id: self.defs[def_index].id.clone(),
                    stacks: self.stacks[def_index],
                }
            }
            UpgradeKind::Weapon { weapon } => match avatar.weapon_mut(weapon) {
                Some(owned) => Applied::WeaponLeveled {
                    weapon,
                    level: owned.level_up()?,
                },
                None => {
                    avatar.weapons.push(Weapon::new(weapon));
                    Applied::WeaponUnlocked(weapon)
                }
            },
        };

        self.offers.clear();
        Ok(applied)
    }
}
