//! Simulation settings
//!
//! Data tables (adversaries, upgrades, difficulty breakpoints) and tuning
//! knobs. Loaded once, validated, and never mutated by the simulation.

use serde::{Deserialize, Serialize};

use crate::consts::OFFER_COUNT;
use crate::error::SimError;
use crate::sim::adversary::BehaviorKind;
use crate::sim::difficulty::Breakpoint;
use crate::sim::upgrade::{StatEffect, UpgradeDef, UpgradeKind};
use crate::sim::weapon::WeaponId;

/// One row of the adversary table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdversaryType {
    pub name: String,
    pub radius: f32,
    pub max_health: f32,
    pub speed: f32,
    /// Contact damage before difficulty scaling
    pub damage: f32,
    pub xp_value: u32,
    pub behavior: BehaviorKind,
    /// Relative weight in the spawn draw
    pub spawn_weight: f32,
    /// Elapsed seconds before this type may spawn
    pub unlock_time: f32,
}

/// Wave tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnSettings {
    /// Seconds between waves at spawn coefficient 1.0
    pub base_interval: f32,
    /// Adversaries per wave at spawn coefficient 1.0
    pub base_wave_size: u32,
    /// Extra distance past the viewport corner
    pub margin: f32,
}

impl Default for SpawnSettings {
    fn default() -> Self {
        Self {
            base_interval: 2.0,
            base_wave_size: 3,
            margin: 50.0,
        }
    }
}

/// Visible area around the avatar, used to place spawns off-screen
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn half_diagonal(&self) -> f32 {
        (self.width * self.width + self.height * self.height).sqrt() / 2.0
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

/// Full simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Run seed for reproducibility
    pub seed: u64,
    pub viewport: Viewport,
    pub spawn: SpawnSettings,
    pub adversaries: Vec<AdversaryType>,
    pub breakpoints: Vec<Breakpoint>,
    pub upgrades: Vec<UpgradeDef>,
    /// Weapons the avatar owns at the start of a run
    pub starting_weapons: Vec<WeaponId>,
    /// Offers presented per level-up
    pub offer_count: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 0,
            viewport: Viewport::default(),
            spawn: SpawnSettings::default(),
            adversaries: default_adversaries(),
            breakpoints: default_breakpoints(),
            upgrades: default_upgrades(),
            starting_weapons: vec![WeaponId::MagicMissile],
            offer_count: OFFER_COUNT,
        }
    }
}

impl Settings {
    /// Default tables with the given seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Parse from JSON. Missing fields fall back to defaults.
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        log::info!(
            "Loaded settings: {} adversary types, {} upgrades, {} breakpoints",
            settings.adversaries.len(),
            settings.upgrades.len(),
            settings.breakpoints.len()
        );
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject tables the simulation cannot run with
    pub fn validate(&self) -> Result<(), SimError> {
        let invalid = |msg: String| Err(SimError::InvalidConfig(msg));

        if self.breakpoints.is_empty() {
            return invalid("breakpoint table is empty".into());
        }
        if let Some(pair) = self.breakpoints.windows(2).find(|w| w[1].time < w[0].time) {
            return invalid(format!(
                "breakpoints not ascending: {} after {}",
                pair[1].time, pair[0].time
            ));
        }
        for bp in &self.breakpoints {
            let positive = |v: f32| v.is_finite() && v > 0.0;
            if !bp.time.is_finite() || !positive(bp.spawn) || !positive(bp.hp) || !positive(bp.damage) {
                return invalid(format!(
                    "breakpoint at t={} needs finite, positive coefficients",
                    bp.time
                ));
            }
        }

        if self.adversaries.is_empty() {
            return invalid("adversary table is empty".into());
        }
        for t in &self.adversaries {
            if !(t.spawn_weight > 0.0) || !t.spawn_weight.is_finite() {
                return invalid(format!("adversary '{}' needs a finite, positive weight", t.name));
            }
            if !(t.radius > 0.0) || !(t.max_health > 0.0) {
                return invalid(format!("adversary '{}' has non-positive radius or health", t.name));
            }
        }
        if !self.adversaries.iter().any(|t| t.unlock_time <= 0.0) {
            return invalid("no adversary type is unlocked at time 0".into());
        }
        // Eligible pools are subsets of the table, so this bounds every draw
        let total: f32 = self.adversaries.iter().map(|t| t.spawn_weight).sum();
        if !total.is_finite() {
            return invalid("sum of spawn weights overflows".into());
        }

        if !(self.spawn.base_interval > 0.0) {
            return invalid("spawn interval must be positive".into());
        }
        if !(self.viewport.width > 0.0) || !(self.viewport.height > 0.0) {
            return invalid("viewport must have positive size".into());
        }

        for (i, def) in self.upgrades.iter().enumerate() {
            if self.upgrades[..i].iter().any(|d| d.id == def.id) {
                return invalid(format!("duplicate upgrade id '{}'", def.id));
            }
        }
        for (i, id) in self.starting_weapons.iter().enumerate() {
            if self.starting_weapons[..i].contains(id) {
                return invalid(format!("starting weapon '{id}' listed twice"));
            }
        }
        if self.offer_count == 0 {
            return invalid("offer count must be at least 1".into());
        }
        Ok(())
    }

    pub fn adversary_type(&self, name: &str) -> Option<&AdversaryType> {
        self.adversaries.iter().find(|t| t.name == name)
    }
}

/// zombie, bat, skeleton, golem
pub fn default_adversaries() -> Vec<AdversaryType> {
    vec![
        AdversaryType {
            name: "zombie".into(),
            radius: 14.0,
            max_health: 15.0,
            speed: 60.0,
            damage: 10.0,
            xp_value: 1,
            behavior: BehaviorKind::Chase,
            spawn_weight: 45.0,
            unlock_time: 0.0,
        },
        AdversaryType {
            name: "bat".into(),
            radius: 10.0,
            max_health: 5.0,
            speed: 140.0,
            damage: 5.0,
            xp_value: 1,
            behavior: BehaviorKind::Erratic,
            spawn_weight: 30.0,
            unlock_time: 30.0,
        },
        AdversaryType {
            name: "skeleton".into(),
            radius: 12.0,
            max_health: 20.0,
            speed: 70.0,
            damage: 15.0,
            xp_value: 2,
            behavior: BehaviorKind::Charger {
                charge_speed: 280.0,
                preferred_distance: 150.0,
            },
            spawn_weight: 18.0,
            unlock_time: 60.0,
        },
        AdversaryType {
            name: "golem".into(),
            radius: 26.0,
            max_health: 80.0,
            speed: 35.0,
            damage: 25.0,
            xp_value: 5,
            behavior: BehaviorKind::Tank,
            spawn_weight: 7.0,
            unlock_time: 120.0,
        },
    ]
}

pub fn default_breakpoints() -> Vec<Breakpoint> {
    vec![
        Breakpoint::new(0.0, 1.0, 1.0, 1.0),
        Breakpoint::new(30.0, 1.2, 1.1, 1.0),
        Breakpoint::new(60.0, 1.4, 1.2, 1.1),
        Breakpoint::new(120.0, 1.7, 1.4, 1.2),
        Breakpoint::new(180.0, 2.0, 1.7, 1.3),
        Breakpoint::new(300.0, 2.5, 2.0, 1.5),
        Breakpoint::new(480.0, 3.0, 2.5, 1.7),
        Breakpoint::new(600.0, 4.0, 3.0, 2.0),
    ]
}

/// Eight stat upgrades followed by one unlock/level-up entry per weapon
pub fn default_upgrades() -> Vec<UpgradeDef> {
    fn stat(id: &str, name: &str, description: &str, effect: StatEffect, max_stacks: u32) -> UpgradeDef {
        UpgradeDef {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            kind: UpgradeKind::Stat { effect, max_stacks },
        }
    }

    let mut upgrades = vec![
        stat(
            "stat_max_health",
            "Vitality",
            "+20% Max Health",
            StatEffect::MaxHealth { bonus: 0.2, heal: 20.0 },
            5,
        ),
        stat("stat_speed", "Swiftness", "+15% Move Speed", StatEffect::Speed { bonus: 0.15 }, 5),
        stat("stat_damage", "Power", "+20% Damage", StatEffect::Damage { bonus: 0.2 }, 5),
        stat(
            "stat_attack_speed",
            "Haste",
            "+15% Attack Speed",
            StatEffect::AttackSpeed { bonus: 0.15 },
            5,
        ),
        stat("stat_armor", "Toughness", "+3 Armor", StatEffect::Armor { amount: 3.0 }, 5),
        stat(
            "stat_pickup_radius",
            "Magnetism",
            "+30% Pickup Range",
            StatEffect::PickupRadius { bonus: 0.3 },
            3,
        ),
        stat("stat_regen", "Regeneration", "+1 HP/second", StatEffect::Regen { per_second: 1.0 }, 5),
        stat("stat_xp_gain", "Wisdom", "+20% XP Gain", StatEffect::XpGain { bonus: 0.2 }, 3),
    ];

    for weapon in WeaponId::ALL {
        let description = match weapon {
            WeaponId::MagicMissile => "Auto-targeting projectile",
            WeaponId::AuraField => "Damage nearby enemies",
            WeaponId::SpinningOrb => "Orbiting projectiles",
        };
        upgrades.push(UpgradeDef {
            id: format!("weapon_{}", weapon.as_str()),
            name: weapon.name().into(),
            description: description.into(),
            kind: UpgradeKind::Weapon { weapon },
        });
    }
    upgrades
}
