//! Simulation module
//!
//! All gameplay logic lives here:
//! - Variable timestep, clamped to `MAX_DT`
//! - One seeded RNG owned by the world
//! - Stable iteration order (insertion order, ids never reused)
//! - No rendering, audio or platform dependencies

pub mod adversary;
pub mod avatar;
pub mod collision;
pub mod difficulty;
pub mod entity;
pub mod pickup;
pub mod projectile;
pub mod snapshot;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod upgrade;
pub mod weapon;

pub use adversary::{Adversary, Behavior, BehaviorKind, ChargePhase};
pub use avatar::{Avatar, HitOutcome, Stats, xp_threshold};
pub use difficulty::{Breakpoint, Coefficients, Difficulty, coefficients_at};
pub use entity::{Body, EntityId, HitSet, Simulated, sweep_inactive};
pub use pickup::Pickup;
pub use projectile::Projectile;
pub use snapshot::Snapshot;
pub use spawn::Spawner;
pub use state::{GamePhase, RunStats, SimEvent, World};
pub use tick::{TickInput, clamp_dt};
pub use upgrade::{Offer, Progression, StatEffect, UpgradeDef, UpgradeKind};
pub use weapon::{Weapon, WeaponId, WeaponKind, WeaponStats};
