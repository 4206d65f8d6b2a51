//! World state and commands
//!
//! Everything mutable lives in one [`World`]. The driver advances it with
//! [`World::tick`] and applies commands (pause, resume, upgrade selection)
//! strictly between ticks.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::adversary::Adversary;
use super::avatar::Avatar;
use super::collision::Kill;
use super::difficulty::{Coefficients, Difficulty};
use super::entity::IdAllocator;
use super::pickup::Pickup;
use super::projectile::Projectile;
use super::spawn::Spawner;
use super::upgrade::{Applied, Offer, Progression};
use super::weapon::{Weapon, WeaponId};
use crate::error::SimError;
use crate::settings::Settings;

/// Events kept between drains. The oldest half is dropped when full.
pub const EVENT_QUEUE_LIMIT: usize = 4096;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Waiting for the player to pick an upgrade
    LevelUp,
    /// Paused by the driver
    Paused,
    /// Avatar died
    GameOver,
}

/// Signals emitted during a tick or command, drained by collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    LevelUpPending {
        level: u32,
        offers: Vec<Offer>,
    },
    AvatarDied {
        elapsed: f32,
        level: u32,
        kills: u32,
    },
    EnemyKilled {
        id: u32,
        kind: String,
        pos: Vec2,
        source: WeaponId,
    },
    AdversaryDamaged {
        id: u32,
        amount: f32,
        pos: Vec2,
        source: WeaponId,
    },
    AvatarDamaged {
        amount: f32,
        health: f32,
    },
    PickupCollected {
        xp: u32,
    },
    WeaponFired {
        weapon: WeaponId,
        projectiles: usize,
    },
}

/// Per-run counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub enemies_killed: u32,
    pub damage_dealt: f32,
    pub damage_taken: f32,
    pub xp_collected: u32,
    pub highest_level: u32,
}

pub struct World {
    pub(super) settings: Settings,
    pub(super) rng: Pcg32,
    pub(super) ids: IdAllocator,
    pub(super) phase: GamePhase,
    /// Phase restored by `resume`
    pub(super) resume_phase: GamePhase,
    /// Simulated seconds while playing
    pub(super) elapsed: f32,
    pub(super) ticks: u64,
    pub(super) avatar: Avatar,
    pub(super) adversaries: Vec<Adversary>,
    pub(super) projectiles: Vec<Projectile>,
    pub(super) pickups: Vec<Pickup>,
    pub(super) difficulty: Difficulty,
    pub(super) spawner: Spawner,
    pub(super) progression: Progression,
    /// Level-ups still waiting for a selection
    pub(super) pending_level_ups: u32,
    pub(super) stats: RunStats,
    /// Drained by the driver once per frame; bounded by `EVENT_QUEUE_LIMIT`
    pub(super) events: Vec<SimEvent>,
}

impl World {
    /// Validate settings and start a run
    pub fn new(settings: Settings) -> Result<Self, SimError> {
        settings.validate()?;
        Ok(Self::from_valid(settings))
    }

    /// Default tables with the given seed
    pub fn with_defaults(seed: u64) -> Self {
        Self::from_valid(Settings::with_seed(seed))
    }

    fn from_valid(settings: Settings) -> Self {
        let mut avatar = Avatar::new(Vec2::ZERO);
        for &id in &settings.starting_weapons {
            avatar.weapons.push(Weapon::new(id));
        }
        log::info!("New run with seed {}", settings.seed);

        Self {
            rng: Pcg32::seed_from_u64(settings.seed),
            ids: IdAllocator::default(),
            phase: GamePhase::Playing,
            resume_phase: GamePhase::Playing,
            elapsed: 0.0,
            ticks: 0,
            avatar,
            adversaries: Vec::new(),
            projectiles: Vec::new(),
            pickups: Vec::new(),
            difficulty: Difficulty::new(settings.breakpoints.clone()),
            spawner: Spawner::new(settings.adversaries.clone(), settings.spawn, settings.viewport),
            progression: Progression::new(settings.upgrades.clone()),
            pending_level_ups: 0,
            stats: RunStats {
                highest_level: 1,
                ..RunStats::default()
            },
            events: Vec::new(),
            settings,
        }
    }

    // --- accessors ---

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn avatar(&self) -> &Avatar {
        &self.avatar
    }

    pub fn adversaries(&self) -> &[Adversary] {
        &self.adversaries
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn pickups(&self) -> &[Pickup] {
        &self.pickups
    }

    pub fn coefficients(&self) -> Coefficients {
        self.difficulty.current()
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn kills(&self) -> u32 {
        self.stats.enemies_killed
    }

    pub fn pending_level_ups(&self) -> u32 {
        self.pending_level_ups
    }

    /// Offers currently awaiting a selection (empty outside level-up)
    pub fn offers(&self) -> Vec<Offer> {
        self.progression.current_offers(&self.avatar)
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Take every event emitted since the last drain. Call once per frame;
    /// an undrained queue keeps only the most recent events.
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    // --- commands ---

    /// Freeze the run. Returns false if there was nothing to pause.
    pub fn pause(&mut self) -> bool {
        match self.phase {
            GamePhase::Playing | GamePhase::LevelUp => {
                self.resume_phase = self.phase;
                self.phase = GamePhase::Paused;
                true
            }
            GamePhase::Paused | GamePhase::GameOver => false,
        }
    }

    pub fn resume(&mut self) -> bool {
        if self.phase != GamePhase::Paused {
            return false;
        }
        self.phase = self.resume_phase;
        true
    }

    /// Commit the offer at `index`. Only valid while a level-up is pending.
    pub fn select_upgrade(&mut self, index: usize) -> Result<(), SimError> {
        if self.phase != GamePhase::LevelUp {
            log::warn!("Upgrade selection {index} rejected: phase is {:?}", self.phase);
            return Err(SimError::NotAwaitingSelection);
        }

        let applied = self
            .progression
            .apply_upgrade(index, &mut self.avatar)
            .inspect_err(|e| log::warn!("Upgrade selection rejected: {e}"))?;
        match &applied {
            Applied::Stat { id, stacks } => log::info!("Upgrade {id} -> stack {stacks}"),
            Applied::WeaponUnlocked(weapon) => log::info!("Unlocked {}", weapon.name()),
            Applied::WeaponLeveled { weapon, level } => {
                log::info!("{} reached level {level}", weapon.name())
            }
        }

        self.pending_level_ups = self.pending_level_ups.saturating_sub(1);
        self.open_offers();
        Ok(())
    }

    /// Give the avatar a weapon by identifier (scripted events, debugging)
    pub fn grant_weapon(&mut self, id: &str) -> Result<(), SimError> {
        let weapon = id.parse::<WeaponId>().inspect_err(|e| log::warn!("{e}"))?;
        if self.avatar.weapon(weapon).is_some() {
            log::warn!("{} already owned", weapon.name());
            return Err(SimError::WeaponAlreadyOwned);
        }
        self.avatar.weapons.push(Weapon::new(weapon));
        log::info!("Granted {}", weapon.name());
        Ok(())
    }

    /// Spawn adversaries immediately, of a named type or from the unlocked
    /// pool. Returns the number spawned.
    pub fn spawn_burst(&mut self, count: usize, kind: Option<&str>) -> Result<usize, SimError> {
        let burst = self
            .spawner
            .spawn_burst(
                count,
                kind,
                self.elapsed,
                self.difficulty.current(),
                self.avatar.pos(),
                &mut self.ids,
                &mut self.rng,
            )
            .inspect_err(|e| log::warn!("Burst rejected: {e}"))?;
        let n = burst.len();
        self.adversaries.extend(burst);
        Ok(n)
    }

    // --- internal helpers used by the tick ---

    /// Present offers for the next pending level-up, or return to play
    pub(super) fn open_offers(&mut self) {
        if self.pending_level_ups == 0 {
            self.phase = GamePhase::Playing;
            return;
        }

        let offers = self
            .progression
            .generate_choices(self.settings.offer_count, &self.avatar, &mut self.rng);
        if offers.is_empty() {
            log::info!("No upgrades left to offer");
            self.pending_level_ups = 0;
            self.phase = GamePhase::Playing;
            return;
        }

        // Rounds are served oldest first, so the head of the queue is the
        // earliest level still unrewarded.
        let level = (self.avatar.level + 1).saturating_sub(self.pending_level_ups).max(2);
        self.phase = GamePhase::LevelUp;
        self.push_event(SimEvent::LevelUpPending { level, offers });
    }

    pub(super) fn push_event(&mut self, event: SimEvent) {
        if self.events.len() >= EVENT_QUEUE_LIMIT {
            log::warn!("Event queue full; dropping the oldest {} events", EVENT_QUEUE_LIMIT / 2);
            self.events.drain(..EVENT_QUEUE_LIMIT / 2);
        }
        self.events.push(event);
    }

    /// Side effects of a kill: pickup drop, counter, signal
    pub(super) fn record_kill(&mut self, kill: Kill) {
        let id = self.ids.next_id();
        self.pickups
            .push(Pickup::new(id, kill.pos, kill.xp_value, &mut self.rng));
        self.stats.enemies_killed += 1;
        self.push_event(SimEvent::EnemyKilled {
            id: kill.id,
            kind: kill.kind,
            pos: kill.pos,
            source: kill.source,
        });
    }
}
