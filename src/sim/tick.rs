//! Per-tick simulation step
//!
//! Order within a tick: difficulty, avatar, weapons, adversaries,
//! projectiles, pickups, spawning, the three collision passes, then the
//! inactive sweep. Nothing advances outside the `Playing` phase.

use glam::Vec2;

use super::collision::{
    Hit, Kill, adversaries_vs_avatar, pickups_vs_avatar, projectiles_vs_adversaries,
};
use super::entity::sweep_inactive;
use super::state::{GamePhase, SimEvent, World};
use super::weapon::WeaponOutput;
use crate::consts::MAX_DT;

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Desired movement direction; normalized by the avatar, zero means stand still
    pub movement: Vec2,
}

impl TickInput {
    pub fn moving(movement: Vec2) -> Self {
        Self { movement }
    }
}

/// Clamp a frame delta to `[0, MAX_DT]`. Non-finite deltas count as zero.
pub fn clamp_dt(dt: f32) -> f32 {
    if dt.is_finite() { dt.clamp(0.0, MAX_DT) } else { 0.0 }
}

impl World {
    /// Advance the simulation by `dt` seconds (clamped)
    pub fn tick(&mut self, dt: f32, input: &TickInput) {
        if self.phase != GamePhase::Playing {
            return;
        }
        let dt = clamp_dt(dt);
        self.elapsed += dt;
        self.ticks += 1;

        let coef = self.difficulty.update(self.elapsed);

        self.avatar.update(dt, input.movement);

        self.update_weapons(dt);

        let target = self.avatar.pos();
        for adv in self.adversaries.iter_mut().filter(|a| a.body.active) {
            adv.update(dt, target, &mut self.rng);
        }

        for proj in self.projectiles.iter_mut().filter(|p| p.body.active) {
            proj.update(dt);
        }

        let magnet = self.avatar.effective_pickup_radius();
        for pickup in self.pickups.iter_mut().filter(|p| p.body.active) {
            pickup.update(dt, target, magnet);
        }

        let wave = self
            .spawner
            .update(dt, self.elapsed, coef, target, &mut self.ids, &mut self.rng);
        self.adversaries.extend(wave);

        self.resolve_collisions();

        sweep_inactive(&mut self.adversaries);
        sweep_inactive(&mut self.projectiles);
        sweep_inactive(&mut self.pickups);

        if self.phase == GamePhase::Playing && self.pending_level_ups > 0 {
            self.open_offers();
        }
    }

    fn update_weapons(&mut self, dt: f32) {
        let owner = self.avatar.pos();
        let stats = self.avatar.stats;
        let mut out = WeaponOutput::default();
        for weapon in self.avatar.weapons.iter_mut() {
            weapon.update(dt, owner, &stats, &mut self.adversaries, &mut out);
        }

        for mut proj in out.projectiles {
            proj.id = self.ids.next_id();
            self.projectiles.push(proj);
        }
        for (weapon, projectiles) in out.fired {
            self.push_event(SimEvent::WeaponFired {
                weapon,
                projectiles,
            });
        }
        self.apply_combat(out.hits, out.kills);
    }

    /// Record damage dealt and run kill side effects
    fn apply_combat(&mut self, hits: Vec<Hit>, kills: Vec<Kill>) {
        for hit in hits {
            self.stats.damage_dealt += hit.amount;
            self.push_event(SimEvent::AdversaryDamaged {
                id: hit.target,
                amount: hit.amount,
                pos: hit.pos,
                source: hit.source,
            });
        }
        for kill in kills {
            self.record_kill(kill);
        }
    }

    fn resolve_collisions(&mut self) {
        // Pass 1
        let (mut hits, mut kills) = (Vec::new(), Vec::new());
        projectiles_vs_adversaries(
            &mut self.projectiles,
            &mut self.adversaries,
            &mut hits,
            &mut kills,
        );
        self.apply_combat(hits, kills);

        // Pass 2
        if let Some(contact) = adversaries_vs_avatar(&self.adversaries, &mut self.avatar) {
            self.stats.damage_taken += contact.damage;
            self.push_event(SimEvent::AvatarDamaged {
                amount: contact.damage,
                health: self.avatar.health,
            });
            if contact.died {
                self.on_avatar_death();
                return;
            }
        }

        // Pass 3
        for got in pickups_vs_avatar(&mut self.pickups, &mut self.avatar) {
            self.stats.xp_collected += got.xp;
            self.push_event(SimEvent::PickupCollected { xp: got.xp });
            if got.levels > 0 {
                self.pending_level_ups += got.levels;
                self.stats.highest_level = self.stats.highest_level.max(self.avatar.level);
                log::info!(
                    "Level up to {} ({} pending)",
                    self.avatar.level,
                    self.pending_level_ups
                );
            }
        }
    }

    fn on_avatar_death(&mut self) {
        self.phase = GamePhase::GameOver;
        self.pending_level_ups = 0;
        log::info!(
            "Avatar died at {:.1}s: level {}, {} kills",
            self.elapsed,
            self.avatar.level,
            self.stats.enemies_killed
        );
        self.push_event(SimEvent::AvatarDied {
            elapsed: self.elapsed,
            level: self.avatar.level,
            kills: self.stats.enemies_killed,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::pickup::Pickup;
    use crate::sim::projectile::Projectile;
    use crate::sim::weapon::WeaponId;

    const DT: f32 = 1.0 / 60.0;

    fn still() -> TickInput {
        TickInput::default()
    }

    fn drop_pickup(world: &mut World, pos: Vec2, value: u32) {
        let id = world.ids.next_id();
        let mut pickup = Pickup::new(id, pos, value, &mut world.rng);
        pickup.scatter_time = 0.0;
        world.pickups.push(pickup);
    }

    #[test]
    fn test_clamp_dt() {
        assert_eq!(clamp_dt(0.5), MAX_DT);
        assert_eq!(clamp_dt(-1.0), 0.0);
        assert_eq!(clamp_dt(f32::NAN), 0.0);
        assert_eq!(clamp_dt(0.02), 0.02);
    }

    #[test]
    fn test_long_frame_is_clamped() {
        let mut world = World::with_defaults(1);
        world.tick(5.0, &still());
        assert!((world.elapsed() - MAX_DT).abs() < 1e-6);
    }

    #[test]
    fn test_first_tick_spawns_off_screen() {
        let mut world = World::with_defaults(1);
        world.tick(DT, &still());
        assert_eq!(world.adversaries().len(), 3);
        let distance = world.spawner.spawn_distance();
        for adv in world.adversaries() {
            assert!(adv.body.pos.length() > distance - 5.0);
        }
    }

    #[test]
    fn test_paused_tick_is_noop() {
        let mut world = World::with_defaults(1);
        world.pause();
        world.tick(DT, &TickInput::moving(Vec2::X));
        assert_eq!(world.elapsed(), 0.0);
        assert_eq!(world.ticks(), 0);
        assert_eq!(world.avatar().pos(), Vec2::ZERO);
        assert!(world.adversaries().is_empty());
    }

    #[test]
    fn test_movement_input() {
        let mut world = World::with_defaults(1);
        world.tick(0.1, &TickInput::moving(Vec2::new(0.0, -5.0)));
        assert!((world.avatar().pos().y + 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_missile_kill_drops_pickup() {
        let mut world = World::with_defaults(2);
        world.spawn_burst(1, Some("zombie")).unwrap();
        world.adversaries[0].body.pos = Vec2::new(120.0, 0.0);
        world.adversaries[0].health = 1.0;
        let victim = world.adversaries[0].id;

        let mut killed = false;
        for _ in 0..60 {
            world.tick(DT, &still());
            let events = world.drain_events();
            if events
                .iter()
                .any(|e| matches!(e, SimEvent::EnemyKilled { id, .. } if *id == victim))
            {
                killed = true;
                break;
            }
        }
        assert!(killed);
        assert_eq!(world.kills(), 1);
        assert_eq!(world.pickups().len(), 1);
        assert_eq!(world.pickups()[0].value, 1);
        assert!(world.adversaries().iter().all(|a| a.id != victim));
    }

    #[test]
    fn test_aura_kill_counts() {
        let mut settings = Settings::with_seed(4);
        settings.starting_weapons = vec![WeaponId::AuraField];
        let mut world = World::new(settings).unwrap();
        world.spawn_burst(1, Some("bat")).unwrap();
        world.adversaries[0].body.pos = Vec2::new(60.0, 0.0);
        world.adversaries[0].speed = 0.0;
        world.adversaries[0].health = 2.0;
        world.tick(DT, &still());
        assert_eq!(world.kills(), 1);
        assert_eq!(world.pickups().len(), 1);
    }

    #[test]
    fn test_death_ends_run_once() {
        let mut world = World::with_defaults(3);
        world.spawn_burst(1, Some("golem")).unwrap();
        world.adversaries[0].body.pos = Vec2::new(10.0, 0.0);
        world.avatar.health = 5.0;
        // Pass 3 must not run after death
        drop_pickup(&mut world, Vec2::ZERO, 50);

        world.tick(DT, &still());
        assert_eq!(world.phase(), GamePhase::GameOver);
        assert_eq!(world.avatar().xp, 0);
        let deaths = world
            .drain_events()
            .iter()
            .filter(|e| matches!(e, SimEvent::AvatarDied { .. }))
            .count();
        assert_eq!(deaths, 1);

        let elapsed = world.elapsed();
        world.tick(DT, &still());
        assert_eq!(world.elapsed(), elapsed);
        assert!(world.drain_events().is_empty());
    }

    #[test]
    fn test_projectile_kill_prevents_contact_damage() {
        let mut settings = Settings::with_seed(3);
        settings.starting_weapons.clear();
        let mut world = World::new(settings).unwrap();
        world.spawn_burst(1, Some("zombie")).unwrap();
        world.adversaries[0].body.pos = Vec2::new(10.0, 0.0);

        let mut shot = Projectile::new(
            Vec2::new(10.0, 0.0),
            Vec2::X,
            0.0,
            1000.0,
            10.0,
            0,
            WeaponId::MagicMissile,
        );
        shot.id = world.ids.next_id();
        world.projectiles.push(shot);

        world.tick(DT, &still());
        assert_eq!(world.kills(), 1);
        assert_eq!(world.avatar().health, 100.0);
        assert_eq!(world.stats().damage_taken, 0.0);
        assert!(
            !world
                .drain_events()
                .iter()
                .any(|e| matches!(e, SimEvent::AvatarDamaged { .. }))
        );
    }

    #[test]
    fn test_invincibility_blocks_repeat_contact() {
        let mut world = World::with_defaults(3);
        world.spawn_burst(2, Some("zombie")).unwrap();
        world.adversaries[0].body.pos = Vec2::new(10.0, 0.0);
        world.adversaries[1].body.pos = Vec2::new(-10.0, 0.0);
        world.tick(DT, &still());
        assert_eq!(world.avatar().health, 90.0);
        world.tick(DT, &still());
        assert_eq!(world.avatar().health, 90.0);
        assert_eq!(world.stats().damage_taken, 10.0);
    }

    #[test]
    fn test_pickup_triggers_level_up_phase() {
        let mut world = World::with_defaults(6);
        drop_pickup(&mut world, Vec2::ZERO, 10);
        world.tick(DT, &still());

        assert_eq!(world.phase(), GamePhase::LevelUp);
        assert_eq!(world.avatar().level, 2);
        assert_eq!(world.avatar().xp_to_next_level, 11);
        let events = world.drain_events();
        assert!(
            events
                .iter()
                .any(|e| matches!(e, SimEvent::LevelUpPending { level: 2, offers } if offers.len() == 3))
        );

        // Frozen until a selection is made
        let elapsed = world.elapsed();
        world.tick(DT, &still());
        assert_eq!(world.elapsed(), elapsed);

        world.select_upgrade(1).unwrap();
        assert_eq!(world.phase(), GamePhase::Playing);
        world.tick(DT, &still());
        assert!(world.elapsed() > elapsed);
    }

    #[test]
    fn test_large_pickup_queues_every_level() {
        let mut world = World::with_defaults(6);
        drop_pickup(&mut world, Vec2::ZERO, 40);
        world.tick(DT, &still());
        assert_eq!(world.avatar().level, 4);
        assert_eq!(world.pending_level_ups(), 3);
        let mut rounds = Vec::new();
        for remaining in (0..3).rev() {
            assert_eq!(world.phase(), GamePhase::LevelUp);
            for event in world.drain_events() {
                if let SimEvent::LevelUpPending { level, .. } = event {
                    rounds.push(level);
                }
            }
            world.select_upgrade(0).unwrap();
            assert_eq!(world.pending_level_ups(), remaining);
        }
        assert_eq!(rounds, vec![2, 3, 4]);
        assert_eq!(world.phase(), GamePhase::Playing);
        assert_eq!(world.stats().highest_level, 4);
    }

    #[test]
    fn test_same_seed_same_run() {
        let run = |seed: u64| {
            let mut world = World::with_defaults(seed);
            for i in 0..1200 {
                let t = i as f32 * DT;
                world.tick(DT, &TickInput::moving(Vec2::new(t.cos(), t.sin())));
                if world.phase() == GamePhase::LevelUp {
                    world.select_upgrade(0).unwrap();
                }
            }
            serde_json::to_string(&world.snapshot()).unwrap()
        };
        assert_eq!(run(77), run(77));
    }
}
