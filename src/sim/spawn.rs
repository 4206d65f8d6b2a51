//! Wave spawning
//!
//! A countdown timer emits waves sized and paced by the current spawn
//! coefficient. Types come from a weighted draw over the types unlocked at the
//! current elapsed time; positions sit on a ring just outside the viewport.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::adversary::Adversary;
use super::difficulty::Coefficients;
use super::entity::IdAllocator;
use crate::error::SimError;
use crate::from_angle;
use crate::settings::{AdversaryType, SpawnSettings, Viewport};

#[derive(Debug, Clone)]
pub struct Spawner {
    types: Vec<AdversaryType>,
    settings: SpawnSettings,
    /// Distance from the avatar at which adversaries appear
    distance: f32,
    /// Seconds until the next wave; starts at 0 so the first tick spawns
    timer: f32,
    waves: u32,
}

impl Spawner {
    pub fn new(types: Vec<AdversaryType>, settings: SpawnSettings, viewport: Viewport) -> Self {
        Self {
            types,
            settings,
            distance: viewport.half_diagonal() + settings.margin,
            timer: 0.0,
            waves: 0,
        }
    }

    pub fn spawn_distance(&self) -> f32 {
        self.distance
    }

    pub fn timer(&self) -> f32 {
        self.timer
    }

    /// Adversaries per wave at the given coefficient
    pub fn wave_size(&self, coef: Coefficients) -> usize {
        (self.settings.base_wave_size as f32 * coef.spawn).floor().max(0.0) as usize
    }

    /// Seconds between waves at the given coefficient
    pub fn interval(&self, coef: Coefficients) -> f32 {
        self.settings.base_interval / coef.spawn.max(f32::EPSILON)
    }

    /// Types whose unlock time has passed, in table order
    pub fn eligible(&self, elapsed: f32) -> impl Iterator<Item = &AdversaryType> {
        self.types.iter().filter(move |t| t.unlock_time <= elapsed)
    }

    /// Weighted draw among eligible types. Falls back to the first eligible
    /// type if rounding leaves a remainder.
    pub fn choose_type<R: Rng + ?Sized>(&self, elapsed: f32, rng: &mut R) -> Option<&AdversaryType> {
        let first = self.eligible(elapsed).next()?;
        let total: f32 = self.eligible(elapsed).map(|t| t.spawn_weight).sum();
        if !(total > 0.0 && total.is_finite()) {
            return Some(first);
        }

        let mut roll = rng.random_range(0.0..total);
        for t in self.eligible(elapsed) {
            roll -= t.spawn_weight;
            if roll <= 0.0 {
                return Some(t);
            }
        }
        Some(first)
    }

    /// Random point on the spawn ring around `center`
    pub fn spawn_position<R: Rng + ?Sized>(&self, center: Vec2, rng: &mut R) -> Vec2 {
        let angle = rng.random_range(0.0..TAU);
        center + from_angle(angle) * self.distance
    }

    /// Count down and emit a wave when the timer elapses
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        elapsed: f32,
        coef: Coefficients,
        center: Vec2,
        ids: &mut IdAllocator,
        rng: &mut R,
    ) -> Vec<Adversary> {
        self.timer -= dt;
        if self.timer > 0.0 {
            return Vec::new();
        }

        let count = self.wave_size(coef);
        let mut wave = Vec::with_capacity(count);
        for _ in 0..count {
            let Some(kind) = self.choose_type(elapsed, rng) else {
                break;
            };
            let pos = self.spawn_position(center, rng);
            wave.push(Adversary::spawn(ids.next_id(), kind, pos, coef));
        }

        self.timer = self.interval(coef);
        self.waves += 1;
        log::debug!(
            "Wave {}: {} adversaries at t={:.1}s (next in {:.2}s)",
            self.waves,
            wave.len(),
            elapsed,
            self.timer
        );
        wave
    }

    /// Spawn `count` adversaries immediately, of a named type or drawn from
    /// the unlocked pool. Does not touch the wave timer.
    pub fn spawn_burst<R: Rng + ?Sized>(
        &self,
        count: usize,
        kind: Option<&str>,
        elapsed: f32,
        coef: Coefficients,
        center: Vec2,
        ids: &mut IdAllocator,
        rng: &mut R,
    ) -> Result<Vec<Adversary>, SimError> {
        let named = match kind {
            Some(name) => Some(
                self.types
                    .iter()
                    .find(|t| t.name == name)
                    .ok_or_else(|| SimError::UnknownAdversary(name.to_string()))?,
            ),
            None => None,
        };

        let mut burst = Vec::with_capacity(count);
        for _ in 0..count {
            let Some(t) = named.or_else(|| self.choose_type(elapsed, rng)) else {
                break;
            };
            let pos = self.spawn_position(center, rng);
            burst.push(Adversary::spawn(ids.next_id(), t, pos, coef));
        }
        Ok(burst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{Settings, default_adversaries};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn spawner() -> Spawner {
        let s = Settings::default();
        Spawner::new(s.adversaries, s.spawn, s.viewport)
    }

    #[test]
    fn test_first_tick_spawns_wave() {
        let mut sp = spawner();
        let mut ids = IdAllocator::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let wave = sp.update(0.016, 0.016, Coefficients::IDENTITY, Vec2::ZERO, &mut ids, &mut rng);
        assert_eq!(wave.len(), 3);
        assert!((sp.timer() - 2.0).abs() < 1e-6);
        assert!(wave.iter().all(|a| a.kind == "zombie"));

        let wave = sp.update(0.016, 0.032, Coefficients::IDENTITY, Vec2::ZERO, &mut ids, &mut rng);
        assert!(wave.is_empty());
    }

    #[test]
    fn test_wave_scales_with_coefficient() {
        let mut sp = spawner();
        let coef = Coefficients {
            spawn: 2.5,
            hp: 1.0,
            damage: 1.0,
        };
        let mut ids = IdAllocator::default();
        let mut rng = Pcg32::seed_from_u64(2);
        let wave = sp.update(0.016, 300.0, coef, Vec2::ZERO, &mut ids, &mut rng);
        assert_eq!(wave.len(), 7); // floor(3 * 2.5)
        assert!((sp.timer() - 0.8).abs() < 1e-5);
        let ids: Vec<u32> = wave.iter().map(|a| a.id).collect();
        assert_eq!(ids, (1..=7).collect::<Vec<_>>());
    }

    #[test]
    fn test_spawn_ring_distance() {
        let sp = spawner();
        let expected = (1280.0f32 * 1280.0 + 720.0 * 720.0).sqrt() / 2.0 + 50.0;
        assert!((sp.spawn_distance() - expected).abs() < 1e-3);

        let mut rng = Pcg32::seed_from_u64(3);
        let center = Vec2::new(100.0, -40.0);
        for _ in 0..50 {
            let p = sp.spawn_position(center, &mut rng);
            assert!((p.distance(center) - expected).abs() < 1e-2);
        }
    }

    #[test]
    fn test_locked_types_never_drawn() {
        let sp = spawner();
        let mut rng = Pcg32::seed_from_u64(4);
        for _ in 0..1000 {
            let t = sp.choose_type(59.0, &mut rng).unwrap();
            assert!(t.name == "zombie" || t.name == "bat");
        }
    }

    #[test]
    fn test_weighted_draw_converges() {
        let sp = spawner();
        let table = default_adversaries();
        let mut rng = Pcg32::seed_from_u64(5);
        let draws = 100_000;
        let mut counts = vec![0u32; table.len()];
        for _ in 0..draws {
            let t = sp.choose_type(200.0, &mut rng).unwrap();
            let i = table.iter().position(|row| row.name == t.name).unwrap();
            counts[i] += 1;
        }
        for (row, count) in table.iter().zip(counts) {
            let freq = count as f32 / draws as f32;
            let expected = row.spawn_weight / 100.0;
            assert!(
                (freq - expected).abs() < 0.01,
                "{}: {freq} vs {expected}",
                row.name
            );
        }
    }

    #[test]
    fn test_overflowing_weights_fall_back_to_first() {
        let s = Settings::default();
        let mut types = s.adversaries;
        for t in &mut types {
            t.spawn_weight = 3.0e38;
            t.unlock_time = 0.0;
        }
        let sp = Spawner::new(types, s.spawn, s.viewport);
        let mut rng = Pcg32::seed_from_u64(7);
        assert_eq!(sp.choose_type(0.0, &mut rng).map(|t| t.name.as_str()), Some("zombie"));
    }

    #[test]
    fn test_burst_named_and_unknown() {
        let sp = spawner();
        let mut ids = IdAllocator::default();
        let mut rng = Pcg32::seed_from_u64(6);
        let burst = sp
            .spawn_burst(4, Some("golem"), 0.0, Coefficients::IDENTITY, Vec2::ZERO, &mut ids, &mut rng)
            .unwrap();
        assert_eq!(burst.len(), 4);
        assert!(burst.iter().all(|a| a.kind == "golem"));

        let before = ids.clone().next_id();
        let err = sp.spawn_burst(2, Some("dragon"), 0.0, Coefficients::IDENTITY, Vec2::ZERO, &mut ids, &mut rng);
        assert!(matches!(err, Err(SimError::UnknownAdversary(name)) if name == "dragon"));
        assert_eq!(ids.next_id(), before);
    }
}
