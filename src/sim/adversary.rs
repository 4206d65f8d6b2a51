//! Hostile agents and their movement state machines

use std::f32::consts::FRAC_PI_2;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::difficulty::Coefficients;
use super::entity::{Body, EntityId, Simulated};
use crate::consts::HIT_FLASH;
use crate::settings::AdversaryType;
use crate::{angle_of, direction_to, from_angle};

/// Charger: frozen wind-up before the dash (seconds)
pub const WINDUP_TIME: f32 = 0.5;
/// Charger: dash duration (seconds)
pub const CHARGE_TIME: f32 = 0.6;
/// Charger: frozen recovery after the dash (seconds)
pub const RECOVERY_TIME: f32 = 0.5;
/// Erratic: redraw interval range (seconds)
pub const ERRATIC_INTERVAL: std::ops::Range<f32> = 0.15..0.35;

/// Behavior selected per adversary type (configuration form)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BehaviorKind {
    Chase,
    Erratic,
    Charger {
        charge_speed: f32,
        preferred_distance: f32,
    },
    Tank,
}

/// Phases of the charger cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChargePhase {
    Approaching,
    Winding,
    Charging,
    Cooldown,
}

/// Runtime behavior state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Behavior {
    Chase,
    Erratic {
        /// Deflection from the avatar-facing direction (radians)
        deflection: f32,
        /// Time until the next deflection draw
        timer: f32,
    },
    Charger {
        phase: ChargePhase,
        timer: f32,
        direction: Vec2,
        charge_speed: f32,
        preferred_distance: f32,
    },
    Tank,
}

impl From<BehaviorKind> for Behavior {
    fn from(kind: BehaviorKind) -> Self {
        match kind {
            BehaviorKind::Chase => Behavior::Chase,
            BehaviorKind::Erratic => Behavior::Erratic {
                deflection: 0.0,
                timer: 0.0,
            },
            BehaviorKind::Charger {
                charge_speed,
                preferred_distance,
            } => Behavior::Charger {
                phase: ChargePhase::Approaching,
                timer: 0.0,
                direction: Vec2::ZERO,
                charge_speed,
                preferred_distance,
            },
            BehaviorKind::Tank => Behavior::Tank,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Adversary {
    pub id: EntityId,
    /// Type tag from the adversary table
    pub kind: String,
    pub body: Body,
    pub max_health: f32,
    pub health: f32,
    pub speed: f32,
    /// Contact damage dealt to the avatar
    pub damage: f32,
    pub xp_value: u32,
    pub behavior: Behavior,
    /// Seconds of hit flash remaining (presentation only)
    pub flash: f32,
}

impl Adversary {
    /// Instantiate from a table row, scaling hp and damage by the current
    /// difficulty. Scaling happens here only; the adversary never rescales.
    pub fn spawn(id: EntityId, kind: &AdversaryType, pos: Vec2, coef: Coefficients) -> Self {
        // Flooring a fractional table entry must not spawn a corpse
        let max_health = (kind.max_health * coef.hp).floor().max(1.0);
        Self {
            id,
            kind: kind.name.clone(),
            body: Body::new(pos, kind.radius),
            max_health,
            health: max_health,
            speed: kind.speed,
            damage: (kind.damage * coef.damage).floor(),
            xp_value: kind.xp_value,
            behavior: kind.behavior.into(),
            flash: 0.0,
        }
    }

    /// Apply damage. Returns true if this hit killed the adversary.
    /// Inactive adversaries ignore damage.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if !self.body.active {
            return false;
        }
        self.health -= amount;
        self.flash = HIT_FLASH;
        if self.health <= 0.0 {
            self.body.active = false;
            return true;
        }
        false
    }

    /// Current charger phase, if this is a charger
    pub fn charge_phase(&self) -> Option<ChargePhase> {
        match self.behavior {
            Behavior::Charger { phase, .. } => Some(phase),
            _ => None,
        }
    }

    pub fn update<R: Rng + ?Sized>(&mut self, dt: f32, target: Vec2, rng: &mut R) {
        self.update_behavior(dt, target, rng);
        if self.flash > 0.0 {
            self.flash -= dt;
        }
        self.body.integrate(dt);
    }

    /// Recompute velocity from the behavior state machine
    pub fn update_behavior<R: Rng + ?Sized>(&mut self, dt: f32, target: Vec2, rng: &mut R) {
        let pos = self.body.pos;
        let speed = self.speed;

        self.body.vel = match &mut self.behavior {
            Behavior::Chase | Behavior::Tank => direction_to(pos, target) * speed,

            Behavior::Erratic { deflection, timer } => {
                *timer -= dt;
                if *timer <= 0.0 {
                    *deflection = rng.random_range(-FRAC_PI_2..FRAC_PI_2);
                    *timer = rng.random_range(ERRATIC_INTERVAL);
                }
                let base = angle_of(target - pos);
                from_angle(base + *deflection) * speed
            }

            Behavior::Charger {
                phase,
                timer,
                direction,
                charge_speed,
                preferred_distance,
            } => match *phase {
                ChargePhase::Approaching => {
                    if pos.distance(target) < *preferred_distance {
                        *phase = ChargePhase::Winding;
                        *timer = WINDUP_TIME;
                        *direction = direction_to(pos, target);
                        Vec2::ZERO
                    } else {
                        direction_to(pos, target) * speed
                    }
                }
                ChargePhase::Winding => {
                    *timer -= dt;
                    if *timer <= 0.0 {
                        *phase = ChargePhase::Charging;
                        *timer = CHARGE_TIME;
                    }
                    Vec2::ZERO
                }
                ChargePhase::Charging => {
                    let vel = *direction * *charge_speed;
                    *timer -= dt;
                    if *timer <= 0.0 {
                        *phase = ChargePhase::Cooldown;
                        *timer = RECOVERY_TIME;
                    }
                    vel
                }
                ChargePhase::Cooldown => {
                    *timer -= dt;
                    if *timer <= 0.0 {
                        *phase = ChargePhase::Approaching;
                    }
                    Vec2::ZERO
                }
            },
        };
    }
}

impl Simulated for Adversary {
    fn body(&self) -> &Body {
        &self.body
    }
    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::default_adversaries;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn make(name: &str, pos: Vec2) -> Adversary {
        let table = default_adversaries();
        let kind = table.iter().find(|t| t.name == name).unwrap();
        Adversary::spawn(1, kind, pos, Coefficients::IDENTITY)
    }

    #[test]
    fn test_spawn_scales_once() {
        let table = default_adversaries();
        let zombie = &table[0];
        let coef = Coefficients {
            spawn: 1.0,
            hp: 1.1,
            damage: 1.5,
        };
        let adv = Adversary::spawn(3, zombie, Vec2::ZERO, coef);
        assert_eq!(adv.max_health, 16.0); // floor(15 * 1.1)
        assert_eq!(adv.health, 16.0);
        assert_eq!(adv.damage, 15.0);
    }

    #[test]
    fn test_spawn_health_never_floors_to_zero() {
        let mut wisp = default_adversaries()[1].clone();
        wisp.max_health = 0.5;
        let adv = Adversary::spawn(4, &wisp, Vec2::ZERO, Coefficients::IDENTITY);
        assert_eq!(adv.max_health, 1.0);
        assert!(adv.body.active);
    }

    #[test]
    fn test_chase_points_at_target() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut adv = make("zombie", Vec2::new(100.0, 0.0));
        adv.update_behavior(0.016, Vec2::ZERO, &mut rng);
        assert!((adv.body.vel - Vec2::new(-adv.speed, 0.0)).length() < 1e-3);
    }

    #[test]
    fn test_chase_on_top_of_target_is_still() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut adv = make("golem", Vec2::ZERO);
        adv.update_behavior(0.016, Vec2::ZERO, &mut rng);
        assert_eq!(adv.body.vel, Vec2::ZERO);
    }

    #[test]
    fn test_erratic_deflection_bounded_and_persistent() {
        let mut rng = Pcg32::seed_from_u64(42);
        let mut adv = make("bat", Vec2::new(200.0, 0.0));
        let facing = std::f32::consts::PI; // toward origin

        adv.update_behavior(0.01, Vec2::ZERO, &mut rng);
        let (first, timer) = match adv.behavior {
            Behavior::Erratic { deflection, timer } => (deflection, timer),
            _ => unreachable!(),
        };
        assert!((-FRAC_PI_2..FRAC_PI_2).contains(&first));
        assert!(ERRATIC_INTERVAL.contains(&timer));
        assert!((adv.body.vel.length() - adv.speed).abs() < 1e-3);
        let heading = crate::normalize_angle(angle_of(adv.body.vel) - facing);
        assert!((heading - first).abs() < 1e-3);

        // A short step keeps the same deflection
        adv.update_behavior(0.01, Vec2::ZERO, &mut rng);
        match adv.behavior {
            Behavior::Erratic { deflection, .. } => assert_eq!(deflection, first),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_charger_cycle_sequence_and_durations() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut adv = make("skeleton", Vec2::new(400.0, 0.0));
        let (charge_speed, preferred) = match adv.behavior {
            Behavior::Charger {
                charge_speed,
                preferred_distance,
                ..
            } => (charge_speed, preferred_distance),
            _ => unreachable!(),
        };
        assert!(adv.body.pos.distance(Vec2::ZERO) > preferred);
        let target = Vec2::ZERO;
        let dt = 0.01;

        // Approach until inside preferred distance
        let mut steps = 0;
        while adv.charge_phase() == Some(ChargePhase::Approaching) {
            assert!((adv.body.vel.length() - adv.speed).abs() < 1e-3 || steps == 0);
            adv.update(dt, target, &mut rng);
            steps += 1;
            assert!(steps < 100_000);
        }
        assert_eq!(adv.charge_phase(), Some(ChargePhase::Winding));
        assert_eq!(adv.body.vel, Vec2::ZERO);
        let captured = match adv.behavior {
            Behavior::Charger { direction, .. } => direction,
            _ => unreachable!(),
        };
        assert!((captured - Vec2::new(-1.0, 0.0)).length() < 1e-3);

        let mut sequence = vec![ChargePhase::Winding];
        let mut durations = Vec::new();
        let mut in_phase = 0.0f32;
        while sequence.len() < 4 {
            let before = adv.body.pos;
            let phase = adv.charge_phase();
            // Move the target around: charging must ignore it
            adv.update(dt, Vec2::new(0.0, 500.0), &mut rng);
            in_phase += dt;
            match phase {
                Some(ChargePhase::Winding) | Some(ChargePhase::Cooldown) => {
                    assert_eq!(adv.body.pos, before)
                }
                Some(ChargePhase::Charging) => {
                    assert!((adv.body.vel - captured * charge_speed).length() < 1e-3)
                }
                _ => {}
            }
            let now = adv.charge_phase().unwrap();
            if Some(now) != phase {
                sequence.push(now);
                durations.push(in_phase);
                in_phase = 0.0;
            }
        }

        assert_eq!(
            sequence,
            vec![
                ChargePhase::Winding,
                ChargePhase::Charging,
                ChargePhase::Cooldown,
                ChargePhase::Approaching
            ]
        );
        for (measured, expected) in durations.iter().zip([WINDUP_TIME, CHARGE_TIME, RECOVERY_TIME]) {
            assert!(
                (measured - expected).abs() <= dt + 1e-4,
                "phase lasted {measured}, expected {expected}"
            );
        }
    }

    #[test]
    fn test_take_damage_deactivates_once() {
        let mut adv = make("zombie", Vec2::ZERO);
        assert!(!adv.take_damage(10.0));
        assert!(adv.take_damage(10.0));
        assert!(!adv.body.active);
        let health = adv.health;
        assert!(!adv.take_damage(10.0));
        assert_eq!(adv.health, health);
    }
}
