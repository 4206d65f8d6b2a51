//! Time-keyed difficulty scaling
//!
//! Coefficients are a pure function of elapsed time: piecewise-linear between
//! the two breakpoints bracketing `t`, clamped to the first/last row outside
//! the table. Nothing accumulates, so recomputing for the same time is
//! idempotent.

use serde::{Deserialize, Serialize};

/// One row of the breakpoint table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint {
    /// Elapsed time in seconds
    pub time: f32,
    pub spawn: f32,
    pub hp: f32,
    pub damage: f32,
}

impl Breakpoint {
    pub const fn new(time: f32, spawn: f32, hp: f32, damage: f32) -> Self {
        Self {
            time,
            spawn,
            hp,
            damage,
        }
    }

    fn coefficients(&self) -> Coefficients {
        Coefficients {
            spawn: self.spawn,
            hp: self.hp,
            damage: self.damage,
        }
    }
}

/// Current scaling factors
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coefficients {
    pub spawn: f32,
    pub hp: f32,
    pub damage: f32,
}

impl Coefficients {
    pub const IDENTITY: Self = Self {
        spawn: 1.0,
        hp: 1.0,
        damage: 1.0,
    };
}

impl Default for Coefficients {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Interpolate the table at time `t`. An empty table yields identity.
pub fn coefficients_at(breakpoints: &[Breakpoint], t: f32) -> Coefficients {
    let (Some(first), Some(last)) = (breakpoints.first(), breakpoints.last()) else {
        return Coefficients::IDENTITY;
    };

    if t >= last.time {
        return last.coefficients();
    }
    if t < first.time {
        return first.coefficients();
    }

    let Some(pair) = breakpoints
        .windows(2)
        .find(|w| t >= w[0].time && t < w[1].time)
    else {
        return last.coefficients();
    };
    let (prev, next) = (&pair[0], &pair[1]);

    let span = next.time - prev.time;
    let progress = if span > 0.0 { (t - prev.time) / span } else { 0.0 };

    Coefficients {
        spawn: lerp(prev.spawn, next.spawn, progress),
        hp: lerp(prev.hp, next.hp, progress),
        damage: lerp(prev.damage, next.damage, progress),
    }
}

#[derive(Debug, Clone)]
pub struct Difficulty {
    breakpoints: Vec<Breakpoint>,
    current: Coefficients,
}

impl Difficulty {
    pub fn new(breakpoints: Vec<Breakpoint>) -> Self {
        let current = coefficients_at(&breakpoints, 0.0);
        Self {
            breakpoints,
            current,
        }
    }

    /// Recompute from elapsed time
    pub fn update(&mut self, elapsed: f32) -> Coefficients {
        self.current = coefficients_at(&self.breakpoints, elapsed);
        self.current
    }

    pub fn current(&self) -> Coefficients {
        self.current
    }
}
