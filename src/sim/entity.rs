//! Shared entity substructure
//!
//! Every simulated object owns a [`Body`]. Producers create entities active;
//! death or expiry only clears the `active` flag and the end-of-tick sweep
//! removes them.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Stable identity of an entity within one world (never reused)
pub type EntityId = u32;

/// Position, velocity, extent and liveness
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub active: bool,
}

impl Body {
    pub fn new(pos: Vec2, radius: f32) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            radius,
            active: true,
        }
    }

    /// Advance position by velocity
    #[inline]
    pub fn integrate(&mut self, dt: f32) {
        self.pos += self.vel * dt;
    }

    /// Circle overlap test (strict: touching circles do not overlap)
    #[inline]
    pub fn overlaps(&self, other: &Body) -> bool {
        self.pos.distance(other.pos) < self.radius + other.radius
    }
}

/// Capability shared by all entity kinds
pub trait Simulated {
    fn body(&self) -> &Body;
    fn body_mut(&mut self) -> &mut Body;

    fn is_active(&self) -> bool {
        self.body().active
    }

    fn deactivate(&mut self) {
        self.body_mut().active = false;
    }
}

/// Drop every inactive entity, preserving order of the survivors
pub fn sweep_inactive<T: Simulated>(entities: &mut Vec<T>) {
    entities.retain(|e| e.is_active());
}

/// Monotonic id source. Starts at 1 so 0 can mean "unassigned".
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: EntityId,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdAllocator {
    pub fn next_id(&mut self) -> EntityId {
        let id = self.next;
        self.next = self.next.wrapping_add(1).max(1);
        id
    }
}

/// Maximum number of distinct adversaries one projectile can remember
pub const HIT_SET_CAPACITY: usize = 16;

/// Fixed-capacity set of adversary ids a projectile already damaged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitSet {
    ids: [EntityId; HIT_SET_CAPACITY],
    len: u8,
}

impl Default for HitSet {
    fn default() -> Self {
        Self {
            ids: [0; HIT_SET_CAPACITY],
            len: 0,
        }
    }
}

impl HitSet {
    pub fn contains(&self, id: EntityId) -> bool {
        self.ids[..self.len as usize].contains(&id)
    }

    /// Record an id. Returns false if it was already present or the set is full.
    pub fn insert(&mut self, id: EntityId) -> bool {
        if self.contains(id) || self.len as usize == HIT_SET_CAPACITY {
            return false;
        }
        self.ids[self.len as usize] = id;
        self.len += 1;
        true
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dummy(Body);

    impl Simulated for Dummy {
        fn body(&self) -> &Body {
            &self.0
        }
        fn body_mut(&mut self) -> &mut Body {
            &mut self.0
        }
    }

    #[test]
    fn test_overlap_is_strict() {
        let a = Body::new(Vec2::ZERO, 5.0);
        let b = Body::new(Vec2::new(10.0, 0.0), 5.0);
        assert!(!a.overlaps(&b));
        let c = Body::new(Vec2::new(9.9, 0.0), 5.0);
        assert!(a.overlaps(&c));
    }

    #[test]
    fn test_integrate() {
        let mut body = Body::new(Vec2::ZERO, 1.0);
        body.vel = Vec2::new(10.0, -20.0);
        body.integrate(0.5);
        assert_eq!(body.pos, Vec2::new(5.0, -10.0));
    }

    #[test]
    fn test_sweep_keeps_order() {
        let mut v: Vec<Dummy> = (0..5)
            .map(|i| Dummy(Body::new(Vec2::new(i as f32, 0.0), 1.0)))
            .collect();
        v[1].deactivate();
        v[3].deactivate();
        sweep_inactive(&mut v);
        let xs: Vec<f32> = v.iter().map(|d| d.body().pos.x).collect();
        assert_eq!(xs, vec![0.0, 2.0, 4.0]);
    }

    #[test]
    fn test_ids_are_unique_and_nonzero() {
        let mut ids = IdAllocator::default();
        let a = ids.next_id();
        let b = ids.next_id();
        assert_eq!(a, 1);
        assert_eq!(b, 2);
    }

    #[test]
    fn test_hit_set_dedup_and_capacity() {
        let mut set = HitSet::default();
        assert!(set.is_empty());
        assert!(set.insert(7));
        assert!(!set.insert(7));
        assert!(set.contains(7));
        assert_eq!(set.len(), 1);
        for id in 100..(100 + HIT_SET_CAPACITY as u32) {
            set.insert(id);
        }
        assert_eq!(set.len(), HIT_SET_CAPACITY);
        assert!(!set.insert(9999));
    }
}
