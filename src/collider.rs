//! Sphere colliders and the projection pass that keeps particles outside them.

use crate::float::Float;
use crate::particle::Particle;
use crate::vec::{Vec, Vec3};
use alloc::vec::Vec as AllocVec;

/// A solid sphere particles are pushed out of.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SphereCollider<F: Float> {
    pub center: Vec3<F>,
    pub radius: F,
}

impl<F: Float> SphereCollider<F> {
    pub fn new(center: Vec3<F>, radius: F) -> Self {
        SphereCollider { center, radius: radius.max(F::zero()) }
    }

    /// Move `pos` onto the surface if it lies inside. Returns whether it moved.
    pub fn project(&self, pos: &mut Vec3<F>) -> bool {
        let offset = *pos - self.center;
        if offset.length_sq() >= self.radius * self.radius {
            return false;
        }
        *pos = self.center + offset.normalize_or(Vec3::up()).scale(self.radius);
        true
    }

    pub fn contains(&self, pos: Vec3<F>) -> bool {
        pos.distance_sq(self.center) < self.radius * self.radius
    }
}

/// Stable identifier returned when a collider is registered.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColliderHandle(u32);

/// Colliders registered with one body, kept in registration order.
#[derive(Clone, Debug)]
pub struct ColliderSet<F: Float> {
    entries: AllocVec<(ColliderHandle, SphereCollider<F>)>,
    next_handle: u32,
}

impl<F: Float> ColliderSet<F> {
    pub fn new() -> Self {
        ColliderSet { entries: AllocVec::new(), next_handle: 0 }
    }

    pub fn add(&mut self, collider: SphereCollider<F>) -> ColliderHandle {
        let handle = ColliderHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);
        self.entries.push((handle, collider));
        handle
    }

    /// Remove a collider, preserving the order of the rest.
    pub fn remove(&mut self, handle: ColliderHandle) -> Option<SphereCollider<F>> {
        let idx = self.entries.iter().position(|(h, _)| *h == handle)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn get(&self, handle: ColliderHandle) -> Option<&SphereCollider<F>> {
        self.entries.iter().find(|(h, _)| *h == handle).map(|(_, c)| c)
    }

    pub fn get_mut(&mut self, handle: ColliderHandle) -> Option<&mut SphereCollider<F>> {
        self.entries.iter_mut().find(|(h, _)| *h == handle).map(|(_, c)| c)
    }

    /// Move a collider, e.g. to follow the object that owns it.
    pub fn set_center(&mut self, handle: ColliderHandle, center: Vec3<F>) -> bool {
        self.get_mut(handle).map(|c| c.center = center).is_some()
    }

    pub fn set_radius(&mut self, handle: ColliderHandle, radius: F) -> bool {
        self.get_mut(handle).map(|c| c.radius = radius.max(F::zero())).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SphereCollider<F>> {
        self.entries.iter().map(|(_, c)| c)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Project every movable particle out of every collider, in registration
    /// order and without re-checking earlier colliders. Returns the number of
    /// projections performed.
    pub fn resolve(&self, particles: &mut [Particle<Vec3<F>>]) -> usize {
        if self.entries.is_empty() {
            return 0;
        }
        let mut contacts = 0;
        for p in particles.iter_mut() {
            if p.is_pinned() {
                continue;
            }
            for (_, collider) in &self.entries {
                if collider.project(&mut p.pos) {
                    contacts += 1;
                }
            }
        }
        contacts
    }
}

impl<F: Float> Default for ColliderSet<F> {
    fn default() -> Self {
        Self::new()
    }
}
