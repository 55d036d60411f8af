//! Simulation particles: position, Verlet memory, velocity and inverse mass.

use crate::float::Float;
use crate::vec::Vec;

/// A single simulated vertex.
///
/// An inverse mass of zero means the particle is pinned: it is skipped by
/// integration, receives no constraint correction and is never projected by
/// colliders. `free_inv_mass` remembers the value `unpin` restores.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle<V: Vec> {
    pub pos: V,
    pub prev_pos: V,
    /// Explicit velocity. Only soft bodies read it; cloth derives motion from
    /// `pos - prev_pos`.
    pub velocity: V,
    pub inv_mass: V::Scalar,
    pub free_inv_mass: V::Scalar,
}

impl<V: Vec> Particle<V> {
    /// A movable particle at rest with the given inverse mass.
    pub fn new(pos: V, inv_mass: V::Scalar) -> Self {
        let inv_mass = if inv_mass > V::Scalar::zero() { inv_mass } else { V::Scalar::one() };
        Particle {
            pos,
            prev_pos: pos,
            velocity: V::zero(),
            inv_mass,
            free_inv_mass: inv_mass,
        }
    }

    /// A particle anchored in place from the start.
    pub fn pinned(pos: V) -> Self {
        let mut p = Particle::new(pos, V::Scalar::one());
        p.pin();
        p
    }

    pub fn is_pinned(&self) -> bool {
        self.inv_mass <= V::Scalar::zero()
    }

    pub fn pin(&mut self) {
        self.inv_mass = V::Scalar::zero();
        self.prev_pos = self.pos;
        self.velocity = V::zero();
    }

    pub fn unpin(&mut self) {
        if self.is_pinned() {
            self.inv_mass = self.free_inv_mass;
            self.prev_pos = self.pos;
        }
    }

    /// Set the inverse mass directly. Zero pins; positive values also become
    /// the value restored by a later `unpin`. Negative or non-finite input is
    /// ignored and reported as `false`.
    pub fn set_inv_mass(&mut self, inv_mass: V::Scalar) -> bool {
        if !inv_mass.is_finite() || inv_mass < V::Scalar::zero() {
            return false;
        }
        if inv_mass.is_near_zero(V::Scalar::from_f32(1e-12)) {
            self.pin();
        } else {
            self.inv_mass = inv_mass;
            self.free_inv_mass = inv_mass;
        }
        true
    }

    /// Per-step displacement, the implicit Verlet velocity.
    pub fn displacement(&self) -> V {
        self.pos - self.prev_pos
    }

    /// Velocity implied by the last position change over `dt`.
    pub fn implied_velocity(&self, dt: V::Scalar) -> V {
        if dt.is_near_zero(V::Scalar::from_f32(1e-30)) {
            return V::zero();
        }
        self.displacement().scale(V::Scalar::one() / dt)
    }

    pub fn is_finite(&self) -> bool {
        self.pos.is_finite() && self.prev_pos.is_finite() && self.velocity.is_finite()
    }
}
