//! Per-body particle storage with a bind-time snapshot for `reset`.

use crate::float::Float;
use crate::particle::Particle;
use crate::solver::stabilize;
use crate::vec::{Vec, Vec3};
use alloc::vec::Vec as AllocVec;

/// Owns every particle of one body.
///
/// The bind-time positions and velocities are captured once at construction
/// and restored in place by [`ParticleBuffer::reset`]; the buffers are never
/// reallocated after that.
#[derive(Clone, Debug)]
pub struct ParticleBuffer<F: Float> {
    particles: AllocVec<Particle<Vec3<F>>>,
    bind_positions: AllocVec<Vec3<F>>,
    bind_velocities: AllocVec<Vec3<F>>,
}

impl<F: Float> ParticleBuffer<F> {
    /// Create one movable particle per position, all with inverse mass one.
    pub fn from_positions(positions: &[Vec3<F>]) -> Self {
        let particles: AllocVec<_> = positions
            .iter()
            .map(|&pos| Particle::new(pos, F::one()))
            .collect();
        ParticleBuffer {
            particles,
            bind_positions: positions.to_vec(),
            bind_velocities: alloc::vec![Vec3::zero(); positions.len()],
        }
    }

    /// Restore position, previous position and velocity to the bind pose.
    /// Pinning and masses are left as they are.
    pub fn reset(&mut self) {
        let snapshot = self.bind_positions.iter().zip(self.bind_velocities.iter());
        for (p, (&pos, &vel)) in self.particles.iter_mut().zip(snapshot) {
            p.pos = pos;
            p.prev_pos = pos;
            p.velocity = vel;
        }
    }

    /// Repair non-finite particles in place; see [`stabilize`].
    pub fn stabilize(&mut self) -> usize {
        stabilize(&mut self.particles, &self.bind_positions)
    }

    pub fn pin(&mut self, index: usize) -> bool {
        match self.particles.get_mut(index) {
            Some(p) => {
                p.pin();
                true
            }
            None => false,
        }
    }

    pub fn unpin(&mut self, index: usize) -> bool {
        match self.particles.get_mut(index) {
            Some(p) => {
                p.unpin();
                true
            }
            None => false,
        }
    }

    pub fn set_inverse_mass(&mut self, index: usize, inv_mass: F) -> bool {
        self.particles
            .get_mut(index)
            .map_or(false, |p| p.set_inv_mass(inv_mass))
    }

    pub fn pinned_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.particles
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_pinned())
            .map(|(i, _)| i)
    }

    pub fn positions(&self) -> AllocVec<Vec3<F>> {
        self.particles.iter().map(|p| p.pos).collect()
    }

    pub fn bind_positions(&self) -> &[Vec3<F>] {
        &self.bind_positions
    }

    pub fn get(&self, index: usize) -> Option<&Particle<Vec3<F>>> {
        self.particles.get(index)
    }

    pub fn as_slice(&self) -> &[Particle<Vec3<F>>] {
        &self.particles
    }

    pub fn as_mut_slice(&mut self) -> &mut [Particle<Vec3<F>>] {
        &mut self.particles
    }

    /// Mean position of all particles.
    pub fn centroid(&self) -> Vec3<F> {
        if self.particles.is_empty() {
            return Vec3::zero();
        }
        let mut sum = Vec3::zero();
        for p in &self.particles {
            sum = sum + p.pos;
        }
        sum.scale(F::one() / F::from_usize(self.particles.len()))
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}
