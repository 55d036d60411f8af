//! Per-particle time integration kernels.
//!
//! Each kernel touches one particle and nothing else, so a backend may run
//! it as a plain loop or as a parallel dispatch without changing results.

use crate::float::Float;
use crate::particle::Particle;
use crate::vec::{Vec, Vec3};

/// How a body advances its particles under external acceleration.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Integration<F: Float> {
    /// Position Verlet with implicit velocity (cloth).
    ///
    /// `v = (x - x_prev) * damping; x_prev = x; x += v + a * dt²`
    Verlet { acceleration: Vec3<F>, damping: F },
    /// Semi-implicit Euler on an explicit velocity (soft body). The previous
    /// position is recorded so velocity can be rebuilt after projection.
    ///
    /// `v = (v + g * dt) * damping; x_prev = x; x += v * dt`
    SemiImplicitEuler { gravity: Vec3<F>, damping: F },
}

impl<F: Float> Integration<F> {
    /// Advance one particle by `dt`. Pinned particles are left untouched.
    #[inline]
    pub fn apply(&self, p: &mut Particle<Vec3<F>>, dt: F) {
        if p.is_pinned() {
            return;
        }
        match *self {
            Integration::Verlet { acceleration, damping } => {
                let velocity = p.displacement().scale(damping);
                p.prev_pos = p.pos;
                p.pos = p.pos + velocity + acceleration.scale(dt * dt);
            }
            Integration::SemiImplicitEuler { gravity, damping } => {
                p.velocity = (p.velocity + gravity.scale(dt)).scale(damping);
                p.prev_pos = p.pos;
                p.pos = p.pos + p.velocity.scale(dt);
            }
        }
    }
}
