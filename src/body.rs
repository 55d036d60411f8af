//! State and step pipeline shared by cloth and soft bodies.

use crate::backend::{select_backend, BackendKind, ExecutionBackend};
use crate::buffer::ParticleBuffer;
use crate::collider::ColliderSet;
use crate::config::SolverConfig;
use crate::error::PhysicsError;
use crate::float::Float;
use crate::integrator::Integration;
use crate::mesh::Mesh;
use crate::observer::StepObserver;
use crate::solver::{reconstruct_velocities, ConstraintSolver, VolumePreservation};
use crate::vec::{Vec, Vec3};
use alloc::boxed::Box;

/// How an impulse changes a particle's motion.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum ImpulseMode {
    /// Add to the explicit velocity.
    Velocity,
    /// Shift the Verlet memory so the implied velocity changes.
    Displacement,
}

/// One body's buffers, constraints, colliders and backend.
pub(crate) struct BodyCore<F: Float> {
    pub particles: ParticleBuffer<F>,
    pub solver: ConstraintSolver<F>,
    pub volume: Option<VolumePreservation<F>>,
    pub colliders: ColliderSet<F>,
    pub config: SolverConfig<F>,
    pub mesh: Mesh<F>,
    backend: Box<dyn ExecutionBackend<F>>,
    /// Sub-step length of the most recent update, used to turn velocity
    /// impulses into Verlet displacements.
    last_dt: F,
}

impl<F: Float> BodyCore<F> {
    pub fn new(
        particles: ParticleBuffer<F>,
        solver: ConstraintSolver<F>,
        volume: Option<VolumePreservation<F>>,
        mesh: Mesh<F>,
        config: SolverConfig<F>,
        compute_capable: bool,
    ) -> Result<Self, PhysicsError> {
        config.validate()?;
        let backend = select_backend(compute_capable);
        let last_dt = config.max_delta_time.min(F::from_f32(1.0 / 60.0));
        Ok(BodyCore {
            particles,
            solver,
            volume,
            colliders: ColliderSet::new(),
            config,
            mesh,
            backend,
            last_dt,
        })
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Advance one update: clamp `dt`, run every sub-step through the
    /// pipeline, then write positions back into the mesh.
    ///
    /// Non-positive or non-finite `dt` leaves the body untouched.
    pub fn step<O: StepObserver>(
        &mut self,
        dt: F,
        kernel: Integration<F>,
        reconstruct_velocity: bool,
        observer: &mut O,
    ) {
        if !dt.is_finite() || !(dt > F::zero()) {
            return;
        }
        let dt = dt.min(self.config.max_delta_time);
        let sub_dt = dt / F::from_usize(self.config.sub_steps);

        for _sub in 0..self.config.sub_steps {
            self.backend.integrate(self.particles.as_mut_slice(), &kernel, sub_dt);
            observer.on_integrate();

            let skipped = self.solver.relax(
                self.particles.as_mut_slice(),
                self.config.stiffness,
                self.config.iterations,
                observer,
            );
            if skipped > 0 {
                log::trace!("skipped {} degenerate constraint visits", skipped);
            }

            if let Some(volume) = &self.volume {
                if self.config.pressure > F::zero() {
                    if let Some(ratio) = volume.apply(self.particles.as_mut_slice(), self.config.pressure) {
                        observer.on_volume(ratio.to_f32());
                    }
                }
            }

            let contacts = self.colliders.resolve(self.particles.as_mut_slice());
            observer.on_collide(contacts);

            if reconstruct_velocity {
                reconstruct_velocities(self.particles.as_mut_slice(), sub_dt);
            }

            let repaired = self.particles.stabilize();
            if repaired > 0 {
                log::warn!("recovered {} particles with non-finite state", repaired);
            }
        }

        self.last_dt = sub_dt;
        self.mesh.sync_from(&self.particles);
        observer.on_step_complete();
    }

    /// Apply a radial impulse around `point`, weighted by `1 - d / radius`.
    /// Returns the number of particles affected.
    pub fn apply_impulse(
        &mut self,
        point: Vec3<F>,
        direction: Vec3<F>,
        strength: F,
        radius: F,
        mode: ImpulseMode,
    ) -> usize {
        if !(radius > F::zero()) || !strength.is_finite() || !point.is_finite() {
            return 0;
        }
        let impulse = direction.normalize().scale(strength);
        if impulse == Vec3::zero() {
            return 0;
        }
        let last_dt = self.last_dt;
        let mut affected = 0;
        for p in self.particles.as_mut_slice() {
            if p.is_pinned() {
                continue;
            }
            let d = p.pos.distance(point);
            if d >= radius {
                continue;
            }
            let delta_v = impulse.scale(F::one() - d / radius);
            match mode {
                ImpulseMode::Velocity => p.velocity = p.velocity + delta_v,
                ImpulseMode::Displacement => p.prev_pos = p.prev_pos - delta_v.scale(last_dt),
            }
            affected += 1;
        }
        affected
    }

    /// Restore the bind pose and refresh the mesh.
    pub fn reset(&mut self) {
        self.particles.reset();
        self.mesh.sync_from(&self.particles);
    }
}
