//! Pressure-based soft bodies built from closed triangle meshes.

use crate::backend::BackendKind;
use crate::body::{BodyCore, ImpulseMode};
use crate::buffer::ParticleBuffer;
use crate::collider::{ColliderHandle, ColliderSet, SphereCollider};
use crate::config::SolverConfig;
use crate::error::PhysicsError;
use crate::float::Float;
use crate::integrator::Integration;
use crate::mesh::Mesh;
use crate::observer::{NoOpStepObserver, StepObserver};
use crate::particle::Particle;
use crate::solver::{ConstraintSolver, VolumePreservation};
use crate::topology::TopologyBuilder;
use crate::vec::{Vec, Vec3};
use alloc::vec::Vec as AllocVec;

/// A deformable closed mesh.
///
/// Every unique triangle edge is a distance constraint; a global volume
/// constraint pushes particles along rays from the centroid to keep the
/// enclosed volume near its bind value. Velocities are explicit and rebuilt
/// from the net position change after projection.
pub struct SoftBody<F: Float> {
    core: BodyCore<F>,
}

impl<F: Float> SoftBody<F> {
    /// Bind a soft body to `mesh`.
    ///
    /// Fails when the mesh has no vertices, no index buffer, a malformed index
    /// buffer or a non-finite vertex, or when `config` is out of range.
    pub fn new(mesh: Mesh<F>, config: SolverConfig<F>, compute_capable: bool) -> Result<Self, PhysicsError> {
        if let Some(index) = mesh.positions().iter().position(|p| !p.is_finite()) {
            return Err(PhysicsError::NonFiniteVertex { index });
        }
        let topo = TopologyBuilder::from_mesh(&mesh)?;
        let particles = ParticleBuffer::from_positions(&topo.positions);
        let volume = VolumePreservation::new(topo.triangles, topo.volume);
        let solver = ConstraintSolver::new(topo.constraints);

        let core = BodyCore::new(particles, solver, Some(volume), mesh, config, compute_capable)?;
        log::debug!(
            "soft body: {} particles, {} edges, rest volume {}, {:?} backend",
            core.particles.len(),
            core.solver.constraint_count(),
            topo.volume.rest_volume.to_f32(),
            core.backend_kind(),
        );
        Ok(SoftBody { core })
    }

    /// Whether integration runs on the batch backend.
    pub fn uses_batch_backend(&self) -> bool {
        self.core.backend_kind() == BackendKind::Batch
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.core.backend_kind()
    }

    /// Advance the body by `dt` seconds (clamped to the configured ceiling).
    pub fn update(&mut self, dt: F) {
        self.update_observed(dt, &mut NoOpStepObserver);
    }

    pub fn update_observed<O: StepObserver>(&mut self, dt: F, observer: &mut O) {
        let config = &self.core.config;
        let kernel = Integration::SemiImplicitEuler {
            gravity: config.gravity.scale(config.gravity_scale),
            damping: config.damping,
        };
        self.core.step(dt, kernel, true, observer);
    }

    /// Add velocity `normalize(direction) * strength * (1 - d / radius)` to
    /// every movable particle within `radius` of `point`. Returns the number
    /// of particles affected.
    pub fn apply_impulse(&mut self, point: Vec3<F>, direction: Vec3<F>, strength: F, radius: F) -> usize {
        self.core.apply_impulse(point, direction, strength, radius, ImpulseMode::Velocity)
    }

    /// Anchor a particle. Out-of-range indices are ignored.
    pub fn pin_vertex(&mut self, index: usize) {
        self.core.particles.pin(index);
    }

    pub fn unpin_vertex(&mut self, index: usize) {
        self.core.particles.unpin(index);
    }

    /// Set a particle's inverse mass; zero pins it. Heavier particles
    /// (smaller inverse mass) take a smaller share of edge corrections.
    pub fn set_vertex_mass(&mut self, index: usize, inverse_mass: F) {
        self.core.particles.set_inverse_mass(index, inverse_mass);
    }

    pub fn pinned_indices(&self) -> AllocVec<usize> {
        self.core.particles.pinned_indices().collect()
    }

    pub fn add_sphere_collider(&mut self, center: Vec3<F>, radius: F) -> ColliderHandle {
        self.core.colliders.add(SphereCollider::new(center, radius))
    }

    pub fn remove_sphere_collider(&mut self, handle: ColliderHandle) -> bool {
        self.core.colliders.remove(handle).is_some()
    }

    pub fn colliders(&self) -> &ColliderSet<F> {
        &self.core.colliders
    }

    pub fn colliders_mut(&mut self) -> &mut ColliderSet<F> {
        &mut self.core.colliders
    }

    /// Restore bind positions and zero velocities without reallocating.
    pub fn reset(&mut self) {
        self.core.reset();
    }

    pub fn mesh(&self) -> &Mesh<F> {
        &self.core.mesh
    }

    /// Release buffers and this body's handle on the worker pool. Equivalent
    /// to dropping the body.
    pub fn dispose(self) {
        log::debug!("disposing soft body with {} particles", self.core.particles.len());
    }

    /// Current enclosed volume.
    pub fn volume(&self) -> F {
        self.core
            .volume
            .as_ref()
            .map_or(F::zero(), |v| v.current_volume(self.core.particles.as_slice()))
    }

    pub fn rest_volume(&self) -> F {
        self.core.volume.as_ref().map_or(F::zero(), |v| v.rest_volume())
    }

    /// Mean particle position.
    pub fn centroid(&self) -> Vec3<F> {
        self.core.particles.centroid()
    }

    pub fn positions(&self) -> AllocVec<Vec3<F>> {
        self.core.particles.positions()
    }

    pub fn particle(&self, index: usize) -> Option<&Particle<Vec3<F>>> {
        self.core.particles.get(index)
    }

    pub fn particles(&self) -> &[Particle<Vec3<F>>] {
        self.core.particles.as_slice()
    }

    /// Largest relative deviation of any constraint from its rest length.
    pub fn max_strain(&self) -> F {
        self.core.solver.max_strain(self.core.particles.as_slice())
    }

    pub fn config(&self) -> &SolverConfig<F> {
        &self.core.config
    }

    pub fn solver(&self) -> &ConstraintSolver<F> {
        &self.core.solver
    }

    pub fn particle_count(&self) -> usize {
        self.core.particles.len()
    }

    pub fn edge_count(&self) -> usize {
        self.core.solver.constraint_count()
    }
}
