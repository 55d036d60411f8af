//! Verlet cloth built from a procedural grid.

use crate::backend::BackendKind;
use crate::body::{BodyCore, ImpulseMode};
use crate::buffer::ParticleBuffer;
use crate::collider::{ColliderHandle, ColliderSet, SphereCollider};
use crate::config::{ClothConfig, SolverConfig};
use crate::constraint::ConstraintFamily;
use crate::error::PhysicsError;
use crate::float::Float;
use crate::integrator::Integration;
use crate::mesh::Mesh;
use crate::observer::{NoOpStepObserver, StepObserver};
use crate::particle::Particle;
use crate::solver::ConstraintSolver;
use crate::topology::TopologyBuilder;
use crate::vec::{Vec, Vec3};
use alloc::vec::Vec as AllocVec;

/// A cloth sheet: a grid of Verlet particles held by structural, shear and
/// bend constraints.
///
/// Particle at (col, row) has index `row * cols + col`. The sheet starts flat
/// in the XZ plane; row 0 is the edge usually pinned.
pub struct ClothBody<F: Float> {
    core: BodyCore<F>,
    cols: usize,
    rows: usize,
    wind: Vec3<F>,
}

impl<F: Float> ClothBody<F> {
    /// Build the grid topology, particle buffer and mesh.
    ///
    /// `compute_capable` requests the batch backend; when it cannot be used
    /// the body silently runs sequentially. Check [`uses_batch_backend`].
    ///
    /// [`uses_batch_backend`]: ClothBody::uses_batch_backend
    pub fn new(
        shape: &ClothConfig<F>,
        config: SolverConfig<F>,
        compute_capable: bool,
    ) -> Result<Self, PhysicsError> {
        let topo = TopologyBuilder::grid(shape.cols, shape.rows, shape.rest_distance, shape.origin)?;
        let indices = topo
            .triangles
            .iter()
            .flat_map(|t| t.iter().map(|&i| i as u32))
            .collect();
        let particles = ParticleBuffer::from_positions(&topo.positions);
        let mesh = Mesh::new(topo.positions, Some(indices));
        let solver = ConstraintSolver::new(topo.constraints);

        let core = BodyCore::new(particles, solver, None, mesh, config, compute_capable)?;
        log::debug!(
            "cloth {}x{}: {} particles, {} constraints, {:?} backend",
            topo.cols,
            topo.rows,
            core.particles.len(),
            core.solver.constraint_count(),
            core.backend_kind(),
        );
        Ok(ClothBody { core, cols: topo.cols, rows: topo.rows, wind: Vec3::zero() })
    }

    /// Whether integration runs on the batch backend.
    pub fn uses_batch_backend(&self) -> bool {
        self.core.backend_kind() == BackendKind::Batch
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.core.backend_kind()
    }

    /// Advance the cloth by `dt` seconds (clamped to the configured ceiling).
    pub fn update(&mut self, dt: F) {
        self.update_observed(dt, &mut NoOpStepObserver);
    }

    pub fn update_observed<O: StepObserver>(&mut self, dt: F, observer: &mut O) {
        let kernel = Integration::Verlet {
            acceleration: self.core.config.gravity + self.wind,
            damping: self.core.config.damping,
        };
        self.core.step(dt, kernel, false, observer);
    }

    /// Set a constant wind acceleration. `direction` is normalised; a zero
    /// direction or zero strength clears the wind.
    pub fn set_wind(&mut self, direction: Vec3<F>, strength: F) {
        self.wind = direction.normalize().scale(strength);
        if !self.wind.is_finite() {
            self.wind = Vec3::zero();
        }
    }

    pub fn wind(&self) -> Vec3<F> {
        self.wind
    }

    /// Push particles within `radius` of `point`, weighted by `1 - d / radius`.
    /// The change is applied to the implied Verlet velocity.
    pub fn apply_impulse(&mut self, point: Vec3<F>, direction: Vec3<F>, strength: F, radius: F) -> usize {
        self.core.apply_impulse(point, direction, strength, radius, ImpulseMode::Displacement)
    }

    pub fn index(&self, col: usize, row: usize) -> usize {
        row * self.cols + col
    }

    /// Anchor a particle. Out-of-range indices are ignored.
    pub fn pin_vertex(&mut self, index: usize) {
        self.core.particles.pin(index);
    }

    pub fn unpin_vertex(&mut self, index: usize) {
        self.core.particles.unpin(index);
    }

    /// Set a particle's inverse mass; zero pins it.
    pub fn set_vertex_mass(&mut self, index: usize, inverse_mass: F) {
        self.core.particles.set_inverse_mass(index, inverse_mass);
    }

    pub fn pin_top_row(&mut self) {
        for col in 0..self.cols {
            self.pin_vertex(self.index(col, 0));
        }
    }

    pub fn pin_corners(&mut self) {
        self.pin_vertex(self.index(0, 0));
        self.pin_vertex(self.index(self.cols - 1, 0));
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

    /// Restore the bind pose without reallocating.
    pub fn reset(&mut self) {
        self.core.reset();
    }

    /// Geometry kept in sync with the particles after every update.
    pub fn mesh(&self) -> &Mesh<F> {
        &self.core.mesh
    }

    /// Release buffers and this body's handle on the worker pool. Equivalent
    /// to dropping the body.
    pub fn dispose(self) {
        log::debug!("disposing cloth with {} particles", self.core.particles.len());
    }

    pub fn positions(&self) -> AllocVec<Vec3<F>> {
        self.core.particles.positions()
    }

    /// Position of the particle at (col, row), or `None` outside the grid.
    pub fn position_at(&self, col: usize, row: usize) -> Option<Vec3<F>> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.core.particles.get(self.index(col, row)).map(|p| p.pos)
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

    pub fn constraint_count_by_family(&self, family: ConstraintFamily) -> usize {
        self.core.solver.constraints().iter().filter(|c| c.family == family).count()
    }

    pub fn cols(&self) -> usize { self.cols }
    pub fn rows(&self) -> usize { self.rows }
    pub fn particle_count(&self) -> usize { self.core.particles.len() }
    pub fn constraint_count(&self) -> usize { self.core.solver.constraint_count() }
}
