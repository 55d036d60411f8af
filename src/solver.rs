//! Constraint relaxation, volume preservation and post-step bookkeeping.

use crate::constraint::{enclosed_volume, DistanceConstraint, VolumeConstraint};
use crate::float::Float;
use crate::observer::StepObserver;
use crate::particle::Particle;
use crate::vec::{Vec, Vec3};
use alloc::vec::Vec as AllocVec;

/// Pressure corrections smaller than this are skipped to avoid jitter at rest.
pub const PRESSURE_DEADBAND: f32 = 1e-4;

/// Share of the full volume correction applied per unit of pressure.
/// Pressure at or above `1 / PRESSURE_GAIN` applies the whole correction.
pub const PRESSURE_GAIN: f32 = 0.3;

/// Largest radial scale change a single volume pass may apply.
pub const MAX_RADIAL_STEP: f32 = 0.5;

/// Gauss-Seidel relaxation over a fixed, ordered set of distance constraints.
#[derive(Clone, Debug)]
pub struct ConstraintSolver<F: Float> {
    constraints: AllocVec<DistanceConstraint<F>>,
}

impl<F: Float> ConstraintSolver<F> {
    pub fn new(constraints: AllocVec<DistanceConstraint<F>>) -> Self {
        ConstraintSolver { constraints }
    }

    /// Run `iterations` passes over every constraint in stored order.
    ///
    /// Returns how many constraint visits were skipped as degenerate.
    pub fn relax<O: StepObserver>(
        &self,
        particles: &mut [Particle<Vec3<F>>],
        stiffness: F,
        iterations: usize,
        observer: &mut O,
    ) -> usize {
        let mut skipped = 0;
        for i in 0..iterations {
            for c in &self.constraints {
                if !c.solve(particles, stiffness) {
                    skipped += 1;
                }
            }
            observer.on_constraint_iteration(i);
        }
        skipped
    }

    /// Largest absolute relative length error over all constraints.
    pub fn max_strain(&self, particles: &[Particle<Vec3<F>>]) -> F {
        self.constraints
            .iter()
            .map(|c| c.strain(particles).abs())
            .fold(F::zero(), |a, b| a.max(b))
    }

    pub fn constraints(&self) -> &[DistanceConstraint<F>] {
        &self.constraints
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }
}

/// Global volume constraint over a closed triangle mesh.
#[derive(Clone, Debug)]
pub struct VolumePreservation<F: Float> {
    triangles: AllocVec<[usize; 3]>,
    constraint: VolumeConstraint<F>,
}

impl<F: Float> VolumePreservation<F> {
    pub fn new(triangles: AllocVec<[usize; 3]>, constraint: VolumeConstraint<F>) -> Self {
        VolumePreservation { triangles, constraint }
    }

    pub fn rest_volume(&self) -> F {
        self.constraint.rest_volume
    }

    pub fn current_volume(&self, particles: &[Particle<Vec3<F>>]) -> F {
        enclosed_volume(&self.triangles, particles)
    }

    /// Push movable particles along the ray from the centroid so the enclosed
    /// volume moves toward its rest value. Applied once per step.
    ///
    /// Scaling every particle about the centroid by `cbrt(rest / current)`
    /// restores the rest volume exactly; a pass applies the fraction
    /// `min(pressure * PRESSURE_GAIN, 1)` of that scale change, so it never
    /// overshoots and stronger pressure always corrects at least as far.
    ///
    /// Returns the measured ratio `current / rest` before correction, or
    /// `None` when the volume is degenerate and nothing was done.
    pub fn apply(&self, particles: &mut [Particle<Vec3<F>>], pressure: F) -> Option<F> {
        let rest = self.constraint.rest_volume;
        let current = self.current_volume(particles);
        let tiny = F::from_f32(1e-12);
        if !current.is_finite() || current < tiny || rest < tiny || particles.is_empty() {
            return None;
        }
        let ratio = current / rest;

        let pressure_scale = (rest / current - F::one()) * pressure;
        if pressure_scale.abs() < F::from_f32(PRESSURE_DEADBAND) {
            return Some(ratio);
        }

        let mut centroid = Vec3::zero();
        for p in particles.iter() {
            centroid = centroid + p.pos;
        }
        let centroid = centroid.scale(F::one() / F::from_usize(particles.len()));

        let limit = F::from_f32(MAX_RADIAL_STEP);
        let radial = ((rest / current).cbrt() - F::one()).clamp(-limit, limit);
        let step = radial * (pressure * F::from_f32(PRESSURE_GAIN)).min(F::one());
        for p in particles.iter_mut() {
            if p.is_pinned() {
                continue;
            }
            p.pos = p.pos + (p.pos - centroid).scale(step);
        }
        Some(ratio)
    }
}

/// Rebuild explicit velocities from the net position change of the step, so
/// constraint, volume and collision corrections feed back into momentum.
pub fn reconstruct_velocities<F: Float>(particles: &mut [Particle<Vec3<F>>], dt: F) {
    for p in particles.iter_mut() {
        if p.is_pinned() {
            continue;
        }
        p.velocity = p.implied_velocity(dt);
    }
}

/// Replace non-finite particle state so NaN never spreads through a buffer.
///
/// A broken particle goes back to its previous position when that is finite,
/// otherwise to its bind position, and loses its velocity. Returns the number
/// of particles repaired.
pub fn stabilize<F: Float>(particles: &mut [Particle<Vec3<F>>], bind_positions: &[Vec3<F>]) -> usize {
    let mut repaired = 0;
    for (p, &bind) in particles.iter_mut().zip(bind_positions) {
        if p.is_finite() {
            continue;
        }
        let anchor = if p.prev_pos.is_finite() { p.prev_pos } else { bind };
        p.pos = anchor;
        p.prev_pos = anchor;
        p.velocity = Vec3::zero();
        repaired += 1;
    }
    repaired
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::ConstraintFamily;
    use crate::observer::NoOpStepObserver;

    fn chain(stretch: f32) -> (AllocVec<Particle<Vec3<f32>>>, ConstraintSolver<f32>) {
        let particles: AllocVec<_> = (0..5)
            .map(|i| Particle::new(Vec3::new(i as f32 * stretch, 0.0, 0.0), 1.0))
            .collect();
        let constraints = (0..4)
            .map(|i| DistanceConstraint::new(i, i + 1, 1.0, ConstraintFamily::Edge))
            .collect();
        (particles, ConstraintSolver::new(constraints))
    }

    #[test]
    fn more_iterations_converge_further() {
        let (mut few, solver) = chain(1.5);
        let mut many = few.clone();
        solver.relax(&mut few, 0.5, 2, &mut NoOpStepObserver);
        solver.relax(&mut many, 0.5, 100, &mut NoOpStepObserver);
        assert!(solver.max_strain(&many) < solver.max_strain(&few));
        assert!(solver.max_strain(&many) < 1e-3);
    }

    #[test]
    fn observer_sees_every_iteration() {
        struct Count(usize);
        impl StepObserver for Count {
            fn on_constraint_iteration(&mut self, _iteration: usize) {
                self.0 += 1;
            }
        }
        let (mut particles, solver) = chain(1.0);
        let mut count = Count(0);
        solver.relax(&mut particles, 1.0, 7, &mut count);
        assert_eq!(count.0, 7);
    }

    #[test]
    fn stabilize_repairs_nan() {
        let bind = [Vec3::new(1.0f32, 2.0, 3.0)];
        let mut particles = [Particle::new(bind[0], 1.0)];
        particles[0].pos = Vec3::new(f32::NAN, 0.0, 0.0);
        particles[0].prev_pos = Vec3::new(f32::INFINITY, 0.0, 0.0);
        assert_eq!(stabilize(&mut particles, &bind), 1);
        assert_eq!(particles[0].pos, bind[0]);
        assert!(particles[0].is_finite());
    }

    #[test]
    fn velocity_rebuilt_from_displacement() {
        let mut particles = [Particle::new(Vec3::new(0.0f32, 1.0, 0.0), 1.0)];
        particles[0].prev_pos = Vec3::new(0.0, 1.5, 0.0);
        reconstruct_velocities(&mut particles, 0.5);
        assert!((particles[0].velocity.y + 1.0).abs() < 1e-6);
    }

    fn crushed_cube() -> (AllocVec<Particle<Vec3<f32>>>, VolumePreservation<f32>) {
        let topo = crate::topology::TopologyBuilder::from_mesh(&crate::mesh::Mesh::cube(1.0f32)).unwrap();
        let particles = topo
            .positions
            .iter()
            .map(|&p| Particle::new(Vec3::new(p.x, p.y * 0.5, p.z), 1.0))
            .collect();
        (particles, VolumePreservation::new(topo.triangles, topo.volume))
    }

    #[test]
    fn saturated_pressure_restores_volume_in_one_pass() {
        for &pressure in &[1.0 / PRESSURE_GAIN, 20.0, 1e6] {
            let (mut particles, volume) = crushed_cube();
            volume.apply(&mut particles, pressure);
            let v = volume.current_volume(&particles);
            assert!((v - 1.0).abs() < 1e-4, "pressure {} gave volume {}", pressure, v);
        }
    }

    #[test]
    fn volume_pass_never_overshoots() {
        let mut last_error = f32::MAX;
        for &pressure in &[0.5f32, 1.0, 2.0, 4.0, 8.0, 20.0, 1000.0] {
            let (mut particles, volume) = crushed_cube();
            volume.apply(&mut particles, pressure);
            let v = volume.current_volume(&particles);
            assert!(v <= 1.0 + 1e-4, "pressure {} overshot to {}", pressure, v);
            let error = (1.0 - v).abs();
            assert!(error <= last_error + 1e-6, "pressure {} error {} > {}", pressure, error, last_error);
            last_error = error;
        }
    }

    #[test]
    fn radial_step_is_bounded() {
        let (mut particles, volume) = crushed_cube();
        for p in particles.iter_mut() {
            p.pos.y *= 1e-3;
        }
        let before: AllocVec<_> = particles.iter().map(|p| p.pos).collect();
        volume.apply(&mut particles, 1e6);
        let centroid = before.iter().fold(Vec3::zero(), |a, &b| a + b).scale(1.0 / 8.0);
        for (p, &b) in particles.iter().zip(&before) {
            let grown = (p.pos - centroid).length() / (b - centroid).length();
            assert!(grown <= 1.0 + MAX_RADIAL_STEP + 1e-5, "grew by {}", grown);
        }
    }
}
