//! Configuration types for bodies and the solver.

use crate::error::PhysicsError;
use crate::float::Float;
use crate::vec::{Vec, Vec3};

/// Solver parameters shared by cloth and soft bodies.
///
/// # Builder Pattern
/// ```
/// use pliant::config::SolverConfig;
/// use pliant::vec::Vec3;
///
/// let config: SolverConfig<f32> = SolverConfig::new()
///     .with_iterations(8)
///     .with_gravity(Vec3::new(0.0, -9.8, 0.0))
///     .with_stiffness(0.9)
///     .with_damping(0.99);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SolverConfig<F: Float> {
    /// Distance-constraint relaxation passes per sub-step. Default: 8.
    pub iterations: usize,
    /// Fraction of the length error corrected per constraint visit, in
    /// (0, 1]. Values near 1 with few iterations can overshoot. Default: 1.
    pub stiffness: F,
    /// Velocity retained per step, in (0, 1]. 1.0 = no damping. Default: 0.99.
    pub damping: F,
    /// Gravity acceleration vector. Default: (0, -9.8, 0).
    pub gravity: Vec3<F>,
    /// Multiplier on gravity for soft bodies. Default: 1.
    pub gravity_scale: F,
    /// Volume preservation strength for soft bodies; 0 disables it. Default: 1.
    pub pressure: F,
    /// Number of sub-steps per update. Default: 1.
    pub sub_steps: usize,
    /// Ceiling applied to `update`'s delta time. Default: 1/30 s.
    pub max_delta_time: F,
}

impl<F: Float> SolverConfig<F> {
    /// Create a new config with default values.
    pub fn new() -> Self {
        SolverConfig {
            iterations: 8,
            stiffness: F::one(),
            damping: F::from_f32(0.99),
            gravity: Vec3::new(F::zero(), F::from_f32(-9.8), F::zero()),
            gravity_scale: F::one(),
            pressure: F::one(),
            sub_steps: 1,
            max_delta_time: F::from_f32(1.0 / 30.0),
        }
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_stiffness(mut self, stiffness: F) -> Self {
        self.stiffness = stiffness;
        self
    }

    pub fn with_damping(mut self, damping: F) -> Self {
        self.damping = damping;
        self
    }

    pub fn with_gravity(mut self, gravity: Vec3<F>) -> Self {
        self.gravity = gravity;
        self
    }

    /// Disable gravity entirely.
    pub fn without_gravity(self) -> Self {
        self.with_gravity(Vec3::zero())
    }

    pub fn with_gravity_scale(mut self, scale: F) -> Self {
        self.gravity_scale = scale;
        self
    }

    pub fn with_pressure(mut self, pressure: F) -> Self {
        self.pressure = pressure;
        self
    }

    /// Set the number of sub-steps (at least one).
    pub fn with_sub_steps(mut self, sub_steps: usize) -> Self {
        self.sub_steps = sub_steps.max(1);
        self
    }

    pub fn with_max_delta_time(mut self, max_delta_time: F) -> Self {
        self.max_delta_time = max_delta_time;
        self
    }

    /// Check every parameter against its documented range.
    pub fn validate(&self) -> Result<(), PhysicsError> {
        let in_unit = |v: F| v.is_finite() && v > F::zero() && v <= F::one();
        if self.iterations == 0 {
            return Err(PhysicsError::InvalidIterations);
        }
        if !in_unit(self.stiffness) {
            return Err(PhysicsError::InvalidStiffness);
        }
        if !in_unit(self.damping) {
            return Err(PhysicsError::InvalidDamping);
        }
        if !self.pressure.is_finite() || self.pressure < F::zero() {
            return Err(PhysicsError::InvalidPressure);
        }
        if !self.gravity_scale.is_finite() {
            return Err(PhysicsError::InvalidGravityScale);
        }
        if !self.max_delta_time.is_finite() || !(self.max_delta_time > F::zero()) {
            return Err(PhysicsError::InvalidMaxDeltaTime);
        }
        Ok(())
    }
}

impl<F: Float> Default for SolverConfig<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// Shape of a procedural cloth grid.
#[derive(Clone, Debug, PartialEq)]
pub struct ClothConfig<F: Float> {
    pub cols: usize,
    pub rows: usize,
    /// Spacing between orthogonal neighbours.
    pub rest_distance: F,
    /// Position of particle (0, 0); the grid extends along +X and +Z.
    pub origin: Vec3<F>,
}

impl<F: Float> ClothConfig<F> {
    pub fn new(cols: usize, rows: usize, rest_distance: F) -> Self {
        ClothConfig { cols, rows, rest_distance, origin: Vec3::zero() }
    }

    pub fn with_origin(mut self, origin: Vec3<F>) -> Self {
        self.origin = origin;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(SolverConfig::<f32>::new().validate().is_ok());
        assert!(SolverConfig::<f64>::default().validate().is_ok());
    }

    #[test]
    fn out_of_range_parameters_rejected() {
        let base = SolverConfig::<f32>::new();
        assert_eq!(base.clone().with_iterations(0).validate(), Err(PhysicsError::InvalidIterations));
        assert_eq!(base.clone().with_stiffness(0.0).validate(), Err(PhysicsError::InvalidStiffness));
        assert_eq!(base.clone().with_stiffness(1.5).validate(), Err(PhysicsError::InvalidStiffness));
        assert_eq!(base.clone().with_damping(0.0).validate(), Err(PhysicsError::InvalidDamping));
        assert_eq!(base.clone().with_pressure(-1.0).validate(), Err(PhysicsError::InvalidPressure));
        assert_eq!(
            base.clone().with_max_delta_time(f32::NAN).validate(),
            Err(PhysicsError::InvalidMaxDeltaTime)
        );
    }

    #[test]
    fn sub_steps_never_zero() {
        assert_eq!(SolverConfig::<f32>::new().with_sub_steps(0).sub_steps, 1);
    }
}
