//! Step observer trait for monitoring the simulation pipeline.

/// Hooks fired at each phase boundary of a body update.
///
/// Implement this to profile or debug a body. All methods default to no-ops.
/// Phases fire once per sub-step in pipeline order.
pub trait StepObserver {
    /// Called after every movable particle has been integrated.
    fn on_integrate(&mut self) {}

    /// Called after each distance-constraint relaxation pass.
    fn on_constraint_iteration(&mut self, _iteration: usize) {}

    /// Called after volume preservation with the measured volume ratio
    /// (current / rest). Soft bodies only.
    fn on_volume(&mut self, _ratio: f32) {}

    /// Called after collision projection with the number of contacts.
    fn on_collide(&mut self, _contacts: usize) {}

    /// Called when a step, including mesh sync, is fully complete.
    fn on_step_complete(&mut self) {}
}

/// A no-op observer that does nothing. Use as default when no observation needed.
pub struct NoOpStepObserver;

impl StepObserver for NoOpStepObserver {}
