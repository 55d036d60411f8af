//! Position-based cloth and soft body simulation.
//!
//! `pliant` animates deformable meshes with Verlet / position-based dynamics:
//! a cloth grid held by structural, shear and bend constraints, and closed
//! soft bodies held by their unique edges plus a global volume constraint.
//! Both react to gravity, wind, impulses, pinning and sphere colliders.
//!
//! # Pipeline
//!
//! Every update runs Integrate → Constrain ×N → Volume (soft bodies) →
//! Collide → Velocity rebuild (soft bodies) → stability guard, then copies
//! particle positions into the body's [`Mesh`] and recomputes its normals.
//!
//! # Backends
//!
//! Integration is a per-particle kernel and runs either on a rayon pool
//! ([`backend::BatchBackend`], feature `parallel`) or as a plain loop
//! ([`backend::SequentialBackend`]). Relaxation always runs on the calling
//! thread after integration completes, because each constraint reads what the
//! previous one wrote. The backend is chosen once per body and falls back to
//! sequential with a logged warning; callers never need to care which is active.
//!
//! # Features
//!
//! - `std` (default): implements `std::error::Error` for [`PhysicsError`].
//!   Without it the crate is `no_std` and needs only `alloc`.
//! - `parallel` (default, implies `std`): the rayon batch backend. All batch
//!   bodies share one worker pool.
//!
//! ```
//! use pliant::{ClothBody, ClothConfig, SolverConfig, Vec3};
//!
//! let mut cloth: ClothBody<f32> = ClothBody::new(
//!     &ClothConfig::new(8, 8, 0.25),
//!     SolverConfig::new().with_iterations(6),
//!     true,
//! ).unwrap();
//! cloth.pin_top_row();
//! cloth.add_sphere_collider(Vec3::new(1.0, -1.0, 1.0), 0.5);
//! for _ in 0..30 {
//!     cloth.update(1.0 / 60.0);
//! }
//! assert_eq!(cloth.mesh().vertex_count(), 64);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod float;
pub mod vec;
pub mod particle;
pub mod buffer;
pub mod constraint;
pub mod topology;
pub mod integrator;
pub mod solver;
pub mod collider;
pub mod backend;
pub mod mesh;
mod body;
pub mod cloth;
pub mod softbody;
pub mod observer;
pub mod config;
pub mod error;

// Re-export primary API
pub use float::Float;
pub use vec::{Vec, Vec3};
pub use particle::Particle;
pub use buffer::ParticleBuffer;
pub use constraint::{ConstraintFamily, DistanceConstraint, VolumeConstraint};
pub use topology::{GridTopology, MeshTopology, TopologyBuilder};
pub use integrator::Integration;
pub use solver::{ConstraintSolver, VolumePreservation};
pub use collider::{ColliderHandle, ColliderSet, SphereCollider};
pub use backend::{BackendKind, ExecutionBackend, SequentialBackend};
pub use mesh::Mesh;
pub use cloth::ClothBody;
pub use softbody::SoftBody;
pub use config::{ClothConfig, SolverConfig};
pub use observer::{StepObserver, NoOpStepObserver};
pub use error::PhysicsError;
