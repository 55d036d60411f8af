//! Errors reported when a body cannot be constructed.
//!
//! Runtime mutators never fail: out-of-range indices and unknown handles are
//! no-ops, degenerate constraints are skipped for the pass.

use core::fmt;

/// Errors that can occur while building a body.
#[derive(Debug, Clone, PartialEq)]
pub enum PhysicsError {
    /// Stiffness must be in (0, 1].
    InvalidStiffness,
    /// Damping must be in (0, 1].
    InvalidDamping,
    /// At least one constraint iteration is required.
    InvalidIterations,
    /// Pressure must be finite and non-negative.
    InvalidPressure,
    /// Gravity scale must be finite.
    InvalidGravityScale,
    /// Maximum delta time must be positive and finite.
    InvalidMaxDeltaTime,
    /// Grid dimensions must be at least 2x2.
    InvalidGridDimensions { cols: usize, rows: usize },
    /// Grid spacing must be positive and finite.
    InvalidRestDistance,
    /// Source mesh has no vertices or no triangles.
    EmptyMesh,
    /// Source mesh has no index buffer; volume preservation needs triangles.
    MissingIndexBuffer,
    /// Index buffer length is not a multiple of three.
    MalformedIndexBuffer { len: usize },
    /// A triangle references a vertex that does not exist.
    IndexOutOfBounds { index: usize, count: usize },
    /// Source mesh contains a non-finite vertex position.
    NonFiniteVertex { index: usize },
}

impl fmt::Display for PhysicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhysicsError::InvalidStiffness => write!(f, "stiffness must be in (0, 1]"),
            PhysicsError::InvalidDamping => write!(f, "damping must be in (0, 1]"),
            PhysicsError::InvalidIterations => write!(f, "at least one solver iteration is required"),
            PhysicsError::InvalidPressure => write!(f, "pressure must be finite and non-negative"),
            PhysicsError::InvalidGravityScale => write!(f, "gravity scale must be finite"),
            PhysicsError::InvalidMaxDeltaTime => write!(f, "max delta time must be positive and finite"),
            PhysicsError::InvalidGridDimensions { cols, rows } => {
                write!(f, "grid must be at least 2x2 (got {}x{})", cols, rows)
            }
            PhysicsError::InvalidRestDistance => write!(f, "grid spacing must be positive and finite"),
            PhysicsError::EmptyMesh => write!(f, "source mesh has no vertices or triangles"),
            PhysicsError::MissingIndexBuffer => write!(f, "source mesh has no index buffer"),
            PhysicsError::MalformedIndexBuffer { len } => {
                write!(f, "index buffer length {} is not a multiple of 3", len)
            }
            PhysicsError::IndexOutOfBounds { index, count } => {
                write!(f, "vertex index {} out of bounds (count: {})", index, count)
            }
            PhysicsError::NonFiniteVertex { index } => {
                write!(f, "vertex {} has a non-finite position", index)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PhysicsError {}
