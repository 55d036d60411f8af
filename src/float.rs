//! Floating-point abstraction so bodies can run in `f32` or `f64`.

use core::cmp::PartialOrd;
use core::ops::{Add, Div, Mul, Neg, Sub};

/// Scalar operations the simulation needs.
///
/// Implemented for `f32` and `f64`. The `Send + Sync` bounds let the batch
/// backend hand particle slices to worker threads.
pub trait Float:
    Copy
    + Clone
    + PartialEq
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + Default
    + Send
    + Sync
    + 'static
    + core::fmt::Debug
{
    /// The additive identity (0.0).
    fn zero() -> Self;
    /// The multiplicative identity (1.0).
    fn one() -> Self;
    /// Half (0.5).
    fn half() -> Self;
    /// Two (2.0).
    fn two() -> Self;
    /// Pi (~3.14159).
    fn pi() -> Self;
    /// Square root.
    fn sqrt(self) -> Self;
    /// Cube root.
    fn cbrt(self) -> Self;
    /// Sine.
    fn sin(self) -> Self;
    /// Cosine.
    fn cos(self) -> Self;
    /// Absolute value.
    fn abs(self) -> Self;
    /// Minimum of two values.
    fn min(self, other: Self) -> Self;
    /// Maximum of two values.
    fn max(self, other: Self) -> Self;
    /// Convert from f32 (for constants and configuration).
    fn from_f32(v: f32) -> Self;
    /// Lossy conversion to f32, used when handing values to log output.
    fn to_f32(self) -> f32;
    /// False for NaN and the infinities.
    fn is_finite(self) -> bool;

    /// Convert a count or index into a scalar.
    fn from_usize(v: usize) -> Self {
        Self::from_f32(v as f32)
    }

    /// Clamp self to [min, max].
    fn clamp(self, min: Self, max: Self) -> Self {
        self.max(min).min(max)
    }

    /// Check if approximately zero within epsilon.
    fn is_near_zero(self, epsilon: Self) -> bool {
        self.abs() < epsilon
    }
}

macro_rules! impl_float {
    ($t:ty, $pi:expr, sqrt = $sqrt:path, cbrt = $cbrt:path, sin = $sin:path, cos = $cos:path, fabs = $fabs:path) => {
        impl Float for $t {
            #[inline] fn zero() -> Self { 0.0 }
            #[inline] fn one() -> Self { 1.0 }
            #[inline] fn half() -> Self { 0.5 }
            #[inline] fn two() -> Self { 2.0 }
            #[inline] fn pi() -> Self { $pi }
            #[inline] fn sqrt(self) -> Self { $sqrt(self) }
            #[inline] fn cbrt(self) -> Self { $cbrt(self) }
            #[inline] fn sin(self) -> Self { $sin(self) }
            #[inline] fn cos(self) -> Self { $cos(self) }
            #[inline] fn abs(self) -> Self { $fabs(self) }
            // Returns `self` whenever either operand is NaN.
            #[inline] fn min(self, other: Self) -> Self { if other < self { other } else { self } }
            #[inline] fn max(self, other: Self) -> Self { if other > self { other } else { self } }
            #[inline] fn from_f32(v: f32) -> Self { v as $t }
            #[inline] fn to_f32(self) -> f32 { self as f32 }
            #[inline] fn is_finite(self) -> bool { <$t>::is_finite(self) }
        }
    };
}

impl_float!(f32, core::f32::consts::PI, sqrt = libm::sqrtf, cbrt = libm::cbrtf, sin = libm::sinf, cos = libm::cosf, fabs = libm::fabsf);
impl_float!(f64, core::f64::consts::PI, sqrt = libm::sqrt, cbrt = libm::cbrt, sin = libm::sin, cos = libm::cos, fabs = libm::fabs);
