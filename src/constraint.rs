//! Distance and volume constraints.

use crate::float::Float;
use crate::particle::Particle;
use crate::vec::{Vec, Vec3};

/// Separation below which a distance constraint is skipped for the pass.
pub const DEGENERATE_DISTANCE: f32 = 1e-4;

/// Which rule produced a distance constraint.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ConstraintFamily {
    /// Orthogonal grid neighbours; resists stretching.
    Structural,
    /// Diagonal grid neighbours; resists shearing.
    Shear,
    /// Skip-one grid neighbours; resists folding.
    Bend,
    /// A unique triangle edge of an arbitrary mesh.
    Edge,
}

/// Holds two particles near a fixed separation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DistanceConstraint<F: Float> {
    pub a: usize,
    pub b: usize,
    pub rest_length: F,
    pub family: ConstraintFamily,
}

impl<F: Float> DistanceConstraint<F> {
    pub fn new(a: usize, b: usize, rest_length: F, family: ConstraintFamily) -> Self {
        debug_assert!(a != b, "distance constraint endpoints must differ");
        debug_assert!(rest_length > F::zero(), "rest length must be positive");
        DistanceConstraint { a, b, rest_length, family }
    }

    /// Project both endpoints toward the rest length.
    ///
    /// The correction is split by inverse mass, so equal masses move by half
    /// each and a pinned endpoint does not move at all. Returns `false` when
    /// the constraint was skipped (both pinned or coincident endpoints).
    pub fn solve(&self, particles: &mut [Particle<Vec3<F>>], stiffness: F) -> bool {
        let (a_pos, a_inv) = (particles[self.a].pos, particles[self.a].inv_mass);
        let (b_pos, b_inv) = (particles[self.b].pos, particles[self.b].inv_mass);

        let w_total = a_inv + b_inv;
        if w_total.is_near_zero(F::from_f32(1e-10)) {
            return false; // both pinned
        }

        let delta = b_pos - a_pos;
        let dist = delta.length();
        if dist < F::from_f32(DEGENERATE_DISTANCE) {
            return false;
        }

        let error = dist - self.rest_length;
        let correction = delta.scale(error * stiffness / dist);

        if a_inv > F::zero() {
            particles[self.a].pos = a_pos + correction.scale(a_inv / w_total);
        }
        if b_inv > F::zero() {
            particles[self.b].pos = b_pos - correction.scale(b_inv / w_total);
        }
        true
    }

    /// Relative deviation of the current length from the rest length.
    pub fn strain(&self, particles: &[Particle<Vec3<F>>]) -> F {
        let dist = particles[self.a].pos.distance(particles[self.b].pos);
        (dist - self.rest_length) / self.rest_length
    }
}

/// Holds the enclosed volume of a closed triangle mesh near its bind value.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VolumeConstraint<F: Float> {
    pub rest_volume: F,
}

/// Signed volume of a closed mesh: the sum over triangles of the tetrahedron
/// spanned with the origin, `dot(v0, cross(v1, v2)) / 6`.
///
/// Outward-wound meshes yield a positive value. The result is independent of
/// translation for closed meshes.
pub fn signed_volume<F: Float, P>(triangles: &[[usize; 3]], position: P) -> F
where
    P: Fn(usize) -> Vec3<F>,
{
    let mut sum = F::zero();
    for tri in triangles {
        let v0 = position(tri[0]);
        let v1 = position(tri[1]);
        let v2 = position(tri[2]);
        sum = sum + v0.dot(v1.cross(v2));
    }
    sum / F::from_f32(6.0)
}

/// Unsigned enclosed volume of the current particle positions.
pub fn enclosed_volume<F: Float>(triangles: &[[usize; 3]], particles: &[Particle<Vec3<F>>]) -> F {
    signed_volume(triangles, |i| particles[i].pos).abs()
}
