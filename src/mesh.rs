//! Renderable geometry kept in sync with a body's particles.

use crate::buffer::ParticleBuffer;
use crate::error::PhysicsError;
use crate::float::Float;
use crate::vec::{Vec, Vec3};
use alloc::vec::Vec as AllocVec;

/// Vertex positions, normals and an optional triangle index buffer.
///
/// This is both the source geometry handed to a body at construction and
/// the geometry the body writes back into after every step.
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh<F: Float> {
    positions: AllocVec<Vec3<F>>,
    normals: AllocVec<Vec3<F>>,
    indices: Option<AllocVec<u32>>,
}

impl<F: Float> Mesh<F> {
    /// Wrap raw geometry. Normals are computed immediately when an index
    /// buffer is present.
    pub fn new(positions: AllocVec<Vec3<F>>, indices: Option<AllocVec<u32>>) -> Self {
        let normals = alloc::vec![Vec3::up(); positions.len()];
        let mut mesh = Mesh { positions, normals, indices };
        mesh.recompute_normals();
        mesh
    }

    /// Build from the flat `f32` arrays a loader or renderer typically holds.
    pub fn from_raw(positions: &[[f32; 3]], indices: Option<&[u32]>) -> Self {
        Mesh::new(
            positions.iter().map(|&p| Vec3::from_array(p)).collect(),
            indices.map(|i| i.to_vec()),
        )
    }

    /// Axis-aligned cube of edge `size` with one corner at the origin.
    /// Eight shared vertices, twelve outward-wound triangles.
    pub fn cube(size: F) -> Self {
        let o = F::zero();
        let s = size;
        let positions = alloc::vec![
            Vec3::new(o, o, o),
            Vec3::new(s, o, o),
            Vec3::new(s, s, o),
            Vec3::new(o, s, o),
            Vec3::new(o, o, s),
            Vec3::new(s, o, s),
            Vec3::new(s, s, s),
            Vec3::new(o, s, s),
        ];
        let indices = alloc::vec![
            0, 2, 1, 0, 3, 2, // -z
            4, 5, 6, 4, 6, 7, // +z
            0, 1, 5, 0, 5, 4, // -y
            3, 7, 6, 3, 6, 2, // +y
            0, 4, 7, 0, 7, 3, // -x
            1, 2, 6, 1, 6, 5, // +x
        ];
        Mesh::new(positions, Some(indices))
    }

    /// Closed UV sphere centred on the origin.
    ///
    /// Poles are single vertices and the seam is shared, so every edge is
    /// referenced by exactly two triangles.
    pub fn uv_sphere(radius: F, segments: usize, rings: usize) -> Self {
        let segments = segments.max(3);
        let rings = rings.max(2);
        let two_pi = F::two() * F::pi();

        let mut positions = AllocVec::with_capacity(segments * (rings - 1) + 2);
        positions.push(Vec3::new(F::zero(), radius, F::zero()));
        for r in 1..rings {
            let phi = F::pi() * F::from_usize(r) / F::from_usize(rings);
            let (ring_radius, y) = (phi.sin() * radius, phi.cos() * radius);
            for s in 0..segments {
                let theta = two_pi * F::from_usize(s) / F::from_usize(segments);
                positions.push(Vec3::new(ring_radius * theta.cos(), y, ring_radius * theta.sin()));
            }
        }
        let south = positions.len() as u32;
        positions.push(Vec3::new(F::zero(), -radius, F::zero()));

        let ring_start = |r: usize| (1 + (r - 1) * segments) as u32;
        let mut indices = AllocVec::new();
        for s in 0..segments {
            let s1 = (s + 1) % segments;
            let top = ring_start(1);
            indices.extend_from_slice(&[0, top + s1 as u32, top + s as u32]);
        }
        for r in 1..(rings - 1) {
            let (a, b) = (ring_start(r), ring_start(r + 1));
            for s in 0..segments {
                let (s0, s1) = (s as u32, ((s + 1) % segments) as u32);
                indices.extend_from_slice(&[a + s0, a + s1, b + s0]);
                indices.extend_from_slice(&[a + s1, b + s1, b + s0]);
            }
        }
        let bottom = ring_start(rings - 1);
        for s in 0..segments {
            let s1 = (s + 1) % segments;
            indices.extend_from_slice(&[south, bottom + s as u32, bottom + s1 as u32]);
        }

        Mesh::new(positions, Some(indices))
    }

    pub fn positions(&self) -> &[Vec3<F>] {
        &self.positions
    }

    pub fn normals(&self) -> &[Vec3<F>] {
        &self.normals
    }

    pub fn indices(&self) -> Option<&[u32]> {
        self.indices.as_deref()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Group the index buffer into triangles, validating it on the way.
    pub fn triangles(&self) -> Result<AllocVec<[usize; 3]>, PhysicsError> {
        let indices = self.indices.as_ref().ok_or(PhysicsError::MissingIndexBuffer)?;
        if indices.len() % 3 != 0 {
            return Err(PhysicsError::MalformedIndexBuffer { len: indices.len() });
        }
        let count = self.positions.len();
        indices
            .chunks_exact(3)
            .map(|tri| {
                let mut out = [0usize; 3];
                for (slot, &i) in out.iter_mut().zip(tri) {
                    let i = i as usize;
                    if i >= count {
                        return Err(PhysicsError::IndexOutOfBounds { index: i, count });
                    }
                    *slot = i;
                }
                Ok(out)
            })
            .collect()
    }

    /// Copy particle positions into the vertex attribute and refresh normals.
    pub fn sync_from(&mut self, particles: &ParticleBuffer<F>) {
        for (dst, p) in self.positions.iter_mut().zip(particles.as_slice()) {
            *dst = p.pos;
        }
        self.recompute_normals();
    }

    /// Area-weighted vertex normals. Vertices touching no triangle with
    /// non-zero area fall back to +Y.
    pub fn recompute_normals(&mut self) {
        for n in self.normals.iter_mut() {
            *n = Vec3::zero();
        }
        if let Some(indices) = &self.indices {
            let count = self.positions.len();
            for tri in indices.chunks_exact(3) {
                let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
                if a >= count || b >= count || c >= count {
                    continue;
                }
                let (pa, pb, pc) = (self.positions[a], self.positions[b], self.positions[c]);
                let face = (pb - pa).cross(pc - pa);
                for &i in &[a, b, c] {
                    self.normals[i] = self.normals[i] + face;
                }
            }
        }
        for n in self.normals.iter_mut() {
            *n = n.normalize_or(Vec3::up());
        }
    }
}
