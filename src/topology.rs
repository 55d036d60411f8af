//! Constraint derivation from procedural grids and triangle meshes.

use crate::constraint::{signed_volume, ConstraintFamily, DistanceConstraint, VolumeConstraint};
use crate::error::PhysicsError;
use crate::float::Float;
use crate::mesh::Mesh;
use crate::vec::{Vec, Vec3};
use alloc::vec::Vec as AllocVec;
use alloc::collections::BTreeSet;

/// Particles, render triangles and constraints of a rectangular cloth grid.
#[derive(Clone, Debug)]
pub struct GridTopology<F: Float> {
    pub positions: AllocVec<Vec3<F>>,
    pub triangles: AllocVec<[usize; 3]>,
    pub constraints: AllocVec<DistanceConstraint<F>>,
    pub cols: usize,
    pub rows: usize,
}

/// Unique edges and rest volume of a closed triangle mesh.
#[derive(Clone, Debug)]
pub struct MeshTopology<F: Float> {
    pub positions: AllocVec<Vec3<F>>,
    pub triangles: AllocVec<[usize; 3]>,
    pub constraints: AllocVec<DistanceConstraint<F>>,
    pub volume: VolumeConstraint<F>,
}

/// Builds the constraint sets bodies are simulated with.
pub struct TopologyBuilder;

impl TopologyBuilder {
    /// Lay out a `cols` x `rows` grid in the XZ plane starting at `origin`.
    ///
    /// Particle at (col, row) has index `row * cols + col` and sits at
    /// `origin + (col * spacing, 0, row * spacing)`. Creates:
    /// - Structural: horizontal + vertical neighbors (rest = spacing)
    /// - Shear: diagonal neighbors (rest = spacing * sqrt(2))
    /// - Bend: skip-one horizontal + vertical (rest = spacing * 2)
    pub fn grid<F: Float>(
        cols: usize,
        rows: usize,
        spacing: F,
        origin: Vec3<F>,
    ) -> Result<GridTopology<F>, PhysicsError> {
        if cols < 2 || rows < 2 {
            return Err(PhysicsError::InvalidGridDimensions { cols, rows });
        }
        if !(spacing > F::zero()) || !spacing.is_finite() {
            return Err(PhysicsError::InvalidRestDistance);
        }

        let mut positions = AllocVec::with_capacity(cols * rows);
        for row in 0..rows {
            for col in 0..cols {
                let offset = Vec3::new(
                    F::from_usize(col) * spacing,
                    F::zero(),
                    F::from_usize(row) * spacing,
                );
                positions.push(origin + offset);
            }
        }

        let index = |col: usize, row: usize| row * cols + col;
        let diag_length = (spacing * spacing + spacing * spacing).sqrt();
        let bend_length = spacing * F::two();
        let mut constraints = AllocVec::new();

        // Structural: horizontal
        for row in 0..rows {
            for col in 0..(cols - 1) {
                constraints.push(DistanceConstraint::new(
                    index(col, row),
                    index(col + 1, row),
                    spacing,
                    ConstraintFamily::Structural,
                ));
            }
        }

        // Structural: vertical
        for row in 0..(rows - 1) {
            for col in 0..cols {
                constraints.push(DistanceConstraint::new(
                    index(col, row),
                    index(col, row + 1),
                    spacing,
                    ConstraintFamily::Structural,
                ));
            }
        }

        // Shear: both diagonals of every cell
        for row in 0..(rows - 1) {
            for col in 0..(cols - 1) {
                let tl = index(col, row);
                let tr = index(col + 1, row);
                let bl = index(col, row + 1);
                let br = index(col + 1, row + 1);
                constraints.push(DistanceConstraint::new(tl, br, diag_length, ConstraintFamily::Shear));
                constraints.push(DistanceConstraint::new(tr, bl, diag_length, ConstraintFamily::Shear));
            }
        }

        // Bend: skip-one horizontal
        for row in 0..rows {
            for col in 0..(cols.saturating_sub(2)) {
                constraints.push(DistanceConstraint::new(
                    index(col, row),
                    index(col + 2, row),
                    bend_length,
                    ConstraintFamily::Bend,
                ));
            }
        }

        // Bend: skip-one vertical
        for row in 0..(rows.saturating_sub(2)) {
            for col in 0..cols {
                constraints.push(DistanceConstraint::new(
                    index(col, row),
                    index(col, row + 2),
                    bend_length,
                    ConstraintFamily::Bend,
                ));
            }
        }

        // Two triangles per cell, wound so the face normal points +Y.
        let mut triangles = AllocVec::with_capacity((cols - 1) * (rows - 1) * 2);
        for row in 0..(rows - 1) {
            for col in 0..(cols - 1) {
                let tl = index(col, row);
                let tr = index(col + 1, row);
                let bl = index(col, row + 1);
                let br = index(col + 1, row + 1);
                triangles.push([tl, bl, tr]);
                triangles.push([tr, bl, br]);
            }
        }

        Ok(GridTopology { positions, triangles, constraints, cols, rows })
    }

    /// Extract the unique undirected edges and the rest volume of `mesh`.
    ///
    /// Edges are emitted in first-seen order so constraint relaxation is
    /// deterministic. Edges whose endpoints coincide at bind time are dropped.
    pub fn from_mesh<F: Float>(mesh: &Mesh<F>) -> Result<MeshTopology<F>, PhysicsError> {
        let positions = mesh.positions().to_vec();
        if positions.is_empty() {
            return Err(PhysicsError::EmptyMesh);
        }
        let triangles = mesh.triangles()?;
        if triangles.is_empty() {
            return Err(PhysicsError::EmptyMesh);
        }

        let mut seen: BTreeSet<(usize, usize)> = BTreeSet::new();
        let mut constraints = AllocVec::new();
        for tri in &triangles {
            for k in 0..3 {
                let a = tri[k];
                let b = tri[(k + 1) % 3];
                if a == b {
                    continue;
                }
                let edge = if a < b { (a, b) } else { (b, a) };
                if !seen.insert(edge) {
                    continue;
                }
                let rest = positions[edge.0].distance(positions[edge.1]);
                if rest < F::from_f32(crate::constraint::DEGENERATE_DISTANCE) {
                    continue;
                }
                constraints.push(DistanceConstraint::new(edge.0, edge.1, rest, ConstraintFamily::Edge));
            }
        }

        let rest_volume = signed_volume(&triangles, |i| positions[i]).abs();
        Ok(MeshTopology {
            positions,
            triangles,
            constraints,
            volume: VolumeConstraint { rest_volume },
        })
    }
}
