use pliant::{ClothBody, ClothConfig, ColliderHandle, Mesh, PhysicsError, SoftBody, SolverConfig, Vec3};
use wasm_bindgen::prelude::*;

fn to_js(err: PhysicsError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Flatten positions to [x0, y0, z0, x1, y1, z1, ...].
fn flatten(points: &[Vec3<f32>]) -> Vec<f32> {
    let mut out = Vec::with_capacity(points.len() * 3);
    for p in points {
        out.push(p.x);
        out.push(p.y);
        out.push(p.z);
    }
    out
}

// ---- Cloth Demo ----

#[wasm_bindgen]
pub struct ClothDemo {
    cloth: ClothBody<f32>,
    ball: ColliderHandle,
}

#[wasm_bindgen]
impl ClothDemo {
    #[wasm_bindgen(constructor)]
    pub fn new(cols: usize, rows: usize, spacing: f32) -> Result<ClothDemo, JsValue> {
        let half = Vec3::new(cols as f32 * spacing * 0.5, 0.0, 0.0);
        let shape = ClothConfig::new(cols, rows, spacing).with_origin(Vec3::new(0.0, 2.0, 0.0) - half);
        let mut cloth = ClothBody::new(
            &shape,
            SolverConfig::new().with_iterations(8).with_sub_steps(2),
            false,
        )
        .map_err(to_js)?;
        cloth.pin_top_row();
        let ball = cloth.add_sphere_collider(Vec3::new(0.0, 0.5, rows as f32 * spacing * 0.5), 0.4);
        Ok(ClothDemo { cloth, ball })
    }

    pub fn update(&mut self, dt: f32) {
        self.cloth.update(dt);
    }

    pub fn set_wind(&mut self, x: f32, y: f32, z: f32, strength: f32) {
        self.cloth.set_wind(Vec3::new(x, y, z), strength);
    }

    pub fn move_ball(&mut self, x: f32, y: f32, z: f32) {
        self.cloth.colliders_mut().set_center(self.ball, Vec3::new(x, y, z));
    }

    pub fn poke(&mut self, x: f32, y: f32, z: f32, strength: f32) -> usize {
        self.cloth.apply_impulse(Vec3::new(x, y, z), Vec3::new(0.0, 0.0, 1.0), strength, 0.5)
    }

    pub fn toggle_pin(&mut self, col: usize, row: usize) {
        let index = self.cloth.index(col, row);
        match self.cloth.particle(index).map(|p| p.is_pinned()) {
            Some(true) => self.cloth.unpin_vertex(index),
            Some(false) => self.cloth.pin_vertex(index),
            None => {}
        }
    }

    pub fn reset(&mut self) {
        self.cloth.reset();
    }

    /// Mesh positions in row-major order.
    pub fn positions(&self) -> Vec<f32> {
        flatten(self.cloth.mesh().positions())
    }

    pub fn normals(&self) -> Vec<f32> {
        flatten(self.cloth.mesh().normals())
    }

    pub fn indices(&self) -> Vec<u32> {
        self.cloth.mesh().indices().map(|i| i.to_vec()).unwrap_or_default()
    }

    pub fn cols(&self) -> usize {
        self.cloth.cols()
    }
    pub fn rows(&self) -> usize {
        self.cloth.rows()
    }
}

// ---- Soft Body Demo ----

#[wasm_bindgen]
pub struct SoftBodyDemo {
    body: SoftBody<f32>,
    poke_strength: f32,
}

#[wasm_bindgen]
impl SoftBodyDemo {
    #[wasm_bindgen(constructor)]
    pub fn new(pressure: f32) -> Result<SoftBodyDemo, JsValue> {
        let mut body = SoftBody::new(
            Mesh::uv_sphere(1.0, 20, 14),
            SolverConfig::new().with_pressure(pressure).with_iterations(6),
            false,
        )
        .map_err(to_js)?;
        // Large sphere standing in for the floor.
        body.add_sphere_collider(Vec3::new(0.0, -102.0, 0.0), 100.0);
        Ok(SoftBodyDemo { body, poke_strength: 6.0 })
    }

    pub fn update(&mut self, dt: f32) {
        self.body.update(dt);
    }

    /// Push the body away from the poke point.
    pub fn poke(&mut self, x: f32, y: f32, z: f32) -> usize {
        let point = Vec3::new(x, y, z);
        let away = self.body.centroid() - point;
        self.body.apply_impulse(point, away, self.poke_strength, 0.8)
    }

    pub fn reset(&mut self) {
        self.body.reset();
    }

    pub fn volume_ratio(&self) -> f32 {
        self.body.volume() / self.body.rest_volume()
    }

    pub fn positions(&self) -> Vec<f32> {
        flatten(self.body.mesh().positions())
    }

    pub fn normals(&self) -> Vec<f32> {
        flatten(self.body.mesh().normals())
    }

    pub fn indices(&self) -> Vec<u32> {
        self.body.mesh().indices().map(|i| i.to_vec()).unwrap_or_default()
    }

    pub fn particle_count(&self) -> usize {
        self.body.particle_count()
    }
}
