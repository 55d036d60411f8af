use pliant::{ClothBody, ClothConfig, SolverConfig, Vec3};
use pliant::vec::Vec as _;

const G: f32 = 9.8;
const DT: f32 = 1.0 / 60.0;

fn cloth_4x4(solver: SolverConfig<f32>) -> ClothBody<f32> {
    ClothBody::new(&ClothConfig::new(4, 4, 0.5), solver, false).unwrap()
}

fn gravity() -> SolverConfig<f32> {
    SolverConfig::new().with_gravity(Vec3::new(0.0, -G, 0.0))
}

/// Upper bound on how far a particle can fall in `steps` undamped Verlet steps.
fn free_fall_bound(steps: usize) -> f32 {
    G * DT * DT * (steps * (steps + 1)) as f32 / 2.0
}

#[test]
fn pinned_top_row_drapes_under_gravity() {
    let mut cloth = cloth_4x4(gravity());
    cloth.pin_top_row();

    let top_initial: Vec<_> = (0..cloth.cols()).map(|c| cloth.position_at(c, 0).unwrap()).collect();
    let bottom_row = cloth.rows() - 1;
    let bottom_initial_y: f32 =
        (0..cloth.cols()).map(|c| cloth.position_at(c, bottom_row).unwrap().y).sum::<f32>() / 4.0;

    for _ in 0..120 {
        cloth.update(DT);
    }

    for col in 0..cloth.cols() {
        assert_eq!(
            cloth.position_at(col, 0).unwrap(),
            top_initial[col],
            "top row particle at col {} should remain pinned",
            col,
        );
    }

    let bottom_y: f32 = (0..cloth.cols()).map(|c| cloth.position_at(c, bottom_row).unwrap().y).sum::<f32>() / 4.0;
    assert!(
        bottom_y < bottom_initial_y - 0.25,
        "bottom row should hang below its start: {} vs {}",
        bottom_y,
        bottom_initial_y,
    );
    assert!(bottom_y > bottom_initial_y - free_fall_bound(120));
}

#[test]
fn free_cloth_falls_less_than_free_fall() {
    let mut cloth = cloth_4x4(gravity());
    for _ in 0..120 {
        cloth.update(DT);
    }
    for p in cloth.positions() {
        assert!(p.y < -1.0, "particle should have fallen, y = {}", p.y);
        assert!(p.y > -free_fall_bound(120), "particle fell faster than gravity allows, y = {}", p.y);
    }
}

#[test]
fn unperturbed_cloth_keeps_rest_lengths() {
    let mut cloth = cloth_4x4(SolverConfig::new().without_gravity());
    for _ in 0..50 {
        cloth.update(DT);
    }
    assert!(cloth.max_strain() < 1e-4);
}

#[test]
fn perturbed_cloth_relaxes_back_to_rest_lengths() {
    let mut cloth = ClothBody::new(
        &ClothConfig::new(4, 4, 0.5),
        SolverConfig::new().without_gravity().with_damping(0.9),
        false,
    )
    .unwrap();
    cloth.apply_impulse(Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0), 2.0, 0.8);
    cloth.update(DT);
    assert!(cloth.position_at(0, 0).unwrap().y > 0.0);

    for _ in 0..300 {
        cloth.update(DT);
    }
    let strain = cloth.max_strain();
    assert!(strain < 1e-3, "max strain after settling = {}", strain);
}

#[test]
fn sphere_collider_is_never_penetrated() {
    let mut cloth = ClothBody::new(
        &ClothConfig::new(6, 6, 0.25).with_origin(Vec3::new(-0.625, 0.0, -0.625)),
        gravity(),
        false,
    )
    .unwrap();
    let center = Vec3::new(0.0, -0.6, 0.0);
    let radius = 0.4;
    cloth.add_sphere_collider(center, radius);

    for _ in 0..120 {
        cloth.update(DT);
        for p in cloth.positions() {
            assert!(p.distance(center) >= radius - 1e-4, "penetration at {:?}", p);
        }
    }
}

#[test]
fn removed_collider_stops_acting() {
    let mut cloth = cloth_4x4(gravity());
    let handle = cloth.add_sphere_collider(Vec3::new(0.75, -0.5, 0.75), 0.3);
    assert!(cloth.remove_sphere_collider(handle));
    assert!(!cloth.remove_sphere_collider(handle));
    assert!(cloth.colliders().is_empty());
}

#[test]
fn wind_pushes_free_particles_downwind() {
    let mut cloth = cloth_4x4(SolverConfig::new().without_gravity());
    cloth.pin_top_row();
    cloth.set_wind(Vec3::new(3.0, 0.0, 0.0), 4.0);
    let start = cloth.position_at(0, 3).unwrap().x;
    for _ in 0..30 {
        cloth.update(DT);
    }
    assert!(cloth.position_at(0, 3).unwrap().x > start);
    assert_eq!(cloth.position_at(0, 0).unwrap().x, 0.0);
}

#[test]
fn reset_restores_bind_pose() {
    let mut cloth = cloth_4x4(gravity());
    let bind = cloth.positions();
    cloth.pin_corners();
    for _ in 0..60 {
        cloth.update(DT);
    }
    assert_ne!(cloth.positions(), bind);

    cloth.reset();
    assert_eq!(cloth.positions(), bind);
    assert_eq!(cloth.mesh().positions(), bind.as_slice());
    assert_eq!(cloth.pinned_indices(), vec![0, 3]);
}

#[test]
fn delta_time_is_clamped() {
    let mut big = cloth_4x4(gravity());
    let mut ceiling = cloth_4x4(gravity());
    big.update(10.0);
    ceiling.update(1.0 / 30.0);
    assert_eq!(big.positions(), ceiling.positions());
}

#[test]
fn invalid_delta_time_is_ignored() {
    let mut cloth = cloth_4x4(gravity());
    let bind = cloth.positions();
    cloth.update(0.0);
    cloth.update(-1.0);
    cloth.update(f32::NAN);
    assert_eq!(cloth.positions(), bind);
}

#[test]
fn out_of_range_mutations_are_noops() {
    let mut cloth = cloth_4x4(gravity());
    cloth.pin_vertex(1000);
    cloth.unpin_vertex(1000);
    cloth.set_vertex_mass(1000, 0.0);
    assert!(cloth.pinned_indices().is_empty());
    // Column 4 would alias row 1 if only the flat index were checked.
    assert_eq!(cloth.position_at(4, 0), None);
    assert_eq!(cloth.position_at(0, 4), None);
    assert!(cloth.position_at(3, 3).is_some());
}

#[test]
fn unpinned_vertex_moves_again() {
    let mut cloth = cloth_4x4(gravity());
    cloth.pin_vertex(0);
    for _ in 0..10 {
        cloth.update(DT);
    }
    assert_eq!(cloth.position_at(0, 0).unwrap(), Vec3::zero());
    cloth.unpin_vertex(0);
    for _ in 0..10 {
        cloth.update(DT);
    }
    assert!(cloth.position_at(0, 0).unwrap().y < 0.0);
}

#[test]
fn mesh_follows_particles() {
    let mut cloth = cloth_4x4(gravity());
    cloth.pin_top_row();
    for _ in 0..30 {
        cloth.update(DT);
    }
    assert_eq!(cloth.mesh().positions(), cloth.positions().as_slice());
    for n in cloth.mesh().normals() {
        assert!((n.length() - 1.0).abs() < 1e-4);
    }
}
