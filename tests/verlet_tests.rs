use pliant::{
    ConstraintFamily, ConstraintSolver, DistanceConstraint, Integration, NoOpStepObserver, Particle,
    VolumePreservation, VolumeConstraint, Mesh, TopologyBuilder, ParticleBuffer, Vec3,
};
use pliant::vec::Vec as _;

#[test]
fn verlet_free_fall_gravity() {
    let mut p = Particle::new(Vec3::new(0.0f32, 100.0, 0.0), 1.0);
    let kernel = Integration::Verlet { acceleration: Vec3::new(0.0, -9.81, 0.0), damping: 1.0 };
    let dt = 1.0 / 60.0;
    for _ in 0..60 {
        kernel.apply(&mut p, dt);
    }

    let expected_y = 100.0 - 0.5 * 9.81 * 1.0;
    assert!((p.pos.y - expected_y).abs() < 0.2, "pos.y = {}, expected ~ {}", p.pos.y, expected_y);
}

#[test]
fn euler_free_fall_matches_closed_form() {
    let mut p = Particle::new(Vec3::new(0.0f64, 0.0, 0.0), 1.0);
    let kernel = Integration::SemiImplicitEuler { gravity: Vec3::new(0.0, -10.0, 0.0), damping: 1.0 };
    for _ in 0..10 {
        kernel.apply(&mut p, 0.1);
    }
    // Semi-implicit Euler: y_n = -g * dt² * n(n+1)/2
    assert!((p.pos.y + 5.5).abs() < 1e-9);
    assert!((p.velocity.y + 10.0).abs() < 1e-9);
}

#[test]
fn distance_constraint_restores_length() {
    let mut particles = [
        Particle::new(Vec3::new(0.0f32, 0.0, 0.0), 1.0),
        Particle::new(Vec3::new(20.0, 0.0, 0.0), 1.0),
    ];
    let solver = ConstraintSolver::new(vec![DistanceConstraint::new(0, 1, 5.0, ConstraintFamily::Edge)]);
    solver.relax(&mut particles, 1.0, 10, &mut NoOpStepObserver);

    let dist = particles[0].pos.distance(particles[1].pos);
    assert!((dist - 5.0).abs() < 1e-4, "distance should be 5.0, got {}", dist);
    // Equal masses split the correction evenly.
    assert!((particles[0].pos.x - 7.5).abs() < 1e-4);
}

#[test]
fn pinned_particle_stays_fixed() {
    let mut particles = [
        Particle::pinned(Vec3::new(5.0f32, 5.0, 5.0)),
        Particle::new(Vec3::new(5.0, -5.0, 5.0), 1.0),
    ];
    let solver = ConstraintSolver::new(vec![DistanceConstraint::new(0, 1, 2.0, ConstraintFamily::Structural)]);
    let kernel = Integration::Verlet { acceleration: Vec3::new(0.0, -1000.0, 0.0), damping: 0.99 };
    for _ in 0..30 {
        for p in particles.iter_mut() {
            kernel.apply(p, 1.0 / 60.0);
        }
        solver.relax(&mut particles, 1.0, 4, &mut NoOpStepObserver);
    }
    assert_eq!(particles[0].pos, Vec3::new(5.0, 5.0, 5.0));
    assert!((particles[1].pos.distance(particles[0].pos) - 2.0).abs() < 1e-3);
}

#[test]
fn mass_weighting_heavier_moves_less() {
    // Heavy particle at origin, light particle at (10, 0, 0), rest length 5.
    let mut particles = [
        Particle::new(Vec3::new(0.0f32, 0.0, 0.0), 0.1), // heavy
        Particle::new(Vec3::new(10.0, 0.0, 0.0), 1.0),   // light
    ];
    let constraint = DistanceConstraint::new(0, 1, 5.0, ConstraintFamily::Edge);
    assert!(constraint.solve(&mut particles, 1.0));

    let heavy_moved = particles[0].pos.x.abs();
    let light_moved = (10.0 - particles[1].pos.x).abs();
    assert!(heavy_moved < light_moved, "heavy moved {}, light moved {}", heavy_moved, light_moved);
    assert!((heavy_moved + light_moved - 5.0).abs() < 1e-5);
    assert!((light_moved / heavy_moved - 10.0).abs() < 1e-3);
}

#[test]
fn coincident_endpoints_are_skipped() {
    let mut particles = [
        Particle::new(Vec3::new(1.0f32, 1.0, 1.0), 1.0),
        Particle::new(Vec3::new(1.0, 1.0, 1.0), 1.0),
    ];
    let constraint = DistanceConstraint::new(0, 1, 1.0, ConstraintFamily::Edge);
    assert!(!constraint.solve(&mut particles, 1.0));
    assert!(particles.iter().all(|p| p.is_finite()));
}

#[test]
fn volume_preservation_inflates_a_crushed_cube() {
    let topo = TopologyBuilder::from_mesh(&Mesh::cube(1.0f32)).unwrap();
    let mut buffer = ParticleBuffer::from_positions(&topo.positions);
    for p in buffer.as_mut_slice() {
        p.pos.y *= 0.5;
    }
    let volume = VolumePreservation::new(topo.triangles, VolumeConstraint { rest_volume: topo.volume.rest_volume });
    let before = volume.current_volume(buffer.as_slice());
    assert!((before - 0.5).abs() < 1e-5);

    for _ in 0..20 {
        volume.apply(buffer.as_mut_slice(), 2.0);
    }
    let after = volume.current_volume(buffer.as_slice());
    assert!(after > before);
    assert!((after - 1.0).abs() < 0.05, "volume = {}", after);
}
