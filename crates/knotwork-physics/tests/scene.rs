use knotwork_core::traits::Validate;
use knotwork_geometry::BSplineSurface;
use knotwork_math::dvec3;
use knotwork_mesh::{tessellate_surface, TriangleMesh};
use knotwork_physics::{surface_to_world, Bounds, World};

fn demo_world() -> World {
    let mut world = World::new(Bounds::default()).with_speed_factor(1.5);
    let starts = [
        (0.5, -0.5, dvec3(0.8, 0.0, 0.3)),
        (1.5, -1.0, dvec3(-0.4, 0.0, 0.9)),
        (2.5, -1.5, dvec3(-0.7, 0.0, -0.6)),
        (1.0, -1.5, dvec3(0.5, 0.0, -0.5)),
    ];
    for (x, z, velocity) in starts {
        world.spawn(x, z, 0.05, velocity).unwrap();
    }
    world
}

#[test]
fn test_balls_stay_inside_walls() {
    let mut world = demo_world();
    let bounds = world.bounds;
    let mut bounces = 0;
    for _ in 0..2000 {
        bounces += world.step(1.0 / 60.0).wall_bounces;
        for ball in &world.balls {
            assert!(ball.position.x >= bounds.min_x + ball.radius - 1e-12);
            assert!(ball.position.x <= bounds.max_x - ball.radius + 1e-12);
            assert!(ball.position.z >= bounds.min_z + ball.radius - 1e-12);
            assert!(ball.position.z <= bounds.max_z - ball.radius + 1e-12);
        }
    }
    assert!(bounces > 0);
}

#[test]
fn test_speed_is_preserved() {
    let mut world = demo_world();
    let before: Vec<f64> = world.balls.iter().map(|b| b.velocity.length()).collect();
    for _ in 0..500 {
        world.step(1.0 / 60.0);
    }
    for (ball, speed) in world.balls.iter().zip(before) {
        assert!((ball.velocity.length() - speed).abs() < 1e-12);
    }
}

#[test]
fn test_balls_rest_on_tessellated_surface() {
    let surface = BSplineSurface::reference().unwrap();
    let mut world = demo_world();
    assert_eq!(world.rest_on_surface(&surface), world.balls.len());

    // The ball's underside touches the surface: it sits within a ball radius
    // of the highest nearby mesh vertex.
    let mesh = tessellate_surface(&surface, 150, 100).unwrap();
    let world_vertices: Vec<_> = mesh.positions.iter().map(|&p| surface_to_world(p)).collect();
    for ball in &world.balls {
        let bottom = ball.position.y - ball.radius;
        let nearest = world_vertices
            .iter()
            .min_by(|a, b| {
                let da = (a.x - ball.position.x).hypot(a.z - ball.position.z);
                let db = (b.x - ball.position.x).hypot(b.z - ball.position.z);
                da.total_cmp(&db)
            })
            .unwrap();
        assert!((nearest.y - bottom).abs() < 0.1, "ball {:?} vs {:?}", ball.position, nearest);
    }
}

#[test]
fn test_scene_mesh() {
    let world = demo_world();
    let mut scene = TriangleMesh::default();
    for ball in &world.balls {
        scene.merge(&ball.mesh(12, 8).unwrap());
    }
    scene.validate().unwrap();
    assert_eq!(scene.vertex_count(), 4 * 13 * 9);
    assert_eq!(scene.triangle_count(), 4 * 12 * (2 * 8 - 2));
}
