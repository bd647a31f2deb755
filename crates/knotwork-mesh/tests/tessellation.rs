use knotwork_core::traits::Validate;
use knotwork_geometry::{BSplineSurface, Surface, SurfaceConfig, FALLBACK_NORMAL};
use knotwork_math::{dvec3, DVec3};
use knotwork_mesh::{tessellate_surface, tessellate_surface_par, SurfaceTessellator};

fn reference() -> BSplineSurface {
    BSplineSurface::reference().unwrap()
}

#[test]
fn test_tessellation_is_deterministic() {
    let surface = reference();
    let a = tessellate_surface(&surface, 10, 10).unwrap();
    let b = tessellate_surface(&surface, 10, 10).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_parallel_matches_sequential() {
    let surface = reference();
    let seq = tessellate_surface(&surface, 17, 9).unwrap();
    let par = tessellate_surface_par(&surface, 17, 9).unwrap();
    assert_eq!(seq.positions.len(), par.positions.len());
    for (a, b) in seq.positions.iter().zip(&par.positions) {
        assert_eq!(a.to_array().map(f64::to_bits), b.to_array().map(f64::to_bits));
    }
    assert_eq!(seq, par);
}

#[test]
fn test_mesh_connectivity() {
    let surface = reference();
    for (u_res, v_res) in [(1, 1), (3, 7), (10, 10), (30, 30), (12, 5)] {
        let mesh = tessellate_surface(&surface, u_res, v_res).unwrap();
        let vertex_count = (u_res + 1) * (v_res + 1);
        assert_eq!(mesh.vertex_count(), vertex_count);
        assert_eq!(mesh.normals.len(), vertex_count);
        assert_eq!(mesh.uvs.len(), vertex_count);
        assert_eq!(mesh.indices.len(), u_res * v_res * 6);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < vertex_count));
        mesh.validate().unwrap();
    }
}

#[test]
fn test_vertex_layout_is_row_major() {
    let surface = reference();
    let (u_res, v_res) = (6, 3);
    let mesh = tessellate_surface(&surface, u_res, v_res).unwrap();
    let tess = SurfaceTessellator::new(u_res, v_res).unwrap();
    for (idx, sample) in tess.samples(&surface).iter().enumerate() {
        let (i, j) = (idx % (u_res + 1), idx / (u_res + 1));
        assert_eq!(mesh.positions[j * (u_res + 1) + i], sample.position);
        assert_eq!(surface.point_at(sample.u, sample.v), sample.position);
    }
}

#[test]
fn test_first_vertex_is_first_control_point() {
    let mesh = tessellate_surface(&reference(), 10, 10).unwrap();
    assert_eq!(mesh.positions[0], DVec3::ZERO);
}

#[test]
fn test_last_vertex_approaches_far_corner() {
    let mesh = tessellate_surface(&reference(), 10, 10).unwrap();
    let last = *mesh.positions.last().unwrap();
    assert!((last - dvec3(3.0, 2.0, 0.0)).length() < 1e-2, "got {:?}", last);
    assert!(last.is_finite());
}

#[test]
fn test_normals_are_unit_without_fallback() {
    let surface = reference();
    let samples = SurfaceTessellator::new(30, 30).unwrap().samples(&surface);
    assert!(samples.iter().all(|s| !s.fallback));
    for s in &samples {
        assert!((s.normal.length() - 1.0).abs() < 1e-12);
    }
}

#[test]
fn test_triangle_winding_is_consistent() {
    let mesh = tessellate_surface(&reference(), 12, 12).unwrap();
    let mut orientations = mesh.indices.chunks_exact(3).map(|tri| {
        let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let face = (mesh.positions[b] - mesh.positions[a]).cross(mesh.positions[c] - mesh.positions[a]);
        face.dot(mesh.normals[a]).signum()
    });
    let first = orientations.next().unwrap();
    assert!(orientations.all(|o| o == first));
}

#[test]
fn test_collapsed_surface_uses_fallback_normal() {
    let mut config = SurfaceConfig::reference();
    config.control_points = vec![dvec3(0.5, 0.5, 0.5); 12];
    let surface = BSplineSurface::from_config(config).unwrap();

    let tess = SurfaceTessellator::new(4, 4).unwrap();
    let samples = tess.samples(&surface);
    assert!(samples.iter().all(|s| s.fallback));

    let mesh = tess.tessellate(&surface);
    assert!(mesh.normals.iter().all(|&n| n == FALLBACK_NORMAL));
    assert!(mesh.positions.iter().all(|p| p.is_finite()));
}

#[test]
fn test_tessellating_twice_replaces_output() {
    let surface = reference();
    let coarse = tessellate_surface(&surface, 2, 2).unwrap();
    let fine = tessellate_surface(&surface, 8, 8).unwrap();
    let again = tessellate_surface(&surface, 2, 2).unwrap();
    assert_ne!(coarse.vertex_count(), fine.vertex_count());
    assert_eq!(coarse, again);
}
