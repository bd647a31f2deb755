//! knotwork CLI
//!
//! Tessellates B-spline surfaces, triangulates point clouds and runs the ball
//! simulation, printing a summary and optionally writing the mesh as JSON.
//!
//! # Usage
//!
//! ```bash
//! # Tessellate the built-in demo surface at 30x30
//! knotwork surface
//!
//! # Tessellate a surface from a JSON config in parallel and save the mesh
//! knotwork surface --config surface.json --u-res 64 --v-res 48 --parallel --output mesh.json
//!
//! # Triangulate a terrain point cloud on a 10-unit grid
//! knotwork cloud terrain.txt --spacing 10
//!
//! # Run 600 steps of the ball simulation over the demo surface
//! knotwork simulate --steps 600 --speed 1.5
//! ```

use std::f64::consts::TAU;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use knotwork_geometry::{BSplineSurface, SurfaceConfig};
use knotwork_math::dvec3;
use knotwork_mesh::{PointCloud, SurfaceTessellator, TriangleMesh};
use knotwork_physics::{surface_to_world, Bounds, World};
use log::info;

const BALL_RADIUS: f64 = 0.05;

#[derive(Parser)]
#[command(name = "knotwork")]
#[command(about = "B-spline surface tessellation and ball simulation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Tessellate a B-spline surface
    Surface {
        /// JSON surface config (default: the built-in demo surface)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Cells along u
        #[arg(long, default_value_t = 30)]
        u_res: usize,
        /// Cells along v
        #[arg(long, default_value_t = 30)]
        v_res: usize,
        /// Evaluate samples on the rayon thread pool
        #[arg(long)]
        parallel: bool,
        /// Write the mesh as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Triangulate a point cloud text file
    Cloud {
        /// Point cloud file: a count line, then `x z y` per line
        file: PathBuf,
        /// Grid cell size in the XZ plane
        #[arg(short, long, default_value_t = 10.0)]
        spacing: f64,
        /// Write the mesh as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run the ball simulation over the demo surface
    Simulate {
        /// Number of fixed steps
        #[arg(long, default_value_t = 600)]
        steps: usize,
        /// Step length in seconds
        #[arg(long, default_value_t = 1.0 / 60.0)]
        dt: f64,
        /// Velocity multiplier
        #[arg(long, default_value_t = 1.0)]
        speed: f64,
        /// Number of balls
        #[arg(long, default_value_t = 6)]
        balls: usize,
        /// Write the final scene (surface and balls) as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Surface {
            config,
            u_res,
            v_res,
            parallel,
            output,
        } => {
            run_surface(config.as_deref(), u_res, v_res, parallel, output.as_deref())?;
        }
        Commands::Cloud {
            file,
            spacing,
            output,
        } => {
            run_cloud(&file, spacing, output.as_deref())?;
        }
        Commands::Simulate {
            steps,
            dt,
            speed,
            balls,
            output,
        } => {
            run_simulation(steps, dt, speed, balls, output.as_deref())?;
        }
    }

    Ok(())
}

fn load_surface(config: Option<&Path>) -> Result<BSplineSurface> {
    let config = match config {
        Some(path) => SurfaceConfig::load(path)
            .with_context(|| format!("Failed to read surface config {}", path.display()))?,
        None => SurfaceConfig::reference(),
    };
    BSplineSurface::from_config(config).context("Invalid surface definition")
}

fn run_surface(
    config: Option<&Path>,
    u_res: usize,
    v_res: usize,
    parallel: bool,
    output: Option<&Path>,
) -> Result<()> {
    let surface = load_surface(config)?;
    let tessellator = SurfaceTessellator::new(u_res, v_res)?.parallel(parallel);

    let samples = tessellator.samples(&surface);
    let fallbacks = samples.iter().filter(|s| s.fallback).count();
    let mesh = tessellator.mesh_from_samples(&samples);

    print_summary("Surface", &mesh);
    println!("  Fallback normals: {}", fallbacks);

    if let Some(path) = output {
        write_mesh(&mesh, path)?;
    }
    Ok(())
}

fn run_cloud(file: &Path, spacing: f64, output: Option<&Path>) -> Result<()> {
    let mut cloud = PointCloud::load(file)
        .with_context(|| format!("Failed to load point cloud {}", file.display()))?;
    let offset = cloud.center();
    let mesh = cloud.triangulate(spacing)?;

    print_summary("Point cloud", &mesh);
    println!(
        "  Centre offset: ({:.3}, {:.3}, {:.3})",
        offset.x, offset.y, offset.z
    );

    if let Some(path) = output {
        write_mesh(&mesh, path)?;
    }
    Ok(())
}

fn run_simulation(
    steps: usize,
    dt: f64,
    speed: f64,
    balls: usize,
    output: Option<&Path>,
) -> Result<()> {
    if !(dt.is_finite() && dt > 0.0) {
        anyhow::bail!("Step length must be positive, got {}", dt);
    }

    let surface = BSplineSurface::reference()?;
    let mut world = World::new(Bounds::default()).with_speed_factor(speed);

    // Start the balls on an ellipse around the middle of the play area, each
    // heading along the tangent.
    for k in 0..balls {
        let angle = TAU * k as f64 / balls as f64;
        let x = 1.5 + 0.9 * angle.cos();
        let z = -1.0 + 0.6 * angle.sin();
        let velocity = dvec3(-angle.sin(), 0.0, angle.cos()) * 0.5;
        world
            .spawn(x, z, BALL_RADIUS, velocity)
            .with_context(|| format!("Failed to place ball {}", k))?;
    }

    let mut wall_bounces = 0;
    let mut ball_contacts = 0;
    for _ in 0..steps {
        let report = world.step(dt);
        wall_bounces += report.wall_bounces;
        ball_contacts += report.ball_contacts;
    }
    let resting = world.rest_on_surface(&surface);
    info!("Simulated {} balls for {} steps", world.balls.len(), steps);

    println!("Simulation");
    println!("  Steps: {}", steps);
    println!("  Wall bounces: {}", wall_bounces);
    println!("  Ball contacts: {}", ball_contacts);
    println!("  Balls on surface: {}/{}", resting, world.balls.len());
    for (k, ball) in world.balls.iter().enumerate() {
        println!(
            "  Ball {}: ({:.3}, {:.3}, {:.3})",
            k, ball.position.x, ball.position.y, ball.position.z
        );
    }

    if let Some(path) = output {
        let mut scene = SurfaceTessellator::new(30, 30)?.tessellate(&surface);
        for p in &mut scene.positions {
            *p = surface_to_world(*p);
        }
        for n in &mut scene.normals {
            *n = surface_to_world(*n);
        }
        for ball in &world.balls {
            scene.merge(&ball.mesh(36, 18)?);
        }
        write_mesh(&scene, path)?;
    }
    Ok(())
}

fn print_summary(label: &str, mesh: &TriangleMesh) {
    let bbox = mesh.bounding_box();
    println!("{}", label);
    println!("  Vertices: {}", mesh.vertex_count());
    println!("  Triangles: {}", mesh.triangle_count());
    println!(
        "  Bounds: ({:.3}, {:.3}, {:.3}) - ({:.3}, {:.3}, {:.3})",
        bbox.min.x, bbox.min.y, bbox.min.z, bbox.max.x, bbox.max.y, bbox.max.z
    );
}

fn write_mesh(mesh: &TriangleMesh, path: &Path) -> Result<()> {
    let json = serde_json::to_string(mesh)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote mesh to {}", path.display());
    Ok(())
}
