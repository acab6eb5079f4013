//! Crease CLI - feature-preserving mesh smoothing from the command line.
//!
//! Usage: crease <COMMAND> [OPTIONS] <INPUT> [OUTPUT]
//!
//! Run `crease --help` for available commands. Set `RUST_LOG=debug` to see
//! per-iteration details.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};

use crease::algo::features::{mark_boundary_edges, mark_sharp_edges};
use crease::algo::smooth::{
    classify_vertices, feature_preserving_smooth_with_progress, label_counts, LaplacianMode,
    SmootherOptions,
};
use crease::algo::Progress;
use crease::io;
use crease::mesh::HalfEdgeMesh;

#[derive(Parser)]
#[command(name = "crease")]
#[command(author, version, about = "Feature-preserving mesh smoothing", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display mesh and crease information
    Info {
        /// Input mesh file
        input: PathBuf,

        /// Also mark edges sharper than this dihedral angle (degrees)
        #[arg(long)]
        sharp_angle: Option<f64>,

        /// Also mark boundary edges
        #[arg(long)]
        mark_boundary: bool,
    },

    /// Smooth a mesh while preserving its creases
    Smooth {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Reference surface for reprojection (default: the input mesh)
        #[arg(short, long)]
        target: Option<PathBuf>,

        /// Number of iterations
        #[arg(short, long, default_value = "10")]
        iterations: usize,

        /// Laplacian weighting
        #[arg(short, long, value_enum, default_value = "uniform")]
        laplacian: LaplacianArg,

        /// Weight of the Laplacian term
        #[arg(long, default_value = "0.01")]
        w_laplace: f64,

        /// Weight of the tangent-plane constraints
        #[arg(long, default_value = "1.0")]
        w_regular: f64,

        /// Weight of the crease-line constraints
        #[arg(long, default_value = "1.0")]
        w_feature: f64,

        /// Weight of the corner pins
        #[arg(long, default_value = "1.0")]
        w_corner: f64,

        /// Snap vertices onto the target surface and the initial creases
        #[arg(long)]
        reproject: bool,

        /// Mark edges sharper than this dihedral angle (degrees)
        #[arg(long)]
        sharp_angle: Option<f64>,

        /// Mark boundary edges
        #[arg(long)]
        mark_boundary: bool,

        /// Use single-threaded execution (for benchmarking)
        #[arg(long)]
        sequential: bool,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum LaplacianArg {
    /// Uniform weights (any polygon mesh)
    Uniform,
    /// Cotangent weights (triangle meshes only)
    Cotangent,
}

impl From<LaplacianArg> for LaplacianMode {
    fn from(arg: LaplacianArg) -> Self {
        match arg {
            LaplacianArg::Uniform => LaplacianMode::Uniform,
            LaplacianArg::Cotangent => LaplacianMode::Cotangent,
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info {
            input,
            sharp_angle,
            mark_boundary,
        } => {
            cmd_info(&input, sharp_angle, mark_boundary)?;
        }

        Commands::Smooth {
            input,
            output,
            target,
            iterations,
            laplacian,
            w_laplace,
            w_regular,
            w_feature,
            w_corner,
            reproject,
            sharp_angle,
            mark_boundary,
            sequential,
        } => {
            let options = SmootherOptions::default()
                .with_laplacian_mode(laplacian.into())
                .with_weights(w_laplace, w_regular, w_feature, w_corner)
                .with_iterations(iterations)
                .with_reprojection(reproject)
                .with_parallel(!sequential);
            cmd_smooth(
                &input,
                &output,
                target.as_deref(),
                &options,
                sharp_angle,
                mark_boundary,
            )?;
        }
    }

    Ok(())
}

/// Create a progress reporter that displays a progress bar on the terminal.
fn create_progress() -> Progress {
    let max_percent = Arc::new(AtomicUsize::new(0));

    Progress::new(move |current, total, message| {
        if total == 0 {
            return;
        }

        let percent = if current >= total {
            100
        } else {
            ((current * 100) + (total / 2)) / total
        };

        // Only redraw when the bar advances
        if max_percent.fetch_max(percent, Ordering::Relaxed) >= percent && percent != 100 {
            return;
        }

        let bar_width = 30;
        let filled = (percent * bar_width) / 100;
        let bar = "=".repeat(filled);
        let space = " ".repeat(bar_width - filled);

        eprint!("\r[{}{}] {:3}% {}", bar, space, percent, message);
        let _ = std::io::stderr().flush();

        if current >= total {
            eprintln!();
        }
    })
}

/// Apply the requested automatic crease marking; returns the edges added.
fn mark_creases(mesh: &mut HalfEdgeMesh, sharp_angle: Option<f64>, mark_boundary: bool) -> usize {
    let before = mesh.num_marked_edges();
    if let Some(angle) = sharp_angle {
        mark_sharp_edges(mesh, angle);
    }
    if mark_boundary {
        mark_boundary_edges(mesh);
    }
    mesh.num_marked_edges() - before
}

fn cmd_info(
    input: &Path,
    sharp_angle: Option<f64>,
    mark_boundary: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut mesh: HalfEdgeMesh = io::load(input)?;
    let from_file = mesh.num_marked_edges();
    let added = mark_creases(&mut mesh, sharp_angle, mark_boundary);

    println!("File: {}", input.display());
    println!("Vertices: {}", mesh.num_vertices());
    println!("Faces: {}", mesh.num_faces());
    println!("Edges: {}", mesh.num_edges());

    if mesh.is_triangle_mesh() {
        println!("Mesh type: Triangle mesh");
    } else if mesh.is_quad_mesh() {
        println!("Mesh type: Quad mesh");
    } else {
        println!("Mesh type: Mixed polygon mesh");
    }

    if let Some((min, max)) = mesh.bounding_box() {
        println!(
            "Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
    }
    println!("Surface area: {:.6}", mesh.surface_area());
    println!("Average edge length: {:.6}", mesh.average_edge_length());

    let boundary_edges = mesh.edge_ids().filter(|&e| mesh.is_boundary_edge(e)).count();
    if boundary_edges == 0 {
        println!("Topology: Closed (no boundary)");
    } else {
        println!("Topology: Open ({} boundary edges)", boundary_edges);
    }

    let isolated = mesh.vertex_ids().filter(|&v| mesh.valence(v) == 0).count();
    if isolated > 0 {
        println!("Isolated vertices: {} (smoothing will fail)", isolated);
    }

    println!(
        "Marked edges: {} ({} from file, {} added)",
        mesh.num_marked_edges(),
        from_file,
        added
    );
    let (regular, feature, corner) = label_counts(&classify_vertices(&mesh));
    println!(
        "Vertex labels: {} regular, {} feature, {} corner",
        regular, feature, corner
    );

    Ok(())
}

fn cmd_smooth(
    input: &Path,
    output: &Path,
    target: Option<&Path>,
    options: &SmootherOptions,
    sharp_angle: Option<f64>,
    mark_boundary: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut mesh: HalfEdgeMesh = io::load(input)?;
    println!(
        "Loaded: {} vertices, {} faces, {} marked edges",
        mesh.num_vertices(),
        mesh.num_faces(),
        mesh.num_marked_edges()
    );

    let added = mark_creases(&mut mesh, sharp_angle, mark_boundary);
    if added > 0 {
        println!("Marked {} additional crease edges", added);
    }

    let reference: HalfEdgeMesh = match target {
        Some(path) => io::load(path)?,
        None if options.reproject_on_target => mesh.clone(),
        None => HalfEdgeMesh::new(),
    };

    let mode = if options.parallel { "parallel" } else { "sequential" };
    println!(
        "Smoothing ({} iterations, {:?} Laplacian, reprojection {}, {})...",
        options.iterations,
        options.laplacian_mode,
        if options.reproject_on_target { "on" } else { "off" },
        mode
    );

    let progress = create_progress();
    let start = Instant::now();
    feature_preserving_smooth_with_progress(&mut mesh, &reference, options, &progress)?;
    let elapsed = start.elapsed();
    println!("Done in {:.2?}", elapsed);

    io::save(&mesh, output)?;
    println!("Saved: {}", output.display());

    Ok(())
}
