//! contour-sew CLI - sew a vertex loop onto a reference contour.
//!
//! Usage: contour-sew <COMMAND> [OPTIONS] <SOURCE> [REFERENCE] <OUTPUT>
//!
//! Run `contour-sew --help` for available commands.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};

use contour_sew::algo::{self, Progress, RelaxOptions, SewOptions, DEFAULT_RADIUS};
use contour_sew::error::MeshError;
use contour_sew::io::{self, Format};
use contour_sew::mesh::{HalfEdgeMesh, VertexId};

#[derive(Parser)]
#[command(name = "contour-sew")]
#[command(author, version, about = "Sew a vertex loop onto a reference contour", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display mesh information
    Info {
        /// Input mesh file
        input: PathBuf,
    },

    /// Move the selected loop vertically onto the reference contour
    Align {
        /// Mesh holding the loop to move
        source: PathBuf,

        /// Mesh whose open contour is the target
        reference: PathBuf,

        /// Output mesh file
        output: PathBuf,

        #[command(flatten)]
        selection: SelectionArgs,
    },

    /// Relax the vertices around the selected loop
    Relax {
        /// Mesh holding the loop
        source: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Neighborhood radius in world units
        #[arg(short, long, default_value_t = DEFAULT_RADIUS)]
        radius: f64,

        #[command(flatten)]
        selection: SelectionArgs,

        #[command(flatten)]
        execution: ExecutionArgs,
    },

    /// Align the loop, then relax around it
    Sew {
        /// Mesh holding the loop to move
        source: PathBuf,

        /// Mesh whose open contour is the target
        reference: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Neighborhood radius in world units
        #[arg(short, long, default_value_t = DEFAULT_RADIUS)]
        radius: f64,

        /// Only align the loop
        #[arg(long)]
        no_relax: bool,

        #[command(flatten)]
        selection: SelectionArgs,

        #[command(flatten)]
        execution: ExecutionArgs,
    },
}

#[derive(Args)]
struct SelectionArgs {
    /// Select vertices by index (comma separated)
    #[arg(long, value_delimiter = ',')]
    select: Vec<usize>,

    /// Select every vertex on the source's open contour
    #[arg(long)]
    select_boundary: bool,
}

#[derive(Args)]
struct ExecutionArgs {
    /// Relax on all cores
    #[arg(long, conflicts_with = "sequential")]
    parallel: bool,

    /// Use single-threaded execution (the default)
    #[arg(long)]
    sequential: bool,
}

impl ExecutionArgs {
    fn is_parallel(&self) -> bool {
        self.parallel && !self.sequential
    }

    fn mode(&self) -> &'static str {
        if self.is_parallel() {
            "parallel"
        } else {
            "sequential"
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info { input } => {
            cmd_info(&input)?;
        }

        Commands::Align {
            source,
            reference,
            output,
            selection,
        } => {
            cmd_align(&source, &reference, &output, &selection)?;
        }

        Commands::Relax {
            source,
            output,
            radius,
            selection,
            execution,
        } => {
            cmd_relax(&source, &output, radius, &selection, &execution)?;
        }

        Commands::Sew {
            source,
            reference,
            output,
            radius,
            no_relax,
            selection,
            execution,
        } => {
            cmd_sew(&source, &reference, &output, radius, no_relax, &selection, &execution)?;
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

        let raw_percent = if current >= total {
            100
        } else {
            ((current * 100) + (total / 2)) / total
        };

        // Monotonic across phases
        let previous = max_percent.fetch_max(raw_percent, Ordering::Relaxed);
        let percent = previous.max(raw_percent);
        if percent == previous && percent != 100 {
            return;
        }

        let bar_width = 30;
        let filled = (percent * bar_width) / 100;
        eprint!(
            "\r[{}{}] {:3}% {}",
            "=".repeat(filled),
            " ".repeat(bar_width - filled),
            percent,
            message
        );
        let _ = std::io::stderr().flush();

        if current >= total {
            eprintln!();
        }
    })
}

fn check_radius(radius: f64) -> Result<(), MeshError> {
    if !radius.is_finite() || radius <= 0.0 {
        return Err(MeshError::invalid_param("radius", radius, "must be positive and finite"));
    }
    Ok(())
}

/// Load the source mesh and apply the selection flags to it.
fn load_source(path: &Path, selection: &SelectionArgs) -> Result<HalfEdgeMesh, MeshError> {
    let mut mesh: HalfEdgeMesh = io::load(path)?;

    if selection.select_boundary || !selection.select.is_empty() {
        mesh.deselect_all();
    }
    if selection.select_boundary {
        let count = mesh.select_contour_vertices();
        log::info!("selected {} contour vertices", count);
    }
    for &index in &selection.select {
        if index >= mesh.num_vertices() {
            return Err(MeshError::VertexOutOfRange {
                index,
                len: mesh.num_vertices(),
            });
        }
        mesh.select_vertex(VertexId::new(index), true);
    }

    println!(
        "Loaded: {} vertices, {} faces, {} selected",
        mesh.num_vertices(),
        mesh.num_faces(),
        mesh.num_selected()
    );
    if mesh.num_selected() == 0 {
        let hint = if Format::from_path(path).is_some_and(Format::keeps_selection) {
            "the file stores no selection"
        } else {
            "this format stores no selection"
        };
        println!("Nothing selected ({}); use --select or --select-boundary", hint);
    }

    Ok(mesh)
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mesh: HalfEdgeMesh = io::load(input)?;

    println!("File: {}", input.display());
    println!("Vertices: {}", mesh.num_vertices());
    println!("Faces: {}", mesh.num_faces());
    println!("Edges: {} ({} wire)", mesh.num_edges(), mesh.num_wire_edges());
    println!("Contour edges: {}", mesh.contour_edges().count());
    println!("Selected vertices: {}", mesh.num_selected());
    println!("Hidden vertices: {}", mesh.num_hidden());

    if let Some((min, max)) = mesh.bounding_box() {
        println!(
            "Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
        let diag = max - min;
        println!("Dimensions: {:.3} x {:.3} x {:.3}", diag.x, diag.y, diag.z);
    }

    Ok(())
}

fn cmd_align(
    source: &Path,
    reference: &Path,
    output: &Path,
    selection: &SelectionArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut mesh = load_source(source, selection)?;
    let target: HalfEdgeMesh = io::load(reference)?;

    println!("Aligning loop to {}...", reference.display());
    let progress = create_progress();

    let start = Instant::now();
    let summary = algo::align_with_progress(&mut mesh, &target, &progress)?;
    let elapsed = start.elapsed();

    println!(
        "Result: {} vertices aligned (max shift {:.6})",
        summary.aligned, summary.max_shift
    );
    io::save(&mesh, output)?;
    println!("Saved: {} ({:.2?})", output.display(), elapsed);

    Ok(())
}

fn cmd_relax(
    source: &Path,
    output: &Path,
    radius: f64,
    selection: &SelectionArgs,
    execution: &ExecutionArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    check_radius(radius)?;
    let mut mesh = load_source(source, selection)?;

    let options = RelaxOptions::default()
        .with_radius(radius)
        .with_parallel(execution.is_parallel());

    println!("Relaxing neighbors (radius={}, {})...", radius, execution.mode());
    let progress = create_progress();

    let start = Instant::now();
    let summary = algo::relax_with_progress(&mut mesh, &options, &progress)?;
    let elapsed = start.elapsed();

    println!("Result: {} vertices relaxed", summary.affected);
    io::save(&mesh, output)?;
    println!("Saved: {} ({:.2?})", output.display(), elapsed);

    Ok(())
}

fn cmd_sew(
    source: &Path,
    reference: &Path,
    output: &Path,
    radius: f64,
    no_relax: bool,
    selection: &SelectionArgs,
    execution: &ExecutionArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    check_radius(radius)?;
    let mut mesh = load_source(source, selection)?;
    let target: HalfEdgeMesh = io::load(reference)?;

    let options = SewOptions::default()
        .with_radius(radius)
        .with_relax(!no_relax)
        .with_parallel(execution.is_parallel());

    println!(
        "Sewing loop to {} (radius={}, relax={}, {})...",
        reference.display(),
        radius,
        options.relax,
        execution.mode()
    );
    let progress = create_progress();

    let start = Instant::now();
    let summary = algo::sew_with_progress(&mut mesh, &target, &options, &progress)?;
    let elapsed = start.elapsed();

    println!(
        "Result: {} vertices aligned (max shift {:.6}), {} vertices relaxed",
        summary.align.aligned, summary.align.max_shift, summary.relax.affected
    );
    io::save(&mesh, output)?;
    println!("Saved: {} ({:.2?})", output.display(), elapsed);

    Ok(())
}
