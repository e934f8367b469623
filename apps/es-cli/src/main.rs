use clap::{Parser, Subcommand};
use es_app::{
    AppResult, RunMode, RunOptions, RunRequest, RunResponse, ensure_run, export_csv, final_values,
    list_components, list_runs, load_project, load_run, validate_project,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "es-cli")]
#[command(about = "energysys CLI - energy conversion and storage component simulation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate project file syntax and parameters
    Validate {
        /// Path to the project file (YAML or JSON)
        project_path: PathBuf,
    },
    /// List components in a project
    Components {
        /// Path to the project file (YAML or JSON)
        project_path: PathBuf,
    },
    /// Drive a component over a load profile
    Run {
        /// Path to the project file (YAML or JSON)
        project_path: PathBuf,
        /// Component ID to simulate
        component_id: String,
        /// Profile ID to apply
        profile_id: String,
        /// Record every N-th step
        #[arg(long, default_value_t = 1)]
        record_every: usize,
        /// Skip cache and force re-run
        #[arg(long)]
        no_cache: bool,
    },
    /// Stationary operating points of a conversion component
    Stationary {
        /// Path to the project file (YAML or JSON)
        project_path: PathBuf,
        /// Component ID to evaluate
        component_id: String,
        /// Number of evenly spaced targets from 0 to 1
        #[arg(long, default_value_t = 11)]
        points: usize,
        /// Time step in minutes
        #[arg(long, default_value_t = 1.0)]
        ts: f64,
        /// Skip cache and force re-run
        #[arg(long)]
        no_cache: bool,
    },
    /// List cached runs of a component
    Runs {
        /// Path to the project file (YAML or JSON)
        project_path: PathBuf,
        /// Component ID to list runs for
        component_id: String,
    },
    /// Export a cached run as CSV
    Export {
        /// Path to the project file (YAML or JSON)
        project_path: PathBuf,
        /// Run ID
        run_id: String,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { project_path } => cmd_validate(&project_path),
        Commands::Components { project_path } => cmd_components(&project_path),
        Commands::Run {
            project_path,
            component_id,
            profile_id,
            record_every,
            no_cache,
        } => cmd_run(
            &project_path,
            &component_id,
            RunMode::Profile { profile_id },
            RunOptions {
                use_cache: !no_cache,
                record_every,
                ..RunOptions::default()
            },
        ),
        Commands::Stationary {
            project_path,
            component_id,
            points,
            ts,
            no_cache,
        } => cmd_run(
            &project_path,
            &component_id,
            RunMode::Stationary { ts_min: ts, points },
            RunOptions {
                use_cache: !no_cache,
                ..RunOptions::default()
            },
        ),
        Commands::Runs {
            project_path,
            component_id,
        } => cmd_runs(&project_path, &component_id),
        Commands::Export {
            project_path,
            run_id,
            output,
        } => cmd_export(&project_path, &run_id, output.as_deref()),
    }
}

fn cmd_validate(project_path: &Path) -> AppResult<()> {
    println!("Validating project: {}", project_path.display());
    let project = load_project(project_path)?;
    validate_project(&project)?;
    println!("✓ Project is valid");
    Ok(())
}

fn cmd_components(project_path: &Path) -> AppResult<()> {
    let project = load_project(project_path)?;
    let components = list_components(&project);

    if components.is_empty() {
        println!("No components found in project");
    } else {
        println!("Components in project '{}':", project.name);
        for c in components {
            let unit = match c.kind {
                es_app::ComponentKind::Conversion => "kW",
                es_app::ComponentKind::Storage => "kWh",
            };
            println!(
                "  {} - {} ({}, {} {}, carrier {})",
                c.id,
                c.name,
                c.kind.label(),
                c.size,
                unit,
                c.carrier
            );
        }
    }
    if !project.profiles.is_empty() {
        println!("Profiles:");
        for p in &project.profiles {
            println!(
                "  {} - {} ({} steps of {} min)",
                p.id,
                p.name,
                p.kind.steps(),
                p.ts_min
            );
        }
    }
    Ok(())
}

fn cmd_run(
    project_path: &Path,
    component_id: &str,
    mode: RunMode,
    options: RunOptions,
) -> AppResult<()> {
    match &mode {
        RunMode::Profile { profile_id } => {
            println!("Running component '{}' over profile '{}'", component_id, profile_id)
        }
        RunMode::Stationary { ts_min, points } => println!(
            "Solving {} stationary points for component '{}' (ts = {} min)",
            points, component_id, ts_min
        ),
    }

    tracing::debug!(
        project = %project_path.display(),
        component = component_id,
        use_cache = options.use_cache,
        "run requested"
    );
    let request = RunRequest {
        project_path,
        component_id,
        mode,
        options,
    };
    let response = ensure_run(&request)?;
    print_response(project_path, &response)
}

fn print_response(project_path: &Path, response: &RunResponse) -> AppResult<()> {
    if response.loaded_from_cache {
        println!("✓ Loaded from cache: {}", response.run_id);
    } else {
        println!("✓ Simulation completed: {}", response.run_id);
    }

    let (manifest, records) = load_run(project_path, &response.run_id)?;
    println!("  Records: {}", records.len());

    if !manifest.totals.is_empty() {
        println!("\nTotals:");
        for (name, value) in &manifest.totals {
            println!("  {:<20} {:>14.4}", name, value);
        }
    }

    println!("\nFinal state:");
    for (name, value) in final_values(&manifest, &records) {
        println!("  {:<20} {:>14.4}", name, value);
    }
    Ok(())
}

fn cmd_runs(project_path: &Path, component_id: &str) -> AppResult<()> {
    let runs = list_runs(project_path, component_id)?;

    if runs.is_empty() {
        println!("No cached runs found for component: {}", component_id);
    } else {
        println!("Cached runs for component '{}':", component_id);
        for manifest in runs {
            let source = manifest.profile_id.as_deref().unwrap_or("stationary");
            println!("  {} ({}, {})", manifest.run_id, source, manifest.timestamp);
        }
    }
    Ok(())
}

fn cmd_export(project_path: &Path, run_id: &str, output: Option<&Path>) -> AppResult<()> {
    if let Some(path) = output {
        let file = std::io::BufWriter::new(std::fs::File::create(path)?);
        let rows = export_csv(project_path, run_id, file)?;
        println!("✓ Exported {} records to {}", rows, path.display());
    } else {
        export_csv(project_path, run_id, std::io::stdout().lock())?;
    }
    Ok(())
}
