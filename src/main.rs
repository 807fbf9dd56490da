//! `automata-studio` runs grid automata from rule files or presets.
//!
//! **Usage:**
//! ```text
//! automata-studio run --rules sir.json --rows 40 --cols 40 --distribution 0.1,0.8,0.1 --png a.png
//! automata-studio life --birth 3..3 --survival 2..3 --generations 50 --frames frames/
//! automata-studio preset sir --infection 0.4 --recovery 0.1 --out sir.json
//! ```

use anyhow::{bail, Context, Result};
use automata_core::initializer::{random_binary, random_from_distribution};
use automata_core::persistence::{load_csv, load_rule_set, save_csv, save_rule_set};
use automata_core::render::{render_grid, save_png};
use automata_core::{Grid, InitialState, Palette, RuleSet, SimulationConfig, StdRandom, Stepper};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Run 2D cellular automata and export the results.
#[derive(Parser)]
#[command(name = "automata-studio", version, about)]
struct Cli {
    /// Log every generation (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a rule set loaded from a JSON file
    Run {
        /// Rule set JSON file
        #[arg(long)]
        rules: PathBuf,

        #[command(flatten)]
        run: RunArgs,
    },
    /// Run the binary life game with custom bounds
    Life {
        #[command(flatten)]
        bounds: LifeBounds,

        #[command(flatten)]
        run: RunArgs,
    },
    /// Write a preset rule set as JSON
    Preset {
        #[arg(value_enum)]
        kind: PresetKind,

        /// Output file
        #[arg(long)]
        out: PathBuf,

        /// SIR: chance a susceptible cell next to an infected one is infected
        #[arg(long, default_value_t = 0.3)]
        infection: f64,

        /// SIR: chance an infected cell is removed
        #[arg(long, default_value_t = 0.1)]
        recovery: f64,

        #[command(flatten)]
        bounds: LifeBounds,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PresetKind {
    Sir,
    Life,
}

#[derive(Args)]
struct LifeBounds {
    /// Live-neighbor range that brings a dead cell to life
    #[arg(long, default_value = "3..3", value_parser = parse_bounds)]
    birth: (u32, u32),

    /// Live-neighbor range that keeps a live cell alive
    #[arg(long, default_value = "2..3", value_parser = parse_bounds)]
    survival: (u32, u32),
}

/// Run settings. Flags override values from `--config`.
#[derive(Args)]
struct RunArgs {
    /// Simulation config JSON file
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    rows: Option<usize>,

    #[arg(long)]
    cols: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    generations: Option<usize>,

    /// Side of one cell in rendered images, in pixels
    #[arg(long)]
    pixel_size: Option<u32>,

    /// Initial chance of a cell being alive (binary rule sets)
    #[arg(long, conflicts_with_all = ["distribution", "initial_csv"])]
    alive: Option<f64>,

    /// Initial probability of each state, in alphabet order
    #[arg(long, value_delimiter = ',', conflicts_with = "initial_csv")]
    distribution: Option<Vec<f64>>,

    /// Read the first generation from a CSV file
    #[arg(long)]
    initial_csv: Option<PathBuf>,

    /// Write the first generation as CSV
    #[arg(long)]
    csv_initial: Option<PathBuf>,

    /// Write the last generation as CSV
    #[arg(long)]
    csv_final: Option<PathBuf>,

    /// Render the last generation as PNG
    #[arg(long)]
    png: Option<PathBuf>,

    /// Render every generation into this directory
    #[arg(long)]
    frames: Option<PathBuf>,
}

/// Parse `LO..HI` (or a single `N` for `N..N`).
fn parse_bounds(value: &str) -> Result<(u32, u32), String> {
    let parse = |s: &str| {
        s.trim()
            .parse::<u32>()
            .map_err(|_| format!("'{}' is not a neighbor count", s))
    };
    match value.split_once("..") {
        Some((lo, hi)) => Ok((parse(lo)?, parse(hi)?)),
        None => {
            let n = parse(value)?;
            Ok((n, n))
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Run { rules, run } => {
            let rule_set = load_rule_set(&rules)
                .with_context(|| format!("loading rule set {}", rules.display()))?;
            simulate(rule_set, &run)
        }
        Command::Life { bounds, run } => {
            let rule_set = RuleSet::life_like(bounds.birth, bounds.survival)?;
            simulate(rule_set, &run)
        }
        Command::Preset {
            kind,
            out,
            infection,
            recovery,
            bounds,
        } => {
            let rule_set = match kind {
                PresetKind::Sir => RuleSet::sir(infection, recovery)?,
                PresetKind::Life => RuleSet::life_like(bounds.birth, bounds.survival)?,
            };
            save_rule_set(&rule_set, &out)
                .with_context(|| format!("writing {}", out.display()))?;
            Ok(())
        }
    }
}

/// Merge the config file with command-line overrides.
fn build_config(args: &RunArgs) -> Result<SimulationConfig> {
    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    if let Some(rows) = args.rows {
        config.rows = rows;
    }
    if let Some(cols) = args.cols {
        config.cols = cols;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(generations) = args.generations {
        config.generations = generations;
    }
    if let Some(pixel_size) = args.pixel_size {
        config.pixel_size = pixel_size;
    }
    if let Some(probability) = args.alive {
        config.initial = InitialState::Alive { probability };
    }
    if let Some(probabilities) = &args.distribution {
        config.initial = InitialState::Distribution {
            probabilities: probabilities.clone(),
        };
    }
    config.validate()?;
    Ok(config)
}

fn initial_grid(
    args: &RunArgs,
    config: &SimulationConfig,
    rule_set: &RuleSet,
    rng: &mut StdRandom,
) -> Result<Grid> {
    if let Some(path) = &args.initial_csv {
        return load_csv(path, rule_set.states())
            .with_context(|| format!("loading initial grid {}", path.display()));
    }
    let grid = match &config.initial {
        InitialState::Alive { probability } => {
            if !matches!(rule_set.states(), [0, 1]) {
                bail!(
                    "--alive needs a binary rule set, this one has states {:?}; use --distribution",
                    rule_set.states()
                );
            }
            random_binary(config.rows, config.cols, *probability, rng)?
        }
        InitialState::Distribution { probabilities } => random_from_distribution(
            config.rows,
            config.cols,
            rule_set.states(),
            probabilities,
            rng,
        )?,
    };
    Ok(grid)
}

fn simulate(rule_set: RuleSet, args: &RunArgs) -> Result<()> {
    let config = build_config(args)?;
    let palette = Palette::from_hex(&config.colors)?;
    let mut rng = StdRandom::from_seed(config.seed);
    let grid = initial_grid(args, &config, &rule_set, &mut rng)?;

    info!(
        rows = grid.rows(),
        cols = grid.cols(),
        seed = config.seed,
        generations = config.generations,
        "starting run"
    );

    if let Some(path) = &args.csv_initial {
        save_csv(&grid, path).with_context(|| format!("writing {}", path.display()))?;
    }
    if let Some(dir) = &args.frames {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating frame directory {}", dir.display()))?;
        write_frame(dir, 0, &grid, &palette, config.pixel_size)?;
    }

    let mut stepper = Stepper::new(grid, rule_set, Box::new(rng));
    for _ in 0..config.generations {
        stepper
            .step()
            .with_context(|| format!("computing generation {}", stepper.generation() + 1))?;
        if let Some(dir) = &args.frames {
            write_frame(
                dir,
                stepper.generation(),
                stepper.grid(),
                &palette,
                config.pixel_size,
            )?;
        }
    }

    let grid = stepper.grid();
    if let Some(path) = &args.csv_final {
        save_csv(grid, path).with_context(|| format!("writing {}", path.display()))?;
    }
    if let Some(path) = &args.png {
        let img = render_grid(grid, &palette, config.pixel_size)?;
        save_png(&img, path).with_context(|| format!("writing {}", path.display()))?;
    }

    info!(
        generation = stepper.generation(),
        population = ?stepper.population(),
        "run finished"
    );
    Ok(())
}

fn write_frame(
    dir: &Path,
    generation: usize,
    grid: &Grid,
    palette: &Palette,
    pixel_size: u32,
) -> Result<()> {
    let path = dir.join(format!("frame_{:04}.png", generation));
    let img = render_grid(grid, palette, pixel_size)
        .with_context(|| format!("rendering generation {}", generation))?;
    save_png(&img, &path).with_context(|| format!("writing {}", path.display()))
}
