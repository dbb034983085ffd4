use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, anyhow};
use clap::{ArgAction, Parser, ValueEnum};
use shell_theorem::config::{
    ExperimentConfig, SamplingMethodConfig, SummationConfig, load_experiment,
};
use shell_theorem::experiment::{Experiment, TierReport, seeded_rng};
use shell_theorem::export::{self, csv as export_csv, json as export_json};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

/// Estimate the gravity on an observer on or inside a hollow shell by Monte Carlo summation.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Monte Carlo shell theorem experiment (one acceleration vector per tier)"
)]
struct Cli {
    /// Experiment config (.toml, otherwise YAML); flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Comma-separated sample counts, e.g. 1000,10000
    #[arg(long, value_delimiter = ',')]
    tiers: Option<Vec<usize>>,

    /// Shell radius in metres
    #[arg(long)]
    radius: Option<f64>,

    /// Total shell mass in kilograms
    #[arg(long)]
    mass: Option<f64>,

    /// Observer position as X,Y,Z in metres (defaults to the north pole)
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    observer: Option<Vec<f64>>,

    /// RNG seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Sphere sampling method
    #[arg(long, value_enum)]
    method: Option<MethodArg>,

    /// Reduction strategy for the per-point contributions
    #[arg(long, value_enum)]
    summation: Option<SummationArg>,

    /// Spread samples across threads
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Samples per parallel chunk
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Repetitions per tier (mean and spread are reported when > 1)
    #[arg(long)]
    trials: Option<usize>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Output file (use '-' for stdout)
    #[arg(long, default_value = "-")]
    output: PathBuf,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Copy, Clone, ValueEnum, Debug)]
enum MethodArg {
    Archimedes,
    Marsaglia,
}

#[derive(Copy, Clone, ValueEnum, Debug)]
enum SummationArg {
    Sequential,
    Pairwise,
    Compensated,
}

#[derive(Copy, Clone, ValueEnum, Debug, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Csv,
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = build_config(&cli)?;
    let experiment = Experiment::new(config)?;
    let (mut rng, seed) = seeded_rng(experiment.config().sampling.seed);
    info!(
        seed,
        method = %experiment.options().method,
        summation = %experiment.options().summation,
        "starting shell gravity experiment"
    );

    let mut writer = export::writer_for_path(&cli.output)
        .with_context(|| format!("opening output {}", cli.output.display()))?;

    match cli.format {
        OutputFormat::Text => {
            for &numpoints in experiment.tiers() {
                let tier = experiment.run_tier(numpoints, &mut rng)?;
                write_text(&mut *writer, &tier)?;
                writer.flush()?;
            }
        }
        OutputFormat::Csv => {
            export_csv::write_header(&mut *writer)?;
            for &numpoints in experiment.tiers() {
                let tier = experiment.run_tier(numpoints, &mut rng)?;
                tier.to_record().write_to(&mut *writer)?;
                writer.flush()?;
            }
        }
        OutputFormat::Json => {
            let mut report = experiment.run(seed, &mut rng)?;
            report.generated_at = Some(chrono::Utc::now().to_rfc3339());
            export_json::write_report(&mut *writer, &report)?;
        }
    }

    writer.flush()?;
    Ok(())
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn build_config(cli: &Cli) -> anyhow::Result<ExperimentConfig> {
    let mut config = match &cli.config {
        Some(path) => load_experiment(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ExperimentConfig::default(),
    };

    if let Some(tiers) = &cli.tiers {
        config.tiers = tiers.clone();
    }
    if let Some(radius) = cli.radius {
        config.shell.radius_m = radius;
    }
    if let Some(mass) = cli.mass {
        config.shell.mass_kg = mass;
    }
    if let Some(observer) = &cli.observer {
        let coords: [f64; 3] = observer
            .as_slice()
            .try_into()
            .map_err(|_| anyhow!("--observer expects exactly three values, got {}", observer.len()))?;
        config.shell.observer_m = Some(coords);
    }
    if let Some(seed) = cli.seed {
        config.sampling.seed = Some(seed);
    }
    if let Some(method) = cli.method {
        config.sampling.method = match method {
            MethodArg::Archimedes => SamplingMethodConfig::Archimedes,
            MethodArg::Marsaglia => SamplingMethodConfig::Marsaglia,
        };
    }
    if let Some(summation) = cli.summation {
        config.sampling.summation = match summation {
            SummationArg::Sequential => SummationConfig::Sequential,
            SummationArg::Pairwise => SummationConfig::Pairwise,
            SummationArg::Compensated => SummationConfig::Compensated,
        };
    }
    if cli.parallel {
        config.sampling.parallel = true;
    }
    if let Some(chunk_size) = cli.chunk_size {
        config.sampling.chunk_size = chunk_size;
    }
    if let Some(trials) = cli.trials {
        config.trials = trials;
    }

    config.validate()?;
    Ok(config)
}

fn write_text(writer: &mut dyn Write, tier: &TierReport) -> std::io::Result<()> {
    writeln!(writer, "{}", tier.acceleration)?;
    if tier.statistics.trials > 1 {
        writeln!(
            writer,
            "  n = {}: mean |a| = {:.6e} ± {:.6e} m/s² over {} trials",
            tier.numpoints,
            tier.statistics.mean_magnitude,
            tier.statistics.std_dev_magnitude,
            tier.statistics.trials
        )?;
    }
    Ok(())
}
