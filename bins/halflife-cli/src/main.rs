//! halflife: headless driver for the radioactive decay simulator.
//!
//! Lists the isotope catalog, runs a population through simulated time at a
//! fixed frame rate (or against the wall clock), and prints the theoretical
//! survival curve.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use halflife_core::constants::{DAYS_PER_YEAR, DEFAULT_CURVE_RESOLUTION};
use halflife_core::Catalog;
use halflife_decay::CurveModel;
use halflife_sim::{SharedEngine, SimConfig, SimulationEngine};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::time::MissedTickBehavior;
use tracing::info;

/// Radioactive decay simulator.
#[derive(Parser, Debug)]
#[command(name = "halflife")]
#[command(version, about = "Watch a population of atoms decay, one half-life at a time.")]
struct Cli {
    /// Config file (default: <config dir>/halflife/halflife.toml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error). Overrides the config file.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log output format ("text" or "json").
    #[arg(long, global = true, default_value = "text")]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the isotope catalog.
    Isotopes,
    /// Run a simulation and report the result.
    Run(RunArgs),
    /// Print the theoretical survival curve of an isotope.
    Curve(CurveArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Isotope identifier (default from config).
    #[arg(short, long)]
    isotope: Option<String>,

    /// Number of particles (default from config).
    #[arg(short, long)]
    count: Option<usize>,

    /// Clock rate in days of simulated time per real second.
    #[arg(short, long)]
    rate: Option<f64>,

    /// Index into the isotope's rate presets (see `halflife isotopes`).
    #[arg(short, long, conflicts_with = "rate")]
    preset: Option<usize>,

    /// Real seconds to simulate.
    #[arg(short, long, default_value_t = 10.0)]
    seconds: f64,

    /// Frames per real second.
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Seed for lifetime sampling. Random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Print the final snapshot as JSON.
    #[arg(long)]
    json: bool,

    /// Pace frames against the wall clock instead of stepping instantly.
    #[arg(long)]
    realtime: bool,
}

#[derive(Args, Debug)]
struct CurveArgs {
    /// Isotope identifier (default from config).
    #[arg(short, long)]
    isotope: Option<String>,

    /// Curve end time in days (default: four half-lives).
    #[arg(short, long)]
    t_max: Option<f64>,

    /// Number of segments; the curve has one more point than this.
    #[arg(short, long, default_value_t = DEFAULT_CURVE_RESOLUTION)]
    resolution: usize,

    /// Print points as JSON.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = SimConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    init_logging(level, &cli.log_format);

    match cli.command {
        Commands::Isotopes => list_isotopes(&config),
        Commands::Run(args) => run(&config, args).await,
        Commands::Curve(args) => curve(&config, args),
    }
}

/// Print every catalog entry with its rate presets.
fn list_isotopes(config: &SimConfig) -> Result<()> {
    let catalog = config.catalog().context("Invalid isotope in configuration")?;
    for isotope in catalog.iter() {
        let d = &isotope.display;
        println!(
            "{:<12} {} -> {}  half-life {}",
            isotope.id,
            d.symbol,
            d.decay_product,
            format_days(isotope.half_life.get())
        );
        for (i, preset) in d.rate_presets.iter().enumerate() {
            println!("    [{i}] {:<16} {} days/sec", preset.label, preset.rate);
        }
    }
    Ok(())
}

async fn run(config: &SimConfig, args: RunArgs) -> Result<()> {
    if !args.fps.is_finite() || args.fps <= 0.0 {
        bail!("--fps must be positive, got {}", args.fps);
    }
    if !args.seconds.is_finite() || args.seconds < 0.0 {
        bail!("--seconds must be non-negative, got {}", args.seconds);
    }

    let isotope_id = args.isotope.clone().unwrap_or_else(|| config.isotope.clone());
    let count = args.count.unwrap_or(config.population);

    let mut engine = config.build_engine().context("Invalid configuration")?;
    let rate = resolve_rate(engine.catalog(), &isotope_id, &args, config.rate)?;
    engine.set_rate(rate).context("Invalid rate")?;

    let created = match args.seed {
        Some(seed) => {
            engine.create_population(&isotope_id, count, &mut StdRng::seed_from_u64(seed))
        }
        None => engine.create_population_from_entropy(&isotope_id, count),
    };
    created.with_context(|| format!("Failed to create population of {isotope_id}"))?;
    engine.start();

    info!(isotope = %isotope_id, count, rate, seconds = args.seconds, fps = args.fps, "run started");

    if args.realtime {
        let shared = SharedEngine::new(engine);
        drive_realtime(&shared, args.seconds, args.fps).await?;
        shared.with_engine(|engine| report(engine, args.json))
    } else {
        drive_fixed(&mut engine, args.seconds, args.fps)?;
        report(&engine, args.json)
    }
}

/// Rate from `--preset`, then `--rate`, then the configured default.
fn resolve_rate(catalog: &Catalog, isotope_id: &str, args: &RunArgs, default: f64) -> Result<f64> {
    if let Some(index) = args.preset {
        let isotope = catalog.get(isotope_id)?;
        let Some(preset) = isotope.display.rate_presets.get(index) else {
            bail!(
                "{isotope_id} has {} rate presets, no index {index}",
                isotope.display.rate_presets.len()
            );
        };
        info!(label = %preset.label, "using rate preset");
        return Ok(preset.rate);
    }
    Ok(args.rate.unwrap_or(default))
}

/// Step the engine `seconds * fps` times with a constant `1/fps` delta.
fn drive_fixed(engine: &mut SimulationEngine, seconds: f64, fps: f64) -> Result<()> {
    let dt = 1.0 / fps;
    let frames = (seconds * fps).round() as u64;
    let frames_per_second = fps.round().max(1.0) as u64;

    for frame in 1..=frames {
        engine.tick(dt)?;
        if frame % frames_per_second == 0 {
            log_progress(engine);
        }
    }
    Ok(())
}

/// Tick against the wall clock until `seconds` have passed or Ctrl+C.
async fn drive_realtime(engine: &SharedEngine, seconds: f64, fps: f64) -> Result<()> {
    let mut interval = tokio::time::interval(Duration::from_secs_f64(1.0 / fps));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let started = Instant::now();
    let mut last = started;
    let mut next_report = 1.0;
    loop {
        tokio::select! {
            _ = interval.tick() => {
                let now = Instant::now();
                engine.tick(now.duration_since(last).as_secs_f64())?;
                last = now;

                let elapsed = now.duration_since(started).as_secs_f64();
                if elapsed >= next_report {
                    engine.with_engine(|e| log_progress(e));
                    next_report += 1.0;
                }
                if elapsed >= seconds {
                    break;
                }
            }
            res = &mut shutdown => {
                res.context("Failed to listen for Ctrl+C")?;
                info!("received Ctrl+C, stopping run");
                break;
            }
        }
    }
    engine.pause();
    Ok(())
}

fn log_progress(engine: &SimulationEngine) {
    info!(
        time = %format_days(engine.simulated_time()),
        decayed = engine.decayed_count(),
        remaining = engine.remaining_count(),
        expected = engine.expected_remaining().unwrap_or_default(),
        "progress"
    );
}

fn report(engine: &SimulationEngine, json: bool) -> Result<()> {
    if json {
        let out = serde_json::to_string_pretty(&engine.snapshot())
            .context("Failed to serialise snapshot")?;
        println!("{out}");
        return Ok(());
    }

    if let Some(isotope) = engine.isotope() {
        println!(
            "Isotope:   {} ({} -> {})",
            isotope.id, isotope.display.symbol, isotope.display.decay_product
        );
        println!("Half-life: {}", format_days(isotope.half_life.get()));
    }
    println!("Elapsed:   {}", format_days(engine.simulated_time()));
    println!(
        "Decayed:   {} / {}",
        engine.decayed_count(),
        engine.population_size()
    );
    if let Some(expected) = engine.expected_remaining() {
        println!(
            "Remaining: {} (expected {expected:.1})",
            engine.remaining_count()
        );
    }
    Ok(())
}

fn curve(config: &SimConfig, args: CurveArgs) -> Result<()> {
    let catalog = config.catalog().context("Invalid isotope in configuration")?;
    let isotope_id = args.isotope.as_deref().unwrap_or(&config.isotope);
    let half_life = catalog.get(isotope_id)?.half_life;
    let t_max = args
        .t_max
        .unwrap_or_else(|| CurveModel::timeline_span(half_life));

    let points: Vec<_> = CurveModel::curve_points(half_life, t_max, args.resolution)
        .context("Invalid curve parameters")?
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&points)?);
        return Ok(());
    }

    println!("{:>24} {:>10}", "time", "fraction");
    for p in &points {
        println!("{:>24} {:>10.6}", format_days(p.t), p.fraction);
    }
    let marks = CurveModel::half_life_marks(half_life, t_max);
    if !marks.is_empty() {
        let labels: Vec<String> = marks.iter().map(|t| format_days(*t)).collect();
        println!("half-life marks: {}", labels.join(", "));
    }
    Ok(())
}

/// Human-readable duration from a value in days.
fn format_days(days: f64) -> String {
    let years = days / DAYS_PER_YEAR;
    if years >= 1e9 {
        format!("{:.2}B years", years / 1e9)
    } else if years >= 1e6 {
        format!("{:.2}M years", years / 1e6)
    } else if years >= 1.0 {
        format!("{years:.2} years")
    } else {
        format!("{days:.1} days")
    }
}

/// Initialize tracing subscriber with the given log level and output format.
///
/// `RUST_LOG` takes precedence over `level_str` when set.
fn init_logging(level_str: &str, format: &str) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_str));

    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
