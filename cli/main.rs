use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process;

use auxometer::ensemble;
use auxometer::holdout::{baseline_sse, contest_score, shuffle_split, sum_squared_error};
use auxometer::scenario::{EvalMode, Scenario};
use rand::SeedableRng;
use rand::rngs::StdRng;

#[derive(Clone, Copy, ValueEnum)]
enum ScenarioCli {
    S1,
    S2,
    S3,
}

impl From<ScenarioCli> for Scenario {
    fn from(value: ScenarioCli) -> Self {
        match value {
            ScenarioCli::S1 => Scenario::S1,
            ScenarioCli::S2 => Scenario::S2,
            ScenarioCli::S3 => Scenario::S3,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeCli {
    Example,
    Provisional,
    Full,
}

impl From<ModeCli> for EvalMode {
    fn from(value: ModeCli) -> Self {
        match value {
            ModeCli::Example => EvalMode::Example,
            ModeCli::Provisional => EvalMode::Provisional,
            ModeCli::Full => EvalMode::Full,
        }
    }
}

/// Local holdout evaluation of the growth-record prediction pipeline.
#[derive(Parser)]
#[command(
    name = "auxometer",
    about = "Ensemble ridge regression over longitudinal growth records"
)]
struct Cli {
    /// Path to the labeled CSV (one line per subject-checkpoint record)
    data: PathBuf,

    /// Prediction scenario
    #[arg(long, value_enum, default_value_t = ScenarioCli::S1)]
    scenario: ScenarioCli,

    /// Evaluation tier (selects the ensemble repetition count)
    #[arg(long, value_enum, default_value_t = ModeCli::Example)]
    mode: ModeCli,

    /// Seed for the per-repetition imputation generators
    #[arg(long, default_value = "1")]
    seed: u64,

    /// Seed for the train/test subject shuffle
    #[arg(long, default_value = "1")]
    split_seed: u64,

    /// Fraction of subjects assigned to the training fold
    #[arg(long, default_value = "0.67")]
    train_fraction: f64,
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let scenario = Scenario::from(cli.scenario);
    let mode = EvalMode::from(cli.mode);

    let raw = std::fs::read_to_string(&cli.data)?;
    let lines: Vec<String> = raw.lines().map(str::to_string).collect();
    log::info!("read {} lines from {}", lines.len(), cli.data.display());

    let mut split_rng = StdRng::seed_from_u64(cli.split_seed);
    let split = shuffle_split(&lines, scenario, cli.train_fraction, &mut split_rng);
    log::info!(
        "train fold: {} subjects ({} rows); test fold: {} subjects ({} rows)",
        split.train_outcomes.len(),
        split.train.len(),
        split.test_outcomes.len(),
        split.test.len()
    );

    let predictions = ensemble::predict(mode, scenario, &split.train, &split.test, cli.seed)?;
    for (i, p) in predictions.iter().enumerate() {
        log::debug!("prediction {i}: {p:.4}");
    }

    let sse = sum_squared_error(&predictions, &split.test_outcomes);
    let sse0 = baseline_sse(&split.train_outcomes, &split.test_outcomes);
    println!("SSE:      {sse:.4}");
    println!("baseline: {sse0:.4}");
    println!("score:    {:.2}", contest_score(sse, sse0));

    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
