//! # Ensemble Driver
//!
//! The public prediction contract. Groups and loads both line sets, flattens
//! them into per-subject feature matrices, then repeats the stochastic
//! pipeline {impute → density-encode → expand interactions → regress} with an
//! independently seeded generator per repetition and averages the predicted
//! vectors. Imputation is random, so averaging across repetitions suppresses
//! the variance it induces.
//!
//! Repetitions are independent and run on the rayon pool; the per-repetition
//! vectors are collected in repetition order and summed sequentially, so a
//! fixed seed gives bit-identical output regardless of scheduling.

use crate::encode::encode_columns;
use crate::flatten::{flatten, targets};
use crate::impute::{ImputeError, impute_columns};
use crate::interact::expand_interactions;
use crate::matrix::Matrix;
use crate::regress::{RegressError, fit_and_predict};
use crate::scenario::{EvalMode, Scenario};
use crate::subjects::subject_ranges;
use crate::table::{LoadConfig, TableError, load_table};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use thiserror::Error;

/// Field delimiter of the input records.
pub const DELIMITER: char = ',';

/// Sentinel token for a missing field.
pub const NA_TOKEN: &str = "NA";

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("failed to load input table: {0}")]
    Table(#[from] TableError),
    #[error(transparent)]
    Impute(#[from] ImputeError),
    #[error(transparent)]
    Regress(#[from] RegressError),
    #[error("train and test feature widths differ: {train} vs {test}")]
    ColumnMismatch { train: usize, test: usize },
}

/// Loader configuration shared by both folds.
pub fn load_config() -> LoadConfig {
    LoadConfig::new().delimiter(DELIMITER).na_token(NA_TOKEN)
}

/// Predicts one outcome per distinct test subject, in first-occurrence order.
///
/// `mode` selects only the ensemble repetition count; `seed` makes the run
/// reproducible (repetition `k` draws from a generator seeded with
/// `seed + k`).
pub fn predict(
    mode: EvalMode,
    scenario: Scenario,
    training: &[String],
    testing: &[String],
    seed: u64,
) -> Result<Vec<f64>, PipelineError> {
    let train_ranges = subject_ranges(training);
    let test_ranges = subject_ranges(testing);

    let config = load_config();
    let train_table = load_table(training, &config)?;
    let test_table = load_table(testing, &config)?;

    let x_train = flatten(&train_table, &train_ranges, scenario);
    let x_test = flatten(&test_table, &test_ranges, scenario);
    if x_train.cols() != x_test.cols() {
        return Err(PipelineError::ColumnMismatch {
            train: x_train.cols(),
            test: x_test.cols(),
        });
    }
    let y = targets(&train_table, &train_ranges);

    let repetitions = scenario.repetitions(mode);
    log::info!(
        "{scenario:?}/{mode:?}: {} train subjects, {} test subjects, {} features, {repetitions} repetitions",
        train_ranges.len(),
        test_ranges.len(),
        x_train.cols()
    );

    let per_repetition: Vec<Vec<f64>> = (0..repetitions)
        .into_par_iter()
        .map(|k| run_repetition(&x_train, &y, &x_test, scenario, seed.wrapping_add(k as u64)))
        .collect::<Result<_, _>>()?;

    let mut averaged = vec![0.0; test_ranges.len()];
    for prediction in &per_repetition {
        for (sum, &value) in averaged.iter_mut().zip(prediction) {
            *sum += value;
        }
    }
    for value in averaged.iter_mut() {
        *value /= repetitions as f64;
    }

    Ok(averaged)
}

/// One pass of the stochastic pipeline over fresh working copies.
fn run_repetition(
    x_train: &Matrix,
    y: &[f64],
    x_test: &Matrix,
    scenario: Scenario,
    seed: u64,
) -> Result<Vec<f64>, PipelineError> {
    let mut train = x_train.clone();
    let mut test = x_test.clone();

    let mut rng = StdRng::seed_from_u64(seed);
    impute_columns(&mut train, &mut test, &mut rng)?;
    encode_columns(&mut train, &mut test, y, scenario.density_columns());

    let train = expand_interactions(&train, scenario.interaction_pairs());
    let test = expand_interactions(&test, scenario.interaction_pairs());

    let prediction = fit_and_predict(
        &train,
        y,
        &test,
        scenario.ridge_c(),
        scenario.optimizer_budget(),
    )?;
    log::debug!("repetition seed {seed} done");
    Ok(prediction)
}
