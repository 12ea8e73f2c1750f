//! # Missing-Value Imputation
//!
//! Fills missing cells of each feature column by resampling the observed
//! values pooled from the train and test column. The generator is injected by
//! the caller (one independently seeded generator per ensemble repetition),
//! and the routine only ever touches working copies — the flattened originals
//! stay intact so every repetition imputes afresh.

use crate::matrix::Matrix;
use rand::Rng;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImputeError {
    #[error("feature column {column} has no observed value in either fold; cannot impute")]
    AllMissing { column: usize },
}

/// Replaces every NaN cell of `train` and `test` with a uniform draw from the
/// pooled observed values of that column.
///
/// A column that is missing everywhere across both folds is a configuration
/// error and fails fast instead of resampling forever.
pub fn impute_columns<R: Rng>(
    train: &mut Matrix,
    test: &mut Matrix,
    rng: &mut R,
) -> Result<(), ImputeError> {
    assert_eq!(
        train.cols(),
        test.cols(),
        "train and test feature widths differ: {} vs {}",
        train.cols(),
        test.cols()
    );

    for column in 0..train.cols() {
        let c = column as isize;
        let pool: Vec<f64> = train
            .column(c)
            .iter()
            .chain(test.column(c).iter())
            .filter(|v| !v.is_nan())
            .collect();

        if pool.is_empty() {
            let any_rows = train.rows() + test.rows() > 0;
            if any_rows {
                return Err(ImputeError::AllMissing { column });
            }
            continue;
        }

        for fold in [&mut *train, &mut *test] {
            for r in 0..fold.rows() {
                if fold.get(r as isize, c).is_nan() {
                    let draw = pool[rng.gen_range(0..pool.len())];
                    fold.set(r as isize, c, draw);
                }
            }
        }
    }

    Ok(())
}
