//! # Target-Density Encoding
//!
//! Remaps ordinal/categorical feature columns to the empirical mean of the
//! outcome conditioned on the column value. The mapping is learned from the
//! training fold only and applied to both folds. Unseen values take the mean
//! of the smallest learned key strictly greater than them; a value above
//! every learned key clamps to the largest key's mean. The fallback is an
//! explicit ordered lookup, not an interpolation.

use crate::matrix::Matrix;

/// A learned value → mean-outcome mapping with ordered-key fallback.
#[derive(Clone, Debug)]
pub struct DensityMap {
    keys: Vec<f64>,
    means: Vec<f64>,
}

impl DensityMap {
    /// Groups `values` by exact value and records the mean outcome per group.
    /// NaN values carry no density information and are skipped.
    pub fn learn(values: &[f64], outcome: &[f64]) -> Self {
        assert_eq!(
            values.len(),
            outcome.len(),
            "density encoding needs one outcome per value: {} vs {}",
            values.len(),
            outcome.len()
        );

        let mut pairs: Vec<(f64, f64)> = values
            .iter()
            .zip(outcome)
            .filter(|(v, _)| !v.is_nan())
            .map(|(&v, &y)| (v, y))
            .collect();
        assert!(
            !pairs.is_empty(),
            "density encoding requires at least one observed training value"
        );
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut keys = Vec::new();
        let mut means = Vec::new();
        let mut idx = 0;
        while idx < pairs.len() {
            let key = pairs[idx].0;
            let mut sum = 0.0;
            let mut count = 0usize;
            while idx < pairs.len() && pairs[idx].0 == key {
                sum += pairs[idx].1;
                count += 1;
                idx += 1;
            }
            keys.push(key);
            means.push(sum / count as f64);
        }

        Self { keys, means }
    }

    /// Mean outcome for `x`: exact key, else the first key strictly greater,
    /// else (above every key) the largest key.
    pub fn lookup(&self, x: f64) -> f64 {
        match self.keys.binary_search_by(|k| k.total_cmp(&x)) {
            Ok(i) => self.means[i],
            Err(i) if i < self.keys.len() => self.means[i],
            Err(_) => self.means[self.means.len() - 1],
        }
    }

    /// Rewrites one matrix column through the mapping.
    pub fn apply(&self, m: &mut Matrix, column: usize) {
        let encoded: Vec<f64> = m.column(column as isize).iter().map(|v| self.lookup(v)).collect();
        m.column_mut(column as isize).assign(&encoded);
    }
}

/// Learns a mapping per designated column from the training fold and applies
/// it to the train and test copies of that column.
pub fn encode_columns(train: &mut Matrix, test: &mut Matrix, outcome: &[f64], columns: &[usize]) {
    for &column in columns {
        let map = DensityMap::learn(&train.column(column as isize).to_vec(), outcome);
        map.apply(train, column);
        map.apply(test, column);
    }
}
