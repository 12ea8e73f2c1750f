//! # Longitudinal Flattener
//!
//! Converts the subject-grouped long-format table into a fixed-width
//! wide-format matrix, one row per subject. Under S1 each subject has a
//! single row and the output is that row's selector slice. Under S2/S3 the
//! five canonical checkpoints are visited in ascending order; a checkpoint
//! whose age occurs among the subject's rows contributes its selector slice
//! (rows are consumed in on-disk order via a cursor), a checkpoint that does
//! not leaves its slots missing.
//!
//! Two invariants are enforced, not just observed: every subject row must be
//! consumed by exactly one checkpoint, and the slots written must add up to
//! the declared row width.

use crate::matrix::Matrix;
use crate::scenario::{AGE_COL, CHECKPOINT_AGES, FlattenPlan, Scenario};
use crate::subjects::SubjectRange;

/// Flattens `table` into one feature row per subject range.
pub fn flatten(table: &Matrix, ranges: &[SubjectRange], scenario: Scenario) -> Matrix {
    match scenario.flatten_plan() {
        FlattenPlan::SingleRow(selector) => flatten_single_row(table, ranges, selector),
        FlattenPlan::Checkpoints(selectors) => flatten_checkpoints(table, ranges, &selectors),
    }
}

/// Outcome value (the last field) of the last row of each subject range.
pub fn targets(table: &Matrix, ranges: &[SubjectRange]) -> Vec<f64> {
    ranges
        .iter()
        .map(|range| table.get(range.last as isize, -1))
        .collect()
}

fn flatten_single_row(table: &Matrix, ranges: &[SubjectRange], selector: &[usize]) -> Matrix {
    let mut out = Matrix::zeros(ranges.len(), selector.len());
    for (sidx, range) in ranges.iter().enumerate() {
        assert_eq!(
            range.len(),
            1,
            "single-checkpoint flattening expects one row per subject, subject {sidx} has {}",
            range.len()
        );
        let row: Vec<f64> = selector
            .iter()
            .map(|&col| table.get(range.first as isize, col as isize))
            .collect();
        out.row_mut(sidx as isize).assign(&row);
    }
    out
}

fn flatten_checkpoints(
    table: &Matrix,
    ranges: &[SubjectRange],
    selectors: &[&[usize]; 5],
) -> Matrix {
    let width: usize = selectors.iter().map(|s| s.len()).sum();
    let mut out = Matrix::filled(ranges.len(), width, f64::NAN);

    for (sidx, range) in ranges.iter().enumerate() {
        let ages: Vec<f64> = table
            .column(AGE_COL as isize)
            .iter()
            .skip(range.first)
            .take(range.len())
            .collect();

        let mut cursor = 0usize;
        let mut slot = 0usize;
        let mut matched = 0usize;

        for (cp_idx, &age) in CHECKPOINT_AGES.iter().enumerate() {
            let selector = selectors[cp_idx];
            if ages.iter().any(|&a| a == age) {
                let row = (range.first + cursor) as isize;
                for (k, &col) in selector.iter().enumerate() {
                    out.set(sidx as isize, (slot + k) as isize, table.get(row, col as isize));
                }
                cursor += 1;
                matched += 1;
            }
            slot += selector.len();
        }

        assert_eq!(
            matched,
            range.len(),
            "subject {sidx}: {} rows but only {matched} checkpoint matches",
            range.len()
        );
        assert_eq!(slot, width, "subject {sidx}: slot count {slot} != row width {width}");
    }

    out
}
