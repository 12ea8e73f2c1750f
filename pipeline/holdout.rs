//! # Local Evaluation Harness
//!
//! Splits a full labeled record set into train and test folds by subject,
//! after a seeded shuffle of the subject ranges. The test fold has its
//! outcome field stripped (the pipeline must never see it); the held-out
//! outcomes and the train-mean baseline SSE are returned for scoring with
//! the contest formula `1e6 * max(0, 1 - SSE / SSE0)`.

use crate::scenario::{OUTCOME_COL, Scenario};
use crate::subjects::{SubjectRange, subject_ranges};
use rand::Rng;
use rand::seq::SliceRandom;

/// A train/test fold split with held-out outcomes.
pub struct HoldoutSplit {
    pub train: Vec<String>,
    pub test: Vec<String>,
    pub train_outcomes: Vec<f64>,
    pub test_outcomes: Vec<f64>,
}

/// Keeps the first `OUTCOME_COL` fields of a line, dropping the outcome.
pub fn strip_outcome(line: &str) -> String {
    line.split(',').take(OUTCOME_COL).collect::<Vec<_>>().join(",")
}

fn last_field(line: &str) -> f64 {
    line.rsplit(',')
        .next()
        .and_then(|field| field.trim().parse::<f64>().ok())
        .unwrap_or_else(|| panic!("record has no numeric outcome field: {line:?}"))
}

/// Shuffles the subject ranges and splits them at `fraction`.
///
/// Under S1 each fold keeps only the last row of each subject (the
/// single-checkpoint form the S1 flattener expects); under S2/S3 the full
/// ranges are kept. Test lines are stripped of the outcome field.
pub fn shuffle_split<R: Rng>(
    lines: &[String],
    scenario: Scenario,
    fraction: f64,
    rng: &mut R,
) -> HoldoutSplit {
    assert!(
        (0.0..=1.0).contains(&fraction),
        "train fraction {fraction} outside [0, 1]"
    );

    let mut ranges = subject_ranges(lines);
    ranges.shuffle(rng);
    let pivot = (fraction * ranges.len() as f64) as usize;

    let keep_lines = |range: &SubjectRange, out: &mut Vec<String>| match scenario {
        Scenario::S1 => out.push(lines[range.last].clone()),
        Scenario::S2 | Scenario::S3 => {
            out.extend(lines[range.first..=range.last].iter().cloned())
        }
    };

    let mut split = HoldoutSplit {
        train: Vec::new(),
        test: Vec::new(),
        train_outcomes: Vec::with_capacity(pivot),
        test_outcomes: Vec::with_capacity(ranges.len() - pivot),
    };

    for range in &ranges[..pivot] {
        keep_lines(range, &mut split.train);
        split.train_outcomes.push(last_field(&lines[range.last]));
    }
    for range in &ranges[pivot..] {
        let mut kept = Vec::new();
        keep_lines(range, &mut kept);
        split.test.extend(kept.iter().map(|line| strip_outcome(line)));
        split.test_outcomes.push(last_field(&lines[range.last]));
    }

    split
}

pub fn sum_squared_error(predictions: &[f64], actual: &[f64]) -> f64 {
    assert_eq!(
        predictions.len(),
        actual.len(),
        "prediction count {} != outcome count {}",
        predictions.len(),
        actual.len()
    );
    predictions
        .iter()
        .zip(actual)
        .map(|(p, a)| (p - a) * (p - a))
        .sum()
}

/// SSE of predicting the train-mean outcome for every test subject.
pub fn baseline_sse(train_outcomes: &[f64], test_outcomes: &[f64]) -> f64 {
    let mean = train_outcomes.iter().sum::<f64>() / train_outcomes.len() as f64;
    test_outcomes.iter().map(|a| (a - mean) * (a - mean)).sum()
}

/// Contest score: a million times the fraction of baseline SSE explained,
/// floored at zero.
pub fn contest_score(sse: f64, sse0: f64) -> f64 {
    1e6 * (1.0 - sse / sse0).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn labeled_lines(subjects: usize, rows_per_subject: usize) -> Vec<String> {
        let mut lines = Vec::new();
        for id in 0..subjects {
            for r in 0..rows_per_subject {
                let fields: Vec<String> = (0..=OUTCOME_COL)
                    .map(|c| match c {
                        0 => id.to_string(),
                        OUTCOME_COL => format!("{}", 50 + id),
                        _ => format!("{}", r * 10 + c),
                    })
                    .collect();
                lines.push(fields.join(","));
            }
        }
        lines
    }

    #[test]
    fn strip_outcome_drops_exactly_the_last_field() {
        let line = labeled_lines(1, 1).pop().unwrap();
        let stripped = strip_outcome(&line);
        assert_eq!(stripped.split(',').count(), OUTCOME_COL);
        assert!(line.starts_with(&stripped));
    }

    #[test]
    fn split_partitions_subjects_and_strips_test_outcomes() {
        let lines = labeled_lines(10, 3);
        let mut rng = StdRng::seed_from_u64(3);
        let split = shuffle_split(&lines, Scenario::S2, 0.67, &mut rng);

        assert_eq!(split.train_outcomes.len(), 6);
        assert_eq!(split.test_outcomes.len(), 4);
        // Full ranges survive on both sides.
        assert_eq!(split.train.len(), 6 * 3);
        assert_eq!(split.test.len(), 4 * 3);
        for line in &split.test {
            assert_eq!(line.split(',').count(), OUTCOME_COL);
        }
    }

    #[test]
    fn s1_split_keeps_one_line_per_subject() {
        let lines = labeled_lines(10, 3);
        let mut rng = StdRng::seed_from_u64(3);
        let split = shuffle_split(&lines, Scenario::S1, 0.67, &mut rng);
        assert_eq!(split.train.len(), 6);
        assert_eq!(split.test.len(), 4);
    }

    #[test]
    fn scoring_matches_the_contest_formula() {
        assert_abs_diff_eq!(contest_score(0.0, 100.0), 1e6);
        assert_abs_diff_eq!(contest_score(50.0, 100.0), 5e5);
        // Worse than baseline floors at zero.
        assert_abs_diff_eq!(contest_score(200.0, 100.0), 0.0);
    }

    #[test]
    fn baseline_is_the_train_mean_predictor() {
        let sse0 = baseline_sse(&[1.0, 3.0], &[2.0, 4.0]);
        // Mean is 2; errors are 0 and 2.
        assert_abs_diff_eq!(sse0, 4.0);
    }
}
