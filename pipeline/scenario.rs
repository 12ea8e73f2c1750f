//! # Scenario Configuration
//!
//! Static tables describing the three prediction scenarios: which input
//! columns participate, which age checkpoints a subject may have, which
//! column slice is retained per checkpoint, which feature pairs form
//! interactions, the ridge regularization strength, and how many ensemble
//! repetitions each evaluation mode runs. These are empirically tuned
//! constants supplied as configuration; nothing here is derived from data.

/// Column index of the age-in-days field in the input table.
pub const AGE_COL: usize = 1;

/// Column index of the outcome field (training side only; the last field).
pub const OUTCOME_COL: usize = 26;

/// The five canonical measurement ages, in days, ascending.
pub const CHECKPOINT_AGES: [f64; 5] = [1.0, 92.0, 183.0, 366.0, 731.0];

/// All subject-level fields: everything except id, age and the outcome.
const S1_SELECTOR: &[usize] = &[
    2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25,
];

/// Birth-row slice for S2: core anthropometry plus sex and birth covariates.
const S2_BIRTH_SELECTOR: &[usize] = &[2, 3, 4, 9, 11, 12, 13];

/// Later-checkpoint slice shared by S2 and S3: the six anthropometric fields.
const LATER_SELECTOR: &[usize] = &[2, 3, 4, 5, 6, 7];

/// Birth-row slice for S3: anthropometry plus the full covariate block.
const S3_BIRTH_SELECTOR: &[usize] = &[
    2, 3, 4, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25,
];

const S1_DENSITY_COLS: &[usize] = &[6, 7, 8, 12, 16, 17, 18, 20, 21];
const S2_DENSITY_COLS: &[usize] = &[3];
const S3_DENSITY_COLS: &[usize] = &[3, 4, 5, 9, 13, 14, 15, 17, 18];

const S1_INTERACTIONS: &[(usize, usize)] = &[(0, 0), (1, 1), (0, 1), (9, 11), (13, 16)];
const S2_INTERACTIONS: &[(usize, usize)] = &[(0, 1), (25, 26), (25, 25), (4, 26)];
const S3_INTERACTIONS: &[(usize, usize)] = &[(0, 1), (39, 40), (39, 39), (6, 40), (2, 8)];

/// Which columns and checkpoints participate in the model.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scenario {
    S1,
    S2,
    S3,
}

/// Evaluation tier; selects only the ensemble repetition count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EvalMode {
    Example,
    Provisional,
    Full,
}

/// How the flattener consumes a subject's rows under a scenario.
pub enum FlattenPlan {
    /// One input row per subject; the output row is this column slice of it.
    SingleRow(&'static [usize]),
    /// Five checkpoint slots, each with its own retained-column slice.
    Checkpoints([&'static [usize]; 5]),
}

impl Scenario {
    pub fn flatten_plan(self) -> FlattenPlan {
        match self {
            Scenario::S1 => FlattenPlan::SingleRow(S1_SELECTOR),
            Scenario::S2 => FlattenPlan::Checkpoints([
                S2_BIRTH_SELECTOR,
                LATER_SELECTOR,
                LATER_SELECTOR,
                LATER_SELECTOR,
                LATER_SELECTOR,
            ]),
            Scenario::S3 => FlattenPlan::Checkpoints([
                S3_BIRTH_SELECTOR,
                LATER_SELECTOR,
                LATER_SELECTOR,
                LATER_SELECTOR,
                LATER_SELECTOR,
            ]),
        }
    }

    /// Width of a flattened feature row (before interactions).
    pub fn feature_width(self) -> usize {
        match self.flatten_plan() {
            FlattenPlan::SingleRow(selector) => selector.len(),
            FlattenPlan::Checkpoints(selectors) => selectors.iter().map(|s| s.len()).sum(),
        }
    }

    /// Flattened-feature indices that get density encoding.
    pub fn density_columns(self) -> &'static [usize] {
        match self {
            Scenario::S1 => S1_DENSITY_COLS,
            Scenario::S2 => S2_DENSITY_COLS,
            Scenario::S3 => S3_DENSITY_COLS,
        }
    }

    /// Flattened-feature index pairs whose products are appended.
    pub fn interaction_pairs(self) -> &'static [(usize, usize)] {
        match self {
            Scenario::S1 => S1_INTERACTIONS,
            Scenario::S2 => S2_INTERACTIONS,
            Scenario::S3 => S3_INTERACTIONS,
        }
    }

    /// Ridge regularization strength `C` (larger is weaker).
    pub fn ridge_c(self) -> f64 {
        match self {
            Scenario::S1 => 100.0,
            Scenario::S2 => 50.0,
            Scenario::S3 => 20.0,
        }
    }

    /// Iteration budget handed to the minimizer.
    pub fn optimizer_budget(self) -> usize {
        200
    }

    /// Ensemble repetition count for a given evaluation tier.
    pub fn repetitions(self, mode: EvalMode) -> usize {
        match (self, mode) {
            (Scenario::S1, EvalMode::Example) => 5,
            (Scenario::S1, EvalMode::Provisional) => 20,
            (Scenario::S1, EvalMode::Full) => 40,
            (Scenario::S2, EvalMode::Example) => 10,
            (Scenario::S2, EvalMode::Provisional) => 40,
            (Scenario::S2, EvalMode::Full) => 80,
            (Scenario::S3, EvalMode::Example) => 10,
            (Scenario::S3, EvalMode::Provisional) => 60,
            (Scenario::S3, EvalMode::Full) => 120,
        }
    }
}
