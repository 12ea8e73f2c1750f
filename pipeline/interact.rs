//! Pairwise feature-interaction expansion.
//!
//! Appends one column per configured index pair, the elementwise product of
//! the two named feature columns (self-pairs give squares). The pair list is
//! static per scenario and refers to 0-based positions in the already
//! selected feature set.

use crate::matrix::Matrix;

/// Returns `m` widened by one product column per pair.
pub fn expand_interactions(m: &Matrix, pairs: &[(usize, usize)]) -> Matrix {
    let (rows, cols) = m.shape();
    let mut out = Matrix::zeros(rows, cols + pairs.len());

    for r in 0..rows {
        let source = m.row(r as isize).to_vec();
        let mut row = source.clone();
        for &(a, b) in pairs {
            row.push(source[a] * source[b]);
        }
        out.row_mut(r as isize).assign(&row);
    }

    out
}
