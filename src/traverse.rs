//! Tree traversal kernels over the parallel-array node representation.
//!
//! A fitted tree is four parallel arrays indexed by node id, root at 0:
//! `children` (shape `(n_nodes, 2)` row-major, `-1` for none), `feature`,
//! `threshold`, and per-leaf `values` (shape `(n_nodes, n_outputs)`
//! row-major). Samples with `x <= threshold` descend left.

use crate::data::FeatureMatrix;
use crate::error::TreeError;

fn check_node_arrays(
    children: &[i32],
    feature: &[i32],
    threshold: &[f64],
) -> Result<usize, TreeError> {
    let n_nodes = feature.len();
    if children.len() != 2 * n_nodes {
        return Err(TreeError::NodeArrayMismatch {
            name: "children",
            n_nodes,
            got: children.len(),
        });
    }
    if threshold.len() != n_nodes {
        return Err(TreeError::NodeArrayMismatch {
            name: "threshold",
            n_nodes,
            got: threshold.len(),
        });
    }
    Ok(n_nodes)
}

/// Descend from the root to a leaf for one row.
#[inline]
fn descend(x: &FeatureMatrix<'_>, row: usize, children: &[i32], feature: &[i32], threshold: &[f64]) -> usize {
    let mut node = 0usize;
    loop {
        let left = children[2 * node];
        let right = children[2 * node + 1];
        if left < 0 && right < 0 {
            return node;
        }
        node = if x.at(row, feature[node] as usize) <= threshold[node] {
            left as usize
        } else {
            right as usize
        };
    }
}

/// Route every row of `x` to a leaf and record the reached node ids.
///
/// # Errors
///
/// Returns [`TreeError::NodeArrayMismatch`] when the parallel arrays
/// disagree on node count, or [`TreeError::OutputLengthMismatch`] when
/// `out` does not have one entry per row.
pub fn apply_tree(
    x: &FeatureMatrix<'_>,
    children: &[i32],
    feature: &[i32],
    threshold: &[f64],
    out: &mut [i32],
) -> Result<(), TreeError> {
    check_node_arrays(children, feature, threshold)?;
    if out.len() != x.n_rows() {
        return Err(TreeError::OutputLengthMismatch {
            expected: x.n_rows(),
            got: out.len(),
        });
    }
    for row in 0..x.n_rows() {
        out[row] = descend(x, row, children, feature, threshold) as i32;
    }
    Ok(())
}

/// Route every row of `x` to a leaf and copy that leaf's value slab into
/// the row-major prediction buffer.
///
/// `values` must hold `n_nodes * n_outputs` entries and `pred` must hold
/// `n_rows * n_outputs`; `n_outputs` is inferred from their quotients.
///
/// # Errors
///
/// Returns [`TreeError::NodeArrayMismatch`] when the parallel arrays
/// disagree, or [`TreeError::OutputLengthMismatch`] when `values` is not
/// a whole number of per-node slabs or `pred` does not match.
pub fn predict_tree(
    x: &FeatureMatrix<'_>,
    children: &[i32],
    feature: &[i32],
    threshold: &[f64],
    values: &[f64],
    pred: &mut [f64],
) -> Result<(), TreeError> {
    let n_nodes = check_node_arrays(children, feature, threshold)?;
    if n_nodes == 0 || values.len() % n_nodes != 0 {
        return Err(TreeError::NodeArrayMismatch {
            name: "values",
            n_nodes,
            got: values.len(),
        });
    }
    let n_outputs = values.len() / n_nodes;
    if pred.len() != x.n_rows() * n_outputs {
        return Err(TreeError::OutputLengthMismatch {
            expected: x.n_rows() * n_outputs,
            got: pred.len(),
        });
    }
    for row in 0..x.n_rows() {
        let leaf = descend(x, row, children, feature, threshold);
        let slab = &values[leaf * n_outputs..(leaf + 1) * n_outputs];
        pred[row * n_outputs..(row + 1) * n_outputs].copy_from_slice(slab);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{apply_tree, predict_tree};
    use crate::data::FeatureMatrix;
    use crate::error::TreeError;

    /// One split at 1.5 on feature 0; node 1 is the left leaf, node 2 the right.
    fn stump() -> (Vec<i32>, Vec<i32>, Vec<f64>) {
        let children = vec![1, 2, -1, -1, -1, -1];
        let feature = vec![0, 0, 0];
        let threshold = vec![1.5, 0.0, 0.0];
        (children, feature, threshold)
    }

    #[test]
    fn apply_routes_rows_to_leaves() {
        let (children, feature, threshold) = stump();
        let x_values = [0.0, 1.0, 2.0, 3.0];
        let x = FeatureMatrix::from_col_major(&x_values, 4, 1).unwrap();
        let mut out = vec![0i32; 4];

        apply_tree(&x, &children, &feature, &threshold, &mut out).unwrap();
        assert_eq!(out, vec![1, 1, 2, 2]);
    }

    #[test]
    fn apply_boundary_value_goes_left() {
        let (children, feature, threshold) = stump();
        let x_values = [1.5];
        let x = FeatureMatrix::from_col_major(&x_values, 1, 1).unwrap();
        let mut out = vec![0i32; 1];

        apply_tree(&x, &children, &feature, &threshold, &mut out).unwrap();
        assert_eq!(out, vec![1]);
    }

    #[test]
    fn predict_copies_leaf_slabs() {
        let (children, feature, threshold) = stump();
        // Two outputs per node; root slab is never read.
        let values = vec![0.0, 0.0, 3.0, 4.0, 5.0, 6.0];
        let x_values = [1.0, 2.0];
        let x = FeatureMatrix::from_col_major(&x_values, 2, 1).unwrap();
        let mut pred = vec![0.0; 4];

        predict_tree(&x, &children, &feature, &threshold, &values, &mut pred).unwrap();
        assert_eq!(pred, vec![3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn two_level_tree_descends_both_features() {
        // Root splits feature 0 at 5; left child splits feature 1 at 0.5.
        let children = vec![1, 2, 3, 4, -1, -1, -1, -1, -1, -1];
        let feature = vec![0, 1, 0, 0, 0];
        let threshold = vec![5.0, 0.5, 0.0, 0.0, 0.0];
        // Column-major: feature 0 = [1, 1, 9], feature 1 = [0.0, 1.0, 0.0].
        let x_values = [1.0, 1.0, 9.0, 0.0, 1.0, 0.0];
        let x = FeatureMatrix::from_col_major(&x_values, 3, 2).unwrap();
        let mut out = vec![0i32; 3];

        apply_tree(&x, &children, &feature, &threshold, &mut out).unwrap();
        assert_eq!(out, vec![3, 4, 2]);
    }

    #[test]
    fn single_leaf_tree_maps_everything_to_root() {
        let children = vec![-1, -1];
        let feature = vec![0];
        let threshold = vec![0.0];
        let x_values = [1.0, 2.0, 3.0];
        let x = FeatureMatrix::from_col_major(&x_values, 3, 1).unwrap();
        let mut out = vec![9i32; 3];

        apply_tree(&x, &children, &feature, &threshold, &mut out).unwrap();
        assert_eq!(out, vec![0, 0, 0]);
    }

    #[test]
    fn node_array_disagreement_is_rejected() {
        let children = vec![1, 2, -1, -1]; // implies 2 nodes
        let feature = vec![0, 0, 0]; // 3 nodes
        let threshold = vec![0.0, 0.0, 0.0];
        let x_values = [1.0];
        let x = FeatureMatrix::from_col_major(&x_values, 1, 1).unwrap();
        let mut out = vec![0i32; 1];

        let err = apply_tree(&x, &children, &feature, &threshold, &mut out).unwrap_err();
        assert!(matches!(err, TreeError::NodeArrayMismatch { name: "children", .. }));
    }

    #[test]
    fn wrong_output_length_is_rejected() {
        let (children, feature, threshold) = stump();
        let x_values = [1.0, 2.0];
        let x = FeatureMatrix::from_col_major(&x_values, 2, 1).unwrap();
        let mut out = vec![0i32; 3];

        let err = apply_tree(&x, &children, &feature, &threshold, &mut out).unwrap_err();
        assert!(matches!(err, TreeError::OutputLengthMismatch { .. }));
    }

    #[test]
    fn ragged_values_slab_is_rejected() {
        let (children, feature, threshold) = stump();
        let values = vec![0.0; 7]; // not divisible by 3 nodes
        let x_values = [1.0];
        let x = FeatureMatrix::from_col_major(&x_values, 1, 1).unwrap();
        let mut pred = vec![0.0; 2];

        let err =
            predict_tree(&x, &children, &feature, &threshold, &values, &mut pred).unwrap_err();
        assert!(matches!(err, TreeError::NodeArrayMismatch { name: "values", .. }));
    }
}
