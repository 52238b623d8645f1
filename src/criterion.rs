//! The stateful impurity-criterion abstraction.
//!
//! A criterion accumulates statistics for a two-sided partition of the
//! current node's samples. `init` computes aggregates over the masked set
//! and parks every sample on the right; the sweep then calls `reset` once
//! per feature and `update` once per candidate threshold, moving samples
//! from the right accumulator into the left one in O(1) per sample.

use tracing::debug;

use crate::classification::{Entropy, Gini};
use crate::data::TargetTensor;
use crate::error::TreeError;
use crate::regression::Mse;

/// Names the available impurity criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum CriterionKind {
    /// Gini impurity (classification).
    Gini,
    /// Information entropy (classification).
    Entropy,
    /// Mean squared error (regression, multi-output).
    Mse,
}

/// Stateful impurity accumulator driven by the split sweep.
///
/// Implementations own their scratch buffers (allocated at construction or
/// in `init`) and hold no references into caller memory between calls.
/// One criterion serves one node at a time; state never carries between
/// unrelated nodes except through `init`.
pub trait Criterion: std::fmt::Debug {
    /// Recompute aggregate statistics over the masked subset of `y`,
    /// leaving all samples on the right side.
    ///
    /// `n_samples` is the mask popcount and is trusted.
    fn init(&mut self, y: &TargetTensor<'_>, sample_mask: &[bool], n_samples: usize);

    /// Move all samples back to the right side without rereading `y`.
    ///
    /// Called once per candidate feature.
    fn reset(&mut self);

    /// Move every masked sample at sort-positions `[a, b)` from the right
    /// side to the left side, reading sample ids from `sorted_ids`.
    ///
    /// Returns the new left-side sample count. This is the per-split hot
    /// path: O(b − a), no allocation.
    fn update(
        &mut self,
        a: usize,
        b: usize,
        y: &TargetTensor<'_>,
        sorted_ids: &[i32],
        sample_mask: &[bool],
    ) -> usize;

    /// Return the impurity of the current (left, right) partition.
    ///
    /// Lower is better. The scale is criterion-specific; only
    /// self-consistency across calls matters.
    fn eval(&self) -> f64;

    /// Return the statistic that labels a leaf holding the current masked
    /// set: class counts for classification, per-output means for
    /// regression.
    fn init_value(&self) -> Vec<f64>;
}

/// Build a boxed criterion of the requested kind.
///
/// `n_classes` is required for the classification criteria and ignored
/// for regression.
///
/// # Errors
///
/// Returns [`TreeError::MissingClassCount`] when `kind` is `Gini` or
/// `Entropy` and `n_classes` is `None`.
pub fn build_criterion(
    kind: CriterionKind,
    n_classes: Option<usize>,
) -> Result<Box<dyn Criterion>, TreeError> {
    let criterion: Box<dyn Criterion> = match kind {
        CriterionKind::Gini => {
            let n_classes = n_classes.ok_or(TreeError::MissingClassCount)?;
            Box::new(Gini::new(n_classes))
        }
        CriterionKind::Entropy => {
            let n_classes = n_classes.ok_or(TreeError::MissingClassCount)?;
            Box::new(Entropy::new(n_classes))
        }
        CriterionKind::Mse => Box::new(Mse::new()),
    };
    debug!(?kind, ?n_classes, "criterion built");
    Ok(criterion)
}

/// Evaluate a criterion over a leaf region.
///
/// Initializes the criterion on the masked set and returns its impurity
/// with all samples on one side.
pub fn error_at_leaf(
    y: &TargetTensor<'_>,
    sample_mask: &[bool],
    criterion: &mut dyn Criterion,
    n_samples: usize,
) -> f64 {
    criterion.init(y, sample_mask, n_samples);
    criterion.eval()
}
