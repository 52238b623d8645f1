//! Split search over presorted feature columns.
//!
//! Both searches sweep each candidate feature's presorted index, moving
//! samples from the criterion's right accumulator to the left one and
//! scoring the partition at admissible thresholds. The deterministic
//! search tries every distinct-value boundary; the random search draws one
//! threshold per feature.

use rand::Rng;
use tracing::instrument;

use crate::criterion::Criterion;
use crate::data::{FeatureMatrix, SortedIndices, TargetTensor};
use crate::error::TreeError;

/// Two feature values closer than this are treated as equal during the
/// sweep: no threshold is placed inside the run. The gap is additive, so
/// large-magnitude features merge proportionally more values.
const VALUE_EPS: f64 = 1e-7;

/// Outcome of a split search.
///
/// `feature` is `-1` when no candidate improved on the node's own
/// impurity (the node is pure, every feature is constant, or `min_leaf`
/// rejected every boundary); `threshold` then keeps its `+inf` sentinel
/// and `error` equals `initial_error`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BestSplit {
    /// Index of the best feature, or `-1`.
    pub feature: i32,
    /// Threshold value: samples with feature value <= threshold go left.
    pub threshold: f64,
    /// Impurity of the best partition found.
    pub error: f64,
    /// Impurity of the unsplit node.
    pub initial_error: f64,
}

impl BestSplit {
    /// Return `true` when the search found no admissible improving split.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.feature < 0
    }

    fn unsplit(initial_error: f64) -> Self {
        Self {
            feature: -1,
            threshold: f64::INFINITY,
            error: initial_error,
            initial_error,
        }
    }
}

/// Advance the sweep cursor along one presorted column.
///
/// Returns the smallest sort-position `b > a` whose sample is masked and
/// whose feature value exceeds the value at `a` by more than the additive
/// `1e-7` gap, or `-1` when no such position exists. With `a == -1` the
/// value bound is `-inf`, so the first masked position is returned.
#[must_use]
pub fn smallest_sample_larger_than(
    a: isize,
    x_col: &[f64],
    sorted_ids: &[i32],
    sample_mask: &[bool],
) -> isize {
    let mut bound = f64::NEG_INFINITY;
    if a >= 0 {
        bound = x_col[sorted_ids[a as usize] as usize] + VALUE_EPS;
    }
    for b in (a + 1).max(0) as usize..sorted_ids.len() {
        let s = sorted_ids[b] as usize;
        if sample_mask[s] && x_col[s] > bound {
            return b as isize;
        }
    }
    -1
}

/// Find the last masked sort-position in a column, or `-1`.
fn last_masked_position(sorted_ids: &[i32], sample_mask: &[bool]) -> isize {
    for b in (0..sorted_ids.len()).rev() {
        if sample_mask[sorted_ids[b] as usize] {
            return b as isize;
        }
    }
    -1
}

/// Resolve the candidate feature list for one search.
///
/// A negative or saturating `max_features` selects all features in
/// natural order without touching the RNG; otherwise the first
/// `max_features` entries of a uniform random permutation are taken
/// (partial Fisher-Yates).
fn candidate_features(n_features: usize, max_features: i32, rng: &mut impl Rng) -> Vec<usize> {
    if max_features < 0 || max_features as usize >= n_features {
        return (0..n_features).collect();
    }
    let take = max_features as usize;
    let mut order: Vec<usize> = (0..n_features).collect();
    for i in 0..take {
        let j = rng.gen_range(i..n_features);
        order.swap(i, j);
    }
    order.truncate(take);
    order
}

fn check_shapes(
    x: &FeatureMatrix<'_>,
    y: &TargetTensor<'_>,
    x_argsorted: &SortedIndices<'_>,
    sample_mask: &[bool],
    n_samples: usize,
) -> Result<(), TreeError> {
    if x_argsorted.n_rows() != x.n_rows() || x_argsorted.n_cols() != x.n_cols() {
        return Err(TreeError::ArgsortShapeMismatch {
            n_rows: x.n_rows(),
            n_cols: x.n_cols(),
            got_rows: x_argsorted.n_rows(),
            got_cols: x_argsorted.n_cols(),
        });
    }
    if sample_mask.len() != x.n_rows() {
        return Err(TreeError::MaskLengthMismatch {
            expected: x.n_rows(),
            got: sample_mask.len(),
        });
    }
    if y.n_total() != x.n_rows() {
        return Err(TreeError::TargetRowMismatch {
            expected: x.n_rows(),
            got: y.n_total(),
        });
    }
    if n_samples == 0 {
        return Err(TreeError::EmptyNode);
    }
    Ok(())
}

/// Midpoint threshold between the values at sort-positions `a` and `b`,
/// falling back to the lower value when rounding lands on the upper one
/// (a threshold equal to the upper value would pull it into the left side).
fn midpoint_threshold(lo: f64, hi: f64) -> f64 {
    let t = lo + (hi - lo) / 2.0;
    if t == hi { lo } else { t }
}

/// Exhaustive best-split search over every candidate (feature, threshold).
///
/// Sweeps each candidate feature's presorted column, scoring every
/// boundary between distinct masked values and keeping the first strict
/// improvement in impurity. Ties are resolved by candidate order, then by
/// the earliest admissible threshold within a feature.
///
/// A pure node (`initial_error == 0`) short-circuits to an unsplit result
/// without reading any feature column.
///
/// # Errors
///
/// | Variant | When |
/// |---|---|
/// | [`TreeError::ArgsortShapeMismatch`] | argsort table shape differs from `x` |
/// | [`TreeError::MaskLengthMismatch`]   | mask length differs from `x` rows   |
/// | [`TreeError::TargetRowMismatch`]    | `y` covers a different sample count |
/// | [`TreeError::EmptyNode`]            | `n_samples` is zero                 |
#[instrument(level = "trace", skip(x, y, x_argsorted, sample_mask, criterion, rng))]
#[allow(clippy::too_many_arguments)]
pub fn find_best_split(
    x: &FeatureMatrix<'_>,
    y: &TargetTensor<'_>,
    x_argsorted: &SortedIndices<'_>,
    sample_mask: &[bool],
    n_samples: usize,
    min_leaf: usize,
    max_features: i32,
    criterion: &mut dyn Criterion,
    rng: &mut impl Rng,
) -> Result<BestSplit, TreeError> {
    check_shapes(x, y, x_argsorted, sample_mask, n_samples)?;

    criterion.init(y, sample_mask, n_samples);
    let initial_error = criterion.eval();
    if initial_error == 0.0 {
        return Ok(BestSplit::unsplit(0.0));
    }

    let mut best = BestSplit::unsplit(initial_error);

    for i in candidate_features(x.n_cols(), max_features, rng) {
        let x_col = x.col(i);
        let sorted_ids = x_argsorted.col(i);
        criterion.reset();

        let mut a = smallest_sample_larger_than(-1, x_col, sorted_ids, sample_mask);
        while a >= 0 {
            let b = smallest_sample_larger_than(a, x_col, sorted_ids, sample_mask);
            if b < 0 {
                break;
            }
            let n_left = criterion.update(a as usize, b as usize, y, sorted_ids, sample_mask);
            if n_left >= min_leaf && n_samples - n_left >= min_leaf {
                let error = criterion.eval();
                if error < best.error {
                    let lo = x_col[sorted_ids[a as usize] as usize];
                    let hi = x_col[sorted_ids[b as usize] as usize];
                    best.feature = i as i32;
                    best.threshold = midpoint_threshold(lo, hi);
                    best.error = error;
                }
            }
            a = b;
        }
    }
    Ok(best)
}

/// Best-split search with one uniformly drawn threshold per feature.
///
/// For each candidate feature the threshold is drawn from
/// `Uniform[lo, hi)` over the masked value range, then the criterion is
/// updated in a single call covering every masked sample at or below the
/// threshold. Features that are constant over the masked set are skipped
/// before the draw, so the RNG advances exactly once per live feature.
///
/// # Errors
///
/// Same boundary checks as [`find_best_split`].
#[instrument(level = "trace", skip(x, y, x_argsorted, sample_mask, criterion, rng))]
#[allow(clippy::too_many_arguments)]
pub fn find_best_random_split(
    x: &FeatureMatrix<'_>,
    y: &TargetTensor<'_>,
    x_argsorted: &SortedIndices<'_>,
    sample_mask: &[bool],
    n_samples: usize,
    min_leaf: usize,
    max_features: i32,
    criterion: &mut dyn Criterion,
    rng: &mut impl Rng,
) -> Result<BestSplit, TreeError> {
    check_shapes(x, y, x_argsorted, sample_mask, n_samples)?;

    criterion.init(y, sample_mask, n_samples);
    let initial_error = criterion.eval();
    if initial_error == 0.0 {
        return Ok(BestSplit::unsplit(0.0));
    }

    let mut best = BestSplit::unsplit(initial_error);

    for i in candidate_features(x.n_cols(), max_features, rng) {
        let x_col = x.col(i);
        let sorted_ids = x_argsorted.col(i);

        let a = smallest_sample_larger_than(-1, x_col, sorted_ids, sample_mask);
        let b = last_masked_position(sorted_ids, sample_mask);
        if b <= a {
            continue;
        }
        let lo = x_col[sorted_ids[a as usize] as usize];
        let hi = x_col[sorted_ids[b as usize] as usize];
        if lo == hi {
            continue;
        }

        let u: f64 = rng.r#gen();
        let mut threshold = lo + u * (hi - lo);
        if threshold == hi {
            threshold = lo;
        }

        // First masked sort-position whose value exceeds the threshold,
        // capped at the last masked position.
        let mut c = (a + 1) as usize;
        while c < b as usize {
            let s = sorted_ids[c] as usize;
            if sample_mask[s] && x_col[s] > threshold {
                break;
            }
            c += 1;
        }

        criterion.reset();
        let n_left = criterion.update(0, c, y, sorted_ids, sample_mask);
        if n_left < min_leaf || n_samples - n_left < min_leaf {
            continue;
        }
        let error = criterion.eval();
        if error < best.error {
            best.feature = i as i32;
            best.threshold = threshold;
            best.error = error;
        }
    }
    Ok(best)
}
