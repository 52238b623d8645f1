//! Decision-tree split-finding engine.
//!
//! The computational kernel under tree growers and ensembles: given a
//! column-major feature matrix, a presorted index table, and a target
//! tensor, find the (feature, threshold) pair minimizing an impurity
//! criterion over a masked subset of samples. Impurity criteria
//! (Gini, entropy, multi-output MSE) update incrementally in O(1) per
//! sample, so a full node search costs O(n · d).
//!
//! Tree growth, bagging drivers, and model persistence are the caller's
//! business; this crate fixes only the kernel contracts: the split
//! searches, the [`Criterion`] abstraction, the traversal kernels
//! ([`apply_tree`], [`predict_tree`]), and the bag-mask helper.

mod bag;
mod classification;
mod criterion;
mod data;
mod error;
mod regression;
mod split;
mod traverse;

pub use bag::random_sample_mask;
pub use classification::{Entropy, Gini};
pub use criterion::{Criterion, CriterionKind, build_criterion, error_at_leaf};
pub use data::{FeatureMatrix, SortedIndices, TargetTensor, argsort_columns};
pub use error::TreeError;
pub use regression::Mse;
pub use split::{BestSplit, find_best_random_split, find_best_split, smallest_sample_larger_than};
pub use traverse::{apply_tree, predict_tree};
