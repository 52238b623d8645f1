/// Errors from split-engine operations.
///
/// All variants are boundary failures: once the typed views are
/// constructed and the entry checks pass, the engine treats its inputs
/// as trusted.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// Returned when a flat buffer does not match its declared shape.
    #[error("{name} buffer has {got} elements, expected {expected} ({n_rows} rows x {n_cols} cols)")]
    BufferSizeMismatch {
        /// Which buffer failed the check (e.g. "feature matrix").
        name: &'static str,
        /// The element count the declared shape implies.
        expected: usize,
        /// The actual element count of the buffer.
        got: usize,
        /// Declared row count.
        n_rows: usize,
        /// Declared column count.
        n_cols: usize,
    },

    /// Returned when the presorted index table disagrees with the feature matrix shape.
    #[error("argsort table is {got_rows}x{got_cols}, expected {n_rows}x{n_cols}")]
    ArgsortShapeMismatch {
        /// Expected row count (rows of the feature matrix).
        n_rows: usize,
        /// Expected column count (columns of the feature matrix).
        n_cols: usize,
        /// Actual row count of the argsort table.
        got_rows: usize,
        /// Actual column count of the argsort table.
        got_cols: usize,
    },

    /// Returned when the sample mask length differs from the row count.
    #[error("sample mask has {got} entries, expected {expected}")]
    MaskLengthMismatch {
        /// Expected entry count (rows of the feature matrix).
        expected: usize,
        /// Actual mask length.
        got: usize,
    },

    /// Returned when the target tensor covers a different number of samples.
    #[error("target tensor covers {got} samples, expected {expected}")]
    TargetRowMismatch {
        /// Expected sample count.
        expected: usize,
        /// Sample count of the target tensor.
        got: usize,
    },

    /// Returned when the parallel tree arrays disagree on node count.
    #[error("tree arrays disagree: {name} has {got} entries for {n_nodes} nodes")]
    NodeArrayMismatch {
        /// Which array failed the check (e.g. "children", "threshold").
        name: &'static str,
        /// Node count implied by the `feature` array.
        n_nodes: usize,
        /// Entry count of the offending array.
        got: usize,
    },

    /// Returned when an output buffer is too small or too large for the input rows.
    #[error("output buffer has {got} entries, expected {expected}")]
    OutputLengthMismatch {
        /// Expected entry count.
        expected: usize,
        /// Actual entry count.
        got: usize,
    },

    /// Returned when a split search is asked to run on an empty node.
    #[error("split search requires at least one masked sample")]
    EmptyNode,

    /// Returned when a classification criterion is built without `n_classes`.
    #[error("n_classes is required for classification criteria")]
    MissingClassCount,

    /// Returned when the requested bag size exceeds the population.
    #[error("bag of {n_in_bag} samples exceeds population of {n_total}")]
    InvalidBagSize {
        /// Requested in-bag sample count.
        n_in_bag: usize,
        /// Total population size.
        n_total: usize,
    },
}
