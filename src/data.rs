//! Borrowed, shape-checked views over caller-owned numeric buffers.
//!
//! The engine never owns its inputs: the feature matrix, presorted index
//! table, and target tensor stay with the caller, and these views only pin
//! the layout contract (column-major features, row-major targets) so the
//! sweep gets unit-stride column access.

use crate::error::TreeError;

/// Dense feature matrix in column-major storage.
///
/// `col(j)` yields the contiguous slice of all sample values for feature
/// `j`, which is what the split sweep iterates.
#[derive(Debug, Clone, Copy)]
pub struct FeatureMatrix<'a> {
    values: &'a [f64],
    n_rows: usize,
    n_cols: usize,
}

impl<'a> FeatureMatrix<'a> {
    /// Create a view over a column-major buffer of shape `(n_rows, n_cols)`.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::BufferSizeMismatch`] when
    /// `values.len() != n_rows * n_cols`.
    pub fn from_col_major(
        values: &'a [f64],
        n_rows: usize,
        n_cols: usize,
    ) -> Result<Self, TreeError> {
        if values.len() != n_rows * n_cols {
            return Err(TreeError::BufferSizeMismatch {
                name: "feature matrix",
                expected: n_rows * n_cols,
                got: values.len(),
                n_rows,
                n_cols,
            });
        }
        Ok(Self {
            values,
            n_rows,
            n_cols,
        })
    }

    /// Return the number of samples (rows).
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Return the number of features (columns).
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Return the contiguous value slice for feature column `j`.
    #[must_use]
    pub fn col(&self, j: usize) -> &'a [f64] {
        &self.values[j * self.n_rows..(j + 1) * self.n_rows]
    }

    /// Return the value at `(row, col)`.
    #[must_use]
    pub fn at(&self, row: usize, col: usize) -> f64 {
        self.values[col * self.n_rows + row]
    }
}

/// Per-column presorted row indices, column-major.
///
/// Column `j` is a permutation of `0..n_rows` such that the feature values
/// of column `j` are non-decreasing along it. Computing this table is the
/// caller's job (done once per dataset, reused for every node); see
/// [`argsort_columns`].
#[derive(Debug, Clone, Copy)]
pub struct SortedIndices<'a> {
    ids: &'a [i32],
    n_rows: usize,
    n_cols: usize,
}

impl<'a> SortedIndices<'a> {
    /// Create a view over a column-major index buffer of shape `(n_rows, n_cols)`.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::BufferSizeMismatch`] when
    /// `ids.len() != n_rows * n_cols`.
    pub fn from_col_major(ids: &'a [i32], n_rows: usize, n_cols: usize) -> Result<Self, TreeError> {
        if ids.len() != n_rows * n_cols {
            return Err(TreeError::BufferSizeMismatch {
                name: "argsort table",
                expected: n_rows * n_cols,
                got: ids.len(),
                n_rows,
                n_cols,
            });
        }
        Ok(Self {
            ids,
            n_rows,
            n_cols,
        })
    }

    /// Return the number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Return the number of columns.
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Return the presorted row indices for feature column `j`.
    #[must_use]
    pub fn col(&self, j: usize) -> &'a [i32] {
        &self.ids[j * self.n_rows..(j + 1) * self.n_rows]
    }
}

/// Target tensor of shape `(n_total, k1, k2, k3)`, row-major.
///
/// The three trailing axes are addressed as one flat slab of
/// `k1 * k2 * k3` outputs per sample; the axis count is historical and
/// carries no meaning beyond "one sample axis plus output axes".
/// Classification reads only the first output of each slab as an integer
/// class id; regression reads the whole slab.
#[derive(Debug, Clone, Copy)]
pub struct TargetTensor<'a> {
    values: &'a [f64],
    n_total: usize,
    n_outputs: usize,
}

impl<'a> TargetTensor<'a> {
    /// Create a view over a row-major buffer of shape `(n_total, k1, k2, k3)`.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::BufferSizeMismatch`] when
    /// `values.len() != n_total * k1 * k2 * k3`.
    pub fn new(
        values: &'a [f64],
        n_total: usize,
        shape: (usize, usize, usize),
    ) -> Result<Self, TreeError> {
        let n_outputs = shape.0 * shape.1 * shape.2;
        if values.len() != n_total * n_outputs {
            return Err(TreeError::BufferSizeMismatch {
                name: "target tensor",
                expected: n_total * n_outputs,
                got: values.len(),
                n_rows: n_total,
                n_cols: n_outputs,
            });
        }
        Ok(Self {
            values,
            n_total,
            n_outputs,
        })
    }

    /// Return the number of samples.
    #[must_use]
    pub fn n_total(&self) -> usize {
        self.n_total
    }

    /// Return the flattened output count per sample.
    #[must_use]
    pub fn n_outputs(&self) -> usize {
        self.n_outputs
    }

    /// Return the output slab for sample `i`.
    #[must_use]
    pub fn sample(&self, i: usize) -> &'a [f64] {
        &self.values[i * self.n_outputs..(i + 1) * self.n_outputs]
    }

    /// Return the class id of sample `i` (the first output, truncated).
    #[must_use]
    pub fn class_id(&self, i: usize) -> usize {
        self.values[i * self.n_outputs] as usize
    }
}

/// Build the column-major presorted index table for a feature matrix.
///
/// Convenience for callers; the split search itself never sorts. Each
/// column is argsorted ascending with `total_cmp`, so NaNs order last and
/// the permutation is deterministic.
#[must_use]
pub fn argsort_columns(x: &FeatureMatrix<'_>) -> Vec<i32> {
    let n_rows = x.n_rows();
    let mut ids = Vec::with_capacity(n_rows * x.n_cols());
    for j in 0..x.n_cols() {
        let col = x.col(j);
        let mut order: Vec<i32> = (0..n_rows as i32).collect();
        order.sort_unstable_by(|&a, &b| col[a as usize].total_cmp(&col[b as usize]));
        ids.extend_from_slice(&order);
    }
    ids
}
