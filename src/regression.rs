//! Regression criterion: multi-output mean squared error.

use crate::criterion::Criterion;
use crate::data::TargetTensor;

/// Sum of squared errors around the mean, from the raw moments:
/// `sq_sum - n * mean^2`.
#[inline]
pub(crate) fn sse(sq_sum: f64, mean: f64, n: usize) -> f64 {
    sq_sum - n as f64 * mean * mean
}

/// Mean-squared-error criterion over a multi-output target tensor.
///
/// Maintains per-output running means and squared sums on each side of the
/// partition, updated in O(1) per sample per output. Variances are
/// refreshed from the moments at the end of each `update` call, so `eval`
/// is a plain sum.
///
/// Output buffers are sized lazily on the first `init` from the tensor's
/// flattened output count.
#[derive(Debug, Clone, Default)]
pub struct Mse {
    n_outputs: usize,
    n_samples: usize,
    n_left: usize,
    n_right: usize,
    mean_init: Vec<f64>,
    mean_left: Vec<f64>,
    mean_right: Vec<f64>,
    sq_sum_init: Vec<f64>,
    sq_sum_left: Vec<f64>,
    sq_sum_right: Vec<f64>,
    var_left: Vec<f64>,
    var_right: Vec<f64>,
}

impl Mse {
    /// Create an MSE criterion; buffers are allocated on the first `init`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn resize_buffers(&mut self, n_outputs: usize) {
        self.n_outputs = n_outputs;
        for buf in [
            &mut self.mean_init,
            &mut self.mean_left,
            &mut self.mean_right,
            &mut self.sq_sum_init,
            &mut self.sq_sum_left,
            &mut self.sq_sum_right,
            &mut self.var_left,
            &mut self.var_right,
        ] {
            buf.resize(n_outputs, 0.0);
        }
    }

    fn refresh_variances(&mut self) {
        for o in 0..self.n_outputs {
            self.var_left[o] = sse(self.sq_sum_left[o], self.mean_left[o], self.n_left);
            self.var_right[o] = sse(self.sq_sum_right[o], self.mean_right[o], self.n_right);
        }
    }
}

impl Criterion for Mse {
    fn init(&mut self, y: &TargetTensor<'_>, sample_mask: &[bool], n_samples: usize) {
        self.resize_buffers(y.n_outputs());
        self.n_samples = n_samples;
        self.mean_init.fill(0.0);
        self.sq_sum_init.fill(0.0);

        for (i, &masked) in sample_mask.iter().enumerate() {
            if !masked {
                continue;
            }
            let row = y.sample(i);
            for (o, &v) in row.iter().enumerate() {
                self.mean_init[o] += v;
                self.sq_sum_init[o] += v * v;
            }
        }
        let n = n_samples as f64;
        for m in &mut self.mean_init {
            *m /= n;
        }
        self.reset();
    }

    fn reset(&mut self) {
        self.n_left = 0;
        self.n_right = self.n_samples;
        self.mean_left.fill(0.0);
        self.sq_sum_left.fill(0.0);
        self.mean_right.copy_from_slice(&self.mean_init);
        self.sq_sum_right.copy_from_slice(&self.sq_sum_init);
        self.refresh_variances();
    }

    fn update(
        &mut self,
        a: usize,
        b: usize,
        y: &TargetTensor<'_>,
        sorted_ids: &[i32],
        sample_mask: &[bool],
    ) -> usize {
        for &id in &sorted_ids[a..b] {
            let s = id as usize;
            if !sample_mask[s] {
                continue;
            }
            let row = y.sample(s);
            let n_left = self.n_left as f64;
            let n_right = (self.n_samples - self.n_left) as f64;
            debug_assert!(
                self.n_samples - self.n_left > 1,
                "update must leave at least one sample on the right"
            );
            for (o, &v) in row.iter().enumerate() {
                self.sq_sum_left[o] += v * v;
                self.sq_sum_right[o] -= v * v;
                self.mean_left[o] = (n_left * self.mean_left[o] + v) / (n_left + 1.0);
                self.mean_right[o] = (n_right * self.mean_right[o] - v) / (n_right - 1.0);
            }
            self.n_left += 1;
            self.n_right -= 1;
        }
        self.refresh_variances();
        self.n_left
    }

    fn eval(&self) -> f64 {
        let mut total = 0.0;
        for o in 0..self.n_outputs {
            total += self.var_left[o] + self.var_right[o];
        }
        total
    }

    fn init_value(&self) -> Vec<f64> {
        self.mean_init.clone()
    }
}
