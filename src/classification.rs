//! Classification criteria: per-class counts with Gini and entropy scores.

use crate::criterion::Criterion;
use crate::data::TargetTensor;

/// Per-class count triple shared by the classification criteria.
///
/// Counts are `i32` to match the split record's index width; a node whose
/// single class exceeds `i32::MAX` samples overflows and is not guarded.
#[derive(Debug, Clone)]
pub(crate) struct LabelCounts {
    count_init: Vec<i32>,
    count_left: Vec<i32>,
    count_right: Vec<i32>,
    n_samples: usize,
    n_left: usize,
    n_right: usize,
}

impl LabelCounts {
    pub(crate) fn new(n_classes: usize) -> Self {
        Self {
            count_init: vec![0; n_classes],
            count_left: vec![0; n_classes],
            count_right: vec![0; n_classes],
            n_samples: 0,
            n_left: 0,
            n_right: 0,
        }
    }

    /// Tally masked samples into `count_init`, then park everything right.
    pub(crate) fn init(&mut self, y: &TargetTensor<'_>, sample_mask: &[bool], n_samples: usize) {
        self.n_samples = n_samples;
        self.count_init.fill(0);
        for (i, &masked) in sample_mask.iter().enumerate() {
            if masked {
                self.count_init[y.class_id(i)] += 1;
            }
        }
        self.reset();
    }

    pub(crate) fn reset(&mut self) {
        self.n_left = 0;
        self.n_right = self.n_samples;
        self.count_left.fill(0);
        self.count_right.copy_from_slice(&self.count_init);
    }

    /// Move masked samples at sort-positions `[a, b)` from right to left.
    pub(crate) fn update(
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
            let class = y.class_id(s);
            self.count_left[class] += 1;
            self.count_right[class] -= 1;
            self.n_left += 1;
            self.n_right -= 1;
        }
        debug_assert_eq!(self.n_left + self.n_right, self.n_samples);
        debug_assert!(
            self.count_left
                .iter()
                .zip(&self.count_right)
                .zip(&self.count_init)
                .all(|((&l, &r), &t)| l + r == t)
        );
        self.n_left
    }

    pub(crate) fn n_samples(&self) -> usize {
        self.n_samples
    }

    pub(crate) fn n_left(&self) -> usize {
        self.n_left
    }

    pub(crate) fn n_right(&self) -> usize {
        self.n_right
    }

    pub(crate) fn left(&self) -> &[i32] {
        &self.count_left
    }

    pub(crate) fn right(&self) -> &[i32] {
        &self.count_right
    }

    pub(crate) fn init_counts(&self) -> &[i32] {
        &self.count_init
    }
}

/// Gini impurity criterion.
///
/// Scores a partition as `(G_left + G_right) / n` with
/// `G_side = n_side - (sum of squared counts) / n_side`.
#[derive(Debug, Clone)]
pub struct Gini {
    counts: LabelCounts,
}

impl Gini {
    /// Create a Gini criterion for `n_classes` classes.
    #[must_use]
    pub fn new(n_classes: usize) -> Self {
        Self {
            counts: LabelCounts::new(n_classes),
        }
    }
}

fn gini_side(counts: &[i32], n_side: usize) -> f64 {
    if n_side == 0 {
        return 0.0;
    }
    let sum_sq: f64 = counts.iter().map(|&c| (c as f64) * (c as f64)).sum();
    n_side as f64 - sum_sq / n_side as f64
}

impl Criterion for Gini {
    fn init(&mut self, y: &TargetTensor<'_>, sample_mask: &[bool], n_samples: usize) {
        self.counts.init(y, sample_mask, n_samples);
    }

    fn reset(&mut self) {
        self.counts.reset();
    }

    fn update(
        &mut self,
        a: usize,
        b: usize,
        y: &TargetTensor<'_>,
        sorted_ids: &[i32],
        sample_mask: &[bool],
    ) -> usize {
        self.counts.update(a, b, y, sorted_ids, sample_mask)
    }

    fn eval(&self) -> f64 {
        let left = gini_side(self.counts.left(), self.counts.n_left());
        let right = gini_side(self.counts.right(), self.counts.n_right());
        (left + right) / self.counts.n_samples() as f64
    }

    fn init_value(&self) -> Vec<f64> {
        self.counts.init_counts().iter().map(|&c| c as f64).collect()
    }
}

/// Information-entropy criterion.
///
/// Scores a partition as the side-weighted entropy
/// `(n_left/n) * H_left + (n_right/n) * H_right`, with zero-count classes
/// skipped inside each side's entropy.
#[derive(Debug, Clone)]
pub struct Entropy {
    counts: LabelCounts,
}

impl Entropy {
    /// Create an entropy criterion for `n_classes` classes.
    #[must_use]
    pub fn new(n_classes: usize) -> Self {
        Self {
            counts: LabelCounts::new(n_classes),
        }
    }
}

fn entropy_side(counts: &[i32], n_side: usize) -> f64 {
    if n_side == 0 {
        return 0.0;
    }
    let n = n_side as f64;
    -counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / n;
            p * p.ln()
        })
        .sum::<f64>()
}

impl Criterion for Entropy {
    fn init(&mut self, y: &TargetTensor<'_>, sample_mask: &[bool], n_samples: usize) {
        self.counts.init(y, sample_mask, n_samples);
    }

    fn reset(&mut self) {
        self.counts.reset();
    }

    fn update(
        &mut self,
        a: usize,
        b: usize,
        y: &TargetTensor<'_>,
        sorted_ids: &[i32],
        sample_mask: &[bool],
    ) -> usize {
        self.counts.update(a, b, y, sorted_ids, sample_mask)
    }

    fn eval(&self) -> f64 {
        let n = self.counts.n_samples() as f64;
        let weight_left = self.counts.n_left() as f64 / n;
        let weight_right = self.counts.n_right() as f64 / n;
        weight_left * entropy_side(self.counts.left(), self.counts.n_left())
            + weight_right * entropy_side(self.counts.right(), self.counts.n_right())
    }

    fn init_value(&self) -> Vec<f64> {
        self.counts.init_counts().iter().map(|&c| c as f64).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{Entropy, Gini};
    use crate::criterion::Criterion;
    use crate::data::TargetTensor;

    fn class_targets(labels: &[usize]) -> Vec<f64> {
        labels.iter().map(|&l| l as f64).collect()
    }

    #[test]
    fn gini_initial_error_balanced() {
        // Two classes, two samples each, all on the right after init:
        // G_right = 4 - (4 + 4)/4 = 2, score = 2/4 = 0.5.
        let targets = class_targets(&[0, 0, 1, 1]);
        let y = TargetTensor::new(&targets, 4, (1, 1, 1)).unwrap();
        let mask = [true; 4];
        let mut gini = Gini::new(2);
        gini.init(&y, &mask, 4);
        assert!((gini.eval() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn gini_pure_node_scores_zero() {
        let targets = class_targets(&[1, 1, 1]);
        let y = TargetTensor::new(&targets, 3, (1, 1, 1)).unwrap();
        let mask = [true; 3];
        let mut gini = Gini::new(2);
        gini.init(&y, &mask, 3);
        assert!(gini.eval().abs() < f64::EPSILON);
    }

    #[test]
    fn gini_perfect_split_scores_zero() {
        let targets = class_targets(&[0, 0, 1, 1]);
        let y = TargetTensor::new(&targets, 4, (1, 1, 1)).unwrap();
        let mask = [true; 4];
        let sorted: Vec<i32> = (0..4).collect();
        let mut gini = Gini::new(2);
        gini.init(&y, &mask, 4);
        let n_left = gini.update(0, 2, &y, &sorted, &mask);
        assert_eq!(n_left, 2);
        assert!(gini.eval().abs() < 1e-12, "eval = {}", gini.eval());
    }

    #[test]
    fn entropy_initial_error_balanced() {
        // All samples right: score = H_right = ln 2 for a 50/50 node.
        let targets = class_targets(&[0, 1, 0, 1]);
        let y = TargetTensor::new(&targets, 4, (1, 1, 1)).unwrap();
        let mask = [true; 4];
        let mut entropy = Entropy::new(2);
        entropy.init(&y, &mask, 4);
        assert!((entropy.eval() - 2.0_f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn entropy_perfect_split_scores_zero() {
        let targets = class_targets(&[0, 0, 1, 1]);
        let y = TargetTensor::new(&targets, 4, (1, 1, 1)).unwrap();
        let mask = [true; 4];
        let sorted: Vec<i32> = (0..4).collect();
        let mut entropy = Entropy::new(2);
        entropy.init(&y, &mask, 4);
        entropy.update(0, 2, &y, &sorted, &mask);
        assert!(entropy.eval().abs() < 1e-12);
    }

    #[test]
    fn update_skips_unmasked_samples() {
        let targets = class_targets(&[0, 1, 0, 1]);
        let y = TargetTensor::new(&targets, 4, (1, 1, 1)).unwrap();
        let mask = [true, false, true, false];
        let sorted: Vec<i32> = (0..4).collect();
        let mut gini = Gini::new(2);
        gini.init(&y, &mask, 2);
        let n_left = gini.update(0, 4, &y, &sorted, &mask);
        // Only the two masked class-0 samples moved.
        assert_eq!(n_left, 2);
        assert_eq!(gini.init_value(), vec![2.0, 0.0]);
    }

    #[test]
    fn reset_restores_post_init_state() {
        let targets = class_targets(&[0, 0, 1, 1]);
        let y = TargetTensor::new(&targets, 4, (1, 1, 1)).unwrap();
        let mask = [true; 4];
        let sorted: Vec<i32> = (0..4).collect();
        let mut gini = Gini::new(2);
        gini.init(&y, &mask, 4);
        let before = gini.eval();
        gini.update(0, 3, &y, &sorted, &mask);
        gini.reset();
        assert!((gini.eval() - before).abs() < 1e-15);
    }

    #[test]
    fn init_value_returns_masked_class_counts() {
        let targets = class_targets(&[0, 1, 1, 2, 2, 2]);
        let y = TargetTensor::new(&targets, 6, (1, 1, 1)).unwrap();
        let mask = [true, true, true, true, true, false];
        let mut entropy = Entropy::new(3);
        entropy.init(&y, &mask, 5);
        assert_eq!(entropy.init_value(), vec![1.0, 2.0, 2.0]);
    }

    #[test]
    fn counts_conserved_across_sweep() {
        let targets = class_targets(&[0, 1, 0, 1, 0, 1, 0, 1]);
        let y = TargetTensor::new(&targets, 8, (1, 1, 1)).unwrap();
        let mask = [true; 8];
        let sorted: Vec<i32> = (0..8).collect();
        let mut gini = Gini::new(2);
        gini.init(&y, &mask, 8);
        let mut n_left = 0;
        for step in 0..8 {
            n_left = gini.update(step, step + 1, &y, &sorted, &mask);
            assert_eq!(n_left, step + 1);
        }
        assert_eq!(n_left, 8);
    }
}
