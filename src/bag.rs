//! Bootstrap sample-mask construction.

use rand::Rng;

use crate::error::TreeError;

/// Draw a mask selecting exactly `n_in_bag` of `n_total` rows, uniformly
/// over all subsets of that size.
///
/// Sequential reservoir selection: position `i` is taken when
/// `u * (n_total - i) < remaining`, with `u` drawn fresh per position.
/// One RNG draw is consumed per position regardless of the outcome.
///
/// # Errors
///
/// Returns [`TreeError::InvalidBagSize`] when `n_in_bag > n_total`.
pub fn random_sample_mask(
    n_total: usize,
    n_in_bag: usize,
    rng: &mut impl Rng,
) -> Result<Vec<bool>, TreeError> {
    if n_in_bag > n_total {
        return Err(TreeError::InvalidBagSize { n_in_bag, n_total });
    }
    let mut mask = vec![false; n_total];
    let mut n_bagged = 0usize;
    for (i, slot) in mask.iter_mut().enumerate() {
        let u: f64 = rng.r#gen();
        if u * ((n_total - i) as f64) < (n_in_bag - n_bagged) as f64 {
            *slot = true;
            n_bagged += 1;
        }
    }
    debug_assert_eq!(n_bagged, n_in_bag);
    Ok(mask)
}
