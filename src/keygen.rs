use std::collections::HashSet;

use log::debug;
use rand::Rng;

use crate::error::KeyGenError;

/// Draws `count` distinct keys uniformly from the inclusive range
/// `lower..=upper`. The order of the returned keys is unspecified.
pub fn unique_random_keys<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    lower: i32,
    upper: i32,
) -> Result<Vec<i32>, KeyGenError> {
    if lower > upper {
        return Err(KeyGenError::EmptyRange { lower, upper });
    }

    let available = (i64::from(upper) - i64::from(lower) + 1) as u64;
    if count as u64 > available {
        return Err(KeyGenError::RangeTooSmall { requested: count, available });
    }

    let mut keys = HashSet::with_capacity(count);
    let mut draws = 0usize;
    while keys.len() < count {
        keys.insert(rng.gen_range(lower..=upper));
        draws += 1;
    }
    debug!("generated {} unique keys in {} draws", count, draws);

    Ok(keys.into_iter().collect())
}

pub fn largest_key(keys: &[i32]) -> Option<i32> {
    keys.iter().copied().max()
}
