use std::{fmt, time::Duration, time::Instant};

use derive_getters::Getters;
use log::info;
use rand::Rng;

use crate::{
    config::BenchConfig,
    error::BenchError,
    keygen::{largest_key, unique_random_keys},
    tree::BalancedTree,
};

/// Outcome of a single timed search for the largest inserted key.
#[derive(Debug, Clone, Getters)]
pub struct BenchReport {
    key_count: usize,
    min_degree: usize,
    height: usize,
    searched_key: i32,
    found: bool,
    elapsed: Duration,
}

/// Fills a tree with unique random keys, then times one search for the maximum.
pub fn run<R: Rng + ?Sized>(config: &BenchConfig, rng: &mut R) -> Result<BenchReport, BenchError> {
    let mut tree = BalancedTree::new(*config.min_degree())?;

    let keys = unique_random_keys(rng, *config.key_count(), *config.lower_bound(), *config.upper_bound())?;
    tree.extend(keys.iter().copied());
    info!(
        "inserted {} keys, tree of degree {} has height {}",
        tree.len(),
        tree.min_degree(),
        tree.height()
    );

    let searched_key = largest_key(&keys).ok_or(BenchError::NoKeys)?;

    let start = Instant::now();
    let found = tree.search(searched_key);
    let elapsed = start.elapsed();

    Ok(BenchReport {
        key_count: tree.len(),
        min_degree: tree.min_degree(),
        height: tree.height(),
        searched_key,
        found,
        elapsed,
    })
}

impl fmt::Display for BenchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "search for {} in {} keys (t = {}, height = {}): {}",
            self.searched_key,
            self.key_count,
            self.min_degree,
            self.height,
            if self.found { "found" } else { "not found" }
        )?;
        writeln!(f, "elapsed: {} ns", self.elapsed.as_nanos())?;
        writeln!(f, "elapsed: {} ms", self.elapsed.as_millis())
    }
}
