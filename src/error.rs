use thiserror::Error;

use crate::config::MIN_DEGREE;

/// Outcomes of tree operations that are not successes.
///
/// `EmptyTree` and `KeyNotFound` are expected results of `remove`, the tree is
/// left untouched when they are returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("minimum degree must be at least {min}, got {0}", min = MIN_DEGREE)]
    InvalidDegree(usize),
    #[error("the tree is empty")]
    EmptyTree,
    #[error("key {0} was not found in the tree")]
    KeyNotFound(i32),
    #[error("tree invariant violated: {0}")]
    InvariantViolation(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyGenError {
    #[error("empty key range: lower bound {lower} is greater than upper bound {upper}")]
    EmptyRange { lower: i32, upper: i32 },
    #[error("cannot draw {requested} unique keys from a range holding only {available}")]
    RangeTooSmall { requested: usize, available: u64 },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("flag {0} expects a value")]
    MissingValue(String),
    #[error("invalid value {value:?} for flag {flag}")]
    InvalidValue { flag: String, value: String },
    #[error("unknown flag {0}")]
    UnknownFlag(String),
}

#[derive(Debug, Error)]
pub enum BenchError {
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error(transparent)]
    KeyGen(#[from] KeyGenError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("no keys were generated, nothing to search for")]
    NoKeys,
}
