use derive_getters::Getters;

use crate::error::ConfigError;

/// Smallest minimum degree for which split and merge arithmetic holds.
pub const MIN_DEGREE: usize = 2;

pub const DEFAULT_MIN_DEGREE: usize = 3;
pub const DEFAULT_KEY_COUNT: usize = 100_000;
pub const DEFAULT_LOWER_BOUND: i32 = 0;
pub const DEFAULT_UPPER_BOUND: i32 = 500_000;

pub const USAGE: &str = "\
Usage: balanced_tree [options]
Options:
  --degree <t>   minimum degree of the tree (default 3)
  --count <n>    number of unique keys to insert (default 100000)
  --lower <k>    smallest key that may be generated (default 0)
  --upper <k>    largest key that may be generated (default 500000)
  --seed <s>     seed for the key generator (default: random)
  -h, --help     print this message";

/// Settings of one benchmark run.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct BenchConfig {
    min_degree: usize,
    key_count: usize,
    lower_bound: i32,
    upper_bound: i32,
    seed: Option<u64>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            min_degree: DEFAULT_MIN_DEGREE,
            key_count: DEFAULT_KEY_COUNT,
            lower_bound: DEFAULT_LOWER_BOUND,
            upper_bound: DEFAULT_UPPER_BOUND,
            seed: None,
        }
    }
}

impl BenchConfig {
    pub fn new(min_degree: usize, key_count: usize, lower_bound: i32, upper_bound: i32) -> Self {
        Self {
            min_degree,
            key_count,
            lower_bound,
            upper_bound,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Parses command line flags (program name already stripped). Flags not
    /// given keep their default.
    pub fn from_args<I>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = Self::default();
        let mut args = args.into_iter();

        while let Some(flag) = args.next() {
            let value = match flag.as_str() {
                "--degree" | "--count" | "--lower" | "--upper" | "--seed" => args
                    .next()
                    .ok_or_else(|| ConfigError::MissingValue(flag.clone()))?,
                _ => return Err(ConfigError::UnknownFlag(flag)),
            };

            match flag.as_str() {
                "--degree" => config.min_degree = parse_value(&flag, &value)?,
                "--count" => config.key_count = parse_value(&flag, &value)?,
                "--lower" => config.lower_bound = parse_value(&flag, &value)?,
                "--upper" => config.upper_bound = parse_value(&flag, &value)?,
                _ => config.seed = Some(parse_value(&flag, &value)?),
            }
        }

        Ok(config)
    }
}

pub fn is_help_requested(args: &[String]) -> bool {
    args.iter().any(|arg| arg == "-h" || arg == "--help")
}

fn parse_value<T: std::str::FromStr>(flag: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        flag: flag.to_owned(),
        value: value.to_owned(),
    })
}
