use std::{env, process::exit};

use balanced_tree::{
    BenchError, bench,
    config::{self, BenchConfig},
};
use rand::{SeedableRng, rngs::StdRng};

fn run(args: Vec<String>) -> Result<(), BenchError> {
    let config = BenchConfig::from_args(args)?;

    let mut rng = match config.seed() {
        Some(seed) => StdRng::seed_from_u64(*seed),
        None => StdRng::from_entropy(),
    };

    let report = bench::run(&config, &mut rng)?;
    print!("{}", report);
    Ok(())
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    if config::is_help_requested(&args) {
        println!("{}", config::USAGE);
        return;
    }

    if let Err(e) = run(args) {
        eprintln!("ERROR: {}", e);
        if matches!(e, BenchError::Config(_)) {
            eprintln!("{}", config::USAGE);
        }
        exit(1);
    }
}
