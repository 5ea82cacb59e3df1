//! CLI entry point for the vine level generator

use clap::Parser;
use vinegen::io::cli::Cli;
use vinegen::placement::StrategyRegistry;

fn main() -> vinegen::Result<()> {
    let cli = Cli::parse();
    let registry = StrategyRegistry::with_defaults();
    cli.run(&registry)
}
