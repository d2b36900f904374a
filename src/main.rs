use clap::Parser;
use tracing_subscriber::EnvFilter;

mod catalog;
mod cli;
mod core;
mod matching;
mod parsing;
mod utils;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("seqsketch=debug,info")
    } else {
        EnvFilter::new("seqsketch=warn")
    };

    // Results may go to stdout, so logs stay on stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        cli::Commands::Sketch(args) => cli::sketch::run(args)?,
        cli::Commands::Search(args) => cli::search::run(args)?,
        cli::Commands::Cluster(args) => cli::cluster::run(args)?,
    }

    Ok(())
}
