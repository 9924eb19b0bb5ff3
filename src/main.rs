use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod core;
mod demux;
mod error;
mod layout;
mod parsing;
mod run;
mod utils;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("seqrun_meta=debug,info")
    } else {
        EnvFilter::new("seqrun_meta=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        cli::Commands::Run(args) => {
            cli::run::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Samplesheet(args) => {
            cli::samplesheet::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Projects(args) => {
            cli::projects::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Demux(args) => {
            cli::demux::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Filename(args) => {
            cli::filename::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
