use std::path::PathBuf;

use clap::Args;

use crate::cli::{or_dash, OutputFormat, ProbeArgs};
use crate::demux::identifier::{DemultiplexerIdentifier, Identified};

#[derive(Args)]
pub struct DemuxArgs {
    /// Demultiplexed output directory
    #[arg(required = true)]
    pub output_dir: PathBuf,

    #[command(flatten)]
    pub probe: ProbeArgs,
}

/// Execute demux subcommand
///
/// # Errors
///
/// Returns an error if the output directory does not exist or cannot be listed.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: DemuxArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let identifier = DemultiplexerIdentifier::new(&args.probe.identifier_config());
    let found = identifier.identify(&args.output_dir)?;

    if verbose {
        eprintln!("Identified by {}", found.tier);
    }

    match format {
        OutputFormat::Text => print_text_identified(&found),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&found)?),
        OutputFormat::Tsv => {
            println!("version\tversion_number\tcommandline_options\ttier\tis_guess");
            println!(
                "{}\t{}\t{}\t{}\t{}",
                found.info.version,
                found.info.version_number,
                or_dash(found.info.commandline_options.as_deref()),
                found.tier,
                found.is_guess(),
            );
        }
    }

    Ok(())
}

fn print_text_identified(found: &Identified) {
    println!("Demultiplexer: {}", found.info.version);
    println!("   Version: {}", found.info.version_number);
    println!(
        "   Command Line: {}",
        or_dash(found.info.commandline_options.as_deref())
    );
    println!("   Source: {}", found.tier);

    if found.is_guess() {
        println!("\n   Note: low confidence, inferred only from directory names");
    }
}
