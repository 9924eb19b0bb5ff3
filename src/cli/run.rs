use std::path::PathBuf;

use clap::Args;

use crate::cli::{or_dash, OutputFormat, ProbeArgs};
use crate::run::metadata::{extract_run_metadata, ExtractOptions, RunMetadata};

#[derive(Args)]
pub struct RunArgs {
    /// Instrument run directory (holds RunInfo.xml and RTAComplete.txt)
    #[arg(required = true)]
    pub run_dir: PathBuf,

    /// Sample sheet (defaults to <RUN_DIR>/SampleSheet.csv when present)
    #[arg(long)]
    pub samplesheet: Option<PathBuf>,

    /// Demultiplexed output directory, used to identify the demultiplexer
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    #[command(flatten)]
    pub probe: ProbeArgs,
}

/// Execute run subcommand
///
/// # Errors
///
/// Returns an error if a required run file is missing or cannot be parsed.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: RunArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let options = ExtractOptions {
        samplesheet: args.samplesheet.clone(),
        demultiplexed_output: args.output_dir.clone(),
        identifier: args.probe.identifier_config(),
    };

    let metadata = extract_run_metadata(&args.run_dir, &options)?;

    if verbose {
        eprintln!("Extracted metadata for run {}", metadata.run_id);
    }

    match format {
        OutputFormat::Text => print_text_metadata(&metadata),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&metadata)?),
        OutputFormat::Tsv => print_tsv_metadata(&metadata),
    }

    Ok(())
}

fn print_text_metadata(m: &RunMetadata) {
    println!("Run: {}", m.run_id);
    println!("   Run Number: {}", m.run_number);
    println!("   Flowcell: {}", m.flowcell_id);
    println!("   Instrument: {}", m.instrument_id);
    println!("   Instrument Model: {}", or_dash(m.instrument_model.as_deref()));
    println!("   Read Cycles: {}", m.read_cycles);
    if let Some(layout) = &m.flowcell_layout {
        println!("   Lanes: {}", layout.lane_count);
    }
    println!("   Chemistry: {}", or_dash(m.chemistry.as_deref()));
    println!("   RTA Version: {}", m.rta_version);
    println!("   Completed: {}", m.completed_at);

    if let Some(program) = &m.demultiplexing_program {
        let note = if m.demultiplexing_is_guess == Some(true) {
            " (guessed from directory names)"
        } else {
            ""
        };
        println!("\n   Demultiplexer: {program}{note}");
        println!(
            "   Command Line: {}",
            or_dash(m.demultiplexing_commandline_options.as_deref())
        );
    }
}

fn print_tsv_metadata(m: &RunMetadata) {
    println!("run_id\trun_number\tflowcell_id\tinstrument_id\tinstrument_model\tread_cycles\tchemistry\trta_version\tcompleted_at\tdemultiplexing_program\tdemultiplexing_is_guess");
    println!(
        "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
        m.run_id,
        m.run_number,
        m.flowcell_id,
        m.instrument_id,
        or_dash(m.instrument_model.as_deref()),
        m.read_cycles,
        or_dash(m.chemistry.as_deref()),
        m.rta_version,
        m.completed_at,
        or_dash(m.demultiplexing_program.as_deref()),
        m.demultiplexing_is_guess
            .map_or_else(|| "-".to_string(), |g| g.to_string()),
    );
}
