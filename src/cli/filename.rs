use std::path::PathBuf;

use clap::Args;

use crate::cli::OutputFormat;
use crate::core::types::FilenameMatch;
use crate::parsing::filename::{FilenamePatterns, READ_FILE_SUFFIX};

#[derive(Args)]
pub struct FilenameArgs {
    /// Read file names or paths
    #[arg(required = true)]
    pub names: Vec<PathBuf>,

    /// Read file suffix
    #[arg(long, default_value = READ_FILE_SUFFIX)]
    pub suffix: String,
}

/// Execute filename subcommand
///
/// # Errors
///
/// Returns an error if a name matches a template but a numeric field is
/// missing or out of range.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: FilenameArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let patterns = FilenamePatterns::new(&args.suffix)?;

    let mut parsed = Vec::with_capacity(args.names.len());
    for name in &args.names {
        let found = patterns.parse(name)?;
        if found.is_none() && verbose {
            eprintln!("No template matches {}", name.display());
        }
        parsed.push((name, patterns.sample_id(name), found));
    }

    match format {
        OutputFormat::Text => {
            for (name, sample_id, found) in &parsed {
                print_text_match(&name.display().to_string(), sample_id, found.as_ref());
            }
        }
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = parsed
                .iter()
                .map(|(name, sample_id, found)| {
                    serde_json::json!({
                        "file": name.display().to_string(),
                        "sample_id": sample_id,
                        "match": found,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("file\tsample_id\tsample_name\ttag\tlane\tread\tset_number");
            for (name, sample_id, found) in &parsed {
                match found {
                    Some(m) => println!(
                        "{}\t{sample_id}\t{}\t{}\t{}\t{}\t{}",
                        name.display(),
                        m.sample_name,
                        m.tag.as_ref().map_or_else(|| "-".to_string(), ToString::to_string),
                        m.lane,
                        m.read,
                        m.set_number,
                    ),
                    None => println!("{}\t{sample_id}\t-\t-\t-\t-\t-", name.display()),
                }
            }
        }
    }

    Ok(())
}

fn print_text_match(name: &str, sample_id: &str, found: Option<&FilenameMatch>) {
    println!("{name}");
    println!("   Sample ID: {sample_id}");
    match found {
        Some(m) => {
            println!("   Sample Name: {}", m.sample_name);
            if let Some(n) = m.sample_number() {
                println!("   Sample Number: {n}");
            }
            if let Some(index) = m.index_sequence() {
                println!("   Index: {index}");
            }
            println!("   Lane: {}  Read: {}  Set: {}", m.lane, m.read, m.set_number);
        }
        None => println!("   (no template matches)"),
    }
}
