use std::path::PathBuf;

use clap::Args;

use crate::cli::OutputFormat;
use crate::core::project::ProjectMapping;
use crate::layout::mapper::{get_sample_project_mapping, MapperConfig};
use crate::parsing::filename::READ_FILE_SUFFIX;

#[derive(Args)]
pub struct ProjectsArgs {
    /// Demultiplexed output directory
    #[arg(required = true)]
    pub output_dir: PathBuf,

    /// Read file suffix
    #[arg(long, default_value = READ_FILE_SUFFIX)]
    pub suffix: String,

    /// Report paths prefixed with OUTPUT_DIR
    #[arg(long)]
    pub absolute: bool,

    /// Leave undetermined reads in the project of their directory
    #[arg(long)]
    pub keep_undetermined_in_place: bool,
}

/// Execute projects subcommand
///
/// # Errors
///
/// Returns an error if the output directory does not exist.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: ProjectsArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let config = MapperConfig {
        suffix: args.suffix.clone(),
        absolute_paths: args.absolute,
        catch_undetermined: !args.keep_undetermined_in_place,
    };

    let mapping = get_sample_project_mapping(&args.output_dir, &config)?;

    if verbose {
        eprintln!(
            "Found {} read files in {} projects",
            mapping.file_count(),
            mapping.len()
        );
    }

    if mapping.is_empty() {
        eprintln!("No files ending in {} found.", config.suffix);
        return Ok(());
    }

    match format {
        OutputFormat::Text => print_text_mapping(&mapping),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&mapping)?),
        OutputFormat::Tsv => print_tsv_mapping(&mapping),
    }

    Ok(())
}

fn display_project(project: &str) -> &str {
    if project.is_empty() {
        "(no project)"
    } else {
        project
    }
}

fn print_text_mapping(mapping: &ProjectMapping) {
    for (i, (project, files)) in mapping.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("{} ({} files)", display_project(project), files.len());
        for file in files {
            println!("   {}", file.display());
        }
    }
}

fn print_tsv_mapping(mapping: &ProjectMapping) {
    println!("project\tpath");
    for (project, files) in mapping.iter() {
        for file in files {
            println!("{project}\t{}", file.display());
        }
    }
}
