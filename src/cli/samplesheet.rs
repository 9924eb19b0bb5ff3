use std::io::Write;
use std::path::PathBuf;

use clap::Args;

use crate::cli::{or_dash, OutputFormat};
use crate::core::project::UNDETERMINED_PROJECT;
use crate::core::sample::{get_project_ids, SampleIndex, SampleRow, SAMPLE_PROJECT_COLUMN};
use crate::parsing::samplesheet::{
    filter_samplesheet_by_project, parse_samplesheet_file, SampleSheet,
};
use crate::utils::validation::normalize_column_key;

#[derive(Args)]
pub struct SamplesheetArgs {
    /// Sample sheet (IEM v3 CSV or IEM v4)
    #[arg(required = true)]
    pub input: PathBuf,

    /// Print only the header and rows of this project, byte-for-byte
    #[arg(long)]
    pub project: Option<String>,

    /// Column holding the project (underscores ignored)
    #[arg(long, default_value = SAMPLE_PROJECT_COLUMN)]
    pub project_column: String,

    /// Key the samples by this column; duplicate keys are an error
    #[arg(long)]
    pub index_by: Option<String>,
}

/// Execute samplesheet subcommand
///
/// # Errors
///
/// Returns an error if the sample sheet cannot be parsed, the project column
/// is missing, or `--index-by` finds duplicate keys.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: SamplesheetArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    if let Some(project) = &args.project {
        let excerpt = filter_samplesheet_by_project(&args.input, project, &args.project_column)?;
        if verbose {
            eprintln!("{} data rows for project {project}", excerpt.len().saturating_sub(1));
        }

        let mut stdout = std::io::stdout().lock();
        for line in &excerpt {
            stdout.write_all(line.as_bytes())?;
        }
        stdout.flush()?;
        return Ok(());
    }

    let sheet = parse_samplesheet_file(&args.input)?;
    if verbose {
        eprintln!("Parsed {} rows ({} dialect)", sheet.rows.len(), sheet.dialect);
    }

    if let Some(key) = &args.index_by {
        let key = normalize_column_key(key);
        let index = SampleIndex::build(&sheet.rows, &key)?;
        print_index(&index, &key, format)?;
        return Ok(());
    }

    match format {
        OutputFormat::Text => print_text_sheet(&sheet),
        OutputFormat::Json => {
            let output = serde_json::json!({
                "dialect": sheet.dialect,
                "chemistry": sheet.chemistry,
                "projects": get_project_ids(&sheet.rows, Some(UNDETERMINED_PROJECT)),
                "rows": sheet.rows,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => print_tsv_rows(&sheet.rows),
    }

    Ok(())
}

fn print_text_sheet(sheet: &SampleSheet) {
    println!("Dialect: {}", sheet.dialect);
    println!("Chemistry: {}", or_dash(sheet.chemistry.as_deref()));
    println!("Samples: {}", sheet.rows.len());

    let projects = get_project_ids(&sheet.rows, None);
    println!("\nProjects ({}):", projects.len());
    for project in &projects {
        let count = sheet
            .rows
            .iter()
            .filter(|r| r.project() == Some(project.as_str()))
            .count();
        println!("   {project}: {count} samples");
    }

    println!("\nSamples:");
    for row in &sheet.rows {
        println!(
            "   {}\t{}",
            or_dash(row.sample_id()),
            or_dash(row.project())
        );
    }
}

fn print_tsv_rows(rows: &[SampleRow]) {
    let Some(first) = rows.first() else {
        return;
    };
    let columns: Vec<&str> = first.keys().collect();
    println!("{}", columns.join("\t"));
    for row in rows {
        let values: Vec<&str> = columns.iter().map(|c| row.get(c).unwrap_or("")).collect();
        println!("{}", values.join("\t"));
    }
}

fn print_index(index: &SampleIndex, key: &str, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(index)?),
        OutputFormat::Text | OutputFormat::Tsv => {
            println!("{key}\tproject");
            for (id, row) in index.iter() {
                println!("{id}\t{}", or_dash(row.project()));
            }
        }
    }
    Ok(())
}
