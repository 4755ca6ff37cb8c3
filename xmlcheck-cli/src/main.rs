//! xmlcheck CLI
//!
//! Validates a directory of XML documents against an XSD, or compares two
//! documents and writes a JSON difference report.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use xmlcheck::{compare_files, validate_files, IgnoreSet, Workspace};

/// XML schema validation and structural comparison
#[derive(Parser)]
#[command(name = "xmlcheck")]
#[command(version)]
#[command(about = "XML schema validation and structural comparison", long_about = None)]
struct Cli {
    /// Directory holding XSD files
    #[arg(long, global = true, env = "XMLCHECK_SCHEMA_DIR", default_value = xmlcheck::SCHEMA_DIR)]
    schema_dir: PathBuf,

    /// Directory scanned by `validate`
    #[arg(long, global = true, env = "XMLCHECK_IMPORTS", default_value = xmlcheck::IMPORT_DIR)]
    imports: PathBuf,

    /// Directory receiving verdicts and reports
    #[arg(long, global = true, env = "XMLCHECK_EXPORTS", default_value = xmlcheck::EXPORT_DIR)]
    exports: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate every XML file in the import directory against a schema
    #[command(visible_alias = "v")]
    Validate {
        /// Schema file (default: <schema-dir>/oBDS_v3.0.3.xsd)
        schema: Option<PathBuf>,
    },

    /// Compare two XML files and write <template>_vs_<compare>.json
    #[command(visible_alias = "c")]
    Compare {
        /// Template file
        template: PathBuf,
        /// File compared against the template
        compare: PathBuf,
        /// Element and attribute names to ignore (replaces the default list)
        ignore: Vec<String>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Prepares the directories and dispatches to the selected pipeline.
fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let workspace = Workspace::new(cli.schema_dir, cli.imports, cli.exports);
    workspace.ensure_dirs()?;

    match cli.command {
        Commands::Validate { schema } => {
            let schema = schema.unwrap_or_else(|| workspace.default_schema());
            run_validate(&workspace, &schema)
        }
        Commands::Compare {
            template,
            compare,
            ignore,
        } => {
            let ignore = if ignore.is_empty() {
                IgnoreSet::default()
            } else {
                IgnoreSet::new(ignore)
            };
            run_compare(&workspace, &template, &compare, &ignore)
        }
    }
}

/// Runs the validation batch. Invalid documents do not fail the run.
fn run_validate(
    workspace: &Workspace,
    schema: &Path,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    eprintln!(
        "Validating {} against {}",
        workspace.import_dir().display(),
        schema.display()
    );
    let summary = validate_files(schema, workspace.import_dir(), workspace.export_dir())?;

    println!(
        "{} file(s): {} valid, {} invalid, {} failed (verdicts in {})",
        summary.total(),
        summary.valid,
        summary.invalid,
        summary.faulted,
        workspace.export_dir().display()
    );
    if summary.unwritten > 0 {
        eprintln!("{} verdict(s) could not be written", summary.unwritten);
    }
    Ok(ExitCode::SUCCESS)
}

/// Runs the comparison. Differences exit with failure.
fn run_compare(
    workspace: &Workspace,
    template: &Path,
    compare: &Path,
    ignore: &IgnoreSet,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    eprintln!("Comparing {} with {}", template.display(), compare.display());
    let outcome = compare_files(template, compare, ignore, workspace)?;

    if outcome.is_equal() {
        println!(
            "XML documents are equal. (Result: {})",
            outcome.report_path.display()
        );
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!(
            "XML documents differ in {} place(s). Details in {}",
            outcome.report.differences.len(),
            outcome.report_path.display()
        );
        Ok(ExitCode::FAILURE)
    }
}
