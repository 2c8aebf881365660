use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use gxdb::config::QueryRequest;
use gxdb::error::GxdbError;
use gxdb::output::{CsvOutput, JsonOutput, OutputFormat};
use gxdb::query;

#[derive(Parser)]
#[command(name = "gxdb-query")]
#[command(
    about = "Query a gene-expression database for image URL, stain localization, and developmental stage"
)]
#[command(version, author)]
struct Cli {
    #[arg(help = "path to the SQLite database file")]
    db_file: PathBuf,

    #[arg(required = true, num_args = 1.., help = "genes to query (separated by spaces)")]
    genes: Vec<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<GxdbError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &GxdbError) -> u8 {
    match error {
        GxdbError::DatabaseMissing(_) | GxdbError::NoGenes | GxdbError::InvalidPath(_) => 2,
        GxdbError::Database(_) => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let request = QueryRequest::resolve(cli.db_file, cli.genes, cli.format)?;

    let conn = query::open_read_only(&request.db_path)?;
    let hits = query::query_genes(&conn, &request.genes)?;

    match request.format {
        OutputFormat::Csv => CsvOutput::print_hits(&hits)?,
        OutputFormat::Json => JsonOutput::print_hits(&hits).into_diagnostic()?,
    }
    Ok(())
}
