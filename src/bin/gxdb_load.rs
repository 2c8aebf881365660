use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use gxdb::config::LoadRequest;
use gxdb::error::GxdbError;
use gxdb::loader::{self, LoadOutcome};
use gxdb::output::JsonOutput;

#[derive(Parser)]
#[command(name = "gxdb-load")]
#[command(about = "Serialize gene-expression experiment XML to a SQLite database")]
#[command(version, author)]
struct Cli {
    #[arg(help = "path to the XML file")]
    xml_file: PathBuf,

    #[arg(help = "path to the SQLite database file")]
    db_file: PathBuf,

    #[arg(short, long, help = "overwrite the existing database file")]
    overwrite: bool,

    #[arg(long, help = "print the load summary as JSON")]
    json: bool,
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
        GxdbError::XmlRead { .. } | GxdbError::XmlParse(_) | GxdbError::InvalidPath(_) => 2,
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
    let request = LoadRequest::resolve(cli.xml_file, cli.db_file, cli.overwrite)?;

    let outcome = loader::load(&request)
        .map_err(|err| miette::Report::new(err).wrap_err("An error occurred"))?;

    match outcome {
        LoadOutcome::AlreadyExists(path) => {
            println!("Database file '{path}' already exists. Use the '-o' option to overwrite.");
        }
        LoadOutcome::Loaded(summary) => {
            if cli.json {
                JsonOutput::print_load(&summary).into_diagnostic()?;
            } else {
                println!(
                    "Successfully serialized XML data to the database file: {}",
                    summary.db_path
                );
            }
        }
    }
    Ok(())
}
