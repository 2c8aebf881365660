use std::io::{self, Write};

use clap::ValueEnum;
use serde::Serialize;

use crate::domain::ExpressionHit;
use crate::error::GxdbError;
use crate::loader::LoadSummary;

pub const CSV_HEADER: [&str; 4] = ["Gene", "Image URL", "Stain Localization", "Developmental Stage"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

pub struct CsvOutput;

impl CsvOutput {
    /// Writes nothing at all, not even the header, when there are no hits.
    pub fn write_hits<W: Write>(writer: W, hits: &[ExpressionHit]) -> Result<(), GxdbError> {
        if hits.is_empty() {
            return Ok(());
        }
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(CSV_HEADER).map_err(output_error)?;
        for hit in hits {
            csv.write_record([
                hit.gene.as_deref().unwrap_or_default(),
                hit.image_url.as_deref().unwrap_or_default(),
                hit.stain_localization.as_deref().unwrap_or_default(),
                hit.developmental_stage.as_deref().unwrap_or_default(),
            ])
            .map_err(output_error)?;
        }
        csv.flush().map_err(|err| GxdbError::Output(err.to_string()))?;
        Ok(())
    }

    pub fn print_hits(hits: &[ExpressionHit]) -> Result<(), GxdbError> {
        Self::write_hits(io::stdout().lock(), hits)
    }
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_hits(hits: &[ExpressionHit]) -> io::Result<()> {
        Self::print_json(&hits)
    }

    pub fn print_load(summary: &LoadSummary) -> io::Result<()> {
        Self::print_json(summary)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

fn output_error(err: csv::Error) -> GxdbError {
    GxdbError::Output(err.to_string())
}
