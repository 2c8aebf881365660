use std::path::PathBuf;

use camino::Utf8PathBuf;

use crate::error::GxdbError;
use crate::output::OutputFormat;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub xml_path: Utf8PathBuf,
    pub db_path: Utf8PathBuf,
    pub overwrite: bool,
}

impl LoadRequest {
    pub fn resolve(xml_file: PathBuf, db_file: PathBuf, overwrite: bool) -> Result<Self, GxdbError> {
        Ok(Self {
            xml_path: utf8_path(xml_file)?,
            db_path: utf8_path(db_file)?,
            overwrite,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub db_path: Utf8PathBuf,
    pub genes: Vec<String>,
    pub format: OutputFormat,
}

impl QueryRequest {
    /// Gene names are matched exactly as given, so they are not trimmed or
    /// case-folded here.
    pub fn resolve(
        db_file: PathBuf,
        genes: Vec<String>,
        format: OutputFormat,
    ) -> Result<Self, GxdbError> {
        if genes.is_empty() {
            return Err(GxdbError::NoGenes);
        }
        Ok(Self {
            db_path: utf8_path(db_file)?,
            genes,
            format,
        })
    }
}

fn utf8_path(path: PathBuf) -> Result<Utf8PathBuf, GxdbError> {
    Utf8PathBuf::from_path_buf(path)
        .map_err(|path| GxdbError::InvalidPath(path.display().to_string()))
}
