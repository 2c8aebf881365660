use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum GxdbError {
    #[error("failed to read XML file at {path}: {message}")]
    XmlRead { path: PathBuf, message: String },

    #[error("{0}")]
    XmlParse(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("database file not found: {0}")]
    #[diagnostic(help("create it first with `gxdb-load <xml_file> <db_file>`"))]
    DatabaseMissing(PathBuf),

    #[error("unknown table: {0}")]
    UnknownTable(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("at least one gene name is required")]
    NoGenes,

    #[error("failed to write output: {0}")]
    Output(String),
}
