use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use rusqlite::Connection;
use serde::Serialize;
use tempfile::{Builder, NamedTempFile};
use tracing::info;

use crate::config::LoadRequest;
use crate::error::GxdbError;
use crate::extract::extract_experiments;
use crate::store::{StoreWriter, TableCounts};
use crate::xml::{Document, Element};

#[derive(Debug, Clone, Serialize)]
pub struct LoadSummary {
    pub xml_path: String,
    pub db_path: String,
    pub replaced: bool,
    pub loaded_at: String,
    pub tables: TableCounts,
}

#[derive(Debug, Clone)]
pub enum LoadOutcome {
    /// The database already existed and overwriting was not requested.
    AlreadyExists(Utf8PathBuf),
    Loaded(LoadSummary),
}

/// Loads the XML document into a fresh database at `request.db_path`.
///
/// The document is parsed before any store is touched. The database is built
/// in a temporary file beside the destination and only moved into place once
/// the load has committed, so a failed load leaves the destination as it was.
pub fn load(request: &LoadRequest) -> Result<LoadOutcome, GxdbError> {
    let db_path = request.db_path.as_path();
    let replaced = db_path.as_std_path().is_file();
    if replaced && !request.overwrite {
        info!(path = %db_path, "database exists, not overwriting");
        return Ok(LoadOutcome::AlreadyExists(db_path.to_path_buf()));
    }

    let document = Document::read(request.xml_path.as_std_path())?;

    let parent = staging_dir(db_path);
    fs::create_dir_all(parent.as_std_path())
        .map_err(|err| GxdbError::Filesystem(format!("create {parent}: {err}")))?;
    let staging = Builder::new()
        .prefix(".gxdb-load")
        .suffix(".sqlite")
        .tempfile_in(parent.as_std_path())
        .map_err(|err| GxdbError::Filesystem(err.to_string()))?;

    let tables = {
        let mut conn = Connection::open(staging.path())?;
        let tables = load_into(&mut conn, document.root())?;
        conn.close().map_err(|(_, err)| GxdbError::Database(err))?;
        tables
    };

    let permissions = database_permissions(&staging, db_path, replaced)?;
    staging
        .as_file()
        .set_permissions(permissions)
        .map_err(|err| GxdbError::Filesystem(format!("set permissions on {db_path}: {err}")))?;
    staging
        .persist(db_path.as_std_path())
        .map_err(|err| GxdbError::Filesystem(format!("persist {db_path}: {}", err.error)))?;

    let summary = LoadSummary {
        xml_path: request.xml_path.to_string(),
        db_path: db_path.to_string(),
        replaced,
        loaded_at: chrono::Utc::now().to_rfc3339(),
        tables,
    };
    info!(
        path = %db_path,
        experiments = summary.tables.experiments,
        "database loaded"
    );
    Ok(LoadOutcome::Loaded(summary))
}

/// Creates the schema and writes every experiment under `root` in a single
/// transaction.
pub fn load_into(conn: &mut Connection, root: &Element) -> Result<TableCounts, GxdbError> {
    let mut writer = StoreWriter::begin(conn)?;
    for record in extract_experiments(root) {
        writer.write_experiment(&record)?;
    }
    writer.finish()
}

/// A replaced database keeps its mode; a new one gets the usual 0644 instead
/// of the owner-only mode temp files are created with.
fn database_permissions(
    staging: &NamedTempFile,
    db_path: &Utf8Path,
    replaced: bool,
) -> Result<fs::Permissions, GxdbError> {
    if replaced {
        let metadata = fs::metadata(db_path.as_std_path())
            .map_err(|err| GxdbError::Filesystem(format!("stat {db_path}: {err}")))?;
        return Ok(metadata.permissions());
    }
    default_permissions(staging)
}

#[cfg(unix)]
fn default_permissions(_staging: &NamedTempFile) -> Result<fs::Permissions, GxdbError> {
    use std::os::unix::fs::PermissionsExt;

    Ok(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions(staging: &NamedTempFile) -> Result<fs::Permissions, GxdbError> {
    let metadata = staging
        .as_file()
        .metadata()
        .map_err(|err| GxdbError::Filesystem(err.to_string()))?;
    Ok(metadata.permissions())
}

fn staging_dir(db_path: &Utf8Path) -> Utf8PathBuf {
    match db_path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent.to_path_buf(),
        _ => Utf8PathBuf::from("."),
    }
}
