use std::fs;
use std::path::{Path, PathBuf};

use assert_matches::assert_matches;
use rusqlite::Connection;
use tempfile::TempDir;

use gxdb::config::LoadRequest;
use gxdb::error::GxdbError;
use gxdb::loader::{LoadOutcome, load, load_into};
use gxdb::store::TableCounts;
use gxdb::xml::Document;

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/experiments.xml")
}

fn request(xml: PathBuf, db: PathBuf, overwrite: bool) -> LoadRequest {
    LoadRequest::resolve(xml, db, overwrite).unwrap()
}

fn load_fixture(dir: &TempDir) -> PathBuf {
    let db = dir.path().join("expression.sqlite");
    let outcome = load(&request(fixture(), db.clone(), false)).unwrap();
    assert_matches!(outcome, LoadOutcome::Loaded(_));
    db
}

#[test]
fn loads_fixture_with_deduplicated_entities() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("expression.sqlite");
    let outcome = load(&request(fixture(), db.clone(), false)).unwrap();
    let LoadOutcome::Loaded(summary) = outcome else {
        panic!("expected a load");
    };
    assert!(!summary.replaced);
    assert_eq!(
        summary.tables,
        TableCounts {
            experiments: 3,
            sources: 2,
            people: 2,
            reporters: 2,
            biomaterials: 2,
            treatments: 2,
            images: 2,
            stainings: 2,
        }
    );

    let conn = Connection::open(&db).unwrap();
    let reread = TableCounts::read(&conn).unwrap();
    assert_eq!(reread, summary.tables);
}

#[test]
fn shared_person_is_one_row_across_roles_and_experiments() {
    let dir = tempfile::tempdir().unwrap();
    let db = load_fixture(&dir);
    let conn = Connection::open(&db).unwrap();

    let ids = |experiment: &str| -> (Option<i64>, Option<i64>, Option<i64>) {
        conn.query_row(
            "SELECT author_id, annotator_id, curator_id FROM experiments WHERE experiment_id = ?1",
            [experiment],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .unwrap()
    };
    let (author_1, annotator_1, curator_1) = ids("XB-ART-1001");
    let (author_2, annotator_2, curator_2) = ids("XB-ART-1002");

    assert!(author_1.is_some());
    assert_eq!(author_1, curator_1);
    assert_eq!(author_1, author_2);
    assert_ne!(author_1, annotator_1);
    assert_eq!(annotator_2, None);
    assert_eq!(curator_2, None);

    let date: Option<String> = conn
        .query_row(
            "SELECT author_date FROM experiments WHERE experiment_id = 'XB-ART-1002'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(date.as_deref(), Some("2005-01-10"));
}

#[test]
fn identical_sources_share_a_row_distinct_ones_do_not() {
    let dir = tempfile::tempdir().unwrap();
    let db = load_fixture(&dir);
    let conn = Connection::open(&db).unwrap();

    let source = |experiment: &str| -> Option<i64> {
        conn.query_row(
            "SELECT source_id FROM experiments WHERE experiment_id = ?1",
            [experiment],
            |row| row.get(0),
        )
        .unwrap()
    };
    assert_eq!(source("XB-ART-1001"), source("XB-ART-1002"));
    assert_ne!(source("XB-ART-1001"), source("XB-ART-1003"));

    let (kind, value): (String, String) = conn
        .query_row(
            "SELECT type, value FROM sources WHERE id = ?1",
            [source("XB-ART-1003")],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(kind, "doi");
    assert_eq!(value, "10.1000/xyz");
}

#[test]
fn missing_blocks_produce_no_rows_for_that_experiment() {
    let dir = tempfile::tempdir().unwrap();
    let db = load_fixture(&dir);
    let conn = Connection::open(&db).unwrap();

    let owned = |table: &str| -> i64 {
        conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM {table} t JOIN experiments e ON t.experiment_id = e.id
                 WHERE e.experiment_id = 'XB-ART-1002'"
            ),
            [],
            |row| row.get(0),
        )
        .unwrap()
    };
    assert_eq!(owned("biomaterials"), 0);
    assert_eq!(owned("images"), 0);

    let reporter: Option<i64> = conn
        .query_row(
            "SELECT reporter_id FROM experiments WHERE experiment_id = 'XB-ART-1002'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert!(reporter.is_some());
}

#[test]
fn existing_database_is_left_untouched_without_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("expression.sqlite");
    fs::write(&db, b"previous contents").unwrap();

    let outcome = load(&request(fixture(), db.clone(), false)).unwrap();
    assert_matches!(outcome, LoadOutcome::AlreadyExists(_));
    assert_eq!(fs::read(&db).unwrap(), b"previous contents");
}

#[test]
fn overwrite_replaces_previous_load() {
    let dir = tempfile::tempdir().unwrap();
    let db = load_fixture(&dir);

    let outcome = load(&request(fixture(), db.clone(), true)).unwrap();
    let LoadOutcome::Loaded(summary) = outcome else {
        panic!("expected a load");
    };
    assert!(summary.replaced);
    assert_eq!(summary.tables.experiments, 3);

    let conn = Connection::open(&db).unwrap();
    assert_eq!(TableCounts::read(&conn).unwrap().experiments, 3);
}

#[test]
fn malformed_document_leaves_existing_database_intact() {
    let dir = tempfile::tempdir().unwrap();
    let db = load_fixture(&dir);
    let before = fs::read(&db).unwrap();

    let broken = dir.path().join("broken.xml");
    fs::write(&broken, "<experiments><experiment id=\"1\">").unwrap();

    let err = load(&request(broken, db.clone(), true)).unwrap_err();
    assert_matches!(err, GxdbError::XmlParse(_));
    assert_eq!(fs::read(&db).unwrap(), before);
}

#[test]
fn malformed_document_creates_no_database() {
    let dir = tempfile::tempdir().unwrap();
    let broken = dir.path().join("broken.xml");
    fs::write(&broken, "<experiments><experiment></experiments>").unwrap();
    let db = dir.path().join("expression.sqlite");

    let err = load(&request(broken, db.clone(), false)).unwrap_err();
    assert_matches!(err, GxdbError::XmlParse(_));
    assert!(!db.exists());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn unreadable_document_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("expression.sqlite");
    let err = load(&request(dir.path().join("absent.xml"), db.clone(), false)).unwrap_err();
    assert_matches!(err, GxdbError::XmlRead { .. });
    assert!(!db.exists());
}

#[test]
fn empty_document_loads_empty_schema() {
    let document = Document::parse("<experiments/>").unwrap();
    let mut conn = Connection::open_in_memory().unwrap();
    let counts = load_into(&mut conn, document.root()).unwrap();
    assert_eq!(counts, TableCounts::default());
}

#[test]
fn declared_latin1_document_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let xml = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/latin1.xml");
    let db = dir.path().join("expression.sqlite");
    let outcome = load(&request(xml, db.clone(), false)).unwrap();
    assert_matches!(outcome, LoadOutcome::Loaded(_));

    let conn = Connection::open(&db).unwrap();
    let (name, surname): (String, String) = conn
        .query_row("SELECT name, surname FROM people", [], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })
        .unwrap();
    assert_eq!(name, "Ren\u{e9}");
    assert_eq!(surname, "M\u{fc}ller");
}

#[cfg(unix)]
#[test]
fn new_database_is_readable_by_group_and_others() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let db = load_fixture(&dir);
    let mode = fs::metadata(&db).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o644);
}

#[cfg(unix)]
#[test]
fn overwrite_keeps_existing_mode() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let db = load_fixture(&dir);
    fs::set_permissions(&db, fs::Permissions::from_mode(0o640)).unwrap();

    let outcome = load(&request(fixture(), db.clone(), true)).unwrap();
    assert_matches!(outcome, LoadOutcome::Loaded(_));
    let mode = fs::metadata(&db).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o640);
}
