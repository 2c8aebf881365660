use std::path::Path;

use camino::Utf8PathBuf;
use rusqlite::Connection;

use gxdb::config::LoadRequest;
use gxdb::domain::ExpressionHit;
use gxdb::loader::load;
use gxdb::output::CsvOutput;
use gxdb::query::{open_read_only, query_genes};

fn loaded_database(dir: &tempfile::TempDir) -> Connection {
    let xml = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/experiments.xml");
    let db = dir.path().join("expression.sqlite");
    let request = LoadRequest::resolve(xml, db.clone(), false).unwrap();
    load(&request).unwrap();
    let path = Utf8PathBuf::from_path_buf(db).unwrap();
    open_read_only(&path).unwrap()
}

fn genes(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

#[test]
fn round_trip_returns_literal_values() {
    let dir = tempfile::tempdir().unwrap();
    let conn = loaded_database(&dir);

    let hits = query_genes(&conn, &genes(&["pax6"])).unwrap();
    assert_eq!(
        hits,
        vec![ExpressionHit {
            gene: Some("pax6".to_string()),
            image_url: Some("http://example.org/img/1001-a.jpg".to_string()),
            stain_localization: Some("eye field".to_string()),
            developmental_stage: Some("NF stage 22".to_string()),
        }]
    );
}

#[test]
fn multiple_genes_match_as_a_set() {
    let dir = tempfile::tempdir().unwrap();
    let conn = loaded_database(&dir);

    let mut found = query_genes(&conn, &genes(&["sox2", "pax6", "absent"]))
        .unwrap()
        .into_iter()
        .filter_map(|hit| hit.gene)
        .collect::<Vec<_>>();
    found.sort();
    assert_eq!(found, vec!["pax6", "sox2"]);
}

#[test]
fn matching_is_case_sensitive_and_exact() {
    let dir = tempfile::tempdir().unwrap();
    let conn = loaded_database(&dir);

    assert!(query_genes(&conn, &genes(&["PAX6"])).unwrap().is_empty());
    assert!(query_genes(&conn, &genes(&["pax"])).unwrap().is_empty());
    assert!(query_genes(&conn, &genes(&["pax%"])).unwrap().is_empty());
}

#[test]
fn unknown_gene_exports_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let conn = loaded_database(&dir);

    let hits = query_genes(&conn, &genes(&["shh"])).unwrap();
    assert!(hits.is_empty());
    let mut buffer = Vec::new();
    CsvOutput::write_hits(&mut buffer, &hits).unwrap();
    assert!(buffer.is_empty());
}

#[test]
fn csv_export_of_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let conn = loaded_database(&dir);

    let hits = query_genes(&conn, &genes(&["sox2"])).unwrap();
    let mut buffer = Vec::new();
    CsvOutput::write_hits(&mut buffer, &hits).unwrap();
    assert_eq!(
        String::from_utf8(buffer).unwrap(),
        "Gene,Image URL,Stain Localization,Developmental Stage\n\
         sox2,http://example.org/img/1003.jpg,neural tube,NF stage 35\n"
    );
}
