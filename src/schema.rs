use rusqlite::Connection;

use crate::error::GxdbError;

pub const TABLES: [&str; 8] = [
    "experiments",
    "sources",
    "people",
    "reporters",
    "biomaterials",
    "treatments",
    "images",
    "stainings",
];

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS experiments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    experiment_id TEXT,
    experiment_type TEXT,
    annotation_status TEXT,
    publication_status TEXT,
    information_url TEXT,
    experiment_control_id TEXT,
    author_id INTEGER,
    curator_id INTEGER,
    annotator_id INTEGER,
    source_id INTEGER,
    reporter_id INTEGER,
    author_date TEXT,
    annotation_date TEXT,
    curation_date TEXT,
    FOREIGN KEY (author_id) REFERENCES people(id),
    FOREIGN KEY (curator_id) REFERENCES people(id),
    FOREIGN KEY (annotator_id) REFERENCES people(id),
    FOREIGN KEY (source_id) REFERENCES sources(id),
    FOREIGN KEY (reporter_id) REFERENCES reporters(id)
);

CREATE TABLE IF NOT EXISTS sources (
    id INTEGER PRIMARY KEY,
    type TEXT,
    value TEXT
);

CREATE TABLE IF NOT EXISTS people (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT,
    surname TEXT,
    mail TEXT
);

CREATE TABLE IF NOT EXISTS reporters (
    id INTEGER PRIMARY KEY,
    probe_id TEXT,
    probe_id_source TEXT,
    probe_type TEXT,
    probe_gene_predicted TEXT,
    probe_protocols TEXT
);

CREATE TABLE IF NOT EXISTS biomaterials (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    experiment_id INTEGER,
    species_name TEXT,
    taxon_id TEXT,
    taxon_id_source TEXT,
    provider_specimen TEXT,
    developmental_stage TEXT,
    developmental_stage_source TEXT,
    phenotype TEXT,
    FOREIGN KEY (experiment_id) REFERENCES experiments(id)
);

CREATE TABLE IF NOT EXISTS treatments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    biomaterial_id INTEGER,
    treatment TEXT,
    FOREIGN KEY (biomaterial_id) REFERENCES biomaterials(id)
);

CREATE TABLE IF NOT EXISTS images (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    experiment_id INTEGER,
    url TEXT,
    note TEXT,
    extra_info TEXT,
    subcell_pos TEXT,
    FOREIGN KEY (experiment_id) REFERENCES experiments(id)
);

CREATE TABLE IF NOT EXISTS stainings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    image_id INTEGER,
    staining_localization TEXT,
    localization_source TEXT,
    staining_detection_method TEXT,
    FOREIGN KEY (image_id) REFERENCES images(id)
);
";

/// Creates any missing tables. Safe to run against an initialized store.
pub fn initialize(conn: &Connection) -> Result<(), GxdbError> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

pub fn count_rows(conn: &Connection, table: &str) -> Result<i64, GxdbError> {
    if !TABLES.contains(&table) {
        return Err(GxdbError::UnknownTable(table.to_string()));
    }
    let count = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
    Ok(count)
}
