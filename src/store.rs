use std::collections::HashMap;

use rusqlite::{Connection, Transaction, params};
use serde::Serialize;
use tracing::debug;

use crate::domain::{
    Biomaterial, ContactRole, ExperimentDesign, Image, PersonKey, ReporterKey, SourceKey,
};
use crate::error::GxdbError;
use crate::extract::ExperimentRecord;
use crate::schema;

/// Row counts per table after a load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableCounts {
    pub experiments: i64,
    pub sources: i64,
    pub people: i64,
    pub reporters: i64,
    pub biomaterials: i64,
    pub treatments: i64,
    pub images: i64,
    pub stainings: i64,
}

impl TableCounts {
    pub fn read(conn: &Connection) -> Result<Self, GxdbError> {
        Ok(Self {
            experiments: schema::count_rows(conn, "experiments")?,
            sources: schema::count_rows(conn, "sources")?,
            people: schema::count_rows(conn, "people")?,
            reporters: schema::count_rows(conn, "reporters")?,
            biomaterials: schema::count_rows(conn, "biomaterials")?,
            treatments: schema::count_rows(conn, "treatments")?,
            images: schema::count_rows(conn, "images")?,
            stainings: schema::count_rows(conn, "stainings")?,
        })
    }
}

/// Writes experiment records inside a single transaction.
///
/// Sources, people and reporters are deduplicated on their exact key tuple
/// for the lifetime of the writer; nothing is cached across loads. Dropping
/// the writer without calling [`StoreWriter::finish`] rolls everything back.
pub struct StoreWriter<'conn> {
    tx: Transaction<'conn>,
    sources: HashMap<SourceKey, i64>,
    people: HashMap<PersonKey, i64>,
    reporters: HashMap<ReporterKey, i64>,
}

impl<'conn> StoreWriter<'conn> {
    pub fn begin(conn: &'conn mut Connection) -> Result<Self, GxdbError> {
        let tx = conn.transaction()?;
        schema::initialize(&tx)?;
        Ok(Self {
            tx,
            sources: HashMap::new(),
            people: HashMap::new(),
            reporters: HashMap::new(),
        })
    }

    /// Runs every extraction step for one experiment, in order. Steps whose
    /// block was absent simply produce no row.
    pub fn write_experiment(&mut self, record: &ExperimentRecord) -> Result<i64, GxdbError> {
        let experiment = self.insert_experiment(&record.design)?;

        if let Some(source) = &record.source {
            let source_id = self.source_id(source)?;
            self.set_source(experiment, source_id)?;
        }

        for contact in &record.contacts {
            let person_id = self.person_id(&contact.person)?;
            self.set_contact(experiment, contact.role, person_id, contact.date.as_deref())?;
        }

        if let Some(biomaterial) = &record.biomaterial {
            self.insert_biomaterial(experiment, biomaterial)?;
        }

        if let Some(reporter) = &record.reporter {
            let reporter_id = self.reporter_id(reporter)?;
            self.set_reporter(experiment, reporter_id)?;
        }

        if let Some(image) = &record.image {
            self.insert_image(experiment, image)?;
        }

        debug!(row = experiment, "wrote experiment");
        Ok(experiment)
    }

    pub fn insert_experiment(&self, design: &ExperimentDesign) -> Result<i64, GxdbError> {
        self.tx.execute(
            "INSERT INTO experiments
             (experiment_id, experiment_type, annotation_status, publication_status,
              information_url, experiment_control_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                design.experiment_id,
                design.experiment_type,
                design.annotation_status,
                design.publication_status,
                design.information_url,
                design.experiment_control_id,
            ],
        )?;
        Ok(self.tx.last_insert_rowid())
    }

    pub fn source_id(&mut self, key: &SourceKey) -> Result<i64, GxdbError> {
        if let Some(id) = self.sources.get(key) {
            return Ok(*id);
        }
        self.tx.execute(
            "INSERT INTO sources (type, value) VALUES (?1, ?2)",
            params![key.kind, key.value],
        )?;
        let id = self.tx.last_insert_rowid();
        self.sources.insert(key.clone(), id);
        Ok(id)
    }

    pub fn person_id(&mut self, key: &PersonKey) -> Result<i64, GxdbError> {
        if let Some(id) = self.people.get(key) {
            return Ok(*id);
        }
        self.tx.execute(
            "INSERT INTO people (name, surname, mail) VALUES (?1, ?2, ?3)",
            params![key.name, key.surname, key.mail],
        )?;
        let id = self.tx.last_insert_rowid();
        self.people.insert(key.clone(), id);
        Ok(id)
    }

    pub fn reporter_id(&mut self, key: &ReporterKey) -> Result<i64, GxdbError> {
        if let Some(id) = self.reporters.get(key) {
            return Ok(*id);
        }
        self.tx.execute(
            "INSERT INTO reporters
             (probe_id, probe_id_source, probe_type, probe_gene_predicted, probe_protocols)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                key.probe_id,
                key.probe_id_source,
                key.probe_type,
                key.probe_gene_predicted,
                key.probe_protocols,
            ],
        )?;
        let id = self.tx.last_insert_rowid();
        self.reporters.insert(key.clone(), id);
        Ok(id)
    }

    pub fn set_source(&self, experiment: i64, source_id: i64) -> Result<(), GxdbError> {
        self.tx.execute(
            "UPDATE experiments SET source_id = ?1 WHERE id = ?2",
            params![source_id, experiment],
        )?;
        Ok(())
    }

    pub fn set_contact(
        &self,
        experiment: i64,
        role: ContactRole,
        person_id: i64,
        date: Option<&str>,
    ) -> Result<(), GxdbError> {
        let sql = format!(
            "UPDATE experiments SET {} = ?1, {} = ?2 WHERE id = ?3",
            role.person_column(),
            role.date_column()
        );
        self.tx.execute(&sql, params![person_id, date, experiment])?;
        Ok(())
    }

    pub fn set_reporter(&self, experiment: i64, reporter_id: i64) -> Result<(), GxdbError> {
        self.tx.execute(
            "UPDATE experiments SET reporter_id = ?1 WHERE id = ?2",
            params![reporter_id, experiment],
        )?;
        Ok(())
    }

    pub fn insert_biomaterial(
        &self,
        experiment: i64,
        biomaterial: &Biomaterial,
    ) -> Result<i64, GxdbError> {
        self.tx.execute(
            "INSERT INTO biomaterials
             (experiment_id, species_name, taxon_id, taxon_id_source, provider_specimen,
              developmental_stage, developmental_stage_source, phenotype)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                experiment,
                biomaterial.species_name,
                biomaterial.taxon_id,
                biomaterial.taxon_id_source,
                biomaterial.provider_specimen,
                biomaterial.developmental_stage,
                biomaterial.developmental_stage_source,
                biomaterial.phenotype,
            ],
        )?;
        let biomaterial_id = self.tx.last_insert_rowid();

        let mut insert = self
            .tx
            .prepare_cached("INSERT INTO treatments (biomaterial_id, treatment) VALUES (?1, ?2)")?;
        for treatment in &biomaterial.treatments {
            insert.execute(params![biomaterial_id, treatment])?;
        }
        Ok(biomaterial_id)
    }

    pub fn insert_image(&self, experiment: i64, image: &Image) -> Result<i64, GxdbError> {
        self.tx.execute(
            "INSERT INTO images (experiment_id, url, note, extra_info, subcell_pos)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                experiment,
                image.url,
                image.note,
                image.extra_info,
                image.subcell_pos,
            ],
        )?;
        let image_id = self.tx.last_insert_rowid();

        let staining = &image.staining;
        self.tx.execute(
            "INSERT INTO stainings
             (image_id, staining_localization, localization_source, staining_detection_method)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                image_id,
                staining.staining_localization,
                staining.localization_source,
                staining.staining_detection_method,
            ],
        )?;
        Ok(image_id)
    }

    /// Commits the load and reports the resulting row counts.
    pub fn finish(self) -> Result<TableCounts, GxdbError> {
        let counts = TableCounts::read(&self.tx)?;
        self.tx.commit()?;
        Ok(counts)
    }
}
