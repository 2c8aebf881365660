use serde::Serialize;

/// Scalar design fields of one `<experiment>`, stored as the base experiment row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExperimentDesign {
    pub experiment_id: Option<String>,
    pub experiment_type: Option<String>,
    pub annotation_status: Option<String>,
    pub publication_status: Option<String>,
    pub information_url: Option<String>,
    pub experiment_control_id: Option<String>,
}

/// Provenance pair. `kind` is the tag of the element found under `source`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceKey {
    pub kind: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PersonKey {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub mail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReporterKey {
    pub probe_id: Option<String>,
    pub probe_id_source: Option<String>,
    pub probe_type: Option<String>,
    pub probe_gene_predicted: Option<String>,
    pub probe_protocols: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactRole {
    Author,
    Annotator,
    Curator,
}

impl ContactRole {
    pub const ALL: [ContactRole; 3] = [
        ContactRole::Author,
        ContactRole::Annotator,
        ContactRole::Curator,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ContactRole::Author => "author",
            ContactRole::Annotator => "annotator",
            ContactRole::Curator => "curator",
        }
    }

    pub fn date_tag(self) -> &'static str {
        match self {
            ContactRole::Author => "author_date",
            ContactRole::Annotator => "annotation_date",
            ContactRole::Curator => "curation_date",
        }
    }

    pub fn person_column(self) -> &'static str {
        match self {
            ContactRole::Author => "author_id",
            ContactRole::Annotator => "annotator_id",
            ContactRole::Curator => "curator_id",
        }
    }

    /// The experiment column holding the role's date; same as the XML tag.
    pub fn date_column(self) -> &'static str {
        self.date_tag()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub role: ContactRole,
    pub person: PersonKey,
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Biomaterial {
    pub species_name: Option<String>,
    pub taxon_id: Option<String>,
    pub taxon_id_source: Option<String>,
    pub provider_specimen: Option<String>,
    pub developmental_stage: Option<String>,
    pub developmental_stage_source: Option<String>,
    pub phenotype: Option<String>,
    pub treatments: Vec<Option<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Staining {
    pub staining_localization: Option<String>,
    pub localization_source: Option<String>,
    pub staining_detection_method: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub url: String,
    pub note: Option<String>,
    pub extra_info: Option<String>,
    pub subcell_pos: Option<String>,
    pub staining: Staining,
}

/// One row of the gene export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpressionHit {
    pub gene: Option<String>,
    pub image_url: Option<String>,
    pub stain_localization: Option<String>,
    pub developmental_stage: Option<String>,
}
