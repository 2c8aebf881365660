use tracing::debug;

use crate::domain::{
    Biomaterial, Contact, ContactRole, ExperimentDesign, Image, PersonKey, ReporterKey, SourceKey,
    Staining,
};
use crate::xml::Element;

const DESIGN: &str = "experiment_design";
const CONTACTS: &str = "experiment_design/contact_information";
const BIOMATERIAL: &str = "biomaterial_treatments/biomaterial";
const REPORTER: &str = "expression/reporter";
const IMAGE_DATA: &str = "expression/imaging/image_data/image";
const IMAGES: &str = "expression/images";
const DETECTION_METHOD: &str = "expression/staining/staining_detection_method";

/// Everything one `<experiment>` element maps to. Each optional block is
/// resolved independently; `None` means its required path was missing and
/// no row is produced for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentRecord {
    pub design: ExperimentDesign,
    pub source: Option<SourceKey>,
    pub contacts: Vec<Contact>,
    pub biomaterial: Option<Biomaterial>,
    pub reporter: Option<ReporterKey>,
    pub image: Option<Image>,
}

impl ExperimentRecord {
    pub fn from_element(experiment: &Element) -> Self {
        let record = Self {
            design: extract_design(experiment),
            source: extract_source(experiment),
            contacts: ContactRole::ALL
                .into_iter()
                .filter_map(|role| extract_contact(experiment, role))
                .collect(),
            biomaterial: extract_biomaterial(experiment),
            reporter: extract_reporter(experiment),
            image: extract_image(experiment),
        };
        debug!(
            experiment = record.design.experiment_id.as_deref().unwrap_or("-"),
            source = record.source.is_some(),
            contacts = record.contacts.len(),
            biomaterial = record.biomaterial.is_some(),
            reporter = record.reporter.is_some(),
            image = record.image.is_some(),
            "extracted experiment"
        );
        record
    }
}

/// Maps every direct `<experiment>` child of the document root.
pub fn extract_experiments(root: &Element) -> Vec<ExperimentRecord> {
    root.find_all("experiment")
        .map(ExperimentRecord::from_element)
        .collect()
}

pub fn extract_design(experiment: &Element) -> ExperimentDesign {
    let field = |name: &str| experiment.child_text(&format!("{DESIGN}/{name}"));
    ExperimentDesign {
        experiment_id: experiment.attr("id").map(str::to_string),
        experiment_type: field("type"),
        annotation_status: field("annotation_status"),
        publication_status: field("publication_status"),
        information_url: field("information_url"),
        experiment_control_id: field("experiment_control_id"),
    }
}

pub fn extract_source(experiment: &Element) -> Option<SourceKey> {
    let source = experiment.find(&format!("{DESIGN}/source/*"))?;
    Some(SourceKey {
        kind: source.name().to_string(),
        value: source.text().map(str::to_string),
    })
}

pub fn extract_contact(experiment: &Element, role: ContactRole) -> Option<Contact> {
    let tag = role.as_str();
    let contact = experiment.find(&format!("{CONTACTS}/{tag}"))?;
    Some(Contact {
        role,
        person: PersonKey {
            name: contact.child_text(&format!("{tag}_name")),
            surname: contact.child_text(&format!("{tag}_surname")),
            mail: contact.child_text(&format!("{tag}_mail")),
        },
        date: contact.child_text(role.date_tag()),
    })
}

pub fn extract_biomaterial(experiment: &Element) -> Option<Biomaterial> {
    let biomaterial = experiment.find(BIOMATERIAL)?;
    let treatments = biomaterial
        .find("treatments")
        .map(|treatments| {
            treatments
                .find_all("treatment")
                .map(|treatment| treatment.text().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();
    Some(Biomaterial {
        species_name: biomaterial.child_text("species_name"),
        taxon_id: biomaterial.child_text("taxon_id"),
        taxon_id_source: biomaterial.child_text("taxon_id_source"),
        provider_specimen: biomaterial.child_text("provider_specimen"),
        developmental_stage: biomaterial.child_text("developmental_stage"),
        developmental_stage_source: biomaterial.child_text("developmental_stage_source"),
        phenotype: biomaterial.child_text("phenotype"),
        treatments,
    })
}

pub fn extract_reporter(experiment: &Element) -> Option<ReporterKey> {
    let reporter = experiment.find(REPORTER)?;
    Some(ReporterKey {
        probe_id: reporter.child_text("probe_id"),
        probe_id_source: reporter.child_text("probe_id_source"),
        probe_type: reporter.child_text("probe_type"),
        probe_gene_predicted: reporter.child_text("probe_gene_predicted"),
        probe_protocols: reporter.child_text("probe_protocols"),
    })
}

/// Only the first `image_data/image` element is considered, and it must carry
/// a `url`; the `expression/images` annotation block must also be present.
pub fn extract_image(experiment: &Element) -> Option<Image> {
    let url = experiment.find(IMAGE_DATA)?.attr("url")?;
    let images = experiment.find(IMAGES)?;
    Some(Image {
        url: url.to_string(),
        note: images.child_text("image_note"),
        extra_info: images.child_text("image_characterization/extra_info"),
        subcell_pos: images.child_text("image_characterization/subcell_pos"),
        staining: Staining {
            staining_localization: images
                .child_text("image_characterization/staining_localization"),
            localization_source: images.child_text("image_characterization/localization_source"),
            staining_detection_method: experiment.child_text(DETECTION_METHOD),
        },
    })
}
