//! Rendering of CKAN dataset records into indexable documents.
//!
//! A [`RawRecord`] is the untyped `result` object of a `package_show` call.
//! [`DocumentBuilder`] turns it into a [`RenderedDocument`]: a French
//! paragraph describing the dataset, plus a flat metadata map keyed by the
//! attribute names declared in [`DocumentSchema`](crate::schema::DocumentSchema).
//!
//! Every field lookup tolerates a missing key by substituting
//! [`PLACEHOLDER`]. A key that is present with a JSON `null` value is a
//! different case: the metadata entry is dropped altogether.
//!
//! # Example
//!
//! ```
//! use ckan_loader_core::document::{DocumentBuilder, RawRecord};
//! use serde_json::json;
//!
//! let record: RawRecord = serde_json::from_value(json!({
//!     "title": "Qualité de l'air",
//!     "update_frequency": "daily",
//!     "num_resources": 2,
//!     "groups": [{"display_name": "Environnement"}, {"display_name": "Santé"}],
//! }))
//! .unwrap();
//!
//! let doc = DocumentBuilder::new().build(&record);
//! assert!(doc.content().contains("La fréquence (périodicité, rythme) de mise à jour est quotidienne."));
//! assert_eq!(doc.metadata()["frequence_mise_a_jour"], "quotidienne");
//! assert_eq!(doc.metadata()["nombre_ressources"], 2);
//! assert_eq!(doc.metadata()["groupes"], "Environnement, Santé");
//! assert_eq!(doc.metadata()["etat"], "_");
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::i18n::VocabularyField;

/// Untyped dataset record as returned by the portal.
pub type RawRecord = Map<String, Value>;

/// Metadata attached to a rendered document.
pub type Metadata = Map<String, Value>;

/// Value substituted for fields missing from a record.
pub const PLACEHOLDER: &str = "_";

/// Separator used when joining group, tag and format names.
const LIST_SEPARATOR: &str = ", ";

/// Where a rendered value comes from in the raw record.
#[derive(Debug, Clone, Copy)]
enum FieldSource {
    /// The value of a top-level key, passed through untouched.
    Raw(&'static str),
    /// A controlled-vocabulary value, translated to French when it is a string.
    Translated(VocabularyField),
    /// The `item` key of every object in the `list` array, joined with `", "`.
    Joined {
        list: &'static str,
        item: &'static str,
    },
}

impl FieldSource {
    /// Resolves the field against a record.
    ///
    /// Returns `None` when the key is present with a `null` value.
    fn resolve(&self, record: &RawRecord) -> Option<Value> {
        match *self {
            FieldSource::Raw(key) => lookup(record, key),
            FieldSource::Translated(vocabulary) => {
                lookup(record, vocabulary.key()).map(|value| match value {
                    Value::String(code) => Value::String(vocabulary.translate(&code).to_string()),
                    other => other,
                })
            }
            FieldSource::Joined { list, item } => Some(Value::String(join_items(record, list, item))),
        }
    }
}

fn lookup(record: &RawRecord, key: &str) -> Option<Value> {
    match record.get(key) {
        None => Some(Value::String(PLACEHOLDER.to_string())),
        Some(Value::Null) => None,
        Some(value) => Some(value.clone()),
    }
}

/// Joins the string `item` of each object in `record[list]`.
///
/// A missing, null or non-array list renders as the empty string. Entries
/// without a string `item` are skipped.
fn join_items(record: &RawRecord, list: &str, item: &str) -> String {
    record
        .get(list)
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| entry.get(item).and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join(LIST_SEPARATOR)
        })
        .unwrap_or_default()
}

/// One sentence of the rendered paragraph: `"{label} {value}."`.
const CONTENT_LINES: &[(&str, FieldSource)] = &[
    (
        "Le titre (nom, appellation) du jeux de données",
        FieldSource::Raw("title"),
    ),
    (
        "Le nom (dénomination, désignation) du jeu de donnée",
        FieldSource::Raw("name"),
    ),
    (
        "La description (résumé, présentation) est",
        FieldSource::Raw("notes"),
    ),
    (
        "L'auteur (créateur, rédacteur) est",
        FieldSource::Raw("author"),
    ),
    (
        "L'email (adresse électronique, courriel, coordonnées) de l'auteur est",
        FieldSource::Raw("author_email"),
    ),
    (
        "L'ID (identifiant unique) de l'utilisateur créateur est",
        FieldSource::Raw("creator_user_id"),
    ),
    (
        "L'extension (zone, aire) spatiale est",
        FieldSource::Raw("ext_spatial"),
    ),
    (
        "L'organisation (structure, établissement) principale est",
        FieldSource::Raw("extras_organisation_principale"),
    ),
    ("L'ID (identifiant unique) est", FieldSource::Raw("id")),
    (
        "Le niveau (degré, rang) d'accès est",
        FieldSource::Translated(VocabularyField::AccessLevel),
    ),
    (
        "La localisation (emplacement, situation) des données est",
        FieldSource::Raw("inv_data_location"),
    ),
    (
        "La classification (catégorisation, typologie) de sécurité est",
        FieldSource::Translated(VocabularyField::SecurityClassification),
    ),
    (
        "La langue (idiome, dialecte) est",
        FieldSource::Raw("language"),
    ),
    (
        "L'ID (identifiant unique) de la licence est",
        FieldSource::Raw("license_id"),
    ),
    (
        "Le titre (nom, appellation) de la licence est",
        FieldSource::Raw("license_title"),
    ),
    (
        "L'URL (adresse web, lien) de la licence est",
        FieldSource::Raw("license_url"),
    ),
    (
        "Le mainteneur (responsable, gestionnaire) est",
        FieldSource::Raw("maintainer"),
    ),
    (
        "L'email (adresse électronique, courriel) du mainteneur est",
        FieldSource::Raw("maintainer_email"),
    ),
    (
        "La date (jour, moment) de création des métadonnées est",
        FieldSource::Raw("metadata_created"),
    ),
    (
        "La date (jour, moment) de modification des métadonnées est",
        FieldSource::Raw("metadata_modified"),
    ),
    (
        "La méthodologie (procédure, démarche) est",
        FieldSource::Raw("methodologie"),
    ),
    (
        "Le nombre (quantité, total) de ressources est",
        FieldSource::Raw("num_resources"),
    ),
    (
        "Le nombre (quantité, total) de tags (étiquettes, mots-clés) est",
        FieldSource::Raw("num_tags"),
    ),
    ("L'état (statut, condition) est", FieldSource::Raw("state")),
    ("Le type (genre, catégorie) est", FieldSource::Raw("type")),
    (
        "La fréquence (périodicité, rythme) de mise à jour est",
        FieldSource::Translated(VocabularyField::UpdateFrequency),
    ),
    (
        "Les groupes (ensembles, collections) sont",
        FieldSource::Joined {
            list: "groups",
            item: "display_name",
        },
    ),
    (
        "Les tags (étiquettes, mots-clés) sont",
        FieldSource::Joined {
            list: "tags",
            item: "display_name",
        },
    ),
    (
        "Les formats (types, extensions) de fichiers des ressources sont",
        FieldSource::Joined {
            list: "resources",
            item: "format",
        },
    ),
];

/// Metadata key and the record field it is taken from.
const METADATA_FIELDS: &[(&str, FieldSource)] = &[
    ("title", FieldSource::Raw("title")),
    ("name", FieldSource::Raw("name")),
    ("description", FieldSource::Raw("notes")),
    ("extension_spatiale", FieldSource::Raw("ext_spatial")),
    (
        "organisation_principale",
        FieldSource::Raw("extras_organisation_principale"),
    ),
    ("identifiant_unique", FieldSource::Raw("id")),
    (
        "niveau_acces",
        FieldSource::Translated(VocabularyField::AccessLevel),
    ),
    ("localisation_donnees", FieldSource::Raw("inv_data_location")),
    (
        "classification_securite",
        FieldSource::Translated(VocabularyField::SecurityClassification),
    ),
    ("langue", FieldSource::Raw("language")),
    ("identifiant_licence", FieldSource::Raw("license_id")),
    ("titre_licence", FieldSource::Raw("license_title")),
    ("url_licence", FieldSource::Raw("license_url")),
    ("responsable", FieldSource::Raw("maintainer")),
    ("email_responsable", FieldSource::Raw("maintainer_email")),
    ("date_creation_metadata", FieldSource::Raw("metadata_created")),
    (
        "date_modification_metadata",
        FieldSource::Raw("metadata_modified"),
    ),
    ("methodologie", FieldSource::Raw("methodologie")),
    ("nombre_ressources", FieldSource::Raw("num_resources")),
    ("nombre_tags", FieldSource::Raw("num_tags")),
    ("etat", FieldSource::Raw("state")),
    ("type", FieldSource::Raw("type")),
    (
        "frequence_mise_a_jour",
        FieldSource::Translated(VocabularyField::UpdateFrequency),
    ),
    (
        "groupes",
        FieldSource::Joined {
            list: "groups",
            item: "display_name",
        },
    ),
    (
        "tags",
        FieldSource::Joined {
            list: "tags",
            item: "display_name",
        },
    ),
    (
        "formats_ressources",
        FieldSource::Joined {
            list: "resources",
            item: "format",
        },
    ),
];

/// A dataset rendered for indexing: free text plus flat metadata.
///
/// Built once by [`DocumentBuilder::build`] and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedDocument {
    #[serde(rename = "page_content")]
    content: String,
    metadata: Metadata,
}

impl RenderedDocument {
    /// The French paragraph describing the dataset.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// The filtered metadata map.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// The dataset identifier, when the record carried one.
    pub fn dataset_id(&self) -> Option<&str> {
        self.metadata
            .get("identifiant_unique")
            .and_then(Value::as_str)
            .filter(|id| *id != PLACEHOLDER)
    }

    /// Consumes the document, returning `(content, metadata)`.
    pub fn into_parts(self) -> (String, Metadata) {
        (self.content, self.metadata)
    }
}

/// Renders raw records into [`RenderedDocument`]s.
///
/// Rendering is a pure function of the record and the builder options.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentBuilder {
    drop_placeholders: bool,
}

impl DocumentBuilder {
    /// Creates a builder that keeps `"_"` placeholder metadata entries.
    pub fn new() -> Self {
        Self::default()
    }

    /// Also drop metadata entries whose value is the `"_"` placeholder.
    ///
    /// Off by default: consumers observe a literal `"_"` for fields the
    /// record did not carry, and only `null` values are removed.
    pub fn drop_placeholders(mut self, drop: bool) -> Self {
        self.drop_placeholders = drop;
        self
    }

    /// Renders one record.
    pub fn build(&self, record: &RawRecord) -> RenderedDocument {
        RenderedDocument {
            content: render_content(record),
            metadata: self.render_metadata(record),
        }
    }

    fn render_metadata(&self, record: &RawRecord) -> Metadata {
        METADATA_FIELDS
            .iter()
            .filter_map(|(key, source)| source.resolve(record).map(|value| (*key, value)))
            .filter(|(_, value)| !(self.drop_placeholders && is_placeholder(value)))
            .map(|(key, value)| (key.to_string(), value))
            .collect()
    }
}

/// Renders a record with the default options.
pub fn build_document(record: &RawRecord) -> RenderedDocument {
    DocumentBuilder::default().build(record)
}

fn render_content(record: &RawRecord) -> String {
    CONTENT_LINES
        .iter()
        .map(|(label, source)| {
            let value = source.resolve(record);
            format!("{} {}.", label, display_value(value.as_ref()))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Text form of a value inside the paragraph. Null renders as the placeholder.
fn display_value(value: Option<&Value>) -> String {
    match value {
        None => PLACEHOLDER.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn is_placeholder(value: &Value) -> bool {
    value.as_str() == Some(PLACEHOLDER)
}
