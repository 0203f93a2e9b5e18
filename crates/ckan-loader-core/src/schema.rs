//! Description of rendered documents for query construction.
//!
//! Retrieval frameworks that build structured queries from natural language
//! need to know what a document is about and which metadata attributes can
//! be filtered on. [`DocumentSchema`] carries that description. It is not
//! enforced by the loader; it is handed to the consumer alongside the
//! documents.

use serde::{Deserialize, Serialize};

/// Type of a queryable metadata attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    String,
    Integer,
}

/// One queryable metadata attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeInfo {
    /// Metadata key, as produced by the document builder.
    pub name: String,
    /// Human-readable description used by the query constructor.
    pub description: String,
    #[serde(rename = "type")]
    pub attribute_type: AttributeType,
}

impl AttributeInfo {
    pub fn new(name: &str, description: &str, attribute_type: AttributeType) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            attribute_type,
        }
    }
}

/// Content description plus queryable attributes of a document collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSchema {
    /// What the document content describes.
    pub document_content_info: String,
    /// Attributes available for filtering.
    pub metadata_field_info: Vec<AttributeInfo>,
}

/// Description of the Données Québec catalogue.
pub const QUEBEC_CONTENT_INFO: &str = "Les métadonnés du jeux de données se trouvant dans le portail de données ouvertes du gouvernement du Québec.";

const QUEBEC_ATTRIBUTES: &[(&str, &str, AttributeType)] = &[
    (
        "extension_spatiale",
        "L'extension spatiale de la zone",
        AttributeType::String,
    ),
    (
        "organisation_principale",
        "L'organisation principale (structure, établissement)",
        AttributeType::String,
    ),
    (
        "identifiant_unique",
        "L'identifiant unique",
        AttributeType::String,
    ),
    (
        "niveau_acces",
        "Le niveau d'accès (degré, rang)",
        AttributeType::String,
    ),
    (
        "localisation_donnees",
        "La localisation des données (emplacement, situation)",
        AttributeType::String,
    ),
    (
        "classification_securite",
        "La classification de sécurité (catégorisation, typologie)",
        AttributeType::String,
    ),
    ("langue", "La langue (idiome, dialecte)", AttributeType::String),
    (
        "identifiant_licence",
        "L'identifiant unique de la licence",
        AttributeType::String,
    ),
    (
        "titre_licence",
        "Le titre de la licence (nom, appellation)",
        AttributeType::String,
    ),
    (
        "url_licence",
        "L'URL de la licence (adresse web, lien)",
        AttributeType::String,
    ),
    (
        "responsable",
        "Le mainteneur (responsable, gestionnaire)",
        AttributeType::String,
    ),
    (
        "email_responsable",
        "L'email du mainteneur (adresse électronique, courriel)",
        AttributeType::String,
    ),
    (
        "date_creation_metadata",
        "La date de création des métadonnées (jour, moment)",
        AttributeType::String,
    ),
    (
        "date_modification_metadata",
        "La date de modification des métadonnées (jour, moment)",
        AttributeType::String,
    ),
    (
        "methodologie",
        "La méthodologie (procédure, démarche)",
        AttributeType::String,
    ),
    (
        "nombre_ressources",
        "Le nombre de ressources (quantité, total)",
        AttributeType::Integer,
    ),
    (
        "nombre_tags",
        "Le nombre de tags (étiquettes, mots-clés)",
        AttributeType::Integer,
    ),
    ("etat", "L'état (statut, condition)", AttributeType::String),
    ("type", "Le type (genre, catégorie)", AttributeType::String),
    (
        "frequence_mise_a_jour",
        "La fréquence de mise à jour (périodicité, rythme)",
        AttributeType::String,
    ),
    (
        "groupes",
        "Les groupes (ensembles, collections)",
        AttributeType::String,
    ),
    (
        "tags",
        "Les tags (étiquettes, mots-clés)",
        AttributeType::String,
    ),
    (
        "formats_ressources",
        "Les formats de fichiers des ressources (types, extensions)",
        AttributeType::String,
    ),
];

impl DocumentSchema {
    /// Schema of the Données Québec portal.
    pub fn quebec() -> Self {
        Self {
            document_content_info: QUEBEC_CONTENT_INFO.to_string(),
            metadata_field_info: QUEBEC_ATTRIBUTES
                .iter()
                .map(|(name, description, ty)| AttributeInfo::new(name, description, *ty))
                .collect(),
        }
    }

    /// Replaces the content description, keeping the attributes.
    ///
    /// Lets the same attribute set describe documents from another portal.
    pub fn with_content_info(mut self, info: impl Into<String>) -> Self {
        self.document_content_info = info.into();
        self
    }

    /// Looks up an attribute by metadata key.
    pub fn attribute(&self, name: &str) -> Option<&AttributeInfo> {
        self.metadata_field_info.iter().find(|a| a.name == name)
    }
}

impl Default for DocumentSchema {
    fn default() -> Self {
        Self::quebec()
    }
}
