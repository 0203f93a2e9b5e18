//! French labels for controlled-vocabulary codes.
//!
//! CKAN portals built on the Québec metadata profile store a few fields as
//! English codes (`"weekly"`, `"open"`, `"public"`). Rendered documents are
//! written in French, so those codes are replaced with their French label
//! before being interpolated.
//!
//! ```
//! use ckan_loader_core::i18n::translate;
//!
//! assert_eq!(translate("update_frequency", "weekly"), "hebdomadaire");
//! assert_eq!(translate("UPDATE_FREQUENCY", "weekly"), "hebdomadaire");
//! assert_eq!(translate("update_frequency", "unknown_code"), "unknown_code");
//! assert_eq!(translate("title", "open"), "open");
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// A record field whose values come from a controlled vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VocabularyField {
    /// `inv_access_level`
    AccessLevel,
    /// `update_frequency`
    UpdateFrequency,
    /// `inv_security_classification`
    SecurityClassification,
}

impl VocabularyField {
    /// The CKAN field key, lowercase.
    pub fn key(&self) -> &'static str {
        match self {
            Self::AccessLevel => "inv_access_level",
            Self::UpdateFrequency => "update_frequency",
            Self::SecurityClassification => "inv_security_classification",
        }
    }

    /// Returns the French label for `code`, or `code` itself when unknown.
    ///
    /// Codes are matched case-sensitively (`"asNeeded"`, not `"asneeded"`).
    pub fn translate<'a>(&self, code: &'a str) -> &'a str {
        match self {
            Self::AccessLevel => match code {
                "open" => "ouvert",
                _ => code,
            },
            Self::UpdateFrequency => match code {
                "quinquennial" => "quinqennale",
                "irregular" => "irrégulière",
                "bimonthly" => "bimensuelle",
                "annual" => "annuelle",
                "monthly" => "mensuelle",
                "weekly" => "hebdomadaire",
                "daily" => "quotidienne",
                "archives" => "en archives",
                "fortnightly" => "tous les quinze jours",
                "hourly" => "horaire",
                "quarterly" => "trimestrielle",
                "asNeeded" => "au besoin",
                "notPlanned" => "non planifiée",
                "semiannual" => "semestrielle",
                "triennial" => "au trois ans",
                "biennial" => "au deux ans",
                "continuous" => "continue",
                _ => code,
            },
            Self::SecurityClassification => match code {
                "public" => "publique",
                _ => code,
            },
        }
    }
}

impl fmt::Display for VocabularyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for VocabularyField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "inv_access_level" => Ok(Self::AccessLevel),
            "update_frequency" => Ok(Self::UpdateFrequency),
            "inv_security_classification" => Ok(Self::SecurityClassification),
            _ => Err(AppError::Generic(format!(
                "Unknown vocabulary field: '{}'. Valid options: inv_access_level, update_frequency, inv_security_classification",
                s
            ))),
        }
    }
}

/// Translates a raw field value into its French display value.
///
/// The field key is matched case-insensitively. Unknown fields and unknown
/// codes are returned unchanged.
pub fn translate<'a>(field: &str, value: &'a str) -> &'a str {
    match field.parse::<VocabularyField>() {
        Ok(vocabulary) => vocabulary.translate(value),
        Err(_) => value,
    }
}
