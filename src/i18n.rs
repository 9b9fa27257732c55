//! Localized text selection.
//!
//! Catalog rows carry `<field>_es`, `<field>_en`, `<field>_fr` columns and
//! sometimes an unsuffixed `<field>`. Reads fall back from the requested
//! locale to Spanish, then to the unsuffixed column, then to "".

use serde::{Deserialize, Serialize};

/// Supported site languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Es,
    En,
    Fr,
}

impl Locale {
    pub fn code(self) -> &'static str {
        match self {
            Locale::Es => "es",
            Locale::En => "en",
            Locale::Fr => "fr",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "es" => Some(Locale::Es),
            "en" => Some(Locale::En),
            "fr" => Some(Locale::Fr),
            _ => None,
        }
    }
}

/// One logical text field stored once per language
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub es: Option<String>,
    pub en: Option<String>,
    pub fr: Option<String>,
    /// Unsuffixed column, used when no localized value is present
    pub base: Option<String>,
}

impl LocalizedText {
    /// Text for `locale`, falling back to Spanish, then the unsuffixed value.
    ///
    /// Empty strings count as missing.
    pub fn get(&self, locale: Locale) -> &str {
        let specific = match locale {
            Locale::Es => &self.es,
            Locale::En => &self.en,
            Locale::Fr => &self.fr,
        };

        [specific, &self.es, &self.base]
            .into_iter()
            .filter_map(|v| v.as_deref())
            .find(|v| !v.is_empty())
            .unwrap_or("")
    }
}
