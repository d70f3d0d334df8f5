//! Locale tags sent to the catalog.

use serde::{Deserialize, Serialize};

const DEFAULT_LOCALE: &str = "en-US";

/// Regions for languages whose primary region is not the language code
/// spelled in upper case.
const PRIMARY_REGIONS: &[(&str, &str)] = &[
    ("en", "US"),
    ("ja", "JP"),
    ("ko", "KR"),
    ("zh", "CN"),
    ("sv", "SE"),
    ("da", "DK"),
    ("cs", "CZ"),
    ("el", "GR"),
    ("uk", "UA"),
    ("he", "IL"),
    ("hi", "IN"),
    ("fa", "IR"),
    ("vi", "VN"),
    ("ar", "SA"),
    ("nb", "NO"),
    ("sl", "SI"),
    ("et", "EE"),
    ("ka", "GE"),
];

/// Full language-region tag such as `en-US`.
///
/// Built from configuration, where a bare two-letter language code is
/// accepted and completed with its primary region. Anything unparseable
/// falls back to `en-US`.
///
/// # Examples
///
/// ```
/// use marquee_catalog::Locale;
///
/// assert_eq!(Locale::parse("de").as_str(), "de-DE");
/// assert_eq!(Locale::parse("ja").as_str(), "ja-JP");
/// assert_eq!(Locale::parse("pt_br").as_str(), "pt-BR");
/// assert_eq!(Locale::parse("").as_str(), "en-US");
/// assert_eq!(Locale::parse("fr-CA").language(), "fr");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Locale(String);

impl Locale {
    /// Normalize a configured language value.
    pub fn parse(raw: &str) -> Self {
        let cleaned = raw.trim().replace('_', "-");
        let mut parts = cleaned.split('-');

        let language = match parts.next() {
            Some(lang) if is_language(lang) => lang.to_ascii_lowercase(),
            _ => return Self::default(),
        };

        let region = match (parts.next(), parts.next()) {
            (None, _) => match primary_region(&language) {
                Some(region) => region,
                None => return Self(language),
            },
            (Some(region), None) if is_region(region) => region.to_ascii_uppercase(),
            _ => return Self::default(),
        };

        Self(format!("{language}-{region}"))
    }

    /// Full tag.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Language subtag (`en` for `en-US`).
    pub fn language(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self(DEFAULT_LOCALE.to_string())
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Locale {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.0
    }
}

fn is_language(part: &str) -> bool {
    (2..=3).contains(&part.len()) && part.chars().all(|c| c.is_ascii_alphabetic())
}

fn is_region(part: &str) -> bool {
    (part.len() == 2 && part.chars().all(|c| c.is_ascii_alphabetic()))
        || (part.len() == 3 && part.chars().all(|c| c.is_ascii_digit()))
}

fn primary_region(language: &str) -> Option<String> {
    if language.len() != 2 {
        return None;
    }
    let region = PRIMARY_REGIONS
        .iter()
        .find(|(lang, _)| *lang == language)
        .map(|(_, region)| region.to_string())
        .unwrap_or_else(|| language.to_ascii_uppercase());
    Some(region)
}
