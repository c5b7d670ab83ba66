//! Domain identifier types with validation
//!
//! Newtype wrappers for locales, product identifiers and index targets.
//! Each type ensures type safety and validates its format on construction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Site locale identifier such as `en_US`, `fr_FR` or `default`
///
/// # Examples
///
/// ```
/// use catalog_sync::domain::ids::Locale;
/// use std::str::FromStr;
///
/// let locale = Locale::from_str("fr_FR").unwrap();
/// assert_eq!(locale.language(), "fr");
/// assert!(Locale::from_str("fr FR").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locale(String);

impl Locale {
    /// Creates a new Locale
    ///
    /// Accepts ASCII letters, digits, `_` and `-` only.
    pub fn new(locale: impl Into<String>) -> Result<Self, String> {
        let locale = locale.into();
        if locale.trim().is_empty() {
            return Err("Locale cannot be empty".to_string());
        }
        if !locale
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(format!("Invalid locale '{locale}'"));
        }
        Ok(Self(locale))
    }

    /// Returns the locale as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Language part of the locale (`fr` for `fr_FR`)
    pub fn language(&self) -> &str {
        self.0.split(['_', '-']).next().unwrap_or(&self.0)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Locale {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.0
    }
}

impl AsRef<str> for Locale {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Catalog product identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(String);

impl ProductId {
    /// Creates a new ProductId
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Product ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the product ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProductId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Resolved destination for the documents of one locale
///
/// Search variant targets an index by name, ingestion variant targets a
/// task registered on the ingestion platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndexTarget {
    /// Index name, e.g. `shop__products__en_US`
    Index(String),
    /// Ingestion task identifier
    Task(String),
}

impl IndexTarget {
    /// Builds the product index name for a locale
    pub fn product_index(prefix: &str, locale: &Locale) -> Self {
        IndexTarget::Index(format!("{prefix}__products__{locale}"))
    }

    /// Returns the index name or task id
    pub fn as_str(&self) -> &str {
        match self {
            IndexTarget::Index(name) => name,
            IndexTarget::Task(task_id) => task_id,
        }
    }
}

impl fmt::Display for IndexTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexTarget::Index(name) => write!(f, "index:{name}"),
            IndexTarget::Task(task_id) => write!(f, "task:{task_id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_valid() {
        let locale = Locale::from_str("en_US").unwrap();
        assert_eq!(locale.as_str(), "en_US");
        assert_eq!(locale.language(), "en");
        assert_eq!(Locale::from_str("default").unwrap().language(), "default");
    }

    #[test]
    fn test_locale_invalid() {
        assert!(Locale::from_str("").is_err());
        assert!(Locale::from_str("   ").is_err());
        assert!(Locale::from_str("en/US").is_err());
    }

    #[test]
    fn test_locale_serde() {
        let locale: Locale = serde_json::from_str("\"de_DE\"").unwrap();
        assert_eq!(locale.as_str(), "de_DE");
        assert!(serde_json::from_str::<Locale>("\"de DE\"").is_err());
        assert_eq!(serde_json::to_string(&locale).unwrap(), "\"de_DE\"");
    }

    #[test]
    fn test_product_id() {
        assert_eq!(
            ProductId::from_str("008884303989M").unwrap().as_str(),
            "008884303989M"
        );
        assert!(ProductId::from_str("").is_err());
    }

    #[test]
    fn test_index_target_naming() {
        let locale = Locale::from_str("fr_FR").unwrap();
        let target = IndexTarget::product_index("shop", &locale);
        assert_eq!(target.as_str(), "shop__products__fr_FR");
        assert_eq!(target.to_string(), "index:shop__products__fr_FR");
        assert_eq!(
            IndexTarget::Task("a1b2".to_string()).to_string(),
            "task:a1b2"
        );
    }
}
