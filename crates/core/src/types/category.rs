//! Product categories offered by the catalog.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A catalog category.
///
/// The catalog stores the category as free text in the product's `type`
/// field. [`Category::KNOWN`] lists the ones sellers pick from; anything else
/// round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    /// Categories offered on the product form.
    pub const KNOWN: [&'static str; 10] = [
        "Electronics",
        "Fashion",
        "Home and Kitchen",
        "Health and Personal Care",
        "Books",
        "Sports",
        "Toys",
        "Beauty",
        "Automotive",
        "Jewelry",
    ];

    /// Create a category, snapping to the canonical spelling of a known one.
    #[must_use]
    pub fn new(name: &str) -> Self {
        let trimmed = name.trim();
        let canonical = Self::KNOWN
            .iter()
            .find(|known| known.eq_ignore_ascii_case(trimmed))
            .map_or(trimmed, |known| *known);
        Self(canonical.to_owned())
    }

    /// All known categories.
    #[must_use]
    pub fn known() -> Vec<Self> {
        Self::KNOWN.iter().map(|name| Self((*name).to_owned())).collect()
    }

    /// Whether this is one of the known categories.
    #[must_use]
    pub fn is_known(&self) -> bool {
        Self::KNOWN.contains(&self.0.as_str())
    }

    /// Category name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Category {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snaps_to_known_spelling() {
        let category = Category::new("home and kitchen");
        assert_eq!(category.as_str(), "Home and Kitchen");
        assert!(category.is_known());
    }

    #[test]
    fn test_unknown_kept() {
        let category = Category::new(" Garden ");
        assert_eq!(category.as_str(), "Garden");
        assert!(!category.is_known());
    }

    #[test]
    fn test_known_list() {
        assert_eq!(Category::known().len(), 10);
    }
}
