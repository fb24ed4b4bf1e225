//! Newtype IDs for type-safe entity references.
//!
//! The marketplace backends hand out opaque string identifiers (document IDs).
//! Use the `define_id!` macro to create type-safe wrappers that prevent
//! accidentally mixing IDs from different entity types.
//!
//! IDs are normalized on construction (surrounding whitespace trimmed), so two
//! IDs compare equal whenever their string forms match. This is what makes
//! membership checks work regardless of whether the server returned a populated
//! object or a bare ID string.

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` (deserialization trims the value)
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<&str>`, `From<String>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use cybermart_core::define_id;
/// define_id!(UserId);
/// define_id!(OrderId);
///
/// let user_id = UserId::new(" 65f0c1 ");
/// assert_eq!(user_id.as_str(), "65f0c1");
///
/// // These are different types, so this won't compile:
/// // let _: UserId = OrderId::new("65f0c1");
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, ::serde::Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID, trimming surrounding whitespace.
            #[must_use]
            pub fn new(id: impl AsRef<str>) -> Self {
                Self(id.as_ref().trim().to_owned())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Convert into the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }

            /// Whether the ID is blank after normalization.
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::core::result::Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                let raw = <String as ::serde::Deserialize>::deserialize(deserializer)?;
                Ok(Self::new(raw))
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::convert::Infallible;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                Ok(Self::new(s))
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self::new(id)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Define standard entity IDs
define_id!(UserId);
define_id!(ProductId);
define_id!(OrderId);
define_id!(CartLineId);

/// Sellers are users with the seller role; the catalog refers to them by user ID.
pub type SellerId = UserId;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_trimmed() {
        let id = ProductId::new("  abc123\n");
        assert_eq!(id.as_str(), "abc123");
        assert_eq!(id, ProductId::new("abc123"));
    }

    #[test]
    fn test_deserialize_trims() {
        let id: ProductId = serde_json::from_str("\" 65f0 \"").unwrap();
        assert_eq!(id.as_str(), "65f0");
    }

    #[test]
    fn test_serialize_transparent() {
        let id = OrderId::new("o-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"o-1\"");
    }

    #[test]
    fn test_blank_id_is_empty() {
        assert!(UserId::new("   ").is_empty());
        assert!(!UserId::new("u").is_empty());
    }
}
