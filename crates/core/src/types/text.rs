//! Length-bounded, trimmed text values.
//!
//! Names and measures arrive from clients with stray whitespace. Each type
//! trims its input and then enforces a 1..=MAX character bound, counted in
//! Unicode scalar values rather than bytes.

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing bounded text.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TextError {
    /// The input is empty after trimming.
    #[error("{field} is required")]
    Empty {
        /// Field the value was meant for.
        field: &'static str,
    },
    /// The input is longer than allowed.
    #[error("{field} must be at most {max} characters")]
    TooLong {
        /// Field the value was meant for.
        field: &'static str,
        /// Maximum allowed length.
        max: usize,
    },
}

macro_rules! define_bounded_text {
    ($(#[$meta:meta])* $name:ident, $field:literal, $max:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Maximum length in characters.
            pub const MAX_LENGTH: usize = $max;

            /// Trim and validate the input.
            ///
            /// # Errors
            ///
            /// Returns [`TextError`] if the trimmed input is empty or longer
            /// than [`Self::MAX_LENGTH`] characters.
            pub fn parse(s: &str) -> Result<Self, TextError> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(TextError::Empty { field: $field });
                }
                if trimmed.chars().count() > Self::MAX_LENGTH {
                    return Err(TextError::TooLong {
                        field: $field,
                        max: Self::MAX_LENGTH,
                    });
                }
                Ok(Self(trimmed.to_owned()))
            }

            /// Returns the value as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = TextError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_bounded_text!(
    /// Display name of a shopping list (1-100 characters).
    ListName,
    "name",
    100
);

define_bounded_text!(
    /// Name of an item on a list (1-200 characters).
    ItemName,
    "name",
    200
);

define_bounded_text!(
    /// Unit an item quantity is counted in, e.g. "pcs" or "liters" (1-50 characters).
    Measure,
    "measure",
    50
);

define_bounded_text!(
    /// Application workspace a list belongs to.
    Awid,
    "awid",
    64
);

define_bounded_text!(
    /// Identity of a user as asserted by the upstream gateway.
    Identity,
    "identity",
    128
);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_whitespace() {
        let name = ListName::parse("  Groceries \n").unwrap();
        assert_eq!(name.as_str(), "Groceries");
    }

    #[test]
    fn test_rejects_blank() {
        assert_eq!(
            ListName::parse("   "),
            Err(TextError::Empty { field: "name" })
        );
    }

    #[test]
    fn test_length_bounds() {
        assert!(ListName::parse(&"a".repeat(100)).is_ok());
        assert!(matches!(
            ListName::parse(&"a".repeat(101)),
            Err(TextError::TooLong { max: 100, .. })
        ));
        assert!(ItemName::parse(&"a".repeat(200)).is_ok());
        assert!(Measure::parse(&"a".repeat(51)).is_err());
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        // 100 two-byte characters is still 100 characters
        assert!(ListName::parse(&"é".repeat(100)).is_ok());
    }

    #[test]
    fn test_error_message_names_field() {
        let err = Measure::parse("").unwrap_err();
        assert_eq!(err.to_string(), "measure is required");
    }

    #[test]
    fn test_deserialize_validates() {
        assert!(serde_json::from_str::<ItemName>("\"  \"").is_err());
        let name: ItemName = serde_json::from_str("\" Milk \"").unwrap();
        assert_eq!(name.as_str(), "Milk");
    }
}
