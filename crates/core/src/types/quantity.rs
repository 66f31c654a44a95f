//! Item quantity.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when creating a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityError {
    /// Quantity below one.
    #[error("quantity must be at least {min}")]
    TooSmall {
        /// Smallest accepted quantity.
        min: u32,
    },
    /// Quantity does not fit the stored range.
    #[error("quantity must be at most {max}")]
    TooLarge {
        /// Largest accepted quantity.
        max: u32,
    },
}

/// How many units of an item are needed. Always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    /// Smallest accepted quantity.
    pub const MIN: u32 = 1;

    /// Largest accepted quantity.
    pub const MAX: u32 = u32::MAX;

    /// Create a quantity.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::TooSmall`] for values below one.
    pub const fn new(value: u32) -> Result<Self, QuantityError> {
        if value < Self::MIN {
            return Err(QuantityError::TooSmall { min: Self::MIN });
        }
        Ok(Self(value))
    }

    /// Get the underlying value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<i64> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match u32::try_from(value) {
            Ok(value) => Self::new(value),
            Err(_) if value < 0 => Err(QuantityError::TooSmall { min: Self::MIN }),
            Err(_) => Err(QuantityError::TooLarge { max: Self::MAX }),
        }
    }
}

impl From<Quantity> for u32 {
    fn from(q: Quantity) -> Self {
        q.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_rejected() {
        assert_eq!(Quantity::new(0), Err(QuantityError::TooSmall { min: 1 }));
    }

    #[test]
    fn test_negative_rejected() {
        assert_eq!(
            Quantity::try_from(-3_i64),
            Err(QuantityError::TooSmall { min: 1 })
        );
    }

    #[test]
    fn test_above_u32_range_rejected_as_too_large() {
        let err = Quantity::try_from(5_000_000_000_i64).unwrap_err();
        assert_eq!(err, QuantityError::TooLarge { max: u32::MAX });
        assert_eq!(err.to_string(), "quantity must be at most 4294967295");
    }

    #[test]
    fn test_u32_max_accepted() {
        assert_eq!(
            Quantity::try_from(i64::from(u32::MAX)).unwrap().get(),
            u32::MAX
        );
    }

    #[test]
    fn test_deserialize() {
        let q: Quantity = serde_json::from_str("2").unwrap();
        assert_eq!(q.get(), 2);
        assert!(serde_json::from_str::<Quantity>("0").is_err());
    }
}
