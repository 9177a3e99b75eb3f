//! Error types for menagerie.
//!
//! Every rule violation the zoo can report is a typed variant here.
//! Callers match on the variant to decide how to present the failure;
//! none of them leave the zoo in a partially mutated state.

use thiserror::Error;

use crate::animal::AnimalId;
use crate::climate::Climate;
use crate::habitat::HabitatId;
use crate::shop::ProductId;
use crate::storage::StorageError;

/// Top-level error type for menagerie.
#[derive(Debug, Error)]
pub enum ZooError {
    /// The habitat's climate is not one the animal's species tolerates.
    #[error("{animal} cannot live in {climate}")]
    IncompatibleClimate {
        /// Display name of the refused animal.
        animal: String,
        /// Climate of the refusing habitat.
        climate: Climate,
    },

    /// A current resident hunts the animal, or the animal hunts it.
    #[error("{animal} cannot coexist with {resident}")]
    IncompatibleResident {
        /// Display name of the refused animal.
        animal: String,
        /// Display name of the first conflicting resident.
        resident: String,
    },

    /// A purchase costs more than the zoo can pay.
    #[error("Balance too low: cost {cost} exceeds balance {balance}")]
    BalanceTooLow {
        /// Price of the product.
        cost: u32,
        /// Balance at the time of the attempt.
        balance: u32,
    },

    /// The store has never recorded a zoo-wide attribute.
    #[error("Persisted attribute '{attribute}' is missing")]
    MissingPersistedAttribute {
        /// Name of the missing attribute.
        attribute: String,
    },

    /// The zoo does not own an animal with this ID.
    #[error("Animal not found: {id}")]
    UnknownAnimal {
        /// The requested ID.
        id: AnimalId,
    },

    /// The zoo does not own a habitat with this ID.
    #[error("Habitat not found: {id}")]
    UnknownHabitat {
        /// The requested ID.
        id: HabitatId,
    },

    /// The shop does not list a product with this ID.
    #[error("Product not found in shop: {id}")]
    UnknownProduct {
        /// The requested ID.
        id: ProductId,
    },

    /// A configuration value was rejected by validation.
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// Which value was rejected and why.
        reason: String,
    },

    /// The store failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ZooError {
    /// Creates a configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Creates a missing-attribute error.
    #[must_use]
    pub fn missing_attribute(attribute: impl Into<String>) -> Self {
        Self::MissingPersistedAttribute {
            attribute: attribute.into(),
        }
    }

    /// Returns true if the animal was refused by a habitat's placement rules.
    #[must_use]
    pub const fn is_compatibility(&self) -> bool {
        matches!(
            self,
            Self::IncompatibleClimate { .. } | Self::IncompatibleResident { .. }
        )
    }

    /// Returns true if the caller can fix the input and try again.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::IncompatibleClimate { .. }
            | Self::IncompatibleResident { .. }
            | Self::BalanceTooLow { .. }
            | Self::UnknownAnimal { .. }
            | Self::UnknownHabitat { .. }
            | Self::UnknownProduct { .. } => true,
            Self::MissingPersistedAttribute { .. }
            | Self::InvalidConfig { .. }
            | Self::Storage(_) => false,
        }
    }
}

/// Result alias used throughout the crate.
pub type ZooResult<T> = Result<T, ZooError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_names_entities() {
        let err = ZooError::IncompatibleResident {
            animal: "Red Panda".to_string(),
            resident: "Leopard".to_string(),
        };
        assert_eq!(err.to_string(), "Red Panda cannot coexist with Leopard");

        let err = ZooError::IncompatibleClimate {
            animal: "Wild Boar".to_string(),
            climate: Climate::Polar,
        };
        assert_eq!(err.to_string(), "Wild Boar cannot live in POLAR");
    }

    #[test]
    fn test_balance_error_display() {
        let err = ZooError::BalanceTooLow {
            cost: 100,
            balance: 50,
        };
        assert!(err.to_string().contains("100"));
        assert!(err.to_string().contains("50"));
    }

    #[test]
    fn test_error_classification() {
        let climate = ZooError::IncompatibleClimate {
            animal: "Leopard".to_string(),
            climate: Climate::Polar,
        };
        assert!(climate.is_compatibility());
        assert!(climate.is_recoverable());

        let balance = ZooError::BalanceTooLow {
            cost: 10,
            balance: 0,
        };
        assert!(!balance.is_compatibility());
        assert!(balance.is_recoverable());

        let missing = ZooError::missing_attribute("balance");
        assert!(!missing.is_recoverable());

        let storage: ZooError = StorageError::Backend("disk full".to_string()).into();
        assert!(!storage.is_recoverable());
        assert!(storage.to_string().contains("disk full"));
    }
}
