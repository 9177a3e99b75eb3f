//! Habitat climates.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The environment a habitat provides. Fixed for the lifetime of a habitat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Climate {
    /// Hot and humid.
    Tropical,
    /// Arid.
    Dry,
    /// Mild seasons.
    Temperate,
    /// Hot summers, cold winters.
    Continental,
    /// Frozen.
    Polar,
}

impl Climate {
    /// Every climate, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Tropical,
        Self::Dry,
        Self::Temperate,
        Self::Continental,
        Self::Polar,
    ];

    /// Purchase price of a habitat with this climate.
    #[must_use]
    pub const fn habitat_cost(self) -> u32 {
        match self {
            Self::Tropical | Self::Continental => 300,
            Self::Dry => 200,
            Self::Temperate => 150,
            Self::Polar => 600,
        }
    }

    /// Human-readable label, e.g. "Temperate".
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Tropical => "Tropical",
            Self::Dry => "Dry",
            Self::Temperate => "Temperate",
            Self::Continental => "Continental",
            Self::Polar => "Polar",
        }
    }

    /// Name given to habitats of this climate when they are stocked in the shop.
    #[must_use]
    pub fn default_habitat_name(self) -> String {
        format!("{} Climate Habitat", self.label())
    }
}

impl fmt::Display for Climate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tropical => write!(f, "TROPICAL"),
            Self::Dry => write!(f, "DRY"),
            Self::Temperate => write!(f, "TEMPERATE"),
            Self::Continental => write!(f, "CONTINENTAL"),
            Self::Polar => write!(f, "POLAR"),
        }
    }
}
