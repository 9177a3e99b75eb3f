//! Zoo configuration.

use serde::{Deserialize, Serialize};

use crate::climate::Climate;
use crate::error::{ZooError, ZooResult};
use crate::shop::DEFAULT_CAPACITY;

/// Tunables for a zoo instance.
///
/// Defaults reproduce the standard game: 100 coins, day 1, a ten-item shop
/// restocked weekly, three coins per visitor, and one temperate habitat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZooConfig {
    /// Balance a fresh zoo starts with.
    pub starting_balance: u32,
    /// Day a fresh zoo starts on. Must be at least 1.
    pub starting_day: u32,
    /// Number of products after each restock.
    pub shop_capacity: usize,
    /// The shop restocks on days divisible by this.
    pub restock_interval_days: u32,
    /// Revenue per visitor.
    pub ticket_price: u32,
    /// Name of the habitat a fresh zoo starts with.
    pub default_habitat_name: String,
    /// Climate of the habitat a fresh zoo starts with.
    pub default_habitat_climate: Climate,
}

impl Default for ZooConfig {
    fn default() -> Self {
        Self {
            starting_balance: 100,
            starting_day: 1,
            shop_capacity: DEFAULT_CAPACITY,
            restock_interval_days: 7,
            ticket_price: 3,
            default_habitat_name: Climate::Temperate.default_habitat_name(),
            default_habitat_climate: Climate::Temperate,
        }
    }
}

impl ZooConfig {
    /// Checks the configuration, returning it unchanged when valid.
    ///
    /// # Errors
    /// Returns `InvalidConfig` for a zero shop capacity, a zero restock
    /// interval, or a starting day of 0.
    pub fn validate(self) -> ZooResult<Self> {
        if self.shop_capacity == 0 {
            return Err(ZooError::invalid_config("shop_capacity must be at least 1"));
        }
        if self.restock_interval_days == 0 {
            return Err(ZooError::invalid_config(
                "restock_interval_days must be at least 1",
            ));
        }
        if self.starting_day == 0 {
            return Err(ZooError::invalid_config("starting_day must be at least 1"));
        }
        Ok(self)
    }
}
