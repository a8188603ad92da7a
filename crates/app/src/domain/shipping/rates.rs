//! Shipping rate tables.

use rustc_hash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;
use trolley::shipping::Country;

#[derive(Debug, Error)]
pub enum ShippingRatesError {
    #[error("failed to parse shipping rates")]
    Parse(#[from] serde_norway::Error),

    #[error("unknown country in shipping rates: {0}")]
    UnknownCountry(String),
}

/// Shipping cost per destination country, in minor units.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShippingRates {
    costs: FxHashMap<Country, u64>,
}

#[derive(Deserialize)]
struct RatesFile {
    #[serde(default)]
    rates: FxHashMap<String, u64>,
}

/// UK delivery cost of the built-in rate table.
pub const UK_SHIPPING_COST: u64 = 4_99;

impl ShippingRates {
    /// Built-in table: UK delivery only, everything else at the default cost.
    #[must_use]
    pub fn standard() -> Self {
        Self::default().with_rate(Country::UnitedKingdom, UK_SHIPPING_COST)
    }

    /// Parse a YAML rates table keyed by country alias, name or numeric code.
    ///
    /// ```yaml
    /// rates:
    ///   GB: 499
    ///   Germany: 999
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or names an unknown country.
    pub fn from_yaml(yaml: &str) -> Result<Self, ShippingRatesError> {
        let file: RatesFile = serde_norway::from_str(yaml)?;

        file.rates
            .into_iter()
            .map(|(country, cost)| {
                Country::parse(&country)
                    .map(|parsed| (parsed, cost))
                    .ok_or(ShippingRatesError::UnknownCountry(country))
            })
            .collect::<Result<FxHashMap<_, _>, _>>()
            .map(|costs| Self { costs })
    }

    #[must_use]
    pub fn with_rate(mut self, country: Country, cost: u64) -> Self {
        self.insert(country, cost);
        self
    }

    pub fn insert(&mut self, country: Country, cost: u64) {
        self.costs.insert(country, cost);
    }

    pub fn get(&self, country: Country) -> Option<u64> {
        self.costs.get(&country).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }
}
