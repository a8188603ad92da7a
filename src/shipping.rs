//! Shipping

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

/// Cost charged when the destination cannot be resolved or has no configured rate.
pub const DEFAULT_SHIPPING_COST: u64 = 12_99;

/// Destination countries with a numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Country {
    /// GB / UK
    UnitedKingdom = 1,

    /// DE
    Germany = 2,

    /// US / USA
    UnitedStates = 3,

    /// AU / AUS
    Australia = 4,
}

impl Country {
    /// All known countries.
    pub const ALL: [Country; 4] = [
        Country::UnitedKingdom,
        Country::Germany,
        Country::UnitedStates,
        Country::Australia,
    ];

    /// Numeric code.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Lookup by numeric code.
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|country| country.code() == code)
    }

    /// Resolve a country from an alias (`GB`, `usa`), a name (`United Kingdom`) or a numeric
    /// code (`1`). Case, whitespace and punctuation are ignored.
    pub fn parse(value: &str) -> Option<Self> {
        let cleaned: String = value
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|ch| ch.to_ascii_uppercase())
            .collect();

        if cleaned.is_empty() {
            return None;
        }

        if let Ok(code) = cleaned.parse::<u8>() {
            return Self::from_code(code);
        }

        match cleaned.as_str() {
            "GB" | "UK" | "UNITEDKINGDOM" => Some(Self::UnitedKingdom),
            "DE" | "GERMANY" => Some(Self::Germany),
            "US" | "USA" | "UNITEDSTATES" => Some(Self::UnitedStates),
            "AU" | "AUS" | "AUSTRALIA" => Some(Self::Australia),
            _ => None,
        }
    }
}

impl Display for Country {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            Self::UnitedKingdom => "UnitedKingdom",
            Self::Germany => "Germany",
            Self::UnitedStates => "UnitedStates",
            Self::Australia => "Australia",
        };

        f.write_str(name)
    }
}

/// Shipping selected for a basket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingDetails {
    /// Resolved destination; `None` when the input could not be resolved.
    pub country: Option<Country>,

    /// Cost in minor units.
    pub cost: u64,
}

impl ShippingDetails {
    /// Shipping to a resolved country.
    pub fn new(country: Country, cost: u64) -> Self {
        Self {
            country: Some(country),
            cost,
        }
    }

    /// Flat default shipping for unresolved destinations.
    pub fn fallback() -> Self {
        Self {
            country: None,
            cost: DEFAULT_SHIPPING_COST,
        }
    }
}
