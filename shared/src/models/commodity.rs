//! Commodity vocabulary for mill stock tracking

use serde::{Deserialize, Serialize};

/// Commodities tracked in the stock ledger
///
/// The well-known kinds cover the standard milling flow; anything else a
/// mill trades (diesel, spare parts, sacks of salt) goes through `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Commodity {
    Paddy,
    Rice,
    Frk,
    Gunny,
    Khanda,
    Nakkhi,
    Other(String),
}

impl Commodity {
    pub fn name(&self) -> &str {
        match self {
            Commodity::Paddy => "Paddy",
            Commodity::Rice => "Rice",
            Commodity::Frk => "FRK",
            Commodity::Gunny => "Gunny",
            Commodity::Khanda => "Khanda",
            Commodity::Nakkhi => "Nakkhi",
            Commodity::Other(name) => name,
        }
    }
}

impl From<String> for Commodity {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Paddy" => Commodity::Paddy,
            "Rice" => Commodity::Rice,
            "FRK" => Commodity::Frk,
            "Gunny" => Commodity::Gunny,
            "Khanda" => Commodity::Khanda,
            "Nakkhi" => Commodity::Nakkhi,
            _ => Commodity::Other(value),
        }
    }
}

impl From<Commodity> for String {
    fn from(value: Commodity) -> Self {
        value.name().to_string()
    }
}

impl std::fmt::Display for Commodity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
