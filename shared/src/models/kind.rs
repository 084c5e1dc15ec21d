//! Per-kind configuration for commodity transaction records
//!
//! Every transaction module the platform exposes (paddy purchase, rice
//! sale, gunny inward, ...) is one entry in this table. The generic record
//! service reads the entry to know which ledger direction a record maps to,
//! where its commodity comes from, and whether it carries a document number.

use serde::{Deserialize, Serialize};

use super::commodity::Commodity;
use super::ledger::Direction;

/// Transaction record kinds handled by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordKind {
    PaddyPurchase,
    PaddyInward,
    RiceSale,
    RiceOutward,
    FrkPurchase,
    GunnyInward,
    GunnyOutward,
    KhandaSale,
    NakkhiSale,
    GoodsPurchase,
    GoodsSale,
}

/// Where a record kind's commodity comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommoditySource {
    /// Every record of this kind moves the same commodity
    Fixed(Commodity),
    /// The payload names the commodity (general goods kinds)
    FromPayload,
}

/// Static configuration describing how one record kind maps into the ledger
#[derive(Debug, Clone)]
pub struct KindConfig {
    pub kind: RecordKind,
    pub slug: &'static str,
    pub action: &'static str,
    pub direction: Direction,
    pub commodity: CommoditySource,
    pub tracks_variety: bool,
    pub doc_prefix: Option<&'static str>,
}

impl RecordKind {
    pub const ALL: [RecordKind; 11] = [
        RecordKind::PaddyPurchase,
        RecordKind::PaddyInward,
        RecordKind::RiceSale,
        RecordKind::RiceOutward,
        RecordKind::FrkPurchase,
        RecordKind::GunnyInward,
        RecordKind::GunnyOutward,
        RecordKind::KhandaSale,
        RecordKind::NakkhiSale,
        RecordKind::GoodsPurchase,
        RecordKind::GoodsSale,
    ];

    pub fn slug(&self) -> &'static str {
        self.config().slug
    }

    pub fn from_slug(slug: &str) -> Option<RecordKind> {
        Self::ALL.iter().copied().find(|k| k.config().slug == slug)
    }

    pub fn config(&self) -> KindConfig {
        match self {
            RecordKind::PaddyPurchase => KindConfig {
                kind: *self,
                slug: "paddy-purchase",
                action: "Purchase",
                direction: Direction::Credit,
                commodity: CommoditySource::Fixed(Commodity::Paddy),
                tracks_variety: true,
                doc_prefix: Some("PDP"),
            },
            RecordKind::PaddyInward => KindConfig {
                kind: *self,
                slug: "paddy-inward",
                action: "Inward",
                direction: Direction::Credit,
                commodity: CommoditySource::Fixed(Commodity::Paddy),
                tracks_variety: true,
                doc_prefix: Some("PDI"),
            },
            RecordKind::RiceSale => KindConfig {
                kind: *self,
                slug: "rice-sale",
                action: "Sale",
                direction: Direction::Debit,
                commodity: CommoditySource::Fixed(Commodity::Rice),
                tracks_variety: true,
                doc_prefix: Some("RCS"),
            },
            RecordKind::RiceOutward => KindConfig {
                kind: *self,
                slug: "rice-outward",
                action: "Outward",
                direction: Direction::Debit,
                commodity: CommoditySource::Fixed(Commodity::Rice),
                tracks_variety: true,
                doc_prefix: Some("RCO"),
            },
            RecordKind::FrkPurchase => KindConfig {
                kind: *self,
                slug: "frk-purchase",
                action: "Purchase",
                direction: Direction::Credit,
                commodity: CommoditySource::Fixed(Commodity::Frk),
                tracks_variety: false,
                doc_prefix: Some("FKP"),
            },
            RecordKind::GunnyInward => KindConfig {
                kind: *self,
                slug: "gunny-inward",
                action: "Inward",
                direction: Direction::Credit,
                commodity: CommoditySource::Fixed(Commodity::Gunny),
                tracks_variety: false,
                doc_prefix: Some("GNI"),
            },
            RecordKind::GunnyOutward => KindConfig {
                kind: *self,
                slug: "gunny-outward",
                action: "Outward",
                direction: Direction::Debit,
                commodity: CommoditySource::Fixed(Commodity::Gunny),
                tracks_variety: false,
                doc_prefix: Some("GNO"),
            },
            RecordKind::KhandaSale => KindConfig {
                kind: *self,
                slug: "khanda-sale",
                action: "Sale",
                direction: Direction::Debit,
                commodity: CommoditySource::Fixed(Commodity::Khanda),
                tracks_variety: false,
                doc_prefix: Some("KHS"),
            },
            RecordKind::NakkhiSale => KindConfig {
                kind: *self,
                slug: "nakkhi-sale",
                action: "Sale",
                direction: Direction::Debit,
                commodity: CommoditySource::Fixed(Commodity::Nakkhi),
                tracks_variety: false,
                doc_prefix: Some("NKS"),
            },
            RecordKind::GoodsPurchase => KindConfig {
                kind: *self,
                slug: "goods-purchase",
                action: "Purchase",
                direction: Direction::Credit,
                commodity: CommoditySource::FromPayload,
                tracks_variety: false,
                doc_prefix: None,
            },
            RecordKind::GoodsSale => KindConfig {
                kind: *self,
                slug: "goods-sale",
                action: "Sale",
                direction: Direction::Debit,
                commodity: CommoditySource::FromPayload,
                tracks_variety: false,
                doc_prefix: None,
            },
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.slug())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_round_trip() {
        for kind in RecordKind::ALL {
            assert_eq!(RecordKind::from_slug(kind.slug()), Some(kind));
        }
        assert_eq!(RecordKind::from_slug("paddy-outward"), None);
    }

    #[test]
    fn document_prefixes_are_unique() {
        let mut prefixes: Vec<&str> = RecordKind::ALL
            .iter()
            .filter_map(|k| k.config().doc_prefix)
            .collect();
        let total = prefixes.len();
        prefixes.sort();
        prefixes.dedup();
        assert_eq!(prefixes.len(), total);
    }
}
