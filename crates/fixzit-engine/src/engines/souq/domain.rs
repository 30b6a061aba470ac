use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::settings::AutoRepricerSettings;

/// Catalog identifier for a product, shared across competing seller listings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fsin(pub String);

/// Identifier wrapper for one seller's offer on a product.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ListingId(pub String);

/// Identifier wrapper for marketplace sellers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SellerId(pub String);

/// How an order placed against the listing is fulfilled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentMethod {
    /// Fulfilled by facility: stock sits in a Fixzit warehouse.
    Fbf,
    /// Fulfilled by merchant: the seller ships directly.
    Fbm,
}

impl FulfillmentMethod {
    pub const fn label(self) -> &'static str {
        match self {
            FulfillmentMethod::Fbf => "fbf",
            FulfillmentMethod::Fbm => "fbm",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingCondition {
    New,
    Refurbished,
    Used,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Active,
    Inactive,
    Suppressed,
}

/// Seller account-health tier maintained by marketplace operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SellerHealth {
    Excellent,
    Good,
    AtRisk,
    Suspended,
}

impl SellerHealth {
    pub const fn label(self) -> &'static str {
        match self {
            SellerHealth::Excellent => "excellent",
            SellerHealth::Good => "good",
            SellerHealth::AtRisk => "at_risk",
            SellerHealth::Suspended => "suspended",
        }
    }
}

/// Rolling performance counters tracked per listing. Rates are percentages on
/// a 0-100 scale; `customer_rating` is the usual 0-5 star average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub order_count: u32,
    pub cancel_rate: f64,
    pub defect_rate: f64,
    pub on_time_ship_rate: f64,
    pub customer_rating: f64,
}

/// One seller's offer for a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub seller_id: SellerId,
    pub fsin: Fsin,
    /// Seller-facing stock keeping unit used by bulk feeds.
    pub sku: String,
    pub title: String,
    pub price: f64,
    pub quantity: u32,
    pub fulfillment: FulfillmentMethod,
    pub condition: ListingCondition,
    pub status: ListingStatus,
    pub buy_box_eligible: bool,
    pub metrics: PerformanceMetrics,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    pub fn is_active(&self) -> bool {
        self.status == ListingStatus::Active
    }

    pub fn in_stock(&self) -> bool {
        self.quantity > 0
    }
}

/// Marketplace seller account owning zero or more listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seller {
    pub id: SellerId,
    pub name: String,
    pub health: SellerHealth,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_repricer: Option<AutoRepricerSettings>,
}

impl Seller {
    pub fn repricing_enabled(&self) -> bool {
        self.auto_repricer
            .as_ref()
            .map(|settings| settings.enabled)
            .unwrap_or(false)
    }
}
