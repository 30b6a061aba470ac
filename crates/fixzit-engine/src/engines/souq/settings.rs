use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use super::domain::{Fsin, ListingId};

/// Pricing objective for a repricer rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetPosition {
    /// Undercut the lowest competitor to take the Buy Box.
    Win,
    /// Stay near the market without racing to the bottom.
    Competitive,
}

/// Validation errors raised while decoding a stored pricing rule.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("min price must be positive (got {0})")]
    NonPositiveFloor(f64),
    #[error("max price {max} is below min price {min}")]
    InvertedBounds { min: f64, max: f64 },
    #[error("undercut must not be negative (got {0})")]
    NegativeUndercut(f64),
}

/// One pricing rule. Immutable once resolved for a run; sellers store these
/// per listing, per FSIN, or as a default.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepricerRule {
    pub enabled: bool,
    pub min_price: f64,
    pub max_price: f64,
    pub target_position: TargetPosition,
    pub undercut: f64,
    pub protect_margin: bool,
}

impl RepricerRule {
    /// Validate a raw rule blob. Seller documents historically stored these
    /// untyped, so every field is checked before the rule is trusted.
    pub fn validated(raw: RawRepricerRule) -> Result<Self, SettingsError> {
        if raw.min_price <= 0.0 || !raw.min_price.is_finite() {
            return Err(SettingsError::NonPositiveFloor(raw.min_price));
        }
        if raw.max_price < raw.min_price {
            return Err(SettingsError::InvertedBounds {
                min: raw.min_price,
                max: raw.max_price,
            });
        }
        let undercut = raw.undercut.unwrap_or(0.0);
        if undercut < 0.0 || !undercut.is_finite() {
            return Err(SettingsError::NegativeUndercut(undercut));
        }

        Ok(Self {
            enabled: raw.enabled.unwrap_or(true),
            min_price: raw.min_price,
            max_price: raw.max_price,
            target_position: raw.target_position,
            undercut,
            protect_margin: raw.protect_margin.unwrap_or(false),
        })
    }
}

impl<'de> Deserialize<'de> for RepricerRule {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawRepricerRule::deserialize(deserializer)?;
        RepricerRule::validated(raw).map_err(serde::de::Error::custom)
    }
}

/// Wire form of a rule as stored on the seller document.
#[derive(Debug, Deserialize)]
pub struct RawRepricerRule {
    #[serde(default)]
    pub enabled: Option<bool>,
    pub min_price: f64,
    pub max_price: f64,
    pub target_position: TargetPosition,
    #[serde(default)]
    pub undercut: Option<f64>,
    #[serde(default)]
    pub protect_margin: Option<bool>,
}

/// Seller-level repricer configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutoRepricerSettings {
    pub enabled: bool,
    #[serde(default)]
    pub listing_rules: BTreeMap<ListingId, RepricerRule>,
    #[serde(default)]
    pub fsin_rules: BTreeMap<Fsin, RepricerRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_rule: Option<RepricerRule>,
}

impl AutoRepricerSettings {
    /// Resolve the rule for a listing: listing id, then FSIN, then default.
    pub fn rule_for(&self, listing: &ListingId, fsin: &Fsin) -> Option<&RepricerRule> {
        self.listing_rules
            .get(listing)
            .or_else(|| self.fsin_rules.get(fsin))
            .or(self.default_rule.as_ref())
    }
}
