use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Tenant scoping key. Every repository call is keyed by an `OrgId`; records
/// belonging to one organization are never visible to another.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct OrgId(String);

impl OrgId {
    /// Validate a raw tenant key. Blank keys are rejected outright so a
    /// missing scope can never silently widen a query.
    pub fn new(raw: impl Into<String>) -> Result<Self, TenantScopeError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(TenantScopeError::MissingOrgId);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrgId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for OrgId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        OrgId::new(raw).map_err(serde::de::Error::custom)
    }
}

/// Hard precondition failure raised before any query touches the store.
#[derive(Debug, thiserror::Error)]
pub enum TenantScopeError {
    #[error("org id must be a non-empty tenant key")]
    MissingOrgId,
}
