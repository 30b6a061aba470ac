mod normalizer;
mod parser;

use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::SellerId;
use super::repository::{MarketplaceRepository, RepositoryError};
use crate::tenancy::OrgId;

/// Outcome of a bulk feed import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FeedImportSummary {
    pub rows: u32,
    pub applied: u32,
    pub skipped: u32,
}

#[derive(Debug)]
pub enum FeedImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Repository(RepositoryError),
    SellerNotFound(SellerId),
}

impl std::fmt::Display for FeedImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedImportError::Io(err) => write!(f, "failed to read listing feed: {}", err),
            FeedImportError::Csv(err) => write!(f, "invalid listing feed data: {}", err),
            FeedImportError::Repository(err) => {
                write!(f, "could not apply listing feed: {}", err)
            }
            FeedImportError::SellerNotFound(seller) => {
                write!(f, "seller {:?} not found for tenant", seller)
            }
        }
    }
}

impl std::error::Error for FeedImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FeedImportError::Io(err) => Some(err),
            FeedImportError::Csv(err) => Some(err),
            FeedImportError::Repository(err) => Some(err),
            FeedImportError::SellerNotFound(_) => None,
        }
    }
}

impl From<std::io::Error> for FeedImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for FeedImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<RepositoryError> for FeedImportError {
    fn from(err: RepositoryError) -> Self {
        Self::Repository(err)
    }
}

/// Applies a seller's `SKU,Price,Quantity` CSV feed to their listings.
/// Unknown SKUs are counted and skipped; pricing decisions stay with the
/// repricer, this only records what the seller uploaded.
pub struct ListingFeedImporter<R> {
    repository: Arc<R>,
}

impl<R> ListingFeedImporter<R>
where
    R: MarketplaceRepository,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub fn apply_from_reader<T: Read>(
        &self,
        org: &OrgId,
        seller_id: &SellerId,
        reader: T,
        now: DateTime<Utc>,
    ) -> Result<FeedImportSummary, FeedImportError> {
        self.repository
            .seller(org, seller_id)?
            .ok_or_else(|| FeedImportError::SellerNotFound(seller_id.clone()))?;

        let listings = self.repository.listings_for_seller(org, seller_id)?;
        let by_sku: HashMap<String, _> = listings
            .iter()
            .map(|listing| (normalizer::normalize_sku(&listing.sku), &listing.id))
            .collect();

        let mut summary = FeedImportSummary::default();
        let mut applied: HashSet<String> = HashSet::new();

        for record in parser::parse_records(reader)? {
            summary.rows += 1;

            if applied.contains(&record.normalized_sku) {
                summary.skipped += 1;
                continue;
            }

            match by_sku.get(&record.normalized_sku) {
                Some(listing_id) => {
                    self.repository.update_listing_feed(
                        org,
                        listing_id,
                        record.price,
                        record.quantity,
                        now,
                    )?;
                    applied.insert(record.normalized_sku);
                    summary.applied += 1;
                }
                None => summary.skipped += 1,
            }
        }

        Ok(summary)
    }
}
