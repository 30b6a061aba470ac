use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use super::buybox::{BuyBoxDecision, BuyBoxEngine, BuyBoxError};
use super::domain::Fsin;
use crate::cache::TtlCache;
use crate::tenancy::OrgId;

/// Cached read path over the Buy Box engine. Batch jobs touch many listings
/// per FSIN; the TTL cache makes each board a single computation per run.
pub struct OfferBoardProvider<R> {
    engine: BuyBoxEngine<R>,
    cache: TtlCache<(OrgId, Fsin), BuyBoxDecision>,
}

impl<R> OfferBoardProvider<R>
where
    R: super::repository::MarketplaceRepository,
{
    pub fn new(repository: Arc<R>, ttl: Duration) -> Self {
        Self {
            engine: BuyBoxEngine::new(repository),
            cache: TtlCache::new(ttl),
        }
    }

    pub fn engine(&self) -> &BuyBoxEngine<R> {
        &self.engine
    }

    /// Fetch the board for an FSIN, serving a live cache entry when present.
    pub fn board_at(
        &self,
        org: &OrgId,
        fsin: &Fsin,
        now: DateTime<Utc>,
    ) -> Result<BuyBoxDecision, BuyBoxError> {
        let key = (org.clone(), fsin.clone());
        if let Some(board) = self.cache.get_at(&key, now) {
            return Ok(board);
        }

        let board = self.engine.decide_at(org, fsin, now)?;
        self.cache.insert_at(key, board.clone(), now);
        Ok(board)
    }

    /// Drop the cached board after a price change so the next read re-ranks.
    pub fn invalidate(&self, org: &OrgId, fsin: &Fsin) {
        self.cache.invalidate(&(org.clone(), fsin.clone()));
    }

    /// Recompute and persist the decision, refreshing the cache with it.
    pub fn recalculate_at(
        &self,
        org: &OrgId,
        fsin: &Fsin,
        now: DateTime<Utc>,
    ) -> Result<BuyBoxDecision, BuyBoxError> {
        let decision = self.engine.recalculate_at(org, fsin, now)?;
        self.cache
            .insert_at((org.clone(), fsin.clone()), decision.clone(), now);
        Ok(decision)
    }
}
