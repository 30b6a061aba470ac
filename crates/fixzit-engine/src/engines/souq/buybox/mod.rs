mod scoring;

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Fsin, Listing, ListingId, SellerHealth, SellerId};
use super::repository::{MarketplaceRepository, RepositoryError};
use crate::tenancy::OrgId;

/// Selects the featured offer among competing listings for one product.
pub struct BuyBoxEngine<R> {
    repository: Arc<R>,
}

/// One offer as seen on the board. `score` is present only for listings that
/// went through scoring; a walkover winner stays unscored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedOffer {
    pub listing_id: ListingId,
    pub seller_id: SellerId,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Full Buy Box verdict for one FSIN: the winner (if any) plus every active,
/// in-stock offer on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuyBoxDecision {
    pub fsin: Fsin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<RankedOffer>,
    pub offers: Vec<RankedOffer>,
    pub computed_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum BuyBoxError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl<R> BuyBoxEngine<R>
where
    R: MarketplaceRepository,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Compute the current winner for an FSIN without persisting anything.
    pub fn winner(&self, org: &OrgId, fsin: &Fsin) -> Result<Option<RankedOffer>, BuyBoxError> {
        Ok(self.decide_at(org, fsin, Utc::now())?.winner)
    }

    /// Recompute the decision and write it back so listing documents carry
    /// their refreshed score and winner flag.
    pub fn recalculate_at(
        &self,
        org: &OrgId,
        fsin: &Fsin,
        now: DateTime<Utc>,
    ) -> Result<BuyBoxDecision, BuyBoxError> {
        let decision = self.decide_at(org, fsin, now)?;
        self.repository.record_buy_box(org, &decision)?;
        Ok(decision)
    }

    /// Pure read: rank the offers for an FSIN as of `now`.
    ///
    /// Candidates are active, eligible, in-stock listings; when none qualify
    /// the eligibility flag is relaxed. A lone candidate wins without being
    /// scored.
    pub fn decide_at(
        &self,
        org: &OrgId,
        fsin: &Fsin,
        now: DateTime<Utc>,
    ) -> Result<BuyBoxDecision, BuyBoxError> {
        let listings = self.repository.listings_for_product(org, fsin)?;
        let board: Vec<&Listing> = listings
            .iter()
            .filter(|listing| listing.is_active() && listing.in_stock())
            .collect();

        let mut candidates: Vec<&Listing> = board
            .iter()
            .copied()
            .filter(|listing| listing.buy_box_eligible)
            .collect();
        if candidates.is_empty() {
            candidates = board.clone();
        }

        if candidates.is_empty() {
            return Ok(BuyBoxDecision {
                fsin: fsin.clone(),
                winner: None,
                offers: Vec::new(),
                computed_at: now,
            });
        }

        if candidates.len() == 1 {
            let winner = unscored_offer(candidates[0]);
            let offers = board.iter().map(|listing| unscored_offer(listing)).collect();
            return Ok(BuyBoxDecision {
                fsin: fsin.clone(),
                winner: Some(winner),
                offers,
                computed_at: now,
            });
        }

        let avg_price = mean_price(&board);
        let healths = self.seller_healths(org, &candidates)?;

        let mut scored: Vec<RankedOffer> = candidates
            .iter()
            .map(|listing| RankedOffer {
                listing_id: listing.id.clone(),
                seller_id: listing.seller_id.clone(),
                price: listing.price,
                score: Some(scoring::score_listing(
                    listing,
                    healths.get(&listing.seller_id).copied(),
                    avg_price,
                )),
            })
            .collect();
        scored.sort_by(compare_offers);

        let winner = scored.first().cloned();
        let scored_ids: HashMap<_, _> = scored
            .iter()
            .map(|offer| (offer.listing_id.clone(), offer.score))
            .collect();
        let mut offers: Vec<RankedOffer> = board
            .iter()
            .map(|listing| RankedOffer {
                listing_id: listing.id.clone(),
                seller_id: listing.seller_id.clone(),
                price: listing.price,
                score: scored_ids.get(&listing.id).copied().flatten(),
            })
            .collect();
        offers.sort_by(compare_offers);

        Ok(BuyBoxDecision {
            fsin: fsin.clone(),
            winner,
            offers,
            computed_at: now,
        })
    }

    fn seller_healths(
        &self,
        org: &OrgId,
        candidates: &[&Listing],
    ) -> Result<HashMap<SellerId, SellerHealth>, BuyBoxError> {
        let mut healths = HashMap::new();
        for listing in candidates {
            if healths.contains_key(&listing.seller_id) {
                continue;
            }
            if let Some(seller) = self.repository.seller(org, &listing.seller_id)? {
                healths.insert(listing.seller_id.clone(), seller.health);
            }
        }
        Ok(healths)
    }
}

fn unscored_offer(listing: &Listing) -> RankedOffer {
    RankedOffer {
        listing_id: listing.id.clone(),
        seller_id: listing.seller_id.clone(),
        price: listing.price,
        score: None,
    }
}

fn mean_price(board: &[&Listing]) -> f64 {
    if board.is_empty() {
        return 0.0;
    }
    board.iter().map(|listing| listing.price).sum::<f64>() / board.len() as f64
}

/// Descending score, ascending price; unscored offers sink below scored ones.
fn compare_offers(a: &RankedOffer, b: &RankedOffer) -> Ordering {
    let by_score = match (a.score, b.score) {
        (Some(sa), Some(sb)) => sb.partial_cmp(&sa).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_score.then(a.price.partial_cmp(&b.price).unwrap_or(Ordering::Equal))
}
