use std::sync::Arc;

use chrono::Utc;
use clap::Args;

use crate::infra::{
    default_assignment_config, seed_demo_dispatch, seed_demo_marketplace, InMemoryDirectory,
    InMemoryMarketplace, InMemoryNotificationQueue, InMemoryPriceHistory, InMemoryWorkOrders,
};
use fixzit_engine::engines::dispatch::{AssignmentError, AutoAssignmentEngine, WorkOrderId};
use fixzit_engine::engines::souq::{Fsin, ListingId, SellerId, SouqService};
use fixzit_engine::error::AppError;
use fixzit_engine::tenancy::OrgId;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Tenant the demo runs under
    #[arg(long, default_value = "org-fixzit-demo")]
    pub(crate) org: String,
    /// Skip the work-order dispatch portion of the demo
    #[arg(long)]
    pub(crate) skip_dispatch: bool,
}

#[derive(Args, Debug)]
pub(crate) struct RepriceArgs {
    /// Tenant the batch runs under
    #[arg(long, default_value = "org-fixzit-demo")]
    pub(crate) org: String,
    /// Limit the run to a single seller
    #[arg(long)]
    pub(crate) seller: Option<String>,
}

fn demo_marketplace(
    org: &OrgId,
) -> (
    Arc<SouqService<InMemoryMarketplace, InMemoryPriceHistory, InMemoryNotificationQueue>>,
    Arc<InMemoryMarketplace>,
    Arc<InMemoryPriceHistory>,
    Arc<InMemoryNotificationQueue>,
) {
    let repository = Arc::new(InMemoryMarketplace::default());
    let history = Arc::new(InMemoryPriceHistory::default());
    let queue = Arc::new(InMemoryNotificationQueue::default());
    seed_demo_marketplace(&repository, org);

    let service = Arc::new(SouqService::new(
        repository.clone(),
        history.clone(),
        queue.clone(),
    ));
    (service, repository, history, queue)
}

pub(crate) fn run_reprice(args: RepriceArgs) -> Result<(), AppError> {
    let org = OrgId::new(args.org)?;
    let (service, repository, history, queue) = demo_marketplace(&org);

    let summary = match args.seller {
        Some(seller) => service
            .repricer()
            .reprice_seller(&org, &SellerId(seller))?,
        None => service.repricer().reprice_all_sellers(&org)?,
    };

    println!("Auto-repricer batch for {org}");
    println!(
        "- processed {} | repriced {} | errors {}",
        summary.processed, summary.repriced, summary.errors
    );
    for record in history.records() {
        println!(
            "- {}: {:.2} -> {:.2} SAR ({:+.2}%)",
            record.listing_id.0, record.old_price, record.new_price, record.change_pct
        );
    }
    let gulf_price = repository.listing_price(&org, &ListingId("l-gulf-drill".to_string()));
    if let Some(price) = gulf_price {
        println!("- Gulf Tools drill now listed at {price:.2} SAR");
    }
    println!("- {} notification job(s) enqueued", queue.jobs().len());

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let org = OrgId::new(args.org)?;

    println!("Fixzit scoring engine demo ({org})");

    let (service, repository, history, queue) = demo_marketplace(&org);
    let fsin = Fsin("FSN-DRILL-18V".to_string());

    println!("\nBuy Box board for {}", fsin.0);
    let decision = service.buybox().decide_at(&org, &fsin, Utc::now())?;
    for offer in &decision.offers {
        match offer.score {
            Some(score) => println!(
                "- {} ({}) at {:.2} SAR, score {:.2}",
                offer.listing_id.0, offer.seller_id.0, offer.price, score
            ),
            None => println!(
                "- {} ({}) at {:.2} SAR",
                offer.listing_id.0, offer.seller_id.0, offer.price
            ),
        }
    }
    match &decision.winner {
        Some(winner) => println!("  Winner: {} at {:.2} SAR", winner.listing_id.0, winner.price),
        None => println!("  No winner on the board"),
    }

    println!("\nAuto-repricer run");
    let summary = service.repricer().reprice_all_sellers(&org)?;
    println!(
        "- processed {} | repriced {} | errors {}",
        summary.processed, summary.repriced, summary.errors
    );
    for record in history.records() {
        println!(
            "- {}: {:.2} -> {:.2} SAR ({:+.2}%), lowest rival {}",
            record.listing_id.0,
            record.old_price,
            record.new_price,
            record.change_pct,
            record
                .competitor_price
                .map(|price| format!("{price:.2} SAR"))
                .unwrap_or_else(|| "none".to_string()),
        );
    }
    if let Some(price) = repository.listing_price(&org, &ListingId("l-gulf-drill".to_string())) {
        println!("- Gulf Tools drill now listed at {price:.2} SAR");
    }
    println!("- {} notification job(s) enqueued", queue.jobs().len());

    if args.skip_dispatch {
        return Ok(());
    }

    println!("\nWork-order dispatch");
    let work_orders = Arc::new(InMemoryWorkOrders::default());
    let directory = Arc::new(InMemoryDirectory::default());
    seed_demo_dispatch(&work_orders, &directory, &org);
    let engine = AutoAssignmentEngine::new(
        work_orders.clone(),
        directory,
        default_assignment_config(),
    );

    let work_order_id = WorkOrderId("wo-1001".to_string());
    let outcome = engine.auto_assign(&org, &work_order_id)?;
    println!(
        "- {} assigned to {:?} (score {:.2}, {} candidates evaluated)",
        outcome.work_order_id.0, outcome.assigned_to, outcome.score, outcome.evaluated
    );
    if let Some(stored) = work_orders.get(&org, &work_order_id) {
        println!("- Stored status: {:?}", stored.status);
    }

    match engine.auto_assign(&org, &work_order_id) {
        Err(AssignmentError::AlreadyAssigned(_)) => {
            println!("- Re-running auto-assign is refused: the order is already assigned");
        }
        Ok(_) => println!("- Unexpected second assignment"),
        Err(err) => println!("- Second run failed differently: {err}"),
    }

    Ok(())
}
