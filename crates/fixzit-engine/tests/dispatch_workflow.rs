//! Integration specifications for work-order dispatch delivered through the
//! public engine facade and HTTP router.

mod common {
    use std::collections::{BTreeMap, HashMap};
    use std::sync::{Arc, Mutex};

    use chrono::{DateTime, NaiveDate, TimeZone, Utc};

    use fixzit_engine::engines::dispatch::{
        Assignee, Assignment, AssignmentCandidate, AssignmentConfig, AutoAssignmentEngine,
        Availability, CandidateDirectory, CandidateId, CandidateKind, RepositoryError, TimeSlot,
        WorkOrder, WorkOrderId, WorkOrderPriority, WorkOrderRepository, WorkOrderStatus,
    };
    use fixzit_engine::tenancy::OrgId;

    pub(crate) fn org() -> OrgId {
        OrgId::new("org-fixzit-demo").expect("valid org id")
    }

    /// Sunday 09:00 — a working-hours timestamp in the deployment region.
    pub(crate) fn run_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 28, 9, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    pub(crate) fn work_order(id: &str) -> WorkOrder {
        WorkOrder {
            id: WorkOrderId(id.to_string()),
            title: format!("Work order {id}"),
            category: "hvac".to_string(),
            subcategory: Some("split-unit".to_string()),
            work_type: Some("repair".to_string()),
            priority: WorkOrderPriority::High,
            property_id: Some("prop-olaya-tower".to_string()),
            scheduled: None,
            status: WorkOrderStatus::Open,
            assignment: Assignment::default(),
            created_at: run_at(),
        }
    }

    pub(crate) fn technician(id: &str) -> AssignmentCandidate {
        AssignmentCandidate {
            id: CandidateId(id.to_string()),
            name: format!("Technician {id}"),
            kind: CandidateKind::Technician,
            skills: vec![
                "hvac".to_string(),
                "split-unit".to_string(),
                "repair".to_string(),
            ],
            rating: 4.0,
            availability: Availability::Available,
            current_workload: 0,
            max_workload: Some(5),
            property_ids: Vec::new(),
            last_assigned_at: None,
        }
    }

    #[derive(Default)]
    struct TenantOrders {
        orders: BTreeMap<String, WorkOrder>,
        workload: HashMap<String, u32>,
        booked: HashMap<(String, NaiveDate), Vec<TimeSlot>>,
    }

    #[derive(Default)]
    pub(crate) struct WorkOrders {
        state: Mutex<HashMap<String, TenantOrders>>,
    }

    impl WorkOrders {
        pub(crate) fn insert(&self, org: &OrgId, work_order: WorkOrder) {
            let mut guard = self.state.lock().expect("lock");
            guard
                .entry(org.as_str().to_string())
                .or_default()
                .orders
                .insert(work_order.id.0.clone(), work_order);
        }

        pub(crate) fn get(&self, org: &OrgId, id: &WorkOrderId) -> Option<WorkOrder> {
            let guard = self.state.lock().expect("lock");
            guard
                .get(org.as_str())
                .and_then(|tenant| tenant.orders.get(&id.0))
                .cloned()
        }
    }

    impl WorkOrderRepository for WorkOrders {
        fn work_order(
            &self,
            org: &OrgId,
            id: &WorkOrderId,
        ) -> Result<Option<WorkOrder>, RepositoryError> {
            let guard = self.state.lock().expect("lock");
            Ok(guard
                .get(org.as_str())
                .and_then(|tenant| tenant.orders.get(&id.0))
                .cloned())
        }

        fn assign(
            &self,
            org: &OrgId,
            id: &WorkOrderId,
            assignee: Assignee,
            at: DateTime<Utc>,
        ) -> Result<(), RepositoryError> {
            let mut guard = self.state.lock().expect("lock");
            let order = guard
                .get_mut(org.as_str())
                .and_then(|tenant| tenant.orders.get_mut(&id.0))
                .ok_or(RepositoryError::NotFound)?;
            if order.assignment.assigned_to.is_some() {
                return Err(RepositoryError::Conflict);
            }
            order.assignment.assigned_to = Some(assignee);
            order.assignment.assigned_at = Some(at);
            order.status = WorkOrderStatus::Assigned;
            Ok(())
        }

        fn open_workload(
            &self,
            org: &OrgId,
            candidate: &CandidateId,
        ) -> Result<u32, RepositoryError> {
            let guard = self.state.lock().expect("lock");
            Ok(guard
                .get(org.as_str())
                .and_then(|tenant| tenant.workload.get(&candidate.0))
                .copied()
                .unwrap_or(0))
        }

        fn booked_slots(
            &self,
            org: &OrgId,
            candidate: &CandidateId,
            date: NaiveDate,
        ) -> Result<Vec<TimeSlot>, RepositoryError> {
            let guard = self.state.lock().expect("lock");
            Ok(guard
                .get(org.as_str())
                .and_then(|tenant| tenant.booked.get(&(candidate.0.clone(), date)))
                .cloned()
                .unwrap_or_default())
        }
    }

    #[derive(Default)]
    pub(crate) struct Directory {
        technicians: Mutex<Vec<AssignmentCandidate>>,
        vendors: Mutex<Vec<AssignmentCandidate>>,
    }

    impl Directory {
        pub(crate) fn add_technician(&self, candidate: AssignmentCandidate) {
            self.technicians.lock().expect("lock").push(candidate);
        }
    }

    impl CandidateDirectory for Directory {
        fn technicians(&self, _org: &OrgId) -> Result<Vec<AssignmentCandidate>, RepositoryError> {
            Ok(self.technicians.lock().expect("lock").clone())
        }

        fn vendors(&self, _org: &OrgId) -> Result<Vec<AssignmentCandidate>, RepositoryError> {
            Ok(self.vendors.lock().expect("lock").clone())
        }
    }

    pub(crate) type Engine = AutoAssignmentEngine<WorkOrders, Directory>;

    pub(crate) fn build_engine() -> (Arc<Engine>, Arc<WorkOrders>, Arc<Directory>) {
        let work_orders = Arc::new(WorkOrders::default());
        let directory = Arc::new(Directory::default());
        let engine = Arc::new(AutoAssignmentEngine::new(
            work_orders.clone(),
            directory.clone(),
            AssignmentConfig::default(),
        ));
        (engine, work_orders, directory)
    }
}

mod engine_flow {
    use super::common::*;
    use fixzit_engine::engines::dispatch::{Assignee, AssignmentError, CandidateId, WorkOrderId};

    #[test]
    fn assignment_is_one_way_and_idempotent_on_retry() {
        let (engine, work_orders, directory) = build_engine();
        work_orders.insert(&org(), work_order("wo-1"));
        directory.add_technician(technician("t-1"));

        let outcome = engine
            .auto_assign_at(&org(), &WorkOrderId("wo-1".to_string()), run_at())
            .expect("first assignment succeeds");
        assert_eq!(
            outcome.assigned_to,
            Assignee::Technician(CandidateId("t-1".to_string()))
        );

        let error = engine
            .auto_assign_at(&org(), &WorkOrderId("wo-1".to_string()), run_at())
            .expect_err("second call rejected");
        assert!(matches!(error, AssignmentError::AlreadyAssigned(_)));
    }
}

mod routing {
    use super::common::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use fixzit_engine::engines::dispatch::dispatch_router;
    use serde_json::Value;
    use tower::ServiceExt;

    #[tokio::test]
    async fn auto_assign_endpoint_assigns_then_conflicts() {
        let (engine, work_orders, directory) = build_engine();
        work_orders.insert(&org(), work_order("wo-1"));
        directory.add_technician(technician("t-1"));
        let router = dispatch_router(engine);

        let request = || {
            Request::builder()
                .method("POST")
                .uri("/api/v1/dispatch/org-fixzit-demo/work-orders/wo-1/auto-assign")
                .body(Body::empty())
                .expect("request")
        };

        let response = router
            .clone()
            .oneshot(request())
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), 1024).await.expect("body");
        let payload: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(
            payload.pointer("/assigned_to/id").and_then(Value::as_str),
            Some("t-1")
        );

        let response = router
            .oneshot(request())
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn work_order_endpoint_returns_the_assignment_state() {
        let (engine, work_orders, _) = build_engine();
        work_orders.insert(&org(), work_order("wo-1"));
        let router = dispatch_router(engine);

        let response = router
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/v1/dispatch/org-fixzit-demo/work-orders/wo-1")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let payload: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(payload.get("status"), Some(&serde_json::json!("open")));
    }

    #[tokio::test]
    async fn auto_assign_endpoint_reports_missing_orders() {
        let (engine, _, directory) = build_engine();
        directory.add_technician(technician("t-1"));
        let router = dispatch_router(engine);

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/dispatch/org-fixzit-demo/work-orders/ghost/auto-assign")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
