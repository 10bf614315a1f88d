//! Dashboard aggregates over in-memory SurrealDB.

use carelink_core::models::account::{CreateAccount, Role};
use carelink_core::models::service_request::RequestStatus;
use carelink_core::models::session::Actor;
use carelink_core::repository::AccountRepository;
use carelink_db::repository::{
    SurrealAccountRepository, SurrealConnectionRepository, SurrealReviewRepository,
    SurrealServiceRepository, SurrealServiceRequestRepository,
};
use carelink_workflow::catalog::{ServiceCatalog, ServiceDraft};
use carelink_workflow::dashboard::{DashboardConfig, DashboardService};
use carelink_workflow::error::WorkflowError;
use carelink_workflow::lifecycle::{NewServiceRequest, RequestLifecycle, ReviewInput, StatusUpdate};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

type Lifecycle = RequestLifecycle<
    SurrealServiceRequestRepository<Db>,
    SurrealReviewRepository<Db>,
    SurrealServiceRepository<Db>,
    SurrealConnectionRepository<Db>,
    SurrealAccountRepository<Db>,
>;
type Dashboards = DashboardService<
    SurrealServiceRequestRepository<Db>,
    SurrealReviewRepository<Db>,
    SurrealAccountRepository<Db>,
    SurrealConnectionRepository<Db>,
>;

async fn setup() -> (Lifecycle, Dashboards, SurrealAccountRepository<Db>) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    carelink_db::run_migrations(&db).await.unwrap();

    let requests = SurrealServiceRequestRepository::new(db.clone());
    let reviews = SurrealReviewRepository::new(db.clone());
    let connections = SurrealConnectionRepository::new(db.clone());
    let accounts = SurrealAccountRepository::new(db.clone());
    let catalog = ServiceCatalog::new(
        SurrealServiceRepository::new(db),
        connections.clone(),
        accounts.clone(),
    );

    let lifecycle = RequestLifecycle::new(requests.clone(), reviews.clone(), catalog);
    let dashboards = DashboardService::new(
        requests,
        reviews,
        accounts.clone(),
        connections,
        DashboardConfig {
            caretaker_recent: 2,
            ..DashboardConfig::default()
        },
    );
    (lifecycle, dashboards, accounts)
}

async fn register(accounts: &SurrealAccountRepository<Db>, role: Role, email: &str) -> Actor {
    let account = accounts
        .create(CreateAccount {
            principal_id: Uuid::new_v4(),
            email: email.into(),
            role,
            status: None,
        })
        .await
        .unwrap();
    Actor {
        principal_id: account.principal_id,
        email: account.email,
        role,
    }
}

/// Offer `name` as `caretaker` and connect `nri` if not already.
/// Returns the new service's id.
async fn offer(lifecycle: &Lifecycle, caretaker: &Actor, nri: &Actor, name: &str) -> Uuid {
    let catalog = lifecycle.catalog();
    let service = catalog
        .create_service(caretaker, ServiceDraft::named(name))
        .await
        .unwrap();
    let code = catalog.caretaker_code(caretaker).await.unwrap();
    match catalog.connect(nri, &code).await {
        Ok(_) | Err(WorkflowError::AlreadyConnected) => {}
        Err(e) => panic!("connect failed: {e}"),
    }
    service.id
}

fn ask(service_id: Uuid) -> NewServiceRequest {
    NewServiceRequest {
        service_id,
        message: String::new(),
    }
}

#[tokio::test]
async fn caretaker_dashboard_counts_and_rating() {
    let (lifecycle, dashboards, accounts) = setup().await;
    let caretaker = register(&accounts, Role::Caretaker, "ravi@example.com").await;
    let meera = register(&accounts, Role::Nri, "meera@example.com").await;
    let anu = register(&accounts, Role::Nri, "anu@example.com").await;

    let empty = dashboards.caretaker(&caretaker).await.unwrap();
    assert_eq!(empty.counts.total, 0);
    assert_eq!(empty.average_rating, 0.0);

    let mut ids = Vec::new();
    for (nri, service) in [(&meera, "Inspection"), (&meera, "Rent"), (&anu, "Garden")] {
        let service_id = offer(&lifecycle, &caretaker, nri, service).await;
        ids.push(lifecycle.create_request(nri, ask(service_id)).await.unwrap().id);
    }
    for id in &ids[..2] {
        lifecycle
            .update_status(&caretaker, *id, StatusUpdate::to(RequestStatus::Completed))
            .await
            .unwrap();
    }
    lifecycle
        .submit_review(&meera, ids[0], ReviewInput { rating: 5, comment: None })
        .await
        .unwrap();
    lifecycle
        .submit_review(&meera, ids[1], ReviewInput { rating: 4, comment: None })
        .await
        .unwrap();

    let dash = dashboards.caretaker(&caretaker).await.unwrap();
    assert_eq!(dash.counts.total, 3);
    assert_eq!(dash.counts.completed, 2);
    assert_eq!(dash.counts.active, 1);
    assert_eq!(dash.counts.pending, 1);
    assert_eq!(dash.connected_nris, 2);
    assert_eq!(dash.review_count, 2);
    assert_eq!(dash.average_rating, 4.5);
    assert_eq!(dash.recent_requests.len(), 2);
}

#[tokio::test]
async fn nri_and_admin_dashboards() {
    let (lifecycle, dashboards, accounts) = setup().await;
    let admin = register(&accounts, Role::Admin, "admin@example.com").await;
    let ravi = register(&accounts, Role::Caretaker, "ravi@example.com").await;
    let anil = register(&accounts, Role::Caretaker, "anil@example.com").await;
    let meera = register(&accounts, Role::Nri, "meera@example.com").await;

    let inspection = offer(&lifecycle, &ravi, &meera, "Inspection").await;
    let garden = offer(&lifecycle, &anil, &meera, "Garden").await;

    // Linked but never asked for anything.
    let suresh = register(&accounts, Role::Caretaker, "suresh@example.com").await;
    offer(&lifecycle, &suresh, &meera, "Rent collection").await;

    let first = lifecycle.create_request(&meera, ask(inspection)).await.unwrap();
    lifecycle.create_request(&meera, ask(garden)).await.unwrap();
    lifecycle
        .update_status(&ravi, first.id, StatusUpdate::to(RequestStatus::InProgress))
        .await
        .unwrap();

    let dash = dashboards.nri(&meera).await.unwrap();
    assert_eq!(dash.counts.active, 2);
    assert_eq!(dash.counts.completed, 0);
    assert_eq!(dash.connected_caretakers, 3);
    assert_eq!(dash.recent_requests.len(), 2);

    let overview = dashboards.admin(&admin).await.unwrap();
    assert_eq!(overview.nri_accounts, 1);
    assert_eq!(overview.caretaker_accounts, 3);
    assert_eq!(overview.counts.total, 2);
    assert_eq!(overview.recent_activity.len(), 2);

    let err = dashboards.admin(&meera).await.unwrap_err();
    assert!(matches!(err, WorkflowError::RoleNotPermitted(Role::Nri)));
}
