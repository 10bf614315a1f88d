//! Integration tests for the ServiceRequest and Review repositories using
//! in-memory SurrealDB.

use carelink_core::error::CarelinkError;
use carelink_core::models::review::CreateReview;
use carelink_core::models::service_request::{
    CreateServiceRequest, RequestStatus, ServiceRequestFilter, UpdateServiceRequestStatus,
};
use carelink_core::repository::{ReviewRepository, ServiceRequestRepository};
use carelink_db::repository::{SurrealReviewRepository, SurrealServiceRequestRepository};
use chrono::Utc;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    carelink_db::run_migrations(&db).await.unwrap();
    db
}

fn new_request(caretaker_id: Uuid, nri_id: Uuid) -> CreateServiceRequest {
    CreateServiceRequest {
        service_id: Uuid::new_v4(),
        service_name: "Rent collection".into(),
        caretaker_id,
        nri_id,
        nri_email: "owner@example.com".into(),
        message: "Please collect March rent".into(),
    }
}

#[tokio::test]
async fn create_request_starts_pending() {
    let repo = SurrealServiceRequestRepository::new(setup().await);

    let request = repo
        .create(new_request(Uuid::new_v4(), Uuid::new_v4()))
        .await
        .unwrap();

    assert_eq!(request.status, RequestStatus::Pending);
    assert!(!request.reviewed);
    assert!(request.completed_at.is_none());
    assert!(request.created_at.is_some());
    assert_eq!(request.remarks, "");
    assert_eq!(request.message, "Please collect March rent");

    let fetched = repo.get_by_id(request.id).await.unwrap();
    assert_eq!(fetched.id, request.id);
    assert_eq!(fetched.service_name, "Rent collection");
}

#[tokio::test]
async fn update_status_sets_and_clears_completed_at() {
    let repo = SurrealServiceRequestRepository::new(setup().await);
    let request = repo
        .create(new_request(Uuid::new_v4(), Uuid::new_v4()))
        .await
        .unwrap();

    let in_progress = repo
        .update_status(
            request.id,
            UpdateServiceRequestStatus {
                status: RequestStatus::InProgress,
                remarks: Some("Visiting on Friday".into()),
                proof: None,
                completed_at: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(in_progress.status, RequestStatus::InProgress);
    assert_eq!(in_progress.remarks, "Visiting on Friday");
    assert!(in_progress.completed_at.is_none());

    let completed = repo
        .update_status(
            request.id,
            UpdateServiceRequestStatus {
                status: RequestStatus::Completed,
                remarks: None,
                proof: Some("https://photos.example.com/receipt.jpg".into()),
                completed_at: Some(Utc::now()),
            },
        )
        .await
        .unwrap();
    assert_eq!(completed.status, RequestStatus::Completed);
    assert!(completed.completed_at.is_some());
    assert_eq!(completed.remarks, "Visiting on Friday");
    assert_eq!(completed.proof, "https://photos.example.com/receipt.jpg");
}

#[tokio::test]
async fn list_filters_by_party_and_status() {
    let repo = SurrealServiceRequestRepository::new(setup().await);
    let caretaker = Uuid::new_v4();
    let other_caretaker = Uuid::new_v4();
    let nri = Uuid::new_v4();

    let first = repo.create(new_request(caretaker, nri)).await.unwrap();
    repo.create(new_request(caretaker, Uuid::new_v4()))
        .await
        .unwrap();
    repo.create(new_request(other_caretaker, nri)).await.unwrap();

    repo.update_status(
        first.id,
        UpdateServiceRequestStatus {
            status: RequestStatus::Completed,
            remarks: None,
            proof: None,
            completed_at: Some(Utc::now()),
        },
    )
    .await
    .unwrap();

    let all = repo.list(ServiceRequestFilter::default()).await.unwrap();
    assert_eq!(all.len(), 3);

    let mine = repo
        .list(ServiceRequestFilter::for_caretaker(caretaker))
        .await
        .unwrap();
    assert_eq!(mine.len(), 2);

    let owned = repo.list(ServiceRequestFilter::for_nri(nri)).await.unwrap();
    assert_eq!(owned.len(), 2);

    let done = repo
        .list(ServiceRequestFilter::for_caretaker(caretaker).with_status(RequestStatus::Completed))
        .await
        .unwrap();
    assert_eq!(done.len(), 1);
    assert_eq!(done[0].id, first.id);
}

#[tokio::test]
async fn mark_reviewed_flips_flag() {
    let repo = SurrealServiceRequestRepository::new(setup().await);
    let request = repo
        .create(new_request(Uuid::new_v4(), Uuid::new_v4()))
        .await
        .unwrap();

    repo.mark_reviewed(request.id).await.unwrap();
    assert!(repo.get_by_id(request.id).await.unwrap().reviewed);

    let err = repo.mark_reviewed(Uuid::new_v4()).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn review_is_unique_per_request() {
    let db = setup().await;
    let reviews = SurrealReviewRepository::new(db);
    let request_id = Uuid::new_v4();
    let caretaker = Uuid::new_v4();

    let input = CreateReview {
        service_request_id: request_id,
        caretaker_id: caretaker,
        nri_id: Uuid::new_v4(),
        nri_email: "owner@example.com".into(),
        service_name: "Rent collection".into(),
        rating: 5,
        comment: "Prompt and thorough".into(),
    };

    let review = reviews.create(input.clone()).await.unwrap();
    assert_eq!(review.rating, 5);
    assert!(review.created_at.is_some());

    let err = reviews.create(input).await.unwrap_err();
    assert!(
        matches!(err, CarelinkError::AlreadyExists { .. }),
        "expected AlreadyExists, got: {err:?}"
    );

    let fetched = reviews.get_by_service_request(request_id).await.unwrap();
    assert_eq!(fetched.id, review.id);
    assert_eq!(reviews.list_by_caretaker(caretaker).await.unwrap().len(), 1);

    let missing = reviews
        .get_by_service_request(Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(missing.is_not_found());
}
