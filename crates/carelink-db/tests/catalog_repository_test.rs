//! Integration tests for the Service and Connection repositories using
//! in-memory SurrealDB.

use carelink_core::error::CarelinkError;
use carelink_core::models::service::{CreateService, UpdateService};
use carelink_core::repository::{ConnectionRepository, ServiceRepository};
use carelink_db::repository::{SurrealConnectionRepository, SurrealServiceRepository};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    carelink_db::run_migrations(&db).await.unwrap();
    db
}

fn new_service(caretaker_id: Uuid, name: &str) -> CreateService {
    CreateService {
        caretaker_id,
        name: name.into(),
        description: "Monthly walk-through with photos".into(),
        price: Some(1500.0),
        image: String::new(),
        is_active: true,
    }
}

#[tokio::test]
async fn create_update_and_delete_service() {
    let repo = SurrealServiceRepository::new(setup().await);
    let caretaker = Uuid::new_v4();

    let service = repo.create(new_service(caretaker, "Inspection")).await.unwrap();
    assert_eq!(service.caretaker_id, caretaker);
    assert_eq!(service.price, Some(1500.0));
    assert!(service.is_active);
    assert!(service.created_at.is_some());

    let updated = repo
        .update(
            service.id,
            UpdateService {
                name: Some("Property inspection".into()),
                price: Some(None),
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Property inspection");
    assert_eq!(updated.price, None);
    assert!(!updated.is_active);
    assert_eq!(updated.description, "Monthly walk-through with photos");

    repo.delete(service.id).await.unwrap();
    assert!(repo.get_by_id(service.id).await.unwrap_err().is_not_found());
    assert!(repo.delete(service.id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn updating_missing_service_is_not_found() {
    let repo = SurrealServiceRepository::new(setup().await);
    let err = repo
        .update(
            Uuid::new_v4(),
            UpdateService {
                is_active: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn list_by_caretaker_can_skip_inactive() {
    let repo = SurrealServiceRepository::new(setup().await);
    let caretaker = Uuid::new_v4();

    repo.create(new_service(caretaker, "Rent collection")).await.unwrap();
    let garden = repo.create(new_service(caretaker, "Garden upkeep")).await.unwrap();
    repo.create(new_service(Uuid::new_v4(), "Inspection")).await.unwrap();
    repo.update(
        garden.id,
        UpdateService {
            is_active: Some(false),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let all = repo.list_by_caretaker(caretaker, false).await.unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|s| s.caretaker_id == caretaker));

    let active = repo.list_by_caretaker(caretaker, true).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].name, "Rent collection");
}

#[tokio::test]
async fn caretaker_codes_are_unique() {
    let repo = SurrealConnectionRepository::new(setup().await);
    let ravi = Uuid::new_v4();

    let profile = repo.create_profile(ravi, "CT-AB12CD34".into()).await.unwrap();
    assert_eq!(profile.caretaker_id, ravi);
    assert_eq!(repo.get_profile(ravi).await.unwrap().code, "CT-AB12CD34");
    assert_eq!(repo.find_by_code("CT-AB12CD34").await.unwrap().caretaker_id, ravi);

    let err = repo
        .create_profile(Uuid::new_v4(), "CT-AB12CD34".into())
        .await
        .unwrap_err();
    assert!(matches!(err, CarelinkError::AlreadyExists { .. }), "got {err:?}");

    let err = repo.create_profile(ravi, "CT-ZZ99ZZ99".into()).await.unwrap_err();
    assert!(matches!(err, CarelinkError::AlreadyExists { .. }), "got {err:?}");

    assert!(repo.find_by_code("CT-00000000").await.unwrap_err().is_not_found());
    assert!(repo.get_profile(Uuid::new_v4()).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn links_are_unique_per_pair() {
    let repo = SurrealConnectionRepository::new(setup().await);
    let nri = Uuid::new_v4();
    let ravi = Uuid::new_v4();
    let anil = Uuid::new_v4();

    assert!(!repo.is_linked(nri, ravi).await.unwrap());

    let link = repo.link(nri, ravi).await.unwrap();
    assert_eq!(link.caretaker_id, ravi);
    assert!(repo.is_linked(nri, ravi).await.unwrap());
    assert!(!repo.is_linked(ravi, nri).await.unwrap());

    let err = repo.link(nri, ravi).await.unwrap_err();
    assert!(matches!(err, CarelinkError::AlreadyExists { .. }), "got {err:?}");

    repo.link(nri, anil).await.unwrap();
    let links = repo.links_for_nri(nri).await.unwrap();
    assert_eq!(links.len(), 2);
    assert!(repo.links_for_nri(Uuid::new_v4()).await.unwrap().is_empty());
}
