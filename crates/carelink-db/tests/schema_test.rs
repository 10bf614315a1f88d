//! Integration tests for schema initialization using in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

#[tokio::test]
async fn schema_migration_applies_successfully() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    carelink_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("INFO FOR DB").await.unwrap();
    let info: Option<surrealdb_types::Value> = result.take(0).unwrap();
    let info = info.expect("INFO FOR DB should return a value");
    let info_str = format!("{:?}", info);

    for table in [
        "credential",
        "account",
        "caretaker_profile",
        "caretaker_link",
        "service",
        "service_request",
        "review",
        "_migration",
    ] {
        assert!(info_str.contains(table), "missing {table} table");
    }
}

#[tokio::test]
async fn migration_is_idempotent() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    carelink_db::run_migrations(&db).await.unwrap();
    carelink_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("SELECT * FROM _migration").await.unwrap();
    let records: Vec<surrealdb_types::Value> = result.take(0).unwrap();
    assert_eq!(records.len(), 1, "expected exactly one migration record");
}

#[tokio::test]
async fn account_role_is_constrained() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    carelink_db::run_migrations(&db).await.unwrap();

    let result = db
        .query("CREATE account SET email = 'x@example.com', role = 'landlord'")
        .await
        .unwrap()
        .check();

    assert!(result.is_err(), "unknown role should be rejected");
}

#[tokio::test]
async fn review_rating_is_constrained() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    carelink_db::run_migrations(&db).await.unwrap();

    let result = db
        .query(
            "CREATE review SET \
             service_request_id = 'r1', caretaker_id = 'c1', nri_id = 'n1', \
             nri_email = 'n@example.com', service_name = 'Inspection', \
             rating = 6, comment = ''",
        )
        .await
        .unwrap()
        .check();

    assert!(result.is_err(), "rating above 5 should be rejected");
}

#[tokio::test]
async fn unique_index_prevents_duplicate_reviews() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    carelink_db::run_migrations(&db).await.unwrap();

    let create = "CREATE review SET \
                  service_request_id = 'r1', caretaker_id = 'c1', nri_id = 'n1', \
                  nri_email = 'n@example.com', service_name = 'Inspection', \
                  rating = 4, comment = ''";

    db.query(create).await.unwrap().check().unwrap();

    let result = db.query(create).await.unwrap().check();
    assert!(result.is_err(), "second review for a request should be rejected");
}
