//! Record store adapter behaviour against healthy, failing and missing stores

mod common;

use async_trait::async_trait;
use axum::http::StatusCode;
use common::*;
use medstock::prelude::*;
use serde_json::{Map, Value, json};
use std::sync::Arc;

/// A store whose every call fails, standing in for a broken backend
struct BrokenStore;

#[async_trait]
impl DocumentStore for BrokenStore {
    fn backend_name(&self) -> &'static str {
        "broken"
    }

    async fn fetch_all(&self, _collection: &str) -> anyhow::Result<Vec<Document>> {
        anyhow::bail!("connection reset")
    }

    async fn fetch(&self, _collection: &str, _id: &str) -> anyhow::Result<Option<Document>> {
        anyhow::bail!("connection reset")
    }

    async fn insert(
        &self,
        _collection: &str,
        _fields: Map<String, Value>,
    ) -> anyhow::Result<Document> {
        anyhow::bail!("disk full")
    }

    async fn merge(
        &self,
        _collection: &str,
        _id: &str,
        _fields: Map<String, Value>,
    ) -> anyhow::Result<Option<Document>> {
        anyhow::bail!("disk full")
    }

    async fn delete(&self, _collection: &str, _id: &str) -> anyhow::Result<bool> {
        anyhow::bail!("disk full")
    }
}

fn broken_server() -> axum_test::TestServer {
    server_with(Some(Arc::new(BrokenStore)), Arc::new(DemoAuthProvider::default()))
}

// =============================================================================
// Failing Store Tests
// =============================================================================

mod failing_store_tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_fail_with_read_failure() {
        let server = broken_server();

        for path in ["/api/inventory", "/api/staff/abc", "/api/dashboard"] {
            let response = server.get(path).await;
            response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
            let body: Value = response.json();
            assert_eq!(body["success"], false);
            assert_eq!(body["code"], "READ_FAILURE", "path {}", path);
        }
    }

    #[tokio::test]
    async fn test_writes_fail_with_write_failure() {
        let server = broken_server();

        let response = server
            .post("/api/inventory")
            .json(&inventory_payload("Gloves", "supplies"))
            .await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = response.json();
        assert_eq!(body["code"], "WRITE_FAILURE");

        let response = server.delete("/api/inventory/abc").await;
        let body: Value = response.json();
        assert_eq!(body["code"], "WRITE_FAILURE");
    }

    #[tokio::test]
    async fn test_seeding_an_unreachable_store_is_an_error_not_a_crash() {
        let err = seed_demo_data(Arc::new(BrokenStore), &User::demo())
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "READ_FAILURE");

        let server = broken_server();
        server.get("/health").await.assert_status_ok();
    }

    #[tokio::test]
    async fn test_validation_runs_before_the_store() {
        let server = broken_server();

        let response = server.post("/api/inventory").json(&json!({ "name": "x" })).await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let response = server.get("/api/inventory?limit=0").await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }
}

// =============================================================================
// Missing Store Tests
// =============================================================================

mod missing_store_tests {
    use super::*;

    #[tokio::test]
    async fn test_every_data_route_reports_store_unavailable() {
        let server = server_with(None, Arc::new(DemoAuthProvider::default()));

        let responses = vec![
            server.get("/api/inventory").await,
            server.get("/api/staff/abc").await,
            server.post("/api/staff").json(&staff_payload("A", "nurse")).await,
            server.put("/api/staff/abc").json(&json!({ "name": "B" })).await,
            server.delete("/api/inventory/abc").await,
            server.get("/api/dashboard").await,
        ];

        for response in responses {
            response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
            let body: Value = response.json();
            assert_eq!(body["code"], "STORE_UNAVAILABLE");
        }
    }

    #[tokio::test]
    async fn test_adapter_without_store() {
        let records = RecordStore::<StaffMember>::unavailable();

        let err = records.fetch_all().await.unwrap_err();
        assert!(matches!(err, AppError::Storage(StorageError::Unavailable { .. })));
    }
}

// =============================================================================
// Document Conversion Tests
// =============================================================================

mod conversion_tests {
    use super::*;

    fn document(id: &str, fields: Value, seconds: i64) -> Document {
        Document {
            id: id.to_string(),
            fields: as_object(fields),
            create_time: StoreTimestamp { seconds, nanos: 0 },
            update_time: StoreTimestamp { seconds: seconds + 60, nanos: 0 },
        }
    }

    #[tokio::test]
    async fn test_store_timestamps_become_record_timestamps() {
        let store = Arc::new(InMemoryDocumentStore::new());
        store
            .put_document(
                "inventory",
                document(
                    "legacy-1",
                    json!({
                        "name": "Old stock",
                        "quantity": 5,
                        "location": "Depot",
                        "expiryDate": { "seconds": 1_900_000_000, "nanos": 0 },
                        "purpose": "Reserve",
                        "category": "medicine",
                        "unit": "vials"
                    }),
                    1_700_000_000,
                ),
            )
            .unwrap();

        let item = RecordStore::<InventoryItem>::new(store).get("legacy-1").await.unwrap();

        assert_eq!(item.created_at.timestamp(), 1_700_000_000);
        assert_eq!(item.updated_at.timestamp(), 1_700_000_060);
        assert_eq!(item.expiry_date.timestamp(), 1_900_000_000);
        assert_eq!(item.cost, 0.0);
        assert_eq!(item.min_stock_level, 0);
        assert_eq!(item.donor, "");
    }

    #[tokio::test]
    async fn test_date_strings_are_accepted_in_stored_documents() {
        let store = Arc::new(InMemoryDocumentStore::new());
        store
            .put_document(
                "inventory",
                document(
                    "legacy-2",
                    json!({
                        "name": "Old stock",
                        "quantity": 5,
                        "location": "Depot",
                        "expiryDate": "2031-03-01",
                        "purpose": "Reserve",
                        "category": "supplies",
                        "unit": "rolls"
                    }),
                    1_700_000_000,
                ),
            )
            .unwrap();

        let item = RecordStore::<InventoryItem>::new(store).get("legacy-2").await.unwrap();
        assert_eq!(item.expiry_date.format("%Y-%m-%d").to_string(), "2031-03-01");
    }

    #[tokio::test]
    async fn test_one_broken_document_fails_the_whole_read() {
        let store = Arc::new(InMemoryDocumentStore::new());
        insert_inventory(&store, vec![inventory_payload("Fine", "medicine")]).await;
        store
            .put_document("inventory", document("bad", json!({ "name": "No quantity" }), 1))
            .unwrap();

        let err = RecordStore::<InventoryItem>::new(store).fetch_all().await.unwrap_err();
        assert!(matches!(err, AppError::Storage(StorageError::ReadFailure { .. })));
    }
}

// =============================================================================
// Write Validation Tests
// =============================================================================

mod write_validation_tests {
    use super::*;

    #[tokio::test]
    async fn test_zero_quantity_counts_as_present() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let mut payload = inventory_payload("Empty shelf", "supplies");
        payload["quantity"] = json!(0);

        let created = insert_inventory(&store, vec![payload]).await;
        assert_eq!(created[0].quantity, 0);
    }

    #[tokio::test]
    async fn test_strings_are_trimmed_before_checks() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let records = RecordStore::<InventoryItem>::new(store);

        let mut payload = inventory_payload("  Padded name  ", "medicine");
        payload["unit"] = json!("   ");

        let err = records
            .insert(as_object(payload.clone()), &User::demo())
            .await
            .unwrap_err();
        match err {
            AppError::Validation(ValidationError::MissingFields(fields)) => {
                assert_eq!(fields, vec!["unit".to_string()]);
            }
            other => panic!("expected MissingFields, got {:?}", other),
        }

        payload["unit"] = json!("boxes");
        let item = records.insert(as_object(payload), &User::demo()).await.unwrap();
        assert_eq!(item.name, "Padded name");
    }

    #[tokio::test]
    async fn test_blank_required_field_in_update_is_rejected() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let created = insert_inventory(&store, vec![inventory_payload("Masks", "supplies")]).await;
        let records = RecordStore::<InventoryItem>::new(store);

        let err = records
            .update(&created[0].id, as_object(json!({ "name": "" })))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::MissingFields(_))
        ));
    }

    #[tokio::test]
    async fn test_each_update_advances_updated_at() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let created = insert_inventory(&store, vec![inventory_payload("Masks", "supplies")]).await;
        let records = RecordStore::<InventoryItem>::new(store);

        let mut previous = created[0].updated_at;
        for quantity in [1, 2, 3] {
            let updated = records
                .update(&created[0].id, as_object(json!({ "quantity": quantity })))
                .await
                .unwrap();
            assert!(updated.updated_at > previous);
            assert_eq!(updated.created_at, created[0].created_at);
            previous = updated.updated_at;
        }
    }
}
