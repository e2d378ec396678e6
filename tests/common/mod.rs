//! Shared helpers for the HTTP integration tests
//!
//! Every helper builds its own store, so tests never share state.

#![allow(dead_code)]

use axum_test::TestServer;
use medstock::prelude::*;
use serde_json::{Map, Value, json};
use std::sync::Arc;

/// A test server backed by a fresh in-memory store, acting as the demo user
pub fn demo_server() -> (TestServer, Arc<InMemoryDocumentStore>) {
    let store = Arc::new(InMemoryDocumentStore::new());
    let shared: Arc<dyn DocumentStore> = store.clone();
    let server = server_with(Some(shared), Arc::new(DemoAuthProvider::default()));
    (server, store)
}

/// A test server over an arbitrary store and auth provider
pub fn server_with(
    store: Option<Arc<dyn DocumentStore>>,
    auth: Arc<dyn AuthProvider>,
) -> TestServer {
    let app = ServerBuilder::new()
        .with_shared_store(store)
        .with_shared_auth_provider(auth)
        .build()
        .expect("Failed to build app");

    TestServer::try_new(app).expect("Failed to create test server")
}

/// A complete inventory payload
pub fn inventory_payload(name: &str, category: &str) -> Value {
    json!({
        "name": name,
        "quantity": 40,
        "cost": 2.5,
        "location": "Central Warehouse",
        "expiryDate": "2030-06-30",
        "purpose": "Field clinic stock",
        "category": category,
        "minStockLevel": 10,
        "unit": "boxes",
        "donor": "Relief Trust"
    })
}

/// A complete staff payload
pub fn staff_payload(name: &str, role: &str) -> Value {
    json!({
        "name": name,
        "role": role,
        "specialty": "General Medicine",
        "shiftStart": "09:00",
        "shiftEnd": "17:00",
        "patientsServed": 12,
        "location": "Clinic A",
        "contactNumber": "+91-9876543210",
        "email": "someone@jsf.org",
        "isActive": true
    })
}

pub fn as_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {}", other),
    }
}

/// Insert records straight through the adapter, skipping HTTP
pub async fn insert_records<R: Record>(
    store: &Arc<InMemoryDocumentStore>,
    payloads: Vec<Value>,
) -> Vec<R> {
    let records = RecordStore::<R>::new(store.clone());
    let mut created = Vec::new();
    for payload in payloads {
        created.push(
            records
                .insert(as_object(payload), &User::demo())
                .await
                .expect("insert failed"),
        );
    }
    created
}

pub async fn insert_inventory(
    store: &Arc<InMemoryDocumentStore>,
    payloads: Vec<Value>,
) -> Vec<InventoryItem> {
    insert_records(store, payloads).await
}

pub async fn insert_staff(
    store: &Arc<InMemoryDocumentStore>,
    payloads: Vec<Value>,
) -> Vec<StaffMember> {
    insert_records(store, payloads).await
}
