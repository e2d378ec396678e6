//! Entity registry for managing record descriptors and generating CRUD routes

use crate::core::query::Queryable;
use crate::server::handlers::{
    create_record, delete_record, get_record, list_records, update_record,
};
use crate::server::state::AppState;
use axum::{Router, routing::get};
use std::collections::BTreeMap;
use std::marker::PhantomData;

/// Trait that describes how to build routes for a record collection
pub trait EntityDescriptor: Send + Sync {
    /// The collection name (e.g., "inventory")
    fn collection(&self) -> &str;

    /// Build the CRUD routes for this collection
    ///
    /// Should return a Router with routes like:
    /// - GET / POST /api/{collection}
    /// - GET / PUT / DELETE /api/{collection}/{id}
    fn build_routes(&self, state: AppState) -> Router;
}

/// Descriptor mounting the generic CRUD handlers for one record kind
pub struct RecordDescriptor<R> {
    _record: PhantomData<fn() -> R>,
}

impl<R> RecordDescriptor<R> {
    pub fn new() -> Self {
        Self {
            _record: PhantomData,
        }
    }
}

impl<R> Default for RecordDescriptor<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Queryable> EntityDescriptor for RecordDescriptor<R> {
    fn collection(&self) -> &str {
        R::collection_name()
    }

    fn build_routes(&self, state: AppState) -> Router {
        let collection = R::collection_name();
        Router::new()
            .route(
                &format!("/api/{}", collection),
                get(list_records::<R>).post(create_record::<R>),
            )
            .route(
                &format!("/api/{}/{{id}}", collection),
                get(get_record::<R>)
                    .put(update_record::<R>)
                    .delete(delete_record::<R>),
            )
            .with_state(state)
    }
}

/// Registry for all record collections in the application
#[derive(Default)]
pub struct EntityRegistry {
    descriptors: BTreeMap<String, Box<dyn EntityDescriptor>>,
}

impl EntityRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity descriptor
    ///
    /// The collection name is used as the key.
    pub fn register(&mut self, descriptor: Box<dyn EntityDescriptor>) {
        let collection = descriptor.collection().to_string();
        self.descriptors.insert(collection, descriptor);
    }

    /// Register the generic CRUD routes for a record kind
    pub fn register_record<R: Queryable>(&mut self) {
        self.register(Box::new(RecordDescriptor::<R>::new()));
    }

    /// Build a router with all registered collection routes
    pub fn build_routes(&self, state: AppState) -> Router {
        self.descriptors
            .values()
            .fold(Router::new(), |router, descriptor| {
                router.merge(descriptor.build_routes(state.clone()))
            })
    }

    /// Get all registered collections, in name order
    pub fn collections(&self) -> Vec<&str> {
        self.descriptors.keys().map(|s| s.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{InventoryItem, StaffMember};

    #[test]
    fn test_new_registry_is_empty() {
        let registry = EntityRegistry::new();
        assert!(registry.collections().is_empty());
    }

    #[test]
    fn test_register_records() {
        let mut registry = EntityRegistry::new();
        registry.register_record::<StaffMember>();
        registry.register_record::<InventoryItem>();
        assert_eq!(registry.collections(), vec!["inventory", "staff"]);
    }

    #[test]
    fn test_register_same_collection_twice_keeps_one() {
        let mut registry = EntityRegistry::new();
        registry.register_record::<InventoryItem>();
        registry.register_record::<InventoryItem>();
        assert_eq!(registry.collections().len(), 1);
    }
}
