//! REST API exposure
//!
//! Consumes the application state and the entity registry and produces the
//! Axum `Router`, including routes that do not follow the CRUD pattern.

use crate::server::entity_registry::EntityRegistry;
use crate::server::handlers::{current_user, dashboard};
use crate::server::state::AppState;
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};

/// REST API exposure implementation
pub struct RestExposure;

impl RestExposure {
    /// Build the REST router
    ///
    /// Returns a router with:
    /// - Health check routes
    /// - Collection CRUD routes
    /// - Dashboard and current-user routes
    /// - Custom routes
    pub fn build_router(
        state: AppState,
        registry: &EntityRegistry,
        custom_routes: Vec<Router>,
    ) -> Router {
        let health_routes = Self::health_routes();
        let entity_routes = registry.build_routes(state.clone());
        let api_routes = Self::api_routes(state);

        let mut app = health_routes.merge(entity_routes).merge(api_routes);

        for custom_router in custom_routes {
            app = app.merge(custom_router);
        }

        app
    }

    /// Routes outside the generic CRUD set
    fn api_routes(state: AppState) -> Router {
        Router::new()
            .route("/api/dashboard", get(dashboard))
            .route("/api/auth/me", get(current_user))
            .with_state(state)
    }

    /// Build health check routes
    fn health_routes() -> Router {
        Router::new()
            .route("/health", get(Self::health_check))
            .route("/healthz", get(Self::health_check))
    }

    /// Health check endpoint handler
    async fn health_check() -> Json<Value> {
        Json(json!({
            "status": "ok",
            "service": "medstock"
        }))
    }
}
