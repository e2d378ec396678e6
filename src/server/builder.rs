//! ServerBuilder for fluent API to build HTTP servers

use super::entity_registry::EntityRegistry;
use super::exposure::RestExposure;
use super::state::AppState;
use crate::core::auth::AuthProvider;
use crate::core::service::DocumentStore;
use crate::entities::{DashboardSettings, InventoryItem, StaffMember};
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builder for the medstock HTTP server
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_document_store(InMemoryDocumentStore::new())
///     .with_auth_provider(DemoAuthProvider::default())
///     .build()?;
/// ```
pub struct ServerBuilder {
    store: Option<Arc<dyn DocumentStore>>,
    auth: Option<Arc<dyn AuthProvider>>,
    dashboard: DashboardSettings,
    entity_registry: EntityRegistry,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder with the inventory and staff collections
    /// registered
    pub fn new() -> Self {
        let mut entity_registry = EntityRegistry::new();
        entity_registry.register_record::<InventoryItem>();
        entity_registry.register_record::<StaffMember>();

        Self {
            store: None,
            auth: None,
            dashboard: DashboardSettings::default(),
            entity_registry,
            custom_routes: Vec::new(),
        }
    }

    /// Set the document store
    ///
    /// Without a store the server still builds; data routes then answer
    /// `STORE_UNAVAILABLE`.
    pub fn with_document_store(self, store: impl DocumentStore + 'static) -> Self {
        self.with_shared_store(Some(Arc::new(store)))
    }

    /// Set an already shared document store, or none at all
    pub fn with_shared_store(mut self, store: Option<Arc<dyn DocumentStore>>) -> Self {
        self.store = store;
        self
    }

    /// Set the auth provider (required)
    pub fn with_auth_provider(mut self, provider: impl AuthProvider + 'static) -> Self {
        self.auth = Some(Arc::new(provider));
        self
    }

    /// Set an already shared auth provider
    pub fn with_shared_auth_provider(mut self, provider: Arc<dyn AuthProvider>) -> Self {
        self.auth = Some(provider);
        self
    }

    pub fn with_dashboard_settings(mut self, settings: DashboardSettings) -> Self {
        self.dashboard = settings;
        self
    }

    /// Add custom routes to the server
    ///
    /// Use this for routes that don't fit the CRUD pattern, such as
    /// reports or exports.
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Build the final REST router with tracing and CORS layers
    pub fn build(self) -> Result<Router> {
        let auth = self.auth.ok_or_else(|| {
            anyhow::anyhow!("AuthProvider is required. Call .with_auth_provider()")
        })?;

        match &self.store {
            Some(store) => tracing::info!(backend = store.backend_name(), "document store ready"),
            None => tracing::warn!("no document store configured, data routes will fail"),
        }

        let state = AppState {
            store: self.store,
            auth,
            dashboard: self.dashboard,
        };

        let app = RestExposure::build_router(state, &self.entity_registry, self.custom_routes);

        Ok(app.layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        ))
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to the provided address
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    ///
    /// # Example
    ///
    /// ```ignore
    /// ServerBuilder::new()
    ///     .with_document_store(store)
    ///     .with_auth_provider(DemoAuthProvider::default())
    ///     .serve("127.0.0.1:3000").await?;
    /// ```
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
