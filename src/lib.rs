//! # medstock
//!
//! Inventory and staff roster service for NGO field clinics.
//!
//! ## Features
//!
//! - **Two collections**: medical inventory and staff, each with full CRUD
//! - **List queries**: case-insensitive search, filters, sorting and pagination
//! - **Dashboard**: low-stock and expiry alerts derived on every request
//! - **Pluggable storage**: in-memory by default, MongoDB behind a feature flag
//! - **Pluggable identity**: demo user, trusted gateway headers, or none
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use medstock::prelude::*;
//!
//! let store = InMemoryDocumentStore::new();
//!
//! ServerBuilder::new()
//!     .with_document_store(store)
//!     .with_auth_provider(DemoAuthProvider::default())
//!     .serve("127.0.0.1:3000")
//!     .await?;
//! ```

pub mod config;
pub mod core;
pub mod entities;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        auth::{
            AuthContext, AuthProvider, DemoAuthProvider, NoAuthProvider,
            TrustedHeaderAuthProvider, User, UserRole,
        },
        document::{Document, StoreTimestamp},
        error::{
            AppError, AppResult, ConfigError, FieldValidationError, RecordError, RequestError,
            StorageError, ValidationError,
        },
        field::FieldValue,
        query::{
            ApiResponse, ListParams, ListQuery, PaginatedResponse, PaginationMeta, Queryable,
            SortOrder,
        },
        record::Record,
        service::{DocumentStore, RecordStore},
    };

    // === Records ===
    pub use crate::entities::{
        Alert, Category, DashboardSettings, DashboardSummary, InventoryItem, StaffMember,
        StaffRole, seed_demo_data,
    };

    // === Storage ===
    pub use crate::storage::{InMemoryDocumentStore, open_store};
    #[cfg(feature = "mongodb_backend")]
    pub use crate::storage::MongoDocumentStore;

    // === Config ===
    pub use crate::config::{AppConfig, AuthMode, StorageBackend};

    // === Server ===
    pub use crate::server::{EntityDescriptor, EntityRegistry, ServerBuilder};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};

    // === Axum ===
    pub use axum::{
        Router,
        extract::{Path, State},
        http::HeaderMap,
        routing::{delete, get, post, put},
    };
}
