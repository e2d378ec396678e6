//! Core module containing the fundamental traits and types of the service

pub mod auth;
pub mod document;
pub mod error;
pub mod field;
pub mod query;
pub mod record;
pub mod service;
pub mod validation;

pub use auth::{
    AuthContext, AuthError, AuthProvider, DemoAuthProvider, NoAuthProvider,
    TrustedHeaderAuthProvider, User, UserRole,
};
pub use document::{Document, StoreTimestamp};
pub use error::{AppError, AppResult};
pub use field::FieldValue;
pub use query::{
    ApiResponse, ListParams, ListQuery, PaginatedResponse, PaginationMeta, QueryPage, Queryable,
    SortOrder,
};
pub use record::Record;
pub use service::{DocumentStore, RecordStore};
