//! Server module for building the HTTP service
//!
//! `ServerBuilder` registers:
//! - CRUD routes for the inventory and staff collections
//! - Dashboard and current-user routes
//! - Health check routes

pub mod builder;
pub mod entity_registry;
pub mod exposure;
pub mod extractors;
pub mod handlers;
pub mod state;

pub use builder::ServerBuilder;
pub use entity_registry::{EntityDescriptor, EntityRegistry, RecordDescriptor};
pub use extractors::CurrentUser;
pub use state::AppState;
