//! Record kinds served by medstock, and their demo fixtures

pub mod dashboard;
pub mod inventory;
pub mod staff;

pub use dashboard::{Alert, DashboardSettings, DashboardSummary};
pub use inventory::{Category, InventoryItem, InventoryPatch, NewInventoryItem};
pub use staff::{NewStaffMember, StaffMember, StaffPatch, StaffRole};

use crate::core::auth::User;
use crate::core::error::AppResult;
use crate::core::record::Record;
use crate::core::service::{DocumentStore, RecordStore};
use serde_json::{Map, Value};
use std::sync::Arc;

async fn seed<R: Record>(
    store: &Arc<dyn DocumentStore>,
    fixtures: Vec<Map<String, Value>>,
    actor: &User,
) -> AppResult<usize> {
    let records = RecordStore::<R>::new(store.clone());
    let mut inserted = 0;
    for fields in fixtures {
        records.insert(fields, actor).await?;
        inserted += 1;
    }
    Ok(inserted)
}

/// Load the demo inventory and roster into an empty store
///
/// Fixtures go through the same validation as API writes. A store that
/// already holds inventory or staff is left untouched, so restarting
/// against a persistent backend never duplicates the fixtures. Returns the
/// number of inventory items and staff members inserted.
pub async fn seed_demo_data(
    store: Arc<dyn DocumentStore>,
    actor: &User,
) -> AppResult<(usize, usize)> {
    let existing_items = RecordStore::<InventoryItem>::new(store.clone()).fetch_all().await?;
    let existing_members = RecordStore::<StaffMember>::new(store.clone()).fetch_all().await?;
    if !existing_items.is_empty() || !existing_members.is_empty() {
        tracing::info!(
            backend = store.backend_name(),
            inventory = existing_items.len(),
            staff = existing_members.len(),
            "store already holds data, skipping demo seed"
        );
        return Ok((0, 0));
    }

    let items = seed::<InventoryItem>(&store, inventory::demo_fixtures(), actor).await?;
    let members = seed::<StaffMember>(&store, staff::demo_fixtures(), actor).await?;

    tracing::info!(
        backend = store.backend_name(),
        inventory = items,
        staff = members,
        "seeded demo data"
    );
    Ok((items, members))
}
