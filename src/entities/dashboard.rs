//! Dashboard summary derived from the inventory and staff collections
//!
//! Nothing here is stored. Every figure is recomputed from the full
//! collections on each request.

use crate::core::query::{SortOrder, sort_records};
use crate::entities::inventory::{ExpiryStatus, InventoryItem, InventorySortField};
use crate::entities::staff::{StaffMember, StaffSortField};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Tuning for the derived figures
#[derive(Debug, Clone, Copy)]
pub struct DashboardSettings {
    /// Items expiring within this window count as "expiring"
    pub expiry_window: Duration,
    /// Length of the recent inventory / staff lists
    pub recent_limit: usize,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            expiry_window: Duration::days(30),
            recent_limit: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    LowStock,
    Expiry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub title: String,
    pub message: String,
    pub severity: AlertSeverity,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub related_item_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_inventory: usize,
    pub total_staff: usize,
    pub active_staff: usize,
    pub low_stock_items: usize,
    pub expiring_items: usize,
    pub expired_items: usize,
    pub total_value: f64,
    pub recent_inventory: Vec<InventoryItem>,
    pub recent_staff: Vec<StaffMember>,
    pub alerts: Vec<Alert>,
}

impl DashboardSummary {
    pub fn compute(
        mut inventory: Vec<InventoryItem>,
        mut staff: Vec<StaffMember>,
        now: DateTime<Utc>,
        settings: DashboardSettings,
    ) -> Self {
        // Alerts follow name order so the list is stable between requests
        sort_records(&mut inventory, InventorySortField::Name, SortOrder::Ascending);

        let mut alerts = Vec::new();
        let mut low_stock_items = 0;
        let mut expiring_items = 0;
        let mut expired_items = 0;

        for item in &inventory {
            if item.is_low_stock() {
                low_stock_items += 1;
                alerts.push(Alert {
                    id: format!("low_stock-{}", item.id),
                    alert_type: AlertType::LowStock,
                    title: format!("Low stock: {}", item.name),
                    message: format!(
                        "{} {} left at {} (minimum {})",
                        item.quantity, item.unit, item.location, item.min_stock_level
                    ),
                    severity: if item.quantity == 0 {
                        AlertSeverity::High
                    } else {
                        AlertSeverity::Medium
                    },
                    is_read: false,
                    created_at: now,
                    related_item_id: item.id.clone(),
                });
            }

            let (severity, title) = match item.expiry_status(now, settings.expiry_window) {
                ExpiryStatus::Fresh => continue,
                ExpiryStatus::Expired => {
                    expired_items += 1;
                    (AlertSeverity::High, format!("Expired: {}", item.name))
                }
                ExpiryStatus::Expiring => {
                    expiring_items += 1;
                    (AlertSeverity::Medium, format!("Expiring soon: {}", item.name))
                }
            };
            alerts.push(Alert {
                id: format!("expiry-{}", item.id),
                alert_type: AlertType::Expiry,
                title,
                message: format!(
                    "{} at {} expires on {}",
                    item.name,
                    item.location,
                    item.expiry_date.format("%Y-%m-%d")
                ),
                severity,
                is_read: false,
                created_at: now,
                related_item_id: item.id.clone(),
            });
        }

        let total_value: f64 = inventory.iter().map(InventoryItem::total_value).sum();
        let active_staff = staff.iter().filter(|s| s.is_active).count();
        let total_inventory = inventory.len();
        let total_staff = staff.len();

        sort_records(&mut inventory, InventorySortField::CreatedAt, SortOrder::Descending);
        inventory.truncate(settings.recent_limit);
        sort_records(&mut staff, StaffSortField::CreatedAt, SortOrder::Descending);
        staff.truncate(settings.recent_limit);

        Self {
            total_inventory,
            total_staff,
            active_staff,
            low_stock_items,
            expiring_items,
            expired_items,
            total_value,
            recent_inventory: inventory,
            recent_staff: staff,
            alerts,
        }
    }
}
