use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::item::ItemId;
use crate::domain::location::LocationId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PurchaseOrderId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseOrderStatus {
    Placed,
    Delivered,
    Cancelled,
}

/// A reorder that was approved in chat and placed against the supplier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: PurchaseOrderId,
    pub item_id: ItemId,
    pub location_id: LocationId,
    pub quantity: i64,
    pub status: PurchaseOrderStatus,
    pub estimated_cost: Decimal,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub requested_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PendingOrderId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingOrderStatus {
    Pending,
    Resolved,
}

/// A reorder that was rejected in chat and deferred to a manager. Filed
/// once per rejection; resolution happens outside the chat workflow.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingOrder {
    pub id: PendingOrderId,
    pub item_id: ItemId,
    pub item_name: String,
    pub location_id: LocationId,
    pub location_name: String,
    pub quantity: i64,
    pub status: PendingOrderStatus,
    pub reason: String,
    pub requires_manager_approval: bool,
    pub rejected_by: String,
    pub rejected_at: DateTime<Utc>,
}

impl PurchaseOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Placed => "placed",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for PurchaseOrderStatus {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            _ => Ok(Self::Placed),
        }
    }
}

impl PendingOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Resolved => "resolved",
        }
    }
}

impl std::str::FromStr for PendingOrderStatus {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "resolved" => Ok(Self::Resolved),
            _ => Ok(Self::Pending),
        }
    }
}
