use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::Row;

use wardstock_core::domain::item::ItemId;
use wardstock_core::domain::location::LocationId;
use wardstock_core::domain::order::{
    PendingOrder, PendingOrderId, PendingOrderStatus, PurchaseOrder, PurchaseOrderId,
    PurchaseOrderStatus,
};

use super::{OrderRepository, RepositoryError};
use crate::DbPool;

pub struct SqlOrderRepository {
    pool: DbPool,
}

impl SqlOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn row_to_purchase_order(row: &sqlx::sqlite::SqliteRow) -> Result<PurchaseOrder, RepositoryError> {
    let id: String = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let item_id: String =
        row.try_get("item_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let location_id: String =
        row.try_get("location_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let quantity: i64 =
        row.try_get("quantity").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let status_str: String =
        row.try_get("status").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let estimated_cost_str: String =
        row.try_get("estimated_cost").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let estimated_delivery_str: Option<String> =
        row.try_get("estimated_delivery").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let requested_by: String =
        row.try_get("requested_by").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let created_at_str: String =
        row.try_get("created_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let estimated_cost = estimated_cost_str
        .parse::<Decimal>()
        .map_err(|e| RepositoryError::Decode(e.to_string()))?;

    Ok(PurchaseOrder {
        id: PurchaseOrderId(id),
        item_id: ItemId(item_id),
        location_id: LocationId(location_id),
        quantity,
        status: status_str.parse().unwrap_or(PurchaseOrderStatus::Placed),
        estimated_cost,
        estimated_delivery: estimated_delivery_str.as_deref().map(parse_timestamp),
        requested_by,
        created_at: parse_timestamp(&created_at_str),
    })
}

fn row_to_pending_order(row: &sqlx::sqlite::SqliteRow) -> Result<PendingOrder, RepositoryError> {
    let id: String = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let item_id: String =
        row.try_get("item_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let item_name: String =
        row.try_get("item_name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let location_id: String =
        row.try_get("location_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let location_name: String =
        row.try_get("location_name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let quantity: i64 =
        row.try_get("quantity").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let status_str: String =
        row.try_get("status").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let reason: String =
        row.try_get("reason").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let requires_manager_approval: i64 = row
        .try_get("requires_manager_approval")
        .map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let rejected_by: String =
        row.try_get("rejected_by").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let rejected_at_str: String =
        row.try_get("rejected_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    Ok(PendingOrder {
        id: PendingOrderId(id),
        item_id: ItemId(item_id),
        item_name,
        location_id: LocationId(location_id),
        location_name,
        quantity,
        status: status_str.parse().unwrap_or(PendingOrderStatus::Pending),
        reason,
        requires_manager_approval: requires_manager_approval != 0,
        rejected_by,
        rejected_at: parse_timestamp(&rejected_at_str),
    })
}

#[async_trait::async_trait]
impl OrderRepository for SqlOrderRepository {
    async fn place_purchase_order(&self, order: &PurchaseOrder) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO purchase_orders (id, item_id, location_id, quantity, status,
                                          estimated_cost, estimated_delivery, requested_by, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&order.id.0)
        .bind(&order.item_id.0)
        .bind(&order.location_id.0)
        .bind(order.quantity)
        .bind(order.status.as_str())
        .bind(order.estimated_cost.to_string())
        .bind(order.estimated_delivery.map(|dt| dt.to_rfc3339()))
        .bind(&order.requested_by)
        .bind(order.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_purchase_orders(
        &self,
        status: Option<PurchaseOrderStatus>,
        limit: u32,
    ) -> Result<Vec<PurchaseOrder>, RepositoryError> {
        let rows = if let Some(status) = status {
            sqlx::query(
                "SELECT id, item_id, location_id, quantity, status, estimated_cost,
                        estimated_delivery, requested_by, created_at
                 FROM purchase_orders WHERE status = ? ORDER BY created_at DESC LIMIT ?",
            )
            .bind(status.as_str())
            .bind(limit)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query(
                "SELECT id, item_id, location_id, quantity, status, estimated_cost,
                        estimated_delivery, requested_by, created_at
                 FROM purchase_orders ORDER BY created_at DESC LIMIT ?",
            )
            .bind(limit)
            .fetch_all(&self.pool)
            .await?
        };

        rows.iter().map(row_to_purchase_order).collect()
    }

    async fn file_pending_order(&self, order: &PendingOrder) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO pending_orders (id, item_id, location_id, quantity, status, reason,
                                         requires_manager_approval, rejected_by, rejected_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&order.id.0)
        .bind(&order.item_id.0)
        .bind(&order.location_id.0)
        .bind(order.quantity)
        .bind(order.status.as_str())
        .bind(&order.reason)
        .bind(i64::from(order.requires_manager_approval))
        .bind(&order.rejected_by)
        .bind(order.rejected_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_pending_orders(&self, limit: u32) -> Result<Vec<PendingOrder>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT p.id, p.item_id, i.name AS item_name, p.location_id,
                    l.name AS location_name, p.quantity, p.status, p.reason,
                    p.requires_manager_approval, p.rejected_by, p.rejected_at
             FROM pending_orders p
             JOIN inventory_items i ON i.id = p.item_id
             JOIN locations l ON l.id = p.location_id
             WHERE p.status = 'pending'
             ORDER BY p.rejected_at ASC
             LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_pending_order).collect()
    }
}
