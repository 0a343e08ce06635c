use chrono::{DateTime, Utc};
use sqlx::Row;

use wardstock_core::domain::item::ItemId;
use wardstock_core::domain::location::LocationId;
use wardstock_core::domain::transfer::{Transfer, TransferId, TransferStatus};
use wardstock_core::errors::DomainError;

use super::{RepositoryError, TransferRepository};
use crate::DbPool;

pub struct SqlTransferRepository {
    pool: DbPool,
}

impl SqlTransferRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_transfer(row: &sqlx::sqlite::SqliteRow) -> Result<Transfer, RepositoryError> {
    let id: String = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let item_id: String =
        row.try_get("item_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let from_location_id: String =
        row.try_get("from_location_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let to_location_id: String =
        row.try_get("to_location_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let quantity: i64 =
        row.try_get("quantity").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let status_str: String =
        row.try_get("status").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let requested_by: String =
        row.try_get("requested_by").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let created_at_str: String =
        row.try_get("created_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let created_at = DateTime::parse_from_rfc3339(&created_at_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now());
    let status = status_str.parse().unwrap_or(TransferStatus::Completed);

    Ok(Transfer {
        id: TransferId(id),
        item_id: ItemId(item_id),
        from_location_id: LocationId(from_location_id),
        to_location_id: LocationId(to_location_id),
        quantity,
        status,
        requested_by,
        created_at,
    })
}

#[async_trait::async_trait]
impl TransferRepository for SqlTransferRepository {
    async fn execute_transfer(&self, transfer: &Transfer) -> Result<(), RepositoryError> {
        if transfer.quantity <= 0 {
            return Err(DomainError::InvariantViolation(
                "transfer quantity must be positive".to_string(),
            )
            .into());
        }
        if transfer.from_location_id == transfer.to_location_id {
            return Err(DomainError::InvariantViolation(
                "transfer source and destination must differ".to_string(),
            )
            .into());
        }

        let mut tx = self.pool.begin().await?;

        let source = sqlx::query(
            "SELECT s.current_stock, i.name AS item_name, l.name AS location_name
             FROM stock_levels s
             JOIN inventory_items i ON i.id = s.item_id
             JOIN locations l ON l.id = s.location_id
             WHERE s.item_id = ? AND s.location_id = ?",
        )
        .bind(&transfer.item_id.0)
        .bind(&transfer.from_location_id.0)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(source) = source else {
            return Err(DomainError::UnknownItem(format!(
                "{} at {}",
                transfer.item_id.0, transfer.from_location_id.0
            ))
            .into());
        };

        let available: i64 =
            source.try_get("current_stock").map_err(|e| RepositoryError::Decode(e.to_string()))?;
        if available < transfer.quantity {
            let item: String =
                source.try_get("item_name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
            let location: String = source
                .try_get("location_name")
                .map_err(|e| RepositoryError::Decode(e.to_string()))?;
            return Err(DomainError::InsufficientStock {
                item,
                location,
                requested: transfer.quantity,
                available,
            }
            .into());
        }

        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "UPDATE stock_levels SET current_stock = current_stock - ?, updated_at = ?
             WHERE item_id = ? AND location_id = ?",
        )
        .bind(transfer.quantity)
        .bind(&now)
        .bind(&transfer.item_id.0)
        .bind(&transfer.from_location_id.0)
        .execute(&mut *tx)
        .await?;

        let incremented = sqlx::query(
            "UPDATE stock_levels SET current_stock = current_stock + ?, updated_at = ?
             WHERE item_id = ? AND location_id = ?",
        )
        .bind(transfer.quantity)
        .bind(&now)
        .bind(&transfer.item_id.0)
        .bind(&transfer.to_location_id.0)
        .execute(&mut *tx)
        .await?;

        if incremented.rows_affected() == 0 {
            // Destination has no stock row for this item yet.
            sqlx::query(
                "INSERT INTO stock_levels (item_id, location_id, current_stock, minimum_stock, updated_at)
                 VALUES (?, ?, ?, 0, ?)",
            )
            .bind(&transfer.item_id.0)
            .bind(&transfer.to_location_id.0)
            .bind(transfer.quantity)
            .bind(&now)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            "INSERT INTO transfers (id, item_id, from_location_id, to_location_id,
                                    quantity, status, requested_by, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&transfer.id.0)
        .bind(&transfer.item_id.0)
        .bind(&transfer.from_location_id.0)
        .bind(&transfer.to_location_id.0)
        .bind(transfer.quantity)
        .bind(transfer.status.as_str())
        .bind(&transfer.requested_by)
        .bind(transfer.created_at.to_rfc3339())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &TransferId) -> Result<Option<Transfer>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, item_id, from_location_id, to_location_id, quantity, status,
                    requested_by, created_at
             FROM transfers WHERE id = ?",
        )
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_transfer(r)?)),
            None => Ok(None),
        }
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<Transfer>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, item_id, from_location_id, to_location_id, quantity, status,
                    requested_by, created_at
             FROM transfers ORDER BY created_at DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_transfer).collect()
    }
}
