use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::Row;

use wardstock_core::domain::item::{InventoryItem, ItemId};
use wardstock_core::domain::location::LocationId;
use wardstock_core::domain::stock::{StockAdjustment, StockLevel};
use wardstock_core::errors::DomainError;

use super::{InventoryRepository, RepositoryError};
use crate::DbPool;

pub struct SqlInventoryRepository {
    pool: DbPool,
}

impl SqlInventoryRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const STOCK_SELECT: &str = "SELECT s.item_id, i.name AS item_name, s.location_id,
        l.name AS location_name, s.current_stock, s.minimum_stock, s.updated_at
     FROM stock_levels s
     JOIN inventory_items i ON i.id = s.item_id
     JOIN locations l ON l.id = s.location_id";

fn row_to_stock_level(row: &sqlx::sqlite::SqliteRow) -> Result<StockLevel, RepositoryError> {
    let item_id: String =
        row.try_get("item_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let item_name: String =
        row.try_get("item_name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let location_id: String =
        row.try_get("location_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let location_name: String =
        row.try_get("location_name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let current_stock: i64 =
        row.try_get("current_stock").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let minimum_stock: i64 =
        row.try_get("minimum_stock").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let updated_at_str: String =
        row.try_get("updated_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let updated_at = DateTime::parse_from_rfc3339(&updated_at_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now());

    Ok(StockLevel {
        item_id: ItemId(item_id),
        item_name,
        location_id: LocationId(location_id),
        location_name,
        current_stock,
        minimum_stock,
        updated_at,
    })
}

#[async_trait::async_trait]
impl InventoryRepository for SqlInventoryRepository {
    async fn list_stock(&self) -> Result<Vec<StockLevel>, RepositoryError> {
        let rows = sqlx::query(&format!("{STOCK_SELECT} ORDER BY l.name, i.name"))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_stock_level).collect()
    }

    async fn list_stock_by_location(
        &self,
        location_name: &str,
    ) -> Result<Vec<StockLevel>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "{STOCK_SELECT} WHERE LOWER(l.name) = LOWER(?) ORDER BY i.name"
        ))
        .bind(location_name)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_stock_level).collect()
    }

    async fn find_stock(
        &self,
        item_name: &str,
        location_name: &str,
    ) -> Result<Option<StockLevel>, RepositoryError> {
        let row = sqlx::query(&format!(
            "{STOCK_SELECT} WHERE LOWER(i.name) = LOWER(?) AND LOWER(l.name) = LOWER(?)"
        ))
        .bind(item_name)
        .bind(location_name)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_stock_level(r)?)),
            None => Ok(None),
        }
    }

    async fn stock_elsewhere(
        &self,
        item_id: &ItemId,
        excluding: &LocationId,
    ) -> Result<Vec<StockLevel>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "{STOCK_SELECT} WHERE s.item_id = ? AND s.location_id != ? ORDER BY l.name"
        ))
        .bind(&item_id.0)
        .bind(&excluding.0)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_stock_level).collect()
    }

    async fn list_below_minimum(&self) -> Result<Vec<StockLevel>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "{STOCK_SELECT} WHERE s.current_stock < s.minimum_stock ORDER BY l.name, i.name"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_stock_level).collect()
    }

    async fn find_item(&self, item_id: &ItemId) -> Result<Option<InventoryItem>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, name, category, unit_cost, created_at FROM inventory_items WHERE id = ?",
        )
        .bind(&item_id.0)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let id: String = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
        let name: String =
            row.try_get("name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
        let category: String =
            row.try_get("category").map_err(|e| RepositoryError::Decode(e.to_string()))?;
        let unit_cost_str: String =
            row.try_get("unit_cost").map_err(|e| RepositoryError::Decode(e.to_string()))?;
        let created_at_str: String =
            row.try_get("created_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;

        let unit_cost = unit_cost_str
            .parse::<Decimal>()
            .map_err(|e| RepositoryError::Decode(e.to_string()))?;
        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        Ok(Some(InventoryItem { id: ItemId(id), name, category, unit_cost, created_at }))
    }

    async fn adjust_quantity(
        &self,
        item_id: &ItemId,
        location_id: &LocationId,
        delta: i64,
    ) -> Result<StockAdjustment, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            "{STOCK_SELECT} WHERE s.item_id = ? AND s.location_id = ?"
        ))
        .bind(&item_id.0)
        .bind(&location_id.0)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(ref row) = row else {
            return Err(DomainError::UnknownItem(format!(
                "{} at {}",
                item_id.0, location_id.0
            ))
            .into());
        };
        let level = row_to_stock_level(row)?;

        let new_stock = level.current_stock + delta;
        if new_stock < 0 {
            return Err(DomainError::InsufficientStock {
                item: level.item_name,
                location: level.location_name,
                requested: -delta,
                available: level.current_stock,
            }
            .into());
        }

        sqlx::query(
            "UPDATE stock_levels SET current_stock = ?, updated_at = ?
             WHERE item_id = ? AND location_id = ?",
        )
        .bind(new_stock)
        .bind(Utc::now().to_rfc3339())
        .bind(&item_id.0)
        .bind(&location_id.0)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(StockAdjustment {
            item_id: level.item_id,
            item_name: level.item_name,
            location_id: level.location_id,
            location_name: level.location_name,
            previous_stock: level.current_stock,
            new_stock,
            minimum_stock: level.minimum_stock,
        })
    }
}
