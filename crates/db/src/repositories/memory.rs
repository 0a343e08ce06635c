use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use wardstock_core::domain::item::{InventoryItem, ItemId};
use wardstock_core::domain::location::LocationId;
use wardstock_core::domain::order::{PendingOrder, PurchaseOrder, PurchaseOrderStatus};
use wardstock_core::domain::stock::{StockAdjustment, StockLevel};
use wardstock_core::domain::transfer::{Transfer, TransferId};
use wardstock_core::errors::DomainError;

use super::{InventoryRepository, OrderRepository, RepositoryError, TransferRepository};

type StockKey = (String, String);

/// Test double mirroring the SQL repository's semantics, including the
/// refusal to drive stock negative.
#[derive(Default)]
pub struct InMemoryInventoryRepository {
    items: RwLock<HashMap<String, InventoryItem>>,
    levels: RwLock<HashMap<StockKey, StockLevel>>,
}

impl InMemoryInventoryRepository {
    pub fn with_levels(levels: Vec<StockLevel>) -> Self {
        Self::with_catalog(Vec::new(), levels)
    }

    pub fn with_catalog(items: Vec<InventoryItem>, levels: Vec<StockLevel>) -> Self {
        let items = items.into_iter().map(|item| (item.id.0.clone(), item)).collect();
        let levels = levels
            .into_iter()
            .map(|level| ((level.item_id.0.clone(), level.location_id.0.clone()), level))
            .collect();
        Self { items: RwLock::new(items), levels: RwLock::new(levels) }
    }

    /// Both sides of a transfer under one lock, so the in-memory double
    /// matches the SQL repository's atomicity.
    pub(crate) async fn apply_transfer(&self, transfer: &Transfer) -> Result<(), RepositoryError> {
        let mut levels = self.levels.write().await;

        let source_key = (transfer.item_id.0.clone(), transfer.from_location_id.0.clone());
        let source = levels.get(&source_key).ok_or_else(|| {
            DomainError::UnknownItem(format!(
                "{} at {}",
                transfer.item_id.0, transfer.from_location_id.0
            ))
        })?;

        if source.current_stock < transfer.quantity {
            return Err(DomainError::InsufficientStock {
                item: source.item_name.clone(),
                location: source.location_name.clone(),
                requested: transfer.quantity,
                available: source.current_stock,
            }
            .into());
        }

        let item_name = source.item_name.clone();
        let dest_key = (transfer.item_id.0.clone(), transfer.to_location_id.0.clone());

        levels.entry(dest_key).or_insert_with(|| StockLevel {
            item_id: transfer.item_id.clone(),
            item_name,
            location_id: transfer.to_location_id.clone(),
            location_name: transfer.to_location_id.0.clone(),
            current_stock: 0,
            minimum_stock: 0,
            updated_at: Utc::now(),
        });

        if let Some(source) = levels.get_mut(&source_key) {
            source.current_stock -= transfer.quantity;
            source.updated_at = Utc::now();
        }
        if let Some(dest) =
            levels.get_mut(&(transfer.item_id.0.clone(), transfer.to_location_id.0.clone()))
        {
            dest.current_stock += transfer.quantity;
            dest.updated_at = Utc::now();
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl InventoryRepository for InMemoryInventoryRepository {
    async fn list_stock(&self) -> Result<Vec<StockLevel>, RepositoryError> {
        let levels = self.levels.read().await;
        let mut all: Vec<StockLevel> = levels.values().cloned().collect();
        all.sort_by(|a, b| {
            (a.location_name.as_str(), a.item_name.as_str())
                .cmp(&(b.location_name.as_str(), b.item_name.as_str()))
        });
        Ok(all)
    }

    async fn list_stock_by_location(
        &self,
        location_name: &str,
    ) -> Result<Vec<StockLevel>, RepositoryError> {
        let levels = self.levels.read().await;
        let mut matched: Vec<StockLevel> = levels
            .values()
            .filter(|level| level.location_name.eq_ignore_ascii_case(location_name))
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.item_name.cmp(&b.item_name));
        Ok(matched)
    }

    async fn find_stock(
        &self,
        item_name: &str,
        location_name: &str,
    ) -> Result<Option<StockLevel>, RepositoryError> {
        let levels = self.levels.read().await;
        Ok(levels
            .values()
            .find(|level| {
                level.item_name.eq_ignore_ascii_case(item_name)
                    && level.location_name.eq_ignore_ascii_case(location_name)
            })
            .cloned())
    }

    async fn stock_elsewhere(
        &self,
        item_id: &ItemId,
        excluding: &LocationId,
    ) -> Result<Vec<StockLevel>, RepositoryError> {
        let levels = self.levels.read().await;
        let mut matched: Vec<StockLevel> = levels
            .values()
            .filter(|level| level.item_id == *item_id && level.location_id != *excluding)
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.location_name.cmp(&b.location_name));
        Ok(matched)
    }

    async fn list_below_minimum(&self) -> Result<Vec<StockLevel>, RepositoryError> {
        let levels = self.levels.read().await;
        let mut matched: Vec<StockLevel> =
            levels.values().filter(|level| level.is_below_minimum()).cloned().collect();
        matched.sort_by(|a, b| {
            (a.location_name.as_str(), a.item_name.as_str())
                .cmp(&(b.location_name.as_str(), b.item_name.as_str()))
        });
        Ok(matched)
    }

    async fn find_item(&self, item_id: &ItemId) -> Result<Option<InventoryItem>, RepositoryError> {
        let items = self.items.read().await;
        Ok(items.get(&item_id.0).cloned())
    }

    async fn adjust_quantity(
        &self,
        item_id: &ItemId,
        location_id: &LocationId,
        delta: i64,
    ) -> Result<StockAdjustment, RepositoryError> {
        let mut levels = self.levels.write().await;
        let key = (item_id.0.clone(), location_id.0.clone());

        let Some(level) = levels.get_mut(&key) else {
            return Err(
                DomainError::UnknownItem(format!("{} at {}", item_id.0, location_id.0)).into()
            );
        };

        let new_stock = level.current_stock + delta;
        if new_stock < 0 {
            return Err(DomainError::InsufficientStock {
                item: level.item_name.clone(),
                location: level.location_name.clone(),
                requested: -delta,
                available: level.current_stock,
            }
            .into());
        }

        let previous_stock = level.current_stock;
        level.current_stock = new_stock;
        level.updated_at = Utc::now();

        Ok(StockAdjustment {
            item_id: level.item_id.clone(),
            item_name: level.item_name.clone(),
            location_id: level.location_id.clone(),
            location_name: level.location_name.clone(),
            previous_stock,
            new_stock,
            minimum_stock: level.minimum_stock,
        })
    }
}

pub struct InMemoryTransferRepository {
    inventory: Arc<InMemoryInventoryRepository>,
    transfers: RwLock<Vec<Transfer>>,
}

impl InMemoryTransferRepository {
    pub fn new(inventory: Arc<InMemoryInventoryRepository>) -> Self {
        Self { inventory, transfers: RwLock::new(Vec::new()) }
    }
}

#[async_trait::async_trait]
impl TransferRepository for InMemoryTransferRepository {
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

        self.inventory.apply_transfer(transfer).await?;
        self.transfers.write().await.push(transfer.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &TransferId) -> Result<Option<Transfer>, RepositoryError> {
        let transfers = self.transfers.read().await;
        Ok(transfers.iter().find(|transfer| transfer.id == *id).cloned())
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<Transfer>, RepositoryError> {
        let transfers = self.transfers.read().await;
        Ok(transfers.iter().rev().take(limit as usize).cloned().collect())
    }
}

#[derive(Default)]
pub struct InMemoryOrderRepository {
    purchase_orders: RwLock<Vec<PurchaseOrder>>,
    pending_orders: RwLock<Vec<PendingOrder>>,
}

#[async_trait::async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn place_purchase_order(&self, order: &PurchaseOrder) -> Result<(), RepositoryError> {
        self.purchase_orders.write().await.push(order.clone());
        Ok(())
    }

    async fn list_purchase_orders(
        &self,
        status: Option<PurchaseOrderStatus>,
        limit: u32,
    ) -> Result<Vec<PurchaseOrder>, RepositoryError> {
        let orders = self.purchase_orders.read().await;
        Ok(orders
            .iter()
            .rev()
            .filter(|order| status.as_ref().map_or(true, |wanted| order.status == *wanted))
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn file_pending_order(&self, order: &PendingOrder) -> Result<(), RepositoryError> {
        self.pending_orders.write().await.push(order.clone());
        Ok(())
    }

    async fn list_pending_orders(&self, limit: u32) -> Result<Vec<PendingOrder>, RepositoryError> {
        let orders = self.pending_orders.read().await;
        Ok(orders
            .iter()
            .filter(|order| {
                order.status == wardstock_core::domain::order::PendingOrderStatus::Pending
            })
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;

    use wardstock_core::domain::transfer::{Transfer, TransferId, TransferStatus};
    use wardstock_core::{ItemId, LocationId};

    use super::{InMemoryInventoryRepository, InMemoryTransferRepository};
    use crate::fixtures::DemoDataset;
    use crate::repositories::{InventoryRepository, TransferRepository};

    #[tokio::test]
    async fn in_memory_transfer_matches_sql_conservation_semantics() {
        let inventory =
            Arc::new(InMemoryInventoryRepository::with_levels(DemoDataset::stock_levels()));
        let transfers = InMemoryTransferRepository::new(Arc::clone(&inventory));

        transfers
            .execute_transfer(&Transfer {
                id: TransferId("tr-mem-1".to_string()),
                item_id: ItemId("itm-medical-supplies".to_string()),
                from_location_id: LocationId("loc-er-01".to_string()),
                to_location_id: LocationId("loc-icu-01".to_string()),
                quantity: 15,
                status: TransferStatus::Completed,
                requested_by: "nurse-7".to_string(),
                created_at: Utc::now(),
            })
            .await
            .expect("transfer");

        let source =
            inventory.find_stock("medical supplies", "ER-01").await.expect("query").expect("row");
        let dest =
            inventory.find_stock("medical supplies", "ICU-01").await.expect("query").expect("row");
        assert_eq!(source.current_stock, 15);
        assert_eq!(dest.current_stock, 86);
    }

    #[tokio::test]
    async fn in_memory_adjustment_round_trip() {
        let inventory = InMemoryInventoryRepository::with_levels(DemoDataset::stock_levels());
        let level =
            inventory.find_stock("medical supplies", "ICU-01").await.expect("query").expect("row");

        let adjustment =
            inventory.adjust_quantity(&level.item_id, &level.location_id, -5).await.expect("adjust");

        assert_eq!(adjustment.previous_stock, 71);
        assert_eq!(adjustment.new_stock, 66);
    }
}
