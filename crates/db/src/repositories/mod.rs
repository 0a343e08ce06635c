use async_trait::async_trait;
use thiserror::Error;

use wardstock_core::domain::item::{InventoryItem, ItemId};
use wardstock_core::domain::location::LocationId;
use wardstock_core::domain::order::{PendingOrder, PurchaseOrder, PurchaseOrderStatus};
use wardstock_core::domain::stock::{StockAdjustment, StockLevel};
use wardstock_core::domain::transfer::{Transfer, TransferId};
use wardstock_core::errors::DomainError;

pub mod inventory;
pub mod memory;
pub mod order;
pub mod transfer;

pub use inventory::SqlInventoryRepository;
pub use memory::{InMemoryInventoryRepository, InMemoryOrderRepository, InMemoryTransferRepository};
pub use order::SqlOrderRepository;
pub use transfer::SqlTransferRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Read and adjust per-location stock. Name-based lookups are
/// case-insensitive because they come straight from chat text.
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    async fn list_stock(&self) -> Result<Vec<StockLevel>, RepositoryError>;

    async fn list_stock_by_location(
        &self,
        location_name: &str,
    ) -> Result<Vec<StockLevel>, RepositoryError>;

    async fn find_stock(
        &self,
        item_name: &str,
        location_name: &str,
    ) -> Result<Option<StockLevel>, RepositoryError>;

    /// Levels of the same item at every location except the given one.
    async fn stock_elsewhere(
        &self,
        item_id: &ItemId,
        excluding: &LocationId,
    ) -> Result<Vec<StockLevel>, RepositoryError>;

    async fn list_below_minimum(&self) -> Result<Vec<StockLevel>, RepositoryError>;

    async fn find_item(&self, item_id: &ItemId) -> Result<Option<InventoryItem>, RepositoryError>;

    /// Applies a signed delta to one stock row. Fails with
    /// [`DomainError::InsufficientStock`] rather than going negative.
    async fn adjust_quantity(
        &self,
        item_id: &ItemId,
        location_id: &LocationId,
        delta: i64,
    ) -> Result<StockAdjustment, RepositoryError>;
}

#[async_trait]
pub trait TransferRepository: Send + Sync {
    /// Moves stock between two locations and records the transfer, all
    /// inside a single transaction: a crash can never leave the
    /// decrement without the matching increment.
    async fn execute_transfer(&self, transfer: &Transfer) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: &TransferId) -> Result<Option<Transfer>, RepositoryError>;

    async fn list_recent(&self, limit: u32) -> Result<Vec<Transfer>, RepositoryError>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn place_purchase_order(&self, order: &PurchaseOrder) -> Result<(), RepositoryError>;

    async fn list_purchase_orders(
        &self,
        status: Option<PurchaseOrderStatus>,
        limit: u32,
    ) -> Result<Vec<PurchaseOrder>, RepositoryError>;

    /// Files a rejected reorder into the pending-manager-approval queue.
    async fn file_pending_order(&self, order: &PendingOrder) -> Result<(), RepositoryError>;

    async fn list_pending_orders(&self, limit: u32) -> Result<Vec<PendingOrder>, RepositoryError>;
}
