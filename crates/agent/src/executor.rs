//! Dispatch of classified intents to repository-backed handlers.

use std::sync::Arc;

use uuid::Uuid;

use wardstock_core::domain::order::PendingOrder;
use wardstock_core::domain::stock::{StockAdjustment, StockLevel};
use wardstock_core::domain::transfer::Transfer;
use wardstock_core::errors::{ApplicationError, DomainError};
use wardstock_db::{InventoryRepository, OrderRepository, RepositoryError, TransferRepository};

/// The closed set of executable actions. Matched exhaustively in
/// [`Executor::execute`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionKind {
    StockOverview,
    LocationStock { location: String },
    ItemStock { item: String, location: Option<String> },
    LowStock,
    AdjustStock { item: String, location: String, delta: i64 },
    PendingOrders,
    TransferHistory,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StockOverview => "stock_overview",
            Self::LocationStock { .. } => "location_stock",
            Self::ItemStock { .. } => "item_stock",
            Self::LowStock => "low_stock",
            Self::AdjustStock { .. } => "adjust_stock",
            Self::PendingOrders => "pending_orders",
            Self::TransferHistory => "transfer_history",
        }
    }
}

/// One dispatch, built per turn and recorded in the reply. Not persisted.
#[derive(Clone, Debug)]
pub struct AgentAction {
    pub action_id: String,
    pub kind: ActionKind,
    pub description: String,
    pub priority: u8,
}

impl AgentAction {
    pub fn new(kind: ActionKind, description: impl Into<String>, priority: u8) -> Self {
        Self { action_id: Uuid::new_v4().to_string(), kind, description: description.into(), priority }
    }
}

#[derive(Clone, Debug)]
pub enum ActionOutcome {
    Overview { levels: Vec<StockLevel> },
    LocationStock { location: String, levels: Vec<StockLevel> },
    ItemStock { levels: Vec<StockLevel> },
    LowStock { levels: Vec<StockLevel> },
    Adjusted { adjustment: StockAdjustment },
    PendingOrders { orders: Vec<PendingOrder> },
    Transfers { transfers: Vec<Transfer> },
}

const LIST_LIMIT: u32 = 20;

pub struct Executor {
    inventory: Arc<dyn InventoryRepository>,
    orders: Arc<dyn OrderRepository>,
    transfers: Arc<dyn TransferRepository>,
}

impl Executor {
    pub fn new(
        inventory: Arc<dyn InventoryRepository>,
        orders: Arc<dyn OrderRepository>,
        transfers: Arc<dyn TransferRepository>,
    ) -> Self {
        Self { inventory, orders, transfers }
    }

    pub async fn execute(&self, action: &AgentAction) -> Result<ActionOutcome, ApplicationError> {
        match &action.kind {
            ActionKind::StockOverview => {
                let levels = self.inventory.list_stock().await.map_err(map_repo_error)?;
                Ok(ActionOutcome::Overview { levels })
            }
            ActionKind::LocationStock { location } => {
                let levels = self
                    .inventory
                    .list_stock_by_location(location)
                    .await
                    .map_err(map_repo_error)?;
                Ok(ActionOutcome::LocationStock { location: location.clone(), levels })
            }
            ActionKind::ItemStock { item, location } => {
                let levels = match location {
                    Some(location) => {
                        let found = self
                            .inventory
                            .find_stock(item, location)
                            .await
                            .map_err(map_repo_error)?;
                        found.into_iter().collect()
                    }
                    None => {
                        let all = self.inventory.list_stock().await.map_err(map_repo_error)?;
                        all.into_iter()
                            .filter(|level| level.item_name.eq_ignore_ascii_case(item))
                            .collect()
                    }
                };
                Ok(ActionOutcome::ItemStock { levels })
            }
            ActionKind::LowStock => {
                let levels = self.inventory.list_below_minimum().await.map_err(map_repo_error)?;
                Ok(ActionOutcome::LowStock { levels })
            }
            ActionKind::AdjustStock { item, location, delta } => {
                let found =
                    self.inventory.find_stock(item, location).await.map_err(map_repo_error)?;
                let level = match found {
                    Some(level) => level,
                    None => {
                        let at_location = self
                            .inventory
                            .list_stock_by_location(location)
                            .await
                            .map_err(map_repo_error)?;
                        let error = if at_location.is_empty() {
                            DomainError::UnknownLocation(location.clone())
                        } else {
                            DomainError::UnknownItem(format!("{item} at {location}"))
                        };
                        return Err(error.into());
                    }
                };
                let adjustment = self
                    .inventory
                    .adjust_quantity(&level.item_id, &level.location_id, *delta)
                    .await
                    .map_err(map_repo_error)?;
                Ok(ActionOutcome::Adjusted { adjustment })
            }
            ActionKind::PendingOrders => {
                let orders =
                    self.orders.list_pending_orders(LIST_LIMIT).await.map_err(map_repo_error)?;
                Ok(ActionOutcome::PendingOrders { orders })
            }
            ActionKind::TransferHistory => {
                let transfers =
                    self.transfers.list_recent(LIST_LIMIT).await.map_err(map_repo_error)?;
                Ok(ActionOutcome::Transfers { transfers })
            }
        }
    }

    pub fn inventory(&self) -> &Arc<dyn InventoryRepository> {
        &self.inventory
    }

    pub fn orders(&self) -> &Arc<dyn OrderRepository> {
        &self.orders
    }

    pub fn transfers(&self) -> &Arc<dyn TransferRepository> {
        &self.transfers
    }
}

pub(crate) fn map_repo_error(error: RepositoryError) -> ApplicationError {
    match error {
        RepositoryError::Domain(domain) => ApplicationError::Domain(domain),
        RepositoryError::Database(db) => ApplicationError::Persistence(db.to_string()),
        RepositoryError::Decode(message) => ApplicationError::Persistence(message),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use wardstock_core::errors::{ApplicationError, DomainError};
    use wardstock_db::{
        DemoDataset, InMemoryInventoryRepository, InMemoryOrderRepository,
        InMemoryTransferRepository,
    };

    use super::{ActionKind, ActionOutcome, AgentAction, Executor};

    fn executor() -> Executor {
        let inventory = Arc::new(InMemoryInventoryRepository::with_catalog(
            DemoDataset::items(),
            DemoDataset::stock_levels(),
        ));
        let transfers = Arc::new(InMemoryTransferRepository::new(Arc::clone(&inventory)));
        Executor::new(inventory, Arc::new(InMemoryOrderRepository::default()), transfers)
    }

    #[tokio::test]
    async fn adjust_stock_reports_before_and_after() {
        let executor = executor();
        let action = AgentAction::new(
            ActionKind::AdjustStock {
                item: "medical supplies".to_string(),
                location: "ICU-01".to_string(),
                delta: -5,
            },
            "reduce medical supplies at ICU-01 by 5",
            1,
        );

        let outcome = executor.execute(&action).await.expect("execute");
        let ActionOutcome::Adjusted { adjustment } = outcome else {
            panic!("expected an adjustment outcome");
        };
        assert_eq!(adjustment.previous_stock, 71);
        assert_eq!(adjustment.new_stock, 66);
        assert!(adjustment.dropped_below_minimum());
    }

    #[tokio::test]
    async fn adjusting_an_unknown_item_is_a_typed_domain_error() {
        let executor = executor();
        let action = AgentAction::new(
            ActionKind::AdjustStock {
                item: "jet fuel".to_string(),
                location: "ICU-01".to_string(),
                delta: -1,
            },
            "reduce jet fuel",
            1,
        );

        let result = executor.execute(&action).await;
        assert!(matches!(
            result,
            Err(ApplicationError::Domain(DomainError::UnknownItem(_)))
        ));
    }

    #[tokio::test]
    async fn adjusting_at_an_unknown_location_names_the_location() {
        let executor = executor();
        let action = AgentAction::new(
            ActionKind::AdjustStock {
                item: "medical supplies".to_string(),
                location: "MORGUE-01".to_string(),
                delta: -1,
            },
            "reduce medical supplies at MORGUE-01",
            1,
        );

        let result = executor.execute(&action).await;
        assert!(matches!(
            result,
            Err(ApplicationError::Domain(DomainError::UnknownLocation(ref location)))
                if location == "MORGUE-01"
        ));
    }

    #[tokio::test]
    async fn location_stock_lists_only_that_location() {
        let executor = executor();
        let action = AgentAction::new(
            ActionKind::LocationStock { location: "WARD-03".to_string() },
            "stock at WARD-03",
            1,
        );

        let outcome = executor.execute(&action).await.expect("execute");
        let ActionOutcome::LocationStock { levels, .. } = outcome else {
            panic!("expected a location outcome");
        };
        assert_eq!(levels.len(), 3);
        assert!(levels.iter().all(|level| level.location_name == "WARD-03"));
    }

    #[tokio::test]
    async fn low_stock_is_empty_on_the_baseline_dataset() {
        let executor = executor();
        let action = AgentAction::new(ActionKind::LowStock, "what is running low", 1);

        let outcome = executor.execute(&action).await.expect("execute");
        let ActionOutcome::LowStock { levels } = outcome else {
            panic!("expected a low-stock outcome");
        };
        assert!(levels.is_empty());
    }
}
