#![feature(int_roundings)]

pub mod approvals;
pub mod config;
pub mod domain;
pub mod errors;
pub mod suggestions;

pub use approvals::{ApprovalOutcome, Decision, Resolution};
pub use domain::item::{InventoryItem, ItemId};
pub use domain::location::{Location, LocationId, LocationKind};
pub use domain::order::{
    PendingOrder, PendingOrderId, PendingOrderStatus, PurchaseOrder, PurchaseOrderId,
    PurchaseOrderStatus,
};
pub use domain::session::{
    ConversationContext, ConversationMemory, SessionKey, Suggestion, Urgency,
};
pub use domain::stock::{StockAdjustment, StockLevel};
pub use domain::transfer::{Transfer, TransferId, TransferStatus};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use suggestions::SuggestionEngine;
