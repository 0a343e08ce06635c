//! The per-turn orchestrator.
//!
//! `process_conversation` is deliberately infallible: a failed repository
//! call or a misunderstood message degrades to a prose reply, never to an
//! error surfaced to the chat user.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use wardstock_core::approvals::{self, ApprovalOutcome, Decision};
use wardstock_core::domain::order::{
    PendingOrder, PendingOrderId, PendingOrderStatus, PurchaseOrder, PurchaseOrderId,
    PurchaseOrderStatus,
};
use wardstock_core::domain::session::{ConversationContext, ConversationMemory, SessionKey, Suggestion};
use wardstock_core::domain::stock::{StockAdjustment, StockLevel};
use wardstock_core::domain::transfer::{Transfer, TransferId, TransferStatus};
use wardstock_core::errors::ApplicationError;
use wardstock_core::SuggestionEngine;

use crate::classifier::{ClassifiedIntent, DeltaDirection, Intent, IntentClassifier};
use crate::composer::ResponseComposer;
use crate::executor::{map_repo_error, ActionKind, AgentAction, Executor};
use crate::memory::SessionStore;

/// One executed action, as reported back to the chat caller.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActionRecord {
    pub action_id: String,
    pub action_type: String,
    pub description: String,
    pub status: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IntentSummary {
    pub primary_intent: String,
    pub entities: Vec<String>,
    pub keywords: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConversationReply {
    pub response: String,
    pub actions: Vec<ActionRecord>,
    pub intent: IntentSummary,
    pub timestamp: DateTime<Utc>,
}

pub struct AgentRuntime {
    classifier: IntentClassifier,
    executor: Executor,
    suggestions: SuggestionEngine,
    sessions: SessionStore,
    composer: ResponseComposer,
}

impl AgentRuntime {
    /// Builds the runtime, loading the classifier lexicon from the current
    /// inventory catalog.
    pub async fn initialize(
        executor: Executor,
        composer: ResponseComposer,
        session_ttl_secs: u64,
    ) -> Result<Self, ApplicationError> {
        let levels = executor.inventory().list_stock().await.map_err(map_repo_error)?;

        let mut item_names: Vec<String> = Vec::new();
        let mut location_names: Vec<String> = Vec::new();
        for level in &levels {
            if !item_names.contains(&level.item_name) {
                item_names.push(level.item_name.clone());
            }
            if !location_names.contains(&level.location_name) {
                location_names.push(level.location_name.clone());
            }
        }

        Ok(Self {
            classifier: IntentClassifier::with_lexicon(item_names, location_names),
            executor,
            suggestions: SuggestionEngine::default(),
            sessions: SessionStore::new(session_ttl_secs),
            composer,
        })
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub async fn process_conversation(
        &self,
        user_message: &str,
        user_id: &str,
        session_id: &str,
    ) -> ConversationReply {
        let now = Utc::now();
        let key = SessionKey::new(user_id, session_id);
        let mut memory = self.sessions.load(&key, now).await;

        let classified = self.classifier.classify(user_message);
        tracing::info!(
            event_name = "agent.turn.classified",
            session_id,
            intent = classified.primary.as_str(),
            "classified inbound message"
        );

        if let Some(item) = &classified.item_mention {
            memory.note_entity(item.clone());
        }
        if let Some(location) = &classified.location_mention {
            memory.note_entity(location.clone());
        }

        let mut actions = Vec::new();
        let response = match classified.primary {
            Intent::ApprovalReply => {
                let decision = classified.decision.unwrap_or(Decision::Approve);
                self.handle_approval(&mut memory, decision, user_id, now, &mut actions).await
            }
            Intent::GeneralAssistance => self.composer.render_general_assistance(),
            _ => match action_for(&classified) {
                Some(action) => self.run_action(action, &mut memory, now, &mut actions).await,
                None => self.composer.render_general_assistance(),
            },
        };

        let response = self.composer.polish(&response).await;

        memory.last_updated = now;
        self.sessions.store(key, memory).await;

        ConversationReply {
            response,
            actions,
            intent: IntentSummary {
                primary_intent: classified.primary.as_str().to_string(),
                entities: classified
                    .item_mention
                    .iter()
                    .chain(classified.location_mention.iter())
                    .cloned()
                    .collect(),
                keywords: classified.keywords,
            },
            timestamp: now,
        }
    }

    async fn run_action(
        &self,
        action: AgentAction,
        memory: &mut ConversationMemory,
        now: DateTime<Utc>,
        actions: &mut Vec<ActionRecord>,
    ) -> String {
        let is_modification = matches!(action.kind, ActionKind::AdjustStock { .. });

        match self.executor.execute(&action).await {
            Ok(outcome) => {
                actions.push(record(&action, "completed"));
                memory.actions_performed.push(action.description.clone());

                let mut response = self.composer.render_outcome(&outcome);

                if let crate::executor::ActionOutcome::Adjusted { adjustment } = &outcome {
                    if adjustment.dropped_below_minimum() {
                        response.push_str(
                            &self.propose_suggestions(adjustment, memory, now).await,
                        );
                    } else if is_modification && memory.pending_suggestions.is_empty() {
                        // An unrelated adjustment must not clobber an
                        // approval context the user has yet to answer.
                        memory.context = ConversationContext::InventoryModification;
                    }
                }

                response
            }
            Err(error) => {
                actions.push(record(&action, "failed"));
                tracing::warn!(
                    event_name = "agent.turn.action_failed",
                    action = action.kind.as_str(),
                    error = %error,
                    "action execution failed"
                );
                self.composer.render_failure(&error)
            }
        }
    }

    /// Evaluates transfer/reorder suggestions for a breach and stores them
    /// as the session's pending decision, superseding any unresolved list.
    async fn propose_suggestions(
        &self,
        adjustment: &StockAdjustment,
        memory: &mut ConversationMemory,
        now: DateTime<Utc>,
    ) -> String {
        let modified = StockLevel {
            item_id: adjustment.item_id.clone(),
            item_name: adjustment.item_name.clone(),
            location_id: adjustment.location_id.clone(),
            location_name: adjustment.location_name.clone(),
            current_stock: adjustment.new_stock,
            minimum_stock: adjustment.minimum_stock,
            updated_at: now,
        };

        let others = match self
            .executor
            .inventory()
            .stock_elsewhere(&adjustment.item_id, &adjustment.location_id)
            .await
        {
            Ok(others) => others,
            Err(error) => {
                tracing::warn!(
                    event_name = "agent.suggestions.lookup_failed",
                    error = %error,
                    "could not scan other locations; proposing reorder only"
                );
                Vec::new()
            }
        };

        let proposed = self.suggestions.evaluate(&modified, &others, now);
        if proposed.is_empty() {
            return String::new();
        }

        let rendered = self.composer.render_suggestions(&proposed);
        memory.replace_suggestions(proposed);
        rendered
    }

    async fn handle_approval(
        &self,
        memory: &mut ConversationMemory,
        decision: Decision,
        user_id: &str,
        now: DateTime<Utc>,
        actions: &mut Vec<ActionRecord>,
    ) -> String {
        let resolution =
            approvals::resolve_reply(memory.context, &mut memory.pending_suggestions, decision);
        memory.context = resolution.next_context;

        let mut response = match resolution.outcome {
            ApprovalOutcome::Approved(suggestion) => {
                self.execute_approved(suggestion, memory, user_id, now, actions).await
            }
            ApprovalOutcome::Rejected(suggestion) => {
                self.file_rejection(suggestion, memory, user_id, now, actions).await
            }
            ApprovalOutcome::NothingPending => self.composer.render_nothing_pending(),
        };

        if !memory.pending_suggestions.is_empty() {
            response.push_str(&self.composer.render_suggestions(&memory.pending_suggestions));
        }
        response
    }

    async fn execute_approved(
        &self,
        suggestion: Suggestion,
        memory: &mut ConversationMemory,
        user_id: &str,
        now: DateTime<Utc>,
        actions: &mut Vec<ActionRecord>,
    ) -> String {
        match &suggestion {
            Suggestion::InterTransfer {
                item_id,
                from_location_id,
                to_location_id,
                suggested_quantity,
                ..
            } => {
                let transfer = Transfer {
                    id: TransferId(Uuid::new_v4().to_string()),
                    item_id: item_id.clone(),
                    from_location_id: from_location_id.clone(),
                    to_location_id: to_location_id.clone(),
                    quantity: *suggested_quantity,
                    status: TransferStatus::Completed,
                    requested_by: user_id.to_string(),
                    created_at: now,
                };
                let description = format!(
                    "execute approved transfer of {} units of {}",
                    suggested_quantity,
                    suggestion.item_name()
                );

                match self.executor.transfers().execute_transfer(&transfer).await {
                    Ok(()) => {
                        actions.push(approval_record("execute_transfer", &description, "completed"));
                        memory.actions_performed.push("approved transfer".to_string());
                        self.composer.render_transfer_approved(&suggestion)
                    }
                    Err(error) => {
                        // The suggestion goes back to the front so the user
                        // can retry once the store recovers.
                        memory.pending_suggestions.insert(0, suggestion.clone());
                        memory.context = approvals::context_for(&memory.pending_suggestions);
                        actions.push(approval_record("execute_transfer", &description, "failed"));
                        let error = map_repo_error(error);
                        tracing::warn!(
                            event_name = "agent.approval.transfer_failed",
                            error = %error,
                            "approved transfer could not be executed"
                        );
                        self.composer.render_failure(&error)
                    }
                }
            }
            Suggestion::AutomaticReorder {
                item_id,
                location_id,
                suggested_quantity,
                estimated_delivery,
                ..
            } => {
                let unit_cost = match self.executor.inventory().find_item(item_id).await {
                    Ok(Some(item)) => item.unit_cost,
                    Ok(None) | Err(_) => Decimal::ZERO,
                };
                let order = PurchaseOrder {
                    id: PurchaseOrderId(Uuid::new_v4().to_string()),
                    item_id: item_id.clone(),
                    location_id: location_id.clone(),
                    quantity: *suggested_quantity,
                    status: PurchaseOrderStatus::Placed,
                    estimated_cost: unit_cost * Decimal::from(*suggested_quantity),
                    estimated_delivery: Some(*estimated_delivery),
                    requested_by: user_id.to_string(),
                    created_at: now,
                };
                let description = format!(
                    "place purchase order for {} units of {}",
                    suggested_quantity,
                    suggestion.item_name()
                );

                match self.executor.orders().place_purchase_order(&order).await {
                    Ok(()) => {
                        actions.push(approval_record(
                            "place_purchase_order",
                            &description,
                            "completed",
                        ));
                        memory.actions_performed.push("approved reorder".to_string());
                        self.composer.render_reorder_approved(&suggestion)
                    }
                    Err(error) => {
                        memory.pending_suggestions.insert(0, suggestion.clone());
                        memory.context = approvals::context_for(&memory.pending_suggestions);
                        actions.push(approval_record("place_purchase_order", &description, "failed"));
                        let error = map_repo_error(error);
                        tracing::warn!(
                            event_name = "agent.approval.reorder_failed",
                            error = %error,
                            "approved reorder could not be placed"
                        );
                        self.composer.render_failure(&error)
                    }
                }
            }
        }
    }

    async fn file_rejection(
        &self,
        suggestion: Suggestion,
        memory: &mut ConversationMemory,
        user_id: &str,
        now: DateTime<Utc>,
        actions: &mut Vec<ActionRecord>,
    ) -> String {
        let (item_id, item_name, location_id, location_name, quantity, reason) = match &suggestion {
            Suggestion::InterTransfer {
                item_id,
                item_name,
                from_location,
                to_location_id,
                to_location,
                suggested_quantity,
                ..
            } => (
                item_id.clone(),
                item_name.clone(),
                to_location_id.clone(),
                to_location.clone(),
                *suggested_quantity,
                format!("transfer from {from_location} declined in chat"),
            ),
            Suggestion::AutomaticReorder {
                item_id,
                item_name,
                location_id,
                location,
                suggested_quantity,
                ..
            } => (
                item_id.clone(),
                item_name.clone(),
                location_id.clone(),
                location.clone(),
                *suggested_quantity,
                "reorder declined in chat".to_string(),
            ),
        };

        let order = PendingOrder {
            id: PendingOrderId(Uuid::new_v4().to_string()),
            item_id,
            item_name,
            location_id,
            location_name,
            quantity,
            status: PendingOrderStatus::Pending,
            reason,
            requires_manager_approval: true,
            rejected_by: user_id.to_string(),
            rejected_at: now,
        };

        let description =
            format!("defer {} x{} to manager review", order.item_name, order.quantity);

        match self.executor.orders().file_pending_order(&order).await {
            Ok(()) => {
                actions.push(approval_record("file_pending_order", &description, "completed"));
                memory.pending_orders.push(order.clone());
                memory.actions_performed.push("rejected suggestion".to_string());
                self.composer.render_rejection(&order)
            }
            Err(error) => {
                actions.push(approval_record("file_pending_order", &description, "failed"));
                let error = map_repo_error(error);
                tracing::warn!(
                    event_name = "agent.approval.rejection_failed",
                    error = %error,
                    "pending order could not be filed"
                );
                self.composer.render_failure(&error)
            }
        }
    }
}

fn record(action: &AgentAction, status: &str) -> ActionRecord {
    ActionRecord {
        action_id: action.action_id.clone(),
        action_type: action.kind.as_str().to_string(),
        description: action.description.clone(),
        status: status.to_string(),
    }
}

fn approval_record(action_type: &str, description: &str, status: &str) -> ActionRecord {
    ActionRecord {
        action_id: Uuid::new_v4().to_string(),
        action_type: action_type.to_string(),
        description: description.to_string(),
        status: status.to_string(),
    }
}

/// Maps a classified intent to an executable action, or `None` when the
/// message has nothing actionable.
fn action_for(classified: &ClassifiedIntent) -> Option<AgentAction> {
    match classified.primary {
        Intent::StockOverview => {
            Some(AgentAction::new(ActionKind::StockOverview, "list all stock", 3))
        }
        Intent::LocationInquiry => {
            let location = classified.location_mention.clone()?;
            Some(AgentAction::new(
                ActionKind::LocationStock { location: location.clone() },
                format!("list stock at {location}"),
                3,
            ))
        }
        Intent::ItemInquiry => {
            let item = classified.item_mention.clone()?;
            Some(AgentAction::new(
                ActionKind::ItemStock { item: item.clone(), location: classified.location_mention.clone() },
                format!("look up {item}"),
                3,
            ))
        }
        Intent::LowStockInquiry => {
            Some(AgentAction::new(ActionKind::LowStock, "list items below minimum", 2))
        }
        Intent::StockModification => {
            let item = classified.item_mention.clone()?;
            let location = classified.location_mention.clone()?;
            let quantity = classified.quantity?;
            let delta = match classified.direction? {
                DeltaDirection::Increase => quantity,
                DeltaDirection::Decrease => -quantity,
            };
            Some(AgentAction::new(
                ActionKind::AdjustStock { item: item.clone(), location: location.clone(), delta },
                format!("adjust {item} at {location} by {delta}"),
                1,
            ))
        }
        Intent::PendingOrdersInquiry => {
            Some(AgentAction::new(ActionKind::PendingOrders, "list pending orders", 2))
        }
        Intent::TransferHistory => {
            Some(AgentAction::new(ActionKind::TransferHistory, "list recent transfers", 3))
        }
        Intent::ApprovalReply | Intent::GeneralAssistance => None,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use wardstock_core::domain::session::{ConversationContext, SessionKey, Suggestion};
    use wardstock_db::{
        DemoDataset, InMemoryInventoryRepository, InMemoryOrderRepository,
        InMemoryTransferRepository, InventoryRepository, OrderRepository,
    };

    use super::AgentRuntime;
    use crate::composer::ResponseComposer;
    use crate::executor::Executor;

    struct Harness {
        runtime: AgentRuntime,
        inventory: Arc<InMemoryInventoryRepository>,
        orders: Arc<InMemoryOrderRepository>,
    }

    async fn harness() -> Harness {
        let inventory = Arc::new(InMemoryInventoryRepository::with_catalog(
            DemoDataset::items(),
            DemoDataset::stock_levels(),
        ));
        let orders = Arc::new(InMemoryOrderRepository::default());
        let transfers = Arc::new(InMemoryTransferRepository::new(Arc::clone(&inventory)));
        let executor = Executor::new(
            Arc::clone(&inventory) as Arc<dyn InventoryRepository>,
            Arc::clone(&orders) as Arc<dyn OrderRepository>,
            transfers,
        );
        let runtime = AgentRuntime::initialize(executor, ResponseComposer::deterministic(), 1800)
            .await
            .expect("runtime");
        Harness { runtime, inventory, orders }
    }

    async fn current(harness: &Harness, item: &str, location: &str) -> i64 {
        harness
            .inventory
            .find_stock(item, location)
            .await
            .expect("query")
            .expect("row")
            .current_stock
    }

    #[tokio::test]
    async fn breaching_modification_produces_pending_suggestions() {
        let harness = harness().await;

        let reply = harness
            .runtime
            .process_conversation("reduce 5 units of medical supplies in ICU-01", "nurse-7", "s1")
            .await;

        assert_eq!(reply.intent.primary_intent, "stock_modification");
        assert_eq!(reply.actions.len(), 1);
        assert_eq!(reply.actions[0].status, "completed");
        assert!(reply.response.contains("71 -> 66"));
        assert!(reply.response.contains("Transfer up to 15 units"));
        assert!(reply.response.contains("Reorder 80 units"));

        let key = SessionKey::new("nurse-7", "s1");
        let memory = harness.runtime.sessions().load(&key, chrono::Utc::now()).await;
        assert_eq!(memory.pending_suggestions.len(), 2);
        assert_eq!(memory.context, ConversationContext::InterTransfer);
    }

    #[tokio::test]
    async fn non_breaching_modification_produces_no_suggestions() {
        let harness = harness().await;

        let reply = harness
            .runtime
            .process_conversation("add 10 units of saline bags to ER-01", "nurse-7", "s1")
            .await;

        assert!(!reply.response.contains("Suggestions:"));

        let key = SessionKey::new("nurse-7", "s1");
        let memory = harness.runtime.sessions().load(&key, chrono::Utc::now()).await;
        assert!(memory.pending_suggestions.is_empty());
    }

    #[tokio::test]
    async fn transfer_approval_conserves_total_stock() {
        let harness = harness().await;

        harness
            .runtime
            .process_conversation("reduce 5 units of medical supplies in ICU-01", "nurse-7", "s1")
            .await;

        let icu_before = current(&harness, "medical supplies", "ICU-01").await;
        let er_before = current(&harness, "medical supplies", "ER-01").await;

        let reply = harness.runtime.process_conversation("yes", "nurse-7", "s1").await;
        assert!(reply.response.contains("Transferred 15 units"));

        let icu_after = current(&harness, "medical supplies", "ICU-01").await;
        let er_after = current(&harness, "medical supplies", "ER-01").await;

        assert_eq!(icu_before + er_before, icu_after + er_after, "conservation");
        assert_eq!(icu_after, icu_before + 15);
        assert_eq!(er_after, er_before - 15);
    }

    #[tokio::test]
    async fn rejection_files_exactly_one_pending_order() {
        let harness = harness().await;

        harness
            .runtime
            .process_conversation("reduce 5 units of medical supplies in ICU-01", "nurse-7", "s1")
            .await;

        let reply = harness.runtime.process_conversation("no", "nurse-7", "s1").await;
        assert!(reply.response.contains("manager review"));

        let pending = harness.orders.list_pending_orders(10).await.expect("list");
        assert_eq!(pending.len(), 1);
        assert!(pending[0].requires_manager_approval);

        let key = SessionKey::new("nurse-7", "s1");
        let memory = harness.runtime.sessions().load(&key, chrono::Utc::now()).await;
        assert_eq!(memory.pending_suggestions.len(), 1, "only the first suggestion was consumed");
    }

    #[tokio::test]
    async fn double_yes_never_replays_a_consumed_suggestion() {
        let harness = harness().await;

        harness
            .runtime
            .process_conversation("reduce 5 units of medical supplies in ICU-01", "nurse-7", "s1")
            .await;
        harness.runtime.process_conversation("yes", "nurse-7", "s1").await;
        harness.runtime.process_conversation("yes", "nurse-7", "s1").await;

        let third = harness.runtime.process_conversation("yes", "nurse-7", "s1").await;
        assert!(third.response.contains("nothing awaiting approval"));

        // One transfer and one reorder executed, no replays.
        let icu = current(&harness, "medical supplies", "ICU-01").await;
        assert_eq!(icu, 81);
        let orders = harness
            .orders
            .list_purchase_orders(None, 10)
            .await
            .expect("list");
        assert_eq!(orders.len(), 1);
    }

    #[tokio::test]
    async fn end_to_end_walkthrough_matches_the_demo_numbers() {
        let harness = harness().await;

        let first = harness
            .runtime
            .process_conversation("reduce 5 units of medical supplies in ICU-01", "nurse-7", "s1")
            .await;
        assert!(first.response.contains("Transfer up to 15 units"));
        assert!(first.response.contains("Reorder 80 units"));
        assert_eq!(current(&harness, "medical supplies", "ICU-01").await, 66);

        let second = harness.runtime.process_conversation("yes", "nurse-7", "s1").await;
        assert!(second.response.contains("Transferred 15 units"));
        assert_eq!(current(&harness, "medical supplies", "ICU-01").await, 81);
        assert_eq!(current(&harness, "medical supplies", "ER-01").await, 15);

        let key = SessionKey::new("nurse-7", "s1");
        let memory = harness.runtime.sessions().load(&key, chrono::Utc::now()).await;
        assert_eq!(memory.pending_suggestions.len(), 1, "reorder still pending");
        assert_eq!(memory.context, ConversationContext::PurchaseApproval);
        assert!(matches!(memory.pending_suggestions[0], Suggestion::AutomaticReorder { .. }));
    }

    #[tokio::test]
    async fn unrecognized_text_falls_back_without_actions() {
        let harness = harness().await;

        let reply = harness.runtime.process_conversation("tell me a joke", "nurse-7", "s1").await;

        assert_eq!(reply.intent.primary_intent, "general_assistance");
        assert!(reply.actions.is_empty());
        assert!(!reply.response.is_empty());
    }

    #[tokio::test]
    async fn approved_reorder_costs_out_from_the_catalog() {
        let harness = harness().await;

        harness
            .runtime
            .process_conversation("reduce 5 units of medical supplies in ICU-01", "nurse-7", "s1")
            .await;
        harness.runtime.process_conversation("yes", "nurse-7", "s1").await;
        let reply = harness.runtime.process_conversation("yes", "nurse-7", "s1").await;
        assert!(reply.response.contains("Purchase order placed"));

        let orders = harness.orders.list_purchase_orders(None, 10).await.expect("list");
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].quantity, 80);
        // 80 units at 4.50 each.
        assert_eq!(orders[0].estimated_cost.to_string(), "360.00");
    }

    #[tokio::test]
    async fn unrelated_modification_keeps_the_approval_context_alive() {
        let harness = harness().await;

        harness
            .runtime
            .process_conversation("reduce 5 units of medical supplies in ICU-01", "nurse-7", "s1")
            .await;
        // A non-breaching adjustment elsewhere while the approval pends.
        harness
            .runtime
            .process_conversation("add 10 units of saline bags to ER-01", "nurse-7", "s1")
            .await;

        let key = SessionKey::new("nurse-7", "s1");
        let memory = harness.runtime.sessions().load(&key, chrono::Utc::now()).await;
        assert_eq!(memory.pending_suggestions.len(), 2);
        assert_eq!(memory.context, ConversationContext::InterTransfer);

        // The very next "yes" executes the pending transfer.
        let reply = harness.runtime.process_conversation("yes", "nurse-7", "s1").await;
        assert!(reply.response.contains("Transferred 15 units"));
        assert_eq!(current(&harness, "medical supplies", "ICU-01").await, 81);
    }

    #[tokio::test]
    async fn a_new_breach_supersedes_unresolved_suggestions() {
        let harness = harness().await;

        harness
            .runtime
            .process_conversation("reduce 5 units of medical supplies in ICU-01", "nurse-7", "s1")
            .await;
        // Leave the first list unresolved and trigger a different breach.
        harness
            .runtime
            .process_conversation("reduce 5 units of medical supplies in WARD-03", "nurse-7", "s1")
            .await;

        let key = SessionKey::new("nurse-7", "s1");
        let memory = harness.runtime.sessions().load(&key, chrono::Utc::now()).await;
        assert!(memory
            .pending_suggestions
            .iter()
            .all(|suggestion| match suggestion {
                Suggestion::InterTransfer { to_location, .. } => to_location == "WARD-03",
                Suggestion::AutomaticReorder { location, .. } => location == "WARD-03",
            }));
    }
}
