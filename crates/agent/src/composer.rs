//! Deterministic response templates, optionally rephrased by an LLM.
//!
//! Every reply is first rendered from the structured outcome. The LLM pass
//! is cosmetic and bounded: a timeout per attempt, a capped retry count, and
//! the deterministic template as the fallback on any failure. Prose from the
//! model never feeds back into state.

use std::sync::Arc;
use std::time::Duration;

use wardstock_core::domain::order::PendingOrder;
use wardstock_core::domain::session::Suggestion;
use wardstock_core::domain::stock::{StockAdjustment, StockLevel};
use wardstock_core::errors::ApplicationError;

use crate::executor::ActionOutcome;
use crate::llm::LlmClient;

pub struct ResponseComposer {
    llm: Option<Arc<dyn LlmClient>>,
    attempt_timeout: Duration,
    max_retries: u32,
}

impl ResponseComposer {
    pub fn deterministic() -> Self {
        Self { llm: None, attempt_timeout: Duration::from_secs(5), max_retries: 0 }
    }

    pub fn with_llm(llm: Arc<dyn LlmClient>, timeout_secs: u64, max_retries: u32) -> Self {
        Self { llm: Some(llm), attempt_timeout: Duration::from_secs(timeout_secs), max_retries }
    }

    pub fn render_outcome(&self, outcome: &ActionOutcome) -> String {
        match outcome {
            ActionOutcome::Overview { levels } => {
                if levels.is_empty() {
                    return "No stock is recorded yet.".to_string();
                }
                let mut text = format!("Current inventory ({} entries):\n", levels.len());
                text.push_str(&render_levels(levels));
                text
            }
            ActionOutcome::LocationStock { location, levels } => {
                if levels.is_empty() {
                    return format!("No stock is recorded at {location}.");
                }
                let mut text = format!("Stock at {location}:\n");
                text.push_str(&render_levels(levels));
                text
            }
            ActionOutcome::ItemStock { levels } => {
                if levels.is_empty() {
                    return "I couldn't find that item anywhere.".to_string();
                }
                let mut text = format!("{} is held at {} location(s):\n", levels[0].item_name, levels.len());
                text.push_str(&render_levels(levels));
                text
            }
            ActionOutcome::LowStock { levels } => {
                if levels.is_empty() {
                    return "Nothing is below its minimum right now.".to_string();
                }
                let mut text = format!("{} item(s) are below minimum:\n", levels.len());
                text.push_str(&render_levels(levels));
                text
            }
            ActionOutcome::Adjusted { adjustment } => render_adjustment(adjustment),
            ActionOutcome::PendingOrders { orders } => {
                if orders.is_empty() {
                    return "There are no orders awaiting manager approval.".to_string();
                }
                let mut text =
                    format!("{} order(s) are awaiting manager approval:\n", orders.len());
                for order in orders {
                    text.push_str(&format!(
                        "- {} x{} for {} ({})\n",
                        order.item_name, order.quantity, order.location_name, order.reason
                    ));
                }
                text
            }
            ActionOutcome::Transfers { transfers } => {
                if transfers.is_empty() {
                    return "No transfers have been recorded.".to_string();
                }
                let mut text = format!("Last {} transfer(s):\n", transfers.len());
                for transfer in transfers {
                    text.push_str(&format!(
                        "- {} units of item {} from {} to {} ({})\n",
                        transfer.quantity,
                        transfer.item_id.0,
                        transfer.from_location_id.0,
                        transfer.to_location_id.0,
                        transfer.status.as_str()
                    ));
                }
                text
            }
        }
    }

    pub fn render_suggestions(&self, suggestions: &[Suggestion]) -> String {
        let mut text = String::from("\n\nSuggestions:\n");
        for suggestion in suggestions {
            match suggestion {
                Suggestion::InterTransfer {
                    item_name,
                    from_location,
                    to_location,
                    suggested_quantity,
                    available_quantity,
                    urgency,
                    ..
                } => {
                    text.push_str(&format!(
                        "- Transfer up to {suggested_quantity} units of {item_name} from \
                         {from_location} (holds {available_quantity}) to {to_location} \
                         [urgency: {}]\n",
                        urgency.as_str()
                    ));
                }
                Suggestion::AutomaticReorder {
                    item_name,
                    location,
                    suggested_quantity,
                    urgency,
                    estimated_delivery,
                    ..
                } => {
                    text.push_str(&format!(
                        "- Reorder {suggested_quantity} units of {item_name} for {location} \
                         [urgency: {}, estimated delivery {}]\n",
                        urgency.as_str(),
                        estimated_delivery.format("%Y-%m-%d")
                    ));
                }
            }
        }
        text.push_str("\nReply \"yes\" to approve the first suggestion or \"no\" to decline it.");
        text
    }

    pub fn render_transfer_approved(&self, suggestion: &Suggestion) -> String {
        match suggestion {
            Suggestion::InterTransfer {
                item_name,
                from_location,
                to_location,
                suggested_quantity,
                ..
            } => format!(
                "Done. Transferred {suggested_quantity} units of {item_name} from \
                 {from_location} to {to_location}."
            ),
            Suggestion::AutomaticReorder { .. } => String::new(),
        }
    }

    pub fn render_reorder_approved(&self, suggestion: &Suggestion) -> String {
        match suggestion {
            Suggestion::AutomaticReorder { item_name, location, suggested_quantity, .. } => {
                format!(
                    "Purchase order placed: {suggested_quantity} units of {item_name} for \
                     {location}."
                )
            }
            Suggestion::InterTransfer { .. } => String::new(),
        }
    }

    pub fn render_rejection(&self, order: &PendingOrder) -> String {
        format!(
            "Understood. I filed the {} x{} request for {} into the pending queue for manager \
             review.",
            order.item_name, order.quantity, order.location_name
        )
    }

    pub fn render_nothing_pending(&self) -> String {
        "There's nothing awaiting approval right now.".to_string()
    }

    pub fn render_general_assistance(&self) -> String {
        "I can check stock levels, record usage, and handle transfer or reorder approvals. \
         Try \"what do we have in ER-01\" or \"reduce 5 units of medical supplies in ICU-01\"."
            .to_string()
    }

    pub fn render_failure(&self, error: &ApplicationError) -> String {
        match error {
            ApplicationError::Domain(domain) => {
                format!("I couldn't do that: {domain}.")
            }
            ApplicationError::Persistence(_) | ApplicationError::Integration(_) => {
                "The inventory system is temporarily unavailable. Please try again shortly."
                    .to_string()
            }
            ApplicationError::Configuration(_) => {
                "The service is misconfigured. Please contact an administrator.".to_string()
            }
        }
    }

    /// Tries the LLM within the attempt timeout, halving it on each retry,
    /// and returns the deterministic template on any failure. Never blocks
    /// past the configured bound.
    pub async fn polish(&self, template: &str) -> String {
        let Some(llm) = &self.llm else {
            return template.to_string();
        };

        let prompt = format!("Rephrase this inventory update for a hospital staff chat:\n\n{template}");
        let mut timeout = self.attempt_timeout;
        for attempt in 0..=self.max_retries {
            match tokio::time::timeout(timeout, llm.complete(&prompt)).await {
                Ok(Ok(polished)) if !polished.trim().is_empty() => return polished,
                Ok(Ok(_)) | Ok(Err(_)) | Err(_) => {
                    tracing::debug!(
                        event_name = "agent.composer.llm_fallback",
                        attempt,
                        "llm polish attempt failed, retrying or falling back"
                    );
                }
            }
            timeout = timeout.checked_div(2).unwrap_or(timeout);
        }
        template.to_string()
    }
}

fn render_levels(levels: &[StockLevel]) -> String {
    let mut text = String::new();
    for level in levels {
        let marker = if level.is_below_minimum() { " (below minimum!)" } else { "" };
        text.push_str(&format!(
            "- {} at {}: {} units (minimum {}){}\n",
            level.item_name, level.location_name, level.current_stock, level.minimum_stock, marker
        ));
    }
    text
}

fn render_adjustment(adjustment: &StockAdjustment) -> String {
    let direction = if adjustment.delta() < 0 { "Reduced" } else { "Increased" };
    let mut text = format!(
        "{direction} {} at {} by {}: {} -> {} units.",
        adjustment.item_name,
        adjustment.location_name,
        adjustment.delta().abs(),
        adjustment.previous_stock,
        adjustment.new_stock
    );
    if adjustment.dropped_below_minimum() {
        text.push_str(&format!(
            " Warning: stock is now below the minimum of {}.",
            adjustment.minimum_stock
        ));
    }
    text
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use chrono::Utc;

    use wardstock_core::domain::item::ItemId;
    use wardstock_core::domain::location::LocationId;
    use wardstock_core::domain::session::{Suggestion, Urgency};
    use wardstock_core::domain::stock::StockAdjustment;

    use super::ResponseComposer;
    use crate::executor::ActionOutcome;
    use crate::llm::LlmClient;

    struct EchoLlm;

    #[async_trait]
    impl LlmClient for EchoLlm {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Ok("polished prose".to_string())
        }
    }

    struct FailingLlm;

    #[async_trait]
    impl LlmClient for FailingLlm {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Err(anyhow!("model unavailable"))
        }
    }

    fn adjustment() -> StockAdjustment {
        StockAdjustment {
            item_id: ItemId("itm-1".to_string()),
            item_name: "medical supplies".to_string(),
            location_id: LocationId("loc-icu".to_string()),
            location_name: "ICU-01".to_string(),
            previous_stock: 71,
            new_stock: 66,
            minimum_stock: 70,
        }
    }

    #[test]
    fn adjustment_template_warns_when_below_minimum() {
        let composer = ResponseComposer::deterministic();
        let text = composer.render_outcome(&ActionOutcome::Adjusted { adjustment: adjustment() });

        assert!(text.contains("71 -> 66"));
        assert!(text.contains("below the minimum of 70"));
    }

    #[test]
    fn suggestion_template_names_both_kinds() {
        let composer = ResponseComposer::deterministic();
        let suggestions = vec![
            Suggestion::InterTransfer {
                item_id: ItemId("itm-1".to_string()),
                item_name: "medical supplies".to_string(),
                from_location_id: LocationId("loc-er".to_string()),
                from_location: "ER-01".to_string(),
                to_location_id: LocationId("loc-icu".to_string()),
                to_location: "ICU-01".to_string(),
                suggested_quantity: 15,
                available_quantity: 30,
                urgency: Urgency::High,
            },
            Suggestion::AutomaticReorder {
                item_id: ItemId("itm-1".to_string()),
                item_name: "medical supplies".to_string(),
                location_id: LocationId("loc-icu".to_string()),
                location: "ICU-01".to_string(),
                suggested_quantity: 80,
                urgency: Urgency::Medium,
                estimated_delivery: Utc::now(),
            },
        ];

        let text = composer.render_suggestions(&suggestions);
        assert!(text.contains("Transfer up to 15 units"));
        assert!(text.contains("Reorder 80 units"));
        assert!(text.contains("Reply \"yes\""));
    }

    #[tokio::test]
    async fn polish_uses_the_llm_when_it_answers() {
        let composer = ResponseComposer::with_llm(Arc::new(EchoLlm), 1, 0);
        let text = composer.polish("raw template").await;
        assert_eq!(text, "polished prose");
    }

    #[tokio::test]
    async fn polish_falls_back_to_the_template_on_llm_failure() {
        let composer = ResponseComposer::with_llm(Arc::new(FailingLlm), 1, 2);
        let text = composer.polish("raw template").await;
        assert_eq!(text, "raw template");
    }

    #[tokio::test]
    async fn deterministic_composer_never_calls_an_llm() {
        let composer = ResponseComposer::deterministic();
        let text = composer.polish("raw template").await;
        assert_eq!(text, "raw template");
    }
}
