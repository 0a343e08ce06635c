use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::item::ItemId;
use crate::domain::location::LocationId;
use crate::domain::order::PendingOrder;

/// Conversation memory is keyed by the pair, never by user or session
/// alone: the same user may hold independent conversations.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    pub user_id: String,
    pub session_id: String,
}

impl SessionKey {
    pub fn new(user_id: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self { user_id: user_id.into(), session_id: session_id.into() }
    }
}

/// What kind of reply, if any, the session is currently awaiting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationContext {
    #[default]
    GeneralAssistance,
    InventoryModification,
    InterTransfer,
    PurchaseApproval,
}

impl ConversationContext {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GeneralAssistance => "general_assistance",
            Self::InventoryModification => "inventory_modification",
            Self::InterTransfer => "inter_transfer",
            Self::PurchaseApproval => "purchase_approval",
        }
    }

    /// Contexts in which a bare yes/no answer is meaningful.
    pub fn awaits_decision(&self) -> bool {
        matches!(self, Self::InterTransfer | Self::PurchaseApproval)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Medium,
    High,
    Critical,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// A corrective action proposed after a low-stock-triggering modification,
/// held in session memory until the user approves or rejects it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Suggestion {
    InterTransfer {
        item_id: ItemId,
        item_name: String,
        from_location_id: LocationId,
        from_location: String,
        to_location_id: LocationId,
        to_location: String,
        suggested_quantity: i64,
        available_quantity: i64,
        urgency: Urgency,
    },
    AutomaticReorder {
        item_id: ItemId,
        item_name: String,
        location_id: LocationId,
        location: String,
        suggested_quantity: i64,
        urgency: Urgency,
        estimated_delivery: DateTime<Utc>,
    },
}

impl Suggestion {
    /// The context a session enters while this suggestion waits for a
    /// yes/no answer.
    pub fn awaiting_context(&self) -> ConversationContext {
        match self {
            Self::InterTransfer { .. } => ConversationContext::InterTransfer,
            Self::AutomaticReorder { .. } => ConversationContext::PurchaseApproval,
        }
    }

    pub fn item_name(&self) -> &str {
        match self {
            Self::InterTransfer { item_name, .. } => item_name,
            Self::AutomaticReorder { item_name, .. } => item_name,
        }
    }
}

/// Per-session state for the approval workflow. Entries expire via the
/// session store's TTL rather than living for the whole process.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConversationMemory {
    pub context: ConversationContext,
    pub entities_mentioned: Vec<String>,
    pub actions_performed: Vec<String>,
    pub pending_suggestions: Vec<Suggestion>,
    pub pending_orders: Vec<PendingOrder>,
    pub last_updated: DateTime<Utc>,
}

impl ConversationMemory {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            context: ConversationContext::GeneralAssistance,
            entities_mentioned: Vec::new(),
            actions_performed: Vec::new(),
            pending_suggestions: Vec::new(),
            pending_orders: Vec::new(),
            last_updated: now,
        }
    }

    pub fn note_entity(&mut self, entity: impl Into<String>) {
        let entity = entity.into();
        if !self.entities_mentioned.contains(&entity) {
            self.entities_mentioned.push(entity);
        }
    }

    /// Replaces any still-pending suggestions with a fresh list and moves
    /// the context to the first suggestion's awaiting state. A new
    /// triggering modification always supersedes unresolved proposals.
    pub fn replace_suggestions(&mut self, suggestions: Vec<Suggestion>) {
        self.context = suggestions
            .first()
            .map(Suggestion::awaiting_context)
            .unwrap_or(ConversationContext::GeneralAssistance);
        self.pending_suggestions = suggestions;
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{ConversationContext, ConversationMemory, Suggestion, Urgency};
    use crate::domain::item::ItemId;
    use crate::domain::location::LocationId;

    fn transfer_suggestion() -> Suggestion {
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
        }
    }

    fn reorder_suggestion() -> Suggestion {
        Suggestion::AutomaticReorder {
            item_id: ItemId("itm-1".to_string()),
            item_name: "medical supplies".to_string(),
            location_id: LocationId("loc-icu".to_string()),
            location: "ICU-01".to_string(),
            suggested_quantity: 80,
            urgency: Urgency::Medium,
            estimated_delivery: Utc::now(),
        }
    }

    #[test]
    fn replacing_suggestions_resets_context_to_first_pending() {
        let mut memory = ConversationMemory::new(Utc::now());
        memory.replace_suggestions(vec![transfer_suggestion(), reorder_suggestion()]);
        assert_eq!(memory.context, ConversationContext::InterTransfer);

        memory.replace_suggestions(vec![reorder_suggestion()]);
        assert_eq!(memory.context, ConversationContext::PurchaseApproval);
        assert_eq!(memory.pending_suggestions.len(), 1);

        memory.replace_suggestions(Vec::new());
        assert_eq!(memory.context, ConversationContext::GeneralAssistance);
    }

    #[test]
    fn entities_are_deduplicated() {
        let mut memory = ConversationMemory::new(Utc::now());
        memory.note_entity("medical supplies");
        memory.note_entity("medical supplies");
        memory.note_entity("ICU-01");
        assert_eq!(memory.entities_mentioned.len(), 2);
    }
}
