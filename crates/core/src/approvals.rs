//! The yes/no half of the conversation workflow.
//!
//! A session holding pending suggestions sits in the awaiting context of
//! the first suggestion in its list. An affirmative or negative reply
//! consumes exactly one suggestion (the first matching the current
//! context) and moves the session to the next pending suggestion's
//! context, or back to general assistance when none remain. A reply with
//! nothing pending resolves to [`ApprovalOutcome::NothingPending`] and
//! never re-executes an already-consumed suggestion.
//!
//! This module decides; it does not execute. Side effects (the transfer
//! transaction, the purchase order, the deferred pending order) belong
//! to the caller.

use crate::domain::session::{ConversationContext, Suggestion};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApprovalOutcome {
    /// The consumed suggestion should be executed: a transfer moves
    /// stock atomically, a reorder places a purchase order.
    Approved(Suggestion),
    /// The consumed suggestion is deferred to a manager as a pending
    /// order and otherwise discarded.
    Rejected(Suggestion),
    /// Nothing was awaiting a decision; the reply is a no-op.
    NothingPending,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub outcome: ApprovalOutcome,
    pub next_context: ConversationContext,
}

/// Context a session should sit in given its pending suggestion list.
pub fn context_for(suggestions: &[Suggestion]) -> ConversationContext {
    suggestions
        .first()
        .map(Suggestion::awaiting_context)
        .unwrap_or(ConversationContext::GeneralAssistance)
}

/// Applies a yes/no reply to the pending suggestion list in place.
pub fn resolve_reply(
    context: ConversationContext,
    suggestions: &mut Vec<Suggestion>,
    decision: Decision,
) -> Resolution {
    if !context.awaits_decision() {
        return Resolution {
            outcome: ApprovalOutcome::NothingPending,
            next_context: context_for(suggestions),
        };
    }

    let Some(index) =
        suggestions.iter().position(|suggestion| suggestion.awaiting_context() == context)
    else {
        // Context drifted from the stored list; resync instead of
        // consuming a suggestion of the wrong kind.
        return Resolution {
            outcome: ApprovalOutcome::NothingPending,
            next_context: context_for(suggestions),
        };
    };

    let consumed = suggestions.remove(index);
    let next_context = context_for(suggestions);
    let outcome = match decision {
        Decision::Approve => ApprovalOutcome::Approved(consumed),
        Decision::Reject => ApprovalOutcome::Rejected(consumed),
    };

    Resolution { outcome, next_context }
}
