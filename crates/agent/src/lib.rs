//! Conversational agent for ward inventory operations.
//!
//! This crate is the "brain" of the wardstock service: it turns a free-text
//! chat message into inventory actions and an approve/reject workflow.
//!
//! # Architecture
//!
//! A turn runs through a fixed pipeline:
//! 1. **Classification** (`classifier`) — parse natural language into a closed
//!    [`classifier::Intent`] with extracted entities.
//! 2. **Execution** (`executor`) — dispatch the intent to a repository-backed
//!    handler, returning a typed [`executor::ActionOutcome`].
//! 3. **Suggestion & approval** — when a modification breaches a minimum, the
//!    core suggestion engine proposes transfers/reorders; a later "yes"/"no"
//!    consumes exactly one pending suggestion.
//! 4. **Composition** (`composer`) — render the outcome as text, optionally
//!    polished by an LLM; the deterministic template is always the fallback.
//!
//! # Safety principle
//!
//! The LLM only rephrases prose. It never decides quantities, transfers, or
//! approvals; those are deterministic decisions made by the core crate and the
//! repositories.

pub mod classifier;
pub mod composer;
pub mod executor;
pub mod llm;
pub mod memory;
pub mod runtime;

pub use classifier::{ClassifiedIntent, Intent, IntentClassifier};
pub use composer::ResponseComposer;
pub use executor::{ActionKind, ActionOutcome, AgentAction, Executor};
pub use llm::{HttpLlmClient, LlmClient, NoopLlmClient};
pub use memory::SessionStore;
pub use runtime::{ActionRecord, AgentRuntime, ConversationReply, IntentSummary};
