//! Free-text intent classification.
//!
//! The classifier is deliberately deterministic: a fixed priority of checks
//! over a lexicon of known item and location names. It never fails — text it
//! cannot place classifies as [`Intent::GeneralAssistance`].

use wardstock_core::Decision;

/// The closed set of things a chat message can ask for. Matched exhaustively
/// by the executor, so adding a variant is a compile error until every
/// dispatch site handles it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    StockOverview,
    LocationInquiry,
    ItemInquiry,
    LowStockInquiry,
    StockModification,
    ApprovalReply,
    PendingOrdersInquiry,
    TransferHistory,
    GeneralAssistance,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StockOverview => "stock_overview",
            Self::LocationInquiry => "location_inquiry",
            Self::ItemInquiry => "item_inquiry",
            Self::LowStockInquiry => "low_stock_inquiry",
            Self::StockModification => "stock_modification",
            Self::ApprovalReply => "approval_reply",
            Self::PendingOrdersInquiry => "pending_orders_inquiry",
            Self::TransferHistory => "transfer_history",
            Self::GeneralAssistance => "general_assistance",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeltaDirection {
    Increase,
    Decrease,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassifiedIntent {
    pub primary: Intent,
    pub item_mention: Option<String>,
    pub location_mention: Option<String>,
    pub quantity: Option<i64>,
    pub direction: Option<DeltaDirection>,
    pub decision: Option<Decision>,
    pub keywords: Vec<String>,
}

#[derive(Clone, Debug)]
struct LexiconEntry {
    canonical: String,
    normalized: String,
}

impl LexiconEntry {
    fn new(name: String) -> Self {
        let normalized = normalize(&name);
        Self { canonical: name, normalized }
    }
}

/// Classifier over a lexicon of known item and location names, typically
/// loaded from the inventory at startup.
#[derive(Clone, Debug, Default)]
pub struct IntentClassifier {
    item_names: Vec<LexiconEntry>,
    location_names: Vec<LexiconEntry>,
}

impl IntentClassifier {
    pub fn with_lexicon(item_names: Vec<String>, location_names: Vec<String>) -> Self {
        Self {
            item_names: item_names.into_iter().map(LexiconEntry::new).collect(),
            location_names: location_names.into_iter().map(LexiconEntry::new).collect(),
        }
    }

    pub fn classify(&self, text: &str) -> ClassifiedIntent {
        let normalized = normalize(text);
        let tokens = tokenize(&normalized);

        let item_mention = self.match_phrase(&self.item_names, &tokens);
        let location_mention = self.match_phrase(&self.location_names, &tokens);
        let quantity = extract_quantity(&tokens);
        let direction = extract_direction(&tokens);
        let decision = extract_decision(&tokens);
        let keywords = collect_keywords(&tokens);

        let primary = if decision.is_some() {
            Intent::ApprovalReply
        } else if direction.is_some() && quantity.is_some() {
            Intent::StockModification
        } else if mentions_low_stock(&normalized) {
            Intent::LowStockInquiry
        } else if mentions_pending_orders(&normalized) {
            Intent::PendingOrdersInquiry
        } else if mentions_transfers(&tokens) {
            Intent::TransferHistory
        } else if location_mention.is_some() && item_mention.is_none() {
            Intent::LocationInquiry
        } else if item_mention.is_some() {
            Intent::ItemInquiry
        } else if mentions_overview(&normalized, &tokens) {
            Intent::StockOverview
        } else {
            Intent::GeneralAssistance
        };

        ClassifiedIntent {
            primary,
            item_mention,
            location_mention,
            quantity,
            direction,
            decision,
            keywords,
        }
    }

    /// Longest lexicon phrase whose words appear as a contiguous token run.
    /// Token-level comparison gives word-boundary semantics, so "er" inside
    /// "never" cannot match the ER location. Returns the canonical name for
    /// downstream repository lookups.
    fn match_phrase(&self, lexicon: &[LexiconEntry], tokens: &[String]) -> Option<String> {
        let mut best: Option<&LexiconEntry> = None;
        for entry in lexicon {
            let words: Vec<&str> = entry.normalized.split_whitespace().collect();
            if words.is_empty() || words.len() > tokens.len() {
                continue;
            }
            let found = tokens
                .windows(words.len())
                .any(|window| window.iter().map(String::as_str).eq(words.iter().copied()));
            if found && best.map_or(true, |current| entry.normalized.len() > current.normalized.len())
            {
                best = Some(entry);
            }
        }
        best.map(|entry| entry.canonical.clone())
    }
}

fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for character in text.chars() {
        if character.is_ascii_alphanumeric() {
            out.push(character.to_ascii_lowercase());
        } else {
            out.push(' ');
        }
    }
    out
}

fn tokenize(normalized: &str) -> Vec<String> {
    normalized.split_whitespace().map(|token| token.to_string()).collect()
}

fn extract_quantity(tokens: &[String]) -> Option<i64> {
    tokens.iter().find_map(|token| token.parse::<i64>().ok()).filter(|quantity| *quantity > 0)
}

fn extract_direction(tokens: &[String]) -> Option<DeltaDirection> {
    for token in tokens {
        match token.as_str() {
            "reduce" | "decrease" | "remove" | "deduct" | "use" | "used" | "consume"
            | "consumed" | "take" => return Some(DeltaDirection::Decrease),
            "increase" | "add" | "restock" | "receive" | "received" | "replenish" => {
                return Some(DeltaDirection::Increase)
            }
            _ => {}
        }
    }
    None
}

fn extract_decision(tokens: &[String]) -> Option<Decision> {
    // Bare replies only: the decision word must open the message and anything
    // after it must be courtesy filler. "no problem" or "yes please tell
    // me..." must not consume a pending suggestion.
    const COURTESY_FILLER: &[&str] = &["please", "thanks", "thank", "you", "do", "it", "that"];

    if tokens.len() > 4 {
        return None;
    }
    let decision = match tokens.first()?.as_str() {
        "yes" | "yeah" | "yep" | "sure" | "approve" | "approved" | "confirm" | "confirmed"
        | "ok" | "okay" => Decision::Approve,
        "no" | "nope" | "reject" | "rejected" | "deny" | "denied" | "cancel" => Decision::Reject,
        _ => return None,
    };
    tokens[1..]
        .iter()
        .all(|token| COURTESY_FILLER.contains(&token.as_str()))
        .then_some(decision)
}

fn mentions_low_stock(normalized: &str) -> bool {
    normalized.contains("running low")
        || normalized.contains("low stock")
        || normalized.contains("low on")
        || normalized.contains("below minimum")
        || normalized.contains("understocked")
}

fn mentions_pending_orders(normalized: &str) -> bool {
    normalized.contains("pending order") || normalized.contains("pending approval")
}

fn mentions_transfers(tokens: &[String]) -> bool {
    tokens.iter().any(|token| token == "transfer" || token == "transfers")
}

fn mentions_overview(normalized: &str, tokens: &[String]) -> bool {
    tokens.iter().any(|token| token == "inventory" || token == "stock" || token == "supplies")
        || normalized.contains("what do we have")
}

fn collect_keywords(tokens: &[String]) -> Vec<String> {
    const SIGNAL_WORDS: &[&str] = &[
        "reduce", "increase", "add", "remove", "restock", "transfer", "order", "reorder",
        "inventory", "stock", "low", "pending", "yes", "no",
    ];
    tokens.iter().filter(|token| SIGNAL_WORDS.contains(&token.as_str())).cloned().collect()
}
