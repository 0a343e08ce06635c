//! Generates corrective proposals after a stock-decreasing modification
//! breaches a location's minimum threshold.
//!
//! Two independent families of proposals are produced: inter-location
//! transfers drawn from other locations' surplus, and a supplier reorder
//! sized to restock the breached location. Both are deterministic; the
//! LLM plays no part here.

use chrono::{DateTime, Duration, Utc};

use crate::domain::session::{Suggestion, Urgency};
use crate::domain::stock::StockLevel;

/// Deterministic suggestion policy. The restock target is twice the
/// minimum threshold, rounded up to the nearest ten units.
#[derive(Clone, Copy, Debug)]
pub struct SuggestionEngine {
    pub restock_multiplier: i64,
    pub rounding_step: i64,
}

impl Default for SuggestionEngine {
    fn default() -> Self {
        Self { restock_multiplier: 2, rounding_step: 10 }
    }
}

impl SuggestionEngine {
    /// Evaluates a just-modified stock level against the same item's
    /// levels at other locations. Returns an empty list when the
    /// modified location is still at or above its minimum.
    ///
    /// Transfer proposals come first, ranked by donor surplus descending,
    /// so the session awaits a transfer decision before a reorder one.
    pub fn evaluate(
        &self,
        modified: &StockLevel,
        other_locations: &[StockLevel],
        now: DateTime<Utc>,
    ) -> Vec<Suggestion> {
        if !modified.is_below_minimum() {
            return Vec::new();
        }

        let mut suggestions = self.transfer_candidates(modified, other_locations);
        suggestions.push(self.reorder(modified, now));
        suggestions
    }

    fn transfer_candidates(
        &self,
        modified: &StockLevel,
        other_locations: &[StockLevel],
    ) -> Vec<Suggestion> {
        let mut donors: Vec<&StockLevel> = other_locations
            .iter()
            .filter(|level| {
                level.item_id == modified.item_id
                    && level.location_id != modified.location_id
                    && level.surplus() > 0
            })
            .collect();
        donors.sort_by(|a, b| b.surplus().cmp(&a.surplus()));

        donors
            .into_iter()
            .map(|donor| Suggestion::InterTransfer {
                item_id: modified.item_id.clone(),
                item_name: modified.item_name.clone(),
                from_location_id: donor.location_id.clone(),
                from_location: donor.location_name.clone(),
                to_location_id: modified.location_id.clone(),
                to_location: modified.location_name.clone(),
                suggested_quantity: donor.surplus(),
                available_quantity: donor.current_stock,
                urgency: Urgency::High,
            })
            .collect()
    }

    fn reorder(&self, modified: &StockLevel, now: DateTime<Utc>) -> Suggestion {
        let target = modified.minimum_stock * self.restock_multiplier;
        let raw = (target - modified.current_stock).max(1);
        let quantity = round_up(raw, self.rounding_step);
        let urgency = reorder_urgency(modified);

        let delivery_days = match urgency {
            Urgency::Critical => 1,
            Urgency::High => 2,
            _ => 3,
        };

        Suggestion::AutomaticReorder {
            item_id: modified.item_id.clone(),
            item_name: modified.item_name.clone(),
            location_id: modified.location_id.clone(),
            location: modified.location_name.clone(),
            suggested_quantity: quantity,
            urgency,
            estimated_delivery: now + Duration::days(delivery_days),
        }
    }
}

fn round_up(value: i64, step: i64) -> i64 {
    if step <= 1 {
        return value;
    }
    value.div_ceil(step) * step
}

/// Urgency tracks how far below the threshold the location has fallen.
fn reorder_urgency(modified: &StockLevel) -> Urgency {
    if modified.minimum_stock <= 0 {
        return Urgency::Low;
    }
    let quarters = modified.current_stock * 4 / modified.minimum_stock;
    match quarters {
        q if q < 1 => Urgency::Critical,
        q if q < 2 => Urgency::High,
        _ => Urgency::Medium,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::SuggestionEngine;
    use crate::domain::item::ItemId;
    use crate::domain::location::LocationId;
    use crate::domain::session::{Suggestion, Urgency};
    use crate::domain::stock::StockLevel;

    fn level(location: &str, current: i64, minimum: i64) -> StockLevel {
        StockLevel {
            item_id: ItemId("itm-medsup".to_string()),
            item_name: "medical supplies".to_string(),
            location_id: LocationId(format!("loc-{}", location.to_ascii_lowercase())),
            location_name: location.to_string(),
            current_stock: current,
            minimum_stock: minimum,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn no_suggestions_when_stock_stays_at_or_above_minimum() {
        let engine = SuggestionEngine::default();
        let suggestions = engine.evaluate(&level("ICU-01", 70, 70), &[level("ER-01", 30, 15)], Utc::now());
        assert!(suggestions.is_empty());
    }

    #[test]
    fn breach_produces_ranked_transfers_then_a_reorder() {
        let engine = SuggestionEngine::default();
        let others = vec![level("ER-01", 30, 15), level("WARD-03", 50, 20), level("OR-02", 10, 12)];
        let suggestions = engine.evaluate(&level("ICU-01", 66, 70), &others, Utc::now());

        // WARD-03 surplus 30, ER-01 surplus 15, OR-02 has none.
        assert_eq!(suggestions.len(), 3);
        match &suggestions[0] {
            Suggestion::InterTransfer { from_location, suggested_quantity, urgency, .. } => {
                assert_eq!(from_location, "WARD-03");
                assert_eq!(*suggested_quantity, 30);
                assert_eq!(*urgency, Urgency::High);
            }
            other => panic!("expected transfer first, got {other:?}"),
        }
        match &suggestions[1] {
            Suggestion::InterTransfer { from_location, suggested_quantity, .. } => {
                assert_eq!(from_location, "ER-01");
                assert_eq!(*suggested_quantity, 15);
            }
            other => panic!("expected transfer second, got {other:?}"),
        }
        assert!(matches!(suggestions[2], Suggestion::AutomaticReorder { .. }));
    }

    #[test]
    fn reorder_restocks_to_twice_the_minimum_rounded_up() {
        let engine = SuggestionEngine::default();
        let suggestions = engine.evaluate(&level("ICU-01", 66, 70), &[], Utc::now());

        assert_eq!(suggestions.len(), 1);
        match &suggestions[0] {
            Suggestion::AutomaticReorder { suggested_quantity, urgency, .. } => {
                // 2 * 70 - 66 = 74, rounded up to 80.
                assert_eq!(*suggested_quantity, 80);
                assert_eq!(*urgency, Urgency::Medium);
            }
            other => panic!("expected reorder, got {other:?}"),
        }
    }

    #[test]
    fn urgency_scales_with_shortfall_depth() {
        let engine = SuggestionEngine::default();

        let deep = engine.evaluate(&level("ICU-01", 10, 70), &[], Utc::now());
        match &deep[0] {
            Suggestion::AutomaticReorder { urgency, .. } => assert_eq!(*urgency, Urgency::Critical),
            other => panic!("expected reorder, got {other:?}"),
        }

        let moderate = engine.evaluate(&level("ICU-01", 25, 70), &[], Utc::now());
        match &moderate[0] {
            Suggestion::AutomaticReorder { urgency, .. } => assert_eq!(*urgency, Urgency::High),
            other => panic!("expected reorder, got {other:?}"),
        }
    }

    #[test]
    fn donor_must_carry_the_same_item() {
        let engine = SuggestionEngine::default();
        let mut other_item = level("ER-01", 90, 10);
        other_item.item_id = ItemId("itm-other".to_string());

        let suggestions = engine.evaluate(&level("ICU-01", 5, 70), &[other_item], Utc::now());
        assert_eq!(suggestions.len(), 1);
        assert!(matches!(suggestions[0], Suggestion::AutomaticReorder { .. }));
    }
}
