use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::item::ItemId;
use crate::domain::location::LocationId;

/// Quantity of one item held at one location, with the reorder floor
/// configured for that location.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevel {
    pub item_id: ItemId,
    pub item_name: String,
    pub location_id: LocationId,
    pub location_name: String,
    pub current_stock: i64,
    pub minimum_stock: i64,
    pub updated_at: DateTime<Utc>,
}

impl StockLevel {
    pub fn is_below_minimum(&self) -> bool {
        self.current_stock < self.minimum_stock
    }

    /// Units available above this location's own floor. Never negative.
    pub fn surplus(&self) -> i64 {
        (self.current_stock - self.minimum_stock).max(0)
    }
}

/// Result of a quantity adjustment, reported back to the caller so the
/// composer can show before/after numbers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAdjustment {
    pub item_id: ItemId,
    pub item_name: String,
    pub location_id: LocationId,
    pub location_name: String,
    pub previous_stock: i64,
    pub new_stock: i64,
    pub minimum_stock: i64,
}

impl StockAdjustment {
    pub fn delta(&self) -> i64 {
        self.new_stock - self.previous_stock
    }

    pub fn dropped_below_minimum(&self) -> bool {
        self.delta() < 0 && self.new_stock < self.minimum_stock
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{StockAdjustment, StockLevel};
    use crate::domain::item::ItemId;
    use crate::domain::location::LocationId;

    fn level(current: i64, minimum: i64) -> StockLevel {
        StockLevel {
            item_id: ItemId("itm-gloves".to_string()),
            item_name: "surgical gloves".to_string(),
            location_id: LocationId("loc-icu".to_string()),
            location_name: "ICU-01".to_string(),
            current_stock: current,
            minimum_stock: minimum,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn surplus_is_clamped_at_zero() {
        assert_eq!(level(30, 15).surplus(), 15);
        assert_eq!(level(10, 15).surplus(), 0);
    }

    #[test]
    fn adjustment_flags_only_decreases_that_breach_the_minimum() {
        let breached = StockAdjustment {
            item_id: ItemId("itm-gloves".to_string()),
            item_name: "surgical gloves".to_string(),
            location_id: LocationId("loc-icu".to_string()),
            location_name: "ICU-01".to_string(),
            previous_stock: 71,
            new_stock: 66,
            minimum_stock: 70,
        };
        assert!(breached.dropped_below_minimum());

        let increase_below_minimum = StockAdjustment { previous_stock: 60, ..breached.clone() };
        assert!(!increase_below_minimum.dropped_below_minimum());

        let decrease_above_minimum =
            StockAdjustment { previous_stock: 90, new_stock: 80, ..breached };
        assert!(!decrease_above_minimum.dropped_below_minimum());
    }
}
