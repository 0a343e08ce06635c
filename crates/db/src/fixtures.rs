//! Deterministic demo dataset used by the `seed` command and by tests.
//!
//! The quantities are chosen so the walkthrough scenario works out of
//! the box: `medical supplies` at ICU-01 sits one unit above its
//! minimum, ER-01 holds a 15-unit surplus of the same item, and WARD-03
//! holds it exactly at its floor.

use chrono::Utc;

use rust_decimal::Decimal;

use wardstock_core::domain::item::{InventoryItem, ItemId};
use wardstock_core::domain::location::LocationId;
use wardstock_core::domain::stock::StockLevel;

use crate::DbPool;

struct LocationSeed {
    id: &'static str,
    name: &'static str,
    kind: &'static str,
}

struct ItemSeed {
    id: &'static str,
    name: &'static str,
    category: &'static str,
    unit_cost: &'static str,
}

struct StockSeed {
    item_id: &'static str,
    item_name: &'static str,
    location_id: &'static str,
    location_name: &'static str,
    current: i64,
    minimum: i64,
}

const LOCATION_SEEDS: &[LocationSeed] = &[
    LocationSeed { id: "loc-icu-01", name: "ICU-01", kind: "intensive_care" },
    LocationSeed { id: "loc-er-01", name: "ER-01", kind: "emergency_room" },
    LocationSeed { id: "loc-ward-03", name: "WARD-03", kind: "ward" },
];

const ITEM_SEEDS: &[ItemSeed] = &[
    ItemSeed {
        id: "itm-medical-supplies",
        name: "medical supplies",
        category: "general",
        unit_cost: "4.50",
    },
    ItemSeed { id: "itm-surgical-gloves", name: "surgical gloves", category: "ppe", unit_cost: "0.35" },
    ItemSeed { id: "itm-saline-bags", name: "saline bags", category: "fluids", unit_cost: "2.10" },
];

const STOCK_SEEDS: &[StockSeed] = &[
    StockSeed {
        item_id: "itm-medical-supplies",
        item_name: "medical supplies",
        location_id: "loc-icu-01",
        location_name: "ICU-01",
        current: 71,
        minimum: 70,
    },
    StockSeed {
        item_id: "itm-medical-supplies",
        item_name: "medical supplies",
        location_id: "loc-er-01",
        location_name: "ER-01",
        current: 30,
        minimum: 15,
    },
    StockSeed {
        item_id: "itm-medical-supplies",
        item_name: "medical supplies",
        location_id: "loc-ward-03",
        location_name: "WARD-03",
        current: 20,
        minimum: 20,
    },
    StockSeed {
        item_id: "itm-surgical-gloves",
        item_name: "surgical gloves",
        location_id: "loc-icu-01",
        location_name: "ICU-01",
        current: 200,
        minimum: 100,
    },
    StockSeed {
        item_id: "itm-surgical-gloves",
        item_name: "surgical gloves",
        location_id: "loc-ward-03",
        location_name: "WARD-03",
        current: 150,
        minimum: 80,
    },
    StockSeed {
        item_id: "itm-saline-bags",
        item_name: "saline bags",
        location_id: "loc-er-01",
        location_name: "ER-01",
        current: 60,
        minimum: 40,
    },
    StockSeed {
        item_id: "itm-saline-bags",
        item_name: "saline bags",
        location_id: "loc-ward-03",
        location_name: "WARD-03",
        current: 45,
        minimum: 30,
    },
];

#[derive(Clone, Debug)]
pub struct SeedResult {
    pub locations: usize,
    pub items: usize,
    pub stock_rows: usize,
}

#[derive(Clone, Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}

pub struct DemoDataset;

impl DemoDataset {
    /// Idempotent: rows are upserted, so reseeding resets quantities to
    /// the baseline instead of failing.
    pub async fn load(pool: &DbPool) -> Result<SeedResult, sqlx::Error> {
        let now = Utc::now().to_rfc3339();

        for location in LOCATION_SEEDS {
            sqlx::query(
                "INSERT INTO locations (id, name, kind, created_at) VALUES (?, ?, ?, ?)
                 ON CONFLICT(id) DO UPDATE SET name = excluded.name, kind = excluded.kind",
            )
            .bind(location.id)
            .bind(location.name)
            .bind(location.kind)
            .bind(&now)
            .execute(pool)
            .await?;
        }

        for item in ITEM_SEEDS {
            sqlx::query(
                "INSERT INTO inventory_items (id, name, category, unit_cost, created_at)
                 VALUES (?, ?, ?, ?, ?)
                 ON CONFLICT(id) DO UPDATE SET
                     name = excluded.name,
                     category = excluded.category,
                     unit_cost = excluded.unit_cost",
            )
            .bind(item.id)
            .bind(item.name)
            .bind(item.category)
            .bind(item.unit_cost)
            .bind(&now)
            .execute(pool)
            .await?;
        }

        for stock in STOCK_SEEDS {
            sqlx::query(
                "INSERT INTO stock_levels (item_id, location_id, current_stock, minimum_stock, updated_at)
                 VALUES (?, ?, ?, ?, ?)
                 ON CONFLICT(item_id, location_id) DO UPDATE SET
                     current_stock = excluded.current_stock,
                     minimum_stock = excluded.minimum_stock,
                     updated_at = excluded.updated_at",
            )
            .bind(stock.item_id)
            .bind(stock.location_id)
            .bind(stock.current)
            .bind(stock.minimum)
            .bind(&now)
            .execute(pool)
            .await?;
        }

        Ok(SeedResult {
            locations: LOCATION_SEEDS.len(),
            items: ITEM_SEEDS.len(),
            stock_rows: STOCK_SEEDS.len(),
        })
    }

    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, sqlx::Error> {
        let locations: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM locations").fetch_one(pool).await?;
        let items: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM inventory_items").fetch_one(pool).await?;
        let stock_rows: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM stock_levels").fetch_one(pool).await?;
        let icu_medical: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM stock_levels
             WHERE item_id = 'itm-medical-supplies' AND location_id = 'loc-icu-01'",
        )
        .fetch_one(pool)
        .await?;

        let checks = vec![
            ("locations", locations >= LOCATION_SEEDS.len() as i64),
            ("inventory_items", items >= ITEM_SEEDS.len() as i64),
            ("stock_levels", stock_rows >= STOCK_SEEDS.len() as i64),
            ("icu_medical_supplies_row", icu_medical == 1),
        ];
        let all_present = checks.iter().all(|(_, passed)| *passed);

        Ok(VerificationResult { all_present, checks })
    }

    /// The item catalog as plain values, for in-memory repositories.
    pub fn items() -> Vec<InventoryItem> {
        let now = Utc::now();
        ITEM_SEEDS
            .iter()
            .map(|seed| InventoryItem {
                id: ItemId(seed.id.to_string()),
                name: seed.name.to_string(),
                category: seed.category.to_string(),
                unit_cost: seed.unit_cost.parse::<Decimal>().unwrap_or_default(),
                created_at: now,
            })
            .collect()
    }

    /// The same baseline as plain values, for in-memory repositories.
    pub fn stock_levels() -> Vec<StockLevel> {
        let now = Utc::now();
        STOCK_SEEDS
            .iter()
            .map(|seed| StockLevel {
                item_id: ItemId(seed.item_id.to_string()),
                item_name: seed.item_name.to_string(),
                location_id: LocationId(seed.location_id.to_string()),
                location_name: seed.location_name.to_string(),
                current_stock: seed.current,
                minimum_stock: seed.minimum,
                updated_at: now,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::DemoDataset;
    use crate::{connect_with_settings, migrations};

    #[tokio::test]
    async fn load_then_verify_reports_all_present() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");

        let seeded = DemoDataset::load(&pool).await.expect("seed");
        assert_eq!(seeded.locations, 3);
        assert_eq!(seeded.stock_rows, 7);

        let verification = DemoDataset::verify(&pool).await.expect("verify");
        assert!(verification.all_present, "failed checks: {:?}", verification.checks);
    }

    #[tokio::test]
    async fn reseeding_is_idempotent_and_resets_quantities() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");

        DemoDataset::load(&pool).await.expect("first seed");
        sqlx::query("UPDATE stock_levels SET current_stock = 1 WHERE item_id = 'itm-medical-supplies'")
            .execute(&pool)
            .await
            .expect("tamper");

        DemoDataset::load(&pool).await.expect("second seed");

        let icu: i64 = sqlx::query_scalar(
            "SELECT current_stock FROM stock_levels
             WHERE item_id = 'itm-medical-supplies' AND location_id = 'loc-icu-01'",
        )
        .fetch_one(&pool)
        .await
        .expect("query");
        assert_eq!(icu, 71);
    }
}
