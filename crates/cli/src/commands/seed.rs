use crate::commands::{block_on, load_config, CommandResult};
use wardstock_db::{connect_from_config, migrations, DbPool, DemoDataset, SeedResult};

pub fn run() -> CommandResult {
    let config = match load_config("seed") {
        Ok(config) => config,
        Err(failure) => return failure,
    };

    let outcome = block_on("seed", async {
        let pool = connect_from_config(&config.database)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;

        let result = seed_and_verify(&pool).await;
        pool.close().await;
        result
    });

    match outcome {
        Ok(Ok(seeded)) => CommandResult::success(
            "seed",
            format!(
                "demo dataset loaded: {} locations, {} items, {} stock rows",
                seeded.locations, seeded.items, seeded.stock_rows
            ),
        ),
        Ok(Err((error_class, message, exit_code))) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
        Err(failure) => failure,
    }
}

async fn seed_and_verify(pool: &DbPool) -> Result<SeedResult, (&'static str, String, u8)> {
    migrations::run_pending(pool).await.map_err(|error| ("migration", error.to_string(), 5u8))?;

    let seeded =
        DemoDataset::load(pool).await.map_err(|error| ("seed_execution", error.to_string(), 5u8))?;

    let verification = DemoDataset::verify(pool)
        .await
        .map_err(|error| ("seed_verification", error.to_string(), 6u8))?;

    if verification.all_present {
        return Ok(seeded);
    }

    let failed_checks = verification
        .checks
        .iter()
        .filter_map(|(check, passed)| (!passed).then_some(*check))
        .collect::<Vec<_>>();
    let message = if failed_checks.is_empty() {
        "some seed data failed to load".to_string()
    } else {
        format!("seed verification failed for checks: {}", failed_checks.join(", "))
    };
    Err(("seed_verification", message, 6u8))
}
