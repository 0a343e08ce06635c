use std::env;
use std::sync::{Mutex, OnceLock};

use serde_json::Value;
use wardstock_cli::commands::{migrate, seed};

#[test]
fn migrate_returns_success_with_valid_env() {
    with_env(&[
        ("WARDSTOCK_DATABASE_URL", "sqlite::memory:"),
        ("WARDSTOCK_DATABASE_MAX_CONNECTIONS", "1"),
    ], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 0, "expected successful migrate run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "ok");
    });
}

#[test]
fn migrate_returns_config_failure_with_a_non_sqlite_url() {
    with_env(&[("WARDSTOCK_DATABASE_URL", "postgres://nope")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn seed_reports_the_loaded_row_counts() {
    with_env(&[
        ("WARDSTOCK_DATABASE_URL", "sqlite::memory:"),
        ("WARDSTOCK_DATABASE_MAX_CONNECTIONS", "1"),
    ], || {
        let result = seed::run();
        assert_eq!(result.exit_code, 0, "expected successful seed run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "seed");
        assert_eq!(payload["status"], "ok");

        let message = payload["message"].as_str().unwrap_or("");
        assert!(message.contains("3 locations"));
        assert!(message.contains("3 items"));
        assert!(message.contains("7 stock rows"));
    });
}

#[test]
fn seed_is_idempotent_across_runs() {
    with_env(&[
        ("WARDSTOCK_DATABASE_URL", "sqlite::memory:"),
        ("WARDSTOCK_DATABASE_MAX_CONNECTIONS", "1"),
    ], || {
        let first = seed::run();
        assert_eq!(first.exit_code, 0, "expected first seed invocation success");

        let second = seed::run();
        assert_eq!(second.exit_code, 0, "expected second seed invocation success");

        let first_payload = parse_payload(&first.output);
        let second_payload = parse_payload(&second.output);
        assert_eq!(first_payload["message"], second_payload["message"]);
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "WARDSTOCK_DATABASE_URL",
        "WARDSTOCK_DATABASE_MAX_CONNECTIONS",
        "WARDSTOCK_DATABASE_TIMEOUT_SECS",
        "WARDSTOCK_LLM_PROVIDER",
        "WARDSTOCK_LLM_API_KEY",
        "WARDSTOCK_LLM_BASE_URL",
        "WARDSTOCK_LLM_MODEL",
        "WARDSTOCK_LLM_TIMEOUT_SECS",
        "WARDSTOCK_LLM_MAX_RETRIES",
        "WARDSTOCK_SERVER_BIND_ADDRESS",
        "WARDSTOCK_SERVER_PORT",
        "WARDSTOCK_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "WARDSTOCK_SESSION_TTL_SECS",
        "WARDSTOCK_SESSION_SWEEP_INTERVAL_SECS",
        "WARDSTOCK_LOGGING_LEVEL",
        "WARDSTOCK_LOGGING_FORMAT",
        "WARDSTOCK_LOG_LEVEL",
        "WARDSTOCK_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
