pub mod doctor;
pub mod migrate;
pub mod seed;

use std::future::Future;

use serde_json::json;
use wardstock_core::config::{AppConfig, LoadOptions};

/// What a subcommand hands back to `main`: a JSON line for stdout and the
/// process exit code.
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let body = json!({
            "command": command,
            "status": "ok",
            "message": message.into(),
        });
        Self { exit_code: 0, output: body.to_string() }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let body = json!({
            "command": command,
            "status": "error",
            "error_class": error_class,
            "message": message.into(),
        });
        Self { exit_code, output: body.to_string() }
    }
}

/// Shared preamble: load and validate configuration, mapping failure to the
/// command's `config_validation` outcome.
pub(crate) fn load_config(command: &str) -> Result<AppConfig, CommandResult> {
    AppConfig::load(LoadOptions::default()).map_err(|error| {
        CommandResult::failure(command, "config_validation", format!("configuration issue: {error}"), 2)
    })
}

/// Runs a command's async body on a throwaway current-thread runtime.
pub(crate) fn block_on<T>(
    command: &str,
    future: impl Future<Output = T>,
) -> Result<T, CommandResult> {
    let runtime =
        tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
            CommandResult::failure(
                command,
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            )
        })?;
    Ok(runtime.block_on(future))
}
