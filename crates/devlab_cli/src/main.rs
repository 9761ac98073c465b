//! CLI smoke entry point.
//!
//! # Responsibility
//! - Load boundary configuration and start file logging.
//! - Open the configured database and report its schema version.
//! - Keep output deterministic for quick local sanity checks.

use devlab_api::ApiConfig;
use devlab_core::db::migrations::{current_user_version, latest_version};
use std::process::ExitCode;

fn main() -> ExitCode {
    let config = ApiConfig::from_env();
    if let Err(err) = config.init_logging() {
        eprintln!("warning: logging disabled: {err}");
    }

    println!("devlab ping={}", devlab_api::ping());
    println!("devlab version={}", devlab_api::core_version());
    println!("devlab db_path={}", config.db_path.display());

    let conn = match config.open_db() {
        Ok(conn) => conn,
        Err(err) => {
            log::error!(
                "event=cli_smoke module=cli status=error db_path={} error={}",
                config.db_path.display(),
                err
            );
            eprintln!("error: failed to open database: {err}");
            return ExitCode::FAILURE;
        }
    };

    match current_user_version(&conn) {
        Ok(version) => {
            println!("devlab schema_version={version}/{}", latest_version());
            log::info!(
                "event=cli_smoke module=cli status=ok schema_version={}",
                version
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: failed to read schema version: {err}");
            ExitCode::FAILURE
        }
    }
}
