use clap::Parser;

mod commands;
mod error;
mod logging;

use commands::cli;
use error::CliError;
use phishshield_core::api as core_api;

#[tokio::main]
async fn main() {
    let args = cli::Args::parse();

    let cfg = match load_config(&args) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let guard = match logging::init(&cfg.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("failed to initialize logging: {e}");
            std::process::exit(1);
        }
    };

    let code = match dispatch(args.command, &cfg).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("{e}");
            1
        }
    };

    // process::exit skips destructors; flush the log writer first.
    drop(guard);
    std::process::exit(code);
}

/// File and environment first, then command line flags, validated last.
fn load_config(args: &cli::Args) -> Result<core_api::AppConfig, CliError> {
    let mut cfg = core_api::load(args.config.as_deref())?;
    args.apply_overrides(&mut cfg);
    core_api::validate(&cfg)?;
    Ok(cfg)
}

async fn dispatch(cmd: cli::Commands, cfg: &core_api::AppConfig) -> Result<i32, CliError> {
    match cmd {
        cli::Commands::Watch(_) => commands::watch::handle_watch(cfg).await,
        cli::Commands::Check(check) => commands::check::handle_check(&check.url, cfg).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let args = cli::Args::try_parse_from([
            "phishshield",
            "--config",
            path.to_str().unwrap(),
            "check",
            "https://example.com",
        ])
        .unwrap();

        let err = load_config(&args).unwrap_err();
        assert!(matches!(
            err,
            CliError::Config(core_api::ConfigError::NotFound(_))
        ));
    }

    #[test]
    fn override_that_breaks_validation_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phishshield.toml");
        std::fs::write(&path, "[scoring]\ntimeout_ms = 2000\n").unwrap();
        let args = cli::Args::try_parse_from([
            "phishshield",
            "--config",
            path.to_str().unwrap(),
            "--score-url",
            " ",
            "check",
            "https://example.com",
        ])
        .unwrap();

        let err = load_config(&args).unwrap_err();
        assert!(matches!(
            err,
            CliError::Config(core_api::ConfigError::Validation(_))
        ));
    }
}
