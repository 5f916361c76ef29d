use std::path::{Path, PathBuf};

use super::types::AppConfig;
use crate::errors::ConfigError;

pub const LOCAL_CONFIG_FILE: &str = "phishshield.toml";

pub const ENV_SCORE_URL: &str = "PHISHSHIELD_SCORE_URL";
pub const ENV_BLOCK_PAGE_URL: &str = "PHISHSHIELD_BLOCK_PAGE_URL";
pub const ENV_LOG_LEVEL: &str = "PHISHSHIELD_LOG_LEVEL";

/// Loads `path` when given (it must exist), else `./phishshield.toml`, else
/// `<config_dir>/phishshield/config.toml`, falling back to defaults. Environment
/// overrides are applied on top.
pub fn load(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let source = match path {
        Some(p) => {
            let expanded = expand_path(p);
            if !expanded.exists() {
                return Err(ConfigError::NotFound(expanded.display().to_string()));
            }
            Some(expanded)
        }
        None => discover(),
    };

    let mut cfg = match source {
        Some(p) => {
            tracing::debug!(target: "phishshield.config", path = %p.display(), "loading config file");
            parse_file(&p)?
        }
        None => AppConfig::default(),
    };

    apply_env_overrides(&mut cfg, |key| std::env::var(key).ok());
    validate(&cfg)?;
    Ok(cfg)
}

fn discover() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.exists() {
        return Some(local);
    }
    dirs::config_dir()
        .map(|d| d.join("phishshield").join("config.toml"))
        .filter(|p| p.exists())
}

fn expand_path(p: &Path) -> PathBuf {
    let raw = p.to_string_lossy();
    PathBuf::from(shellexpand::tilde(raw.as_ref()).into_owned())
}

fn parse_file(path: &Path) -> Result<AppConfig, ConfigError> {
    let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str::<AppConfig>(&s).map_err(|e| ConfigError::Parse(e.into()))
}

/// Blank values are ignored.
pub fn apply_env_overrides<F>(cfg: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = get(ENV_SCORE_URL) {
        cfg.scoring.endpoint = v;
    }
    if let Some(v) = get(ENV_BLOCK_PAGE_URL) {
        cfg.gatekeeper.block_page_url = v;
    }
    if let Some(v) = get(ENV_LOG_LEVEL) {
        cfg.logging.level = v;
    }
    if let Some(file) = cfg.logging.file.as_mut() {
        *file = shellexpand::tilde(file.as_str()).into_owned();
    }
    if !cfg.events_out.path.is_empty() && cfg.events_out.path != "stdout:" {
        cfg.events_out.path = shellexpand::tilde(&cfg.events_out.path).into_owned();
    }
}

pub fn validate(cfg: &AppConfig) -> Result<(), ConfigError> {
    if cfg.scoring.endpoint.trim().is_empty() {
        return Err(ConfigError::Validation("scoring.endpoint is empty".into()));
    }
    if cfg.scoring.timeout_ms == 0 {
        return Err(ConfigError::Validation("scoring.timeout_ms must be > 0".into()));
    }
    if cfg.cache.capacity == 0 {
        return Err(ConfigError::Validation("cache.capacity must be > 0".into()));
    }
    if cfg.cache.ttl_secs == Some(0) {
        return Err(ConfigError::Validation(
            "cache.ttl_secs must be > 0 when set".into(),
        ));
    }
    if cfg.gatekeeper.block_page_url.trim().is_empty() {
        return Err(ConfigError::Validation(
            "gatekeeper.block_page_url is empty".into(),
        ));
    }
    if cfg.events_out.enabled && cfg.events_out.channel_capacity == 0 {
        return Err(ConfigError::Validation(
            "events_out.channel_capacity must be > 0".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[scoring]\nendpoint = \"http://scorer.local/api/v1/score\"\n\n[cache]\ncapacity = 16\nttl_secs = 600"
        )
        .unwrap();

        let cfg = load(Some(file.path())).unwrap();
        assert_eq!(cfg.scoring.endpoint, "http://scorer.local/api/v1/score");
        assert_eq!(cfg.scoring.timeout_ms, 5_000);
        assert_eq!(cfg.cache.capacity, 16);
        assert_eq!(cfg.cache.ttl_secs, Some(600));
        assert!(cfg.gatekeeper.revalidate_tab);
        assert!(cfg
            .gatekeeper
            .internal_prefixes
            .iter()
            .any(|p| p == "chrome://"));
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[cache\ncapacity = ").unwrap();
        let err = load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[cache]\ncapacity = 0").unwrap();
        let err = load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn env_overrides_skip_blank_values() {
        let env: HashMap<&str, &str> = [
            (ENV_SCORE_URL, "http://10.0.0.2:8000/api/v1/score"),
            (ENV_BLOCK_PAGE_URL, "   "),
        ]
        .into_iter()
        .collect();

        let mut cfg = AppConfig::default();
        apply_env_overrides(&mut cfg, |k| env.get(k).map(|v| v.to_string()));

        assert_eq!(cfg.scoring.endpoint, "http://10.0.0.2:8000/api/v1/score");
        assert_eq!(
            cfg.gatekeeper.block_page_url,
            AppConfig::default().gatekeeper.block_page_url
        );
    }
}
