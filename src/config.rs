use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::AppError;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub seed_demo_data: bool,
    /// Snapshot to seed from instead of the bundled demo courses.
    pub seed_file: Option<PathBuf>,
}

impl AppConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| AppError::BadRequest(format!("BIND_ADDR is invalid: {}", e)))?;

        let seed_demo_data = match lookup("SEED_DEMO_DATA") {
            Some(raw) => parse_flag("SEED_DEMO_DATA", &raw)?,
            None => true,
        };

        let seed_file = lookup("SEED_FILE")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            bind_addr,
            seed_demo_data,
            seed_file,
        })
    }
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(AppError::BadRequest(format!(
            "{} must be a boolean, got {:?}",
            key, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig, AppError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:3000".parse().unwrap());
        assert!(config.seed_demo_data);
        assert!(config.seed_file.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("BIND_ADDR", "0.0.0.0:8080"),
            ("SEED_DEMO_DATA", "off"),
            ("SEED_FILE", "/tmp/export.json"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr.port(), 8080);
        assert!(!config.seed_demo_data);
        assert_eq!(config.seed_file, Some(PathBuf::from("/tmp/export.json")));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            config_from(&[("BIND_ADDR", "nowhere")]),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            config_from(&[("SEED_DEMO_DATA", "maybe")]),
            Err(AppError::BadRequest(_))
        ));
    }
}
