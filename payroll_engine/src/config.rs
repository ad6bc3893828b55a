//! Runtime configuration for the payroll server.
//!
//! Values come from the environment; a `.env` file in the working
//! directory is honoured.
//!
//! | Variable                  | Default          |
//! |---------------------------|------------------|
//! | `PAYROLL_BIND_ADDR`       | `127.0.0.1:3000` |
//! | `PAYROLL_COMPONENTS_PATH` | built-in BPJS set |

use std::{
    env,
    net::{SocketAddr, ToSocketAddrs as _},
    path::PathBuf,
};
use thiserror::Error;
use tracing::info;

pub const BIND_ADDR_VAR: &str = "PAYROLL_BIND_ADDR";
pub const COMPONENTS_PATH_VAR: &str = "PAYROLL_COMPONENTS_PATH";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("`{var}` is not a valid socket address: {value}")]
    InvalidAddress { var: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    /// File or directory of component JSON.  `None` means use
    /// [`default_components`](crate::components::default_components).
    pub components_path: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Result<Config, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Builds a config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Config, ConfigError> {
        Ok(Config {
            bind_addr: load_bind_addr(&lookup)?,
            components_path: load_components_path(&lookup),
        })
    }
}

fn load_bind_addr(lookup: &impl Fn(&str) -> Option<String>) -> Result<SocketAddr, ConfigError> {
    info!("Loading environment `{}`", BIND_ADDR_VAR);

    let value = lookup(BIND_ADDR_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
    value
        .to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
        .ok_or(ConfigError::InvalidAddress {
            var: BIND_ADDR_VAR,
            value,
        })
}

fn load_components_path(lookup: &impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    info!("Loading environment `{}`", COMPONENTS_PATH_VAR);

    lookup(COMPONENTS_PATH_VAR)
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var: &str| vars.get(var).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:3000".parse::<SocketAddr>().unwrap());
        assert!(config.components_path.is_none());
    }

    #[test]
    fn reads_both_variables() {
        let config = Config::from_lookup(lookup_from(&[
            (BIND_ADDR_VAR, "0.0.0.0:8080"),
            (COMPONENTS_PATH_VAR, "config/components"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.components_path, Some(PathBuf::from("config/components")));
    }

    #[test]
    fn rejects_garbage_address() {
        let err = Config::from_lookup(lookup_from(&[(BIND_ADDR_VAR, "not-an-address")]))
            .unwrap_err();
        assert!(err.to_string().contains("not-an-address"));
    }
}
