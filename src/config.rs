// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DFX_NETWORK` | `ic` for mainnet, anything else for a local replica | `local` |
//! | `CANISTER_ID_DAO` | Governance canister principal | Required |
//! | `CANISTER_ID_TOKEN` | Token canister principal | Required |
//! | `CANISTER_ID_INTERNET_IDENTITY` | Local identity provider canister | Required when local |
//! | `IC_GATEWAY_URL` | JSON call gateway fronting the canisters | Required |
//! | `DATA_DIR` | Root directory for local client state | `.wegrow` |
//! | `IDLE_TIMEOUT_SECS` | Idle time after which a stored session is dropped | `1800` |
//! | `MAX_TIME_TO_LIVE_SECS` | Delegation lifetime requested at login | `28800` |
//! | `LOGIN_TIMEOUT_SECS` | Give up on an interactive login after this long | unbounded |
//! | `LOGIN_CALLBACK_ADDR` | Loopback address for the login callback | `127.0.0.1:0` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `wegrow_dashboard=info,tower_http=debug` |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::identity::{IdentityConfig, Principal, PrincipalError};
use crate::logging::LogFormat;
use crate::storage::paths::DATA_ROOT;

pub const DFX_NETWORK_ENV: &str = "DFX_NETWORK";
pub const CANISTER_ID_DAO_ENV: &str = "CANISTER_ID_DAO";
pub const CANISTER_ID_TOKEN_ENV: &str = "CANISTER_ID_TOKEN";
pub const CANISTER_ID_INTERNET_IDENTITY_ENV: &str = "CANISTER_ID_INTERNET_IDENTITY";
pub const IC_GATEWAY_URL_ENV: &str = "IC_GATEWAY_URL";

/// Environment variable name for the local state directory.
///
/// Holds the key-value store and the credential database; see
/// [`crate::storage`].
pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const IDLE_TIMEOUT_SECS_ENV: &str = "IDLE_TIMEOUT_SECS";
pub const MAX_TIME_TO_LIVE_SECS_ENV: &str = "MAX_TIME_TO_LIVE_SECS";
pub const LOGIN_TIMEOUT_SECS_ENV: &str = "LOGIN_TIMEOUT_SECS";
pub const LOGIN_CALLBACK_ADDR_ENV: &str = "LOGIN_CALLBACK_ADDR";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Mainnet identity provider.
pub const MAINNET_IDENTITY_PROVIDER: &str = "https://identity.ic0.app";

pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_MAX_TIME_TO_LIVE: Duration = Duration::from_secs(8 * 60 * 60);
pub const DEFAULT_LOGIN_CALLBACK_ADDR: &str = "127.0.0.1:0";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} is not a valid principal: {source}")]
    InvalidPrincipal {
        var: &'static str,
        source: PrincipalError,
    },

    #[error("{var} is not a valid URL: {value}")]
    InvalidUrl { var: &'static str, value: String },

    #[error("{var} has an invalid value: {value}")]
    InvalidValue { var: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Ic,
    Local,
}

impl Network {
    fn from_value(value: Option<&str>) -> Self {
        match value {
            Some("ic") => Network::Ic,
            _ => Network::Local,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub network: Network,
    pub dao_canister_id: Principal,
    pub token_canister_id: Principal,
    pub identity_provider_url: Url,
    pub gateway_url: Url,
    pub data_dir: PathBuf,
    pub idle_timeout: Duration,
    pub max_time_to_live: Duration,
    pub login_timeout: Option<Duration>,
    pub login_callback_addr: SocketAddr,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());

        let network = Network::from_value(get(DFX_NETWORK_ENV).as_deref());
        let dao_canister_id = principal(CANISTER_ID_DAO_ENV, get(CANISTER_ID_DAO_ENV))?;
        let token_canister_id = principal(CANISTER_ID_TOKEN_ENV, get(CANISTER_ID_TOKEN_ENV))?;

        let identity_provider_url = match network {
            Network::Ic => parse_url("identity provider", MAINNET_IDENTITY_PROVIDER)?,
            Network::Local => {
                let canister = principal(
                    CANISTER_ID_INTERNET_IDENTITY_ENV,
                    get(CANISTER_ID_INTERNET_IDENTITY_ENV),
                )?;
                parse_url(
                    CANISTER_ID_INTERNET_IDENTITY_ENV,
                    &format!("http://{canister}.localhost:4943"),
                )?
            }
        };

        // Must be a JSON call gateway; the replica's CBOR API is not spoken here.
        let gateway_url = get(IC_GATEWAY_URL_ENV).ok_or(ConfigError::Missing(IC_GATEWAY_URL_ENV))?;
        let gateway_url = parse_url(IC_GATEWAY_URL_ENV, &gateway_url)?;

        let login_callback_addr = get(LOGIN_CALLBACK_ADDR_ENV)
            .unwrap_or_else(|| DEFAULT_LOGIN_CALLBACK_ADDR.to_string());
        let login_callback_addr = login_callback_addr
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                var: LOGIN_CALLBACK_ADDR_ENV,
                value: login_callback_addr.clone(),
            })?;

        let log_format = match get(LOG_FORMAT_ENV) {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                var: LOG_FORMAT_ENV,
                value,
            })?,
            None => LogFormat::default(),
        };

        Ok(Self {
            network,
            dao_canister_id,
            token_canister_id,
            identity_provider_url,
            gateway_url,
            data_dir: get(DATA_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DATA_ROOT)),
            idle_timeout: seconds(IDLE_TIMEOUT_SECS_ENV, get(IDLE_TIMEOUT_SECS_ENV))?
                .unwrap_or(DEFAULT_IDLE_TIMEOUT),
            max_time_to_live: seconds(MAX_TIME_TO_LIVE_SECS_ENV, get(MAX_TIME_TO_LIVE_SECS_ENV))?
                .unwrap_or(DEFAULT_MAX_TIME_TO_LIVE),
            login_timeout: seconds(LOGIN_TIMEOUT_SECS_ENV, get(LOGIN_TIMEOUT_SECS_ENV))?,
            login_callback_addr,
            log_format,
        })
    }

    pub fn identity_config(&self) -> IdentityConfig {
        IdentityConfig {
            provider_url: self.identity_provider_url.clone(),
            idle_timeout: self.idle_timeout,
            max_time_to_live: self.max_time_to_live,
            login_timeout: self.login_timeout,
        }
    }
}

fn principal(var: &'static str, value: Option<String>) -> Result<Principal, ConfigError> {
    let value = value.ok_or(ConfigError::Missing(var))?;
    Principal::from_text(&value).map_err(|source| ConfigError::InvalidPrincipal { var, source })
}

fn parse_url(var: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|_| ConfigError::InvalidUrl {
        var,
        value: value.to_string(),
    })
}

fn seconds(var: &'static str, value: Option<String>) -> Result<Option<Duration>, ConfigError> {
    value
        .map(|value| {
            value
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::InvalidValue { var, value })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const DAO: &str = "em77e-bvlzu-aq";
    const GATEWAY: &str = "http://127.0.0.1:8080";

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| vars.get(var).cloned()
    }

    fn local_vars() -> Vec<(&'static str, &'static str)> {
        vec![
            (CANISTER_ID_DAO_ENV, DAO),
            (CANISTER_ID_TOKEN_ENV, "aaaaa-aa"),
            (CANISTER_ID_INTERNET_IDENTITY_ENV, DAO),
            (IC_GATEWAY_URL_ENV, GATEWAY),
        ]
    }

    #[test]
    fn local_defaults() {
        let config = Config::from_lookup(lookup(&local_vars())).unwrap();
        assert_eq!(config.network, Network::Local);
        assert_eq!(config.dao_canister_id.to_text(), DAO);
        assert_eq!(
            config.identity_provider_url.as_str(),
            format!("http://{DAO}.localhost:4943/")
        );
        assert_eq!(config.gateway_url.as_str(), "http://127.0.0.1:8080/");
        assert_eq!(config.data_dir, PathBuf::from(".wegrow"));
        assert_eq!(config.idle_timeout, Duration::from_secs(1800));
        assert_eq!(config.max_time_to_live, Duration::from_secs(28800));
        assert_eq!(config.login_timeout, None);
        assert_eq!(config.login_callback_addr.ip().to_string(), "127.0.0.1");
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn mainnet_uses_public_identity_provider() {
        let config = Config::from_lookup(lookup(&[
            (DFX_NETWORK_ENV, "ic"),
            (CANISTER_ID_DAO_ENV, DAO),
            (CANISTER_ID_TOKEN_ENV, DAO),
            (IC_GATEWAY_URL_ENV, "https://gateway.wegrow.test"),
        ]))
        .unwrap();
        assert_eq!(config.network, Network::Ic);
        assert_eq!(config.identity_provider_url.as_str(), "https://identity.ic0.app/");
        assert_eq!(config.gateway_url.as_str(), "https://gateway.wegrow.test/");
    }

    #[test]
    fn gateway_has_no_default() {
        for network in ["ic", "local"] {
            let err = Config::from_lookup(lookup(&[
                (DFX_NETWORK_ENV, network),
                (CANISTER_ID_DAO_ENV, DAO),
                (CANISTER_ID_TOKEN_ENV, DAO),
                (CANISTER_ID_INTERNET_IDENTITY_ENV, DAO),
            ]))
            .unwrap_err();
            assert!(matches!(err, ConfigError::Missing(IC_GATEWAY_URL_ENV)));
        }
    }

    #[test]
    fn dao_canister_is_required() {
        let err = Config::from_lookup(lookup(&[(CANISTER_ID_TOKEN_ENV, DAO)])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(CANISTER_ID_DAO_ENV)));
    }

    #[test]
    fn local_network_requires_identity_canister() {
        let err = Config::from_lookup(lookup(&[
            (CANISTER_ID_DAO_ENV, DAO),
            (CANISTER_ID_TOKEN_ENV, DAO),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing(CANISTER_ID_INTERNET_IDENTITY_ENV)));
    }

    #[test]
    fn overrides_are_parsed() {
        let mut vars = local_vars();
        vars.extend([
            (LOGIN_TIMEOUT_SECS_ENV, "90"),
            (IDLE_TIMEOUT_SECS_ENV, "60"),
            (DATA_DIR_ENV, "/tmp/wegrow"),
            (LOG_FORMAT_ENV, "json"),
            (IC_GATEWAY_URL_ENV, "http://gateway.test:8000"),
        ]);
        let config = Config::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.login_timeout, Some(Duration::from_secs(90)));
        assert_eq!(config.identity_config().idle_timeout, Duration::from_secs(60));
        assert_eq!(config.data_dir, PathBuf::from("/tmp/wegrow"));
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.gateway_url.as_str(), "http://gateway.test:8000/");
    }

    #[test]
    fn invalid_values_are_reported() {
        let mut vars = local_vars();
        vars.push((LOGIN_TIMEOUT_SECS_ENV, "soon"));
        let err = Config::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { var: LOGIN_TIMEOUT_SECS_ENV, .. }));

        let mut vars = local_vars();
        vars[0] = (CANISTER_ID_DAO_ENV, "not a principal");
        let err = Config::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPrincipal { .. }));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let mut vars = local_vars();
        vars.push((LOGIN_TIMEOUT_SECS_ENV, "  "));
        let config = Config::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.login_timeout, None);
    }
}
