//! Controller configuration loaded from environment variables.

use crate::error::ControllerError;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_METRICS_BIND_ADDRESS: &str = "0.0.0.0:8080";
const DEFAULT_HEALTH_PROBE_BIND_ADDRESS: &str = "0.0.0.0:8081";

/// Runtime configuration for the App Controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Namespace to watch, `None` for all namespaces
    pub namespace: Option<String>,
    /// Listener for `/metrics`
    pub metrics_bind_address: SocketAddr,
    /// Listener for `/healthz` and `/readyz`
    pub health_probe_bind_address: SocketAddr,
    /// Maximum concurrent reconciliations (0 means unbounded)
    pub concurrency: u16,
    /// Wait after the last event before reconciling
    pub debounce: Duration,
    /// First requeue delay after a failed reconcile, in seconds
    pub backoff_min_seconds: u64,
    /// Requeue delay cap, in seconds
    pub backoff_max_seconds: u64,
}

impl Config {
    /// Loads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ControllerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads the configuration through `lookup`, which returns the raw value of a variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ControllerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let namespace = lookup("WATCH_NAMESPACE").filter(|ns| !ns.trim().is_empty());

        let metrics_bind_address = parse_or(&lookup, "METRICS_BIND_ADDRESS", DEFAULT_METRICS_BIND_ADDRESS)?;
        let health_probe_bind_address =
            parse_or(&lookup, "HEALTH_PROBE_BIND_ADDRESS", DEFAULT_HEALTH_PROBE_BIND_ADDRESS)?;
        let concurrency = parse_or(&lookup, "RECONCILE_CONCURRENCY", "1")?;
        let debounce_seconds: u64 = parse_or(&lookup, "RECONCILE_DEBOUNCE_SECONDS", "0")?;
        let backoff_min_seconds: u64 = parse_or(&lookup, "BACKOFF_MIN_SECONDS", "1")?;
        let backoff_max_seconds: u64 = parse_or(&lookup, "BACKOFF_MAX_SECONDS", "300")?;

        if backoff_min_seconds == 0 {
            return Err(ControllerError::InvalidConfig(
                "BACKOFF_MIN_SECONDS must be greater than zero".to_string(),
            ));
        }
        if backoff_min_seconds > backoff_max_seconds {
            return Err(ControllerError::InvalidConfig(format!(
                "BACKOFF_MIN_SECONDS ({backoff_min_seconds}) exceeds BACKOFF_MAX_SECONDS ({backoff_max_seconds})"
            )));
        }
        if metrics_bind_address == health_probe_bind_address {
            return Err(ControllerError::InvalidConfig(format!(
                "METRICS_BIND_ADDRESS and HEALTH_PROBE_BIND_ADDRESS must differ (both {metrics_bind_address})"
            )));
        }

        Ok(Self {
            namespace,
            metrics_bind_address,
            health_probe_bind_address,
            concurrency,
            debounce: Duration::from_secs(debounce_seconds),
            backoff_min_seconds,
            backoff_max_seconds,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: &str) -> Result<T, ControllerError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = lookup(key).unwrap_or_else(|| default.to_string());
    raw.trim().parse().map_err(|e| {
        ControllerError::InvalidConfig(format!("{key}={raw:?} is invalid: {e}"))
    })
}
