//! App Controller
//!
//! Reconciles `App` custom resources (`apps.demo.candy-box.top`): the
//! controller derives `status.result` from `spec.action` and `spec.object`
//! and writes it through the status subresource.

mod backoff;
mod client;
mod config;
mod controller;
mod error;
mod metrics;
mod probes;
mod reconciler;
mod watcher;

#[cfg(test)]
mod mock;
#[cfg(test)]
mod test_utils;

use crate::config::Config;
use crate::error::ControllerError;
use controller::Controller;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ControllerError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // kube's rustls transport needs a process-wide crypto provider
    if rustls::crypto::ring::default_provider().install_default().is_err() {
        info!("rustls crypto provider already installed");
    }

    info!("Starting App Controller");

    let config = Config::from_env()?;

    info!("Configuration:");
    info!("  Namespace: {}", config.namespace.as_deref().unwrap_or("all namespaces"));
    info!("  Metrics address: {}", config.metrics_bind_address);
    info!("  Health probe address: {}", config.health_probe_bind_address);
    info!("  Concurrency: {}", config.concurrency);
    info!("  Backoff: {}s..{}s", config.backoff_min_seconds, config.backoff_max_seconds);

    // Initialize and run controller
    let controller = Controller::new(config).await?;
    controller.run().await?;

    Ok(())
}
