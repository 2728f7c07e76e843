//! Main controller implementation.
//!
//! This module contains the `Controller` struct that orchestrates the App
//! watcher and the probe and metrics servers.

use crate::config::Config;
use crate::error::ControllerError;
use crate::metrics::Metrics;
use crate::probes::{self, HealthState};
use crate::watcher::Watcher;
use kube::Client;
use tokio::task::JoinHandle;
use tracing::info;

/// Main controller for App management.
#[derive(Debug)]
pub struct Controller {
    app_watcher: JoinHandle<Result<(), ControllerError>>,
    health_server: JoinHandle<Result<(), ControllerError>>,
    metrics_server: JoinHandle<Result<(), ControllerError>>,
}

impl Controller {
    /// Creates a new controller instance and starts its background tasks.
    pub async fn new(config: Config) -> Result<Self, ControllerError> {
        info!("Initializing App Controller");

        // Create Kubernetes client
        let kube_client = Client::try_default().await?;

        let metrics = Metrics::new()?;
        let health = HealthState::new();

        let health_server = tokio::spawn(probes::serve(
            "Health probe",
            config.health_probe_bind_address,
            probes::health_router(health.clone()),
        ));
        let metrics_server = tokio::spawn(probes::serve(
            "Metrics",
            config.metrics_bind_address,
            probes::metrics_router(metrics.clone()),
        ));

        let watcher = Watcher::new(kube_client, config, metrics, health);
        let app_watcher = tokio::spawn(watcher.watch_apps());

        Ok(Self {
            app_watcher,
            health_server,
            metrics_server,
        })
    }

    /// Runs the controller until the watcher shuts down or a task fails.
    pub async fn run(mut self) -> Result<(), ControllerError> {
        info!("App Controller running");

        tokio::select! {
            result = &mut self.app_watcher => {
                result.map_err(|e| ControllerError::Watch(format!("App watcher panicked: {}", e)))??;
            }
            result = &mut self.health_server => {
                result.map_err(|e| ControllerError::Watch(format!("Health probe server panicked: {}", e)))??;
            }
            result = &mut self.metrics_server => {
                result.map_err(|e| ControllerError::Watch(format!("Metrics server panicked: {}", e)))??;
            }
        }

        self.health_server.abort();
        self.metrics_server.abort();
        info!("App Controller stopped");
        Ok(())
    }
}
