//! Kubernetes resource watcher.
//!
//! Watches `App` resources with `kube_runtime::Controller`, which owns the
//! reflector cache, the work queue, per-object serialization and reconnects.
//! This module supplies the reconcile callback and the error policy.

use crate::backoff::BackoffTracker;
use crate::client::{AppKey, KubeAppClient};
use crate::config::Config;
use crate::error::ControllerError;
use crate::metrics::Metrics;
use crate::probes::HealthState;
use crate::reconciler::Reconciler;
use crds::App;
use futures::StreamExt;
use kube::{Api, Client, ResourceExt};
use kube_runtime::reflector::{ObjectRef, Store};
use kube_runtime::controller::{self, Action, Config as ControllerConfig};
use kube_runtime::{Controller, watcher};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Reconcile callback handed to the controller.
///
/// The object passed in only identifies what to reconcile; the reconciler
/// reads the current copy from the cache itself.
pub async fn reconcile(app: Arc<App>, ctx: Arc<Reconciler>) -> Result<Action, ControllerError> {
    let started = Instant::now();

    let result = match AppKey::from_app(&app) {
        Ok(key) => ctx.reconcile_app(&key).await.map(|outcome| (key, outcome)),
        Err(e) => Err(e),
    };

    match result {
        Ok((key, outcome)) => {
            ctx.metrics.observe_reconcile(outcome.as_str(), started.elapsed());
            ctx.backoff.forget(&key.to_string());
            Ok(Action::await_change())
        }
        Err(e) => {
            ctx.metrics.observe_failure(&e, started.elapsed());
            error!(
                "Reconciliation failed for App {}/{}: {}",
                app.namespace().unwrap_or_default(),
                app.name_any(),
                e
            );
            Err(e)
        }
    }
}

/// Error policy: requeue the object after its next backoff delay.
pub fn error_policy(app: Arc<App>, error: &ControllerError, ctx: Arc<Reconciler>) -> Action {
    let key = AppKey::from_app(&app).map_or_else(|_| "<unnamed>".to_string(), |key| key.to_string());
    let delay = ctx.backoff.record_failure(&key);
    warn!(
        "Requeueing App {} in {}s after error (attempt {}): {}",
        key,
        delay.as_secs(),
        ctx.backoff.error_count(&key),
        error
    );
    Action::requeue(delay)
}

/// Handles one item of the controller's output stream.
///
/// An App deleted while it waits for a requeue is reported as
/// `ObjectNotFound` and never reaches `reconcile`, so its backoff entry is
/// dropped here.
fn on_controller_result(
    res: Result<(ObjectRef<App>, Action), controller::Error<ControllerError, watcher::Error>>,
    backoff: &BackoffTracker,
) {
    match res {
        Ok((object_ref, _action)) => debug!("Reconciled App {}", object_ref),
        Err(controller::Error::ObjectNotFound(object_ref)) => {
            let key = AppKey::new(
                object_ref.namespace.as_deref().unwrap_or("default"),
                object_ref.name.as_str(),
            );
            debug!("App {} no longer exists, dropping its backoff state", key);
            backoff.forget(&key.to_string());
        }
        Err(e) => warn!("App controller error: {}", e),
    }
}

/// Flips readiness once the App cache has completed its initial list.
fn mark_ready_when_synced(cache: Store<App>, health: HealthState) -> JoinHandle<()> {
    tokio::spawn(async move {
        if cache.wait_until_ready().await.is_ok() {
            info!("App cache synced");
            health.set_ready(true);
        }
    })
}

/// Watches App resources for changes.
pub struct Watcher {
    client: Client,
    api: Api<App>,
    config: Config,
    metrics: Metrics,
    health: HealthState,
}

impl std::fmt::Debug for Watcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Watcher")
            .field("namespace", &self.config.namespace)
            .finish_non_exhaustive()
    }
}

impl Watcher {
    /// Creates a new watcher instance.
    pub fn new(client: Client, config: Config, metrics: Metrics, health: HealthState) -> Self {
        let api: Api<App> = match config.namespace.as_deref() {
            Some(ns) => Api::namespaced(client.clone(), ns),
            None => Api::all(client.clone()),
        };
        Self {
            client,
            api,
            config,
            metrics,
            health,
        }
    }

    /// Starts watching App resources. Returns once the controller shuts down.
    pub async fn watch_apps(self) -> Result<(), ControllerError> {
        info!("Starting App watcher");

        let controller = Controller::new(self.api, watcher::Config::default());
        let cache = controller.store();

        mark_ready_when_synced(cache.clone(), self.health.clone());

        let reconciler = Arc::new(Reconciler::new(
            Box::new(KubeAppClient::new(self.client, cache)),
            self.metrics,
            BackoffTracker::new(self.config.backoff_min_seconds, self.config.backoff_max_seconds),
        ));

        let controller_config = ControllerConfig::default()
            .debounce(self.config.debounce)
            .concurrency(self.config.concurrency);

        controller
            .with_config(controller_config)
            .shutdown_on_signal()
            .run(reconcile, error_policy, reconciler.clone())
            .for_each(|res| {
                on_controller_result(res, &reconciler.backoff);
                futures::future::ready(())
            })
            .await;

        self.health.set_ready(false);
        info!("App watcher stopped");
        Ok(())
    }
}
