//! Reconciliation logic for the App CRD.
//!
//! An `App` is reconciled by deriving `status.result` from its spec and
//! writing it through the status subresource. The spec is never written, so
//! reconciling does not generate a spec change that would schedule another
//! reconcile.

use crate::backoff::BackoffTracker;
use crate::client::{AppClient, AppKey};
use crate::error::ControllerError;
use crate::metrics::Metrics;
use crds::{AppSpec, AppStatus};
use tracing::{debug, info};

/// What a successful reconcile did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Status was written
    Updated,
    /// Status already held the derived result
    Unchanged,
    /// Object no longer exists; nothing to do
    NotFound,
}

impl ReconcileOutcome {
    /// Metric label for this outcome.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Updated => "updated",
            Self::Unchanged => "unchanged",
            Self::NotFound => "not_found",
        }
    }
}

/// Derives `status.result` from an App spec: the action and the object
/// joined by a comma, e.g. `scale,deployment`.
pub fn derive_result(spec: &AppSpec) -> String {
    [spec.action.as_str(), ",", spec.object.as_str()].concat()
}

/// Reconciles App resources.
#[derive(Debug)]
pub struct Reconciler {
    pub(crate) client: Box<dyn AppClient>,
    pub(crate) metrics: Metrics,
    pub(crate) backoff: BackoffTracker,
}

impl Reconciler {
    /// Creates a new reconciler instance.
    pub fn new(client: Box<dyn AppClient>, metrics: Metrics, backoff: BackoffTracker) -> Self {
        Self {
            client,
            metrics,
            backoff,
        }
    }

    /// Reconciles the App named by `key`.
    ///
    /// A missing object is not an error. Read errors and status write errors
    /// are returned unchanged so the controller requeues the object.
    pub async fn reconcile_app(&self, key: &AppKey) -> Result<ReconcileOutcome, ControllerError> {
        let Some(cached) = self.client.get(key).await? else {
            debug!("App {} not found, it was probably deleted", key);
            return Ok(ReconcileOutcome::NotFound);
        };

        // The cached object is shared; modify a private copy.
        let mut app = (*cached).clone();

        let result = derive_result(&app.spec);
        if app.result() == Some(result.as_str()) {
            debug!("App {} already has result {:?}, skipping status update", key, result);
            return Ok(ReconcileOutcome::Unchanged);
        }

        info!("Updating App {} status result to {:?}", key, result);
        app.status = Some(AppStatus { result });
        self.client.update_status(&app).await?;

        Ok(ReconcileOutcome::Updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(action: &str, object: &str) -> AppSpec {
        AppSpec {
            action: action.to_string(),
            object: object.to_string(),
        }
    }

    #[test]
    fn test_derive_result_joins_with_comma() {
        assert_eq!(derive_result(&spec("scale", "deployment")), "scale,deployment");
    }

    #[test]
    fn test_derive_result_keeps_inputs_verbatim() {
        assert_eq!(derive_result(&spec("a b", " c")), "a b, c");
        assert_eq!(derive_result(&spec("x,y", "z")), "x,y,z");
    }

    #[test]
    fn test_derive_result_with_empty_fields() {
        assert_eq!(derive_result(&spec("", "")), ",");
        assert_eq!(derive_result(&spec("run", "")), "run,");
        assert_eq!(derive_result(&spec("", "pod")), ",pod");
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(ReconcileOutcome::Updated.as_str(), "updated");
        assert_eq!(ReconcileOutcome::Unchanged.as_str(), "unchanged");
        assert_eq!(ReconcileOutcome::NotFound.as_str(), "not_found");
    }
}
