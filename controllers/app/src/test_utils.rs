//! Test utilities for unit testing the reconciler
//!
//! This module provides helpers for creating test data and setting up test scenarios.

#[cfg(test)]
use crate::backoff::BackoffTracker;
#[cfg(test)]
use crate::metrics::Metrics;
#[cfg(test)]
use crate::mock::MockAppClient;
#[cfg(test)]
use crate::reconciler::Reconciler;
#[cfg(test)]
use crds::{App, AppSpec, AppStatus};
#[cfg(test)]
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

/// Helper to create a test App CRD
#[cfg(test)]
pub fn create_test_app(
    name: &str,
    namespace: &str,
    action: &str,
    object: &str,
    result: Option<&str>,
) -> App {
    App {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            resource_version: Some("1".to_string()),
            ..Default::default()
        },
        spec: AppSpec {
            action: action.to_string(),
            object: object.to_string(),
        },
        status: result.map(|result| AppStatus {
            result: result.to_string(),
        }),
    }
}

/// Helper to create a reconciler around a mock client
#[cfg(test)]
pub fn create_test_reconciler(client: &MockAppClient) -> Reconciler {
    Reconciler::new(
        Box::new(client.clone()),
        Metrics::new().unwrap(),
        BackoffTracker::new(1, 300),
    )
}
