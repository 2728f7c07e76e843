//! Read and write access to `App` objects.
//!
//! The reconciler talks to the cluster through the `AppClient` trait so it can
//! be exercised against an in-memory mock in unit tests. `KubeAppClient` reads
//! from the controller's reflector cache and writes through the API server.

use crate::error::ControllerError;
use crds::App;
use kube::api::PostParams;
use kube::{Api, Client, ResourceExt};
use kube_runtime::reflector::{ObjectRef, Store};
use std::fmt;
use std::sync::Arc;

/// Namespaced name of an `App`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AppKey {
    /// Object namespace
    pub namespace: String,
    /// Object name
    pub name: String,
}

impl AppKey {
    /// Creates a key from a namespace and a name.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Builds the key of `app`. Objects without a namespace fall back to `default`.
    pub fn from_app(app: &App) -> Result<Self, ControllerError> {
        let name = app.metadata.name.clone().ok_or(ControllerError::MissingObjectKey)?;
        let namespace = app.namespace().unwrap_or_else(|| "default".to_string());
        Ok(Self { namespace, name })
    }
}

impl fmt::Display for AppKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Cluster operations needed to reconcile an `App`.
#[async_trait::async_trait]
pub trait AppClient: Send + Sync + fmt::Debug {
    /// Returns the object named by `key`, or `None` when it no longer exists.
    ///
    /// The returned object is shared with the cache and must not be modified.
    async fn get(&self, key: &AppKey) -> Result<Option<Arc<App>>, ControllerError>;

    /// Replaces the status subresource of `app`, leaving its spec untouched.
    ///
    /// The object's `resourceVersion` is sent along, so a concurrent change
    /// surfaces as a conflict error.
    async fn update_status(&self, app: &App) -> Result<App, ControllerError>;
}

/// `AppClient` backed by the reflector cache and the Kubernetes API.
pub struct KubeAppClient {
    client: Client,
    cache: Store<App>,
}

impl KubeAppClient {
    /// Creates a client reading from `cache` and writing through `client`.
    pub fn new(client: Client, cache: Store<App>) -> Self {
        Self { client, cache }
    }
}

impl fmt::Debug for KubeAppClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KubeAppClient")
            .field("cached_objects", &self.cache.state().len())
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl AppClient for KubeAppClient {
    async fn get(&self, key: &AppKey) -> Result<Option<Arc<App>>, ControllerError> {
        let object_ref = ObjectRef::<App>::new(&key.name).within(&key.namespace);
        Ok(self.cache.get(&object_ref))
    }

    async fn update_status(&self, app: &App) -> Result<App, ControllerError> {
        let key = AppKey::from_app(app)?;
        let api: Api<App> = Api::namespaced(self.client.clone(), &key.namespace);
        let body = serde_json::to_vec(app)?;
        let updated = api
            .replace_status(&key.name, &PostParams::default(), body)
            .await?;
        Ok(updated)
    }
}
