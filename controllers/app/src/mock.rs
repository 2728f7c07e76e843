//! Mock AppClient for unit testing
//!
//! Stores Apps in memory and mimics the status subresource: a status update
//! replaces only the stored status and ignores any spec carried in the body.

use crate::client::{AppClient, AppKey};
use crate::error::ControllerError;
use crds::App;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// In-memory `AppClient`.
#[derive(Debug, Clone, Default)]
pub struct MockAppClient {
    apps: Arc<Mutex<HashMap<AppKey, Arc<App>>>>,
    status_updates: Arc<Mutex<Vec<App>>>,
    get_error: Arc<Mutex<Option<String>>>,
    update_error: Arc<Mutex<Option<String>>>,
}

impl MockAppClient {
    /// Create a new, empty mock client
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an App to the mock store (for test setup)
    pub fn add_app(&self, app: App) {
        let key = AppKey::from_app(&app).unwrap();
        self.apps.lock().unwrap().insert(key, Arc::new(app));
    }

    /// Stored copy of the App named by `key`
    pub fn stored(&self, key: &AppKey) -> Option<Arc<App>> {
        self.apps.lock().unwrap().get(key).cloned()
    }

    /// Bodies sent to `update_status`, in order
    pub fn status_updates(&self) -> Vec<App> {
        self.status_updates.lock().unwrap().clone()
    }

    /// Make every `get` fail with a service error carrying `message`
    pub fn fail_get(&self, message: &str) {
        *self.get_error.lock().unwrap() = Some(message.to_string());
    }

    /// Make every `update_status` fail with a service error carrying `message`
    pub fn fail_update(&self, message: &str) {
        *self.update_error.lock().unwrap() = Some(message.to_string());
    }
}

fn service_error(message: &str) -> ControllerError {
    ControllerError::Kube(kube::Error::Service(Box::new(std::io::Error::other(
        message.to_string(),
    ))))
}

#[async_trait::async_trait]
impl AppClient for MockAppClient {
    async fn get(&self, key: &AppKey) -> Result<Option<Arc<App>>, ControllerError> {
        if let Some(message) = self.get_error.lock().unwrap().as_deref() {
            return Err(service_error(message));
        }
        Ok(self.stored(key))
    }

    async fn update_status(&self, app: &App) -> Result<App, ControllerError> {
        if let Some(message) = self.update_error.lock().unwrap().as_deref() {
            return Err(service_error(message));
        }
        self.status_updates.lock().unwrap().push(app.clone());

        let key = AppKey::from_app(app)?;
        let mut apps = self.apps.lock().unwrap();
        let stored = apps
            .get(&key)
            .ok_or_else(|| service_error(&format!("apps \"{}\" not found", key.name)))?;
        let mut updated = (**stored).clone();
        updated.status = app.status.clone();
        apps.insert(key, Arc::new(updated.clone()));
        Ok(updated)
    }
}
