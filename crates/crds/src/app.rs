//! App Custom Resource Definition
//!
//! Defines the `App` CRD (`apps.demo.candy-box.top`). The spec carries two
//! free-form strings; the status carries the result derived from them by the
//! app controller.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// AppSpec defines the desired state of an App
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[kube(
    group = "demo.candy-box.top",
    version = "v1",
    kind = "App",
    plural = "apps",
    namespaced,
    status = "AppStatus",
    printcolumn = r#"{"name":"Action", "type":"string", "jsonPath":".spec.action"}"#,
    printcolumn = r#"{"name":"Object", "type":"string", "jsonPath":".spec.object"}"#,
    printcolumn = r#"{"name":"Result", "type":"string", "jsonPath":".status.result"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct AppSpec {
    /// Action to apply
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub action: String,

    /// Object the action applies to
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub object: String,
}

/// AppStatus defines the observed state of an App
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppStatus {
    /// Result derived from the spec
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub result: String,
}

impl App {
    /// Current `status.result`, or `None` when no status has been written yet.
    #[must_use]
    pub fn result(&self) -> Option<&str> {
        self.status.as_ref().map(|status| status.result.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_fields_default_to_empty() {
        let spec: AppSpec = serde_json::from_str("{}").unwrap();
        assert_eq!(spec, AppSpec::default());
    }

    #[test]
    fn test_status_deserializes_result() {
        let app: App = serde_json::from_value(serde_json::json!({
            "apiVersion": "demo.candy-box.top/v1",
            "kind": "App",
            "metadata": { "name": "demo", "namespace": "default" },
            "spec": { "action": "scale", "object": "deployment" },
            "status": { "result": "scale,deployment" }
        }))
        .unwrap();

        assert_eq!(app.spec.action, "scale");
        assert_eq!(app.spec.object, "deployment");
        assert_eq!(app.result(), Some("scale,deployment"));
    }

    #[test]
    fn test_result_is_none_without_status() {
        let app = App::new("demo", AppSpec::default());
        assert_eq!(app.result(), None);
    }

    #[test]
    fn test_empty_result_is_not_serialized() {
        let value = serde_json::to_value(AppStatus::default()).unwrap();
        assert_eq!(value, serde_json::json!({}));
    }
}
