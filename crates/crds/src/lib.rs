//! App Operator CRD Definitions
//!
//! Kubernetes Custom Resource Definitions for the app controller.

pub mod app;

pub use app::*;
