//! kubepost CLI library
//!
//! Creates a Pod on a Kubernetes API server with a hand-built request and
//! prints the server's answer.

pub mod api;
pub mod config;
pub mod logging;
pub mod output;
