//! Pod construction
//!
//! A `PodTemplate` holds the handful of fields this tool sets on a Pod. The
//! default template produces the `my-pod` workload in the `mus` namespace
//! running a single nginx container.

use crate::{Error, Result};
use k8s_openapi::api::core::v1::{Container, Pod, PodSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_POD_NAME: &str = "my-pod";
pub const DEFAULT_NAMESPACE: &str = "mus";
pub const DEFAULT_CONTAINER_NAME: &str = "runtime";
pub const DEFAULT_IMAGE: &str = "nginx";

pub const LABEL_COMPONENT: &str = "app.kubernetes.io/component";
pub const LABEL_NAME: &str = "app.kubernetes.io/name";

const DNS_LABEL_MAX: usize = 63;
const DNS_SUBDOMAIN_MAX: usize = 253;

/// Inputs for a single-container Pod
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodTemplate {
    pub name: String,
    pub namespace: String,
    pub labels: BTreeMap<String, String>,
    pub container_name: String,
    pub image: String,
}

impl Default for PodTemplate {
    fn default() -> Self {
        let mut labels = BTreeMap::new();
        labels.insert(LABEL_COMPONENT.to_string(), "my-component".to_string());
        labels.insert(LABEL_NAME.to_string(), "a-name".to_string());

        Self {
            name: DEFAULT_POD_NAME.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            labels,
            container_name: DEFAULT_CONTAINER_NAME.to_string(),
            image: DEFAULT_IMAGE.to_string(),
        }
    }
}

impl PodTemplate {
    /// Check the template against the API server's naming rules
    pub fn validate(&self) -> Result<()> {
        if !is_dns_subdomain(&self.name) {
            return Err(Error::Validation(format!(
                "invalid pod name '{}': must be a lowercase RFC 1123 subdomain",
                self.name
            )));
        }
        if !is_dns_label(&self.namespace) {
            return Err(Error::Validation(format!(
                "invalid namespace '{}': must be a lowercase RFC 1123 label",
                self.namespace
            )));
        }
        if !is_dns_label(&self.container_name) {
            return Err(Error::Validation(format!(
                "invalid container name '{}': must be a lowercase RFC 1123 label",
                self.container_name
            )));
        }
        if self.image.is_empty() || self.image.chars().any(char::is_whitespace) {
            return Err(Error::Validation(format!(
                "invalid image '{}': must be non-empty and contain no whitespace",
                self.image
            )));
        }
        for (key, value) in &self.labels {
            validate_label(key, value)?;
        }
        Ok(())
    }

    /// Validate the template and build the Pod object from it
    pub fn build(&self) -> Result<Pod> {
        self.validate()?;

        let pod = Pod {
            metadata: ObjectMeta {
                name: Some(self.name.clone()),
                namespace: Some(self.namespace.clone()),
                labels: Some(self.labels.clone()),
                ..Default::default()
            },
            spec: Some(PodSpec {
                containers: vec![Container {
                    name: self.container_name.clone(),
                    image: Some(self.image.clone()),
                    ..Default::default()
                }],
                ..Default::default()
            }),
            ..Default::default()
        };

        tracing::debug!(
            name = %self.name,
            namespace = %self.namespace,
            image = %self.image,
            "Built pod object"
        );

        Ok(pod)
    }
}

/// Parse a `KEY=VALUE` label argument
pub fn parse_label(s: &str) -> Result<(String, String)> {
    let (key, value) = s.split_once('=').ok_or_else(|| {
        Error::Validation(format!("invalid label '{}': expected KEY=VALUE", s))
    })?;
    validate_label(key, value)?;
    Ok((key.to_string(), value.to_string()))
}

/// Path of the pod collection in a namespace
pub fn pods_path(namespace: &str) -> String {
    format!("/api/v1/namespaces/{}/pods", urlencoding::encode(namespace))
}

fn validate_label(key: &str, value: &str) -> Result<()> {
    let (prefix, name) = match key.split_once('/') {
        Some((prefix, name)) => (Some(prefix), name),
        None => (None, key),
    };

    if let Some(prefix) = prefix {
        if !is_dns_subdomain(prefix) {
            return Err(Error::Validation(format!(
                "invalid label key '{}': prefix must be a DNS subdomain",
                key
            )));
        }
    }
    if !is_label_name(name) {
        return Err(Error::Validation(format!("invalid label key '{}'", key)));
    }
    if !value.is_empty() && !is_label_name(value) {
        return Err(Error::Validation(format!(
            "invalid value '{}' for label '{}'",
            value, key
        )));
    }
    Ok(())
}

fn is_dns_label(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= DNS_LABEL_MAX
        && s.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !s.starts_with('-')
        && !s.ends_with('-')
}

fn is_dns_subdomain(s: &str) -> bool {
    !s.is_empty() && s.len() <= DNS_SUBDOMAIN_MAX && s.split('.').all(is_dns_label)
}

// Label names and values: alphanumeric at both ends, `-_.` allowed inside
fn is_label_name(s: &str) -> bool {
    let edges_ok = |c: Option<char>| c.is_some_and(|c| c.is_ascii_alphanumeric());

    !s.is_empty()
        && s.len() <= DNS_LABEL_MAX
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && edges_ok(s.chars().next())
        && edges_ok(s.chars().last())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_builds_fixed_pod() {
        let pod = PodTemplate::default().build().unwrap();

        assert_eq!(pod.metadata.name.as_deref(), Some("my-pod"));
        assert_eq!(pod.metadata.namespace.as_deref(), Some("mus"));

        let labels = pod.metadata.labels.unwrap();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[LABEL_COMPONENT], "my-component");
        assert_eq!(labels[LABEL_NAME], "a-name");

        let spec = pod.spec.unwrap();
        assert_eq!(spec.containers.len(), 1);
        assert_eq!(spec.containers[0].name, "runtime");
        assert_eq!(spec.containers[0].image.as_deref(), Some("nginx"));

        assert!(pod.status.is_none());
    }

    #[test]
    fn test_custom_template() {
        let template = PodTemplate {
            name: "web.frontend".to_string(),
            namespace: "staging".to_string(),
            labels: BTreeMap::from([("tier".to_string(), "web".to_string())]),
            container_name: "app".to_string(),
            image: "registry.local:5000/web:1.2".to_string(),
        };

        let pod = template.build().unwrap();
        assert_eq!(pod.metadata.name.as_deref(), Some("web.frontend"));
        assert_eq!(pod.metadata.namespace.as_deref(), Some("staging"));
        assert_eq!(
            pod.spec.unwrap().containers[0].image.as_deref(),
            Some("registry.local:5000/web:1.2")
        );
    }

    #[test]
    fn test_invalid_names_rejected() {
        let cases = [
            PodTemplate {
                name: "My-Pod".to_string(),
                ..Default::default()
            },
            PodTemplate {
                namespace: String::new(),
                ..Default::default()
            },
            PodTemplate {
                namespace: "kube.system".to_string(),
                ..Default::default()
            },
            PodTemplate {
                container_name: "-runtime".to_string(),
                ..Default::default()
            },
            PodTemplate {
                image: "nginx latest".to_string(),
                ..Default::default()
            },
            PodTemplate {
                name: "a".repeat(254),
                ..Default::default()
            },
        ];

        for template in cases {
            assert!(
                matches!(template.build(), Err(Error::Validation(_))),
                "expected validation failure for {:?}",
                template
            );
        }
    }

    #[test]
    fn test_parse_label() {
        assert_eq!(
            parse_label("app.kubernetes.io/name=a-name").unwrap(),
            ("app.kubernetes.io/name".to_string(), "a-name".to_string())
        );
        assert_eq!(
            parse_label("empty=").unwrap(),
            ("empty".to_string(), String::new())
        );

        assert!(parse_label("no-separator").is_err());
        assert!(parse_label("=value").is_err());
        assert!(parse_label("Bad_Prefix/name=x").is_err());
        assert!(parse_label("key=-dash").is_err());
        assert!(parse_label(&format!("key={}", "v".repeat(64))).is_err());
    }

    #[test]
    fn test_pods_path() {
        assert_eq!(pods_path("mus"), "/api/v1/namespaces/mus/pods");
        assert_eq!(pods_path("a b"), "/api/v1/namespaces/a%20b/pods");
    }
}
