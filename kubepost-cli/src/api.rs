//! API client for the Kubernetes API server
//!
//! The create request is assembled by hand: the Pod is encoded with the
//! common codec, the URL and headers are set explicitly, and the response
//! body is decoded according to the status code.

use anyhow::{Context, Result};
use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Status;
use kubepost_common::{codec, pods_path, MEDIA_TYPE_JSON};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use std::time::Duration;
use tracing::{debug, info, warn};

/// What the server answered to a create request
#[derive(Debug, Clone, PartialEq)]
pub enum CreateOutcome {
    /// Status code below 300; the body is the stored Pod
    Created(Pod),
    /// Any other status code; the body is a Status
    Rejected { code: u16, status: Status },
}

impl CreateOutcome {
    /// Decode a response body according to its status code
    pub fn from_response(code: u16, body: &[u8]) -> Result<Self> {
        if code < 300 {
            let pod = codec::decode_pod(body)
                .with_context(|| format!("Failed to decode pod from {} response", code))?;
            Ok(CreateOutcome::Created(pod))
        } else {
            let status = codec::decode_status(body)
                .with_context(|| format!("Failed to decode status from {} response", code))?;
            Ok(CreateOutcome::Rejected { code, status })
        }
    }
}

pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            token: None,
        })
    }

    /// Send `Authorization: Bearer <token>` with every request
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// Build the POST request that creates a pod in `namespace`
    pub fn build_create_request(&self, namespace: &str, body: Vec<u8>) -> Result<reqwest::Request> {
        let url = format!("{}{}", self.base_url, pods_path(namespace));
        let url = reqwest::Url::parse(&url).with_context(|| format!("Invalid URL '{}'", url))?;

        let mut request = self
            .client
            .post(url)
            .header(ACCEPT, MEDIA_TYPE_JSON)
            .header(CONTENT_TYPE, MEDIA_TYPE_JSON)
            .body(body);

        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        request.build().context("Failed to build create request")
    }

    /// Encode and POST the pod, then decode whatever the server sent back
    pub async fn create_pod(&self, pod: &Pod) -> Result<CreateOutcome> {
        let namespace = pod
            .metadata
            .namespace
            .as_deref()
            .context("Pod has no namespace")?;

        let body = codec::encode(pod)?;
        let request = self.build_create_request(namespace, body)?;

        debug!(method = %request.method(), url = %request.url(), "Sending create request");

        let response = self
            .client
            .execute(request)
            .await
            .with_context(|| format!("Request to {} failed", self.base_url))?;

        let code = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .context("Failed to read response body")?;

        debug!(status = code, bytes = body.len(), "Received response");

        let outcome = CreateOutcome::from_response(code, &body)?;
        match &outcome {
            CreateOutcome::Created(created) => info!(
                pod = created.metadata.name.as_deref().unwrap_or_default(),
                uid = created.metadata.uid.as_deref().unwrap_or_default(),
                "Pod created"
            ),
            CreateOutcome::Rejected { code, status } => warn!(
                code,
                reason = status.reason.as_deref().unwrap_or_default(),
                "Create request rejected"
            ),
        }

        Ok(outcome)
    }
}
