//! Output formatting for CLI
//!
//! The server's answer goes to stdout in the selected format. Informational
//! and error lines go to stderr so they never mix with the object.

use crate::api::CreateOutcome;
use clap::ValueEnum;
use colored::Colorize;
use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Status;
use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    Table,
}

impl OutputFormat {
    /// Parse a format name from the config file; unknown names fall back to JSON
    pub fn from_name(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "yaml" | "yml" => OutputFormat::Yaml,
            "table" => OutputFormat::Table,
            _ => OutputFormat::Json,
        }
    }
}

#[derive(Tabled)]
struct PodRow {
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "NAMESPACE")]
    namespace: String,
    #[tabled(rename = "PHASE")]
    phase: String,
    #[tabled(rename = "CONTAINERS")]
    containers: String,
    #[tabled(rename = "AGE")]
    age: String,
}

impl From<&Pod> for PodRow {
    fn from(pod: &Pod) -> Self {
        let containers = pod
            .spec
            .as_ref()
            .map(|spec| {
                spec.containers
                    .iter()
                    .map(|c| c.name.as_str())
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .unwrap_or_default();

        let age = pod
            .metadata
            .creation_timestamp
            .as_ref()
            .map(|ts| {
                let secs = (chrono::Utc::now() - ts.0).num_seconds().max(0) as u64;
                format_age(secs)
            })
            .unwrap_or_else(|| "<unknown>".to_string());

        Self {
            name: pod.metadata.name.clone().unwrap_or_default(),
            namespace: pod.metadata.namespace.clone().unwrap_or_default(),
            phase: pod
                .status
                .as_ref()
                .and_then(|s| s.phase.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            containers,
            age,
        }
    }
}

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "CODE")]
    code: u16,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "REASON")]
    reason: String,
    #[tabled(rename = "MESSAGE")]
    message: String,
}

impl StatusRow {
    fn new(code: u16, status: &Status) -> Self {
        Self {
            code,
            status: status.status.clone().unwrap_or_default(),
            reason: status.reason.clone().unwrap_or_default(),
            message: status.message.clone().unwrap_or_default(),
        }
    }
}

/// Render a create outcome in the requested format
pub fn render_outcome(outcome: &CreateOutcome, format: OutputFormat) -> anyhow::Result<String> {
    match (outcome, format) {
        (CreateOutcome::Created(pod), OutputFormat::Table) => {
            Ok(Table::new([PodRow::from(pod)]).to_string())
        }
        (CreateOutcome::Rejected { code, status }, OutputFormat::Table) => {
            Ok(Table::new([StatusRow::new(*code, status)]).to_string())
        }
        (CreateOutcome::Created(pod), format) => render_single(pod, format),
        (CreateOutcome::Rejected { status, .. }, format) => render_single(status, format),
    }
}

/// Render a single object; table format falls back to JSON
pub fn render_single<T: Serialize>(data: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json | OutputFormat::Table => Ok(serde_json::to_string_pretty(data)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(data)?),
    }
}

pub fn print_outcome(outcome: &CreateOutcome, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render_outcome(outcome, format)?;
    println!("{}", rendered.trim_end());
    Ok(())
}

pub fn print_single<T: Serialize>(data: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render_single(data, format)?;
    println!("{}", rendered.trim_end());
    Ok(())
}

/// Print a warning message with yellow triangle
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message.yellow());
}

/// Print an info message with blue i
pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue().bold(), message);
}

/// Format an age in seconds the way kubectl does (e.g. "45s", "3m", "2h", "5d")
pub fn format_age(secs: u64) -> String {
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else if secs < 86400 {
        format!("{}h", secs / 3600)
    } else {
        format!("{}d", secs / 86400)
    }
}
