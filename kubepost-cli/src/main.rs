//! kubepost CLI
//!
//! Creates a Pod on a Kubernetes API server with a hand-built JSON request

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use kubepost_cli::api::{ApiClient, CreateOutcome};
use kubepost_cli::config::{Config, Settings};
use kubepost_cli::logging::LoggingConfig;
use kubepost_cli::output::{self, OutputFormat};
use k8s_openapi::api::core::v1::Pod;
use kubepost_common::{codec, pod, PodTemplate};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kubepost", author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// API server address (defaults to the kubectl proxy address)
    #[arg(short, long, global = true)]
    server: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, global = true)]
    output: Option<OutputFormat>,

    /// Config file (defaults to ~/.config/kubepost/cli.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the pod and print the server's answer
    Create(PodArgs),
    /// Print the request body without sending it
    Render(PodArgs),
    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Args, Default)]
struct PodArgs {
    /// Pod name
    #[arg(long)]
    name: Option<String>,
    /// Namespace to create the pod in
    #[arg(short, long)]
    namespace: Option<String>,
    /// Container name
    #[arg(long)]
    container: Option<String>,
    /// Container image
    #[arg(long)]
    image: Option<String>,
    /// Pod label as KEY=VALUE; replaces the default labels (repeatable)
    #[arg(short, long = "label", value_name = "KEY=VALUE")]
    labels: Vec<String>,
}

impl PodArgs {
    fn into_template(self, config: &Config) -> Result<PodTemplate> {
        let mut template = PodTemplate {
            namespace: config.namespace.clone(),
            ..Default::default()
        };

        if let Some(name) = self.name {
            template.name = name;
        }
        if let Some(namespace) = self.namespace {
            template.namespace = namespace;
        }
        if let Some(container) = self.container {
            template.container_name = container;
        }
        if let Some(image) = self.image {
            template.image = image;
        }
        if !self.labels.is_empty() {
            template.labels = self
                .labels
                .iter()
                .map(|l| pod::parse_label(l))
                .collect::<kubepost_common::Result<BTreeMap<_, _>>>()?;
        }

        Ok(template)
    }
}

/// Target line and body that `create` would send for this pod
fn render_request(pod: &Pod, settings: &Settings) -> Result<(String, String)> {
    let namespace = pod.metadata.namespace.as_deref().unwrap_or_default();
    let target = format!(
        "POST {}{}",
        settings.server.trim_end_matches('/'),
        kubepost_common::pods_path(namespace)
    );

    // Round-trip through the codec so the output is exactly what would be sent
    let body = codec::encode(pod)?;
    let value: serde_json::Value = serde_json::from_slice(&body)?;
    let rendered = output::render_single(&value, settings.output)?;

    Ok((target, rendered))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let _log_guard =
        LoggingConfig::new(&config.log_level, cli.verbose, config.log_path.clone()).init()?;

    let settings = config.resolve(cli.server, cli.output);

    match cli.command.unwrap_or_else(|| Commands::Create(PodArgs::default())) {
        Commands::Create(args) => {
            let pod = args.into_template(&config)?.build()?;

            let api_client =
                ApiClient::new(&settings.server, settings.timeout)?.with_token(settings.token.clone());

            let outcome = api_client.create_pod(&pod).await?;
            if let CreateOutcome::Rejected { code, status } = &outcome {
                output::print_warning(&format!(
                    "Server rejected the request ({} {})",
                    code,
                    status.reason.as_deref().unwrap_or("Unknown")
                ));
            }
            output::print_outcome(&outcome, settings.output)?;
        }
        Commands::Render(args) => {
            let pod = args.into_template(&config)?.build()?;
            let (target, rendered) = render_request(&pod, &settings)?;
            output::print_info(&target);
            println!("{}", rendered.trim_end());
        }
        Commands::Completions { shell } => {
            generate_completions(shell);
        }
    }

    Ok(())
}

/// Generate shell completions
fn generate_completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();

    generate(shell, &mut cmd, name, &mut io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_defaults_to_create() {
        let cli = Cli::try_parse_from(["kubepost"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.server.is_none());
    }

    #[test]
    fn test_template_defaults_follow_config() {
        let config = Config {
            namespace: "team-a".to_string(),
            ..Default::default()
        };

        let template = PodArgs::default().into_template(&config).unwrap();
        assert_eq!(template.namespace, "team-a");
        assert_eq!(template.name, "my-pod");
        assert_eq!(template.labels, PodTemplate::default().labels);
    }

    #[test]
    fn test_template_flags_override() {
        let cli = Cli::try_parse_from([
            "kubepost", "-o", "yaml", "create", "--name", "web", "-n", "prod", "--image",
            "nginx:1.27", "-l", "tier=frontend",
        ])
        .unwrap();
        assert_eq!(cli.output, Some(OutputFormat::Yaml));

        let Some(Commands::Create(args)) = cli.command else {
            panic!("expected create subcommand");
        };
        let template = args.into_template(&Config::default()).unwrap();
        assert_eq!(template.name, "web");
        assert_eq!(template.namespace, "prod");
        assert_eq!(template.image, "nginx:1.27");
        assert_eq!(template.container_name, "runtime");
        assert_eq!(template.labels.len(), 1);
        assert_eq!(template.labels["tier"], "frontend");
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "kubepost", "create", "-o", "yaml", "-s", "http://localhost:9000", "-vv",
        ])
        .unwrap();

        assert_eq!(cli.output, Some(OutputFormat::Yaml));
        assert_eq!(cli.server.as_deref(), Some("http://localhost:9000"));
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Some(Commands::Create(_))));
    }

    #[test]
    fn test_render_uses_resolved_server() {
        let config = Config {
            server: "https://10.0.0.1:6443/".to_string(),
            ..Default::default()
        };
        let cli = Cli::try_parse_from(["kubepost", "render"]).unwrap();
        let settings = config.resolve(cli.server, cli.output);

        let pod = PodTemplate::default().build().unwrap();
        let (target, rendered) = render_request(&pod, &settings).unwrap();

        assert_eq!(target, "POST https://10.0.0.1:6443/api/v1/namespaces/mus/pods");
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["kind"], "Pod");
        assert_eq!(value["metadata"]["name"], "my-pod");
        assert_eq!(value["spec"]["containers"][0]["image"], "nginx");
    }

    #[test]
    fn test_render_honours_output_flag() {
        let cli = Cli::try_parse_from(["kubepost", "render", "-o", "yaml", "-n", "staging"]).unwrap();
        let settings = Config::default().resolve(cli.server, cli.output);
        let Some(Commands::Render(args)) = cli.command else {
            panic!("expected render subcommand");
        };

        let pod = args.into_template(&Config::default()).unwrap().build().unwrap();
        let (target, rendered) = render_request(&pod, &settings).unwrap();

        assert_eq!(target, "POST http://127.0.0.1:8001/api/v1/namespaces/staging/pods");
        assert!(rendered.contains("kind: Pod"));
        assert!(rendered.contains("namespace: staging"));
    }

    #[test]
    fn test_bad_label_is_rejected() {
        let args = PodArgs {
            labels: vec!["missing-equals".to_string()],
            ..Default::default()
        };
        assert!(args.into_template(&Config::default()).is_err());
    }
}
