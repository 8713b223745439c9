use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use tracing_subscriber::EnvFilter;

use diffpost_core::{ActionConfig, FileConfig};
use diffpost_review::http::ReqwestTransport;
use diffpost_review::orchestrator::Orchestrator;

const DEFAULT_CONFIG_FILE: &str = ".diffpost.toml";

#[derive(Parser)]
#[command(
    name = "diffpost",
    version,
    about = "Post an AI code review as a single, continuously-updated PR comment",
    long_about = "Runs once per pull request event: fetches the full diff, asks a language model\n\
                  for a review, and creates or updates one marker-tagged comment with the result.\n\n\
                  Required environment:\n  \
                    LLM_API_KEY, LLM_MODEL, PROMPT_TEMPLATE (must contain {{DIFF}}),\n  \
                    GITHUB_TOKEN, GITHUB_EVENT_PATH, GITHUB_REPOSITORY\n\n\
                  Optional environment:\n  \
                    LLM_PROVIDER (openai|gemini), LLM_BASE_URL, GITHUB_API_URL\n\n\
                  Examples:\n  \
                    diffpost                 Review the pull request in GITHUB_EVENT_PATH\n  \
                    diffpost run --verbose   Same, with debug logging\n  \
                    diffpost init            Write a sample .diffpost.toml\n  \
                    diffpost --config ci/diffpost.toml   Layer a trusted config file under the environment"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to a configuration file. Never discovered implicitly: the working
    /// directory is the pull request's checkout.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Review the triggering pull request and publish the comment (default)
    Run,
    /// Create a sample .diffpost.toml in the current directory
    Init,
}

const SAMPLE_CONFIG: &str = r#"# diffpost configuration
# Read only when passed explicitly: diffpost run --config <path>
# Environment variables take precedence over every value in this file.

[llm]
# provider = "openai"    # or "gemini"
# model = "gpt-4o"
# base_url = "https://api.openai.com"

[github]
# api_url = "https://api.github.com"

[review]
# Must contain the {{DIFF}} placeholder.
# prompt_template = """
# You are a senior engineer. Review the following pull request diff and point
# out bugs, security issues and risky changes. Be concise.
#
# {{DIFF}}
# """
"#;

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_file_config(explicit: Option<&Path>) -> Result<FileConfig> {
    match explicit {
        Some(path) => Ok(FileConfig::from_file(path)?),
        None => Ok(FileConfig::default()),
    }
}

async fn run(config_path: Option<&Path>) -> Result<()> {
    let file_config = load_file_config(config_path)?;
    let config = ActionConfig::resolve(&file_config, |key| std::env::var(key).ok())?;

    let transport = Arc::new(ReqwestTransport::new()?);
    let outcome = Orchestrator::new(&config, transport).run().await?;
    tracing::info!("{outcome}");
    Ok(())
}

fn init_config() -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);
    if path.exists() {
        miette::bail!("{DEFAULT_CONFIG_FILE} already exists");
    }
    std::fs::write(path, SAMPLE_CONFIG).into_diagnostic()?;
    eprintln!("Created {DEFAULT_CONFIG_FILE}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .expect("miette handler");
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run(cli.config.as_deref()).await,
        Command::Init => init_config(),
    }
}
