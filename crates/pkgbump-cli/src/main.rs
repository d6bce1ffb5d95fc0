use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
    sync::OnceLock,
};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pkgbump_core::{run, GithubHost, Host, RunConfig, RunStatus};
use regex::Regex;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "pkgbump",
    author,
    version,
    about = "Read or update version fields in a package.json"
)]
struct Cli {
    /// Sets the log level (error, warn, info, debug, trace).
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Optional TOML file with the same inputs; flags and env win over it.
    #[arg(long, value_name = "FILE", env = "PKGBUMP_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    inputs: InputArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Debug, Default)]
struct InputArgs {
    /// Manifest to read, relative to the workspace unless absolute.
    #[arg(long, env = "INPUT_TARGET", global = true)]
    target: Option<String>,

    /// Where to write the modified manifest (defaults to the target).
    #[arg(long, env = "INPUT_SAVE_TO", global = true)]
    save_to: Option<String>,

    /// One of set_version, set_dep_version, set_devdep_version,
    /// get_dep_version, get_devdep_version, get_version.
    #[arg(long, env = "INPUT_ACTION", global = true)]
    action: Option<String>,

    /// Action payload, e.g. `1.2.3` or `left-pad 1.2.3`.
    #[arg(long, env = "INPUT_ARGUMENT", global = true, allow_hyphen_values = true)]
    argument: Option<String>,

    /// Root that relative paths are resolved against.
    #[arg(long, value_name = "DIR", env = "GITHUB_WORKSPACE", global = true)]
    workspace: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Perform the action and report the result (the default).
    Run,
    /// Print the merged inputs and resolved paths without touching any file.
    Diag,
}

impl From<InputArgs> for RunConfig {
    fn from(args: InputArgs) -> Self {
        RunConfig {
            workspace: args.workspace,
            target: args.target,
            save_to: args.save_to,
            action: args.action,
            argument: args.argument,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;
    tracing::debug!(core = pkgbump_core::version(), "starting");

    let mut host = GithubHost::from_env();
    let Some(config) = config_or_report(cli.config.as_deref(), cli.inputs, &mut host) else {
        return Ok(ExitCode::FAILURE);
    };
    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => handle_run(config, host).await,
        Commands::Diag => handle_diag(config),
    }
}

// Logs go to stderr; stdout carries workflow commands for the host.
fn init_tracing(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
    Ok(())
}

async fn handle_run<H: Host>(config: RunConfig, mut host: H) -> Result<ExitCode> {
    match run(&config, &mut host).await {
        RunStatus::Succeeded => Ok(ExitCode::SUCCESS),
        RunStatus::Failed => Ok(ExitCode::FAILURE),
    }
}

fn handle_diag(config: RunConfig) -> Result<ExitCode> {
    let json = serde_json::to_string_pretty(&config)?;
    println!("{json}");
    match config.resolve() {
        Ok(resolved) => {
            println!("input:  {}", resolved.input.display());
            println!("output: {}", resolved.output.display());
            println!("action: {}", resolved.action);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            println!("invalid: {err}");
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Builds the run inputs; a bad config file is a failed run, reported like any other.
fn config_or_report<H: Host>(
    file: Option<&Path>,
    inputs: InputArgs,
    host: &mut H,
) -> Option<RunConfig> {
    match build_config(file, inputs) {
        Ok(config) => Some(config),
        Err(err) => {
            let message = format!("{err:#}");
            tracing::error!(error = %message, "config rejected");
            host.set_failed(&message);
            None
        }
    }
}

fn build_config(file: Option<&Path>, inputs: InputArgs) -> Result<RunConfig> {
    let base = match file {
        Some(path) => load_config(path)?,
        None => RunConfig::default(),
    };
    Ok(base.merge(inputs.into()))
}

fn load_config(path: &Path) -> Result<RunConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read pkgbump config {}", path.display()))?;
    toml::from_str::<RunConfig>(&expand_placeholders(&raw))
        .with_context(|| format!("invalid pkgbump config {}", path.display()))
}

/// Replaces `${NAME}` / `${NAME:fallback}` with the environment value or the fallback.
fn expand_placeholders(input: &str) -> String {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    let placeholder = PLACEHOLDER
        .get_or_init(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::([^}]*))?\}").unwrap());
    placeholder
        .replace_all(input, |caps: &regex::Captures| {
            std::env::var(&caps[1])
                .unwrap_or_else(|_| caps.get(2).map_or("", |m| m.as_str()).to_string())
        })
        .into_owned()
}
