//! Reviewbot CLI - CI entry point for reviewbot
//!
//! Reads the CI event, reviews the change and posts the review to chat.

mod commands;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use reviewbot_core::{Config, Secrets};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{ClassifyArgs, RunArgs};

/// Reviewbot: AI code review notifications for CI runs
#[derive(Parser, Debug)]
#[command(name = "reviewbot")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the configuration file
    #[arg(long, global = true, env = "REVIEWBOT_CONFIG")]
    config: Option<PathBuf>,

    /// Model to use (overrides config and env)
    #[arg(long, global = true, env = "REVIEWBOT_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Review the change described by the CI event
    #[command(visible_alias = "r")]
    Run(RunArgs),

    /// Classify file paths the way the diff filter does
    Classify(ClassifyArgs),

    /// Show current configuration
    Config,

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let config = load_config(cli.config.as_deref(), cli.model.clone());

    if cli.verbose {
        tracing::info!(
            model = %config.review.model,
            max_message_len = config.notify.max_message_len,
            filter_pr_diff = config.pull_request.filter_diff,
            "Configuration loaded"
        );
    }

    match cli.command {
        Some(Commands::Run(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Classify(args)) => {
            args.execute(&config)?;
        }
        Some(Commands::Config) => {
            print_config(&config, cli.config.as_deref())?;
        }
        Some(Commands::Version) => {
            println!("reviewbot {}", env!("CARGO_PKG_VERSION"));
        }
        None => {
            RunArgs::from_env().execute(&config).await?;
        }
    }

    Ok(())
}

/// Load the configuration, falling back to defaults when the file is unusable
fn load_config(path: Option<&Path>, model: Option<String>) -> Config {
    Config::load_with_overrides(path, model.clone()).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to load configuration, using defaults");
        Config::fallback(model)
    })
}

fn print_config(config: &Config, path: Option<&Path>) -> anyhow::Result<()> {
    println!("Reviewbot Configuration");
    println!("=======================");
    println!();
    println!("GitHub:");
    println!("  api_url: {}", config.github.api_url);
    println!("  timeout: {:?}", config.github.timeout);
    println!();
    println!("Review:");
    println!("  model: {}", config.review.model);
    println!("  api_url: {}", config.review.api_url);
    println!("  timeout: {:?}", config.review.timeout);
    println!();
    println!("Notify:");
    println!("  username: {}", config.notify.username);
    println!("  color: {:#08x}", config.notify.color);
    println!("  max_message_len: {}", config.notify.max_message_len);
    println!("  timeout: {:?}", config.notify.timeout);
    println!();
    println!("Resources:");
    println!("  extra_extensions: {:?}", config.resources.extra_extensions);
    println!("  extra_directories: {:?}", config.resources.extra_directories);
    println!();
    println!("Pull requests:");
    println!("  filter_diff: {}", config.pull_request.filter_diff);
    println!();

    let config_path = path.map(PathBuf::from).or_else(Config::default_config_path);
    if let Some(path) = config_path {
        println!("Config file: {}", path.display());
        if path.exists() {
            println!("  (exists)");
        } else {
            println!("  (not found - using defaults)");
        }
    }

    let secrets = Secrets::load()?;
    println!();
    println!("Secrets:");
    println!("  github token: {}", presence(secrets.github_token().is_some()));
    println!("  gemini api key: {}", presence(secrets.gemini_api_key().is_some()));
    println!("  discord webhook: {}", presence(secrets.discord_webhook_url().is_some()));

    Ok(())
}

fn presence(set: bool) -> &'static str {
    if set {
        "set"
    } else {
        "missing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_broken_config_falls_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[notify\nmax_message_len = ").unwrap();

        let config = load_config(Some(file.path()), Some("gemini-test".to_string()));
        assert_eq!(config.review.model, "gemini-test");
        assert_eq!(config.notify.username, Config::default().notify.username);
    }

    #[test]
    fn test_missing_config_path_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(Some(&dir.path().join("absent.toml")), None);
        assert!(config.pull_request.filter_diff);
    }

    #[tokio::test]
    async fn test_broken_config_does_not_stop_run() {
        let mut config_file = tempfile::NamedTempFile::new().unwrap();
        writeln!(config_file, "[notify\n").unwrap();
        let config = load_config(Some(config_file.path()), None);

        let mut event = tempfile::NamedTempFile::new().unwrap();
        write!(event, r#"{{"repository": {{"full_name": "octo/game"}}}}"#).unwrap();
        let args = RunArgs {
            event_path: Some(event.path().to_path_buf()),
            event_name: Some("issues".to_string()),
            dry_run: true,
        };

        args.execute(&config).await.unwrap();
    }
}
