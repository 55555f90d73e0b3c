use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use lingochat::app::{Overrides, run_chat};
use lingochat::cli::{Cli, Commands, ConfigAction};
use lingochat::config::Config;
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose);

    match cli.command {
        None => {
            let overrides = Overrides {
                speech: cli.speech,
                model: cli.model,
                target_language: cli.target_language,
                voice_language: cli.voice_language,
                output: cli.output,
                on_empty_transcript: cli.on_empty_transcript,
            };
            let config = overrides.apply(load_config(cli.config.as_deref())?)?;

            if !cli.quiet && std::io::stdin().is_terminal() {
                eprintln!(
                    "{}",
                    format!(
                        "lingochat {} ({:?}, {} → {}). Type 'exit' to quit.",
                        lingochat::version_string(),
                        config.variant,
                        config.chat.model,
                        config.translation.target_language
                    )
                    .dimmed()
                );
            }

            if let Err(e) = run_chat(config).await {
                eprintln!("{} {}", "Error:".red(), e);
                std::process::exit(1);
            }
        }
        Some(Commands::Config { action }) => {
            handle_config_command(action, cli.config.as_deref())?;
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "lingochat",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

/// Diagnostics go to stderr; `RUST_LOG` wins over the flags.
fn init_tracing(quiet: bool, verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_level(quiet, verbose)));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn default_log_level(quiet: bool, verbose: u8) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "lingochat=info,warn",
        2 => "lingochat=debug,info",
        _ => "trace",
    }
}

/// Load config from the given path, or the default location.
///
/// A missing file at the default location means defaults; a missing file at
/// an explicit path is an error.
fn load_config(custom_path: Option<&std::path::Path>) -> Result<Config> {
    let config = if let Some(path) = custom_path {
        Config::load(path).with_context(|| format!("loading {}", path.display()))?
    } else {
        Config::load_or_default(&Config::default_path())?
    };

    Ok(config.with_env_overrides())
}

fn handle_config_command(
    action: ConfigAction,
    custom_path: Option<&std::path::Path>,
) -> Result<()> {
    match action {
        ConfigAction::Dump => {
            print!("{}", Config::dump_template());
        }
        ConfigAction::Show => {
            let config = load_config(custom_path)?;
            print!("{}", config.to_display_toml()?);
        }
        ConfigAction::Path => {
            let path = custom_path
                .map(std::path::PathBuf::from)
                .unwrap_or_else(Config::default_path);
            let status = if path.exists() {
                "exists".green().to_string()
            } else {
                "not found, using defaults".yellow().to_string()
            };
            println!("{} ({})", path.display(), status);
        }
    }
    Ok(())
}
