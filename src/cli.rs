//! Command-line interface for lingochat
//!
//! Provides argument parsing using clap derive macros.

use crate::config::EmptyTranscriptPolicy;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Chat with Gemini and hear the answer translated
#[derive(Parser, Debug)]
#[command(
    name = "lingochat",
    version,
    about = "Chat with Gemini and get every answer translated"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Only show conversation output, no diagnostics
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose diagnostics on stderr (-v: info, -vv: debug, -vvv: trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Speech variant: transcribe `@file` lines and synthesize the translation
    #[arg(long)]
    pub speech: bool,

    /// Gemini model (default: gemini-pro)
    #[arg(long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Language the response is translated into (default: es)
    #[arg(long, value_name = "LANG")]
    pub target_language: Option<String>,

    /// Language of the synthesized voice (default: es-ES)
    #[arg(long, value_name = "LANG")]
    pub voice_language: Option<String>,

    /// File overwritten with synthesized speech (default: output.mp3)
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// What to do when speech recognition returns nothing
    #[arg(long, value_name = "POLICY", value_parser = parse_policy)]
    pub on_empty_transcript: Option<EmptyTranscriptPolicy>,
}

fn parse_policy(s: &str) -> Result<EmptyTranscriptPolicy, String> {
    s.parse()
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// View configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the built-in default configuration as TOML
    Dump,

    /// Print the effective configuration (file + environment + defaults)
    Show,

    /// Print the default configuration file location
    Path,
}
