//! Stillbell CLI - render looped-ambience meditation tracks with bells
//!
//! This binary renders tracks to WAV, previews their bell schedule and chunk
//! layout, and inspects rendered files.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use stillbell_cli::commands;
use stillbell_cli::commands::render::RenderArgs;

/// Stillbell - Offline meditation track renderer
#[derive(Parser)]
#[command(name = "stillbell")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a track to a WAV file
    Render {
        /// Ambience bed (rain, sea, water). Defaults to the saved preference, then rain
        #[arg(short, long)]
        background: Option<String>,

        /// Track length in minutes. Defaults to the saved preference, then the minimum
        #[arg(short, long)]
        minutes: Option<f64>,

        /// Directory containing rain.wav, sea.wav and water.wav
        #[arg(short, long)]
        samples_dir: String,

        /// Bell WAV file
        #[arg(long)]
        bell: String,

        /// Output WAV path
        #[arg(short, long)]
        output: String,

        /// Engine config file (JSON)
        #[arg(short, long)]
        config: Option<String>,

        /// Longest window rendered in one piece, in seconds
        #[arg(long)]
        max_chunk_seconds: Option<f64>,

        /// Render chunks in parallel
        #[arg(long)]
        parallel: bool,

        /// Save the background and length as preferences
        #[arg(long)]
        remember: bool,

        /// Preferences file (default: user config directory)
        #[arg(long)]
        preferences: Option<PathBuf>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Print the bell schedule and chunk windows for a track
    Plan {
        /// Track length in minutes
        #[arg(short, long)]
        minutes: f64,

        /// Natural length of the bell sample in seconds
        #[arg(long, default_value_t = 8.0)]
        bell_seconds: f64,

        /// Engine config file (JSON)
        #[arg(short, long)]
        config: Option<String>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Print the format, length and PCM hash of a WAV file
    Inspect {
        /// Path to the WAV file
        #[arg(short, long)]
        input: String,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Render {
            background,
            minutes,
            samples_dir,
            bell,
            output,
            config,
            max_chunk_seconds,
            parallel,
            remember,
            preferences,
            json,
        } => {
            let args = RenderArgs {
                background,
                minutes,
                samples_dir,
                bell,
                output,
                config,
                max_chunk_seconds,
                parallel,
                remember,
                preferences,
            };
            commands::render::run(&args, json)
        }
        Commands::Plan {
            minutes,
            bell_seconds,
            config,
            json,
        } => commands::plan::run(minutes, bell_seconds, config.as_deref(), json),
        Commands::Inspect { input, json } => commands::inspect::run(&input, json),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_render() {
        let cli = Cli::try_parse_from([
            "stillbell",
            "render",
            "--background",
            "sea",
            "--minutes",
            "20",
            "--samples-dir",
            "audio",
            "--bell",
            "audio/bell.wav",
            "--output",
            "out.wav",
            "--parallel",
        ])
        .unwrap();
        match cli.command {
            Commands::Render {
                background,
                minutes,
                parallel,
                remember,
                json,
                ..
            } => {
                assert_eq!(background.as_deref(), Some("sea"));
                assert_eq!(minutes, Some(20.0));
                assert!(parallel);
                assert!(!remember);
                assert!(!json);
            }
            _ => panic!("expected render command"),
        }
    }

    #[test]
    fn test_cli_render_requires_output() {
        assert!(Cli::try_parse_from([
            "stillbell",
            "render",
            "--samples-dir",
            "audio",
            "--bell",
            "bell.wav",
        ])
        .is_err());
    }

    #[test]
    fn test_cli_parses_plan_defaults() {
        let cli = Cli::try_parse_from(["stillbell", "plan", "--minutes", "10"]).unwrap();
        match cli.command {
            Commands::Plan {
                minutes,
                bell_seconds,
                config,
                json,
            } => {
                assert_eq!(minutes, 10.0);
                assert_eq!(bell_seconds, 8.0);
                assert!(config.is_none());
                assert!(!json);
            }
            _ => panic!("expected plan command"),
        }
    }

    #[test]
    fn test_cli_parses_inspect() {
        let cli =
            Cli::try_parse_from(["stillbell", "inspect", "--input", "a.wav", "--json"]).unwrap();
        match cli.command {
            Commands::Inspect { input, json } => {
                assert_eq!(input, "a.wav");
                assert!(json);
            }
            _ => panic!("expected inspect command"),
        }
    }
}
