//! Render command implementation
//!
//! Loads the samples, runs the engine on a background worker while printing
//! progress, and writes the finished WAV file.

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use stillbell_engine::{
    BackgroundKind, Engine, EngineConfig, Progress, RenderWorker, SynthesisError,
    SynthesisRequest, WavResult, WorkerEvent,
};

use crate::assets::load_library;
use crate::preferences::Preferences;

use super::json_output::{error_codes, JsonError, RenderOutput, RenderResult};
use super::{exit_code_for, load_config};

/// Arguments of the render command.
#[derive(Debug, Clone, Default)]
pub struct RenderArgs {
    /// Background identifier (rain, sea, water)
    pub background: Option<String>,
    /// Track length in minutes
    pub minutes: Option<f64>,
    /// Directory holding `<background>.wav` files
    pub samples_dir: String,
    /// Bell WAV file
    pub bell: String,
    /// Output WAV path
    pub output: String,
    /// Engine config file (JSON)
    pub config: Option<String>,
    /// Override for `max_chunk_seconds`
    pub max_chunk_seconds: Option<f64>,
    /// Render chunks in parallel
    pub parallel: bool,
    /// Save background and minutes as preferences after a successful render
    pub remember: bool,
    /// Preferences file (default: user config directory)
    pub preferences: Option<PathBuf>,
}

/// A failure before or outside the engine.
#[derive(Debug)]
struct CliFailure {
    code: &'static str,
    message: String,
    file: Option<String>,
}

impl CliFailure {
    fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            file: None,
        }
    }

    fn with_file(mut self, file: &str) -> Self {
        self.file = Some(file.to_string());
        self
    }
}

/// Settings resolved from arguments, preferences and config.
#[derive(Debug)]
struct Resolved {
    background: BackgroundKind,
    minutes: f64,
    config: EngineConfig,
    preferences_path: Option<PathBuf>,
}

/// Run the render command
///
/// # Returns
/// Exit code: 0 on success, 1 on user-actionable errors, 2 on internal errors
pub fn run(args: &RenderArgs, json_output: bool) -> Result<ExitCode> {
    let start = Instant::now();

    let resolved = match resolve(args, json_output) {
        Ok(r) => r,
        Err(failure) => return report_failure(failure, json_output),
    };

    if !json_output {
        println!("{} {}", "Rendering:".cyan().bold(), args.output);
        println!(
            "{} {} for {} min",
            "Background:".dimmed(),
            resolved.background,
            resolved.minutes
        );
        println!(
            "{} {}s chunks{}",
            "Chunking:".dimmed(),
            resolved.config.max_chunk_seconds,
            if resolved.config.parallel_chunks {
                " (parallel)"
            } else {
                ""
            }
        );
    }

    let library = match load_library(
        Path::new(&args.samples_dir),
        &[resolved.background],
        Path::new(&args.bell),
    ) {
        Ok(library) => Arc::new(library),
        Err(e) => {
            return report_failure(
                CliFailure::new(error_codes::FILE_READ, format!("{:#}", e)),
                json_output,
            )
        }
    };

    let worker = match RenderWorker::spawn(Engine::new(resolved.config.clone()), library) {
        Ok(worker) => worker,
        Err(e) => {
            return report_failure(
                CliFailure::new(
                    error_codes::WORKER,
                    format!("Failed to start render worker: {}", e),
                ),
                json_output,
            )
        }
    };

    let request = SynthesisRequest::from_minutes(resolved.background, resolved.minutes);
    let mut outcome: Option<Result<WavResult, SynthesisError>> = None;
    for event in worker.submit(request).iter() {
        match event {
            WorkerEvent::Progress(progress) => {
                if !json_output {
                    print_progress(&progress);
                }
            }
            WorkerEvent::Complete(result) => outcome = Some(Ok(result)),
            WorkerEvent::Failed(err) => outcome = Some(Err(err)),
        }
    }
    worker.shutdown();

    let wav = match outcome {
        Some(Ok(wav)) => wav,
        Some(Err(err)) => return report_engine_error(&err, json_output),
        None => {
            let err = SynthesisError::render("render worker stopped without a result");
            return report_engine_error(&err, json_output);
        }
    };

    if let Err(e) = write_output(&args.output, &wav.wav_data) {
        return report_failure(
            CliFailure::new(error_codes::FILE_WRITE, format!("{:#}", e)).with_file(&args.output),
            json_output,
        );
    }

    if args.remember {
        remember(&resolved, json_output);
    }

    let duration_ms = start.elapsed().as_millis() as u64;
    if json_output {
        let result = RenderResult::from_wav(
            &args.output,
            resolved.background.as_str(),
            &wav,
            duration_ms,
        );
        println!(
            "{}",
            serde_json::to_string_pretty(&RenderOutput::success(result))?
        );
    } else {
        println!(
            "\n{} {} ({:.1}s, {} Hz, {} ch, {} bytes) in {}ms",
            "Wrote".green().bold(),
            args.output,
            wav.duration_seconds(),
            wav.sample_rate,
            wav.channels,
            wav.wav_data.len(),
            duration_ms
        );
        println!("{} {}", "PCM hash:".dimmed(), wav.pcm_hash);
    }

    Ok(ExitCode::SUCCESS)
}

/// Merges arguments, saved preferences and the config file.
fn resolve(args: &RenderArgs, json_output: bool) -> Result<Resolved, CliFailure> {
    let preferences_path = args.preferences.clone().or_else(Preferences::default_path);
    let preferences = match &preferences_path {
        Some(path) => Preferences::load_from(path).unwrap_or_else(|e| {
            if !json_output {
                eprintln!("  {} Ignoring saved preferences: {:#}", "!".yellow(), e);
            }
            Preferences::default()
        }),
        None => Preferences::default(),
    };

    let mut config = load_config(args.config.as_deref()).map_err(|e| {
        let failure = CliFailure::new(error_codes::CONFIG, format!("{:#}", e));
        match &args.config {
            Some(path) => failure.with_file(path),
            None => failure,
        }
    })?;
    if let Some(max_chunk_seconds) = args.max_chunk_seconds {
        config.max_chunk_seconds = max_chunk_seconds;
    }
    if args.parallel {
        config.parallel_chunks = true;
    }
    config
        .validate()
        .map_err(|e| CliFailure::new(error_codes::CONFIG, e.to_string()))?;

    let background = match &args.background {
        Some(name) => name
            .parse::<BackgroundKind>()
            .map_err(|e| CliFailure::new(error_codes::UNKNOWN_BACKGROUND, e.to_string()))?,
        None => preferences.background.unwrap_or(BackgroundKind::Rain),
    };
    let minutes = args
        .minutes
        .or(preferences.duration_minutes)
        .unwrap_or(config.min_duration_seconds / 60.0);

    Ok(Resolved {
        background,
        minutes,
        config,
        preferences_path,
    })
}

fn write_output(path: &str, data: &[u8]) -> Result<()> {
    let path = Path::new(path);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory '{}'", parent.display()))?;
    }
    fs::write(path, data).with_context(|| format!("Failed to write '{}'", path.display()))
}

fn remember(resolved: &Resolved, json_output: bool) {
    let Some(path) = &resolved.preferences_path else {
        return;
    };
    let preferences = Preferences {
        background: Some(resolved.background),
        duration_minutes: Some(resolved.minutes),
    };
    if let Err(e) = preferences.save_to(path) {
        if !json_output {
            eprintln!("  {} Could not save preferences: {:#}", "!".yellow(), e);
        }
    }
}

fn print_progress(progress: &Progress) {
    println!(
        "  {} {:<10} {}",
        format!("[{:>3}%]", progress.percentage).dimmed(),
        progress.phase.label(),
        progress.detail
    );
}

fn report_failure(failure: CliFailure, json_output: bool) -> Result<ExitCode> {
    if json_output {
        let mut error = JsonError::new(failure.code, failure.message);
        if let Some(file) = failure.file {
            error = error.with_file(file);
        }
        let output = RenderOutput::failure(vec![error]);
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        eprintln!("{}: {}", "error".red(), failure.message);
    }
    Ok(ExitCode::from(1))
}

fn report_engine_error(err: &SynthesisError, json_output: bool) -> Result<ExitCode> {
    if json_output {
        let output = RenderOutput::failure(vec![JsonError::from(err)]);
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        eprintln!("{} [{}]: {}", "error".red(), err.code(), err);
    }
    Ok(exit_code_for(err))
}
