//! Plan command implementation
//!
//! Prints the bell schedule and chunk windows for a track without rendering.

use anyhow::Result;
use colored::Colorize;
use std::process::ExitCode;

use stillbell_engine::{Engine, Timeline};

use super::json_output::{error_codes, JsonError, PlanOutput};
use super::{exit_code_for, load_config};

/// Run the plan command
///
/// # Arguments
/// * `minutes` - Track length in minutes
/// * `bell_seconds` - Natural length of the bell sample
/// * `config_path` - Optional engine config file
/// * `json_output` - Whether to output machine-readable JSON
pub fn run(
    minutes: f64,
    bell_seconds: f64,
    config_path: Option<&str>,
    json_output: bool,
) -> Result<ExitCode> {
    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            if json_output {
                let output = PlanOutput {
                    success: false,
                    errors: vec![JsonError::new(error_codes::CONFIG, format!("{:#}", e))],
                    timeline: None,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
                return Ok(ExitCode::from(1));
            }
            return Err(e);
        }
    };

    let engine = Engine::new(config);
    match engine.plan(minutes * 60.0, bell_seconds) {
        Ok(timeline) => {
            if json_output {
                let output = PlanOutput {
                    success: true,
                    errors: Vec::new(),
                    timeline: Some(timeline),
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                print_timeline(&timeline);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            if json_output {
                let output = PlanOutput {
                    success: false,
                    errors: vec![JsonError::from(&err)],
                    timeline: None,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                eprintln!("{} [{}]: {}", "error".red(), err.code(), err);
            }
            Ok(exit_code_for(&err))
        }
    }
}

fn print_timeline(timeline: &Timeline) {
    println!(
        "{} {}s ({} min)",
        "Track:".cyan().bold(),
        timeline.duration_seconds,
        timeline.duration_seconds / 60.0
    );
    println!(
        "{} {}s per strike",
        "Bell:".dimmed(),
        timeline.bell_duration_seconds
    );

    println!("\n{}", "Bells:".cyan().bold());
    if timeline.schedule.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for &t in timeline.schedule.times() {
        println!("  {} {:>8.1}s", "*".yellow(), t);
    }

    println!(
        "\n{} {:?} crossfade",
        "Chunks:".cyan().bold(),
        timeline.crossfade_mode()
    );
    for chunk in &timeline.chunks {
        let bells: Vec<String> = chunk
            .bells
            .iter()
            .map(|b| format!("{:.1}s", b.local_seconds))
            .collect();
        let carried: Vec<String> = chunk
            .carried_bells
            .iter()
            .map(|b| format!("{:.1}s", b.local_seconds))
            .collect();
        println!(
            "  #{:<3} {:>8.1}s - {:>8.1}s  bells [{}]{}",
            chunk.index,
            chunk.start_seconds,
            chunk.end_seconds,
            bells.join(", "),
            if carried.is_empty() {
                String::new()
            } else {
                format!("  carried [{}]", carried.join(", ")).dimmed().to_string()
            }
        );
    }
}
