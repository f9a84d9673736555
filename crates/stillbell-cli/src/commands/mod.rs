//! CLI command implementations

pub mod inspect;
pub mod json_output;
pub mod plan;
pub mod render;

use std::process::ExitCode;

use anyhow::{Context, Result};
use stillbell_engine::{EngineConfig, SynthesisError};

/// Exit code for engine failures: 1 if the request can be fixed by the user, 2 otherwise.
pub fn exit_code_for(err: &SynthesisError) -> ExitCode {
    if err.is_user_actionable() {
        ExitCode::from(1)
    } else {
        ExitCode::from(2)
    }
}

/// Loads an engine config file, or the defaults when no path is given.
pub(crate) fn load_config(path: Option<&str>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_path(std::path::Path::new(path))
            .with_context(|| format!("Failed to load config '{}'", path)),
        None => Ok(EngineConfig::default()),
    }
}
