//! Stillbell CLI library.
//!
//! Sample loading, saved preferences and the `render`, `plan` and `inspect`
//! command implementations used by the `stillbell` binary.

pub mod assets;
pub mod commands;
pub mod preferences;
