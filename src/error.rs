// src/error.rs
//! Error type shared by the display pipeline and the settings layer.

use std::collections::TryReserveError;
use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced to the host application.
///
/// Everything on the per-frame path degrades to a no-op instead of
/// returning one of these; only allocation and configuration problems do.
#[derive(Debug, Error)]
pub enum Error {
    /// The history store could not grow to the requested size.
    #[error("failed to allocate history of {depth} x {bins} cells")]
    Allocation {
        depth: usize,
        bins: usize,
        #[source]
        source: TryReserveError,
    },

    #[error("palette index {0} is out of range (expected 0..=6)")]
    InvalidPalette(i64),

    #[error("unknown display mode `{0}`")]
    InvalidMode(String),

    #[error("invalid value `{value}` for setting `{key}`")]
    InvalidSetting { key: String, value: String },

    #[error("could not access settings file {path}")]
    SettingsIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("settings file is not valid TOML: {0}")]
    SettingsFormat(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
