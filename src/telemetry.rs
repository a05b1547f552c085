// src/telemetry.rs
//! Tracing setup. The terminal belongs to the UI, so events go to a file.

use std::fs::File;
use std::path::Path;
use std::sync::{Mutex, OnceLock};

use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

static TELEMETRY_INIT: OnceLock<()> = OnceLock::new();

const DEFAULT_FILTER: &str = "spectral_relief=info,relief=info";

/// Install the global subscriber once. Without a log file, events are
/// discarded. `RUST_LOG` overrides the default filter.
pub fn init(log_file: Option<&Path>) {
    TELEMETRY_INIT.get_or_init(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))
            .unwrap_or_else(|_| EnvFilter::default().add_directive(Level::INFO.into()));

        let builder = fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_ansi(false)
            .compact();

        let result = match log_file.map(File::create) {
            Some(Ok(file)) => builder.with_writer(Mutex::new(file)).try_init(),
            Some(Err(err)) => {
                eprintln!("[telemetry] cannot open log file: {err}");
                builder.with_writer(std::io::sink).try_init()
            }
            None => builder.with_writer(std::io::sink).try_init(),
        };
        if let Err(err) = result {
            eprintln!("[telemetry] failed to initialise tracing subscriber: {err}");
        }
    });
}
