use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use spectral_relief::{
    app::AppOptions,
    config::{DisplayMode, Settings},
    history::DEFAULT_DEPTH,
    render::Palette,
    telemetry, ui,
};

#[derive(Parser)]
#[command(name = "relief")]
#[command(about = "Scrolling 3D relief waterfall of a synthetic receiver")]
#[command(version)]
struct Cli {
    /// Color palette (name or index 0-6)
    #[arg(long)]
    palette: Option<Palette>,

    /// Lower edge of a manual dB window (disables automatic levels)
    #[arg(long, allow_negative_numbers = true, requires = "high")]
    low: Option<f32>,

    /// Upper edge of a manual dB window
    #[arg(long, allow_negative_numbers = true, requires = "low")]
    high: Option<f32>,

    /// Start in the flat 2D waterfall
    #[arg(long)]
    flat: bool,

    /// Rows of history
    #[arg(long, default_value_t = DEFAULT_DEPTH)]
    depth: usize,

    /// Initial center frequency in Hz
    #[arg(long, default_value_t = 7_100_000)]
    frequency: i64,

    /// Horizontal stretch of the relief
    #[arg(long, default_value_t = 3.0)]
    stretch: f32,

    /// Settings file (defaults to the platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write diagnostics to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init(cli.log_file.as_deref());

    let mut settings = match &cli.config {
        Some(path) if path.exists() => Settings::load_from(path)
            .with_context(|| format!("reading settings from {}", path.display()))?,
        Some(_) => Settings::default(),
        None => Settings::load(),
    };
    if let Some(palette) = cli.palette {
        settings.palette = palette;
    }
    if let (Some(low), Some(high)) = (cli.low, cli.high) {
        settings.levels.automatic = false;
        settings.levels.low_db = low;
        settings.levels.high_db = high;
    }
    if cli.flat {
        settings.mode = DisplayMode::Flat;
    }
    info!(?settings, "starting relief");

    ui::run(AppOptions {
        settings,
        depth: cli.depth,
        center_frequency: cli.frequency,
        stretch: cli.stretch,
        settings_path: cli.config,
    })
}
