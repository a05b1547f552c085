// src/lib.rs
//! spectral-relief - a scrolling 3D relief view of a spectrum waterfall.
//!
//! The core pipeline (history, frequency tracking, resampling, shading,
//! mesh and camera) never touches a toolkit type; hosts drive it through
//! [`display::SurfaceView`]. The `app`, `source` and `ui` modules make up
//! the terminal demo host.

pub mod app;
pub mod config;
pub mod display;
pub mod error;
pub mod history;
pub mod interaction;
pub mod render;
pub mod source;
pub mod telemetry;
pub mod ui;

pub use display::{RenderFrame, SpectrumTick, SurfaceView, Waterfall3d};
pub use error::{Error, Result};
