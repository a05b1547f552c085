// src/render/mod.rs
//! Per-frame pipeline: resample, shade, build the mesh and the camera.

pub mod camera;
pub mod color;
pub mod grid;
pub mod mesh;
pub mod palette;
pub mod resample;

pub use camera::{CameraConfig, CameraTransform};
pub use color::{Calibration, ColorHeightMapper, FilterBoard, Levels, Shade};
pub use grid::build_grid;
pub use mesh::{MeshBuilder, Vertex};
pub use palette::Palette;
pub use resample::Resampler;
