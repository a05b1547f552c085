// src/ui/widgets/mod.rs
//! Custom widgets for the relief UI.

pub mod flat;
pub mod relief;
pub mod status;

// Re-export widget rendering functions
pub use flat::render_flat;
pub use relief::render_relief;
pub use status::{render_status, StatusInfo};
