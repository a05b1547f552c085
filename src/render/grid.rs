// src/render/grid.rs
//! Line-list overlay drawn over the relief.

use super::mesh::{Vertex, HALF_WIDTH, Z_SPAN};

/// Frequency lines running front to back.
pub const FREQUENCY_LINES: usize = 20;

/// Time lines running left to right.
pub const TIME_LINES: usize = 15;

const GRID_RGBA: [f32; 4] = [0.15, 0.60, 0.70, 0.50];

/// Dimmed grid color; `fog` scales RGB, `alpha` scales the base alpha.
fn tint(fog: f32, alpha: f32) -> [f32; 4] {
    let [r, g, b, a] = GRID_RGBA;
    [r * fog, g * fog, b * fog, a * alpha]
}

/// Fades lines with distance, never below 35 %.
fn fog(dist01: f32) -> f32 {
    (1.0 - dist01 * 0.7).clamp(0.35, 1.0)
}

/// Build the grid for a given tilt. Every pair of vertices is one line.
///
/// The back edge sits at `y = tilt`, matching the shear the mesh builder
/// applies to the oldest row.
pub fn build_grid(tilt: f32) -> Vec<Vertex> {
    let mut lines = Vec::with_capacity((FREQUENCY_LINES + TIME_LINES + 2) * 2);

    let far_fog = fog(1.0);
    for i in 0..FREQUENCY_LINES {
        let x = (i as f32 / (FREQUENCY_LINES - 1) as f32 - 0.5) * 2.0 * HALF_WIDTH;
        lines.push(Vertex::new([x, 0.0, 0.0], GRID_RGBA));
        lines.push(Vertex::new([x, tilt, -Z_SPAN], tint(far_fog, 0.4)));
    }

    for i in 0..TIME_LINES {
        let dist01 = i as f32 / (TIME_LINES - 1) as f32;
        let z = -dist01 * Z_SPAN;
        let y = tilt * dist01;
        let color = tint(fog(dist01), 0.8);
        lines.push(Vertex::new([-HALF_WIDTH, y, z], color));
        lines.push(Vertex::new([HALF_WIDTH, y, z], color));
    }

    // Front and back borders
    lines.push(Vertex::new([-HALF_WIDTH, 0.0, 0.0], GRID_RGBA));
    lines.push(Vertex::new([HALF_WIDTH, 0.0, 0.0], GRID_RGBA));
    let back = tint(0.7, 0.5);
    lines.push(Vertex::new([-HALF_WIDTH, tilt, -Z_SPAN], back));
    lines.push(Vertex::new([HALF_WIDTH, tilt, -Z_SPAN], back));

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_is_a_line_list() {
        let grid = build_grid(1.0);
        assert_eq!(grid.len(), (FREQUENCY_LINES + TIME_LINES + 2) * 2);
        assert_eq!(grid.len() % 2, 0);
    }

    #[test]
    fn back_edge_follows_tilt() {
        for tilt in [0.0, 2.8, 5.0] {
            let grid = build_grid(tilt);
            for v in grid.iter().filter(|v| v.position[2] <= -Z_SPAN + 1e-6) {
                assert!((v.position[1] - tilt).abs() < 1e-6);
            }
            for v in grid.iter().filter(|v| v.position[2] == 0.0) {
                assert_eq!(v.position[1], 0.0);
            }
        }
    }

    #[test]
    fn grid_is_pure() {
        assert_eq!(build_grid(1.5), build_grid(1.5));
        assert_ne!(build_grid(1.5), build_grid(1.6));
    }

    #[test]
    fn stays_within_surface_bounds() {
        for v in build_grid(3.0) {
            assert!(v.position[0].abs() <= HALF_WIDTH + 1e-6);
            assert!(v.color[3] > 0.0 && v.color[3] <= GRID_RGBA[3]);
        }
    }
}
