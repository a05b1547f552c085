// src/render/mesh.rs
//! Triangle-strip surface built from the spectrum history.

use std::ops::Range;

use bytemuck::{Pod, Zeroable};

use crate::history::HistoryBuffer;

use super::color::ColorHeightMapper;
use super::resample::Resampler;

/// Depth of the surface in model units, newest row at z = 0.
pub const Z_SPAN: f32 = 1.60;

/// Model-space height of a cell with normalized height 1.
pub const HEIGHT_SCALE: f32 = 0.60;

/// Half the model-space width of the surface.
pub const HALF_WIDTH: f32 = 0.80;

/// One vertex as uploaded to the rasterizer: position then RGBA.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl Vertex {
    /// Floats per vertex in the interleaved stream.
    pub const FLOATS: usize = 7;

    pub fn new(position: [f32; 3], color: [f32; 4]) -> Self {
        Self { position, color }
    }
}

/// Model-space x of display column `x` out of `width`.
pub fn column_x(x: usize, width: usize) -> f32 {
    let norm = x as f32 / (width - 1) as f32;
    (norm - 0.5) * 2.0 * HALF_WIDTH
}

/// Rebuilds the whole relief every frame.
///
/// Strip `d` joins the rows at ages `d` and `d + 1`; each column adds the
/// near vertex then the far one, so a strip is `2 * width` vertices long.
/// Scratch buffers are kept between frames.
#[derive(Debug, Default)]
pub struct MeshBuilder {
    resampler: Resampler,
    row0: Vec<f32>,
    row1: Vec<f32>,
    vertices: Vec<Vertex>,
    width: usize,
    strips: usize,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill the vertex stream from `history` at `width` columns.
    ///
    /// Returns `false`, leaving the stream empty, when any of width, bins
    /// or depth is 2 or less.
    pub fn build(
        &mut self,
        history: &HistoryBuffer,
        width: usize,
        mapper: &ColorHeightMapper,
        tilt: f32,
    ) -> bool {
        self.clear();

        let depth = history.depth();
        let bins = history.bins();
        if width <= 2 || bins <= 2 || depth <= 2 {
            return false;
        }

        self.resampler.prepare(width, bins);
        self.vertices.reserve((depth - 1) * width * 2);

        let last = (depth - 1) as f32;
        let dz = Z_SPAN / last;

        for d in 0..depth - 1 {
            self.resampler.resample_into(history.row_by_age(d), &mut self.row0);
            self.resampler.resample_into(history.row_by_age(d + 1), &mut self.row1);

            let dist0 = d as f32 / last;
            let dist1 = (d + 1) as f32 / last;
            let z0 = -(d as f32) * dz;
            let z1 = -((d + 1) as f32) * dz;

            for x in 0..width {
                let px = column_x(x, width);

                let near = mapper.map(self.row0[x], dist0);
                let y0 = near.height * HEIGHT_SCALE + tilt * dist0;
                self.vertices.push(Vertex::new([px, y0, z0], near.color));

                let far = mapper.map(self.row1[x], dist1);
                let y1 = far.height * HEIGHT_SCALE + tilt * dist1;
                self.vertices.push(Vertex::new([px, y1, z1], far.color));
            }
        }

        self.width = width;
        self.strips = depth - 1;
        true
    }

    /// Drop the current stream, keeping capacity.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.width = 0;
        self.strips = 0;
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Interleaved stream as raw bytes for buffer upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn strip_count(&self) -> usize {
        self.strips
    }

    /// Vertices per strip.
    pub fn strip_len(&self) -> usize {
        self.width * 2
    }

    /// Vertex range of each strip, newest strip first.
    pub fn strip_ranges(&self) -> impl DoubleEndedIterator<Item = Range<usize>> + '_ {
        let len = self.strip_len();
        (0..self.strips).map(move |s| s * len..(s + 1) * len)
    }

    pub fn strip(&self, index: usize) -> &[Vertex] {
        let len = self.strip_len();
        &self.vertices[index * len..(index + 1) * len]
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}
