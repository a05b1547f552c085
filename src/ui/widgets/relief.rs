// src/ui/widgets/relief.rs
//! Rasterizes a relief frame onto a braille canvas.
//!
//! Vertices are projected with the frame's MVP and drawn as ridge lines,
//! oldest strip first so newer rows overwrite older ones. Black (noise)
//! segments are left out.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{
        canvas::{Canvas, Context, Line},
        Block, Borders, Paragraph,
    },
    Frame,
};

use crate::{
    display::RenderFrame,
    render::{CameraTransform, Vertex},
};

/// Below this summed RGB a vertex counts as black.
const DARK_THRESHOLD: f32 = 0.02;

/// Draw the relief, or a placeholder when no frame is ready.
pub fn render_relief(f: &mut Frame<'_>, area: Rect, frame: Option<&RenderFrame>, title: &str) {
    let block = Block::default().borders(Borders::ALL).title(title.to_string());

    let Some((frame, camera)) = frame.and_then(|fr| fr.camera.map(|camera| (fr, camera))) else {
        let waiting = Paragraph::new("waiting for signal...")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(waiting, area);
        return;
    };

    let canvas = Canvas::default()
        .block(block)
        .marker(symbols::Marker::Braille)
        .background_color(Color::Black)
        .x_bounds([-1.0, 1.0])
        .y_bounds([-1.0, 1.0])
        .paint(|ctx| {
            for pair in frame.grid.chunks_exact(2) {
                draw_segment(ctx, &camera, &pair[0], &pair[1], false);
            }
            ctx.layer();

            let vertices = frame.vertices();
            for (i, range) in frame.mesh.strip_ranges().rev().enumerate() {
                let strip = &vertices[range];
                // The oldest strip also carries the back edge in its far row.
                if i == 0 {
                    draw_ridge(ctx, &camera, strip.iter().skip(1).step_by(2));
                }
                draw_ridge(ctx, &camera, strip.iter().step_by(2));
            }
        });
    f.render_widget(canvas, area);
}

fn draw_ridge<'a>(
    ctx: &mut Context<'_>,
    camera: &CameraTransform,
    row: impl Iterator<Item = &'a Vertex>,
) {
    let mut previous: Option<&Vertex> = None;
    for vertex in row {
        if let Some(prev) = previous {
            draw_segment(ctx, camera, prev, vertex, true);
        }
        previous = Some(vertex);
    }
}

fn draw_segment(
    ctx: &mut Context<'_>,
    camera: &CameraTransform,
    a: &Vertex,
    b: &Vertex,
    skip_dark: bool,
) {
    if skip_dark && is_dark(a) && is_dark(b) {
        return;
    }
    let (Some(pa), Some(pb)) = (camera.project(a.position), camera.project(b.position)) else {
        return;
    };
    let brighter = if luminance(a) >= luminance(b) { a } else { b };
    ctx.draw(&Line::new(
        f64::from(pa[0]),
        f64::from(pa[1]),
        f64::from(pb[0]),
        f64::from(pb[1]),
        to_color(brighter.color),
    ));
}

fn luminance(vertex: &Vertex) -> f32 {
    let [r, g, b, _] = vertex.color;
    r + g + b
}

fn is_dark(vertex: &Vertex) -> bool {
    luminance(vertex) < DARK_THRESHOLD
}

/// Premultiplied RGBA to a terminal truecolor.
pub fn to_color(rgba: [f32; 4]) -> Color {
    let [r, g, b, a] = rgba;
    let a = a.clamp(0.0, 1.0);
    let channel = |c: f32| (c * a * 255.0).round().clamp(0.0, 255.0) as u8;
    Color::Rgb(channel(r), channel(g), channel(b))
}
