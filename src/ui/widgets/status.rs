// src/ui/widgets/status.rs
//! One-line status bar.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::config::Settings;
use crate::interaction::CameraState;
use crate::render::Levels;

/// Everything the status bar shows.
#[derive(Debug, Clone)]
pub struct StatusInfo<'a> {
    pub frequency: i64,
    pub zoom: i32,
    pub pan: i32,
    pub settings: &'a Settings,
    pub levels: Levels,
    pub camera: CameraState,
    /// Transient message, e.g. after saving
    pub message: Option<&'a str>,
}

/// Format a frequency as MHz with kHz precision.
pub fn format_frequency(hz: i64) -> String {
    format!("{:.3} MHz", hz as f64 / 1e6)
}

fn status_line(info: &StatusInfo<'_>) -> Line<'static> {
    let label = Style::default().fg(Color::DarkGray);
    let value = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let levels = if info.settings.levels.automatic {
        "auto"
    } else {
        "manual"
    };

    let mut spans = vec![
        Span::styled(format_frequency(info.frequency), value),
        Span::styled("  zoom ", label),
        Span::styled(format!("x{}", info.zoom), value),
        Span::styled("  pan ", label),
        Span::styled(info.pan.to_string(), value),
        Span::styled("  palette ", label),
        Span::styled(info.settings.palette.to_string(), value),
        Span::styled(format!("  levels {levels} "), label),
        Span::styled(
            format!("{:.0}..{:.0} dB", info.levels.low_db, info.levels.high_db),
            value,
        ),
        Span::styled("  tilt ", label),
        Span::styled(format!("{:.2}", info.camera.tilt_angle), value),
        Span::styled("  eye ", label),
        Span::styled(format!("{:.2}", info.camera.zoom_level), value),
        Span::styled("  mode ", label),
        Span::styled(info.settings.mode.to_string(), value),
    ];
    if let Some(message) = info.message {
        spans.push(Span::styled(
            format!("  {message}"),
            Style::default().fg(Color::Yellow),
        ));
    }
    Line::from(spans)
}

/// Render the status bar.
pub fn render_status(f: &mut Frame<'_>, area: Rect, info: &StatusInfo<'_>) {
    f.render_widget(Paragraph::new(status_line(info)), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frequency_is_shown_in_megahertz() {
        assert_eq!(format_frequency(7_100_000), "7.100 MHz");
        assert_eq!(format_frequency(14_074_600), "14.075 MHz");
    }

    #[test]
    fn status_mentions_palette_and_message() {
        let settings = Settings::default();
        let info = StatusInfo {
            frequency: 7_100_000,
            zoom: 2,
            pan: 16,
            settings: &settings,
            levels: Levels::new(-120.0, -65.0),
            camera: CameraState::default(),
            message: Some("saved"),
        };
        let text: String = status_line(&info)
            .spans
            .iter()
            .map(|span| span.content.as_ref())
            .collect();
        assert!(text.contains("rainbow"));
        assert!(text.contains("-120..-65 dB"));
        assert!(text.contains("x2"));
        assert!(text.ends_with("saved"));
    }
}
