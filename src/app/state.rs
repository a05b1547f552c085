// src/app/state.rs
//! Application state management.

use anyhow::{Context, Result};
use crossterm::event::{KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::Frame;
use rustfft::num_complex::Complex;
use tracing::{info, warn};

use crate::{
    config::{DisplayMode, LevelConfig, Settings},
    display::{RenderFrame, SpectrumTick, SurfaceView, Waterfall3d},
    history::Tuning,
    interaction::{PointerButton, ScrollDelta},
    render::{Calibration, CameraConfig, ColorHeightMapper},
    source::{iq_buffer, read_latest, FftProcessor, SyntheticReceiver},
    ui::{
        keybindings::{key_to_action, Action},
        layout::{compute_layout, ComputedLayout},
        widgets::{render_flat, render_relief, render_status, StatusInfo},
    },
};

/// Highest receiver zoom factor.
pub const MAX_ZOOM: i32 = 4;

/// FFT length used for every row.
const FFT_SIZE: usize = 4096;

/// Startup options, usually from the command line.
#[derive(Debug, Clone)]
pub struct AppOptions {
    pub settings: Settings,
    pub depth: usize,
    pub center_frequency: i64,
    /// Horizontal stretch of the relief model
    pub stretch: f32,
    /// Where `s` saves settings; the platform config dir when `None`
    pub settings_path: Option<std::path::PathBuf>,
}

/// Main application state.
pub struct App {
    /// Synthetic signal source
    receiver: SyntheticReceiver,
    /// FFT stage
    fft: FftProcessor,
    /// Scratch for the newest IQ block
    iq: Vec<Complex<f32>>,
    /// Scratch for the newest dB row
    row: Vec<f32>,

    /// The relief display of the single receiver
    display: Waterfall3d,
    /// Reused render output
    frame: RenderFrame,
    /// Whether `frame` holds a drawable surface
    frame_ready: bool,
    /// The producer or an input event asked for a redraw
    needs_render: bool,

    /// Receiver zoom (1..=MAX_ZOOM)
    pub zoom: i32,
    /// Offset of the visible window in row bins
    pub pan: i32,
    /// Current settings (mirrors the display's copy)
    pub settings: Settings,
    settings_path: Option<std::path::PathBuf>,

    /// Last computed layout, for mouse hit-testing
    layout: Option<ComputedLayout>,
    /// Transient status message
    message: Option<String>,
}

impl App {
    /// Create a new application instance and start the receiver.
    pub fn new(options: AppOptions) -> Result<Self> {
        let buffer = iq_buffer(FFT_SIZE * 4);
        let receiver = SyntheticReceiver::start(
            options.center_frequency,
            crate::source::default_band(),
            buffer,
        )
        .context("starting synthetic receiver")?;

        let camera = CameraConfig {
            model_scale_x: options.stretch,
            ..CameraConfig::default()
        };
        let display = Waterfall3d::with_camera(0, options.depth, options.settings, camera);

        Ok(Self {
            receiver,
            fft: FftProcessor::new(FFT_SIZE),
            iq: Vec::with_capacity(FFT_SIZE),
            row: Vec::new(),
            display,
            frame: RenderFrame::new(),
            frame_ready: false,
            needs_render: true,
            zoom: 1,
            pan: 0,
            settings: options.settings,
            settings_path: options.settings_path,
            layout: None,
            message: None,
        })
    }

    /// Handle a key event and return true if the app should quit.
    pub fn on_key(&mut self, key: KeyEvent) -> bool {
        let action = key_to_action(&key);
        if action != Action::None {
            self.message = None;
        }

        match action {
            Action::Tune(step) => {
                let frequency = self.receiver.frequency().saturating_add(step);
                self.receiver.set_frequency(frequency);
            }
            Action::Zoom(step) => {
                let zoom = (self.zoom + step).clamp(1, MAX_ZOOM);
                if zoom != self.zoom {
                    self.zoom = zoom;
                    self.pan = self.pan.clamp(0, self.max_pan());
                }
            }
            Action::Pan(step) => {
                self.pan = (self.pan + step).clamp(0, self.max_pan());
            }
            Action::Tilt(pixels) => {
                // Same gesture as a short drag
                self.display.on_pointer_down(PointerButton::Primary, 0.0);
                self.display.on_pointer_move(f64::from(pixels));
                self.display.on_pointer_up(PointerButton::Primary);
                self.needs_render = true;
            }
            Action::CameraCloser(closer) => {
                let delta = if closer {
                    ScrollDelta::Up
                } else {
                    ScrollDelta::Down
                };
                self.needs_render |= self.display.on_scroll(delta).redraw;
            }
            Action::CyclePalette => {
                self.settings.palette = self.settings.palette.next();
                self.display.set_palette(self.settings.palette);
                self.needs_render = true;
            }
            Action::ToggleAutoLevels => {
                let mut levels = self.settings.levels;
                if levels.automatic {
                    // Freeze the current automatic window
                    let current = self.display.levels();
                    levels = LevelConfig {
                        automatic: false,
                        low_db: current.low_db,
                        high_db: current.high_db,
                    };
                } else {
                    levels.automatic = true;
                }
                self.apply_levels(levels);
            }
            Action::ShiftLevels(db) => {
                if !self.settings.levels.automatic {
                    let mut levels = self.settings.levels;
                    levels.low_db += db as f32;
                    levels.high_db += db as f32;
                    self.apply_levels(levels);
                }
            }
            Action::ToggleMode => {
                self.settings.mode = self.settings.mode.toggled();
                self.display.set_settings(self.settings);
                self.needs_render = true;
            }
            Action::ClearHistory => {
                self.display.clear();
                self.needs_render = true;
            }
            Action::SaveSettings => self.save_settings(),
            Action::Quit => {
                self.receiver.stop();
                return true; // Signal to quit
            }
            Action::None => {}
        }
        false
    }

    /// Forward mouse input on the relief to the interaction controller.
    pub fn on_mouse(&mut self, event: MouseEvent) {
        let Some(layout) = self.layout else {
            return;
        };
        let y = f64::from(event.row) * f64::from(crate::ui::layout::DOTS_PER_CELL.1);
        let inside = layout.in_relief(event.column, event.row);

        let response = match event.kind {
            MouseEventKind::Down(button) if inside => {
                self.display.on_pointer_down(pointer_button(button), y)
            }
            MouseEventKind::Drag(_) => self.display.on_pointer_move(y),
            MouseEventKind::Up(button) => self.display.on_pointer_up(pointer_button(button)),
            MouseEventKind::ScrollUp if inside => self.display.on_scroll(ScrollDelta::Up),
            MouseEventKind::ScrollDown if inside => self.display.on_scroll(ScrollDelta::Down),
            _ => return,
        };
        self.needs_render |= response.redraw;
    }

    /// Pull the newest IQ block, turn it into a row and feed the display.
    pub fn update_spectrum(&mut self) {
        let Some(layout) = self.layout else {
            return;
        };
        let (width, _) = layout.surface_size();
        let width = width as usize;
        if width <= 2 {
            return;
        }

        if read_latest(self.receiver.buffer(), self.fft.fft_size(), &mut self.iq) == 0 {
            return;
        }
        let pixels = width * self.zoom as usize;
        self.fft.compute(&self.iq, pixels, &mut self.row);

        let tick = SpectrumTick {
            samples: &self.row,
            tuning: Tuning {
                frequency: self.receiver.frequency(),
                sample_rate: self.receiver.sample_rate(),
                zoom: self.zoom,
                pan: self.pan,
            },
            calibration: Calibration::default(),
        };
        match self.display.push_spectrum(&tick) {
            Ok(redraw) => self.needs_render |= redraw,
            Err(err) => {
                warn!("relief display disabled: {err}");
                self.message = Some(format!("display error: {err}"));
            }
        }
    }

    /// Draw the application UI.
    pub fn draw(&mut self, f: &mut Frame<'_>) {
        let layout = compute_layout(f.area());
        if self.layout != Some(layout) {
            self.layout = Some(layout);
            let (width, height) = layout.surface_size();
            if let Err(err) = self.display.on_resize(width, height) {
                warn!("resize failed: {err}");
                self.message = Some(format!("resize failed: {err}"));
            }
            self.needs_render = true;
        }

        let title = format!(" relief | {} ", self.settings.palette);
        match self.settings.mode {
            DisplayMode::Relief => {
                if self.needs_render {
                    self.frame_ready = self.display.render_into(&mut self.frame);
                    self.needs_render = false;
                }
                let frame = self.frame_ready.then_some(&self.frame);
                render_relief(f, layout.relief_block, frame, &title);
            }
            DisplayMode::Flat => {
                let rows: Vec<Vec<f32>> = (0..usize::from(layout.relief_inner.height))
                    .map_while(|age| self.display.row_by_age(age))
                    .collect();
                let mapper = ColorHeightMapper::new(self.settings.palette, self.display.levels());
                render_flat(f, layout.relief_block, &rows, mapper, &title);
            }
        }

        let info = StatusInfo {
            frequency: self.receiver.frequency(),
            zoom: self.zoom,
            pan: self.pan,
            settings: &self.settings,
            levels: self.display.levels(),
            camera: self.display.camera_state(),
            message: self.message.as_deref(),
        };
        render_status(f, layout.status, &info);
    }

    /// Largest pan that keeps the visible window inside the zoomed row.
    fn max_pan(&self) -> i32 {
        let width = self
            .layout
            .map(|layout| layout.surface_size().0 as i32)
            .unwrap_or(0);
        width * (self.zoom - 1)
    }

    fn apply_levels(&mut self, levels: LevelConfig) {
        self.settings.levels = levels;
        self.display.set_levels(levels);
        self.needs_render = true;
    }

    fn save_settings(&mut self) {
        let result = match &self.settings_path {
            Some(path) => self.settings.save_to(path),
            None => self.settings.save(),
        };
        self.message = Some(match result {
            Ok(()) => {
                info!("settings saved");
                "settings saved".to_string()
            }
            Err(err) => {
                warn!("saving settings failed: {err}");
                format!("save failed: {err}")
            }
        });
    }
}

fn pointer_button(button: MouseButton) -> PointerButton {
    match button {
        MouseButton::Left => PointerButton::Primary,
        MouseButton::Right => PointerButton::Secondary,
        MouseButton::Middle => PointerButton::Middle,
    }
}
