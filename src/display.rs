// src/display.rs
//! Per-receiver relief display: the context object the host talks to.
//!
//! One [`Waterfall3d`] exists per receiver. The producer calls
//! [`Waterfall3d::push_spectrum`] once per acquisition tick; the renderer
//! asks for frames through [`SurfaceView::on_render_request`]. Both paths,
//! and every pointer event, go through one mutex, and the render pass holds
//! it for the whole resample-and-build sequence so the rows it walks stay
//! put relative to the `head` it started from.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, trace, warn};

use crate::config::{LevelConfig, Settings};
use crate::error::Result;
use crate::history::{FrequencyTracker, HistoryBuffer, TrackerAction, Tuning, FLOOR_DB};
use crate::interaction::{
    CameraState, InteractionController, PointerButton, Response, ScrollDelta,
};
use crate::render::{
    build_grid, Calibration, CameraConfig, CameraTransform, ColorHeightMapper, Levels,
    MeshBuilder, Palette, Vertex,
};

/// Ticks after a reset or resize that are stored but do not ask for a redraw.
pub const SETTLE_TICKS: u32 = 5;

/// Render-skip diagnostics are only logged for this many frames.
const SKIP_LOG_LIMIT: u32 = 5;

/// One producer tick.
#[derive(Debug, Clone, Copy)]
pub struct SpectrumTick<'a> {
    /// Magnitudes in dB; display column `i` reads `samples[i + pan]`
    pub samples: &'a [f32],
    pub tuning: Tuning,
    /// Gain-calibration terms, added to every sample as it is stored
    pub calibration: Calibration,
}

/// Output of a render pass, reused by the host from frame to frame.
#[derive(Debug, Default)]
pub struct RenderFrame {
    /// Relief strips
    pub mesh: MeshBuilder,
    /// Overlay line list
    pub grid: Vec<Vertex>,
    pub camera: Option<CameraTransform>,
    pub width: u32,
    pub height: u32,
}

impl RenderFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertices(&self) -> &[Vertex] {
        self.mesh.vertices()
    }

    /// Column-major MVP, identity before the first successful render.
    pub fn mvp(&self) -> [f32; 16] {
        self.camera
            .map(|camera| camera.mvp_array())
            .unwrap_or_else(|| glam::Mat4::IDENTITY.to_cols_array())
    }
}

/// Interface the host drives. No toolkit types cross it.
pub trait SurfaceView {
    /// The render target changed size (pixels).
    fn on_resize(&self, width: u32, height: u32) -> Result<Response>;

    /// Build the next frame, `None` when there is nothing to draw yet.
    fn on_render_request(&self) -> Option<RenderFrame>;

    fn on_pointer_down(&self, button: PointerButton, y: f64) -> Response;

    fn on_pointer_move(&self, y: f64) -> Response;

    fn on_pointer_up(&self, button: PointerButton) -> Response;

    fn on_scroll(&self, delta: ScrollDelta) -> Response;
}

/// State shared between producer, renderer and input handling.
struct Surface {
    history: Option<HistoryBuffer>,
    tracker: FrequencyTracker,
    controller: InteractionController,
    /// Grid for the current tilt
    grid: Vec<Vertex>,
    settings: Settings,
    /// Window computed on the latest accepted tick
    levels: Levels,
    width: u32,
    height: u32,
    ticks_since_reset: u32,
    skipped_renders: u32,
}

impl Surface {
    fn restart_settling(&mut self) {
        self.ticks_since_reset = 0;
    }

    /// Make sure the history exists and has `bins` columns.
    fn ensure_history(&mut self, id: usize, depth: usize, bins: usize) -> Result<()> {
        match self.history.as_mut() {
            Some(history) if history.bins() == bins => return Ok(()),
            Some(history) => {
                debug!("[relief rx{id}] resizing history {} -> {bins} bins", history.bins());
                history.resize(bins)?;
            }
            None => {
                info!("[relief rx{id}] allocating history {depth} x {bins}");
                self.history = Some(HistoryBuffer::new(depth, bins)?);
            }
        }
        self.restart_settling();
        Ok(())
    }

    fn note_skip(&mut self, id: usize, why: &str) {
        if self.skipped_renders < SKIP_LOG_LIMIT {
            debug!("[relief rx{id}] render skipped: {why}");
        }
        self.skipped_renders = self.skipped_renders.saturating_add(1);
    }
}

/// The relief display of one receiver.
pub struct Waterfall3d {
    id: usize,
    depth: usize,
    camera_config: CameraConfig,
    surface: Mutex<Surface>,
}

impl Waterfall3d {
    /// Create the display for receiver `id`. The history is allocated on
    /// the first tick or resize with a usable width.
    pub fn new(id: usize, depth: usize, settings: Settings) -> Self {
        Self::with_camera(id, depth, settings, CameraConfig::default())
    }

    pub fn with_camera(
        id: usize,
        depth: usize,
        settings: Settings,
        camera_config: CameraConfig,
    ) -> Self {
        let controller = InteractionController::new();
        let grid = build_grid(controller.state().tilt_angle);
        let levels = Levels::new(settings.levels.low_db, settings.levels.high_db);
        Self {
            id,
            depth: depth.max(1),
            camera_config,
            surface: Mutex::new(Surface {
                history: None,
                tracker: FrequencyTracker::new(),
                controller,
                grid,
                settings,
                levels,
                width: 0,
                height: 0,
                ticks_since_reset: 0,
                skipped_renders: 0,
            }),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    fn lock(&self) -> MutexGuard<'_, Surface> {
        // Every critical section leaves the state consistent, so a panic
        // elsewhere does not invalidate it.
        self.surface.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Accept one row from the producer.
    ///
    /// Returns whether the host should schedule a redraw. Allocation failure
    /// while (re)sizing the history is the only error.
    pub fn push_spectrum(&self, tick: &SpectrumTick<'_>) -> Result<bool> {
        let mut surface = self.lock();
        let bins = surface.width as usize;
        if bins <= 2 {
            return Ok(false);
        }
        surface.ensure_history(self.id, self.depth, bins)?;

        let surface = &mut *surface;
        let Some(history) = surface.history.as_mut() else {
            return Ok(false);
        };

        match surface.tracker.apply(tick.tuning, history) {
            TrackerAction::Unchanged => {}
            TrackerAction::Rotated(shift) => {
                trace!("[relief rx{}] rotated history by {shift} bins", self.id);
            }
            TrackerAction::Reset(reason) => {
                debug!("[relief rx{}] history reset: {reason}", self.id);
                surface.ticks_since_reset = 0;
            }
        }

        // Stored rows carry the calibration; padding stays at the floor.
        let pan = i64::from(tick.tuning.pan);
        let samples = tick.samples;
        let offset = tick.calibration.offset_db();
        history.push_row_with(|row| {
            for (i, cell) in row.iter_mut().enumerate() {
                *cell = usize::try_from(i as i64 + pan)
                    .ok()
                    .and_then(|src| samples.get(src))
                    .map_or(FLOOR_DB, |db| db + offset);
            }
        });

        // Automatic window: mean of the first `bins` raw samples, unpanned.
        let source = &samples[..samples.len().min(bins)];
        surface.levels = surface.settings.levels.resolve(source, &tick.calibration);

        surface.ticks_since_reset = surface.ticks_since_reset.saturating_add(1);
        Ok(surface.ticks_since_reset > SETTLE_TICKS)
    }

    /// Build the next frame into `frame`, reusing its buffers.
    ///
    /// Returns `false`, with an empty mesh, when there is nothing to draw:
    /// no history yet or a dimension of 2 or less.
    pub fn render_into(&self, frame: &mut RenderFrame) -> bool {
        let mut surface = self.lock();
        frame.camera = None;
        frame.width = surface.width;
        frame.height = surface.height;

        let (width, height) = (surface.width, surface.height);
        if width <= 2 || height <= 2 {
            surface.note_skip(self.id, "degenerate target size");
            frame.mesh.clear();
            return false;
        }
        let Some(history) = surface.history.as_ref() else {
            surface.note_skip(self.id, "history not allocated");
            frame.mesh.clear();
            return false;
        };

        let camera_state = *surface.controller.state();
        let mapper = ColorHeightMapper::new(surface.settings.palette, surface.levels);
        if !frame
            .mesh
            .build(history, width as usize, &mapper, camera_state.tilt_angle)
        {
            surface.note_skip(self.id, "degenerate history");
            return false;
        }

        frame.grid.clone_from(&surface.grid);
        frame.camera = Some(CameraTransform::new(
            &self.camera_config,
            width,
            height,
            camera_state.zoom_level,
        ));
        true
    }

    /// Clear the history, keeping its size and the tuning state.
    pub fn clear(&self) {
        let mut surface = self.lock();
        if let Some(history) = surface.history.as_mut() {
            history.reset();
        }
        surface.restart_settling();
    }

    pub fn settings(&self) -> Settings {
        self.lock().settings
    }

    pub fn set_palette(&self, palette: Palette) {
        self.lock().settings.palette = palette;
    }

    pub fn set_levels(&self, levels: LevelConfig) {
        let mut surface = self.lock();
        surface.settings.levels = levels;
        if !levels.automatic {
            surface.levels = Levels::new(levels.low_db, levels.high_db);
        }
    }

    pub fn set_settings(&self, settings: Settings) {
        self.lock().settings = settings;
        self.set_levels(settings.levels);
    }

    /// dB window the next frame will be shaded with.
    pub fn levels(&self) -> Levels {
        self.lock().levels
    }

    pub fn camera_state(&self) -> CameraState {
        *self.lock().controller.state()
    }

    /// Tuning the history is currently aligned to.
    pub fn tuning(&self) -> Option<Tuning> {
        self.lock().tracker.state()
    }

    /// Physical head index and bin count, if the history exists.
    pub fn history_shape(&self) -> Option<(usize, usize)> {
        self.lock()
            .history
            .as_ref()
            .map(|history| (history.head(), history.bins()))
    }

    /// Copy of the row at `age`, if the history exists and `age < depth`.
    pub fn row_by_age(&self, age: usize) -> Option<Vec<f32>> {
        let surface = self.lock();
        let history = surface.history.as_ref()?;
        (age < history.depth()).then(|| history.row_by_age(age).to_vec())
    }

    fn after_input(&self, surface: &mut Surface, response: Response) -> Response {
        if response.tilt_changed {
            surface.grid = build_grid(surface.controller.state().tilt_angle);
        }
        response
    }
}

impl SurfaceView for Waterfall3d {
    fn on_resize(&self, width: u32, height: u32) -> Result<Response> {
        let mut surface = self.lock();
        if surface.width == width && surface.height == height {
            return Ok(Response::default());
        }
        surface.width = width;
        surface.height = height;
        let bins = width as usize;
        if bins > 2 && surface.history.is_some() {
            surface.ensure_history(self.id, self.depth, bins)?;
        }
        Ok(Response {
            consumed: true,
            redraw: true,
            tilt_changed: false,
        })
    }

    fn on_render_request(&self) -> Option<RenderFrame> {
        let mut frame = RenderFrame::new();
        self.render_into(&mut frame).then_some(frame)
    }

    fn on_pointer_down(&self, button: PointerButton, y: f64) -> Response {
        let mut surface = self.lock();
        let response = surface.controller.pointer_down(button, y);
        self.after_input(&mut surface, response)
    }

    fn on_pointer_move(&self, y: f64) -> Response {
        let mut surface = self.lock();
        let response = surface.controller.pointer_move(y);
        self.after_input(&mut surface, response)
    }

    fn on_pointer_up(&self, button: PointerButton) -> Response {
        let mut surface = self.lock();
        let response = surface.controller.pointer_up(button);
        self.after_input(&mut surface, response)
    }

    fn on_scroll(&self, delta: ScrollDelta) -> Response {
        let mut surface = self.lock();
        let response = surface.controller.scroll(delta);
        if !response.consumed {
            warn!("[relief rx{}] ignoring non-finite scroll delta", self.id);
        }
        self.after_input(&mut surface, response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    const RATE: u32 = 48_000;

    fn tuning(frequency: i64) -> Tuning {
        Tuning {
            frequency,
            sample_rate: RATE,
            zoom: 1,
            pan: 0,
        }
    }

    fn manual_settings() -> Settings {
        Settings {
            levels: LevelConfig {
                automatic: false,
                low_db: -100.0,
                high_db: 0.0,
            },
            ..Settings::default()
        }
    }

    fn display(depth: usize, width: u32) -> Waterfall3d {
        let display = Waterfall3d::new(0, depth, manual_settings());
        display.on_resize(width, 100).unwrap();
        display
    }

    fn push(display: &Waterfall3d, samples: &[f32], frequency: i64) -> bool {
        display
            .push_spectrum(&SpectrumTick {
                samples,
                tuning: tuning(frequency),
                calibration: Calibration::default(),
            })
            .unwrap()
    }

    #[test]
    fn nothing_to_render_before_first_tick() {
        let display = display(8, 16);
        assert!(display.on_render_request().is_none());
        assert!(display.history_shape().is_none());
    }

    #[test]
    fn first_ticks_are_stored_but_not_redrawn() {
        let display = display(8, 16);
        let row = vec![-50.0; 16];
        for tick in 1..=SETTLE_TICKS {
            assert!(!push(&display, &row, 7_000_000), "tick {tick}");
        }
        assert!(push(&display, &row, 7_000_000));
        assert_eq!(display.history_shape(), Some((6, 16)));
        assert_eq!(display.row_by_age(0).unwrap(), row);
    }

    #[test]
    fn reset_restarts_settling() {
        let display = display(8, 16);
        let row = vec![-50.0; 16];
        for _ in 0..=SETTLE_TICKS {
            push(&display, &row, 7_000_000);
        }
        assert!(push(&display, &row, 7_000_000));

        // Jump far out of band.
        assert!(!push(&display, &row, 9_000_000));
        assert_eq!(display.history_shape(), Some((1, 16)));
        assert_eq!(display.row_by_age(1).unwrap(), vec![FLOOR_DB; 16]);
    }

    #[test]
    fn retune_realigns_stored_rows() {
        let display = display(4, 10);
        let row: Vec<f32> = (0..10).map(|i| -(i as f32)).collect();
        push(&display, &row, 7_000_000);

        let hz_per_bin = RATE as i64 / 10;
        push(&display, &vec![-1.0; 10], 7_000_000 - 2 * hz_per_bin);

        let previous = display.row_by_age(1).unwrap();
        assert_eq!(&previous[..2], &[FLOOR_DB, FLOOR_DB]);
        assert_eq!(&previous[2..], &row[..8]);
    }

    #[test]
    fn pan_reads_offset_samples_and_pads_with_floor() {
        let display = display(4, 5);
        let samples = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        display
            .push_spectrum(&SpectrumTick {
                samples: &samples,
                tuning: Tuning { pan: 3, ..tuning(1_000) },
                calibration: Calibration::default(),
            })
            .unwrap();
        assert_eq!(
            display.row_by_age(0).unwrap(),
            vec![4.0, 5.0, 6.0, FLOOR_DB, FLOOR_DB]
        );

        display
            .push_spectrum(&SpectrumTick {
                samples: &samples,
                tuning: Tuning { pan: -2, ..tuning(1_000) },
                calibration: Calibration::default(),
            })
            .unwrap();
        assert_eq!(
            display.row_by_age(0).unwrap(),
            vec![FLOOR_DB, FLOOR_DB, 1.0, 2.0, 3.0]
        );
    }

    #[test]
    fn render_builds_strips_grid_and_camera() {
        let display = display(6, 32);
        push(&display, &vec![-20.0; 32], 1_000);

        let frame = display.on_render_request().expect("frame");
        assert_eq!(frame.mesh.strip_count(), 5);
        assert_eq!(frame.vertices().len(), 5 * 2 * 32);
        assert!(!frame.grid.is_empty());
        let camera = frame.camera.expect("camera");
        assert_eq!(frame.mvp(), camera.mvp_array());
        assert_eq!((frame.width, frame.height), (32, 100));
    }

    #[test]
    fn degenerate_target_skips_render() {
        let display = display(6, 32);
        push(&display, &vec![-20.0; 32], 1_000);
        display.on_resize(32, 2).unwrap();

        let mut frame = RenderFrame::new();
        assert!(!display.render_into(&mut frame));
        assert!(frame.vertices().is_empty());
        assert!(frame.camera.is_none());
        assert_eq!(frame.mvp(), glam::Mat4::IDENTITY.to_cols_array());
    }

    #[test]
    fn resize_reallocates_and_discards() {
        let display = display(6, 32);
        push(&display, &vec![-20.0; 32], 1_000);
        display.on_resize(48, 100).unwrap();
        assert_eq!(display.history_shape(), Some((0, 48)));
        assert_eq!(display.row_by_age(5).unwrap(), vec![FLOOR_DB; 48]);
        // The tracker state survives the resize.
        assert_eq!(display.tuning(), Some(tuning(1_000)));
    }

    #[test]
    fn resize_restarts_settling() {
        let display = display(6, 32);
        for _ in 0..SETTLE_TICKS {
            push(&display, &vec![-20.0; 32], 1_000);
        }
        assert!(push(&display, &vec![-20.0; 32], 1_000));

        display.on_resize(48, 100).unwrap();
        let row = vec![-20.0; 48];
        for tick in 1..=SETTLE_TICKS {
            assert!(!push(&display, &row, 1_000), "tick {tick}");
        }
        assert!(push(&display, &row, 1_000));
    }

    #[test]
    fn clear_restarts_settling() {
        let display = display(6, 16);
        let row = vec![-20.0; 16];
        for _ in 0..=SETTLE_TICKS {
            push(&display, &row, 1_000);
        }
        display.clear();
        assert_eq!(display.history_shape(), Some((0, 16)));
        for tick in 1..=SETTLE_TICKS {
            assert!(!push(&display, &row, 1_000), "tick {tick}");
        }
        assert!(push(&display, &row, 1_000));
        assert_eq!(display.tuning(), Some(tuning(1_000)));
    }

    #[test]
    fn dragging_rebuilds_grid() {
        let display = display(6, 32);
        push(&display, &vec![-20.0; 32], 1_000);
        let before = display.on_render_request().unwrap().grid;

        display.on_pointer_down(PointerButton::Primary, 10.0);
        let response = display.on_pointer_move(-200.0);
        assert!(response.redraw && response.tilt_changed);
        display.on_pointer_up(PointerButton::Primary);

        let after = display.on_render_request().unwrap().grid;
        assert_ne!(before, after);
        assert_eq!(after, build_grid(display.camera_state().tilt_angle));
    }

    #[test]
    fn automatic_levels_follow_latest_row() {
        let display = Waterfall3d::new(1, 4, Settings::default());
        display.on_resize(8, 8).unwrap();
        display
            .push_spectrum(&SpectrumTick {
                samples: &[-90.0; 8],
                tuning: tuning(1_000),
                calibration: Calibration {
                    gain_calibration: 2,
                    ..Calibration::default()
                },
            })
            .unwrap();
        let levels = display.levels();
        assert_eq!(levels.low_db, -90.0 + 2.0 - 5.0);
        assert_eq!(levels.high_db, levels.low_db + 55.0);
    }

    #[test]
    fn calibration_keeps_carriers_visible_in_automatic_mode() {
        let display = Waterfall3d::new(0, 4, Settings::default());
        display.on_resize(8, 8).unwrap();
        let mut samples = [-90.0; 8];
        samples[3] = -70.0;
        display
            .push_spectrum(&SpectrumTick {
                samples: &samples,
                tuning: tuning(1_000),
                calibration: Calibration {
                    gain_calibration: 30,
                    ..Calibration::default()
                },
            })
            .unwrap();

        let levels = display.levels();
        assert_eq!(levels, Levels::new(-62.5, -7.5));
        let row = display.row_by_age(0).unwrap();
        assert_eq!(row[0], -60.0);
        assert_eq!(row[3], -40.0);

        let mapper = ColorHeightMapper::new(Palette::default(), levels);
        assert!(mapper.map(row[3], 0.0).height > 0.0);
        assert_eq!(mapper.map(row[0], 0.0).height, 0.0);
    }

    #[test]
    fn calibration_offsets_samples_in_manual_mode() {
        let display = display(4, 8);
        display
            .push_spectrum(&SpectrumTick {
                samples: &[-90.0; 8],
                tuning: tuning(1_000),
                calibration: Calibration {
                    gain_calibration: 30,
                    ..Calibration::default()
                },
            })
            .unwrap();
        assert_eq!(display.levels(), Levels::new(-100.0, 0.0));
        assert_eq!(display.row_by_age(0).unwrap(), vec![-60.0; 8]);
    }

    #[test]
    fn automatic_levels_ignore_pan_padding() {
        let display = Waterfall3d::new(0, 4, Settings::default());
        display.on_resize(5, 8).unwrap();
        display
            .push_spectrum(&SpectrumTick {
                samples: &[-80.0; 6],
                tuning: Tuning { pan: 4, ..tuning(1_000) },
                calibration: Calibration::default(),
            })
            .unwrap();
        let row = display.row_by_age(0).unwrap();
        assert_eq!(&row[2..], &[FLOOR_DB; 3]);
        assert_eq!(display.levels().low_db, -85.0);
    }

    #[test]
    fn producer_and_renderer_run_concurrently() {
        let display = Arc::new(display(24, 64));
        let producer = {
            let display = Arc::clone(&display);
            thread::spawn(move || {
                for tick in 0..300_i64 {
                    let row: Vec<f32> = (0..64).map(|i| -((i + tick) % 90) as f32).collect();
                    display
                        .push_spectrum(&SpectrumTick {
                            samples: &row,
                            tuning: tuning(7_000_000 + (tick % 7) * 750),
                            calibration: Calibration::default(),
                        })
                        .unwrap();
                }
            })
        };

        let mut frame = RenderFrame::new();
        let mut rendered = 0;
        for _ in 0..200 {
            if display.render_into(&mut frame) {
                rendered += 1;
                assert_eq!(frame.vertices().len(), 23 * 2 * 64);
            }
            display.on_scroll(ScrollDelta::Smooth(0.3));
        }
        producer.join().unwrap();
        assert!(display.render_into(&mut frame));
        assert!(rendered <= 200);
    }
}
