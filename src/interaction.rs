// src/interaction.rs
//! Pointer-driven tilt and zoom.

/// Allowed tilt range; tilt is the height added at the far edge.
pub const TILT_RANGE: (f32, f32) = (0.0, 5.0);

/// Allowed eye distance range.
pub const ZOOM_RANGE: (f32, f32) = (1.0, 4.0);

pub const DEFAULT_TILT: f32 = 2.8;
pub const DEFAULT_ZOOM: f32 = 2.0;

/// Tilt change per pixel of vertical drag.
pub const DRAG_SENSITIVITY: f32 = 0.002;

/// Zoom change per discrete scroll step.
pub const ZOOM_STEP: f32 = 0.15;

/// Interactive camera state. Only the controller mutates it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub tilt_angle: f32,
    pub zoom_level: f32,
    pub dragging: bool,
    pub drag_start_y: f64,
    pub drag_start_tilt: f32,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            tilt_angle: DEFAULT_TILT,
            zoom_level: DEFAULT_ZOOM,
            dragging: false,
            drag_start_y: 0.0,
            drag_start_tilt: DEFAULT_TILT,
        }
    }
}

/// Pointer buttons the controller distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Scroll input, discrete or smooth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollDelta {
    /// Wheel away from the user: move the eye closer
    Up,
    /// Wheel toward the user: move the eye away
    Down,
    /// Smooth vertical delta, positive moves away
    Smooth(f64),
}

/// What the host should do after an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Response {
    /// Event was handled by the relief view
    pub consumed: bool,
    /// A new frame should be rendered
    pub redraw: bool,
    /// Tilt changed, so tilt-dependent geometry must be rebuilt
    pub tilt_changed: bool,
}

impl Response {
    const IGNORED: Response = Response {
        consumed: false,
        redraw: false,
        tilt_changed: false,
    };

    const CONSUMED: Response = Response {
        consumed: true,
        redraw: false,
        tilt_changed: false,
    };
}

/// `{idle, dragging}` state machine over [`CameraState`].
#[derive(Debug, Default, Clone)]
pub struct InteractionController {
    state: CameraState,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: CameraState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &CameraState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        self.state.dragging
    }

    /// Start a tilt drag on primary press.
    pub fn pointer_down(&mut self, button: PointerButton, y: f64) -> Response {
        if button != PointerButton::Primary || !y.is_finite() {
            return Response::IGNORED;
        }
        self.state.dragging = true;
        self.state.drag_start_y = y;
        self.state.drag_start_tilt = self.state.tilt_angle;
        Response::CONSUMED
    }

    /// Update tilt while dragging.
    pub fn pointer_move(&mut self, y: f64) -> Response {
        if !self.state.dragging || !y.is_finite() {
            return Response::IGNORED;
        }
        let delta = (y - self.state.drag_start_y) as f32;
        let (min, max) = TILT_RANGE;
        let tilt = (self.state.drag_start_tilt + delta * DRAG_SENSITIVITY).clamp(min, max);
        let tilt = if tilt.is_finite() { tilt } else { self.state.tilt_angle };

        let tilt_changed = tilt != self.state.tilt_angle;
        self.state.tilt_angle = tilt;
        Response {
            consumed: true,
            redraw: true,
            tilt_changed,
        }
    }

    /// End the drag on primary release.
    pub fn pointer_up(&mut self, button: PointerButton) -> Response {
        if button != PointerButton::Primary {
            return Response::IGNORED;
        }
        self.state.dragging = false;
        Response::CONSUMED
    }

    /// Move the eye along the view axis.
    pub fn scroll(&mut self, delta: ScrollDelta) -> Response {
        let step = match delta {
            ScrollDelta::Up => -ZOOM_STEP,
            ScrollDelta::Down => ZOOM_STEP,
            ScrollDelta::Smooth(dy) if dy.is_finite() => dy as f32 * ZOOM_STEP * 0.5,
            ScrollDelta::Smooth(_) => return Response::IGNORED,
        };
        let (min, max) = ZOOM_RANGE;
        let zoom = (self.state.zoom_level + step).clamp(min, max);
        // Huge deltas can overflow to infinity before the clamp.
        self.state.zoom_level = if zoom.is_finite() {
            zoom
        } else if step > 0.0 {
            max
        } else {
            min
        };
        Response {
            consumed: true,
            redraw: true,
            tilt_changed: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_range(value: f32, (min, max): (f32, f32)) -> bool {
        value >= min && value <= max
    }

    #[test]
    fn drag_adjusts_tilt_from_start() {
        let mut ctl = InteractionController::new();
        assert!(ctl.pointer_down(PointerButton::Primary, 100.0).consumed);
        assert!(ctl.is_dragging());

        let r = ctl.pointer_move(150.0);
        assert!(r.redraw && r.tilt_changed);
        assert!((ctl.state().tilt_angle - (DEFAULT_TILT + 0.1)).abs() < 1e-6);

        // Relative to the drag start, not the previous move.
        ctl.pointer_move(50.0);
        assert!((ctl.state().tilt_angle - (DEFAULT_TILT - 0.1)).abs() < 1e-6);

        ctl.pointer_up(PointerButton::Primary);
        assert!(!ctl.is_dragging());
        assert_eq!(ctl.pointer_move(500.0), Response::IGNORED);
    }

    #[test]
    fn non_primary_buttons_are_ignored() {
        let mut ctl = InteractionController::new();
        assert_eq!(
            ctl.pointer_down(PointerButton::Secondary, 10.0),
            Response::IGNORED
        );
        assert!(!ctl.is_dragging());
        ctl.pointer_down(PointerButton::Primary, 10.0);
        assert_eq!(ctl.pointer_up(PointerButton::Middle), Response::IGNORED);
        assert!(ctl.is_dragging());
    }

    #[test]
    fn tilt_stays_clamped_for_extreme_drags() {
        let mut ctl = InteractionController::new();
        ctl.pointer_down(PointerButton::Primary, 0.0);
        for y in [1e12, -1e12, f64::MAX, -f64::MAX, 3.0, f64::NAN, f64::INFINITY] {
            ctl.pointer_move(y);
            assert!(in_range(ctl.state().tilt_angle, TILT_RANGE), "y = {y}");
        }
        ctl.pointer_move(1e9);
        assert_eq!(ctl.state().tilt_angle, TILT_RANGE.1);
        ctl.pointer_move(-1e9);
        assert_eq!(ctl.state().tilt_angle, TILT_RANGE.0);
    }

    #[test]
    fn scroll_steps_and_clamps() {
        let mut ctl = InteractionController::new();
        ctl.scroll(ScrollDelta::Up);
        assert!((ctl.state().zoom_level - (DEFAULT_ZOOM - ZOOM_STEP)).abs() < 1e-6);
        ctl.scroll(ScrollDelta::Smooth(2.0));
        assert!((ctl.state().zoom_level - (DEFAULT_ZOOM)).abs() < 1e-6);

        for _ in 0..100 {
            ctl.scroll(ScrollDelta::Down);
        }
        assert_eq!(ctl.state().zoom_level, ZOOM_RANGE.1);
        for _ in 0..100 {
            ctl.scroll(ScrollDelta::Up);
        }
        assert_eq!(ctl.state().zoom_level, ZOOM_RANGE.0);
    }

    #[test]
    fn zoom_survives_extreme_smooth_deltas() {
        let mut ctl = InteractionController::new();
        for dy in [f64::MAX, -f64::MAX, 1e300, f64::NAN, -1e-300, f64::NEG_INFINITY] {
            ctl.scroll(ScrollDelta::Smooth(dy));
            assert!(in_range(ctl.state().zoom_level, ZOOM_RANGE), "dy = {dy}");
        }
        assert!(!ctl.scroll(ScrollDelta::Smooth(f64::NAN)).consumed);
    }
}
