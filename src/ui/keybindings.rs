// src/ui/keybindings.rs
//! Keyboard input handling and key mappings.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Actions derived from key events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Retune by this many Hz
    Tune(i64),
    /// Step the receiver zoom by +1 / -1
    Zoom(i32),
    /// Move the visible window by this many bins
    Pan(i32),
    /// Tilt by this many drag pixels
    Tilt(i32),
    /// Move the camera closer (`true`) or away
    CameraCloser(bool),
    CyclePalette,
    ToggleAutoLevels,
    /// Shift the manual dB window
    ShiftLevels(i32),
    ToggleMode,
    ClearHistory,
    SaveSettings,
    Quit,
    None,
}

/// Retune step for arrow keys.
pub const TUNE_STEP_HZ: i64 = 500;

/// Retune step with shift held.
pub const TUNE_FAST_HZ: i64 = 10_000;

/// Out-of-band jump.
pub const TUNE_JUMP_HZ: i64 = 100_000;

const PAN_STEP: i32 = 8;
const TILT_STEP: i32 = 50;
const LEVEL_STEP_DB: i32 = 5;

/// Convert a key event to an action.
pub fn key_to_action(key: &KeyEvent) -> Action {
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);
    match key.code {
        KeyCode::Left if shift => Action::Tune(-TUNE_FAST_HZ),
        KeyCode::Right if shift => Action::Tune(TUNE_FAST_HZ),
        KeyCode::Left => Action::Tune(-TUNE_STEP_HZ),
        KeyCode::Right => Action::Tune(TUNE_STEP_HZ),
        KeyCode::Char('j') => Action::Tune(TUNE_JUMP_HZ),
        KeyCode::Char('J') => Action::Tune(-TUNE_JUMP_HZ),
        KeyCode::Char('+') | KeyCode::Char('=') => Action::Zoom(1),
        KeyCode::Char('-') => Action::Zoom(-1),
        KeyCode::Char('[') => Action::Pan(-PAN_STEP),
        KeyCode::Char(']') => Action::Pan(PAN_STEP),
        KeyCode::Up => Action::Tilt(TILT_STEP),
        KeyCode::Down => Action::Tilt(-TILT_STEP),
        KeyCode::PageUp => Action::CameraCloser(true),
        KeyCode::PageDown => Action::CameraCloser(false),
        KeyCode::Char('p') => Action::CyclePalette,
        KeyCode::Char('a') => Action::ToggleAutoLevels,
        KeyCode::Char('l') => Action::ShiftLevels(LEVEL_STEP_DB),
        KeyCode::Char('L') => Action::ShiftLevels(-LEVEL_STEP_DB),
        KeyCode::Char('m') => Action::ToggleMode,
        KeyCode::Char('c') => Action::ClearHistory,
        KeyCode::Char('s') => Action::SaveSettings,
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        _ => Action::None,
    }
}
