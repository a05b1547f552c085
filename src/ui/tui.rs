// src/ui/tui.rs
//! Terminal setup and the main event loop.

use std::{
    io,
    time::{Duration, Instant},
};

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;

use crate::app::{App, AppOptions};

/// Producer cadence: one spectrum row per tick.
const TICK_RATE: Duration = Duration::from_millis(50);

/// Restores the terminal when dropped, also on early returns.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

/// Run the relief UI until the user quits.
pub fn run(options: AppOptions) -> Result<()> {
    let mut app = App::new(options)?;

    let _guard = TerminalGuard::enter()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    info!("terminal UI started");

    let mut last_tick = Instant::now();
    loop {
        terminal.draw(|f| app.draw(f))?;
        let timeout = TICK_RATE.checked_sub(last_tick.elapsed()).unwrap_or_default();

        if event::poll(timeout)? {
            match event::read()? {
                CEvent::Key(key) if key.kind == KeyEventKind::Press => {
                    if app.on_key(key) {
                        break;
                    }
                }
                CEvent::Mouse(mouse) => app.on_mouse(mouse),
                // The next draw picks up the new size
                _ => {}
            }
        }

        if last_tick.elapsed() >= TICK_RATE {
            last_tick = Instant::now();
            app.update_spectrum();
        }
    }

    terminal.show_cursor()?;
    info!("terminal UI stopped");
    Ok(())
}
