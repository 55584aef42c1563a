use std::io::{self, Stderr};
use std::panic;

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::error;
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::Screen;

/// The terminal, switched into raw mode on the alternate screen for as long as this lives.
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stderr>>,
}

impl Tui {
    pub fn enter() -> Result<Self> {
        let terminal = Terminal::new(CrosstermBackend::new(io::stderr()))?;
        // built before switching modes, so dropping it on a failed setup puts things back
        let mut tui = Self { terminal };

        terminal::enable_raw_mode()?;
        crossterm::execute!(io::stderr(), EnterAlternateScreen, EnableMouseCapture)?;
        install_panic_hook();

        tui.terminal.hide_cursor()?;
        tui.terminal.clear()?;
        Ok(tui)
    }

    pub fn draw(&mut self, screen: &mut dyn Screen) -> Result<()> {
        self.terminal.draw(|frame| screen.draw(frame))?;
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        if let Err(e) = restore() {
            error!("failed to restore the terminal: {}", e);
        }
        if let Err(e) = self.terminal.show_cursor() {
            error!("failed to show the cursor: {}", e);
        }
    }
}

fn restore() -> io::Result<()> {
    terminal::disable_raw_mode()?;
    crossterm::execute!(io::stderr(), LeaveAlternateScreen, DisableMouseCapture)
}

/// Put the terminal back before a panic message is printed, so it stays readable.
fn install_panic_hook() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        if let Err(e) = restore() {
            error!("failed to restore the terminal: {}", e);
        }
        previous(info);
    }));
}
