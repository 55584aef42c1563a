use std::{fs::File, rc::Rc};

use anyhow::{Context, Result};
use log::{debug, error};
use ratatui::Frame;
use simplelog::{LevelFilter, WriteLogger};
use xdg::BaseDirectories;

mod config;
mod event;
mod main_screen;
mod profile_selector;
mod styles;
mod tui;
mod widgets;

use config::Config;
use event::{Event, EventBus};
use main_screen::MainScreen;
use profile_selector::ProfileSelector;
use tui::Tui;

/// A screen takes up the whole terminal, and receives all events.
pub trait Screen {
    fn draw(&mut self, frame: &mut Frame);
    fn handle_event(&mut self, event: Event) -> Result<ExitState>;
}

/// What to do after a screen has handled an event
pub enum ExitState {
    Running,
    Quit,
    ChangeScreen(Box<dyn Screen>),
}

fn main() -> Result<()> {
    init_logging()?;

    let config = Rc::new(match Config::load() {
        Ok(c) => c,
        Err(e) => {
            debug!("error loading config, using defaults: {:?}", e);
            Config::default()
        }
    });

    let events = Rc::new(EventBus::new());
    events.spawn_terminal_listener();

    // a profile given on the command line wins over the configured default
    let profile_key = std::env::args().nth(1).or_else(|| config.default_profile.clone());
    let screen: Box<dyn Screen> = match profile_key {
        Some(key) => match MainScreen::new(events.clone(), config.clone(), &key) {
            Ok(s) => Box::new(s),
            Err(e) => {
                error!("error opening profile {}: {:?}", key, e);
                Box::new(ProfileSelector::new_with_msg(
                    events.clone(),
                    config.clone(),
                    format!("Couldn't open profile {key}: {e}"),
                ))
            }
        },
        None => Box::new(ProfileSelector::new(events.clone(), config.clone())),
    };

    let mut tui = Tui::enter()?;
    let res = run(&mut tui, &events, screen);
    drop(tui);

    res
}

fn run(tui: &mut Tui, events: &EventBus, mut screen: Box<dyn Screen>) -> Result<()> {
    loop {
        tui.draw(screen.as_mut())?;
        match screen.handle_event(events.next()?)? {
            ExitState::Running => (),
            ExitState::Quit => return Ok(()),
            ExitState::ChangeScreen(next) => screen = next,
        }
    }
}

fn init_logging() -> Result<()> {
    let path = BaseDirectories::with_prefix("coursebook")?
        .place_cache_file("coursebook.log")
        .context("error creating log directory")?;
    let file = File::create(&path).context("error creating log file")?;

    WriteLogger::init(LevelFilter::Debug, simplelog::Config::default(), file)
        .context("error initialising logger")?;

    Ok(())
}
