use std::rc::Rc;

use anyhow::{Context, Result};
use coursebook_catalog::{storage::FileStorage, Store};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{error, info};
use ratatui::{
    prelude::{Constraint, Direction, Layout, Rect},
    text::Text,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::{
    config::Config,
    event::{Event, EventBus},
    profile_selector::ProfileSelector,
    styles::error_text,
    ExitState, Screen,
};

pub mod panes;
use panes::{Document, Navigation, Pane, Viewer};

/// The store for whichever profile is open
pub type CatalogStore = Store<FileStorage>;

/// An action that a [`Pane`] can request to be taken
pub enum Action {
    /// Do nothing
    None,

    /// Quit the application
    Exit,

    /// Tell the viewer to show something, and focus the viewer
    Show(Document),

    /// Focus the navigation pane
    FocusNavigation,

    /// Finish with whatever the viewer was doing: show the welcome document,
    /// focus the navigation pane, and flash the given message
    Back(Text<'static>),

    /// Go back to the profile selector
    ChangeProfile,

    /// Write an export file for the open profile
    Export,

    /// Display the given string at the bottom of the screen
    Flash(Text<'static>),
}

/// The main screen of the application
/// The bulk of the UI logic is handled by the [`self::panes`], this just contains shared state.
pub struct MainScreen {
    /// Underlying data store
    store: CatalogStore,

    /// UI Components & State
    navigation: Navigation,
    viewer: Viewer,
    viewer_focused: bool,

    flash: Text<'static>,

    config: Rc<Config>,
    events: Rc<EventBus>,
}

impl MainScreen {
    /// Open the given profile's catalog
    pub fn new(events: Rc<EventBus>, config: Rc<Config>, profile_key: &str) -> Result<Self> {
        let storage = config.storage()?;
        let store = Store::load(storage, &config.profiles(), profile_key)?;

        Ok(Self {
            store,
            navigation: Navigation::default(),
            viewer: Viewer::default(),
            viewer_focused: false,
            flash: Text::raw(""),
            config,
            events,
        })
    }

    /// Write the current catalog to the exports directory, returning where it went.
    fn export(&self) -> Result<String> {
        let envelope = self.store.export();
        let path = self
            .config
            .exports_dir()?
            .join(envelope.file_name(self.store.profile()));
        let json = envelope.to_json().context("error serialising export")?;
        std::fs::write(&path, json).with_context(|| format!("error writing {}", path))?;
        info!("exported {} courses to {}", envelope.courses.len(), path);

        Ok(path.to_string())
    }
}

impl Screen for MainScreen {
    fn draw(&mut self, frame: &mut Frame) {
        let size = frame.size();
        if size.width < 4 || size.height < 4 {
            return;
        }

        // Add margin for borders
        let content_rect = Rect {
            x: size.x + 1,
            y: size.y + 1,
            width: size.width - 2,
            height: size.height - 2,
        };

        // 30/70 split the two panes
        let layout = Layout::new(
            Direction::Horizontal,
            [
                Constraint::Percentage(30),
                Constraint::Length(1),
                Constraint::Percentage(70),
            ],
        )
        .split(content_rect);

        self.navigation.draw(&self.store, frame, layout[0]);
        self.viewer.draw(&self.store, frame, layout[2]);

        // Draw a focus rectangle around one of them.
        let focus_rect = if !self.viewer_focused {
            Rect {
                x: size.x,
                y: size.y,
                width: layout[2].x - size.x,
                height: size.height,
            }
        } else {
            Rect {
                x: layout[1].x,
                y: size.y,
                width: size.width - layout[1].x,
                height: size.height,
            }
        };

        frame.render_widget(Block::default().borders(Borders::ALL), focus_rect);

        let bottom_bar = Paragraph::new(self.flash.clone());
        frame.render_widget(
            bottom_bar,
            Rect {
                x: layout[2].x + 1,
                y: size.height.saturating_sub(1),
                width: layout[2].width.saturating_sub(1),
                height: 1,
            },
        )
    }

    /// Handle the given event
    fn handle_event(&mut self, event: Event) -> Result<ExitState> {
        // C-C always exits
        if matches!(
            event,
            Event::Key(KeyEvent {
                code: KeyCode::Char('c') | KeyCode::Char('C'),
                modifiers: KeyModifiers::CONTROL,
                ..
            })
        ) {
            return Ok(ExitState::Quit);
        }

        // Dispatch to the focused pane
        let action = match self.viewer_focused {
            true => self.viewer.handle_event(&mut self.store, event),
            false => self.navigation.handle_event(&mut self.store, event),
        };

        self.flash = Text::raw("");

        // Perform action if needed
        match action {
            Action::None => (),
            Action::Exit => return Ok(ExitState::Quit),
            Action::Show(doc) => {
                self.viewer.show(&self.store, doc);
                self.viewer_focused = true;
            }
            Action::FocusNavigation => self.viewer_focused = false,
            Action::Back(s) => {
                self.viewer.show(&self.store, Document::Welcome);
                self.viewer_focused = false;
                self.flash = s;
            }
            Action::ChangeProfile => {
                return Ok(ExitState::ChangeScreen(Box::new(ProfileSelector::new(
                    self.events.clone(),
                    self.config.clone(),
                ))));
            }
            Action::Export => {
                self.flash = match self.export() {
                    Ok(path) => Text::raw(format!("Exported to {path}")),
                    Err(e) => {
                        error!("error exporting: {:?}", e);
                        error_text(format!("Error exporting: {e}"))
                    }
                };
            }
            Action::Flash(s) => {
                self.flash = s;
            }
        };

        Ok(ExitState::Running)
    }
}
