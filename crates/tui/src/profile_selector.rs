use std::rc::Rc;

use anyhow::Result;
use coursebook_catalog::{storage::FileStorage, Profiles, Store};
use crossterm::event::{KeyCode, KeyModifiers};
use log::{debug, error};
use ratatui::{
    prelude::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::{
    config::Config,
    event::{Event, EventBus},
    main_screen::MainScreen,
    styles::{color, error_text},
    widgets::StatefulList,
    ExitState, Screen,
};

/// Lets the user pick which institution's catalog to open
pub struct ProfileSelector {
    events: Rc<EventBus>,
    config: Rc<Config>,
    profiles: Profiles,
    /// Stored course count for each profile, in the same order as `profiles`
    counts: Vec<usize>,
    list: StatefulList,
    msg: Text<'static>,
}

impl ProfileSelector {
    pub fn new(events: Rc<EventBus>, config: Rc<Config>) -> Self {
        let profiles = config.profiles();
        let counts = match config.storage() {
            Ok(storage) => profiles
                .iter()
                .map(|(_, p)| Store::<FileStorage>::course_count(&storage, p))
                .collect(),
            Err(e) => {
                error!("error opening storage: {:?}", e);
                vec![0; profiles.len()]
            }
        };

        Self {
            events,
            config,
            profiles,
            counts,
            list: StatefulList::default(),
            msg: Text::raw(""),
        }
    }

    /// Create a new selector, showing an error message
    pub fn new_with_msg(events: Rc<EventBus>, config: Rc<Config>, msg: impl Into<String>) -> Self {
        Self {
            msg: error_text(msg.into()),
            ..Self::new(events, config)
        }
    }

    fn selected_key(&self) -> Option<String> {
        let idx = self.list.selected()?;
        self.profiles.iter().nth(idx).map(|(k, _)| k.to_string())
    }

    fn open(&mut self, key: &str) -> Result<ExitState> {
        match MainScreen::new(self.events.clone(), self.config.clone(), key) {
            Ok(screen) => Ok(ExitState::ChangeScreen(Box::new(screen))),
            Err(e) => {
                error!("error opening profile {}: {:?}", key, e);
                self.msg = error_text(format!("Couldn't open {key}: {e}"));
                Ok(ExitState::Running)
            }
        }
    }

    /// Remember the given profile, so it opens straight away next time
    fn make_default(&mut self, key: String) {
        let mut config = (*self.config).clone();
        config.default_profile = Some(key.clone());

        match config.save() {
            Ok(()) => {
                debug!("default profile is now {}", key);
                self.msg = Text::raw(format!("{key} will open on startup"));
                self.config = Rc::new(config);
            }
            Err(e) => {
                error!("error saving config: {:?}", e);
                self.msg = error_text(format!("Error saving config: {e}"));
            }
        }
    }
}

impl Screen for ProfileSelector {
    fn draw(&mut self, frame: &mut Frame) {
        let layout = Layout::new(
            Direction::Vertical,
            [
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(2),
            ],
        )
        .split(frame.size());

        frame.render_widget(
            Paragraph::new(vec![
                Line::from("Course Manager".blue().bold()),
                Line::from("Choose your institution".gray()),
            ])
            .alignment(Alignment::Center),
            layout[0],
        );

        let items: Vec<ListItem> = self
            .profiles
            .iter()
            .zip(self.counts.iter())
            .map(|((key, profile), count)| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        profile.name.clone(),
                        Style::new()
                            .fg(color(&profile.brand_color))
                            .add_modifier(Modifier::BOLD),
                    ),
                    format!("  {} courses", count).gray(),
                    format!("  ({})", key).dark_gray(),
                ]))
            })
            .collect();

        self.list.render_to(
            frame,
            layout[1],
            List::new(items)
                .block(
                    Block::default()
                        .title("Institutions")
                        .borders(Borders::ALL)
                        .title_alignment(Alignment::Center),
                )
                .highlight_symbol(">>"),
        );

        let help = Line::from(vec![
            "Enter".blue(),
            " open  ".into(),
            "D".blue(),
            " open on startup  ".into(),
            "q".blue(),
            " quit".into(),
        ]);
        let mut bottom = self.msg.clone();
        bottom.lines.push(help);
        frame.render_widget(Paragraph::new(bottom), layout[2]);
    }

    fn handle_event(&mut self, event: Event) -> Result<ExitState> {
        let Event::Key(key) = event else {
            return Ok(ExitState::Running);
        };

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Ok(ExitState::Quit);
            }
            KeyCode::Esc | KeyCode::Char('q') => return Ok(ExitState::Quit),
            KeyCode::Down | KeyCode::Char('j') => self.list.next(),
            KeyCode::Up | KeyCode::Char('k') => self.list.previous(),
            KeyCode::Enter | KeyCode::Char('l') => {
                if let Some(key) = self.selected_key() {
                    return self.open(&key);
                }
            }
            KeyCode::Char('D') => {
                if let Some(key) = self.selected_key() {
                    self.make_default(key);
                }
            }
            _ => (),
        };

        Ok(ExitState::Running)
    }
}
