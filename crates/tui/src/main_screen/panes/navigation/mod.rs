use coursebook_catalog::CourseFilter;
use crossterm::event::KeyCode;
use log::{debug, error};
use ratatui::{
    prelude::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tui_tree_widget::{Tree, TreeItem, TreeState};

use super::{Action, Document, Pane};
use crate::{
    event::Event,
    main_screen::CatalogStore,
    styles::{error_text, part_badge, track_badge},
    widgets::TextInput,
};

mod tree;
use tree::*;

/// The navigation pane, which shows a tree of all courses and their elements
#[derive(Debug, Default)]
pub struct Navigation {
    tree_state: TreeState<TreeId>,
    /// What was drawn last, so key presses move through what the user can see
    items: Vec<TreeItem<'static, TreeId>>,
    filter: CourseFilter,
    /// Present while the user is typing a search
    search: Option<TextInput>,
}

impl Pane for Navigation {
    fn draw(&mut self, store: &CatalogStore, frame: &mut Frame, area: Rect) {
        let layout = Layout::new(
            Direction::Vertical,
            [Constraint::Min(1), Constraint::Length(1)],
        )
        .split(area);

        self.items = tree::build(store, &self.filter);
        if self.tree_state.selected().is_empty() {
            self.tree_state.select(vec![TreeId::Overview]);
        }

        match Tree::new(self.items.clone()) {
            Ok(tree) => frame.render_stateful_widget(
                tree.highlight_symbol(">>")
                    .highlight_style(Style::new().add_modifier(Modifier::BOLD)),
                layout[0],
                &mut self.tree_state,
            ),
            Err(e) => {
                error!("error drawing course tree: {}", e);
                frame.render_widget(
                    Paragraph::new(error_text(format!("Error drawing courses: {e}"))),
                    layout[0],
                );
            }
        };

        match &self.search {
            Some(input) => input.render_to(frame, layout[1], "Search", true),
            None => frame.render_widget(Paragraph::new(self.filter_line(store)), layout[1]),
        };
    }

    fn handle_event(&mut self, store: &mut CatalogStore, event: Event) -> Action {
        let Event::Key(key) = event else {
            return Action::None;
        };

        if let Some(input) = self.search.as_mut() {
            match key.code {
                KeyCode::Enter => self.search = None,
                KeyCode::Esc => {
                    self.filter.search.clear();
                    self.search = None;
                }
                _ => {
                    input.handle_key(key);
                    self.filter.search = input.value().to_string();
                }
            };
            return Action::None;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                return Action::Exit;
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.tree_state.key_down(&self.items);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.tree_state.key_up(&self.items);
            }
            KeyCode::Enter | KeyCode::Char('l') => return self.show_selected(store),
            KeyCode::Tab => {
                let sel = self.tree_state.selected();
                self.tree_state.toggle(sel);
            }
            KeyCode::Char(' ') => return self.toggle_selected(store),

            // filtering
            KeyCode::Char('/') => {
                self.search = Some(TextInput::new(self.filter.search.clone()));
            }
            KeyCode::Char('t') => {
                self.filter.track = cycle(store.profile().tracks.keys(), self.filter.track.take());
                debug!("track filter: {:?}", self.filter.track);
            }
            KeyCode::Char('p') => {
                self.filter.part = cycle(store.profile().parts.keys(), self.filter.part.take());
                debug!("part filter: {:?}", self.filter.part);
            }
            KeyCode::Char('c') => self.filter = CourseFilter::default(),

            // catalog-wide actions
            KeyCode::Char('a') => {
                if store.settings().is_locked {
                    return Action::Flash(error_text("The catalog is locked, unlock it with L"));
                }
                return Action::Show(Document::NewCourse);
            }
            KeyCode::Char('i') => return Action::Show(Document::Import),
            KeyCode::Char('x') => return Action::Export,
            KeyCode::Char('s') => return Action::Show(Document::Settings),
            KeyCode::Char('L') => {
                let locked = !store.settings().is_locked;
                store.set_locked(locked);
                return Action::Flash(
                    match locked {
                        true => "Catalog locked",
                        false => "Catalog unlocked",
                    }
                    .into(),
                );
            }
            KeyCode::Char('b') => return Action::ChangeProfile,
            KeyCode::Char('?') => return Action::Show(Document::Welcome),
            _ => (),
        };

        Action::None
    }
}

impl Navigation {
    fn show_selected(&mut self, store: &mut CatalogStore) -> Action {
        let sel = self.tree_state.selected();
        match sel.last().cloned() {
            Some(TreeId::Overview) => Action::Show(Document::Welcome),
            Some(TreeId::Course(course_id)) => {
                if let Err(e) = store.select(&course_id) {
                    return Action::Flash(error_text(e.to_string()));
                }
                self.tree_state.open(sel);
                Action::Show(Document::Course(course_id))
            }
            Some(TreeId::Element(course_id, element_id)) => Action::Show(Document::Element {
                course_id,
                element_id,
            }),
            Some(TreeId::Empty) | None => Action::None,
        }
    }

    /// Expand/collapse a course, or mark an element (in)complete
    fn toggle_selected(&mut self, store: &mut CatalogStore) -> Action {
        let sel = self.tree_state.selected();
        match sel.last().cloned() {
            Some(TreeId::Course(_)) => {
                self.tree_state.toggle(sel);
                Action::None
            }
            Some(TreeId::Element(course_id, element_id)) => {
                match store.toggle_element(&course_id, &element_id) {
                    Ok(_) => Action::None,
                    Err(e) => Action::Flash(error_text(e.to_string())),
                }
            }
            _ => Action::None,
        }
    }

    /// Describes the active filter, or how to set one
    fn filter_line(&self, store: &CatalogStore) -> Line<'static> {
        if self.filter.is_empty() {
            return Line::from(vec![
                "/".blue(),
                " search  ".dark_gray(),
                "t/p".blue(),
                " filter  ".dark_gray(),
                "?".blue(),
                " help".dark_gray(),
            ]);
        }

        let mut spans: Vec<Span<'static>> = vec![];
        if !self.filter.search.trim().is_empty() {
            spans.push(format!("\"{}\" ", self.filter.search.trim()).into());
        }
        if let Some(track) = &self.filter.track {
            spans.push(track_badge(store.profile(), track));
            spans.push(" ".into());
        }
        if let Some(part) = &self.filter.part {
            spans.push(part_badge(store.profile(), part));
            spans.push(" ".into());
        }
        spans.push("c".blue());
        spans.push(" clear".dark_gray());

        Line::from(spans)
    }
}

/// Step through no filter, then each key in order, then back to no filter.
fn cycle<'a>(keys: impl Iterator<Item = &'a String>, current: Option<String>) -> Option<String> {
    let keys: Vec<_> = keys.collect();
    let next = match current {
        None => 0,
        Some(current) => keys
            .iter()
            .position(|k| **k == current)
            .map_or(0, |i| i + 1),
    };

    keys.get(next).map(|k| k.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_wraps_to_none() {
        let keys = vec!["P1".to_string(), "P2".to_string()];
        let first = cycle(keys.iter(), None);
        assert_eq!(first.as_deref(), Some("P1"));
        let second = cycle(keys.iter(), first);
        assert_eq!(second.as_deref(), Some("P2"));
        assert_eq!(cycle(keys.iter(), second), None);
    }

    #[test]
    fn test_cycle_unknown_restarts() {
        let keys = vec!["P1".to_string()];
        assert_eq!(cycle(keys.iter(), Some("gone".into())).as_deref(), Some("P1"));
    }
}
