use coursebook_catalog::{ImportCandidate, ImportMode};
use crossterm::event::KeyCode;
use log::{debug, error};
use ratatui::{
    prelude::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::{Line, Text},
    widgets::{Paragraph, Wrap},
    Frame,
};

use crate::{
    event::Event,
    main_screen::{panes::Pane, Action, CatalogStore},
    styles::error_text,
    widgets::TextInput,
};

/// Reading a file, then asking how to add its courses
#[derive(Default)]
pub struct ImportViewer {
    path: TextInput,
    /// Validated file contents, waiting for the user to pick a mode
    candidate: Option<ImportCandidate>,
    error: Option<String>,
}

impl ImportViewer {
    fn read(&mut self, store: &CatalogStore) -> Action {
        let path = expand_home(self.path.value().trim());
        if path.is_empty() {
            return Action::None;
        }

        let res = std::fs::read_to_string(&path)
            .map_err(|e| format!("Error reading {path}: {e}"))
            .and_then(|text| {
                ImportCandidate::parse(&text, store.profile())
                    .map_err(|e| format!("Error importing {path}: {e}"))
            });

        match res {
            Ok(candidate) => {
                debug!("{} courses ready to import from {}", candidate.len(), path);
                self.candidate = Some(candidate);
                self.error = None;
                Action::None
            }
            Err(msg) => {
                error!("{}", msg);
                self.error = Some(msg.clone());
                Action::Flash(error_text(msg))
            }
        }
    }

    fn commit(&mut self, store: &mut CatalogStore, mode: ImportMode) -> Action {
        let Some(candidate) = self.candidate.take() else {
            return Action::None;
        };

        let count = store.import(candidate, mode);
        Action::Back(Text::raw(format!("Imported {count} courses")))
    }

    fn summary(&self, store: &CatalogStore, candidate: &ImportCandidate) -> Vec<Line<'static>> {
        let mut lines = vec![Line::from(vec![
            format!("{}", candidate.len()).blue(),
            format!(" courses found in {}", self.path.value().trim()).into(),
        ])];

        if let Some(school) = &candidate.school {
            if school != store.profile_key() {
                lines.push(Line::from(
                    format!("This file was exported from {school}, not {}.", store.profile_key())
                        .yellow(),
                ));
            }
        }
        if candidate.settings.is_some() {
            lines.push(Line::raw(
                "It includes settings, which will be used if you replace.",
            ));
        }

        lines.push(Line::raw(""));
        lines.push(Line::from(vec![
            "r".blue(),
            format!(
                " replace: delete the {} current courses and use these",
                store.courses().len()
            )
            .into(),
        ]));
        lines.push(Line::from(vec![
            "m".blue(),
            " merge: add these alongside the current courses".into(),
        ]));
        lines.push(Line::from(vec!["Esc".blue(), " cancel".into()]));

        lines
    }
}

impl Pane for ImportViewer {
    fn draw(&mut self, store: &CatalogStore, frame: &mut Frame, area: Rect) {
        let layout = Layout::new(
            Direction::Vertical,
            [
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Min(1),
            ],
        )
        .split(area);

        frame.render_widget(
            Paragraph::new(Line::styled(
                format!("Import courses into {}", store.profile().name),
                Style::new().add_modifier(Modifier::BOLD),
            )),
            layout[0],
        );

        let focused = self.candidate.is_none();
        self.path.render_to(frame, layout[1], "File", focused);

        let body = match (&self.candidate, &self.error) {
            (Some(candidate), _) => Text::from(self.summary(store, candidate)),
            (None, Some(error)) => error_text(error.clone()),
            (None, None) => Text::from(vec![
                Line::raw("Type the path to a JSON file: a backup exported with x, or a list of courses."),
                Line::from(vec![
                    "Enter".blue(),
                    " read  ".dark_gray(),
                    "Esc".blue(),
                    " cancel".dark_gray(),
                ]),
            ]),
        };
        frame.render_widget(Paragraph::new(body).wrap(Wrap { trim: false }), layout[2]);
    }

    fn handle_event(&mut self, store: &mut CatalogStore, event: Event) -> Action {
        let Event::Key(key) = event else {
            return Action::None;
        };

        if self.candidate.is_some() {
            return match key.code {
                KeyCode::Char('r') | KeyCode::Char('R') => self.commit(store, ImportMode::Replace),
                KeyCode::Char('m') | KeyCode::Char('M') => self.commit(store, ImportMode::Merge),
                KeyCode::Esc => {
                    // back to the path, to pick another file
                    self.candidate = None;
                    Action::None
                }
                _ => Action::None,
            };
        }

        match key.code {
            KeyCode::Esc => Action::Back(Text::raw("")),
            KeyCode::Enter => self.read(store),
            _ => {
                if self.path.handle_key(key) {
                    self.error = None;
                }
                Action::None
            }
        }
    }
}

/// Expand a leading `~/` to the home directory, the way a shell would.
fn expand_home(path: &str) -> String {
    match (path.strip_prefix("~/"), std::env::var("HOME")) {
        (Some(rest), Ok(home)) => format!("{home}/{rest}"),
        _ => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_home_leaves_other_paths() {
        assert_eq!(expand_home("/tmp/courses.json"), "/tmp/courses.json");
        assert_eq!(expand_home("courses~/x.json"), "courses~/x.json");
    }
}
