use coursebook_catalog::Course;
use crossterm::event::KeyCode;
use log::{debug, info};
use ratatui::{
    prelude::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::{
    event::Event,
    main_screen::{
        panes::{Document, Pane},
        Action, CatalogStore,
    },
    styles::{color, completion_mark, element_kind, error_text, part_badge, track_badge},
    widgets::StatefulList,
};

/// Waiting for the user to confirm a deletion
enum PendingDelete {
    Course,
    Element { id: String, name: String },
}

pub struct CourseViewer {
    course_id: String,
    elements: StatefulList,
    pending: Option<PendingDelete>,
}

impl CourseViewer {
    pub(crate) fn new(course_id: String) -> Self {
        Self {
            course_id,
            elements: StatefulList::default(),
            pending: None,
        }
    }

    pub fn confirming(&self) -> bool {
        self.pending.is_some()
    }

    fn selected_element_id(&self, store: &CatalogStore) -> Option<String> {
        let course = store.course(&self.course_id)?;
        course
            .elements
            .get(self.elements.selected()?)
            .map(|e| e.id.clone())
    }

    fn confirm(&mut self, store: &mut CatalogStore, pending: PendingDelete) -> Action {
        match pending {
            PendingDelete::Course => match store.delete_course(&self.course_id) {
                Ok(course) => {
                    info!("deleted course {} ({})", course.title, course.id);
                    Action::Back(format!("Deleted {}", course.title).into())
                }
                Err(e) => Action::Flash(error_text(e.to_string())),
            },
            PendingDelete::Element { id, name } => {
                match store.delete_element(&self.course_id, &id) {
                    Ok(()) => Action::Flash(format!("Deleted {name}").into()),
                    Err(e) => Action::Flash(error_text(e.to_string())),
                }
            }
        }
    }

    fn header(&self, store: &CatalogStore, course: &Course) -> Paragraph<'static> {
        let profile = store.profile();
        let mut lines = vec![
            Line::styled(
                course.title.clone(),
                Style::new()
                    .fg(color(&profile.brand_color))
                    .add_modifier(Modifier::BOLD),
            ),
            Line::from(vec![
                course.course_code.clone().blue(),
                format!("  {} ECTS  ", course.ects).into(),
                track_badge(profile, &course.track),
                " ".into(),
                part_badge(profile, &course.part),
            ]),
        ];
        if course.image.is_some() {
            lines.push(Line::from("Banner image set".dark_gray()));
        }
        if !course.description.is_empty() {
            lines.push(Line::raw(""));
            lines.extend(course.description.lines().map(|l| Line::raw(l.to_string())));
        }

        Paragraph::new(lines).wrap(Wrap { trim: false })
    }

    fn footer(&self) -> Line<'static> {
        match &self.pending {
            Some(PendingDelete::Course) => Line::from(vec![
                "Delete this course and all its elements? ".red(),
                "y".blue(),
                "/".into(),
                "n".blue(),
            ]),
            Some(PendingDelete::Element { name, .. }) => Line::from(vec![
                format!("Delete {}? ", name).red(),
                "y".blue(),
                "/".into(),
                "n".blue(),
            ]),
            None => Line::from(vec![
                "Space".blue(),
                " done  ".dark_gray(),
                "e".blue(),
                " edit  ".dark_gray(),
                "n".blue(),
                " new element  ".dark_gray(),
                "x".blue(),
                " delete element  ".dark_gray(),
                "d".blue(),
                " delete course".dark_gray(),
            ]),
        }
    }
}

impl Pane for CourseViewer {
    fn draw(&mut self, store: &CatalogStore, frame: &mut Frame, area: Rect) {
        let Some(course) = store.course(&self.course_id) else {
            frame.render_widget(Paragraph::new("This course no longer exists.".gray()), area);
            return;
        };

        let header = self.header(store, course);
        let header_height = (header.line_count(area.width) as u16).min(area.height / 2);
        let layout = Layout::new(
            Direction::Vertical,
            [
                Constraint::Length(header_height),
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(1),
            ],
        )
        .split(area);

        frame.render_widget(header, layout[0]);

        let progress = course.progress();
        frame.render_widget(
            Gauge::default()
                .gauge_style(Style::new().fg(color(&store.profile().brand_color)))
                .ratio(progress.ratio())
                .label(format!(
                    "{}/{} done ({}%)",
                    progress.completed,
                    progress.total,
                    progress.percent()
                )),
            layout[1],
        );

        let items: Vec<ListItem> = course
            .elements
            .iter()
            .map(|element| {
                let mut spans = vec![
                    completion_mark(element.completed),
                    element_kind(store.profile(), &element.kind),
                    "  ".into(),
                    Span::raw(element.name.clone()),
                ];
                if !element.links.is_empty() {
                    spans.push(format!("  {} links", element.links.len()).dark_gray());
                }
                ListItem::new(Line::from(spans))
            })
            .collect();
        self.elements.render_to(
            frame,
            layout[2],
            List::new(items)
                .block(
                    Block::default()
                        .title(format!("Elements ({})", course.elements.len()))
                        .borders(Borders::TOP),
                )
                .highlight_symbol(">>"),
        );

        frame.render_widget(Paragraph::new(self.footer()), layout[3]);
    }

    fn handle_event(&mut self, store: &mut CatalogStore, event: Event) -> Action {
        let Event::Key(key) = event else {
            return Action::None;
        };

        // Anything but y cancels a pending deletion
        if let Some(pending) = self.pending.take() {
            return match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => self.confirm(store, pending),
                _ => Action::Flash("Cancelled".into()),
            };
        }

        match key.code {
            KeyCode::Down | KeyCode::Char('j') => self.elements.next(),
            KeyCode::Up | KeyCode::Char('k') => self.elements.previous(),
            KeyCode::Enter | KeyCode::Char('l') => {
                if let Some(element_id) = self.selected_element_id(store) {
                    return Action::Show(Document::Element {
                        course_id: self.course_id.clone(),
                        element_id,
                    });
                }
            }
            KeyCode::Char(' ') => {
                if let Some(element_id) = self.selected_element_id(store) {
                    if let Err(e) = store.toggle_element(&self.course_id, &element_id) {
                        return Action::Flash(error_text(e.to_string()));
                    }
                }
            }
            KeyCode::Char('e') | KeyCode::Char('n') | KeyCode::Char('d') | KeyCode::Char('x')
                if store.settings().is_locked =>
            {
                return Action::Flash(error_text("The catalog is locked, unlock it with L"));
            }
            KeyCode::Char('e') => return Action::Show(Document::EditCourse(self.course_id.clone())),
            KeyCode::Char('n') => return Action::Show(Document::NewElement(self.course_id.clone())),
            KeyCode::Char('d') => {
                debug!("confirming deletion of course {}", self.course_id);
                self.pending = Some(PendingDelete::Course);
            }
            KeyCode::Char('x') => {
                let Some(element_id) = self.selected_element_id(store) else {
                    return Action::None;
                };
                let name = store
                    .course(&self.course_id)
                    .and_then(|c| c.element(&element_id))
                    .map(|e| e.name.clone())
                    .unwrap_or_default();
                self.pending = Some(PendingDelete::Element {
                    id: element_id,
                    name,
                });
            }
            _ => (),
        };

        Action::None
    }
}
