use coursebook_catalog::Link;
use crossterm::event::KeyCode;
use log::debug;
use ratatui::{
    prelude::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::{
    event::Event,
    main_screen::{
        panes::{Document, Pane},
        Action, CatalogStore,
    },
    styles::{completion_mark, element_kind, error_text},
    widgets::StatefulList,
};

pub struct ElementViewer {
    course_id: String,
    element_id: String,

    links: StatefulList,

    /// Links as of the last draw, so numbers typed by the user match what they saw
    displayed_links: Vec<String>,

    /// State for link entry
    link_idx_max_digits: usize,
    link_entry_acc: usize,
    link_entry_digits: Option<usize>,

    confirming_delete: bool,
}

impl ElementViewer {
    pub(crate) fn new(course_id: String, element_id: String) -> Self {
        Self {
            course_id,
            element_id,
            links: StatefulList::default(),
            displayed_links: vec![],
            link_idx_max_digits: 0,
            link_entry_acc: 0,
            link_entry_digits: None,
            confirming_delete: false,
        }
    }

    pub fn confirming(&self) -> bool {
        self.confirming_delete
    }

    fn set_displayed_links(&mut self, links: &[Link]) {
        let urls: Vec<String> = links.iter().map(|l| l.url.clone()).collect();
        if urls == self.displayed_links {
            return;
        }

        self.link_idx_max_digits = if !urls.is_empty() {
            urls.len().ilog10() as usize + 1
        } else {
            0
        };
        self.displayed_links = urls;
        self.link_entry_acc = 0;
        self.link_entry_digits = None;
        debug!(
            "displaying {} links (max digits = {})",
            self.displayed_links.len(),
            self.link_idx_max_digits
        );
    }

    /// Open the link numbered `idx`, counting from 1
    fn open_link(&mut self, idx: usize) -> Action {
        self.link_entry_acc = 0;
        self.link_entry_digits = None;

        let Some(href) = idx
            .checked_sub(1)
            .and_then(|i| self.displayed_links.get(i))
        else {
            return Action::Flash(error_text("No link found"));
        };

        if let Err(e) = open::that(href) {
            return Action::Flash(error_text(format!("Error opening in browser: {e}")));
        }

        Action::Flash(format!("Opened {href} in browser").into())
    }
}

impl Pane for ElementViewer {
    fn draw(&mut self, store: &CatalogStore, frame: &mut Frame, area: Rect) {
        let Some(course) = store.course(&self.course_id) else {
            frame.render_widget(Paragraph::new("This course no longer exists.".gray()), area);
            return;
        };
        let Some(element) = course.element(&self.element_id) else {
            frame.render_widget(Paragraph::new("This element no longer exists.".gray()), area);
            return;
        };
        self.set_displayed_links(&element.links);

        let layout = Layout::new(
            Direction::Vertical,
            [
                Constraint::Length(3),
                Constraint::Min(2),
                Constraint::Length(1),
            ],
        )
        .split(area);

        frame.render_widget(
            Paragraph::new(vec![
                Line::from(vec![
                    completion_mark(element.completed),
                    Span::styled(
                        element.name.clone(),
                        Style::new().add_modifier(Modifier::BOLD),
                    ),
                ]),
                Line::from(element_kind(store.profile(), &element.kind)),
                Line::from(vec!["in ".dark_gray(), course.title.clone().into()]),
            ]),
            layout[0],
        );

        let items: Vec<ListItem> = element
            .links
            .iter()
            .enumerate()
            .map(|(i, link)| {
                ListItem::new(Line::from(vec![
                    link.display_name().to_string().blue(),
                    format!(" [{}]  ", i + 1).into(),
                    link.url.clone().dark_gray(),
                ]))
            })
            .collect();
        let title = match items.is_empty() {
            true => "No links".to_string(),
            false => format!("Links ({})", items.len()),
        };
        self.links.render_to(
            frame,
            layout[1],
            List::new(items)
                .block(Block::default().title(title).borders(Borders::TOP))
                .highlight_symbol(">>"),
        );

        let footer = match self.confirming_delete {
            true => Line::from(vec![
                format!("Delete {}? ", element.name).red(),
                "y".blue(),
                "/".into(),
                "n".blue(),
            ]),
            false => Line::from(vec![
                "o".blue(),
                " open  ".dark_gray(),
                "f".blue(),
                " open by number  ".dark_gray(),
                "Space".blue(),
                " done  ".dark_gray(),
                "e".blue(),
                " edit  ".dark_gray(),
                "d".blue(),
                " delete".dark_gray(),
            ]),
        };
        frame.render_widget(Paragraph::new(footer), layout[2]);
    }

    fn handle_event(&mut self, store: &mut CatalogStore, event: Event) -> Action {
        let Event::Key(key) = event else {
            return Action::None;
        };

        if self.confirming_delete {
            self.confirming_delete = false;
            if let KeyCode::Char('y') | KeyCode::Char('Y') = key.code {
                return match store.delete_element(&self.course_id, &self.element_id) {
                    Ok(()) => Action::Show(Document::Course(self.course_id.clone())),
                    Err(e) => Action::Flash(error_text(e.to_string())),
                };
            }
            return Action::Flash("Cancelled".into());
        }

        match key.code {
            KeyCode::Down | KeyCode::Char('j') => self.links.next(),
            KeyCode::Up | KeyCode::Char('k') => self.links.previous(),

            // Open in browser
            KeyCode::Char('o') | KeyCode::Enter if self.link_entry_digits.is_none() => {
                let Some(idx) = self.links.selected() else {
                    return Action::Flash(error_text("No link found"));
                };
                return self.open_link(idx + 1);
            }

            KeyCode::Char(' ') => {
                if let Err(e) = store.toggle_element(&self.course_id, &self.element_id) {
                    return Action::Flash(error_text(e.to_string()));
                }
            }
            KeyCode::Char('e') | KeyCode::Char('d') if store.settings().is_locked => {
                return Action::Flash(error_text("The catalog is locked, unlock it with L"));
            }
            KeyCode::Char('e') => {
                return Action::Show(Document::EditElement {
                    course_id: self.course_id.clone(),
                    element_id: self.element_id.clone(),
                });
            }
            KeyCode::Char('d') => self.confirming_delete = true,

            // Link index entry
            KeyCode::Char('f') => {
                if self.link_idx_max_digits > 0 {
                    self.link_entry_acc = 0;
                    self.link_entry_digits = Some(0);

                    return Action::Flash("Open... (type the link's number)".into());
                }
            }
            KeyCode::Enter if self.link_entry_digits.is_some() => {
                return self.open_link(self.link_entry_acc);
            }

            KeyCode::Char(n) if n.is_ascii_digit() => {
                if let (Some(idx), Some(digit)) = (self.link_entry_digits.as_mut(), n.to_digit(10))
                {
                    // add new digit to end of number
                    self.link_entry_acc *= 10;
                    self.link_entry_acc += digit as usize;
                    *idx += 1;

                    // check if done entering
                    if *idx == self.link_idx_max_digits {
                        return self.open_link(self.link_entry_acc);
                    } else {
                        return Action::Flash(
                            format!(
                                "Open... {} (RET to open, or keep typing numbers)",
                                self.link_entry_acc
                            )
                            .into(),
                        );
                    }
                }
            }

            _ => (),
        };

        // Every branch where we do more digit entry returns, so if we've stopped doing that then exit that mode
        self.link_entry_digits = None;

        Action::None
    }
}
