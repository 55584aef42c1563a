use anyhow::{anyhow, bail, Result};
use coursebook_catalog::{
    CourseDraft, CourseField, Element, ElementDraft, ElementField, Link, Profile,
};
use crossterm::event::{KeyCode, KeyModifiers};
use log::debug;
use ratatui::{
    prelude::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::Paragraph,
    Frame,
};

use crate::{
    event::Event,
    main_screen::{
        panes::{Document, Pane},
        Action, CatalogStore,
    },
    styles::error_text,
    widgets::TextInput,
};

// Course form fields
const TITLE: usize = 0;
const COURSE_CODE: usize = 1;
const ECTS: usize = 2;
const TRACK: usize = 3;
const PART: usize = 4;
const COURSE_DESCRIPTION: usize = 5;
const COURSE_IMAGE: usize = 6;

// Element form fields, followed by a name and URL field for each link
const NAME: usize = 0;
const KIND: usize = 1;
const FIRST_LINK: usize = 2;

// Settings form fields
const YEAR: usize = 0;
const SCHOOL_DESCRIPTION: usize = 1;
const LOCKED: usize = 2;
const HEADER_IMAGE: usize = 3;

const KEEP: &str = "keep";
const REMOVE: &str = "remove";

enum Input {
    Text(TextInput),
    /// One of a fixed set of `(key, label)` options
    Choice {
        options: Vec<(String, String)>,
        selected: usize,
    },
}

struct Field {
    label: String,
    input: Input,
}

impl Field {
    fn text(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            input: Input::Text(TextInput::new(value)),
        }
    }

    /// A choice starting on `current`, which is added as an option if it's not already one.
    fn choice(label: impl Into<String>, mut options: Vec<(String, String)>, current: &str) -> Self {
        let selected = match options.iter().position(|(key, _)| key == current) {
            Some(i) => i,
            None if current.is_empty() => 0,
            None => {
                options.push((current.to_string(), current.to_string()));
                options.len() - 1
            }
        };

        Self {
            label: label.into(),
            input: Input::Choice { options, selected },
        }
    }

    fn keep_or_remove(label: impl Into<String>) -> Self {
        Self::choice(
            label,
            vec![
                (KEEP.to_string(), "Keep".to_string()),
                (REMOVE.to_string(), "Remove".to_string()),
            ],
            KEEP,
        )
    }

    fn yes_no(label: impl Into<String>, value: bool) -> Self {
        Self::choice(
            label,
            vec![
                ("no".to_string(), "No".to_string()),
                ("yes".to_string(), "Yes".to_string()),
            ],
            if value { "yes" } else { "no" },
        )
    }

    /// The text entered, or the key of the chosen option
    fn value(&self) -> &str {
        match &self.input {
            Input::Text(input) => input.value(),
            Input::Choice { options, selected } => options
                .get(*selected)
                .map(|(key, _)| key.as_str())
                .unwrap_or_default(),
        }
    }

    fn handle_key(&mut self, key: crossterm::event::KeyEvent) {
        match &mut self.input {
            Input::Text(input) => {
                input.handle_key(key);
            }
            Input::Choice { options, selected } if !options.is_empty() => match key.code {
                KeyCode::Right | KeyCode::Char(' ') | KeyCode::Char('l') => {
                    *selected = (*selected + 1) % options.len()
                }
                KeyCode::Left | KeyCode::Char('h') => {
                    *selected = (*selected + options.len() - 1) % options.len()
                }
                _ => (),
            },
            Input::Choice { .. } => (),
        }
    }

    fn draw(&self, frame: &mut Frame, area: Rect, label_width: usize, focused: bool) {
        let label = format!("{:width$}", self.label, width = label_width);
        match &self.input {
            Input::Text(input) => input.render_to(frame, area, &label, focused),
            Input::Choice { options, selected } => {
                let label_style = match focused {
                    true => Style::new().fg(Color::Blue),
                    false => Style::new().fg(Color::Gray),
                };
                let value = options
                    .get(*selected)
                    .map(|(_, label)| label.clone())
                    .unwrap_or_default();
                frame.render_widget(
                    Paragraph::new(Line::from(vec![
                        Span::styled(format!("{}: ", label), label_style),
                        "< ".dark_gray(),
                        Span::raw(value),
                        " >".dark_gray(),
                    ])),
                    area,
                );
            }
        }
    }
}

/// What a form creates or changes when submitted
enum Target {
    NewCourse,
    EditCourse(String),
    NewElement(String),
    EditElement {
        course_id: String,
        element_id: String,
    },
    Settings,
}

/// Adds or edits courses, elements, and the profile's settings.
pub struct FormViewer {
    target: Target,
    title: String,
    fields: Vec<Field>,
    focus: usize,
    error: Option<String>,
}

impl FormViewer {
    fn new(target: Target, title: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            target,
            title: title.into(),
            fields,
            focus: 0,
            error: None,
        }
    }

    pub fn new_course(store: &CatalogStore) -> Self {
        let profile = store.profile();
        Self::new(
            Target::NewCourse,
            "New course",
            course_fields(profile, "", "", "", &profile.default_track, &profile.default_part, ""),
        )
    }

    pub fn edit_course(store: &CatalogStore, course_id: String) -> Self {
        let profile = store.profile();
        let Some(course) = store.course(&course_id) else {
            let mut form = Self::new_course(store);
            form.target = Target::EditCourse(course_id);
            form.error = Some("This course no longer exists".to_string());
            return form;
        };

        let mut fields = course_fields(
            profile,
            &course.title,
            &course.course_code,
            &course.ects.to_string(),
            &course.track,
            &course.part,
            &course.description,
        );
        if course.image.is_some() {
            fields.push(Field::keep_or_remove("Banner image"));
        }

        Self::new(
            Target::EditCourse(course_id),
            format!("Edit {}", course.title),
            fields,
        )
    }

    pub fn new_element(store: &CatalogStore, course_id: String) -> Self {
        let profile = store.profile();
        let title = match store.course(&course_id) {
            Some(course) => format!("New element in {}", course.title),
            None => "New element".to_string(),
        };
        let element = Element {
            kind: profile.default_element_type().to_string(),
            links: vec![Link::default()],
            ..Default::default()
        };

        Self::new(
            Target::NewElement(course_id),
            title,
            element_fields(profile, &element),
        )
    }

    pub fn edit_element(store: &CatalogStore, course_id: String, element_id: String) -> Self {
        let profile = store.profile();
        let element = store
            .course(&course_id)
            .and_then(|c| c.element(&element_id))
            .cloned();
        let missing = element.is_none();
        let element = element.unwrap_or_default();

        let mut form = Self::new(
            Target::EditElement {
                course_id,
                element_id,
            },
            format!("Edit {}", element.name),
            element_fields(profile, &element),
        );
        if missing {
            form.error = Some("This element no longer exists".to_string());
        }

        form
    }

    pub fn settings(store: &CatalogStore) -> Self {
        let settings = store.settings();
        let mut fields = vec![
            Field::text("School year", settings.school_year.clone()),
            Field::text("Description", settings.school_description.clone()),
            Field::yes_no("Locked", settings.is_locked),
        ];
        if settings.header_image.is_some() {
            fields.push(Field::keep_or_remove("Header image"));
        }

        Self::new(
            Target::Settings,
            format!("{} settings", store.profile().name),
            fields,
        )
    }

    fn value(&self, idx: usize) -> &str {
        self.fields.get(idx).map(Field::value).unwrap_or_default()
    }

    fn is_element_form(&self) -> bool {
        matches!(
            self.target,
            Target::NewElement(_) | Target::EditElement { .. }
        )
    }

    /// Add an empty name and URL pair, and focus it.
    fn add_link(&mut self) {
        let n = (self.fields.len() - FIRST_LINK) / 2 + 1;
        self.fields.push(Field::text(format!("Link {} name", n), ""));
        self.fields.push(Field::text(format!("Link {} URL", n), ""));
        self.focus = self.fields.len() - 2;
    }

    /// Links entered in an element form. Pairs with no URL are dropped by the store.
    fn links(&self) -> Vec<Link> {
        self.fields[FIRST_LINK.min(self.fields.len())..]
            .chunks(2)
            .map(|pair| {
                Link::new(
                    pair[0].value().trim(),
                    pair.get(1).map(Field::value).unwrap_or_default().trim(),
                )
            })
            .collect()
    }

    /// Where to go when the form is closed
    fn previous(&self) -> Action {
        match &self.target {
            Target::EditCourse(course_id) | Target::NewElement(course_id) => {
                Action::Show(Document::Course(course_id.clone()))
            }
            Target::EditElement {
                course_id,
                element_id,
            } => Action::Show(Document::Element {
                course_id: course_id.clone(),
                element_id: element_id.clone(),
            }),
            Target::NewCourse | Target::Settings => Action::Back(Text::raw("")),
        }
    }

    fn submit(&mut self, store: &mut CatalogStore) -> Action {
        match self.try_submit(store) {
            Ok(action) => action,
            Err(e) => {
                debug!("form rejected: {}", e);
                self.error = Some(e.to_string());
                Action::Flash(error_text(e.to_string()))
            }
        }
    }

    fn try_submit(&self, store: &mut CatalogStore) -> Result<Action> {
        match &self.target {
            Target::NewCourse => {
                let id = store.add_course(CourseDraft {
                    title: self.value(TITLE).to_string(),
                    description: self.value(COURSE_DESCRIPTION).to_string(),
                    course_code: self.value(COURSE_CODE).to_string(),
                    ects: parse_ects(self.value(ECTS))?,
                    track: Some(self.value(TRACK).to_string()),
                    part: Some(self.value(PART).to_string()),
                    image: None,
                })?;
                Ok(Action::Show(Document::Course(id)))
            }
            Target::EditCourse(course_id) => {
                let course = store
                    .course(course_id)
                    .ok_or_else(|| anyhow!("This course no longer exists"))?;
                if self.value(TITLE).trim().is_empty() {
                    bail!("A course needs a title");
                }
                let ects = parse_ects(self.value(ECTS))?;

                let mut changes = vec![];
                if self.value(TITLE).trim() != course.title {
                    changes.push(CourseField::Title(self.value(TITLE).to_string()));
                }
                if self.value(COURSE_CODE).trim() != course.course_code {
                    changes.push(CourseField::CourseCode(self.value(COURSE_CODE).to_string()));
                }
                if ects != course.ects {
                    changes.push(CourseField::Ects(ects));
                }
                if self.value(TRACK) != course.track {
                    changes.push(CourseField::Track(self.value(TRACK).to_string()));
                }
                if self.value(PART) != course.part {
                    changes.push(CourseField::Part(self.value(PART).to_string()));
                }
                if self.value(COURSE_DESCRIPTION) != course.description {
                    changes.push(CourseField::Description(
                        self.value(COURSE_DESCRIPTION).to_string(),
                    ));
                }
                if self.value(COURSE_IMAGE) == REMOVE {
                    changes.push(CourseField::Image(None));
                }

                debug!("updating {} fields of course {}", changes.len(), course_id);
                for change in changes {
                    store.update_course(course_id, change)?;
                }
                Ok(Action::Show(Document::Course(course_id.clone())))
            }
            Target::NewElement(course_id) => {
                if self.value(NAME).trim().is_empty() {
                    bail!("An element needs a name");
                }
                store.add_element(
                    course_id,
                    ElementDraft {
                        name: self.value(NAME).to_string(),
                        kind: Some(self.value(KIND).to_string()),
                        links: self.links(),
                    },
                )?;
                Ok(Action::Show(Document::Course(course_id.clone())))
            }
            Target::EditElement {
                course_id,
                element_id,
            } => {
                let element = store
                    .course(course_id)
                    .and_then(|c| c.element(element_id))
                    .ok_or_else(|| anyhow!("This element no longer exists"))?;
                let name = self.value(NAME).trim();
                if name.is_empty() {
                    bail!("An element needs a name");
                }

                let mut changes = vec![];
                if name != element.name {
                    changes.push(ElementField::Name(name.to_string()));
                }
                if self.value(KIND) != element.kind {
                    changes.push(ElementField::Kind(self.value(KIND).to_string()));
                }
                let links = self.links();
                if links != element.links {
                    changes.push(ElementField::Links(links));
                }

                for change in changes {
                    store.update_element(course_id, element_id, change)?;
                }
                Ok(Action::Show(Document::Element {
                    course_id: course_id.clone(),
                    element_id: element_id.clone(),
                }))
            }
            Target::Settings => {
                let settings = store.settings().clone();
                let year = self.value(YEAR).trim();
                if year != settings.school_year {
                    store.set_school_year(year.to_string());
                }
                if self.value(SCHOOL_DESCRIPTION) != settings.school_description {
                    store.set_school_description(self.value(SCHOOL_DESCRIPTION).to_string());
                }
                let locked = self.value(LOCKED) == "yes";
                if locked != settings.is_locked {
                    store.set_locked(locked);
                }
                if self.value(HEADER_IMAGE) == REMOVE {
                    store.set_header_image(None);
                }
                Ok(Action::Back("Settings saved".into()))
            }
        }
    }

    fn help(&self) -> Line<'static> {
        let mut spans = vec![
            "Enter".blue(),
            " save  ".dark_gray(),
            "Esc".blue(),
            " cancel  ".dark_gray(),
            "Tab".blue(),
            " next field  ".dark_gray(),
            "←/→".blue(),
            " change choice".dark_gray(),
        ];
        if self.is_element_form() {
            spans.push("  C-n".blue());
            spans.push(" add link (clear a URL to remove it)".dark_gray());
        }

        Line::from(spans)
    }
}

impl Pane for FormViewer {
    fn draw(&mut self, _: &CatalogStore, frame: &mut Frame, area: Rect) {
        let layout = Layout::new(
            Direction::Vertical,
            [
                Constraint::Length(2),
                Constraint::Min(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ],
        )
        .split(area);

        frame.render_widget(
            Paragraph::new(Line::styled(
                self.title.clone(),
                Style::new().add_modifier(Modifier::BOLD),
            )),
            layout[0],
        );

        // scroll so the focused field is always visible
        let rows = layout[1].height as usize;
        let skip = (self.focus + 1).saturating_sub(rows);
        let label_width = self
            .fields
            .iter()
            .map(|f| f.label.chars().count())
            .max()
            .unwrap_or_default();
        for (row, (i, field)) in self.fields.iter().enumerate().skip(skip).take(rows).enumerate() {
            let area = Rect {
                y: layout[1].y + row as u16,
                height: 1,
                ..layout[1]
            };
            field.draw(frame, area, label_width, i == self.focus);
        }

        if let Some(error) = &self.error {
            frame.render_widget(Paragraph::new(error_text(error.clone())), layout[2]);
        }
        frame.render_widget(Paragraph::new(self.help()), layout[3]);
    }

    fn handle_event(&mut self, store: &mut CatalogStore, event: Event) -> Action {
        let Event::Key(key) = event else {
            return Action::None;
        };

        match key.code {
            KeyCode::Esc => return self.previous(),
            KeyCode::Enter => return self.submit(store),
            KeyCode::Tab | KeyCode::Down => {
                self.focus = (self.focus + 1) % self.fields.len().max(1);
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = self
                    .focus
                    .checked_sub(1)
                    .unwrap_or(self.fields.len().saturating_sub(1));
            }
            KeyCode::Char('n') | KeyCode::Char('N')
                if key.modifiers.contains(KeyModifiers::CONTROL) && self.is_element_form() =>
            {
                self.add_link();
            }
            _ => {
                if let Some(field) = self.fields.get_mut(self.focus) {
                    field.handle_key(key);
                }
            }
        };

        Action::None
    }
}

/// ECTS as typed. Blank means none, and a decimal comma is accepted.
fn parse_ects(s: &str) -> Result<f64> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(0.0);
    }

    match s.replace(',', ".").parse::<f64>() {
        Ok(ects) if ects.is_finite() => Ok(ects),
        _ => Err(anyhow!("ECTS must be a number")),
    }
}

fn course_fields(
    profile: &Profile,
    title: &str,
    course_code: &str,
    ects: &str,
    track: &str,
    part: &str,
    description: &str,
) -> Vec<Field> {
    let tracks = profile
        .tracks
        .iter()
        .map(|(key, badge)| (key.clone(), badge.label.clone()))
        .collect();
    let parts = profile
        .parts
        .iter()
        .map(|(key, badge)| (key.clone(), badge.label.clone()))
        .collect();

    vec![
        Field::text("Title", title),
        Field::text("Course code", course_code),
        Field::text("ECTS", ects),
        Field::choice("Track", tracks, track),
        Field::choice("Part", parts, part),
        Field::text("Description", description),
    ]
}

fn element_fields(profile: &Profile, element: &Element) -> Vec<Field> {
    let kinds = profile
        .element_types
        .iter()
        .map(|(key, style)| (key.clone(), format!("{} {}", style.icon, key)))
        .collect();

    let mut fields = vec![
        Field::text("Name", element.name.clone()),
        Field::choice("Type", kinds, &element.kind),
    ];
    for (i, link) in element.links.iter().enumerate() {
        fields.push(Field::text(format!("Link {} name", i + 1), link.name.clone()));
        fields.push(Field::text(format!("Link {} URL", i + 1), link.url.clone()));
    }

    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ects() {
        assert_eq!(parse_ects("").unwrap(), 0.0);
        assert_eq!(parse_ects(" 2.5 ").unwrap(), 2.5);
        assert_eq!(parse_ects("2,5").unwrap(), 2.5);
        assert!(parse_ects("five").is_err());
        assert!(parse_ects("inf").is_err());
    }

    #[test]
    fn test_choice_keeps_unknown_value() {
        let options = vec![("P1".to_string(), "P1".to_string())];
        let field = Field::choice("Part", options, "P9");
        assert_eq!(field.value(), "P9");
    }
}
