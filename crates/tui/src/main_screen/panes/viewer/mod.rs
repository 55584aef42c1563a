use crossterm::event::KeyCode;
use ratatui::{prelude::Rect, Frame};

use crate::{event::Event, main_screen::CatalogStore};

use super::{Action, Pane};

mod course;
mod element;
mod form;
mod import;
mod welcome;

use course::CourseViewer;
use element::ElementViewer;
use form::FormViewer;
use import::ImportViewer;
use welcome::WelcomeViewer;

/// Something we want to show in the viewer
#[derive(Debug, Default)]
pub enum Document {
    /// Profile overview and key help
    #[default]
    Welcome,

    /// A course's details and elements
    Course(String),

    /// A single element and its links
    Element {
        course_id: String,
        element_id: String,
    },

    NewCourse,
    EditCourse(String),
    /// A new element in the given course
    NewElement(String),
    EditElement {
        course_id: String,
        element_id: String,
    },

    /// Importing courses from a file
    Import,

    /// The profile's settings
    Settings,
}

/// Shows [`Document`]s to the user.
/// Most of the view logic is in submodules, to keep things clean.
pub enum Viewer {
    Welcome(WelcomeViewer),
    Course(CourseViewer),
    Element(ElementViewer),
    Form(FormViewer),
    Import(ImportViewer),
}

impl Default for Viewer {
    fn default() -> Self {
        Self::Welcome(Default::default())
    }
}

impl Viewer {
    /// Set the content that we will show from next draw.
    /// Forms are filled in from the store's current values.
    pub fn show(&mut self, store: &CatalogStore, d: Document) {
        *self = match d {
            Document::Welcome => Self::Welcome(Default::default()),
            Document::Course(course_id) => Self::Course(CourseViewer::new(course_id)),
            Document::Element {
                course_id,
                element_id,
            } => Self::Element(ElementViewer::new(course_id, element_id)),
            Document::Import => Self::Import(Default::default()),
            Document::NewCourse => Self::Form(FormViewer::new_course(store)),
            Document::EditCourse(course_id) => Self::Form(FormViewer::edit_course(store, course_id)),
            Document::NewElement(course_id) => Self::Form(FormViewer::new_element(store, course_id)),
            Document::EditElement {
                course_id,
                element_id,
            } => Self::Form(FormViewer::edit_element(store, course_id, element_id)),
            Document::Settings => Self::Form(FormViewer::settings(store)),
        };
    }

    /// Whether this viewer is taking text input or waiting for an answer,
    /// so `q` and Esc shouldn't go back to the navigation pane.
    fn captures_keys(&self) -> bool {
        match self {
            Viewer::Welcome(_) => false,
            Viewer::Course(viewer) => viewer.confirming(),
            Viewer::Element(viewer) => viewer.confirming(),
            Viewer::Form(_) | Viewer::Import(_) => true,
        }
    }
}

impl Pane for Viewer {
    fn draw(&mut self, store: &CatalogStore, frame: &mut Frame, area: Rect) {
        match self {
            Viewer::Welcome(viewer) => viewer.draw(store, frame, area),
            Viewer::Course(viewer) => viewer.draw(store, frame, area),
            Viewer::Element(viewer) => viewer.draw(store, frame, area),
            Viewer::Form(viewer) => viewer.draw(store, frame, area),
            Viewer::Import(viewer) => viewer.draw(store, frame, area),
        }
    }

    fn handle_event(&mut self, store: &mut CatalogStore, event: Event) -> Action {
        let Event::Key(key) = event else {
            return Action::None;
        };

        if !self.captures_keys() {
            if let KeyCode::Char('q') | KeyCode::Esc = key.code {
                return Action::FocusNavigation;
            };
        }

        match self {
            Viewer::Welcome(viewer) => viewer.handle_event(store, event),
            Viewer::Course(viewer) => viewer.handle_event(store, event),
            Viewer::Element(viewer) => viewer.handle_event(store, event),
            Viewer::Form(viewer) => viewer.handle_event(store, event),
            Viewer::Import(viewer) => viewer.handle_event(store, event),
        }
    }
}
