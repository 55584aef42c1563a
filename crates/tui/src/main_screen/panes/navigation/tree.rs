use coursebook_catalog::{Course, CourseFilter, Element, Profile};
use log::error;
use ratatui::{
    style::{Modifier, Style, Stylize},
    text::{Line, Span},
};
use tui_tree_widget::TreeItem;

use crate::{
    main_screen::CatalogStore,
    styles::{completion_mark, element_icon, part_badge},
};

/// Identifies a specific item in the tree. Used for selection, etc.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum TreeId {
    #[default]
    Overview,
    Course(String),
    /// Course ID, then element ID
    Element(String, String),
    /// Placeholder for when there's nothing to show
    Empty,
}

/// Compile the courses matching `filter` into something [`tui_tree_widget`] can render.
pub fn build(store: &CatalogStore, filter: &CourseFilter) -> Vec<TreeItem<'static, TreeId>> {
    let mut items = vec![TreeItem::new_leaf(TreeId::Overview, overview_line(store))];

    let courses = store.filtered(filter);
    if courses.is_empty() {
        let msg = if filter.is_empty() {
            "No courses yet, press a to add one"
        } else {
            "No matching courses"
        };
        items.push(TreeItem::new_leaf(TreeId::Empty, Line::from(msg.dark_gray())));
    }

    items.extend(
        courses
            .into_iter()
            .map(|course| course_item(store.profile(), course)),
    );

    items
}

fn overview_line(store: &CatalogStore) -> Line<'static> {
    let progress = store.progress();
    let mut spans = vec![
        Span::styled("Overview", Style::new().add_modifier(Modifier::BOLD)),
        format!(" {}/{}", progress.completed, progress.total).gray(),
    ];
    if store.settings().is_locked {
        spans.push(" [locked]".red());
    }

    Line::from(spans)
}

fn course_item(profile: &Profile, course: &Course) -> TreeItem<'static, TreeId> {
    let progress = course.progress();
    let text = Line::from(vec![
        Span::raw(course.title.clone()),
        " ".into(),
        part_badge(profile, &course.part),
        format!(" {}/{}", progress.completed, progress.total).gray(),
    ]);
    let children = course
        .elements
        .iter()
        .map(|element| element_item(profile, course, element))
        .collect();

    // only fails on duplicate element IDs
    TreeItem::new(TreeId::Course(course.id.clone()), text.clone(), children).unwrap_or_else(|e| {
        error!("error building tree for course {}: {}", course.id, e);
        TreeItem::new_leaf(TreeId::Course(course.id.clone()), text)
    })
}

fn element_item(profile: &Profile, course: &Course, element: &Element) -> TreeItem<'static, TreeId> {
    TreeItem::new_leaf(
        TreeId::Element(course.id.clone(), element.id.clone()),
        Line::from(vec![
            completion_mark(element.completed),
            element_icon(profile, &element.kind),
            Span::raw(element.name.clone()),
        ]),
    )
}
