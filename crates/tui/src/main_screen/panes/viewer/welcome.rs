use ratatui::{
    prelude::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::Line,
    widgets::{Gauge, Paragraph, Wrap},
    Frame,
};

use crate::{
    event::Event,
    main_screen::{panes::Pane, Action, CatalogStore},
    styles::color,
};

#[derive(Debug, Default)]
pub struct WelcomeViewer {}

impl Pane for WelcomeViewer {
    fn draw(&mut self, store: &CatalogStore, frame: &mut Frame, area: Rect) {
        let summary = summary(store);
        let layout = Layout::new(
            Direction::Vertical,
            [
                Constraint::Length(summary.len() as u16),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
            ],
        )
        .split(area);

        frame.render_widget(
            Paragraph::new(summary).wrap(Wrap { trim: false }),
            layout[0],
        );

        let progress = store.progress();
        frame.render_widget(
            Gauge::default()
                .gauge_style(Style::new().fg(color(&store.profile().brand_color)))
                .ratio(progress.ratio())
                .label(format!(
                    "{}% ({}/{} elements)",
                    progress.percent(),
                    progress.completed,
                    progress.total
                )),
            layout[1],
        );

        frame.render_widget(key_help().wrap(Wrap { trim: false }), layout[3]);
    }

    fn handle_event(&mut self, _: &mut CatalogStore, _: Event) -> Action {
        Action::None
    }
}

fn summary(store: &CatalogStore) -> Vec<Line<'static>> {
    let profile = store.profile();
    let settings = store.settings();
    let ects: f64 = store.courses().iter().map(|c| c.ects).sum();

    let mut lines = vec![
        Line::styled(
            profile.name.clone(),
            Style::new()
                .fg(color(&profile.brand_color))
                .add_modifier(Modifier::BOLD),
        ),
        Line::from(profile.description.clone().gray()),
        Line::from(vec![
            "School year ".gray(),
            settings.school_year.clone().into(),
        ]),
    ];
    if !settings.school_description.is_empty() {
        lines.push(Line::raw(settings.school_description.clone()));
    }
    lines.push(Line::from(vec![
        format!("{}", store.courses().len()).blue(),
        " courses, ".into(),
        format!("{}", ects).blue(),
        " ECTS".into(),
    ]));
    if settings.is_locked {
        lines.push(Line::styled(
            "Locked: courses can't be added, changed or removed. Press L to unlock.",
            Style::new().fg(Color::Red),
        ));
    }
    if settings.header_image.is_some() {
        lines.push(Line::from("Header image set".dark_gray()));
    }

    lines
}

fn key_help() -> Paragraph<'static> {
    Paragraph::new(vec![
        vec![
            "Use ".into(),
            "j/k or ↓/↑".blue(),
            " to navigate up and down, then ".into(),
            "Enter".blue(),
            " to view an item. ".into(),
            "Space".blue(),
            " marks an element done, or expands a course.".into(),
        ]
        .into(),
        vec![
            "Search with ".into(),
            "/".blue(),
            ", and filter by track and part with ".into(),
            "t".blue(),
            " and ".into(),
            "p".blue(),
            ".".into(),
        ]
        .into(),
        vec![
            "a".blue(),
            " adds a course, ".into(),
            "i".blue(),
            " imports from a file, ".into(),
            "x".blue(),
            " exports a backup, ".into(),
            "s".blue(),
            " opens settings and ".into(),
            "L".blue(),
            " locks the catalog.".into(),
        ]
        .into(),
        vec![
            "In a course, ".into(),
            "e".blue(),
            " edits it, ".into(),
            "n".blue(),
            " adds an element and ".into(),
            "d".blue(),
            " deletes. Open an element's links with ".into(),
            "o".blue(),
            ".".into(),
        ]
        .into(),
        vec![
            "Go back with ".into(),
            "q".blue(),
            ", switch institution with ".into(),
            "b".blue(),
            ", and use ".into(),
            "Ctrl-C".blue(),
            " to quit.".into(),
        ]
        .into(),
    ])
}
