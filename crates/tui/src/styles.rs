use std::str::FromStr;

use coursebook_catalog::Profile;
use ratatui::{
    prelude::Text,
    style::{Color, Modifier, Style},
    text::Span,
};

pub fn error_text(t: impl Into<Text<'static>>) -> Text<'static> {
    let mut t = t.into();
    t.patch_style(Style::default().fg(Color::Red));
    t
}

/// Parse a color name from a profile, falling back to the terminal default.
pub fn color(name: &str) -> Color {
    Color::from_str(name).unwrap_or(Color::Reset)
}

/// A track/part label, in the profile's color for it
pub fn badge(label: &str, color_name: &str) -> Span<'static> {
    Span::styled(
        format!("[{}]", label),
        Style::new()
            .fg(color(color_name))
            .add_modifier(Modifier::BOLD),
    )
}

pub fn track_badge(profile: &Profile, key: &str) -> Span<'static> {
    let color_name = profile.tracks.get(key).map_or("gray", |b| b.color.as_str());
    badge(profile.track_label(key), color_name)
}

pub fn part_badge(profile: &Profile, key: &str) -> Span<'static> {
    let color_name = profile.parts.get(key).map_or("gray", |b| b.color.as_str());
    badge(profile.part_label(key), color_name)
}

/// An element type's icon and name. Unknown types get a plain bullet.
pub fn element_kind(profile: &Profile, kind: &str) -> Span<'static> {
    match profile.element_types.get(kind) {
        Some(style) => Span::styled(
            format!("{} {}", style.icon, kind),
            Style::new().fg(color(&style.color)),
        ),
        None => Span::styled(format!("• {}", kind), Style::new().fg(Color::Gray)),
    }
}

/// Just the icon for an element type
pub fn element_icon(profile: &Profile, kind: &str) -> Span<'static> {
    match profile.element_types.get(kind) {
        Some(style) => Span::styled(
            format!("{} ", style.icon),
            Style::new().fg(color(&style.color)),
        ),
        None => Span::raw("• "),
    }
}

pub fn completion_mark(completed: bool) -> Span<'static> {
    if completed {
        Span::styled("[x] ", Style::new().fg(Color::Green))
    } else {
        Span::raw("[ ] ")
    }
}
