use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    prelude::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// A single line of editable text
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    value: String,
    /// Cursor position, in chars
    cursor: usize,
}

impl TextInput {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let cursor = value.chars().count();
        Self { value, cursor }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    fn byte_idx(&self, char_idx: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    /// Apply a key press. Returns false if the key isn't an editing key.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => self.clear(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                let idx = self.byte_idx(self.cursor);
                self.value.insert(idx, c);
                self.cursor += 1;
            }
            KeyCode::Backspace if self.cursor > 0 => {
                self.cursor -= 1;
                let idx = self.byte_idx(self.cursor);
                self.value.remove(idx);
            }
            KeyCode::Backspace => (),
            KeyCode::Delete if self.cursor < self.value.chars().count() => {
                let idx = self.byte_idx(self.cursor);
                self.value.remove(idx);
            }
            KeyCode::Delete => (),
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.value.chars().count()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.value.chars().count(),
            _ => return false,
        };

        true
    }

    /// Draw as `label: value`, placing the terminal cursor if focused.
    pub fn render_to(&self, frame: &mut Frame, area: Rect, label: &str, focused: bool) {
        let label_style = if focused {
            Style::new().fg(Color::Blue)
        } else {
            Style::new().fg(Color::Gray)
        };
        let prefix = format!("{}: ", label);
        let prefix_width = prefix.chars().count() as u16;

        // scroll long values so the cursor stays visible
        let available = area.width.saturating_sub(prefix_width + 1) as usize;
        let skip = self.cursor.saturating_sub(available);
        let visible: String = self.value.chars().skip(skip).collect();

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(prefix, label_style),
                Span::raw(visible),
            ])),
            area,
        );

        if focused {
            frame.set_cursor(
                area.x + prefix_width + (self.cursor - skip) as u16,
                area.y,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_editing() {
        let mut input = TextInput::new("héllo");
        input.handle_key(key(KeyCode::Left));
        input.handle_key(key(KeyCode::Backspace));
        input.handle_key(key(KeyCode::Char('L')));
        assert_eq!(input.value(), "hélLo");

        input.handle_key(key(KeyCode::Home));
        input.handle_key(key(KeyCode::Delete));
        assert_eq!(input.value(), "élLo");

        assert!(!input.handle_key(key(KeyCode::Enter)));
        input.handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert_eq!(input.value(), "");
    }
}
