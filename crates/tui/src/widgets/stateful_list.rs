use ratatui::{prelude::*, widgets::*};

/// A [`List`] that remembers its selection between draws
#[derive(Debug, Default)]
pub struct StatefulList {
    state: ListState,
    last_item_count: usize,
}

impl StatefulList {
    pub fn selected(&self) -> Option<usize> {
        self.state.selected()
    }

    pub fn next(&mut self) {
        if self.last_item_count == 0 {
            return;
        }

        let i = match self.state.selected() {
            Some(i) if i >= self.last_item_count - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.last_item_count == 0 {
            return;
        }

        let i = match self.state.selected() {
            Some(0) => self.last_item_count - 1,
            Some(i) => i - 1,
            None => 0,
        };
        self.state.select(Some(i));
    }

    /// Render the list, keeping the selection inside it if it shrank.
    pub fn render_to(&mut self, frame: &mut Frame, target: Rect, list: List) {
        self.last_item_count = list.len();
        let clamped = match self.state.selected() {
            _ if self.last_item_count == 0 => None,
            Some(i) => Some(i.min(self.last_item_count - 1)),
            None => Some(0),
        };
        self.state.select(clamped);

        frame.render_stateful_widget(list, target, &mut self.state);
    }
}
