use sniffle::{DisplayBuffer, InterfaceInfo};

use crate::ui::filter::{bpf_filter_suggestions, FilterStatus};

#[derive(Debug, Clone)]
pub enum UiMode {
    Capture,
    HelpOverlay,
    DeviceMenu {
        options: Vec<InterfaceInfo>,
        selected: usize,
    },
    FilterMenu(FilterEditor),
}

/// Which pane the arrow keys move in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Packets,
    Layers,
}

#[derive(Debug)]
pub struct UiState {
    pub mode: UiMode,
    pub focus: Focus,
    /// Sequence number of the selected packet; ignored while following.
    pub selected: Option<u64>,
    /// Keep the newest packet selected as packets arrive.
    pub follow: bool,
    /// Index of the selected layer within the selected packet.
    pub layer: usize,
    pub error_msg: Option<String>,
    pub info_msg: Option<String>,
}

impl Default for UiState {
    fn default() -> Self {
        Self::new()
    }
}

impl UiState {
    pub fn new() -> Self {
        UiState {
            mode: UiMode::Capture,
            focus: Focus::Packets,
            selected: None,
            follow: true,
            layer: 0,
            error_msg: None,
            info_msg: None,
        }
    }

    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.error_msg = Some(msg.into());
    }

    pub fn clear_error(&mut self) {
        self.error_msg = None;
    }

    pub fn set_info(&mut self, msg: impl Into<String>) {
        self.info_msg = Some(msg.into());
        self.error_msg = None;
    }

    /// Row index of the selected packet. A selection that has been evicted
    /// falls back to the oldest row.
    pub fn selected_index(&self, buffer: &DisplayBuffer) -> Option<usize> {
        if buffer.is_empty() {
            return None;
        }
        if self.follow {
            return Some(buffer.len() - 1);
        }
        match self.selected {
            Some(sequence) => buffer.position(sequence).or(Some(0)),
            None => Some(0),
        }
    }

    /// Moves the packet selection by `delta` rows. Landing on the newest row
    /// does not re-enable following; `follow_latest` does.
    pub fn move_selection(&mut self, buffer: &DisplayBuffer, delta: isize) {
        let Some(current) = self.selected_index(buffer) else {
            return;
        };
        let target = current.saturating_add_signed(delta).min(buffer.len() - 1);

        self.follow = false;
        self.selected = buffer.row(target).map(|packet| packet.sequence());
        self.layer = 0;
    }

    pub fn select_first(&mut self, buffer: &DisplayBuffer) {
        self.follow = false;
        self.selected = buffer.row(0).map(|packet| packet.sequence());
        self.layer = 0;
    }

    pub fn follow_latest(&mut self) {
        self.follow = true;
        self.selected = None;
        self.layer = 0;
    }

    pub fn move_layer(&mut self, layer_count: usize, delta: isize) {
        if layer_count == 0 {
            self.layer = 0;
            return;
        }
        self.layer = self.layer.saturating_add_signed(delta).min(layer_count - 1);
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Packets => Focus::Layers,
            Focus::Layers => Focus::Packets,
        };
    }
}

/// Line editor for the BPF filter, revalidated on every edit.
#[derive(Debug, Clone)]
pub struct FilterEditor {
    pub input: String,
    /// Cursor position in characters.
    pub cursor_pos: usize,
    pub status: FilterStatus,
    pub options: Vec<(&'static str, &'static str)>,
    /// Highlighted suggestion, once the user has browsed them.
    pub selected: Option<usize>,
}

impl FilterEditor {
    pub fn new(current: &str, loopback: bool) -> Self {
        FilterEditor {
            input: current.to_string(),
            cursor_pos: current.chars().count(),
            status: FilterStatus::check(current),
            options: bpf_filter_suggestions(loopback),
            selected: None,
        }
    }

    pub fn insert(&mut self, c: char) {
        let at = self.byte_offset(self.cursor_pos);
        self.input.insert(at, c);
        self.cursor_pos += 1;
        self.revalidate();
    }

    pub fn backspace(&mut self) {
        if self.cursor_pos == 0 {
            return;
        }
        self.cursor_pos -= 1;
        let at = self.byte_offset(self.cursor_pos);
        self.input.remove(at);
        self.revalidate();
    }

    pub fn delete(&mut self) {
        if self.cursor_pos >= self.input.chars().count() {
            return;
        }
        let at = self.byte_offset(self.cursor_pos);
        self.input.remove(at);
        self.revalidate();
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.input.chars().count();
        self.cursor_pos = self.cursor_pos.saturating_add_signed(delta).min(len);
    }

    pub fn cursor_home(&mut self) {
        self.cursor_pos = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor_pos = self.input.chars().count();
    }

    /// Steps through the suggestions, replacing the input with each one.
    pub fn cycle_suggestion(&mut self, delta: isize) {
        if self.options.is_empty() {
            return;
        }
        let last = self.options.len() - 1;
        let next = match self.selected {
            None if delta < 0 => last,
            None => 0,
            Some(current) => current.saturating_add_signed(delta).min(last),
        };

        self.selected = Some(next);
        self.input = self.options[next].1.to_string();
        self.cursor_end();
        self.revalidate();
    }

    fn revalidate(&mut self) {
        self.status = FilterStatus::check(&self.input);
    }

    fn byte_offset(&self, chars: usize) -> usize {
        self.input
            .char_indices()
            .nth(chars)
            .map_or(self.input.len(), |(offset, _)| offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sniffle::CapturedPacket;
    use std::time::SystemTime;

    fn buffer(sequences: impl IntoIterator<Item = u64>) -> DisplayBuffer {
        let mut buffer = DisplayBuffer::new();
        for sequence in sequences {
            buffer.insert(CapturedPacket::from_raw(vec![0; 14], SystemTime::UNIX_EPOCH, sequence));
        }
        buffer
    }

    #[test]
    fn test_follow_selects_newest() {
        let state = UiState::new();
        assert_eq!(state.selected_index(&buffer([])), None);
        assert_eq!(state.selected_index(&buffer(1..=5)), Some(4));
    }

    #[test]
    fn test_move_selection_stops_following() {
        let buffer = buffer(1..=5);
        let mut state = UiState::new();

        state.move_selection(&buffer, -2);
        assert!(!state.follow);
        assert_eq!(state.selected, Some(3));

        state.move_selection(&buffer, -10);
        assert_eq!(state.selected, Some(1));
        state.move_selection(&buffer, 100);
        assert_eq!(state.selected, Some(5));
        assert!(!state.follow);

        state.follow_latest();
        assert_eq!(state.selected_index(&buffer), Some(4));
    }

    #[test]
    fn test_evicted_selection_falls_back() {
        let mut state = UiState::new();
        state.follow = false;
        state.selected = Some(2);
        assert_eq!(state.selected_index(&buffer(10..=12)), Some(0));
    }

    #[test]
    fn test_move_layer_clamps() {
        let mut state = UiState::new();
        state.move_layer(3, 5);
        assert_eq!(state.layer, 2);
        state.move_layer(3, -1);
        assert_eq!(state.layer, 1);
        state.move_layer(0, 1);
        assert_eq!(state.layer, 0);
    }

    #[test]
    fn test_editor_revalidates_each_edit() {
        let mut editor = FilterEditor::new("", false);
        assert!(editor.status.is_valid());

        for c in "tcp port".chars() {
            editor.insert(c);
        }
        assert!(!editor.status.is_valid());

        for c in " 80".chars() {
            editor.insert(c);
        }
        assert_eq!(editor.input, "tcp port 80");
        assert!(editor.status.is_valid());

        editor.backspace();
        editor.backspace();
        editor.backspace();
        assert_eq!(editor.input, "tcp port");
        assert!(!editor.status.is_valid());
    }

    #[test]
    fn test_editor_cursor_editing() {
        let mut editor = FilterEditor::new("tp", false);
        editor.move_cursor(-1);
        editor.insert('c');
        assert_eq!(editor.input, "tcp");

        editor.cursor_home();
        editor.delete();
        assert_eq!(editor.input, "cp");
        editor.cursor_end();
        editor.delete();
        assert_eq!(editor.input, "cp");
        assert_eq!(editor.cursor_pos, 2);
    }

    #[test]
    fn test_cycle_suggestions() {
        let mut editor = FilterEditor::new("garbage (", false);
        assert!(!editor.status.is_valid());

        editor.cycle_suggestion(1);
        assert_eq!(editor.selected, Some(0));
        assert_eq!(editor.input, "");
        editor.cycle_suggestion(1);
        assert_eq!(editor.input, "tcp");
        assert!(editor.status.is_valid());

        let mut editor = FilterEditor::new("", false);
        editor.cycle_suggestion(-1);
        assert_eq!(editor.selected, Some(editor.options.len() - 1));
    }
}
