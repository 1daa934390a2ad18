//! Editable single-line buffer used by the text and path prompts.

use crate::core::input_event::InputEvent;
use crate::core::keybindings::{PromptAction, PromptKeybindingsManager};
use crate::core::text::utils::{grapheme_segments, is_punctuation_char, is_whitespace_char};
use crate::core::text::width::visible_width;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineInput {
    value: String,
    /// Byte offset, always on a char boundary.
    cursor: usize,
}

impl LineInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Replace the buffer and park the cursor at its end.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.value.len();
    }

    /// Apply an editing event. Returns `false` when the event is not an editing key.
    pub fn handle(&mut self, event: &InputEvent, keys: &PromptKeybindingsManager) -> bool {
        let raw = match event {
            InputEvent::Text { text, .. } => {
                self.insert_text(text);
                return true;
            }
            InputEvent::Paste { text, .. } => {
                self.insert_text(&text.replace(['\r', '\n'], ""));
                return true;
            }
            InputEvent::Key { raw, .. } => raw.as_str(),
            InputEvent::UnknownRaw { .. } => return false,
        };

        if keys.matches(raw, PromptAction::DeleteCharBackward) {
            if self.cursor > 0 {
                let start = self.cursor - self.grapheme_before_cursor();
                self.value.replace_range(start..self.cursor, "");
                self.cursor = start;
            }
        } else if keys.matches(raw, PromptAction::DeleteCharForward) {
            if self.cursor < self.value.len() {
                let end = self.cursor + self.grapheme_after_cursor();
                self.value.replace_range(self.cursor..end, "");
            }
        } else if keys.matches(raw, PromptAction::DeleteWordBackward) {
            self.delete_word_backwards();
        } else if keys.matches(raw, PromptAction::DeleteToLineStart) {
            self.value.replace_range(..self.cursor, "");
            self.cursor = 0;
        } else if keys.matches(raw, PromptAction::CursorLeft) {
            self.cursor -= self.grapheme_before_cursor();
        } else if keys.matches(raw, PromptAction::CursorRight) {
            self.cursor += self.grapheme_after_cursor();
        } else if keys.matches(raw, PromptAction::CursorLineStart) {
            self.cursor = 0;
        } else if keys.matches(raw, PromptAction::CursorLineEnd) {
            self.cursor = self.value.len();
        } else {
            return false;
        }
        true
    }

    fn insert_text(&mut self, text: &str) {
        self.value.insert_str(self.cursor, text);
        self.cursor += text.len();
    }

    fn grapheme_before_cursor(&self) -> usize {
        grapheme_segments(&self.value[..self.cursor])
            .next_back()
            .map_or(0, str::len)
    }

    fn grapheme_after_cursor(&self) -> usize {
        grapheme_segments(&self.value[self.cursor..])
            .next()
            .map_or(0, str::len)
    }

    fn is_whitespace_segment(segment: &str) -> bool {
        segment.chars().any(is_whitespace_char)
    }

    fn is_punctuation_segment(segment: &str) -> bool {
        segment.chars().any(is_punctuation_char)
    }

    /// Delete trailing whitespace, then one run of punctuation or of word characters.
    fn delete_word_backwards(&mut self) {
        let end = self.cursor;
        let mut graphemes: Vec<&str> = grapheme_segments(&self.value[..end]).collect();
        let mut start = end;

        while let Some(last) = graphemes.last() {
            if !Self::is_whitespace_segment(last) {
                break;
            }
            start -= last.len();
            graphemes.pop();
        }

        let punctuation_run = graphemes
            .last()
            .is_some_and(|last| Self::is_punctuation_segment(last));
        while let Some(last) = graphemes.last() {
            let same_class = if punctuation_run {
                Self::is_punctuation_segment(last)
            } else {
                !Self::is_whitespace_segment(last) && !Self::is_punctuation_segment(last)
            };
            if !same_class {
                break;
            }
            start -= last.len();
            graphemes.pop();
        }

        self.value.replace_range(start..end, "");
        self.cursor = start;
    }

    /// The buffer scrolled to keep the cursor in view, with the cursor cell in reverse video.
    pub fn render(&self, available_width: usize) -> String {
        if available_width == 0 {
            return String::new();
        }

        let (visible, cursor) = if visible_width(&self.value) < available_width {
            (self.value.as_str(), self.cursor)
        } else {
            let scroll_width = if self.cursor == self.value.len() {
                available_width.saturating_sub(1)
            } else {
                available_width
            };
            let half = scroll_width / 2;
            let start = if self.cursor < half {
                0
            } else if self.cursor > self.value.len().saturating_sub(half) {
                self.value.len().saturating_sub(scroll_width)
            } else {
                self.cursor - half
            };
            let start = ceil_char_boundary(&self.value, start);
            let end = floor_char_boundary(&self.value, (start + scroll_width).min(self.value.len()))
                .max(self.cursor.min(self.value.len()));
            (&self.value[start..end], self.cursor - start)
        };

        let before = &visible[..cursor];
        let after = &visible[cursor..];
        let mut rest = grapheme_segments(after);
        let at_cursor = rest.next().unwrap_or(" ");
        let tail = &after[at_cursor.len().min(after.len())..];
        format!("{before}\x1b[7m{at_cursor}\x1b[27m{tail}")
    }
}

fn ceil_char_boundary(value: &str, mut index: usize) -> usize {
    while index < value.len() && !value.is_char_boundary(index) {
        index += 1;
    }
    index
}

fn floor_char_boundary(value: &str, mut index: usize) -> usize {
    while index > 0 && !value.is_char_boundary(index) {
        index -= 1;
    }
    index
}
