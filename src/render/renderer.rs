//! Inline frame renderer.
//!
//! A prompt owns a block of lines starting at the row where it was invoked. Each render moves
//! back to the first row of the previous frame, clears to the end of the screen, and writes the
//! new frame. Nothing above the block is ever touched.

use crate::core::output::TerminalCmd;
use crate::core::text::utils::truncate_to_width;
use crate::core::text::width::visible_width;

const SEGMENT_RESET: &str = "\x1b[0m";
const SYNC_START: &str = "\x1b[?2026h";
const SYNC_END: &str = "\x1b[?2026l";

#[derive(Debug, Default)]
pub struct InlineRenderer {
    previous_lines: Vec<String>,
    previous_widths: Vec<usize>,
    previous_width: usize,
}

impl InlineRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn previous_lines_len(&self) -> usize {
        self.previous_lines.len()
    }

    /// Replace the previous frame with `lines`. Identical frames at the same width emit nothing.
    pub fn render(&mut self, lines: &[String], width: usize) -> Vec<TerminalCmd> {
        let width = width.max(1);
        let lines: Vec<String> = lines
            .iter()
            .map(|line| clamp_line(line, width))
            .collect();

        if width == self.previous_width && lines == self.previous_lines {
            return Vec::new();
        }

        let mut cmds = vec![TerminalCmd::BytesStatic(SYNC_START)];
        cmds.extend(self.erase_cmds(width));

        let mut buffer = String::new();
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                buffer.push_str("\r\n");
            }
            buffer.push_str(line);
            buffer.push_str(SEGMENT_RESET);
        }
        cmds.push(TerminalCmd::Bytes(buffer));
        cmds.push(TerminalCmd::BytesStatic(SYNC_END));

        self.previous_widths = lines.iter().map(|line| visible_width(line)).collect();
        self.previous_lines = lines;
        self.previous_width = width;
        cmds
    }

    /// Erase the previous frame and leave the cursor where it started.
    pub fn clear(&mut self, width: usize) -> Vec<TerminalCmd> {
        let cmds = self.erase_cmds(width.max(1));
        self.reset();
        cmds
    }

    /// Keep the previous frame on screen and move below it.
    pub fn finish(&mut self) -> Vec<TerminalCmd> {
        let had_frame = !self.previous_lines.is_empty();
        self.reset();
        if had_frame {
            vec![TerminalCmd::BytesStatic("\r\n")]
        } else {
            Vec::new()
        }
    }

    fn reset(&mut self) {
        self.previous_lines.clear();
        self.previous_widths.clear();
        self.previous_width = 0;
    }

    /// Physical rows occupied by the previous frame at `width` (lines wrap after a shrink).
    fn occupied_rows(&self, width: usize) -> usize {
        self.previous_widths
            .iter()
            .map(|line_width| line_width.div_ceil(width).max(1))
            .sum()
    }

    fn erase_cmds(&self, width: usize) -> Vec<TerminalCmd> {
        if self.previous_lines.is_empty() {
            return Vec::new();
        }
        vec![
            TerminalCmd::MoveUp(self.occupied_rows(width).saturating_sub(1)),
            TerminalCmd::ColumnZero,
            TerminalCmd::ClearFromCursor,
        ]
    }
}

fn clamp_line(line: &str, width: usize) -> String {
    if visible_width(line) > width {
        truncate_to_width(line, width, "", false)
    } else {
        line.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::InlineRenderer;
    use crate::core::output::TerminalCmd;

    fn cmds_to_bytes(cmds: Vec<TerminalCmd>) -> String {
        let mut out = String::new();
        for cmd in cmds {
            match cmd {
                TerminalCmd::Bytes(data) => out.push_str(&data),
                TerminalCmd::BytesStatic(data) => out.push_str(data),
                TerminalCmd::MoveUp(0) => {}
                TerminalCmd::MoveUp(n) => out.push_str(&format!("\x1b[{n}A")),
                TerminalCmd::ColumnZero => out.push('\r'),
                TerminalCmd::ClearFromCursor => out.push_str("\x1b[J"),
                other => panic!("unexpected command {other:?}"),
            }
        }
        out
    }

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn first_render_writes_lines_without_erasing() {
        let mut renderer = InlineRenderer::new();
        let out = cmds_to_bytes(renderer.render(&lines(&["one", "two"]), 20));
        assert_eq!(out, "\x1b[?2026hone\x1b[0m\r\ntwo\x1b[0m\x1b[?2026l");
    }

    #[test]
    fn rerender_moves_to_frame_top_and_clears() {
        let mut renderer = InlineRenderer::new();
        renderer.render(&lines(&["one", "two", "three"]), 20);
        let out = cmds_to_bytes(renderer.render(&lines(&["four"]), 20));
        assert!(out.starts_with("\x1b[?2026h\x1b[2A\r\x1b[J"));
        assert!(out.contains("four"));
    }

    #[test]
    fn identical_render_produces_no_output() {
        let mut renderer = InlineRenderer::new();
        renderer.render(&lines(&["line"]), 20);
        assert!(renderer.render(&lines(&["line"]), 20).is_empty());
    }

    #[test]
    fn long_lines_are_clamped_to_width() {
        let mut renderer = InlineRenderer::new();
        let out = cmds_to_bytes(renderer.render(&lines(&["abcdef"]), 4));
        assert!(out.contains("abcd\x1b[0m"));
        assert!(!out.contains("abcde"));
    }

    #[test]
    fn shrink_accounts_for_wrapped_rows() {
        let mut renderer = InlineRenderer::new();
        renderer.render(&lines(&["0123456789", "x"]), 10);
        // At width 5 the first line occupies two rows.
        let out = cmds_to_bytes(renderer.clear(5));
        assert_eq!(out, "\x1b[2A\r\x1b[J");
        assert_eq!(renderer.previous_lines_len(), 0);
    }

    #[test]
    fn finish_keeps_frame_and_moves_below() {
        let mut renderer = InlineRenderer::new();
        renderer.render(&lines(&["done"]), 20);
        assert_eq!(cmds_to_bytes(renderer.finish()), "\r\n");
        assert!(renderer.finish().is_empty());
    }
}
