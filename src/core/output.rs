//! Typed terminal output commands and a single output gate.
//!
//! Invariant: all terminal writes must flow through `OutputGate::flush(..)`.

use crate::core::terminal::Terminal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalCmd {
    /// Raw bytes/control sequences (UTF-8 string) to be written to the terminal.
    Bytes(String),
    /// Static raw bytes/control sequences (UTF-8 string) to be written to the terminal.
    BytesStatic(&'static str),

    /// Cursor visibility.
    HideCursor,
    ShowCursor,

    /// Cursor movement within the inline region.
    MoveUp(usize),
    ColumnZero,
    ClearFromCursor,

    /// Bracketed paste toggles.
    BracketedPasteEnable,
    BracketedPasteDisable,
}

impl TerminalCmd {
    pub fn bytes(data: impl Into<String>) -> Self {
        Self::Bytes(data.into())
    }
}

#[derive(Debug, Default)]
pub struct OutputGate {
    cmds: Vec<TerminalCmd>,
}

impl OutputGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cmd: TerminalCmd) {
        self.cmds.push(cmd);
    }

    pub fn extend<I>(&mut self, cmds: I)
    where
        I: IntoIterator<Item = TerminalCmd>,
    {
        self.cmds.extend(cmds);
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    /// Flush buffered commands to the terminal as one write.
    ///
    /// This is the single write gate: `Terminal::write(..)` must not be called
    /// from anywhere else.
    pub fn flush<T: Terminal>(&mut self, term: &mut T) {
        if self.cmds.is_empty() {
            return;
        }
        let mut out = String::new();
        for cmd in self.cmds.drain(..) {
            encode_cmd(&cmd, &mut out);
        }
        term.write(&out);
    }
}

fn encode_cmd(cmd: &TerminalCmd, out: &mut String) {
    match cmd {
        TerminalCmd::Bytes(data) => out.push_str(data),
        TerminalCmd::BytesStatic(data) => out.push_str(data),
        TerminalCmd::HideCursor => out.push_str("\x1b[?25l"),
        TerminalCmd::ShowCursor => out.push_str("\x1b[?25h"),
        TerminalCmd::MoveUp(0) => {}
        TerminalCmd::MoveUp(rows) => out.push_str(&format!("\x1b[{rows}A")),
        TerminalCmd::ColumnZero => out.push('\r'),
        TerminalCmd::ClearFromCursor => out.push_str("\x1b[J"),
        TerminalCmd::BracketedPasteEnable => out.push_str("\x1b[?2004h"),
        TerminalCmd::BracketedPasteDisable => out.push_str("\x1b[?2004l"),
    }
}
