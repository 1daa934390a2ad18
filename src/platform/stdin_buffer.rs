//! Splits raw stdin reads into complete key sequences and bracketed pastes.
//!
//! A read may end in the middle of an escape sequence; the tail is held until the next read
//! completes it or the flush timeout passes (a lone ESC is the escape key).

use std::time::{Duration, Instant};

const ESC: u8 = 0x1b;
const PASTE_START: &str = "\x1b[200~";
const PASTE_END: &str = "\x1b[201~";

pub const DEFAULT_FLUSH_TIMEOUT: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StdinEvent {
    /// One key sequence or printable character.
    Data(String),
    /// Text between bracketed-paste markers, markers removed.
    Paste(String),
}

impl StdinEvent {
    /// Form understood by `parse_input_events`: pastes keep their markers.
    pub fn into_wire(self) -> String {
        match self {
            StdinEvent::Data(data) => data,
            StdinEvent::Paste(text) => format!("{PASTE_START}{text}{PASTE_END}"),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Sequence {
    Complete,
    Incomplete,
}

pub struct StdinBuffer {
    pending: String,
    paste: Option<String>,
    timeout: Duration,
    flush_deadline: Option<Instant>,
}

impl Default for StdinBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_FLUSH_TIMEOUT)
    }
}

impl StdinBuffer {
    pub fn new(timeout: Duration) -> Self {
        Self {
            pending: String::new(),
            paste: None,
            timeout,
            flush_deadline: None,
        }
    }

    pub fn push(&mut self, data: &[u8], now: Instant) -> Vec<StdinEvent> {
        self.flush_deadline = None;
        // Some terminals send alt+key as a single byte with the high bit set.
        let text = if data.len() == 1 && data[0] > 127 {
            format!("\x1b{}", char::from(data[0] - 128))
        } else {
            String::from_utf8_lossy(data).into_owned()
        };
        self.pending.push_str(&text);

        let mut events = Vec::new();
        self.drain_pending(&mut events);
        if !self.pending.is_empty() && self.paste.is_none() {
            self.flush_deadline = Some(now + self.timeout);
        }
        events
    }

    /// Emit a held tail verbatim once its deadline passed.
    pub fn flush_due(&mut self, now: Instant) -> Vec<StdinEvent> {
        match self.flush_deadline {
            Some(deadline) if now >= deadline => {
                self.flush_deadline = None;
                if self.pending.is_empty() {
                    Vec::new()
                } else {
                    vec![StdinEvent::Data(std::mem::take(&mut self.pending))]
                }
            }
            _ => Vec::new(),
        }
    }

    /// How long a poll may block before [`flush_due`](Self::flush_due) has work.
    pub fn next_timeout(&self, now: Instant) -> Option<Duration> {
        self.flush_deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.paste = None;
        self.flush_deadline = None;
    }

    fn drain_pending(&mut self, events: &mut Vec<StdinEvent>) {
        loop {
            if let Some(paste) = self.paste.as_mut() {
                paste.push_str(&self.pending);
                self.pending.clear();
                let Some(end) = paste.find(PASTE_END) else {
                    return;
                };
                let rest = paste.split_off(end);
                events.push(StdinEvent::Paste(std::mem::take(paste)));
                self.paste = None;
                self.pending = rest[PASTE_END.len()..].to_string();
                continue;
            }

            if let Some(start) = self.pending.find(PASTE_START) {
                let before = self.pending[..start].to_string();
                let (sequences, remainder) = split_sequences(&before);
                events.extend(sequences.into_iter().map(StdinEvent::Data));
                if !remainder.is_empty() {
                    events.push(StdinEvent::Data(remainder));
                }
                self.pending = self.pending[start + PASTE_START.len()..].to_string();
                self.paste = Some(String::new());
                continue;
            }

            let (sequences, remainder) = split_sequences(&self.pending);
            events.extend(sequences.into_iter().map(StdinEvent::Data));
            self.pending = remainder;
            return;
        }
    }
}

/// Complete sequences in order, plus an incomplete escape tail.
fn split_sequences(buffer: &str) -> (Vec<String>, String) {
    let bytes = buffer.as_bytes();
    let mut sequences = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos] != ESC {
            let Some(ch) = buffer[pos..].chars().next() else {
                break;
            };
            sequences.push(ch.to_string());
            pos += ch.len_utf8();
            continue;
        }

        let mut end = pos + 1;
        loop {
            if end > bytes.len() {
                return (sequences, buffer[pos..].to_string());
            }
            if !buffer.is_char_boundary(end) {
                end += 1;
                continue;
            }
            match sequence_status(&buffer[pos..end]) {
                Sequence::Complete => {
                    sequences.push(buffer[pos..end].to_string());
                    pos = end;
                    break;
                }
                Sequence::Incomplete => end += 1,
            }
        }
    }

    (sequences, String::new())
}

fn sequence_status(data: &str) -> Sequence {
    let bytes = data.as_bytes();
    match bytes.get(1) {
        None => Sequence::Incomplete,
        Some(b'[') => csi_status(&bytes[2..]),
        Some(b']') => {
            if data.ends_with('\x07') || (data.len() > 2 && data.ends_with("\x1b\\")) {
                Sequence::Complete
            } else {
                Sequence::Incomplete
            }
        }
        Some(b'O') if bytes.len() < 3 => Sequence::Incomplete,
        // ESC ESC starts an alt-modified escape sequence; wait for the inner one.
        Some(&ESC) if bytes.len() > 2 => match sequence_status(&data[1..]) {
            Sequence::Complete => Sequence::Complete,
            Sequence::Incomplete => Sequence::Incomplete,
        },
        Some(&ESC) => Sequence::Incomplete,
        Some(_) => Sequence::Complete,
    }
}

fn csi_status(payload: &[u8]) -> Sequence {
    match payload.last() {
        Some(last) if (0x40..=0x7e).contains(last) => Sequence::Complete,
        _ => Sequence::Incomplete,
    }
}
