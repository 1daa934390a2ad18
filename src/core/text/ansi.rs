//! ANSI escape parsing.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnsiCodeKind {
    Csi,
    Osc,
    Ss3,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnsiCode {
    pub code: String,
    pub length: usize,
    pub kind: AnsiCodeKind,
}

/// Extract the escape sequence starting at byte `pos`, if any.
pub fn extract_ansi_code(input: &str, pos: usize) -> Option<AnsiCode> {
    let bytes = input.as_bytes();
    if pos + 1 >= bytes.len() || bytes[pos] != 0x1b {
        return None;
    }

    let (end, kind) = match bytes[pos + 1] {
        b'[' => {
            let offset = bytes[pos + 2..]
                .iter()
                .position(|b| (0x40..=0x7e).contains(b))?;
            (pos + 2 + offset + 1, AnsiCodeKind::Csi)
        }
        b']' | b'_' | b'P' => (string_terminator_end(bytes, pos + 2)?, AnsiCodeKind::Osc),
        b'O' if pos + 2 < bytes.len() => (pos + 3, AnsiCodeKind::Ss3),
        _ => return None,
    };

    Some(AnsiCode {
        code: input[pos..end].to_string(),
        length: end - pos,
        kind,
    })
}

/// String-terminated sequences end with BEL or `ESC \`.
fn string_terminator_end(bytes: &[u8], from: usize) -> Option<usize> {
    let mut idx = from;
    while idx < bytes.len() {
        if bytes[idx] == 0x07 {
            return Some(idx + 1);
        }
        if bytes[idx] == 0x1b && bytes.get(idx + 1) == Some(&b'\\') {
            return Some(idx + 2);
        }
        idx += 1;
    }
    None
}

/// Remove every escape sequence from `input`.
pub fn strip_ansi(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut idx = 0;
    while idx < input.len() {
        if let Some(code) = extract_ansi_code(input, idx) {
            idx += code.length;
            continue;
        }
        let Some(ch) = input[idx..].chars().next() else {
            break;
        };
        out.push(ch);
        idx += ch.len_utf8();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{extract_ansi_code, strip_ansi, AnsiCodeKind};

    #[test]
    fn extracts_csi_and_osc() {
        let csi = extract_ansi_code("\x1b[31mred", 0).expect("csi");
        assert_eq!(csi.code, "\x1b[31m");
        assert_eq!(csi.kind, AnsiCodeKind::Csi);

        let osc = extract_ansi_code("\x1b]8;;https://x\x07link", 0).expect("osc");
        assert_eq!(osc.length, "\x1b]8;;https://x\x07".len());
        assert!(extract_ansi_code("plain", 0).is_none());
        assert!(extract_ansi_code("\x1b[31", 0).is_none());
    }

    #[test]
    fn strip_removes_styles() {
        assert_eq!(strip_ansi("\x1b[1m\x1b[36m❯ docs\x1b[39m\x1b[22m"), "❯ docs");
    }
}
