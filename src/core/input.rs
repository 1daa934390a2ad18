//! Key parsing for legacy (VT100/xterm) terminal input.
//!
//! Key ids are strings such as `"up"`, `"enter"`, `"shift+tab"`, `"ctrl+c"`, `"alt+b"` or a
//! single printable character (`"a"`, `"1"`). Modifiers are always ordered `ctrl+alt+shift+key`
//! after normalization, so bindings can be written in any order.

const MODIFIER_ORDER: [&str; 3] = ["ctrl", "alt", "shift"];

/// Parse one complete input sequence into a normalized key id.
pub fn parse_key(data: &str) -> Option<String> {
    if let Some(key_id) = named_sequence_key_id(data) {
        return Some(key_id.to_string());
    }
    if let Some(key_id) = modified_csi_key_id(data) {
        return Some(key_id);
    }

    let mut chars = data.chars();
    let first = chars.next()?;
    let second = chars.next();

    match (first, second) {
        ('\x1b', Some(ch)) if chars.next().is_none() => {
            let code = ch as u32;
            if (1..=26).contains(&code) {
                let letter = char::from_u32(code + 96)?;
                return Some(format!("ctrl+alt+{letter}"));
            }
            if ch.is_ascii_graphic() {
                return Some(format!("alt+{}", ch.to_ascii_lowercase()));
            }
            None
        }
        (ch, None) => {
            let code = ch as u32;
            if (1..=26).contains(&code) {
                let letter = char::from_u32(code + 96)?;
                return Some(format!("ctrl+{letter}"));
            }
            if ch.is_control() {
                return None;
            }
            Some(ch.to_string())
        }
        _ => None,
    }
}

/// Returns the inserted text for printable input, or `None` for control sequences.
pub fn parse_text(data: &str) -> Option<String> {
    if data.is_empty() || data.chars().any(|ch| ch.is_control()) {
        return None;
    }
    Some(data.to_string())
}

/// Returns whether `data` is the key described by `key_id`.
pub fn matches_key(data: &str, key_id: &str) -> bool {
    let Some(expected) = normalize_key_id(key_id) else {
        return false;
    };
    parse_key(data).is_some_and(|parsed| parsed == expected)
}

/// Canonical form of a user-written key id (`"Shift+Ctrl+Up"` -> `"ctrl+shift+up"`).
pub fn normalize_key_id(key_id: &str) -> Option<String> {
    let parts: Vec<&str> = key_id.split('+').collect();
    let (key, modifiers) = match parts.split_last() {
        Some((key, modifiers)) if !key.is_empty() => (*key, modifiers),
        // `ctrl++` style ids end with an empty segment for the literal plus key.
        Some((_, modifiers)) if key_id.ends_with("++") => ("+", &modifiers[..modifiers.len() - 1]),
        _ => return None,
    };

    let lowered: Vec<String> = modifiers.iter().map(|part| part.to_lowercase()).collect();
    if lowered
        .iter()
        .any(|part| !MODIFIER_ORDER.contains(&part.as_str()))
    {
        return None;
    }

    let key = canonical_key_name(key);
    let mut normalized = String::new();
    for modifier in MODIFIER_ORDER {
        if lowered.iter().any(|part| part == modifier) {
            normalized.push_str(modifier);
            normalized.push('+');
        }
    }
    normalized.push_str(&key);
    Some(normalized)
}

fn canonical_key_name(key: &str) -> String {
    let lowered = key.to_lowercase();
    match lowered.as_str() {
        "esc" => "escape".to_string(),
        "return" => "enter".to_string(),
        "pageup" => "pageUp".to_string(),
        "pagedown" => "pageDown".to_string(),
        " " => "space".to_string(),
        _ if key.chars().count() == 1 => key.to_string(),
        _ => lowered,
    }
}

fn named_sequence_key_id(data: &str) -> Option<&'static str> {
    match data {
        "\x1b" => Some("escape"),
        "\x1b\x1b" => Some("alt+escape"),
        "\t" => Some("tab"),
        "\x1b[Z" => Some("shift+tab"),
        "\r" | "\n" | "\x1bOM" => Some("enter"),
        "\x1b\r" => Some("alt+enter"),
        " " => Some("space"),
        "\x00" => Some("ctrl+space"),
        "\x7f" | "\x08" => Some("backspace"),
        "\x1b\x7f" | "\x1b\x08" => Some("alt+backspace"),
        "\x1b[A" | "\x1bOA" => Some("up"),
        "\x1b[B" | "\x1bOB" => Some("down"),
        "\x1b[C" | "\x1bOC" => Some("right"),
        "\x1b[D" | "\x1bOD" => Some("left"),
        "\x1b[H" | "\x1bOH" | "\x1b[1~" | "\x1b[7~" => Some("home"),
        "\x1b[F" | "\x1bOF" | "\x1b[4~" | "\x1b[8~" => Some("end"),
        "\x1b[2~" => Some("insert"),
        "\x1b[3~" => Some("delete"),
        "\x1b[5~" | "\x1b[[5~" => Some("pageUp"),
        "\x1b[6~" | "\x1b[[6~" => Some("pageDown"),
        "\x1b[a" => Some("shift+up"),
        "\x1b[b" => Some("shift+down"),
        "\x1b[c" => Some("shift+right"),
        "\x1b[d" => Some("shift+left"),
        "\x1bOa" => Some("ctrl+up"),
        "\x1bOb" => Some("ctrl+down"),
        "\x1bOc" => Some("ctrl+right"),
        "\x1bOd" => Some("ctrl+left"),
        "\x1bb" | "\x1bB" => Some("alt+left"),
        "\x1bf" | "\x1bF" => Some("alt+right"),
        "\x1c" => Some("ctrl+\\"),
        "\x1d" => Some("ctrl+]"),
        "\x1f" => Some("ctrl+-"),
        _ => None,
    }
}

/// `CSI 1 ; <mod> <letter>` and `CSI <n> ; <mod> ~` sequences emitted for modified keys.
fn modified_csi_key_id(data: &str) -> Option<String> {
    let body = data.strip_prefix("\x1b[")?;
    let final_char = body.chars().last()?;
    let params = &body[..body.len() - final_char.len_utf8()];
    let (code, modifier) = params.split_once(';')?;
    let modifier: u8 = modifier.parse().ok()?;
    let bits = modifier.checked_sub(1)?;

    let key = match (final_char, code) {
        ('A', "1") => "up",
        ('B', "1") => "down",
        ('C', "1") => "right",
        ('D', "1") => "left",
        ('H', "1") => "home",
        ('F', "1") => "end",
        ('~', "3") => "delete",
        ('~', "5") => "pageUp",
        ('~', "6") => "pageDown",
        _ => return None,
    };

    let mut id = String::new();
    if bits & 4 != 0 {
        id.push_str("ctrl+");
    }
    if bits & 2 != 0 {
        id.push_str("alt+");
    }
    if bits & 1 != 0 {
        id.push_str("shift+");
    }
    id.push_str(key);
    Some(id)
}

/// Digit keys `1`..=`9` map to zero-based list indices.
pub fn digit_index(data: &str) -> Option<usize> {
    let mut chars = data.chars();
    let ch = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    match ch.to_digit(10) {
        Some(digit @ 1..=9) => Some(digit as usize - 1),
        _ => None,
    }
}
