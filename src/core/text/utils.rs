//! Truncation and padding helpers.

use unicode_segmentation::UnicodeSegmentation;

use super::ansi::extract_ansi_code;
use super::width::{grapheme_width, visible_width};

const ANSI_RESET: &str = "\x1b[0m";

pub fn grapheme_segments(text: &str) -> unicode_segmentation::Graphemes<'_> {
    UnicodeSegmentation::graphemes(text, true)
}

pub fn is_whitespace_char(ch: char) -> bool {
    ch.is_whitespace()
}

pub fn is_punctuation_char(ch: char) -> bool {
    matches!(
        ch,
        '(' | ')' | '{' | '}' | '[' | ']' | '<' | '>' | '.' | ',' | ';' | ':' | '\'' | '"'
            | '!' | '?' | '+' | '-' | '=' | '*' | '/' | '\\' | '|' | '&' | '%' | '^' | '$'
            | '#' | '@' | '~' | '`'
    )
}

/// Truncate `text` to `max_width` columns, keeping escape sequences intact.
///
/// When truncation happens a reset is emitted before `ellipsis` so styles never leak.
pub fn truncate_to_width(text: &str, max_width: usize, ellipsis: &str, pad: bool) -> String {
    if max_width == 0 {
        return String::new();
    }

    let text_width = visible_width(text);
    if text_width <= max_width {
        if pad {
            return format!("{text}{}", " ".repeat(max_width - text_width));
        }
        return text.to_string();
    }

    let ellipsis_width = visible_width(ellipsis);
    let target_width = max_width.saturating_sub(ellipsis_width);
    if target_width == 0 {
        return ellipsis.chars().take(max_width).collect();
    }

    let mut truncated = String::new();
    let mut current_width = 0;
    let mut idx = 0;
    'outer: while idx < text.len() {
        if let Some(ansi) = extract_ansi_code(text, idx) {
            truncated.push_str(&ansi.code);
            idx += ansi.length;
            continue;
        }

        let run_end = next_ansi_or_end(text, idx);
        for grapheme in grapheme_segments(&text[idx..run_end]) {
            let width = grapheme_width(grapheme);
            if current_width + width > target_width {
                break 'outer;
            }
            truncated.push_str(grapheme);
            current_width += width;
        }
        idx = run_end;
    }

    let mut result = String::with_capacity(truncated.len() + ellipsis.len() + ANSI_RESET.len());
    result.push_str(&truncated);
    result.push_str(ANSI_RESET);
    result.push_str(ellipsis);

    if pad {
        let result_width = visible_width(&result);
        if result_width < max_width {
            result.push_str(&" ".repeat(max_width - result_width));
        }
    }

    result
}

/// Place `right` flush against column `width`, after `left`. Drops `right` when it does not fit.
pub fn align_right(left: &str, right: &str, width: usize) -> String {
    let used = visible_width(left) + visible_width(right);
    if right.is_empty() || used + 1 > width {
        return left.to_string();
    }
    format!("{left}{}{right}", " ".repeat(width - used))
}

fn next_ansi_or_end(input: &str, mut idx: usize) -> usize {
    while idx < input.len() {
        if extract_ansi_code(input, idx).is_some() {
            break;
        }
        match input[idx..].chars().next() {
            Some(ch) => idx += ch.len_utf8(),
            None => break,
        }
    }
    idx
}
