//! Prompt styling.

use std::sync::Arc;

pub type StyleFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

fn ansi_wrap(text: &str, prefix: &str, suffix: &str) -> String {
    format!("{prefix}{text}{suffix}")
}

pub fn dim(text: &str) -> String {
    ansi_wrap(text, "\x1b[2m", "\x1b[22m")
}

pub fn bold(text: &str) -> String {
    ansi_wrap(text, "\x1b[1m", "\x1b[22m")
}

pub fn blue(text: &str) -> String {
    ansi_wrap(text, "\x1b[34m", "\x1b[39m")
}

pub fn bright_blue(text: &str) -> String {
    ansi_wrap(text, "\x1b[94m", "\x1b[39m")
}

pub fn cyan(text: &str) -> String {
    ansi_wrap(text, "\x1b[36m", "\x1b[39m")
}

pub fn green(text: &str) -> String {
    ansi_wrap(text, "\x1b[32m", "\x1b[39m")
}

pub fn red(text: &str) -> String {
    ansi_wrap(text, "\x1b[31m", "\x1b[39m")
}

pub fn bright_red(text: &str) -> String {
    ansi_wrap(text, "\x1b[91m", "\x1b[39m")
}

pub fn gray(text: &str) -> String {
    ansi_wrap(text, "\x1b[90m", "\x1b[39m")
}

fn underline_italic(text: &str) -> String {
    ansi_wrap(text, "\x1b[4m\x1b[3m", "\x1b[23m\x1b[24m")
}

fn plain(text: &str) -> String {
    text.to_string()
}

/// Glyphs and styles shared by every prompt.
#[derive(Clone)]
pub struct PromptTheme {
    /// Leading mark while the prompt is pending.
    pub prefix: String,
    /// Leading mark once the prompt resolved.
    pub done_prefix: String,
    pub cursor: String,
    pub checked_icon: String,
    pub unchecked_icon: String,
    pub style_prefix: StyleFn,
    pub style_done_prefix: StyleFn,
    pub message: StyleFn,
    pub highlight: StyleFn,
    pub disabled: StyleFn,
    pub error: StyleFn,
    pub help: StyleFn,
    pub answer: StyleFn,
    pub description: StyleFn,
    pub key: StyleFn,
    pub action_message: StyleFn,
    pub separator: StyleFn,
    pub hint: StyleFn,
    pub checked: StyleFn,
}

impl Default for PromptTheme {
    fn default() -> Self {
        Self {
            prefix: "?".to_string(),
            done_prefix: "✔".to_string(),
            cursor: "❯".to_string(),
            checked_icon: "◉".to_string(),
            unchecked_icon: "◯".to_string(),
            style_prefix: Arc::new(blue),
            style_done_prefix: Arc::new(green),
            message: Arc::new(bold),
            highlight: Arc::new(cyan),
            disabled: Arc::new(dim),
            error: Arc::new(red),
            help: Arc::new(dim),
            answer: Arc::new(cyan),
            description: Arc::new(cyan),
            key: Arc::new(bright_blue),
            action_message: Arc::new(underline_italic),
            separator: Arc::new(dim),
            hint: Arc::new(gray),
            checked: Arc::new(green),
        }
    }
}

impl PromptTheme {
    /// Same glyphs, no escape sequences.
    pub fn plain() -> Self {
        let style: StyleFn = Arc::new(plain);
        Self {
            style_prefix: style.clone(),
            style_done_prefix: style.clone(),
            message: style.clone(),
            highlight: style.clone(),
            disabled: style.clone(),
            error: style.clone(),
            help: style.clone(),
            answer: style.clone(),
            description: style.clone(),
            key: style.clone(),
            action_message: style.clone(),
            separator: style.clone(),
            hint: style.clone(),
            checked: style,
            ..Self::default()
        }
    }

    /// Default theme, or the plain one when `no_color` is set.
    pub fn for_color(no_color: bool) -> Self {
        if no_color {
            Self::plain()
        } else {
            Self::default()
        }
    }

    /// `? message` / `✔ message` depending on whether the prompt resolved.
    pub fn heading(&self, message: &str, done: bool) -> String {
        let prefix = if done {
            (self.style_done_prefix)(&self.done_prefix)
        } else {
            (self.style_prefix)(&self.prefix)
        };
        format!("{prefix} {}", (self.message)(message))
    }

    pub fn error_line(&self, message: &str) -> String {
        (self.error)(&format!("> {message}"))
    }
}

#[cfg(test)]
mod tests {
    use super::PromptTheme;

    #[test]
    fn plain_theme_has_no_escapes() {
        let theme = PromptTheme::plain();
        assert_eq!(theme.heading("Pick one", false), "? Pick one");
        assert_eq!(theme.heading("Pick one", true), "✔ Pick one");
        assert_eq!(theme.error_line("bad"), "> bad");
    }

    #[test]
    fn default_theme_styles_message() {
        let theme = PromptTheme::default();
        assert_eq!(
            theme.heading("Pick", false),
            "\x1b[34m?\x1b[39m \x1b[1mPick\x1b[22m"
        );
    }
}
