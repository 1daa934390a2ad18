//! Free-text path prompt with tab completion against the local file system.

use std::fs;
use std::path::{Path, MAIN_SEPARATOR};

use crate::core::input_event::InputEvent;
use crate::core::keybindings::{PromptAction, PromptKeybindingsManager};
use crate::core::text::width::visible_width;
use crate::render::paginate;
use crate::runtime::{Deferred, Prompt, RenderContext, Status, Transition};
use crate::widgets::line_input::LineInput;
use crate::widgets::select::done_line;
use crate::widgets::theme::PromptTheme;
use crate::widgets::validate::{run_validator, Validation, Validator};

const INVALID_MESSAGE: &str = "You must provide a valid value";
const SUGGESTION_PAGE_SIZE: usize = 5;

/// One completion candidate: an entry name relative to the completed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub name: String,
    pub is_dir: bool,
}

impl Candidate {
    /// Text inserted after the base; directories keep a trailing separator.
    pub fn completion(&self) -> String {
        if self.is_dir {
            format!("{}{MAIN_SEPARATOR}", self.name)
        } else {
            self.name.clone()
        }
    }
}

/// Split `value` into the directory part (up to and including the last separator) and the
/// partial entry name after it.
fn split_base(value: &str) -> (&str, &str) {
    match value.rfind(MAIN_SEPARATOR) {
        Some(index) => value.split_at(index + MAIN_SEPARATOR.len_utf8()),
        None => ("", value),
    }
}

/// Entries of the directory named by `value` whose names start with its last segment.
///
/// A value ending with a separator lists that directory. Unreadable or missing directories
/// yield no candidates. Candidates are sorted by name.
pub fn complete_path(value: &str) -> Vec<Candidate> {
    let (base, prefix) = split_base(value);
    let dir = if base.is_empty() {
        Path::new(".")
    } else {
        Path::new(base)
    };
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut candidates: Vec<Candidate> = entries
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let name = entry.file_name().into_string().ok()?;
            if !name.starts_with(prefix) {
                return None;
            }
            Some(Candidate {
                is_dir: entry.path().is_dir(),
                name,
            })
        })
        .collect();
    candidates.sort_by(|a, b| a.name.cmp(&b.name));
    candidates
}

pub struct PathInputConfig {
    pub message: String,
    pub default: Option<String>,
    pub validate: Option<Validator<String>>,
    pub theme: PromptTheme,
}

impl PathInputConfig {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            default: None,
            validate: None,
            theme: PromptTheme::default(),
        }
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn validate(mut self, validate: Validator<String>) -> Self {
        self.validate = Some(validate);
        self
    }

    pub fn theme(mut self, theme: PromptTheme) -> Self {
        self.theme = theme;
        self
    }
}

pub struct ValidatedAnswer {
    answer: String,
    validation: Validation,
}

impl ValidatedAnswer {
    pub(crate) fn check(
        validate: &Option<Validator<String>>,
        answer: String,
    ) -> Transition<String, Self> {
        match validate {
            None => Transition::Done(answer),
            Some(validate) => {
                let validate = validate.clone();
                Transition::Await(Deferred::spawn(move || {
                    let validation = run_validator(&validate, &answer);
                    ValidatedAnswer { answer, validation }
                }))
            }
        }
    }

    /// `Ok(answer)` when valid, otherwise the error text.
    pub(crate) fn into_result(self, fallback: &str) -> Result<String, String> {
        match self.validation.error_message(fallback) {
            None => Ok(self.answer),
            Some(message) => Err(message),
        }
    }
}

pub struct PathInputPrompt {
    message: String,
    input: LineInput,
    default: Option<String>,
    suggestions: Vec<Candidate>,
    active_suggestion: usize,
    base: String,
    validate: Option<Validator<String>>,
    error: Option<String>,
    answer: Option<String>,
    theme: PromptTheme,
}

impl PathInputPrompt {
    pub fn new(config: PathInputConfig) -> Self {
        Self {
            message: config.message,
            input: LineInput::new(),
            default: config.default,
            suggestions: Vec::new(),
            active_suggestion: 0,
            base: String::new(),
            validate: config.validate,
            error: None,
            answer: None,
            theme: config.theme,
        }
    }

    pub fn value(&self) -> &str {
        self.input.value()
    }

    pub fn suggestions(&self) -> &[Candidate] {
        &self.suggestions
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn complete(&mut self, backward: bool) {
        if self.input.is_empty() {
            if let Some(default) = &self.default {
                self.input.set_value(default.clone());
            }
            return;
        }

        if self.suggestions.is_empty() {
            let candidates = complete_path(self.input.value());
            if candidates.is_empty() {
                return;
            }
            self.base = split_base(self.input.value()).0.to_string();
            self.suggestions = candidates;
            self.active_suggestion = 0;
        } else {
            let len = self.suggestions.len();
            self.active_suggestion = if backward {
                (self.active_suggestion + len - 1) % len
            } else {
                (self.active_suggestion + 1) % len
            };
        }

        let completion = self.suggestions[self.active_suggestion].completion();
        self.input.set_value(format!("{}{completion}", self.base));
    }

    fn submit(&mut self) -> Transition<String, ValidatedAnswer> {
        if !self.suggestions.is_empty() {
            self.suggestions.clear();
            return Transition::Continue;
        }
        let answer = if self.input.is_empty() {
            self.default.clone().unwrap_or_default()
        } else {
            self.input.value().to_string()
        };
        ValidatedAnswer::check(&self.validate, answer)
    }
}

impl Prompt for PathInputPrompt {
    type Output = String;
    type Task = ValidatedAnswer;

    fn name(&self) -> &'static str {
        "path input"
    }

    fn handle_input(
        &mut self,
        event: &InputEvent,
        keys: &PromptKeybindingsManager,
    ) -> Transition<String, ValidatedAnswer> {
        let raw = event.raw();
        if keys.matches(raw, PromptAction::Confirm) {
            return self.submit();
        }
        if keys.matches(raw, PromptAction::CompleteBackward) {
            self.complete(true);
        } else if keys.matches(raw, PromptAction::Complete) {
            self.complete(false);
        } else {
            self.default = None;
            self.suggestions.clear();
            self.error = None;
            self.input.handle(event, keys);
        }
        Transition::Continue
    }

    fn settle(&mut self, task: ValidatedAnswer) -> Transition<String, ValidatedAnswer> {
        match task.into_result(INVALID_MESSAGE) {
            Ok(answer) => {
                self.answer = Some(answer.clone());
                Transition::Done(answer)
            }
            Err(message) => {
                tracing::debug!(prompt = "path input", error = %message, "validation failed");
                self.error = Some(message);
                Transition::Continue
            }
        }
    }

    fn render(&self, ctx: &RenderContext) -> Vec<String> {
        let theme = &self.theme;
        if ctx.status == Status::Done {
            let answer = self.answer.as_deref().unwrap_or_default();
            return vec![done_line(theme, &self.message, answer)];
        }

        let mut line = match ctx.status {
            Status::Loading => format!("{} {}", ctx.spinner, (theme.message)(&self.message)),
            _ => theme.heading(&self.message, false),
        };
        if let Some(default) = self.default.as_deref().filter(|_| self.input.is_empty()) {
            line.push(' ');
            line.push_str(&(theme.help)(&format!("({default})")));
        }
        line.push(' ');
        let available = ctx.width.saturating_sub(visible_width(&line));
        line.push_str(&self.input.render(available));

        let mut lines = vec![line];
        let window = paginate(
            self.suggestions.len(),
            self.active_suggestion,
            SUGGESTION_PAGE_SIZE,
            true,
        );
        for (row, &index) in window.rows.iter().enumerate() {
            let text = self.suggestions[index].completion();
            if row == window.active_row {
                lines.push((theme.highlight)(&text));
            } else {
                lines.push(text);
            }
        }
        if let Some(error) = &self.error {
            lines.push(theme.error_line(error));
        }
        lines
    }
}
