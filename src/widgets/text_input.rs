//! Free-text prompt (names for new folders, renames).

use crate::core::input_event::InputEvent;
use crate::core::keybindings::{PromptAction, PromptKeybindingsManager};
use crate::core::text::width::visible_width;
use crate::runtime::{Prompt, RenderContext, Status, Transition};
use crate::widgets::line_input::LineInput;
use crate::widgets::path_input::ValidatedAnswer;
use crate::widgets::select::done_line;
use crate::widgets::theme::PromptTheme;
use crate::widgets::validate::Validator;

const INVALID_MESSAGE: &str = "You must provide a valid value";

pub struct TextInputConfig {
    pub message: String,
    pub default: Option<String>,
    pub validate: Option<Validator<String>>,
    pub theme: PromptTheme,
}

impl TextInputConfig {
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

pub struct TextInputPrompt {
    config: TextInputConfig,
    input: LineInput,
    error: Option<String>,
    answer: Option<String>,
}

impl TextInputPrompt {
    pub fn new(config: TextInputConfig) -> Self {
        Self {
            config,
            input: LineInput::new(),
            error: None,
            answer: None,
        }
    }

    pub fn value(&self) -> &str {
        self.input.value()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl Prompt for TextInputPrompt {
    type Output = String;
    type Task = ValidatedAnswer;

    fn name(&self) -> &'static str {
        "input"
    }

    fn handle_input(
        &mut self,
        event: &InputEvent,
        keys: &PromptKeybindingsManager,
    ) -> Transition<String, ValidatedAnswer> {
        if keys.matches(event.raw(), PromptAction::Confirm) {
            let trimmed = self.input.value().trim();
            let answer = match (&self.config.default, trimmed.is_empty()) {
                (Some(default), true) => default.clone(),
                _ => trimmed.to_string(),
            };
            return ValidatedAnswer::check(&self.config.validate, answer);
        }
        if self.input.handle(event, keys) {
            self.error = None;
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
                tracing::debug!(prompt = "input", error = %message, "validation failed");
                self.error = Some(message);
                Transition::Continue
            }
        }
    }

    fn render(&self, ctx: &RenderContext) -> Vec<String> {
        let theme = &self.config.theme;
        if ctx.status == Status::Done {
            let answer = self.answer.as_deref().unwrap_or_default();
            return vec![done_line(theme, &self.config.message, answer)];
        }

        let mut line = match ctx.status {
            Status::Loading => format!("{} {}", ctx.spinner, (theme.message)(&self.config.message)),
            _ => theme.heading(&self.config.message, false),
        };
        if let Some(default) = &self.config.default {
            line.push(' ');
            line.push_str(&(theme.help)(&format!("({default})")));
        }
        line.push(' ');
        let available = ctx.width.saturating_sub(visible_width(&line));
        line.push_str(&self.input.render(available));

        let mut lines = vec![line];
        if let Some(error) = &self.error {
            lines.push(theme.error_line(error));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::{TextInputConfig, TextInputPrompt};
    use crate::core::input_event::parse_input_events;
    use crate::core::keybindings::PromptKeybindingsManager;
    use crate::runtime::{Prompt, RenderContext, Status, Transition};
    use crate::widgets::path_input::ValidatedAnswer;
    use crate::widgets::theme::PromptTheme;
    use crate::widgets::validate::validator;

    fn press(prompt: &mut TextInputPrompt, data: &str) -> Transition<String, ValidatedAnswer> {
        let keys = PromptKeybindingsManager::default();
        let mut last = Transition::Continue;
        for event in parse_input_events(data) {
            last = prompt.handle_input(&event, &keys);
        }
        last
    }

    #[test]
    fn enter_submits_trimmed_value() {
        let mut prompt = TextInputPrompt::new(TextInputConfig::new("Name"));
        press(&mut prompt, "\x1b[200~  Invoices  \x1b[201~");
        assert!(matches!(press(&mut prompt, "\r"), Transition::Done(value) if value == "Invoices"));
    }

    #[test]
    fn blank_value_falls_back_to_default() {
        let mut prompt =
            TextInputPrompt::new(TextInputConfig::new("Name").default_value("Untitled"));
        press(&mut prompt, " ");
        assert!(matches!(press(&mut prompt, "\r"), Transition::Done(value) if value == "Untitled"));
    }

    #[test]
    fn validation_error_is_cleared_by_editing() {
        let config = TextInputConfig::new("Name")
            .validate(validator(|name: &String| !name.is_empty()))
            .theme(PromptTheme::plain());
        let mut prompt = TextInputPrompt::new(config);
        let Transition::Await(deferred) = press(&mut prompt, "\r") else {
            panic!("validator should run");
        };
        prompt.settle(deferred.wait().expect("validator ran"));
        assert_eq!(prompt.error(), Some("You must provide a valid value"));

        let ctx = RenderContext {
            status: Status::Pending,
            width: 40,
            spinner: "",
        };
        assert_eq!(prompt.render(&ctx)[1], "> You must provide a valid value");

        press(&mut prompt, "a");
        assert_eq!(prompt.error(), None);
        assert_eq!(prompt.value(), "a");
    }
}
