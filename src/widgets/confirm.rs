//! Yes/no prompt.

use std::convert::Infallible;

use crate::core::input_event::InputEvent;
use crate::core::keybindings::{PromptAction, PromptKeybindingsManager};
use crate::runtime::{Prompt, RenderContext, Status, Transition};
use crate::widgets::select::done_line;
use crate::widgets::theme::PromptTheme;

pub struct ConfirmPrompt {
    message: String,
    default: bool,
    answer: Option<bool>,
    theme: PromptTheme,
}

impl ConfirmPrompt {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            default: true,
            answer: None,
            theme: PromptTheme::default(),
        }
    }

    pub fn default_answer(mut self, default: bool) -> Self {
        self.default = default;
        self
    }

    pub fn theme(mut self, theme: PromptTheme) -> Self {
        self.theme = theme;
        self
    }

    fn current(&self) -> bool {
        self.answer.unwrap_or(self.default)
    }
}

impl Prompt for ConfirmPrompt {
    type Output = bool;
    type Task = Infallible;

    fn name(&self) -> &'static str {
        "confirm"
    }

    fn handle_input(
        &mut self,
        event: &InputEvent,
        keys: &PromptKeybindingsManager,
    ) -> Transition<bool, Infallible> {
        let raw = event.raw();
        if keys.matches(raw, PromptAction::Confirm) {
            let answer = self.current();
            self.answer = Some(answer);
            return Transition::Done(answer);
        }
        if keys.matches(raw, PromptAction::Yes) {
            self.answer = Some(true);
        } else if keys.matches(raw, PromptAction::No) {
            self.answer = Some(false);
        }
        Transition::Continue
    }

    fn settle(&mut self, task: Infallible) -> Transition<bool, Infallible> {
        match task {}
    }

    fn render(&self, ctx: &RenderContext) -> Vec<String> {
        let theme = &self.theme;
        let word = if self.current() { "Yes" } else { "No" };
        if ctx.status == Status::Done {
            return vec![done_line(theme, &self.message, word)];
        }
        let hint = if self.default { "(Y/n)" } else { "(y/N)" };
        let mut line = format!("{} {}", theme.heading(&self.message, false), (theme.help)(hint));
        if self.answer.is_some() {
            line.push(' ');
            line.push_str(&(theme.answer)(word));
        }
        vec![line]
    }
}
