//! Multi-choice list prompt.

use crate::core::error::ConfigurationError;
use crate::core::input::digit_index;
use crate::core::input_event::InputEvent;
use crate::core::item::{Choice, Item};
use crate::core::keybindings::{PromptAction, PromptKeybindingsManager};
use crate::runtime::{Deferred, Prompt, RenderContext, Status, Transition};
use crate::widgets::list::{render_page, Direction, ListState};
use crate::widgets::select::done_line;
use crate::widgets::theme::PromptTheme;
use crate::widgets::validate::{run_validator, Validation, Validator};

const REQUIRED_MESSAGE: &str = "At least one choice must be selected";
const INVALID_MESSAGE: &str = "You must select a valid value";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Instructions {
    /// The built-in key summary.
    #[default]
    Default,
    Custom(String),
    Hidden,
}

pub struct CheckboxConfig<V> {
    pub message: String,
    pub items: Vec<Item<V>>,
    pub page_size: usize,
    pub looping: bool,
    pub required: bool,
    pub instructions: Instructions,
    pub validate: Option<Validator<Vec<V>>>,
    pub theme: PromptTheme,
}

impl<V> CheckboxConfig<V> {
    pub fn new(message: impl Into<String>, items: Vec<Item<V>>) -> Self {
        Self {
            message: message.into(),
            items,
            page_size: 7,
            looping: true,
            required: false,
            instructions: Instructions::Default,
            validate: None,
            theme: PromptTheme::default(),
        }
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn instructions(mut self, instructions: Instructions) -> Self {
        self.instructions = instructions;
        self
    }

    pub fn validate(mut self, validate: Validator<Vec<V>>) -> Self {
        self.validate = Some(validate);
        self
    }

    pub fn theme(mut self, theme: PromptTheme) -> Self {
        self.theme = theme;
        self
    }
}

/// Result of an off-thread validation run.
pub struct CheckedValidation<V> {
    values: Vec<V>,
    validation: Validation,
}

pub struct CheckboxPrompt<V> {
    message: String,
    list: ListState<V>,
    checked: Vec<bool>,
    page_size: usize,
    required: bool,
    instructions: Instructions,
    show_help: bool,
    validate: Option<Validator<Vec<V>>>,
    error: Option<String>,
    theme: PromptTheme,
}

impl<V> CheckboxPrompt<V>
where
    V: Clone + std::fmt::Display + Send + 'static,
{
    pub fn new(config: CheckboxConfig<V>) -> Result<Self, ConfigurationError> {
        if config.page_size == 0 {
            return Err(ConfigurationError::ZeroPageSize { prompt: "checkbox" });
        }
        let list = ListState::new("checkbox", config.items, config.looping)?;
        let checked = list
            .items()
            .iter()
            .map(|item| item.as_choice().is_some_and(|c| c.is_selectable() && c.checked))
            .collect();
        Ok(Self {
            message: config.message,
            list,
            checked,
            page_size: config.page_size,
            required: config.required,
            instructions: config.instructions,
            show_help: true,
            validate: config.validate,
            error: None,
            theme: config.theme,
        })
    }

    pub fn active(&self) -> usize {
        self.list.active()
    }

    pub fn is_checked(&self, index: usize) -> bool {
        self.checked.get(index).copied().unwrap_or(false)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn toggle(&mut self, index: usize) {
        if self.list.is_selectable(index) {
            self.checked[index] = !self.checked[index];
        }
    }

    fn toggle_all(&mut self) {
        let any_unchecked = (0..self.checked.len())
            .any(|index| self.list.is_selectable(index) && !self.checked[index]);
        for index in 0..self.checked.len() {
            if self.list.is_selectable(index) {
                self.checked[index] = any_unchecked;
            }
        }
    }

    fn invert_all(&mut self) {
        for index in 0..self.checked.len() {
            self.toggle(index);
        }
    }

    fn checked_choices(&self) -> impl Iterator<Item = &Choice<V>> {
        self.list
            .items()
            .iter()
            .enumerate()
            .filter(|(index, _)| self.checked[*index])
            .filter_map(|(_, item)| item.as_choice())
    }

    fn submit(&mut self) -> Transition<Vec<V>, CheckedValidation<V>> {
        let values: Vec<V> = self.checked_choices().map(|choice| choice.value.clone()).collect();
        if self.required && values.is_empty() {
            self.error = Some(REQUIRED_MESSAGE.to_string());
            return Transition::Continue;
        }
        match &self.validate {
            None => Transition::Done(values),
            Some(validate) => {
                let validate = validate.clone();
                Transition::Await(Deferred::spawn(move || {
                    let validation = run_validator(&validate, &values);
                    CheckedValidation { values, validation }
                }))
            }
        }
    }

    fn help_tip(&self) -> Option<String> {
        if !self.show_help {
            return None;
        }
        let key = &self.theme.key;
        match &self.instructions {
            Instructions::Hidden => None,
            Instructions::Custom(text) => Some(text.clone()),
            Instructions::Default => Some(format!(
                " (Press {} to select, {} to toggle all, {} to invert selection, and {} to proceed)",
                key("<space>"),
                key("<a>"),
                key("<i>"),
                key("<enter>"),
            )),
        }
    }
}

impl<V> Prompt for CheckboxPrompt<V>
where
    V: Clone + std::fmt::Display + Send + 'static,
{
    type Output = Vec<V>;
    type Task = CheckedValidation<V>;

    fn name(&self) -> &'static str {
        "checkbox"
    }

    fn handle_input(
        &mut self,
        event: &InputEvent,
        keys: &PromptKeybindingsManager,
    ) -> Transition<Vec<V>, CheckedValidation<V>> {
        let raw = event.raw();
        if keys.matches(raw, PromptAction::Confirm) {
            return self.submit();
        } else if keys.matches(raw, PromptAction::SelectUp) {
            self.list.move_active(Direction::Up);
        } else if keys.matches(raw, PromptAction::SelectDown) {
            self.list.move_active(Direction::Down);
        } else if keys.matches(raw, PromptAction::Toggle) {
            self.error = None;
            self.show_help = false;
            self.toggle(self.list.active());
        } else if keys.matches(raw, PromptAction::ToggleAll) {
            self.toggle_all();
        } else if keys.matches(raw, PromptAction::InvertAll) {
            self.invert_all();
        } else if let Some(index) = digit_index(raw) {
            if self.list.jump_to(index) {
                self.show_help = false;
                self.toggle(index);
            }
        }
        Transition::Continue
    }

    fn settle(&mut self, task: CheckedValidation<V>) -> Transition<Vec<V>, CheckedValidation<V>> {
        match task.validation.error_message(INVALID_MESSAGE) {
            None => Transition::Done(task.values),
            Some(message) => {
                tracing::debug!(prompt = "checkbox", error = %message, "validation failed");
                self.error = Some(message);
                Transition::Continue
            }
        }
    }

    fn render(&self, ctx: &RenderContext) -> Vec<String> {
        let theme = &self.theme;
        if ctx.status == Status::Done {
            let names: Vec<String> = self.checked_choices().map(Choice::label).collect();
            return vec![done_line(theme, &self.message, &names.join(", "))];
        }

        let heading = match ctx.status {
            Status::Loading => format!("{} {}", ctx.spinner, (theme.message)(&self.message)),
            _ => theme.heading(&self.message, false),
        };
        let help = self.help_tip().map(|tip| (theme.help)(&tip)).unwrap_or_default();
        let mut lines = vec![
            format!("{heading}{help}"),
            (theme.separator)(&"─".repeat(ctx.width.max(1))),
        ];
        let row = |index: usize, choice: &Choice<V>, active: bool| {
            let icon = if self.checked[index] {
                (theme.checked)(&theme.checked_icon)
            } else {
                theme.unchecked_icon.clone()
            };
            let cursor = if active { theme.cursor.as_str() } else { " " };
            let line = format!("{cursor}{icon} {}", choice.label());
            if active {
                (theme.highlight)(&line)
            } else {
                line
            }
        };
        lines.extend(render_page(&self.list, self.page_size, theme, ctx.width, row));
        if let Some(error) = &self.error {
            lines.push(theme.error_line(error));
        }
        lines
    }
}
