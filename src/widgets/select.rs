//! Single-choice list prompt.

use std::convert::Infallible;

use crate::core::error::ConfigurationError;
use crate::core::input::{digit_index, matches_key};
use crate::core::input_event::InputEvent;
use crate::core::item::{Choice, Item, KeyedChoice};
use crate::core::keybindings::{PromptAction, PromptKeybindingsManager};
use crate::core::text::utils::align_right;
use crate::runtime::{Prompt, RenderContext, Status, Transition};
use crate::widgets::list::{render_page, Direction, ListState};
use crate::widgets::theme::PromptTheme;

pub const DEFAULT_SUFFIX: &str = "Press <ESC> to return";

/// Header, dividers, and action legend around a list page.
#[derive(Clone)]
pub(crate) struct ListChrome<A> {
    pub message: String,
    pub suffix: Option<String>,
    pub actions: Vec<KeyedChoice<A>>,
    pub action_message: Option<String>,
}

impl<A: std::fmt::Display> ListChrome<A> {
    pub fn header(&self, theme: &PromptTheme, width: usize) -> String {
        let heading = theme.heading(&self.message, false);
        match &self.suffix {
            Some(suffix) => align_right(&heading, &(theme.hint)(suffix), width.saturating_sub(1)),
            None => heading,
        }
    }

    pub fn divider(&self, theme: &PromptTheme, width: usize) -> String {
        (theme.separator)(&"─".repeat(width.max(1)))
    }

    /// Closing divider, then the action heading and one `name [key]` line per action.
    pub fn footer(&self, theme: &PromptTheme, width: usize) -> Vec<String> {
        let mut lines = vec![self.divider(theme, width)];
        if let Some(action_message) = &self.action_message {
            lines.push((theme.action_message)(action_message));
            if !self.actions.is_empty() {
                lines.push(String::new());
            }
        }
        for action in &self.actions {
            let key = (theme.key)(&format!("[{}]", action.key));
            let line = format!("{} {key}", action.choice.label());
            if action.choice.is_selectable() {
                lines.push(line);
            } else {
                lines.push((theme.disabled)(&line));
            }
        }
        lines
    }

    /// The selectable action bound to the key in `raw`, if any.
    pub fn action_for(&self, raw: &str) -> Option<&Choice<A>> {
        self.actions
            .iter()
            .find(|action| action.choice.is_selectable() && matches_key(raw, &action.key))
            .map(|action| &action.choice)
    }
}

pub(crate) fn done_line(theme: &PromptTheme, message: &str, answer: &str) -> String {
    format!("{} {}", theme.heading(message, true), (theme.answer)(answer))
}

pub(crate) fn choice_line<V: std::fmt::Display>(
    theme: &PromptTheme,
    choice: &Choice<V>,
    active: bool,
) -> String {
    if active {
        (theme.highlight)(&format!("{} {}", theme.cursor, choice.label()))
    } else {
        format!("  {}", choice.label())
    }
}

pub(crate) fn description_line<V>(theme: &PromptTheme, list: &ListState<V>) -> Option<String> {
    list.active_choice()
        .and_then(|choice| choice.description.as_deref())
        .map(|description| (theme.description)(description))
}

pub struct SelectConfig<V> {
    pub message: String,
    pub items: Vec<Item<V>>,
    pub page_size: usize,
    pub looping: bool,
    pub default: Option<V>,
    pub actions: Vec<KeyedChoice<V>>,
    pub action_message: Option<String>,
    /// Right-aligned hint on the header line.
    pub suffix: Option<String>,
    pub theme: PromptTheme,
}

impl<V> SelectConfig<V> {
    pub fn new(message: impl Into<String>, items: Vec<Item<V>>) -> Self {
        Self {
            message: message.into(),
            items,
            page_size: 10,
            looping: true,
            default: None,
            actions: Vec::new(),
            action_message: None,
            suffix: Some(DEFAULT_SUFFIX.to_string()),
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

    pub fn default_value(mut self, value: V) -> Self {
        self.default = Some(value);
        self
    }

    pub fn action(mut self, key: impl Into<String>, name: impl Into<String>, value: V) -> Self {
        self.actions.push(KeyedChoice::new(key, name, value));
        self
    }

    pub fn actions(mut self, actions: Vec<KeyedChoice<V>>) -> Self {
        self.actions = actions;
        self
    }

    pub fn action_message(mut self, message: impl Into<String>) -> Self {
        self.action_message = Some(message.into());
        self
    }

    pub fn suffix(mut self, suffix: Option<String>) -> Self {
        self.suffix = suffix;
        self
    }

    pub fn theme(mut self, theme: PromptTheme) -> Self {
        self.theme = theme;
        self
    }
}

pub struct SelectPrompt<V> {
    list: ListState<V>,
    chrome: ListChrome<V>,
    page_size: usize,
    theme: PromptTheme,
    answer: Option<String>,
}

impl<V> SelectPrompt<V>
where
    V: Clone + PartialEq + std::fmt::Display,
{
    pub fn new(config: SelectConfig<V>) -> Result<Self, ConfigurationError> {
        if config.page_size == 0 {
            return Err(ConfigurationError::ZeroPageSize { prompt: "select" });
        }
        let mut list = ListState::new("select", config.items, config.looping)?;
        if let Some(default) = &config.default {
            list.select_where(|choice| choice.value == *default);
        }
        Ok(Self {
            list,
            chrome: ListChrome {
                message: config.message,
                suffix: config.suffix,
                actions: config.actions,
                action_message: config.action_message,
            },
            page_size: config.page_size,
            theme: config.theme,
            answer: None,
        })
    }

    pub fn active(&self) -> usize {
        self.list.active()
    }

    fn resolve(&mut self, choice: &Choice<V>) -> Transition<V, Infallible> {
        self.answer = Some(choice.label());
        Transition::Done(choice.value.clone())
    }
}

impl<V> Prompt for SelectPrompt<V>
where
    V: Clone + PartialEq + std::fmt::Display,
{
    type Output = V;
    type Task = Infallible;

    fn name(&self) -> &'static str {
        "select"
    }

    fn handle_input(
        &mut self,
        event: &InputEvent,
        keys: &PromptKeybindingsManager,
    ) -> Transition<V, Infallible> {
        let raw = event.raw();
        if keys.matches(raw, PromptAction::SelectUp) {
            self.list.move_active(Direction::Up);
        } else if keys.matches(raw, PromptAction::SelectDown) {
            self.list.move_active(Direction::Down);
        } else if keys.matches(raw, PromptAction::Confirm) {
            if let Some(choice) = self.list.active_choice().cloned() {
                return self.resolve(&choice);
            }
        } else if let Some(choice) = self.chrome.action_for(raw).cloned() {
            return self.resolve(&choice);
        } else if let Some(index) = digit_index(raw) {
            self.list.jump_to(index);
        }
        Transition::Continue
    }

    fn settle(&mut self, task: Infallible) -> Transition<V, Infallible> {
        match task {}
    }

    fn render(&self, ctx: &RenderContext) -> Vec<String> {
        let theme = &self.theme;
        if ctx.status == Status::Done {
            let answer = self.answer.as_deref().unwrap_or_default();
            return vec![done_line(theme, &self.chrome.message, answer)];
        }

        let mut lines = vec![
            self.chrome.header(theme, ctx.width),
            self.chrome.divider(theme, ctx.width),
        ];
        lines.extend(render_page(&self.list, self.page_size, theme, ctx.width, |_, choice, active| {
            choice_line(theme, choice, active)
        }));
        lines.extend(description_line(theme, &self.list));
        lines.extend(self.chrome.footer(theme, ctx.width));
        lines
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    use super::{SelectConfig, SelectPrompt};
    use crate::core::error::ConfigurationError;
    use crate::core::input_event::{parse_input_events, InputEvent};
    use crate::core::item::{Choice, Item, Separator};
    use crate::core::keybindings::PromptKeybindingsManager;
    use crate::runtime::{Prompt, RenderContext, Status, Transition};
    use crate::widgets::theme::PromptTheme;

    fn key(data: &str) -> InputEvent {
        parse_input_events(data).remove(0)
    }

    fn press(prompt: &mut SelectPrompt<String>, data: &str) -> Option<String> {
        let keys = PromptKeybindingsManager::default();
        match prompt.handle_input(&key(data), &keys) {
            Transition::Done(value) => Some(value),
            _ => None,
        }
    }

    fn items() -> Vec<Item<String>> {
        vec![
            Choice::new("docs".to_string()).into(),
            Separator::line().into(),
            Choice::new("photos".to_string()).disabled_because("(locked)").into(),
            Choice::new("music".to_string()).with_description("3 files").into(),
            Choice::new("video".to_string()).into(),
        ]
    }

    fn config() -> SelectConfig<String> {
        SelectConfig::new("Pick a folder", items()).theme(PromptTheme::plain())
    }

    #[test]
    fn enter_resolves_with_active_value() {
        let mut prompt = SelectPrompt::new(config()).expect("valid");
        assert_eq!(press(&mut prompt, "\x1b[B"), None);
        assert_eq!(press(&mut prompt, "\r"), Some("music".to_string()));
    }

    #[test]
    fn tab_and_shift_tab_move_like_arrows() {
        let mut prompt = SelectPrompt::new(config()).expect("valid");
        press(&mut prompt, "\t");
        assert_eq!(prompt.active(), 3);
        press(&mut prompt, "\x1b[Z");
        assert_eq!(prompt.active(), 0);
    }

    #[test]
    fn default_value_sets_initial_cursor() {
        let config = config().default_value("video".to_string());
        let prompt = SelectPrompt::new(config).expect("valid");
        assert_eq!(prompt.active(), 4);

        let config = SelectConfig::new("m", items()).default_value("photos".to_string());
        let prompt = SelectPrompt::new(config).expect("valid");
        assert_eq!(prompt.active(), 0);
    }

    #[test]
    fn digit_jumps_only_to_selectable_items() {
        let mut prompt = SelectPrompt::new(config()).expect("valid");
        press(&mut prompt, "3");
        assert_eq!(prompt.active(), 0);
        press(&mut prompt, "5");
        assert_eq!(prompt.active(), 4);
        press(&mut prompt, "9");
        assert_eq!(prompt.active(), 4);
    }

    #[test]
    fn keyed_action_resolves_regardless_of_cursor() {
        let config = config().action("x", "Exit", "exit".to_string());
        let mut prompt = SelectPrompt::new(config).expect("valid");
        press(&mut prompt, "\x1b[B");
        assert_eq!(press(&mut prompt, "x"), Some("exit".to_string()));
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let err = SelectPrompt::new(config().page_size(0)).err();
        assert_matches!(err, Some(ConfigurationError::ZeroPageSize { .. }));
    }

    #[test]
    fn pending_frame_lists_items_and_legend() {
        let config = config()
            .suffix(None)
            .action_message("Folder actions")
            .action("n", "New folder", "new".to_string());
        let mut prompt = SelectPrompt::new(config).expect("valid");
        press(&mut prompt, "\x1b[B");
        let ctx = RenderContext {
            status: Status::Pending,
            width: 10,
            spinner: "",
        };
        assert_eq!(
            prompt.render(&ctx),
            vec![
                "? Pick a folder",
                "──────────",
                "  docs",
                "──────────",
                "  - photos (locked)",
                "❯ music",
                "  video",
                "3 files",
                "──────────",
                "Folder actions",
                "",
                "New folder [n]",
            ]
        );
    }

    #[test]
    fn header_aligns_suffix_to_the_right() {
        let prompt = SelectPrompt::new(config().suffix(Some("esc".to_string()))).expect("valid");
        let ctx = RenderContext {
            status: Status::Pending,
            width: 21,
            spinner: "",
        };
        assert_eq!(prompt.render(&ctx)[0], "? Pick a folder  esc");
    }

    #[test]
    fn done_frame_shows_answer() {
        let mut prompt = SelectPrompt::new(config()).expect("valid");
        press(&mut prompt, "\r");
        let ctx = RenderContext {
            status: Status::Done,
            width: 40,
            spinner: "",
        };
        assert_eq!(prompt.render(&ctx), vec!["✔ Pick a folder docs"]);
    }
}
