//! Single-choice list whose items arrive from a deferred source.

use std::fmt::Display;

use crate::core::error::{ConfigurationError, PromptError};
use crate::core::input::digit_index;
use crate::core::input_event::InputEvent;
use crate::core::item::{Choice, Item, KeyedChoice};
use crate::core::keybindings::{PromptAction, PromptKeybindingsManager};
use crate::core::text::utils::align_right;
use crate::runtime::{Deferred, Prompt, RenderContext, Status, Transition};
use crate::widgets::list::{render_page, Direction, ListState};
use crate::widgets::select::{choice_line, description_line, done_line, ListChrome, DEFAULT_SUFFIX};
use crate::widgets::theme::PromptTheme;

const PROMPT_NAME: &str = "lazy select";

pub type LoadResult<V> = Result<Vec<Item<V>>, String>;

/// What the user picked: a list item or a keyed action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Picked<V, A> {
    Item(V),
    Action(A),
}

enum Source<V> {
    Materialized(Vec<Item<V>>),
    Deferred(Deferred<LoadResult<V>>),
}

/// Items now or later, plus the index the cursor should resume at.
pub struct PendingSource<V> {
    source: Source<V>,
    resume_index: Option<usize>,
}

impl<V: Send + 'static> PendingSource<V> {
    pub fn ready(items: Vec<Item<V>>) -> Self {
        Self {
            source: Source::Materialized(items),
            resume_index: None,
        }
    }

    pub fn deferred(items: Deferred<LoadResult<V>>) -> Self {
        Self {
            source: Source::Deferred(items),
            resume_index: None,
        }
    }

    /// Load on a worker thread; the error is shown as the load failure message.
    pub fn spawn<F, E>(load: F) -> Self
    where
        F: FnOnce() -> Result<Vec<Item<V>>, E> + Send + 'static,
        E: Display,
    {
        Self::deferred(Deferred::spawn(move || load().map_err(|err| err.to_string())))
    }

    pub fn resume_at(mut self, index: usize) -> Self {
        self.resume_index = Some(index);
        self
    }

    fn into_deferred(self) -> Deferred<LoadResult<V>> {
        match self.source {
            Source::Materialized(items) => Deferred::ready(Ok(items)),
            Source::Deferred(deferred) => deferred,
        }
    }
}

pub struct LazySelectConfig<V, A> {
    pub message: String,
    pub source: PendingSource<V>,
    pub page_size: usize,
    pub looping: bool,
    pub actions: Vec<KeyedChoice<A>>,
    pub action_message: Option<String>,
    pub suffix: Option<String>,
    pub theme: PromptTheme,
}

impl<V, A> LazySelectConfig<V, A> {
    pub fn new(message: impl Into<String>, source: PendingSource<V>) -> Self {
        Self {
            message: message.into(),
            source,
            page_size: 10,
            looping: true,
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

    pub fn action(mut self, key: impl Into<String>, name: impl Into<String>, value: A) -> Self {
        self.actions.push(KeyedChoice::new(key, name, value));
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

pub struct LazySelectPrompt<V, A> {
    chrome: ListChrome<A>,
    source: Option<PendingSource<V>>,
    resume_index: Option<usize>,
    list: Option<ListState<V>>,
    page_size: usize,
    looping: bool,
    theme: PromptTheme,
    answer: Option<String>,
}

impl<V, A> LazySelectPrompt<V, A>
where
    V: Clone + Display + Send + 'static,
    A: Clone + Display,
{
    pub fn new(config: LazySelectConfig<V, A>) -> Result<Self, ConfigurationError> {
        if config.page_size == 0 {
            return Err(ConfigurationError::ZeroPageSize {
                prompt: PROMPT_NAME,
            });
        }
        Ok(Self {
            chrome: ListChrome {
                message: config.message,
                suffix: config.suffix,
                actions: config.actions,
                action_message: config.action_message,
            },
            resume_index: config.source.resume_index,
            source: Some(config.source),
            list: None,
            page_size: config.page_size,
            looping: config.looping,
            theme: config.theme,
            answer: None,
        })
    }

    /// Cursor position once the items are loaded.
    pub fn active(&self) -> Option<usize> {
        self.list.as_ref().map(ListState::active)
    }

    fn pick_item(&mut self, choice: &Choice<V>) -> Transition<Picked<V, A>, LoadResult<V>> {
        self.answer = Some(choice.label());
        Transition::Done(Picked::Item(choice.value.clone()))
    }

    fn pick_action(&mut self, choice: &Choice<A>) -> Transition<Picked<V, A>, LoadResult<V>> {
        self.answer = Some(choice.label());
        Transition::Done(Picked::Action(choice.value.clone()))
    }

    fn loading_header(&self, spinner: &str, width: usize) -> String {
        let theme = &self.theme;
        let heading = format!("{spinner} {}", (theme.message)(&self.chrome.message));
        match &self.chrome.suffix {
            Some(suffix) => align_right(&heading, &(theme.hint)(suffix), width.saturating_sub(1)),
            None => heading,
        }
    }
}

impl<V, A> Prompt for LazySelectPrompt<V, A>
where
    V: Clone + Display + Send + 'static,
    A: Clone + Display,
{
    type Output = Picked<V, A>;
    type Task = LoadResult<V>;

    fn name(&self) -> &'static str {
        PROMPT_NAME
    }

    fn init(&mut self) -> Transition<Picked<V, A>, LoadResult<V>> {
        match self.source.take() {
            Some(source) => Transition::Await(source.into_deferred()),
            None => Transition::Continue,
        }
    }

    fn handle_input(
        &mut self,
        event: &InputEvent,
        keys: &PromptKeybindingsManager,
    ) -> Transition<Picked<V, A>, LoadResult<V>> {
        let raw = event.raw();
        if let Some(action) = self.chrome.action_for(raw).cloned() {
            return self.pick_action(&action);
        }
        let Some(list) = self.list.as_mut() else {
            return Transition::Continue;
        };
        if keys.matches(raw, PromptAction::SelectUp) {
            list.move_active(Direction::Up);
        } else if keys.matches(raw, PromptAction::SelectDown) {
            list.move_active(Direction::Down);
        } else if keys.matches(raw, PromptAction::Confirm) {
            if let Some(choice) = list.active_choice().cloned() {
                return self.pick_item(&choice);
            }
        } else if let Some(index) = digit_index(raw) {
            list.jump_to(index);
        }
        Transition::Continue
    }

    fn settle(&mut self, task: LoadResult<V>) -> Transition<Picked<V, A>, LoadResult<V>> {
        let items = match task {
            Ok(items) => items,
            Err(message) => {
                tracing::warn!(prompt = PROMPT_NAME, error = %message, "item source failed");
                return Transition::Fail(PromptError::Load(message));
            }
        };
        let mut list = match ListState::new(PROMPT_NAME, items, self.looping) {
            Ok(list) => list,
            Err(err) => return Transition::Fail(err.into()),
        };
        if let Some(index) = self.resume_index {
            list.jump_to(index);
        }
        self.list = Some(list);
        Transition::Continue
    }

    fn render(&self, ctx: &RenderContext) -> Vec<String> {
        let theme = &self.theme;
        if ctx.status == Status::Done {
            let answer = self.answer.as_deref().unwrap_or_default();
            return vec![done_line(theme, &self.chrome.message, answer)];
        }

        let header = match ctx.status {
            Status::Loading => self.loading_header(ctx.spinner, ctx.width),
            _ => self.chrome.header(theme, ctx.width),
        };
        let mut lines = vec![header, self.chrome.divider(theme, ctx.width)];
        if let (Status::Pending, Some(list)) = (ctx.status, &self.list) {
            lines.extend(render_page(list, self.page_size, theme, ctx.width, |_, choice, active| {
                choice_line(theme, choice, active)
            }));
            lines.extend(description_line(theme, list));
        }
        lines.extend(self.chrome.footer(theme, ctx.width));
        lines
    }
}
