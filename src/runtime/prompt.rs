//! The contract between the runtime and a prompt variant.

use crate::core::error::PromptError;
use crate::core::input_event::InputEvent;
use crate::core::keybindings::PromptKeybindingsManager;
use crate::runtime::deferred::Deferred;

/// Lifecycle status owned by the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Accepting input.
    Pending,
    /// Waiting on a deferred task; only cancellation is honored.
    Loading,
    /// Resolved; the final summary frame is being drawn.
    Done,
}

/// How a prompt invocation ended when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer<V> {
    Submitted(V),
    /// The cancel key was pressed.
    Cancelled,
}

impl<V> Answer<V> {
    pub fn submitted(self) -> Option<V> {
        match self {
            Answer::Submitted(value) => Some(value),
            Answer::Cancelled => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Answer::Cancelled)
    }

    pub fn map<U>(self, f: impl FnOnce(V) -> U) -> Answer<U> {
        match self {
            Answer::Submitted(value) => Answer::Submitted(f(value)),
            Answer::Cancelled => Answer::Cancelled,
        }
    }
}

/// Result of one reducer step.
#[derive(Debug)]
pub enum Transition<O, T> {
    /// State changed (or not); stay pending.
    Continue,
    /// Enter `Loading` until the deferred settles, then call [`Prompt::settle`].
    Await(Deferred<T>),
    /// Resolve with a value.
    Done(O),
    /// Resolve with an error.
    Fail(PromptError),
}

/// Inputs to a render call.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext {
    pub status: Status,
    pub width: usize,
    /// Current busy indicator frame.
    pub spinner: &'static str,
}

/// A prompt variant: a state struct with a reducer and a pure render function.
pub trait Prompt {
    type Output;
    /// Value produced by deferred work (validation, item loading).
    type Task: Send + 'static;

    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Called once before the first render.
    fn init(&mut self) -> Transition<Self::Output, Self::Task> {
        Transition::Continue
    }

    /// Handle one input event while `Pending`.
    fn handle_input(
        &mut self,
        event: &InputEvent,
        keys: &PromptKeybindingsManager,
    ) -> Transition<Self::Output, Self::Task>;

    /// Handle the settled value of the last `Await`.
    fn settle(&mut self, task: Self::Task) -> Transition<Self::Output, Self::Task>;

    fn render(&self, ctx: &RenderContext) -> Vec<String>;
}
