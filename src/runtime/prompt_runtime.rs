//! Prompt runtime: one event loop per prompt invocation.
//!
//! Invariants:
//! - events (keys, resizes, settlements) are processed one at a time, in arrival order;
//! - every reducer call is followed by a render from the resulting state;
//! - at most one prompt owns the terminal per process.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::Duration;

use crate::core::error::PromptError;
use crate::core::input_event::parse_input_events;
use crate::core::keybindings::{PromptAction, PromptKeybindingsManager};
use crate::core::output::{OutputGate, TerminalCmd};
use crate::core::terminal::{Terminal, TerminalSession};
use crate::render::InlineRenderer;
use crate::runtime::prompt::{Answer, Prompt, RenderContext, Status, Transition};
use crate::widgets::loader::spinner_frame;

const SPINNER_INTERVAL: Duration = Duration::from_millis(80);

static PROMPT_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Process-wide claim on the terminal for the lifetime of one prompt.
struct ActivePrompt;

impl ActivePrompt {
    fn acquire() -> Result<Self, PromptError> {
        PROMPT_ACTIVE
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| ActivePrompt)
            .map_err(|_| PromptError::AlreadyActive)
    }
}

impl Drop for ActivePrompt {
    fn drop(&mut self) {
        PROMPT_ACTIVE.store(false, Ordering::SeqCst);
    }
}

enum RuntimeEvent<T> {
    Input(String),
    Resize,
    Settled(T),
    Abandoned,
}

pub struct PromptRuntime<T: Terminal> {
    terminal: T,
    keybindings: PromptKeybindingsManager,
    output: OutputGate,
}

impl<T: Terminal> PromptRuntime<T> {
    pub fn new(terminal: T) -> Self {
        Self::with_keybindings(terminal, PromptKeybindingsManager::default())
    }

    pub fn with_keybindings(terminal: T, keybindings: PromptKeybindingsManager) -> Self {
        Self {
            terminal,
            keybindings,
            output: OutputGate::new(),
        }
    }

    pub fn keybindings(&self) -> &PromptKeybindingsManager {
        &self.keybindings
    }

    pub fn set_keybindings(&mut self, keybindings: PromptKeybindingsManager) {
        self.keybindings = keybindings;
    }

    pub fn terminal(&self) -> &T {
        &self.terminal
    }

    pub fn into_terminal(self) -> T {
        self.terminal
    }

    /// Write one line of plain output between prompts.
    pub fn print_line(&mut self, text: &str) {
        self.output.push(TerminalCmd::bytes(format!("{text}\r\n")));
        self.output.flush(&mut self.terminal);
    }

    /// Clear the visible screen and scrollback, homing the cursor.
    pub fn clear_screen(&mut self) {
        self.output.push(TerminalCmd::BytesStatic("\x1b[2J\x1b[3J\x1b[H"));
        self.output.flush(&mut self.terminal);
    }

    /// Run `prompt` to completion.
    ///
    /// Returns the submitted value, [`Answer::Cancelled`] when the cancel key was pressed
    /// (also while loading), or an error for aborts, load failures, and terminal failures.
    pub fn run<P: Prompt>(&mut self, prompt: P) -> Result<Answer<P::Output>, PromptError> {
        let _active = ActivePrompt::acquire()?;
        let name = prompt.name();
        tracing::debug!(prompt = name, "prompt started");

        let (tx, rx) = mpsc::channel::<RuntimeEvent<P::Task>>();
        let input_tx = tx.clone();
        let resize_tx = tx.clone();
        let mut session = TerminalSession::start(
            &mut self.terminal,
            Box::new(move |data| {
                let _ = input_tx.send(RuntimeEvent::Input(data));
            }),
            Box::new(move || {
                let _ = resize_tx.send(RuntimeEvent::Resize);
            }),
        )?;

        let mut driver = Driver {
            prompt,
            status: Status::Pending,
            spinner_tick: 0,
            renderer: InlineRenderer::new(),
            keybindings: &self.keybindings,
            output: &mut self.output,
            tx,
            interest: Arc::new(()),
        };
        let outcome = driver.drive(&mut session, &rx);
        driver.teardown(&mut session, &outcome);
        drop(session);

        match &outcome {
            Ok(Answer::Submitted(_)) => tracing::debug!(prompt = name, "prompt submitted"),
            Ok(Answer::Cancelled) => tracing::debug!(prompt = name, "prompt cancelled"),
            Err(err) => tracing::warn!(prompt = name, error = %err, "prompt failed"),
        }
        outcome
    }
}

struct Driver<'a, P: Prompt> {
    prompt: P,
    status: Status,
    spinner_tick: usize,
    renderer: InlineRenderer,
    keybindings: &'a PromptKeybindingsManager,
    output: &'a mut OutputGate,
    tx: Sender<RuntimeEvent<P::Task>>,
    /// Forwarders stop waiting once the driver, and with it this token, is dropped.
    interest: Arc<()>,
}

impl<P: Prompt> Driver<'_, P> {
    fn drive<T: Terminal>(
        &mut self,
        session: &mut TerminalSession<'_, T>,
        rx: &Receiver<RuntimeEvent<P::Task>>,
    ) -> Result<Answer<P::Output>, PromptError> {
        self.output.push(TerminalCmd::HideCursor);
        self.output.push(TerminalCmd::BracketedPasteEnable);

        let init = self.prompt.init();
        if let Some(outcome) = self.apply(init) {
            return outcome;
        }
        self.render(session);

        loop {
            let event = if self.status == Status::Loading {
                match rx.recv_timeout(SPINNER_INTERVAL) {
                    Ok(event) => event,
                    Err(RecvTimeoutError::Timeout) => {
                        self.spinner_tick = self.spinner_tick.wrapping_add(1);
                        self.render(session);
                        continue;
                    }
                    Err(RecvTimeoutError::Disconnected) => return Err(PromptError::Disconnected),
                }
            } else {
                rx.recv().map_err(|_| PromptError::Disconnected)?
            };

            match event {
                RuntimeEvent::Input(data) => {
                    for input in parse_input_events(&data) {
                        let raw = input.raw();
                        if self.keybindings.matches(raw, PromptAction::Abort) {
                            return Err(PromptError::Aborted);
                        }
                        if self.keybindings.matches(raw, PromptAction::Cancel) {
                            return Ok(Answer::Cancelled);
                        }
                        if self.status != Status::Pending {
                            continue;
                        }
                        let transition = self.prompt.handle_input(&input, self.keybindings);
                        if let Some(outcome) = self.apply(transition) {
                            return outcome;
                        }
                        self.render(session);
                    }
                }
                RuntimeEvent::Resize => self.render(session),
                RuntimeEvent::Settled(task) => {
                    if self.status != Status::Loading {
                        continue;
                    }
                    self.status = Status::Pending;
                    let transition = self.prompt.settle(task);
                    if let Some(outcome) = self.apply(transition) {
                        return outcome;
                    }
                    self.render(session);
                }
                RuntimeEvent::Abandoned => return Err(PromptError::Disconnected),
            }
        }
    }

    /// Apply a transition; `Some` when the prompt resolved.
    fn apply(
        &mut self,
        mut transition: Transition<P::Output, P::Task>,
    ) -> Option<Result<Answer<P::Output>, PromptError>> {
        loop {
            match transition {
                Transition::Continue => return None,
                Transition::Done(value) => {
                    self.status = Status::Done;
                    return Some(Ok(Answer::Submitted(value)));
                }
                Transition::Fail(err) => return Some(Err(err)),
                Transition::Await(deferred) => match deferred.try_take() {
                    Ok(task) => transition = self.prompt.settle(task),
                    Err(pending) => {
                        self.status = Status::Loading;
                        self.spinner_tick = 0;
                        let tx = self.tx.clone();
                        pending.forward(Arc::downgrade(&self.interest), move |task| {
                            let event = match task {
                                Some(task) => RuntimeEvent::Settled(task),
                                None => RuntimeEvent::Abandoned,
                            };
                            let _ = tx.send(event);
                        });
                        return None;
                    }
                },
            }
        }
    }

    fn render<T: Terminal>(&mut self, session: &mut TerminalSession<'_, T>) {
        let width = session.columns() as usize;
        let ctx = RenderContext {
            status: self.status,
            width,
            spinner: spinner_frame(self.spinner_tick),
        };
        let lines = self.prompt.render(&ctx);
        self.output.extend(self.renderer.render(&lines, width));
        self.output.flush(session.terminal_mut());
    }

    /// Leave the summary frame for submissions, erase everything otherwise.
    fn teardown<T: Terminal>(
        &mut self,
        session: &mut TerminalSession<'_, T>,
        outcome: &Result<Answer<P::Output>, PromptError>,
    ) {
        let width = session.columns() as usize;
        if matches!(outcome, Ok(Answer::Submitted(_))) {
            self.render(session);
            self.output.extend(self.renderer.finish());
        } else {
            self.output.extend(self.renderer.clear(width));
        }
        self.output.push(TerminalCmd::BracketedPasteDisable);
        self.output.push(TerminalCmd::ShowCursor);
        self.output.flush(session.terminal_mut());
    }
}
