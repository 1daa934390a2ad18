#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use prompt_tui::Terminal;

pub const UP: &str = "\x1b[A";
pub const DOWN: &str = "\x1b[B";
pub const ENTER: &str = "\r";
pub const ESC: &str = "\x1b";
pub const TAB: &str = "\t";
pub const SPACE: &str = " ";
pub const CTRL_C: &str = "\x03";

/// Only one prompt may own the terminal per process, so tests take turns.
pub fn prompt_lock() -> MutexGuard<'static, ()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub enum Step {
    Input(String),
    Resize(u16, u16),
    Pause(Duration),
    Run(Box<dyn FnOnce() + Send>),
}

pub fn input(data: &str) -> Step {
    Step::Input(data.to_string())
}

pub fn pause_ms(ms: u64) -> Step {
    Step::Pause(Duration::from_millis(ms))
}

pub fn run(f: impl FnOnce() + Send + 'static) -> Step {
    Step::Run(Box::new(f))
}

#[derive(Default)]
struct TerminalState {
    writes: String,
    columns: u16,
    rows: u16,
    starts: usize,
    stops: usize,
}

/// Terminal that replays a script of input chunks once started.
#[derive(Clone)]
pub struct ScriptedTerminal {
    state: Arc<Mutex<TerminalState>>,
    script: Arc<Mutex<Vec<Step>>>,
    player: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl ScriptedTerminal {
    pub fn new(columns: u16, rows: u16) -> Self {
        Self {
            state: Arc::new(Mutex::new(TerminalState {
                columns,
                rows,
                ..TerminalState::default()
            })),
            script: Arc::new(Mutex::new(Vec::new())),
            player: Arc::new(Mutex::new(None)),
        }
    }

    /// Queue steps for the next `start`.
    pub fn script(&self, steps: Vec<Step>) {
        *self.script.lock().expect("script lock") = steps;
    }

    pub fn writes(&self) -> String {
        self.state.lock().expect("state lock").writes.clone()
    }

    pub fn take_writes(&self) -> String {
        std::mem::take(&mut self.state.lock().expect("state lock").writes)
    }

    pub fn starts(&self) -> usize {
        self.state.lock().expect("state lock").starts
    }

    pub fn stops(&self) -> usize {
        self.state.lock().expect("state lock").stops
    }
}

impl Terminal for ScriptedTerminal {
    fn start(
        &mut self,
        mut on_input: Box<dyn FnMut(String) + Send>,
        mut on_resize: Box<dyn FnMut() + Send>,
    ) -> io::Result<()> {
        self.state.lock().expect("state lock").starts += 1;
        let steps = std::mem::take(&mut *self.script.lock().expect("script lock"));
        let state = Arc::clone(&self.state);
        let player = thread::spawn(move || {
            for step in steps {
                match step {
                    Step::Input(data) => on_input(data),
                    Step::Resize(columns, rows) => {
                        {
                            let mut state = state.lock().expect("state lock");
                            state.columns = columns;
                            state.rows = rows;
                        }
                        on_resize();
                    }
                    Step::Pause(duration) => thread::sleep(duration),
                    Step::Run(f) => f(),
                }
            }
        });
        *self.player.lock().expect("player lock") = Some(player);
        Ok(())
    }

    fn stop(&mut self) -> io::Result<()> {
        if let Some(player) = self.player.lock().expect("player lock").take() {
            let _ = player.join();
        }
        self.state.lock().expect("state lock").stops += 1;
        Ok(())
    }

    fn drain_input(&mut self, _max_ms: u64, _idle_ms: u64) {}

    fn write(&mut self, data: &str) {
        self.state.lock().expect("state lock").writes.push_str(data);
    }

    fn columns(&self) -> u16 {
        self.state.lock().expect("state lock").columns
    }

    fn rows(&self) -> u16 {
        self.state.lock().expect("state lock").rows
    }
}
