#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::path::Path;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use drive_cli::App;
use drive_service_mock::MockDrive;
use item_cache::ItemCache;
use prompt_tui::{PromptRuntime, PromptTheme, Terminal};

pub const UP: &str = "\x1b[A";
pub const DOWN: &str = "\x1b[B";
pub const ENTER: &str = "\r";
pub const ESC: &str = "\x1b";
pub const SPACE: &str = " ";
pub const CTRL_C: &str = "\x03";

/// Time for a lazy listing or a validator to settle before the first key of a prompt.
const SETTLE: Duration = Duration::from_millis(40);
const BETWEEN_KEYS: Duration = Duration::from_millis(25);
/// A prompt still running this long after its keys ran out is aborted so the test fails
/// instead of hanging.
const STUCK_AFTER: Duration = Duration::from_secs(3);

/// Only one prompt may own the terminal per process, so tests take turns.
pub fn prompt_lock() -> MutexGuard<'static, ()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[derive(Default)]
pub struct TerminalTrace {
    pub writes: String,
    pub starts: usize,
    pub stops: usize,
    pub aborted_stuck_prompt: bool,
}

struct Player {
    handle: JoinHandle<()>,
    stop: Sender<()>,
}

/// Terminal that feeds each started prompt the next queued list of key chunks.
#[derive(Clone)]
pub struct PromptScriptTerminal {
    trace: Arc<Mutex<TerminalTrace>>,
    scripts: Arc<Mutex<VecDeque<Vec<String>>>>,
    player: Arc<Mutex<Option<Player>>>,
    columns: u16,
    rows: u16,
}

impl PromptScriptTerminal {
    pub fn new(scripts: &[&[&str]]) -> Self {
        let scripts = scripts
            .iter()
            .map(|keys| keys.iter().map(|key| key.to_string()).collect())
            .collect();
        Self {
            trace: Arc::new(Mutex::new(TerminalTrace::default())),
            scripts: Arc::new(Mutex::new(scripts)),
            player: Arc::new(Mutex::new(None)),
            columns: 100,
            rows: 40,
        }
    }

    pub fn writes(&self) -> String {
        lock_unpoisoned(&self.trace).writes.clone()
    }

    pub fn starts(&self) -> usize {
        lock_unpoisoned(&self.trace).starts
    }

    pub fn unused_scripts(&self) -> usize {
        lock_unpoisoned(&self.scripts).len()
    }

    pub fn aborted_stuck_prompt(&self) -> bool {
        lock_unpoisoned(&self.trace).aborted_stuck_prompt
    }
}

impl Terminal for PromptScriptTerminal {
    fn start(
        &mut self,
        mut on_input: Box<dyn FnMut(String) + Send>,
        _on_resize: Box<dyn FnMut() + Send>,
    ) -> io::Result<()> {
        lock_unpoisoned(&self.trace).starts += 1;
        let keys = lock_unpoisoned(&self.scripts).pop_front().unwrap_or_default();
        let trace = Arc::clone(&self.trace);
        let (stop, stopped) = mpsc::channel();
        let handle = thread::spawn(move || {
            thread::sleep(SETTLE);
            for key in keys {
                on_input(key);
                thread::sleep(BETWEEN_KEYS);
            }
            if let Err(RecvTimeoutError::Timeout) = stopped.recv_timeout(STUCK_AFTER) {
                lock_unpoisoned(&trace).aborted_stuck_prompt = true;
                on_input(CTRL_C.to_string());
            }
        });
        *lock_unpoisoned(&self.player) = Some(Player { handle, stop });
        Ok(())
    }

    fn stop(&mut self) -> io::Result<()> {
        if let Some(player) = lock_unpoisoned(&self.player).take() {
            let _ = player.stop.send(());
            let _ = player.handle.join();
        }
        lock_unpoisoned(&self.trace).stops += 1;
        Ok(())
    }

    fn drain_input(&mut self, _max_ms: u64, _idle_ms: u64) {}

    fn write(&mut self, data: &str) {
        lock_unpoisoned(&self.trace).writes.push_str(data);
    }

    fn columns(&self) -> u16 {
        self.columns
    }

    fn rows(&self) -> u16 {
        self.rows
    }
}

pub fn app_with(
    drive: &Arc<MockDrive>,
    terminal: &PromptScriptTerminal,
    cwd: &Path,
) -> App<PromptScriptTerminal> {
    App::new(
        PromptRuntime::new(terminal.clone()),
        Arc::clone(drive) as Arc<dyn drive_service::DriveService>,
        Arc::new(ItemCache::new()),
        PromptTheme::plain(),
    )
    .with_working_dir(cwd)
}
