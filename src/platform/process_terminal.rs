//! Raw-mode terminal on the process's stdin/stdout.
//!
//! One `start`/`stop` pair brackets one prompt: raw mode, the stdin reader, and the SIGWINCH
//! listener live exactly that long.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::config::EnvConfig;
use crate::core::terminal::Terminal;
#[cfg(unix)]
use crate::platform::stdin_buffer::StdinBuffer;

const READ_WAIT_MS: i32 = 50;
const FALLBACK_SIZE: (u16, u16) = (80, 24);

type InputFn = Box<dyn FnMut(String) + Send>;
type ResizeFn = Box<dyn FnMut() + Send>;

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Thin wrappers over the libc calls the terminal needs.
#[cfg(unix)]
mod sys {
    use std::io;

    use libc::c_int;

    pub const STDIN: c_int = libc::STDIN_FILENO;
    pub const STDOUT: c_int = libc::STDOUT_FILENO;

    fn check(result: c_int) -> io::Result<()> {
        if result == 0 {
            Ok(())
        } else {
            Err(io::Error::last_os_error())
        }
    }

    /// Returns the ready events, or 0 on timeout.
    pub fn poll(fd: c_int, events: libc::c_short, timeout_ms: i32) -> io::Result<libc::c_short> {
        let mut entry = libc::pollfd {
            fd,
            events,
            revents: 0,
        };
        let ready = unsafe { libc::poll(&mut entry, 1, timeout_ms) };
        match ready {
            n if n < 0 => Err(io::Error::last_os_error()),
            0 => Ok(0),
            _ => Ok(entry.revents),
        }
    }

    pub fn write(fd: c_int, buf: &[u8]) -> io::Result<usize> {
        let written = unsafe { libc::write(fd, buf.as_ptr().cast(), buf.len()) };
        usize::try_from(written).map_err(|_| io::Error::last_os_error())
    }

    pub fn read(fd: c_int, buf: &mut [u8]) -> io::Result<usize> {
        let read = unsafe { libc::read(fd, buf.as_mut_ptr().cast(), buf.len()) };
        usize::try_from(read).map_err(|_| io::Error::last_os_error())
    }

    pub fn window_size(fd: c_int) -> Option<(u16, u16)> {
        let mut size = unsafe { std::mem::zeroed::<libc::winsize>() };
        let ok = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut size) } == 0;
        (ok && size.ws_col > 0 && size.ws_row > 0).then_some((size.ws_col, size.ws_row))
    }

    pub fn termios(fd: c_int) -> io::Result<libc::termios> {
        let mut termios = unsafe { std::mem::zeroed::<libc::termios>() };
        check(unsafe { libc::tcgetattr(fd, &mut termios) })?;
        Ok(termios)
    }

    pub fn set_termios(fd: c_int, termios: &libc::termios) -> io::Result<()> {
        check(unsafe { libc::tcsetattr(fd, libc::TCSANOW, termios) })
    }

    pub fn make_raw(termios: &mut libc::termios) {
        unsafe { libc::cfmakeraw(termios) };
        // "\n" must still return the carriage.
        termios.c_oflag |= libc::OPOST;
    }

    pub fn discard_pending_input(fd: c_int) {
        let _ = unsafe { libc::tcflush(fd, libc::TCIFLUSH) };
    }
}

/// Write all of `bytes`, retrying interrupted writes and waiting out would-block.
fn write_fully<W, P>(bytes: &[u8], mut write_some: W, mut wait_writable: P) -> io::Result<()>
where
    W: FnMut(&[u8]) -> io::Result<usize>,
    P: FnMut() -> io::Result<()>,
{
    let mut rest = bytes;
    while !rest.is_empty() {
        match write_some(rest) {
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "terminal accepted no bytes",
                ))
            }
            Ok(count) => rest = &rest[count.min(rest.len())..],
            Err(err) => match err.kind() {
                io::ErrorKind::Interrupted => {}
                io::ErrorKind::WouldBlock => wait_writable()?,
                _ => return Err(err),
            },
        }
    }
    Ok(())
}

#[cfg(unix)]
fn wait_stdout_writable() -> io::Result<()> {
    loop {
        match sys::poll(sys::STDOUT, libc::POLLOUT, -1) {
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
            Ok(0) => continue,
            Ok(events) if events & libc::POLLOUT != 0 => return Ok(()),
            Ok(events) => {
                return Err(io::Error::other(format!("stdout not writable (revents=0x{events:x})")))
            }
        }
    }
}

/// Callbacks installed for the current prompt.
#[derive(Default)]
struct Handlers {
    input: Mutex<Option<InputFn>>,
    resize: Mutex<Option<ResizeFn>>,
}

impl Handlers {
    fn install(&self, input: InputFn, resize: ResizeFn) {
        *lock_unpoisoned(&self.input) = Some(input);
        *lock_unpoisoned(&self.resize) = Some(resize);
    }

    fn clear(&self) {
        *lock_unpoisoned(&self.input) = None;
        *lock_unpoisoned(&self.resize) = None;
    }

    fn deliver(&self, events: impl IntoIterator<Item = String>) {
        if let Some(handler) = lock_unpoisoned(&self.input).as_mut() {
            events.into_iter().for_each(|event| handler(event));
        }
    }

    fn resized(&self) {
        if let Some(handler) = lock_unpoisoned(&self.resize).as_mut() {
            handler();
        }
    }
}

/// Shared state between the stdin reader and the owning terminal.
struct ReaderState {
    epoch: Instant,
    stop: AtomicBool,
    draining: AtomicBool,
    last_input_ms: AtomicU64,
}

impl ReaderState {
    fn new() -> Self {
        Self {
            epoch: Instant::now(),
            stop: AtomicBool::new(false),
            draining: AtomicBool::new(false),
            last_input_ms: AtomicU64::new(0),
        }
    }

    fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    fn touch(&self) {
        self.last_input_ms.store(self.elapsed_ms(), Ordering::SeqCst);
    }

    fn idle_for(&self) -> Duration {
        let last = self.last_input_ms.load(Ordering::SeqCst);
        Duration::from_millis(self.elapsed_ms().saturating_sub(last))
    }

    fn reset(&self) {
        self.stop.store(false, Ordering::SeqCst);
        self.draining.store(false, Ordering::SeqCst);
        self.touch();
    }
}

/// Appends every write to a file; disabled after the first failure.
struct WriteLog {
    path: Option<PathBuf>,
}

impl WriteLog {
    fn record(&mut self, data: &str) {
        let Some(path) = self.path.as_ref() else {
            return;
        };
        let appended = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| file.write_all(data.as_bytes()));
        if let Err(err) = appended {
            tracing::warn!(path = %path.display(), error = %err, "terminal write log disabled");
            self.path = None;
        }
    }
}

pub struct ProcessTerminal {
    handlers: Arc<Handlers>,
    reader: Arc<ReaderState>,
    reader_thread: Option<JoinHandle<()>>,
    #[cfg(unix)]
    saved_termios: Option<libc::termios>,
    #[cfg(unix)]
    resize_listener: Option<(signal_hook::iterator::Handle, JoinHandle<()>)>,
    write_log: WriteLog,
}

impl ProcessTerminal {
    pub fn new() -> Self {
        Self::from_config(&EnvConfig::from_env())
    }

    pub fn from_config(config: &EnvConfig) -> Self {
        Self {
            handlers: Arc::default(),
            reader: Arc::new(ReaderState::new()),
            reader_thread: None,
            #[cfg(unix)]
            saved_termios: None,
            #[cfg(unix)]
            resize_listener: None,
            write_log: WriteLog {
                path: config.write_log.as_ref().map(PathBuf::from),
            },
        }
    }

    fn stop_reader(&mut self) {
        self.reader.stop.store(true, Ordering::SeqCst);
        if let Some(thread) = self.reader_thread.take() {
            let _ = thread.join();
        }
    }
}

impl Default for ProcessTerminal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
impl ProcessTerminal {
    fn enter_raw_mode(&mut self) -> io::Result<()> {
        let saved = match self.saved_termios {
            Some(saved) => saved,
            None => *self.saved_termios.insert(sys::termios(sys::STDIN)?),
        };
        let mut raw = saved;
        sys::make_raw(&mut raw);
        sys::set_termios(sys::STDIN, &raw)
    }

    fn leave_raw_mode(&self) -> io::Result<()> {
        self.saved_termios
            .as_ref()
            .map_or(Ok(()), |saved| sys::set_termios(sys::STDIN, saved))
    }

    fn spawn_reader(&mut self) -> io::Result<()> {
        let handlers = Arc::clone(&self.handlers);
        let state = Arc::clone(&self.reader);
        let thread = thread::Builder::new()
            .name("prompt-stdin".to_string())
            .spawn(move || read_stdin(&state, &handlers))?;
        self.reader_thread = Some(thread);
        Ok(())
    }

    fn spawn_resize_listener(&mut self) -> io::Result<()> {
        let mut signals = signal_hook::iterator::Signals::new([libc::SIGWINCH])?;
        let handle = signals.handle();
        let handlers = Arc::clone(&self.handlers);
        let thread = thread::Builder::new()
            .name("prompt-resize".to_string())
            .spawn(move || signals.forever().for_each(|_| handlers.resized()))?;
        self.resize_listener = Some((handle, thread));
        Ok(())
    }

    fn stop_resize_listener(&mut self) {
        if let Some((handle, thread)) = self.resize_listener.take() {
            handle.close();
            let _ = thread.join();
        }
    }

    fn teardown(&mut self) -> io::Result<()> {
        self.stop_reader();
        self.stop_resize_listener();
        self.handlers.clear();
        self.leave_raw_mode()
    }
}

#[cfg(unix)]
fn read_stdin(state: &ReaderState, handlers: &Handlers) {
    let mut chunk = [0u8; 4096];
    let mut pending = StdinBuffer::default();
    while !state.stop.load(Ordering::SeqCst) {
        let wait_ms = pending.next_timeout(Instant::now()).map_or(READ_WAIT_MS, |timeout| {
            i32::try_from(timeout.as_millis()).unwrap_or(READ_WAIT_MS).min(READ_WAIT_MS)
        });
        let readable = matches!(
            sys::poll(sys::STDIN, libc::POLLIN, wait_ms),
            Ok(events) if events & libc::POLLIN != 0
        );
        let events = if readable {
            match sys::read(sys::STDIN, &mut chunk) {
                Ok(len) if len > 0 => {
                    state.touch();
                    pending.push(&chunk[..len], Instant::now())
                }
                _ => continue,
            }
        } else {
            pending.flush_due(Instant::now())
        };
        if !state.draining.load(Ordering::SeqCst) {
            handlers.deliver(events.into_iter().map(|event| event.into_wire()));
        }
    }
}

#[cfg(unix)]
impl Terminal for ProcessTerminal {
    fn start(&mut self, on_input: InputFn, on_resize: ResizeFn) -> io::Result<()> {
        self.handlers.install(on_input, on_resize);
        self.reader.reset();
        let started = self
            .enter_raw_mode()
            .and_then(|()| self.spawn_resize_listener())
            .and_then(|()| self.spawn_reader());
        if let Err(err) = started {
            let _ = self.teardown();
            return Err(err);
        }
        Ok(())
    }

    fn stop(&mut self) -> io::Result<()> {
        self.stop_reader();
        self.stop_resize_listener();
        self.handlers.clear();
        // Keystrokes typed after the prompt ended stay out of the shell.
        sys::discard_pending_input(sys::STDIN);
        self.leave_raw_mode()
    }

    fn drain_input(&mut self, max_ms: u64, idle_ms: u64) {
        self.reader.draining.store(true, Ordering::SeqCst);
        self.reader.touch();
        let deadline = Instant::now() + Duration::from_millis(max_ms);
        let idle = Duration::from_millis(idle_ms);
        while let Some(left) = deadline.checked_duration_since(Instant::now()) {
            if left.is_zero() || self.reader.idle_for() >= idle {
                break;
            }
            thread::sleep(idle.min(left).max(Duration::from_millis(1)));
        }
        self.reader.draining.store(false, Ordering::SeqCst);
    }

    fn write(&mut self, data: &str) {
        if data.is_empty() {
            return;
        }
        let written = write_fully(
            data.as_bytes(),
            |buf| sys::write(sys::STDOUT, buf),
            wait_stdout_writable,
        );
        if let Err(err) = written {
            tracing::error!(error = %err, "terminal write failed");
        }
        self.write_log.record(data);
    }

    fn columns(&self) -> u16 {
        sys::window_size(sys::STDOUT).unwrap_or(FALLBACK_SIZE).0
    }

    fn rows(&self) -> u16 {
        sys::window_size(sys::STDOUT).unwrap_or(FALLBACK_SIZE).1
    }
}

#[cfg(not(unix))]
impl Terminal for ProcessTerminal {
    fn start(&mut self, _on_input: InputFn, _on_resize: ResizeFn) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "interactive prompts need a Unix terminal",
        ))
    }

    fn stop(&mut self) -> io::Result<()> {
        self.stop_reader();
        self.handlers.clear();
        Ok(())
    }

    fn drain_input(&mut self, _max_ms: u64, _idle_ms: u64) {}

    fn write(&mut self, data: &str) {
        self.write_log.record(data);
    }

    fn columns(&self) -> u16 {
        FALLBACK_SIZE.0
    }

    fn rows(&self) -> u16 {
        FALLBACK_SIZE.1
    }
}
