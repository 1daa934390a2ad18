//! Terminal trait and per-prompt session lifecycle.

/// Minimal terminal interface the prompt runtime drives.
pub trait Terminal {
    /// Start the terminal with input and resize handlers.
    ///
    /// Handlers may be invoked from any thread until [`Terminal::stop`] returns.
    fn start(
        &mut self,
        on_input: Box<dyn FnMut(String) + Send>,
        on_resize: Box<dyn FnMut() + Send>,
    ) -> std::io::Result<()>;

    /// Stop the terminal and restore state.
    fn stop(&mut self) -> std::io::Result<()>;

    /// Drain stdin before handing the terminal back to the shell.
    fn drain_input(&mut self, max_ms: u64, idle_ms: u64);

    /// Write output to the terminal.
    fn write(&mut self, data: &str);

    /// Terminal dimensions.
    fn columns(&self) -> u16;
    fn rows(&self) -> u16;
}

/// RAII session that drains input and stops the terminal when dropped.
///
/// One session spans exactly one prompt invocation.
pub struct TerminalSession<'a, T: Terminal> {
    terminal: &'a mut T,
    max_drain_ms: u64,
    idle_drain_ms: u64,
}

impl<'a, T: Terminal> TerminalSession<'a, T> {
    /// Start `terminal` and wrap it with default drain timings (max 200ms, idle 20ms).
    pub fn start(
        terminal: &'a mut T,
        on_input: Box<dyn FnMut(String) + Send>,
        on_resize: Box<dyn FnMut() + Send>,
    ) -> std::io::Result<Self> {
        terminal.start(on_input, on_resize)?;
        Ok(Self {
            terminal,
            max_drain_ms: 200,
            idle_drain_ms: 20,
        })
    }

    pub fn terminal_mut(&mut self) -> &mut T {
        self.terminal
    }

    pub fn columns(&self) -> u16 {
        self.terminal.columns()
    }
}

impl<T: Terminal> Drop for TerminalSession<'_, T> {
    fn drop(&mut self) {
        self.terminal
            .drain_input(self.max_drain_ms, self.idle_drain_ms);
        if let Err(err) = self.terminal.stop() {
            tracing::warn!(error = %err, "failed to restore terminal state");
        }
    }
}
