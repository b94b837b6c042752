//! Scoped terminal connection.

use std::ops::Deref;

use tracing::info;

use crate::providers::Terminal;

/// Owns an open terminal and shuts it down when dropped.
///
/// The shutdown runs on every exit path: normal scope end, early `?`
/// returns, and panic unwinding. [`Session::close`] does the same thing
/// explicitly.
pub struct Session<T: Terminal> {
    terminal: T,
}

impl<T: Terminal> Session<T> {
    pub fn open(terminal: T) -> Self {
        let info = terminal.info();
        info!(
            path = %info.path.display(),
            company = info.company.as_deref().unwrap_or("unknown"),
            build = ?info.build,
            connected = info.connected,
            "terminal session opened"
        );
        Self { terminal }
    }

    /// End the session now instead of at scope exit.
    pub fn close(self) {}
}

impl<T: Terminal> Deref for Session<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.terminal
    }
}

impl<T: Terminal> Drop for Session<T> {
    fn drop(&mut self) {
        self.terminal.shutdown();
        info!("terminal session closed");
    }
}
