//! Terminal device access for request/response queries.
//!
//! [`TerminalDevice`] is the seam between the query logic and the actual
//! terminal. On unix [`StdioTerminal`] drives stdin/stdout through `libc`
//! termios calls.

use std::io;

/// A terminal that can be switched into raw mode, written to and read from.
///
/// Reads and writes take `&self` because a query writes from one thread
/// while another is blocked reading.
pub trait TerminalDevice: Sync {
    /// Snapshot of the terminal's mode, used to undo raw mode.
    type Mode: Send;

    /// Whether both the input and output sides are interactive terminals.
    fn is_terminal(&self) -> bool;

    /// Switch to raw mode and return the mode that was active before.
    fn enter_raw_mode(&self) -> io::Result<Self::Mode>;

    /// Put back a mode captured by [`enter_raw_mode`](Self::enter_raw_mode).
    fn restore_mode(&self, mode: &Self::Mode) -> io::Result<()>;

    /// Blocking read from the input side.
    fn read(&self, buf: &mut [u8]) -> io::Result<usize>;

    /// Write all of `bytes` to the output side.
    fn write_all(&self, bytes: &[u8]) -> io::Result<()>;
}

/// Holds a terminal in raw mode; restores the original mode exactly once.
///
/// Call [`restore`](Self::restore) to observe a restore failure. If the
/// guard is dropped instead (early return, panic) the mode is restored in
/// `Drop` and a failure is only logged.
pub struct RawModeGuard<'a, D: TerminalDevice + ?Sized> {
    device: &'a D,
    original: Option<D::Mode>,
}

impl<'a, D: TerminalDevice + ?Sized> RawModeGuard<'a, D> {
    /// Capture the current mode and switch `device` into raw mode.
    pub fn enter(device: &'a D) -> io::Result<Self> {
        let original = device.enter_raw_mode()?;
        Ok(Self {
            device,
            original: Some(original),
        })
    }

    /// Restore the captured mode now.
    pub fn restore(mut self) -> io::Result<()> {
        match self.original.take() {
            Some(mode) => self.device.restore_mode(&mode),
            None => Ok(()),
        }
    }
}

impl<D: TerminalDevice + ?Sized> Drop for RawModeGuard<'_, D> {
    fn drop(&mut self) {
        if let Some(mode) = self.original.take()
            && let Err(e) = self.device.restore_mode(&mode)
        {
            tracing::warn!(error = %e, "Failed to restore terminal mode");
        }
    }
}

/// The process's stdin/stdout pair.
#[cfg(unix)]
#[derive(Debug, Clone, Copy)]
pub struct StdioTerminal {
    input: std::os::unix::io::RawFd,
    output: std::os::unix::io::RawFd,
}

#[cfg(unix)]
impl StdioTerminal {
    /// Reads from fd 0 and writes to fd 1.
    pub fn new() -> Self {
        Self {
            input: libc::STDIN_FILENO,
            output: libc::STDOUT_FILENO,
        }
    }
}

#[cfg(unix)]
impl Default for StdioTerminal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
impl TerminalDevice for StdioTerminal {
    type Mode = libc::termios;

    fn is_terminal(&self) -> bool {
        unsafe { libc::isatty(self.input) == 1 && libc::isatty(self.output) == 1 }
    }

    fn enter_raw_mode(&self) -> io::Result<libc::termios> {
        let mut original: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(self.input, &mut original) } != 0 {
            return Err(io::Error::last_os_error());
        }

        // no echo, no line discipline, return as soon as one byte is in
        let mut raw = original;
        unsafe { libc::cfmakeraw(&mut raw) };
        raw.c_cc[libc::VMIN] = 1;
        raw.c_cc[libc::VTIME] = 0;

        if unsafe { libc::tcsetattr(self.input, libc::TCSANOW, &raw) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(original)
    }

    fn restore_mode(&self, mode: &libc::termios) -> io::Result<()> {
        if unsafe { libc::tcsetattr(self.input, libc::TCSANOW, mode) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            let n = unsafe { libc::read(self.input, buf.as_mut_ptr().cast(), buf.len()) };
            if n >= 0 {
                return Ok(n as usize);
            }
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::Interrupted {
                return Err(err);
            }
        }
    }

    fn write_all(&self, mut bytes: &[u8]) -> io::Result<()> {
        while !bytes.is_empty() {
            let n = unsafe { libc::write(self.output, bytes.as_ptr().cast(), bytes.len()) };
            if n < 0 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(err);
            }
            if n == 0 {
                return Err(io::ErrorKind::WriteZero.into());
            }
            bytes = &bytes[n as usize..];
        }
        Ok(())
    }
}

/// An in-memory terminal for exercising queries without a tty.
#[cfg(test)]
pub(crate) mod fake {
    use std::{
        collections::VecDeque,
        io,
        sync::{Condvar, Mutex},
        time::Duration,
    };

    use super::TerminalDevice;

    /// Upper bound on a blocked read so a broken test fails instead of hanging.
    const READ_GUARD: Duration = Duration::from_secs(5);

    #[derive(Debug, Default)]
    pub(crate) struct State {
        pub raw: bool,
        pub enters: usize,
        pub restores: usize,
        pub writes: Vec<Vec<u8>>,
        pending: VecDeque<u8>,
        eof: bool,
    }

    /// Scripted terminal behaviour.
    #[derive(Debug, Default, Clone)]
    pub(crate) struct Script {
        pub is_tty: bool,
        /// Bytes made readable as soon as the query is written.
        pub immediate_reply: Option<Vec<u8>>,
        /// Bytes made readable when the cursor position nudge is written.
        pub nudge_reply: Option<Vec<u8>>,
        /// Report end-of-file (a zero byte read) once nudged.
        pub eof_on_nudge: bool,
        pub read_error: Option<io::ErrorKind>,
        pub write_error: Option<io::ErrorKind>,
        pub raw_mode_error: Option<io::ErrorKind>,
    }

    pub(crate) struct FakeTerminal {
        script: Script,
        state: Mutex<State>,
        readable: Condvar,
    }

    impl FakeTerminal {
        pub fn new(script: Script) -> Self {
            Self {
                script,
                state: Mutex::new(State::default()),
                readable: Condvar::new(),
            }
        }

        /// A tty that only answers the cursor position nudge.
        pub fn silent() -> Self {
            Self::new(Script {
                is_tty: true,
                nudge_reply: Some(b"\x1b[12;40R".to_vec()),
                ..Script::default()
            })
        }

        pub fn with_state<T>(&self, f: impl FnOnce(&State) -> T) -> T {
            f(&self.state.lock().unwrap())
        }
    }

    impl TerminalDevice for FakeTerminal {
        type Mode = bool;

        fn is_terminal(&self) -> bool {
            self.script.is_tty
        }

        fn enter_raw_mode(&self) -> io::Result<bool> {
            if let Some(kind) = self.script.raw_mode_error {
                return Err(kind.into());
            }
            let mut state = self.state.lock().unwrap();
            let previous = state.raw;
            state.raw = true;
            state.enters += 1;
            Ok(previous)
        }

        fn restore_mode(&self, mode: &bool) -> io::Result<()> {
            let mut state = self.state.lock().unwrap();
            state.raw = *mode;
            state.restores += 1;
            Ok(())
        }

        fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
            if let Some(kind) = self.script.read_error {
                return Err(kind.into());
            }
            let state = self.state.lock().unwrap();
            let (mut state, _) = self
                .readable
                .wait_timeout_while(state, READ_GUARD, |s| s.pending.is_empty() && !s.eof)
                .unwrap();
            let n = buf.len().min(state.pending.len());
            for (slot, byte) in buf.iter_mut().zip(state.pending.drain(..n)) {
                *slot = byte;
            }
            Ok(n)
        }

        fn write_all(&self, bytes: &[u8]) -> io::Result<()> {
            if let Some(kind) = self.script.write_error {
                return Err(kind.into());
            }
            let mut state = self.state.lock().unwrap();
            state.writes.push(bytes.to_vec());
            let reply = if bytes == crate::discovery::query::CURSOR_POSITION_NUDGE {
                if self.script.eof_on_nudge {
                    state.eof = true;
                }
                self.script.nudge_reply.as_ref()
            } else {
                self.script.immediate_reply.as_ref()
            };
            if let Some(reply) = reply {
                state.pending.extend(reply.iter().copied());
            }
            self.readable.notify_all();
            Ok(())
        }
    }
}
