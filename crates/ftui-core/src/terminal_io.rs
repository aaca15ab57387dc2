#![forbid(unsafe_code)]

//! Terminal I/O state machine (C3).
//!
//! Wraps [`TerminalSession`] with the acquire/render/release lifecycle the
//! rest of the engine drives: `unacquired` → `inline` | `fullscreen` →
//! `closed`. This module owns *when* the terminal is touched; the byte-level
//! mode toggling and panic-safe cleanup live in [`terminal_session`].
//!
//! # States
//!
//! - `Unacquired`: no terminal resource held yet.
//! - `Inline`: renders a growing block of lines in place, scrollback intact.
//! - `Fullscreen`: alternate screen buffer, whole-grid diff-based redraw.
//! - `Closed`: terminal released; any further call is a no-op.
//!
//! # Degraded mode
//!
//! If the output stream is not a TTY, `initialize` still succeeds but marks
//! the session degraded: writes pass through un-decorated and cursor/mode
//! control sequences are suppressed, matching spec failure-mode behavior for
//! piped output. Input decoding in degraded mode observes only EOF.

use std::io::{self, Write};

use crate::terminal_capabilities::TerminalCapabilities;
use crate::terminal_session::{SessionOptions, TerminalSession};

/// Cursor save (DECSC): `ESC 7`.
const CURSOR_SAVE: &[u8] = b"\x1b7";
/// Cursor restore (DECRC): `ESC 8`.
const CURSOR_RESTORE: &[u8] = b"\x1b8";

/// Which rendering mode a terminal session was initialized into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Renders a block of lines in place, preserving scrollback.
    Inline,
    /// Takes over the alternate screen buffer for whole-grid redraws.
    Fullscreen,
}

/// Lifecycle state of a [`TerminalIo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Unacquired,
    Inline,
    Fullscreen,
    Closed,
}

/// Errors raised by the terminal I/O manager.
#[derive(Debug)]
pub enum CapabilityError {
    /// `initialize(Fullscreen)` was requested but the output is not a TTY.
    NotATty,
    /// The underlying terminal session could not be acquired.
    Io(io::Error),
}

impl std::fmt::Display for CapabilityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotATty => write!(f, "fullscreen mode requires a TTY output"),
            Self::Io(err) => write!(f, "failed to acquire terminal: {err}"),
        }
    }
}

impl std::error::Error for CapabilityError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotATty => None,
            Self::Io(err) => Some(err),
        }
    }
}

impl From<io::Error> for CapabilityError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

/// Terminal I/O manager: acquires the terminal, drives inline or fullscreen
/// rendering, and guarantees release on every exit path.
pub struct TerminalIo {
    state: State,
    mode: Option<RenderMode>,
    capabilities: TerminalCapabilities,
    degraded: bool,
    session: Option<TerminalSession>,
    /// Number of lines the last inline block occupied, so the next render
    /// (or `end_render`) knows how far to move up before erasing.
    inline_line_count: u16,
}

impl TerminalIo {
    /// Detect capabilities without acquiring anything.
    ///
    /// `is_tty` should reflect whether the process's stdout is connected to
    /// a real terminal (e.g. via `crossterm::tty::IsTty`).
    #[must_use]
    pub fn detect_capabilities(is_tty: bool) -> TerminalCapabilities {
        TerminalCapabilities::detect(is_tty)
    }

    /// Acquire the terminal and enter `mode`.
    ///
    /// Fullscreen on a non-TTY is a [`CapabilityError::NotATty`]; callers may
    /// fall back to inline. Inline mode on a non-TTY succeeds in degraded
    /// mode: writes pass through but cursor/mode sequences are suppressed.
    pub fn initialize(mode: RenderMode, is_tty: bool) -> Result<Self, CapabilityError> {
        let capabilities = TerminalCapabilities::detect(is_tty);

        if !is_tty {
            if mode == RenderMode::Fullscreen {
                return Err(CapabilityError::NotATty);
            }
            return Ok(Self {
                state: State::Inline,
                mode: Some(RenderMode::Inline),
                capabilities,
                degraded: true,
                session: None,
                inline_line_count: 0,
            });
        }

        let options = match mode {
            RenderMode::Fullscreen => SessionOptions {
                alternate_screen: true,
                mouse_capture: true,
                bracketed_paste: true,
                focus_events: true,
                kitty_keyboard: false,
            },
            RenderMode::Inline => SessionOptions {
                alternate_screen: false,
                mouse_capture: true,
                bracketed_paste: true,
                focus_events: true,
                kitty_keyboard: false,
            },
        };

        let session = TerminalSession::new(options)?;

        if mode == RenderMode::Inline {
            let mut stdout = io::stdout();
            stdout.write_all(CURSOR_SAVE)?;
            stdout.flush()?;
        }

        Ok(Self {
            state: match mode {
                RenderMode::Inline => State::Inline,
                RenderMode::Fullscreen => State::Fullscreen,
            },
            mode: Some(mode),
            capabilities,
            degraded: false,
            session: Some(session),
            inline_line_count: 0,
        })
    }

    /// Capabilities detected at `initialize` time.
    #[must_use]
    pub const fn capabilities(&self) -> &TerminalCapabilities {
        &self.capabilities
    }

    /// Whether output is running degraded (not a TTY).
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// The mode this session was initialized into, if any.
    #[must_use]
    pub const fn mode(&self) -> Option<RenderMode> {
        self.mode
    }

    /// Render a block of lines in place (inline mode).
    ///
    /// Moves up over the previously-rendered block (if any), erases it, and
    /// writes the new lines. A no-op in degraded mode beyond writing the raw
    /// lines (no cursor control is emitted).
    ///
    /// # Errors
    ///
    /// Returns an error if not in `Inline` state, or if writing fails.
    pub fn render_inline<W: Write>(&mut self, writer: &mut W, lines: &[String]) -> io::Result<()> {
        if self.state != State::Inline {
            return Err(io::Error::other("render_inline called outside inline mode"));
        }

        if self.degraded {
            for line in lines {
                writer.write_all(line.as_bytes())?;
                writer.write_all(b"\n")?;
            }
            return Ok(());
        }

        writer.write_all(CURSOR_RESTORE)?;
        if self.inline_line_count > 0 {
            write!(writer, "\x1b[{}A", self.inline_line_count)?;
        }
        writer.write_all(b"\x1b[J")?;

        for line in lines {
            writer.write_all(line.as_bytes())?;
            writer.write_all(b"\r\n")?;
        }
        writer.flush()?;

        self.inline_line_count = lines.len() as u16;
        Ok(())
    }

    /// End the current render: clears the last inline block, or leaves
    /// fullscreen content in place for final cleanup.
    pub fn end_render<W: Write>(&mut self, writer: &mut W) -> io::Result<()> {
        match self.state {
            State::Inline if !self.degraded => {
                writer.write_all(CURSOR_RESTORE)?;
                if self.inline_line_count > 0 {
                    write!(writer, "\x1b[{}A", self.inline_line_count)?;
                }
                writer.write_all(b"\x1b[J")?;
                writer.flush()?;
                self.inline_line_count = 0;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Release the terminal: fullscreen → closed (restore main buffer, show
    /// cursor); inline → closed (restore cursor row, show cursor).
    ///
    /// Idempotent: a second call is a no-op.
    pub fn cleanup(&mut self) {
        if self.state == State::Closed {
            return;
        }
        self.session = None; // Drop runs TerminalSession's own cleanup.
        self.state = State::Closed;
    }
}

impl Drop for TerminalIo {
    fn drop(&mut self) {
        self.cleanup();
    }
}
