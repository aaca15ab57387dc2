#![forbid(unsafe_code)]

//! Terminal capability detection.
//!
//! Detects the color level and a handful of feature flags the rest of the
//! engine needs at [`terminal_session`](crate::terminal_session) /
//! `terminal_io` initialize time, purely from environment variables. There
//! is no runtime probing (no device-attribute queries): detection must be
//! synchronous and side-effect free so it can run before the terminal has
//! been put into raw mode.
//!
//! # Detection rules
//!
//! Color level, in order:
//! 1. `NO_COLOR` or `NODE_DISABLE_COLORS` set → [`ColorLevel::Mono`], final.
//! 2. `TERM=dumb` or empty (and not Windows Terminal) → [`ColorLevel::Mono`].
//! 3. `COLORTERM` contains `truecolor`/`24bit`, or `TERM` contains `kitty`,
//!    or `TERM_PROGRAM` is a known truecolor terminal (iTerm.app, WezTerm,
//!    Alacritty, Ghostty, Rio) → [`ColorLevel::TrueColor`].
//! 4. `TERM` contains `256color` → [`ColorLevel::Ansi256`].
//! 5. Otherwise, any non-dumb `TERM` or a non-empty `COLORTERM` →
//!    [`ColorLevel::Ansi16`].
//! 6. Unknown → [`ColorLevel::Mono`].
//!
//! `FORCE_COLOR` (`1`, `2`, `3`, or `true`) then raises (never lowers) the
//! level computed above; it is ignored once `NO_COLOR`/`NODE_DISABLE_COLORS`
//! has forced [`ColorLevel::Mono`].
//!
//! # Invariants
//!
//! 1. Detection is deterministic: the same environment always produces the
//!    same [`TerminalCapabilities`].
//! 2. Capabilities never upgrade mid-session; `detect()` is called once at
//!    initialize and the result is threaded through explicitly.
//! 3. When in doubt, capabilities are disabled — false negatives (missing a
//!    feature that would have worked) are preferred over false positives.

use std::env;

/// Terminal programs known to render 24-bit color correctly.
const TRUECOLOR_TERM_PROGRAMS: &[&str] =
    &["iTerm.app", "WezTerm", "Alacritty", "Ghostty", "Rio"];

/// Color rendering levels, ordered from least to most capable.
///
/// `Ord` reflects capability: `Mono < Ansi16 < Ansi256 < TrueColor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ColorLevel {
    /// No color support; attributes only.
    Mono = 0,
    /// 16-color ANSI palette.
    Ansi16 = 1,
    /// 256-color indexed palette.
    Ansi256 = 2,
    /// 24-bit RGB.
    TrueColor = 3,
}

impl ColorLevel {
    #[must_use]
    fn from_force_color(value: &str) -> Option<Self> {
        match value {
            "1" => Some(Self::Ansi16),
            "2" => Some(Self::Ansi256),
            "3" | "true" => Some(Self::TrueColor),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct DetectInputs {
    no_color: bool,
    node_disable_colors: bool,
    force_color: Option<String>,
    term: String,
    term_program: String,
    colorterm: String,
    wt_session: bool,
    in_tmux: bool,
    in_screen: bool,
}

impl DetectInputs {
    fn from_env() -> Self {
        Self {
            no_color: env::var("NO_COLOR").is_ok(),
            node_disable_colors: env::var("NODE_DISABLE_COLORS").is_ok(),
            force_color: env::var("FORCE_COLOR").ok(),
            term: env::var("TERM").unwrap_or_default(),
            term_program: env::var("TERM_PROGRAM").unwrap_or_default(),
            colorterm: env::var("COLORTERM").unwrap_or_default(),
            wt_session: env::var("WT_SESSION").is_ok(),
            in_tmux: env::var("TMUX").is_ok(),
            in_screen: env::var("STY").is_ok(),
        }
    }
}

/// Detected (or overridden) terminal capabilities.
///
/// Produced once at initialize time via [`TerminalCapabilities::detect`] and
/// passed explicitly through the engine — there is no process-wide global.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalCapabilities {
    /// Color rendering level, used by the presenter to downgrade `Color`
    /// values at flush time.
    pub color_level: ColorLevel,
    /// Whether the host can be trusted to render Unicode box-drawing and
    /// wide glyphs; `false` downgrades to ASCII substitutes.
    pub unicode_symbols: bool,
    /// Whether output is attached to a real TTY. `false` puts the terminal
    /// I/O manager into degraded mode.
    pub is_tty: bool,
    /// True 24-bit color support, independent of `color_level` (presenter
    /// downgrade math uses `color_level`; this is a convenience check used
    /// by inline-mode strategy selection).
    pub true_color: bool,
    /// Scroll region (DECSTBM) support, used by inline mode to anchor a UI
    /// region while logs scroll above it.
    pub scroll_region: bool,
    /// Synchronized output (DEC private mode 2026) support; reduces flicker
    /// during multi-write frame presents.
    pub sync_output: bool,
    /// Running inside `tmux`.
    pub in_tmux: bool,
    /// Running inside GNU `screen`.
    pub in_screen: bool,
}

impl TerminalCapabilities {
    /// Whether the host is any known terminal multiplexer.
    ///
    /// Multiplexers frequently mishandle scroll-region and synchronized
    /// output sequences, so inline mode falls back to the most portable
    /// strategy whenever this is true (see
    /// [`inline_mode::InlineStrategy::select`](crate::inline_mode::InlineStrategy::select)).
    #[must_use]
    pub const fn in_any_mux(&self) -> bool {
        self.in_tmux || self.in_screen
    }
}

impl Default for TerminalCapabilities {
    fn default() -> Self {
        Self::basic()
    }
}

impl TerminalCapabilities {
    /// A conservative fallback: no color, ASCII-only, not a TTY.
    ///
    /// Safe to use whenever detection cannot run (e.g. before a stream is
    /// known to be a terminal at all).
    #[must_use]
    pub const fn basic() -> Self {
        Self {
            color_level: ColorLevel::Mono,
            unicode_symbols: false,
            is_tty: false,
            true_color: false,
            scroll_region: false,
            sync_output: false,
            in_tmux: false,
            in_screen: false,
        }
    }

    /// Detect capabilities from the process environment.
    ///
    /// `is_tty` must be supplied by the caller (this module has no I/O
    /// access of its own); everything else comes from environment hints.
    #[must_use]
    pub fn detect(is_tty: bool) -> Self {
        Self::detect_from_inputs(&DetectInputs::from_env(), is_tty)
    }

    fn detect_from_inputs(env: &DetectInputs, is_tty: bool) -> Self {
        let color_level = Self::detect_color_level(env);
        let unicode_symbols = Self::detect_unicode_symbols(env);
        // Scroll regions (DECSTBM) are near-universal on anything that
        // isn't a dumb pipe; synchronized output is newer and only assumed
        // on terminals we already trust for true color.
        let scroll_region = is_tty && color_level > ColorLevel::Mono;
        let sync_output = is_tty && color_level == ColorLevel::TrueColor;
        Self {
            color_level,
            unicode_symbols,
            is_tty,
            true_color: color_level == ColorLevel::TrueColor,
            scroll_region,
            sync_output,
            in_tmux: env.in_tmux,
            in_screen: env.in_screen,
        }
    }

    fn detect_color_level(env: &DetectInputs) -> ColorLevel {
        if env.no_color || env.node_disable_colors {
            return ColorLevel::Mono;
        }

        let term = env.term.as_str();
        let term_program = env.term_program.as_str();
        let colorterm = env.colorterm.as_str();
        let is_dumb = term == "dumb" || (term.is_empty() && !env.wt_session);

        let base = if is_dumb {
            ColorLevel::Mono
        } else if colorterm.contains("truecolor")
            || colorterm.contains("24bit")
            || term.contains("kitty")
            || TRUECOLOR_TERM_PROGRAMS.contains(&term_program)
        {
            ColorLevel::TrueColor
        } else if term.contains("256color") || term.contains("256") {
            ColorLevel::Ansi256
        } else if !term.is_empty() || !colorterm.is_empty() || env.wt_session {
            ColorLevel::Ansi16
        } else {
            ColorLevel::Mono
        };

        match env.force_color.as_deref().and_then(ColorLevel::from_force_color) {
            Some(forced) if forced > base => forced,
            _ => base,
        }
    }

    fn detect_unicode_symbols(env: &DetectInputs) -> bool {
        let is_windows_host = cfg!(windows);
        if !is_windows_host {
            return true;
        }
        env.wt_session
            || env.term_program == "vscode"
            || env.term_program.contains("JetBrains")
    }
}
