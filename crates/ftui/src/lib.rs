#![forbid(unsafe_code)]

//! Public facade for the ftui terminal rendering engine.
//!
//! # Role in the workspace
//! This crate is the embedder-facing entry point. It re-exports the pieces of
//! `ftui-core`/`ftui-render`/`ftui-style`/`ftui-layout`/`ftui-runtime` that an
//! application assembling a terminal UI actually needs, so embedders depend
//! on one crate instead of wiring each internal crate individually.
//!
//! # What belongs here
//! - Stable public surface area (re-exports).
//! - A lightweight prelude for day-to-day use.
//! - The top-level [`Error`]/[`Result`] embedders see from fallible calls.
//!
//! # How it fits in the system
//! - Input decoding, terminal lifecycle: `ftui-core`.
//! - Cell buffer, diffing, ANSI presentation: `ftui-render`.
//! - Color/style resolution: `ftui-style`.
//! - Flex/dock/wrap layout: `ftui-layout`.
//! - Component tree, layer compositing, scheduler, engine: `ftui-runtime`
//!   (behind the `runtime` feature, on by default).

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use ftui_core::cursor::{CursorManager, CursorSaveStrategy};
pub use ftui_core::event::{
    ClipboardEvent, ClipboardSource, Event, KeyCode, KeyEvent, KeyEventKind, Modifiers,
    MouseButton, MouseEvent, MouseEventKind, PasteEvent, RawSequence,
};
pub use ftui_core::geometry::{Position, Rect, Sides, Size};
pub use ftui_core::terminal_capabilities::{ColorLevel, TerminalCapabilities};
pub use ftui_core::terminal_session::{SessionOptions, TerminalSession};

// --- Render re-exports -----------------------------------------------------

pub use ftui_render::buffer::Buffer;
pub use ftui_render::cell::{Cell, CellAttrs, PackedRgba};
pub use ftui_render::diff::BufferDiff;
pub use ftui_render::frame::Frame;
pub use ftui_render::grapheme_pool::GraphemePool;
pub use ftui_render::link_registry::LinkRegistry;
pub use ftui_render::presenter::Presenter;

// --- Layout re-exports ------------------------------------------------------

pub use ftui_layout::{Alignment, Constraint, Direction, Dock, DockEdge, Flex, Wrap};

// --- Style re-exports ------------------------------------------------------

pub use ftui_style::{Ansi16, CacheStats, Color, ColorCache, Rgb, Style};

// --- Runtime re-exports (feature-gated so a headless/wasm embedder that only
// needs the render kernel is not forced to pull in crossterm/signal-hook) --

#[cfg(feature = "runtime")]
pub use ftui_runtime::{
    Capabilities, CapabilityError, Component, ComponentId, ComponentTree, DragController, Engine,
    EngineOptions, FrameScheduler, FrameStats, Layer, LayerManager, LifecycleError, Output,
    RenderContext, ResizeHandle, ScreenMode, TerminalWriter, TreeEvent, UiAnchor,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for ftui apps.
#[derive(Debug)]
pub enum Error {
    /// I/O failure during terminal operations.
    Io(std::io::Error),
    /// Terminal or runtime error with message.
    Terminal(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Terminal(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

#[cfg(feature = "runtime")]
impl From<LifecycleError> for Error {
    fn from(err: LifecycleError) -> Self {
        Self::Terminal(err.to_string())
    }
}

#[cfg(feature = "runtime")]
impl From<CapabilityError> for Error {
    fn from(err: CapabilityError) -> Self {
        Self::Terminal(err.to_string())
    }
}

/// Standard result type for ftui APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Buffer, Cell, Color, Error, Event, Frame, KeyCode, KeyEvent, Modifiers, Rect, Result,
        Style, TerminalSession,
    };

    #[cfg(feature = "runtime")]
    pub use crate::{Component, Engine, EngineOptions, ScreenMode, TerminalWriter};

    pub use crate::{core, layout, render, style};

    #[cfg(feature = "runtime")]
    pub use crate::runtime;
}

pub use ftui_core as core;
pub use ftui_layout as layout;
pub use ftui_render as render;
#[cfg(feature = "runtime")]
pub use ftui_runtime as runtime;
pub use ftui_style as style;
