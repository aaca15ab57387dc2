#![forbid(unsafe_code)]

//! FrankenTUI Runtime
//!
//! This crate provides the runtime components that tie together the core,
//! render, and layout crates into a complete terminal application engine.
//!
//! # Key Components
//!
//! - [`TerminalWriter`] - Unified terminal output coordinator with inline mode support
//! - [`component`] - Component tree: lifecycle, arena storage, key/mouse dispatch
//! - [`layer`] - Z-ordered layer snapshot, hit-testing, compositing
//! - [`drag`] - Drag/resize gesture state machine (fullscreen mode only)
//! - [`scheduler`] - Frame-paced, coalesced render scheduling
//! - [`engine`] - The facade tying the above to a concrete terminal

pub mod component;
pub mod drag;
pub mod engine;
pub mod layer;
pub mod scheduler;
pub mod terminal_writer;

pub use component::{Capabilities, Component, ComponentId, ComponentTree, Output, TreeEvent};
pub use drag::{DragController, ResizeHandle};
pub use engine::{CapabilityError, Engine, EngineOptions, LifecycleError, RenderContext};
pub use layer::{Layer, LayerManager};
pub use scheduler::{FrameScheduler, FrameStats};
pub use terminal_writer::{ScreenMode, TerminalWriter, UiAnchor};
