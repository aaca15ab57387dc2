#![forbid(unsafe_code)]

//! The engine facade: ties the component tree, layer manager, drag
//! controller, and frame scheduler to a concrete terminal (or headless
//! writer), and drives the `layout → composite → diff → flush` pipeline.
//!
//! `await-input` and `await-frame` are the only suspension points (per the
//! engine's design notes on cooperative scheduling): [`Engine::run_once`]
//! is exactly one iteration of "wait for either the next input or the next
//! frame tick, whichever comes first, then act." Nothing inside the engine
//! spawns a thread or blocks indefinitely; callers own the loop and decide
//! when to stop.

use std::fmt;
use std::io::{self, Write};
use std::time::Instant;

use ftui_core::event::Event;
use ftui_core::geometry::Rect;
use ftui_core::terminal_capabilities::TerminalCapabilities;
use ftui_core::terminal_session::{SessionOptions, TerminalSession};
use ftui_render::buffer::Buffer;

use crate::component::{Capabilities, Component, ComponentId, ComponentTree};
use crate::drag::DragController;
use crate::layer::LayerManager;
use crate::scheduler::{FrameScheduler, FrameStats};
use crate::terminal_writer::{ScreenMode, TerminalWriter, UiAnchor};

/// Errors arising from the component tree's mount/unmount contract, or from
/// the engine's own start/stop contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleError {
    /// Attempted to mount a root when one already exists, or to re-mount an
    /// id that is already live.
    AlreadyMounted(ComponentId),
    /// Referenced a component id that isn't currently mounted.
    NotMounted(ComponentId),
    /// Called `start` while the engine was already running.
    AlreadyRunning,
    /// Called an operation that requires `start` to have run first.
    NotRunning,
}

impl fmt::Display for LifecycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyMounted(id) => write!(f, "component {id} is already mounted"),
            Self::NotMounted(id) => write!(f, "component {id} is not mounted"),
            Self::AlreadyRunning => write!(f, "engine is already running"),
            Self::NotRunning => write!(f, "engine has not been started"),
        }
    }
}

impl std::error::Error for LifecycleError {}

/// Errors from acquiring or configuring the terminal at engine creation.
#[derive(Debug)]
pub enum CapabilityError {
    /// The requested screen mode needs a real terminal session, but
    /// acquiring one (raw mode, alternate screen, etc.) failed.
    SessionUnavailable(io::Error),
}

impl fmt::Display for CapabilityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SessionUnavailable(err) => write!(f, "terminal session unavailable: {err}"),
        }
    }
}

impl std::error::Error for CapabilityError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::SessionUnavailable(err) => Some(err),
        }
    }
}

impl From<io::Error> for CapabilityError {
    fn from(err: io::Error) -> Self {
        Self::SessionUnavailable(err)
    }
}

/// Configuration accepted by [`create_engine`].
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Target composite rate; see [`FrameScheduler`].
    pub target_fps: u32,
    /// Inline vs. alternate-screen rendering.
    pub screen_mode: ScreenMode,
    /// Where the UI region anchors in inline mode.
    pub ui_anchor: UiAnchor,
    /// Enable mouse capture (clicks, drags, scroll) when acquiring a real
    /// terminal session. Ignored for headless/non-tty streams.
    pub mouse_capture: bool,
    /// Enable bracketed paste mode.
    pub bracketed_paste: bool,
    /// Enable terminal focus-in/focus-out events.
    pub focus_events: bool,
    /// Enable the Kitty keyboard protocol, when supported.
    pub kitty_keyboard: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            target_fps: 60,
            screen_mode: ScreenMode::AltScreen,
            ui_anchor: UiAnchor::Bottom,
            mouse_capture: true,
            bracketed_paste: true,
            focus_events: false,
            kitty_keyboard: false,
        }
    }
}

/// Read-only context handed to components at mount time.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext {
    /// Detected (or assumed) terminal capabilities.
    pub capabilities: TerminalCapabilities,
    /// Whether the engine is running in inline mode. Components that
    /// declare `draggable`/`resizable` should treat those capabilities as
    /// inert while this is `true` (see the drag controller).
    pub inline: bool,
}

impl RenderContext {
    /// A context with no real terminal behind it — used for unit tests and
    /// for `TerminalCapabilities::basic()` fallbacks on non-tty streams.
    #[must_use]
    pub const fn headless() -> Self {
        Self {
            capabilities: TerminalCapabilities::basic(),
            inline: false,
        }
    }
}

/// Ties the component tree, layer manager, drag controller, and frame
/// scheduler to a concrete output stream.
///
/// `W` is the raw byte sink (typically `Stdout`, or an in-memory `Vec<u8>`
/// in tests); `TerminalSession` (when present) separately owns raw-mode,
/// alternate-screen, and signal-cleanup for the process's stdin/stdout.
pub struct Engine<W: Write> {
    tree: ComponentTree,
    layers: LayerManager,
    writer: TerminalWriter<W>,
    session: Option<TerminalSession>,
    scheduler: FrameScheduler,
    drag: DragController,
    context: RenderContext,
    running: bool,
}

impl<W: Write> Engine<W> {
    /// Create an engine bound to `stream`, acquiring a real terminal
    /// session (raw mode, alternate screen, mouse/paste/focus modes per
    /// `options`) when `is_tty` is `true`. Headless callers (tests, or
    /// output piped to a file) pass `is_tty = false` and get a fully
    /// functional engine with no terminal-lifecycle side effects.
    pub fn create_engine(
        stream: W,
        is_tty: bool,
        options: EngineOptions,
    ) -> Result<Self, CapabilityError> {
        let capabilities = if is_tty {
            TerminalCapabilities::detect(true)
        } else {
            TerminalCapabilities::basic()
        };

        let session = if is_tty {
            let session_options = SessionOptions {
                alternate_screen: matches!(options.screen_mode, ScreenMode::AltScreen),
                mouse_capture: options.mouse_capture,
                bracketed_paste: options.bracketed_paste,
                focus_events: options.focus_events,
                kitty_keyboard: options.kitty_keyboard,
            };
            Some(TerminalSession::new(session_options)?)
        } else {
            None
        };

        let inline = !matches!(options.screen_mode, ScreenMode::AltScreen);
        let mut writer = TerminalWriter::new(stream, options.screen_mode, options.ui_anchor, capabilities);
        if let Some(session) = &session {
            if let Ok((width, height)) = session.size() {
                writer.set_size(width, height);
            }
        }

        Ok(Self {
            tree: ComponentTree::new(),
            layers: LayerManager::default(),
            writer,
            session,
            scheduler: FrameScheduler::new(options.target_fps),
            drag: DragController::new(),
            context: RenderContext { capabilities, inline },
            running: false,
        })
    }

    /// Mount `root` and arm the scheduler for an initial render. Fails if
    /// the engine is already running.
    pub fn start(&mut self, root: Box<dyn Component>) -> Result<ComponentId, LifecycleError> {
        if self.running {
            return Err(LifecycleError::AlreadyRunning);
        }
        let id = self
            .tree
            .mount_root(root, Capabilities::default(), &self.context)?;
        self.tree
            .set_bounds(id, Rect::new(0, 0, self.writer.width(), self.writer.height()));
        self.running = true;
        self.scheduler.schedule();
        Ok(id)
    }

    /// Mount a component as a child of `parent`, with the given capability
    /// flags and local z-index.
    pub fn add_child(
        &mut self,
        parent: ComponentId,
        component: Box<dyn Component>,
        z: i32,
        caps: Capabilities,
    ) -> Result<ComponentId, LifecycleError> {
        let id = self.tree.add_child(parent, component, z, caps, &self.context)?;
        self.scheduler.schedule();
        Ok(id)
    }

    /// Unmount everything and mark the engine stopped. Idempotent once
    /// stopped, but calling `start` again afterwards is allowed.
    pub fn stop(&mut self) -> Result<(), LifecycleError> {
        if !self.running {
            return Err(LifecycleError::NotRunning);
        }
        self.tree.unmount_all();
        self.running = false;
        Ok(())
    }

    /// Whether `start` has run without a matching `stop`.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Queue a render on the next tick. Coalesces with any already-pending
    /// request (see [`FrameScheduler::schedule`]).
    pub fn request_render(&mut self) {
        self.scheduler.schedule();
    }

    /// Mark a specific component dirty and queue a render.
    pub fn mark_dirty(&mut self, id: ComponentId) {
        self.tree.mark_dirty(id);
        self.scheduler.schedule();
    }

    /// Current frame-timing statistics.
    #[must_use]
    pub fn frame_stats(&self) -> FrameStats {
        self.scheduler.stats()
    }

    /// Move focus to the next focusable component.
    pub fn focus_next(&mut self) {
        self.tree.focus_next();
    }

    /// Move focus to the previous focusable component.
    pub fn focus_prev(&mut self) {
        self.tree.focus_prev();
    }

    /// Dispatch a decoded event through the drag controller and then the
    /// component tree. Returns `true` if something consumed it.
    ///
    /// Mouse-down events are offered to the drag controller first
    /// (engine-first precedence): if a draggable/resizable component's
    /// body or handle band is hit, the press is claimed here and the
    /// component's `handle_mouse` never sees it. Everything else (and the
    /// drag/resize's own subsequent move/release events) fall through to
    /// tree dispatch via hit-testing.
    pub fn dispatch_event(&mut self, event: Event) -> bool {
        match event {
            Event::Key(key) => {
                let consumed = self.tree.dispatch_key(key);
                if consumed {
                    self.scheduler.schedule();
                }
                consumed
            }
            Event::Mouse(mouse) => {
                use ftui_core::event::MouseEventKind;

                if self.drag.is_active() {
                    if let Some(root) = self.tree.root() {
                        let parent_bounds = self.tree.bounds(root).unwrap_or_default();
                        self.drag.on_move(&mut self.tree, parent_bounds, mouse.x, mouse.y);
                        if matches!(mouse.kind, MouseEventKind::Up(_)) {
                            self.drag.on_release();
                        }
                        self.scheduler.schedule();
                        return true;
                    }
                }

                if matches!(mouse.kind, MouseEventKind::Down(_))
                    && self
                        .drag
                        .on_press(&self.tree, &self.layers, mouse, self.context.inline)
                {
                    self.scheduler.schedule();
                    return true;
                }

                let Some(id) = self.layers.hit_test(mouse.x, mouse.y) else {
                    return false;
                };
                let consumed = self.tree.dispatch_mouse(id, mouse);
                if consumed {
                    self.scheduler.schedule();
                }
                consumed
            }
            Event::Resize { width, height } => {
                self.writer.set_size(width, height);
                if let Some(root) = self.tree.root() {
                    self.tree.set_bounds(root, Rect::new(0, 0, width, height));
                }
                self.scheduler.schedule();
                true
            }
            Event::Paste(_) | Event::Focus(_) | Event::Clipboard(_) | Event::Tick => false,
        }
    }

    /// Run the `layout → composite → diff → flush` pipeline unconditionally
    /// (bypassing the scheduler's dirty/pending check). `layout` here is
    /// just re-snapshotting the layer stack; per-component layout (via
    /// [`ftui_layout`]) is the caller's responsibility, invoked before this
    /// through [`ComponentTree::set_bounds`].
    pub fn composite_frame(&mut self) -> io::Result<()> {
        self.layers = LayerManager::snapshot(&self.tree);
        let width = self.writer.width().max(1);
        let height = self.writer.height().max(1);
        let mut buffer = Buffer::new(width, height);
        let failed = self.layers.composite(&mut self.tree, &mut buffer);
        self.writer.present_ui(&buffer)?;
        // A component whose render panicked keeps its dirty flag set so the
        // next tick retries it instead of silently flushing its error
        // banner as if it were the component's real, settled output.
        self.tree.clear_dirty_except(&failed);
        Ok(())
    }

    /// One iteration of the cooperative loop: wait for either the next
    /// input event or the next scheduled tick, whichever comes first;
    /// dispatch the event if one arrived; composite if the tick decided a
    /// render is due. Returns the event, if any, so the caller can decide
    /// whether to `stop()` (e.g. on a quit keybinding) — the engine itself
    /// has no opinion on what ends the session.
    pub fn run_once(&mut self) -> io::Result<Option<Event>> {
        let now = Instant::now();
        let budget = self.scheduler.time_until_next_tick(now);

        let mut event = None;
        if let Some(session) = &self.session {
            if session.poll_event(budget)? {
                event = session.read_event()?;
            }
        } else if !budget.is_zero() {
            std::thread::sleep(budget);
        }

        if let Some(ev) = event.clone() {
            self.dispatch_event(ev);
        }

        let now = Instant::now();
        if self.scheduler.tick(now, self.tree.has_dirty()) {
            let started = Instant::now();
            self.composite_frame()?;
            self.scheduler.record_frame(started.elapsed());
        }

        Ok(event)
    }

    /// The render context components were mounted with.
    #[must_use]
    pub fn context(&self) -> RenderContext {
        self.context
    }
}
