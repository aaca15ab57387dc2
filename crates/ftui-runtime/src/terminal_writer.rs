#![forbid(unsafe_code)]

//! Terminal output coordinator with inline mode support.
//!
//! The `TerminalWriter` is the component that makes inline mode work. It:
//! - Serializes log writes and UI presents (one-writer rule)
//! - Implements the cursor save/restore contract
//! - Manages scroll regions (when optimization enabled)
//! - Ensures single buffered write per operation
//!
//! # Screen Modes
//!
//! - **Inline Mode**: Preserves terminal scrollback. UI is rendered at the
//!   bottom, logs scroll normally above. Uses cursor save/restore.
//!
//! - **AltScreen Mode**: Uses alternate screen buffer. Full-screen UI,
//!   no scrollback preservation.
//!
//! # Inline Mode Contract
//!
//! 1. Cursor is saved before any UI operation
//! 2. UI region is cleared and redrawn
//! 3. Cursor is restored after UI operation
//! 4. Log writes go above the UI region
//! 5. Terminal state is restored on drop
//!
//! # Usage
//!
//! ```ignore
//! use ftui_runtime::{TerminalWriter, ScreenMode, UiAnchor};
//! use ftui_render::buffer::Buffer;
//! use ftui_core::terminal_capabilities::TerminalCapabilities;
//!
//! // Create writer for inline mode with 10-row UI
//! let mut writer = TerminalWriter::new(
//!     std::io::stdout(),
//!     ScreenMode::Inline { ui_height: 10 },
//!     UiAnchor::Bottom,
//!     TerminalCapabilities::detect(),
//! );
//!
//! // Write logs (goes to scrollback above UI)
//! writer.write_log("Starting...\n")?;
//!
//! // Present UI
//! let buffer = Buffer::new(80, 10);
//! writer.present_ui(&buffer)?;
//! ```

use std::io::{self, BufWriter, Write};

use ftui_core::inline_mode::InlineStrategy;
use ftui_core::terminal_capabilities::TerminalCapabilities;
use ftui_render::buffer::Buffer;
use ftui_render::diff::BufferDiff;
use ftui_render::grapheme_pool::GraphemePool;
use ftui_render::link_registry::LinkRegistry;
use tracing::{debug_span, info_span, trace};

/// Size of the internal write buffer (64KB).
const BUFFER_CAPACITY: usize = 64 * 1024;

/// DEC cursor save (ESC 7) - more portable than CSI s.
const CURSOR_SAVE: &[u8] = b"\x1b7";

/// DEC cursor restore (ESC 8) - more portable than CSI u.
const CURSOR_RESTORE: &[u8] = b"\x1b8";

/// Synchronized output begin (DEC 2026).
const SYNC_BEGIN: &[u8] = b"\x1b[?2026h";

/// Synchronized output end (DEC 2026).
const SYNC_END: &[u8] = b"\x1b[?2026l";

/// Erase entire line (CSI 2 K).
const ERASE_LINE: &[u8] = b"\x1b[2K";

fn sanitize_auto_bounds(min_height: u16, max_height: u16) -> (u16, u16) {
    let min = min_height.max(1);
    let max = max_height.max(min);
    (min, max)
}

/// Screen mode determines whether we use alternate screen or inline mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScreenMode {
    /// Inline mode preserves scrollback. UI is anchored at bottom/top.
    Inline {
        /// Height of the UI region in rows.
        ui_height: u16,
    },
    /// Inline mode with automatic UI height based on rendered content.
    ///
    /// The measured height is clamped between `min_height` and `max_height`.
    InlineAuto {
        /// Minimum UI height in rows.
        min_height: u16,
        /// Maximum UI height in rows.
        max_height: u16,
    },
    /// Alternate screen mode for full-screen applications.
    #[default]
    AltScreen,
}

/// Where the UI region is anchored in inline mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UiAnchor {
    /// UI at bottom of terminal (default for agent harness).
    #[default]
    Bottom,
    /// UI at top of terminal.
    Top,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct InlineRegion {
    start: u16,
    height: u16,
}

/// Unified terminal output coordinator.
///
/// Enforces the one-writer rule and implements inline mode correctly.
/// All terminal output should go through this struct.
pub struct TerminalWriter<W: Write> {
    /// Buffered writer for efficient output. Option allows moving out for into_inner().
    writer: Option<BufWriter<W>>,
    /// Current screen mode.
    screen_mode: ScreenMode,
    /// Last computed auto UI height (inline auto mode only).
    auto_ui_height: Option<u16>,
    /// Where UI is anchored in inline mode.
    ui_anchor: UiAnchor,
    /// Previous buffer for diffing.
    prev_buffer: Option<Buffer>,
    /// Grapheme pool for complex characters.
    pool: GraphemePool,
    /// Link registry for hyperlinks.
    links: LinkRegistry,
    /// Terminal capabilities.
    capabilities: TerminalCapabilities,
    /// Terminal width in columns.
    term_width: u16,
    /// Terminal height in rows.
    term_height: u16,
    /// Whether we're in the middle of a sync block.
    in_sync_block: bool,
    /// Whether cursor has been saved.
    cursor_saved: bool,
    /// Inline mode rendering strategy (selected from capabilities).
    inline_strategy: InlineStrategy,
    /// Whether a scroll region is currently active.
    scroll_region_active: bool,
    /// Last inline UI region for clearing on shrink.
    last_inline_region: Option<InlineRegion>,
}

impl<W: Write> TerminalWriter<W> {
    /// Create a new terminal writer.
    ///
    /// # Arguments
    ///
    /// * `writer` - Output destination (takes ownership for one-writer rule)
    /// * `screen_mode` - Inline or alternate screen mode
    /// * `ui_anchor` - Where to anchor UI in inline mode
    /// * `capabilities` - Terminal capabilities
    pub fn new(
        writer: W,
        screen_mode: ScreenMode,
        ui_anchor: UiAnchor,
        capabilities: TerminalCapabilities,
    ) -> Self {
        let inline_strategy = InlineStrategy::select(&capabilities);
        let auto_ui_height = None;
        Self {
            writer: Some(BufWriter::with_capacity(BUFFER_CAPACITY, writer)),
            screen_mode,
            auto_ui_height,
            ui_anchor,
            prev_buffer: None,
            pool: GraphemePool::new(),
            links: LinkRegistry::new(),
            capabilities,
            term_width: 80,
            term_height: 24,
            in_sync_block: false,
            cursor_saved: false,
            inline_strategy,
            scroll_region_active: false,
            last_inline_region: None,
        }
    }

    /// Get a mutable reference to the internal writer.
    ///
    /// # Panics
    ///
    /// Panics if the writer has been taken (via `into_inner`).
    #[inline]
    fn writer(&mut self) -> &mut BufWriter<W> {
        self.writer.as_mut().expect("writer has been consumed")
    }

    /// Set the terminal size.
    ///
    /// Call this when the terminal is resized.
    pub fn set_size(&mut self, width: u16, height: u16) {
        self.term_width = width;
        self.term_height = height;
        if matches!(self.screen_mode, ScreenMode::InlineAuto { .. }) {
            self.auto_ui_height = None;
        }
        // Clear prev_buffer to force full redraw after resize
        self.prev_buffer = None;
        // Reset scroll region on resize; it will be re-established on next present
        if self.scroll_region_active {
            let _ = self.deactivate_scroll_region();
        }
    }

    /// Get the current terminal width.
    pub fn width(&self) -> u16 {
        self.term_width
    }

    /// Get the current terminal height.
    pub fn height(&self) -> u16 {
        self.term_height
    }

    /// Get the current screen mode.
    pub fn screen_mode(&self) -> ScreenMode {
        self.screen_mode
    }

    /// Height to use for rendering a frame.
    ///
    /// In inline auto mode, this returns the configured maximum (clamped to
    /// terminal height) so measurement can determine actual UI height.
    pub fn render_height_hint(&self) -> u16 {
        match self.screen_mode {
            ScreenMode::Inline { ui_height } => ui_height,
            ScreenMode::InlineAuto {
                min_height,
                max_height,
            } => {
                let (min, max) = sanitize_auto_bounds(min_height, max_height);
                let max = max.min(self.term_height);
                let min = min.min(max);
                if let Some(current) = self.auto_ui_height {
                    current.clamp(min, max).min(self.term_height).max(min)
                } else {
                    max.max(min)
                }
            }
            ScreenMode::AltScreen => self.term_height,
        }
    }

    /// Get sanitized min/max bounds for inline auto mode (clamped to terminal height).
    pub fn inline_auto_bounds(&self) -> Option<(u16, u16)> {
        match self.screen_mode {
            ScreenMode::InlineAuto {
                min_height,
                max_height,
            } => {
                let (min, max) = sanitize_auto_bounds(min_height, max_height);
                Some((min.min(self.term_height), max.min(self.term_height)))
            }
            _ => None,
        }
    }

    /// Get the cached auto UI height (inline auto mode only).
    pub fn auto_ui_height(&self) -> Option<u16> {
        match self.screen_mode {
            ScreenMode::InlineAuto { .. } => self.auto_ui_height,
            _ => None,
        }
    }

    /// Update the computed height for inline auto mode.
    pub fn set_auto_ui_height(&mut self, height: u16) {
        if let ScreenMode::InlineAuto {
            min_height,
            max_height,
        } = self.screen_mode
        {
            let (min, max) = sanitize_auto_bounds(min_height, max_height);
            let max = max.min(self.term_height);
            let min = min.min(max);
            let clamped = height.clamp(min, max);
            let previous_effective = self.auto_ui_height.unwrap_or(min);
            if self.auto_ui_height != Some(clamped) {
                self.auto_ui_height = Some(clamped);
                if clamped != previous_effective {
                    self.prev_buffer = None;
                    if self.scroll_region_active {
                        let _ = self.deactivate_scroll_region();
                    }
                }
            }
        }
    }

    /// Clear the cached auto UI height (inline auto mode only).
    pub fn clear_auto_ui_height(&mut self) {
        if matches!(self.screen_mode, ScreenMode::InlineAuto { .. })
            && self.auto_ui_height.is_some()
        {
            self.auto_ui_height = None;
            self.prev_buffer = None;
            if self.scroll_region_active {
                let _ = self.deactivate_scroll_region();
            }
        }
    }

    fn effective_ui_height(&self) -> u16 {
        match self.screen_mode {
            ScreenMode::Inline { ui_height } => ui_height,
            ScreenMode::InlineAuto {
                min_height,
                max_height,
            } => {
                let (min, max) = sanitize_auto_bounds(min_height, max_height);
                let current = self.auto_ui_height.unwrap_or(min);
                current.clamp(min, max).min(self.term_height)
            }
            ScreenMode::AltScreen => self.term_height,
        }
    }

    /// Get the UI height for the current mode.
    pub fn ui_height(&self) -> u16 {
        self.effective_ui_height()
    }

    /// Calculate the row where the UI starts (0-indexed).
    fn ui_start_row(&self) -> u16 {
        let ui_height = self.effective_ui_height().min(self.term_height);
        match (self.screen_mode, self.ui_anchor) {
            (ScreenMode::Inline { .. }, UiAnchor::Bottom)
            | (ScreenMode::InlineAuto { .. }, UiAnchor::Bottom) => {
                self.term_height.saturating_sub(ui_height)
            }
            (ScreenMode::Inline { .. }, UiAnchor::Top)
            | (ScreenMode::InlineAuto { .. }, UiAnchor::Top) => 0,
            (ScreenMode::AltScreen, _) => 0,
        }
    }

    /// Get the inline mode rendering strategy.
    pub fn inline_strategy(&self) -> InlineStrategy {
        self.inline_strategy
    }

    /// Check if a scroll region is currently active.
    pub fn scroll_region_active(&self) -> bool {
        self.scroll_region_active
    }

    /// Activate the scroll region for inline mode.
    ///
    /// Sets DECSTBM to constrain scrolling to the log region:
    /// - Bottom-anchored UI: log region is above the UI.
    /// - Top-anchored UI: log region is below the UI.
    ///
    /// Only called when the strategy permits scroll-region usage.
    fn activate_scroll_region(&mut self, ui_height: u16) -> io::Result<()> {
        if self.scroll_region_active {
            return Ok(());
        }

        let ui_height = ui_height.min(self.term_height);
        if ui_height >= self.term_height {
            return Ok(());
        }

        match self.ui_anchor {
            UiAnchor::Bottom => {
                let term_height = self.term_height;
                let log_bottom = term_height.saturating_sub(ui_height);
                if log_bottom > 0 {
                    // DECSTBM: set scroll region to rows 1..log_bottom (1-indexed)
                    write!(self.writer(), "\x1b[1;{}r", log_bottom)?;
                    self.scroll_region_active = true;
                }
            }
            UiAnchor::Top => {
                let term_height = self.term_height;
                let log_top = ui_height.saturating_add(1);
                if log_top <= term_height {
                    // DECSTBM: set scroll region to rows log_top..term_height (1-indexed)
                    write!(self.writer(), "\x1b[{};{}r", log_top, term_height)?;
                    self.scroll_region_active = true;
                    // DECSTBM moves cursor to home; for top-anchored UI we must
                    // move it into the log region so restored cursor stays below UI.
                    write!(self.writer(), "\x1b[{};1H", log_top)?;
                }
            }
        }
        Ok(())
    }

    /// Deactivate the scroll region, resetting to full screen.
    fn deactivate_scroll_region(&mut self) -> io::Result<()> {
        if self.scroll_region_active {
            self.writer().write_all(b"\x1b[r")?;
            self.scroll_region_active = false;
        }
        Ok(())
    }

    fn clear_rows(&mut self, start_row: u16, height: u16) -> io::Result<()> {
        let start_row = start_row.min(self.term_height);
        let end_row = start_row.saturating_add(height).min(self.term_height);
        for row in start_row..end_row {
            write!(self.writer(), "\x1b[{};1H", row.saturating_add(1))?;
            self.writer().write_all(ERASE_LINE)?;
        }
        Ok(())
    }

    fn clear_inline_region_diff(&mut self, current: InlineRegion) -> io::Result<()> {
        let Some(previous) = self.last_inline_region else {
            return Ok(());
        };

        let prev_start = previous.start.min(self.term_height);
        let prev_end = previous
            .start
            .saturating_add(previous.height)
            .min(self.term_height);
        if prev_start >= prev_end {
            return Ok(());
        }

        let curr_start = current.start.min(self.term_height);
        let curr_end = current
            .start
            .saturating_add(current.height)
            .min(self.term_height);

        if curr_start > prev_start {
            let clear_end = curr_start.min(prev_end);
            if clear_end > prev_start {
                self.clear_rows(prev_start, clear_end - prev_start)?;
            }
        }

        if curr_end < prev_end {
            let clear_start = curr_end.max(prev_start);
            if prev_end > clear_start {
                self.clear_rows(clear_start, prev_end - clear_start)?;
            }
        }

        Ok(())
    }

    /// Present a UI frame.
    ///
    /// In inline mode, this:
    /// 1. Begins synchronized output (if supported)
    /// 2. Saves cursor position
    /// 3. Moves to UI region and clears it
    /// 4. Renders the buffer using the presenter
    /// 5. Restores cursor position
    /// 6. Ends synchronized output
    ///
    /// In AltScreen mode, this just renders the buffer.
    pub fn present_ui(&mut self, buffer: &Buffer) -> io::Result<()> {
        let mode_str = match self.screen_mode {
            ScreenMode::Inline { .. } => "inline",
            ScreenMode::InlineAuto { .. } => "inline_auto",
            ScreenMode::AltScreen => "altscreen",
        };
        let _span = info_span!(
            "ftui.render.present",
            mode = mode_str,
            width = buffer.width(),
            height = buffer.height(),
        )
        .entered();

        let result = match self.screen_mode {
            ScreenMode::Inline { ui_height } => self.present_inline(buffer, ui_height),
            ScreenMode::InlineAuto { .. } => {
                let ui_height = self.effective_ui_height();
                self.present_inline(buffer, ui_height)
            }
            ScreenMode::AltScreen => self.present_altscreen(buffer),
        };

        if result.is_ok() {
            self.prev_buffer = Some(buffer.clone());
        }
        result
    }

    /// Present a UI frame, taking ownership of the buffer (O(1) — no clone).
    ///
    /// Prefer this over [`present_ui`] when the caller has an owned buffer
    /// that won't be reused, as it avoids an O(width × height) clone.
    pub fn present_ui_owned(&mut self, buffer: Buffer) -> io::Result<()> {
        let mode_str = match self.screen_mode {
            ScreenMode::Inline { .. } => "inline",
            ScreenMode::InlineAuto { .. } => "inline_auto",
            ScreenMode::AltScreen => "altscreen",
        };
        let _span = info_span!(
            "ftui.render.present",
            mode = mode_str,
            width = buffer.width(),
            height = buffer.height(),
        )
        .entered();

        let result = match self.screen_mode {
            ScreenMode::Inline { ui_height } => self.present_inline(&buffer, ui_height),
            ScreenMode::InlineAuto { .. } => {
                let ui_height = self.effective_ui_height();
                self.present_inline(&buffer, ui_height)
            }
            ScreenMode::AltScreen => self.present_altscreen(&buffer),
        };

        if result.is_ok() {
            self.prev_buffer = Some(buffer);
        }
        result
    }

    /// Present UI in inline mode with cursor save/restore.
    ///
    /// When the scroll-region strategy is active, DECSTBM is set to constrain
    /// log scrolling to the region above the UI. This prevents log output from
    /// overwriting the UI, reducing redraw work.
    fn present_inline(&mut self, buffer: &Buffer, ui_height: u16) -> io::Result<()> {
        let visible_height = ui_height.min(self.term_height);
        let ui_y_start = self.ui_start_row();
        let current_region = InlineRegion {
            start: ui_y_start,
            height: visible_height,
        };

        // Activate scroll region if strategy calls for it
        {
            let _span = debug_span!("ftui.render.scroll_region").entered();
            if visible_height > 0 {
                match self.inline_strategy {
                    InlineStrategy::ScrollRegion => {
                        self.activate_scroll_region(visible_height)?;
                    }
                    InlineStrategy::Hybrid => {
                        self.activate_scroll_region(visible_height)?;
                    }
                    InlineStrategy::OverlayRedraw => {}
                }
            } else if self.scroll_region_active {
                self.deactivate_scroll_region()?;
            }
        }

        // Begin sync output if available
        if self.capabilities.sync_output && !self.in_sync_block {
            self.writer().write_all(SYNC_BEGIN)?;
            self.in_sync_block = true;
        }

        // Save cursor (DEC save)
        self.writer().write_all(CURSOR_SAVE)?;
        self.cursor_saved = true;

        self.clear_inline_region_diff(current_region)?;

        if visible_height > 0 {
            // Move to UI anchor and clear UI region
            {
                let _span = debug_span!("ftui.render.clear_ui", rows = visible_height).entered();
                write!(self.writer(), "\x1b[{};1H", ui_y_start.saturating_add(1))?;
                self.clear_rows(ui_y_start, visible_height)?;
                write!(self.writer(), "\x1b[{};1H", ui_y_start.saturating_add(1))?;
            }

            // Compute diff
            let diff = {
                let _span = debug_span!("ftui.render.diff_compute").entered();
                if let Some(ref prev) = self.prev_buffer {
                    if prev.width() == buffer.width() && prev.height() == buffer.height() {
                        BufferDiff::compute(prev, buffer)
                    } else {
                        self.create_full_diff(buffer)
                    }
                } else {
                    self.create_full_diff(buffer)
                }
            };

            // Emit diff
            {
                let _span = debug_span!("ftui.render.emit").entered();
                self.emit_diff(buffer, &diff, Some(visible_height), ui_y_start)?;
            }
        }

        // Reset style so subsequent log output doesn't inherit UI styling.
        self.writer().write_all(b"\x1b[0m")?;

        // Restore cursor
        self.writer().write_all(CURSOR_RESTORE)?;
        self.cursor_saved = false;

        // End sync output
        if self.in_sync_block {
            self.writer().write_all(SYNC_END)?;
            self.in_sync_block = false;
        }

        self.writer().flush()?;
        self.last_inline_region = if visible_height > 0 {
            Some(current_region)
        } else {
            None
        };

        Ok(())
    }

    /// Present UI in alternate screen mode (simpler, no cursor gymnastics).
    fn present_altscreen(&mut self, buffer: &Buffer) -> io::Result<()> {
        let diff = {
            let _span = debug_span!("diff_compute").entered();
            if let Some(ref prev) = self.prev_buffer {
                if prev.width() == buffer.width() && prev.height() == buffer.height() {
                    BufferDiff::compute(prev, buffer)
                } else {
                    self.create_full_diff(buffer)
                }
            } else {
                self.create_full_diff(buffer)
            }
        };

        // Begin sync if available
        if self.capabilities.sync_output {
            self.writer().write_all(SYNC_BEGIN)?;
        }

        {
            let _span = debug_span!("emit").entered();
            self.emit_diff(buffer, &diff, None, 0)?;
        }

        // Reset style at end
        self.writer().write_all(b"\x1b[0m")?;

        if self.capabilities.sync_output {
            self.writer().write_all(SYNC_END)?;
        }

        self.writer().flush()?;

        Ok(())
    }

    /// Emit a diff directly to the writer.
    fn emit_diff(
        &mut self,
        buffer: &Buffer,
        diff: &BufferDiff,
        max_height: Option<u16>,
        ui_y_start: u16,
    ) -> io::Result<()> {
        use ftui_render::cell::{CellAttrs, StyleFlags};

        let runs = diff.runs();
        let _span = debug_span!("ftui.render.emit_diff", run_count = runs.len()).entered();

        let mut current_style: Option<(
            ftui_render::cell::PackedRgba,
            ftui_render::cell::PackedRgba,
            StyleFlags,
        )> = None;
        let mut current_link: Option<u32> = None;

        // Borrow writer once
        let writer = self.writer.as_mut().expect("writer has been consumed");

        for run in runs {
            if let Some(limit) = max_height
                && run.y >= limit
            {
                continue;
            }
            // Move cursor to run start
            write!(
                writer,
                "\x1b[{};{}H",
                ui_y_start.saturating_add(run.y).saturating_add(1),
                run.x0.saturating_add(1)
            )?;

            // Emit cells in the run
            for x in run.x0..=run.x1 {
                let cell = buffer.get_unchecked(x, run.y);

                // Skip continuation cells
                if cell.is_continuation() {
                    continue;
                }

                // Check if style changed
                let cell_style = (cell.fg, cell.bg, cell.attrs.flags());
                if current_style != Some(cell_style) {
                    // Reset and apply new style
                    writer.write_all(b"\x1b[0m")?;

                    // Apply attributes
                    if !cell_style.2.is_empty() {
                        Self::emit_style_flags(writer, cell_style.2)?;
                    }

                    // Apply colors
                    if cell_style.0.a() > 0 {
                        write!(
                            writer,
                            "\x1b[38;2;{};{};{}m",
                            cell_style.0.r(),
                            cell_style.0.g(),
                            cell_style.0.b()
                        )?;
                    }
                    if cell_style.1.a() > 0 {
                        write!(
                            writer,
                            "\x1b[48;2;{};{};{}m",
                            cell_style.1.r(),
                            cell_style.1.g(),
                            cell_style.1.b()
                        )?;
                    }

                    current_style = Some(cell_style);
                }

                // Check if link changed
                let raw_link_id = cell.attrs.link_id();
                let new_link = if raw_link_id == CellAttrs::LINK_ID_NONE {
                    None
                } else {
                    Some(raw_link_id)
                };

                if current_link != new_link {
                    // Close current link
                    if current_link.is_some() {
                        writer.write_all(b"\x1b]8;;\x1b\\")?;
                    }
                    // Open new link if present
                    if let Some(link_id) = new_link
                        && let Some(url) = self.links.get(link_id)
                    {
                        write!(writer, "\x1b]8;;{}\x1b\\", url)?;
                    }
                    current_link = new_link;
                }

                // Emit content
                if let Some(ch) = cell.content.as_char() {
                    let mut buf = [0u8; 4];
                    let encoded = ch.encode_utf8(&mut buf);
                    writer.write_all(encoded.as_bytes())?;
                } else if let Some(gid) = cell.content.grapheme_id() {
                    // Use pool directly with writer (no clone needed)
                    if let Some(text) = self.pool.get(gid) {
                        writer.write_all(text.as_bytes())?;
                    } else {
                        writer.write_all(b" ")?;
                    }
                } else {
                    writer.write_all(b" ")?;
                }
            }
        }

        // Reset style
        writer.write_all(b"\x1b[0m")?;

        // Close any open link
        if current_link.is_some() {
            writer.write_all(b"\x1b]8;;\x1b\\")?;
        }

        trace!("emit_diff complete");
        Ok(())
    }

    /// Emit SGR flags.
    fn emit_style_flags(
        writer: &mut impl Write,
        flags: ftui_render::cell::StyleFlags,
    ) -> io::Result<()> {
        use ftui_render::cell::StyleFlags;

        let mut codes = Vec::with_capacity(8);

        if flags.contains(StyleFlags::BOLD) {
            codes.push("1");
        }
        if flags.contains(StyleFlags::DIM) {
            codes.push("2");
        }
        if flags.contains(StyleFlags::ITALIC) {
            codes.push("3");
        }
        if flags.contains(StyleFlags::UNDERLINE) {
            codes.push("4");
        }
        if flags.contains(StyleFlags::BLINK) {
            codes.push("5");
        }
        if flags.contains(StyleFlags::REVERSE) {
            codes.push("7");
        }
        if flags.contains(StyleFlags::HIDDEN) {
            codes.push("8");
        }
        if flags.contains(StyleFlags::STRIKETHROUGH) {
            codes.push("9");
        }

        if !codes.is_empty() {
            write!(writer, "\x1b[{}m", codes.join(";"))?;
        }

        Ok(())
    }

    /// Create a full-screen diff (marks all cells as changed).
    fn create_full_diff(&self, buffer: &Buffer) -> BufferDiff {
        let empty = Buffer::new(buffer.width(), buffer.height());
        BufferDiff::compute(&empty, buffer)
    }

    /// Write log output (goes to scrollback region in inline mode).
    ///
    /// In inline mode, this writes to the log region (above UI for bottom-anchored,
    /// below UI for top-anchored). The cursor is explicitly positioned in the log
    /// region before writing to prevent UI corruption.
    ///
    /// In AltScreen mode, logs are typically not shown (returns Ok silently).
    pub fn write_log(&mut self, text: &str) -> io::Result<()> {
        match self.screen_mode {
            ScreenMode::Inline { ui_height } => {
                // Position cursor in the log region before writing.
                // This ensures log output never corrupts the UI region.
                self.position_cursor_for_log(ui_height)?;
                self.writer().write_all(text.as_bytes())?;
                self.writer().flush()
            }
            ScreenMode::InlineAuto { .. } => {
                // InlineAuto: use effective_ui_height for positioning.
                let ui_height = self.effective_ui_height();
                self.position_cursor_for_log(ui_height)?;
                self.writer().write_all(text.as_bytes())?;
                self.writer().flush()
            }
            ScreenMode::AltScreen => {
                // AltScreen: no scrollback, logs are typically handled differently
                // (e.g., written to a log pane or file)
                Ok(())
            }
        }
    }

    /// Position cursor at the bottom of the log region for writing.
    ///
    /// For bottom-anchored UI: log region is above the UI (rows 1 to term_height - ui_height).
    /// For top-anchored UI: log region is below the UI (rows ui_height + 1 to term_height).
    ///
    /// Positions at the bottom row of the log region so newlines cause scrolling.
    fn position_cursor_for_log(&mut self, ui_height: u16) -> io::Result<()> {
        let visible_height = ui_height.min(self.term_height);
        if visible_height >= self.term_height {
            // No log region available when UI fills the terminal
            return Ok(());
        }

        let log_row = match self.ui_anchor {
            UiAnchor::Bottom => {
                // Log region is above UI: rows 1 to (term_height - ui_height)
                // Position at the bottom of the log region
                self.term_height.saturating_sub(visible_height)
            }
            UiAnchor::Top => {
                // Log region is below UI: rows (ui_height + 1) to term_height
                // Position at the bottom of the log region (last row)
                self.term_height
            }
        };

        // Move to the target row, column 1 (1-indexed)
        write!(self.writer(), "\x1b[{};1H", log_row)?;
        Ok(())
    }

    /// Clear the screen.
    pub fn clear_screen(&mut self) -> io::Result<()> {
        self.writer().write_all(b"\x1b[2J\x1b[1;1H")?;
        self.writer().flush()?;
        self.prev_buffer = None;
        self.last_inline_region = None;
        Ok(())
    }

    /// Hide the cursor.
    pub fn hide_cursor(&mut self) -> io::Result<()> {
        self.writer().write_all(b"\x1b[?25l")?;
        self.writer().flush()
    }

    /// Show the cursor.
    pub fn show_cursor(&mut self) -> io::Result<()> {
        self.writer().write_all(b"\x1b[?25h")?;
        self.writer().flush()
    }

    /// Flush any buffered output.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer().flush()
    }

    /// Get the grapheme pool for interning complex characters.
    pub fn pool(&self) -> &GraphemePool {
        &self.pool
    }

    /// Get mutable access to the grapheme pool.
    pub fn pool_mut(&mut self) -> &mut GraphemePool {
        &mut self.pool
    }

    /// Get the link registry.
    pub fn links(&self) -> &LinkRegistry {
        &self.links
    }

    /// Get mutable access to the link registry.
    pub fn links_mut(&mut self) -> &mut LinkRegistry {
        &mut self.links
    }

    /// Borrow the grapheme pool and link registry together.
    ///
    /// This avoids double-borrowing `self` at call sites that need both.
    pub fn pool_and_links_mut(&mut self) -> (&mut GraphemePool, &mut LinkRegistry) {
        (&mut self.pool, &mut self.links)
    }

    /// Get the terminal capabilities.
    pub fn capabilities(&self) -> &TerminalCapabilities {
        &self.capabilities
    }

    /// Consume the writer and return the underlying writer.
    ///
    /// Performs cleanup operations before returning.
    /// Returns `None` if the buffer could not be flushed.
    pub fn into_inner(mut self) -> Option<W> {
        self.cleanup();
        // Take the writer before Drop runs (Drop will see None and skip cleanup)
        self.writer.take()?.into_inner().ok()
    }

    /// Internal cleanup on drop.
    fn cleanup(&mut self) {
        let Some(ref mut writer) = self.writer else {
            return; // Writer already taken (via into_inner)
        };

        // End any pending sync block
        if self.in_sync_block {
            let _ = writer.write_all(SYNC_END);
            self.in_sync_block = false;
        }

        // Restore cursor if saved
        if self.cursor_saved {
            let _ = writer.write_all(CURSOR_RESTORE);
            self.cursor_saved = false;
        }

        // Reset scroll region if active
        if self.scroll_region_active {
            let _ = writer.write_all(b"\x1b[r");
            self.scroll_region_active = false;
        }

        // Reset style
        let _ = writer.write_all(b"\x1b[0m");

        // Show cursor
        let _ = writer.write_all(b"\x1b[?25h");

        // Flush
        let _ = writer.flush();
    }
}

impl<W: Write> Drop for TerminalWriter<W> {
    fn drop(&mut self) {
        self.cleanup();
    }
}
