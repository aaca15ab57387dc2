#![forbid(unsafe_code)]

//! Color and style resolution: the symbolic `Color`/`Style` vocabulary
//! component authors write against, and capability-based downgrade to
//! whatever the detected terminal can actually render.
//!
//! Cells in [`ftui_render`] store fully-resolved 24-bit [`PackedRgba`] plus
//! [`StyleFlags`] — downgrade to the terminal's [`ColorLevel`] happens once,
//! at flush time, not when building a [`Style`]. This crate is the bridge:
//! [`Style::resolve`] turns a symbolic `Style` into the `(PackedRgba,
//! PackedRgba, StyleFlags)` triple a [`Buffer`](ftui_render::buffer::Buffer)
//! cell wants.

pub mod color;

pub use color::{
    ansi16_to_rgb, ansi256_to_rgb, rgb_to_256, rgb_to_ansi16, rgb_to_ansi16_from_ansi256, Ansi16,
    CacheStats, Color, ColorCache, Rgb,
};
pub use ftui_core::terminal_capabilities::ColorLevel;
pub use ftui_render::cell::{PackedRgba, StyleFlags};

/// A symbolic cell style: foreground, background, and text attributes.
///
/// This is the type component code builds and passes to `Buffer::set_cell` /
/// `draw_text`; [`Style::resolve`] turns it into the packed representation a
/// [`Cell`](ftui_render::cell::Cell) stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Style {
    /// Foreground color.
    pub fg: Color,
    /// Background color.
    pub bg: Color,
    /// Text attribute flags.
    pub attrs: StyleFlags,
}

impl Style {
    /// The default style: terminal-native colors, no attributes.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fg: Color::Default,
            bg: Color::Default,
            attrs: StyleFlags::empty(),
        }
    }

    /// Return a copy with `fg` set.
    #[must_use]
    pub const fn with_fg(mut self, fg: Color) -> Self {
        self.fg = fg;
        self
    }

    /// Return a copy with `bg` set.
    #[must_use]
    pub const fn with_bg(mut self, bg: Color) -> Self {
        self.bg = bg;
        self
    }

    /// Return a copy with `attrs` set to `flags` (replacing any existing ones).
    #[must_use]
    pub const fn with_attrs(mut self, flags: StyleFlags) -> Self {
        self.attrs = flags;
        self
    }

    /// Return a copy with `flag` added to the existing attribute set.
    #[must_use]
    pub fn with_flag(mut self, flag: StyleFlags) -> Self {
        self.attrs.insert(flag);
        self
    }

    /// Downgrade `fg`/`bg` to `level`; attributes are untouched (every level
    /// can render bold/italic/underline/dim/inverse via SGR).
    #[must_use]
    pub fn downgrade(self, level: ColorLevel) -> Self {
        Self {
            fg: self.fg.downgrade(level),
            bg: self.bg.downgrade(level),
            attrs: self.attrs,
        }
    }

    /// Resolve to the packed `(fg, bg, attrs)` triple a `Cell` stores.
    ///
    /// Resolution always targets full 24-bit fidelity; the presenter
    /// downgrades at flush time against the detected capability, so the
    /// buffer itself never loses precision a later, more-capable flush could
    /// have used.
    #[must_use]
    pub fn resolve(self) -> (PackedRgba, PackedRgba, StyleFlags) {
        let fg = self.fg.to_rgb();
        let bg = self.bg.to_rgb();
        let fg_packed = if self.fg == Color::Default {
            PackedRgba::WHITE
        } else {
            PackedRgba::rgb(fg.r, fg.g, fg.b)
        };
        let bg_packed = if self.bg == Color::Default {
            PackedRgba::TRANSPARENT
        } else {
            PackedRgba::rgb(bg.r, bg.g, bg.b)
        };
        (fg_packed, bg_packed, self.attrs)
    }
}
