#![forbid(unsafe_code)]

//! Wrap layout: place items left-to-right, breaking to a new line whenever
//! the next item would overflow the available width.

use ftui_core::geometry::{Rect, Size};

/// Wrap container: greedy line-breaking layout over a sequence of item
/// sizes. Pure function of `(item sizes, area)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Wrap {
    /// Horizontal gap inserted between items on the same line.
    pub gap_x: u16,
    /// Vertical gap inserted between lines.
    pub gap_y: u16,
}

impl Wrap {
    /// Create a wrap layout with no gaps.
    #[must_use]
    pub const fn new() -> Self {
        Self { gap_x: 0, gap_y: 0 }
    }

    /// Set the horizontal gap between same-line items.
    #[must_use]
    pub const fn gap_x(mut self, gap: u16) -> Self {
        self.gap_x = gap;
        self
    }

    /// Set the vertical gap between lines.
    #[must_use]
    pub const fn gap_y(mut self, gap: u16) -> Self {
        self.gap_y = gap;
        self
    }

    /// Resolve each item's size into an absolute rect within `area`, greedily
    /// packing left-to-right and wrapping to a new line when the next item
    /// would exceed the line width. An item wider than `area` still gets its
    /// own line (clipped to the area's width), rather than looping forever.
    #[must_use]
    pub fn split(&self, area: Rect, items: &[Size]) -> Vec<Rect> {
        let mut rects = Vec::with_capacity(items.len());
        if area.is_empty() || items.is_empty() {
            return items.iter().map(|_| Rect::default()).collect();
        }

        let mut cursor_x = 0u16;
        let mut cursor_y = 0u16;
        let mut line_height = 0u16;
        let mut first_on_line = true;

        for &size in items {
            let w = size.width.min(area.width);
            let h = size.height;

            if !first_on_line && cursor_x.saturating_add(w) > area.width {
                // Start a new line.
                cursor_x = 0;
                cursor_y = cursor_y.saturating_add(line_height).saturating_add(self.gap_y);
                line_height = 0;
                first_on_line = true;
            }

            rects.push(Rect::new(
                area.x.saturating_add(cursor_x),
                area.y.saturating_add(cursor_y),
                w,
                h,
            ));

            line_height = line_height.max(h);
            cursor_x = cursor_x.saturating_add(w).saturating_add(self.gap_x);
            first_on_line = false;
        }

        rects
    }
}
