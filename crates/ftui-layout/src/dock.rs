#![forbid(unsafe_code)]

//! Dock layout: children anchor to an edge of the remaining rectangle and
//! consume their measured size from it, in declaration order.

use ftui_core::geometry::Rect;

/// Which edge of the remaining rect a docked child consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DockEdge {
    /// Consumes `size` rows from the top of the remaining rect.
    Top,
    /// Consumes `size` rows from the bottom of the remaining rect.
    Bottom,
    /// Consumes `size` columns from the left of the remaining rect.
    Left,
    /// Consumes `size` columns from the right of the remaining rect.
    Right,
    /// Receives whatever rect remains after all edge children are placed.
    /// Multiple `Fill` children all receive the same final remainder rect
    /// (they overlap by design — the caller decides how to composite them).
    Fill,
}

/// A single child in a dock layout: an edge and, for edge children, how many
/// rows/columns it consumes. Ignored for `Fill`.
#[derive(Debug, Clone, Copy)]
pub struct DockItem {
    /// The edge this child anchors to.
    pub edge: DockEdge,
    /// Rows (Top/Bottom) or columns (Left/Right) consumed; unused for `Fill`.
    pub size: u16,
}

impl DockItem {
    /// Create a docked item.
    #[must_use]
    pub const fn new(edge: DockEdge, size: u16) -> Self {
        Self { edge, size }
    }

    /// Create a `Fill` item (consumes the final remainder).
    #[must_use]
    pub const fn fill() -> Self {
        Self {
            edge: DockEdge::Fill,
            size: 0,
        }
    }
}

/// Dock container: processes items in declaration order, each edge item
/// peeling its slice off the remaining rect. Order is load-bearing — it is
/// not a property of the items themselves.
#[derive(Debug, Clone, Default)]
pub struct Dock {
    items: Vec<DockItem>,
}

impl Dock {
    /// Create an empty dock container.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Append a docked item; returns `self` for chaining.
    #[must_use]
    pub fn item(mut self, item: DockItem) -> Self {
        self.items.push(item);
        self
    }

    /// Replace the item list wholesale.
    #[must_use]
    pub fn items(mut self, items: impl IntoIterator<Item = DockItem>) -> Self {
        self.items = items.into_iter().collect();
        self
    }

    /// Resolve this dock container's items into rects, one per item, in the
    /// same order they were added. `Fill` items all receive the final
    /// remainder rect (and so may coincide).
    #[must_use]
    pub fn split(&self, area: Rect) -> Vec<Rect> {
        let mut remaining = area;
        let mut fill_indices = Vec::new();
        let mut rects = vec![Rect::default(); self.items.len()];

        for (i, item) in self.items.iter().enumerate() {
            match item.edge {
                DockEdge::Top => {
                    let h = item.size.min(remaining.height);
                    rects[i] = Rect::new(remaining.x, remaining.y, remaining.width, h);
                    remaining = Rect::new(
                        remaining.x,
                        remaining.y.saturating_add(h),
                        remaining.width,
                        remaining.height.saturating_sub(h),
                    );
                }
                DockEdge::Bottom => {
                    let h = item.size.min(remaining.height);
                    let y = remaining.bottom().saturating_sub(h);
                    rects[i] = Rect::new(remaining.x, y, remaining.width, h);
                    remaining = Rect::new(remaining.x, remaining.y, remaining.width, remaining.height.saturating_sub(h));
                }
                DockEdge::Left => {
                    let w = item.size.min(remaining.width);
                    rects[i] = Rect::new(remaining.x, remaining.y, w, remaining.height);
                    remaining = Rect::new(
                        remaining.x.saturating_add(w),
                        remaining.y,
                        remaining.width.saturating_sub(w),
                        remaining.height,
                    );
                }
                DockEdge::Right => {
                    let w = item.size.min(remaining.width);
                    let x = remaining.right().saturating_sub(w);
                    rects[i] = Rect::new(x, remaining.y, w, remaining.height);
                    remaining = Rect::new(remaining.x, remaining.y, remaining.width.saturating_sub(w), remaining.height);
                }
                DockEdge::Fill => {
                    fill_indices.push(i);
                }
            }
        }

        for i in fill_indices {
            rects[i] = remaining;
        }

        rects
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worked_example_top_left_fill() {
        // Container 50x15, add (top, h=3), (left, w=10), (fill).
        let dock = Dock::new()
            .item(DockItem::new(DockEdge::Top, 3))
            .item(DockItem::new(DockEdge::Left, 10))
            .item(DockItem::fill());
        let rects = dock.split(Rect::new(0, 0, 50, 15));
        assert_eq!(rects[0], Rect::new(0, 0, 50, 3));
        assert_eq!(rects[1], Rect::new(0, 3, 10, 12));
        assert_eq!(rects[2], Rect::new(10, 3, 40, 12));
    }

    #[test]
    fn order_is_load_bearing() {
        // Same items, different order: (left, top, fill).
        let dock = Dock::new()
            .item(DockItem::new(DockEdge::Left, 10))
            .item(DockItem::new(DockEdge::Top, 3))
            .item(DockItem::fill());
        let rects = dock.split(Rect::new(0, 0, 50, 15));
        assert_eq!(rects[0], Rect::new(0, 0, 10, 15));
        assert_eq!(rects[1], Rect::new(10, 0, 40, 3));
        assert_eq!(rects[2], Rect::new(10, 3, 40, 12));
    }

    #[test]
    fn multiple_fill_children_overlap() {
        let dock = Dock::new()
            .item(DockItem::new(DockEdge::Top, 2))
            .item(DockItem::fill())
            .item(DockItem::fill());
        let rects = dock.split(Rect::new(0, 0, 10, 10));
        assert_eq!(rects[1], rects[2]);
        assert_eq!(rects[1], Rect::new(0, 2, 10, 8));
    }

    #[test]
    fn edge_sizes_clamp_to_available() {
        let dock = Dock::new().item(DockItem::new(DockEdge::Top, 100));
        let rects = dock.split(Rect::new(0, 0, 10, 5));
        assert_eq!(rects[0], Rect::new(0, 0, 10, 5));
    }

    #[test]
    fn empty_dock_produces_empty_vec() {
        let dock = Dock::new();
        assert!(dock.split(Rect::new(0, 0, 10, 10)).is_empty());
    }

    #[test]
    fn containment_invariant() {
        let area = Rect::new(5, 5, 50, 15);
        let dock = Dock::new()
            .item(DockItem::new(DockEdge::Top, 3))
            .item(DockItem::new(DockEdge::Right, 8))
            .item(DockItem::fill());
        let rects = dock.split(area);
        for r in &rects {
            assert!(r.x >= area.x && r.right() <= area.right());
            assert!(r.y >= area.y && r.bottom() <= area.bottom());
        }
    }
}
