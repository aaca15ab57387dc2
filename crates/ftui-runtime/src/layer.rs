#![forbid(unsafe_code)]

//! Z-ordered layer manager: flattens the component tree into an ordered
//! stacking list each frame, for compositing and for hit-testing.

use ftui_core::geometry::Rect;
use ftui_render::buffer::Buffer;
use ftui_render::cell::{Cell, CellAttrs, PackedRgba, StyleFlags};

use crate::component::{ComponentId, ComponentTree, RenderOutcome};

/// One entry in the flattened stacking order: a component's absolute bounds
/// and its resolved stacking index.
#[derive(Debug, Clone, Copy)]
pub struct Layer {
    /// The component this layer represents.
    pub id: ComponentId,
    /// Absolute screen-space bounds (already resolved by layout).
    pub bounds: Rect,
    /// `parent.effective_z + local.z`, accumulated root to leaf.
    pub effective_z: i64,
}

/// A per-frame snapshot of the tree's stacking order, ascending by
/// `effective_z` with ties broken by tree (declaration) order.
#[derive(Debug, Clone, Default)]
pub struct LayerManager {
    layers: Vec<Layer>,
}

impl LayerManager {
    /// Flatten `tree` into stacking order. Invisible components (and their
    /// subtrees) are excluded.
    #[must_use]
    pub fn snapshot(tree: &ComponentTree) -> Self {
        let mut layers = Vec::new();
        if let Some(root) = tree.root() {
            Self::collect(tree, root, 0, &mut layers);
        }
        // `sort_by_key` is stable, so components with equal effective_z keep
        // the pre-order (declaration) sequence they were collected in.
        layers.sort_by_key(|l| l.effective_z);
        Self { layers }
    }

    fn collect(tree: &ComponentTree, id: ComponentId, parent_z: i64, out: &mut Vec<Layer>) {
        if !tree.visible(id) {
            return;
        }
        let local_z = tree.z(id).unwrap_or(0) as i64;
        let effective_z = parent_z + local_z;
        let bounds = tree.bounds(id).unwrap_or_default();
        out.push(Layer {
            id,
            bounds,
            effective_z,
        });
        for &child in tree.children(id) {
            Self::collect(tree, child, effective_z, out);
        }
    }

    /// The stacking order, ascending by effective z (bottom to top).
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Find the topmost component whose bounds contain `(x, y)`, checking
    /// highest z first.
    #[must_use]
    pub fn hit_test(&self, x: u16, y: u16) -> Option<ComponentId> {
        self.layers
            .iter()
            .rev()
            .find(|l| l.bounds.contains(x, y))
            .map(|l| l.id)
    }

    /// All components whose bounds contain `(x, y)`, from topmost to
    /// bottommost — used when a hit component declines an event and the
    /// engine needs to try the next one underneath rather than bubble to
    /// its own ancestors (e.g. click-through for transparent overlays).
    #[must_use]
    pub fn hit_stack(&self, x: u16, y: u16) -> Vec<ComponentId> {
        self.layers
            .iter()
            .rev()
            .filter(|l| l.bounds.contains(x, y))
            .map(|l| l.id)
            .collect()
    }

    /// Composite every layer's rendered output into `buffer`, lowest z
    /// first so higher layers paint over lower ones. Lines are clipped to
    /// each layer's bounds; a component's declared size intentionally
    /// bounds what it may paint.
    ///
    /// Returns the ids of components whose `render` panicked this pass —
    /// an inverse-red `render error: <msg>` banner is painted at the
    /// component's region instead of its real output. The caller must keep
    /// these ids' dirty flags set (see
    /// [`ComponentTree::render`]/[`ComponentTree::clear_dirty_except`])
    /// rather than clearing them as part of a successful flush.
    pub fn composite(&self, tree: &mut ComponentTree, buffer: &mut Buffer) -> Vec<ComponentId> {
        let mut failed = Vec::new();
        for layer in &self.layers {
            let Some(outcome) = tree.render(layer.id) else {
                continue;
            };
            let bounds = layer.bounds;
            if bounds.is_empty() {
                continue;
            }
            match outcome {
                RenderOutcome::Rendered(output) => {
                    for (row, line) in output.lines.iter().enumerate() {
                        if row as u16 >= bounds.height {
                            break;
                        }
                        let y = bounds.y.saturating_add(row as u16);
                        for (col, ch) in line.chars().enumerate() {
                            if col as u16 >= bounds.width {
                                break;
                            }
                            let x = bounds.x.saturating_add(col as u16);
                            buffer.set(x, y, Cell::from_char(ch));
                        }
                    }
                }
                RenderOutcome::Failed(message) => {
                    failed.push(layer.id);
                    Self::paint_error_banner(buffer, bounds, &message);
                }
            }
        }
        failed
    }

    /// Paint a single-line `render error: <message>` banner in inverse-red
    /// at `bounds`'s top-left corner, clipped to the bounds like any other
    /// component output.
    fn paint_error_banner(buffer: &mut Buffer, bounds: Rect, message: &str) {
        let text = format!("render error: {message}");
        let attrs = CellAttrs::new(StyleFlags::REVERSE, CellAttrs::LINK_ID_NONE);
        for (col, ch) in text.chars().enumerate() {
            if col as u16 >= bounds.width {
                break;
            }
            let x = bounds.x.saturating_add(col as u16);
            let cell = Cell::from_char(ch)
                .with_fg(PackedRgba::RED)
                .with_attrs(attrs);
            buffer.set(x, bounds.y, cell);
        }
    }
}
