#![forbid(unsafe_code)]

//! Layout primitives and solvers.
//!
//! This crate provides the three layout algorithms named in the engine's
//! layout component: [`Flex`] (constraint-based single-axis distribution),
//! [`dock::Dock`] (edge-docking), and [`wrap::Wrap`] (greedy line wrapping).
//! All three are pure functions of `(items, available rect)` — no shared
//! state, no caching, deterministic output for identical input.

pub mod dock;
pub mod wrap;

pub use dock::{Dock, DockEdge};
pub use ftui_core::geometry::{Rect, Sides};
pub use wrap::Wrap;
use std::cmp::min;

/// A constraint on the size of a layout area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Constraint {
    /// An exact size in cells.
    Fixed(u16),
    /// A percentage of the total available size (0.0 to 100.0).
    Percentage(f32),
    /// A minimum size in cells.
    Min(u16),
    /// A maximum size in cells.
    Max(u16),
    /// A ratio of the remaining space (numerator, denominator).
    Ratio(u32, u32),
}

/// The direction to layout items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Top to bottom.
    #[default]
    Vertical,
    /// Left to right.
    Horizontal,
}

/// Alignment of items within the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    /// Align items to the start (left/top).
    #[default]
    Start,
    /// Center items within available space.
    Center,
    /// Align items to the end (right/bottom).
    End,
    /// Distribute space evenly around each item.
    SpaceAround,
    /// Distribute space evenly between items (no outer space).
    SpaceBetween,
    /// Distribute space evenly between and around items (equal gaps everywhere).
    Evenly,
}

/// Size negotiation hints for layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct Measurement {
    /// Minimum width in columns.
    pub min_width: u16,
    /// Minimum height in rows.
    pub min_height: u16,
    /// Maximum width (None = unbounded).
    pub max_width: Option<u16>,
    /// Maximum height (None = unbounded).
    pub max_height: Option<u16>,
}

impl Measurement {
    /// Create a fixed-size measurement (min == max).
    pub fn fixed(width: u16, height: u16) -> Self {
        Self {
            min_width: width,
            min_height: height,
            max_width: Some(width),
            max_height: Some(height),
        }
    }

    /// Create a flexible measurement with minimum size and no maximum.
    pub fn flexible(min_width: u16, min_height: u16) -> Self {
        Self {
            min_width,
            min_height,
            max_width: None,
            max_height: None,
        }
    }
}

/// A flexible layout container.
#[derive(Debug, Clone, Default)]
pub struct Flex {
    direction: Direction,
    constraints: Vec<Constraint>,
    margin: Sides,
    gap: u16,
    alignment: Alignment,
}

impl Flex {
    /// Create a new vertical flex layout.
    pub fn vertical() -> Self {
        Self {
            direction: Direction::Vertical,
            ..Default::default()
        }
    }

    /// Create a new horizontal flex layout.
    pub fn horizontal() -> Self {
        Self {
            direction: Direction::Horizontal,
            ..Default::default()
        }
    }

    /// Set the layout direction.
    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Set the constraints.
    pub fn constraints(mut self, constraints: impl IntoIterator<Item = Constraint>) -> Self {
        self.constraints = constraints.into_iter().collect();
        self
    }

    /// Set the margin.
    pub fn margin(mut self, margin: Sides) -> Self {
        self.margin = margin;
        self
    }

    /// Set the gap between items.
    pub fn gap(mut self, gap: u16) -> Self {
        self.gap = gap;
        self
    }

    /// Set the alignment.
    pub fn alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Split the given area into smaller rectangles according to the configuration.
    pub fn split(&self, area: Rect) -> Vec<Rect> {
        // Apply margin
        let inner = area.inner(self.margin);
        if inner.is_empty() {
            return self.constraints.iter().map(|_| Rect::default()).collect();
        }

        let total_size = match self.direction {
            Direction::Horizontal => inner.width,
            Direction::Vertical => inner.height,
        };

        let count = self.constraints.len();
        if count == 0 {
            return Vec::new();
        }

        // Calculate gaps
        let total_gap = self.gap.saturating_mul((count - 1) as u16);
        let available_size = total_size.saturating_sub(total_gap);

        // Solve constraints to get sizes
        let sizes = solve_constraints(&self.constraints, available_size);

        // Convert sizes to rects
        self.sizes_to_rects(inner, &sizes)
    }

    fn sizes_to_rects(&self, area: Rect, sizes: &[u16]) -> Vec<Rect> {
        let mut rects = Vec::with_capacity(sizes.len());

        // Calculate total used space (sizes + gaps)
        let total_gaps = if sizes.len() > 1 {
            self.gap.saturating_mul((sizes.len() - 1) as u16)
        } else {
            0
        };
        let total_used: u16 = sizes.iter().sum::<u16>().saturating_add(total_gaps);
        let total_available = match self.direction {
            Direction::Horizontal => area.width,
            Direction::Vertical => area.height,
        };
        let leftover = total_available.saturating_sub(total_used);

        // Calculate starting position and gap adjustment based on alignment
        let (start_offset, extra_gap) = match self.alignment {
            Alignment::Start => (0, 0),
            Alignment::End => (leftover, 0),
            Alignment::Center => (leftover / 2, 0),
            Alignment::SpaceBetween => (0, 0),
            Alignment::SpaceAround => {
                if sizes.is_empty() {
                    (0, 0)
                } else {
                    // Space around: equal space before, between, and after
                    let slots = sizes.len() as u32 * 2;
                    let space_unit = (leftover as u32 / slots) as u16;
                    (space_unit, 0)
                }
            }
            Alignment::Evenly => {
                if sizes.is_empty() {
                    (0, 0)
                } else {
                    // n items -> n+1 equal gaps (before, between each pair, after)
                    let slots = sizes.len() as u32 + 1;
                    let unit = (leftover as u32 / slots) as u16;
                    (unit, 0)
                }
            }
        };

        let mut current_pos = match self.direction {
            Direction::Horizontal => area.x.saturating_add(start_offset),
            Direction::Vertical => area.y.saturating_add(start_offset),
        };

        for (i, &size) in sizes.iter().enumerate() {
            let rect = match self.direction {
                Direction::Horizontal => Rect {
                    x: current_pos,
                    y: area.y,
                    width: size,
                    height: area.height,
                },
                Direction::Vertical => Rect {
                    x: area.x,
                    y: current_pos,
                    width: area.width,
                    height: size,
                },
            };
            rects.push(rect);

            // Advance position for next item
            current_pos = current_pos
                .saturating_add(size)
                .saturating_add(self.gap)
                .saturating_add(extra_gap);

            // Add alignment-specific spacing
            match self.alignment {
                Alignment::SpaceBetween => {
                    if sizes.len() > 1 && i < sizes.len() - 1 {
                        let count = (sizes.len() - 1) as u32;
                        let base = leftover as u32 / count;
                        let rem = leftover as u32 % count;
                        let extra = base + if (i as u32) < rem { 1 } else { 0 };
                        current_pos = current_pos.saturating_add(extra as u16);
                    }
                }
                Alignment::SpaceAround => {
                    if !sizes.is_empty() {
                        let slots = sizes.len() as u32 * 2;
                        let unit = leftover as u32 / slots;
                        current_pos = current_pos.saturating_add((unit * 2) as u16);
                    }
                }
                Alignment::Evenly => {
                    let slots = sizes.len() as u32 + 1;
                    let unit = leftover as u32 / slots;
                    current_pos = current_pos.saturating_add(unit as u16);
                }
                _ => {}
            }
        }

        rects
    }
}

/// Solve 1D constraints to determine sizes.
///
/// This shared logic is used by both Flex and Grid layouts.
pub(crate) fn solve_constraints(constraints: &[Constraint], available_size: u16) -> Vec<u16> {
    let mut sizes = vec![0u16; constraints.len()];
    let mut remaining = available_size;
    let mut grow_indices = Vec::new();

    // 1. Allocate Fixed, Percentage, Min
    for (i, &constraint) in constraints.iter().enumerate() {
        match constraint {
            Constraint::Fixed(size) => {
                let size = min(size, remaining);
                sizes[i] = size;
                remaining -= size;
            }
            Constraint::Percentage(p) => {
                let size = (available_size as f32 * p / 100.0).round() as u16;
                let size = min(size, remaining);
                sizes[i] = size;
                remaining -= size;
            }
            Constraint::Min(min_size) => {
                let size = min(min_size, remaining);
                sizes[i] = size;
                remaining -= size;
                grow_indices.push(i);
            }
            Constraint::Max(_) => {
                // Max initially takes 0, but is a candidate for growth
                grow_indices.push(i);
            }
            Constraint::Ratio(_, _) => {
                // Ratio takes 0 initially, candidate for growth
                grow_indices.push(i);
            }
        }
    }

    // 2. Iterative distribution to flexible constraints
    loop {
        if remaining == 0 || grow_indices.is_empty() {
            break;
        }

        let mut total_weight = 0u64;
        const WEIGHT_SCALE: u64 = 10_000;

        for &i in &grow_indices {
            match constraints[i] {
                Constraint::Ratio(n, d) => {
                    total_weight += n as u64 * WEIGHT_SCALE / d.max(1) as u64
                }
                _ => total_weight += WEIGHT_SCALE,
            }
        }

        if total_weight == 0 {
            total_weight = 1;
        }

        let space_to_distribute = remaining;
        let mut shares = vec![0u16; constraints.len()];
        let mut weights = vec![0u64; constraints.len()];

        // Floor each share first, then hand the leftover cells to the
        // highest-weight candidates (ties broken by tree order) — mirrors
        // the flex-weight distribution rule: weights are proportions, the
        // remainder goes to whichever children asked for the most space.
        let mut allocated = 0u64;
        for &i in &grow_indices {
            let weight = match constraints[i] {
                Constraint::Ratio(n, d) => n as u64 * WEIGHT_SCALE / d.max(1) as u64,
                _ => WEIGHT_SCALE,
            };
            weights[i] = weight;
            let size = space_to_distribute as u64 * weight / total_weight;
            shares[i] = size as u16;
            allocated += size;
        }

        let mut remainder = (space_to_distribute as u64).saturating_sub(allocated);
        let mut order: Vec<usize> = grow_indices.clone();
        order.sort_by(|&a, &b| weights[b].cmp(&weights[a]));
        let mut idx = 0;
        while remainder > 0 && !order.is_empty() {
            let i = order[idx % order.len()];
            shares[i] = shares[i].saturating_add(1);
            remainder -= 1;
            idx += 1;
        }

        // Check for Max constraint violations
        let mut violations = Vec::new();
        for &i in &grow_indices {
            if let Constraint::Max(max_val) = constraints[i]
                && sizes[i] + shares[i] > max_val
            {
                violations.push(i);
            }
        }

        if violations.is_empty() {
            // No violations, commit shares and exit
            for &i in &grow_indices {
                sizes[i] += shares[i];
            }
            break;
        }

        // Handle violations: clamp to Max and remove from grow pool
        for i in violations {
            if let Constraint::Max(max_val) = constraints[i] {
                // Calculate how much space this item *actually* consumes from remaining
                // which is (max - current_size)
                let consumed = max_val.saturating_sub(sizes[i]);
                sizes[i] = max_val;
                remaining = remaining.saturating_sub(consumed);

                // Remove from grow indices
                if let Some(pos) = grow_indices.iter().position(|&x| x == i) {
                    grow_indices.remove(pos);
                }
            }
        }
    }

    sizes
}
