#![forbid(unsafe_code)]

//! Progressive render-quality degradation.
//!
//! Bursty input (large pastes, fast log streams) can make a single frame's
//! composition+diff+flush pass exceed the frame budget. Rather than block
//! the render loop, callers can step [`DegradationLevel`] down to trade
//! visual fidelity for latency, then step it back up once the burst clears.
//! A [`Buffer`](crate::buffer::Buffer) carries the level for the frame so
//! drawing code can read it and skip expensive decoration.

/// Progressive degradation levels for render quality.
///
/// Higher levels mean less visual fidelity but cheaper rendering. The
/// ordering is significant: `Full` < `SimpleBorders` < ... < `SkipFrame`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum DegradationLevel {
    /// All visual features enabled.
    #[default]
    Full = 0,
    /// Unicode box-drawing replaced with ASCII (`+--+`).
    SimpleBorders = 1,
    /// Colors disabled, monochrome output.
    NoStyling = 2,
    /// Skip decorative content, essential text only.
    EssentialOnly = 3,
    /// Emergency: skip the frame entirely (render scheduler increments
    /// `skip_count` instead of compositing).
    SkipFrame = 4,
}

impl DegradationLevel {
    /// Move to the next (worse quality) degradation level.
    ///
    /// Returns `SkipFrame` if already at maximum degradation.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Full => Self::SimpleBorders,
            Self::SimpleBorders => Self::NoStyling,
            Self::NoStyling => Self::EssentialOnly,
            Self::EssentialOnly | Self::SkipFrame => Self::SkipFrame,
        }
    }

    /// Move to the previous (better quality) degradation level.
    ///
    /// Returns `Full` if already at minimum degradation.
    #[inline]
    #[must_use]
    pub const fn prev(self) -> Self {
        match self {
            Self::SkipFrame => Self::EssentialOnly,
            Self::EssentialOnly => Self::NoStyling,
            Self::NoStyling => Self::SimpleBorders,
            Self::SimpleBorders | Self::Full => Self::Full,
        }
    }

    /// Whether this is the maximum degradation level.
    #[inline]
    #[must_use]
    pub const fn is_max(self) -> bool {
        matches!(self, Self::SkipFrame)
    }

    /// Whether this is full quality (no degradation).
    #[inline]
    #[must_use]
    pub const fn is_full(self) -> bool {
        matches!(self, Self::Full)
    }
}
