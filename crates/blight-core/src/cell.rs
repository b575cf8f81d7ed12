//! Cell state and vertical extent types.

use std::fmt;

/// Material/state of a single voxel as seen by the engine.
///
/// The engine only compares states for equality: it never interprets
/// material ids beyond [`CellState::EMPTY`] (for the "do not convert
/// empty space" rule) and the configured conversion target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellState(pub u32);

impl CellState {
    /// Empty space (air).
    pub const EMPTY: CellState = CellState(0);

    /// Default conversion target.
    pub const INFECTED: CellState = CellState(u32::MAX);

    /// Whether this is empty space.
    pub fn is_empty(self) -> bool {
        self == Self::EMPTY
    }
}

impl fmt::Display for CellState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::EMPTY => write!(f, "empty"),
            Self::INFECTED => write!(f, "infected"),
            Self(id) => write!(f, "material#{id}"),
        }
    }
}

impl From<u32> for CellState {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Vertical bounds of a space: `min_y` inclusive, `max_y` exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VerticalExtent {
    /// Lowest addressable Y (inclusive).
    pub min_y: i32,
    /// One past the highest addressable Y (exclusive).
    pub max_y: i32,
}

impl VerticalExtent {
    /// Construct an extent. `min_y` must not exceed `max_y`.
    pub fn new(min_y: i32, max_y: i32) -> Self {
        debug_assert!(min_y <= max_y, "min_y {min_y} exceeds max_y {max_y}");
        Self { min_y, max_y }
    }

    /// Whether `y` is addressable.
    pub fn contains(&self, y: i32) -> bool {
        y >= self.min_y && y < self.max_y
    }

    /// Number of addressable layers.
    pub fn height(&self) -> u32 {
        (i64::from(self.max_y) - i64::from(self.min_y)).max(0) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extent_bounds_are_half_open() {
        let e = VerticalExtent::new(-64, 320);
        assert!(e.contains(-64));
        assert!(e.contains(319));
        assert!(!e.contains(320));
        assert!(!e.contains(-65));
        assert_eq!(e.height(), 384);
    }

    #[test]
    fn empty_extent_contains_nothing() {
        let e = VerticalExtent::new(0, 0);
        assert!(!e.contains(0));
        assert_eq!(e.height(), 0);
    }

    #[test]
    fn cell_state_display() {
        assert_eq!(CellState::EMPTY.to_string(), "empty");
        assert_eq!(CellState::INFECTED.to_string(), "infected");
        assert_eq!(CellState(7).to_string(), "material#7");
        assert!(CellState::EMPTY.is_empty());
        assert!(!CellState(1).is_empty());
    }
}
