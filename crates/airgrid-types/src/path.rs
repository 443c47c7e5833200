//! Travel paths: ordered sequences of grid cells forming a trajectory.
//!
//! A [`TravelPath`] is a committed or candidate trajectory through the
//! grid. Index order is visit order, and ticks must be monotonically
//! non-decreasing along the path. Paths are created fresh by every
//! pathfinding call and owned by whichever allocation record references
//! them until superseded.

use serde::{Deserialize, Serialize};

use crate::coordinate::{Tick, TimeCoordinate};

/// An ordered trajectory through the spatiotemporal grid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelPath {
    locations: Vec<TimeCoordinate>,
}

impl TravelPath {
    /// Create a path from an ordered list of cells.
    pub const fn new(locations: Vec<TimeCoordinate>) -> Self {
        Self { locations }
    }

    /// Create an empty path.
    pub const fn empty() -> Self {
        Self {
            locations: Vec::new(),
        }
    }

    /// Number of cells on the path.
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// Whether the path has no cells.
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// The first cell of the path, if any.
    pub fn first(&self) -> Option<TimeCoordinate> {
        self.locations.first().copied()
    }

    /// The last cell of the path, if any.
    pub fn last(&self) -> Option<TimeCoordinate> {
        self.locations.last().copied()
    }

    /// Iterate over the cells in visit order.
    pub fn iter(&self) -> core::slice::Iter<'_, TimeCoordinate> {
        self.locations.iter()
    }

    /// Whether the path visits the given cell (exact match, tick included).
    pub fn contains(&self, coordinate: &TimeCoordinate) -> bool {
        self.locations.contains(coordinate)
    }

    /// Append a further segment to the path. The caller is responsible
    /// for ensuring the segment continues where the path ends.
    pub fn extend_with(&mut self, segment: Vec<TimeCoordinate>) {
        self.locations.extend(segment);
    }

    /// Elapsed ticks between the first and last cell. Empty and
    /// single-cell paths have zero flight time.
    pub fn flight_time(&self) -> Tick {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) => last.t.saturating_sub(first.t),
            _ => 0,
        }
    }

    /// Whether ticks never decrease along the path. Violations indicate
    /// a defective pathfinding result and are checked by tests.
    pub fn is_time_ordered(&self) -> bool {
        self.locations.windows(2).all(|pair| match pair {
            [a, b] => a.t <= b.t,
            _ => true,
        })
    }
}

impl From<Vec<TimeCoordinate>> for TravelPath {
    fn from(locations: Vec<TimeCoordinate>) -> Self {
        Self::new(locations)
    }
}

impl<'a> IntoIterator for &'a TravelPath {
    type Item = &'a TimeCoordinate;
    type IntoIter = core::slice::Iter<'a, TimeCoordinate>;

    fn into_iter(self) -> Self::IntoIter {
        self.locations.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_path() -> TravelPath {
        TravelPath::new(vec![
            TimeCoordinate::new(0, 0, 0, 0),
            TimeCoordinate::new(1, 0, 0, 1),
            TimeCoordinate::new(2, 0, 0, 2),
        ])
    }

    #[test]
    fn flight_time_spans_first_to_last() {
        assert_eq!(straight_path().flight_time(), 2);
        assert_eq!(TravelPath::empty().flight_time(), 0);
    }

    #[test]
    fn extend_appends_in_order() {
        let mut path = straight_path();
        path.extend_with(vec![TimeCoordinate::new(2, 1, 0, 3)]);
        assert_eq!(path.len(), 4);
        assert_eq!(path.last(), Some(TimeCoordinate::new(2, 1, 0, 3)));
    }

    #[test]
    fn time_ordering_check() {
        assert!(straight_path().is_time_ordered());

        let backwards = TravelPath::new(vec![
            TimeCoordinate::new(0, 0, 0, 5),
            TimeCoordinate::new(1, 0, 0, 4),
        ]);
        assert!(!backwards.is_time_ordered());

        // Equal consecutive ticks are allowed (non-decreasing).
        let plateau = TravelPath::new(vec![
            TimeCoordinate::new(0, 0, 0, 5),
            TimeCoordinate::new(1, 0, 0, 5),
        ]);
        assert!(plateau.is_time_ordered());
    }

    #[test]
    fn contains_is_exact() {
        let path = straight_path();
        assert!(path.contains(&TimeCoordinate::new(1, 0, 0, 1)));
        // Same location at a different tick is a different cell.
        assert!(!path.contains(&TimeCoordinate::new(1, 0, 0, 2)));
    }
}
