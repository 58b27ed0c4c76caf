//! Bidirectional mapping between movie ids and index positions.
//!
//! The neighbor structure only speaks in row positions; this bridge
//! translates positions back to domain ids and ids to positions. It is
//! built once by enumerating the feature table in its stored order, so the
//! two directions are bijective by construction. A movie absent from the
//! table fails lookup explicitly rather than defaulting to position 0.

use crate::error::{Result, RetrievalError};
use crate::features::FeatureTable;
use catalog::MovieId;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct IndexBridge {
    position_of: HashMap<MovieId, usize>,
    movie_id_of: Vec<MovieId>,
}

impl IndexBridge {
    /// Build the bridge from the table's stored row order.
    ///
    /// Positions 0..n-1 are assigned in enumeration order, which must match
    /// the order the neighbor structure was fitted on. The table has already
    /// rejected duplicate ids, so the mapping is bijective.
    pub fn from_table(table: &FeatureTable) -> Self {
        let mut position_of = HashMap::with_capacity(table.len());
        let mut movie_id_of = Vec::with_capacity(table.len());

        for (position, row) in table.rows().iter().enumerate() {
            position_of.insert(row.movie_id, position);
            movie_id_of.push(row.movie_id);
        }

        Self {
            position_of,
            movie_id_of,
        }
    }

    /// Position of a movie inside the fitted structure
    ///
    /// Fails with `UnknownMovie` if the movie has no feature row.
    pub fn position_of(&self, id: MovieId) -> Result<usize> {
        self.position_of
            .get(&id)
            .copied()
            .ok_or(RetrievalError::UnknownMovie { id })
    }

    /// Movie id stored at a position
    ///
    /// Fails with `OutOfRange` if the position was never assigned.
    pub fn movie_id_of(&self, position: usize) -> Result<MovieId> {
        self.movie_id_of
            .get(position)
            .copied()
            .ok_or(RetrievalError::OutOfRange {
                position,
                len: self.movie_id_of.len(),
            })
    }

    /// Whether the movie has an assigned position
    pub fn contains(&self, id: MovieId) -> bool {
        self.position_of.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.movie_id_of.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movie_id_of.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureRow;

    fn test_table() -> FeatureTable {
        FeatureTable::from_rows(vec![
            FeatureRow {
                movie_id: 42,
                vector: vec![0.1],
            },
            FeatureRow {
                movie_id: 7,
                vector: vec![0.2],
            },
            FeatureRow {
                movie_id: 100,
                vector: vec![0.3],
            },
        ])
        .unwrap()
    }

    #[test]
    fn test_positions_follow_stored_order() {
        let bridge = IndexBridge::from_table(&test_table());
        assert_eq!(bridge.position_of(42).unwrap(), 0);
        assert_eq!(bridge.position_of(7).unwrap(), 1);
        assert_eq!(bridge.position_of(100).unwrap(), 2);
    }

    #[test]
    fn test_bijection_round_trip() {
        let bridge = IndexBridge::from_table(&test_table());
        for position in 0..bridge.len() {
            let id = bridge.movie_id_of(position).unwrap();
            assert_eq!(bridge.position_of(id).unwrap(), position);
        }
        for id in [42, 7, 100] {
            let position = bridge.position_of(id).unwrap();
            assert_eq!(bridge.movie_id_of(position).unwrap(), id);
        }
    }

    #[test]
    fn test_unknown_movie_fails_explicitly() {
        let bridge = IndexBridge::from_table(&test_table());
        assert!(matches!(
            bridge.position_of(999),
            Err(RetrievalError::UnknownMovie { id: 999 })
        ));
    }

    #[test]
    fn test_out_of_range_fails_explicitly() {
        let bridge = IndexBridge::from_table(&test_table());
        assert!(matches!(
            bridge.movie_id_of(3),
            Err(RetrievalError::OutOfRange { position: 3, len: 3 })
        ));
    }
}
