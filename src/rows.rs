//! Per-subgrid row selection.
//!
//! One `IndexRangeList` per subgrid, created lazily on first selection, with
//! queries that target one subgrid or aggregate across all of them.

use std::collections::BTreeMap;

use crate::index_ranges::{CountClass, IndexRange, IndexRangeList};

/// Row selection across every subgrid.
#[derive(Debug, Clone, Default)]
pub struct SelectionRows {
    lists: BTreeMap<usize, IndexRangeList>,
}

impl SelectionRows {
    pub fn new() -> Self {
        Self::default()
    }

    /// The range list for one subgrid, if it was ever touched.
    pub fn list(&self, subgrid: usize) -> Option<&IndexRangeList> {
        self.lists.get(&subgrid)
    }

    /// The range list for one subgrid, created lazily.
    pub fn list_mut(&mut self, subgrid: usize) -> &mut IndexRangeList {
        self.lists.entry(subgrid).or_default()
    }

    /// The range list for one subgrid without creating it.
    pub fn existing_list_mut(&mut self, subgrid: usize) -> Option<&mut IndexRangeList> {
        self.lists.get_mut(&subgrid)
    }

    pub fn clear(&mut self) {
        self.lists.clear();
    }

    /// Drop every selected row of one subgrid. Returns whether any was held.
    pub fn clear_subgrid(&mut self, subgrid: usize) -> bool {
        match self.lists.remove(&subgrid) {
            Some(list) => !list.is_empty(),
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Per-subgrid queries
    // ------------------------------------------------------------------

    pub fn has_indices(&self, subgrid: usize) -> bool {
        self.list(subgrid).is_some_and(|l| !l.is_empty())
    }

    pub fn index_count(&self, subgrid: usize) -> u64 {
        self.list(subgrid).map_or(0, IndexRangeList::index_count)
    }

    pub fn indices(&self, subgrid: usize) -> Vec<u32> {
        self.list(subgrid).map_or_else(Vec::new, IndexRangeList::indices)
    }

    pub fn includes_index(&self, subgrid: usize, index: u32) -> bool {
        self.list(subgrid).is_some_and(|l| l.includes_index(index))
    }

    pub fn find_range_with_index(&self, subgrid: usize, index: u32) -> Option<IndexRange> {
        self.list(subgrid)?.find_range_with_index(index)
    }

    // ------------------------------------------------------------------
    // Whole-collection queries
    // ------------------------------------------------------------------

    /// Whether any subgrid holds any selected row.
    pub fn any_indices(&self) -> bool {
        self.lists.values().any(|l| !l.is_empty())
    }

    pub fn total_index_count(&self) -> u64 {
        self.lists.values().map(IndexRangeList::index_count).sum()
    }

    /// Subgrids that currently hold at least one selected row, ascending.
    pub fn subgrids_with_indices(&self) -> Vec<usize> {
        self.lists
            .iter()
            .filter(|(_, l)| !l.is_empty())
            .map(|(&s, _)| s)
            .collect()
    }

    /// Every selected `(subgrid, row)` pair, subgrid-major.
    pub fn all_indices(&self) -> Vec<(usize, u32)> {
        self.lists
            .iter()
            .flat_map(|(&s, l)| l.indices().into_iter().map(move |i| (s, i)))
            .collect()
    }

    /// Whether the collection holds more than one selected row overall.
    ///
    /// Aggregates the per-subgrid zero/one/many probe with an early return,
    /// so no subgrid is fully counted. Two subgrids each holding exactly one
    /// row count as more than one.
    pub fn has_more_than_one_index(&self) -> bool {
        let mut seen_one = false;
        for list in self.lists.values() {
            match list.count_class() {
                CountClass::Zero => {}
                CountClass::One => {
                    if seen_one {
                        return true;
                    }
                    seen_one = true;
                }
                CountClass::Many => return true,
            }
        }
        false
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_created_lazily() {
        let mut rows = SelectionRows::new();
        assert!(rows.list(0).is_none());
        assert!(!rows.has_indices(0));
        rows.list_mut(0).add_span(3, 2);
        assert!(rows.has_indices(0));
        assert_eq!(rows.indices(0), vec![3, 4]);
        assert!(rows.list(1).is_none());
    }

    #[test]
    fn test_aggregated_queries() {
        let mut rows = SelectionRows::new();
        rows.list_mut(0).add_span(1, 2);
        rows.list_mut(2).add_span(7, 1);
        assert!(rows.any_indices());
        assert_eq!(rows.total_index_count(), 3);
        assert_eq!(rows.subgrids_with_indices(), vec![0, 2]);
        assert_eq!(rows.all_indices(), vec![(0, 1), (0, 2), (2, 7)]);
        assert!(rows.includes_index(2, 7));
        assert!(!rows.includes_index(1, 7));
    }

    #[test]
    fn test_more_than_one_within_single_subgrid() {
        let mut rows = SelectionRows::new();
        rows.list_mut(0).add_span(4, 1);
        assert!(!rows.has_more_than_one_index());
        rows.list_mut(0).add_span(9, 1);
        assert!(rows.has_more_than_one_index());
    }

    #[test]
    fn test_more_than_one_across_subgrids() {
        // two subgrids each holding exactly one row count as more than one
        let mut rows = SelectionRows::new();
        rows.list_mut(0).add_span(4, 1);
        rows.list_mut(1).add_span(4, 1);
        assert!(rows.has_more_than_one_index());
    }

    #[test]
    fn test_empty_list_does_not_trip_probe() {
        let mut rows = SelectionRows::new();
        rows.list_mut(0).add_span(4, 1);
        rows.list_mut(1); // touched but empty
        assert!(!rows.has_more_than_one_index());
    }

    #[test]
    fn test_clear_subgrid() {
        let mut rows = SelectionRows::new();
        rows.list_mut(0).add_span(4, 2);
        assert!(rows.clear_subgrid(0));
        assert!(!rows.clear_subgrid(0));
        assert!(!rows.any_indices());
    }
}
