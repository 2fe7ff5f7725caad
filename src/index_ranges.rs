//! Contiguous index range bookkeeping for row and column selection.
//!
//! Selected indices are stored as sorted, disjoint, non-abutting half-open
//! ranges, so every operation costs O(affected ranges) rather than O(selected
//! indices). Index counts can run into the millions; range counts rarely pass
//! a handful.

/// A contiguous half-open run of indices `[start, start + length)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRange {
    pub start: u32,
    pub length: u32,
}

impl IndexRange {
    pub fn new(start: u32, length: u32) -> Self {
        Self { start, length }
    }

    /// Exclusive end of the run.
    pub fn end(&self) -> u32 {
        self.start + self.length
    }

    pub fn contains(&self, index: u32) -> bool {
        index >= self.start && index < self.end()
    }
}

/// How many indices a list holds, to the extent a yes/no caller cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountClass {
    Zero,
    One,
    Many,
}

/// An ordered set of disjoint, non-abutting index ranges.
///
/// Invariant: ranges are sorted ascending by `start`, never overlap, and
/// never abut (abutting ranges are merged on insertion).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexRangeList {
    ranges: Vec<IndexRange>,
}

impl IndexRangeList {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Insert an interval, merging with any range it overlaps or abuts.
    ///
    /// A negative `length` means `position` is the exclusive *end* and the
    /// interval extends backward from it. Returns whether any index that was
    /// not already selected became selected.
    pub fn add(&mut self, position: u32, length: i32) -> bool {
        let span = length.unsigned_abs();
        let start = if length < 0 {
            assert!(position >= span, "backward interval extends below index zero");
            position - span
        } else {
            position
        };
        self.add_span(start, span)
    }

    /// Insert `[start, start + length)`.
    pub fn add_span(&mut self, start: u32, length: u32) -> bool {
        if length == 0 {
            return false;
        }
        let end = start + length;
        // Merge window: every range that overlaps or abuts the new interval.
        let lo = self.ranges.partition_point(|r| r.end() < start);
        let hi = self.ranges.partition_point(|r| r.start <= end);
        if lo == hi {
            self.ranges.insert(lo, IndexRange::new(start, length));
            return true;
        }
        let mut merged_start = start;
        let mut merged_end = end;
        let mut covered: u64 = 0;
        for r in self.ranges.get(lo..hi).unwrap_or(&[]) {
            merged_start = merged_start.min(r.start);
            merged_end = merged_end.max(r.end());
            let ov_start = r.start.max(start);
            let ov_end = r.end().min(end);
            if ov_end > ov_start {
                covered += u64::from(ov_end - ov_start);
            }
        }
        let changed = covered < u64::from(length);
        self.ranges.splice(
            lo..hi,
            std::iter::once(IndexRange::new(merged_start, merged_end - merged_start)),
        );
        changed
    }

    /// Remove `[start, start + length)`.
    ///
    /// Ranges fully inside the interval disappear; a range straddling one
    /// boundary is trimmed; a range straddling both is split in two. Returns
    /// whether any selected index was removed.
    pub fn delete(&mut self, start: u32, length: u32) -> bool {
        if length == 0 {
            return false;
        }
        let end = start + length;
        let lo = self.ranges.partition_point(|r| r.end() <= start);
        let hi = self.ranges.partition_point(|r| r.start < end);
        if lo >= hi {
            return false;
        }
        let mut keep: Vec<IndexRange> = Vec::with_capacity(2);
        if let Some(first) = self.ranges.get(lo) {
            if first.start < start {
                keep.push(IndexRange::new(first.start, start - first.start));
            }
        }
        if let Some(last) = self.ranges.get(hi - 1) {
            if last.end() > end {
                keep.push(IndexRange::new(end, last.end() - end));
            }
        }
        self.ranges.splice(lo..hi, keep);
        true
    }

    pub fn clear(&mut self) {
        self.ranges.clear();
    }

    // ------------------------------------------------------------------
    // Overlap queries
    // ------------------------------------------------------------------

    /// Intersection of `[start, start + length)` with the *first* range it
    /// touches. Used to re-anchor a last area whose anchor sits at the start.
    pub fn overlap_range_first(&self, start: u32, length: u32) -> Option<IndexRange> {
        let end = start + length;
        let idx = self.ranges.partition_point(|r| r.end() <= start);
        let r = self.ranges.get(idx)?;
        if r.start >= end {
            return None;
        }
        let s = r.start.max(start);
        let e = r.end().min(end);
        Some(IndexRange::new(s, e - s))
    }

    /// Intersection of `[start, start + length)` with the *last* range it
    /// touches. Used to re-anchor a last area whose anchor sits at the end.
    pub fn overlap_range_last(&self, start: u32, length: u32) -> Option<IndexRange> {
        let end = start + length;
        let hi = self.ranges.partition_point(|r| r.start < end);
        if hi == 0 {
            return None;
        }
        let r = self.ranges.get(hi - 1)?;
        if r.end() <= start {
            return None;
        }
        let s = r.start.max(start);
        let e = r.end().min(end);
        Some(IndexRange::new(s, e - s))
    }

    // ------------------------------------------------------------------
    // Structural adjustment
    // ------------------------------------------------------------------

    /// `count` indices were inserted at `start`: ranges at or after `start`
    /// shift forward, a range straddling `start` grows in place.
    pub fn adjust_for_inserted(&mut self, start: u32, count: u32) -> bool {
        if count == 0 {
            return false;
        }
        let lo = self.ranges.partition_point(|r| r.end() <= start);
        let tail = self.ranges.get_mut(lo..).unwrap_or_default();
        let changed = !tail.is_empty();
        for r in tail {
            if r.start >= start {
                r.start += count;
            } else {
                r.length += count;
            }
        }
        changed
    }

    /// `count` indices were deleted at `start`: ranges after the window shift
    /// back, ranges inside disappear, straddling ranges shrink, and two
    /// remainders left abutting by the shift are merged.
    pub fn adjust_for_deleted(&mut self, start: u32, count: u32) -> bool {
        if count == 0 {
            return false;
        }
        let end = start + count;
        let lo = self.ranges.partition_point(|r| r.end() <= start);
        if lo == self.ranges.len() {
            return false;
        }
        let affected = self.ranges.split_off(lo);
        for r in affected {
            let mapped = if r.start >= end {
                Some(IndexRange::new(r.start - count, r.length))
            } else if r.start >= start && r.end() <= end {
                None
            } else if r.start < start && r.end() > end {
                Some(IndexRange::new(r.start, r.length - count))
            } else if r.start < start {
                Some(IndexRange::new(r.start, start - r.start))
            } else {
                Some(IndexRange::new(start, r.end() - end))
            };
            if let Some(m) = mapped {
                self.push_coalesced(m);
            }
        }
        true
    }

    /// `count` indices were moved from `old_index` to `new_index` (final
    /// position, post-removal coordinates).
    ///
    /// Selection membership travels with the moved indices, so the total
    /// selected-index count never changes: the moved window's selected
    /// sub-ranges are captured, the window is deleted, a gap is opened at the
    /// destination, and the captured sub-ranges are re-added there.
    pub fn adjust_for_moved(&mut self, old_index: u32, new_index: u32, count: u32) -> bool {
        if count == 0 || old_index == new_index {
            return false;
        }
        let captured = self.overlaps_within(old_index, count);
        let mut changed = self.adjust_for_deleted(old_index, count);
        changed |= self.open_gap(new_index, count);
        for rel in &captured {
            self.add_span(new_index + rel.start, rel.length);
            changed = true;
        }
        changed
    }

    /// Selected sub-ranges of `[start, start + count)`, window-relative.
    fn overlaps_within(&self, start: u32, count: u32) -> Vec<IndexRange> {
        let end = start + count;
        let lo = self.ranges.partition_point(|r| r.end() <= start);
        let hi = self.ranges.partition_point(|r| r.start < end);
        self.ranges
            .get(lo..hi)
            .unwrap_or(&[])
            .iter()
            .map(|r| {
                let s = r.start.max(start);
                let e = r.end().min(end);
                IndexRange::new(s - start, e - s)
            })
            .collect()
    }

    /// Shift ranges at or after `start` forward by `count`, splitting (not
    /// growing) a range that straddles the gap position.
    fn open_gap(&mut self, start: u32, count: u32) -> bool {
        if count == 0 {
            return false;
        }
        let lo = self.ranges.partition_point(|r| r.end() <= start);
        if lo == self.ranges.len() {
            return false;
        }
        let straddler = self.ranges.get(lo).copied().filter(|r| r.start < start);
        if let Some(r) = straddler {
            let head = IndexRange::new(r.start, start - r.start);
            let tail = IndexRange::new(start + count, r.end() - start);
            self.ranges.splice(lo..=lo, [head, tail]);
            for r2 in self.ranges.get_mut(lo + 2..).unwrap_or_default() {
                r2.start += count;
            }
        } else {
            for r2 in self.ranges.get_mut(lo..).unwrap_or_default() {
                r2.start += count;
            }
        }
        true
    }

    /// Append preserving the sorted/disjoint/non-abutting invariant when the
    /// pushed range may abut or overlap the current last range.
    fn push_coalesced(&mut self, range: IndexRange) {
        if range.length == 0 {
            return;
        }
        if let Some(last) = self.ranges.last_mut() {
            if last.end() >= range.start {
                let new_end = last.end().max(range.end());
                last.length = new_end - last.start;
                return;
            }
        }
        self.ranges.push(range);
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn range_count(&self) -> usize {
        self.ranges.len()
    }

    pub fn ranges(&self) -> &[IndexRange] {
        &self.ranges
    }

    /// Total number of selected indices.
    pub fn index_count(&self) -> u64 {
        self.ranges.iter().map(|r| u64::from(r.length)).sum()
    }

    pub fn includes_index(&self, index: u32) -> bool {
        self.find_range_with_index(index).is_some()
    }

    /// The range containing `index`, if any.
    pub fn find_range_with_index(&self, index: u32) -> Option<IndexRange> {
        let idx = self.ranges.partition_point(|r| r.end() <= index);
        self.ranges.get(idx).copied().filter(|r| r.contains(index))
    }

    /// Materialize every selected index. Query/test helper; the adjustment
    /// paths never call this.
    pub fn indices(&self) -> Vec<u32> {
        self.ranges.iter().flat_map(|r| r.start..r.end()).collect()
    }

    /// Zero / one / many selected indices, without a full count.
    pub fn count_class(&self) -> CountClass {
        match self.ranges.as_slice() {
            [] => CountClass::Zero,
            [only] if only.length == 1 => CountClass::One,
            _ => CountClass::Many,
        }
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
    use test_case::test_case;

    fn list_of(ranges: &[(u32, u32)]) -> IndexRangeList {
        let mut list = IndexRangeList::new();
        for &(start, length) in ranges {
            list.add_span(start, length);
        }
        list
    }

    fn assert_invariant(list: &IndexRangeList) {
        let ranges = list.ranges();
        for r in ranges {
            assert!(r.length > 0, "zero-length range stored");
        }
        for pair in ranges.windows(2) {
            // sorted, disjoint, and never abutting
            assert!(pair[0].end() < pair[1].start, "ranges {pair:?} overlap or abut");
        }
    }

    #[test]
    fn test_add_merges_overlapping() {
        let mut list = list_of(&[(5, 5), (20, 5)]);
        assert!(list.add_span(8, 4));
        assert_eq!(list.ranges(), &[IndexRange::new(5, 7), IndexRange::new(20, 5)]);
        assert_invariant(&list);
    }

    #[test]
    fn test_add_merges_abutting_both_sides() {
        let mut list = list_of(&[(5, 5), (12, 3)]);
        assert!(list.add_span(10, 2));
        assert_eq!(list.ranges(), &[IndexRange::new(5, 10)]);
        assert_invariant(&list);
    }

    #[test]
    fn test_add_swallows_contained_ranges() {
        let mut list = list_of(&[(5, 2), (10, 2), (15, 2)]);
        assert!(list.add_span(0, 30));
        assert_eq!(list.ranges(), &[IndexRange::new(0, 30)]);
    }

    #[test]
    fn test_add_fully_covered_reports_unchanged() {
        let mut list = list_of(&[(5, 10)]);
        assert!(!list.add_span(7, 3));
        assert_eq!(list.ranges(), &[IndexRange::new(5, 10)]);
    }

    #[test]
    fn test_add_backward_interval() {
        let mut list = IndexRangeList::new();
        // exclusive end 10, extending 3 backward: [7, 10)
        assert!(list.add(10, -3));
        assert_eq!(list.ranges(), &[IndexRange::new(7, 3)]);
    }

    #[test]
    fn test_delete_splits_straddling_range() {
        // spec scenario: [5,10) and [20,25); delete [8,23) leaves [5,8) and [23,25)
        let mut list = list_of(&[(5, 5), (20, 5)]);
        assert!(list.delete(8, 15));
        assert_eq!(list.ranges(), &[IndexRange::new(5, 3), IndexRange::new(23, 2)]);
        assert_invariant(&list);
    }

    #[test]
    fn test_delete_inside_single_range_splits() {
        let mut list = list_of(&[(0, 10)]);
        assert!(list.delete(3, 4));
        assert_eq!(list.ranges(), &[IndexRange::new(0, 3), IndexRange::new(7, 3)]);
    }

    #[test]
    fn test_delete_miss_reports_unchanged() {
        let mut list = list_of(&[(5, 5)]);
        assert!(!list.delete(15, 3));
        assert_eq!(list.ranges(), &[IndexRange::new(5, 5)]);
    }

    #[test]
    fn test_add_then_delete_round_trips() {
        let mut list = list_of(&[(5, 5), (20, 5)]);
        let before = list.clone();
        assert!(list.add_span(40, 3));
        assert!(list.delete(40, 3));
        assert_eq!(list, before);
    }

    #[test_case(0, 3, &[(3, 5)]; "insert before shifts")]
    #[test_case(5, 3, &[(0, 8)]; "insert inside grows")]
    #[test_case(0, 0, &[(0, 5)]; "zero count is a no-op")]
    fn test_adjust_for_inserted(start: u32, count: u32, expected: &[(u32, u32)]) {
        let mut list = list_of(&[(0, 5)]);
        list.adjust_for_inserted(start, count);
        let expected: Vec<IndexRange> = expected
            .iter()
            .map(|&(s, l)| IndexRange::new(s, l))
            .collect();
        assert_eq!(list.ranges(), expected.as_slice());
    }

    #[test]
    fn test_insert_at_range_end_does_not_grow() {
        let mut list = list_of(&[(0, 5)]);
        assert!(!list.adjust_for_inserted(5, 3));
        assert_eq!(list.ranges(), &[IndexRange::new(0, 5)]);
    }

    #[test]
    fn test_adjust_for_deleted_merges_remainders() {
        // [2,5) and [8,11); deleting [5,8) leaves [2,5) and shifted [5,8): merged
        let mut list = list_of(&[(2, 3), (8, 3)]);
        assert!(list.adjust_for_deleted(5, 3));
        assert_eq!(list.ranges(), &[IndexRange::new(2, 6)]);
        assert_invariant(&list);
    }

    #[test]
    fn test_adjust_for_deleted_removes_swallowed() {
        let mut list = list_of(&[(5, 2), (10, 3)]);
        assert!(list.adjust_for_deleted(4, 10));
        assert!(list.is_empty());
    }

    #[test]
    fn test_inserted_then_deleted_is_identity() {
        let mut list = list_of(&[(3, 4), (10, 2), (20, 8)]);
        let before = list.clone();
        list.adjust_for_inserted(11, 5);
        list.adjust_for_deleted(11, 5);
        assert_eq!(list, before);
    }

    #[test]
    fn test_moved_conserves_index_count() {
        let mut list = list_of(&[(5, 5), (20, 5)]);
        let before = list.index_count();
        // move rows [6, 9) down to position 18
        assert!(list.adjust_for_moved(6, 18, 3));
        assert_eq!(list.index_count(), before);
        assert_invariant(&list);
    }

    #[test]
    fn test_moved_unselected_block_into_selected_range() {
        // moving unselected indices into the middle of a selected range must
        // split the range, not select the moved indices
        let mut list = list_of(&[(0, 5)]);
        assert!(list.adjust_for_moved(10, 2, 1));
        assert_eq!(list.index_count(), 5);
        assert!(!list.includes_index(2));
        assert_invariant(&list);
    }

    #[test]
    fn test_moved_selected_block_stays_selected() {
        let mut list = list_of(&[(0, 3)]);
        assert!(list.adjust_for_moved(0, 7, 3));
        assert_eq!(list.indices(), vec![7, 8, 9]);
    }

    #[test]
    fn test_overlap_range_first_and_last() {
        let list = list_of(&[(5, 5), (20, 5)]);
        assert_eq!(list.overlap_range_first(8, 15), Some(IndexRange::new(8, 2)));
        assert_eq!(list.overlap_range_last(8, 15), Some(IndexRange::new(20, 3)));
        assert_eq!(list.overlap_range_first(11, 5), None);
    }

    #[test]
    fn test_find_range_with_index() {
        let list = list_of(&[(5, 5), (20, 5)]);
        assert_eq!(list.find_range_with_index(7), Some(IndexRange::new(5, 5)));
        assert_eq!(list.find_range_with_index(10), None);
        assert!(list.includes_index(24));
        assert!(!list.includes_index(25));
    }

    #[test]
    fn test_count_class() {
        assert_eq!(IndexRangeList::new().count_class(), CountClass::Zero);
        assert_eq!(list_of(&[(4, 1)]).count_class(), CountClass::One);
        assert_eq!(list_of(&[(4, 2)]).count_class(), CountClass::Many);
        assert_eq!(list_of(&[(4, 1), (9, 1)]).count_class(), CountClass::Many);
    }

    #[test]
    fn test_invariant_under_mixed_sequence() {
        let mut list = IndexRangeList::new();
        let ops: &[(bool, u32, u32)] = &[
            (true, 0, 10),
            (false, 2, 3),
            (true, 4, 1),
            (true, 30, 5),
            (false, 0, 1),
            (true, 9, 22),
            (false, 15, 40),
            (true, 15, 1),
        ];
        for &(add, start, len) in ops {
            if add {
                list.add_span(start, len);
            } else {
                list.delete(start, len);
            }
            assert_invariant(&list);
        }
    }
}
