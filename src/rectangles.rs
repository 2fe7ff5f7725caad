//! Corner-anchored selection rectangles and the per-subgrid rectangle list.
//!
//! The list owns the rectangle vec plus two flattened projections (each
//! rectangle collapsed to zero height or zero width) that answer
//! "does the selection cover this column/row" in time proportional to the
//! rectangle count, not the covered area. All three containers are private
//! and mutated only together, so they can never desynchronize.

/// Which corner of a rectangle was the original anchor of the gesture.
///
/// Growth and shrink operations preserve the anchor so that continued
/// dragging extends from the correct edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FirstCorner {
    #[default]
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl FirstCorner {
    pub fn is_top(self) -> bool {
        matches!(self, Self::TopLeft | Self::TopRight)
    }

    pub fn is_left(self) -> bool {
        matches!(self, Self::TopLeft | Self::BottomLeft)
    }
}

/// Outcome of adjusting one rectangle for a structural mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustOutcome {
    Unchanged,
    Adjusted,
    /// The rectangle's extent collapsed to nothing under a deletion.
    Removed,
}

/// An axis-aligned selection rectangle in (active column, subgrid row) index
/// space, half-open on both axes.
///
/// Equality is by geometry only; the anchored corner is interaction state,
/// not identity.
#[derive(Debug, Clone, Copy)]
pub struct SelectionRect {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    first_corner: FirstCorner,
}

impl PartialEq for SelectionRect {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x
            && self.y == other.y
            && self.width == other.width
            && self.height == other.height
    }
}

impl Eq for SelectionRect {}

impl SelectionRect {
    /// Rectangle anchored at its top-left corner.
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self::with_corner(x, y, width, height, FirstCorner::TopLeft)
    }

    pub fn with_corner(x: u32, y: u32, width: u32, height: u32, first_corner: FirstCorner) -> Self {
        Self {
            x,
            y,
            width,
            height,
            first_corner,
        }
    }

    /// Rectangle spanning two inclusive cell coordinates, anchored at the
    /// first of them.
    pub fn from_points(first_x: u32, first_y: u32, last_x: u32, last_y: u32) -> Self {
        let x = first_x.min(last_x);
        let y = first_y.min(last_y);
        let first_corner = match (first_x <= last_x, first_y <= last_y) {
            (true, true) => FirstCorner::TopLeft,
            (false, true) => FirstCorner::TopRight,
            (true, false) => FirstCorner::BottomLeft,
            (false, false) => FirstCorner::BottomRight,
        };
        Self {
            x,
            y,
            width: first_x.max(last_x) - x + 1,
            height: first_y.max(last_y) - y + 1,
            first_corner,
        }
    }

    pub fn x(&self) -> u32 {
        self.x
    }

    pub fn y(&self) -> u32 {
        self.y
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn first_corner(&self) -> FirstCorner {
        self.first_corner
    }

    /// Exclusive right edge.
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Whether either extent is zero (covers no cells).
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        self.contains_x(x) && self.contains_y(y)
    }

    pub fn contains_x(&self, x: u32) -> bool {
        x >= self.x && x < self.right()
    }

    pub fn contains_y(&self, y: u32) -> bool {
        y >= self.y && y < self.bottom()
    }

    /// Copy collapsed to zero height (column projection).
    fn x_projection(&self) -> Self {
        Self {
            height: 0,
            ..*self
        }
    }

    /// Copy collapsed to zero width (row projection).
    fn y_projection(&self) -> Self {
        Self { width: 0, ..*self }
    }

    // ------------------------------------------------------------------
    // Structural adjustment, one axis at a time
    // ------------------------------------------------------------------

    pub fn adjust_x_inserted(&mut self, start: u32, count: u32) -> AdjustOutcome {
        Self::adjust_axis_inserted(&mut self.x, &mut self.width, start, count)
    }

    pub fn adjust_x_deleted(&mut self, start: u32, count: u32) -> AdjustOutcome {
        Self::adjust_axis_deleted(&mut self.x, &mut self.width, start, count)
    }

    pub fn adjust_y_inserted(&mut self, start: u32, count: u32) -> AdjustOutcome {
        Self::adjust_axis_inserted(&mut self.y, &mut self.height, start, count)
    }

    pub fn adjust_y_deleted(&mut self, start: u32, count: u32) -> AdjustOutcome {
        Self::adjust_axis_deleted(&mut self.y, &mut self.height, start, count)
    }

    /// Row-block move on the y axis, composed as deletion then insertion.
    ///
    /// A rectangle cannot track rows moved out of its interior without
    /// splitting, so the moved block's membership is not preserved here; the
    /// row range lists carry the exact membership.
    pub fn adjust_y_moved(&mut self, old_index: u32, new_index: u32, count: u32) -> AdjustOutcome {
        if count == 0 || old_index == new_index {
            return AdjustOutcome::Unchanged;
        }
        let deleted = self.adjust_y_deleted(old_index, count);
        if deleted == AdjustOutcome::Removed {
            return AdjustOutcome::Removed;
        }
        let inserted = self.adjust_y_inserted(new_index, count);
        if deleted == AdjustOutcome::Unchanged && inserted == AdjustOutcome::Unchanged {
            AdjustOutcome::Unchanged
        } else {
            AdjustOutcome::Adjusted
        }
    }

    fn adjust_axis_inserted(pos: &mut u32, extent: &mut u32, start: u32, count: u32) -> AdjustOutcome {
        if count == 0 {
            return AdjustOutcome::Unchanged;
        }
        if *pos >= start {
            *pos += count;
            AdjustOutcome::Adjusted
        } else if *pos + *extent > start {
            *extent += count;
            AdjustOutcome::Adjusted
        } else {
            AdjustOutcome::Unchanged
        }
    }

    fn adjust_axis_deleted(pos: &mut u32, extent: &mut u32, start: u32, count: u32) -> AdjustOutcome {
        if count == 0 {
            return AdjustOutcome::Unchanged;
        }
        let end = start + count;
        let r_end = *pos + *extent;
        if r_end <= start {
            return AdjustOutcome::Unchanged;
        }
        if *pos >= end {
            *pos -= count;
            return AdjustOutcome::Adjusted;
        }
        let overlap = r_end.min(end) - (*pos).max(start);
        let new_extent = *extent - overlap;
        if new_extent == 0 {
            return AdjustOutcome::Removed;
        }
        *pos = (*pos).min(start);
        *extent = new_extent;
        AdjustOutcome::Adjusted
    }
}

/// The rectangles selected in one subgrid, with derived projections.
#[derive(Debug, Clone, Default)]
pub struct RectangleList {
    rects: Vec<SelectionRect>,
    x_projections: Vec<SelectionRect>,
    y_projections: Vec<SelectionRect>,
}

impl RectangleList {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Mutation (all three containers move together)
    // ------------------------------------------------------------------

    pub fn push(&mut self, rect: SelectionRect) {
        self.x_projections.push(rect.x_projection());
        self.y_projections.push(rect.y_projection());
        self.rects.push(rect);
    }

    /// Replace the whole list with a single rectangle.
    pub fn only(&mut self, rect: SelectionRect) {
        self.clear();
        self.push(rect);
    }

    pub fn remove_at(&mut self, index: usize) -> Option<SelectionRect> {
        if index >= self.rects.len() {
            return None;
        }
        self.x_projections.remove(index);
        self.y_projections.remove(index);
        Some(self.rects.remove(index))
    }

    /// Remove the most recently pushed rectangle with this geometry.
    pub fn remove(&mut self, rect: &SelectionRect) -> bool {
        match self.rects.iter().rposition(|r| r == rect) {
            Some(index) => {
                self.remove_at(index);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.rects.clear();
        self.x_projections.clear();
        self.y_projections.clear();
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn get(&self, index: usize) -> Option<&SelectionRect> {
        self.rects.get(index)
    }

    pub fn last(&self) -> Option<&SelectionRect> {
        self.rects.last()
    }

    pub fn rects(&self) -> &[SelectionRect] {
        &self.rects
    }

    pub fn contains_point(&self, x: u32, y: u32) -> bool {
        self.rects.iter().any(|r| r.contains(x, y))
    }

    /// Whether any rectangle covers column `x` (projection hit-test).
    pub fn contains_x(&self, x: u32) -> bool {
        self.x_projections.iter().any(|r| r.contains_x(x))
    }

    /// Whether any rectangle covers row `y` (projection hit-test).
    pub fn contains_y(&self, y: u32) -> bool {
        self.y_projections.iter().any(|r| r.contains_y(y))
    }

    /// Indices of every rectangle covering the point, in push order.
    pub fn rects_containing_point(&self, x: u32, y: u32) -> Vec<usize> {
        self.rects
            .iter()
            .enumerate()
            .filter(|(_, r)| r.contains(x, y))
            .map(|(i, _)| i)
            .collect()
    }

    // ------------------------------------------------------------------
    // Structural adjustment
    // ------------------------------------------------------------------

    pub fn adjust_for_x_inserted(&mut self, start: u32, count: u32) -> bool {
        self.adjust_each(|r| r.adjust_x_inserted(start, count))
    }

    pub fn adjust_for_x_deleted(&mut self, start: u32, count: u32) -> bool {
        self.adjust_each(|r| r.adjust_x_deleted(start, count))
    }

    pub fn adjust_for_y_inserted(&mut self, start: u32, count: u32) -> bool {
        self.adjust_each(|r| r.adjust_y_inserted(start, count))
    }

    pub fn adjust_for_y_deleted(&mut self, start: u32, count: u32) -> bool {
        self.adjust_each(|r| r.adjust_y_deleted(start, count))
    }

    pub fn adjust_for_y_moved(&mut self, old_index: u32, new_index: u32, count: u32) -> bool {
        self.adjust_each(|r| r.adjust_y_moved(old_index, new_index, count))
    }

    fn adjust_each(&mut self, f: impl Fn(&mut SelectionRect) -> AdjustOutcome) -> bool {
        let mut changed = false;
        let mut index = 0;
        while index < self.rects.len() {
            let outcome = match self.rects.get_mut(index) {
                Some(r) => f(r),
                None => break,
            };
            match outcome {
                AdjustOutcome::Removed => {
                    self.remove_at(index);
                    changed = true;
                }
                AdjustOutcome::Adjusted => {
                    self.resync_projections(index);
                    changed = true;
                    index += 1;
                }
                AdjustOutcome::Unchanged => {
                    index += 1;
                }
            }
        }
        changed
    }

    fn resync_projections(&mut self, index: usize) {
        let Some(rect) = self.rects.get(index).copied() else {
            return;
        };
        if let Some(px) = self.x_projections.get_mut(index) {
            *px = rect.x_projection();
        }
        if let Some(py) = self.y_projections.get_mut(index) {
            *py = rect.y_projection();
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

    #[test]
    fn test_from_points_derives_corner() {
        let r = SelectionRect::from_points(5, 7, 2, 3);
        assert_eq!((r.x(), r.y(), r.width(), r.height()), (2, 3, 4, 5));
        assert_eq!(r.first_corner(), FirstCorner::BottomRight);

        let r = SelectionRect::from_points(2, 3, 5, 7);
        assert_eq!(r.first_corner(), FirstCorner::TopLeft);
    }

    #[test]
    fn test_geometry_equality_ignores_corner() {
        let a = SelectionRect::with_corner(1, 2, 3, 4, FirstCorner::TopLeft);
        let b = SelectionRect::with_corner(1, 2, 3, 4, FirstCorner::BottomRight);
        assert_eq!(a, b);
    }

    #[test]
    fn test_projection_hit_tests() {
        let mut list = RectangleList::new();
        list.push(SelectionRect::new(2, 10, 3, 5));
        list.push(SelectionRect::new(8, 0, 1, 2));
        assert!(list.contains_x(4));
        assert!(!list.contains_x(5));
        assert!(list.contains_y(14));
        assert!(!list.contains_y(15));
        assert!(list.contains_point(8, 1));
        assert!(!list.contains_point(8, 2));
    }

    #[test]
    fn test_rects_containing_point() {
        let mut list = RectangleList::new();
        list.push(SelectionRect::new(0, 0, 5, 5));
        list.push(SelectionRect::new(3, 3, 5, 5));
        assert_eq!(list.rects_containing_point(4, 4), vec![0, 1]);
        assert_eq!(list.rects_containing_point(1, 1), vec![0]);
    }

    #[test]
    fn test_remove_takes_most_recent_match() {
        let mut list = RectangleList::new();
        list.push(SelectionRect::new(0, 0, 2, 2));
        list.push(SelectionRect::new(0, 0, 2, 2));
        assert!(list.remove(&SelectionRect::new(0, 0, 2, 2)));
        assert_eq!(list.len(), 1);
        assert!(list.remove(&SelectionRect::new(0, 0, 2, 2)));
        assert!(!list.remove(&SelectionRect::new(0, 0, 2, 2)));
        assert!(list.is_empty());
    }

    #[test]
    fn test_deletion_removes_collapsed_rect() {
        let mut list = RectangleList::new();
        list.push(SelectionRect::new(0, 3, 4, 2));
        list.push(SelectionRect::new(0, 10, 4, 2));
        // delete rows [3, 5): first rect collapses and is removed
        assert!(list.adjust_for_y_deleted(3, 2));
        assert_eq!(list.len(), 1);
        assert_eq!(list.get(0), Some(&SelectionRect::new(0, 8, 4, 2)));
        // projections follow the shift
        assert!(list.contains_y(9));
        assert!(!list.contains_y(3));
    }

    #[test]
    fn test_insertion_grows_straddled_rect() {
        let mut list = RectangleList::new();
        list.push(SelectionRect::new(0, 3, 4, 4));
        assert!(list.adjust_for_y_inserted(5, 2));
        assert_eq!(list.get(0), Some(&SelectionRect::new(0, 3, 4, 6)));
        assert!(list.contains_y(8));
    }

    #[test]
    fn test_insertion_never_removes_zero_extent_rect() {
        let mut list = RectangleList::new();
        list.push(SelectionRect::new(0, 3, 0, 4));
        assert!(!list.adjust_for_x_inserted(5, 2));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_deleted_window_overlapping_start_trims() {
        let mut r = SelectionRect::new(2, 5, 4, 10);
        assert_eq!(r.adjust_y_deleted(3, 4), AdjustOutcome::Adjusted);
        // rows [5,7) of the rect die, remainder re-anchors at the window start
        assert_eq!((r.y(), r.height()), (3, 8));
    }

    #[test]
    fn test_y_moved_composes_delete_and_insert() {
        let mut r = SelectionRect::new(0, 10, 2, 4);
        // move rows [0,2) to position 20: rect shifts up then is untouched by
        // the insertion below it
        assert_eq!(r.adjust_y_moved(0, 20, 2), AdjustOutcome::Adjusted);
        assert_eq!((r.y(), r.height()), (8, 4));
    }

    #[test]
    fn test_y_moved_consuming_rect_removes_it() {
        let mut list = RectangleList::new();
        list.push(SelectionRect::new(0, 4, 2, 2));
        assert!(list.adjust_for_y_moved(4, 0, 2));
        assert!(list.is_empty());
    }
}
