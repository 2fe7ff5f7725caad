//! Tests for the selection coordinator's public select/deselect/toggle API.

mod common;

#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use std::rc::Rc;

    use gridsel::{
        AreaKind, AreaKindSpecifier, GridModel, GridSettings, RowOrColumn, Selection,
        SelectionRect, SubgridScope,
    };

    use crate::common::{counting_observer, MockModel};

    /// One subgrid, default settings.
    fn new_selection(rows: u32, columns: u32) -> Selection {
        let model: Rc<dyn GridModel> = Rc::new(MockModel::new(rows, columns));
        Selection::new(model, GridSettings::default())
    }

    // ================================================================
    // Select
    // ================================================================

    #[test]
    fn test_select_rows_sets_last_area_and_notifies_once() {
        let mut sel = new_selection(100, 8);
        let (obs, count) = counting_observer();
        sel.add_observer(obs);

        let area = sel.select_rows(3, 3, 0).unwrap();
        assert_eq!(area.kind(), AreaKind::Row);
        assert_eq!(area.rect(), &SelectionRect::new(0, 3, 8, 3));
        assert_eq!(sel.last_area(), Some(&area));
        assert!(sel.is_cell_selected(5, 4, 0));
        assert!(sel.is_row_selected(0, 5));
        assert!(!sel.is_row_selected(0, 6));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_reselecting_same_rows_returns_area_without_notifying() {
        let mut sel = new_selection(100, 8);
        let (obs, count) = counting_observer();
        sel.add_observer(obs);

        sel.select_rows(3, 3, 0).unwrap();
        let area = sel.select_rows(3, 3, 0).unwrap();
        assert_eq!(area.rect(), &SelectionRect::new(0, 3, 8, 3));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_select_columns_spans_main_subgrid_rows() {
        let mut sel = new_selection(50, 8);
        let area = sel.select_columns(2, 3);
        assert_eq!(area.kind(), AreaKind::Column);
        assert_eq!(area.rect(), &SelectionRect::new(2, 0, 3, 50));
        assert!(sel.is_column_selected(4));
        assert!(!sel.is_column_selected(5));
        assert!(sel.is_cell_selected(3, 49, 0));
    }

    #[test]
    fn test_select_rect_appends_and_anchors() {
        let mut sel = new_selection(100, 8);
        let first = sel.select_rect(1, 1, 2, 2, 0).unwrap();
        let second = sel.select_rect(5, 5, 2, 2, 0).unwrap();
        assert_eq!(sel.rects(0).unwrap().len(), 2);
        assert_eq!(sel.last_area(), Some(&second));
        assert_ne!(first, second);
        assert!(sel.is_cell_selected(2, 2, 0));
        assert!(sel.is_cell_selected(6, 6, 0));
    }

    #[test]
    fn test_select_rect_unknown_subgrid_is_an_error() {
        let mut sel = new_selection(10, 4);
        assert!(sel.select_rect(0, 0, 1, 1, 3).is_err());
    }

    #[test]
    fn test_single_area_mode_clears_previous_areas() {
        let model: Rc<dyn GridModel> = Rc::new(MockModel::new(100, 8));
        let settings = GridSettings {
            multiple_selection_areas: false,
            ..GridSettings::default()
        };
        let mut sel = Selection::new(model, settings);

        sel.select_rows(3, 3, 0).unwrap();
        sel.select_rect(1, 1, 2, 2, 0).unwrap();
        assert!(!sel.rows().any_indices());
        assert_eq!(sel.rects(0).unwrap().len(), 1);
    }

    #[test]
    fn test_rectangle_gesture_redirects_to_rows() {
        let model: Rc<dyn GridModel> = Rc::new(MockModel::new(100, 8));
        let settings = GridSettings {
            mouse_rectangle_selection_to: Some(RowOrColumn::Row),
            ..GridSettings::default()
        };
        let mut sel = Selection::new(model, settings);

        let area = sel.select_rect(1, 2, 3, 4, 0).unwrap();
        assert_eq!(area.kind(), AreaKind::Row);
        assert_eq!(sel.rows().indices(0), vec![2, 3, 4, 5]);
        assert!(sel.rects(0).is_none());
    }

    #[test]
    fn test_rectangle_gesture_redirects_to_columns() {
        let model: Rc<dyn GridModel> = Rc::new(MockModel::new(100, 8));
        let settings = GridSettings {
            mouse_rectangle_selection_to: Some(RowOrColumn::Column),
            ..GridSettings::default()
        };
        let mut sel = Selection::new(model, settings);

        let area = sel.select_rect(1, 2, 3, 4, 0).unwrap();
        assert_eq!(area.kind(), AreaKind::Column);
        assert_eq!(sel.columns().indices(), vec![1, 2, 3]);
    }

    // ================================================================
    // Dynamic all
    // ================================================================

    #[test]
    fn test_dynamic_all_with_zero_rows_has_no_last_area() {
        let mut sel = new_selection(0, 8);
        let area = sel.select_dynamic_all(SubgridScope::One(0)).unwrap();
        assert!(area.is_none());
        assert!(sel.is_dynamic_all(0));
        assert!(sel.last_area().is_none());
    }

    #[test]
    fn test_dynamic_all_last_area_matches_live_counts() {
        let mut sel = new_selection(40, 8);
        let area = sel.select_dynamic_all(SubgridScope::One(0)).unwrap().unwrap();
        assert_eq!(area.kind(), AreaKind::DynamicAll);
        assert_eq!(area.rect(), &SelectionRect::new(0, 0, 8, 40));
        assert!(sel.is_cell_selected(7, 39, 0));
    }

    #[test]
    fn test_dynamic_all_already_active_is_a_no_op() {
        let mut sel = new_selection(40, 8);
        let (obs, count) = counting_observer();
        sel.add_observer(obs);
        sel.select_dynamic_all(SubgridScope::One(0)).unwrap();
        let again = sel.select_dynamic_all(SubgridScope::One(0)).unwrap();
        assert!(again.is_none());
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_dynamic_all_scope_all_covers_every_subgrid() {
        let model: Rc<dyn GridModel> = Rc::new(MockModel::with_subgrids(&[2, 30], 4));
        let mut sel = Selection::new(model, GridSettings::default());
        sel.select_dynamic_all(SubgridScope::All).unwrap();
        assert!(sel.is_dynamic_all(0));
        assert!(sel.is_dynamic_all(1));
        sel.deselect_dynamic_all(SubgridScope::One(0)).unwrap();
        assert!(!sel.is_dynamic_all(0));
        assert!(sel.is_dynamic_all(1));
    }

    // ================================================================
    // Deselect and last-area re-anchoring
    // ================================================================

    #[test]
    fn test_partial_row_deselect_reanchors_last_area() {
        let mut sel = new_selection(100, 8);
        sel.select_rows(2, 6, 0).unwrap();
        sel.deselect_rows(4, 2, 0).unwrap();

        assert_eq!(sel.rows().indices(0), vec![2, 3, 6, 7]);
        // anchor corner is the top, so the first remaining run wins
        let area = sel.last_area().unwrap();
        assert_eq!(area.kind(), AreaKind::Row);
        assert_eq!(area.rect().y(), 2);
        assert_eq!(area.rect().height(), 2);
    }

    #[test]
    fn test_full_row_deselect_drops_last_area() {
        let mut sel = new_selection(100, 8);
        sel.select_rows(2, 3, 0).unwrap();
        sel.deselect_rows(0, 10, 0).unwrap();
        assert!(sel.last_area().is_none());
        assert!(!sel.rows().any_indices());
    }

    #[test]
    fn test_unrelated_row_deselect_keeps_last_area() {
        let mut sel = new_selection(100, 8);
        sel.select_rows(2, 3, 0).unwrap();
        sel.select_rows(20, 3, 0).unwrap();
        let last = sel.last_area().cloned();
        sel.deselect_rows(2, 3, 0).unwrap();
        assert_eq!(sel.last_area(), last.as_ref());
    }

    #[test]
    fn test_partial_column_deselect_reanchors_last_area() {
        let mut sel = new_selection(50, 8);
        sel.select_columns(1, 5);
        sel.deselect_columns(3, 1);
        assert_eq!(sel.columns().indices(), vec![1, 2, 4, 5]);
        let area = sel.last_area().unwrap();
        assert_eq!(area.kind(), AreaKind::Column);
        assert_eq!(area.rect().x(), 1);
        assert_eq!(area.rect().width(), 2);
    }

    #[test]
    fn test_remove_rect_clears_matching_last_area() {
        let mut sel = new_selection(100, 8);
        sel.select_rect(1, 1, 2, 2, 0).unwrap();
        let removed = sel.remove_rect(&SelectionRect::new(1, 1, 2, 2), 0).unwrap();
        assert!(removed);
        assert!(sel.last_area().is_none());
        assert!(!sel.has_any_selection());
        assert!(!sel.remove_rect(&SelectionRect::new(1, 1, 2, 2), 0).unwrap());
    }

    #[test]
    fn test_delete_last_area_routes_by_kind() {
        let mut sel = new_selection(100, 8);
        sel.select_rect(1, 1, 2, 2, 0).unwrap();
        sel.select_rows(10, 2, 0).unwrap();
        sel.delete_last_area();
        assert!(sel.last_area().is_none());
        assert!(!sel.rows().any_indices());
        // the rectangle was not the last area and survives
        assert_eq!(sel.rects(0).unwrap().len(), 1);
    }

    #[test]
    fn test_replace_last_area_with_rect() {
        let mut sel = new_selection(100, 8);
        sel.select_rows(10, 2, 0).unwrap();
        let area = sel.replace_last_area_with_rect(2, 2, 3, 3, 0).unwrap();
        assert_eq!(area.kind(), AreaKind::Rectangle);
        assert!(!sel.rows().any_indices());
        assert_eq!(sel.last_area(), Some(&area));
    }

    #[test]
    fn test_clear_removes_everything_and_notifies_once() {
        let mut sel = new_selection(100, 8);
        sel.select_rows(1, 2, 0).unwrap();
        sel.select_columns(3, 1);
        sel.select_rect(5, 5, 2, 2, 0).unwrap();
        sel.select_dynamic_all(SubgridScope::One(0)).unwrap();

        let (obs, count) = counting_observer();
        sel.add_observer(obs);
        sel.clear();
        assert!(!sel.has_any_selection());
        assert!(sel.last_area().is_none());
        assert_eq!(count.get(), 1);

        sel.clear();
        assert_eq!(count.get(), 1);
    }

    // ================================================================
    // Toggle
    // ================================================================

    #[test]
    fn test_toggle_involution_on_unselected_cell() {
        let mut sel = new_selection(100, 8);
        assert!(sel.toggle_select_cell(2, 3, 0).unwrap());
        assert!(sel.is_cell_selected(2, 3, 0));
        assert!(!sel.toggle_select_cell(2, 3, 0).unwrap());
        assert!(!sel.has_any_selection());
        assert!(sel.last_area().is_none());
    }

    #[test]
    fn test_toggle_removes_dynamic_all_before_rectangle() {
        let mut sel = new_selection(100, 8);
        sel.select_rect(1, 1, 3, 3, 0).unwrap();
        sel.select_dynamic_all(SubgridScope::One(0)).unwrap();

        assert!(!sel.toggle_select_cell(2, 2, 0).unwrap());
        assert!(!sel.is_dynamic_all(0));
        assert_eq!(sel.rects(0).unwrap().len(), 1);
        assert_eq!(sel.cell_coverage_kind(2, 2, 0), Some(AreaKind::Rectangle));
    }

    #[test]
    fn test_toggle_removes_column_before_row() {
        let mut sel = new_selection(100, 8);
        sel.select_columns(2, 1);
        sel.select_rows(3, 1, 0).unwrap();

        assert!(!sel.toggle_select_cell(2, 3, 0).unwrap());
        assert!(!sel.is_column_selected(2));
        assert!(sel.is_row_selected(0, 3));
    }

    #[test]
    fn test_toggle_removes_topmost_covering_rectangle() {
        let mut sel = new_selection(100, 8);
        sel.select_rect(0, 0, 4, 4, 0).unwrap();
        sel.select_rect(2, 2, 4, 4, 0).unwrap();

        assert!(!sel.toggle_select_cell(3, 3, 0).unwrap());
        let rects = sel.rects(0).unwrap();
        assert_eq!(rects.len(), 1);
        assert_eq!(rects.get(0).unwrap(), &SelectionRect::new(0, 0, 4, 4));
    }

    // ================================================================
    // Queries
    // ================================================================

    #[test]
    fn test_area_kind_from_specifier() {
        let mut sel = new_selection(100, 8);
        assert_eq!(
            sel.area_kind_from_specifier(AreaKindSpecifier::Primary),
            AreaKind::Rectangle
        );
        assert_eq!(
            sel.area_kind_from_specifier(AreaKindSpecifier::Secondary),
            AreaKind::Row
        );
        assert_eq!(
            sel.area_kind_from_specifier(AreaKindSpecifier::LastOrPrimary),
            AreaKind::Rectangle
        );
        sel.select_rows(1, 1, 0).unwrap();
        assert_eq!(
            sel.area_kind_from_specifier(AreaKindSpecifier::LastOrPrimary),
            AreaKind::Row
        );
        assert_eq!(
            sel.area_kind_from_specifier(AreaKindSpecifier::Column),
            AreaKind::Column
        );
    }

    #[test]
    fn test_only_selected_cell_single_rectangle() {
        let mut sel = new_selection(100, 8);
        sel.select_cell(2, 3, 0).unwrap();
        assert!(sel
            .is_selected_cell_the_only_selected_cell(2, 3, 0, AreaKind::Rectangle)
            .unwrap());
        sel.select_cell(5, 5, 0).unwrap();
        assert!(!sel
            .is_selected_cell_the_only_selected_cell(2, 3, 0, AreaKind::Rectangle)
            .unwrap());
    }

    #[test]
    fn test_only_selected_cell_mixed_kinds_in_one_by_one_grid() {
        // a row area plus a rectangle still amount to one cell when the
        // grid is 1x1
        let mut sel = new_selection(1, 1);
        sel.select_rows(0, 1, 0).unwrap();
        sel.select_cell(0, 0, 0).unwrap();
        assert!(sel
            .is_selected_cell_the_only_selected_cell(0, 0, 0, AreaKind::Row)
            .unwrap());
        assert!(sel
            .is_selected_cell_the_only_selected_cell(0, 0, 0, AreaKind::Rectangle)
            .unwrap());
    }

    #[test]
    fn test_only_selected_cell_requires_coverage_by_kind() {
        let mut sel = new_selection(100, 8);
        sel.select_cell(2, 3, 0).unwrap();
        assert!(!sel
            .is_selected_cell_the_only_selected_cell(2, 3, 0, AreaKind::Row)
            .unwrap());
    }

    #[test]
    fn test_cell_coverage_kind_priority_order() {
        let model: Rc<dyn GridModel> = Rc::new(MockModel::with_subgrids(&[100, 100], 8));
        let mut sel = Selection::new(model, GridSettings::default());
        sel.select_rows(3, 1, 1).unwrap();
        sel.select_columns(2, 1);
        sel.select_rect(2, 3, 1, 1, 1).unwrap();
        sel.select_dynamic_all(SubgridScope::One(1)).unwrap();

        assert_eq!(sel.cell_coverage_kind(2, 3, 1), Some(AreaKind::DynamicAll));
        sel.deselect_dynamic_all(SubgridScope::One(1)).unwrap();
        assert_eq!(sel.cell_coverage_kind(2, 3, 1), Some(AreaKind::Rectangle));
        sel.remove_rect(&SelectionRect::new(2, 3, 1, 1), 1).unwrap();
        assert_eq!(sel.cell_coverage_kind(2, 3, 1), Some(AreaKind::Column));
        sel.deselect_columns(2, 1);
        assert_eq!(sel.cell_coverage_kind(2, 3, 1), Some(AreaKind::Row));
        sel.deselect_rows(3, 1, 1).unwrap();
        assert_eq!(sel.cell_coverage_kind(2, 3, 1), None);
    }

    // ================================================================
    // Batching
    // ================================================================

    #[test]
    fn test_change_batch_coalesces_notifications() {
        let mut sel = new_selection(100, 8);
        let (obs, count) = counting_observer();
        sel.add_observer(obs);
        {
            let mut batch = sel.change_batch();
            batch.select_rows(0, 2, 0).unwrap();
            batch.select_columns(1, 1);
            batch.select_rect(4, 4, 2, 2, 0).unwrap();
            assert_eq!(count.get(), 0);
        }
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_empty_batch_does_not_notify() {
        let mut sel = new_selection(100, 8);
        let (obs, count) = counting_observer();
        sel.add_observer(obs);
        {
            let batch = sel.change_batch();
            assert!(!batch.has_any_selection());
        }
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_nested_batches_notify_once_at_outermost_end() {
        let mut sel = new_selection(100, 8);
        let (obs, count) = counting_observer();
        sel.add_observer(obs);
        {
            let mut outer = sel.change_batch();
            {
                let mut inner = outer.change_batch();
                inner.select_rows(0, 2, 0).unwrap();
            }
            assert_eq!(count.get(), 0);
            outer.select_columns(1, 1);
        }
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_multiple_observers_all_notified() {
        let mut sel = new_selection(100, 8);
        let (a, count_a) = counting_observer();
        let (b, count_b) = counting_observer();
        sel.add_observer(a);
        sel.add_observer(b);
        sel.select_rows(0, 1, 0).unwrap();
        assert_eq!(count_a.get(), 1);
        assert_eq!(count_b.get(), 1);
    }

    // ================================================================
    // Scenario walkthrough
    // ================================================================

    #[test]
    fn test_mixed_gesture_sequence_ends_consistent() {
        let mut sel = new_selection(100, 8);
        sel.select_rows(10, 5, 0).unwrap();
        sel.select_columns(0, 2);
        sel.toggle_select_cell(5, 50, 0).unwrap();
        sel.deselect_rows(12, 1, 0).unwrap();
        sel.toggle_select_cell(5, 50, 0).unwrap();

        assert_eq!(sel.rows().indices(0), vec![10, 11, 13, 14]);
        assert_eq!(sel.columns().indices(), vec![0, 1]);
        assert!(sel.rects(0).is_none() || sel.rects(0).unwrap().is_empty());
        // the second toggle removed the rectangle that was the last area
        assert!(sel.last_area().is_none());
    }
}
