//! The selection coordinator.
//!
//! Composes the grid-wide column range list, the per-subgrid row range lists
//! and rectangle lists, the dynamic-all set, and the single last-area handle;
//! exposes the public select/deselect/toggle API and the structural-mutation
//! adjustment API; owns change-notification batching.
//!
//! All mutation is synchronous inside a UI or structural callback. The
//! begin/end nesting counter exists only to coalesce sub-mutations into one
//! notification; observers always see the final state of a batch, never an
//! intermediate one.

mod stash;

pub use stash::{SelectionStash, SubgridRowIds};

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

use crate::area::{AreaKind, AreaKindSpecifier, RowOrColumn, SelectionArea, SubgridScope};
use crate::error::{Result, SelectionError};
use crate::focus::FocusPoint;
use crate::index_ranges::IndexRangeList;
use crate::model::{FocusObserver, GridModel, SelectionObserver};
use crate::rectangles::{AdjustOutcome, RectangleList, SelectionRect};
use crate::rows::SelectionRows;
use crate::settings::GridSettings;

/// Selection state for the whole grid.
pub struct Selection {
    model: Rc<dyn GridModel>,
    settings: GridSettings,
    rows: SelectionRows,
    columns: IndexRangeList,
    rects: BTreeMap<usize, RectangleList>,
    all_subgrids: BTreeSet<usize>,
    last_area: Option<SelectionArea>,
    observers: Vec<Box<dyn SelectionObserver>>,
    change_depth: u32,
    changed: bool,
    silent_depth: u32,
}

/// Scoped change batch. Dropping the guard is the only path that can fire
/// the coalesced notification, so begin/end pairs cannot be mismatched from
/// outside the crate.
pub struct ChangeGuard<'a> {
    selection: &'a mut Selection,
}

impl Deref for ChangeGuard<'_> {
    type Target = Selection;

    fn deref(&self) -> &Selection {
        self.selection
    }
}

impl DerefMut for ChangeGuard<'_> {
    fn deref_mut(&mut self) -> &mut Selection {
        self.selection
    }
}

impl Drop for ChangeGuard<'_> {
    fn drop(&mut self) {
        self.selection.end_change();
    }
}

impl Selection {
    pub fn new(model: Rc<dyn GridModel>, settings: GridSettings) -> Self {
        Self {
            model,
            settings,
            rows: SelectionRows::new(),
            columns: IndexRangeList::new(),
            rects: BTreeMap::new(),
            all_subgrids: BTreeSet::new(),
            last_area: None,
            observers: Vec::new(),
            change_depth: 0,
            changed: false,
            silent_depth: 0,
        }
    }

    pub fn settings(&self) -> &GridSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: GridSettings) {
        self.settings = settings;
    }

    /// Register a consumer of the coalesced selection-changed notification.
    pub fn add_observer(&mut self, observer: Box<dyn SelectionObserver>) {
        self.observers.push(observer);
    }

    // ------------------------------------------------------------------
    // Change batching
    // ------------------------------------------------------------------

    /// Open a change batch. Mutations through the guard coalesce into at
    /// most one notification, fired when the outermost guard drops.
    pub fn change_batch(&mut self) -> ChangeGuard<'_> {
        self.begin_change();
        ChangeGuard { selection: self }
    }

    fn begin_change(&mut self) {
        self.change_depth += 1;
    }

    fn end_change(&mut self) {
        assert!(
            self.change_depth > 0,
            "selection change batch ended more times than begun"
        );
        self.change_depth -= 1;
        if self.change_depth == 0 && self.changed {
            self.changed = false;
            if self.silent_depth == 0 {
                for obs in &mut self.observers {
                    obs.selection_changed();
                }
            }
        }
    }

    fn begin_silent_change(&mut self) {
        self.silent_depth += 1;
        self.begin_change();
    }

    fn end_silent_change(&mut self) {
        self.end_change();
        assert!(self.silent_depth > 0, "silent batch ended without begin");
        self.silent_depth -= 1;
    }

    fn flag_changed(&mut self) {
        self.changed = true;
    }

    fn check_subgrid(&self, subgrid: usize) -> Result<()> {
        if subgrid < self.model.subgrid_count() {
            Ok(())
        } else {
            Err(SelectionError::SubgridRange(subgrid))
        }
    }

    // ------------------------------------------------------------------
    // Select
    // ------------------------------------------------------------------

    /// Select a single cell (a 1×1 rectangle).
    pub fn select_cell(&mut self, x: u32, y: u32, subgrid: usize) -> Result<SelectionArea> {
        self.select_rect(x, y, 1, 1, subgrid)
    }

    /// Select a rectangle, or delegate to row/column selection if the
    /// rectangle-gesture redirect is configured.
    pub fn select_rect(
        &mut self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        subgrid: usize,
    ) -> Result<SelectionArea> {
        self.check_subgrid(subgrid)?;
        match self.settings.mouse_rectangle_selection_to {
            Some(RowOrColumn::Row) => return self.select_rows(y, height, subgrid),
            Some(RowOrColumn::Column) => return Ok(self.select_columns(x, width)),
            None => {}
        }
        self.begin_change();
        if !self.settings.multiple_selection_areas {
            self.clear_internal();
        }
        let rect = SelectionRect::new(x, y, width, height);
        self.rects.entry(subgrid).or_default().push(rect);
        self.flag_changed();
        let area = SelectionArea::Rectangle { subgrid, rect };
        self.last_area = Some(area.clone());
        self.end_change();
        Ok(area)
    }

    /// Select a corner-anchored rectangle spanning two cell coordinates.
    pub fn select_rect_from_points(
        &mut self,
        first_x: u32,
        first_y: u32,
        last_x: u32,
        last_y: u32,
        subgrid: usize,
    ) -> Result<SelectionArea> {
        self.check_subgrid(subgrid)?;
        self.begin_change();
        if !self.settings.multiple_selection_areas {
            self.clear_internal();
        }
        let rect = SelectionRect::from_points(first_x, first_y, last_x, last_y);
        self.rects.entry(subgrid).or_default().push(rect);
        self.flag_changed();
        let area = SelectionArea::Rectangle { subgrid, rect };
        self.last_area = Some(area.clone());
        self.end_change();
        Ok(area)
    }

    /// Select `count` rows starting at `y`.
    ///
    /// The returned area always reflects the requested geometry; the changed
    /// notification fires only if the underlying set actually changed.
    pub fn select_rows(&mut self, y: u32, count: u32, subgrid: usize) -> Result<SelectionArea> {
        self.check_subgrid(subgrid)?;
        self.begin_change();
        if !self.settings.multiple_selection_areas {
            self.clear_internal();
        }
        if self.rows.list_mut(subgrid).add_span(y, count) {
            self.flag_changed();
        }
        let area = self.row_area(subgrid, y, count);
        self.last_area = Some(area.clone());
        self.end_change();
        Ok(area)
    }

    /// Select `count` columns starting at `x` (grid-wide).
    pub fn select_columns(&mut self, x: u32, count: u32) -> SelectionArea {
        self.begin_change();
        if !self.settings.multiple_selection_areas {
            self.clear_internal();
        }
        if self.columns.add_span(x, count) {
            self.flag_changed();
        }
        let area = self.column_area(x, count);
        self.last_area = Some(area.clone());
        self.end_change();
        area
    }

    /// Activate dynamic select-all for the scoped subgrid(s).
    ///
    /// A no-op returning `None` if every scoped subgrid is already in the
    /// set. The returned last area reflects the live row/column counts and is
    /// `None` when either count is zero.
    pub fn select_dynamic_all(&mut self, scope: SubgridScope) -> Result<Option<SelectionArea>> {
        let targets = self.scope_targets(scope)?;
        if targets.iter().all(|s| self.all_subgrids.contains(s)) {
            return Ok(None);
        }
        self.begin_change();
        if !self.settings.multiple_selection_areas {
            self.clear_internal();
        }
        for s in &targets {
            if self.all_subgrids.insert(*s) {
                self.flag_changed();
            }
        }
        let anchor_subgrid = match scope {
            SubgridScope::One(s) => s,
            SubgridScope::All => self.model.main_subgrid(),
        };
        let area = self.dynamic_all_area(anchor_subgrid);
        self.last_area = area.clone();
        self.end_change();
        Ok(area)
    }

    // ------------------------------------------------------------------
    // Deselect
    // ------------------------------------------------------------------

    /// Deactivate dynamic select-all for the scoped subgrid(s).
    pub fn deselect_dynamic_all(&mut self, scope: SubgridScope) -> Result<()> {
        let targets = self.scope_targets(scope)?;
        self.begin_change();
        for s in targets {
            if self.all_subgrids.remove(&s) {
                self.flag_changed();
                if matches!(
                    &self.last_area,
                    Some(SelectionArea::DynamicAll { subgrid, .. }) if *subgrid == s
                ) {
                    self.last_area = None;
                }
            }
        }
        self.end_change();
        Ok(())
    }

    /// Deselect `count` rows starting at `y`.
    pub fn deselect_rows(&mut self, y: u32, count: u32, subgrid: usize) -> Result<()> {
        self.check_subgrid(subgrid)?;
        self.begin_change();
        let removed = self
            .rows
            .existing_list_mut(subgrid)
            .is_some_and(|l| l.delete(y, count));
        if removed {
            self.flag_changed();
            self.reanchor_last_row_area(subgrid, y, count);
        }
        self.end_change();
        Ok(())
    }

    /// Deselect `count` columns starting at `x`.
    pub fn deselect_columns(&mut self, x: u32, count: u32) {
        self.begin_change();
        if self.columns.delete(x, count) {
            self.flag_changed();
            self.reanchor_last_column_area(x, count);
        }
        self.end_change();
    }

    /// Remove one rectangle by geometry. Returns whether it was present.
    pub fn remove_rect(&mut self, rect: &SelectionRect, subgrid: usize) -> Result<bool> {
        self.check_subgrid(subgrid)?;
        self.begin_change();
        let removed = self
            .rects
            .get_mut(&subgrid)
            .is_some_and(|l| l.remove(rect));
        if removed {
            self.flag_changed();
            if matches!(
                &self.last_area,
                Some(SelectionArea::Rectangle { subgrid: s, rect: r }) if *s == subgrid && r == rect
            ) {
                self.last_area = None;
            }
        }
        self.end_change();
        Ok(removed)
    }

    /// Clear every selection structure and the last area.
    pub fn clear(&mut self) {
        self.begin_change();
        self.clear_internal();
        self.end_change();
    }

    fn clear_internal(&mut self) {
        let had = self.has_any_selection();
        self.rows.clear();
        self.columns.clear();
        for list in self.rects.values_mut() {
            list.clear();
        }
        self.all_subgrids.clear();
        self.last_area = None;
        if had {
            self.flag_changed();
        }
    }

    // ------------------------------------------------------------------
    // Toggle
    // ------------------------------------------------------------------

    /// Toggle the selection state of one cell.
    ///
    /// If any area covers the cell, the priority-highest covering area kind
    /// (dynamic-all, then rectangle, then column, then row) loses the cell:
    /// the covering structure of that kind is removed. Otherwise the cell is
    /// selected as a new 1×1 rectangle. Returns true if a selection was
    /// added, false if one was removed.
    pub fn toggle_select_cell(&mut self, x: u32, y: u32, subgrid: usize) -> Result<bool> {
        self.check_subgrid(subgrid)?;
        self.begin_change();
        let added = match self.cell_coverage_kind(x, y, subgrid) {
            Some(AreaKind::DynamicAll) => {
                self.all_subgrids.remove(&subgrid);
                self.flag_changed();
                if matches!(
                    &self.last_area,
                    Some(SelectionArea::DynamicAll { subgrid: s, .. }) if *s == subgrid
                ) {
                    self.last_area = None;
                }
                false
            }
            Some(AreaKind::Rectangle) => {
                self.remove_topmost_rect_at(x, y, subgrid);
                false
            }
            Some(AreaKind::Column) => {
                if self.columns.delete(x, 1) {
                    self.flag_changed();
                    self.reanchor_last_column_area(x, 1);
                }
                false
            }
            Some(AreaKind::Row) => {
                let removed = self
                    .rows
                    .existing_list_mut(subgrid)
                    .is_some_and(|l| l.delete(y, 1));
                if removed {
                    self.flag_changed();
                    self.reanchor_last_row_area(subgrid, y, 1);
                }
                false
            }
            None => {
                let rect = SelectionRect::new(x, y, 1, 1);
                self.rects.entry(subgrid).or_default().push(rect);
                self.flag_changed();
                self.last_area = Some(SelectionArea::Rectangle { subgrid, rect });
                true
            }
        };
        self.end_change();
        Ok(added)
    }

    fn remove_topmost_rect_at(&mut self, x: u32, y: u32, subgrid: usize) {
        let Some(list) = self.rects.get_mut(&subgrid) else {
            return;
        };
        let Some(&index) = list.rects_containing_point(x, y).last() else {
            return;
        };
        let Some(removed) = list.remove_at(index) else {
            return;
        };
        self.flag_changed();
        if matches!(
            &self.last_area,
            Some(SelectionArea::Rectangle { subgrid: s, rect }) if *s == subgrid && *rect == removed
        ) {
            self.last_area = None;
        }
    }

    // ------------------------------------------------------------------
    // Last area
    // ------------------------------------------------------------------

    pub fn last_area(&self) -> Option<&SelectionArea> {
        self.last_area.as_ref()
    }

    /// Remove the current last area through its kind's deletion path.
    pub fn delete_last_area(&mut self) {
        let Some(area) = self.last_area.clone() else {
            return;
        };
        self.begin_change();
        match area {
            SelectionArea::DynamicAll { subgrid, .. } => {
                if self.all_subgrids.remove(&subgrid) {
                    self.flag_changed();
                }
            }
            SelectionArea::Rectangle { subgrid, rect } => {
                let removed = self
                    .rects
                    .get_mut(&subgrid)
                    .is_some_and(|l| l.remove(&rect));
                if removed {
                    self.flag_changed();
                }
            }
            SelectionArea::Row { subgrid, rect } => {
                let removed = self
                    .rows
                    .existing_list_mut(subgrid)
                    .is_some_and(|l| l.delete(rect.y(), rect.height()));
                if removed {
                    self.flag_changed();
                }
            }
            SelectionArea::Column { rect } => {
                if self.columns.delete(rect.x(), rect.width()) {
                    self.flag_changed();
                }
            }
        }
        self.last_area = None;
        self.end_change();
    }

    /// Replace the last area with a new rectangle (the "continue dragging the
    /// provisional selection" mechanism).
    pub fn replace_last_area_with_rect(
        &mut self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        subgrid: usize,
    ) -> Result<SelectionArea> {
        self.check_subgrid(subgrid)?;
        self.begin_change();
        self.delete_last_area();
        let area = self.select_rect(x, y, width, height, subgrid);
        self.end_change();
        area
    }

    /// Replace the last area with a row run.
    pub fn replace_last_area_with_rows(
        &mut self,
        y: u32,
        count: u32,
        subgrid: usize,
    ) -> Result<SelectionArea> {
        self.check_subgrid(subgrid)?;
        self.begin_change();
        self.delete_last_area();
        let area = self.select_rows(y, count, subgrid);
        self.end_change();
        area
    }

    /// Replace the last area with a column run.
    pub fn replace_last_area_with_columns(&mut self, x: u32, count: u32) -> SelectionArea {
        self.begin_change();
        self.delete_last_area();
        let area = self.select_columns(x, count);
        self.end_change();
        area
    }

    /// After a partial row deselection, shrink a row last area to the
    /// remaining selected portion nearest its anchor, or drop it.
    fn reanchor_last_row_area(&mut self, subgrid: usize, y: u32, count: u32) {
        let Some(SelectionArea::Row { subgrid: s, rect }) = &self.last_area else {
            return;
        };
        if *s != subgrid {
            return;
        }
        let rect = *rect;
        if y + count <= rect.y() || y >= rect.bottom() {
            return;
        }
        let overlap = match self.rows.list(subgrid) {
            Some(list) if rect.first_corner().is_top() => {
                list.overlap_range_first(rect.y(), rect.height())
            }
            Some(list) => list.overlap_range_last(rect.y(), rect.height()),
            None => None,
        };
        self.last_area = overlap.map(|r| {
            SelectionArea::Row {
                subgrid,
                rect: SelectionRect::with_corner(
                    0,
                    r.start,
                    self.model.active_column_count(),
                    r.length,
                    rect.first_corner(),
                ),
            }
        });
    }

    /// Column-area counterpart of [`Self::reanchor_last_row_area`].
    fn reanchor_last_column_area(&mut self, x: u32, count: u32) {
        let Some(SelectionArea::Column { rect }) = &self.last_area else {
            return;
        };
        let rect = *rect;
        if x + count <= rect.x() || x >= rect.right() {
            return;
        }
        let overlap = if rect.first_corner().is_left() {
            self.columns.overlap_range_first(rect.x(), rect.width())
        } else {
            self.columns.overlap_range_last(rect.x(), rect.width())
        };
        let height = self.model.row_count(self.model.main_subgrid());
        self.last_area = overlap.map(|r| SelectionArea::Column {
            rect: SelectionRect::with_corner(r.start, 0, r.length, height, rect.first_corner()),
        });
    }

    // ------------------------------------------------------------------
    // Area construction
    // ------------------------------------------------------------------

    fn row_area(&self, subgrid: usize, y: u32, count: u32) -> SelectionArea {
        SelectionArea::Row {
            subgrid,
            rect: SelectionRect::new(0, y, self.model.active_column_count(), count),
        }
    }

    fn column_area(&self, x: u32, count: u32) -> SelectionArea {
        SelectionArea::Column {
            rect: SelectionRect::new(x, 0, count, self.model.row_count(self.model.main_subgrid())),
        }
    }

    fn dynamic_all_area(&self, subgrid: usize) -> Option<SelectionArea> {
        let columns = self.model.active_column_count();
        let rows = self.model.row_count(subgrid);
        if columns == 0 || rows == 0 {
            return None;
        }
        Some(SelectionArea::DynamicAll {
            subgrid,
            rect: SelectionRect::new(0, 0, columns, rows),
        })
    }

    fn scope_targets(&self, scope: SubgridScope) -> Result<Vec<usize>> {
        match scope {
            SubgridScope::All => Ok((0..self.model.subgrid_count()).collect()),
            SubgridScope::One(s) => {
                self.check_subgrid(s)?;
                Ok(vec![s])
            }
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// The priority-highest area kind covering the cell, if any.
    pub fn cell_coverage_kind(&self, x: u32, y: u32, subgrid: usize) -> Option<AreaKind> {
        if self.all_subgrids.contains(&subgrid) {
            return Some(AreaKind::DynamicAll);
        }
        if self
            .rects
            .get(&subgrid)
            .is_some_and(|l| l.contains_point(x, y))
        {
            return Some(AreaKind::Rectangle);
        }
        if self.columns.includes_index(x) {
            return Some(AreaKind::Column);
        }
        if self.rows.includes_index(subgrid, y) {
            return Some(AreaKind::Row);
        }
        None
    }

    pub fn is_cell_selected(&self, x: u32, y: u32, subgrid: usize) -> bool {
        self.cell_coverage_kind(x, y, subgrid).is_some()
    }

    pub fn is_row_selected(&self, subgrid: usize, y: u32) -> bool {
        self.all_subgrids.contains(&subgrid) || self.rows.includes_index(subgrid, y)
    }

    pub fn is_column_selected(&self, x: u32) -> bool {
        !self.all_subgrids.is_empty() || self.columns.includes_index(x)
    }

    pub fn is_dynamic_all(&self, subgrid: usize) -> bool {
        self.all_subgrids.contains(&subgrid)
    }

    pub fn dynamic_all_subgrids(&self) -> &BTreeSet<usize> {
        &self.all_subgrids
    }

    pub fn rows(&self) -> &SelectionRows {
        &self.rows
    }

    pub fn columns(&self) -> &IndexRangeList {
        &self.columns
    }

    pub fn rects(&self, subgrid: usize) -> Option<&RectangleList> {
        self.rects.get(&subgrid)
    }

    pub fn has_any_selection(&self) -> bool {
        !self.all_subgrids.is_empty()
            || self.rows.any_indices()
            || !self.columns.is_empty()
            || self.rects.values().any(|l| !l.is_empty())
    }

    /// Resolve an abstract area-kind specifier against the configuration and
    /// the last area.
    pub fn area_kind_from_specifier(&self, specifier: AreaKindSpecifier) -> AreaKind {
        match specifier {
            AreaKindSpecifier::Primary => self.settings.primary_area_kind,
            AreaKindSpecifier::Secondary => self.settings.secondary_area_kind,
            AreaKindSpecifier::Rectangle => AreaKind::Rectangle,
            AreaKindSpecifier::Row => AreaKind::Row,
            AreaKindSpecifier::Column => AreaKind::Column,
            AreaKindSpecifier::LastOrPrimary => self
                .last_area
                .as_ref()
                .map_or(self.settings.primary_area_kind, SelectionArea::kind),
        }
    }

    /// Whether the cell is selected via an area of `kind` and the whole
    /// selection covers exactly that one cell.
    ///
    /// Must reason about all four kinds at once: a row area plus a rectangle
    /// can still amount to one selected cell when the subgrid currently has
    /// exactly one row and one column.
    pub fn is_selected_cell_the_only_selected_cell(
        &self,
        x: u32,
        y: u32,
        subgrid: usize,
        kind: AreaKind,
    ) -> Result<bool> {
        self.check_subgrid(subgrid)?;
        let covered = match kind {
            AreaKind::DynamicAll => {
                self.all_subgrids.contains(&subgrid)
                    && x < self.model.active_column_count()
                    && y < self.model.row_count(subgrid)
            }
            AreaKind::Rectangle => self
                .rects
                .get(&subgrid)
                .is_some_and(|l| l.contains_point(x, y)),
            AreaKind::Column => self.columns.includes_index(x),
            AreaKind::Row => self.rows.includes_index(subgrid, y),
        };
        if !covered {
            return Ok(false);
        }
        Ok(self.footprint_is_single_cell(x, y, subgrid))
    }

    fn footprint_is_single_cell(&self, x: u32, y: u32, subgrid: usize) -> bool {
        let column_count = self.model.active_column_count();
        for &s in &self.all_subgrids {
            let row_count = self.model.row_count(s);
            if row_count == 0 || column_count == 0 {
                continue; // empty footprint
            }
            if s != subgrid || row_count != 1 || column_count != 1 || x != 0 || y != 0 {
                return false;
            }
        }
        for (&s, list) in &self.rects {
            for r in list.rects() {
                if r.is_empty() {
                    continue;
                }
                if s != subgrid || r.width() != 1 || r.height() != 1 || r.x() != x || r.y() != y {
                    return false;
                }
            }
        }
        if !self.columns.is_empty() {
            let main = self.model.main_subgrid();
            if self.columns.index_count() != 1 || !self.columns.includes_index(x) {
                return false;
            }
            if subgrid != main || self.model.row_count(main) != 1 || y != 0 {
                return false;
            }
        }
        for s in self.rows.subgrids_with_indices() {
            if s != subgrid
                || self.rows.index_count(s) != 1
                || !self.rows.includes_index(s, y)
                || column_count != 1
                || x != 0
            {
                return false;
            }
        }
        true
    }

    // ------------------------------------------------------------------
    // Structural adjustment
    // ------------------------------------------------------------------

    /// `count` rows were inserted at `index` in `subgrid`.
    pub fn adjust_for_rows_inserted(&mut self, subgrid: usize, index: u32, count: u32) -> Result<()> {
        self.check_subgrid(subgrid)?;
        if count == 0 {
            return Ok(());
        }
        self.begin_change();
        let mut changed = false;
        if let Some(list) = self.rows.existing_list_mut(subgrid) {
            changed |= list.adjust_for_inserted(index, count);
        }
        if let Some(list) = self.rects.get_mut(&subgrid) {
            changed |= list.adjust_for_y_inserted(index, count);
        }
        // dynamic-all tracks live counts; a count change there is visible
        changed |= self.all_subgrids.contains(&subgrid);
        if changed {
            self.flag_changed();
        }
        self.adjust_last_area_rows(subgrid, |rect| {
            let _ = rect.adjust_y_inserted(index, count);
            AdjustOutcome::Adjusted
        });
        self.end_change();
        Ok(())
    }

    /// `count` rows were deleted at `index` in `subgrid`.
    pub fn adjust_for_rows_deleted(&mut self, subgrid: usize, index: u32, count: u32) -> Result<()> {
        self.check_subgrid(subgrid)?;
        if count == 0 {
            return Ok(());
        }
        self.begin_change();
        let mut changed = false;
        if let Some(list) = self.rows.existing_list_mut(subgrid) {
            changed |= list.adjust_for_deleted(index, count);
        }
        if let Some(list) = self.rects.get_mut(&subgrid) {
            changed |= list.adjust_for_y_deleted(index, count);
        }
        changed |= self.all_subgrids.contains(&subgrid);
        if changed {
            self.flag_changed();
        }
        self.adjust_last_area_rows(subgrid, |rect| rect.adjust_y_deleted(index, count));
        self.end_change();
        Ok(())
    }

    /// `count` rows moved from `old_index` to `new_index` in `subgrid`.
    pub fn adjust_for_rows_moved(
        &mut self,
        subgrid: usize,
        old_index: u32,
        new_index: u32,
        count: u32,
    ) -> Result<()> {
        self.check_subgrid(subgrid)?;
        if count == 0 || old_index == new_index {
            return Ok(());
        }
        self.begin_change();
        let mut changed = false;
        if let Some(list) = self.rows.existing_list_mut(subgrid) {
            changed |= list.adjust_for_moved(old_index, new_index, count);
        }
        if let Some(list) = self.rects.get_mut(&subgrid) {
            changed |= list.adjust_for_y_moved(old_index, new_index, count);
        }
        if changed {
            self.flag_changed();
        }
        self.adjust_last_area_rows(subgrid, |rect| {
            rect.adjust_y_moved(old_index, new_index, count)
        });
        self.end_change();
        Ok(())
    }

    /// Every row of `subgrid` was deleted.
    pub fn adjust_for_all_rows_deleted(&mut self, subgrid: usize) -> Result<()> {
        self.check_subgrid(subgrid)?;
        self.begin_change();
        let mut changed = self.rows.clear_subgrid(subgrid);
        if let Some(list) = self.rects.get_mut(&subgrid) {
            if !list.is_empty() {
                list.clear();
                changed = true;
            }
        }
        // dynamic-all membership persists; it tracks the (now zero) count
        changed |= self.all_subgrids.contains(&subgrid);
        if changed {
            self.flag_changed();
        }
        if self.last_area.as_ref().and_then(SelectionArea::subgrid) == Some(subgrid) {
            self.last_area = None;
        }
        self.end_change();
        Ok(())
    }

    /// `count` columns were inserted at `index` (grid-wide).
    pub fn adjust_for_columns_inserted(&mut self, index: u32, count: u32) {
        if count == 0 {
            return;
        }
        self.begin_change();
        let mut changed = self.columns.adjust_for_inserted(index, count);
        for list in self.rects.values_mut() {
            changed |= list.adjust_for_x_inserted(index, count);
        }
        changed |= !self.all_subgrids.is_empty();
        if changed {
            self.flag_changed();
        }
        self.adjust_last_area_columns(|rect| {
            let _ = rect.adjust_x_inserted(index, count);
            AdjustOutcome::Adjusted
        });
        self.end_change();
    }

    /// `count` columns were deleted at `index` (grid-wide).
    pub fn adjust_for_columns_deleted(&mut self, index: u32, count: u32) {
        if count == 0 {
            return;
        }
        self.begin_change();
        let mut changed = self.columns.adjust_for_deleted(index, count);
        for list in self.rects.values_mut() {
            changed |= list.adjust_for_x_deleted(index, count);
        }
        changed |= !self.all_subgrids.is_empty();
        if changed {
            self.flag_changed();
        }
        self.adjust_last_area_columns(|rect| rect.adjust_x_deleted(index, count));
        self.end_change();
    }

    /// `count` columns moved from `old_index` to `new_index`.
    ///
    /// The rectangle lists have no single-step x-move; the move is composed
    /// from the x-deleted and x-inserted adjustments.
    pub fn adjust_for_columns_moved(&mut self, old_index: u32, new_index: u32, count: u32) {
        if count == 0 || old_index == new_index {
            return;
        }
        self.begin_change();
        let mut changed = self.columns.adjust_for_moved(old_index, new_index, count);
        for list in self.rects.values_mut() {
            let deleted = list.adjust_for_x_deleted(old_index, count);
            let inserted = list.adjust_for_x_inserted(new_index, count);
            changed |= deleted || inserted;
        }
        if changed {
            self.flag_changed();
        }
        self.adjust_last_area_columns(|rect| {
            let deleted = rect.adjust_x_deleted(old_index, count);
            if deleted == AdjustOutcome::Removed {
                return AdjustOutcome::Removed;
            }
            let inserted = rect.adjust_x_inserted(new_index, count);
            if deleted == AdjustOutcome::Unchanged && inserted == AdjustOutcome::Unchanged {
                AdjustOutcome::Unchanged
            } else {
                AdjustOutcome::Adjusted
            }
        });
        self.end_change();
    }

    /// Every column was deleted.
    pub fn adjust_for_all_columns_deleted(&mut self) {
        self.begin_change();
        let mut changed = !self.columns.is_empty();
        self.columns.clear();
        for list in self.rects.values_mut() {
            if !list.is_empty() {
                list.clear();
                changed = true;
            }
        }
        changed |= !self.all_subgrids.is_empty();
        if changed {
            self.flag_changed();
        }
        // row selection survives, but no area is renderable with zero columns
        self.last_area = None;
        self.end_change();
    }

    /// Apply a y-axis geometry adjustment to the last area, if it lives in
    /// this subgrid (or, for a column area, if the subgrid is the main one).
    fn adjust_last_area_rows(
        &mut self,
        subgrid: usize,
        adjust: impl Fn(&mut SelectionRect) -> AdjustOutcome,
    ) {
        let main = self.model.main_subgrid();
        match &mut self.last_area {
            Some(SelectionArea::Rectangle { subgrid: s, rect })
            | Some(SelectionArea::Row { subgrid: s, rect })
                if *s == subgrid =>
            {
                if adjust(rect) == AdjustOutcome::Removed {
                    self.last_area = None;
                }
            }
            Some(SelectionArea::DynamicAll { subgrid: s, rect }) if *s == subgrid => {
                let columns = self.model.active_column_count();
                let rows = self.model.row_count(subgrid);
                if columns == 0 || rows == 0 {
                    self.last_area = None;
                } else {
                    *rect = SelectionRect::with_corner(0, 0, columns, rows, rect.first_corner());
                }
            }
            Some(SelectionArea::Column { rect }) if subgrid == main => {
                // column areas span all rows; track the live row count
                let rows = self.model.row_count(main);
                *rect = SelectionRect::with_corner(
                    rect.x(),
                    0,
                    rect.width(),
                    rows,
                    rect.first_corner(),
                );
            }
            _ => {}
        }
    }

    /// Apply an x-axis geometry adjustment to the last area.
    fn adjust_last_area_columns(&mut self, adjust: impl Fn(&mut SelectionRect) -> AdjustOutcome) {
        match &mut self.last_area {
            Some(SelectionArea::Rectangle { rect, .. })
            | Some(SelectionArea::Column { rect }) => {
                if adjust(rect) == AdjustOutcome::Removed {
                    self.last_area = None;
                }
            }
            Some(SelectionArea::Row { rect, .. }) => {
                // row areas span all active columns; track the live count
                let columns = self.model.active_column_count();
                if columns == 0 {
                    self.last_area = None;
                } else {
                    *rect = SelectionRect::with_corner(
                        0,
                        rect.y(),
                        columns,
                        rect.height(),
                        rect.first_corner(),
                    );
                }
            }
            Some(SelectionArea::DynamicAll { subgrid, rect }) => {
                let subgrid = *subgrid;
                let columns = self.model.active_column_count();
                let rows = self.model.row_count(subgrid);
                if columns == 0 || rows == 0 {
                    self.last_area = None;
                } else {
                    *rect = SelectionRect::with_corner(0, 0, columns, rows, rect.first_corner());
                }
            }
            None => {}
        }
    }
}

/// `FocusObserver` that wires focus onto a shared `Selection`: when
/// `GridSettings::clear_selection_on_focus_change` is on, moving focus to a
/// cell clears the selection.
///
/// Structural renumbering of the focused cell is not a focus change for this
/// purpose; the adjusted hooks are no-ops, so a selection that survived a
/// row or column mutation stays intact.
pub struct FocusSelectionCoupler {
    selection: Rc<RefCell<Selection>>,
}

impl FocusSelectionCoupler {
    pub fn new(selection: Rc<RefCell<Selection>>) -> Self {
        Self { selection }
    }
}

impl FocusObserver for FocusSelectionCoupler {
    fn cell_focus_changed(&mut self, current: Option<FocusPoint>, _previous: Option<FocusPoint>) {
        // losing focus entirely keeps the selection
        if current.is_none() {
            return;
        }
        let mut selection = self.selection.borrow_mut();
        if selection.settings().clear_selection_on_focus_change {
            selection.clear();
        }
    }

    fn row_focus_changed(&mut self, _current: Option<u32>, _previous: Option<u32>) {}

    fn cell_focus_adjusted(&mut self, _current: Option<FocusPoint>, _previous: Option<FocusPoint>) {}

    fn row_focus_adjusted(&mut self, _current: Option<u32>, _previous: Option<u32>) {}
}
