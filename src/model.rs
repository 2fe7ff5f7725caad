//! Collaborator interfaces.
//!
//! The engine talks to the rest of the grid through these narrow traits: the
//! data/schema source (`GridModel`), the change listeners
//! (`SelectionObserver`, `FocusObserver`), and the cell editor widget
//! (`CellEditor`). Each trait covers one direction of the dependency graph.

use crate::focus::FocusPoint;

/// Opaque row identity supplied by the data source.
///
/// Survives sorts, filters, and reloads that renumber row indices.
pub type RowId = u64;

/// Read-only view of the grid's row/column structure.
///
/// Row identity is an optional capability: a source that cannot supply it
/// leaves `supports_row_ids` false and the stash machinery degrades silently.
pub trait GridModel {
    /// Number of independently indexed row spaces.
    fn subgrid_count(&self) -> usize;

    /// Current row count of one subgrid.
    fn row_count(&self, subgrid: usize) -> u32;

    /// Current number of active (visible, ordered) columns.
    fn active_column_count(&self) -> u32;

    /// The subgrid holding the main data rows.
    fn main_subgrid(&self) -> usize {
        0
    }

    /// Whether the data source can map rows to stable identities.
    fn supports_row_ids(&self) -> bool {
        false
    }

    /// Identity of a row, if the source supports identities.
    fn row_id(&self, _subgrid: usize, _row: u32) -> Option<RowId> {
        None
    }

    /// Current index of an identified row.
    ///
    /// The default is a linear scan over `row_id`; sources with an id index
    /// should override it.
    fn row_index_of_id(&self, subgrid: usize, id: RowId) -> Option<u32> {
        if !self.supports_row_ids() {
            return None;
        }
        (0..self.row_count(subgrid)).find(|&row| self.row_id(subgrid, row) == Some(id))
    }

    /// Field name of an active column.
    fn field_name(&self, active_column: u32) -> Option<String>;

    /// Current active-column index of a field.
    ///
    /// The default is a linear scan over `field_name`.
    fn active_column_of_field(&self, field: &str) -> Option<u32> {
        (0..self.active_column_count()).find(|&col| self.field_name(col).as_deref() == Some(field))
    }

    /// Whether focusing a cell in this column should open the editor.
    fn column_edit_on_focus(&self, _active_column: u32) -> bool {
        false
    }

    /// Editable value of a cell, or `None` if the cell cannot be edited.
    fn edit_value(&self, _field: &str, _row: u32) -> Option<String> {
        None
    }
}

/// Consumer of the coalesced selection-changed notification.
pub trait SelectionObserver {
    /// Fired at most once per change batch, after the final state is in place.
    fn selection_changed(&mut self);
}

/// Consumer of focus-change notifications.
pub trait FocusObserver {
    /// The focused cell changed (including focus being cleared).
    fn cell_focus_changed(&mut self, current: Option<FocusPoint>, previous: Option<FocusPoint>);

    /// The focused row changed. Not fired for moves within one row.
    fn row_focus_changed(&mut self, current: Option<u32>, previous: Option<u32>);

    /// The focused cell was renumbered or cleared by a structural row/column
    /// mutation. Delegates to `cell_focus_changed`, so repaint-style
    /// observers see every change through one handler; observers that react
    /// only to user-driven focus moves override this as a no-op.
    fn cell_focus_adjusted(&mut self, current: Option<FocusPoint>, previous: Option<FocusPoint>) {
        self.cell_focus_changed(current, previous);
    }

    /// Structural counterpart of `row_focus_changed`.
    fn row_focus_adjusted(&mut self, current: Option<u32>, previous: Option<u32>) {
        self.row_focus_changed(current, previous);
    }
}

/// The cell editor widget boundary.
pub trait CellEditor {
    /// Attempt to open on `(field, row)` with the given initial value.
    ///
    /// Returns false if the editor declines (e.g. readonly cell); the focus
    /// state machine then falls back to Closed.
    fn try_open(&mut self, field: &str, row: u32, value: &str) -> bool;

    /// Close the editor, committing or discarding its value.
    fn close(&mut self, commit: bool);
}
