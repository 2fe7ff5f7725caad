//! Read-only grid configuration consumed by the selection and focus engine.

use crate::area::{AreaKind, RowOrColumn};

/// Grid-level configuration.
///
/// The grid facade owns one of these and hands copies to `Selection` and
/// `Focus` at construction; the engine never mutates it.
#[derive(Debug, Clone)]
pub struct GridSettings {
    /// Whether more than one selection area may be live at once. When false,
    /// every select call clears the existing areas first.
    pub multiple_selection_areas: bool,
    /// Redirect plain rectangle gestures into row or column selection.
    pub mouse_rectangle_selection_to: Option<RowOrColumn>,
    /// Whether mouse-driven row selection is enabled.
    pub mouse_row_selection: bool,
    /// Whether mouse-driven column selection is enabled.
    pub mouse_column_selection: bool,
    /// Area kind created by an unmodified drag gesture.
    pub primary_area_kind: AreaKind,
    /// Area kind created by a modified (e.g. ctrl) drag gesture.
    pub secondary_area_kind: AreaKind,
    /// Open the cell editor when a qualifying key is pressed on the focus.
    pub edit_on_key_down: bool,
    /// Open the cell editor when the focused cell is clicked.
    pub edit_on_click: bool,
    /// Clear the selection whenever the focused cell changes.
    pub clear_selection_on_focus_change: bool,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            multiple_selection_areas: true,
            mouse_rectangle_selection_to: None,
            mouse_row_selection: true,
            mouse_column_selection: true,
            primary_area_kind: AreaKind::Rectangle,
            secondary_area_kind: AreaKind::Row,
            edit_on_key_down: false,
            edit_on_click: false,
            clear_selection_on_focus_change: false,
        }
    }
}
