//! Cell focus and the editor lifecycle.
//!
//! Tracks the focused cell of the main subgrid, the previously focused cell,
//! and the edit-session state machine that guards editor opening against the
//! synchronous re-entrancy of focus callbacks.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SelectionError};
use crate::model::{CellEditor, FocusObserver, GridModel, RowId};
use crate::settings::GridSettings;

/// A focused cell, in active-column / main-subgrid-row coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusPoint {
    pub x: u32,
    pub y: u32,
}

/// Edit-session state.
///
/// `Opening` exists because the editor's open callback can synchronously
/// re-enter focus APIs; while it is in flight the session is neither closed
/// nor usable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EditorSession {
    #[default]
    Closed,
    Opening,
    Open {
        field: String,
        row: u32,
    },
}

/// Identity-based focus snapshot, captured around a reindexing operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FocusStash {
    pub current: Option<FocusStashPoint>,
    pub previous: Option<FocusStashPoint>,
}

/// One stashed focus position: field name plus row id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FocusStashPoint {
    pub field: String,
    pub row_id: RowId,
}

/// Focus state for the main subgrid.
pub struct Focus {
    model: Rc<dyn GridModel>,
    settings: GridSettings,
    current: Option<FocusPoint>,
    previous: Option<FocusPoint>,
    /// Horizontal scroll offset remembered across vertical navigation; any
    /// focus change invalidates it.
    preferred_offset: Option<f32>,
    session: EditorSession,
    editor: Option<Box<dyn CellEditor>>,
    observers: Vec<Box<dyn FocusObserver>>,
}

impl Focus {
    pub fn new(model: Rc<dyn GridModel>, settings: GridSettings) -> Self {
        Self {
            model,
            settings,
            current: None,
            previous: None,
            preferred_offset: None,
            session: EditorSession::Closed,
            editor: None,
            observers: Vec::new(),
        }
    }

    pub fn add_observer(&mut self, observer: Box<dyn FocusObserver>) {
        self.observers.push(observer);
    }

    /// Install the editor widget. Focus-driven editing is inert without one.
    pub fn set_editor(&mut self, editor: Box<dyn CellEditor>) {
        self.editor = Some(editor);
    }

    pub fn settings(&self) -> &GridSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: GridSettings) {
        self.settings = settings;
    }

    // ------------------------------------------------------------------
    // Position
    // ------------------------------------------------------------------

    pub fn current(&self) -> Option<FocusPoint> {
        self.current
    }

    pub fn previous(&self) -> Option<FocusPoint> {
        self.previous
    }

    pub fn preferred_offset(&self) -> Option<f32> {
        self.preferred_offset
    }

    pub fn set_preferred_offset(&mut self, offset: Option<f32>) {
        self.preferred_offset = offset;
    }

    /// Move focus to a cell.
    ///
    /// A no-op when the cell is already focused. Any open editor is committed
    /// before the move; a column flagged edit-on-focus opens the editor on
    /// the new cell after it.
    pub fn set_xy(&mut self, x: u32, y: u32) -> Result<()> {
        if x >= self.model.active_column_count()
            || y >= self.model.row_count(self.model.main_subgrid())
        {
            return Err(SelectionError::FocusRange { x, y });
        }
        let target = FocusPoint { x, y };
        if self.current == Some(target) {
            return Ok(());
        }
        self.close_editor(true);
        let old = self.current;
        self.previous = old;
        self.current = Some(target);
        self.preferred_offset = None;
        self.notify_moved(old);
        if self.model.column_edit_on_focus(x) {
            self.try_open_editor();
        }
        Ok(())
    }

    /// Move focus horizontally, keeping the row.
    pub fn set_x(&mut self, x: u32) -> Result<()> {
        let y = self.current.map_or(0, |p| p.y);
        self.set_xy(x, y)
    }

    /// Move focus vertically, keeping the column.
    pub fn set_y(&mut self, y: u32) -> Result<()> {
        let x = self.current.map_or(0, |p| p.x);
        self.set_xy(x, y)
    }

    /// Drop focus entirely. Discards any open editor value.
    pub fn clear(&mut self) {
        if self.current.is_none() {
            return;
        }
        self.close_editor(false);
        let old = self.current.take();
        self.previous = old;
        self.preferred_offset = None;
        self.notify_moved(old);
    }

    fn notify_moved(&mut self, old: Option<FocusPoint>) {
        let current = self.current;
        for obs in &mut self.observers {
            obs.cell_focus_changed(current, old);
        }
        let old_row = old.map(|p| p.y);
        let new_row = current.map(|p| p.y);
        if old_row != new_row {
            for obs in &mut self.observers {
                obs.row_focus_changed(new_row, old_row);
            }
        }
    }

    /// Like `notify_moved`, but through the structural-adjustment hooks so
    /// observers can tell renumbering apart from user-driven moves.
    fn notify_adjusted(&mut self, old: Option<FocusPoint>) {
        let current = self.current;
        for obs in &mut self.observers {
            obs.cell_focus_adjusted(current, old);
        }
        let old_row = old.map(|p| p.y);
        let new_row = current.map(|p| p.y);
        if old_row != new_row {
            for obs in &mut self.observers {
                obs.row_focus_adjusted(new_row, old_row);
            }
        }
    }

    // ------------------------------------------------------------------
    // Editor lifecycle
    // ------------------------------------------------------------------

    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    pub fn is_editing(&self) -> bool {
        !matches!(self.session, EditorSession::Closed)
    }

    /// Open the editor on the focused cell. Returns whether a session is now
    /// open. A no-op (true) if one already is.
    pub fn try_open_editor(&mut self) -> bool {
        if matches!(self.session, EditorSession::Open { .. }) {
            return true;
        }
        let Some(point) = self.current else {
            return false;
        };
        let Some(field) = self.model.field_name(point.x) else {
            return false;
        };
        let Some(value) = self.model.edit_value(&field, point.y) else {
            return false;
        };
        let Some(mut editor) = self.editor.take() else {
            return false;
        };
        // the open callback may synchronously re-enter focus APIs
        self.session = EditorSession::Opening;
        let opened = editor.try_open(&field, point.y, &value);
        self.editor = Some(editor);
        self.session = if opened {
            EditorSession::Open {
                field,
                row: point.y,
            }
        } else {
            EditorSession::Closed
        };
        opened
    }

    /// Close any open editor session, committing or discarding its value.
    pub fn close_editor(&mut self, commit: bool) {
        if matches!(self.session, EditorSession::Closed) {
            return;
        }
        self.session = EditorSession::Closed;
        if let Some(editor) = self.editor.as_mut() {
            editor.close(commit);
        }
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    /// A key arrived while a cell is focused and no editor is open.
    /// Returns whether an editor session opened.
    pub fn key_down(&mut self, key: &str) -> bool {
        if !self.settings.edit_on_key_down || self.is_editing() {
            return false;
        }
        if !Self::is_qualifying_key(key) {
            return false;
        }
        self.try_open_editor()
    }

    /// A key arrived inside an open editor session. Enter commits, Escape
    /// discards. Returns whether the key was consumed.
    pub fn editor_key(&mut self, key: &str) -> bool {
        if !self.is_editing() {
            return false;
        }
        match key {
            "Enter" => {
                self.close_editor(true);
                true
            }
            "Escape" => {
                self.close_editor(false);
                true
            }
            _ => false,
        }
    }

    /// A cell was clicked. Focuses it, and opens the editor when click
    /// editing is configured. Returns whether an editor session opened.
    pub fn click(&mut self, x: u32, y: u32) -> Result<bool> {
        let already = self.current == Some(FocusPoint { x, y });
        self.set_xy(x, y)?;
        if self.settings.edit_on_click && (already || !self.is_editing()) {
            return Ok(self.try_open_editor());
        }
        Ok(self.is_editing())
    }

    /// F2 or a single printable character starts an edit; navigation and
    /// modifier keys do not.
    fn is_qualifying_key(key: &str) -> bool {
        if key == "F2" {
            return true;
        }
        let mut chars = key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => !c.is_control(),
            _ => false,
        }
    }

    // ------------------------------------------------------------------
    // Structural adjustment
    //
    // Each adjuster fires the adjusted-focus observer hooks at most once,
    // and only when the focused cell actually changed.
    // ------------------------------------------------------------------

    /// `count` rows were inserted at `index` in the main subgrid.
    pub fn adjust_for_rows_inserted(&mut self, index: u32, count: u32) {
        if count == 0 {
            return;
        }
        self.preferred_offset = None;
        let before = self.current;
        if let Some(p) = self.current.as_mut() {
            if p.y >= index {
                p.y += count;
            }
        }
        if let Some(p) = self.previous.as_mut() {
            if p.y >= index {
                p.y += count;
            }
        }
        if let EditorSession::Open { row, .. } = &mut self.session {
            if *row >= index {
                *row += count;
            }
        }
        if self.current != before {
            self.notify_adjusted(before);
        }
    }

    /// `count` rows were deleted at `index` in the main subgrid.
    ///
    /// A focused row inside the deleted window loses focus (the editor, if
    /// open on it, is discarded) and becomes the previous position's slot.
    pub fn adjust_for_rows_deleted(&mut self, index: u32, count: u32) {
        if count == 0 {
            return;
        }
        self.preferred_offset = None;
        let before = self.current;
        let end = index + count;
        if let Some(p) = self.current {
            if p.y >= index && p.y < end {
                self.close_editor(false);
                self.previous = self.current.take();
            }
        }
        if let Some(p) = self.current.as_mut() {
            if p.y >= end {
                p.y -= count;
            }
        }
        self.previous = match self.previous {
            Some(p) if p.y >= index && p.y < end => None,
            Some(mut p) => {
                if p.y >= end {
                    p.y -= count;
                }
                Some(p)
            }
            None => None,
        };
        if let EditorSession::Open { row, .. } = &mut self.session {
            if *row >= end {
                *row -= count;
            }
        }
        if self.current != before {
            self.notify_adjusted(before);
        }
    }

    /// `count` rows moved from `old_index` to `new_index` in the main
    /// subgrid. Focus follows a moved row.
    pub fn adjust_for_rows_moved(&mut self, old_index: u32, new_index: u32, count: u32) {
        if count == 0 || old_index == new_index {
            return;
        }
        self.preferred_offset = None;
        let before = self.current;
        if let Some(p) = self.current.as_mut() {
            p.y = Self::map_moved(p.y, old_index, new_index, count);
        }
        if let Some(p) = self.previous.as_mut() {
            p.y = Self::map_moved(p.y, old_index, new_index, count);
        }
        if let EditorSession::Open { row, .. } = &mut self.session {
            *row = Self::map_moved(*row, old_index, new_index, count);
        }
        if self.current != before {
            self.notify_adjusted(before);
        }
    }

    /// `count` columns were inserted at `index`.
    pub fn adjust_for_columns_inserted(&mut self, index: u32, count: u32) {
        if count == 0 {
            return;
        }
        self.preferred_offset = None;
        let before = self.current;
        if let Some(p) = self.current.as_mut() {
            if p.x >= index {
                p.x += count;
            }
        }
        if let Some(p) = self.previous.as_mut() {
            if p.x >= index {
                p.x += count;
            }
        }
        if self.current != before {
            self.notify_adjusted(before);
        }
    }

    /// `count` columns were deleted at `index`. A focused column inside the
    /// window clears focus.
    pub fn adjust_for_columns_deleted(&mut self, index: u32, count: u32) {
        if count == 0 {
            return;
        }
        self.preferred_offset = None;
        let before = self.current;
        let end = index + count;
        if let Some(p) = self.current {
            if p.x >= index && p.x < end {
                self.close_editor(false);
                self.previous = self.current.take();
            }
        }
        if let Some(p) = self.current.as_mut() {
            if p.x >= end {
                p.x -= count;
            }
        }
        self.previous = match self.previous {
            Some(p) if p.x >= index && p.x < end => None,
            Some(mut p) => {
                if p.x >= end {
                    p.x -= count;
                }
                Some(p)
            }
            None => None,
        };
        if self.current != before {
            self.notify_adjusted(before);
        }
    }

    /// `count` columns moved from `old_index` to `new_index`. Focus follows
    /// a moved column.
    pub fn adjust_for_columns_moved(&mut self, old_index: u32, new_index: u32, count: u32) {
        if count == 0 || old_index == new_index {
            return;
        }
        self.preferred_offset = None;
        let before = self.current;
        if let Some(p) = self.current.as_mut() {
            p.x = Self::map_moved(p.x, old_index, new_index, count);
        }
        if let Some(p) = self.previous.as_mut() {
            p.x = Self::map_moved(p.x, old_index, new_index, count);
        }
        if self.current != before {
            self.notify_adjusted(before);
        }
    }

    /// Map one index through a block move of `count` indices from `old` to
    /// `new` (both in pre-move coordinates for the block, post-removal
    /// coordinates for the destination).
    fn map_moved(value: u32, old: u32, new: u32, count: u32) -> u32 {
        if value >= old && value < old + count {
            return value - old + new;
        }
        let mut v = value;
        if v >= old + count {
            v -= count;
        }
        if v >= new {
            v += count;
        }
        v
    }

    // ------------------------------------------------------------------
    // Stash
    // ------------------------------------------------------------------

    /// Capture focus as field/row-id identity. Points whose identity cannot
    /// be resolved are dropped from the snapshot.
    pub fn create_stash(&self) -> FocusStash {
        FocusStash {
            current: self.stash_point(self.current),
            previous: self.stash_point(self.previous),
        }
    }

    fn stash_point(&self, point: Option<FocusPoint>) -> Option<FocusStashPoint> {
        if !self.model.supports_row_ids() {
            return None;
        }
        let point = point?;
        let field = self.model.field_name(point.x)?;
        let row_id = self.model.row_id(self.model.main_subgrid(), point.y)?;
        Some(FocusStashPoint { field, row_id })
    }

    /// Restore stashed focus against the renumbered rows, silently (no
    /// observer notifications; the caller repaints wholesale).
    ///
    /// An unresolvable point clears its slot, unless the caller asserts via
    /// `all_rows_kept` that the reindexing kept every row.
    pub fn restore_stash(&mut self, stash: &FocusStash, all_rows_kept: bool) {
        self.close_editor(false);
        self.preferred_offset = None;
        self.current = self.resolve_stash_point(stash.current.as_ref(), all_rows_kept);
        self.previous = self.resolve_stash_point(stash.previous.as_ref(), all_rows_kept);
    }

    fn resolve_stash_point(
        &self,
        point: Option<&FocusStashPoint>,
        all_rows_kept: bool,
    ) -> Option<FocusPoint> {
        let point = point?;
        let x = self.model.active_column_of_field(&point.field)?;
        let main = self.model.main_subgrid();
        match self.model.row_index_of_id(main, point.row_id) {
            Some(y) => Some(FocusPoint { x, y }),
            None => {
                assert!(
                    !all_rows_kept,
                    "stashed focus row id {} not found after a reindex that kept all rows",
                    point.row_id
                );
                None
            }
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
    fn test_map_moved_down() {
        // rows 2..4 move to index 5: [0 1 2 3 4 5 6] -> [0 1 4 5 6 2 3]
        assert_eq!(Focus::map_moved(2, 2, 5, 2), 5);
        assert_eq!(Focus::map_moved(3, 2, 5, 2), 6);
        assert_eq!(Focus::map_moved(4, 2, 5, 2), 2);
        assert_eq!(Focus::map_moved(6, 2, 5, 2), 4);
        assert_eq!(Focus::map_moved(0, 2, 5, 2), 0);
    }

    #[test]
    fn test_map_moved_up() {
        // rows 4..6 move to index 1: [0 1 2 3 4 5 6] -> [0 4 5 1 2 3 6]
        assert_eq!(Focus::map_moved(4, 4, 1, 2), 1);
        assert_eq!(Focus::map_moved(5, 4, 1, 2), 2);
        assert_eq!(Focus::map_moved(1, 4, 1, 2), 3);
        assert_eq!(Focus::map_moved(3, 4, 1, 2), 5);
        assert_eq!(Focus::map_moved(6, 4, 1, 2), 6);
        assert_eq!(Focus::map_moved(0, 4, 1, 2), 0);
    }

    #[test]
    fn test_qualifying_keys() {
        assert!(Focus::is_qualifying_key("F2"));
        assert!(Focus::is_qualifying_key("a"));
        assert!(Focus::is_qualifying_key("7"));
        assert!(!Focus::is_qualifying_key("Enter"));
        assert!(!Focus::is_qualifying_key("ArrowDown"));
        assert!(!Focus::is_qualifying_key("\u{8}"));
        assert!(!Focus::is_qualifying_key(""));
    }
}
