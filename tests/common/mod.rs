//! Common test utilities: a scriptable grid model and recording
//! implementations of the collaborator traits.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic,
    clippy::cast_possible_truncation
)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gridsel::{CellEditor, FocusObserver, FocusPoint, GridModel, RowId, SelectionObserver};

// ============================================================================
// Mock grid model
// ============================================================================

struct MockState {
    row_counts: Vec<u32>,
    fields: Vec<String>,
    row_ids: Option<Vec<Vec<RowId>>>,
    next_id: RowId,
    edit_on_focus_columns: Vec<u32>,
}

/// Scriptable `GridModel` with interior mutability, so tests can mutate the
/// structure while `Selection`/`Focus` hold an `Rc` to it.
pub struct MockModel {
    state: RefCell<MockState>,
}

impl MockModel {
    /// One subgrid with `rows` rows and columns named `f0..f{columns-1}`.
    pub fn new(rows: u32, columns: u32) -> Self {
        Self::with_subgrids(&[rows], columns)
    }

    pub fn with_subgrids(row_counts: &[u32], columns: u32) -> Self {
        Self {
            state: RefCell::new(MockState {
                row_counts: row_counts.to_vec(),
                fields: (0..columns).map(|c| format!("f{c}")).collect(),
                row_ids: None,
                next_id: 0,
                edit_on_focus_columns: Vec::new(),
            }),
        }
    }

    /// Like `with_subgrids`, but every row gets a stable id (ids start at 0
    /// in subgrid 0 and keep counting up across subgrids).
    pub fn with_row_ids(row_counts: &[u32], columns: u32) -> Self {
        let model = Self::with_subgrids(row_counts, columns);
        {
            let mut st = model.state.borrow_mut();
            let mut next = 0;
            let ids = st
                .row_counts
                .iter()
                .map(|&count| {
                    (0..count)
                        .map(|_| {
                            let id = next;
                            next += 1;
                            id
                        })
                        .collect()
                })
                .collect();
            st.row_ids = Some(ids);
            st.next_id = next;
        }
        model
    }

    pub fn set_row_count(&self, subgrid: usize, count: u32) {
        let mut st = self.state.borrow_mut();
        assert!(st.row_ids.is_none(), "use insert/delete on an id model");
        st.row_counts[subgrid] = count;
    }

    pub fn set_edit_on_focus_columns(&self, columns: &[u32]) {
        self.state.borrow_mut().edit_on_focus_columns = columns.to_vec();
    }

    /// Mutate the model the way a real row insertion would.
    pub fn insert_rows(&self, subgrid: usize, index: u32, count: u32) {
        let mut st = self.state.borrow_mut();
        st.row_counts[subgrid] += count;
        if st.row_ids.is_some() {
            let mut next = st.next_id;
            let fresh: Vec<RowId> = (0..count)
                .map(|_| {
                    let id = next;
                    next += 1;
                    id
                })
                .collect();
            st.next_id = next;
            let ids = st.row_ids.as_mut().unwrap();
            ids[subgrid].splice(index as usize..index as usize, fresh);
        }
    }

    /// Mutate the model the way a real row deletion would.
    pub fn delete_rows(&self, subgrid: usize, index: u32, count: u32) {
        let mut st = self.state.borrow_mut();
        st.row_counts[subgrid] -= count;
        if let Some(ids) = st.row_ids.as_mut() {
            ids[subgrid].drain(index as usize..(index + count) as usize);
        }
    }

    /// Reverse a subgrid's row order, keeping ids (a reindexing reload).
    pub fn reverse_rows(&self, subgrid: usize) {
        let mut st = self.state.borrow_mut();
        st.row_ids
            .as_mut()
            .expect("reverse_rows needs an id model")[subgrid]
            .reverse();
    }

    /// Drop one active column, shifting the rest left.
    pub fn remove_field(&self, active_column: u32) {
        self.state.borrow_mut().fields.remove(active_column as usize);
    }
}

impl GridModel for MockModel {
    fn subgrid_count(&self) -> usize {
        self.state.borrow().row_counts.len()
    }

    fn row_count(&self, subgrid: usize) -> u32 {
        self.state.borrow().row_counts[subgrid]
    }

    fn active_column_count(&self) -> u32 {
        self.state.borrow().fields.len() as u32
    }

    fn supports_row_ids(&self) -> bool {
        self.state.borrow().row_ids.is_some()
    }

    fn row_id(&self, subgrid: usize, row: u32) -> Option<RowId> {
        let st = self.state.borrow();
        st.row_ids.as_ref()?[subgrid].get(row as usize).copied()
    }

    fn field_name(&self, active_column: u32) -> Option<String> {
        self.state.borrow().fields.get(active_column as usize).cloned()
    }

    fn column_edit_on_focus(&self, active_column: u32) -> bool {
        self.state
            .borrow()
            .edit_on_focus_columns
            .contains(&active_column)
    }

    fn edit_value(&self, field: &str, row: u32) -> Option<String> {
        Some(format!("{field}@{row}"))
    }
}

// ============================================================================
// Recording collaborators
// ============================================================================

struct CountingSelectionObserver {
    count: Rc<Cell<usize>>,
}

impl SelectionObserver for CountingSelectionObserver {
    fn selection_changed(&mut self) {
        self.count.set(self.count.get() + 1);
    }
}

/// A selection observer that counts notifications, plus the shared counter.
pub fn counting_observer() -> (Box<dyn SelectionObserver>, Rc<Cell<usize>>) {
    let count = Rc::new(Cell::new(0));
    (
        Box::new(CountingSelectionObserver {
            count: Rc::clone(&count),
        }),
        count,
    )
}

#[derive(Debug, Clone, PartialEq)]
pub enum FocusEvent {
    Cell(Option<FocusPoint>, Option<FocusPoint>),
    Row(Option<u32>, Option<u32>),
}

struct RecordingFocusObserver {
    events: Rc<RefCell<Vec<FocusEvent>>>,
}

impl FocusObserver for RecordingFocusObserver {
    fn cell_focus_changed(&mut self, current: Option<FocusPoint>, previous: Option<FocusPoint>) {
        self.events
            .borrow_mut()
            .push(FocusEvent::Cell(current, previous));
    }

    fn row_focus_changed(&mut self, current: Option<u32>, previous: Option<u32>) {
        self.events
            .borrow_mut()
            .push(FocusEvent::Row(current, previous));
    }
}

/// A focus observer that records every event, plus the shared event log.
pub fn recording_focus_observer() -> (Box<dyn FocusObserver>, Rc<RefCell<Vec<FocusEvent>>>) {
    let events = Rc::new(RefCell::new(Vec::new()));
    (
        Box::new(RecordingFocusObserver {
            events: Rc::clone(&events),
        }),
        events,
    )
}

struct MockEditor {
    log: Rc<RefCell<Vec<String>>>,
    accept: bool,
}

impl CellEditor for MockEditor {
    fn try_open(&mut self, field: &str, row: u32, value: &str) -> bool {
        self.log
            .borrow_mut()
            .push(format!("open {field} {row} {value}"));
        self.accept
    }

    fn close(&mut self, commit: bool) {
        self.log
            .borrow_mut()
            .push(if commit { "commit" } else { "discard" }.to_owned());
    }
}

/// An editor that logs its calls and accepts or declines every open.
pub fn mock_editor(accept: bool) -> (Box<dyn CellEditor>, Rc<RefCell<Vec<String>>>) {
    let log = Rc::new(RefCell::new(Vec::new()));
    (
        Box::new(MockEditor {
            log: Rc::clone(&log),
            accept,
        }),
        log,
    )
}
