//! gridsel - selection and focus engine for virtualized data grids
//!
//! Keeps a grid widget's selection and focus state consistent across user
//! gestures and structural mutations of the underlying data:
//! - Sorted disjoint index ranges for row and column selection
//! - Corner-anchored rectangle areas with flattened axis projections
//! - Per-subgrid row selection and dynamic select-all
//! - A last-area handle, change batching, and identity-based stashes
//! - Cell focus with an editor-session state machine
//!
//! # Usage
//!
//! ```
//! use std::rc::Rc;
//! use gridsel::{GridModel, GridSettings, Selection};
//!
//! struct Model;
//!
//! impl GridModel for Model {
//!     fn subgrid_count(&self) -> usize { 1 }
//!     fn row_count(&self, _subgrid: usize) -> u32 { 100 }
//!     fn active_column_count(&self) -> u32 { 8 }
//!     fn field_name(&self, col: u32) -> Option<String> { Some(format!("f{col}")) }
//! }
//!
//! let mut selection = Selection::new(Rc::new(Model), GridSettings::default());
//! selection.select_rows(10, 5, 0).unwrap();
//! assert!(selection.is_cell_selected(3, 12, 0));
//! selection.adjust_for_rows_deleted(0, 0, 11).unwrap();
//! assert!(selection.is_row_selected(0, 0));
//! assert!(!selection.is_row_selected(0, 4));
//! ```

pub mod area;
pub mod error;
pub mod focus;
pub mod index_ranges;
pub mod model;
pub mod rectangles;
pub mod rows;
pub mod selection;
pub mod settings;

pub use area::{AreaKind, AreaKindSpecifier, RowOrColumn, SelectionArea, SubgridScope};
pub use error::{Result, SelectionError};
pub use focus::{EditorSession, Focus, FocusPoint, FocusStash, FocusStashPoint};
pub use index_ranges::{CountClass, IndexRange, IndexRangeList};
pub use model::{CellEditor, FocusObserver, GridModel, RowId, SelectionObserver};
pub use rectangles::{AdjustOutcome, FirstCorner, RectangleList, SelectionRect};
pub use rows::SelectionRows;
pub use selection::{ChangeGuard, FocusSelectionCoupler, Selection, SelectionStash, SubgridRowIds};
pub use settings::GridSettings;
