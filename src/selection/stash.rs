//! Identity-based selection stash.
//!
//! Snapshots the identity-capable parts of the selection before a reindexing
//! operation (sort, filter, reload) and restores them against the renumbered
//! rows afterwards. Rows are captured as stable row ids, columns as field
//! names; rectangles and the last area have no identity and are not stashed.

use serde::{Deserialize, Serialize};

use crate::model::RowId;

use super::Selection;

/// Row ids captured for one subgrid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubgridRowIds {
    pub subgrid: usize,
    pub ids: Vec<RowId>,
}

/// Index-independent snapshot of the selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectionStash {
    pub dynamic_all_subgrids: Vec<usize>,
    pub row_ids: Vec<SubgridRowIds>,
    pub column_fields: Vec<String>,
}

impl Selection {
    /// Capture the identity-capable selection state.
    ///
    /// Row ids are captured only when the model supports them; dynamic-all
    /// membership and column field names are always captured.
    pub fn create_stash(&self) -> SelectionStash {
        let dynamic_all_subgrids = self.all_subgrids.iter().copied().collect();
        let row_ids = if self.model.supports_row_ids() {
            self.rows
                .subgrids_with_indices()
                .into_iter()
                .map(|subgrid| SubgridRowIds {
                    subgrid,
                    ids: self
                        .rows
                        .indices(subgrid)
                        .into_iter()
                        .filter_map(|row| self.model.row_id(subgrid, row))
                        .collect(),
                })
                .collect()
        } else {
            Vec::new()
        };
        let column_fields = self
            .columns
            .indices()
            .into_iter()
            .filter_map(|col| self.model.field_name(col))
            .collect();
        SelectionStash {
            dynamic_all_subgrids,
            row_ids,
            column_fields,
        }
    }

    /// Replace the current selection with a resolved stash.
    ///
    /// Stashed rows and columns that no longer resolve are dropped silently,
    /// unless the caller asserts via `all_rows_kept` that the reindexing kept
    /// every row, in which case an unresolvable row id is a programmer error.
    /// Restoration never fires the changed notification; the caller is in
    /// the middle of a reindex and repaints wholesale afterwards.
    pub fn restore_stash(&mut self, stash: &SelectionStash, all_rows_kept: bool) {
        self.begin_silent_change();
        self.clear_internal();
        let subgrid_count = self.model.subgrid_count();
        for &subgrid in &stash.dynamic_all_subgrids {
            if subgrid < subgrid_count {
                self.all_subgrids.insert(subgrid);
            }
        }
        if self.model.supports_row_ids() {
            for entry in &stash.row_ids {
                if entry.subgrid >= subgrid_count {
                    continue;
                }
                for &id in &entry.ids {
                    match self.model.row_index_of_id(entry.subgrid, id) {
                        Some(row) => {
                            self.rows.list_mut(entry.subgrid).add_span(row, 1);
                        }
                        None => {
                            assert!(
                                !all_rows_kept,
                                "stashed row id {id} not found after a reindex that kept all rows"
                            );
                        }
                    }
                }
            }
        }
        for field in &stash.column_fields {
            if let Some(col) = self.model.active_column_of_field(field) {
                self.columns.add_span(col, 1);
            }
        }
        self.changed = false;
        self.end_silent_change();
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
    fn test_stash_serializes() {
        let stash = SelectionStash {
            dynamic_all_subgrids: vec![1],
            row_ids: vec![SubgridRowIds {
                subgrid: 0,
                ids: vec![10, 20],
            }],
            column_fields: vec!["name".into()],
        };
        let json = serde_json::to_string(&stash).unwrap();
        let back: SelectionStash = serde_json::from_str(&json).unwrap();
        assert_eq!(back.dynamic_all_subgrids, vec![1]);
        assert_eq!(back.row_ids[0].ids, vec![10, 20]);
        assert_eq!(back.column_fields, vec!["name".to_owned()]);
    }
}
