//! Selection area types.
//!
//! A selection area is the unit the renderer outlines and the unit the "last
//! area" handle points at. The four kinds are a closed sum so that every
//! consumer (toggle priority, deletion, stash, type resolution) is forced to
//! handle all of them.

use crate::rectangles::SelectionRect;

/// Tag for the four selection area kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AreaKind {
    /// Whole-subgrid selection recomputed from live row/column counts.
    DynamicAll,
    /// Corner-anchored rectangle bound to one subgrid.
    #[default]
    Rectangle,
    /// Row run bound to one subgrid, spanning all active columns.
    Row,
    /// Column run, grid-wide, spanning all rows.
    Column,
}

/// Row-or-column discriminator used by the rectangle-gesture redirect setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOrColumn {
    Row,
    Column,
}

/// Which subgrids an operation targets.
///
/// Explicit two-case type instead of an optional subgrid parameter, so both
/// cases are checked at every call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubgridScope {
    /// Every subgrid the model currently exposes.
    All,
    /// A single subgrid by index.
    One(usize),
}

/// Abstract area-kind specifier resolved by
/// [`Selection::area_kind_from_specifier`](crate::selection::Selection::area_kind_from_specifier).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaKindSpecifier {
    /// The configured primary kind.
    Primary,
    /// The configured secondary kind.
    Secondary,
    Rectangle,
    Row,
    Column,
    /// The last area's kind, or the primary kind if there is no last area.
    LastOrPrimary,
}

/// A live selection area.
///
/// Every variant carries enough geometry to be rendered as a rectangle
/// outline even though row and column areas are logically 1-D. `DynamicAll`
/// geometry is a snapshot for rendering only; membership itself is tracked in
/// the coordinator's dynamic-all set and never materialized as indices.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionArea {
    DynamicAll { subgrid: usize, rect: SelectionRect },
    Rectangle { subgrid: usize, rect: SelectionRect },
    Row { subgrid: usize, rect: SelectionRect },
    Column { rect: SelectionRect },
}

impl SelectionArea {
    /// The kind tag for this area.
    pub fn kind(&self) -> AreaKind {
        match self {
            Self::DynamicAll { .. } => AreaKind::DynamicAll,
            Self::Rectangle { .. } => AreaKind::Rectangle,
            Self::Row { .. } => AreaKind::Row,
            Self::Column { .. } => AreaKind::Column,
        }
    }

    /// Render geometry.
    pub fn rect(&self) -> &SelectionRect {
        match self {
            Self::DynamicAll { rect, .. }
            | Self::Rectangle { rect, .. }
            | Self::Row { rect, .. }
            | Self::Column { rect } => rect,
        }
    }

    /// The owning subgrid; `None` for grid-wide column areas.
    pub fn subgrid(&self) -> Option<usize> {
        match self {
            Self::DynamicAll { subgrid, .. }
            | Self::Rectangle { subgrid, .. }
            | Self::Row { subgrid, .. } => Some(*subgrid),
            Self::Column { .. } => None,
        }
    }
}
