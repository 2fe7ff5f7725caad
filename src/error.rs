//! Structured error types for gridsel.
//!
//! Recoverable errors cover bad caller input (out-of-range subgrid or cell
//! coordinates). Broken internal invariants are programmer errors and are
//! reported with assertions, not with this enum.

/// All recoverable errors produced by the selection and focus engine.
#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    /// Subgrid index outside the model's subgrid list.
    #[error("subgrid index out of range: {0}")]
    SubgridRange(usize),

    /// Focus target outside the active column / main subgrid row space.
    #[error("focus cell out of range: ({x}, {y})")]
    FocusRange { x: u32, y: u32 },

    /// Catch-all for string errors.
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SelectionError>;

impl From<String> for SelectionError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for SelectionError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}
