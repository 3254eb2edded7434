#[cfg(doc)]
use crate::{Matrix, SearchConfig};

/// Error for [`Matrix::add_row`] and [`Matrix::from_rows`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// A row named a column the matrix does not have
    #[error("column {column} is out of range for a matrix with {num_columns} columns")]
    InvalidColumn {
        /// The offending column id
        column: usize,
        /// Number of columns, primary and secondary, in the matrix
        num_columns: usize,
    },
    /// Columns covered with [`Matrix::cover`] were still covered
    #[error("cannot add a row while {covered} columns are covered")]
    ColumnsCovered {
        /// Number of columns still covered
        covered: usize,
    },
}

/// Error for [`Matrix::solve_with`]
///
/// Both variants mean the search was abandoned before it could decide whether
/// a cover exists. The matrix has been restored to its initial state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// The node limit set by [`SearchConfig::with_node_limit`] was reached
    #[error("search stopped after entering {limit} nodes")]
    NodeLimitReached {
        /// The configured limit
        limit: u64,
    },
    /// The deadline set by [`SearchConfig::with_deadline`] or
    /// [`SearchConfig::with_timeout`] passed
    #[error("search deadline passed before the search finished")]
    DeadlineExceeded,
}
