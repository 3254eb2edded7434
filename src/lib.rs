#![deny(missing_docs)]

//! Implementation of [Dancing Links](https://en.wikipedia.org/wiki/Dancing_Links)
//! and [Algorithm X](https://en.wikipedia.org/wiki/Knuth%27s_Algorithm_X) for solving
//!  [exact cover](https://en.wikipedia.org/wiki/Exact_cover) problems.
//!
//! A [`Matrix`] is built from rows of column indices, each row tagged with a
//! caller chosen id. [`Matrix::solve`] then looks for a set of rows which
//! contains every column exactly once:
//!
//! ```
//! use dlx_matrix::Matrix;
//!
//! // The example from Knuth's "Dancing Links" paper, columns A-G as 0-6.
//! let mut matrix = Matrix::new(7);
//! matrix.add_row(1, [2, 4, 5])?;
//! matrix.add_row(2, [0, 3, 6])?;
//! matrix.add_row(3, [1, 2, 5])?;
//! matrix.add_row(4, [0, 3])?;
//! matrix.add_row(5, [1, 6])?;
//! matrix.add_row(6, [3, 4, 6])?;
//!
//! assert!(matrix.solve());
//!
//! let mut rows = matrix.solution().to_vec();
//! rows.sort();
//! assert_eq!(rows, vec![1, 4, 5]);
//! # Ok::<(), dlx_matrix::BuildError>(())
//! ```
//!
//! Columns created with [`Matrix::with_secondary`] past the primary ones only
//! need to be covered at most once, and [`Matrix::solutions`] enumerates
//! every cover instead of stopping at the first.

pub(crate) mod error;
pub(crate) mod matrix;
pub(crate) mod node;
pub(crate) mod solver;

pub use error::{BuildError, SearchError};
pub use matrix::Matrix;
pub use solver::{ColumnHeuristic, SearchConfig, SearchStats, Solutions};
