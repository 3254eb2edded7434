//! Sparse boolean matrix stored as dancing links.
//!
//! The arena layout is fixed: index `0` is the root, column `c` has its header
//! at index `c + 1`, and every later index is a cell. Primary column headers
//! form a circular list through the root holding the columns that still need
//! to be covered. Secondary column headers link only to themselves, so they
//! are never chosen for branching but still exclude conflicting rows.

use crate::{
    error::BuildError,
    node::{Direction, Nodes, Walk},
    solver::{ColumnHeuristic, SearchStats, SolutionStack},
};
use std::collections::HashSet;

const ROOT: usize = 0;

#[inline]
fn header_index(column: usize) -> usize {
    column + 1
}

#[inline]
fn column_id(header: usize) -> usize {
    header - 1
}

/// A sparse boolean matrix on which exact cover problems are solved.
///
/// Each row is a set of column ids, tagged with a caller chosen row id. A
/// solution is a set of rows which together contain every primary column
/// exactly once and every secondary column at most once.
///
/// Two matrices compare equal when their link structure, column sizes and
/// covered columns are identical. The solution and statistics of earlier
/// searches do not take part in the comparison.
#[derive(Debug, Clone)]
pub struct Matrix {
    nodes: Nodes,
    sizes: Vec<usize>,
    covered: Vec<bool>,
    num_covered: usize,
    num_primary: usize,
    num_rows: usize,

    pub(crate) solution: SolutionStack,
    pub(crate) solved: bool,
    pub(crate) stats: SearchStats,
}

impl PartialEq for Matrix {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes
            && self.sizes == other.sizes
            && self.covered == other.covered
            && self.num_primary == other.num_primary
            && self.num_rows == other.num_rows
    }
}

impl Eq for Matrix {}

impl Matrix {
    /// Create an empty matrix with `num_columns` primary columns.
    pub fn new(num_columns: usize) -> Self {
        Self::with_secondary(num_columns, 0)
    }

    /// Create an empty matrix with `primary` columns that must be covered
    /// exactly once, followed by `secondary` columns that may be covered at
    /// most once.
    ///
    /// Primary columns have ids `0..primary`, secondary columns have ids
    /// `primary..primary + secondary`.
    pub fn with_secondary(primary: usize, secondary: usize) -> Self {
        let num_columns = primary + secondary;
        let mut nodes = Nodes::with_capacity(1 + num_columns);

        let root = nodes.push_header();
        debug_assert_eq!(root, ROOT);

        for column in 0..num_columns {
            let header = nodes.push_header();
            debug_assert_eq!(header, header_index(column));

            if column < primary {
                nodes.insert_left(ROOT, header);
            }
        }

        Matrix {
            nodes,
            sizes: vec![0; num_columns],
            covered: vec![false; num_columns],
            num_covered: 0,
            num_primary: primary,
            num_rows: 0,

            solution: SolutionStack::default(),
            solved: false,
            stats: SearchStats::default(),
        }
    }

    /// Create a matrix with `num_columns` primary columns and the given rows.
    ///
    /// Each item is a `(row_id, columns)` pair, added in order with
    /// [`Matrix::add_row`].
    pub fn from_rows<R, C>(num_columns: usize, rows: R) -> Result<Self, BuildError>
    where
        R: IntoIterator<Item = (usize, C)>,
        C: IntoIterator<Item = usize>,
    {
        let mut matrix = Self::new(num_columns);
        for (row_id, columns) in rows {
            matrix.add_row(row_id, columns)?;
        }

        Ok(matrix)
    }

    /// Append a row containing the given columns.
    ///
    /// Repeated column ids are collapsed into one cell. A row with no columns
    /// cannot take part in any cover and is dropped. If the matrix was left
    /// in a solved state it is [`reset`](Matrix::reset) first.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidColumn`] if any column id is not less
    /// than [`num_columns`](Matrix::num_columns), and
    /// [`BuildError::ColumnsCovered`] if columns covered with
    /// [`cover`](Matrix::cover) have not been uncovered yet. No part of the
    /// row is added in either case.
    pub fn add_row(
        &mut self,
        row_id: usize,
        columns: impl IntoIterator<Item = usize>,
    ) -> Result<(), BuildError> {
        let num_columns = self.num_columns();
        let mut seen = HashSet::new();
        let mut unique: Vec<usize> = Vec::new();
        for column in columns {
            if column >= num_columns {
                return Err(BuildError::InvalidColumn {
                    column,
                    num_columns,
                });
            }

            if seen.insert(column) {
                unique.push(column);
            }
        }

        self.reset();
        if self.num_covered > 0 {
            return Err(BuildError::ColumnsCovered {
                covered: self.num_covered,
            });
        }

        let Some((&first, rest)) = unique.split_first() else {
            log::debug!("Dropping row [{}] with no columns.", row_id);
            return Ok(());
        };

        let head = self.push_cell(row_id, first);
        for &column in rest {
            let cell = self.push_cell(row_id, column);
            self.nodes.insert_left(head, cell);
        }
        self.num_rows += 1;

        Ok(())
    }

    // Insert a new cell at the bottom of its column.
    fn push_cell(&mut self, row_id: usize, column: usize) -> usize {
        let header = header_index(column);
        let cell = self.nodes.push_cell(header, row_id);

        self.nodes.insert_above(header, cell);
        self.sizes[column] += 1;

        cell
    }

    /// Return the total number of columns, primary and secondary.
    pub fn num_columns(&self) -> usize {
        self.sizes.len()
    }

    /// Return the number of primary columns.
    pub fn num_primary_columns(&self) -> usize {
        self.num_primary
    }

    /// Return the number of rows added to the matrix.
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Return the number of cells in the matrix, counting covered ones.
    pub fn num_cells(&self) -> usize {
        self.nodes.len() - 1 - self.num_columns()
    }

    /// Return the number of rows currently linked into `column`, or `None`
    /// if the column does not exist.
    pub fn column_size(&self, column: usize) -> Option<usize> {
        self.sizes.get(column).copied()
    }

    /// Return true if `column` is currently covered.
    ///
    /// Columns that do not exist are reported as not covered.
    pub fn is_covered(&self, column: usize) -> bool {
        self.covered.get(column).copied().unwrap_or(false)
    }

    /// Return an iterator over the primary columns that are not covered, in
    /// header order.
    pub fn uncovered_columns(&self) -> impl Iterator<Item = usize> + '_ {
        self.nodes.walk(ROOT, Direction::Right).map(column_id)
    }

    /// Return the primary column with the fewest rows, preferring the
    /// leftmost on ties, or `None` once every primary column is covered.
    pub fn choose_column(&self) -> Option<usize> {
        self.choose_header(ColumnHeuristic::MinimumSize).map(column_id)
    }

    pub(crate) fn choose_header(&self, heuristic: ColumnHeuristic) -> Option<usize> {
        let mut headers = self.nodes.walk(ROOT, Direction::Right);

        match heuristic {
            ColumnHeuristic::First => headers.next(),
            ColumnHeuristic::MinimumSize => {
                headers.min_by_key(|&header| self.header_size(header))
            }
        }
    }

    pub(crate) fn header_size(&self, header: usize) -> usize {
        self.sizes[column_id(header)]
    }

    pub(crate) fn next_in_column(&self, node: usize) -> usize {
        self.nodes[node].down
    }

    pub(crate) fn row_id(&self, cell: usize) -> usize {
        self.nodes.row(cell)
    }

    fn checked_header(&self, column: usize) -> usize {
        assert!(
            column < self.num_columns(),
            "column [{}] is out of range for a matrix with [{}] columns",
            column,
            self.num_columns()
        );

        header_index(column)
    }

    /// Remove `column` from the header list, and every row that intersects it
    /// from the other columns those rows touch.
    ///
    /// The removed rows keep their horizontal links, so a later
    /// [`uncover`](Matrix::uncover) can put them back.
    ///
    /// # Panics
    ///
    /// Panics if `column` does not exist or is already covered, or if the
    /// matrix is in the solved state. Call [`reset`](Matrix::reset) first.
    pub fn cover(&mut self, column: usize) {
        let header = self.checked_header(column);
        assert!(
            !self.solved,
            "cannot cover column [{}] of a solved matrix",
            column
        );
        assert!(!self.covered[column], "column [{}] is already covered", column);

        self.cover_header(header);
    }

    /// Undo a previous [`cover`](Matrix::cover) of `column`.
    ///
    /// Covers and uncovers must be nested: the last column covered is the
    /// first one uncovered.
    ///
    /// # Panics
    ///
    /// Panics if `column` does not exist or is not covered, or if the matrix
    /// is in the solved state.
    pub fn uncover(&mut self, column: usize) {
        let header = self.checked_header(column);
        assert!(
            !self.solved,
            "cannot uncover column [{}] of a solved matrix",
            column
        );
        assert!(self.covered[column], "column [{}] is not covered", column);

        self.uncover_header(header);
    }

    /// Cover the column with the given header, returning the number of cells
    /// unlinked.
    pub(crate) fn cover_header(&mut self, header: usize) -> u64 {
        let mut updates = 0;

        self.nodes.unlink_horizontal(header);
        self.covered[column_id(header)] = true;
        self.num_covered += 1;

        let mut rows = Walk::new(header, Direction::Down);
        while let Some(row) = rows.next(&self.nodes) {
            let mut cells = Walk::new(row, Direction::Right);
            while let Some(cell) = cells.next(&self.nodes) {
                self.nodes.unlink_vertical(cell);

                let column = column_id(self.nodes[cell].column);
                self.sizes[column] -= 1;
                updates += 1;
            }
        }

        updates
    }

    // Mirror of `cover_header`: rows bottom to top, cells right to left.
    pub(crate) fn uncover_header(&mut self, header: usize) {
        let mut rows = Walk::new(header, Direction::Up);
        while let Some(row) = rows.next(&self.nodes) {
            let mut cells = Walk::new(row, Direction::Left);
            while let Some(cell) = cells.next(&self.nodes) {
                let column = column_id(self.nodes[cell].column);
                self.sizes[column] += 1;

                self.nodes.relink_vertical(cell);
            }
        }

        self.covered[column_id(header)] = false;
        self.num_covered -= 1;
        self.nodes.relink_horizontal(header);
    }

    /// Cover every other column in the row of `cell`, returning the number of
    /// cells unlinked.
    pub(crate) fn select_row(&mut self, cell: usize) -> u64 {
        let mut updates = 0;

        let mut cells = Walk::new(cell, Direction::Right);
        while let Some(other) = cells.next(&self.nodes) {
            updates += self.cover_header(self.nodes[other].column);
        }

        updates
    }

    pub(crate) fn unselect_row(&mut self, cell: usize) {
        let mut cells = Walk::new(cell, Direction::Left);
        while let Some(other) = cells.next(&self.nodes) {
            self.uncover_header(self.nodes[other].column);
        }
    }

    /// Return true if the last search found a cover and left the matrix in
    /// the solved state.
    pub fn is_solved(&self) -> bool {
        self.solved
    }

    /// Return the matrix to the state it had before the last successful
    /// search, and forget the solution.
    ///
    /// Does nothing if the matrix is not in the solved state.
    pub fn reset(&mut self) {
        if !self.solved {
            return;
        }

        while let Some(cell) = self.solution.pop() {
            self.unselect_row(cell);
            self.uncover_header(self.nodes[cell].column);
        }
        self.solved = false;

        log::trace!("Matrix reset to its initial state.");
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Knuth's example from "Dancing Links", with columns A-G as 0-6 and rows
    /// numbered from 1.
    pub(crate) fn knuth_matrix() -> Matrix {
        Matrix::from_rows(
            7,
            [
                (1, vec![2, 4, 5]),
                (2, vec![0, 3, 6]),
                (3, vec![1, 2, 5]),
                (4, vec![0, 3]),
                (5, vec![1, 6]),
                (6, vec![3, 4, 6]),
            ],
        )
        .unwrap()
    }

    /// Check every link and size invariant that holds for the live part of
    /// the matrix.
    pub(crate) fn assert_consistent(matrix: &Matrix) {
        let nodes = &matrix.nodes;

        for header in nodes.walk(ROOT, Direction::Right) {
            assert_eq!(nodes[nodes[header].right].left, header);
            assert_eq!(nodes[nodes[header].left].right, header);
            assert!(!matrix.covered[column_id(header)]);
        }

        for column in 0..matrix.num_columns() {
            let header = header_index(column);
            let mut count = 0;
            for cell in nodes.walk(header, Direction::Down) {
                assert_eq!(nodes[nodes[cell].down].up, cell);
                assert_eq!(nodes[nodes[cell].up].down, cell);
                assert_eq!(nodes[cell].column, header);
                count += 1;
            }
            assert_eq!(count, matrix.sizes[column], "size of column {column}");
        }

        for cell in (1 + matrix.num_columns())..nodes.len() {
            assert_row_is_ring(matrix, cell);
        }
    }

    fn assert_row_is_ring(matrix: &Matrix, cell: usize) {
        let nodes = &matrix.nodes;
        let row = nodes.row(cell);

        let rightwards: Vec<_> = nodes.walk(cell, Direction::Right).collect();
        let mut leftwards: Vec<_> = nodes.walk(cell, Direction::Left).collect();
        leftwards.reverse();

        assert!(rightwards.len() < matrix.num_columns());
        assert_eq!(rightwards, leftwards);
        for &other in &rightwards {
            assert_eq!(nodes.row(other), row);
            assert_eq!(nodes[nodes[other].right].left, other);
        }
    }

    #[test]
    fn new_matrix_links_headers_in_order() {
        let matrix = Matrix::new(4);

        assert_eq!(matrix.uncovered_columns().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
        assert_eq!(matrix.num_cells(), 0);
        assert_eq!(matrix.choose_column(), Some(0));
        assert_consistent(&matrix);
    }

    #[test]
    fn secondary_columns_are_not_in_header_list() {
        let mut matrix = Matrix::with_secondary(2, 3);
        matrix.add_row(0, [0, 3]).unwrap();

        assert_eq!(matrix.num_columns(), 5);
        assert_eq!(matrix.num_primary_columns(), 2);
        assert_eq!(matrix.uncovered_columns().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(matrix.column_size(3), Some(1));
        assert_consistent(&matrix);
    }

    #[test]
    fn add_row_links_cells() {
        let matrix = knuth_matrix();

        assert_eq!(matrix.num_rows(), 6);
        assert_eq!(matrix.num_cells(), 16);
        assert_eq!(
            (0..7).map(|c| matrix.column_size(c).unwrap()).collect::<Vec<_>>(),
            vec![2, 2, 2, 3, 2, 2, 3]
        );
        assert_eq!(matrix.column_size(7), None);
        assert_consistent(&matrix);
    }

    #[test]
    fn add_row_collapses_duplicate_columns() {
        let mut matrix = Matrix::new(3);
        matrix.add_row(9, [2, 0, 2, 0]).unwrap();

        assert_eq!(matrix.num_cells(), 2);
        assert_eq!(matrix.column_size(0), Some(1));
        assert_eq!(matrix.column_size(2), Some(1));
        assert_consistent(&matrix);

        // First occurrences keep their order around the row.
        let first = 1 + matrix.num_columns();
        assert_eq!(matrix.nodes[first].column, header_index(2));
        let rest: Vec<_> = matrix.nodes.walk(first, Direction::Right).collect();
        assert_eq!(rest, vec![first + 1]);
        assert_eq!(matrix.nodes[first + 1].column, header_index(0));
    }

    #[test]
    fn add_row_collapses_duplicates_in_long_rows() {
        let mut matrix = Matrix::new(2_000);
        matrix
            .add_row(0, (0..2_000).flat_map(|column| [column, column]))
            .unwrap();

        assert_eq!(matrix.num_cells(), 2_000);
        assert!((0..2_000).all(|column| matrix.column_size(column) == Some(1)));

        let first = 1 + matrix.num_columns();
        let order: Vec<_> = matrix
            .nodes
            .walk(first, Direction::Right)
            .map(|cell| column_id(matrix.nodes[cell].column))
            .collect();
        assert_eq!(order, (1..2_000).collect::<Vec<_>>());
    }

    #[test]
    fn add_row_refuses_while_columns_are_covered() {
        let mut matrix = Matrix::from_rows(2, [(0, vec![0, 1])]).unwrap();
        matrix.cover(0);
        let covered = matrix.clone();

        assert_eq!(
            matrix.add_row(1, [1]),
            Err(BuildError::ColumnsCovered { covered: 1 })
        );
        assert_eq!(matrix, covered);
        assert_eq!(matrix.num_rows(), 1);

        matrix.uncover(0);
        matrix.add_row(1, [1]).unwrap();
        matrix.add_row(2, [0]).unwrap();

        assert_consistent(&matrix);
        assert_eq!(matrix.count_solutions(), 2);
        assert_consistent(&matrix);
    }

    #[test]
    fn add_row_rejects_invalid_column() {
        let mut matrix = knuth_matrix();
        let original = matrix.clone();

        assert_eq!(
            matrix.add_row(7, [0, 7]),
            Err(BuildError::InvalidColumn {
                column: 7,
                num_columns: 7
            })
        );
        assert_eq!(matrix, original);
        assert_eq!(matrix.num_rows(), 6);
    }

    #[test]
    fn add_row_drops_empty_row() {
        let mut matrix = Matrix::new(2);
        matrix.add_row(0, Vec::new()).unwrap();

        assert_eq!(matrix.num_rows(), 0);
        assert_eq!(matrix, Matrix::new(2));
    }

    #[test]
    fn cover_removes_intersecting_rows() {
        let mut matrix = knuth_matrix();

        // Column A holds rows 2 and 4, which also touch D and G.
        matrix.cover(0);

        assert!(matrix.is_covered(0));
        assert_eq!(matrix.uncovered_columns().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(matrix.column_size(3), Some(1));
        assert_eq!(matrix.column_size(6), Some(2));
        // The covered column keeps its own rows.
        assert_eq!(matrix.column_size(0), Some(2));
        assert_consistent(&matrix);
    }

    #[test]
    fn cover_then_uncover_restores_every_column() {
        let original = knuth_matrix();

        for column in 0..original.num_columns() {
            let mut matrix = original.clone();
            matrix.cover(column);
            assert_consistent(&matrix);
            matrix.uncover(column);

            assert_eq!(matrix, original, "after covering column {column}");
        }
    }

    #[test]
    fn nested_covers_restore_in_reverse() {
        let original = knuth_matrix();
        let mut matrix = original.clone();

        matrix.cover(3);
        matrix.cover(1);
        matrix.cover(6);
        assert_consistent(&matrix);
        assert_eq!(matrix.uncovered_columns().collect::<Vec<_>>(), vec![0, 2, 4, 5]);

        matrix.uncover(6);
        matrix.uncover(1);
        matrix.uncover(3);
        assert_eq!(matrix, original);
    }

    #[test]
    fn select_row_covers_other_columns() {
        let mut matrix = knuth_matrix();
        let original = matrix.clone();

        // First cell of row 1 lives in column C.
        let cell = matrix.nodes[header_index(2)].down;
        assert_eq!(matrix.row_id(cell), 1);

        matrix.cover_header(header_index(2));
        let updates = matrix.select_row(cell);
        assert!(updates > 0);
        assert_eq!(matrix.uncovered_columns().collect::<Vec<_>>(), vec![0, 1, 3, 6]);
        assert_consistent(&matrix);

        matrix.unselect_row(cell);
        matrix.uncover_header(header_index(2));
        assert_eq!(matrix, original);
    }

    #[test]
    fn choose_column_prefers_smallest_then_leftmost() {
        let matrix = knuth_matrix();
        assert_eq!(matrix.choose_column(), Some(0));

        let mut matrix = Matrix::new(3);
        matrix.add_row(0, [0, 1, 2]).unwrap();
        matrix.add_row(1, [0, 2]).unwrap();
        assert_eq!(matrix.choose_column(), Some(1));
        assert_eq!(matrix.choose_header(ColumnHeuristic::First), Some(header_index(0)));

        matrix.cover(1);
        assert_eq!(matrix.choose_column(), Some(0));
        matrix.cover(0);
        matrix.cover(2);
        assert_eq!(matrix.choose_column(), None);
    }

    #[test]
    #[should_panic(expected = "already covered")]
    fn cover_twice_panics() {
        let mut matrix = knuth_matrix();
        matrix.cover(2);
        matrix.cover(2);
    }

    #[test]
    #[should_panic(expected = "not covered")]
    fn uncover_without_cover_panics() {
        let mut matrix = knuth_matrix();
        matrix.uncover(2);
    }

    #[test]
    #[should_panic(expected = "solved matrix")]
    fn cover_on_solved_matrix_panics() {
        let mut matrix = knuth_matrix();
        assert!(matrix.solve());
        matrix.cover(0);
    }

    #[test]
    #[should_panic(expected = "solved matrix")]
    fn uncover_on_solved_matrix_panics() {
        let mut matrix = knuth_matrix();
        assert!(matrix.solve());
        assert!(matrix.is_covered(0));
        matrix.uncover(0);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn cover_out_of_range_panics() {
        let mut matrix = Matrix::new(1);
        matrix.cover(1);
    }

    #[test]
    fn reset_without_solution_does_nothing() {
        let mut matrix = knuth_matrix();
        let original = matrix.clone();

        matrix.reset();
        assert_eq!(matrix, original);
        assert!(!matrix.is_solved());
    }
}
