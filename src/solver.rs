use crate::{error::SearchError, matrix::Matrix};
use std::time::{Duration, Instant};

/// Strategy used to pick the column to branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnHeuristic {
    /// Pick the column with the fewest remaining rows, leftmost on ties.
    #[default]
    MinimumSize,
    /// Pick the leftmost uncovered column.
    ///
    /// Still finds every solution, but usually explores a much larger tree.
    First,
}

/// Settings for [`Matrix::solve_with`].
///
/// The default configuration uses [`ColumnHeuristic::MinimumSize`] and places
/// no limits on the search.
#[derive(Debug, Clone, Default)]
pub struct SearchConfig {
    heuristic: ColumnHeuristic,
    node_limit: Option<u64>,
    deadline: Option<Instant>,
    timeout: Option<Duration>,
}

impl SearchConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the column selection strategy.
    pub fn with_heuristic(mut self, heuristic: ColumnHeuristic) -> Self {
        self.heuristic = heuristic;
        self
    }

    /// Abandon the search once it has entered `limit` nodes of the search
    /// tree.
    pub fn with_node_limit(mut self, limit: u64) -> Self {
        self.node_limit = Some(limit);
        self
    }

    /// Abandon the search once `deadline` has passed.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Abandon the search once `timeout` has elapsed since it started.
    ///
    /// The clock starts again on every call to [`Matrix::solve_with`], so the
    /// same configuration can be reused. If a deadline is also set, whichever
    /// comes first applies.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Return the column selection strategy.
    pub fn heuristic(&self) -> ColumnHeuristic {
        self.heuristic
    }

    // Fix the limits for a search starting now.
    fn start(&self) -> Limits {
        let timeout = self.timeout.map(|timeout| Instant::now() + timeout);
        let deadline = match (self.deadline, timeout) {
            (Some(deadline), Some(timeout)) => Some(deadline.min(timeout)),
            (deadline, timeout) => deadline.or(timeout),
        };

        Limits {
            heuristic: self.heuristic,
            node_limit: self.node_limit,
            deadline,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Limits {
    heuristic: ColumnHeuristic,
    node_limit: Option<u64>,
    deadline: Option<Instant>,
}

impl Limits {
    // Consulted before trying each row of a branch.
    fn check(&self, stats: &SearchStats) -> Result<(), SearchError> {
        if let Some(limit) = self.node_limit {
            if stats.nodes >= limit {
                return Err(SearchError::NodeLimitReached { limit });
            }
        }

        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(SearchError::DeadlineExceeded);
            }
        }

        Ok(())
    }
}

/// Counters describing the work done by the last search on a matrix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Number of search tree nodes entered, including the root.
    pub nodes: u64,
    /// Number of cells unlinked from their columns.
    pub updates: u64,
    /// Number of solutions found.
    pub solutions: u64,
}

/// The rows chosen along the current search path.
///
/// Each row id is stored next to the cell it was selected through, so the
/// path can be undone after the search has returned.
#[derive(Debug, Clone, Default)]
pub(crate) struct SolutionStack {
    cells: Vec<usize>,
    rows: Vec<usize>,
}

impl SolutionStack {
    pub fn push(&mut self, cell: usize, row: usize) {
        self.cells.push(cell);
        self.rows.push(row);
    }

    pub fn pop(&mut self) -> Option<usize> {
        self.rows.pop();
        self.cells.pop()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[usize] {
        &self.rows
    }
}

impl Matrix {
    /// Search for an exact cover, returning true if one was found.
    ///
    /// On success the rows of the cover are available from
    /// [`solution`](Matrix::solution) and the matrix is left in the solved
    /// state until the next call to [`reset`](Matrix::reset),
    /// [`add_row`](Matrix::add_row) or another search. When no cover exists
    /// the matrix is left as it was.
    pub fn solve(&mut self) -> bool {
        // The default configuration has no limits, so the search cannot be
        // abandoned.
        self.solve_with(&SearchConfig::default()).unwrap_or(false)
    }

    /// Search for an exact cover using the given configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`SearchError`] if a limit from `config` was hit before the
    /// search finished. The matrix is restored and holds no solution.
    pub fn solve_with(&mut self, config: &SearchConfig) -> Result<bool, SearchError> {
        self.reset();

        log::debug!(
            "Searching for an exact cover of [{}] primary columns using [{}] rows.",
            self.num_primary_columns(),
            self.num_rows()
        );

        let limits = config.start();
        let mut stats = SearchStats::default();
        let result = self.search(&limits, &mut stats);

        match result {
            Ok(true) => {
                stats.solutions = 1;
                self.solved = true;
            }
            Ok(false) => {}
            Err(ref err) => log::debug!("Search abandoned: {}.", err),
        }
        self.stats = stats;

        log::debug!(
            "Search finished with [{:?}] after [{}] nodes and [{}] updates.",
            result,
            stats.nodes,
            stats.updates
        );

        result
    }

    // Returns Ok(true) with the winning path still covered, otherwise every
    // cover made at this level has been undone.
    fn search(&mut self, limits: &Limits, stats: &mut SearchStats) -> Result<bool, SearchError> {
        stats.nodes += 1;

        let Some(header) = self.choose_header(limits.heuristic) else {
            return Ok(true);
        };

        let size = self.header_size(header);
        log::trace!(
            "Branching on header [{}] with [{}] rows at depth [{}].",
            header,
            size,
            self.solution.len()
        );
        if size == 0 {
            return Ok(false);
        }

        stats.updates += self.cover_header(header);

        let mut cell = self.next_in_column(header);
        while cell != header {
            if let Err(err) = limits.check(stats) {
                self.uncover_header(header);
                return Err(err);
            }

            let row = self.row_id(cell);
            self.solution.push(cell, row);
            stats.updates += self.select_row(cell);

            let result = self.search(limits, stats);
            if let Ok(true) = result {
                return result;
            }

            self.unselect_row(cell);
            self.solution.pop();

            if result.is_err() {
                self.uncover_header(header);
                return result;
            }

            cell = self.next_in_column(cell);
        }

        self.uncover_header(header);
        Ok(false)
    }

    /// Return the row ids of the cover found by the last search, in the order
    /// they were chosen.
    ///
    /// Empty if the last search failed, if no search has run, or if the
    /// matrix has been reset since.
    pub fn solution(&self) -> &[usize] {
        self.solution.rows()
    }

    /// Return the counters of the last search.
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Return an iterator over every exact cover of this matrix.
    ///
    /// The matrix is reset before the search starts, and restored once the
    /// iterator is exhausted or dropped.
    pub fn solutions(&mut self) -> Solutions<'_> {
        Solutions::new(self, ColumnHeuristic::default())
    }

    /// Return an iterator over every exact cover, choosing columns with the
    /// given heuristic.
    pub fn solutions_with(&mut self, heuristic: ColumnHeuristic) -> Solutions<'_> {
        Solutions::new(self, heuristic)
    }

    /// Return the number of exact covers of this matrix.
    pub fn count_solutions(&mut self) -> usize {
        self.solutions().count()
    }
}

/// Iterator over every exact cover of a [`Matrix`].
///
/// Runs the same search as [`Matrix::solve`], but keeps its choice points on
/// an explicit stack instead of the call stack so it can suspend after each
/// solution.
#[derive(Debug)]
pub struct Solutions<'m> {
    matrix: &'m mut Matrix,
    heuristic: ColumnHeuristic,
    stack: Vec<Frame>,
    state: Option<FrameState>,
}

#[derive(Debug, Clone, Copy)]
enum FrameState {
    // Choose a column below the rows selected so far
    Descend,
    // Undo the row selected in the top frame and try the next one
    Advance,
}

#[derive(Debug)]
struct Frame {
    // Header of the column this frame branches on
    column: usize,
    // Cell of the selected row, or `column` before the first row
    row: usize,
}

impl<'m> Solutions<'m> {
    fn new(matrix: &'m mut Matrix, heuristic: ColumnHeuristic) -> Self {
        matrix.reset();
        matrix.stats = SearchStats::default();

        Solutions {
            matrix,
            heuristic,
            stack: Vec::new(),
            state: Some(FrameState::Descend),
        }
    }

    fn current_rows(&self) -> Vec<usize> {
        self.stack
            .iter()
            .map(|frame| self.matrix.row_id(frame.row))
            .collect()
    }

    /// Compute up to the next solution, returning `None` if there are no more.
    pub fn next_solution(&mut self) -> Option<Vec<usize>> {
        loop {
            match self.state? {
                FrameState::Descend => {
                    self.matrix.stats.nodes += 1;
                    self.state = Some(FrameState::Advance);

                    let Some(header) = self.matrix.choose_header(self.heuristic) else {
                        self.matrix.stats.solutions += 1;
                        return Some(self.current_rows());
                    };

                    if self.matrix.header_size(header) > 0 {
                        let updates = self.matrix.cover_header(header);
                        self.matrix.stats.updates += updates;
                        self.stack.push(Frame {
                            column: header,
                            row: header,
                        });
                    }
                }
                FrameState::Advance => {
                    let Some(frame) = self.stack.last_mut() else {
                        self.state = None;
                        return None;
                    };

                    if frame.row != frame.column {
                        self.matrix.unselect_row(frame.row);
                    }

                    frame.row = self.matrix.next_in_column(frame.row);
                    if frame.row == frame.column {
                        let header = frame.column;
                        self.stack.pop();
                        self.matrix.uncover_header(header);
                    } else {
                        let updates = self.matrix.select_row(frame.row);
                        self.matrix.stats.updates += updates;
                        self.state = Some(FrameState::Descend);
                    }
                }
            }
        }
    }
}

impl Iterator for Solutions<'_> {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_solution()
    }
}

impl Drop for Solutions<'_> {
    fn drop(&mut self) {
        while let Some(frame) = self.stack.pop() {
            if frame.row != frame.column {
                self.matrix.unselect_row(frame.row);
            }
            self.matrix.uncover_header(frame.column);
        }
    }
}
