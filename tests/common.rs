use dlx_matrix::Matrix;
use std::collections::HashMap;

/// A problem kept alongside its matrix, so solutions can be checked against
/// the rows that were added.
pub struct Problem {
    pub matrix: Matrix,
    pub rows: HashMap<usize, Vec<usize>>,
}

impl Problem {
    pub fn new(primary: usize, secondary: usize) -> Self {
        Problem {
            matrix: Matrix::with_secondary(primary, secondary),
            rows: HashMap::new(),
        }
    }

    pub fn add_row(&mut self, row_id: usize, columns: Vec<usize>) {
        self.matrix
            .add_row(row_id, columns.iter().copied())
            .expect("columns should be in range");

        assert!(
            self.rows.insert(row_id, columns).is_none(),
            "row ids should be unique within a problem"
        );
    }

    /// Assert that the given rows cover every primary column exactly once and
    /// every secondary column at most once.
    pub fn assert_exact_cover(&self, solution: &[usize]) {
        let num_primary = self.matrix.num_primary_columns();
        let mut counts = vec![0usize; self.matrix.num_columns()];

        for row_id in solution {
            let columns = self
                .rows
                .get(row_id)
                .unwrap_or_else(|| panic!("solution names unknown row [{}]", row_id));

            for &column in columns {
                counts[column] += 1;
            }
        }

        for (column, count) in counts.into_iter().enumerate() {
            if column < num_primary {
                assert_eq!(count, 1, "primary column [{}] in {:?}", column, solution);
            } else {
                assert!(count <= 1, "secondary column [{}] in {:?}", column, solution);
            }
        }
    }
}

/// Reduce the `n` queens puzzle to exact cover.
///
/// Rows and files of the board are primary columns `0..2n`; both families of
/// diagonals are secondary. The row id of a queen at `(rank, file)` is
/// `rank * n + file`.
#[allow(dead_code)]
pub fn n_queens(n: usize) -> Problem {
    let diagonals = 2 * n - 1;
    let mut problem = Problem::new(2 * n, 2 * diagonals);

    for rank in 0..n {
        for file in 0..n {
            let leading = file + (n - 1) - rank;
            let trailing = rank + file;

            problem.add_row(
                rank * n + file,
                vec![
                    rank,
                    n + file,
                    2 * n + leading,
                    2 * n + diagonals + trailing,
                ],
            );
        }
    }

    problem
}

/// Return the queen positions named by a solution to [`n_queens`], sorted.
#[allow(dead_code)]
pub fn queen_positions(n: usize, solution: &[usize]) -> Vec<(usize, usize)> {
    let mut positions: Vec<_> = solution.iter().map(|row| (row / n, row % n)).collect();
    positions.sort_unstable();
    positions
}

#[allow(dead_code)]
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
