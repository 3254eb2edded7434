#![no_main]

use dlx_matrix::Matrix;
use libfuzzer_sys::fuzz_target;

#[derive(Debug)]
struct SmallMatrixInput {
    num_columns: usize,
    rows: Vec<Vec<usize>>,
}

impl<'a> arbitrary::Arbitrary<'a> for SmallMatrixInput {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let num_columns = usize::from(u.int_in_range(0..=8u8)?);
        let num_rows = usize::from(u.int_in_range(0..=16u8)?);

        let rows = (0..num_rows)
            .map(|_| {
                let mask = u.arbitrary::<u8>()?;

                Ok((0..num_columns)
                    .filter(|column| mask & (1 << column) != 0)
                    .collect())
            })
            .collect::<arbitrary::Result<_>>()?;

        Ok(SmallMatrixInput { num_columns, rows })
    }
}

fuzz_target!(|input: SmallMatrixInput| {
    let mut matrix = Matrix::new(input.num_columns);
    for (row_id, columns) in input.rows.iter().enumerate() {
        matrix.add_row(row_id, columns.iter().copied()).unwrap();
    }
    let original = matrix.clone();

    if matrix.solve() {
        let mut counts = vec![0; input.num_columns];
        for &row_id in matrix.solution() {
            for &column in &input.rows[row_id] {
                counts[column] += 1;
            }
        }
        assert!(counts.iter().all(|&count| count == 1), "{:?}", counts);

        matrix.reset();
    }

    assert_eq!(matrix, original);
});
