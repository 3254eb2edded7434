#![no_main]

use dlx_matrix::Matrix;
use libfuzzer_sys::fuzz_target;

#[derive(Debug)]
struct SmallMatrixInput {
    num_columns: usize,
    rows: Vec<u8>,
}

impl<'a> arbitrary::Arbitrary<'a> for SmallMatrixInput {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let num_columns = usize::from(u.int_in_range(0..=6u8)?);
        let num_rows = usize::from(u.int_in_range(0..=10u8)?);
        let column_mask = ((1u16 << num_columns) - 1) as u8;

        let rows = (0..num_rows)
            .map(|_| Ok(u.arbitrary::<u8>()? & column_mask))
            .collect::<arbitrary::Result<_>>()?;

        Ok(SmallMatrixInput { num_columns, rows })
    }
}

// Count covers by checking every subset of the non-empty rows.
fn brute_force_count(input: &SmallMatrixInput) -> usize {
    let full = ((1u16 << input.num_columns) - 1) as u8;
    let rows: Vec<u8> = input.rows.iter().copied().filter(|&row| row != 0).collect();

    (0..(1u32 << rows.len()))
        .filter(|subset| {
            let mut covered = 0u8;
            for (index, &row) in rows.iter().enumerate() {
                if subset & (1 << index) != 0 {
                    if covered & row != 0 {
                        return false;
                    }
                    covered |= row;
                }
            }

            covered == full
        })
        .count()
}

fuzz_target!(|input: SmallMatrixInput| {
    let mut matrix = Matrix::new(input.num_columns);
    for (row_id, &mask) in input.rows.iter().enumerate() {
        let columns = (0..input.num_columns).filter(|column| mask & (1 << column) != 0);
        matrix.add_row(row_id, columns).unwrap();
    }
    let original = matrix.clone();

    assert_eq!(matrix.count_solutions(), brute_force_count(&input));
    assert_eq!(matrix, original);
});
