use cubecl::prelude::*;

/// One unit per element of `out`: `out = alpha * op(lhs) * op(rhs) + beta * out`.
///
/// Bounds are validated on the host before launch, so only the grid tail is masked here.
#[cube(launch_unchecked)]
#[allow(clippy::too_many_arguments)]
pub(crate) fn gemm_kernel<F: Float>(
    lhs: &Array<F>,
    rhs: &Array<F>,
    out: &mut Array<F>,
    m: u32,
    n: u32,
    k: u32,
    lda: u32,
    ldb: u32,
    ldc: u32,
    alpha: F,
    beta: F,
    #[comptime] trans_a: bool,
    #[comptime] trans_b: bool,
    #[comptime] col_major: bool,
) {
    let row = ABSOLUTE_POS_X;
    let col = ABSOLUTE_POS_Y;

    if row < m && col < n {
        let mut sum = F::new(0.0);

        for i in 0..k {
            let lhs_index = operand_index(row, i, lda, trans_a, col_major);
            let rhs_index = operand_index(i, col, ldb, trans_b, col_major);
            sum += lhs[lhs_index] * rhs[rhs_index];
        }

        let out_index = element_index(row, col, ldc, col_major);
        out[out_index] = alpha * sum + beta * out[out_index];
    }
}

#[cube]
fn element_index(row: u32, col: u32, ld: u32, #[comptime] col_major: bool) -> u32 {
    let mut index = row * ld + col;
    if col_major {
        index = col * ld + row;
    }
    index
}

/// Index of `op(X)[row][col]` in the storage of `X`.
#[cube]
fn operand_index(
    row: u32,
    col: u32,
    ld: u32,
    #[comptime] transposed: bool,
    #[comptime] col_major: bool,
) -> u32 {
    let mut index = element_index(row, col, ld, col_major);
    if transposed {
        index = element_index(col, row, ld, col_major);
    }
    index
}

#[cube(launch_unchecked)]
pub(crate) fn copy_kernel<F: Float>(input: &Array<F>, output: &mut Array<F>) {
    if ABSOLUTE_POS < input.len() {
        output[ABSOLUTE_POS] = input[ABSOLUTE_POS];
    }
}
