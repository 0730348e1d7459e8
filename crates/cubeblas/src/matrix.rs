use core::fmt::Display;

use crate::GemmError;

/// Storage order shared by the three matrices of a GEMM.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Layout {
    /// Consecutive elements of a row are contiguous, `ld` is the row stride.
    #[default]
    RowMajor,
    /// Consecutive elements of a column are contiguous, `ld` is the column stride.
    ColMajor,
}

impl Layout {
    /// Linear index of element `(row, col)` for the given leading dimension.
    pub fn index(&self, row: usize, col: usize, ld: usize) -> usize {
        match self {
            Layout::RowMajor => row * ld + col,
            Layout::ColMajor => col * ld + row,
        }
    }

    /// Smallest valid leading dimension for a stored `rows x cols` matrix.
    pub fn min_ld(&self, rows: usize, cols: usize) -> usize {
        match self {
            Layout::RowMajor => cols.max(1),
            Layout::ColMajor => rows.max(1),
        }
    }

    /// Number of elements a stored `rows x cols` matrix spans with the given leading dimension.
    pub fn span(&self, rows: usize, cols: usize, ld: usize) -> usize {
        if rows == 0 || cols == 0 {
            return 0;
        }

        match self {
            Layout::RowMajor => (rows - 1) * ld + cols,
            Layout::ColMajor => (cols - 1) * ld + rows,
        }
    }

    pub(crate) fn is_col_major(&self) -> bool {
        matches!(self, Layout::ColMajor)
    }
}

/// Whether an input operand is used as stored or transposed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Transpose {
    #[default]
    NoTrans,
    Trans,
}

impl Transpose {
    pub(crate) fn is_trans(&self) -> bool {
        matches!(self, Transpose::Trans)
    }
}

/// Identifies one of the three GEMM operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand {
    A,
    B,
    C,
}

impl Display for Operand {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Operand::A => "A",
            Operand::B => "B",
            Operand::C => "C",
        };
        f.write_str(name)
    }
}

/// Arguments of `C := alpha * op(A) * op(B) + beta * C`.
///
/// `op(A)` is `m x k`, `op(B)` is `k x n` and `C` is `m x n`.
#[derive(new, Debug, Clone, Copy, PartialEq)]
#[allow(clippy::too_many_arguments)]
pub struct GemmProblem {
    pub layout: Layout,
    pub trans_a: Transpose,
    pub trans_b: Transpose,
    pub m: usize,
    pub n: usize,
    pub k: usize,
    pub alpha: f32,
    pub lda: usize,
    pub ldb: usize,
    pub beta: f32,
    pub ldc: usize,
}

impl GemmProblem {
    /// Untransposed row-major problem with unpadded leading dimensions and `alpha = beta = 1`.
    pub fn tight(m: usize, n: usize, k: usize) -> Self {
        Self::new(
            Layout::RowMajor,
            Transpose::NoTrans,
            Transpose::NoTrans,
            m,
            n,
            k,
            1.0,
            k.max(1),
            n.max(1),
            1.0,
            n.max(1),
        )
    }

    /// Stored `(rows, cols)` of an operand, before `op` is applied.
    pub fn stored_shape(&self, operand: Operand) -> (usize, usize) {
        match operand {
            Operand::A => match self.trans_a {
                Transpose::NoTrans => (self.m, self.k),
                Transpose::Trans => (self.k, self.m),
            },
            Operand::B => match self.trans_b {
                Transpose::NoTrans => (self.k, self.n),
                Transpose::Trans => (self.n, self.k),
            },
            Operand::C => (self.m, self.n),
        }
    }

    /// Leading dimension of an operand.
    pub fn ld(&self, operand: Operand) -> usize {
        match operand {
            Operand::A => self.lda,
            Operand::B => self.ldb,
            Operand::C => self.ldc,
        }
    }

    /// Minimum number of elements the storage of an operand must hold.
    pub fn required_len(&self, operand: Operand) -> usize {
        let (rows, cols) = self.stored_shape(operand);
        self.layout.span(rows, cols, self.ld(operand))
    }

    /// Index of `op(A)[row][col]` in the storage of A.
    pub fn a_index(&self, row: usize, col: usize) -> usize {
        match self.trans_a {
            Transpose::NoTrans => self.layout.index(row, col, self.lda),
            Transpose::Trans => self.layout.index(col, row, self.lda),
        }
    }

    /// Index of `op(B)[row][col]` in the storage of B.
    pub fn b_index(&self, row: usize, col: usize) -> usize {
        match self.trans_b {
            Transpose::NoTrans => self.layout.index(row, col, self.ldb),
            Transpose::Trans => self.layout.index(col, row, self.ldb),
        }
    }

    /// Index of `C[row][col]` in the storage of C.
    pub fn c_index(&self, row: usize, col: usize) -> usize {
        self.layout.index(row, col, self.ldc)
    }

    /// Checks leading dimensions, storage lengths and the kernel index range.
    pub fn validate(&self, a_len: usize, b_len: usize, c_len: usize) -> Result<(), GemmError> {
        for (name, value) in [("m", self.m), ("n", self.n), ("k", self.k)] {
            check_u32(name, value)?;
        }

        for (operand, actual) in [(Operand::A, a_len), (Operand::B, b_len), (Operand::C, c_len)] {
            let (rows, cols) = self.stored_shape(operand);
            let ld = self.ld(operand);
            let min = self.layout.min_ld(rows, cols);

            if ld < min {
                return Err(GemmError::InvalidLeadingDimension { operand, ld, min });
            }

            let required = self.required_len(operand);
            if actual < required {
                return Err(GemmError::StorageTooSmall {
                    operand,
                    required,
                    actual,
                });
            }

            check_u32("ld", ld)?;
            check_u32("storage", actual)?;
        }

        Ok(())
    }
}

fn check_u32(name: &'static str, value: usize) -> Result<(), GemmError> {
    if value > u32::MAX as usize {
        return Err(GemmError::DimensionOverflow { name, value });
    }
    Ok(())
}

/// Read-only view over a matrix stored with a leading dimension.
#[derive(new, Debug, Clone, Copy)]
pub struct MatrixRef<'a> {
    pub data: &'a [f32],
    pub rows: usize,
    pub cols: usize,
    pub ld: usize,
    pub layout: Layout,
}

impl MatrixRef<'_> {
    /// Element at `(row, col)`, or `None` when it falls outside the storage.
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.data.get(self.layout.index(row, col, self.ld)).copied()
    }

    /// Logical values, row by row.
    pub fn to_rows(&self) -> Vec<Vec<f32>> {
        (0..self.rows)
            .map(|row| {
                (0..self.cols)
                    .filter_map(|col| self.get(row, col))
                    .collect()
            })
            .collect()
    }
}

/// Row-major `rows x cols` matrix holding `1, 2, 3, ...`.
pub fn linear_fill(rows: usize, cols: usize) -> Vec<f32> {
    (0..rows * cols).map(|i| (i + 1) as f32).collect()
}

/// Row-major `rows x cols` matrix with ones on the main diagonal.
pub fn identity(rows: usize, cols: usize) -> Vec<f32> {
    let mut data = zeros(rows, cols);
    for i in 0..rows.min(cols) {
        data[i * cols + i] = 1.0;
    }
    data
}

pub fn zeros(rows: usize, cols: usize) -> Vec<f32> {
    vec![0.0; rows * cols]
}

/// Host inputs of an `A * I = A` check.
#[derive(Debug, Clone, PartialEq)]
pub struct GemmSetup {
    pub problem: GemmProblem,
    pub a: Vec<f32>,
    pub b: Vec<f32>,
    pub c: Vec<f32>,
}

impl GemmSetup {
    /// `A` filled with `1..=m*k`, `B` the `k x n` identity, `C` zeros, `alpha = beta = 1`.
    ///
    /// Since `C` starts at zero and `B` is the identity, `C` must equal `A * I` afterwards: the
    /// first `min(k, n)` columns of `A`, then zeros. For square shapes that is `A` itself.
    pub fn identity_check(m: usize, n: usize, k: usize) -> Self {
        Self {
            problem: GemmProblem::tight(m, n, k),
            a: linear_fill(m, k),
            b: identity(k, n),
            c: zeros(m, n),
        }
    }

    /// Replaces `B`, keeping everything else.
    pub fn with_b(mut self, b: Vec<f32>) -> Self {
        self.b = b;
        self
    }

    /// Expected value of `C`, as a row-major `m x n` matrix.
    pub fn expected(&self) -> Vec<f32> {
        identity_product(&self.problem, &self.a)
    }
}

/// `op(A) * I` for the `k x n` identity, as a row-major `m x n` matrix.
///
/// Elements of `A` missing from its storage become `NaN`, so they never verify.
pub fn identity_product(problem: &GemmProblem, a: &[f32]) -> Vec<f32> {
    let mut product = zeros(problem.m, problem.n);
    for row in 0..problem.m {
        for col in 0..problem.n.min(problem.k) {
            product[row * problem.n + col] = a
                .get(problem.a_index(row, col))
                .copied()
                .unwrap_or(f32::NAN);
        }
    }
    product
}

/// Reference host implementation of `C := alpha * op(A) * op(B) + beta * C`.
pub fn gemm_host(
    problem: &GemmProblem,
    a: &[f32],
    b: &[f32],
    c: &mut [f32],
) -> Result<(), GemmError> {
    problem.validate(a.len(), b.len(), c.len())?;

    for row in 0..problem.m {
        for col in 0..problem.n {
            let mut sum = 0.0f32;
            for i in 0..problem.k {
                sum += a[problem.a_index(row, i)] * b[problem.b_index(i, col)];
            }
            let index = problem.c_index(row, col);
            c[index] = problem.alpha * sum + problem.beta * c[index];
        }
    }

    Ok(())
}
