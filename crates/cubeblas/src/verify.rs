use core::fmt::Display;

use crate::matrix::MatrixRef;

/// Outcome of comparing a computed matrix with the expected one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Every element matched exactly.
    Verified,
    /// At least one element differed.
    Mismatch {
        /// Number of differing elements.
        count: usize,
        /// `(row, col)` of the first differing element in row order.
        first: (usize, usize),
    },
}

impl Status {
    /// Process exit code: `0` when verified, `1` otherwise.
    pub fn code(&self) -> u8 {
        match self {
            Status::Verified => 0,
            Status::Mismatch { .. } => 1,
        }
    }

    pub fn is_verified(&self) -> bool {
        matches!(self, Status::Verified)
    }
}

/// Computed values together with their [Status].
#[derive(Debug, Clone, PartialEq)]
pub struct Verification {
    rows: Vec<Vec<f32>>,
    status: Status,
}

impl Verification {
    pub fn status(&self) -> Status {
        self.status
    }

    /// Computed values, row by row.
    pub fn rows(&self) -> &[Vec<f32>] {
        &self.rows
    }
}

/// Compares `actual` with `expected` element by element, without tolerance.
///
/// Elements missing from `expected` count as mismatches.
pub fn verify(expected: MatrixRef<'_>, actual: MatrixRef<'_>) -> Verification {
    let mut count = 0;
    let mut first = None;

    for row in 0..actual.rows {
        for col in 0..actual.cols {
            if expected.get(row, col) != actual.get(row, col) {
                count += 1;
                if first.is_none() {
                    first = Some((row, col));
                }
            }
        }
    }

    let status = match first {
        None => Status::Verified,
        Some(first) => Status::Mismatch { count, first },
    };

    if let Status::Mismatch { count, first } = status {
        log::info!("{count} elements differ, first at {first:?}");
    }

    Verification {
        rows: actual.to_rows(),
        status,
    }
}

impl Display for Verification {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "C = ")?;
        for row in &self.rows {
            for value in row {
                write!(f, "{value} ")?;
            }
            writeln!(f)?;
        }
        writeln!(f)?;

        match self.status {
            Status::Verified => write!(f, "Verified: A = C"),
            Status::Mismatch { .. } => write!(f, "Failed: A != C"),
        }
    }
}
