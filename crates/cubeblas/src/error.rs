use thiserror::Error;

use crate::matrix::Operand;

/// Errors raised while preparing or launching a GEMM, or while moving data between host and
/// device.
///
/// A verification mismatch is not an error, see [Status](crate::verify::Status).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GemmError {
    /// The leading dimension is smaller than the stored row length of the operand.
    #[error("leading dimension of {operand} is {ld}, but at least {min} is required")]
    InvalidLeadingDimension {
        /// The offending operand.
        operand: Operand,
        /// The provided leading dimension.
        ld: usize,
        /// The smallest valid leading dimension.
        min: usize,
    },

    /// The storage bound to an operand can't hold the matrix described by the problem.
    #[error("{operand} needs at least {required} elements, but its storage holds {actual}")]
    StorageTooSmall {
        /// The offending operand.
        operand: Operand,
        /// Number of elements required by the problem.
        required: usize,
        /// Number of elements available.
        actual: usize,
    },

    /// A dimension doesn't fit the 32-bit indexing used by the kernels.
    #[error("dimension {name} = {value} exceeds the kernel index range")]
    DimensionOverflow {
        /// Name of the dimension.
        name: &'static str,
        /// The provided value.
        value: usize,
    },

    /// A host slice doesn't match the length of the device region it is copied to.
    #[error("host data has {actual} elements, but the device region holds {expected}")]
    LengthMismatch {
        /// Length of the device region.
        expected: usize,
        /// Length of the host data.
        actual: usize,
    },

    /// The configuration is invalid or couldn't be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}
