//! Runtime-generic tests, instantiated for a concrete runtime with [testgen_all](crate::testgen_all).

pub mod gemm;

/// Small integers, so every product and sum is exact in `f32`.
pub(crate) fn sample(len: usize, seed: usize) -> Vec<f32> {
    (0..len)
        .map(|i| ((i * 7 + seed * 3) % 11) as f32 - 5.0)
        .collect()
}

#[macro_export]
macro_rules! testgen_all {
    () => {
        mod cubeblas_tests {
            use super::*;

            $crate::testgen_scenario!();
            $crate::testgen_gemm!();
            $crate::testgen_buffer!();
            $crate::testgen_usm!();
        }
    };
}
