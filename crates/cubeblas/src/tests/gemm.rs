use cubecl::prelude::*;
use pretty_assertions::assert_eq;

use super::sample;
use crate::matrix::{gemm_host, GemmProblem, Layout, Operand, Transpose};
use crate::{gemm, gemm_usm, Buffer, DeviceAlloc, GemmError, Queue};

/// `5x4 = op(A) 5x3 * op(B) 3x4` with padded leading dimensions and non-trivial scalars.
fn padded_problem(layout: Layout, trans_a: Transpose, trans_b: Transpose) -> GemmProblem {
    let (m, n, k) = (5, 4, 3);
    let mut problem = GemmProblem {
        layout,
        trans_a,
        trans_b,
        alpha: 2.0,
        beta: -1.0,
        ..GemmProblem::tight(m, n, k)
    };

    let (rows, cols) = problem.stored_shape(Operand::A);
    problem.lda = layout.min_ld(rows, cols) + 2;
    let (rows, cols) = problem.stored_shape(Operand::B);
    problem.ldb = layout.min_ld(rows, cols) + 1;
    problem.ldc = layout.min_ld(m, n) + 3;

    problem
}

fn host_operands(problem: &GemmProblem) -> (Vec<f32>, Vec<f32>, Vec<f32>) {
    (
        sample(problem.required_len(Operand::A), 1),
        sample(problem.required_len(Operand::B), 2),
        sample(problem.required_len(Operand::C), 3),
    )
}

pub fn test_usm_matches_host<R: Runtime>(
    device: &R::Device,
    layout: Layout,
    trans_a: Transpose,
    trans_b: Transpose,
) {
    let queue = Queue::<R>::new(device);
    let problem = padded_problem(layout, trans_a, trans_b);
    let (a, b, c) = host_operands(&problem);

    let mut expected = c.clone();
    gemm_host(&problem, &a, &b, &mut expected).unwrap();

    let a = DeviceAlloc::from_host(&queue, &a).unwrap();
    let b = DeviceAlloc::from_host(&queue, &b).unwrap();
    let mut c = DeviceAlloc::from_host(&queue, &c).unwrap();

    gemm_usm(&queue, &problem, &a, &b, &mut c, Vec::new())
        .unwrap()
        .wait();

    assert_eq!(c.to_host(), expected);

    a.free();
    b.free();
    c.free();
}

pub fn test_buffers_match_host<R: Runtime>(
    device: &R::Device,
    layout: Layout,
    trans_a: Transpose,
    trans_b: Transpose,
) {
    let queue = Queue::<R>::new(device);
    let problem = padded_problem(layout, trans_a, trans_b);
    let (mut a, mut b, mut c) = host_operands(&problem);

    let mut expected = c.clone();
    gemm_host(&problem, &a, &b, &mut expected).unwrap();

    {
        let a = Buffer::new(&queue, &mut a).unwrap();
        let b = Buffer::new(&queue, &mut b).unwrap();
        let mut c = Buffer::new(&queue, &mut c).unwrap();

        gemm(&queue, &problem, &a, &b, &mut c).unwrap();

        assert_eq!(c.host_access().to_vec(), expected);
    }

    assert_eq!(c, expected);
}

pub fn test_invalid_leading_dimension<R: Runtime>(device: &R::Device) {
    let queue = Queue::<R>::new(device);
    let problem = GemmProblem {
        lda: 2,
        ..GemmProblem::tight(3, 3, 3)
    };

    let a = DeviceAlloc::zeros(&queue, 9).unwrap();
    let b = DeviceAlloc::zeros(&queue, 9).unwrap();
    let mut c = DeviceAlloc::zeros(&queue, 9).unwrap();

    let result = gemm_usm(&queue, &problem, &a, &b, &mut c, Vec::new());

    assert!(matches!(
        result,
        Err(GemmError::InvalidLeadingDimension {
            operand: Operand::A,
            ld: 2,
            min: 3
        })
    ));
}

pub fn test_storage_too_small<R: Runtime>(device: &R::Device) {
    let queue = Queue::<R>::new(device);
    let problem = GemmProblem::tight(3, 3, 3);

    let mut a_host = vec![0.0; 9];
    let mut b_host = vec![0.0; 9];
    let mut c_host = vec![0.0; 8];

    let a = Buffer::new(&queue, &mut a_host).unwrap();
    let b = Buffer::new(&queue, &mut b_host).unwrap();
    let mut c = Buffer::new(&queue, &mut c_host).unwrap();

    assert_eq!(
        gemm(&queue, &problem, &a, &b, &mut c),
        Err(GemmError::StorageTooSmall {
            operand: Operand::C,
            required: 9,
            actual: 8
        })
    );
}

/// A chain of two GEMMs where the second waits on the first.
pub fn test_dependencies_are_waited<R: Runtime>(device: &R::Device) {
    let queue = Queue::<R>::new(device);
    let problem = GemmProblem::tight(2, 2, 2);

    let a = DeviceAlloc::from_host(&queue, &[1., 2., 3., 4.]).unwrap();
    let b = DeviceAlloc::from_host(&queue, &[1., 0., 0., 1.]).unwrap();
    let mut first = DeviceAlloc::zeros(&queue, 4).unwrap();
    let mut second = DeviceAlloc::from_host(&queue, &[10., 10., 10., 10.]).unwrap();

    let first_done = gemm_usm(&queue, &problem, &a, &b, &mut first, Vec::new()).unwrap();
    let second_done =
        gemm_usm(&queue, &problem, &a, &b, &mut second, vec![first_done]).unwrap();
    second_done.wait();

    assert_eq!(first.to_host(), vec![1., 2., 3., 4.]);
    assert_eq!(second.to_host(), vec![11., 12., 13., 14.]);
}

pub fn test_zero_depth_scales_output<R: Runtime>(device: &R::Device) {
    let queue = Queue::<R>::new(device);
    let problem = GemmProblem {
        beta: 2.0,
        ..GemmProblem::tight(2, 2, 0)
    };

    let a = DeviceAlloc::zeros(&queue, 1).unwrap();
    let b = DeviceAlloc::zeros(&queue, 2).unwrap();
    let mut c = DeviceAlloc::from_host(&queue, &[1., 2., 3., 4.]).unwrap();

    gemm_usm(&queue, &problem, &a, &b, &mut c, Vec::new())
        .unwrap()
        .wait();

    assert_eq!(c.to_host(), vec![2., 4., 6., 8.]);
}

#[macro_export]
macro_rules! testgen_gemm {
    () => {
        mod gemm {
            use super::*;
            use $crate::matrix::{Layout, Transpose};

            #[test]
            fn usm_row_nn() {
                $crate::tests::gemm::test_usm_matches_host::<TestRuntime>(
                    &Default::default(),
                    Layout::RowMajor,
                    Transpose::NoTrans,
                    Transpose::NoTrans,
                );
            }

            #[test]
            fn buffers_row_nn() {
                $crate::tests::gemm::test_buffers_match_host::<TestRuntime>(
                    &Default::default(),
                    Layout::RowMajor,
                    Transpose::NoTrans,
                    Transpose::NoTrans,
                );
            }

            #[test]
            fn usm_row_tn() {
                $crate::tests::gemm::test_usm_matches_host::<TestRuntime>(
                    &Default::default(),
                    Layout::RowMajor,
                    Transpose::Trans,
                    Transpose::NoTrans,
                );
            }

            #[test]
            fn buffers_row_tn() {
                $crate::tests::gemm::test_buffers_match_host::<TestRuntime>(
                    &Default::default(),
                    Layout::RowMajor,
                    Transpose::Trans,
                    Transpose::NoTrans,
                );
            }

            #[test]
            fn usm_row_nt() {
                $crate::tests::gemm::test_usm_matches_host::<TestRuntime>(
                    &Default::default(),
                    Layout::RowMajor,
                    Transpose::NoTrans,
                    Transpose::Trans,
                );
            }

            #[test]
            fn buffers_row_nt() {
                $crate::tests::gemm::test_buffers_match_host::<TestRuntime>(
                    &Default::default(),
                    Layout::RowMajor,
                    Transpose::NoTrans,
                    Transpose::Trans,
                );
            }

            #[test]
            fn usm_col_nn() {
                $crate::tests::gemm::test_usm_matches_host::<TestRuntime>(
                    &Default::default(),
                    Layout::ColMajor,
                    Transpose::NoTrans,
                    Transpose::NoTrans,
                );
            }

            #[test]
            fn buffers_col_nn() {
                $crate::tests::gemm::test_buffers_match_host::<TestRuntime>(
                    &Default::default(),
                    Layout::ColMajor,
                    Transpose::NoTrans,
                    Transpose::NoTrans,
                );
            }

            #[test]
            fn usm_col_tt() {
                $crate::tests::gemm::test_usm_matches_host::<TestRuntime>(
                    &Default::default(),
                    Layout::ColMajor,
                    Transpose::Trans,
                    Transpose::Trans,
                );
            }

            #[test]
            fn buffers_col_tt() {
                $crate::tests::gemm::test_buffers_match_host::<TestRuntime>(
                    &Default::default(),
                    Layout::ColMajor,
                    Transpose::Trans,
                    Transpose::Trans,
                );
            }

            #[test]
            fn invalid_leading_dimension() {
                $crate::tests::gemm::test_invalid_leading_dimension::<TestRuntime>(
                    &Default::default(),
                );
            }

            #[test]
            fn storage_too_small() {
                $crate::tests::gemm::test_storage_too_small::<TestRuntime>(&Default::default());
            }

            #[test]
            fn dependencies_are_waited() {
                $crate::tests::gemm::test_dependencies_are_waited::<TestRuntime>(
                    &Default::default(),
                );
            }

            #[test]
            fn zero_depth_scales_output() {
                $crate::tests::gemm::test_zero_depth_scales_output::<TestRuntime>(
                    &Default::default(),
                );
            }
        }
    };
}
