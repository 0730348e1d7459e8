//! The `A * I = A` check, once per memory style.

use cubecl::prelude::*;

use crate::matrix::{gemm_host, identity_product, GemmProblem, GemmSetup, Layout, MatrixRef};
use crate::verify::{verify, Verification};
use crate::{gemm, gemm_usm, Buffer, DeviceAlloc, GemmError, Queue};

/// Result of one scenario run.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// Final storage of `C` on the host.
    pub c: Vec<f32>,
    pub verification: Verification,
}

/// Runs the check with managed buffers.
///
/// Completion is observed when host access to `C` is requested; the buffers write back and
/// release their device copies when they go out of scope.
pub fn run_buffers<R: Runtime>(queue: &Queue<R>, setup: &GemmSetup) -> Result<Report, GemmError> {
    let problem = &setup.problem;
    let mut a = setup.a.clone();
    let mut b = setup.b.clone();
    let mut c = setup.c.clone();

    let verification = {
        let mut a_buffer = Buffer::new(queue, &mut a)?;
        let b_buffer = Buffer::new(queue, &mut b)?;
        let mut c_buffer = Buffer::new(queue, &mut c)?;

        gemm(queue, problem, &a_buffer, &b_buffer, &mut c_buffer)?;
        log::info!("Submitted GEMM on managed buffers");

        let a_host = a_buffer.host_access();
        let c_host = c_buffer.host_access();

        check(problem, &a_host, &c_host)
    };

    Ok(Report { c, verification })
}

/// Runs the check with explicit device allocations.
///
/// Data is copied in explicitly, the GEMM event is waited on before any read, and every
/// allocation is freed once the results have been read back.
pub fn run_usm<R: Runtime>(queue: &Queue<R>, setup: &GemmSetup) -> Result<Report, GemmError> {
    let problem = &setup.problem;

    let mut a = DeviceAlloc::alloc(queue, setup.a.len())?;
    let mut b = DeviceAlloc::alloc(queue, setup.b.len())?;
    let mut c = DeviceAlloc::alloc(queue, setup.c.len())?;

    a.copy_from_host(&setup.a)?;
    b.copy_from_host(&setup.b)?;
    c.copy_from_host(&setup.c)?;

    let gemm_done = gemm_usm(queue, problem, &a, &b, &mut c, Vec::new())?;
    log::info!("Submitted GEMM on device allocations");
    gemm_done.wait();

    let a_host = a.to_host();
    let c_host = c.to_host();

    let verification = check(problem, &a_host, &c_host);

    a.free();
    b.free();
    c.free();

    Ok(Report {
        c: c_host,
        verification,
    })
}

/// Runs the check with the host reference GEMM.
pub fn run_host(setup: &GemmSetup) -> Result<Report, GemmError> {
    let mut c = setup.c.clone();
    gemm_host(&setup.problem, &setup.a, &setup.b, &mut c)?;
    let verification = check(&setup.problem, &setup.a, &c);

    Ok(Report { c, verification })
}

/// Compares `C` with `A * I`.
fn check(problem: &GemmProblem, a: &[f32], c: &[f32]) -> Verification {
    let expected = identity_product(problem, a);

    verify(
        MatrixRef::new(&expected, problem.m, problem.n, problem.n, Layout::RowMajor),
        MatrixRef::new(c, problem.m, problem.n, problem.ldc, problem.layout),
    )
}

/// What a program prints on stdout for one scenario run, and its exit code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramOutput {
    pub stdout: String,
    pub code: u8,
}

impl ProgramOutput {
    /// The `Device:` line, then a blank line and the verification.
    ///
    /// A failed run only prints the device line and exits with `2`; the error itself goes to the
    /// logger.
    pub fn new(device_name: &str, result: &Result<Report, GemmError>) -> Self {
        let mut stdout = format!("Device: {device_name}\n");

        let code = match result {
            Ok(report) => {
                stdout.push_str(&format!("\n{}\n", report.verification));
                report.verification.status().code()
            }
            Err(_) => 2,
        };

        Self { stdout, code }
    }
}
