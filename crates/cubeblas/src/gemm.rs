use cubecl::prelude::*;

use crate::config::GlobalConfig;
use crate::kernel::gemm_kernel;
use crate::matrix::GemmProblem;
use crate::{Buffer, DeviceAlloc, DeviceStorage, Event, GemmError, Queue};

/// GEMM on managed buffers.
///
/// The result is written to the device copy of `c`; it becomes visible on the host through
/// [Buffer::host_access] or when `c` is dropped.
pub fn gemm<R: Runtime>(
    queue: &Queue<R>,
    problem: &GemmProblem,
    a: &Buffer<'_, R>,
    b: &Buffer<'_, R>,
    c: &mut Buffer<'_, R>,
) -> Result<(), GemmError> {
    launch(queue, problem, a, b, &*c)?;
    c.mark_device_written();
    Ok(())
}

/// GEMM on explicit device allocations.
///
/// Every event in `dependencies` is waited on before the GEMM is submitted. The returned event
/// borrows `c` until it is waited on.
pub fn gemm_usm<'a, R: Runtime>(
    queue: &Queue<R>,
    problem: &GemmProblem,
    a: &DeviceAlloc<R>,
    b: &DeviceAlloc<R>,
    c: &'a mut DeviceAlloc<R>,
    dependencies: Vec<Event<'_, R>>,
) -> Result<Event<'a, R>, GemmError> {
    problem.validate(a.len(), b.len(), c.len())?;

    for event in dependencies {
        event.wait();
    }

    launch(queue, problem, a, b, &*c)?;

    Ok(Event::new(queue.clone()))
}

fn launch<R: Runtime>(
    queue: &Queue<R>,
    problem: &GemmProblem,
    a: &impl DeviceStorage,
    b: &impl DeviceStorage,
    c: &impl DeviceStorage,
) -> Result<(), GemmError> {
    problem.validate(a.len(), b.len(), c.len())?;

    if problem.m == 0 || problem.n == 0 {
        log::debug!("Skipping empty GEMM {problem:?}");
        return Ok(());
    }

    let cube_dim = GlobalConfig::get().launch.cube_dim;
    let cubes_x = (problem.m as u32).div_ceil(cube_dim);
    let cubes_y = (problem.n as u32).div_ceil(cube_dim);
    log::debug!("Launching GEMM {problem:?} on {cubes_x}x{cubes_y} cubes");

    unsafe {
        gemm_kernel::launch_unchecked::<f32, R>(
            queue.client(),
            CubeCount::Static(cubes_x, cubes_y, 1),
            CubeDim::new(cube_dim, cube_dim, 1),
            ArrayArg::from_raw_parts::<f32>(a.handle(), a.len(), 1),
            ArrayArg::from_raw_parts::<f32>(b.handle(), b.len(), 1),
            ArrayArg::from_raw_parts::<f32>(c.handle(), c.len(), 1),
            ScalarArg::new(problem.m as u32),
            ScalarArg::new(problem.n as u32),
            ScalarArg::new(problem.k as u32),
            ScalarArg::new(problem.lda as u32),
            ScalarArg::new(problem.ldb as u32),
            ScalarArg::new(problem.ldc as u32),
            ScalarArg::new(problem.alpha),
            ScalarArg::new(problem.beta),
            problem.trans_a.is_trans(),
            problem.trans_b.is_trans(),
            problem.layout.is_col_major(),
        )
    };

    Ok(())
}
