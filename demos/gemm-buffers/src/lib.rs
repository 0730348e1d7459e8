use std::process::ExitCode;

use cubeblas::{
    matrix::GemmSetup,
    scenario::{run_buffers, ProgramOutput, Report},
    GemmError, Queue,
};
use cubecl::prelude::*;

/// Multiplies `A` by the identity on managed buffers and checks that `C = A`.
pub fn launch<R: Runtime>(device: &R::Device) -> ExitCode {
    let queue = Queue::<R>::new(device);
    let setup = GemmSetup::identity_check(3, 3, 3);

    let output = summarize(&queue.device_name(), &run_buffers(&queue, &setup));
    print!("{}", output.stdout);

    ExitCode::from(output.code)
}

fn summarize(device_name: &str, result: &Result<Report, GemmError>) -> ProgramOutput {
    if let Err(err) = result {
        log::error!("GEMM on managed buffers failed: {err}");
    }

    ProgramOutput::new(device_name, result)
}
