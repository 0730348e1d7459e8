use std::process::ExitCode;

use cubeblas::config::GlobalConfig;

#[cfg(feature = "cuda")]
type Backend = cubecl::cuda::CudaRuntime;
#[cfg(all(feature = "wgpu", not(feature = "cuda")))]
type Backend = cubecl::wgpu::WgpuRuntime;
#[cfg(not(any(feature = "wgpu", feature = "cuda")))]
compile_error!("enable one runtime feature: `wgpu` or `cuda`");

fn main() -> ExitCode {
    let config = match GlobalConfig::init() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(2);
        }
    };

    env_logger::Builder::new()
        .filter_level(config.logger.level.to_filter())
        .init();

    gemm_usm::launch::<Backend>(&Default::default())
}
