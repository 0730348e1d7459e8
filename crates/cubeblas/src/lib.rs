//! BLAS-style GEMM on CubeCL runtimes.
//!
//! Operands can live in managed [buffers](Buffer), which mirror a host container and synchronize it
//! implicitly, or in explicit [device allocations](DeviceAlloc), which are copied to and from the
//! host by hand and complete through an [Event].

#[macro_use]
extern crate derive_new;

mod buffer;
mod error;
mod event;
mod gemm;
mod kernel;
mod queue;
mod storage;
mod usm;

pub mod config;
pub mod matrix;
pub mod scenario;
pub mod verify;

pub use buffer::*;
pub use error::*;
pub use event::*;
pub use gemm::*;
pub use queue::*;
pub use storage::*;
pub use usm::*;

#[cfg(feature = "export_tests")]
pub mod tests;
