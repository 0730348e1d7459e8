//! Explicit device allocations.
//!
//! Unlike [Buffer](crate::Buffer), a [DeviceAlloc] has no host mirror: data is copied in and out
//! explicitly, and the region is released with [DeviceAlloc::free].

use cubecl::prelude::*;
use cubecl::server::Handle;

use crate::kernel::copy_kernel;
use crate::{config::GlobalConfig, DeviceStorage, GemmError, Queue};

pub struct DeviceAlloc<R: Runtime> {
    queue: Queue<R>,
    handle: Handle,
    len: usize,
    released: bool,
}

impl<R: Runtime> DeviceAlloc<R> {
    /// Allocates `len` uninitialized elements.
    pub fn alloc(queue: &Queue<R>, len: usize) -> Result<Self, GemmError> {
        if len > u32::MAX as usize {
            return Err(GemmError::DimensionOverflow {
                name: "allocation",
                value: len,
            });
        }

        let handle = queue.allocate(len);
        log::debug!("Allocated device region of {len} elements");

        Ok(Self {
            queue: queue.clone(),
            handle,
            len,
            released: false,
        })
    }

    /// Allocates a region holding a copy of `data`.
    pub fn from_host(queue: &Queue<R>, data: &[f32]) -> Result<Self, GemmError> {
        let mut alloc = Self::alloc(queue, data.len())?;
        alloc.copy_from_host(data)?;
        Ok(alloc)
    }

    pub fn zeros(queue: &Queue<R>, len: usize) -> Result<Self, GemmError> {
        Self::from_host(queue, &vec![0.0; len])
    }

    /// Copies `data` into the region. `data` must have exactly [len](DeviceStorage::len) elements.
    ///
    /// The copy is ordered before any work submitted afterwards on the same queue.
    pub fn copy_from_host(&mut self, data: &[f32]) -> Result<(), GemmError> {
        if data.len() != self.len {
            return Err(GemmError::LengthMismatch {
                expected: self.len,
                actual: data.len(),
            });
        }
        if data.is_empty() {
            return Ok(());
        }

        let client = self.queue.client();
        let staging = client.create(f32::as_bytes(data));
        let units = GlobalConfig::get().launch.copy_cube_dim;
        let cubes = (self.len as u32).div_ceil(units);

        unsafe {
            copy_kernel::launch_unchecked::<f32, R>(
                client,
                CubeCount::Static(cubes, 1, 1),
                CubeDim::new(units, 1, 1),
                ArrayArg::from_raw_parts::<f32>(&staging, self.len, 1),
                ArrayArg::from_raw_parts::<f32>(&self.handle, self.len, 1),
            )
        };

        Ok(())
    }

    /// Blocking copy of the whole region to the host.
    pub fn to_host(&self) -> Vec<f32> {
        self.queue.read(&self.handle)
    }

    /// Releases the region.
    ///
    /// Taking `self` guarantees the region is released once and never read afterwards. Regions
    /// that are never freed explicitly are released when dropped.
    pub fn free(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.released {
            self.queue.release(self.len);
            self.released = true;
        }
    }
}

impl<R: Runtime> DeviceStorage for DeviceAlloc<R> {
    fn handle(&self) -> &Handle {
        &self.handle
    }

    fn len(&self) -> usize {
        self.len
    }
}

impl<R: Runtime> Drop for DeviceAlloc<R> {
    fn drop(&mut self) {
        if !self.released {
            log::warn!(
                "Device region of {} elements was not freed explicitly, releasing it on drop",
                self.len
            );
            self.release();
        }
    }
}
