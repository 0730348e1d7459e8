//! Managed buffers: host containers mirrored on the device.
//!
//! A [Buffer] borrows its host container for its whole lifetime. Results written on the device are
//! copied back lazily, either when host access is requested or when the buffer is dropped.

use core::ops::Deref;

use cubecl::prelude::*;
use cubecl::server::Handle;

use crate::{DeviceStorage, GemmError, Queue};

pub struct Buffer<'a, R: Runtime> {
    queue: Queue<R>,
    host: &'a mut [f32],
    handle: Handle,
    device_dirty: bool,
}

impl<'a, R: Runtime> Buffer<'a, R> {
    /// Wraps `host`, uploading its current contents.
    pub fn new(queue: &Queue<R>, host: &'a mut [f32]) -> Result<Self, GemmError> {
        if host.len() > u32::MAX as usize {
            return Err(GemmError::DimensionOverflow {
                name: "buffer",
                value: host.len(),
            });
        }

        let handle = queue.upload(host);
        log::debug!("Created managed buffer of {} elements", host.len());

        Ok(Self {
            queue: queue.clone(),
            host,
            handle,
            device_dirty: false,
        })
    }

    /// Read access from the host.
    ///
    /// Blocks until pending device writes have completed and are visible in the host container.
    pub fn host_access(&mut self) -> HostAccessor<'_> {
        self.synchronize();
        HostAccessor { data: &*self.host }
    }

    pub(crate) fn mark_device_written(&mut self) {
        self.device_dirty = true;
    }

    fn synchronize(&mut self) {
        if !self.device_dirty {
            return;
        }

        let data = self.queue.read(&self.handle);
        for (host, device) in self.host.iter_mut().zip(data) {
            *host = device;
        }
        self.device_dirty = false;
    }
}

impl<R: Runtime> DeviceStorage for Buffer<'_, R> {
    fn handle(&self) -> &Handle {
        &self.handle
    }

    fn len(&self) -> usize {
        self.host.len()
    }
}

impl<R: Runtime> Drop for Buffer<'_, R> {
    fn drop(&mut self) {
        self.synchronize();
        self.queue.release(self.host.len());
    }
}

/// Read-only view of a [Buffer] on the host.
pub struct HostAccessor<'b> {
    data: &'b [f32],
}

impl Deref for HostAccessor<'_> {
    type Target = [f32];

    fn deref(&self) -> &Self::Target {
        self.data
    }
}
