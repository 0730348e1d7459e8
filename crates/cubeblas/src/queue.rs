use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cubecl::prelude::*;
use cubecl::server::Handle;

/// Execution context bound to one device.
///
/// Clones share the same compute client and allocation ledger.
pub struct Queue<R: Runtime> {
    client: ComputeClient<R::Server, R::Channel>,
    device: R::Device,
    ledger: Arc<AllocationLedger>,
}

impl<R: Runtime> Clone for Queue<R> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            device: self.device.clone(),
            ledger: self.ledger.clone(),
        }
    }
}

impl<R: Runtime> Queue<R> {
    pub fn new(device: &R::Device) -> Self {
        let client = R::client(device);
        log::debug!("Created queue on {device:?} with runtime {}", R::name(&client));

        Self {
            client,
            device: device.clone(),
            ledger: Arc::new(AllocationLedger::default()),
        }
    }

    pub fn client(&self) -> &ComputeClient<R::Server, R::Channel> {
        &self.client
    }

    /// Human readable name of the runtime and device backing this queue.
    pub fn device_name(&self) -> String {
        format!("{} ({:?})", R::name(&self.client), self.device)
    }

    /// Blocks until all work submitted to this queue has completed.
    pub fn wait(&self) {
        cubecl_common::future::block_on(self.client.sync());
    }

    pub fn allocation_stats(&self) -> AllocationStats {
        self.ledger.stats()
    }

    /// Number of blocking device-to-host reads issued so far.
    pub fn read_count(&self) -> usize {
        self.ledger.reads.load(Ordering::Relaxed)
    }

    pub(crate) fn upload(&self, data: &[f32]) -> Handle {
        self.ledger.record_allocation();
        self.client.create(f32::as_bytes(data))
    }

    pub(crate) fn allocate(&self, len: usize) -> Handle {
        self.ledger.record_allocation();
        self.client.empty(len * core::mem::size_of::<f32>())
    }

    pub(crate) fn release(&self, len: usize) {
        self.ledger.record_release();
        log::trace!("Released device region of {len} elements");
    }

    /// Blocking read of a whole device region.
    pub(crate) fn read(&self, handle: &Handle) -> Vec<f32> {
        self.ledger.reads.fetch_add(1, Ordering::Relaxed);
        let bytes = self.client.read_one(handle.clone().binding());
        f32::from_bytes(&bytes).to_vec()
    }
}

/// Snapshot of the device regions acquired through a [Queue].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocationStats {
    pub allocated: usize,
    pub released: usize,
}

impl AllocationStats {
    /// Regions acquired and not yet released.
    pub fn live(&self) -> usize {
        self.allocated.saturating_sub(self.released)
    }
}

#[derive(Default, Debug)]
struct AllocationLedger {
    allocated: AtomicUsize,
    released: AtomicUsize,
    reads: AtomicUsize,
}

impl AllocationLedger {
    fn record_allocation(&self) {
        self.allocated.fetch_add(1, Ordering::Relaxed);
    }

    fn record_release(&self) {
        self.released.fetch_add(1, Ordering::Relaxed);
    }

    fn stats(&self) -> AllocationStats {
        AllocationStats {
            allocated: self.allocated.load(Ordering::Relaxed),
            released: self.released.load(Ordering::Relaxed),
        }
    }
}
