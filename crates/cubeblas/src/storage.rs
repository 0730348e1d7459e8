use cubecl::server::Handle;

/// Device memory an operation can read or write.
pub trait DeviceStorage {
    /// Handle of the device region.
    fn handle(&self) -> &Handle;

    /// Number of `f32` elements in the region.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
