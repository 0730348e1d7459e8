use core::marker::PhantomData;

use cubecl::prelude::*;

use crate::Queue;

/// Completion signal of work submitted to a [Queue].
///
/// The event mutably borrows the output of the operation it tracks, so that output can't be read
/// until the event is consumed by [Event::wait]. An event dropped without waiting blocks on
/// completion anyway.
#[must_use = "the output of the operation can't be read before the event is waited on"]
pub struct Event<'a, R: Runtime> {
    queue: Queue<R>,
    pending: bool,
    _output: PhantomData<&'a mut ()>,
}

impl<R: Runtime> Event<'_, R> {
    pub(crate) fn new(queue: Queue<R>) -> Self {
        Self {
            queue,
            pending: true,
            _output: PhantomData,
        }
    }

    /// Blocks until the tracked operation has completed.
    pub fn wait(mut self) {
        self.queue.wait();
        self.pending = false;
    }
}

impl<R: Runtime> Drop for Event<'_, R> {
    fn drop(&mut self) {
        if self.pending {
            log::warn!("Event dropped before being waited on, blocking until completion");
            self.queue.wait();
        }
    }
}
