//! Scoped buffer ownership

use std::mem::ManuallyDrop;
use std::ops::Deref;

use super::{Buffer, Device};

/// A buffer destroyed when the guard goes out of scope.
///
/// The guard borrows its device, so the device cannot be dropped while the
/// buffer is alive.
pub struct UniqueBuffer<'d> {
    device: &'d Device,
    buffer: Buffer,
}

impl<'d> UniqueBuffer<'d> {
    pub fn new(device: &'d Device, bytes: &[u8]) -> Self {
        Self {
            device,
            buffer: device.create_buffer(bytes),
        }
    }

    /// Take ownership of an existing handle
    pub fn from_raw(device: &'d Device, buffer: Buffer) -> Self {
        Self { device, buffer }
    }

    pub fn handle(&self) -> Buffer {
        self.buffer
    }

    /// Give up ownership without destroying the buffer
    pub fn into_raw(self) -> Buffer {
        ManuallyDrop::new(self).buffer
    }
}

impl Deref for UniqueBuffer<'_> {
    type Target = Buffer;

    fn deref(&self) -> &Buffer {
        &self.buffer
    }
}

impl Drop for UniqueBuffer<'_> {
    fn drop(&mut self) {
        self.device.destroy_buffer(self.buffer);
    }
}

impl std::fmt::Debug for UniqueBuffer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("UniqueBuffer").field(&self.buffer).finish()
    }
}
