//! Buffer handles and the arena that owns buffer storage

use super::DeviceError;

/// Opaque handle to a byte buffer owned by a [`Device`](super::Device).
///
/// A handle names one allocation on one device. Slots are reused after
/// destruction, but with a new generation, so a handle is never issued twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Buffer {
    device: u32,
    index: u32,
    generation: u32,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    data: Option<Vec<u8>>,
}

/// Growable table of byte buffers indexed by handle
#[derive(Debug)]
pub(crate) struct BufferArena {
    device: u32,
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl BufferArena {
    pub(crate) fn new(device: u32) -> Self {
        Self {
            device,
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub(crate) fn insert(&mut self, bytes: &[u8]) -> Buffer {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot::default());
                (self.slots.len() - 1) as u32
            }
        };

        let slot = &mut self.slots[index as usize];
        slot.data = Some(bytes.to_vec());

        Buffer {
            device: self.device,
            index,
            generation: slot.generation,
        }
    }

    pub(crate) fn remove(&mut self, handle: Buffer) -> Result<Vec<u8>, DeviceError> {
        self.check(handle)?;
        let slot = &mut self.slots[handle.index as usize];
        let data = slot.data.take().ok_or(DeviceError::StaleHandle(handle))?;

        // A slot whose generation would wrap is retired instead of recycled
        if let Some(next) = slot.generation.checked_add(1) {
            slot.generation = next;
            self.free.push(handle.index);
        }

        Ok(data)
    }

    pub(crate) fn get(&self, handle: Buffer) -> Result<&[u8], DeviceError> {
        self.check(handle)?;
        self.slots[handle.index as usize]
            .data
            .as_deref()
            .ok_or(DeviceError::StaleHandle(handle))
    }

    /// Live buffer count
    pub(crate) fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.data.is_some()).count()
    }

    fn check(&self, handle: Buffer) -> Result<(), DeviceError> {
        if handle.device != self.device {
            return Err(DeviceError::ForeignHandle(handle));
        }
        match self.slots.get(handle.index as usize) {
            Some(slot) if slot.generation == handle.generation => Ok(()),
            _ => Err(DeviceError::StaleHandle(handle)),
        }
    }
}
