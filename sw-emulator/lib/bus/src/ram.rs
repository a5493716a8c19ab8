/*++

Licensed under the Apache-2.0 license.

File Name:

    ram.rs

Abstract:

    File contains implementation of RAM

--*/

use crate::{BusError, GuestMemory};
use ccp_emu_types::GuestAddr;

/// Random Access Memory Device
pub struct Ram {
    /// Backing storage
    data: Vec<u8>,
}

impl Ram {
    /// Create new RAM
    ///
    /// # Arguments
    ///
    /// * `data` - Data to be stored in the RAM
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Create new zero filled RAM of `len` bytes
    pub fn zeroed(len: usize) -> Self {
        Self::new(vec![0u8; len])
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Immutable reference to data
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable reference to data
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    fn range(&self, addr: GuestAddr, len: usize) -> Option<std::ops::Range<usize>> {
        let start = usize::try_from(addr).ok()?;
        let end = start.checked_add(len)?;
        (end <= self.data.len()).then_some(start..end)
    }
}

impl GuestMemory for Ram {
    fn read_bytes(&self, addr: GuestAddr, buf: &mut [u8]) -> Result<(), BusError> {
        let range = self
            .range(addr, buf.len())
            .ok_or(BusError::LoadAccessFault)?;
        buf.copy_from_slice(&self.data[range]);
        Ok(())
    }

    fn write_bytes(&mut self, addr: GuestAddr, data: &[u8]) -> Result<(), BusError> {
        let range = self
            .range(addr, data.len())
            .ok_or(BusError::StoreAccessFault)?;
        self.data[range].copy_from_slice(data);
        Ok(())
    }

    fn read_vec(&self, addr: GuestAddr, len: usize) -> Result<Vec<u8>, BusError> {
        let range = self.range(addr, len).ok_or(BusError::LoadAccessFault)?;
        Ok(self.data[range].to_vec())
    }
}
