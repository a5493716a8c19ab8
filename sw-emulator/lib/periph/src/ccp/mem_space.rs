/*++

Licensed under the Apache-2.0 license.

File Name:

    mem_space.rs

Abstract:

    File contains the scratch buffer and the adapter resolving descriptor
    addresses to guest memory or the scratch buffer.

--*/

use super::descriptor::MemSpace;
use super::error::CcpError;
use ccp_emu_bus::GuestMemory;
use ccp_emu_types::GuestAddr;
use std::cell::RefCell;
use std::rc::Rc;

const SB_SIZE: usize = 4096;

/// On-device scratch buffer (LSB) shared by all queues
pub struct ScratchBuffer {
    data: Box<[u8; SB_SIZE]>,
}

impl ScratchBuffer {
    /// Size of the scratch buffer in bytes
    pub const SIZE: usize = SB_SIZE;

    /// Size of one context slot
    pub const SLOT_SIZE: usize = 32;

    /// Number of context slots
    pub const SLOTS: usize = Self::SIZE / Self::SLOT_SIZE;

    pub fn new() -> Self {
        Self {
            data: Box::new([0u8; Self::SIZE]),
        }
    }

    pub fn data(&self) -> &[u8; Self::SIZE] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8; Self::SIZE] {
        &mut self.data
    }

    fn range(offset: u64, len: usize) -> Result<std::ops::Range<usize>, CcpError> {
        let err = CcpError::SbRange { offset, len };
        let start = usize::try_from(offset).map_err(|_| err.clone())?;
        match start.checked_add(len) {
            Some(end) if end <= Self::SIZE => Ok(start..end),
            _ => Err(err),
        }
    }

    /// Copy `buf.len()` bytes starting at `offset` into `buf`
    pub fn read(&self, offset: u64, buf: &mut [u8]) -> Result<(), CcpError> {
        let range = Self::range(offset, buf.len())?;
        buf.copy_from_slice(&self.data[range]);
        Ok(())
    }

    /// Copy `len` bytes starting at `offset` into a new buffer
    pub fn read_vec(&self, offset: u64, len: usize) -> Result<Vec<u8>, CcpError> {
        let range = Self::range(offset, len)?;
        Ok(self.data[range].to_vec())
    }

    /// Store `data` starting at `offset`
    pub fn write(&mut self, offset: u64, data: &[u8]) -> Result<(), CcpError> {
        let range = Self::range(offset, data.len())?;
        self.data[range].copy_from_slice(data);
        Ok(())
    }

    /// Byte offset of the slot selected by `context_id`, checked for an access
    /// of `len` bytes. Accesses larger than a slot continue into the
    /// following slots.
    pub fn context_offset(context_id: u8, len: usize) -> Result<u64, CcpError> {
        let ctx = usize::from(context_id);
        if ctx >= Self::SLOTS || ctx * Self::SLOT_SIZE + len > Self::SIZE {
            Err(CcpError::ContextId(context_id))?
        }
        Ok((ctx * Self::SLOT_SIZE) as u64)
    }
}

impl Default for ScratchBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves (memory space, address) pairs for the operation handlers
pub struct MemSpaceAdapter<'a> {
    memory: &'a Rc<RefCell<dyn GuestMemory>>,
    sb: &'a mut ScratchBuffer,
}

impl<'a> MemSpaceAdapter<'a> {
    pub fn new(memory: &'a Rc<RefCell<dyn GuestMemory>>, sb: &'a mut ScratchBuffer) -> Self {
        Self { memory, sb }
    }

    /// Read `len` bytes at `addr` in `space`
    pub fn read(&self, space: MemSpace, addr: GuestAddr, len: usize) -> Result<Vec<u8>, CcpError> {
        match space {
            MemSpace::System | MemSpace::Local => self
                .memory
                .borrow()
                .read_vec(addr, len)
                .map_err(|err| CcpError::Memory { addr, err }),
            MemSpace::ScratchBuffer => self.sb.read_vec(addr, len),
            MemSpace::Invalid(_) => Err(CcpError::MemType(space)),
        }
    }

    /// Write `data` at `addr` in `space`
    pub fn write(&mut self, space: MemSpace, addr: GuestAddr, data: &[u8]) -> Result<(), CcpError> {
        match space {
            MemSpace::System | MemSpace::Local => self
                .memory
                .borrow_mut()
                .write_bytes(addr, data)
                .map_err(|err| CcpError::Memory { addr, err }),
            MemSpace::ScratchBuffer => self.sb.write(addr, data),
            MemSpace::Invalid(_) => Err(CcpError::MemType(space)),
        }
    }

    /// Read `len` bytes from the scratch buffer slot `context_id`
    pub fn read_context(&self, context_id: u8, len: usize) -> Result<Vec<u8>, CcpError> {
        let offset = ScratchBuffer::context_offset(context_id, len)?;
        self.read(MemSpace::ScratchBuffer, offset, len)
    }

    /// Write `data` to the scratch buffer slot `context_id`
    pub fn write_context(&mut self, context_id: u8, data: &[u8]) -> Result<(), CcpError> {
        let offset = ScratchBuffer::context_offset(context_id, data.len())?;
        self.write(MemSpace::ScratchBuffer, offset, data)
    }
}
