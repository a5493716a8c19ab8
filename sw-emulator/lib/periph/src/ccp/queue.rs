/*++

Licensed under the Apache-2.0 license.

File Name:

    queue.rs

Abstract:

    File contains the register state and ring arithmetic of a CCP command
    queue.

--*/

use super::descriptor::Descriptor;
use super::error::CcpError;
use ccp_emu_types::{RegAddr, RegData};
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use tock_registers::register_bitfields;
use tock_registers::registers::InMemoryRegister;

register_bitfields! [
    u32,

    /// Queue Control Register Fields
    QueueControl [
        RUN OFFSET(0) NUMBITS(1) [],
        HALT OFFSET(1) NUMBITS(1) [],
        MEM_LOCATION OFFSET(2) NUMBITS(1) [],
        SIZE OFFSET(3) NUMBITS(5) [],
        PTR_HI OFFSET(16) NUMBITS(16) [],
    ],

    /// Queue Interrupt Enable/Status Fields
    QueueInterrupt [
        COMPLETION OFFSET(0) NUMBITS(1) [],
        ERROR OFFSET(1) NUMBITS(1) [],
    ],

    /// Queue Status Register Fields
    QueueStatus [
        ERROR_CODE OFFSET(0) NUMBITS(6) [],
    ],
];

/// Ring pointer increment
const DESC_SIZE: u32 = Descriptor::SIZE as u32;

/// CCP command queue
pub struct CmdQueue {
    /// Queue index
    id: usize,

    /// Control register
    control: InMemoryRegister<u32, QueueControl::Register>,

    /// Ring base, set whenever the head is written
    base: u32,

    head: u32,

    tail: u32,

    /// Interrupt enable register
    int_enable: InMemoryRegister<u32, QueueInterrupt::Register>,

    /// Interrupt status register
    int_status: InMemoryRegister<u32, QueueInterrupt::Register>,

    /// Status register
    status: InMemoryRegister<u32, QueueStatus::Register>,

    /// Unmasked cause of the last completion
    raw_int_status: InMemoryRegister<u32, QueueInterrupt::Register>,
}

impl CmdQueue {
    /// Register offsets within the queue window
    pub const CONTROL: RegAddr = 0x000;
    pub const TAIL: RegAddr = 0x004;
    pub const HEAD: RegAddr = 0x008;
    pub const INT_ENABLE: RegAddr = 0x00c;
    pub const INT_STATUS: RegAddr = 0x010;
    pub const STATUS: RegAddr = 0x100;
    pub const INT_STATUS_RAW: RegAddr = 0x104;
    pub const DMA_STATUS: RegAddr = 0x108;
    pub const DMA_READ_STATUS: RegAddr = 0x10c;
    pub const DMA_WRITE_STATUS: RegAddr = 0x110;

    /// Interrupt bits
    pub const INT_COMPLETION: u32 = 1 << 0;
    pub const INT_ERROR: u32 = 1 << 1;

    pub fn new(id: usize) -> Self {
        Self {
            id,
            control: InMemoryRegister::new(0),
            base: 0,
            head: 0,
            tail: 0,
            int_enable: InMemoryRegister::new(0),
            int_status: InMemoryRegister::new(0),
            status: InMemoryRegister::new(0),
            raw_int_status: InMemoryRegister::new(0),
        }
        .halted()
    }

    fn halted(self) -> Self {
        self.control.modify(QueueControl::HALT::SET);
        self
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn control(&self) -> u32 {
        self.control.get()
    }

    pub fn is_running(&self) -> bool {
        self.control.is_set(QueueControl::RUN)
    }

    pub fn is_halted(&self) -> bool {
        self.control.is_set(QueueControl::HALT)
    }

    pub fn base(&self) -> u32 {
        self.base
    }

    pub fn head(&self) -> u32 {
        self.head
    }

    pub fn tail(&self) -> u32 {
        self.tail
    }

    pub fn int_enable(&self) -> u32 {
        self.int_enable.get()
    }

    pub fn int_status(&self) -> u32 {
        self.int_status.get()
    }

    /// Hardware error code of the last descriptor, zero on success
    pub fn error_code(&self) -> u32 {
        self.status.read(QueueStatus::ERROR_CODE)
    }

    /// Number of descriptors in the ring
    pub fn ring_size(&self) -> u64 {
        2u64 << self.control.read(QueueControl::SIZE)
    }

    /// Read a register of the queue window. `None` for unimplemented offsets.
    pub fn read(&self, offset: RegAddr) -> Option<RegData> {
        let val = match offset {
            Self::CONTROL => self.control.get(),
            Self::TAIL => self.tail,
            Self::HEAD => self.head,
            Self::INT_ENABLE => self.int_enable.get(),
            Self::INT_STATUS => self.int_status.get(),
            Self::STATUS => self.status.get(),
            Self::INT_STATUS_RAW => self.raw_int_status.get(),
            Self::DMA_STATUS | Self::DMA_READ_STATUS | Self::DMA_WRITE_STATUS => 0,
            _ => return None,
        };
        Some(val)
    }

    /// Write the control register. HALT is status only and follows RUN.
    pub fn write_control(&mut self, val: RegData) {
        let control = InMemoryRegister::<u32, QueueControl::Register>::new(val);
        if control.is_set(QueueControl::RUN) {
            control.modify(QueueControl::HALT::CLEAR);
        } else {
            control.modify(QueueControl::HALT::SET);
        }
        self.control.set(control.get());
    }

    pub fn write_tail(&mut self, val: RegData) {
        self.tail = val;
    }

    /// Write the head pointer. The ring base moves with it.
    pub fn write_head(&mut self, val: RegData) {
        self.head = val;
        self.base = val;
    }

    pub fn write_int_enable(&mut self, val: RegData) {
        self.int_enable.set(val & (Self::INT_COMPLETION | Self::INT_ERROR));
    }

    /// Write 1 to clear interrupt status bits
    pub fn clear_int_status(&mut self, val: RegData) {
        self.int_status.set(self.int_status.get() & !val);
    }

    /// Stop the queue
    pub fn halt(&mut self) {
        self.control
            .modify(QueueControl::RUN::CLEAR + QueueControl::HALT::SET);
    }

    fn ring_index(&self, ptr: u32) -> Result<u64, CcpError> {
        let err = || CcpError::RingPointer {
            ptr,
            base: self.base,
        };
        let offset = ptr.checked_sub(self.base).ok_or_else(err)?;
        if ptr % DESC_SIZE != 0 || offset % DESC_SIZE != 0 {
            Err(err())?
        }
        let index = u64::from(offset / DESC_SIZE);
        if index > self.ring_size() {
            Err(err())?
        }
        Ok(index % self.ring_size())
    }

    /// Ring indices of head and tail, checking both pointers lie in the ring
    pub fn check_sanity(&self) -> Result<(u64, u64), CcpError> {
        Ok((self.ring_index(self.head)?, self.ring_index(self.tail)?))
    }

    /// Move the head past the descriptor it points at
    pub fn advance_head(&mut self) -> Result<(), CcpError> {
        let index = self.ring_index(self.head)?;
        let next = (index + 1) % self.ring_size();
        self.head = (u64::from(self.base) + next * u64::from(DESC_SIZE)) as u32;
        Ok(())
    }

    /// Record the outcome of a descriptor in the status registers.
    ///
    /// # Returns
    ///
    /// * `bool` - True if an enabled interrupt became pending
    pub fn complete(&mut self, result: &Result<(), CcpError>, ioc: bool) -> bool {
        let (code, cause) = match result {
            Ok(()) => (0, QueueInterrupt::COMPLETION::SET),
            Err(err) => (err.hw_code(), QueueInterrupt::ERROR::SET),
        };
        self.status.write(QueueStatus::ERROR_CODE.val(code));
        self.raw_int_status.write(cause);
        if !ioc {
            return false;
        }

        let pending = self.raw_int_status.get() & self.int_enable.get();
        self.int_status.set(self.int_status.get() | pending);
        pending != 0
    }

    /// Halt the queue and report `err` without raising an interrupt
    pub fn fail(&mut self, err: &CcpError) {
        self.status.write(QueueStatus::ERROR_CODE.val(err.hw_code()));
        self.raw_int_status.write(QueueInterrupt::ERROR::SET);
        self.halt();
    }

    /// Return every register to its power-on value
    pub fn reset(&mut self) {
        *self = Self::new(self.id);
    }
}
