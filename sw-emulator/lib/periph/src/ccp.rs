/*++

Licensed under the Apache-2.0 license.

File Name:

    ccp.rs

Abstract:

    File contains the AMD CCP v5 crypto co-processor device.

--*/

mod aes;
mod descriptor;
mod engine;
mod error;
mod mem_space;
mod passthrough;
mod queue;
mod rsa;
mod sha;
mod zlib;

pub use aes::{AesFunction, AesMode, AesType};
pub use descriptor::{CcpEngine, DescAddr, DescTarget, Descriptor, MemSpace};
pub use error::{codes, CcpError};
pub use mem_space::{MemSpaceAdapter, ScratchBuffer};
pub use passthrough::{PtBitwise, PtByteSwap, PtFunction};
pub use queue::CmdQueue;
pub use rsa::RsaFunction;
pub use sha::{ShaFunction, ShaType};
pub use zlib::INFLATE_CHUNK_SIZE;

use ccp_emu_bus::{Bus, BusError, GuestMemory, IrqLine};
use ccp_emu_types::{AccessSize, RegAddr, RegData};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, error, warn};

mod constants {
    #![allow(unused)]

    pub const QUEUE_MASK: u32 = 0x0000;
    pub const QUEUE_PRIO: u32 = 0x0004;
    pub const REQID_CONFIG: u32 = 0x0008;
    pub const TRNG_OUT: u32 = 0x000c;
    pub const SCRATCH: u32 = 0x0010;
    pub const LSB_PUBLIC_MASK_LO: u32 = 0x0018;
    pub const LSB_PUBLIC_MASK_HI: u32 = 0x001c;
    pub const LSB_PRIVATE_MASK_LO: u32 = 0x0020;
    pub const LSB_PRIVATE_MASK_HI: u32 = 0x0024;

    pub const QUEUE_WINDOW_START: u32 = 0x1000;
    pub const QUEUE_WINDOW_SIZE: u32 = 0x1000;
    pub const QUEUE_WINDOW_END: u32 = 0x5ffc;

    pub const MISC_START: u32 = 0x6000;
    pub const MISC_END: u32 = 0x6ffc;
    pub const CONFIG_0: u32 = 0x6000;
    pub const TRNG_CTL: u32 = 0x6008;
    pub const AES_MASK: u32 = 0x600c;
    pub const CLK_GATE_CTL: u32 = 0x603c;
    pub const ZLIB_MAX_SIZE: u32 = 0x6068;
    pub const ZLIB_SIZE: u32 = 0x606c;

    pub const LSB_MASK_VALUE: u32 = 0xffff_ffff;

    pub const QUEUE_COUNT: usize = 5;
}

/// AMD CCP v5 crypto co-processor
pub struct Ccp {
    /// Guest memory the queues and descriptors live in
    memory: Rc<RefCell<dyn GuestMemory>>,

    /// Interrupt line shared by all queues
    irq: Box<dyn IrqLine>,

    /// Current level of the interrupt line
    irq_level: bool,

    queues: [CmdQueue; constants::QUEUE_COUNT],

    /// Scratch buffer shared by all queues
    sb: ScratchBuffer,

    queue_priority: u32,

    /// Scratch register
    scratch: u32,

    /// Miscellaneous fixed-function registers
    misc: Vec<u32>,
}

impl Ccp {
    /// Number of command queues
    pub const MAX_QUEUES: usize = constants::QUEUE_COUNT;

    /// Scratch buffer size in bytes
    pub const SB_SIZE: usize = ScratchBuffer::SIZE;

    /// Scratch buffer context slot size in bytes
    pub const SB_SLOT_SIZE: usize = ScratchBuffer::SLOT_SIZE;

    /// Descriptor size in bytes
    pub const DESCRIPTOR_SIZE: usize = Descriptor::SIZE;

    /// Decompressed output chunk size
    pub const INFLATE_CHUNK_SIZE: usize = INFLATE_CHUNK_SIZE;

    /// Value of the queue mask register
    pub const QUEUE_MASK_VALUE: u32 = (1 << Self::MAX_QUEUES) - 1;

    /// Create a new CCP with every queue halted.
    ///
    /// # Arguments
    ///
    /// * `memory` - Guest memory holding descriptor rings and data buffers
    /// * `irq` - Interrupt line raised on descriptor completion
    pub fn new(memory: Rc<RefCell<dyn GuestMemory>>, irq: Box<dyn IrqLine>) -> Self {
        Self {
            memory,
            irq,
            irq_level: false,
            queues: std::array::from_fn(CmdQueue::new),
            sb: ScratchBuffer::new(),
            queue_priority: 0,
            scratch: 0,
            misc: vec![0; Self::misc_words()],
        }
    }

    fn misc_words() -> usize {
        ((constants::MISC_END - constants::MISC_START) / 4 + 1) as usize
    }

    /// Queue `idx`, if it exists
    pub fn queue(&self, idx: usize) -> Option<&CmdQueue> {
        self.queues.get(idx)
    }

    /// Shared scratch buffer
    pub fn sb(&self) -> &ScratchBuffer {
        &self.sb
    }

    /// Mutable access to the shared scratch buffer
    pub fn sb_mut(&mut self) -> &mut ScratchBuffer {
        &mut self.sb
    }

    /// Value of the queue priority register
    pub fn queue_priority(&self) -> u32 {
        self.queue_priority
    }

    /// Value of the clock gating control register
    pub fn clock_gate_control(&self) -> u32 {
        self.misc[((constants::CLK_GATE_CTL - constants::MISC_START) / 4) as usize]
    }

    /// Level of the interrupt line
    pub fn irq_asserted(&self) -> bool {
        self.irq_level
    }

    /// Run queue `idx` until it halts or its ring is empty
    fn drain(&mut self, idx: usize) -> Result<(), BusError> {
        if !self.queues[idx].is_running() {
            return Ok(());
        }
        debug!(queue = idx, "drain pass start");

        let mut executed = 0usize;
        while self.queues[idx].is_running() {
            let queue = &mut self.queues[idx];
            let (head, tail) = match queue.check_sanity() {
                Ok(indices) => indices,
                Err(err) => {
                    error!(queue = idx, %err, "queue halted");
                    queue.fail(&err);
                    Err(BusError::StoreAccessFault)?
                }
            };
            if head == tail {
                break;
            }

            let addr = queue.head();
            let mut raw = [0u8; Descriptor::SIZE];
            let fetched = self.memory.borrow().read_bytes(u64::from(addr), &mut raw);
            if let Err(err) = fetched {
                let err = CcpError::Memory {
                    addr: u64::from(addr),
                    err,
                };
                error!(queue = idx, %err, "descriptor fetch failed, queue halted");
                self.queues[idx].fail(&err);
                Err(BusError::StoreAccessFault)?
            }

            let desc = Descriptor::decode(&raw);
            let mut mem = MemSpaceAdapter::new(&self.memory, &mut self.sb);
            let result = engine::execute(&desc, &mut mem);
            if let Err(err) = &result {
                error!(
                    queue = idx,
                    engine = %desc.engine,
                    code = err.hw_code(),
                    %err,
                    "descriptor failed"
                );
            }
            executed += 1;

            let queue = &mut self.queues[idx];
            if let Err(err) = queue.advance_head() {
                queue.fail(&err);
                Err(BusError::StoreAccessFault)?
            }
            let raised = queue.complete(&result, desc.ioc);
            if desc.soc {
                queue.halt();
                debug!(queue = idx, head = queue.head(), "stop on completion");
            }
            if raised {
                self.set_irq(true);
            }
        }

        debug!(queue = idx, executed, "drain pass end");
        Ok(())
    }

    /// Drive the interrupt line, only on a level change
    fn set_irq(&mut self, level: bool) {
        if self.irq_level == level {
            return;
        }
        debug!(level, "interrupt line");
        self.irq_level = level;
        self.irq.set_level(level);
    }

    /// Drop the interrupt line once no queue has pending status
    fn update_irq(&mut self) {
        if self.irq_level && self.queues.iter().all(|queue| queue.int_status() == 0) {
            self.set_irq(false);
        }
    }

    fn queue_reg(addr: RegAddr) -> (usize, RegAddr) {
        let rel = addr - constants::QUEUE_WINDOW_START;
        (
            (rel / constants::QUEUE_WINDOW_SIZE) as usize,
            rel % constants::QUEUE_WINDOW_SIZE,
        )
    }

    fn misc_index(addr: RegAddr) -> usize {
        ((addr - constants::MISC_START) / 4) as usize
    }

    fn write_queue(&mut self, idx: usize, offset: RegAddr, val: RegData) -> Result<(), BusError> {
        let queue = &mut self.queues[idx];
        match offset {
            CmdQueue::CONTROL => {
                queue.write_control(val);
                if queue.is_running() {
                    debug!(queue = idx, ring_size = queue.ring_size(), "queue run");
                } else {
                    debug!(queue = idx, "queue halt");
                }
            }
            CmdQueue::TAIL => queue.write_tail(val),
            CmdQueue::HEAD => queue.write_head(val),
            CmdQueue::INT_ENABLE => {
                queue.write_int_enable(val);
                return Ok(());
            }
            CmdQueue::INT_STATUS => {
                queue.clear_int_status(val);
                self.update_irq();
                return Ok(());
            }
            _ => {
                warn!(queue = idx, offset, val, "write to unimplemented queue register ignored");
                return Ok(());
            }
        }
        self.drain(idx)
    }
}

impl Bus for Ccp {
    /// Read data of specified size from given register offset
    fn read(&mut self, size: AccessSize, addr: RegAddr) -> Result<RegData, BusError> {
        if size != AccessSize::Word {
            Err(BusError::LoadAccessFault)?
        }
        if addr % 4 != 0 {
            Err(BusError::LoadAddrMisaligned)?
        }

        let val = match addr {
            constants::QUEUE_MASK => Self::QUEUE_MASK_VALUE,
            constants::QUEUE_PRIO => self.queue_priority,
            constants::REQID_CONFIG | constants::TRNG_OUT => 0,
            constants::SCRATCH => self.scratch,
            constants::LSB_PUBLIC_MASK_LO..=constants::LSB_PRIVATE_MASK_HI => {
                constants::LSB_MASK_VALUE
            }
            constants::QUEUE_WINDOW_START..=constants::QUEUE_WINDOW_END => {
                let (idx, offset) = Self::queue_reg(addr);
                self.queues[idx].read(offset).unwrap_or_else(|| {
                    warn!(queue = idx, offset, "read from unimplemented queue register");
                    0
                })
            }
            constants::MISC_START..=constants::MISC_END => self.misc[Self::misc_index(addr)],
            _ => {
                warn!(addr, "read from unimplemented register");
                0
            }
        };
        Ok(val)
    }

    /// Write data of specified size to given register offset
    fn write(&mut self, size: AccessSize, addr: RegAddr, val: RegData) -> Result<(), BusError> {
        if size != AccessSize::Word {
            Err(BusError::StoreAccessFault)?
        }
        if addr % 4 != 0 {
            Err(BusError::StoreAddrMisaligned)?
        }

        match addr {
            constants::QUEUE_PRIO => self.queue_priority = val,
            constants::REQID_CONFIG => {
                if val != 0 {
                    warn!(val, "request id config must be zero, write ignored");
                }
            }
            constants::SCRATCH => self.scratch = val,
            constants::LSB_PUBLIC_MASK_LO..=constants::LSB_PRIVATE_MASK_HI => {}
            constants::QUEUE_WINDOW_START..=constants::QUEUE_WINDOW_END => {
                let (idx, offset) = Self::queue_reg(addr);
                self.write_queue(idx, offset, val)?;
            }
            constants::MISC_START..=constants::MISC_END => {
                let idx = Self::misc_index(addr);
                self.misc[idx] = val;
            }
            _ => warn!(addr, val, "write to unimplemented register ignored"),
        }
        Ok(())
    }

    fn warm_reset(&mut self) {
        self.queues.iter_mut().for_each(CmdQueue::reset);
        self.queue_priority = 0;
        self.scratch = 0;
        self.misc.fill(0);
        self.set_irq(false);
    }
}
