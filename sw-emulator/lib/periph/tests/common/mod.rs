// Licensed under the Apache-2.0 license

#![allow(dead_code)]

use ccp_emu_bus::testing::FakeIrq;
use ccp_emu_bus::{Bus, GuestMemory, Ram};
use ccp_emu_periph::{Ccp, CmdQueue, DescAddr, DescTarget, Descriptor, MemSpace};
use ccp_emu_types::{AccessSize, RegAddr, RegData};
use std::cell::RefCell;
use std::rc::Rc;

pub const RAM_SIZE: usize = 0x40000;

/// Ring of eight descriptors
pub const RING_SIZE_CODE: u32 = 2;

pub struct Fixture {
    pub ccp: Ccp,
    pub ram: Rc<RefCell<Ram>>,
    pub irq: FakeIrq,
}

impl Fixture {
    pub fn new() -> Self {
        let ram = Rc::new(RefCell::new(Ram::zeroed(RAM_SIZE)));
        let irq = FakeIrq::new();
        let ccp = Ccp::new(ram.clone(), Box::new(irq.clone()));
        Self { ccp, ram, irq }
    }

    pub fn queue_reg(queue: usize, offset: RegAddr) -> RegAddr {
        0x1000 + queue as RegAddr * 0x1000 + offset
    }

    pub fn write_reg(&mut self, addr: RegAddr, val: RegData) {
        self.ccp.write(AccessSize::Word, addr, val).unwrap();
    }

    pub fn read_reg(&mut self, addr: RegAddr) -> RegData {
        self.ccp.read(AccessSize::Word, addr).unwrap()
    }

    pub fn write_mem(&self, addr: u64, data: &[u8]) {
        self.ram.borrow_mut().write_bytes(addr, data).unwrap();
    }

    pub fn read_mem(&self, addr: u64, len: usize) -> Vec<u8> {
        let mut buf = vec![0u8; len];
        self.ram.borrow().read_bytes(addr, &mut buf).unwrap();
        buf
    }

    /// Place `descs` in consecutive ring slots starting at `base`
    pub fn write_ring(&self, base: u32, descs: &[Descriptor]) {
        for (slot, desc) in descs.iter().enumerate() {
            self.write_mem(u64::from(base) + (slot * Descriptor::SIZE) as u64, &desc.encode());
        }
    }

    /// Queue `count` descriptors at `base`, then start the queue
    pub fn submit(&mut self, queue: usize, base: u32, count: u32) {
        self.write_reg(
            Self::queue_reg(queue, CmdQueue::TAIL),
            base + count * Descriptor::SIZE as u32,
        );
        self.write_reg(Self::queue_reg(queue, CmdQueue::HEAD), base);
        self.write_reg(
            Self::queue_reg(queue, CmdQueue::CONTROL),
            1 | (RING_SIZE_CODE << 3),
        );
    }

    pub fn queue(&self, queue: usize) -> &CmdQueue {
        self.ccp.queue(queue).unwrap()
    }
}

/// Passthrough copy of `len` bytes in system memory
pub fn copy(src: u64, dst: u64, len: u32) -> Descriptor {
    let mut desc = Descriptor::new(ccp_emu_periph::CcpEngine::Passthrough);
    desc.eom = true;
    desc.length = len;
    desc.source = DescAddr::new(MemSpace::System, src);
    desc.target = DescTarget::Dest(DescAddr::new(MemSpace::System, dst));
    desc
}
