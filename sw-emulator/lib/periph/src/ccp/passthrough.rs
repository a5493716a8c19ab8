/*++

Licensed under the Apache-2.0 license.

File Name:

    passthrough.rs

Abstract:

    File contains the passthrough (copy) engine of the CCP.

--*/

use super::descriptor::{CcpEngine, Descriptor};
use super::error::CcpError;
use super::mem_space::MemSpaceAdapter;
use bitfield::bitfield;
use ccp_emu_types::emu_enum;

bitfield! {
    /// Passthrough engine function code
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct PtFunction(u16);

    pub u16, byteswap, set_byteswap: 1, 0;
    pub u16, bitwise, set_bitwise: 4, 2;
    pub u16, reflect, set_reflect: 6, 5;
    pub u16, rsvd, set_rsvd: 14, 7;
}

emu_enum!(
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub PtByteSwap;
    u16;
    {
        Noop = 0,
        Bits32 = 1,
        Bits256 = 2,
    };
    Invalid
);

emu_enum!(
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub PtBitwise;
    u16;
    {
        Noop = 0,
        And = 1,
        Or = 2,
        Xor = 3,
        Mask = 4,
    };
    Invalid
);

impl PtFunction {
    pub fn new(byteswap: PtByteSwap) -> Self {
        let mut function = PtFunction(0);
        function.set_byteswap(byteswap.into());
        function
    }
}

const SWAP_CHUNK: usize = 32;

pub(crate) fn execute(desc: &Descriptor, mem: &mut MemSpaceAdapter) -> Result<(), CcpError> {
    let function = PtFunction(desc.function);
    let engine = CcpEngine::Passthrough;
    if !desc.eom {
        Err(CcpError::Flags {
            engine,
            flags: desc.control_flags(),
        })?
    }
    if function.rsvd() != 0 {
        Err(CcpError::FunctionReserved {
            engine,
            function: desc.function,
        })?
    }
    if PtBitwise::from(function.bitwise()) != PtBitwise::Noop || function.reflect() != 0 {
        Err(CcpError::FunctionMode {
            engine,
            function: desc.function,
        })?
    }
    let swap = match PtByteSwap::from(function.byteswap()) {
        PtByteSwap::Noop => false,
        PtByteSwap::Bits256 => true,
        _ => Err(CcpError::FunctionType {
            engine,
            function: desc.function,
        })?,
    };
    if swap && desc.length as usize % SWAP_CHUNK != 0 {
        Err(CcpError::Length(u64::from(desc.length)))?
    }
    let dest = desc.dest().ok_or(CcpError::Engine(desc.engine))?;

    let mut data = mem.read(desc.source.space, desc.source.addr, desc.length as usize)?;
    if swap {
        data.chunks_exact_mut(SWAP_CHUNK).for_each(|chunk| chunk.reverse());
    }
    mem.write(dest.space, dest.addr, &data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ccp::descriptor::{DescAddr, DescTarget, MemSpace};
    use crate::ccp::mem_space::ScratchBuffer;
    use ccp_emu_bus::{GuestMemory, Ram};
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn copy_desc(function: PtFunction, src: DescAddr, dst: DescAddr, length: u32) -> Descriptor {
        let mut desc = Descriptor::new(CcpEngine::Passthrough);
        desc.function = function.0;
        desc.eom = true;
        desc.length = length;
        desc.source = src;
        desc.target = DescTarget::Dest(dst);
        desc
    }

    fn setup() -> (Rc<RefCell<dyn GuestMemory>>, ScratchBuffer) {
        (
            Rc::new(RefCell::new(Ram::zeroed(0x200))),
            ScratchBuffer::new(),
        )
    }

    #[test]
    fn test_copy_to_scratch_buffer() {
        let (memory, mut sb) = setup();
        let data: Vec<u8> = (0..48u8).collect();
        memory.borrow_mut().write_bytes(0x10, &data).unwrap();

        let desc = copy_desc(
            PtFunction::new(PtByteSwap::Noop),
            DescAddr::new(MemSpace::System, 0x10),
            DescAddr::new(MemSpace::ScratchBuffer, 0x60),
            48,
        );
        let mut mem = MemSpaceAdapter::new(&memory, &mut sb);
        execute(&desc, &mut mem).unwrap();
        assert_eq!(sb.data()[0x60..0x90], data[..]);
    }

    #[test]
    fn test_byteswap_256() {
        let (memory, mut sb) = setup();
        let data: Vec<u8> = (0..64u8).collect();
        memory.borrow_mut().write_bytes(0, &data).unwrap();

        let desc = copy_desc(
            PtFunction::new(PtByteSwap::Bits256),
            DescAddr::new(MemSpace::System, 0),
            DescAddr::new(MemSpace::Local, 0x100),
            64,
        );
        let mut mem = MemSpaceAdapter::new(&memory, &mut sb);
        execute(&desc, &mut mem).unwrap();
        let out = mem.read(MemSpace::System, 0x100, 64).unwrap();
        let expected: Vec<u8> = (0..32u8).rev().chain((32..64u8).rev()).collect();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_invalid() {
        let (memory, mut sb) = setup();
        let mut mem = MemSpaceAdapter::new(&memory, &mut sb);
        let src = DescAddr::new(MemSpace::System, 0);
        let dst = DescAddr::new(MemSpace::System, 0x100);

        let mut desc = copy_desc(PtFunction::new(PtByteSwap::Noop), src, dst, 16);
        desc.eom = false;
        assert!(matches!(
            execute(&desc, &mut mem),
            Err(CcpError::Flags { .. })
        ));

        let desc = copy_desc(PtFunction::new(PtByteSwap::Bits256), src, dst, 33);
        assert_eq!(execute(&desc, &mut mem), Err(CcpError::Length(33)));

        let desc = copy_desc(PtFunction::new(PtByteSwap::Bits32), src, dst, 32);
        assert!(matches!(
            execute(&desc, &mut mem),
            Err(CcpError::FunctionType { .. })
        ));

        let mut function = PtFunction::new(PtByteSwap::Noop);
        function.set_bitwise(PtBitwise::Xor.into());
        let desc = copy_desc(function, src, dst, 32);
        assert!(matches!(
            execute(&desc, &mut mem),
            Err(CcpError::FunctionMode { .. })
        ));

        let mut function = PtFunction::new(PtByteSwap::Noop);
        function.set_reflect(1);
        let desc = copy_desc(function, src, dst, 32);
        assert!(matches!(
            execute(&desc, &mut mem),
            Err(CcpError::FunctionMode { .. })
        ));

        let mut function = PtFunction::new(PtByteSwap::Noop);
        function.set_rsvd(1);
        let desc = copy_desc(function, src, dst, 32);
        assert!(matches!(
            execute(&desc, &mut mem),
            Err(CcpError::FunctionReserved { .. })
        ));
    }

    proptest! {
        #[test]
        fn test_double_byteswap_is_identity(block in prop::array::uniform32(any::<u8>())) {
            let (memory, mut sb) = setup();
            memory.borrow_mut().write_bytes(0, &block).unwrap();
            let function = PtFunction::new(PtByteSwap::Bits256);
            let mut mem = MemSpaceAdapter::new(&memory, &mut sb);

            let first = copy_desc(
                function,
                DescAddr::new(MemSpace::System, 0),
                DescAddr::new(MemSpace::ScratchBuffer, 0),
                32,
            );
            execute(&first, &mut mem).unwrap();
            let second = copy_desc(
                function,
                DescAddr::new(MemSpace::ScratchBuffer, 0),
                DescAddr::new(MemSpace::System, 0x40),
                32,
            );
            execute(&second, &mut mem).unwrap();

            prop_assert_eq!(mem.read(MemSpace::System, 0x40, 32).unwrap(), block.to_vec());
        }
    }
}
