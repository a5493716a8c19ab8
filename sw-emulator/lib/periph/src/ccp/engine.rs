/*++

Licensed under the Apache-2.0 license.

File Name:

    engine.rs

Abstract:

    File contains descriptor dispatch to the CCP engines.

--*/

use super::descriptor::{CcpEngine, Descriptor};
use super::error::CcpError;
use super::mem_space::MemSpaceAdapter;
use super::{aes, passthrough, rsa, sha, zlib};
use tracing::trace;

impl CcpEngine {
    /// Run `desc` on this engine
    pub(crate) fn dispatch(
        &self,
        desc: &Descriptor,
        mem: &mut MemSpaceAdapter,
    ) -> Result<(), CcpError> {
        match self {
            CcpEngine::Aes => aes::execute(desc, mem),
            CcpEngine::Sha => sha::execute(desc, mem),
            CcpEngine::Rsa => rsa::execute(desc, mem),
            CcpEngine::Passthrough => passthrough::execute(desc, mem),
            CcpEngine::ZlibDecompress => zlib::execute(desc, mem),
            CcpEngine::XtsAes | CcpEngine::Des3 | CcpEngine::Ecc | CcpEngine::Invalid(_) => {
                Err(CcpError::Engine(*self))
            }
        }
    }
}

/// Validate and execute a single descriptor
pub(crate) fn execute(desc: &Descriptor, mem: &mut MemSpaceAdapter) -> Result<(), CcpError> {
    trace!(
        engine = %desc.engine,
        function = desc.function,
        length = desc.length,
        src = desc.source.addr,
        ctx = desc.context_id,
        "executing descriptor"
    );
    desc.validate()?;
    desc.engine.dispatch(desc, mem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ccp::descriptor::{DescAddr, DescTarget, MemSpace};
    use crate::ccp::mem_space::ScratchBuffer;
    use crate::ccp::passthrough::{PtByteSwap, PtFunction};
    use ccp_emu_bus::{GuestMemory, Ram};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_unsupported_engines() {
        let memory: Rc<RefCell<dyn GuestMemory>> = Rc::new(RefCell::new(Ram::zeroed(0x100)));
        let mut sb = ScratchBuffer::new();
        let mut mem = MemSpaceAdapter::new(&memory, &mut sb);

        for engine in [
            CcpEngine::XtsAes,
            CcpEngine::Des3,
            CcpEngine::Ecc,
            CcpEngine::Invalid(0xc),
        ] {
            let desc = Descriptor::new(engine);
            assert_eq!(execute(&desc, &mut mem), Err(CcpError::Engine(engine)));
        }
    }

    #[test]
    fn test_validation_precedes_dispatch() {
        let memory: Rc<RefCell<dyn GuestMemory>> = Rc::new(RefCell::new(Ram::zeroed(0x100)));
        memory.borrow_mut().write_bytes(0, &[0xa5; 16]).unwrap();
        let mut sb = ScratchBuffer::new();
        let mut mem = MemSpaceAdapter::new(&memory, &mut sb);

        let mut desc = Descriptor::new(CcpEngine::Passthrough);
        desc.function = PtFunction::new(PtByteSwap::Noop).0;
        desc.eom = true;
        desc.length = 16;
        desc.target = DescTarget::Dest(DescAddr::new(MemSpace::System, 0x80));
        desc.prot = true;
        assert_eq!(execute(&desc, &mut mem), Err(CcpError::Protected));
        assert_eq!(mem.read(MemSpace::System, 0x80, 16).unwrap(), vec![0; 16]);

        desc.prot = false;
        desc.target = DescTarget::Dest(DescAddr {
            addr: 0x80,
            space: MemSpace::System,
            fixed: true,
        });
        assert_eq!(execute(&desc, &mut mem), Err(CcpError::FixedAddress));

        desc.target = DescTarget::Dest(DescAddr::new(MemSpace::System, 0x80));
        assert_eq!(execute(&desc, &mut mem), Ok(()));
        assert_eq!(mem.read(MemSpace::System, 0x80, 16).unwrap(), vec![0xa5; 16]);
    }
}
