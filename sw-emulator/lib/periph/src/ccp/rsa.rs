/*++

Licensed under the Apache-2.0 license.

File Name:

    rsa.rs

Abstract:

    File contains the RSA engine of the CCP.

--*/

use super::descriptor::{CcpEngine, Descriptor};
use super::error::CcpError;
use super::mem_space::MemSpaceAdapter;
use bitfield::bitfield;
use ccp_emu_crypto::rsa_mod_exp_le;

bitfield! {
    /// RSA engine function code
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct RsaFunction(u16);

    pub u16, mode, set_mode: 2, 0;
    /// Modulus size in bytes
    pub u16, size, set_size: 14, 3;
}

impl RsaFunction {
    /// Largest supported modulus (RSA-4096)
    pub const MAX_SIZE: u16 = 512;

    pub fn new(size: u16) -> Self {
        let mut function = RsaFunction(0);
        function.set_size(size);
        function
    }
}

pub(crate) fn execute(desc: &Descriptor, mem: &mut MemSpaceAdapter) -> Result<(), CcpError> {
    let function = RsaFunction(desc.function);
    let engine = CcpEngine::Rsa;
    if function.mode() != 0 {
        Err(CcpError::FunctionMode {
            engine,
            function: desc.function,
        })?
    }
    let size = function.size();
    if size == 0 || size > RsaFunction::MAX_SIZE {
        Err(CcpError::FunctionSize {
            engine,
            function: desc.function,
        })?
    }
    let size = usize::from(size);
    if desc.length as usize != 2 * size {
        Err(CcpError::Length(u64::from(desc.length)))?
    }
    let dest = desc.dest().ok_or(CcpError::Engine(desc.engine))?;

    // Source holds the modulus followed by the message
    let src = mem.read(desc.source.space, desc.source.addr, 2 * size)?;
    let (modulus, message) = src.split_at(size);
    let exponent = mem.read(desc.key.space, desc.key.addr, size)?;

    let result = rsa_mod_exp_le(message, &exponent, modulus).ok_or(CcpError::ZeroModulus)?;
    mem.write(dest.space, dest.addr, &result)
}
