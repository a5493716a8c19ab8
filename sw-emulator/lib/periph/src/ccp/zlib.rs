/*++

Licensed under the Apache-2.0 license.

File Name:

    zlib.rs

Abstract:

    File contains the zlib decompression engine of the CCP.

--*/

use super::descriptor::{CcpEngine, Descriptor};
use super::error::CcpError;
use super::mem_space::MemSpaceAdapter;
use ccp_emu_crypto::{inflate_raw, InflateError};

/// Output is streamed to the destination in chunks of this size
pub const INFLATE_CHUNK_SIZE: usize = 4096;

pub(crate) fn execute(desc: &Descriptor, mem: &mut MemSpaceAdapter) -> Result<(), CcpError> {
    let engine = CcpEngine::ZlibDecompress;

    // Single shot only
    if !(desc.soc && desc.init && desc.eom) || desc.ioc {
        Err(CcpError::Flags {
            engine,
            flags: desc.control_flags(),
        })?
    }
    if desc.function != 0 {
        Err(CcpError::FunctionReserved {
            engine,
            function: desc.function,
        })?
    }
    let dest = desc.dest().ok_or(CcpError::Engine(desc.engine))?;

    let input = mem.read(desc.source.space, desc.source.addr, desc.length as usize)?;
    let mut addr = dest.addr;
    inflate_raw(&input, INFLATE_CHUNK_SIZE, |chunk| {
        mem.write(dest.space, addr, chunk)?;
        addr += chunk.len() as u64;
        Ok(())
    })
    .map_err(|err| match err {
        InflateError::Sink(err) => err,
        err @ InflateError::Corrupt(_) | err @ InflateError::Truncated => {
            CcpError::Inflate(err.to_string())
        }
    })?;
    Ok(())
}
