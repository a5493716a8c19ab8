/*++

Licensed under the Apache-2.0 license.

File Name:

    sha.rs

Abstract:

    File contains the SHA engine of the CCP.

--*/

use super::descriptor::{CcpEngine, Descriptor};
use super::error::CcpError;
use super::mem_space::MemSpaceAdapter;
use bitfield::bitfield;
use ccp_emu_crypto::{Sha1, Sha256, Sha256Mode, Sha512, Sha512Mode};
use ccp_emu_types::emu_enum;

bitfield! {
    /// SHA engine function code
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct ShaFunction(u16);

    pub u16, rsvd1, set_rsvd1: 9, 0;
    pub u16, sha_type, set_sha_type: 13, 10;
    pub u16, rsvd2, set_rsvd2: 14, 14;
}

emu_enum!(
    /// Hash algorithm
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub ShaType;
    u16;
    {
        Sha1 = 1,
        Sha224 = 2,
        Sha256 = 3,
        Sha384 = 4,
        Sha512 = 5,
    };
    Invalid
);

impl ShaFunction {
    pub fn new(sha_type: ShaType) -> Self {
        let mut function = ShaFunction(0);
        function.set_sha_type(sha_type.into());
        function
    }
}

impl ShaType {
    fn block_size(&self) -> Option<u64> {
        match self {
            ShaType::Sha1 | ShaType::Sha224 | ShaType::Sha256 => Some(64),
            ShaType::Sha384 | ShaType::Sha512 => Some(128),
            ShaType::Invalid(_) => None,
        }
    }

    /// Size of the intermediate state kept in the scratch buffer
    fn state_size(&self) -> usize {
        match self {
            ShaType::Sha1 => Sha1::STATE_SIZE,
            ShaType::Sha224 | ShaType::Sha256 => Sha256::STATE_SIZE,
            _ => Sha512::STATE_SIZE,
        }
    }
}

/// Resumable hash engine for one descriptor
enum ShaEngine {
    Sha1(Sha1),
    Sha256(Sha256),
    Sha512(Sha512),
}

impl ShaEngine {
    fn new(sha_type: ShaType) -> Option<Self> {
        let engine = match sha_type {
            ShaType::Sha1 => ShaEngine::Sha1(Sha1::new()),
            ShaType::Sha224 => ShaEngine::Sha256(Sha256::new(Sha256Mode::Sha224)),
            ShaType::Sha256 => ShaEngine::Sha256(Sha256::new(Sha256Mode::Sha256)),
            ShaType::Sha384 => ShaEngine::Sha512(Sha512::new(Sha512Mode::Sha384)),
            ShaType::Sha512 => ShaEngine::Sha512(Sha512::new(Sha512Mode::Sha512)),
            ShaType::Invalid(_) => return None,
        };
        Some(engine)
    }

    /// Rebuild an engine from big-endian `state` after `blocks` blocks
    fn restore(sha_type: ShaType, state: &[u8], blocks: u64) -> Option<Self> {
        let engine = match sha_type {
            ShaType::Sha1 => ShaEngine::Sha1(Sha1::restore(state.try_into().ok()?, blocks)),
            ShaType::Sha224 => ShaEngine::Sha256(Sha256::restore(
                Sha256Mode::Sha224,
                state.try_into().ok()?,
                blocks,
            )),
            ShaType::Sha256 => ShaEngine::Sha256(Sha256::restore(
                Sha256Mode::Sha256,
                state.try_into().ok()?,
                blocks,
            )),
            ShaType::Sha384 => ShaEngine::Sha512(Sha512::restore(
                Sha512Mode::Sha384,
                state.try_into().ok()?,
                blocks,
            )),
            ShaType::Sha512 => ShaEngine::Sha512(Sha512::restore(
                Sha512Mode::Sha512,
                state.try_into().ok()?,
                blocks,
            )),
            ShaType::Invalid(_) => return None,
        };
        Some(engine)
    }

    fn update_blocks(&mut self, data: &[u8]) {
        match self {
            ShaEngine::Sha1(sha) => sha.update_blocks(data),
            ShaEngine::Sha256(sha) => sha.update_blocks(data),
            ShaEngine::Sha512(sha) => sha.update_blocks(data),
        }
    }

    fn finalize(&mut self, tail: &[u8]) {
        match self {
            ShaEngine::Sha1(sha) => sha.finalize(tail),
            ShaEngine::Sha256(sha) => sha.finalize(tail),
            ShaEngine::Sha512(sha) => sha.finalize(tail),
        }
    }

    fn state(&self) -> Vec<u8> {
        match self {
            ShaEngine::Sha1(sha) => sha.state().to_vec(),
            ShaEngine::Sha256(sha) => sha.state().to_vec(),
            ShaEngine::Sha512(sha) => sha.state().to_vec(),
        }
    }

    fn digest(&self) -> Vec<u8> {
        match self {
            ShaEngine::Sha1(sha) => sha.state().to_vec(),
            ShaEngine::Sha256(sha) => {
                let mut digest = vec![0u8; sha.hash_len()];
                sha.copy_hash(&mut digest);
                digest
            }
            ShaEngine::Sha512(sha) => {
                let mut digest = vec![0u8; sha.hash_len()];
                sha.copy_hash(&mut digest);
                digest
            }
        }
    }
}

pub(crate) fn execute(desc: &Descriptor, mem: &mut MemSpaceAdapter) -> Result<(), CcpError> {
    let function = ShaFunction(desc.function);
    let engine = CcpEngine::Sha;
    if function.rsvd1() != 0 || function.rsvd2() != 0 {
        Err(CcpError::FunctionReserved {
            engine,
            function: desc.function,
        })?
    }
    let sha_type = ShaType::from(function.sha_type());
    let block_size = sha_type.block_size().ok_or(CcpError::FunctionType {
        engine,
        function: desc.function,
    })?;

    let sha_len = desc.sha_len().ok_or(CcpError::Engine(desc.engine))?;
    if sha_len % 8 != 0 {
        Err(CcpError::Length(sha_len))?
    }
    let length = u64::from(desc.length);
    let prior = (sha_len / 8)
        .checked_sub(length)
        .ok_or(CcpError::Length(sha_len))?;

    // Streams can only be split on block boundaries
    if prior % block_size != 0 {
        Err(CcpError::Length(prior))?
    }
    if !desc.eom && length % block_size != 0 {
        Err(CcpError::Length(length))?
    }

    let mut sha = if prior == 0 {
        ShaEngine::new(sha_type)
    } else {
        let mut state = mem.read_context(desc.context_id, sha_type.state_size())?;
        state.reverse();
        ShaEngine::restore(sha_type, &state, prior / block_size)
    }
    .ok_or(CcpError::FunctionType {
        engine,
        function: desc.function,
    })?;

    let data = mem.read(desc.source.space, desc.source.addr, desc.length as usize)?;
    let mut result = if desc.eom {
        sha.finalize(&data);
        sha.digest()
    } else {
        sha.update_blocks(&data);
        sha.state()
    };

    // The scratch buffer holds state and digest byte reversed
    result.reverse();
    mem.write_context(desc.context_id, &result)
}
