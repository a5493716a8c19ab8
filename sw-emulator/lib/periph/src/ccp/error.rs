/*++

Licensed under the Apache-2.0 license.

File Name:

    error.rs

Abstract:

    File contains the errors a CCP descriptor can fail with, and their
    hardware status codes.

--*/

use super::descriptor::{CcpEngine, MemSpace};
use ccp_emu_bus::BusError;
use thiserror::Error;

/// Hardware error codes reported in the queue status register
pub mod codes {
    pub const SUCCESS: u32 = 0x00;
    pub const ILLEGAL_ENGINE: u32 = 0x01;
    pub const ILLEGAL_FUNCTION_TYPE: u32 = 0x03;
    pub const ILLEGAL_FUNCTION_MODE: u32 = 0x04;
    pub const ILLEGAL_FUNCTION_SIZE: u32 = 0x06;
    pub const ZLIB_MISSING_INIT_EOM: u32 = 0x07;
    pub const ILLEGAL_FUNCTION_RSVD: u32 = 0x08;
    pub const ILLEGAL_BUFFER_LENGTH: u32 = 0x09;
    pub const VLSB_FAULT: u32 = 0x0a;
    pub const ILLEGAL_MEM_ADDR: u32 = 0x0b;
    pub const ILLEGAL_MEM_SEL: u32 = 0x0c;
    pub const ILLEGAL_CONTEXT_ID: u32 = 0x0d;
    pub const ZLIB_DATA_ERROR: u32 = 0x27;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CcpError {
    #[error("protected descriptors are not supported")]
    Protected,

    #[error("reserved descriptor bits are set")]
    ReservedBits,

    #[error("fixed address streaming is not supported")]
    FixedAddress,

    #[error("engine {0} is not supported")]
    Engine(CcpEngine),

    #[error("memory type {0} is not valid")]
    MemType(MemSpace),

    #[error("function {function:#06x} selects an unsupported type for engine {engine}")]
    FunctionType { engine: CcpEngine, function: u16 },

    #[error("function {function:#06x} selects an unsupported mode for engine {engine}")]
    FunctionMode { engine: CcpEngine, function: u16 },

    #[error("function {function:#06x} has an invalid size for engine {engine}")]
    FunctionSize { engine: CcpEngine, function: u16 },

    #[error("function {function:#06x} has reserved bits set for engine {engine}")]
    FunctionReserved { engine: CcpEngine, function: u16 },

    #[error("control flags {flags:#x} are not valid for engine {engine}")]
    Flags { engine: CcpEngine, flags: u32 },

    #[error("length {0:#x} is not valid for this operation")]
    Length(u64),

    #[error("context id {0} is out of range")]
    ContextId(u8),

    #[error("scratch buffer access at {offset:#x} of {len:#x} bytes is out of range")]
    SbRange { offset: u64, len: usize },

    #[error("guest memory access at {addr:#x} failed: {err}")]
    Memory { addr: u64, err: BusError },

    #[error("RSA modulus is zero")]
    ZeroModulus,

    #[error("inflate failed: {0}")]
    Inflate(String),

    #[error("ring pointer {ptr:#010x} is not valid for base {base:#010x}")]
    RingPointer { ptr: u32, base: u32 },
}

impl CcpError {
    /// Error code the hardware reports for this failure
    pub fn hw_code(&self) -> u32 {
        match self {
            CcpError::Engine(_) => codes::ILLEGAL_ENGINE,
            CcpError::FunctionType { .. } => codes::ILLEGAL_FUNCTION_TYPE,
            CcpError::FunctionMode { .. } => codes::ILLEGAL_FUNCTION_MODE,
            CcpError::FunctionSize { .. } | CcpError::ZeroModulus => codes::ILLEGAL_FUNCTION_SIZE,
            CcpError::Flags { .. } => codes::ZLIB_MISSING_INIT_EOM,
            CcpError::Protected | CcpError::ReservedBits | CcpError::FunctionReserved { .. } => {
                codes::ILLEGAL_FUNCTION_RSVD
            }
            CcpError::Length(_) => codes::ILLEGAL_BUFFER_LENGTH,
            CcpError::SbRange { .. } => codes::VLSB_FAULT,
            CcpError::FixedAddress | CcpError::Memory { .. } | CcpError::RingPointer { .. } => {
                codes::ILLEGAL_MEM_ADDR
            }
            CcpError::MemType(_) => codes::ILLEGAL_MEM_SEL,
            CcpError::ContextId(_) => codes::ILLEGAL_CONTEXT_ID,
            CcpError::Inflate(_) => codes::ZLIB_DATA_ERROR,
        }
    }
}
