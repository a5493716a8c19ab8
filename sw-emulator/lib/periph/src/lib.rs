/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the CCP Emulator Peripheral library.

--*/

mod ccp;

pub use ccp::{
    codes, AesFunction, AesMode, AesType, Ccp, CcpEngine, CcpError, CmdQueue, DescAddr,
    DescTarget, Descriptor, MemSpace, MemSpaceAdapter, PtBitwise, PtByteSwap, PtFunction,
    RsaFunction, ScratchBuffer, ShaFunction, ShaType, INFLATE_CHUNK_SIZE,
};
