/*++

Licensed under the Apache-2.0 license.

File Name:

    bus.rs

Abstract:

    File contains the traits connecting a device model to its surroundings:
    the register bus it is decoded on, the guest memory it masters, and the
    interrupt line it drives.

--*/

use ccp_emu_types::{AccessSize, GuestAddr, RegAddr, RegData};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BusError {
    /// Load address misaligned exception
    LoadAddrMisaligned,

    /// Load access fault exception
    LoadAccessFault,

    /// Store address misaligned exception
    StoreAddrMisaligned,

    /// Store access fault exception
    StoreAccessFault,
}

impl std::fmt::Display for BusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BusError::LoadAddrMisaligned => write!(f, "load address misaligned"),
            BusError::LoadAccessFault => write!(f, "load access fault"),
            BusError::StoreAddrMisaligned => write!(f, "store address misaligned"),
            BusError::StoreAccessFault => write!(f, "store access fault"),
        }
    }
}

impl std::error::Error for BusError {}

/// Represents an abstract register bus. Used by firmware to read and write
/// device registers.
pub trait Bus {
    /// Read data of specified size from given register offset
    ///
    /// # Arguments
    ///
    /// * `size` - Size of the read
    /// * `addr` - Offset to read from
    ///
    /// # Error
    ///
    /// * `BusError` - Exception with cause `BusError::LoadAccessFault` or `BusError::LoadAddrMisaligned`
    fn read(&mut self, size: AccessSize, addr: RegAddr) -> Result<RegData, BusError>;

    /// Write data of specified size to given register offset
    ///
    /// # Arguments
    ///
    /// * `size` - Size of the write
    /// * `addr` - Offset to write
    /// * `val` - Data to write
    ///
    /// # Error
    ///
    /// * `BusError` - Exception with cause `BusError::StoreAccessFault` or `BusError::StoreAddrMisaligned`
    fn write(&mut self, size: AccessSize, addr: RegAddr, val: RegData) -> Result<(), BusError>;

    fn warm_reset(&mut self) {
        // By default, do nothing
    }
}

/// Byte addressable guest memory, as seen by a bus-mastering device.
///
/// There are no alignment constraints; implementations fault when any byte
/// of the requested range is not backed.
pub trait GuestMemory {
    /// Fill `buf` with the bytes starting at `addr`
    fn read_bytes(&self, addr: GuestAddr, buf: &mut [u8]) -> Result<(), BusError>;

    /// Store `data` starting at `addr`
    fn write_bytes(&mut self, addr: GuestAddr, data: &[u8]) -> Result<(), BusError>;

    /// Read `len` bytes starting at `addr` into a new buffer.
    ///
    /// Implementations backed by a known range should reject the access
    /// before allocating, since `len` comes straight from the guest.
    fn read_vec(&self, addr: GuestAddr, len: usize) -> Result<Vec<u8>, BusError> {
        let mut buf = vec![0u8; len];
        self.read_bytes(addr, &mut buf)?;
        Ok(buf)
    }
}

/// Interrupt line driven by a device.
pub trait IrqLine {
    /// Set the level of the interrupt line. `true` asserts the interrupt.
    fn set_level(&self, is_high: bool);
}
