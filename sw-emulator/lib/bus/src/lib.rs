/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the CCP Emulator Bus library.

--*/
mod bus;
mod ram;
pub mod testing;

pub use crate::bus::{Bus, BusError, GuestMemory, IrqLine};
pub use crate::ram::Ram;
