/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the CCP Emulator Types library.

--*/

mod macros;

/// Register data width
pub type RegData = u32;

/// Register window offset
pub type RegAddr = u32;

/// Guest address. Descriptors carry 48-bit addresses.
pub type GuestAddr = u64;

emu_enum!(
    /// Register access size
    #[derive(Debug, Eq, PartialEq, Copy, Clone)]
    pub AccessSize;
    usize;
    {
        Byte = 1,
        HalfWord = 2,
        Word = 4,
    };
    Invalid
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_size_round_trip() {
        assert_eq!(AccessSize::from(4usize), AccessSize::Word);
        assert_eq!(usize::from(AccessSize::HalfWord), 2);
        assert_eq!(AccessSize::from(3usize), AccessSize::Invalid(3));
        assert_eq!(usize::from(AccessSize::Invalid(3)), 3);
        assert_eq!(AccessSize::Byte.to_string(), "Byte");
        assert_eq!(AccessSize::Invalid(7).to_string(), "Invalid(0x7)");
    }
}
