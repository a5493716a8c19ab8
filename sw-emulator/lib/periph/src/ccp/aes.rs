/*++

Licensed under the Apache-2.0 license.

File Name:

    aes.rs

Abstract:

    File contains the AES engine of the CCP.

--*/

use super::descriptor::{CcpEngine, Descriptor};
use super::error::CcpError;
use super::mem_space::MemSpaceAdapter;
use bitfield::bitfield;
use ccp_emu_crypto::{AesBlockMode, AesCipher, AesDirection, AES_BLOCK_SIZE};
use ccp_emu_types::emu_enum;

bitfield! {
    /// AES engine function code
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct AesFunction(u16);

    /// Partial block size in bits, CFB only
    pub u16, size, set_size: 6, 0;
    pub encrypt, set_encrypt: 7;
    pub u16, mode, set_mode: 12, 8;
    pub u16, aes_type, set_aes_type: 14, 13;
}

emu_enum!(
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub AesMode;
    u16;
    {
        Ecb = 0,
        Cbc = 1,
        Ofb = 2,
        Cfb = 3,
        Ctr = 4,
        Cmac = 5,
        Ghash = 6,
        Gctr = 7,
        Gcm = 8,
        Gmac = 9,
    };
    Invalid
);

emu_enum!(
    /// AES key size
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub AesType;
    u16;
    {
        Aes128 = 0,
        Aes192 = 1,
        Aes256 = 2,
    };
    Invalid
);

impl AesType {
    fn key_len(&self) -> Option<usize> {
        match self {
            AesType::Aes128 => Some(16),
            AesType::Aes192 => Some(24),
            AesType::Aes256 => Some(32),
            AesType::Invalid(_) => None,
        }
    }
}

impl AesFunction {
    pub fn new(mode: AesMode, aes_type: AesType, encrypt: bool) -> Self {
        let mut function = AesFunction(0);
        function.set_mode(mode.into());
        function.set_aes_type(aes_type.into());
        function.set_encrypt(encrypt);
        function
    }
}

pub(crate) fn execute(desc: &Descriptor, mem: &mut MemSpaceAdapter) -> Result<(), CcpError> {
    let function = AesFunction(desc.function);
    let engine = CcpEngine::Aes;

    let mode = match AesMode::from(function.mode()) {
        AesMode::Ecb => AesBlockMode::Ecb,
        AesMode::Cbc => AesBlockMode::Cbc,
        AesMode::Ofb => AesBlockMode::Ofb,
        AesMode::Cfb => AesBlockMode::Cfb,
        _ => Err(CcpError::FunctionMode {
            engine,
            function: desc.function,
        })?,
    };
    let key_len = AesType::from(function.aes_type())
        .key_len()
        .ok_or(CcpError::FunctionType {
            engine,
            function: desc.function,
        })?;
    if function.size() != 0 {
        Err(CcpError::FunctionSize {
            engine,
            function: desc.function,
        })?
    }
    if desc.length as usize % AES_BLOCK_SIZE != 0 {
        Err(CcpError::Length(u64::from(desc.length)))?
    }
    let dest = desc.dest().ok_or(CcpError::Engine(desc.engine))?;
    let direction = if function.encrypt() {
        AesDirection::Encrypt
    } else {
        AesDirection::Decrypt
    };

    // Keys are stored byte reversed
    let mut key = mem.read(desc.key.space, desc.key.addr, key_len)?;
    key.reverse();
    let cipher = AesCipher::new(&key).ok_or(CcpError::FunctionType {
        engine,
        function: desc.function,
    })?;

    let mut iv = [0u8; AES_BLOCK_SIZE];
    if mode.uses_iv() {
        let slot = mem.read_context(desc.context_id, AES_BLOCK_SIZE)?;
        iv.copy_from_slice(&slot);
        iv.reverse();
    }

    let mut data = mem.read(desc.source.space, desc.source.addr, desc.length as usize)?;
    cipher.crypt(mode, direction, &mut iv, &mut data);
    mem.write(dest.space, dest.addr, &data)?;

    if mode.uses_iv() {
        iv.reverse();
        mem.write_context(desc.context_id, &iv)?;
    }
    Ok(())
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

    const KEY_ADDR: u64 = 0x000;
    const SRC_ADDR: u64 = 0x100;
    const DST_ADDR: u64 = 0x200;
    const CTX: u8 = 3;

    // SP 800-38A F.2.1
    const KEY: &str = "2b7e151628aed2a6abf7158809cf4f3c";
    const IV: &str = "000102030405060708090a0b0c0d0e0f";
    const PLAINTEXT: &str = "6bc1bee22e409f96e93d7e117393172aae2d8a571e03ac9c9eb76fac45af8e51";
    const CBC_CIPHERTEXT: &str = "7649abac8119b246cee98e9b12e9197d5086cb9b507219ee95db113a917678b2";

    fn vectors() -> (Vec<u8>, Vec<u8>, Vec<u8>, Vec<u8>) {
        (
            hex::decode(KEY).unwrap(),
            hex::decode(IV).unwrap(),
            hex::decode(PLAINTEXT).unwrap(),
            hex::decode(CBC_CIPHERTEXT).unwrap(),
        )
    }

    struct Harness {
        memory: Rc<RefCell<dyn GuestMemory>>,
        sb: ScratchBuffer,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                memory: Rc::new(RefCell::new(Ram::zeroed(0x1000))),
                sb: ScratchBuffer::new(),
            }
        }

        fn load(&mut self, key: &[u8], iv: &[u8]) {
            let mut key = key.to_vec();
            key.reverse();
            let mut iv = iv.to_vec();
            iv.reverse();
            self.memory.borrow_mut().write_bytes(KEY_ADDR, &key).unwrap();
            self.sb.write(u64::from(CTX) * 32, &iv).unwrap();
        }

        fn run(&mut self, function: AesFunction, input: &[u8]) -> Result<Vec<u8>, CcpError> {
            self.memory
                .borrow_mut()
                .write_bytes(SRC_ADDR, input)
                .unwrap();
            let mut desc = Descriptor::new(CcpEngine::Aes);
            desc.function = function.0;
            desc.length = input.len() as u32;
            desc.source = DescAddr::new(MemSpace::System, SRC_ADDR);
            desc.target = DescTarget::Dest(DescAddr::new(MemSpace::System, DST_ADDR));
            desc.key = DescAddr::new(MemSpace::System, KEY_ADDR);
            desc.context_id = CTX;

            let mut mem = MemSpaceAdapter::new(&self.memory, &mut self.sb);
            execute(&desc, &mut mem)?;
            mem.read(MemSpace::System, DST_ADDR, input.len())
        }

        fn iv(&self) -> Vec<u8> {
            let mut iv = vec![0u8; 16];
            self.sb.read(u64::from(CTX) * 32, &mut iv).unwrap();
            iv.reverse();
            iv
        }
    }

    #[test]
    fn test_cbc_reversed_key_and_iv() {
        let (key, iv, plaintext, expected) = vectors();
        let mut h = Harness::new();
        h.load(&key, &iv);
        let ciphertext = h
            .run(AesFunction::new(AesMode::Cbc, AesType::Aes128, true), &plaintext)
            .unwrap();
        assert_eq!(ciphertext, expected);
        assert_eq!(h.iv(), expected[16..]);
    }

    #[test]
    fn test_cbc_unreversed_key_mismatch() {
        let (key, iv, plaintext, expected) = vectors();
        let mut h = Harness::new();
        h.memory.borrow_mut().write_bytes(KEY_ADDR, &key).unwrap();
        h.sb.write(u64::from(CTX) * 32, &iv).unwrap();
        let ciphertext = h
            .run(AesFunction::new(AesMode::Cbc, AesType::Aes128, true), &plaintext)
            .unwrap();
        assert_ne!(ciphertext, expected);
    }

    #[test]
    fn test_cbc_streaming_across_descriptors() {
        let (key, iv, plaintext, expected) = vectors();
        let mut h = Harness::new();
        h.load(&key, &iv);
        let function = AesFunction::new(AesMode::Cbc, AesType::Aes128, true);
        let first = h.run(function, &plaintext[..16]).unwrap();
        let second = h.run(function, &plaintext[16..]).unwrap();
        assert_eq!([first, second].concat(), expected);
    }

    // SP 800-38A F.3.13 and F.4.1, first two blocks
    const CFB_CIPHERTEXT: &str = "3b3fd92eb72dad20333449f8e83cfb4ac8a64537a0b3a93fcde3cdad9f1ce58b";
    const OFB_CIPHERTEXT: &str = "3b3fd92eb72dad20333449f8e83cfb4a7789508d16918f03f53c52dac54ed825";

    /// Run `input` as two single-block descriptors chained through the
    /// context slot, returning the output and the context left behind.
    fn run_split(mode: AesMode, encrypt: bool, input: &[u8]) -> (Vec<u8>, Vec<u8>) {
        let (key, iv, _, _) = vectors();
        let mut h = Harness::new();
        h.load(&key, &iv);
        let function = AesFunction::new(mode, AesType::Aes128, encrypt);
        let first = h.run(function, &input[..16]).unwrap();
        let second = h.run(function, &input[16..]).unwrap();
        ([first, second].concat(), h.iv())
    }

    #[test]
    fn test_cfb_streaming_across_descriptors() {
        let (_, _, plaintext, _) = vectors();
        let expected = hex::decode(CFB_CIPHERTEXT).unwrap();

        let (ciphertext, ctx) = run_split(AesMode::Cfb, true, &plaintext);
        assert_eq!(ciphertext, expected);
        assert_eq!(ctx, expected[16..]);

        let (decrypted, ctx) = run_split(AesMode::Cfb, false, &expected);
        assert_eq!(decrypted, plaintext);
        assert_eq!(ctx, expected[16..]);
    }

    #[test]
    fn test_ofb_streaming_across_descriptors() {
        let (_, _, plaintext, _) = vectors();
        let expected = hex::decode(OFB_CIPHERTEXT).unwrap();
        let keystream: Vec<u8> = plaintext[16..]
            .iter()
            .zip(&expected[16..])
            .map(|(p, c)| p ^ c)
            .collect();

        let (ciphertext, ctx) = run_split(AesMode::Ofb, true, &plaintext);
        assert_eq!(ciphertext, expected);
        assert_eq!(ctx, keystream);

        let (decrypted, ctx) = run_split(AesMode::Ofb, false, &expected);
        assert_eq!(decrypted, plaintext);
        assert_eq!(ctx, keystream);
    }

    #[test]
    fn test_cbc_decrypt_streaming_across_descriptors() {
        let (_, _, plaintext, expected) = vectors();
        let (decrypted, ctx) = run_split(AesMode::Cbc, false, &expected);
        assert_eq!(decrypted, plaintext);
        assert_eq!(ctx, expected[16..]);
    }

    #[test]
    fn test_ecb_leaves_context() {
        let (key, iv, plaintext, _) = vectors();
        let mut h = Harness::new();
        h.load(&key, &iv);
        let ciphertext = h
            .run(AesFunction::new(AesMode::Ecb, AesType::Aes128, true), &plaintext[..16])
            .unwrap();
        // SP 800-38A F.1.1
        assert_eq!(hex::encode(ciphertext), "3ad77bb40d7a3660a89ecaf32466ef97");
        assert_eq!(h.iv(), iv);
    }

    #[test]
    fn test_unsupported_function() {
        let (key, iv, plaintext, _) = vectors();
        let mut h = Harness::new();
        h.load(&key, &iv);

        let function = AesFunction::new(AesMode::Gcm, AesType::Aes128, true);
        assert_eq!(
            h.run(function, &plaintext),
            Err(CcpError::FunctionMode {
                engine: CcpEngine::Aes,
                function: function.0
            })
        );

        let function = AesFunction::new(AesMode::Cbc, AesType::Invalid(3), true);
        assert_eq!(
            h.run(function, &plaintext),
            Err(CcpError::FunctionType {
                engine: CcpEngine::Aes,
                function: function.0
            })
        );

        let mut function = AesFunction::new(AesMode::Cfb, AesType::Aes128, true);
        function.set_size(8);
        assert!(matches!(
            h.run(function, &plaintext),
            Err(CcpError::FunctionSize { .. })
        ));

        let function = AesFunction::new(AesMode::Cbc, AesType::Aes128, true);
        assert_eq!(h.run(function, &plaintext[..15]), Err(CcpError::Length(15)));
    }

    proptest! {
        #[test]
        fn test_round_trip(
            mode in prop::sample::select(vec![AesMode::Ecb, AesMode::Cbc, AesMode::Cfb, AesMode::Ofb]),
            aes_type in prop::sample::select(vec![AesType::Aes128, AesType::Aes192, AesType::Aes256]),
            key in prop::array::uniform32(any::<u8>()),
            iv in prop::array::uniform16(any::<u8>()),
            blocks in 0usize..6,
            seed in any::<u8>(),
        ) {
            let plaintext: Vec<u8> = (0..blocks * 16).map(|i| (i as u8).wrapping_mul(seed)).collect();
            let mut h = Harness::new();

            h.load(&key, &iv);
            let ciphertext = h.run(AesFunction::new(mode, aes_type, true), &plaintext).unwrap();

            h.load(&key, &iv);
            let decrypted = h.run(AesFunction::new(mode, aes_type, false), &ciphertext).unwrap();
            prop_assert_eq!(decrypted, plaintext);
        }
    }
}
