/*++

Licensed under the Apache-2.0 license.

File Name:

    aes_modes.rs

Abstract:

    File contains the raw AES block cipher and the ECB, CBC, CFB and OFB
    chaining modes. The chaining value is exposed so callers can persist it
    between operations.

--*/

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::{Aes128, Aes192, Aes256};

pub const AES_BLOCK_SIZE: usize = 16;

/// AES chaining mode
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AesBlockMode {
    Ecb,
    Cbc,
    Cfb,
    Ofb,
}

impl AesBlockMode {
    /// Returns true if the mode consumes and produces a chaining value
    pub fn uses_iv(&self) -> bool {
        !matches!(self, AesBlockMode::Ecb)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AesDirection {
    Encrypt,
    Decrypt,
}

/// AES block cipher keyed with a 128, 192 or 256 bit key
pub enum AesCipher {
    Aes128(Aes128),
    Aes192(Aes192),
    Aes256(Aes256),
}

impl AesCipher {
    /// Create a cipher from a raw key. Returns `None` for unsupported key
    /// lengths.
    pub fn new(key: &[u8]) -> Option<Self> {
        let cipher = match key.len() {
            16 => AesCipher::Aes128(Aes128::new(GenericArray::from_slice(key))),
            24 => AesCipher::Aes192(Aes192::new(GenericArray::from_slice(key))),
            32 => AesCipher::Aes256(Aes256::new(GenericArray::from_slice(key))),
            _ => return None,
        };
        Some(cipher)
    }

    pub fn encrypt_block(&self, block: &mut [u8; AES_BLOCK_SIZE]) {
        let block = GenericArray::from_mut_slice(block);
        match self {
            AesCipher::Aes128(c) => c.encrypt_block(block),
            AesCipher::Aes192(c) => c.encrypt_block(block),
            AesCipher::Aes256(c) => c.encrypt_block(block),
        }
    }

    pub fn decrypt_block(&self, block: &mut [u8; AES_BLOCK_SIZE]) {
        let block = GenericArray::from_mut_slice(block);
        match self {
            AesCipher::Aes128(c) => c.decrypt_block(block),
            AesCipher::Aes192(c) => c.decrypt_block(block),
            AesCipher::Aes256(c) => c.decrypt_block(block),
        }
    }

    /// Transform `data` in place.
    ///
    /// `data` must be a whole number of blocks; a trailing partial block is
    /// left untouched. On return `iv` holds the chaining value the next
    /// operation in the same stream would start from: the last ciphertext
    /// block for CBC and CFB, the last keystream block for OFB. ECB ignores
    /// `iv`.
    pub fn crypt(
        &self,
        mode: AesBlockMode,
        direction: AesDirection,
        iv: &mut [u8; AES_BLOCK_SIZE],
        data: &mut [u8],
    ) {
        debug_assert_eq!(data.len() % AES_BLOCK_SIZE, 0);
        for chunk in data.chunks_exact_mut(AES_BLOCK_SIZE) {
            let Ok(block) = <&mut [u8; AES_BLOCK_SIZE]>::try_from(chunk) else {
                continue;
            };
            match (mode, direction) {
                (AesBlockMode::Ecb, AesDirection::Encrypt) => self.encrypt_block(block),
                (AesBlockMode::Ecb, AesDirection::Decrypt) => self.decrypt_block(block),
                (AesBlockMode::Cbc, AesDirection::Encrypt) => {
                    xor_in_place(block, iv);
                    self.encrypt_block(block);
                    *iv = *block;
                }
                (AesBlockMode::Cbc, AesDirection::Decrypt) => {
                    let ciphertext = *block;
                    self.decrypt_block(block);
                    xor_in_place(block, iv);
                    *iv = ciphertext;
                }
                (AesBlockMode::Cfb, direction) => {
                    let mut keystream = *iv;
                    self.encrypt_block(&mut keystream);
                    let input = *block;
                    xor_in_place(block, &keystream);
                    *iv = match direction {
                        AesDirection::Encrypt => *block,
                        AesDirection::Decrypt => input,
                    };
                }
                (AesBlockMode::Ofb, _) => {
                    self.encrypt_block(iv);
                    xor_in_place(block, iv);
                }
            }
        }
    }
}

fn xor_in_place(dest: &mut [u8; AES_BLOCK_SIZE], src: &[u8; AES_BLOCK_SIZE]) {
    dest.iter_mut().zip(src).for_each(|(d, s)| *d ^= s);
}
