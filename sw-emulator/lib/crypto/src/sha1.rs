/*++

Licensed under the Apache-2.0 license.

File Name:

    sha1.rs

Abstract:

    File contains implementation of Secure Hash Algorithm 1 (SHA-1) with an
    exportable and restorable intermediate state.

--*/

use crate::helpers::pad_message;
use ::sha1::digest::generic_array::GenericArray;

/// SHA-1
pub struct Sha1 {
    /// Hash
    hash: [u32; 5],

    /// Number of blocks compressed into `hash`
    blocks_processed: u64,
}

impl Default for Sha1 {
    fn default() -> Self {
        Self::new()
    }
}

impl Sha1 {
    pub const BLOCK_SIZE: usize = 64;

    pub const STATE_SIZE: usize = 20;

    const HASH_IV: [u32; 5] = [0x67452301, 0xefcdab89, 0x98badcfe, 0x10325476, 0xc3d2e1f0];

    pub fn new() -> Self {
        Self {
            hash: Self::HASH_IV,
            blocks_processed: 0,
        }
    }

    /// Resume a hash from a state previously returned by `state()`
    pub fn restore(state: &[u8; Self::STATE_SIZE], blocks_processed: u64) -> Self {
        let mut hash = [0u32; 5];
        for (word, bytes) in hash.iter_mut().zip(state.chunks_exact(4)) {
            *word = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        }
        Self {
            hash,
            blocks_processed,
        }
    }

    /// Compress every whole block of `data`
    pub fn update_blocks(&mut self, data: &[u8]) {
        for block in data.chunks_exact(Self::BLOCK_SIZE) {
            ::sha1::compress(&mut self.hash, &[*GenericArray::from_slice(block)]);
            self.blocks_processed += 1;
        }
    }

    /// Compress the final bytes of the message and apply padding
    pub fn finalize(&mut self, tail: &[u8]) {
        let whole = tail.len() - tail.len() % Self::BLOCK_SIZE;
        self.update_blocks(&tail[..whole]);
        let msg_len =
            u128::from(self.blocks_processed) * Self::BLOCK_SIZE as u128 + (tail.len() - whole) as u128;
        let padded = pad_message(&tail[whole..], msg_len, Self::BLOCK_SIZE, 8);
        self.update_blocks(&padded);
    }

    /// Intermediate state (and, once finalized, the digest) as big-endian words
    pub fn state(&self) -> [u8; Self::STATE_SIZE] {
        let mut state = [0u8; Self::STATE_SIZE];
        for (bytes, word) in state.chunks_exact_mut(4).zip(self.hash) {
            bytes.copy_from_slice(&word.to_be_bytes());
        }
        state
    }

    pub fn blocks_processed(&self) -> u64 {
        self.blocks_processed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha1_abc() {
        let mut sha = Sha1::new();
        sha.finalize(b"abc");
        assert_eq!(
            sha.state().to_vec(),
            hex::decode("a9993e364706816aba3e25717850c26c9cd0d89d").unwrap()
        );
    }

    #[test]
    fn test_sha1_two_block_padding() {
        let mut sha = Sha1::new();
        sha.finalize(b"abcdbcdecdefdefgefghfghighijhijkijkljklmklmnlmnomnopnopq");
        assert_eq!(
            sha.state().to_vec(),
            hex::decode("84983e441c3bd26ebaae4aa1f95129e5e54670f1").unwrap()
        );
    }

    #[test]
    fn test_sha1_restore() {
        let msg = [0x5au8; 130];
        let mut one_shot = Sha1::new();
        one_shot.finalize(&msg);

        let mut first = Sha1::new();
        first.update_blocks(&msg[..64]);
        let mut second = Sha1::restore(&first.state(), first.blocks_processed());
        second.finalize(&msg[64..]);
        assert_eq!(second.state(), one_shot.state());
    }
}
