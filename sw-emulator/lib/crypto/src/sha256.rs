/*++

Licensed under the Apache-2.0 license.

File Name:

    sha256.rs

Abstract:

    File contains implementation of Secure Hash 256 Algorithm (SHA-256) with
    an exportable and restorable intermediate state.

--*/

use crate::helpers::pad_message;
use sha2::digest::generic_array::GenericArray;

/// SHA-256 Mode
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Sha256Mode {
    Sha224,
    Sha256,
}

/// SHA-256
pub struct Sha256 {
    /// Hash
    hash: [u32; 8],

    /// SHA 256 Mode
    mode: Sha256Mode,

    /// Number of blocks compressed into `hash`
    blocks_processed: u64,
}

impl Sha256 {
    /// SHA-256 Block Size
    pub const BLOCK_SIZE: usize = 64;

    /// Size of the intermediate state
    pub const STATE_SIZE: usize = 32;

    /// SHA-256-224 Initial Hash Vectors
    #[cfg_attr(rustfmt, rustfmt_skip)]
    const HASH_IV_224: [u32; 8] = [
        0xc1059ed8, 0x367cd507, 0x3070dd17, 0xf70e5939,
        0xffc00b31, 0x68581511, 0x64f98fa7, 0xbefa4fa4,
    ];

    /// SHA-256-256 Initial Hash Vectors
    #[cfg_attr(rustfmt, rustfmt_skip)]
    const HASH_IV_256 : [u32; 8] = [
        0x6a09e667, 0xbb67ae85, 0x3c6ef372, 0xa54ff53a,
        0x510e527f, 0x9b05688c, 0x1f83d9ab, 0x5be0cd19,
    ];

    /// Create a new instance of Secure Hash Algorithm object
    ///
    /// # Arguments
    ///
    /// * `mode` - Mode of the SHA Operation
    pub fn new(mode: Sha256Mode) -> Self {
        Self {
            hash: Self::hash_iv(mode),
            mode,
            blocks_processed: 0,
        }
    }

    /// Resume a hash from a state previously returned by `state()`
    ///
    /// # Arguments
    ///
    /// * `mode` - Mode of the SHA Operation
    /// * `state` - Big-endian state words
    /// * `blocks_processed` - Number of blocks already compressed into `state`
    pub fn restore(mode: Sha256Mode, state: &[u8; Self::STATE_SIZE], blocks_processed: u64) -> Self {
        let mut hash = [0u32; 8];
        for (word, bytes) in hash.iter_mut().zip(state.chunks_exact(4)) {
            *word = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        }
        Self {
            hash,
            mode,
            blocks_processed,
        }
    }

    /// Compress every whole block of `data`. Trailing bytes that do not fill
    /// a block are ignored.
    pub fn update_blocks(&mut self, data: &[u8]) {
        for block in data.chunks_exact(Self::BLOCK_SIZE) {
            sha2::compress256(&mut self.hash, &[*GenericArray::from_slice(block)]);
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

    /// Intermediate state as big-endian words
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

    /// Retrieve the hash
    ///
    /// # Arguments
    ///
    /// * `hash` - Hash to copy
    pub fn copy_hash(&self, hash: &mut [u8]) {
        self.state()
            .into_iter()
            .take(self.hash_len())
            .zip(hash)
            .for_each(|(src, dest)| *dest = src);
    }

    /// Get the length of the hash
    pub fn hash_len(&self) -> usize {
        match self.mode {
            Sha256Mode::Sha224 => 28,
            Sha256Mode::Sha256 => 32,
        }
    }

    /// Retrieve the hash initialization vector for specified SHA mode
    fn hash_iv(mode: Sha256Mode) -> [u32; 8] {
        match mode {
            Sha256Mode::Sha224 => Self::HASH_IV_224,
            Sha256Mode::Sha256 => Self::HASH_IV_256,
        }
    }
}
