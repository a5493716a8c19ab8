/*++

Licensed under the Apache-2.0 license.

File Name:

    sha512.rs

Abstract:

    File contains implementation of Secure Hash 512 Algorithm (SHA-512) with
    an exportable and restorable intermediate state.

--*/

use crate::helpers::pad_message;
use sha2::digest::generic_array::GenericArray;

/// SHA-512 Mode
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Sha512Mode {
    Sha384,
    Sha512,
}

/// SHA-512
pub struct Sha512 {
    /// Hash
    hash: [u64; 8],

    /// SHA 512 Mode
    mode: Sha512Mode,

    /// Number of full blocks processed to create hash
    blocks_processed: u64,
}

impl Sha512 {
    /// SHA-512 Block Size
    pub const BLOCK_SIZE: usize = 128;

    /// Size of the intermediate state
    pub const STATE_SIZE: usize = 64;

    /// SHA-384 Initial Hash Vectors
    const HASH_IV_384: [u64; 8] = [
        0xcbbb9d5dc1059ed8,
        0x629a292a367cd507,
        0x9159015a3070dd17,
        0x152fecd8f70e5939,
        0x67332667ffc00b31,
        0x8eb44a8768581511,
        0xdb0c2e0d64f98fa7,
        0x47b5481dbefa4fa4,
    ];

    /// SHA-512 Initial Hash Vectors
    const HASH_IV_512: [u64; 8] = [
        0x6a09e667f3bcc908,
        0xbb67ae8584caa73b,
        0x3c6ef372fe94f82b,
        0xa54ff53a5f1d36f1,
        0x510e527fade682d1,
        0x9b05688c2b3e6c1f,
        0x1f83d9abfb41bd6b,
        0x5be0cd19137e2179,
    ];

    /// Create a new instance of Secure Hash Algorithm object
    ///
    /// # Arguments
    ///
    /// * `mode` - Mode of the SHA Operation
    pub fn new(mode: Sha512Mode) -> Self {
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
    pub fn restore(mode: Sha512Mode, state: &[u8; Self::STATE_SIZE], blocks_processed: u64) -> Self {
        let mut hash = [0u64; 8];
        for (word, bytes) in hash.iter_mut().zip(state.chunks_exact(8)) {
            let mut be = [0u8; 8];
            be.copy_from_slice(bytes);
            *word = u64::from_be_bytes(be);
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
            sha2::compress512(&mut self.hash, &[*GenericArray::from_slice(block)]);
            self.blocks_processed += 1;
        }
    }

    /// Finalize the hash by adding padding
    pub fn finalize(&mut self, tail: &[u8]) {
        let whole = tail.len() - tail.len() % Self::BLOCK_SIZE;
        self.update_blocks(&tail[..whole]);
        let msg_len =
            u128::from(self.blocks_processed) * Self::BLOCK_SIZE as u128 + (tail.len() - whole) as u128;
        let padded = pad_message(&tail[whole..], msg_len, Self::BLOCK_SIZE, 16);
        self.update_blocks(&padded);
    }

    /// Intermediate state as big-endian words
    pub fn state(&self) -> [u8; Self::STATE_SIZE] {
        let mut state = [0u8; Self::STATE_SIZE];
        for (bytes, word) in state.chunks_exact_mut(8).zip(self.hash) {
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
            Sha512Mode::Sha384 => 48,
            Sha512Mode::Sha512 => 64,
        }
    }

    /// Retrieve the hash initialization vector for specified SHA mode
    fn hash_iv(mode: Sha512Mode) -> [u64; 8] {
        match mode {
            Sha512Mode::Sha384 => Self::HASH_IV_384,
            Sha512Mode::Sha512 => Self::HASH_IV_512,
        }
    }
}
