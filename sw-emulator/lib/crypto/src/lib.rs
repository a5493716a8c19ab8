/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the CCP Emulator Crypto library.

--*/

mod aes_modes;
mod helpers;
mod inflate;
mod rsa;
mod sha1;
mod sha256;
mod sha512;

pub use crate::aes_modes::{AesBlockMode, AesCipher, AesDirection, AES_BLOCK_SIZE};
pub use crate::inflate::{inflate_raw, InflateError};
pub use crate::rsa::rsa_mod_exp_le;
pub use crate::sha1::Sha1;
pub use crate::sha256::{Sha256, Sha256Mode};
pub use crate::sha512::{Sha512, Sha512Mode};
