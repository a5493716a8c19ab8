/*++

Licensed under the Apache-2.0 license.

File Name:

    rsa.rs

Abstract:

    File contains the RSA modular exponentiation primitive operating on
    little-endian encoded operands.

--*/

use num_bigint::BigUint;

/// Compute `base ^ exponent mod modulus`.
///
/// All operands are little-endian unsigned integers. The result is
/// little-endian and zero padded to `modulus.len()` bytes.
///
/// # Returns
///
/// * `None` - if the modulus is zero
pub fn rsa_mod_exp_le(base: &[u8], exponent: &[u8], modulus: &[u8]) -> Option<Vec<u8>> {
    let n = BigUint::from_bytes_le(modulus);
    if n == BigUint::default() {
        return None;
    }
    let result = BigUint::from_bytes_le(base).modpow(&BigUint::from_bytes_le(exponent), &n);

    let mut bytes = result.to_bytes_le();
    bytes.resize(modulus.len(), 0);
    Some(bytes)
}
