/*++

Licensed under the Apache-2.0 license.

File Name:

    helpers.rs

Abstract:

    File contains helpers shared by the Merkle-Damgard hash engines.

--*/

/// Build the final padded block(s) for a Merkle-Damgard hash.
///
/// # Arguments
///
/// * `remainder` - Trailing message bytes that do not fill a whole block
/// * `msg_len` - Total message length in bytes, including all compressed blocks
/// * `block_size` - Block size of the hash (64 or 128)
/// * `len_field_size` - Size of the big-endian bit length field (8 or 16)
///
/// # Returns
///
/// * `Vec<u8>` - One or two blocks, ready to be compressed
pub fn pad_message(
    remainder: &[u8],
    msg_len: u128,
    block_size: usize,
    len_field_size: usize,
) -> Vec<u8> {
    debug_assert!(remainder.len() < block_size);
    let mut padded = Vec::with_capacity(2 * block_size);
    padded.extend_from_slice(remainder);
    padded.push(0b1000_0000);

    let used = padded.len() + len_field_size;
    let total = used.div_ceil(block_size) * block_size;
    padded.resize(total - len_field_size, 0);

    let bit_len = msg_len.wrapping_mul(8).to_be_bytes();
    padded.extend_from_slice(&bit_len[bit_len.len() - len_field_size..]);
    padded
}
