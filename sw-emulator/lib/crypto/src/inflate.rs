/*++

Licensed under the Apache-2.0 license.

File Name:

    inflate.rs

Abstract:

    File contains a raw deflate decompressor that hands its output to a sink
    in bounded chunks.

--*/

use flate2::{Decompress, FlushDecompress, Status};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InflateError<E> {
    #[error("corrupt deflate stream: {0}")]
    Corrupt(String),

    #[error("deflate stream ended before the final block")]
    Truncated,

    #[error("output sink rejected a chunk")]
    Sink(E),
}

/// Decompress a raw (headerless) deflate stream.
///
/// Output is produced in chunks of at most `chunk_size` bytes; each chunk is
/// passed to `sink` in stream order.
///
/// # Returns
///
/// * `u64` - Total number of decompressed bytes
pub fn inflate_raw<E>(
    input: &[u8],
    chunk_size: usize,
    mut sink: impl FnMut(&[u8]) -> Result<(), E>,
) -> Result<u64, InflateError<E>> {
    let mut decompress = Decompress::new(false);
    let mut chunk = vec![0u8; chunk_size.max(1)];

    loop {
        let in_before = decompress.total_in();
        let out_before = decompress.total_out();
        let consumed = usize::try_from(in_before).unwrap_or(input.len()).min(input.len());

        let status = decompress
            .decompress(&input[consumed..], &mut chunk, FlushDecompress::None)
            .map_err(|err| InflateError::Corrupt(err.to_string()))?;

        let produced = (decompress.total_out() - out_before) as usize;
        if produced > 0 {
            sink(&chunk[..produced]).map_err(InflateError::Sink)?;
        }

        match status {
            Status::StreamEnd => return Ok(decompress.total_out()),
            Status::Ok | Status::BufError => {
                if produced == 0 && decompress.total_in() == in_before {
                    return Err(InflateError::Truncated);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::DeflateEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn deflate(data: &[u8]) -> Vec<u8> {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_chunked_output() {
        let data: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        let compressed = deflate(&data);

        let mut chunks = vec![];
        let total = inflate_raw::<()>(&compressed, 4096, |chunk| {
            chunks.push(chunk.to_vec());
            Ok(())
        })
        .unwrap();

        assert_eq!(total, 10_000);
        assert!(chunks.len() >= 3);
        assert!(chunks.iter().all(|c| c.len() <= 4096));
        assert_eq!(chunks.concat(), data);
    }

    #[test]
    fn test_truncated_stream() {
        let data = vec![0x42u8; 5000];
        let compressed = deflate(&data);
        let result = inflate_raw::<()>(&compressed[..compressed.len() / 2], 4096, |_| Ok(()));
        assert_eq!(result, Err(InflateError::Truncated));
    }

    #[test]
    fn test_corrupt_stream() {
        // BTYPE = 0b11 is reserved
        let result = inflate_raw::<()>(&[0x07, 0x00, 0x00], 4096, |_| Ok(()));
        assert!(matches!(result, Err(InflateError::Corrupt(_))));
    }

    #[test]
    fn test_sink_error_stops_inflate() {
        let compressed = deflate(&[1u8; 100]);
        let result = inflate_raw(&compressed, 16, |_| Err("full"));
        assert_eq!(result, Err(InflateError::Sink("full")));
    }
}
