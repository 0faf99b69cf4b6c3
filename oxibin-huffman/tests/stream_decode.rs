//! End-to-end decoding: bytes staged in a ring buffer stream, read through
//! a bit reader, resolved by a canonical decoder.

use oxibin_core::bitstream::{BitReader32, BitReader64};
use oxibin_core::{OxiBinError, RingBufferStream};
use oxibin_huffman::CanonicalDecoder;
use proptest::prelude::*;

/// Code lengths for eight symbols: F=00 A=010 B=011 C=100 D=101 E=110
/// G=1110 H=1111.
const LENGTHS: [u8; 8] = [3, 3, 3, 3, 3, 2, 4, 4];

/// Canonical codes for `lengths`, as `(code, length)` per symbol.
fn canonical_codes(lengths: &[u8]) -> Vec<(u32, u32)> {
    let max = usize::from(lengths.iter().copied().max().unwrap_or(0));
    let mut bl_count = vec![0u32; max + 1];
    for &len in lengths {
        if len > 0 {
            bl_count[usize::from(len)] += 1;
        }
    }
    let mut next_code = vec![0u32; max + 1];
    let mut code = 0u32;
    for bits in 1..=max {
        code = (code + bl_count[bits - 1]) << 1;
        next_code[bits] = code;
    }
    lengths
        .iter()
        .map(|&len| {
            if len == 0 {
                return (0, 0);
            }
            let code = next_code[usize::from(len)];
            next_code[usize::from(len)] += 1;
            (code, u32::from(len))
        })
        .collect()
}

/// Pack symbols MSB-first, followed by one byte of zero padding so the
/// final peek always has a full window.
fn encode(symbols: &[usize], codes: &[(u32, u32)]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut acc = 0u64;
    let mut bits = 0u32;
    for &symbol in symbols {
        let (code, len) = codes[symbol];
        acc = (acc << len) | u64::from(code);
        bits += len;
        while bits >= 8 {
            bits -= 8;
            out.push((acc >> bits) as u8);
        }
    }
    if bits > 0 {
        out.push((acc << (8 - bits)) as u8);
    }
    out.push(0);
    out
}

#[test]
fn test_decode_message_staged_in_chunks() {
    let decoder = CanonicalDecoder::from_lengths(&LENGTHS).unwrap();
    let codes = canonical_codes(&LENGTHS);
    let message: Vec<usize> = (0..200).map(|i| (i * 5 + i / 3) % 8).collect();
    let encoded = encode(&message, &codes);

    let mut stream = RingBufferStream::new(16);
    let mut reader = BitReader32::new(&mut stream);
    let mut pending = encoded.chunks(3);
    let mut decoded = Vec::new();

    // Producer tops the stream up whenever the decoder runs dry
    while decoded.len() < message.len() {
        match decoder.parse(&mut reader) {
            Ok(symbol) => decoded.push(symbol),
            Err(OxiBinError::InsufficientData { .. }) => {
                let chunk = pending.next().expect("input exhausted before message end");
                reader.get_mut().write(chunk).unwrap();
            }
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(decoded, message);
}

#[test]
fn test_char_table_over_ring_stream() {
    let mut decoder = CanonicalDecoder::new(3).unwrap();
    decoder.add("0", ' ').unwrap();
    decoder.add("10", 'e').unwrap();
    decoder.add("110", 'h').unwrap();
    decoder.add("111", 'y').unwrap();

    // h e y _ h e y, then padding
    let mut stream = RingBufferStream::new(8);
    stream.write(&[0b1101_0111, 0b0110_1011, 0b1000_0000]).unwrap();

    let mut reader = BitReader64::new(&mut stream);
    let text: String = (0..7).map(|_| decoder.parse(&mut reader).unwrap()).collect();
    assert_eq!(text, "hey hey");
    assert_eq!(reader.bit_position(), 17);
}

#[test]
fn test_corrupt_stream_reports_position() {
    let mut decoder = CanonicalDecoder::new(2).unwrap();
    decoder.add("0", 0u8).unwrap();
    decoder.add("10", 1u8).unwrap();

    let mut stream = RingBufferStream::new(4);
    stream.write(&[0b0101_1000]).unwrap();
    let mut reader = BitReader32::new(&mut stream);

    assert_eq!(decoder.parse(&mut reader).unwrap(), 0);
    assert_eq!(decoder.parse(&mut reader).unwrap(), 1);
    match decoder.parse(&mut reader) {
        Err(OxiBinError::CodeNotFound {
            window,
            bit_position,
        }) => {
            assert_eq!(window, 0b11);
            assert_eq!(bit_position, 3);
        }
        other => panic!("expected code not found, got {other:?}"),
    }
}

proptest! {
    #[test]
    fn decodes_what_was_encoded(message in proptest::collection::vec(0usize..8, 0..300)) {
        let decoder = CanonicalDecoder::from_lengths(&LENGTHS).unwrap();
        let encoded = encode(&message, &canonical_codes(&LENGTHS));

        let mut reader = BitReader64::new(&encoded[..]);
        let mut bits = 0u64;
        for &expected in &message {
            prop_assert_eq!(decoder.parse(&mut reader).unwrap(), expected);
            bits += u64::from(LENGTHS[expected]);
        }
        prop_assert_eq!(reader.bit_position(), bits);
    }

    #[test]
    fn from_lengths_matches_reference_codes(
        lengths in proptest::collection::vec(0u8..=6, 1..24),
    ) {
        // Only Kraft-valid tables build
        let kraft: u32 = lengths.iter().filter(|&&l| l > 0).map(|&l| 1u32 << (6 - l)).sum();
        let result = CanonicalDecoder::from_lengths(&lengths);
        if lengths.iter().all(|&l| l == 0) || kraft > 64 {
            prop_assert!(result.is_err());
        } else {
            let decoder = result.unwrap();
            let max = u32::from(*lengths.iter().max().unwrap());
            for (symbol, (code, len)) in canonical_codes(&lengths).into_iter().enumerate() {
                if len == 0 {
                    continue;
                }
                let window = (code << (max - len)) << (32 - max);
                let data = window.to_be_bytes();
                let mut reader = BitReader32::new(&data[..]);
                prop_assert_eq!(decoder.parse(&mut reader).unwrap(), symbol);
                prop_assert_eq!(reader.bit_position(), u64::from(len));
            }
        }
    }
}
