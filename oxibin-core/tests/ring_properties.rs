//! Property tests for ring buffer streams against a `VecDeque` model.

use oxibin_core::ringbuffer::{RingBuffer, Wrapping};
use oxibin_core::{OxiBinError, RingBufferStream};
use proptest::prelude::*;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
enum Op {
    Write(Vec<u8>),
    Read(usize),
    Peek(usize),
    Seek(u64),
    Scan(u8),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        proptest::collection::vec(any::<u8>(), 0..120).prop_map(Op::Write),
        (0usize..120).prop_map(Op::Read),
        (0usize..120).prop_map(Op::Peek),
        (0u64..120).prop_map(Op::Seek),
        any::<u8>().prop_map(Op::Scan),
    ]
}

proptest! {
    #[test]
    fn strict_stream_matches_model(ops in proptest::collection::vec(op_strategy(), 1..80)) {
        let mut ring = RingBufferStream::new(256);
        let mut model: VecDeque<u8> = VecDeque::new();

        for op in ops {
            match op {
                Op::Write(bytes) => {
                    let fits = model.len() + bytes.len() <= 256;
                    let result = ring.write(&bytes);
                    prop_assert_eq!(result.is_ok(), fits);
                    if fits {
                        model.extend(bytes);
                    }
                }
                Op::Read(n) | Op::Peek(n) if n > model.len() => {
                    let mut out = vec![0u8; n];
                    let is_underflow = matches!(ring.peek(&mut out), Err(OxiBinError::Underflow { .. }));
                    prop_assert!(is_underflow);
                }
                Op::Read(n) => {
                    let mut out = vec![0u8; n];
                    prop_assert_eq!(ring.read(&mut out).unwrap(), n);
                    let expected: Vec<u8> = model.drain(..n).collect();
                    prop_assert_eq!(out, expected);
                }
                Op::Peek(n) => {
                    let mut out = vec![0u8; n];
                    prop_assert_eq!(ring.peek(&mut out).unwrap(), n);
                    let expected: Vec<u8> = model.iter().take(n).copied().collect();
                    prop_assert_eq!(out, expected);
                }
                Op::Seek(k) => {
                    let result = ring.seek(k);
                    if k as usize <= model.len() {
                        prop_assert!(result.is_ok());
                        model.drain(..k as usize);
                    } else {
                        prop_assert!(result.is_err());
                    }
                }
                Op::Scan(byte) => {
                    prop_assert_eq!(ring.scan(byte), model.iter().position(|&b| b == byte));
                }
            }
            prop_assert_eq!(ring.len(), model.len());
        }
    }

    #[test]
    fn lossy_stream_keeps_newest(chunks in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..100), 1..40)) {
        let mut ring = RingBufferStream::new(64);
        ring.set_allow_overflow(true);
        let mut model: VecDeque<u8> = VecDeque::new();

        for chunk in chunks {
            ring.write(&chunk).unwrap();
            model.extend(chunk);
            while model.len() > 64 {
                model.pop_front();
            }
            prop_assert_eq!(ring.len(), model.len());
            prop_assert_eq!(ring.iter().copied().collect::<Vec<_>>(), model.iter().copied().collect::<Vec<_>>());
        }
    }

    #[test]
    fn wrapping_and_masked_agree(
        chunks in proptest::collection::vec((proptest::collection::vec(any::<u8>(), 0..200), 0usize..200, any::<u8>()), 1..40),
    ) {
        let mut masked = RingBufferStream::new(256);
        let mut wrapping = RingBuffer::<u8, Wrapping<u8>>::wrapping();
        masked.set_safe_underflow(true);
        wrapping.set_safe_underflow(true);

        for (bytes, take, needle) in chunks {
            prop_assert_eq!(masked.write(&bytes).is_ok(), wrapping.write(&bytes).is_ok());
            prop_assert_eq!(masked.scan(needle), wrapping.scan(needle));

            let mut a = vec![0u8; take];
            let mut b = vec![0u8; take];
            let na = masked.read(&mut a).unwrap();
            let nb = wrapping.read(&mut b).unwrap();
            prop_assert_eq!(na, nb);
            prop_assert_eq!(&a[..na], &b[..nb]);
        }
    }
}

#[test]
fn test_overflow_leaves_content_unchanged() {
    let mut ring = RingBufferStream::new(8);
    ring.write(&[1, 2, 3, 4, 5]).unwrap();

    assert!(matches!(
        ring.write(&[6, 7, 8, 9]),
        Err(OxiBinError::Overflow { .. })
    ));
    assert_eq!(ring.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_overflow_enabled_fills_to_capacity() {
    let mut ring = RingBufferStream::new(8);
    ring.set_allow_overflow(true);
    ring.write(&[1, 2, 3, 4, 5]).unwrap();
    ring.write(&[6, 7, 8, 9]).unwrap();

    assert_eq!(ring.len(), ring.capacity());
    let mut out = [0u8; 8];
    ring.read(&mut out).unwrap();
    assert_eq!(out, [2, 3, 4, 5, 6, 7, 8, 9]);
}

#[test]
fn test_many_small_chunks_then_full_read() {
    let mut ring = RingBufferStream::new(8);
    let mut scratch = [0u8; 3];
    for i in 0..50u8 {
        ring.write(&[i, i, i]).unwrap();
        ring.read(&mut scratch).unwrap();
    }

    let payload = [10, 20, 30, 40, 50, 60, 70, 80];
    ring.write(&payload).unwrap();
    let mut out = [0u8; 8];
    assert_eq!(ring.read(&mut out).unwrap(), 8);
    assert_eq!(out, payload);
}
