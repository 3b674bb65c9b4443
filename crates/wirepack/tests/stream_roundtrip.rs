// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Stream entry points over real files, randomized round-trips and concurrent
// use of the global registry.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::sync::{Arc, Barrier};
use std::thread;
use wirepack::{deserialize, from_bytes, serialize, to_bytes, CodecError, NdArray, Wire};

#[derive(Wire, Debug, Default, Clone, PartialEq)]
#[wire(reference)]
struct Order {
    id: u64,
    customer: Option<String>,
    lines: Vec<Line>,
    notes: HashMap<String, String>,
    flags: Vec<Option<bool>>,
}

#[derive(Wire, Debug, Default, Clone, PartialEq)]
struct Line {
    sku: String,
    quantity: u32,
    price: f64,
}

fn random_string(rng: &mut fastrand::Rng) -> String {
    let len = rng.usize(0..12);
    (0..len)
        .map(|_| {
            // Mix ASCII with multi-byte code points.
            if rng.u8(0..8) == 0 {
                rng.choice(['é', 'ß', '中', '🦀']).unwrap_or('x')
            } else {
                rng.alphanumeric()
            }
        })
        .collect()
}

fn random_order(rng: &mut fastrand::Rng) -> Order {
    Order {
        id: rng.u64(..),
        customer: rng.bool().then(|| random_string(rng)),
        lines: (0..rng.usize(0..5))
            .map(|_| Line {
                sku: random_string(rng),
                quantity: rng.u32(..),
                price: rng.f64() * 1000.0,
            })
            .collect(),
        notes: (0..rng.usize(0..4))
            .map(|_| (random_string(rng), random_string(rng)))
            .collect(),
        flags: (0..rng.usize(0..6))
            .map(|_| match rng.u8(0..3) {
                0 => None,
                1 => Some(false),
                _ => Some(true),
            })
            .collect(),
    }
}

// ============================================================================
// Files
// ============================================================================

#[test]
fn test_serialize_to_file_and_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("orders.bin");
    let mut rng = fastrand::Rng::with_seed(7);
    let orders: Vec<Order> = (0..20).map(|_| random_order(&mut rng)).collect();

    serialize(&orders, BufWriter::new(File::create(&path).unwrap())).unwrap();
    let back: Vec<Order> = deserialize(BufReader::new(File::open(&path).unwrap())).unwrap();
    assert_eq!(back, orders);

    let on_disk = std::fs::read(&path).unwrap();
    assert_eq!(on_disk, to_bytes(&orders).unwrap());
}

#[test]
fn test_truncated_file_is_an_underrun() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let grid = NdArray::filled([4, 4], String::from("cell")).unwrap();
    let bytes = to_bytes(&grid).unwrap();
    std::io::Write::write_all(&mut file, &bytes[..bytes.len() - 1]).unwrap();

    let err = deserialize::<NdArray<String, 2>, _>(File::open(file.path()).unwrap()).unwrap_err();
    assert!(err.is_underrun(), "{err:?}");
}

#[test]
fn test_sink_failure_surfaces_as_io() {
    struct Refuse;
    impl std::io::Write for Refuse {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("closed"))
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
    match serialize(&1_u8, Refuse).unwrap_err() {
        CodecError::Io(e) => assert_eq!(e.to_string(), "closed"),
        other => panic!("unexpected error {:?}", other),
    }
}

// ============================================================================
// Randomized round-trips
// ============================================================================

#[test]
fn test_random_orders_round_trip() {
    let mut rng = fastrand::Rng::with_seed(0x5eed);
    for _ in 0..200 {
        let order = random_order(&mut rng);
        let bytes = to_bytes(&order).unwrap();
        assert_eq!(from_bytes::<Order>(&bytes).unwrap(), order);
    }
}

#[test]
fn test_random_scalar_runs_round_trip() {
    let mut rng = fastrand::Rng::with_seed(42);
    for _ in 0..100 {
        let ints: Vec<i64> = (0..rng.usize(0..64)).map(|_| rng.i64(..)).collect();
        let map: BTreeMap<u16, Vec<u8>> = (0..rng.usize(0..8))
            .map(|_| (rng.u16(..), (0..rng.usize(0..8)).map(|_| rng.u8(..)).collect()))
            .collect();
        let value = (ints, map, rng.char(..));
        let bytes = to_bytes(&value).unwrap();
        assert_eq!(from_bytes::<(Vec<i64>, BTreeMap<u16, Vec<u8>>, char)>(&bytes).unwrap(), value);
    }
}

#[test]
fn test_random_garbage_never_panics() {
    let mut rng = fastrand::Rng::with_seed(99);
    for _ in 0..500 {
        let junk: Vec<u8> = (0..rng.usize(0..64)).map(|_| rng.u8(..)).collect();
        // Any outcome but a panic is acceptable.
        let _ = from_bytes::<Order>(&junk);
        let _ = from_bytes::<Vec<String>>(&junk);
        let _ = from_bytes::<NdArray<u32, 3>>(&junk);
    }
}

// ============================================================================
// Concurrency
// ============================================================================

#[test]
fn test_concurrent_encoders_produce_identical_bytes() {
    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));
    // One HashMap iterates in a fixed order, but clones may not; keep notes empty.
    let mut order = random_order(&mut fastrand::Rng::with_seed(1));
    order.notes.clear();

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let barrier = Arc::clone(&barrier);
            let value = order.clone();
            thread::spawn(move || {
                barrier.wait();
                let bytes = to_bytes(&value).unwrap();
                assert_eq!(from_bytes::<Order>(&bytes).unwrap(), value);
                bytes
            })
        })
        .collect();
    let outputs: Vec<Vec<u8>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(outputs.windows(2).all(|w| w[0] == w[1]));
}
