// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Bit-exact wire grammar checks.
//
// Every test pins the exact byte sequence for a small value, then decodes it
// back. The grammar has no header or version, so these bytes are the format.

#![allow(clippy::unreadable_literal)]

use std::collections::{BTreeMap, HashMap, VecDeque};
use wirepack::{from_bytes, to_bytes, BitVector, CodecError, NdArray, Wire};

const ABSENT: [u8; 4] = [0xFF, 0xFF, 0xFF, 0xFF];

// ============================================================================
// Strings
// ============================================================================

#[test]
fn test_hello_world_string() {
    let bytes = to_bytes(&String::from("Hello world")).unwrap();
    assert_eq!(&bytes[..4], &[11, 0, 0, 0]);
    assert_eq!(&bytes[4..], b"Hello world");
    assert_eq!(from_bytes::<String>(&bytes).unwrap(), "Hello world");
}

#[test]
fn test_string_length_counts_utf8_bytes() {
    let bytes = to_bytes(&String::from("héllo")).unwrap();
    assert_eq!(&bytes[..4], &[6, 0, 0, 0]);
    assert_eq!(bytes.len(), 10);
}

#[test]
fn test_absent_string_is_minus_one() {
    let bytes = to_bytes(&None::<String>).unwrap();
    assert_eq!(bytes, ABSENT);
    assert_eq!(from_bytes::<Option<String>>(&bytes).unwrap(), None);
}

#[test]
fn test_empty_string_is_zero_length() {
    let bytes = to_bytes(&Some(String::new())).unwrap();
    assert_eq!(bytes, [0, 0, 0, 0]);
    assert_eq!(
        from_bytes::<Option<String>>(&bytes).unwrap(),
        Some(String::new())
    );
}

// ============================================================================
// Arrays and collections
// ============================================================================

#[test]
fn test_empty_int_array_is_present_and_empty() {
    let bytes = to_bytes(&Vec::<i32>::new()).unwrap();
    assert_eq!(bytes, [0, 0, 0, 0]);
    let back = from_bytes::<Option<Vec<i32>>>(&bytes).unwrap();
    assert_eq!(back, Some(Vec::new()));
}

#[test]
fn test_absent_and_empty_arrays_differ() {
    let absent = to_bytes(&None::<Vec<i32>>).unwrap();
    let empty = to_bytes(&Some(Vec::<i32>::new())).unwrap();
    assert_ne!(absent, empty);
    assert_eq!(absent, ABSENT);
    assert_eq!(from_bytes::<Option<Vec<i32>>>(&absent).unwrap(), None);
    assert_eq!(
        from_bytes::<Option<Vec<i32>>>(&empty).unwrap(),
        Some(Vec::new())
    );
}

#[test]
fn test_fixed_and_dispatched_elements_share_the_grammar() {
    // Fast path: one block of little-endian u16s.
    let ints = to_bytes(&vec![1_u16, 0x0203]).unwrap();
    assert_eq!(ints, [2, 0, 0, 0, 1, 0, 3, 2]);

    // Same sequence through a non-contiguous container is per-element.
    let deque: VecDeque<u16> = [1, 0x0203].into_iter().collect();
    assert_eq!(to_bytes(&deque).unwrap(), ints);
}

#[test]
fn test_nullable_elements_are_framed_by_the_element() {
    let value = vec![Some(String::from("a")), None];
    let bytes = to_bytes(&value).unwrap();
    assert_eq!(
        bytes,
        [2, 0, 0, 0, 1, 0, 0, 0, b'a', 0xFF, 0xFF, 0xFF, 0xFF]
    );
    assert_eq!(from_bytes::<Vec<Option<String>>>(&bytes).unwrap(), value);
}

#[test]
fn test_fixed_size_array_keeps_its_count() {
    let bytes = to_bytes(&[7_u8, 8, 9]).unwrap();
    assert_eq!(bytes, [3, 0, 0, 0, 7, 8, 9]);
    assert_eq!(from_bytes::<[u8; 3]>(&bytes).unwrap(), [7, 8, 9]);

    match from_bytes::<[u8; 4]>(&bytes).unwrap_err() {
        CodecError::InvalidValue { .. } => {}
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_multi_dimensional_array_layout() {
    let grid = NdArray::new([2, 3], vec![1_u8, 2, 3, 4, 5, 6]).unwrap();
    let bytes = to_bytes(&grid).unwrap();
    assert_eq!(
        bytes,
        [
            6, 0, 0, 0, // total elements
            2, 0, 0, 0, // extent 0
            3, 0, 0, 0, // extent 1
            1, 2, 3, 4, 5, 6, // row-major
        ]
    );
    let back: NdArray<u8, 2> = from_bytes(&bytes).unwrap();
    assert_eq!(back[[1, 0]], 4);
    assert_eq!(back, grid);
}

#[test]
fn test_bit_vector_layout() {
    let bits: BitVector = [true, false, true].into_iter().collect();
    let bytes = to_bytes(&bits).unwrap();
    assert_eq!(bytes, [3, 0, 0, 0, 0b101, 0, 0, 0]);
    assert_eq!(from_bytes::<BitVector>(&bytes).unwrap(), bits);
    assert_eq!(to_bytes(&None::<BitVector>).unwrap(), ABSENT);
}

// ============================================================================
// Nullable
// ============================================================================

#[test]
fn test_nullable_bool_is_one_byte() {
    assert_eq!(to_bytes(&Some(true)).unwrap(), [0x01]);
    assert_eq!(to_bytes(&Some(false)).unwrap(), [0x00]);
    assert_eq!(to_bytes(&None::<bool>).unwrap(), [0xFF]);

    assert_eq!(from_bytes::<Option<bool>>(&[0x01]).unwrap(), Some(true));
    assert_eq!(from_bytes::<Option<bool>>(&[0x00]).unwrap(), Some(false));
    assert_eq!(from_bytes::<Option<bool>>(&[0xFF]).unwrap(), None);
}

#[test]
fn test_nullable_scalar_has_presence_byte() {
    assert_eq!(to_bytes(&Some(5_u32)).unwrap(), [1, 5, 0, 0, 0]);
    assert_eq!(to_bytes(&None::<u32>).unwrap(), [0]);
    assert_eq!(from_bytes::<Option<u32>>(&[0]).unwrap(), None);
}

// ============================================================================
// Objects
// ============================================================================

#[derive(Wire, Debug, Default, PartialEq)]
#[wire(reference)]
struct Labelled {
    label: Option<String>,
    count: i32,
}

#[derive(Wire, Debug, Default, PartialEq)]
struct LabelledValue {
    label: Option<String>,
    count: i32,
}

#[test]
fn test_reference_object_with_null_string_and_int() {
    let value = Labelled {
        label: None,
        count: 42,
    };
    let bytes = to_bytes(&value).unwrap();
    assert_eq!(bytes, [1, 0xFF, 0xFF, 0xFF, 0xFF, 42, 0, 0, 0]);
    assert_eq!(from_bytes::<Labelled>(&bytes).unwrap(), value);
}

#[test]
fn test_value_object_has_no_presence_flag() {
    let value = LabelledValue {
        label: None,
        count: 42,
    };
    assert_eq!(
        to_bytes(&value).unwrap(),
        [0xFF, 0xFF, 0xFF, 0xFF, 42, 0, 0, 0]
    );
}

#[test]
fn test_absent_reference_object_is_single_zero() {
    assert_eq!(to_bytes(&None::<Labelled>).unwrap(), [0]);
    assert_eq!(from_bytes::<Option<Labelled>>(&[0]).unwrap(), None);

    match from_bytes::<Labelled>(&[0]).unwrap_err() {
        CodecError::UnexpectedAbsent { .. } => {}
        other => panic!("unexpected error {:?}", other),
    }
}

// ============================================================================
// Maps
// ============================================================================

#[test]
fn test_ordered_map_layout() {
    let map: BTreeMap<i32, String> = [(1, "a".to_string()), (2, "b".to_string())].into();
    let bytes = to_bytes(&map).unwrap();
    assert_eq!(
        bytes,
        [
            2, 0, 0, 0, // pairs
            1, 0, 0, 0, 1, 0, 0, 0, b'a', // 1 => "a"
            2, 0, 0, 0, 1, 0, 0, 0, b'b', // 2 => "b"
        ]
    );
    assert_eq!(from_bytes::<BTreeMap<i32, String>>(&bytes).unwrap(), map);
}

#[test]
fn test_hash_map_decodes_regardless_of_pair_order() {
    let map: HashMap<i32, String> = [(1, "a".to_string()), (2, "b".to_string())].into();
    let bytes = to_bytes(&map).unwrap();
    assert_eq!(&bytes[..4], &[2, 0, 0, 0]);
    assert_eq!(bytes.len(), 4 + 2 * 9);

    // Pairs written in the other order decode to the same map.
    let swapped = [
        2, 0, 0, 0, //
        2, 0, 0, 0, 1, 0, 0, 0, b'b', //
        1, 0, 0, 0, 1, 0, 0, 0, b'a',
    ];
    assert_eq!(from_bytes::<HashMap<i32, String>>(&swapped).unwrap(), map);
    assert_eq!(from_bytes::<HashMap<i32, String>>(&bytes).unwrap(), map);
}

// ============================================================================
// Truncated and corrupt input
// ============================================================================

#[test]
fn test_truncated_string_payload_underruns() {
    let err = from_bytes::<String>(&[5, 0, 0, 0, b'a']).unwrap_err();
    match err {
        CodecError::BufferUnderrun { .. } => {}
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_every_prefix_of_a_valid_encoding_fails_safely() {
    let value = Labelled {
        label: Some("wire".to_string()),
        count: -3,
    };
    let bytes = to_bytes(&(value, vec![1.5_f64, 2.5], Some(true))).unwrap();
    for cut in 0..bytes.len() {
        let err = from_bytes::<(Labelled, Vec<f64>, Option<bool>)>(&bytes[..cut]).unwrap_err();
        assert!(err.is_underrun(), "prefix {cut}: {err:?}");
    }
    assert!(from_bytes::<(Labelled, Vec<f64>, Option<bool>)>(&bytes).is_ok());
}

#[test]
fn test_huge_count_does_not_allocate_or_overread() {
    // Claims i32::MAX elements but carries two.
    let bytes = [0xFF, 0xFF, 0xFF, 0x7F, 1, 2];
    assert!(from_bytes::<Vec<String>>(&bytes).unwrap_err().is_underrun());
    assert!(from_bytes::<Vec<u64>>(&bytes).unwrap_err().is_underrun());
}

#[test]
fn test_negative_length_is_malformed() {
    match from_bytes::<Vec<u8>>(&[0xFE, 0xFF, 0xFF, 0xFF]).unwrap_err() {
        CodecError::MalformedLength { length, .. } => assert_eq!(length, -2),
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_absent_marker_in_non_optional_target() {
    match from_bytes::<String>(&ABSENT).unwrap_err() {
        CodecError::UnexpectedAbsent { .. } => {}
        other => panic!("unexpected error {:?}", other),
    }
}
