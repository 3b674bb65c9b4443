// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # wirepack - type-driven binary object-graph codec
//!
//! Produces a compact, length-prefixed little-endian encoding of any value of
//! a statically known type, and reconstructs an equal value from those bytes.
//! For every type the codec decides once how to encode it, builds an
//! encode/decode routine pair (a [`Processor`]), caches it for the lifetime of
//! the process and reuses it for every later call.
//!
//! ## Quick Start
//!
//! ```rust
//! use wirepack::{Result, Wire};
//!
//! #[derive(Wire, Debug, Default, PartialEq)]
//! #[wire(reference)]
//! struct Reading {
//!     sensor: Option<String>,
//!     value: i32,
//! }
//!
//! fn main() -> Result<()> {
//!     let reading = Reading { sensor: None, value: 42 };
//!     let bytes = wirepack::to_bytes(&reading)?;
//!     // presence flag, absent string, then the integer
//!     assert_eq!(bytes, [1, 0xFF, 0xFF, 0xFF, 0xFF, 42, 0, 0, 0]);
//!     assert_eq!(wirepack::from_bytes::<Reading>(&bytes)?, reading);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |                          Entry points                               |
//! |   serialize / deserialize | to_bytes / from_bytes | encode_into     |
//! +---------------------------------------------------------------------+
//! |                     Processor registry                              |
//! |   TypeId -> Processor<T> | staged builds | recursion | statistics   |
//! +---------------------------------------------------------------------+
//! |                          Codecs                                     |
//! |   scalar | text | Option | sequences | maps | nd-arrays | objects   |
//! +---------------------------------------------------------------------+
//! |                        Buffer engine                                |
//! |   WriteBuffer (pooled, geometric growth) | ReadCursor (checked)     |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Wire grammar
//!
//! | Construct | Encoding |
//! |-----------|----------|
//! | Fixed-layout scalar | raw bytes of its fixed size |
//! | Absent string/array/collection/map | `i32` `-1` |
//! | String | `i32` UTF-8 byte length, then the bytes |
//! | Array/collection | `i32` element count, then the elements |
//! | `Option<T>` (non-bool) | `u8` 0 = absent / 1 = present, then the value |
//! | `Option<bool>` | `i8` -1 = absent, 0 = false, 1 = true |
//! | Reference object | presence flag, then members in declared order |
//! | Value object | members in declared order |
//!
//! There is no header, tag or version: both sides must agree on the type.
//!
//! ## Modules Overview
//!
//! - [`buffer`] - write buffer, read cursor, storage pool
//! - [`codec`] - the [`Wire`] trait and one strategy per shape
//! - [`registry`] - processor cache and build context
//! - [`config`] - buffer limits and runtime configuration

// Allow the derive macro to work inside this crate's tests
extern crate self as wirepack;

/// Top-level encode/decode entry points.
pub mod api;
/// Growable write buffer, read cursor and pooled storage.
pub mod buffer;
/// Codec strategies and the `Wire` trait.
pub mod codec;
/// Buffer limits and runtime configuration.
pub mod config;
/// Error type.
pub mod error;
/// Fixed-layout raw byte values.
pub mod layout;
/// Processor cache and dispatch.
pub mod registry;

pub use api::{
    decode_from, deserialize, encode_into, from_bytes, processor, serialize, to_bytes,
};
pub use buffer::{BufferPool, ReadCursor, WriteBuffer};
pub use codec::{
    BitVector, MemberInfo, MemberSelection, NdArray, ObjectBuilder, ObjectDescriptor, ObjectKind,
};
pub use config::CodecConfig;
pub use error::{CodecError, Result};
pub use layout::FixedLayout;
pub use registry::{BuildContext, Processor, ProcessorRegistry, RegistryStats, Shape};

// Re-export the trait and the derive macro under one name
pub use codec::Wire; // Trait (for type bounds)
pub use wirepack_codegen::Wire; // Derive macro (for #[derive(wirepack::Wire)])

/// wirepack version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
