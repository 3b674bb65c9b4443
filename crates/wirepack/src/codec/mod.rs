// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec strategies, one module per shape family.
//!
//! Each supported type implements [`Wire`]: `shape()` classifies it and
//! `build_processor()` selects the matching strategy and captures the nested
//! processors it needs. Both run once per type, inside the registry; the
//! returned [`Processor`] is what every encode/decode call executes.

pub mod bits;
pub mod map;
pub mod ndarray;
pub mod nullable;
pub mod object;
pub mod pointer;
pub mod primitive;
pub mod sequence;
pub mod text;
pub mod tuple;

use crate::error::Result;
use crate::registry::{BuildContext, Processor, Shape};

pub use bits::BitVector;
pub use map::MapContainer;
pub use ndarray::NdArray;
pub use object::{MemberInfo, MemberSelection, ObjectBuilder, ObjectDescriptor, ObjectKind};
pub use sequence::SequenceContainer;

/// A type the codec can encode.
///
/// Implemented here for scalars, text, `Option`, std collections, maps,
/// smart pointers and tuples; `#[derive(Wire)]` implements it for user
/// structs and fieldless enums.
///
/// # Example
///
/// ```
/// use wirepack::Wire;
///
/// #[derive(Wire, Default, Debug, PartialEq)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// let bytes = wirepack::to_bytes(&Point { x: 1, y: -1 }).unwrap();
/// assert_eq!(bytes.len(), 8);
/// assert_eq!(wirepack::from_bytes::<Point>(&bytes).unwrap(), Point { x: 1, y: -1 });
/// ```
pub trait Wire: Sized + 'static {
    /// Static shape classification.
    fn shape() -> Shape;

    /// Build the processor for `Self`, resolving nested types through `ctx`.
    ///
    /// Called by the registry at most once per successful build; use
    /// [`ProcessorRegistry::processor`](crate::ProcessorRegistry::processor)
    /// to obtain processors.
    fn build_processor(ctx: &mut BuildContext<'_>) -> Result<Processor<Self>>;
}
