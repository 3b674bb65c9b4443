// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Member-wise objects.
//!
//! An object is the concatenation of its selected members, in the order the
//! member list was resolved, with no per-member framing. Reference objects are
//! preceded by a one-byte presence flag; value objects are not. Decoding
//! starts from `T::default()` and assigns each member in turn, so members left
//! out of the selection keep their default.
//!
//! The member list itself comes from `#[derive(Wire)]`, which applies the
//! selection policy at compile time and drives [`ObjectBuilder`].

use super::Wire;
use crate::buffer::{ReadCursor, WriteBuffer};
use crate::error::{CodecError, Result};
use crate::registry::{BuildContext, ElementCodec, Processor, Shape};
use std::fmt;
use std::sync::Arc;

/// Reference objects carry a presence flag, value objects do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Value,
    Reference,
}

/// Member selection policy, as resolved for one type.
///
/// `EXPLICIT` (no flags) selects only members marked `#[wire(include)]`;
/// `PUBLIC` selects `pub` fields, `NON_PUBLIC` every other field, `ALL` both.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemberSelection(u8);

impl MemberSelection {
    pub const EXPLICIT: Self = Self(0);
    pub const PUBLIC: Self = Self(1);
    pub const NON_PUBLIC: Self = Self(2);
    pub const ALL: Self = Self(3);

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Unknown bits are dropped.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & Self::ALL.0)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_explicit(self) -> bool {
        self.0 == 0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl Default for MemberSelection {
    fn default() -> Self {
        Self::ALL
    }
}

impl std::ops::BitOr for MemberSelection {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl fmt::Debug for MemberSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::EXPLICIT => write!(f, "MemberSelection(EXPLICIT)"),
            Self::PUBLIC => write!(f, "MemberSelection(PUBLIC)"),
            Self::NON_PUBLIC => write!(f, "MemberSelection(NON_PUBLIC)"),
            _ => write!(f, "MemberSelection(ALL)"),
        }
    }
}

/// One selected member, in wire order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    pub name: &'static str,
    pub type_name: &'static str,
    pub shape: Shape,
    /// Position in the wire order.
    pub index: usize,
}

/// Immutable member table of an object processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectDescriptor {
    pub type_name: &'static str,
    pub kind: ObjectKind,
    pub selection: MemberSelection,
    pub members: Vec<MemberInfo>,
}

impl ObjectDescriptor {
    pub fn member(&self, name: &str) -> Option<&MemberInfo> {
        self.members.iter().find(|m| m.name == name)
    }

    pub fn is_reference(&self) -> bool {
        self.kind == ObjectKind::Reference
    }
}

type MemberEncode<T> = Box<dyn Fn(&T, &mut WriteBuffer) -> Result<()> + Send + Sync>;
type MemberDecode<T> = Box<dyn Fn(&mut T, &mut ReadCursor<'_>) -> Result<()> + Send + Sync>;

struct MemberCodec<T> {
    encode: MemberEncode<T>,
    decode: MemberDecode<T>,
}

/// Assembles an object processor from its resolved member list.
///
/// ```ignore
/// ObjectBuilder::<Person>::new(ctx, ObjectKind::Reference, MemberSelection::ALL)
///     .member::<String>("name", |p| &p.name, |p| &mut p.name)?
///     .member::<u32>("age", |p| &p.age, |p| &mut p.age)?
///     .build()
/// ```
pub struct ObjectBuilder<'c, 'r, T> {
    ctx: &'c mut BuildContext<'r>,
    kind: ObjectKind,
    selection: MemberSelection,
    members: Vec<MemberCodec<T>>,
    info: Vec<MemberInfo>,
}

impl<'c, 'r, T: Wire + Default> ObjectBuilder<'c, 'r, T> {
    pub fn new(ctx: &'c mut BuildContext<'r>, kind: ObjectKind, selection: MemberSelection) -> Self {
        Self {
            ctx,
            kind,
            selection,
            members: Vec::new(),
            info: Vec::new(),
        }
    }

    /// Append a member; its processor is resolved now.
    ///
    /// # Errors
    ///
    /// `UnsupportedType` with `name` prefixed to the member path if the
    /// member's type cannot be built.
    pub fn member<M: Wire>(
        mut self,
        name: &'static str,
        get: fn(&T) -> &M,
        get_mut: fn(&mut T) -> &mut M,
    ) -> Result<Self> {
        let codec: ElementCodec<M> = self.ctx.element::<M>().map_err(|e| e.in_member(name))?;
        self.info.push(MemberInfo {
            name,
            type_name: std::any::type_name::<M>(),
            shape: M::shape(),
            index: self.info.len(),
        });
        let enc = codec.clone();
        self.members.push(MemberCodec {
            encode: Box::new(move |value: &T, buf: &mut WriteBuffer| enc.encode(get(value), buf)),
            decode: Box::new(move |value: &mut T, cursor: &mut ReadCursor<'_>| -> Result<()> {
                *get_mut(value) = codec.decode(cursor)?;
                Ok(())
            }),
        });
        Ok(self)
    }

    pub fn build(self) -> Result<Processor<T>> {
        let type_name = std::any::type_name::<T>();
        let reference = self.kind == ObjectKind::Reference;
        let members = Arc::new(self.members);
        let enc = Arc::clone(&members);

        let encode = Box::new(move |value: &T, buf: &mut WriteBuffer| -> Result<()> {
            if reference {
                buf.write(1u8)?;
            }
            for member in enc.iter() {
                (member.encode)(value, buf)?;
            }
            Ok(())
        });
        let decode = Box::new(move |cursor: &mut ReadCursor<'_>| -> Result<T> {
            if reference && !cursor.read::<bool>()? {
                return Err(CodecError::UnexpectedAbsent { type_name });
            }
            let mut value = T::default();
            for member in members.iter() {
                (member.decode)(&mut value, cursor)?;
            }
            Ok(value)
        });

        let descriptor = ObjectDescriptor {
            type_name,
            kind: self.kind,
            selection: self.selection,
            members: self.info,
        };
        Ok(Processor::new(Shape::Object { reference }, encode, decode).with_object(descriptor))
    }
}
