// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Errors raised while building processors and while encoding/decoding.
//!
//! Build-time failures (`UnsupportedType`) are reported by the registry the
//! first time a root type is requested. Everything else is a per-call failure
//! that aborts the current encode/decode and leaves the registry untouched.

use std::fmt;

/// Errors returned by the codec.
#[derive(Debug)]
pub enum CodecError {
    // ========================================================================
    // Build-time Errors
    // ========================================================================
    /// A type (or one of its members/elements) has no codec strategy.
    UnsupportedType {
        /// Offending type.
        type_name: &'static str,
        /// Dotted member path from the root type, when known.
        member: Option<String>,
        /// Why the classification failed.
        reason: &'static str,
    },

    // ========================================================================
    // Decode Errors
    // ========================================================================
    /// Decoding needed more bytes than the input holds.
    BufferUnderrun {
        offset: usize,
        needed: usize,
        available: usize,
    },
    /// A decoded count/length is negative (other than the `-1` sentinel) or
    /// cannot be represented.
    MalformedLength { offset: usize, length: i64 },
    /// The absent marker was decoded into a target that cannot be absent.
    UnexpectedAbsent { type_name: &'static str },
    /// String payload is not valid UTF-8.
    InvalidUtf8 { offset: usize },
    /// Bytes were read successfully but do not form a valid value.
    InvalidValue {
        type_name: &'static str,
        reason: String,
    },

    // ========================================================================
    // Encode Errors
    // ========================================================================
    /// The write buffer would have to grow beyond its maximum size.
    CapacityExceeded { requested: usize, max: usize },

    // ========================================================================
    // Other Errors
    // ========================================================================
    /// Sink or source I/O failure.
    Io(std::io::Error),
    /// Rejected configuration value.
    InvalidConfig(String),
}

impl CodecError {
    /// True for the truncated/corrupted-input class (`BufferUnderrun` and
    /// `MalformedLength`).
    pub fn is_underrun(&self) -> bool {
        matches!(
            self,
            CodecError::BufferUnderrun { .. } | CodecError::MalformedLength { .. }
        )
    }

    pub(crate) fn unsupported(type_name: &'static str, reason: &'static str) -> Self {
        CodecError::UnsupportedType {
            type_name,
            member: None,
            reason,
        }
    }

    pub(crate) fn invalid_value(type_name: &'static str, reason: impl Into<String>) -> Self {
        CodecError::InvalidValue {
            type_name,
            reason: reason.into(),
        }
    }

    /// Prefix the member path of an `UnsupportedType` with `member`.
    ///
    /// Other variants pass through unchanged.
    pub(crate) fn in_member(self, member: &str) -> Self {
        match self {
            CodecError::UnsupportedType {
                type_name,
                member: inner,
                reason,
            } => CodecError::UnsupportedType {
                type_name,
                member: Some(match inner {
                    Some(path) => format!("{member}.{path}"),
                    None => member.to_owned(),
                }),
                reason,
            },
            other => other,
        }
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::UnsupportedType {
                type_name,
                member: Some(path),
                reason,
            } => write!(
                f,
                "unsupported type `{}` at member `{}`: {}",
                type_name, path, reason
            ),
            CodecError::UnsupportedType {
                type_name,
                member: None,
                reason,
            } => write!(f, "unsupported type `{}`: {}", type_name, reason),
            CodecError::BufferUnderrun {
                offset,
                needed,
                available,
            } => write!(
                f,
                "buffer underrun at offset {}: need {} bytes, {} available",
                offset, needed, available
            ),
            CodecError::MalformedLength { offset, length } => {
                write!(f, "malformed length {} at offset {}", length, offset)
            }
            CodecError::UnexpectedAbsent { type_name } => {
                write!(f, "absent value decoded for non-optional `{}`", type_name)
            }
            CodecError::InvalidUtf8 { offset } => {
                write!(f, "invalid UTF-8 in string starting at offset {}", offset)
            }
            CodecError::InvalidValue { type_name, reason } => {
                write!(f, "invalid `{}` value: {}", type_name, reason)
            }
            CodecError::CapacityExceeded { requested, max } => write!(
                f,
                "write buffer capacity exceeded: {} bytes requested, max {}",
                requested, max
            ),
            CodecError::Io(e) => write!(f, "I/O error: {}", e),
            CodecError::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CodecError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CodecError {
    fn from(e: std::io::Error) -> Self {
        CodecError::Io(e)
    }
}

/// Convenient alias for codec results.
pub type Result<T> = core::result::Result<T, CodecError>;
