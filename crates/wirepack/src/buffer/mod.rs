// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Buffer engine: pooled growable write buffer and bounds-checked read cursor.

pub mod cursor;
pub mod pool;
pub mod writer;

pub use cursor::ReadCursor;
pub use pool::{BufferPool, PoolStats};
pub use writer::{WriteBuffer, ABSENT_LENGTH};
