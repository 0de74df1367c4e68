use std::fmt;
use std::sync::Arc;

use bytes::{Bytes, BytesMut};

/// Immutable utf8 string backed by shared bytes.
///
/// Strings allocated through an `ArenaBuilder` point into the arena's
/// allocation, cloning only bumps a reference count.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArenaStr(Bytes);

impl ArenaStr {
    pub const fn from_static(s: &'static str) -> Self {
        ArenaStr(Bytes::from_static(s.as_bytes()))
    }

    pub fn as_str(&self) -> &str {
        // SAFETY: Every constructor takes a `str`, the bytes are always valid
        // utf8.
        unsafe { std::str::from_utf8_unchecked(&self.0) }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ArenaStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl fmt::Display for ArenaStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Copies the string into its own allocation.
impl From<&str> for ArenaStr {
    fn from(value: &str) -> Self {
        ArenaStr(Bytes::copy_from_slice(value.as_bytes()))
    }
}

impl From<String> for ArenaStr {
    fn from(value: String) -> Self {
        ArenaStr(Bytes::from(value.into_bytes()))
    }
}

/// Append-only staging area for variable length payloads.
///
/// Only a single builder writes to an arena. Once frozen, the arena is
/// read-only and shared by every column referencing it.
#[derive(Debug, Default)]
pub struct ArenaBuilder {
    buf: BytesMut,
    blobs: Vec<Bytes>,
}

impl ArenaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder with `cap` bytes preallocated.
    pub fn with_capacity(cap: usize) -> Self {
        ArenaBuilder {
            buf: BytesMut::with_capacity(cap),
            blobs: Vec::new(),
        }
    }

    /// Copy a string into the arena, returning a view into it.
    pub fn alloc_str(&mut self, s: &str) -> ArenaStr {
        self.buf.extend_from_slice(s.as_bytes());
        let blob = self.buf.split().freeze();
        self.blobs.push(blob.clone());
        ArenaStr(blob)
    }

    pub fn num_allocations(&self) -> usize {
        self.blobs.len()
    }

    pub fn freeze(self) -> Arc<Arena> {
        Arc::new(Arena { blobs: self.blobs })
    }
}

/// Frozen backing store for payloads referenced by columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Arena {
    blobs: Vec<Bytes>,
}

impl Arena {
    pub fn empty() -> Arc<Self> {
        Arc::new(Arena::default())
    }

    /// Create an arena keeping the allocations of both inputs alive.
    ///
    /// Blobs are shared, not copied.
    pub fn merge(a: &Arena, b: &Arena) -> Arc<Self> {
        let mut blobs = Vec::with_capacity(a.blobs.len() + b.blobs.len());
        blobs.extend(a.blobs.iter().cloned());
        blobs.extend(b.blobs.iter().cloned());
        Arc::new(Arena { blobs })
    }

    pub fn num_allocations(&self) -> usize {
        self.blobs.len()
    }
}
