//! Ticket types and the type registry.
//!
//! A ticket type binds a symbolic name to a fixed lifetime and a value
//! converter. The catalog is populated once at startup (single writer) and
//! read-only afterwards.

use std::collections::HashMap;
use std::sync::Arc;

use chunkpin_core::{BlockPos, ChunkPos};

use crate::error::TicketError;

/// Opaque ticket payload. Semantics are owned by the ticket type; the
/// manager only stores and echoes it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketValue {
    /// A chunk coordinate.
    Chunk(ChunkPos),
    /// A block coordinate.
    Block(BlockPos),
    /// An opaque identifier (entity id, request token, ...).
    Token(u64),
}

/// Bidirectional mapping between a caller-facing payload and the form the
/// manager stores internally.
#[derive(Debug, Clone, Copy)]
pub struct ValueConverter {
    to_internal: fn(TicketValue) -> TicketValue,
    to_external: fn(TicketValue) -> TicketValue,
}

impl ValueConverter {
    /// Store payloads exactly as supplied.
    pub fn identity() -> Self {
        Self {
            to_internal: |value| value,
            to_external: |value| value,
        }
    }

    /// Canonicalize block payloads to their owning chunk; other payloads
    /// pass through. The external form is the canonical chunk itself.
    pub fn chunk_aligned() -> Self {
        Self {
            to_internal: |value| match value {
                TicketValue::Block(pos) => TicketValue::Chunk(pos.chunk()),
                other => other,
            },
            to_external: |value| value,
        }
    }

    /// Convert a caller-supplied payload to the stored form.
    pub fn internal(&self, value: TicketValue) -> TicketValue {
        (self.to_internal)(value)
    }

    /// Convert a stored payload back to the caller-facing form.
    pub fn external(&self, value: TicketValue) -> TicketValue {
        (self.to_external)(value)
    }
}

/// A named category of ticket with a fixed lifetime and value-conversion
/// rule. Immutable once registered.
#[derive(Debug)]
pub struct TicketType {
    name: String,
    lifetime: u64,
    pinning: bool,
    converter: ValueConverter,
}

impl TicketType {
    /// Define a type with the given name and lifetime in ticks.
    ///
    /// A lifetime of `0` means tickets of this type never time out (the
    /// behavior of force-loaded chunks). Defaults to a non-pinning type with
    /// the identity converter.
    pub fn new(name: impl Into<String>, lifetime: u64) -> Self {
        Self {
            name: name.into(),
            lifetime,
            pinning: false,
            converter: ValueConverter::identity(),
        }
    }

    /// Mark this type as part of the distinguished pinning family consulted
    /// by [`crate::ValidityPolicy::PinnedOnly`].
    pub fn pinning(mut self, pinning: bool) -> Self {
        self.pinning = pinning;
        self
    }

    /// Replace the value converter.
    pub fn converter(mut self, converter: ValueConverter) -> Self {
        self.converter = converter;
        self
    }

    /// Symbolic type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lifetime in ticks; `0` means unbounded.
    pub fn lifetime(&self) -> u64 {
        self.lifetime
    }

    /// Whether this type belongs to the pinning family.
    pub fn is_pinning(&self) -> bool {
        self.pinning
    }

    /// The type's value converter.
    pub fn value_converter(&self) -> &ValueConverter {
        &self.converter
    }
}

/// Catalog of ticket types, keyed by name.
#[derive(Debug, Default)]
pub struct TicketTypeRegistry {
    types: HashMap<String, Arc<TicketType>>,
}

impl TicketTypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type definition, returning the shared handle.
    pub fn register(&mut self, ty: TicketType) -> Result<Arc<TicketType>, TicketError> {
        if self.types.contains_key(ty.name()) {
            return Err(TicketError::DuplicateType(ty.name().to_string()));
        }
        let ty = Arc::new(ty);
        self.types.insert(ty.name().to_string(), Arc::clone(&ty));
        Ok(ty)
    }

    /// Look up a type by name.
    pub fn lookup(&self, name: &str) -> Option<Arc<TicketType>> {
        self.types.get(name).cloned()
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
