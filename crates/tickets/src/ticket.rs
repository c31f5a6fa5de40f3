use std::sync::Arc;

use chunkpin_core::ChunkPos;

use crate::types::TicketType;

/// Identity of a registered ticket.
///
/// Allocated per manager, monotonically. Two registrations with identical
/// type, value and position still receive distinct ids, so handles behave
/// like reference identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TicketId(pub(crate) u64);

/// Handle to a keep-alive claim on a chunk.
///
/// The handle is a stable view of the immutable parts of the claim; the
/// mutable timestamp lives in the manager's table. All liveness queries go
/// through the manager (`is_valid`, `time_left`), which also resolves the
/// handle back to its stored payload.
#[derive(Debug, Clone)]
pub struct Ticket {
    pub(crate) id: TicketId,
    pub(crate) ty: Arc<TicketType>,
    pub(crate) chunk: ChunkPos,
    pub(crate) level: i32,
}

impl Ticket {
    /// Ticket identity.
    pub fn id(&self) -> TicketId {
        self.id
    }

    /// The ticket's type.
    pub fn ticket_type(&self) -> &Arc<TicketType> {
        &self.ty
    }

    /// Chunk the ticket was registered under.
    pub fn chunk(&self) -> ChunkPos {
        self.chunk
    }

    /// Derived keep-alive level (smaller is higher priority).
    pub fn level(&self) -> i32 {
        self.level
    }
}
