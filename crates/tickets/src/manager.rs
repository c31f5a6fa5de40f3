//! The ticket manager: registration, renewal, expiry checks and release.

use std::sync::Arc;

use chunkpin_core::{ChunkPos, Tick};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::TicketError;
use crate::table::{TicketRecord, TicketTable};
use crate::ticket::{Ticket, TicketId};
use crate::types::{TicketType, TicketTypeRegistry, TicketValue};

/// Highest keep-alive level a ticket can carry. Levels are derived as
/// `MAX_TICKET_LEVEL - radius`, so a smaller radius yields a stronger
/// (lower-numbered) claim. The chunk loading collaborator's propagation
/// depends on this exact encoding.
pub const MAX_TICKET_LEVEL: i32 = 33;

/// Which ticket types the validity predicate covers.
///
/// Two historical versions of the manager disagreed on this: one reported
/// only the distinguished pinning family as valid, the other treated all
/// types uniformly. The policy is injected at construction instead of
/// hard-coding either behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidityPolicy {
    /// Only types registered with `pinning = true` can report valid.
    #[default]
    PinnedOnly,
    /// All registered types are eligible.
    AllTypes,
}

/// Orchestrates the ticket table against a monotonically advancing tick
/// counter.
///
/// Single-threaded by design: the manager is driven by the simulation tick,
/// and `advance` runs strictly before any of that tick's mutations. The
/// table and counter are owned exclusively; collaborators observe them only
/// through the query methods here.
#[derive(Debug)]
pub struct TicketManager {
    registry: TicketTypeRegistry,
    policy: ValidityPolicy,
    table: TicketTable,
    now: Tick,
    next_id: u64,
}

impl TicketManager {
    /// Create a manager over the given type catalog and validity policy.
    pub fn new(registry: TicketTypeRegistry, policy: ValidityPolicy) -> Self {
        Self {
            registry,
            policy,
            table: TicketTable::default(),
            now: Tick::ZERO,
            next_id: 0,
        }
    }

    /// The type catalog this manager resolves names against.
    pub fn registry(&self) -> &TicketTypeRegistry {
        &self.registry
    }

    /// Current tick.
    pub fn now(&self) -> Tick {
        self.now
    }

    /// Advance the tick counter by one. Called once per simulation tick by
    /// the external scheduler.
    pub fn advance(&mut self) {
        self.now = self.now.advance(1);
    }

    /// Register a keep-alive claim on `chunk`.
    ///
    /// The payload is converted through the type's converter and stamped
    /// with the current tick. `radius` must be at least 1; the derived level
    /// is `MAX_TICKET_LEVEL - radius`.
    pub fn request_ticket(
        &mut self,
        type_name: &str,
        chunk: ChunkPos,
        value: TicketValue,
        radius: i32,
    ) -> Result<Ticket, TicketError> {
        if radius < 1 {
            return Err(TicketError::InvalidRadius(radius));
        }
        let ty = self
            .registry
            .lookup(type_name)
            .ok_or_else(|| TicketError::UnknownType(type_name.to_string()))?;

        let id = TicketId(self.next_id);
        self.next_id += 1;
        let level = MAX_TICKET_LEVEL - radius;
        self.table.insert(
            chunk.pack(),
            TicketRecord {
                id,
                ty: Arc::clone(&ty),
                value: ty.value_converter().internal(value),
                level,
                timestamp: self.now,
            },
        );
        debug!(ty = ty.name(), %chunk, level, tick = %self.now, "registered chunk ticket");

        Ok(Ticket {
            id,
            ty,
            chunk,
            level,
        })
    }

    /// Whether `ticket` is still live: present in the table at its recorded
    /// chunk, eligible under the validity policy, and not timed out.
    ///
    /// Pure query; repeated calls without intervening ticks or mutations
    /// return the same answer.
    pub fn is_valid(&self, ticket: &Ticket) -> bool {
        match self.table.get(ticket.chunk.pack(), ticket.id) {
            Some(record) => {
                policy_allows(self.policy, &record.ty) && !timed_out(self.now, record)
            }
            None => false,
        }
    }

    /// Ticks remaining before `ticket` expires, zero if it is already
    /// invalid. A valid ticket of an unbounded-lifetime type reports
    /// `u64::MAX`.
    pub fn time_left(&self, ticket: &Ticket) -> u64 {
        let Some(record) = self.table.get(ticket.chunk.pack(), ticket.id) else {
            return 0;
        };
        if !policy_allows(self.policy, &record.ty) || timed_out(self.now, record) {
            return 0;
        }
        match record.ty.lifetime() {
            0 => u64::MAX,
            lifetime => lifetime - self.now.since(record.timestamp),
        }
    }

    /// Reset a live ticket's clock to the current tick. Returns false (and
    /// inserts nothing) if the ticket is stale, expired, or ineligible.
    pub fn renew_ticket(&mut self, ticket: &Ticket) -> bool {
        let now = self.now;
        let policy = self.policy;
        let Some(record) = self.table.get_mut(ticket.chunk.pack(), ticket.id) else {
            return false;
        };
        if !policy_allows(policy, &record.ty) || timed_out(now, record) {
            return false;
        }
        record.timestamp = now;
        true
    }

    /// Remove a live ticket from its recorded chunk's set. Returns false if
    /// the ticket is already gone or no longer valid; releasing twice is a
    /// no-op, not an error.
    pub fn release_ticket(&mut self, ticket: &Ticket) -> bool {
        if !self.is_valid(ticket) {
            return false;
        }
        let removed = self.table.remove(ticket.chunk.pack(), ticket.id);
        if removed {
            debug!(ty = ticket.ty.name(), chunk = %ticket.chunk, tick = %self.now, "released chunk ticket");
        }
        removed
    }

    /// All currently-held tickets of the named type, expiry state ignored.
    /// Linear scan; diagnostic path, not hot.
    pub fn tickets_of(&self, type_name: &str) -> Vec<Ticket> {
        self.table
            .iter()
            .filter(|(_, record)| record.ty.name() == type_name)
            .map(|(chunk, record)| Ticket {
                id: record.id,
                ty: Arc::clone(&record.ty),
                chunk,
                level: record.level,
            })
            .collect()
    }

    /// Resolve a ticket back to its payload in the caller-facing form.
    /// Returns `None` for a released ticket.
    pub fn ticket_value(&self, ticket: &Ticket) -> Option<TicketValue> {
        self.table
            .get(ticket.chunk.pack(), ticket.id)
            .map(|record| record.ty.value_converter().external(record.value))
    }

    /// Occupancy view for the chunk loading collaborator: every chunk with
    /// at least one ticket, with its strongest (lowest) level.
    pub fn chunk_levels(&self) -> impl Iterator<Item = (ChunkPos, i32)> + '_ {
        self.table.chunk_levels()
    }

    /// Total number of held tickets, including expired ones awaiting
    /// cleanup.
    pub fn ticket_count(&self) -> usize {
        self.table.len()
    }

    /// Drop every timed-out record from the table, whatever its type.
    /// Expiry stays lazy otherwise; this runs only when explicitly invoked.
    /// Returns the number of records removed.
    pub fn purge_expired(&mut self) -> usize {
        let now = self.now;
        let removed = self.table.retain(|record| !timed_out(now, record));
        if removed > 0 {
            debug!(removed, tick = %now, "purged expired chunk tickets");
        }
        removed
    }
}

fn policy_allows(policy: ValidityPolicy, ty: &TicketType) -> bool {
    match policy {
        ValidityPolicy::PinnedOnly => ty.is_pinning(),
        ValidityPolicy::AllTypes => true,
    }
}

fn timed_out(now: Tick, record: &TicketRecord) -> bool {
    let lifetime = record.ty.lifetime();
    lifetime != 0 && now.since(record.timestamp) >= lifetime
}
