//! The ticket table: packed chunk key -> ordered set of ticket records.

use std::collections::HashMap;
use std::sync::Arc;

use chunkpin_core::{ChunkPos, Tick};

use crate::ticket::TicketId;
use crate::types::{TicketType, TicketValue};

/// Stored state of one registered ticket.
#[derive(Debug, Clone)]
pub(crate) struct TicketRecord {
    pub id: TicketId,
    pub ty: Arc<TicketType>,
    /// Payload in the type's internal representation.
    pub value: TicketValue,
    pub level: i32,
    /// Tick of creation or last renewal.
    pub timestamp: Tick,
}

/// Mapping from packed chunk position to the tickets anchored at that chunk.
///
/// Each per-chunk set is kept ordered by `(level, id)` — type priority first,
/// insertion order as tie-breaker — and deduplicated by id. A record lives in
/// exactly one chunk's set. Removal drops empty sets, but every reader still
/// tolerates an empty set left behind by a lazier writer.
#[derive(Debug, Default)]
pub(crate) struct TicketTable {
    chunks: HashMap<u64, Vec<TicketRecord>>,
}

impl TicketTable {
    /// Insert a record under the given packed chunk key.
    pub fn insert(&mut self, key: u64, record: TicketRecord) {
        let set = self.chunks.entry(key).or_default();
        if set.iter().any(|existing| existing.id == record.id) {
            return;
        }
        let at = set
            .iter()
            .position(|existing| (existing.level, existing.id) > (record.level, record.id))
            .unwrap_or(set.len());
        set.insert(at, record);
    }

    /// Find a record by chunk key and id.
    pub fn get(&self, key: u64, id: TicketId) -> Option<&TicketRecord> {
        self.chunks
            .get(&key)
            .and_then(|set| set.iter().find(|record| record.id == id))
    }

    /// Mutable variant of [`TicketTable::get`].
    pub fn get_mut(&mut self, key: u64, id: TicketId) -> Option<&mut TicketRecord> {
        self.chunks
            .get_mut(&key)
            .and_then(|set| set.iter_mut().find(|record| record.id == id))
    }

    /// Remove a record, dropping the chunk's set if it becomes empty.
    /// Returns whether a record was actually removed.
    pub fn remove(&mut self, key: u64, id: TicketId) -> bool {
        let Some(set) = self.chunks.get_mut(&key) else {
            return false;
        };
        let Some(at) = set.iter().position(|record| record.id == id) else {
            return false;
        };
        set.remove(at);
        if set.is_empty() {
            self.chunks.remove(&key);
        }
        true
    }

    /// All records with the chunk they are anchored at.
    pub fn iter(&self) -> impl Iterator<Item = (ChunkPos, &TicketRecord)> {
        self.chunks.iter().flat_map(|(key, set)| {
            let chunk = ChunkPos::unpack(*key);
            set.iter().map(move |record| (chunk, record))
        })
    }

    /// Occupied chunks with their highest-priority (lowest) level.
    pub fn chunk_levels(&self) -> impl Iterator<Item = (ChunkPos, i32)> + '_ {
        self.chunks.iter().filter_map(|(key, set)| {
            // Sets are ordered by level; the head is the strongest claim.
            set.first()
                .map(|record| (ChunkPos::unpack(*key), record.level))
        })
    }

    /// Keep only records matching the predicate, dropping sets that become
    /// empty. Returns how many records were removed.
    pub fn retain(&mut self, mut keep: impl FnMut(&TicketRecord) -> bool) -> usize {
        let mut removed = 0;
        self.chunks.retain(|_, set| {
            set.retain(|record| {
                let kept = keep(record);
                if !kept {
                    removed += 1;
                }
                kept
            });
            !set.is_empty()
        });
        removed
    }

    /// Total record count across all chunks.
    pub fn len(&self) -> usize {
        self.chunks.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chunkpin_core::BlockPos;

    fn record(id: u64, level: i32) -> TicketRecord {
        TicketRecord {
            id: TicketId(id),
            ty: Arc::new(TicketType::new("test", 100)),
            value: TicketValue::Block(BlockPos::new(0, 0, 0)),
            level,
            timestamp: Tick::ZERO,
        }
    }

    #[test]
    fn sets_stay_ordered_by_level_then_id() {
        let key = ChunkPos::new(3, -2).pack();
        let mut table = TicketTable::default();
        table.insert(key, record(1, 31));
        table.insert(key, record(2, 29));
        table.insert(key, record(3, 31));

        let order: Vec<u64> = table.iter().map(|(_, r)| r.id.0).collect();
        assert_eq!(order, vec![2, 1, 3]);
    }

    #[test]
    fn insert_is_deduplicated_by_id() {
        let key = ChunkPos::new(0, 0).pack();
        let mut table = TicketTable::default();
        table.insert(key, record(7, 30));
        table.insert(key, record(7, 30));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn remove_drops_empty_sets() {
        let key = ChunkPos::new(1, 1).pack();
        let mut table = TicketTable::default();
        table.insert(key, record(1, 30));
        assert!(table.remove(key, TicketId(1)));
        assert!(!table.remove(key, TicketId(1)));
        assert_eq!(table.chunks.len(), 0);
        assert_eq!(table.chunk_levels().count(), 0);
    }

    #[test]
    fn readers_tolerate_lingering_empty_sets() {
        let key = ChunkPos::new(5, 5).pack();
        let mut table = TicketTable::default();
        table.chunks.insert(key, Vec::new());

        assert_eq!(table.len(), 0);
        assert!(table.get(key, TicketId(1)).is_none());
        assert_eq!(table.iter().count(), 0);
        assert_eq!(table.chunk_levels().count(), 0);
    }

    #[test]
    fn chunk_levels_reports_strongest_claim() {
        let key = ChunkPos::new(-4, 9).pack();
        let mut table = TicketTable::default();
        table.insert(key, record(1, 32));
        table.insert(key, record(2, 29));

        let levels: Vec<(ChunkPos, i32)> = table.chunk_levels().collect();
        assert_eq!(levels, vec![(ChunkPos::new(-4, 9), 29)]);
    }
}
