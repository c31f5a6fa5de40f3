#![warn(missing_docs)]
//! Deterministic test surfaces for headless ticket-manager runs.

use anyhow::Result;
use chunkpin_core::{ChunkPos, Tick};
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// One ticket lifecycle transition captured during a headless run.
#[derive(Debug, Serialize)]
pub struct TicketEvent<'a> {
    /// Simulation tick when the transition occurred.
    pub tick: Tick,
    /// Transition label ("register", "renew", "release", "expired").
    pub kind: &'a str,
    /// Chunk coordinates [x, z] the ticket is anchored at.
    pub chunk: [i32; 2],
    /// Keep-alive level of the affected ticket.
    pub level: i32,
}

impl<'a> TicketEvent<'a> {
    /// Build an event for the given transition.
    pub fn new(tick: Tick, kind: &'a str, chunk: ChunkPos, level: i32) -> Self {
        Self {
            tick,
            kind,
            chunk: [chunk.x, chunk.z],
            level,
        }
    }
}

/// A sink that writes newline-delimited JSON to disk, creating parent
/// directories if needed.
pub struct JsonlSink {
    file: File,
}

impl JsonlSink {
    /// Create a new sink at `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(Self {
            file: File::create(path)?,
        })
    }

    /// Append an event to the log.
    pub fn write(&mut self, event: &TicketEvent<'_>) -> Result<()> {
        let line = serde_json::to_string(event)?;
        self.file.write_all(line.as_bytes())?;
        self.file.write_all(b"\n")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn sink_writes_one_event_per_line() {
        let path = std::env::temp_dir().join(format!(
            "ticket-events-{}.jsonl",
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        let mut sink = JsonlSink::create(&path).expect("sink create");
        sink.write(&TicketEvent::new(Tick(7), "register", ChunkPos::new(3, -4), 31))
            .expect("write succeeds");
        sink.write(&TicketEvent::new(Tick(12), "release", ChunkPos::new(3, -4), 31))
            .expect("write succeeds");

        let contents = fs::read_to_string(&path).expect("file readable");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"register\""));
        assert!(lines[1].contains("\"release\""));
        assert!(lines[0].contains("[3,-4]"));
    }
}
