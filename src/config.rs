use chunkpin_tickets::{TicketError, TicketType, TicketTypeRegistry, ValidityPolicy, ValueConverter};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::warn;

const DEFAULT_CONFIG_PATH: &str = "config/chunkpin.toml";

/// Driver configuration: validity policy, ticket type catalog and scenario
/// knobs.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PinConfig {
    /// Which ticket types the validity predicate covers.
    pub validity: ValidityPolicy,
    /// Ticks the scripted scenario runs for.
    pub ticks: u64,
    /// Seed for scattering scripted ticket positions.
    pub seed: u64,
    /// Optional JSONL event log path.
    pub event_log: Option<PathBuf>,
    /// Ticket type catalog registered at startup.
    pub types: Vec<TypeEntry>,
}

/// One catalog entry.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TypeEntry {
    pub name: String,
    /// Lifetime in ticks; 0 means tickets of this type never time out.
    pub lifetime: u64,
    #[serde(default)]
    pub pinning: bool,
    #[serde(default)]
    pub converter: ConverterKind,
}

/// Which built-in value converter a catalog entry uses.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConverterKind {
    #[default]
    Identity,
    ChunkAligned,
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            validity: ValidityPolicy::PinnedOnly,
            ticks: 1200,
            seed: 0x4c_4f_41_44, // "LOAD"
            event_log: None,
            types: vec![
                TypeEntry {
                    name: "keepalive".into(),
                    lifetime: 300,
                    pinning: true,
                    converter: ConverterKind::Identity,
                },
                TypeEntry {
                    name: "forced".into(),
                    lifetime: 0,
                    pinning: true,
                    converter: ConverterKind::Identity,
                },
                TypeEntry {
                    name: "portal".into(),
                    lifetime: 120,
                    pinning: false,
                    converter: ConverterKind::ChunkAligned,
                },
            ],
        }
    }
}

impl PinConfig {
    /// Load configuration from the default path.
    pub fn load() -> Self {
        Self::load_from_path(Path::new(DEFAULT_CONFIG_PATH))
    }

    /// Load configuration from `path`, falling back to defaults if the file
    /// is missing or malformed.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => config,
                Err(err) => {
                    warn!("failed to parse {}: {err}; using defaults", path.display());
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Build the ticket type registry declared by the catalog.
    pub fn registry(&self) -> Result<TicketTypeRegistry, TicketError> {
        let mut registry = TicketTypeRegistry::new();
        for entry in &self.types {
            let converter = match entry.converter {
                ConverterKind::Identity => ValueConverter::identity(),
                ConverterKind::ChunkAligned => ValueConverter::chunk_aligned(),
            };
            registry.register(
                TicketType::new(entry.name.clone(), entry.lifetime)
                    .pinning(entry.pinning)
                    .converter(converter),
            )?;
        }
        Ok(registry)
    }
}
