//! Chunk ticket lifecycle management.
//!
//! A ticket is a keep-alive claim on a chunk: callers register a ticket to
//! keep a region resident, renew it to reset its clock, and release it when
//! done. Expiry is lazy — an expired ticket lingers in the table until a
//! caller observes it as invalid and releases it; nothing sweeps the table
//! in the background.

mod error;
mod manager;
mod table;
mod ticket;
mod types;

pub use error::TicketError;
pub use manager::{TicketManager, ValidityPolicy, MAX_TICKET_LEVEL};
pub use ticket::{Ticket, TicketId};
pub use types::{TicketType, TicketTypeRegistry, TicketValue, ValueConverter};
