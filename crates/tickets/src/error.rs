use thiserror::Error;

/// Errors emitted by ticket registration and the ticket type registry.
///
/// Only structural misuse surfaces here. A stale or expired ticket handed to
/// `renew`/`release`/`is_valid` is an expected steady-state occurrence and is
/// reported as a `false` return, never as an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TicketError {
    /// Keep-alive radius precondition was violated.
    #[error("ticket radius must be at least 1 (got {0})")]
    InvalidRadius(i32),
    /// A ticket type name was registered twice.
    #[error("ticket type `{0}` is already registered")]
    DuplicateType(String),
    /// An operation referenced a type name absent from the registry.
    #[error("ticket type `{0}` is not registered")]
    UnknownType(String),
}
