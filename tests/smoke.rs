use chunkpin_core::ChunkPos;
use chunkpin_testkit::{JsonlSink, TicketEvent};
use chunkpin_tickets::{
    TicketManager, TicketType, TicketTypeRegistry, TicketValue, ValidityPolicy,
    MAX_TICKET_LEVEL,
};

#[test]
fn keepalive_lifecycle_end_to_end() {
    let mut registry = TicketTypeRegistry::new();
    registry
        .register(TicketType::new("keepalive", 300).pinning(true))
        .expect("fresh registry");
    let mut manager = TicketManager::new(registry, ValidityPolicy::PinnedOnly);

    let mut sink = JsonlSink::create(std::env::temp_dir().join("chunkpin-smoke.jsonl"))
        .expect("can create temp log");

    let chunk = ChunkPos::new(12, -3);
    let ticket = manager
        .request_ticket("keepalive", chunk, TicketValue::Token(1), 2)
        .expect("valid request");
    assert_eq!(ticket.level(), MAX_TICKET_LEVEL - 2);
    sink.write(&TicketEvent::new(manager.now(), "register", chunk, ticket.level()))
        .expect("can write event");

    // Keep the chunk pinned across two lifetimes by renewing once.
    for _ in 0..299 {
        manager.advance();
    }
    assert!(manager.is_valid(&ticket));
    assert!(manager.renew_ticket(&ticket));
    for _ in 0..299 {
        manager.advance();
    }
    assert!(manager.is_valid(&ticket));
    assert_eq!(manager.time_left(&ticket), 1);
    assert_eq!(manager.chunk_levels().count(), 1);

    assert!(manager.release_ticket(&ticket));
    sink.write(&TicketEvent::new(manager.now(), "release", chunk, ticket.level()))
        .expect("can write event");
    assert!(!manager.is_valid(&ticket));
    assert_eq!(manager.ticket_count(), 0);
}
