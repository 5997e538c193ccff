//! Event hashing for audit-chain integrity.
//!
//! The hash covers the before/after snapshots, the event identity fields and
//! the previous event's hash. Canonical form is the `serde_json` string of a
//! payload object - `serde_json`'s default map is ordered, so key order is
//! stable no matter how the payload was assembled.

use conviction_core::{Actor, AuditEvent, EntityType, EventType};
use serde_json::{Value, json};
use sha2::{Digest, Sha256};

/// Hash the fields an event is committed to.
#[allow(clippy::too_many_arguments)]
pub fn compute_event_hash(
    event_type: EventType,
    entity_type: EntityType,
    entity_id: &str,
    actor: Actor,
    action: &str,
    before_state: Option<&Value>,
    after_state: &Value,
    previous_hash: &str,
) -> String {
    let payload = json!({
        "before": before_state,
        "after": after_state,
        "event_type": event_type,
        "entity_type": entity_type,
        "entity_id": entity_id,
        "actor": actor,
        "action": action,
        "previous_hash": previous_hash,
    });
    let canonical = payload.to_string();
    hex::encode(Sha256::digest(canonical.as_bytes()))
}

/// Recompute a stored event's hash from its recorded fields.
pub fn recompute_hash(event: &AuditEvent) -> String {
    compute_event_hash(
        event.event_type,
        event.entity_type,
        &event.entity_id,
        event.actor,
        &event.action,
        event.before_state.as_ref(),
        &event.after_state,
        &event.previous_hash,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use conviction_core::GENESIS_HASH;

    #[test]
    fn test_hash_is_deterministic() {
        let after = json!({"status": "Active", "symbol": "ACME"});
        let first = compute_event_hash(
            EventType::SignalCreated,
            EntityType::Signal,
            "abc",
            Actor::System,
            "create",
            None,
            &after,
            GENESIS_HASH,
        );
        let second = compute_event_hash(
            EventType::SignalCreated,
            EntityType::Signal,
            "abc",
            Actor::System,
            "create",
            None,
            &after,
            GENESIS_HASH,
        );

        assert_eq!(first, second);
        // hex-encoded SHA-256
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn test_hash_depends_on_every_field() {
        let after = json!({"status": "Active"});
        let base = compute_event_hash(
            EventType::SignalCreated,
            EntityType::Signal,
            "abc",
            Actor::System,
            "create",
            None,
            &after,
            GENESIS_HASH,
        );

        let other_after = json!({"status": "Consumed"});
        let changed_after = compute_event_hash(
            EventType::SignalCreated,
            EntityType::Signal,
            "abc",
            Actor::System,
            "create",
            None,
            &other_after,
            GENESIS_HASH,
        );
        assert_ne!(base, changed_after);

        let changed_actor = compute_event_hash(
            EventType::SignalCreated,
            EntityType::Signal,
            "abc",
            Actor::Override,
            "create",
            None,
            &after,
            GENESIS_HASH,
        );
        assert_ne!(base, changed_actor);

        let changed_link = compute_event_hash(
            EventType::SignalCreated,
            EntityType::Signal,
            "abc",
            Actor::System,
            "create",
            None,
            &after,
            "1111111111111111111111111111111111111111111111111111111111111111",
        );
        assert_ne!(base, changed_link);
    }
}
