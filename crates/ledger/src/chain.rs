use chrono::{DateTime, Utc};
use conviction_core::{Actor, AuditEvent, EntityType, EventType, GENESIS_HASH};
use conviction_ports::LedgerStore;
use log::{debug, error};
use serde_json::Value;

use crate::error::LedgerResult;
use crate::hash::{compute_event_hash, recompute_hash};

/// Why a chain failed verification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorruptionKind {
    /// First event does not point at the genesis sentinel
    BadRoot,
    /// Stored hash does not match the recomputed hash (tampering)
    HashMismatch,
    /// `previous_hash` does not match the prior event (reorder/deletion/fork)
    BrokenLink,
    /// Sequence numbers are not contiguous from zero
    SequenceGap,
}

/// Result of walking the chain from the root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainStatus {
    Valid,
    /// First offending event and what is wrong with it
    Corrupted { index: usize, kind: CorruptionKind },
}

impl ChainStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, ChainStatus::Valid)
    }
}

/// The hash-chained audit ledger.
///
/// Owns the chain tip: each appended event's `previous_hash` is the current
/// tip's hash (or the genesis sentinel for the first event). The tip only
/// advances after the store accepts the row, so a storage failure leaves no
/// trace - callers roll their own state back and nothing is partially
/// visible.
pub struct Ledger<S: LedgerStore> {
    store: S,
    tip_hash: String,
    next_sequence: u64,
}

impl<S: LedgerStore> Ledger<S> {
    /// Wrap a store, recovering the tip from any rows already in it.
    pub fn new(store: S) -> LedgerResult<Self> {
        let rows = store.load()?;
        let (tip_hash, next_sequence) = match rows.last() {
            Some(last) => (last.event_hash.clone(), last.sequence + 1),
            None => (GENESIS_HASH.to_string(), 0),
        };
        Ok(Self {
            store,
            tip_hash,
            next_sequence,
        })
    }

    /// Append one event to the chain.
    ///
    /// This is the atomic unit of durability: the caller's mutation is
    /// committed if and only if this returns `Ok`.
    #[allow(clippy::too_many_arguments)]
    pub fn append(
        &mut self,
        timestamp: DateTime<Utc>,
        event_type: EventType,
        entity_type: EntityType,
        entity_id: &str,
        actor: Actor,
        action: &str,
        before_state: Option<Value>,
        after_state: Value,
    ) -> LedgerResult<AuditEvent> {
        let event_hash = compute_event_hash(
            event_type,
            entity_type,
            entity_id,
            actor,
            action,
            before_state.as_ref(),
            &after_state,
            &self.tip_hash,
        );
        let event = AuditEvent {
            sequence: self.next_sequence,
            timestamp,
            event_type,
            entity_type,
            entity_id: entity_id.to_string(),
            actor,
            action: action.to_string(),
            before_state,
            after_state,
            event_hash: event_hash.clone(),
            previous_hash: self.tip_hash.clone(),
        };

        if let Err(e) = self.store.append(&event) {
            error!(
                "[LEDGER] append rejected at seq {}: {}",
                event.sequence, e
            );
            return Err(e.into());
        }

        debug!(
            "[LEDGER] seq {} {:?} {}/{} by {}",
            event.sequence,
            event.event_type,
            entity_id,
            action,
            actor.as_str()
        );
        self.tip_hash = event_hash;
        self.next_sequence += 1;
        Ok(event)
    }

    /// Hash of the most recently committed event
    pub fn tip_hash(&self) -> &str {
        &self.tip_hash
    }

    /// Number of committed events
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// All committed events in append order
    pub fn events(&self) -> LedgerResult<Vec<AuditEvent>> {
        Ok(self.store.load()?)
    }

    /// Verify the stored chain from the root.
    pub fn verify(&self) -> LedgerResult<ChainStatus> {
        Ok(Self::verify_events(&self.store.load()?))
    }

    /// Walk a sequence of events, recomputing each hash and checking the
    /// linkage. The first mismatch is reported with its position; an empty
    /// chain is trivially valid. Corruption is never repaired here.
    pub fn verify_events(events: &[AuditEvent]) -> ChainStatus {
        let mut expected_previous = GENESIS_HASH.to_string();
        for (index, event) in events.iter().enumerate() {
            if event.sequence != index as u64 {
                return ChainStatus::Corrupted {
                    index,
                    kind: CorruptionKind::SequenceGap,
                };
            }
            if event.previous_hash != expected_previous {
                let kind = if index == 0 {
                    CorruptionKind::BadRoot
                } else {
                    CorruptionKind::BrokenLink
                };
                return ChainStatus::Corrupted { index, kind };
            }
            if recompute_hash(event) != event.event_hash {
                return ChainStatus::Corrupted {
                    index,
                    kind: CorruptionKind::HashMismatch,
                };
            }
            expected_previous = event.event_hash.clone();
        }
        ChainStatus::Valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryLedgerStore;
    use conviction_ports::{StoreError, StoreResult};
    use serde_json::json;
    use uuid::Uuid;

    fn test_ledger() -> Ledger<MemoryLedgerStore> {
        Ledger::new(MemoryLedgerStore::new()).unwrap()
    }

    fn append_n(ledger: &mut Ledger<MemoryLedgerStore>, n: usize) {
        for i in 0..n {
            ledger
                .append(
                    Utc::now(),
                    EventType::SignalCreated,
                    EntityType::Signal,
                    &Uuid::new_v4().to_string(),
                    Actor::System,
                    "create",
                    None,
                    json!({"seq": i, "status": "Active"}),
                )
                .unwrap();
        }
    }

    #[test]
    fn test_empty_chain_is_valid() {
        let ledger = test_ledger();
        assert_eq!(ledger.verify().unwrap(), ChainStatus::Valid);
        assert!(ledger.is_empty());
        assert_eq!(ledger.tip_hash(), GENESIS_HASH);
    }

    #[test]
    fn test_chain_links_from_genesis() {
        let mut ledger = test_ledger();
        append_n(&mut ledger, 3);

        let events = ledger.events().unwrap();
        assert!(events[0].is_root());
        assert_eq!(events[1].previous_hash, events[0].event_hash);
        assert_eq!(events[2].previous_hash, events[1].event_hash);
        assert_eq!(ledger.tip_hash(), events[2].event_hash);
        assert_eq!(ledger.verify().unwrap(), ChainStatus::Valid);
    }

    #[test]
    fn test_tampered_snapshot_detected_at_its_index() {
        let mut ledger = test_ledger();
        append_n(&mut ledger, 5);

        let mut events = ledger.events().unwrap();
        events[2].after_state = json!({"seq": 2, "status": "Consumed"});

        assert_eq!(
            Ledger::<MemoryLedgerStore>::verify_events(&events),
            ChainStatus::Corrupted {
                index: 2,
                kind: CorruptionKind::HashMismatch
            }
        );

        // Recomputing the tampered row's hash just moves the break: the next
        // row still points at the original hash, so the linkage is broken.
        events[2].event_hash = recompute_hash(&events[2]);
        assert_eq!(
            Ledger::<MemoryLedgerStore>::verify_events(&events),
            ChainStatus::Corrupted {
                index: 3,
                kind: CorruptionKind::BrokenLink
            }
        );
    }

    #[test]
    fn test_deleted_row_breaks_linkage() {
        let mut ledger = test_ledger();
        append_n(&mut ledger, 4);

        let mut events = ledger.events().unwrap();
        events.remove(1);

        // Sequence check trips first at the hole
        assert_eq!(
            Ledger::<MemoryLedgerStore>::verify_events(&events),
            ChainStatus::Corrupted {
                index: 1,
                kind: CorruptionKind::SequenceGap
            }
        );
    }

    #[test]
    fn test_reordered_rows_detected() {
        let mut ledger = test_ledger();
        append_n(&mut ledger, 4);

        let mut events = ledger.events().unwrap();
        events.swap(1, 2);

        assert_eq!(
            Ledger::<MemoryLedgerStore>::verify_events(&events),
            ChainStatus::Corrupted {
                index: 1,
                kind: CorruptionKind::SequenceGap
            }
        );
    }

    #[test]
    fn test_bad_root_detected() {
        let mut ledger = test_ledger();
        append_n(&mut ledger, 2);

        let mut events = ledger.events().unwrap();
        events[0].previous_hash =
            "1111111111111111111111111111111111111111111111111111111111111111".to_string();

        assert_eq!(
            Ledger::<MemoryLedgerStore>::verify_events(&events),
            ChainStatus::Corrupted {
                index: 0,
                kind: CorruptionKind::BadRoot
            }
        );
    }

    #[test]
    fn test_tip_recovered_from_existing_rows() {
        let mut ledger = test_ledger();
        append_n(&mut ledger, 3);
        let tip = ledger.tip_hash().to_string();

        let store = ledger.store;
        let reopened = Ledger::new(store).unwrap();
        assert_eq!(reopened.tip_hash(), tip);
        assert_eq!(reopened.next_sequence, 3);
    }

    /// Store that rejects appends on demand
    struct FailingStore {
        inner: MemoryLedgerStore,
        fail: bool,
    }

    impl LedgerStore for FailingStore {
        fn append(&mut self, event: &AuditEvent) -> StoreResult<()> {
            if self.fail {
                return Err(StoreError::AppendRejected("disk full".to_string()));
            }
            self.inner.append(event)
        }

        fn load(&self) -> StoreResult<Vec<AuditEvent>> {
            self.inner.load()
        }

        fn len(&self) -> usize {
            self.inner.len()
        }
    }

    #[test]
    fn test_failed_append_leaves_tip_unchanged() {
        let store = FailingStore {
            inner: MemoryLedgerStore::new(),
            fail: false,
        };
        let mut ledger = Ledger::new(store).unwrap();
        ledger
            .append(
                Utc::now(),
                EventType::SignalCreated,
                EntityType::Signal,
                "sig-1",
                Actor::System,
                "create",
                None,
                json!({"status": "Active"}),
            )
            .unwrap();
        let tip_before = ledger.tip_hash().to_string();

        ledger.store.fail = true;
        let result = ledger.append(
            Utc::now(),
            EventType::SignalExpired,
            EntityType::Signal,
            "sig-1",
            Actor::Sweep,
            "expire",
            None,
            json!({"status": "Expired"}),
        );

        assert!(matches!(result, Err(crate::LedgerError::AppendFailed(_))));
        assert_eq!(ledger.tip_hash(), tip_before);
        assert_eq!(ledger.len(), 1);

        // Chain still verifies and the next successful append links cleanly
        ledger.store.fail = false;
        ledger
            .append(
                Utc::now(),
                EventType::SignalExpired,
                EntityType::Signal,
                "sig-1",
                Actor::Sweep,
                "expire",
                None,
                json!({"status": "Expired"}),
            )
            .unwrap();
        assert_eq!(ledger.verify().unwrap(), ChainStatus::Valid);
    }
}
