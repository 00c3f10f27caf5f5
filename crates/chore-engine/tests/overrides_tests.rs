//! Tests for the override ledger and its persisted encoding.

use chore_engine::{ChoreError, DateOffset, LedgerStore, OverrideEncoding, OverrideLedger};
use chrono::NaiveDate;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn encoding(add: Option<&str>, remove: Option<&str>, offset: Option<&str>) -> OverrideEncoding {
    OverrideEncoding {
        add_dates: add.map(str::to_string),
        remove_dates: remove.map(str::to_string),
        offset_dates: offset.map(str::to_string),
    }
}

// ── Offsets ─────────────────────────────────────────────────────────────────

#[test]
fn offset_token_parses_signed_delta() {
    let offset = DateOffset::parse("2024-01-04:-2").unwrap();
    assert_eq!(offset.date, date(2024, 1, 4));
    assert_eq!(offset.days, -2);
    assert_eq!(offset.encode(), "2024-01-04:-2");
}

#[test]
fn offset_token_without_delta_is_rejected() {
    assert!(matches!(
        DateOffset::parse("2024-01-04"),
        Err(ChoreError::Parse { .. })
    ));
    assert!(DateOffset::parse("2024-01-04:soon").is_err());
}

// ── Apply ───────────────────────────────────────────────────────────────────

#[test]
fn removed_candidate_is_suppressed() {
    let mut ledger = OverrideLedger::new();
    ledger.remove(date(2024, 1, 4));
    assert_eq!(ledger.apply(date(2024, 1, 4)), None);
    assert_eq!(ledger.apply(date(2024, 1, 7)), Some(date(2024, 1, 7)));
}

#[test]
fn offset_candidate_is_shifted() {
    let mut ledger = OverrideLedger::new();
    ledger.offset(date(2024, 1, 4), 3);
    assert_eq!(ledger.apply(date(2024, 1, 4)), Some(date(2024, 1, 7)));
    // A later offset for the same date replaces the earlier one.
    ledger.offset(date(2024, 1, 4), -1);
    assert_eq!(ledger.apply(date(2024, 1, 4)), Some(date(2024, 1, 3)));
}

#[test]
fn add_and_remove_report_duplicates() {
    let mut ledger = OverrideLedger::new();
    assert!(ledger.add(date(2024, 2, 1)));
    assert!(!ledger.add(date(2024, 2, 1)));
    assert!(ledger.remove(date(2024, 2, 2)));
    assert!(!ledger.remove(date(2024, 2, 2)));
    assert_eq!(ledger.added().count(), 1);
}

// ── Prune ───────────────────────────────────────────────────────────────────

#[test]
fn prune_drops_entries_before_boundary_only() {
    let mut ledger = OverrideLedger::new();
    ledger.add(date(2024, 1, 1));
    ledger.add(date(2024, 1, 10));
    ledger.remove(date(2024, 1, 2));
    ledger.offset(date(2024, 1, 3), 1);
    ledger.offset(date(2024, 1, 5), 1);

    let dropped = ledger.prune(date(2024, 1, 5));
    assert_eq!(dropped, 3);
    assert_eq!(ledger.added().collect::<Vec<_>>(), vec![date(2024, 1, 10)]);
    assert_eq!(ledger.removed().count(), 0);
    assert_eq!(
        ledger.offsets().collect::<Vec<_>>(),
        vec![DateOffset {
            date: date(2024, 1, 5),
            days: 1
        }]
    );
    // Pruning again at the same boundary is a no-op.
    assert_eq!(ledger.prune(date(2024, 1, 5)), 0);
}

// ── Encoding ────────────────────────────────────────────────────────────────

#[test]
fn strict_decode_fails_on_malformed_token() {
    let enc = encoding(Some("2024-01-05 garbage"), None, None);
    assert!(matches!(enc.decode(), Err(ChoreError::Parse { .. })));
}

#[test]
fn pruned_decode_drops_stale_and_unparsable_tokens() {
    let enc = encoding(
        Some("2024-01-01 garbage 2024-02-01"),
        Some("2023-12-31 2024-01-20"),
        Some("2024-01-02:3 2024-01-25:x 2024-01-30:-1"),
    );
    let ledger = enc.decode_pruned(date(2024, 1, 10));
    assert_eq!(ledger.added().collect::<Vec<_>>(), vec![date(2024, 2, 1)]);
    assert_eq!(ledger.removed().collect::<Vec<_>>(), vec![date(2024, 1, 20)]);
    assert_eq!(
        ledger.offsets().collect::<Vec<_>>(),
        vec![DateOffset {
            date: date(2024, 1, 30),
            days: -1
        }]
    );
}

#[test]
fn encode_is_sorted_and_omits_empty_lists() {
    let mut ledger = OverrideLedger::new();
    ledger.add(date(2024, 3, 1));
    ledger.add(date(2024, 1, 1));
    ledger.offset(date(2024, 2, 1), 2);

    let enc = ledger.encode();
    assert_eq!(enc.add_dates.as_deref(), Some("2024-01-01 2024-03-01"));
    assert_eq!(enc.remove_dates, None);
    assert_eq!(enc.offset_dates.as_deref(), Some("2024-02-01:2"));
    assert_eq!(enc.decode().unwrap(), ledger);
}

#[test]
fn merge_prefers_incoming_offsets() {
    let mut ledger = OverrideLedger::new();
    ledger.offset(date(2024, 1, 4), 1);
    let mut other = OverrideLedger::new();
    other.offset(date(2024, 1, 4), 5);
    other.remove(date(2024, 1, 9));

    ledger.merge(other);
    assert_eq!(ledger.apply(date(2024, 1, 4)), Some(date(2024, 1, 9)));
    assert_eq!(ledger.apply(date(2024, 1, 9)), None);
}

// ── Shared store ────────────────────────────────────────────────────────────

#[test]
fn store_prunes_only_the_requested_entity() {
    let mut store = LedgerStore::new();
    store.ledger_mut("sensor.dishes").add(date(2024, 1, 1));
    store.ledger_mut("sensor.laundry").add(date(2024, 1, 1));

    assert_eq!(store.prune("sensor.dishes", date(2024, 6, 1)), 1);
    assert!(store.get("sensor.dishes").unwrap().is_empty());
    assert_eq!(store.get("sensor.laundry").unwrap().added().count(), 1);
    assert_eq!(store.prune("sensor.unknown", date(2024, 6, 1)), 0);
}
