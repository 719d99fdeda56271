//! Desk over the JSON file store: reopen round-trips and cross-handle locking.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, TimeZone, Utc};
use helpdesk_core::event::EventType;
use helpdesk_core::lock::StoreLock;
use helpdesk_core::{
    ChangeSet, Desk, DeskError, ErrorCode, JsonFilePersistence, ManualClock, MutationContext,
    NewTicket, Priority, SequentialIds, TicketId, UserId,
};
use serde_json::Value;
use tempfile::TempDir;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn store_in(dir: &Path) -> JsonFilePersistence {
    JsonFilePersistence::new(dir, StdDuration::from_millis(200))
}

fn open_at(dir: &Path, now: DateTime<Utc>) -> Desk {
    Desk::builder(store_in(dir))
        .clock(Arc::new(ManualClock::new(now)))
        .open()
        .expect("open desk")
}

fn project() -> TempDir {
    let tmp = TempDir::new().expect("tempdir");
    fs::create_dir_all(tmp.path().join(".helpdesk")).expect("mkdir");
    tmp
}

#[test]
fn reopen_restores_tickets_and_events() {
    let tmp = project();
    let dir = tmp.path().join(".helpdesk");

    let (id, events) = {
        let desk = Desk::builder(store_in(&dir))
            .clock(Arc::new(ManualClock::new(t0())))
            .ids(Arc::new(SequentialIds::new()))
            .open()
            .expect("open desk");
        let ticket = desk
            .create_ticket(
                NewTicket::new("Email bouncing", "alice")
                    .description("All mail to sales@ bounces")
                    .priority(Priority::Urgent)
                    .sla_hours(1.0),
            )
            .expect("create");
        desk.assign(&ticket.id, Some(UserId::new("bob")), Some(1), None)
            .expect("assign");
        desk.add_comment(&ticket.id, UserId::new("bob"), "checking MX records")
            .expect("comment");
        desk.tick(t0() + Duration::hours(2)).expect("tick");
        (ticket.id.clone(), desk.events_for(&ticket.id))
    };

    let reopened = open_at(&dir, t0() + Duration::hours(3));
    let ticket = reopened.ticket(&id).expect("ticket survives reopen");
    assert_eq!(ticket.version, 2);
    assert_eq!(ticket.priority, Priority::Urgent);
    assert_eq!(ticket.assignee_id, Some(UserId::new("bob")));
    assert!(ticket.is_breached);
    assert_eq!(ticket.latest_comment(), Some("checking MX records"));
    assert_eq!(reopened.events_for(&id), events);

    // The breach episode is not reported twice across processes.
    assert!(reopened.tick_now().expect("tick").is_empty());
}

#[test]
fn second_handle_sees_first_handles_version() {
    let tmp = project();
    let dir = tmp.path().join(".helpdesk");

    let first = open_at(&dir, t0());
    let ticket = first
        .create_ticket(NewTicket::new("Shared", "alice"))
        .expect("create");
    first
        .apply(
            &ticket.id,
            ChangeSet::default().priority(Priority::High),
            Some(1),
            &MutationContext::by("alice"),
        )
        .expect("apply");

    let second = open_at(&dir, t0());
    let err = second
        .apply(
            &ticket.id,
            ChangeSet::touch(),
            Some(1),
            &MutationContext::by("bob"),
        )
        .expect_err("stale from disk");
    assert_eq!(err.current_version(), Some(2));
}

#[test]
fn stale_handle_conflicts_instead_of_overwriting() {
    let tmp = project();
    let dir = tmp.path().join(".helpdesk");
    let ticket = open_at(&dir, t0())
        .create_ticket(NewTicket::new("Shared", "alice"))
        .expect("create");

    // Both handles load version 1 before either writes.
    let first = open_at(&dir, t0());
    let second = open_at(&dir, t0());

    let applied = first
        .apply(
            &ticket.id,
            ChangeSet::default().priority(Priority::Urgent),
            Some(1),
            &MutationContext::by("alice"),
        )
        .expect("first writer");
    assert_eq!(applied.new_version, 2);

    let err = second
        .apply(
            &ticket.id,
            ChangeSet::default().title("other"),
            Some(1),
            &MutationContext::by("bob"),
        )
        .expect_err("second writer is stale");
    assert!(matches!(
        err,
        DeskError::Conflict {
            expected_version: 1,
            current_version: 2,
            ..
        }
    ));

    let reopened = open_at(&dir, t0());
    let stored = reopened.ticket(&ticket.id).expect("ticket");
    assert_eq!(stored.version, 2);
    assert_eq!(stored.priority, Priority::Urgent);
    assert_eq!(stored.title, "Shared");
    let types: Vec<_> = reopened
        .events_for(&ticket.id)
        .into_iter()
        .map(|e| e.event_type)
        .collect();
    assert_eq!(types, vec![EventType::Created, EventType::Updated]);
}

#[test]
fn tick_keeps_writes_made_after_the_watcher_opened() {
    let tmp = project();
    let dir = tmp.path().join(".helpdesk");
    let watcher = open_at(&dir, t0());

    let writer = open_at(&dir, t0());
    let ticket = writer
        .create_ticket(NewTicket::new("Late arrival", "alice").sla_hours(1.0))
        .expect("create");
    writer
        .apply(
            &ticket.id,
            ChangeSet::default().priority(Priority::High),
            Some(1),
            &MutationContext::by("alice"),
        )
        .expect("apply");

    let breached = watcher.tick(t0() + Duration::hours(2)).expect("tick");
    assert_eq!(breached.len(), 1);
    assert_eq!(breached[0].ticket_id, ticket.id);

    let reopened = open_at(&dir, t0() + Duration::hours(2));
    let stored = reopened.ticket(&ticket.id).expect("ticket");
    assert_eq!(stored.version, 2);
    assert_eq!(stored.priority, Priority::High);
    assert!(stored.is_breached);
    let types: Vec<_> = reopened
        .events_for(&ticket.id)
        .into_iter()
        .map(|e| e.event_type)
        .collect();
    assert_eq!(
        types,
        vec![EventType::Created, EventType::Updated, EventType::SlaBreached]
    );
}

#[test]
fn held_lock_times_out_writes() {
    let tmp = project();
    let dir = tmp.path().join(".helpdesk");
    let desk = open_at(&dir, t0());

    let store = store_in(&dir);
    let guard = StoreLock::acquire(&store.lock_path(), StdDuration::from_secs(1)).expect("lock");

    let err = desk
        .create_ticket(NewTicket::new("Blocked", "alice"))
        .expect_err("lock held");
    assert!(matches!(err, DeskError::Persistence(_)));
    assert_eq!(err.code(), ErrorCode::LockContention);
    assert_eq!(desk.summary().total, 0);

    guard.release();
    desk.create_ticket(NewTicket::new("Unblocked", "alice"))
        .expect("create after release");
}

#[test]
fn corrupt_store_refuses_to_open() {
    let tmp = project();
    let dir = tmp.path().join(".helpdesk");
    fs::write(dir.join("store.json"), "{ not json").expect("write");

    let err = Desk::builder(store_in(&dir)).open().expect_err("corrupt");
    assert_eq!(err.code(), ErrorCode::CorruptStore);
}

#[test]
fn out_of_range_sla_in_store_refuses_to_open() {
    let tmp = project();
    let dir = tmp.path().join(".helpdesk");
    open_at(&dir, t0())
        .create_ticket(NewTicket::new("Hand edited", "alice"))
        .expect("create");
    let path = dir.join("store.json");
    let original: Value =
        serde_json::from_str(&fs::read_to_string(&path).expect("read")).expect("json");

    for bad in [Value::from(1e30), Value::from(-4.0), Value::from(0.0)] {
        let mut edited = original.clone();
        edited["tickets"][0]["sla_hours"] = bad.clone();
        fs::write(&path, serde_json::to_vec(&edited).expect("encode")).expect("write");

        let err = Desk::builder(store_in(&dir))
            .open()
            .expect_err("invalid sla_hours must not open");
        assert_eq!(err.code(), ErrorCode::CorruptStore, "sla_hours = {bad}");
        assert!(err.to_string().contains("sla_hours"), "{err}");
    }
}

#[test]
fn unknown_ticket_stays_not_found_after_reopen() {
    let tmp = project();
    let dir = tmp.path().join(".helpdesk");
    let desk = open_at(&dir, t0());
    let err = desk.ticket(&TicketId::new("hd-zzzzzz")).expect_err("missing");
    assert_eq!(err.code(), ErrorCode::TicketNotFound);
}
