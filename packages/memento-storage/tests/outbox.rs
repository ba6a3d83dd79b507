use time::{Duration, macros::datetime};
use uuid::Uuid;

use memento_config::SyncPolicy;
use memento_domain::GUEST_USER;
use memento_storage::{cache::NoteCache, models::OutboxOp};
use memento_testkit::TestCache;

fn policy() -> SyncPolicy {
	SyncPolicy { interval_secs: 300, max_attempts: 3, base_backoff_ms: 500, max_backoff_ms: 30_000 }
}

#[test]
fn claim_leases_the_entry() {
	let fixture = TestCache::new().expect("temp cache");
	let cache = NoteCache::open(fixture.path()).expect("open cache");
	let now = datetime!(2024-06-01 12:00:00 UTC);

	cache.enqueue_outbox(GUEST_USER, Uuid::new_v4(), OutboxOp::Upsert, now).expect("enqueue");

	let entry = cache
		.next_due_outbox(now, Duration::seconds(30))
		.expect("claim")
		.expect("entry due");

	assert_eq!(entry.op, OutboxOp::Upsert);
	// Leased: a second claim at the same instant finds nothing due.
	assert!(cache.next_due_outbox(now, Duration::seconds(30)).expect("claim").is_none());
	// After the lease expires the entry is due again.
	let later = now + Duration::seconds(31);
	assert!(cache.next_due_outbox(later, Duration::seconds(30)).expect("claim").is_some());
}

#[test]
fn newest_enqueue_supersedes_pending_entries() {
	let fixture = TestCache::new().expect("temp cache");
	let cache = NoteCache::open(fixture.path()).expect("open cache");
	let now = datetime!(2024-06-01 12:00:00 UTC);
	let note_id = Uuid::new_v4();

	cache.enqueue_outbox(GUEST_USER, note_id, OutboxOp::Upsert, now).expect("enqueue");
	cache.enqueue_outbox(GUEST_USER, note_id, OutboxOp::Delete, now).expect("enqueue");

	let pending = cache.pending_outbox().expect("pending");

	assert_eq!(pending.len(), 1);
	assert_eq!(pending[0].op, OutboxOp::Delete);
}

#[test]
fn done_entries_are_removed() {
	let fixture = TestCache::new().expect("temp cache");
	let cache = NoteCache::open(fixture.path()).expect("open cache");
	let now = datetime!(2024-06-01 12:00:00 UTC);

	cache.enqueue_outbox(GUEST_USER, Uuid::new_v4(), OutboxOp::Upsert, now).expect("enqueue");

	let entry = cache
		.next_due_outbox(now, Duration::seconds(30))
		.expect("claim")
		.expect("entry due");

	cache.mark_outbox_done(entry.outbox_id).expect("done");

	assert!(cache.pending_outbox().expect("pending").is_empty());
}

#[test]
fn failures_back_off_then_dead_letter() {
	let fixture = TestCache::new().expect("temp cache");
	let cache = NoteCache::open(fixture.path()).expect("open cache");
	let policy = policy();
	let mut now = datetime!(2024-06-01 12:00:00 UTC);

	cache.enqueue_outbox(GUEST_USER, Uuid::new_v4(), OutboxOp::Upsert, now).expect("enqueue");

	for attempt in 1..=3_i64 {
		let entry = cache
			.next_due_outbox(now, Duration::seconds(30))
			.expect("claim")
			.expect("entry due");
		let dead = cache
			.mark_outbox_failed(&entry, "connection refused", &policy, now)
			.expect("mark failed");

		assert_eq!(dead, attempt >= 3);

		// Move past whatever backoff was applied.
		now += Duration::minutes(5);
	}

	assert!(cache.next_due_outbox(now, Duration::seconds(30)).expect("claim").is_none());

	let dead = cache.dead_letters().expect("dead letters");

	assert_eq!(dead.len(), 1);
	assert_eq!(dead[0].attempts, 3);
	assert_eq!(dead[0].last_error.as_deref(), Some("connection refused"));
}
