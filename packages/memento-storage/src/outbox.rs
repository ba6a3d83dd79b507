use rusqlite::{OptionalExtension, params};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::{
	Result,
	cache::{NoteCache, format_ts, parse_id, parse_ts},
	models::{OutboxEntry, OutboxOp, STATUS_DEAD, STATUS_FAILED, STATUS_PENDING},
};

const MAX_OUTBOX_ERROR_CHARS: usize = 1_024;

const SELECT_COLUMNS: &str = "\
outbox_id, bucket, note_id, op, status, attempts, last_error, available_at, created_at, updated_at";

impl NoteCache {
	/// Queue a remote write for background delivery. The newest enqueue for a
	/// note supersedes any older pending entry for the same note.
	pub fn enqueue_outbox(
		&self,
		bucket: &str,
		note_id: Uuid,
		op: OutboxOp,
		now: OffsetDateTime,
	) -> Result<()> {
		let ts = format_ts(now)?;

		self.with_conn(|conn| {
			conn.execute(
				"\
DELETE FROM remote_outbox
WHERE bucket = ?1 AND note_id = ?2 AND status IN ('PENDING', 'FAILED')",
				params![bucket, note_id.to_string()],
			)?;
			conn.execute(
				"\
INSERT INTO remote_outbox (outbox_id, bucket, note_id, op, status, attempts, available_at, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4, 'PENDING', 0, ?5, ?5, ?5)",
				params![Uuid::new_v4().to_string(), bucket, note_id.to_string(), op.as_str(), ts],
			)?;

			Ok(())
		})
	}

	/// Claim the next due entry, leasing it so a concurrent drain pass does
	/// not pick it up again before the claim resolves.
	pub fn next_due_outbox(
		&self,
		now: OffsetDateTime,
		lease: Duration,
	) -> Result<Option<OutboxEntry>> {
		let now_ts = format_ts(now)?;
		let lease_until = format_ts(now + lease)?;

		self.with_conn(|conn| {
			let row = conn
				.query_row(
					&format!(
						"\
SELECT {SELECT_COLUMNS}
FROM remote_outbox
WHERE status IN ('PENDING', 'FAILED') AND available_at <= ?1
ORDER BY available_at ASC
LIMIT 1"
					),
					params![now_ts],
					map_entry_row,
				)
				.optional()?;
			let Some(raw) = row else {
				return Ok(None);
			};
			let mut entry = decode_entry(raw)?;

			conn.execute(
				"UPDATE remote_outbox SET available_at = ?1, updated_at = ?2 WHERE outbox_id = ?3",
				params![lease_until, now_ts, entry.outbox_id.to_string()],
			)?;

			entry.available_at = now + lease;
			entry.updated_at = now;

			Ok(Some(entry))
		})
	}

	pub fn mark_outbox_done(&self, outbox_id: Uuid) -> Result<()> {
		self.with_conn(|conn| {
			conn.execute(
				"DELETE FROM remote_outbox WHERE outbox_id = ?1",
				params![outbox_id.to_string()],
			)?;

			Ok(())
		})
	}

	/// Record a failed delivery. Retryable failures back off exponentially;
	/// once `max_attempts` is reached the entry becomes a dead letter and is
	/// never retried.
	pub fn mark_outbox_failed(
		&self,
		entry: &OutboxEntry,
		error: &str,
		policy: &memento_config::SyncPolicy,
		now: OffsetDateTime,
	) -> Result<bool> {
		let next_attempts = entry.attempts.saturating_add(1);
		let dead = next_attempts >= i64::from(policy.max_attempts);
		let status = if dead { STATUS_DEAD } else { STATUS_FAILED };
		let available_at = if dead {
			now
		} else {
			now + backoff_for_attempt(next_attempts, policy.base_backoff_ms, policy.max_backoff_ms)
		};
		let error = truncate_error(error);

		self.with_conn(|conn| {
			conn.execute(
				"\
UPDATE remote_outbox
SET status = ?1, attempts = ?2, last_error = ?3, available_at = ?4, updated_at = ?5
WHERE outbox_id = ?6",
				params![
					status,
					next_attempts,
					error,
					format_ts(available_at)?,
					format_ts(now)?,
					entry.outbox_id.to_string(),
				],
			)?;

			Ok(dead)
		})
	}

	/// Entries that exhausted their retries. This is the dead-letter log.
	pub fn dead_letters(&self) -> Result<Vec<OutboxEntry>> {
		self.select_entries(STATUS_DEAD)
	}

	pub fn pending_outbox(&self) -> Result<Vec<OutboxEntry>> {
		let mut entries = self.select_entries(STATUS_PENDING)?;

		entries.extend(self.select_entries(STATUS_FAILED)?);

		Ok(entries)
	}

	fn select_entries(&self, status: &str) -> Result<Vec<OutboxEntry>> {
		self.with_conn(|conn| {
			let mut stmt = conn.prepare(&format!(
				"\
SELECT {SELECT_COLUMNS}
FROM remote_outbox
WHERE status = ?1
ORDER BY available_at ASC"
			))?;
			let rows = stmt.query_map(params![status], map_entry_row)?;
			let mut entries = Vec::new();

			for row in rows {
				entries.push(decode_entry(row?)?);
			}

			Ok(entries)
		})
	}
}

pub fn backoff_for_attempt(attempt: i64, base_ms: i64, max_ms: i64) -> Duration {
	let attempts = attempt.max(1) as u32;
	let exp = attempts.saturating_sub(1).min(12);
	let backoff = base_ms.saturating_mul(1_i64 << exp).min(max_ms);

	Duration::milliseconds(backoff)
}

type RawEntry =
	(String, String, String, String, String, i64, Option<String>, String, String, String);

fn map_entry_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawEntry> {
	Ok((
		row.get(0)?,
		row.get(1)?,
		row.get(2)?,
		row.get(3)?,
		row.get(4)?,
		row.get(5)?,
		row.get(6)?,
		row.get(7)?,
		row.get(8)?,
		row.get(9)?,
	))
}

fn decode_entry(raw: RawEntry) -> Result<OutboxEntry> {
	let (outbox_id, bucket, note_id, op, status, attempts, last_error, available_at, created_at, updated_at) =
		raw;

	Ok(OutboxEntry {
		outbox_id: parse_id(&outbox_id)?,
		bucket,
		note_id: parse_id(&note_id)?,
		op: OutboxOp::parse(&op)?,
		status,
		attempts,
		last_error,
		available_at: parse_ts(&available_at)?,
		created_at: parse_ts(&created_at)?,
		updated_at: parse_ts(&updated_at)?,
	})
}

fn truncate_error(error: &str) -> String {
	let mut out = error.to_string();

	if out.chars().count() > MAX_OUTBOX_ERROR_CHARS {
		out = out.chars().take(MAX_OUTBOX_ERROR_CHARS).collect();
		out.push_str("...");
	}

	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn backoff_doubles_and_caps() {
		assert_eq!(backoff_for_attempt(1, 500, 30_000), Duration::milliseconds(500));
		assert_eq!(backoff_for_attempt(2, 500, 30_000), Duration::milliseconds(1_000));
		assert_eq!(backoff_for_attempt(3, 500, 30_000), Duration::milliseconds(2_000));
		assert_eq!(backoff_for_attempt(10, 500, 30_000), Duration::milliseconds(30_000));
	}
}
