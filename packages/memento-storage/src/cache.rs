use std::{fs, path::Path, sync::Mutex};

use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use uuid::Uuid;

use memento_domain::{note::Note, reminder::Reminder};

use crate::{Result, schema};

/// Embedded per-user note cache. Buckets are user ids (or the guest
/// sentinel); each bucket holds the full JSON payload of its notes with the
/// embedding stripped. Writes are keyed per note id, matching the storage
/// layer's natural atomicity.
pub struct NoteCache {
	conn: Mutex<Connection>,
}
impl NoteCache {
	pub fn open(path: &Path) -> Result<Self> {
		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent)?;
		}

		let conn = Connection::open_with_flags(
			path,
			OpenFlags::SQLITE_OPEN_CREATE
				| OpenFlags::SQLITE_OPEN_READ_WRITE
				| OpenFlags::SQLITE_OPEN_FULL_MUTEX,
		)?;

		conn.pragma_update(None, "journal_mode", &"WAL")?;
		conn.pragma_update(None, "synchronous", &"NORMAL")?;
		conn.execute_batch(schema::render_schema())?;

		Ok(Self { conn: Mutex::new(conn) })
	}

	pub(crate) fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
		let conn = self.conn.lock().unwrap_or_else(|err| err.into_inner());

		f(&conn)
	}

	pub fn notes(&self, bucket: &str) -> Result<Vec<Note>> {
		self.with_conn(|conn| {
			let mut stmt = conn.prepare(
				"SELECT payload FROM notes WHERE bucket = ?1 ORDER BY last_updated ASC, note_id ASC",
			)?;
			let rows = stmt.query_map(params![bucket], |row| row.get::<_, String>(0))?;
			let mut notes = Vec::new();

			for payload in rows {
				notes.push(serde_json::from_str(&payload?)?);
			}

			Ok(notes)
		})
	}

	pub fn get_note(&self, bucket: &str, id: Uuid) -> Result<Option<Note>> {
		self.with_conn(|conn| {
			let payload = conn
				.query_row(
					"SELECT payload FROM notes WHERE bucket = ?1 AND note_id = ?2",
					params![bucket, id.to_string()],
					|row| row.get::<_, String>(0),
				)
				.optional()?;

			payload.map(|payload| Ok(serde_json::from_str(&payload)?)).transpose()
		})
	}

	/// Upsert keyed by (bucket, id). The embedding is stripped before the
	/// payload is stored; the cache never holds vectors.
	pub fn upsert_note(&self, bucket: &str, note: &Note) -> Result<()> {
		let stored = note.without_embedding();
		let payload = serde_json::to_string(&stored)?;
		let last_updated = format_ts(stored.last_updated)?;

		self.with_conn(|conn| {
			conn.execute(
				"\
INSERT INTO notes (bucket, note_id, payload, last_updated)
VALUES (?1, ?2, ?3, ?4)
ON CONFLICT (bucket, note_id)
DO UPDATE SET payload = excluded.payload, last_updated = excluded.last_updated",
				params![bucket, stored.id.to_string(), payload, last_updated],
			)?;

			Ok(())
		})
	}

	pub fn delete_note(&self, bucket: &str, id: Uuid) -> Result<()> {
		self.with_conn(|conn| {
			conn.execute(
				"DELETE FROM notes WHERE bucket = ?1 AND note_id = ?2",
				params![bucket, id.to_string()],
			)?;

			Ok(())
		})
	}

	pub fn insert_reminder(&self, reminder: &Reminder) -> Result<()> {
		let remind_at = format_ts(reminder.remind_at)?;

		self.with_conn(|conn| {
			conn.execute(
				"\
INSERT INTO reminders (reminder_id, title, message, remind_at, fired)
VALUES (?1, ?2, ?3, ?4, ?5)",
				params![
					reminder.id.to_string(),
					reminder.title,
					reminder.message,
					remind_at,
					reminder.fired,
				],
			)?;

			Ok(())
		})
	}

	pub fn reminders(&self) -> Result<Vec<Reminder>> {
		self.select_reminders("SELECT reminder_id, title, message, remind_at, fired FROM reminders ORDER BY remind_at ASC", None)
	}

	pub fn due_reminders(&self, now: OffsetDateTime) -> Result<Vec<Reminder>> {
		self.select_reminders(
			"\
SELECT reminder_id, title, message, remind_at, fired
FROM reminders
WHERE fired = 0 AND remind_at <= ?1
ORDER BY remind_at ASC",
			Some(format_ts(now)?),
		)
	}

	pub fn mark_reminder_fired(&self, id: Uuid) -> Result<()> {
		self.with_conn(|conn| {
			conn.execute(
				"UPDATE reminders SET fired = 1 WHERE reminder_id = ?1",
				params![id.to_string()],
			)?;

			Ok(())
		})
	}

	fn select_reminders(&self, sql: &str, due_bound: Option<String>) -> Result<Vec<Reminder>> {
		self.with_conn(|conn| {
			let mut stmt = conn.prepare(sql)?;
			let map_row = |row: &rusqlite::Row<'_>| {
				Ok((
					row.get::<_, String>(0)?,
					row.get::<_, String>(1)?,
					row.get::<_, String>(2)?,
					row.get::<_, String>(3)?,
					row.get::<_, bool>(4)?,
				))
			};
			let rows = match &due_bound {
				Some(bound) => stmt.query_map(params![bound], map_row)?,
				None => stmt.query_map([], map_row)?,
			};
			let mut reminders = Vec::new();

			for row in rows {
				let (id, title, message, remind_at, fired) = row?;

				reminders.push(Reminder {
					id: parse_id(&id)?,
					title,
					message,
					remind_at: parse_ts(&remind_at)?,
					fired,
				});
			}

			Ok(reminders)
		})
	}
}

pub(crate) fn format_ts(ts: OffsetDateTime) -> Result<String> {
	Ok(ts.format(&Rfc3339)?)
}

pub(crate) fn parse_ts(raw: &str) -> Result<OffsetDateTime> {
	Ok(OffsetDateTime::parse(raw, &Rfc3339)?)
}

pub(crate) fn parse_id(raw: &str) -> Result<Uuid> {
	Uuid::parse_str(raw)
		.map_err(|err| crate::Error::InvalidArgument(format!("Invalid stored id {raw}: {err}.")))
}
