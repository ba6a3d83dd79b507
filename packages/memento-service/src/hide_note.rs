use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use memento_domain::{command::Command, note::Note};
use memento_storage::models::OutboxOp;

use crate::{Error, MementoService, Result};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct HideNoteRequest {
	pub id: Uuid,
	pub hide: bool,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct HideNoteResponse {
	pub note: Note,
}

impl MementoService {
	pub fn hide_note(&self, req: HideNoteRequest) -> Result<HideNoteResponse> {
		let now = OffsetDateTime::now_utc();
		let mut note = {
			let session = self.lock_session();

			session
				.get(req.id)
				.cloned()
				.ok_or_else(|| Error::NotFound { message: format!("Note {} not found.", req.id) })?
		};

		note.hide = req.hide;
		note.touch(now);

		self.lock_session().apply(Command::HideNote {
			id: note.id,
			hide: note.hide,
			last_updated: note.last_updated,
		});
		self.cache.upsert_note(self.bucket(), &note)?;
		self.cache.enqueue_outbox(self.bucket(), note.id, OutboxOp::Upsert, now)?;

		Ok(HideNoteResponse { note })
	}
}
