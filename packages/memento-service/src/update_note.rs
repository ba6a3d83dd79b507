use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use memento_domain::{command::Command, note::Note};
use memento_storage::models::OutboxOp;

use crate::{Error, MementoService, Result, normalize_content};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct UpdateNoteRequest {
	pub id: Uuid,
	pub content: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct UpdateNoteResponse {
	pub note: Note,
}

impl MementoService {
	pub fn update_note(&self, req: UpdateNoteRequest) -> Result<UpdateNoteResponse> {
		let now = OffsetDateTime::now_utc();
		let content = normalize_content(&req.content, &self.cfg)?;
		let mut note = {
			let session = self.lock_session();

			session
				.get(req.id)
				.cloned()
				.ok_or_else(|| Error::NotFound { message: format!("Note {} not found.", req.id) })?
		};

		note.content = content;
		note.touch(now);

		self.lock_session().apply(Command::UpdateNote {
			id: note.id,
			content: note.content.clone(),
			knowledge_base: None,
			last_updated: note.last_updated,
		});
		self.cache.upsert_note(self.bucket(), &note)?;
		self.cache.enqueue_outbox(self.bucket(), note.id, OutboxOp::Upsert, now)?;

		Ok(UpdateNoteResponse { note })
	}
}
