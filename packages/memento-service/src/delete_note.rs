use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use memento_domain::command::Command;
use memento_storage::models::OutboxOp;

use crate::{Error, MementoService, Result};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DeleteNoteRequest {
	pub id: Uuid,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DeleteNoteResponse {
	pub id: Uuid,
}

impl MementoService {
	/// Remove the note from the view and the cache; the remote delete is
	/// queued like every other remote write.
	pub fn delete_note(&self, req: DeleteNoteRequest) -> Result<DeleteNoteResponse> {
		let now = OffsetDateTime::now_utc();

		{
			let session = self.lock_session();

			if session.get(req.id).is_none() {
				return Err(Error::NotFound { message: format!("Note {} not found.", req.id) });
			}
		}

		self.lock_session().apply(Command::DeleteNote { id: req.id });
		self.cache.delete_note(self.bucket(), req.id)?;
		self.cache.enqueue_outbox(self.bucket(), req.id, OutboxOp::Delete, now)?;

		Ok(DeleteNoteResponse { id: req.id })
	}
}
