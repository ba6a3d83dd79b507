use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use memento_domain::note::{Note, Role};

use crate::{MementoService, Result, normalize_content};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AddNoteRequest {
	pub content: String,
	#[serde(default)]
	pub role: Option<Role>,
	#[serde(default)]
	pub file_paths: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AddNoteResponse {
	pub note: Note,
}

impl MementoService {
	/// Create a note with a fresh id and surface it immediately; the remote
	/// write is queued, never awaited here.
	pub fn add_note(&self, req: AddNoteRequest) -> Result<AddNoteResponse> {
		let now = OffsetDateTime::now_utc();
		let content = normalize_content(&req.content, &self.cfg)?;
		let mut note = Note::new(req.role.unwrap_or(Role::User), content, now);

		note.file_paths = req.file_paths;

		let note = self.insert_note(note, now)?;

		Ok(AddNoteResponse { note })
	}
}
