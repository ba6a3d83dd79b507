use serde::{Deserialize, Serialize};

use memento_domain::note::Note;

use crate::{MementoService, Result};

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ListNotesRequest {
	#[serde(default)]
	pub include_hidden: bool,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ListNotesResponse {
	pub notes: Vec<Note>,
}

impl MementoService {
	/// Snapshot of the note view, oldest first, hidden and deleted notes
	/// filtered unless asked for.
	pub fn list_notes(&self, req: ListNotesRequest) -> Result<ListNotesResponse> {
		let mut notes: Vec<Note> = {
			let session = self.lock_session();

			session
				.notes()
				.iter()
				.filter(|note| req.include_hidden || note.visible())
				.cloned()
				.collect()
		};

		notes.sort_by(|a, b| a.last_updated.cmp(&b.last_updated));

		Ok(ListNotesResponse { notes })
	}
}
