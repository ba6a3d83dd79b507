use serde::{Deserialize, Serialize};

use memento_domain::note::{Note, Role};

use crate::{AddNoteRequest, ChatRequest, Error, MementoService, Result};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SubmitRequest {
	pub input: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SubmitResponse {
	pub notes: Vec<Note>,
}

impl MementoService {
	/// Input dispatch: a leading space marks a chat query (the question is
	/// still kept as a user note); anything else is a plain note.
	pub async fn submit(&self, req: SubmitRequest) -> Result<SubmitResponse> {
		if req.input.trim().is_empty() {
			return Err(Error::InvalidRequest { message: "Input must be non-empty.".to_string() });
		}

		if req.input.starts_with(' ') {
			let query = req.input.trim().to_string();
			let question = self
				.add_note(AddNoteRequest {
					content: query.clone(),
					role: Some(Role::User),
					file_paths: Vec::new(),
				})?
				.note;
			let answer = self.chat(ChatRequest { input: query }).await?.note;

			return Ok(SubmitResponse { notes: vec![question, answer] });
		}

		let note = self
			.add_note(AddNoteRequest {
				content: req.input,
				role: Some(Role::User),
				file_paths: Vec::new(),
			})?
			.note;

		Ok(SubmitResponse { notes: vec![note] })
	}
}
