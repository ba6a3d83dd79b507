use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use memento_domain::note::{KnowledgeRef, Note, Role};
use memento_storage::remote::SearchHit;

use crate::{Error, MementoService, Result, SearchRequest};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ChatRequest {
	pub input: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ChatResponse {
	pub note: Note,
}

impl MementoService {
	/// Retrieval-augmented answer: search the remote store for relevant
	/// notes, hand them to the chat model as context, and record the answer
	/// as an assistant note citing the retrieved notes.
	pub async fn chat(&self, req: ChatRequest) -> Result<ChatResponse> {
		let input = req.input.trim();

		if input.is_empty() {
			return Err(Error::InvalidRequest {
				message: "Chat input must be non-empty.".to_string(),
			});
		}

		let search = self.search(SearchRequest { query: input.to_string() }).await?;
		let context = context_block(&search.hits);
		let answer =
			self.providers.chat.complete(&self.cfg.providers.chat, input, &context).await?;
		let now = OffsetDateTime::now_utc();
		let mut note = Note::new(Role::Assistant, answer, now);

		note.knowledge_base = search
			.hits
			.iter()
			.map(|hit| KnowledgeRef { id: hit.id, similarity: hit.similarity })
			.collect();

		let note = self.insert_note(note, now)?;

		Ok(ChatResponse { note })
	}
}

fn context_block(hits: &[SearchHit]) -> String {
	hits.iter()
		.map(|hit| {
			let date = hit
				.last_updated
				.format(&Rfc3339)
				.unwrap_or_else(|_| hit.last_updated.to_string());

			format!("{} (date: {date})", hit.content)
		})
		.collect::<Vec<_>>()
		.join("\n\n")
}
