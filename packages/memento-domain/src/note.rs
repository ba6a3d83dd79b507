use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	User,
	Assistant,
}

/// A citation attached to an assistant note: which note was retrieved as
/// context and how similar it scored.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct KnowledgeRef {
	pub id: Uuid,
	pub similarity: f32,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Note {
	pub id: Uuid,
	pub content: String,
	pub role: Role,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
	#[serde(with = "crate::time_serde")]
	pub last_updated: OffsetDateTime,
	/// Present only in transit to the remote store; stripped before the note
	/// is written to the local cache.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub embedding: Option<Vec<f32>>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub knowledge_base: Vec<KnowledgeRef>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub file_paths: Vec<String>,
	#[serde(default)]
	pub hide: bool,
	#[serde(default)]
	pub is_deleted: bool,
}
impl Note {
	pub fn new(role: Role, content: impl Into<String>, now: OffsetDateTime) -> Self {
		Self {
			id: Uuid::new_v4(),
			content: content.into(),
			role,
			created_at: now,
			last_updated: now,
			embedding: None,
			knowledge_base: Vec::new(),
			file_paths: Vec::new(),
			hide: false,
			is_deleted: false,
		}
	}

	pub fn visible(&self) -> bool {
		!self.hide && !self.is_deleted
	}

	/// Advance `last_updated` for a content mutation. The timestamp must move
	/// strictly forward even if the wall clock did not.
	pub fn touch(&mut self, now: OffsetDateTime) {
		self.last_updated = advance(self.last_updated, now);
	}

	pub fn without_embedding(&self) -> Self {
		let mut stored = self.clone();

		stored.embedding = None;

		stored
	}
}

pub fn advance(prev: OffsetDateTime, now: OffsetDateTime) -> OffsetDateTime {
	if now > prev { now } else { prev + Duration::milliseconds(1) }
}
