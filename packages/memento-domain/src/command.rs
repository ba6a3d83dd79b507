use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::note::{KnowledgeRef, Note};

/// The closed set of state transitions a note view supports. Each variant
/// carries exactly the fields its transition needs; the timestamp for a
/// mutation is fixed by the caller so applying a command is deterministic.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
	AddNote {
		note: Note,
	},
	UpdateNote {
		id: Uuid,
		content: String,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		knowledge_base: Option<Vec<KnowledgeRef>>,
		#[serde(with = "crate::time_serde")]
		last_updated: OffsetDateTime,
	},
	DeleteNote {
		id: Uuid,
	},
	HideNote {
		id: Uuid,
		hide: bool,
		#[serde(with = "crate::time_serde")]
		last_updated: OffsetDateTime,
	},
	SetNotes {
		notes: Vec<Note>,
	},
}
