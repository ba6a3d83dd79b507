use uuid::Uuid;

use memento_domain::{command::Command, note::Note};

/// The single in-memory view of the note collection. Every mutation goes
/// through `apply`; UI surfaces read snapshots, never mutate directly.
#[derive(Debug, Default)]
pub struct Session {
	notes: Vec<Note>,
}
impl Session {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn notes(&self) -> &[Note] {
		&self.notes
	}

	pub fn get(&self, id: Uuid) -> Option<&Note> {
		self.notes.iter().find(|note| note.id == id)
	}

	pub fn apply(&mut self, command: Command) {
		match command {
			Command::AddNote { note } => self.notes.push(note),
			Command::UpdateNote { id, content, knowledge_base, last_updated } => {
				let Some(position) = self.notes.iter().position(|note| note.id == id) else {
					return;
				};
				let mut note = self.notes.remove(position);

				note.content = content;
				note.last_updated = last_updated;

				if let Some(knowledge_base) = knowledge_base {
					note.knowledge_base = knowledge_base;
				}

				// An updated note moves to the end of the view.
				self.notes.push(note);
			},
			Command::DeleteNote { id } => self.notes.retain(|note| note.id != id),
			Command::HideNote { id, hide, last_updated } => {
				if let Some(note) = self.notes.iter_mut().find(|note| note.id == id) {
					note.hide = hide;
					note.last_updated = last_updated;
				}
			},
			Command::SetNotes { mut notes } => {
				notes.sort_by(|a, b| a.last_updated.cmp(&b.last_updated));

				self.notes = notes;
			},
		}
	}
}
