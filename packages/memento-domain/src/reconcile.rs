use std::collections::HashMap;

use uuid::Uuid;

use crate::note::Note;

/// One-sided writes needed to make the local cache and the remote store
/// converge. `push` goes to the remote store, `pull` into the local cache.
#[derive(Debug, Default)]
pub struct SyncPlan {
	pub push: Vec<Note>,
	pub pull: Vec<Note>,
}
impl SyncPlan {
	pub fn is_empty(&self) -> bool {
		self.push.is_empty() && self.pull.is_empty()
	}
}

/// Compare two note collections by id and `last_updated` and plan the writes
/// that let the newer side win. Equal timestamps are treated as already
/// consistent; comparison is by timestamp, not content hash. Last-write-wins
/// on wall clocks loses data under clock skew across devices; kept for
/// compatibility with the stored format.
pub fn plan(local: &[Note], remote: &[Note]) -> SyncPlan {
	let remote_by_id: HashMap<Uuid, &Note> = remote.iter().map(|note| (note.id, note)).collect();
	let local_by_id: HashMap<Uuid, &Note> = local.iter().map(|note| (note.id, note)).collect();
	let mut plan = SyncPlan::default();

	for note in local {
		match remote_by_id.get(&note.id) {
			None => plan.push.push(note.clone()),
			Some(theirs) if note.last_updated > theirs.last_updated =>
				plan.push.push(note.clone()),
			Some(theirs) if note.last_updated < theirs.last_updated =>
				plan.pull.push((*theirs).clone()),
			Some(_) => {},
		}
	}

	for note in remote {
		if !local_by_id.contains_key(&note.id) {
			plan.pull.push(note.clone());
		}
	}

	plan
}
