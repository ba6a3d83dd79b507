use serde::{Deserialize, Serialize};

use memento_domain::{command::Command, reconcile};

use crate::{MementoService, Result};

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
pub struct SyncReport {
	pub pushed: u32,
	pub pulled: u32,
	pub failed: u32,
}

impl MementoService {
	/// Reconcile the local cache with the remote store: newer side wins per
	/// note id, one-sided records are copied over. Failures are isolated per
	/// note; one bad write never aborts the rest of the pass.
	pub async fn sync(&self) -> Result<SyncReport> {
		let remote_cfg = self.remote_cfg()?;
		let local = self.cache.notes(self.bucket())?;
		let remote_notes = self.providers.remote.list(remote_cfg).await?;
		let plan = reconcile::plan(&local, &remote_notes);
		let mut report = SyncReport::default();

		for note in plan.push {
			let note = self.embed_for_push(note).await;

			match self.providers.remote.upsert(remote_cfg, &note).await {
				Ok(()) => report.pushed += 1,
				Err(err) => {
					report.failed += 1;

					tracing::error!(error = %err, note_id = %note.id, "Sync push failed.");
				},
			}
		}

		for note in plan.pull {
			match self.cache.upsert_note(self.bucket(), &note) {
				Ok(()) => report.pulled += 1,
				Err(err) => {
					report.failed += 1;

					tracing::error!(error = %err, note_id = %note.id, "Sync pull failed.");
				},
			}
		}

		let merged = self.cache.notes(self.bucket())?;

		self.lock_session().apply(Command::SetNotes { notes: merged });

		Ok(report)
	}
}
