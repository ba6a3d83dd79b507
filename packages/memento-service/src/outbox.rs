use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use memento_config::Remote;
use memento_storage::models::{OutboxEntry, OutboxOp};

use crate::{MementoService, Result};

const CLAIM_LEASE_SECONDS: i64 = 30;

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
pub struct FlushReport {
	pub delivered: u32,
	pub failed: u32,
	pub dead: u32,
}

impl MementoService {
	/// Drain every due outbox entry once. Failed deliveries back off per the
	/// sync policy and become dead letters after the attempt budget.
	pub async fn flush_outbox(&self) -> Result<FlushReport> {
		let remote_cfg = self.remote_cfg()?;
		let mut report = FlushReport::default();

		loop {
			let now = OffsetDateTime::now_utc();
			let Some(entry) =
				self.cache.next_due_outbox(now, Duration::seconds(CLAIM_LEASE_SECONDS))?
			else {
				break;
			};

			match self.deliver(remote_cfg, &entry).await {
				Ok(()) => {
					self.cache.mark_outbox_done(entry.outbox_id)?;

					report.delivered += 1;
				},
				Err(err) => {
					let dead = self.cache.mark_outbox_failed(
						&entry,
						&err.to_string(),
						&self.cfg.sync,
						now,
					)?;

					if dead {
						report.dead += 1;

						tracing::error!(
							error = %err,
							note_id = %entry.note_id,
							attempts = entry.attempts + 1,
							"Outbox entry dead-lettered."
						);
					} else {
						report.failed += 1;

						tracing::error!(error = %err, note_id = %entry.note_id, "Outbox delivery failed.");
					}
				},
			}
		}

		Ok(report)
	}

	async fn deliver(&self, remote_cfg: &Remote, entry: &OutboxEntry) -> Result<()> {
		match entry.op {
			OutboxOp::Delete => self.providers.remote.delete(remote_cfg, entry.note_id).await,
			OutboxOp::Upsert => {
				let Some(note) = self.cache.get_note(&entry.bucket, entry.note_id)? else {
					// The note was deleted locally after this entry was
					// queued; its delete entry superseded this one.
					return Ok(());
				};
				let note = self.embed_for_push(note).await;

				self.providers.remote.upsert(remote_cfg, &note).await
			},
		}
	}
}
