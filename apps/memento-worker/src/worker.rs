use std::time::Duration as StdDuration;

use color_eyre::Result;
use time::{Duration, OffsetDateTime};
use tokio::time as tokio_time;

use memento_service::MementoService;

pub struct WorkerState {
	pub service: MementoService,
}

/// Background persistence loop: drain the remote outbox, reconcile the full
/// note sets on the configured cadence, and fire due reminders. Every pass is
/// best-effort; a failing pass is logged and retried on the next tick.
pub async fn run_worker(state: WorkerState) -> Result<()> {
	let sync_interval = Duration::seconds(state.service.cfg.sync.interval_secs as i64);
	let poll = StdDuration::from_millis(state.service.cfg.reminders.poll_interval_ms);
	let mut last_sync: Option<OffsetDateTime> = None;

	if state.service.cfg.remote.is_none() {
		tracing::info!("No remote configured; only reminders will be processed.");
	}

	loop {
		if state.service.cfg.remote.is_some() {
			flush_once(&state.service).await;

			let now = OffsetDateTime::now_utc();

			if last_sync.map(|at| now - at >= sync_interval).unwrap_or(true) {
				sync_once(&state.service).await;

				last_sync = Some(now);
			}
		}

		if let Err(err) = fire_due_reminders(&state.service) {
			tracing::error!(error = %err, "Reminder pass failed.");
		}

		tokio_time::sleep(poll).await;
	}
}

async fn flush_once(service: &MementoService) {
	match service.flush_outbox().await {
		Ok(report) if report.delivered + report.failed + report.dead > 0 => {
			tracing::info!(
				delivered = report.delivered,
				failed = report.failed,
				dead = report.dead,
				"Outbox pass finished."
			);
		},
		Ok(_) => {},
		Err(err) => tracing::error!(error = %err, "Outbox pass failed."),
	}
}

async fn sync_once(service: &MementoService) {
	match service.sync().await {
		Ok(report) if report.pushed + report.pulled + report.failed > 0 => {
			tracing::info!(
				pushed = report.pushed,
				pulled = report.pulled,
				failed = report.failed,
				"Sync pass finished."
			);
		},
		Ok(_) => {},
		Err(err) => tracing::error!(error = %err, "Sync pass failed."),
	}
}

fn fire_due_reminders(service: &MementoService) -> memento_service::Result<()> {
	let now = OffsetDateTime::now_utc();

	for reminder in service.cache.due_reminders(now)? {
		// Delivery is the platform shell's concern; the worker surfaces the
		// payload and marks the reminder consumed.
		tracing::info!(
			reminder_id = %reminder.id,
			title = %reminder.title,
			message = %reminder.message,
			"Reminder due."
		);
		service.cache.mark_reminder_fired(reminder.id)?;
	}

	Ok(())
}
