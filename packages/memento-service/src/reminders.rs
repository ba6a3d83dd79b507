use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use memento_domain::reminder::{self, Reminder};

use crate::{Error, MementoService, Result};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SetReminderRequest {
	#[serde(default)]
	pub title: Option<String>,
	pub message: String,
	#[serde(with = "memento_domain::time_serde")]
	pub remind_at: OffsetDateTime,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SetReminderResponse {
	pub reminder: Reminder,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ListRemindersResponse {
	pub reminders: Vec<Reminder>,
}

impl MementoService {
	/// Schedule a one-shot reminder. The time is validated before anything is
	/// persisted; a past or present time schedules nothing.
	pub fn set_reminder(&self, req: SetReminderRequest) -> Result<SetReminderResponse> {
		if req.message.trim().is_empty() {
			return Err(Error::InvalidRequest {
				message: "Reminder message must be non-empty.".to_string(),
			});
		}

		let now = OffsetDateTime::now_utc();

		reminder::validate_schedule(req.remind_at, now).map_err(|_| Error::InvalidRequest {
			message: "Scheduled time must be in the future.".to_string(),
		})?;

		let reminder = Reminder::new(req.title, req.message, req.remind_at);

		self.cache.insert_reminder(&reminder)?;

		Ok(SetReminderResponse { reminder })
	}

	pub fn list_reminders(&self) -> Result<ListRemindersResponse> {
		Ok(ListRemindersResponse { reminders: self.cache.reminders()? })
	}
}
