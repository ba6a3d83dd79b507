use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

pub const DEFAULT_REMINDER_TITLE: &str = "Memento Reminder";

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Reminder {
	pub id: Uuid,
	pub title: String,
	pub message: String,
	#[serde(with = "crate::time_serde")]
	pub remind_at: OffsetDateTime,
	#[serde(default)]
	pub fired: bool,
}
impl Reminder {
	pub fn new(
		title: Option<String>,
		message: impl Into<String>,
		remind_at: OffsetDateTime,
	) -> Self {
		Self {
			id: Uuid::new_v4(),
			title: title.unwrap_or_else(|| DEFAULT_REMINDER_TITLE.to_string()),
			message: message.into(),
			remind_at,
			fired: false,
		}
	}

}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ScheduleRejection {
	PastDue,
}

/// A reminder time must be strictly in the future at scheduling time; a past
/// or present time is rejected before anything is persisted.
pub fn validate_schedule(
	remind_at: OffsetDateTime,
	now: OffsetDateTime,
) -> Result<(), ScheduleRejection> {
	if remind_at <= now {
		return Err(ScheduleRejection::PastDue);
	}

	Ok(())
}
