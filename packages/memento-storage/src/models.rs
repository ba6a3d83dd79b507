use time::OffsetDateTime;
use uuid::Uuid;

use crate::Error;

pub const STATUS_PENDING: &str = "PENDING";
pub const STATUS_FAILED: &str = "FAILED";
pub const STATUS_DEAD: &str = "DEAD";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OutboxOp {
	Upsert,
	Delete,
}
impl OutboxOp {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Upsert => "UPSERT",
			Self::Delete => "DELETE",
		}
	}

	pub fn parse(raw: &str) -> Result<Self, Error> {
		match raw {
			"UPSERT" => Ok(Self::Upsert),
			"DELETE" => Ok(Self::Delete),
			other => Err(Error::InvalidArgument(format!("Unsupported outbox op: {other}."))),
		}
	}
}

#[derive(Clone, Debug)]
pub struct OutboxEntry {
	pub outbox_id: Uuid,
	pub bucket: String,
	pub note_id: Uuid,
	pub op: OutboxOp,
	pub status: String,
	pub attempts: i64,
	pub last_error: Option<String>,
	pub available_at: OffsetDateTime,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}
