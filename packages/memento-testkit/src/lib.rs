mod error;

pub use error::{Error, Result};

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use time::OffsetDateTime;
use uuid::Uuid;

use memento_domain::note::{Note, Role};

/// A throwaway on-disk cache location. The directory is removed when the
/// fixture is dropped.
pub struct TestCache {
	_dir: TempDir,
	path: PathBuf,
}
impl TestCache {
	pub fn new() -> Result<Self> {
		let dir = TempDir::new()?;
		let path = dir.path().join("cache.db");

		Ok(Self { _dir: dir, path })
	}

	pub fn path(&self) -> &Path {
		&self.path
	}
}

pub fn note_at(content: &str, ts: OffsetDateTime) -> Note {
	Note::new(Role::User, content, ts)
}

pub fn note_with_id(id: Uuid, content: &str, ts: OffsetDateTime) -> Note {
	let mut note = note_at(content, ts);

	note.id = id;

	note
}
