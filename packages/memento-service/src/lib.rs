pub mod add_note;
pub mod chat;
pub mod delete_note;
pub mod hide_note;
pub mod list;
pub mod outbox;
pub mod reminders;
pub mod search;
pub mod session;
pub mod submit;
pub mod sync;
pub mod update_note;

mod error;

use std::{
	future::Future,
	pin::Pin,
	sync::{Arc, Mutex, MutexGuard},
};

use time::OffsetDateTime;
use uuid::Uuid;

pub use add_note::{AddNoteRequest, AddNoteResponse};
pub use chat::{ChatRequest, ChatResponse};
pub use delete_note::{DeleteNoteRequest, DeleteNoteResponse};
pub use error::{Error, Result};
pub use hide_note::{HideNoteRequest, HideNoteResponse};
pub use list::{ListNotesRequest, ListNotesResponse};
pub use outbox::FlushReport;
pub use reminders::{ListRemindersResponse, SetReminderRequest, SetReminderResponse};
pub use search::{SearchRequest, SearchResponse};
pub use submit::{SubmitRequest, SubmitResponse};
pub use sync::SyncReport;
pub use update_note::{UpdateNoteRequest, UpdateNoteResponse};

use memento_config::{ChatProviderConfig, Config, EmbeddingProviderConfig, Remote};
use memento_domain::{GUEST_USER, command::Command, note::Note};
use memento_storage::{cache::NoteCache, models::OutboxOp, remote, remote::SearchHit};

use crate::session::Session;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>>;
}

pub trait ChatProvider
where
	Self: Send + Sync,
{
	fn complete<'a>(
		&'a self,
		cfg: &'a ChatProviderConfig,
		input: &'a str,
		context: &'a str,
	) -> BoxFuture<'a, Result<String>>;
}

pub trait RemoteStore
where
	Self: Send + Sync,
{
	fn list<'a>(&'a self, cfg: &'a Remote) -> BoxFuture<'a, Result<Vec<Note>>>;
	fn upsert<'a>(&'a self, cfg: &'a Remote, note: &'a Note) -> BoxFuture<'a, Result<()>>;
	fn delete<'a>(&'a self, cfg: &'a Remote, id: Uuid) -> BoxFuture<'a, Result<()>>;
	fn search<'a>(
		&'a self,
		cfg: &'a Remote,
		query: &'a str,
		embedding: &'a [f32],
	) -> BoxFuture<'a, Result<Vec<SearchHit>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub chat: Arc<dyn ChatProvider>,
	pub remote: Arc<dyn RemoteStore>,
}
impl Providers {
	pub fn new(
		embedding: Arc<dyn EmbeddingProvider>,
		chat: Arc<dyn ChatProvider>,
		remote: Arc<dyn RemoteStore>,
	) -> Self {
		Self { embedding, chat, remote }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { embedding: provider.clone(), chat: provider.clone(), remote: provider }
	}
}

struct DefaultProviders;

impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>> {
		Box::pin(async move { Ok(memento_providers::embedding::embed(cfg, texts).await?) })
	}
}

impl ChatProvider for DefaultProviders {
	fn complete<'a>(
		&'a self,
		cfg: &'a ChatProviderConfig,
		input: &'a str,
		context: &'a str,
	) -> BoxFuture<'a, Result<String>> {
		Box::pin(async move { Ok(memento_providers::chat::complete(cfg, input, context).await?) })
	}
}

impl RemoteStore for DefaultProviders {
	fn list<'a>(&'a self, cfg: &'a Remote) -> BoxFuture<'a, Result<Vec<Note>>> {
		Box::pin(async move { Ok(remote::list_notes(cfg).await?) })
	}

	fn upsert<'a>(&'a self, cfg: &'a Remote, note: &'a Note) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move { Ok(remote::upsert_note(cfg, note).await?) })
	}

	fn delete<'a>(&'a self, cfg: &'a Remote, id: Uuid) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move { Ok(remote::delete_note(cfg, id).await?) })
	}

	fn search<'a>(
		&'a self,
		cfg: &'a Remote,
		query: &'a str,
		embedding: &'a [f32],
	) -> BoxFuture<'a, Result<Vec<SearchHit>>> {
		Box::pin(async move { Ok(remote::search_notes(cfg, query, embedding).await?) })
	}
}

pub struct MementoService {
	pub cfg: Config,
	pub cache: NoteCache,
	pub providers: Providers,
	bucket: String,
	session: Mutex<Session>,
}
impl MementoService {
	pub fn new(cfg: Config, cache: NoteCache) -> Result<Self> {
		Self::with_providers(cfg, cache, Providers::default())
	}

	pub fn with_providers(cfg: Config, cache: NoteCache, providers: Providers) -> Result<Self> {
		let bucket = cfg
			.remote
			.as_ref()
			.map(|remote| remote.user_id.clone())
			.unwrap_or_else(|| GUEST_USER.to_string());
		let notes = cache.notes(&bucket)?;
		let mut session = Session::new();

		session.apply(Command::SetNotes { notes });

		Ok(Self { cfg, cache, providers, bucket, session: Mutex::new(session) })
	}

	pub fn bucket(&self) -> &str {
		&self.bucket
	}

	pub(crate) fn remote_cfg(&self) -> Result<&Remote> {
		self.cfg.remote.as_ref().ok_or(Error::AuthMissing)
	}

	pub(crate) fn lock_session(&self) -> MutexGuard<'_, Session> {
		self.session.lock().unwrap_or_else(|err| err.into_inner())
	}

	/// Optimistically apply a fresh note to the in-memory view, cache it, and
	/// queue its remote write. The caller never waits on the network.
	pub(crate) fn insert_note(&self, note: Note, now: OffsetDateTime) -> Result<Note> {
		self.lock_session().apply(Command::AddNote { note: note.clone() });
		self.cache.upsert_note(&self.bucket, &note)?;
		self.cache.enqueue_outbox(&self.bucket, note.id, OutboxOp::Upsert, now)?;

		Ok(note)
	}

	/// Attach an embedding before a remote push. Embedding failures degrade
	/// the remote's semantic search, not the push itself.
	pub(crate) async fn embed_for_push(&self, mut note: Note) -> Note {
		if note.embedding.is_some() {
			return note;
		}

		match self
			.providers
			.embedding
			.embed(&self.cfg.providers.embedding, std::slice::from_ref(&note.content))
			.await
		{
			Ok(mut vectors) if !vectors.is_empty() => note.embedding = Some(vectors.remove(0)),
			Ok(_) => {},
			Err(err) => {
				tracing::warn!(
					error = %err,
					note_id = %note.id,
					"Embedding failed; pushing without a vector."
				);
			},
		}

		note
	}
}

pub(crate) fn normalize_content(raw: &str, cfg: &Config) -> Result<String> {
	if raw.trim().is_empty() {
		return Err(Error::InvalidRequest { message: "Note content must be non-empty.".to_string() });
	}

	let max = cfg.notes.max_content_chars as usize;

	if raw.chars().count() > max {
		Ok(raw.chars().take(max).collect())
	} else {
		Ok(raw.to_string())
	}
}
