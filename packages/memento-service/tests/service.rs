use std::{
	collections::HashMap,
	path::Path,
	sync::{
		Arc, Mutex,
		atomic::{AtomicUsize, Ordering},
	},
};

use time::{Duration, OffsetDateTime, macros::datetime};
use uuid::Uuid;

use memento_config::{
	Cache, ChatProviderConfig, Config, EmbeddingProviderConfig, Notes, Reminders, Remote, Service,
	SyncPolicy,
};
use memento_domain::note::{Note, Role};
use memento_service::{
	AddNoteRequest, BoxFuture, ChatProvider, DeleteNoteRequest, EmbeddingProvider, Error,
	HideNoteRequest, ListNotesRequest, MementoService, RemoteStore, Result, SearchRequest,
	SetReminderRequest, SubmitRequest, UpdateNoteRequest,
};
use memento_storage::{cache::NoteCache, models::OutboxOp, remote::SearchHit};
use memento_testkit::{TestCache, note_at, note_with_id};

struct DummyEmbedding;
impl EmbeddingProvider for DummyEmbedding {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>> {
		let dim = (cfg.dimensions as usize).max(1);
		let vectors = vec![vec![0.0; dim]; texts.len()];

		Box::pin(async move { Ok(vectors) })
	}
}

struct DummyChat;
impl ChatProvider for DummyChat {
	fn complete<'a>(
		&'a self,
		_cfg: &'a ChatProviderConfig,
		_input: &'a str,
		_context: &'a str,
	) -> BoxFuture<'a, Result<String>> {
		Box::pin(async move { Ok("You bought milk.".to_string()) })
	}
}

#[derive(Default)]
struct MemoryRemote {
	notes: Mutex<HashMap<Uuid, Note>>,
	hits: Vec<SearchHit>,
	upserts: AtomicUsize,
	deletes: AtomicUsize,
	fail_writes: bool,
}
impl MemoryRemote {
	fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	fn with_notes(notes: Vec<Note>) -> Arc<Self> {
		let remote = Self::default();

		{
			let mut stored = remote.notes.lock().expect("remote lock");

			for note in notes {
				stored.insert(note.id, note);
			}
		}

		Arc::new(remote)
	}

	fn with_hits(hits: Vec<SearchHit>) -> Arc<Self> {
		Arc::new(Self { hits, ..Self::default() })
	}

	fn failing() -> Arc<Self> {
		Arc::new(Self { fail_writes: true, ..Self::default() })
	}

	fn note(&self, id: Uuid) -> Option<Note> {
		self.notes.lock().expect("remote lock").get(&id).cloned()
	}

	fn len(&self) -> usize {
		self.notes.lock().expect("remote lock").len()
	}

	fn upsert_count(&self) -> usize {
		self.upserts.load(Ordering::SeqCst)
	}
}
impl RemoteStore for MemoryRemote {
	fn list<'a>(&'a self, _cfg: &'a Remote) -> BoxFuture<'a, Result<Vec<Note>>> {
		let notes = self.notes.lock().expect("remote lock").values().cloned().collect();

		Box::pin(async move { Ok(notes) })
	}

	fn upsert<'a>(&'a self, _cfg: &'a Remote, note: &'a Note) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			if self.fail_writes {
				return Err(Error::Remote { message: "injected write failure".to_string() });
			}

			self.upserts.fetch_add(1, Ordering::SeqCst);
			self.notes.lock().expect("remote lock").insert(note.id, note.clone());

			Ok(())
		})
	}

	fn delete<'a>(&'a self, _cfg: &'a Remote, id: Uuid) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			if self.fail_writes {
				return Err(Error::Remote { message: "injected write failure".to_string() });
			}

			self.deletes.fetch_add(1, Ordering::SeqCst);
			self.notes.lock().expect("remote lock").remove(&id);

			Ok(())
		})
	}

	fn search<'a>(
		&'a self,
		_cfg: &'a Remote,
		_query: &'a str,
		_embedding: &'a [f32],
	) -> BoxFuture<'a, Result<Vec<SearchHit>>> {
		let hits = self.hits.clone();

		Box::pin(async move { Ok(hits) })
	}
}

fn remote_settings() -> Remote {
	Remote {
		api_base: "http://127.0.0.1:0".to_string(),
		api_key: "test-key".to_string(),
		user_id: "user-1".to_string(),
		timeout_ms: 1_000,
	}
}

fn test_config(cache_path: &Path, remote: Option<Remote>) -> Config {
	Config {
		service: Service { http_bind: "127.0.0.1:0".to_string(), log_level: "info".to_string() },
		cache: Cache { path: cache_path.to_path_buf() },
		notes: Notes { max_content_chars: 5_000 },
		providers: memento_config::Providers {
			embedding: EmbeddingProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:0".to_string(),
				api_key: "key".to_string(),
				path: "/v1/embeddings".to_string(),
				model: "test-embedding".to_string(),
				dimensions: 4,
				timeout_ms: 1_000,
				default_headers: serde_json::Map::new(),
			},
			chat: ChatProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:0".to_string(),
				api_key: "key".to_string(),
				path: "/v1/chat/completions".to_string(),
				model: "test-chat".to_string(),
				temperature: 0.2,
				timeout_ms: 1_000,
				default_headers: serde_json::Map::new(),
			},
		},
		sync: SyncPolicy {
			interval_secs: 300,
			max_attempts: 3,
			base_backoff_ms: 500,
			max_backoff_ms: 30_000,
		},
		reminders: Reminders { poll_interval_ms: 1_000 },
		remote,
	}
}

fn service_with_remote(fixture: &TestCache, remote: Arc<MemoryRemote>) -> MementoService {
	let cfg = test_config(fixture.path(), Some(remote_settings()));
	let cache = NoteCache::open(fixture.path()).expect("open cache");
	let providers = memento_service::Providers::new(Arc::new(DummyEmbedding), Arc::new(DummyChat), remote);

	MementoService::with_providers(cfg, cache, providers).expect("build service")
}

fn guest_service(fixture: &TestCache) -> MementoService {
	let cfg = test_config(fixture.path(), None);
	let cache = NoteCache::open(fixture.path()).expect("open cache");
	let providers = memento_service::Providers::new(
		Arc::new(DummyEmbedding),
		Arc::new(DummyChat),
		MemoryRemote::new(),
	);

	MementoService::with_providers(cfg, cache, providers).expect("build service")
}

#[test]
fn add_note_is_optimistic_and_queued() {
	let fixture = TestCache::new().expect("temp cache");
	let remote = MemoryRemote::new();
	let service = service_with_remote(&fixture, remote.clone());

	let note = service
		.add_note(AddNoteRequest {
			content: "buy milk".to_string(),
			role: None,
			file_paths: Vec::new(),
		})
		.expect("add note")
		.note;

	// Visible immediately, cached locally, remote untouched.
	let listed = service.list_notes(ListNotesRequest::default()).expect("list").notes;

	assert_eq!(listed.len(), 1);
	assert_eq!(listed[0].id, note.id);
	assert_eq!(service.cache.get_note("user-1", note.id).expect("get").expect("cached").content, "buy milk");
	assert_eq!(remote.len(), 0);

	let pending = service.cache.pending_outbox().expect("pending");

	assert_eq!(pending.len(), 1);
	assert_eq!(pending[0].op, OutboxOp::Upsert);
}

#[test]
fn add_note_rejects_empty_content() {
	let fixture = TestCache::new().expect("temp cache");
	let service = guest_service(&fixture);
	let result = service.add_note(AddNoteRequest {
		content: "   ".to_string(),
		role: None,
		file_paths: Vec::new(),
	});

	assert!(matches!(result, Err(Error::InvalidRequest { .. })));
}

#[tokio::test]
async fn flush_outbox_delivers_queued_writes() {
	let fixture = TestCache::new().expect("temp cache");
	let remote = MemoryRemote::new();
	let service = service_with_remote(&fixture, remote.clone());
	let note = service
		.add_note(AddNoteRequest {
			content: "buy milk".to_string(),
			role: None,
			file_paths: Vec::new(),
		})
		.expect("add note")
		.note;

	let report = service.flush_outbox().await.expect("flush");

	assert_eq!(report.delivered, 1);
	assert_eq!(report.failed, 0);

	let pushed = remote.note(note.id).expect("delivered to remote");

	assert_eq!(pushed.content, "buy milk");
	// The push carries the embedding the cache never stores.
	assert!(pushed.embedding.is_some());
	assert!(service.cache.pending_outbox().expect("pending").is_empty());
}

#[tokio::test]
async fn flush_outbox_isolates_failures() {
	let fixture = TestCache::new().expect("temp cache");
	let service = service_with_remote(&fixture, MemoryRemote::failing());

	service
		.add_note(AddNoteRequest {
			content: "buy milk".to_string(),
			role: None,
			file_paths: Vec::new(),
		})
		.expect("add note");

	let report = service.flush_outbox().await.expect("flush");

	assert_eq!(report.delivered, 0);
	assert_eq!(report.failed, 1);
	// Still queued for a later retry, with the failure recorded.
	let pending = service.cache.pending_outbox().expect("pending");

	assert_eq!(pending.len(), 1);
	assert_eq!(pending[0].attempts, 1);
	assert!(pending[0].last_error.as_deref().unwrap_or_default().contains("injected"));
}

#[tokio::test]
async fn delete_queues_a_remote_delete() {
	let fixture = TestCache::new().expect("temp cache");
	let remote = MemoryRemote::new();
	let service = service_with_remote(&fixture, remote.clone());
	let note = service
		.add_note(AddNoteRequest {
			content: "buy milk".to_string(),
			role: None,
			file_paths: Vec::new(),
		})
		.expect("add note")
		.note;

	service.flush_outbox().await.expect("flush");
	service.delete_note(DeleteNoteRequest { id: note.id }).expect("delete");

	let pending = service.cache.pending_outbox().expect("pending");

	assert_eq!(pending.len(), 1);
	assert_eq!(pending[0].op, OutboxOp::Delete);

	service.flush_outbox().await.expect("flush");

	assert_eq!(remote.len(), 0);
	assert!(service.list_notes(ListNotesRequest::default()).expect("list").notes.is_empty());
}

#[tokio::test]
async fn sync_pushes_a_local_only_note() {
	let fixture = TestCache::new().expect("temp cache");
	let seed = NoteCache::open(fixture.path()).expect("open cache");
	let note = note_at("buy milk", datetime!(2024-01-01 00:00:00 UTC));

	seed.upsert_note("user-1", &note).expect("seed");

	let remote = MemoryRemote::new();
	let service = service_with_remote(&fixture, remote.clone());
	let report = service.sync().await.expect("sync");

	assert_eq!(report.pushed, 1);
	assert_eq!(report.pulled, 0);
	assert_eq!(report.failed, 0);
	assert_eq!(remote.note(note.id).expect("pushed").content, "buy milk");
}

#[tokio::test]
async fn sync_pulls_newer_remote_content() {
	let fixture = TestCache::new().expect("temp cache");
	let seed = NoteCache::open(fixture.path()).expect("open cache");
	let id = Uuid::new_v4();

	seed.upsert_note("user-1", &note_with_id(id, "old", datetime!(2024-01-01 00:00:00 UTC)))
		.expect("seed");

	let remote = MemoryRemote::with_notes(vec![note_with_id(
		id,
		"new",
		datetime!(2024-02-01 00:00:00 UTC),
	)]);
	let service = service_with_remote(&fixture, remote);
	let report = service.sync().await.expect("sync");

	assert_eq!(report.pulled, 1);
	assert_eq!(report.pushed, 0);
	assert_eq!(
		service.cache.get_note("user-1", id).expect("get").expect("cached").content,
		"new"
	);
	// The refreshed view reflects the pull too.
	let listed = service.list_notes(ListNotesRequest::default()).expect("list").notes;

	assert_eq!(listed.len(), 1);
	assert_eq!(listed[0].content, "new");
}

#[tokio::test]
async fn sync_with_equal_timestamps_writes_nothing() {
	let fixture = TestCache::new().expect("temp cache");
	let seed = NoteCache::open(fixture.path()).expect("open cache");
	let ts = datetime!(2024-01-01 00:00:00 UTC);
	let id = Uuid::new_v4();

	seed.upsert_note("user-1", &note_with_id(id, "buy milk", ts)).expect("seed");

	let remote = MemoryRemote::with_notes(vec![note_with_id(id, "buy  milk", ts)]);
	let service = service_with_remote(&fixture, remote.clone());
	let report = service.sync().await.expect("sync");

	assert_eq!(report.pushed, 0);
	assert_eq!(report.pulled, 0);
	assert_eq!(remote.upsert_count(), 0);
	// Content differs only in formatting; timestamp equality wins.
	assert_eq!(
		service.cache.get_note("user-1", id).expect("get").expect("cached").content,
		"buy milk"
	);
}

#[tokio::test]
async fn syncing_twice_performs_no_further_writes() {
	let fixture = TestCache::new().expect("temp cache");
	let seed = NoteCache::open(fixture.path()).expect("open cache");
	let shared = Uuid::new_v4();

	seed.upsert_note("user-1", &note_with_id(shared, "old", datetime!(2024-01-01 00:00:00 UTC)))
		.expect("seed");
	seed.upsert_note("user-1", &note_at("never synced", datetime!(2024-01-02 00:00:00 UTC)))
		.expect("seed");

	let remote = MemoryRemote::with_notes(vec![
		note_with_id(shared, "new", datetime!(2024-02-01 00:00:00 UTC)),
		note_at("server only", datetime!(2024-01-03 00:00:00 UTC)),
	]);
	let service = service_with_remote(&fixture, remote.clone());

	let first = service.sync().await.expect("sync");

	assert!(first.pushed + first.pulled > 0);

	let upserts_after_first = remote.upsert_count();
	let second = service.sync().await.expect("sync");

	assert_eq!(second.pushed, 0);
	assert_eq!(second.pulled, 0);
	assert_eq!(remote.upsert_count(), upserts_after_first);
}

#[tokio::test]
async fn sync_without_a_remote_rejects() {
	let fixture = TestCache::new().expect("temp cache");
	let service = guest_service(&fixture);

	assert!(matches!(service.sync().await, Err(Error::AuthMissing)));
}

#[tokio::test]
async fn submit_with_a_leading_space_chats_over_retrieved_notes() {
	let fixture = TestCache::new().expect("temp cache");
	let cited = Uuid::new_v4();
	let remote = MemoryRemote::with_hits(vec![SearchHit {
		id: cited,
		content: "bought milk yesterday".to_string(),
		last_updated: datetime!(2024-01-01 00:00:00 UTC),
		similarity: 0.91,
	}]);
	let service = service_with_remote(&fixture, remote);
	let response = service
		.submit(SubmitRequest { input: " what did I buy".to_string() })
		.await
		.expect("submit");

	assert_eq!(response.notes.len(), 2);
	assert_eq!(response.notes[0].role, Role::User);
	assert_eq!(response.notes[0].content, "what did I buy");
	assert_eq!(response.notes[1].role, Role::Assistant);
	assert_eq!(response.notes[1].content, "You bought milk.");
	assert_eq!(response.notes[1].knowledge_base.len(), 1);
	assert_eq!(response.notes[1].knowledge_base[0].id, cited);

	// Both notes are cached for the next launch.
	assert!(service.cache.get_note("user-1", response.notes[1].id).expect("get").is_some());
}

#[tokio::test]
async fn submit_without_a_leading_space_is_a_plain_note() {
	let fixture = TestCache::new().expect("temp cache");
	let service = service_with_remote(&fixture, MemoryRemote::new());
	let response =
		service.submit(SubmitRequest { input: "buy milk".to_string() }).await.expect("submit");

	assert_eq!(response.notes.len(), 1);
	assert_eq!(response.notes[0].role, Role::User);
}

#[tokio::test]
async fn search_requires_a_remote() {
	let fixture = TestCache::new().expect("temp cache");
	let service = guest_service(&fixture);
	let result = service.search(SearchRequest { query: "milk".to_string() }).await;

	assert!(matches!(result, Err(Error::AuthMissing)));
}

#[test]
fn update_advances_last_updated_and_moves_to_the_end() {
	let fixture = TestCache::new().expect("temp cache");
	let service = service_with_remote(&fixture, MemoryRemote::new());
	let first = service
		.add_note(AddNoteRequest {
			content: "first".to_string(),
			role: None,
			file_paths: Vec::new(),
		})
		.expect("add")
		.note;

	service
		.add_note(AddNoteRequest {
			content: "second".to_string(),
			role: None,
			file_paths: Vec::new(),
		})
		.expect("add");

	let updated = service
		.update_note(UpdateNoteRequest { id: first.id, content: "first, edited".to_string() })
		.expect("update")
		.note;

	assert!(updated.last_updated > first.last_updated);

	let listed = service.list_notes(ListNotesRequest::default()).expect("list").notes;

	assert_eq!(listed.len(), 2);
	assert_eq!(listed[1].id, first.id);
	assert_eq!(listed[1].content, "first, edited");
}

#[test]
fn hidden_notes_are_filtered_unless_requested() {
	let fixture = TestCache::new().expect("temp cache");
	let service = service_with_remote(&fixture, MemoryRemote::new());
	let note = service
		.add_note(AddNoteRequest {
			content: "private".to_string(),
			role: None,
			file_paths: Vec::new(),
		})
		.expect("add")
		.note;

	service.hide_note(HideNoteRequest { id: note.id, hide: true }).expect("hide");

	assert!(service.list_notes(ListNotesRequest::default()).expect("list").notes.is_empty());

	let all = service
		.list_notes(ListNotesRequest { include_hidden: true })
		.expect("list")
		.notes;

	assert_eq!(all.len(), 1);
	assert!(all[0].hide);
}

#[test]
fn a_past_reminder_is_rejected_and_not_persisted() {
	let fixture = TestCache::new().expect("temp cache");
	let service = guest_service(&fixture);
	let result = service.set_reminder(SetReminderRequest {
		title: None,
		message: "too late".to_string(),
		remind_at: OffsetDateTime::now_utc() - Duration::days(1),
	});

	match result {
		Err(Error::InvalidRequest { message }) => {
			assert!(message.contains("future"), "unexpected message: {message}")
		},
		other => panic!("expected invalid-request error, got {other:?}"),
	}

	assert!(service.list_reminders().expect("list").reminders.is_empty());
}

#[test]
fn a_future_reminder_is_persisted_with_the_default_title() {
	let fixture = TestCache::new().expect("temp cache");
	let service = guest_service(&fixture);
	let reminder = service
		.set_reminder(SetReminderRequest {
			title: None,
			message: "drink water".to_string(),
			remind_at: OffsetDateTime::now_utc() + Duration::hours(1),
		})
		.expect("set reminder")
		.reminder;

	assert_eq!(reminder.title, "Memento Reminder");

	let listed = service.list_reminders().expect("list").reminders;

	assert_eq!(listed.len(), 1);
	assert_eq!(listed[0].message, "drink water");
}

#[test]
fn session_reloads_from_the_cache_on_startup() {
	let fixture = TestCache::new().expect("temp cache");

	{
		let service = service_with_remote(&fixture, MemoryRemote::new());

		service
			.add_note(AddNoteRequest {
				content: "survives restart".to_string(),
				role: None,
				file_paths: Vec::new(),
			})
			.expect("add");
	}

	let reopened = service_with_remote(&fixture, MemoryRemote::new());
	let listed = reopened.list_notes(ListNotesRequest::default()).expect("list").notes;

	assert_eq!(listed.len(), 1);
	assert_eq!(listed[0].content, "survives restart");
}
