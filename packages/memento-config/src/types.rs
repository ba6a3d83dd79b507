use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub cache: Cache,
	pub notes: Notes,
	pub providers: Providers,
	pub sync: SyncPolicy,
	pub reminders: Reminders,
	/// Absent in guest mode. Every operation that needs the hosted store
	/// rejects with a missing-auth error when this section is not configured.
	pub remote: Option<Remote>,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Cache {
	pub path: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct Notes {
	pub max_content_chars: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Remote {
	pub api_base: String,
	pub api_key: String,
	pub user_id: String,
	pub timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub chat: ChatProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct SyncPolicy {
	pub interval_secs: u64,
	pub max_attempts: u32,
	pub base_backoff_ms: i64,
	pub max_backoff_ms: i64,
}

#[derive(Debug, Deserialize)]
pub struct Reminders {
	pub poll_interval_ms: u64,
}
