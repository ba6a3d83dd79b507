use std::time::Duration;

use reqwest::{
	Client,
	header::{AUTHORIZATION, HeaderMap},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use memento_domain::note::Note;

use crate::{Error, Result};

/// One row of the remote hybrid-search procedure's ranked output.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SearchHit {
	pub id: Uuid,
	pub content: String,
	#[serde(with = "memento_domain::time_serde")]
	pub last_updated: OffsetDateTime,
	pub similarity: f32,
}

/// Thin client for the hosted note table. Every call is scoped to the
/// configured principal; the hosted side owns the actual row storage and the
/// hybrid-search SQL function.
pub async fn list_notes(cfg: &memento_config::Remote) -> Result<Vec<Note>> {
	let res = client(cfg)?
		.get(format!("{}/notes", cfg.api_base))
		.query(&[("user_id", cfg.user_id.as_str())])
		.headers(auth_headers(&cfg.api_key)?)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_note_rows(json)
}

pub async fn upsert_note(cfg: &memento_config::Remote, note: &Note) -> Result<()> {
	let mut body = serde_json::to_value(note)?;

	if let Some(row) = body.as_object_mut() {
		row.insert("user_id".to_string(), Value::String(cfg.user_id.clone()));
	}

	let res = client(cfg)?
		.post(format!("{}/notes", cfg.api_base))
		.headers(auth_headers(&cfg.api_key)?)
		.json(&body)
		.send()
		.await?;

	res.error_for_status()?;

	Ok(())
}

pub async fn delete_note(cfg: &memento_config::Remote, id: Uuid) -> Result<()> {
	let res = client(cfg)?
		.delete(format!("{}/notes/{id}", cfg.api_base))
		.query(&[("user_id", cfg.user_id.as_str())])
		.headers(auth_headers(&cfg.api_key)?)
		.send()
		.await?;

	res.error_for_status()?;

	Ok(())
}

pub async fn search_notes(
	cfg: &memento_config::Remote,
	query: &str,
	embedding: &[f32],
) -> Result<Vec<SearchHit>> {
	let body = serde_json::json!({
		"user_id": cfg.user_id,
		"search_text": query,
		"query_embedding": embedding,
	});
	let res = client(cfg)?
		.post(format!("{}/rpc/search_notes", cfg.api_base))
		.headers(auth_headers(&cfg.api_key)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_search_hits(json)
}

fn client(cfg: &memento_config::Remote) -> Result<Client> {
	Ok(Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?)
}

fn auth_headers(api_key: &str) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	headers.insert(AUTHORIZATION, format!("Bearer {api_key}").parse()?);

	Ok(headers)
}

fn parse_note_rows(json: Value) -> Result<Vec<Note>> {
	let rows = json
		.as_array()
		.ok_or_else(|| Error::InvalidResponse("Note listing is not an array.".to_string()))?;
	let mut notes = Vec::with_capacity(rows.len());

	for row in rows {
		notes.push(serde_json::from_value(row.clone())?);
	}

	Ok(notes)
}

fn parse_search_hits(json: Value) -> Result<Vec<SearchHit>> {
	let rows = json
		.as_array()
		.ok_or_else(|| Error::InvalidResponse("Search result is not an array.".to_string()))?;
	let mut hits = Vec::with_capacity(rows.len());

	for row in rows {
		hits.push(serde_json::from_value(row.clone())?);
	}

	Ok(hits)
}
