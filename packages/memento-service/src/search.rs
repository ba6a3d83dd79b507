use serde::{Deserialize, Serialize};

use memento_storage::remote::SearchHit;

use crate::{Error, MementoService, Result};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SearchRequest {
	pub query: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SearchResponse {
	pub hits: Vec<SearchHit>,
}

impl MementoService {
	/// Hybrid search runs on the hosted side; this op only embeds the query
	/// and forwards both forms to the search procedure.
	pub async fn search(&self, req: SearchRequest) -> Result<SearchResponse> {
		let remote = self.remote_cfg()?;
		let query = req.query.trim();

		if query.is_empty() {
			return Err(Error::InvalidRequest {
				message: "Search query must be non-empty.".to_string(),
			});
		}

		let vectors = self
			.providers
			.embedding
			.embed(&self.cfg.providers.embedding, &[query.to_string()])
			.await?;
		let vector = vectors.into_iter().next().ok_or_else(|| Error::Provider {
			message: "Embedding provider returned no vector.".to_string(),
		})?;
		let hits = self.providers.remote.search(remote, query, &vector).await?;

		Ok(SearchResponse { hits })
	}
}
