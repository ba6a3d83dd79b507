use std::sync::Arc;

use memento_service::MementoService;
use memento_storage::cache::NoteCache;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<MementoService>,
}
impl AppState {
	pub fn new(config: memento_config::Config) -> color_eyre::Result<Self> {
		let cache = NoteCache::open(&config.cache.path)?;
		let service = MementoService::new(config, cache)?;

		Ok(Self { service: Arc::new(service) })
	}
}
