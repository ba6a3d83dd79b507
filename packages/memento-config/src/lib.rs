mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Cache, ChatProviderConfig, Config, EmbeddingProviderConfig, Notes, Providers, Reminders,
	Remote, Service, SyncPolicy,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}
	if cfg.cache.path.as_os_str().is_empty() {
		return Err(Error::Validation { message: "cache.path must be non-empty.".to_string() });
	}
	if cfg.notes.max_content_chars == 0 {
		return Err(Error::Validation {
			message: "notes.max_content_chars must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.chat.temperature < 0.0 || !cfg.providers.chat.temperature.is_finite() {
		return Err(Error::Validation {
			message: "providers.chat.temperature must be a finite number of zero or greater."
				.to_string(),
		});
	}

	for (label, base, key, timeout) in [
		(
			"embedding",
			&cfg.providers.embedding.api_base,
			&cfg.providers.embedding.api_key,
			cfg.providers.embedding.timeout_ms,
		),
		(
			"chat",
			&cfg.providers.chat.api_base,
			&cfg.providers.chat.api_key,
			cfg.providers.chat.timeout_ms,
		),
	] {
		if base.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_base must be non-empty."),
			});
		}
		if key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty."),
			});
		}
		if timeout == 0 {
			return Err(Error::Validation {
				message: format!("Provider {label} timeout_ms must be greater than zero."),
			});
		}
	}

	if cfg.sync.interval_secs == 0 {
		return Err(Error::Validation {
			message: "sync.interval_secs must be greater than zero.".to_string(),
		});
	}
	if cfg.sync.max_attempts == 0 {
		return Err(Error::Validation {
			message: "sync.max_attempts must be greater than zero.".to_string(),
		});
	}
	if cfg.sync.base_backoff_ms <= 0 {
		return Err(Error::Validation {
			message: "sync.base_backoff_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.sync.max_backoff_ms < cfg.sync.base_backoff_ms {
		return Err(Error::Validation {
			message: "sync.max_backoff_ms must be at least sync.base_backoff_ms.".to_string(),
		});
	}
	if cfg.reminders.poll_interval_ms == 0 {
		return Err(Error::Validation {
			message: "reminders.poll_interval_ms must be greater than zero.".to_string(),
		});
	}

	if let Some(remote) = cfg.remote.as_ref() {
		if remote.api_base.trim().is_empty() {
			return Err(Error::Validation {
				message: "remote.api_base must be non-empty.".to_string(),
			});
		}
		if remote.api_key.trim().is_empty() {
			return Err(Error::Validation {
				message: "remote.api_key must be non-empty.".to_string(),
			});
		}
		if remote.user_id.trim().is_empty() {
			return Err(Error::Validation {
				message: "remote.user_id must be non-empty.".to_string(),
			});
		}
		if remote.timeout_ms == 0 {
			return Err(Error::Validation {
				message: "remote.timeout_ms must be greater than zero.".to_string(),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	trim_trailing_slash(&mut cfg.providers.embedding.api_base);
	trim_trailing_slash(&mut cfg.providers.chat.api_base);

	if let Some(remote) = cfg.remote.as_mut() {
		trim_trailing_slash(&mut remote.api_base);
	}
}

fn trim_trailing_slash(base: &mut String) {
	while base.ends_with('/') {
		base.pop();
	}
}
