pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("No authenticated remote is configured.")]
	AuthMissing,
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Remote store error: {message}")]
	Remote { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
}

impl From<memento_storage::Error> for Error {
	fn from(err: memento_storage::Error) -> Self {
		match err {
			memento_storage::Error::Http(inner) => Self::Remote { message: inner.to_string() },
			memento_storage::Error::InvalidResponse(message) => Self::Remote { message },
			memento_storage::Error::NotFound(message) => Self::NotFound { message },
			memento_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
			other => Self::Storage { message: other.to_string() },
		}
	}
}

impl From<memento_providers::Error> for Error {
	fn from(err: memento_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}
