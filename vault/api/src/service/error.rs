use crate::database::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
	/// The input was rejected, the message is safe to show to clients.
	#[error("{0}")]
	Validation(String),
	#[error("storage failure: {0}")]
	Storage(#[from] StoreError),
}

impl ServiceError {
	pub(crate) fn validation(message: impl Into<String>) -> Self {
		Self::Validation(message.into())
	}
}
