//! Storage contracts and built-in backends for the session's credential pair.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, auth::CredentialPair};

/// Boxed future returned by [`CredentialStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Persistence contract for the session's credential pair.
///
/// Exactly one pair exists per client instance; `save` replaces it wholesale and `clear`
/// destroys it. Backends perform no validity checks; expiry is the caller's concern.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Persists or replaces the credential pair.
	fn save(&self, pair: CredentialPair) -> StoreFuture<'_, ()>;

	/// Fetches the current credential pair, if present.
	fn load(&self) -> StoreFuture<'_, Option<CredentialPair>>;

	/// Removes both tokens.
	fn clear(&self) -> StoreFuture<'_, ()>;
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
