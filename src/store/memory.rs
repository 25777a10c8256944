//! Thread-safe in-memory [`CredentialStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::CredentialPair,
	store::{CredentialStore, StoreError, StoreFuture},
};

type StoreSlot = Arc<RwLock<Option<CredentialPair>>>;

/// Thread-safe storage backend that keeps the pair in-process for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreSlot);
impl MemoryStore {
	fn save_now(slot: StoreSlot, pair: CredentialPair) -> Result<(), StoreError> {
		*slot.write() = Some(pair);

		Ok(())
	}

	fn load_now(slot: StoreSlot) -> Option<CredentialPair> {
		slot.read().clone()
	}

	fn clear_now(slot: StoreSlot) -> Result<(), StoreError> {
		*slot.write() = None;

		Ok(())
	}
}
impl CredentialStore for MemoryStore {
	fn save(&self, pair: CredentialPair) -> StoreFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move { Self::save_now(slot, pair) })
	}

	fn load(&self) -> StoreFuture<'_, Option<CredentialPair>> {
		let slot = self.0.clone();

		Box::pin(async move { Ok(Self::load_now(slot)) })
	}

	fn clear(&self) -> StoreFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move { Self::clear_now(slot) })
	}
}
