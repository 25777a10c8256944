//! The authenticated client: request decoration, single-flight refresh, session lifecycle.

pub mod refresh;
pub use refresh::RefreshMetrics;

mod login;
mod send;
mod wire;

// self
use crate::{
	_prelude::*,
	client::refresh::RefreshPhase,
	endpoint::ServiceEndpoints,
	http::HttpTransport,
	session::SessionSignal,
	store::CredentialStore,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport stack.
pub type ReqwestSessionClient = SessionClient<ReqwestTransport>;

/// Authenticated request sender for one service.
///
/// The client owns the transport, credential store, endpoint set, and session signal so the
/// individual flows can focus on protocol logic (bearer decoration, the refresh/replay
/// state machine, login exchanges). Credential state and refresh state are per-instance, so
/// tests can run any number of independent clients; clones share all of it.
pub struct SessionClient<C>
where
	C: ?Sized + HttpTransport,
{
	/// HTTP transport used for every outbound request.
	pub transport: Arc<C>,
	/// Credential store holding the session's token pair.
	pub store: Arc<dyn CredentialStore>,
	/// Validated endpoint set for the fronted service.
	pub endpoints: ServiceEndpoints,
	/// Session lifecycle signal; subscribe for logout events.
	pub signal: Arc<SessionSignal>,
	/// Shared counters for refresh flow outcomes.
	pub refresh_metrics: Arc<RefreshMetrics>,
	refresh_phase: Arc<Mutex<RefreshPhase>>,
}
impl<C> SessionClient<C>
where
	C: ?Sized + HttpTransport,
{
	/// Creates a client that reuses the caller-provided transport.
	pub fn with_transport(
		store: Arc<dyn CredentialStore>,
		endpoints: ServiceEndpoints,
		transport: impl Into<Arc<C>>,
	) -> Self {
		Self {
			transport: transport.into(),
			store,
			endpoints,
			signal: Default::default(),
			refresh_metrics: Default::default(),
			refresh_phase: Default::default(),
		}
	}
}
#[cfg(feature = "reqwest")]
impl SessionClient<ReqwestTransport> {
	/// Creates a new client for the provided store and endpoint set.
	///
	/// The client provisions its own reqwest-backed transport so callers do not need to pass
	/// HTTP handles explicitly; use [`SessionClient::with_transport`] to supply a customized
	/// one.
	pub fn new(store: Arc<dyn CredentialStore>, endpoints: ServiceEndpoints) -> Self {
		Self::with_transport(store, endpoints, ReqwestTransport::default())
	}
}
impl<C> Clone for SessionClient<C>
where
	C: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			store: self.store.clone(),
			endpoints: self.endpoints.clone(),
			signal: self.signal.clone(),
			refresh_metrics: self.refresh_metrics.clone(),
			refresh_phase: self.refresh_phase.clone(),
		}
	}
}
impl<C> Debug for SessionClient<C>
where
	C: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionClient")
			.field("endpoints", &self.endpoints)
			.field("session_active", &self.signal.is_active())
			.finish()
	}
}
