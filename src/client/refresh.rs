//! Single-flight credential refresh with an explicit state machine and FIFO waiter queue.
//!
//! The client keeps one [`RefreshPhase`] per instance. The first request whose authorization
//! fails flips it from `Idle` to `Refreshing` and becomes the leader: it performs the one
//! network call against the refresh endpoint. Every other request failing authorization in
//! that window enqueues a continuation instead of refreshing again, suspends, and receives
//! the shared [`RefreshOutcome`] when the leader settles. The observe-state/commit decision
//! in [`SessionClient::join_refresh`] happens under one lock with no suspension point, so
//! two callers can never both elect themselves leader.

mod metrics;

pub use metrics::RefreshMetrics;

// crates.io
use tokio::sync::oneshot;
// self
use crate::{
	_prelude::*,
	auth::{CredentialPair, Token},
	client::{SessionClient, wire::{RefreshBody, TokenGrant}},
	error::ApiError,
	http::{ApiRequest, HttpTransport},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	session::LogoutReason,
};

/// Outcome distributed to the leader and every queued waiter when a refresh settles.
#[derive(Clone, Debug)]
pub(crate) enum RefreshOutcome {
	/// A new access token was minted and written to the store.
	Renewed(Token),
	/// Recovery failed; the session has been terminated.
	LoggedOut,
}

/// How a request failing authorization participates in the in-flight refresh.
#[derive(Debug)]
pub(crate) enum RefreshRole {
	/// This request flipped `Idle -> Refreshing` and must run the refresh.
	Leader,
	/// A refresh is already in flight; suspend until it settles.
	Waiter(oneshot::Receiver<RefreshOutcome>),
}

/// Refresh coordinator state. The waiter queue lives inside the `Refreshing` variant so it
/// is structurally empty whenever the coordinator is idle.
#[derive(Debug, Default)]
pub(crate) enum RefreshPhase {
	#[default]
	/// No refresh in flight.
	Idle,
	/// Exactly one refresh in flight; concurrent failures queue here.
	Refreshing {
		/// Pending continuations in arrival order.
		waiters: WaiterQueue,
	},
}

/// Strict FIFO queue of suspended continuations.
///
/// Enqueue appends; settling takes every entry in original order. No entry is ever dropped
/// silently: each enqueued waiter receives exactly one outcome.
#[derive(Debug, Default)]
pub(crate) struct WaiterQueue(VecDeque<oneshot::Sender<RefreshOutcome>>);
impl WaiterQueue {
	fn enqueue(&mut self, waiter: oneshot::Sender<RefreshOutcome>) {
		self.0.push_back(waiter);
	}

	fn take(&mut self) -> VecDeque<oneshot::Sender<RefreshOutcome>> {
		std::mem::take(&mut self.0)
	}
}

/// Settles the coordinator with [`RefreshOutcome::LoggedOut`] if the leader's future is
/// dropped mid-refresh, so queued waiters are never stranded in a `Refreshing` phase nobody
/// owns. Callers cannot cancel queued requests, but the leader's own task can still vanish
/// with its executor.
struct SettleOnDrop<'a, C>
where
	C: ?Sized + HttpTransport,
{
	client: &'a SessionClient<C>,
	armed: bool,
}
impl<C> SettleOnDrop<'_, C>
where
	C: ?Sized + HttpTransport,
{
	fn disarm(mut self) {
		self.armed = false;
	}
}
impl<C> Drop for SettleOnDrop<'_, C>
where
	C: ?Sized + HttpTransport,
{
	fn drop(&mut self) {
		if self.armed {
			self.client.settle_refresh(&RefreshOutcome::LoggedOut);
		}
	}
}

impl<C> SessionClient<C>
where
	C: ?Sized + HttpTransport,
{
	/// Atomically observes the refresh state and commits to a role.
	///
	/// Must not suspend between observing and committing; the whole decision runs under the
	/// phase lock.
	pub(crate) fn join_refresh(&self) -> RefreshRole {
		let mut phase = self.refresh_phase.lock();

		match &mut *phase {
			RefreshPhase::Idle => {
				*phase = RefreshPhase::Refreshing { waiters: WaiterQueue::default() };

				RefreshRole::Leader
			},
			RefreshPhase::Refreshing { waiters } => {
				let (tx, rx) = oneshot::channel();

				waiters.enqueue(tx);
				self.refresh_metrics.record_queued();

				RefreshRole::Waiter(rx)
			},
		}
	}

	/// Runs the single refresh attempt as the leader, settles every waiter, and returns the
	/// outcome the leader itself should act on.
	pub(crate) async fn run_refresh(&self) -> RefreshOutcome {
		const KIND: FlowKind = FlowKind::Refresh;

		let span = FlowSpan::new(KIND, "run_refresh");
		let guard = SettleOnDrop { client: self, armed: true };

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);
		self.refresh_metrics.record_attempt();

		let outcome = span
			.instrument(async move {
				match self.attempt_refresh().await {
					Ok(access) => RefreshOutcome::Renewed(access),
					Err(err) => {
						// Waiters keep their own authorization errors; the refresh error
						// surfaces only through the logout signal.
						let reason = err.to_string();
						let _ = self
							.terminate_session(LogoutReason::RefreshFailed { reason })
							.await;

						RefreshOutcome::LoggedOut
					},
				}
			})
			.await;

		match &outcome {
			RefreshOutcome::Renewed(_) => {
				obs::record_flow_outcome(KIND, FlowOutcome::Success);
				self.refresh_metrics.record_success();
			},
			RefreshOutcome::LoggedOut => {
				obs::record_flow_outcome(KIND, FlowOutcome::Failure);
				self.refresh_metrics.record_failure();
			},
		}

		guard.disarm();
		self.settle_refresh(&outcome);

		outcome
	}

	/// Returns the coordinator to `Idle` and resolves every queued waiter in FIFO order.
	///
	/// The state transition and the queue drain happen under one lock acquisition; the sends
	/// themselves run after it since the channels never block.
	fn settle_refresh(&self, outcome: &RefreshOutcome) {
		let waiters = {
			let mut phase = self.refresh_phase.lock();

			match std::mem::take(&mut *phase) {
				RefreshPhase::Refreshing { mut waiters } => waiters.take(),
				RefreshPhase::Idle => VecDeque::new(),
			}
		};

		for waiter in waiters {
			// A send fails only when the suspended caller was dropped mid-flight.
			let _ = waiter.send(outcome.clone());
		}
	}

	/// Exchanges the stored refresh token for a new access token and persists the result.
	///
	/// A missing pair skips the network attempt entirely: the call is guaranteed to fail
	/// without a refresh token. The store is updated before any waiter observes the outcome.
	async fn attempt_refresh(&self) -> Result<Token> {
		let Some(pair) = self.store.load().await? else {
			return Err(ApiError::UnexpectedResponse {
				message: "no refresh token is available".into(),
				status: None,
			}
			.into());
		};
		let request = ApiRequest::post(self.endpoints.refresh.clone())
			.with_json(&RefreshBody { refresh_token: pair.refresh.expose() })?;
		let response = self.transport.execute(request).await?;

		if !response.is_success() {
			return Err(ApiError::UnexpectedResponse {
				message: response.error_reason(),
				status: Some(response.status.as_u16()),
			}
			.into());
		}

		let grant = response.json::<TokenGrant>()?;
		let access = Token::new(grant.access_token);
		// The service may echo the same refresh token or rotate it; absent means keep ours.
		let refresh = grant.refresh_token.map(Token::new).unwrap_or(pair.refresh);

		self.store.save(CredentialPair::new(access.clone(), refresh)).await?;

		Ok(access)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		endpoint::ServiceEndpoints,
		error::TransportError,
		http::{ApiResponse, TransportFuture},
		store::MemoryStore,
	};

	struct NullTransport;
	impl HttpTransport for NullTransport {
		fn execute(&self, _: ApiRequest) -> TransportFuture<'_, ApiResponse> {
			Box::pin(async {
				Err(TransportError::Io(std::io::Error::other("no network in unit tests")))
			})
		}
	}

	fn test_client() -> SessionClient<NullTransport> {
		let endpoints = ServiceEndpoints::new(Url::parse("https://crm.example.com/").unwrap())
			.expect("Test endpoints should build.");

		SessionClient::with_transport(Arc::new(MemoryStore::default()), endpoints, NullTransport)
	}

	#[test]
	fn first_caller_leads_followers_queue() {
		let client = test_client();

		assert!(matches!(client.join_refresh(), RefreshRole::Leader));
		assert!(matches!(client.join_refresh(), RefreshRole::Waiter(_)));
		assert!(matches!(client.join_refresh(), RefreshRole::Waiter(_)));
		assert_eq!(client.refresh_metrics.queued(), 2);
	}

	#[test]
	fn settle_returns_to_idle_and_resolves_every_waiter_once() {
		let client = test_client();

		assert!(matches!(client.join_refresh(), RefreshRole::Leader));

		let mut receivers = Vec::new();

		for _ in 0..3 {
			match client.join_refresh() {
				RefreshRole::Waiter(rx) => receivers.push(rx),
				RefreshRole::Leader => panic!("A second leader must never be elected."),
			}
		}

		client.settle_refresh(&RefreshOutcome::LoggedOut);

		for mut rx in receivers {
			assert!(matches!(rx.try_recv(), Ok(RefreshOutcome::LoggedOut)));
			assert!(rx.try_recv().is_err());
		}

		// Settled coordinator accepts a fresh leader.
		assert!(matches!(client.join_refresh(), RefreshRole::Leader));
	}

	#[test]
	fn waiter_queue_preserves_arrival_order() {
		let mut queue = WaiterQueue::default();
		let mut receivers = Vec::new();

		for _ in 0..3 {
			let (tx, rx) = oneshot::channel();

			queue.enqueue(tx);
			receivers.push(rx);
		}

		for (position, waiter) in queue.take().into_iter().enumerate() {
			waiter
				.send(RefreshOutcome::Renewed(Token::new(format!("slot-{position}"))))
				.expect("Waiter receiver should still be alive.");
		}

		for (position, mut rx) in receivers.into_iter().enumerate() {
			match rx.try_recv().expect("Every waiter should have been resolved.") {
				RefreshOutcome::Renewed(token) =>
					assert_eq!(token.expose(), format!("slot-{position}")),
				RefreshOutcome::LoggedOut => panic!("Waiters should have been renewed."),
			}
		}
	}
}
