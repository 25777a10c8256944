//! Session establishment and teardown: login, logout, startup restoration.

// self
use crate::{
	_prelude::*,
	auth::{CredentialPair, Token},
	client::{
		SessionClient,
		wire::{LoginBody, TokenGrant},
	},
	error::ApiError,
	http::{ApiRequest, HttpTransport},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	session::LogoutReason,
};

impl<C> SessionClient<C>
where
	C: ?Sized + HttpTransport,
{
	/// Exchanges credentials for a token pair and activates the session.
	///
	/// The login endpoint is exempt from bearer decoration and from the refresh protocol, so
	/// a rejection surfaces directly as [`Error::CredentialsRejected`] with the endpoint's
	/// human-readable reason.
	pub async fn login(&self, email: &str, password: &str) -> Result<CredentialPair> {
		const KIND: FlowKind = FlowKind::Login;

		let span = FlowSpan::new(KIND, "login");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let request = ApiRequest::post(self.endpoints.login.clone())
					.with_json(&LoginBody { email, password })?;
				let response = self.send(request).await?;

				if !response.is_success() {
					return Err(Error::CredentialsRejected { reason: response.error_reason() });
				}

				let grant = response.json::<TokenGrant>()?;
				let refresh = grant.refresh_token.ok_or_else(|| ApiError::UnexpectedResponse {
					message: "login response is missing refresh_token".into(),
					status: Some(response.status.as_u16()),
				})?;
				let pair = CredentialPair::new(Token::new(grant.access_token), Token::new(refresh));

				self.store.save(pair.clone()).await?;
				self.signal.activate();

				Ok(pair)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Tears the session down on the caller's behalf.
	///
	/// Returns `true` when a logout event was emitted; terminating an already-terminated
	/// session is a no-op returning `false`.
	pub async fn logout(&self) -> Result<bool> {
		self.terminate_session(LogoutReason::UserInitiated).await
	}

	/// Restores a previous session at startup.
	///
	/// Returns `true` (and marks the session active) when the store holds a pair whose
	/// access or refresh token is still unexpired; an expired or absent pair leaves the
	/// session inactive for the caller to route to login.
	pub async fn restore_session(&self) -> Result<bool> {
		let now = OffsetDateTime::now_utc();

		match self.store.load().await? {
			Some(pair) if pair.is_restorable_at(now) => {
				self.signal.activate();

				Ok(true)
			},
			_ => Ok(false),
		}
	}

	/// Clears the credential store and emits at most one logout event.
	pub(crate) async fn terminate_session(&self, reason: LogoutReason) -> Result<bool> {
		const KIND: FlowKind = FlowKind::Logout;

		let span = FlowSpan::new(KIND, "terminate_session");
		let emitted = span
			.instrument(async move {
				let had_credentials = self.store.load().await?.is_some();

				self.store.clear().await?;

				Ok::<_, Error>(self.signal.terminate(had_credentials, reason))
			})
			.await?;

		if emitted {
			obs::record_flow_outcome(KIND, FlowOutcome::Success);
		}

		Ok(emitted)
	}
}
