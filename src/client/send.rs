//! Decorated request dispatch with the transparent refresh-and-replay protocol.

// self
use crate::{
	_prelude::*,
	auth::Token,
	client::{
		SessionClient,
		refresh::{RefreshOutcome, RefreshRole},
	},
	http::{ApiRequest, ApiResponse, HttpTransport},
};

impl<C> SessionClient<C>
where
	C: ?Sized + HttpTransport,
{
	/// Sends one request, transparently recovering from an expired access token.
	///
	/// The request is decorated with the stored bearer credential (absent credential means it
	/// goes out unauthenticated and fails naturally against protected endpoints). A 401 on a
	/// protected request enters the single-flight refresh protocol and is replayed at most
	/// once; if no recovery path remains the call returns [`Error::Unauthorized`]. Responses
	/// for the login/refresh endpoints, like every non-authorization status, are returned
	/// verbatim for the caller to interpret.
	pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
		if self.endpoints.is_exempt(&request.url) {
			return self.dispatch(request, true).await;
		}

		let response = self.dispatch(request.clone(), false).await?;

		if !response.is_unauthorized() {
			return Ok(response);
		}

		self.recover_unauthorized(request, response).await
	}

	async fn dispatch(&self, mut request: ApiRequest, exempt: bool) -> Result<ApiResponse> {
		if !exempt && let Some(pair) = self.store.load().await? {
			request.bearer(&pair.access)?;
		}

		Ok(self.transport.execute(request).await?)
	}

	/// Drives one authorization failure through the refresh coordinator.
	///
	/// The caller's original authorization error is captured up front and is the only error
	/// it can receive from here: a failed refresh never substitutes its own.
	async fn recover_unauthorized(
		&self,
		request: ApiRequest,
		response: ApiResponse,
	) -> Result<ApiResponse> {
		let original = Error::unauthorized(&response);
		let outcome = match self.join_refresh() {
			RefreshRole::Leader => self.run_refresh().await,
			RefreshRole::Waiter(rx) => rx.await.unwrap_or(RefreshOutcome::LoggedOut),
		};

		match outcome {
			RefreshOutcome::Renewed(access) => self.replay(request, &access).await,
			RefreshOutcome::LoggedOut => Err(original),
		}
	}

	/// Resubmits the original request exactly once with the renewed credential.
	///
	/// A second authorization failure here is terminal for this request; it surfaces without
	/// touching the refresh coordinator again.
	async fn replay(&self, mut request: ApiRequest, access: &Token) -> Result<ApiResponse> {
		request.bearer(access)?;

		let response = self.transport.execute(request).await?;

		if response.is_unauthorized() {
			return Err(Error::unauthorized(&response));
		}

		Ok(response)
	}
}
