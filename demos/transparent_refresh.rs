//! Demonstrates the single-flight refresh protocol: a request carrying an expired access
//! token is transparently renewed and replayed, and an explicit logout reaches the session
//! signal's subscribers.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use session_gate::{
	auth::{CredentialPair, Token},
	client::SessionClient,
	endpoint::ServiceEndpoints,
	http::ApiRequest,
	store::{CredentialStore, MemoryStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/appointments").header("authorization", "Bearer stale-access");
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"detail\":\"Token expired\"}");
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/appointments").header("authorization", "Bearer fresh-access");
			then.status(200).header("content-type", "application/json").body("[]");
		})
		.await;

	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"fresh-access\",\"refresh_token\":\"fresh-refresh\",\"token_type\":\"bearer\"}",
			);
		})
		.await;
	let backend = Arc::new(MemoryStore::default());
	let store: Arc<dyn CredentialStore> = backend.clone();

	backend
		.save(CredentialPair::new(Token::new("stale-access"), Token::new("stale-refresh")))
		.await?;

	let endpoints = ServiceEndpoints::new(Url::parse(&server.base_url())?)?;
	let client = SessionClient::new(store, endpoints);
	let mut listener = client.signal.subscribe();
	let url = client.endpoints.url_for("appointments")?;
	let response = client.send(ApiRequest::get(url)).await?;

	println!(
		"Replayed request completed with {} after {} refresh attempt(s).",
		response.status,
		client.refresh_metrics.attempts(),
	);

	refresh_mock.assert_async().await;
	client.logout().await?;

	if let Some(reason) = listener.try_recv() {
		println!("Session ended: {reason:?}.");
	}

	Ok(())
}
