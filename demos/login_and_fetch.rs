//! Demonstrates logging in against a mock CRM service and issuing a bearer-decorated request
//! with the default reqwest transport and in-memory credential store.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use session_gate::{
	client::SessionClient,
	endpoint::ServiceEndpoints,
	http::ApiRequest,
	store::{CredentialStore, MemoryStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let login_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/login");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"refresh_token\":\"demo-refresh\",\"token_type\":\"bearer\"}",
			);
		})
		.await;
	let clients_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/clients").header("authorization", "Bearer demo-access");
			then.status(200)
				.header("content-type", "application/json")
				.body("[{\"name\":\"Ana\",\"stage\":\"qualified\"}]");
		})
		.await;
	let store: Arc<dyn CredentialStore> = Arc::new(MemoryStore::default());
	let endpoints = ServiceEndpoints::new(Url::parse(&server.base_url())?)?;
	let client = SessionClient::new(store, endpoints);

	client.login("ana@example.com", "s3cret").await?;

	let url = client.endpoints.url_for("clients")?;
	let response = client.send(ApiRequest::get(url)).await?;

	println!("Fetched {} bytes of client records.", response.body.len());

	login_mock.assert_async().await;
	clients_mock.assert_async().await;

	Ok(())
}
