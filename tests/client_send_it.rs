#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use session_gate::{
	_preludet::*,
	auth::{CredentialPair, Token},
	endpoint::ServiceEndpoints,
	http::ApiRequest,
	store::CredentialStore,
};

fn endpoints(server: &MockServer) -> ServiceEndpoints {
	ServiceEndpoints::new(
		Url::parse(&server.base_url()).expect("Mock server base URL should parse."),
	)
	.expect("Service endpoints should build for the mock server.")
}

#[tokio::test]
async fn requests_carry_the_stored_bearer_credential() {
	let server = MockServer::start_async().await;
	let (client, store) = build_reqwest_test_client(endpoints(&server));

	store
		.save(CredentialPair::new(Token::new("seeded-access"), Token::new("seeded-refresh")))
		.await
		.expect("Failed to seed credential pair into the store.");

	let protected = server
		.mock_async(|when, then| {
			when.method(GET).path("/clients").header("authorization", "Bearer seeded-access");
			then.status(200).header("content-type", "application/json").body("[]");
		})
		.await;
	let url = client.endpoints.url_for("clients").expect("Request URL should resolve.");
	let response = client
		.send(ApiRequest::get(url))
		.await
		.expect("Decorated request should reach the endpoint.");

	protected.assert_async().await;

	assert!(response.is_success());
}

#[tokio::test]
async fn non_authorization_failures_propagate_unchanged() {
	let server = MockServer::start_async().await;
	let (client, store) = build_reqwest_test_client(endpoints(&server));

	store
		.save(CredentialPair::new(Token::new("seeded-access"), Token::new("seeded-refresh")))
		.await
		.expect("Failed to seed credential pair into the store.");

	let _flaky = server
		.mock_async(|when, then| {
			when.method(GET).path("/appointments");
			then.status(500)
				.header("content-type", "application/json")
				.body("{\"detail\":\"calendar backend is down\"}");
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"never-minted\"}");
		})
		.await;
	let url = client.endpoints.url_for("appointments").expect("Request URL should resolve.");
	let response = client
		.send(ApiRequest::get(url))
		.await
		.expect("Server errors other than 401 should be returned, not raised.");

	assert_eq!(response.status.as_u16(), 500);

	refresh.assert_calls_async(0).await;
}

#[tokio::test]
async fn refresh_endpoint_rejections_never_recurse() {
	let server = MockServer::start_async().await;
	let (client, _store) = build_reqwest_test_client(endpoints(&server));
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh");
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"detail\":\"Refresh token expired\"}");
		})
		.await;
	let request = ApiRequest::post(client.endpoints.refresh.clone());
	let response = client
		.send(request)
		.await
		.expect("Exempt endpoints return their responses verbatim.");

	assert!(response.is_unauthorized());

	// Exactly one call proves the 401 did not re-enter the refresh protocol.
	refresh.assert_calls_async(1).await;
}
