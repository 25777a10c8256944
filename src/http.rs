//! Transport primitives for authenticated service calls.
//!
//! The module exposes [`HttpTransport`] alongside the replayable [`ApiRequest`] and
//! [`ApiResponse`] value types so downstream crates can integrate custom HTTP clients.
//! Requests carry their full method/URL/header/body state so the gate can resubmit them
//! byte-for-byte after a credential refresh.

// crates.io
use http::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue};
// self
use crate::{
	_prelude::*,
	auth::Token,
	error::{ApiError, ConfigError, TransportError},
};

/// Boxed future returned by [`HttpTransport::execute`].
pub type TransportFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP stacks capable of executing service calls.
///
/// The trait is the gate's only dependency on an HTTP stack. Implementations must be
/// `Send + Sync + 'static` so one transport can be shared across client clones, and the
/// returned futures must own whatever state they need so they remain `Send` for the lifetime
/// of the in-flight call.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Executes one request and collects the full response body.
	fn execute(&self, request: ApiRequest) -> TransportFuture<'_, ApiResponse>;
}

/// One outgoing service call, retained in full so it can be replayed.
#[derive(Clone)]
pub struct ApiRequest {
	/// HTTP method.
	pub method: Method,
	/// Absolute request URL.
	pub url: Url,
	/// Request headers; the bearer credential is attached here by the gate.
	pub headers: HeaderMap,
	/// Raw request body, if any.
	pub body: Option<Vec<u8>>,
}
impl ApiRequest {
	/// Creates a request with the provided method and URL.
	pub fn new(method: Method, url: Url) -> Self {
		Self { method, url, headers: HeaderMap::new(), body: None }
	}

	/// Creates a GET request.
	pub fn get(url: Url) -> Self {
		Self::new(Method::GET, url)
	}

	/// Creates a POST request.
	pub fn post(url: Url) -> Self {
		Self::new(Method::POST, url)
	}

	/// Serializes `payload` as the JSON body and stamps the content type.
	pub fn with_json<T>(mut self, payload: &T) -> Result<Self, ConfigError>
	where
		T: ?Sized + Serialize,
	{
		self.body = Some(serde_json::to_vec(payload)?);
		self.headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

		Ok(self)
	}

	/// Attaches (or replaces) the bearer credential on the request.
	pub(crate) fn bearer(&mut self, token: &Token) -> Result<(), ConfigError> {
		let value = HeaderValue::from_str(&format!("Bearer {}", token.expose()))?;

		self.headers.insert(AUTHORIZATION, value);

		Ok(())
	}
}
impl Debug for ApiRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiRequest")
			.field("method", &self.method)
			.field("url", &self.url.as_str())
			.field("authorized", &self.headers.contains_key(AUTHORIZATION))
			.field("body_bytes", &self.body.as_ref().map(Vec::len))
			.finish()
	}
}

/// Fully collected response for one service call.
#[derive(Clone, Debug)]
pub struct ApiResponse {
	/// HTTP status code.
	pub status: StatusCode,
	/// Response headers.
	pub headers: HeaderMap,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl ApiResponse {
	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		self.status.is_success()
	}

	/// Returns `true` when the endpoint rejected the request's authorization.
	pub fn is_unauthorized(&self) -> bool {
		self.status == StatusCode::UNAUTHORIZED
	}

	/// Deserializes the JSON body, reporting the failing path on mismatch.
	pub fn json<T>(&self) -> Result<T, ApiError>
	where
		T: for<'de> Deserialize<'de>,
	{
		let mut deserializer = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut deserializer).map_err(|source| {
			ApiError::ResponseParse { source, status: Some(self.status.as_u16()) }
		})
	}

	/// Extracts a human-readable failure reason from the response.
	///
	/// Prefers the JSON `detail` field the service emits, then `error`, then the status line.
	pub(crate) fn error_reason(&self) -> String {
		#[derive(Deserialize)]
		struct ErrorBody {
			detail: Option<String>,
			error: Option<String>,
		}

		if let Ok(body) = serde_json::from_slice::<ErrorBody>(&self.body)
			&& let Some(reason) = body.detail.or(body.error)
		{
			return reason;
		}

		self.status
			.canonical_reason()
			.map(str::to_owned)
			.unwrap_or_else(|| self.status.as_u16().to_string())
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// The service speaks plain JSON over HTTP; redirects are left at reqwest's defaults and the
/// gate never follows one across origins because every URL is produced by
/// [`ServiceEndpoints`](crate::endpoint::ServiceEndpoints).
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl std::ops::Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	fn execute(&self, request: ApiRequest) -> TransportFuture<'_, ApiResponse> {
		let client = self.0.clone();

		Box::pin(async move {
			let mut builder =
				client.request(request.method, request.url).headers(request.headers);

			if let Some(body) = request.body {
				builder = builder.body(body);
			}

			let response = builder.send().await.map_err(TransportError::from)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let body = response.bytes().await.map_err(TransportError::from)?.to_vec();

			Ok(ApiResponse { status, headers, body })
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn response(status: StatusCode, body: &[u8]) -> ApiResponse {
		ApiResponse { status, headers: HeaderMap::new(), body: body.to_vec() }
	}

	#[test]
	fn request_debug_redacts_the_bearer() {
		let mut request = ApiRequest::get(Url::parse("https://api.example.com/clients").unwrap());

		request.bearer(&Token::new("top-secret")).expect("Bearer header should be attachable.");

		let rendered = format!("{request:?}");

		assert!(rendered.contains("authorized: true"));
		assert!(!rendered.contains("top-secret"));
	}

	#[test]
	fn error_reason_prefers_detail_field() {
		let detailed = response(StatusCode::UNAUTHORIZED, b"{\"detail\":\"token expired\"}");

		assert_eq!(detailed.error_reason(), "token expired");

		let oauth_style = response(StatusCode::UNAUTHORIZED, b"{\"error\":\"invalid_token\"}");

		assert_eq!(oauth_style.error_reason(), "invalid_token");

		let bare = response(StatusCode::UNAUTHORIZED, b"nonsense");

		assert_eq!(bare.error_reason(), "Unauthorized");
	}

	#[test]
	fn json_reports_the_failing_path() {
		#[derive(Debug, Deserialize)]
		struct Grant {
			#[allow(dead_code)]
			access_token: String,
		}

		let malformed = response(StatusCode::OK, b"{\"access_token\":42}");
		let err = malformed.json::<Grant>().expect_err("Numeric token should fail to parse.");

		assert!(matches!(err, ApiError::ResponseParse { status: Some(200), .. }));
	}
}
