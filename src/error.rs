//! Gate-level error types shared across the client, transport, and stores.

// self
use crate::{_prelude::*, http::ApiResponse};

/// Gate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical gate error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration or request-construction problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Endpoint returned an unexpected or malformed payload.
	#[error(transparent)]
	Api(#[from] ApiError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// A protected request was rejected as unauthorized and no recovery path remained.
	#[error("Request was rejected as unauthorized: {reason}.")]
	Unauthorized {
		/// HTTP status reported by the endpoint.
		status: u16,
		/// Endpoint- or gate-supplied reason string.
		reason: String,
	},
	/// The login endpoint rejected the supplied credentials.
	#[error("Login was rejected: {reason}.")]
	CredentialsRejected {
		/// Endpoint-supplied reason string.
		reason: String,
	},
}
impl Error {
	/// Captures an authorization failure from the response that carried it.
	///
	/// The resulting value preserves the caller's causal context: waiters rejected after a
	/// failed refresh receive the error built from THEIR response, never the refresh error.
	pub fn unauthorized(response: &ApiResponse) -> Self {
		Self::Unauthorized { status: response.status.as_u16(), reason: response.error_reason() }
	}

	/// Returns `true` for the [`Error::Unauthorized`] variant.
	pub fn is_unauthorized(&self) -> bool {
		matches!(self, Self::Unauthorized { .. })
	}
}

/// Configuration and request-construction failures raised by the gate.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Service endpoint configuration is invalid.
	#[error(transparent)]
	Endpoint(#[from] crate::endpoint::EndpointError),
	/// Request body could not be serialized to JSON.
	#[error("Request body could not be serialized.")]
	RequestBody(#[from] serde_json::Error),
	/// Bearer token contains bytes that are not legal in an HTTP header.
	#[error("Bearer token is not a legal header value.")]
	MalformedBearer(#[from] http::header::InvalidHeaderValue),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Unexpected endpoint behavior (bad status for the flow, malformed payloads).
#[derive(Debug, ThisError)]
pub enum ApiError {
	/// Endpoint returned a response the flow cannot use.
	#[error("Endpoint returned an unexpected response: {message}.")]
	UnexpectedResponse {
		/// Endpoint- or gate-supplied message summarizing the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Endpoint responded with malformed JSON that could not be parsed.
	#[error("Endpoint returned malformed JSON.")]
	ResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the service.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the service.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
