//! Validated service endpoint configuration shared by every flow.
//!
//! The gate needs to know exactly two things about the service it fronts: where to log in
//! and where to refresh. Both URLs are resolved against one base at construction time so the
//! exemption check (login/refresh calls must never trigger the refresh path themselves) is a
//! plain URL comparison at request time.

// self
use crate::_prelude::*;

const DEFAULT_LOGIN_PATH: &str = "auth/login";
const DEFAULT_REFRESH_PATH: &str = "auth/refresh";

/// Errors raised while constructing or validating endpoints.
#[derive(Debug, ThisError)]
pub enum EndpointError {
	/// Base URL cannot serve as a base for relative paths.
	#[error("Base URL `{url}` cannot be a base.")]
	CannotBeABase {
		/// Offending base URL.
		url: String,
	},
	/// Endpoint path is empty.
	#[error("The {endpoint} endpoint path must not be empty.")]
	EmptyPath {
		/// Which endpoint failed validation.
		endpoint: &'static str,
	},
	/// Endpoint path does not resolve against the base URL.
	#[error("The {endpoint} endpoint path does not resolve against the base URL.")]
	UnresolvablePath {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}

/// Immutable endpoint set consumed by the client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceEndpoints {
	/// Base URL every request path resolves against.
	pub base: Url,
	/// Login endpoint; exempt from decoration and refresh.
	pub login: Url,
	/// Refresh endpoint; exempt from decoration and refresh.
	pub refresh: Url,
}
impl ServiceEndpoints {
	/// Creates endpoints with the service's default `auth/login` + `auth/refresh` paths.
	pub fn new(base: Url) -> Result<Self, EndpointError> {
		Self::builder(base).build()
	}

	/// Creates a new builder for the provided base URL.
	pub fn builder(base: Url) -> ServiceEndpointsBuilder {
		ServiceEndpointsBuilder::new(base)
	}

	/// Resolves a request path against the base URL.
	pub fn url_for(&self, path: &str) -> Result<Url, EndpointError> {
		join(&self.base, "request", path)
	}

	/// Returns `true` when the URL targets the login or refresh endpoint.
	///
	/// Exempt requests carry no bearer credential and must never enter the refresh path; the
	/// comparison ignores query and fragment so `login?next=...` stays exempt.
	pub fn is_exempt(&self, url: &Url) -> bool {
		same_resource(url, &self.login) || same_resource(url, &self.refresh)
	}
}

fn same_resource(candidate: &Url, endpoint: &Url) -> bool {
	candidate.scheme() == endpoint.scheme()
		&& candidate.host_str() == endpoint.host_str()
		&& candidate.port_or_known_default() == endpoint.port_or_known_default()
		&& candidate.path() == endpoint.path()
}

fn join(base: &Url, endpoint: &'static str, path: &str) -> Result<Url, EndpointError> {
	if path.is_empty() {
		return Err(EndpointError::EmptyPath { endpoint });
	}

	base.join(path).map_err(|source| EndpointError::UnresolvablePath { endpoint, source })
}

/// Builder for [`ServiceEndpoints`] values.
#[derive(Debug)]
pub struct ServiceEndpointsBuilder {
	/// Base URL every request path resolves against.
	pub base: Url,
	/// Login endpoint path relative to the base.
	pub login_path: String,
	/// Refresh endpoint path relative to the base.
	pub refresh_path: String,
}
impl ServiceEndpointsBuilder {
	/// Creates a new builder seeded with the provided base URL.
	pub fn new(base: Url) -> Self {
		Self {
			base,
			login_path: DEFAULT_LOGIN_PATH.into(),
			refresh_path: DEFAULT_REFRESH_PATH.into(),
		}
	}

	/// Overrides the login endpoint path.
	pub fn login_path(mut self, path: impl Into<String>) -> Self {
		self.login_path = path.into();

		self
	}

	/// Overrides the refresh endpoint path.
	pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
		self.refresh_path = path.into();

		self
	}

	/// Validates the configuration and produces a [`ServiceEndpoints`].
	pub fn build(self) -> Result<ServiceEndpoints, EndpointError> {
		if self.base.cannot_be_a_base() {
			return Err(EndpointError::CannotBeABase { url: self.base.into() });
		}

		let login = join(&self.base, "login", &self.login_path)?;
		let refresh = join(&self.base, "refresh", &self.refresh_path)?;

		Ok(ServiceEndpoints { base: self.base, login, refresh })
	}
}
