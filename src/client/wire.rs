// self
use crate::_prelude::*;

/// Login request payload.
#[derive(Debug, Serialize)]
pub(crate) struct LoginBody<'a> {
	pub email: &'a str,
	pub password: &'a str,
}

/// Refresh request payload.
#[derive(Debug, Serialize)]
pub(crate) struct RefreshBody<'a> {
	pub refresh_token: &'a str,
}

/// Token payload returned by the login and refresh endpoints.
///
/// Login responses carry both tokens; refresh responses are free to omit `refresh_token`
/// (the stored one stays in effect) or rotate it.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenGrant {
	pub access_token: String,
	#[serde(default)]
	pub refresh_token: Option<String>,
	#[serde(default)]
	#[allow(dead_code)]
	pub token_type: Option<String>,
}
