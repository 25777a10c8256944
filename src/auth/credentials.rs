//! The access/refresh credential pair owned by the store.

// self
use crate::{_prelude::*, auth::Token};

/// Access/refresh token pair for one authenticated session.
///
/// Created on successful login, replaced on successful refresh, destroyed on logout or a
/// terminal refresh failure. The credential store holds the only durable copy; flows borrow
/// tokens from it instead of caching their own.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
	/// Short-lived bearer token attached to every protected request.
	#[serde(rename = "access_token")]
	pub access: Token,
	/// Longer-lived token used solely to mint a new access token.
	#[serde(rename = "refresh_token")]
	pub refresh: Token,
}
impl CredentialPair {
	/// Builds a pair from freshly issued tokens.
	pub fn new(access: Token, refresh: Token) -> Self {
		Self { access, refresh }
	}

	/// Returns `true` when the access token can still authorize requests at the instant.
	pub fn is_active_at(&self, instant: OffsetDateTime) -> bool {
		self.access.is_usable_at(instant)
	}

	/// Returns `true` when the session is worth restoring at the instant.
	///
	/// A usable refresh token qualifies even if the access token already lapsed: the first
	/// authorization failure renews it transparently.
	pub fn is_restorable_at(&self, instant: OffsetDateTime) -> bool {
		self.access.is_usable_at(instant) || self.refresh.is_usable_at(instant)
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
	// self
	use super::*;

	fn jwt(exp: OffsetDateTime) -> Token {
		let payload =
			URL_SAFE_NO_PAD.encode(format!("{{\"sub\":\"u-1\",\"exp\":{}}}", exp.unix_timestamp()));

		Token::new(format!("hdr.{payload}.sig"))
	}

	#[test]
	fn restorable_with_either_token_usable() {
		let now = OffsetDateTime::now_utc();
		let lapsed = CredentialPair::new(jwt(now - Duration::minutes(5)), jwt(now + Duration::days(6)));

		assert!(!lapsed.is_active_at(now));
		assert!(lapsed.is_restorable_at(now));

		let dead =
			CredentialPair::new(jwt(now - Duration::minutes(5)), jwt(now - Duration::minutes(1)));

		assert!(!dead.is_restorable_at(now));
	}

	#[test]
	fn persists_under_the_two_fixed_key_names() {
		let now = OffsetDateTime::now_utc();
		let pair = CredentialPair::new(jwt(now + Duration::minutes(30)), jwt(now + Duration::days(7)));
		let payload =
			serde_json::to_string(&pair).expect("Credential pair should serialize to JSON.");

		assert!(payload.contains("\"access_token\""));
		assert!(payload.contains("\"refresh_token\""));

		let round_trip: CredentialPair = serde_json::from_str(&payload)
			.expect("Serialized credential pair should deserialize from JSON.");

		assert_eq!(round_trip, pair);
	}
}
