//! Redacted bearer token wrapper with embedded-expiry helpers.

// self
use crate::{_prelude::*, auth::claims};

/// Opaque bearer token keeping sensitive material out of logs.
///
/// Validity is determined by decoding the embedded `exp` claim; a token whose payload cannot
/// be decoded is treated as expired.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token(String);
impl Token {
	/// Wraps a new token string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Returns the expiry instant embedded in the token, if it decodes.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		claims::decode_expiry(&self.0)
	}

	/// Returns `true` when the token is expired at the provided instant.
	///
	/// Structurally invalid tokens are expired by definition.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at().is_none_or(|expiry| instant >= expiry)
	}

	/// Returns `true` when the token can still authorize requests at the provided instant.
	pub fn is_usable_at(&self, instant: OffsetDateTime) -> bool {
		!self.is_expired_at(instant)
	}
}
impl AsRef<str> for Token {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for Token {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("Token").field(&"<redacted>").finish()
	}
}
impl Display for Token {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
	use time::macros;
	// self
	use super::*;

	fn jwt(exp: i64) -> Token {
		let payload = URL_SAFE_NO_PAD.encode(format!("{{\"sub\":\"u-1\",\"exp\":{exp}}}"));

		Token::new(format!("hdr.{payload}.sig"))
	}

	#[test]
	fn token_formatters_redact() {
		let token = Token::new("super-secret");

		assert_eq!(format!("{token:?}"), "Token(\"<redacted>\")");
		assert_eq!(format!("{token}"), "<redacted>");
	}

	#[test]
	fn expiry_comparisons_use_the_embedded_claim() {
		let expiry = macros::datetime!(2025-06-01 12:00 UTC);
		let token = jwt(expiry.unix_timestamp());

		assert!(token.is_usable_at(macros::datetime!(2025-06-01 11:59 UTC)));
		assert!(token.is_expired_at(expiry));
		assert!(token.is_expired_at(macros::datetime!(2025-06-01 12:01 UTC)));
	}

	#[test]
	fn opaque_garbage_counts_as_expired() {
		let token = Token::new("not-a-jwt");

		assert!(token.expires_at().is_none());
		assert!(token.is_expired_at(OffsetDateTime::now_utc()));
	}
}
