// crates.io
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
// self
use crate::_prelude::*;

/// Claims the gate cares about; everything else in the payload is ignored.
#[derive(Debug, Deserialize)]
struct Claims {
	exp: i64,
}

/// Decodes the expiry instant embedded in a JWT-shaped bearer token.
///
/// Returns `None` when the token is structurally invalid (wrong segment count, bad base64url,
/// malformed JSON, out-of-range timestamp); callers treat that as expired.
pub(crate) fn decode_expiry(raw: &str) -> Option<OffsetDateTime> {
	let mut segments = raw.split('.');
	let payload = match (segments.next(), segments.next(), segments.next(), segments.next()) {
		(Some(_), Some(payload), Some(_), None) => payload,
		_ => return None,
	};
	let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
	let claims = serde_json::from_slice::<Claims>(&bytes).ok()?;

	OffsetDateTime::from_unix_timestamp(claims.exp).ok()
}
