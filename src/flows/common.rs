//! Shared helpers for flow implementations (form bodies, token responses, diagnostics).

// crates.io
use url::form_urlencoded;
// self
use crate::{_prelude::*, auth::CredentialPair, error::HandshakeCause, http::HttpResponse};

/// Content type of every request body the broker sends.
pub(crate) const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

const BODY_PREVIEW_LIMIT: usize = 256;

/// Encodes `params` as an `application/x-www-form-urlencoded` body.
pub(crate) fn form_body(params: &[(String, String)]) -> String {
	form_urlencoded::Serializer::new(String::new())
		.extend_pairs(params.iter().map(|(key, value)| (key.as_str(), value.as_str())))
		.finish()
}

/// Parses `oauth_token` + `oauth_token_secret` from a form-encoded token response.
///
/// Non-2xx statuses map to [`HandshakeCause::Rejected`]; missing or empty fields map to
/// [`HandshakeCause::MalformedResponse`]. Additional fields such as
/// `oauth_callback_confirmed` are ignored.
pub(crate) fn parse_token_response(response: &HttpResponse) -> Result<CredentialPair, HandshakeCause> {
	if !response.is_success() {
		return Err(HandshakeCause::Rejected {
			status: response.status,
			body: body_preview(&response.body),
		});
	}

	let mut token = None;
	let mut secret = None;

	for (key, value) in form_urlencoded::parse(&response.body) {
		match key.as_ref() {
			"oauth_token" => token = Some(value.into_owned()),
			"oauth_token_secret" => secret = Some(value.into_owned()),
			_ => {},
		}
	}

	let token = token
		.filter(|value| !value.is_empty())
		.ok_or(HandshakeCause::MalformedResponse { field: "oauth_token" })?;
	let secret = secret
		.filter(|value| !value.is_empty())
		.ok_or(HandshakeCause::MalformedResponse { field: "oauth_token_secret" })?;

	CredentialPair::new(token, secret)
		.map_err(|_| HandshakeCause::MalformedResponse { field: "oauth_token" })
}

/// Lossy, truncated rendering of a response body for error diagnostics.
pub(crate) fn body_preview(body: &[u8]) -> String {
	let text = String::from_utf8_lossy(body);
	let trimmed = text.trim();

	match trimmed.char_indices().nth(BODY_PREVIEW_LIMIT) {
		Some((idx, _)) => format!("{}…", &trimmed[..idx]),
		None => trimmed.to_owned(),
	}
}
