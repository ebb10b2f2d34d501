//! User-facing authorization URL construction.

// self
use crate::{
	_prelude::*,
	flows::Broker,
	http::HttpTransport,
	store::{TokenStateError, TokenStateKind},
};

/// Appends `oauth_token` and, when present, `oauth_callback` to `base`.
///
/// Existing query pairs on `base` are preserved. Values use form query encoding, so
/// `https://cb/` becomes `https%3A%2F%2Fcb%2F`.
pub fn build_authorize_url(base: &Url, request_token: &str, callback: Option<&str>) -> Url {
	let mut url = base.clone();

	{
		let mut pairs = url.query_pairs_mut();

		pairs.append_pair("oauth_token", request_token);

		if let Some(callback) = callback {
			pairs.append_pair("oauth_callback", callback);
		}
	}

	url
}

impl<C> Broker<C>
where
	C: ?Sized + HttpTransport,
{
	/// Builds the authorize-page URL for `request_token` using the descriptor's endpoint.
	pub fn authorize_url(&self, request_token: &str, callback: Option<&str>) -> Url {
		build_authorize_url(&self.descriptor.endpoints.authorize, request_token, callback)
	}

	/// Builds the authorize-page URL for the stored request token.
	///
	/// Falls back to the descriptor's callback when `callback` is `None`.
	pub fn authorize_url_for_current(&self, callback: Option<&str>) -> Result<Url> {
		let request = self.current_request_token().ok_or_else(|| match self.token_state() {
			TokenStateKind::AccessTokenObtained => TokenStateError::AlreadyAuthorized,
			_ => TokenStateError::RequestTokenMissing,
		})?;
		let fallback = self.descriptor.callback.as_ref().map(Url::as_str);

		Ok(self.authorize_url(request.token(), callback.or(fallback)))
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::flows::test_support::*;

	#[test]
	fn authorize_url_encodes_token_and_callback() {
		let base = Url::parse("https://api.example.com/oauth/authorize.php")
			.expect("Fixture URL should parse.");

		assert_eq!(
			build_authorize_url(&base, "RT", Some("https://cb/")).as_str(),
			"https://api.example.com/oauth/authorize.php?oauth_token=RT&oauth_callback=https%3A%2F%2Fcb%2F"
		);
		assert_eq!(
			build_authorize_url(&base, "R T", None).as_str(),
			"https://api.example.com/oauth/authorize.php?oauth_token=R+T"
		);
	}

	#[test]
	fn authorize_url_keeps_existing_query() {
		let base = Url::parse("https://api.example.com/authorize.php?lang=en")
			.expect("Fixture URL should parse.");

		assert_eq!(
			build_authorize_url(&base, "RT", None).as_str(),
			"https://api.example.com/authorize.php?lang=en&oauth_token=RT"
		);
	}

	#[test]
	fn current_request_token_drives_the_broker_url() {
		let (broker, _) = broker(RecordingTransport::default());

		assert!(matches!(
			broker.authorize_url_for_current(None),
			Err(Error::TokenState(TokenStateError::RequestTokenMissing))
		));

		broker
			.tokens
			.write()
			.set_request_token(pair_of("RT", "RS"))
			.expect("Request token should be accepted.");

		let url = broker.authorize_url_for_current(None).expect("Stored token should be used.");

		assert_eq!(
			url.as_str(),
			"https://api.example.com/oauth/authorize.php?oauth_token=RT&oauth_callback=https%3A%2F%2Fcb%2F"
		);

		let url = broker
			.authorize_url_for_current(Some("https://other/"))
			.expect("Explicit callback should win.");

		assert_eq!(url.query_pairs().nth(1).map(|(_, v)| v.into_owned()), Some("https://other/".into()));
	}
}
