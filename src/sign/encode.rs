//! RFC 3986 percent-encoding and signature base string construction.

// std
use std::borrow::Cow;
// self
use crate::{_prelude::*, http::HttpMethod};

/// Percent-encodes `value`, leaving only RFC 3986 unreserved characters intact.
pub fn percent_encode(value: &str) -> Cow<'_, str> {
	urlencoding::encode(value)
}

/// Returns the base string URI without userinfo, query, or fragment.
///
/// [`Url`] already lower-cases the scheme and host and drops default ports.
pub fn base_string_uri(url: &Url) -> String {
	let mut uri = url.clone();

	uri.set_query(None);
	uri.set_fragment(None);
	let _ = uri.set_username("");
	let _ = uri.set_password(None);

	uri.into()
}

/// Encodes and sorts `params`, joining them as `k=v` pairs separated by `&`.
pub fn normalize_parameters<'a, I>(params: I) -> String
where
	I: IntoIterator<Item = (&'a str, &'a str)>,
{
	let mut encoded = params
		.into_iter()
		.map(|(key, value)| (percent_encode(key).into_owned(), percent_encode(value).into_owned()))
		.collect::<Vec<_>>();

	encoded.sort();

	let mut buf = String::new();

	for (idx, (key, value)) in encoded.iter().enumerate() {
		if idx > 0 {
			buf.push('&');
		}

		buf.push_str(key);
		buf.push('=');
		buf.push_str(value);
	}

	buf
}

/// Builds `METHOD&enc(uri)&enc(normalized parameters)`.
pub fn signature_base_string<'a, I>(method: HttpMethod, url: &Url, params: I) -> String
where
	I: IntoIterator<Item = (&'a str, &'a str)>,
{
	let uri = base_string_uri(url);
	let normalized = normalize_parameters(params);

	format!("{}&{}&{}", method.as_str(), percent_encode(&uri), percent_encode(&normalized))
}

/// Builds the `enc(consumer_secret)&enc(token_secret)` signing key.
pub fn signing_key(consumer_secret: &str, token_secret: Option<&str>) -> String {
	format!(
		"{}&{}",
		percent_encode(consumer_secret),
		percent_encode(token_secret.unwrap_or_default())
	)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn percent_encoding_follows_rfc3986() {
		assert_eq!(percent_encode("AZaz09-._~"), "AZaz09-._~");
		assert_eq!(percent_encode("a b+c"), "a%20b%2Bc");
		assert_eq!(percent_encode("!*'()"), "%21%2A%27%28%29");
		assert_eq!(percent_encode("é"), "%C3%A9");
		assert_eq!(percent_encode("https://cb/"), "https%3A%2F%2Fcb%2F");
	}

	#[test]
	fn base_string_uri_strips_query_and_default_port() {
		let url = Url::parse("HTTPS://Api.Example.COM:443/v1/query.php?x=1#frag")
			.expect("Fixture URL should parse.");

		assert_eq!(base_string_uri(&url), "https://api.example.com/v1/query.php");

		let url = Url::parse("http://example.com:8080/r").expect("Fixture URL should parse.");

		assert_eq!(base_string_uri(&url), "http://example.com:8080/r");
	}

	#[test]
	fn base_string_uri_drops_userinfo() {
		let url = Url::parse("https://user:pw@api.example.com/q?x=1").expect("Fixture URL should parse.");

		assert_eq!(base_string_uri(&url), "https://api.example.com/q");

		let url = Url::parse("https://user@api.example.com/q").expect("Fixture URL should parse.");

		assert_eq!(base_string_uri(&url), "https://api.example.com/q");
	}

	#[test]
	fn parameters_sort_by_encoded_key_then_value() {
		let normalized =
			normalize_parameters([("b", "2"), ("a", "z"), ("a", "y"), ("a b", "1"), ("A", "0")]);

		assert_eq!(normalized, "A=0&a=y&a=z&a%20b=1&b=2");
	}

	#[test]
	fn signing_key_handles_missing_token_secret() {
		assert_eq!(signing_key("S", None), "S&");
		assert_eq!(signing_key("c&s", Some("t s")), "c%26s&t%20s");
	}
}
