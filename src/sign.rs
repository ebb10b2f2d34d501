//! OAuth 1.0a request signing.
//!
//! [`Signer`] is a pure function of its inputs plus two injectable sources: a
//! [`NonceSource`] and a [`Clock`]. Pinning both (see [`FixedNonce`] and [`FixedClock`])
//! makes every signature reproducible, which the tests rely on. Signing never performs I/O
//! and never mutates the credential pairs it reads.

mod encode;
mod source;

pub use encode::*;
pub use source::*;

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::Sha256;
// self
use crate::{
	_prelude::*,
	auth::{ConsumerIdentity, CredentialPair, SignatureMethod},
	error::SigningError,
	http::HttpMethod,
};

const OAUTH_VERSION: &str = "1.0";

/// Signs requests on behalf of a single consumer identity.
#[derive(Clone)]
pub struct Signer {
	consumer: ConsumerIdentity,
	nonce: Arc<dyn NonceSource>,
	clock: Arc<dyn Clock>,
}
impl Signer {
	/// Creates a signer backed by [`RandomNonce`] and [`SystemClock`].
	pub fn new(consumer: ConsumerIdentity) -> Self {
		Self { consumer, nonce: Arc::new(RandomNonce), clock: Arc::new(SystemClock) }
	}

	/// Replaces the nonce source.
	pub fn with_nonce_source(mut self, nonce: Arc<dyn NonceSource>) -> Self {
		self.nonce = nonce;

		self
	}

	/// Replaces the clock.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;

		self
	}

	/// Consumer identity used for every signature.
	pub fn consumer(&self) -> &ConsumerIdentity {
		&self.consumer
	}

	/// Signs `method url` with the given body parameters and optional token pair.
	pub fn sign(
		&self,
		method: HttpMethod,
		url: &Url,
		params: &[(String, String)],
		token: Option<&CredentialPair>,
	) -> Result<SignedRequest, SigningError> {
		self.sign_with(method, url, params, token, &[])
	}

	/// Same as [`Signer::sign`] but adds extra `oauth_*` protocol parameters such as
	/// `oauth_callback` or `oauth_verifier`.
	pub fn sign_with(
		&self,
		method: HttpMethod,
		url: &Url,
		params: &[(String, String)],
		token: Option<&CredentialPair>,
		extras: &[(&'static str, String)],
	) -> Result<SignedRequest, SigningError> {
		if self.consumer.key().is_empty() {
			return Err(SigningError::MissingConsumerKey);
		}
		if self.consumer.secret().is_empty() {
			return Err(SigningError::MissingConsumerSecret);
		}

		let signature_method = self.consumer.signature_method();
		let mut protocol = vec![
			("oauth_consumer_key".to_owned(), self.consumer.key().to_owned()),
			("oauth_nonce".to_owned(), self.nonce.nonce()),
			("oauth_signature_method".to_owned(), signature_method.as_str().to_owned()),
			("oauth_timestamp".to_owned(), self.clock.now().unix_timestamp().to_string()),
			("oauth_version".to_owned(), OAUTH_VERSION.to_owned()),
		];

		if let Some(pair) = token {
			protocol.push(("oauth_token".to_owned(), pair.token().to_owned()));
		}

		protocol.extend(extras.iter().map(|(key, value)| ((*key).to_owned(), value.clone())));

		let query = url.query_pairs().into_owned().collect::<Vec<_>>();
		let base_string = signature_base_string(
			method,
			url,
			protocol
				.iter()
				.chain(params)
				.chain(&query)
				.map(|(key, value)| (key.as_str(), value.as_str())),
		);
		let key = signing_key(
			self.consumer.secret().expose(),
			token.map(|pair| pair.secret().expose()),
		);
		let signature = compute_signature(signature_method, &key, &base_string)?;

		protocol.push(("oauth_signature".to_owned(), signature));
		protocol.sort();

		Ok(SignedRequest { protocol, base_string })
	}
}
impl Debug for Signer {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Signer").field("consumer", &self.consumer).finish()
	}
}

/// Output of [`Signer::sign`]: the protocol parameters (signature included) and the base
/// string they were computed from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedRequest {
	protocol: Vec<(String, String)>,
	base_string: String,
}
impl SignedRequest {
	/// Sorted `oauth_*` parameters, including `oauth_signature`.
	pub fn protocol_params(&self) -> &[(String, String)] {
		&self.protocol
	}

	/// Looks up a single protocol parameter.
	pub fn param(&self, name: &str) -> Option<&str> {
		self.protocol.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
	}

	/// Base64 (or PLAINTEXT) signature value.
	pub fn signature(&self) -> &str {
		self.param("oauth_signature").unwrap_or_default()
	}

	/// Signature base string that was signed.
	pub fn base_string(&self) -> &str {
		&self.base_string
	}

	/// Renders the `Authorization: OAuth ...` header value.
	pub fn authorization_header(&self, realm: Option<&str>) -> String {
		let mut header = String::from("OAuth ");
		let mut first = true;

		if let Some(realm) = realm {
			header.push_str(&format!("realm=\"{}\"", percent_encode(realm)));

			first = false;
		}

		for (key, value) in &self.protocol {
			if !first {
				header.push_str(", ");
			}

			header.push_str(&format!("{}=\"{}\"", percent_encode(key), percent_encode(value)));

			first = false;
		}

		header
	}
}

fn compute_signature(
	method: SignatureMethod,
	key: &str,
	base_string: &str,
) -> Result<String, SigningError> {
	match method {
		SignatureMethod::HmacSha1 => {
			let mut mac = <Hmac<Sha1>>::new_from_slice(key.as_bytes())
				.map_err(|_| SigningError::InvalidKey { method: method.as_str() })?;

			mac.update(base_string.as_bytes());

			Ok(STANDARD.encode(mac.finalize().into_bytes()))
		},
		SignatureMethod::HmacSha256 => {
			let mut mac = <Hmac<Sha256>>::new_from_slice(key.as_bytes())
				.map_err(|_| SigningError::InvalidKey { method: method.as_str() })?;

			mac.update(base_string.as_bytes());

			Ok(STANDARD.encode(mac.finalize().into_bytes()))
		},
		SignatureMethod::Plaintext => Ok(key.to_owned()),
	}
}
