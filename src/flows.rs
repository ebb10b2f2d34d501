//! High-level flow orchestrators powered by the broker facade.

pub mod authorize;
pub mod proxy;

mod common;
mod handshake;
mod query;

pub use authorize::*;
pub use proxy::*;

// self
use crate::{
	_prelude::*,
	auth::{ConsumerIdentity, CredentialPair},
	error::SigningError,
	http::{HttpMethod, HttpRequest, HttpTransport},
	service::ServiceDescriptor,
	sign::{Clock, NonceSource, Signer},
	store::{TokenStateKind, TokenStore},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

#[cfg(feature = "reqwest")]
/// Broker specialized for the crate's default reqwest transport stack.
pub type ReqwestBroker = Broker<ReqwestHttpClient>;

/// Coordinates the OAuth 1.0a handshake and signed batch queries against a single service.
///
/// The broker owns the HTTP transport, service descriptor, signer, and token store so the
/// individual flows only deal with request construction and response interpretation.
/// Clones share the same token store and handshake guard, so a session authorized through one
/// clone is visible through every other.
pub struct Broker<C>
where
	C: ?Sized + HttpTransport,
{
	/// HTTP transport used for every outbound service request.
	pub http_client: Arc<C>,
	/// Service descriptor that defines the endpoints, callback, and realm.
	pub descriptor: ServiceDescriptor,
	signer: Signer,
	tokens: Arc<RwLock<TokenStore>>,
	handshake_guard: Arc<AsyncMutex<()>>,
}
impl<C> Broker<C>
where
	C: ?Sized + HttpTransport,
{
	/// Creates a broker that reuses the caller-provided transport.
	pub fn with_http_client(
		descriptor: ServiceDescriptor,
		consumer: ConsumerIdentity,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			descriptor,
			signer: Signer::new(consumer),
			tokens: Default::default(),
			handshake_guard: Default::default(),
		}
	}

	/// Replaces the nonce source used when signing.
	pub fn with_nonce_source(mut self, nonce: Arc<dyn NonceSource>) -> Self {
		self.signer = self.signer.with_nonce_source(nonce);

		self
	}

	/// Replaces the clock used for `oauth_timestamp`.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.signer = self.signer.with_clock(clock);

		self
	}

	/// Consumer identity used for every signature.
	pub fn consumer(&self) -> &ConsumerIdentity {
		self.signer.consumer()
	}

	/// Current token lifecycle state.
	pub fn token_state(&self) -> TokenStateKind {
		self.tokens.read().kind()
	}

	/// Request pair awaiting authorization, if any.
	pub fn current_request_token(&self) -> Option<CredentialPair> {
		self.tokens.read().request_token().cloned()
	}

	/// Access pair used for queries, if any.
	pub fn current_access_token(&self) -> Option<CredentialPair> {
		self.tokens.read().access_token().cloned()
	}

	/// Resumes a session with a previously issued access pair.
	pub fn restore_access_token(&self, access: CredentialPair) {
		self.tokens.write().restore_access_token(access);
	}

	/// Forgets every token and returns to the unauthenticated state.
	pub fn reset(&self) {
		self.tokens.write().reset();
	}

	/// Signs a request and renders it for the transport.
	///
	/// `params` travel as the form-encoded body and take part in the signature; the protocol
	/// parameters travel in the `Authorization` header.
	pub(crate) fn signed_request(
		&self,
		method: HttpMethod,
		url: &Url,
		params: &[(String, String)],
		token: Option<&CredentialPair>,
		extras: &[(&'static str, String)],
	) -> Result<HttpRequest, SigningError> {
		let signed = self.signer.sign_with(method, url, params, token, extras)?;
		let headers = vec![
			(
				"Authorization".to_owned(),
				signed.authorization_header(self.descriptor.realm.as_deref()),
			),
			("Content-Type".to_owned(), common::FORM_CONTENT_TYPE.to_owned()),
			("Accept".to_owned(), "application/json, application/x-www-form-urlencoded".to_owned()),
		];

		Ok(HttpRequest {
			method,
			url: url.clone(),
			headers,
			body: common::form_body(params).into_bytes(),
		})
	}
}
#[cfg(feature = "reqwest")]
impl Broker<ReqwestHttpClient> {
	/// Creates a new broker for the provided descriptor and consumer identity.
	///
	/// The broker provisions its own reqwest-backed transport so callers do not need to pass
	/// HTTP handles explicitly. Use [`Broker::with_http_client`] to supply a client with custom
	/// timeouts or TLS settings.
	pub fn new(descriptor: ServiceDescriptor, consumer: ConsumerIdentity) -> Self {
		Self::with_http_client(descriptor, consumer, ReqwestHttpClient::default())
	}
}
impl<C> Clone for Broker<C>
where
	C: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			descriptor: self.descriptor.clone(),
			signer: self.signer.clone(),
			tokens: self.tokens.clone(),
			handshake_guard: self.handshake_guard.clone(),
		}
	}
}
impl<C> Debug for Broker<C>
where
	C: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Broker")
			.field("descriptor", &self.descriptor)
			.field("consumer_key", &self.signer.consumer().key())
			.field("token_state", &self.token_state())
			.finish()
	}
}
