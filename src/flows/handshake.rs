//! Three-legged handshake: request token, then verifier-for-access-token exchange.
//!
//! Both legs are signed `POST`s whose form-encoded responses carry `oauth_token` and
//! `oauth_token_secret`. Handshake steps are serialised through the broker's async guard so two
//! callers cannot interleave a request-token fetch with an access-token exchange; queries never
//! take the guard.

// self
use crate::{
	_prelude::*,
	auth::CredentialPair,
	error::{HandshakeCause, HandshakeError, HandshakeStage},
	flows::{Broker, common},
	http::{HttpMethod, HttpRequest, HttpTransport},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store::{TokenStateError, TokenStateKind},
};

const OUT_OF_BAND_CALLBACK: &str = "oob";

impl<C> Broker<C>
where
	C: ?Sized + HttpTransport,
{
	/// Obtains a fresh request token and records it in the token store.
	///
	/// `oauth_callback` carries the descriptor's callback, or `oob` when none is configured.
	/// Calling this again before authorization replaces the stored request token; calling it
	/// once an access token exists fails with [`TokenStateError::AlreadyAuthorized`] until
	/// [`Broker::reset`] is called.
	pub async fn request_token(&self) -> Result<CredentialPair> {
		const KIND: FlowKind = FlowKind::RequestToken;

		let span = FlowSpan::new(KIND, "request_token");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let _handshake = self.handshake_guard.lock().await;

				self.ensure_not_authorized()?;

				let callback = self
					.descriptor
					.callback
					.as_ref()
					.map_or_else(|| OUT_OF_BAND_CALLBACK.to_owned(), Url::to_string);
				let request = self.signed_request(
					HttpMethod::Post,
					&self.descriptor.endpoints.request_token,
					&[],
					None,
					&[("oauth_callback", callback)],
				)?;
				let pair = self.exchange_token(HandshakeStage::RequestToken, request).await?;

				self.tokens.write().set_request_token(pair.clone())?;

				Ok(pair)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Exchanges `verifier` and the stored request token for an access token.
	///
	/// Returns the freshly issued access pair, which is also recorded in the token store.
	pub async fn access_token(&self, verifier: &str) -> Result<CredentialPair> {
		self.access_token_with(verifier, None).await
	}

	/// Same as [`Broker::access_token`] but signs with `request` instead of the stored request
	/// token when one is supplied.
	pub async fn access_token_with(
		&self,
		verifier: &str,
		request: Option<CredentialPair>,
	) -> Result<CredentialPair> {
		const KIND: FlowKind = FlowKind::AccessToken;
		const STAGE: HandshakeStage = HandshakeStage::AccessToken;

		let span = FlowSpan::new(KIND, "access_token");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let _handshake = self.handshake_guard.lock().await;

				if verifier.trim().is_empty() {
					return Err(HandshakeError::new(STAGE, HandshakeCause::MissingVerifier).into());
				}

				self.ensure_not_authorized()?;

				let supplied = request.is_some();
				let request_pair = match request {
					Some(pair) => pair,
					None => self.current_request_token().ok_or_else(|| {
						HandshakeError::new(STAGE, HandshakeCause::MissingRequestToken)
					})?,
				};
				let request = self.signed_request(
					HttpMethod::Post,
					&self.descriptor.endpoints.access_token,
					&[],
					Some(&request_pair),
					&[("oauth_verifier", verifier.to_owned())],
				)?;
				let access = self.exchange_token(STAGE, request).await?;

				{
					let mut store = self.tokens.write();

					if supplied {
						store.set_access_token_for(request_pair, access.clone())?;
					} else {
						store.set_access_token(access.clone())?;
					}
				}

				Ok(access)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	async fn exchange_token(
		&self,
		stage: HandshakeStage,
		request: HttpRequest,
	) -> Result<CredentialPair, HandshakeError> {
		let response = self
			.http_client
			.send(request)
			.await
			.map_err(|source| HandshakeError::new(stage, source))?;

		common::parse_token_response(&response).map_err(|cause| HandshakeError::new(stage, cause))
	}

	fn ensure_not_authorized(&self) -> Result<(), TokenStateError> {
		if self.tokens.read().kind() == TokenStateKind::AccessTokenObtained {
			Err(TokenStateError::AlreadyAuthorized)
		} else {
			Ok(())
		}
	}
}
