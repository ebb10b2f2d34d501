//! Token lifecycle state machine.
//!
//! [`TokenStore`] owns the request and access credential pairs and only moves forward through
//! `Unauthenticated → RequestTokenObtained → AccessTokenObtained`. Every transition checks its
//! precondition and reports violations as [`TokenStateError`]. The store itself is a plain value
//! without interior locking; the broker wraps it in a lock and serialises handshakes.

// self
use crate::{_prelude::*, auth::CredentialPair};

/// Lifecycle state together with the pair it holds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum TokenState {
	/// No token has been obtained.
	#[default]
	Unauthenticated,
	/// Request token obtained; waiting for user authorization.
	RequestTokenObtained {
		/// Short-lived pair used to authorize.
		request: CredentialPair,
	},
	/// Access token obtained; queries may be signed.
	AccessTokenObtained {
		/// Long-lived pair used for every query.
		access: CredentialPair,
	},
}
impl TokenState {
	/// Returns the state label without the credential payload.
	pub fn kind(&self) -> TokenStateKind {
		match self {
			TokenState::Unauthenticated => TokenStateKind::Unauthenticated,
			TokenState::RequestTokenObtained { .. } => TokenStateKind::RequestTokenObtained,
			TokenState::AccessTokenObtained { .. } => TokenStateKind::AccessTokenObtained,
		}
	}
}

/// Payload-free lifecycle state label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenStateKind {
	/// No token has been obtained.
	Unauthenticated,
	/// Request token obtained.
	RequestTokenObtained,
	/// Access token obtained.
	AccessTokenObtained,
}
impl TokenStateKind {
	/// Returns a stable label suitable for span fields or error messages.
	pub const fn as_str(self) -> &'static str {
		match self {
			TokenStateKind::Unauthenticated => "unauthenticated",
			TokenStateKind::RequestTokenObtained => "request_token_obtained",
			TokenStateKind::AccessTokenObtained => "access_token_obtained",
		}
	}
}
impl Display for TokenStateKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Rejected lifecycle transitions.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum TokenStateError {
	/// An access token is required but has not been obtained.
	#[error("An access token is required; token state is `{state}`.")]
	NotAuthenticated {
		/// State observed at the time of the call.
		state: TokenStateKind,
	},
	/// Access-token exchange attempted without a request token.
	#[error("No request token has been obtained or supplied.")]
	RequestTokenMissing,
	/// Handshake attempted after an access token was already obtained.
	#[error("An access token has already been obtained; reset the store to re-authorize.")]
	AlreadyAuthorized,
}

/// Owner of the request and access credential pairs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenStore {
	state: TokenState,
}
impl TokenStore {
	/// Creates an unauthenticated store.
	pub fn new() -> Self {
		Self::default()
	}

	/// Full state, including the held pair.
	pub fn state(&self) -> &TokenState {
		&self.state
	}

	/// Current state label.
	pub fn kind(&self) -> TokenStateKind {
		self.state.kind()
	}

	/// Request pair, while waiting for authorization.
	pub fn request_token(&self) -> Option<&CredentialPair> {
		match &self.state {
			TokenState::RequestTokenObtained { request } => Some(request),
			_ => None,
		}
	}

	/// Access pair, once obtained.
	pub fn access_token(&self) -> Option<&CredentialPair> {
		match &self.state {
			TokenState::AccessTokenObtained { access } => Some(access),
			_ => None,
		}
	}

	/// Records a freshly issued request pair.
	///
	/// Overwrites a previous request pair so a failed authorization can simply restart the
	/// handshake.
	pub fn set_request_token(&mut self, request: CredentialPair) -> Result<(), TokenStateError> {
		self.ensure_not_authorized()?;

		self.state = TokenState::RequestTokenObtained { request };

		Ok(())
	}

	/// Records the access pair obtained with the stored request pair.
	pub fn set_access_token(&mut self, access: CredentialPair) -> Result<(), TokenStateError> {
		match self.state {
			TokenState::RequestTokenObtained { .. } => {
				self.state = TokenState::AccessTokenObtained { access };

				Ok(())
			},
			TokenState::Unauthenticated => Err(TokenStateError::RequestTokenMissing),
			TokenState::AccessTokenObtained { .. } => Err(TokenStateError::AlreadyAuthorized),
		}
	}

	/// Records an access pair obtained with an externally supplied request pair.
	///
	/// The supplied pair replaces any stored one before the access transition, so this is valid
	/// from `Unauthenticated` as well as `RequestTokenObtained`.
	pub fn set_access_token_for(
		&mut self,
		request: CredentialPair,
		access: CredentialPair,
	) -> Result<(), TokenStateError> {
		self.set_request_token(request)?;
		self.set_access_token(access)
	}

	/// Installs a previously issued access pair, skipping the handshake.
	pub fn restore_access_token(&mut self, access: CredentialPair) {
		self.state = TokenState::AccessTokenObtained { access };
	}

	/// Drops every pair and returns to `Unauthenticated`.
	pub fn reset(&mut self) {
		self.state = TokenState::Unauthenticated;
	}

	/// Returns the access pair or [`TokenStateError::NotAuthenticated`].
	pub fn require_access_token(&self) -> Result<&CredentialPair, TokenStateError> {
		self.access_token().ok_or(TokenStateError::NotAuthenticated { state: self.kind() })
	}

	fn ensure_not_authorized(&self) -> Result<(), TokenStateError> {
		if matches!(self.state, TokenState::AccessTokenObtained { .. }) {
			Err(TokenStateError::AlreadyAuthorized)
		} else {
			Ok(())
		}
	}
}
