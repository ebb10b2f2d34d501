//! Broker-level error types shared across signing, handshake, and query flows.

// self
use crate::{
	_prelude::*,
	auth::CredentialError,
	query::BatchError,
	service::ServiceDescriptorError,
	store::{TokenStateError, TokenStateKind},
};

/// Broker-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Canonical broker error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Request could not be signed.
	#[error(transparent)]
	Signing(#[from] SigningError),
	/// Transport failure or non-2xx status outside the handshake.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// One of the two handshake round-trips failed.
	#[error(transparent)]
	Handshake(#[from] HandshakeError),
	/// Batch response envelope is malformed.
	#[error(transparent)]
	Protocol(#[from] ProtocolError),
	/// Batch was rejected before any request was sent.
	#[error(transparent)]
	Batch(#[from] BatchError),
	/// Credential pair could not be constructed.
	#[error(transparent)]
	Credential(#[from] CredentialError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Token store refused a lifecycle transition.
	#[error(transparent)]
	TokenState(TokenStateError),

	/// Operation requires an access token that has not been obtained yet.
	#[error("An access token is required; token state is `{state}`.")]
	NotAuthenticated {
		/// Token lifecycle state observed when the operation was attempted.
		state: TokenStateKind,
	},
	/// Server answered the batch but omitted the requested call.
	#[error("Query response does not contain a result for `{call}`.")]
	MissingResult {
		/// Call name that was expected in the response.
		call: String,
	},
}
impl From<TokenStateError> for Error {
	fn from(e: TokenStateError) -> Self {
		match e {
			TokenStateError::NotAuthenticated { state } => Self::NotAuthenticated { state },
			other => Self::TokenState(other),
		}
	}
}

/// Configuration failures raised while assembling a broker.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Service descriptor failed validation.
	#[error(transparent)]
	Descriptor(#[from] ServiceDescriptorError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Failures raised while computing an OAuth 1.0a signature.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum SigningError {
	/// Consumer key is empty.
	#[error("Consumer key is missing.")]
	MissingConsumerKey,
	/// Consumer secret is empty.
	#[error("Consumer secret is missing.")]
	MissingConsumerSecret,
	/// Signature method label is not supported by this crate.
	#[error("Signature method `{method}` is not supported.")]
	UnsupportedMethod {
		/// Label that failed to parse.
		method: String,
	},
	/// MAC could not be keyed.
	#[error("Signing key was rejected by the {method} MAC.")]
	InvalidKey {
		/// Signature method label.
		method: &'static str,
	},
}

/// Transport-level failures (network, IO, non-2xx status).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the service.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the service.")]
	Io(#[from] std::io::Error),
	/// Service answered with a non-2xx status; the body is not interpreted.
	#[error("Service responded with HTTP status {status}.")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// HTTP status code, when the failure carries one.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Status { status, .. } => Some(*status),
			_ => None,
		}
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Handshake round-trip that failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandshakeStage {
	/// Request-token acquisition.
	RequestToken,
	/// Verifier-for-access-token exchange.
	AccessToken,
}
impl HandshakeStage {
	/// Returns a stable label suitable for span fields and error messages.
	pub const fn as_str(self) -> &'static str {
		match self {
			HandshakeStage::RequestToken => "request_token",
			HandshakeStage::AccessToken => "access_token",
		}
	}
}
impl Display for HandshakeStage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Failure of one handshake stage together with its cause.
#[derive(Debug, ThisError)]
#[error("The {stage} handshake stage failed.")]
pub struct HandshakeError {
	/// Stage that failed.
	pub stage: HandshakeStage,
	/// Underlying cause.
	#[source]
	pub cause: HandshakeCause,
}
impl HandshakeError {
	/// Creates a new handshake error for `stage`.
	pub fn new(stage: HandshakeStage, cause: impl Into<HandshakeCause>) -> Self {
		Self { stage, cause: cause.into() }
	}

	/// True when the service could not be reached at all.
	pub fn is_unreachable(&self) -> bool {
		matches!(self.cause, HandshakeCause::Transport(_))
	}

	/// True when the service answered but refused to issue a token.
	pub fn is_rejected(&self) -> bool {
		matches!(self.cause, HandshakeCause::Rejected { .. })
	}
}

/// Reasons a handshake stage can fail.
#[derive(Debug, ThisError)]
pub enum HandshakeCause {
	/// The token endpoint could not be reached.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// The token endpoint answered with a non-2xx status.
	#[error("Token endpoint refused the request with HTTP status {status}.")]
	Rejected {
		/// HTTP status code.
		status: u16,
		/// Truncated response body for diagnostics.
		body: String,
	},
	/// The token endpoint answered without the expected field.
	#[error("Token endpoint response is missing `{field}`.")]
	MalformedResponse {
		/// Form field that was absent or empty.
		field: &'static str,
	},
	/// No request token is available to exchange.
	#[error("No request token is available for the access-token exchange.")]
	MissingRequestToken,
	/// Verifier was empty.
	#[error("Verifier must not be empty.")]
	MissingVerifier,
}

/// Failures decoding the batch response envelope.
#[derive(Debug, ThisError)]
pub enum ProtocolError {
	/// Request payload could not be serialized.
	#[error("Batch request could not be encoded as JSON.")]
	Encode {
		/// Serialization failure.
		#[source]
		source: serde_json::Error,
	},
	/// Response body is not valid JSON.
	#[error("Query endpoint returned malformed JSON.")]
	InvalidJson {
		/// Parsing failure.
		#[source]
		source: serde_json::Error,
	},
	/// Response body is JSON but not an object keyed by call name.
	#[error("Query endpoint returned a JSON {found} instead of an object.")]
	NotAnObject {
		/// JSON type that was found.
		found: &'static str,
	},
	/// One of the per-call values does not match the result shape.
	#[error("Query endpoint returned a malformed result at `{path}`.")]
	InvalidResult {
		/// JSON path of the offending value.
		path: String,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
